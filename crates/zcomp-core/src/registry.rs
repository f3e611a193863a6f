//! Compile-time table of compression algorithms.
//!
//! Which algorithms appear here is decided by cargo features; nothing can be
//! registered at runtime. Lookups read a constant table and need no locking.

use crate::backend::{Backend, CreateFn, PoolSpec};
use crate::{Error, Result};
use tracing::{debug, info};

#[cfg(not(any(feature = "lzo", feature = "lz4")))]
compile_error!("zcomp-core needs at least one algorithm feature enabled (\"lzo\" or \"lz4\")");

/// One compiled-in algorithm.
#[derive(Debug, Clone, Copy)]
pub struct CompressorEntry {
    /// Name used to select the algorithm.
    pub name: &'static str,
    /// Algorithm constructor.
    pub create: CreateFn,
}

const COMPRESSORS: &[CompressorEntry] = &[
    #[cfg(feature = "lzo")]
    CompressorEntry {
        name: "lzo",
        create: crate::lzo::create,
    },
    #[cfg(feature = "lz4")]
    CompressorEntry {
        name: "lz4",
        create: crate::lz4::create,
    },
];

const _: () = assert!(!COMPRESSORS.is_empty());

/// Compare an externally supplied name with a table name.
///
/// Matches exactly, except that one trailing newline on either side is
/// ignored, as with values written to a sysfs attribute.
#[must_use]
pub fn sysfs_streq(a: &str, b: &str) -> bool {
    let a = a.strip_suffix('\n').unwrap_or(a);
    let b = b.strip_suffix('\n').unwrap_or(b);
    a == b
}

/// Compiled-in algorithm entries, in table order.
#[must_use]
pub fn compressors() -> &'static [CompressorEntry] {
    COMPRESSORS
}

/// Compiled-in algorithm names, in table order.
pub fn algorithms() -> impl Iterator<Item = &'static str> {
    COMPRESSORS.iter().map(|entry| entry.name)
}

/// First algorithm in the table.
#[must_use]
pub fn default_algorithm() -> &'static str {
    COMPRESSORS[0].name
}

/// Find the entry matching `name`.
#[must_use]
pub fn find(name: &str) -> Option<&'static CompressorEntry> {
    COMPRESSORS.iter().find(|entry| sysfs_streq(name, entry.name))
}

/// Create a backend for `name` with a single work buffer.
///
/// # Errors
///
/// See [`create_with`].
pub fn create(name: &str) -> Result<Backend> {
    create_with(name, &PoolSpec::default())
}

/// Create a backend for `name` with work memory described by `spec`.
///
/// Nothing is allocated when the name is unknown. If the algorithm's
/// constructor fails, whatever it built is released before returning.
///
/// # Errors
///
/// Returns [`Error::UnsupportedAlgorithm`] for unknown names and
/// [`Error::Allocation`] if work memory cannot be allocated.
pub fn create_with(name: &str, spec: &PoolSpec) -> Result<Backend> {
    let entry = find(name).ok_or_else(|| Error::UnsupportedAlgorithm(name.to_string()))?;

    let ops = (entry.create)(spec).map_err(|e| {
        debug!(algorithm = entry.name, error = %e, "backend creation failed");
        e
    })?;

    info!(algorithm = entry.name, buffers = spec.buffers.get(), "compression backend created");
    Ok(Backend::new(entry.name, ops))
}

/// Destroy a backend created by [`create`] or [`create_with`].
pub fn destroy(backend: Backend) {
    let name = backend.name();
    backend.destroy();
    info!(algorithm = name, "compression backend destroyed");
}

/// Render the compiled-in algorithm names, bracketing the one `active` uses.
///
/// Every name is followed by a space and the line ends with a newline, for
/// example `lzo <lz4> \n`.
#[must_use]
pub fn available_show(active: Option<&Backend>) -> String {
    let mut out = String::new();
    for entry in COMPRESSORS {
        if active.is_some_and(|backend| backend.name() == entry.name) {
            out.push('<');
            out.push_str(entry.name);
            out.push('>');
        } else {
            out.push_str(entry.name);
        }
        out.push(' ');
    }
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sysfs_streq() {
        assert!(sysfs_streq("lz4", "lz4"));
        assert!(sysfs_streq("lz4\n", "lz4"));
        assert!(sysfs_streq("lz4", "lz4\n"));
        assert!(!sysfs_streq("lz4\n\n", "lz4"));
        assert!(!sysfs_streq("LZ4", "lz4"));
        assert!(!sysfs_streq(" lz4", "lz4"));
        assert!(!sysfs_streq("lz", "lz4"));
        assert!(!sysfs_streq("", "lz4"));
    }

    #[test]
    fn test_table_not_empty() {
        assert!(!compressors().is_empty());
        assert_eq!(default_algorithm(), compressors()[0].name);
    }

    #[test]
    fn test_unknown_algorithm() {
        let err = create("nonexistent-algo").unwrap_err();
        assert!(matches!(err, Error::UnsupportedAlgorithm(ref name) if name == "nonexistent-algo"));
    }

    #[test]
    fn test_available_show_without_backend() {
        let listing = available_show(None);
        assert!(listing.ends_with(" \n"));
        assert!(!listing.contains('<'));
        let names: Vec<&str> = listing.split_whitespace().collect();
        assert_eq!(names, algorithms().collect::<Vec<_>>());
    }

    #[cfg(all(feature = "lzo", feature = "lz4"))]
    #[test]
    fn test_table_order() {
        assert_eq!(algorithms().collect::<Vec<_>>(), ["lzo", "lz4"]);
        assert_eq!(available_show(None), "lzo lz4 \n");
    }

    #[test]
    fn test_available_show_brackets_only_active() {
        for name in algorithms() {
            let backend = create(name).unwrap();
            let listing = available_show(Some(&backend));
            destroy(backend);

            let marked: Vec<&str> = listing.split_whitespace().filter(|w| w.starts_with('<')).collect();
            assert_eq!(marked, [format!("<{name}>")]);
            assert_eq!(listing.matches(' ').count(), algorithms().count());
            assert!(listing.ends_with(" \n"));
        }
    }

    #[cfg(all(feature = "lzo", feature = "lz4"))]
    #[test]
    fn test_available_show_marks_active() {
        let backend = create("lz4").unwrap();
        assert_eq!(available_show(Some(&backend)), "lzo <lz4> \n");
        destroy(backend);

        let backend = create("lzo\n").unwrap();
        assert_eq!(backend.name(), "lzo");
        assert_eq!(available_show(Some(&backend)), "<lzo> lz4 \n");
        destroy(backend);
    }
}
