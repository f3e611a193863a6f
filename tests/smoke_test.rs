//! Smoke tests for basic functionality

use zcomp::{registry, PAGE_SIZE, STAGING_SIZE};

#[test]
fn test_default_algorithm_heads_listing() {
    let default = registry::default_algorithm();
    let listing = registry::available_show(None);
    assert!(listing.starts_with(&format!("{default} ")), "{listing:?}");
    assert_eq!(STAGING_SIZE, 2 * PAGE_SIZE);
}

#[test]
fn test_every_algorithm_creates_and_destroys() {
    for name in registry::algorithms() {
        let backend = registry::create(name).unwrap();
        assert_eq!(backend.name(), name);
        registry::destroy(backend);
    }
}

#[test]
fn test_listing_marks_active_backend() {
    let listing = registry::available_show(None);
    assert!(listing.ends_with('\n'));

    for name in registry::algorithms() {
        let backend = registry::create(name).unwrap();
        let listing = registry::available_show(Some(&backend));
        assert!(listing.contains(&format!("<{name}> ")));
        assert_eq!(listing.matches('<').count(), 1);
        registry::destroy(backend);
    }
}

#[cfg(all(feature = "lzo", feature = "lz4"))]
#[test]
fn test_default_listing() {
    let backend = registry::create("lz4").unwrap();
    assert_eq!(registry::available_show(Some(&backend)), "lzo <lz4> \n");
    registry::destroy(backend);
}

#[test]
fn test_page_roundtrip_through_lease() {
    let backend = registry::create(registry::default_algorithm()).unwrap();
    let page: Vec<u8> = (0..PAGE_SIZE).map(|i| (i % 13) as u8).collect();

    let mut lease = backend.lease();
    let len = backend.compress_to_staging(&page, &mut lease).unwrap();
    assert!(len < PAGE_SIZE);

    let mut restored = vec![0u8; PAGE_SIZE];
    backend
        .decompress(&lease.staging()[..len], &mut restored)
        .unwrap();
    drop(lease);

    assert_eq!(page, restored);
    registry::destroy(backend);
}
