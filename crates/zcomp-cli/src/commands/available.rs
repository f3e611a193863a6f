//! List the compiled-in compression algorithms.

use crate::output::OutputFormat;
use anyhow::Context;
use clap::Args;
use serde::Serialize;
use zcomp_core::registry;

/// Arguments for available command.
#[derive(Args)]
pub struct AvailableArgs {
    /// Mark this algorithm as the active one.
    #[arg(short, long)]
    pub active: Option<String>,
}

/// Serializable listing for JSON output.
#[derive(Debug, Serialize)]
struct AvailableOutput {
    algorithms: Vec<&'static str>,
    default: &'static str,
    active: Option<&'static str>,
}

/// Print the algorithm listing, bracketing the active one.
pub fn available(args: &AvailableArgs, format: OutputFormat) -> anyhow::Result<()> {
    let backend = args
        .active
        .as_deref()
        .map(registry::create)
        .transpose()
        .context("cannot select active algorithm")?;

    match format {
        OutputFormat::Table => print!("{}", registry::available_show(backend.as_ref())),
        OutputFormat::Json => {
            let listing = AvailableOutput {
                algorithms: registry::algorithms().collect(),
                default: registry::default_algorithm(),
                active: backend.as_ref().map(zcomp_core::Backend::name),
            };
            println!("{}", serde_json::to_string_pretty(&listing)?);
        }
        OutputFormat::Raw => {
            for name in registry::algorithms() {
                println!("{name}");
            }
        }
    }

    if let Some(backend) = backend {
        registry::destroy(backend);
    }
    Ok(())
}
