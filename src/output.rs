use clap::ValueEnum;
use tracing::info;

use crate::types::{NamespaceRecord, Resource};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One log event per candidate
    Log,
    /// Bare names on stdout, one per line
    Batch,
    /// A YAML document on stdout
    Yaml,
}

/// Log-mode wording for a candidate, depending on whether it is about to go.
fn verdict(delete: bool) -> &'static str {
    if delete {
        "Deleting"
    } else {
        "Should be deleted"
    }
}

pub fn print_image_tags(
    format: OutputFormat,
    image: &str,
    tags: &[String],
    delete: bool,
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Log => {
            for tag in tags {
                info!("{}: image tag {}:{}", verdict(delete), image, tag);
            }
        }
        OutputFormat::Batch => {
            for tag in tags {
                println!("{}", tag);
            }
        }
        OutputFormat::Yaml => print!("{}", serde_yaml::to_string(tags)?),
    }
    Ok(())
}

pub fn print_resources(
    format: OutputFormat,
    resources: &[Resource],
    delete: bool,
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Log => {
            for r in resources {
                info!("{}: {} {}/{}", verdict(delete), r.kind, r.namespace, r.name);
            }
        }
        OutputFormat::Batch => {
            for r in resources {
                println!("{}: {}", r.kind, r.name);
            }
        }
        OutputFormat::Yaml => print!("{}", serde_yaml::to_string(resources)?),
    }
    Ok(())
}

pub fn print_namespaces(
    format: OutputFormat,
    namespaces: &[NamespaceRecord],
    delete: bool,
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Log => {
            for ns in namespaces {
                info!("{}: namespace {}", verdict(delete), ns.name);
            }
        }
        OutputFormat::Batch => {
            for ns in namespaces {
                println!("{}", ns.name);
            }
        }
        OutputFormat::Yaml => print!("{}", serde_yaml::to_string(namespaces)?),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verdict_without_delete_reports_only() {
        assert_eq!(verdict(false), "Should be deleted");
        assert_eq!(verdict(true), "Deleting");
    }
}
