//! Normalize command implementation
//!
//! Validates a document, imports it into the in-memory repository and exports it
//! back, producing the canonical form: qualified names split into `namespace`
//! keys, enum names upper-cased, every flag spelled out.

use std::path::Path;

use tracing::info;

use super::{load_input, write_output};
use crate::cli::error::CliError;
use crate::config::ImportConfig;
use crate::export::NodeTypeExporter;
use crate::import::NodeTypeImporter;
use crate::models::{MemoryNamespaceRegistry, MemoryNodeTypeManager};

/// Rewrite a document in canonical form
pub fn normalize_content(content: &str, config: &ImportConfig) -> Result<String, CliError> {
    let manager = MemoryNodeTypeManager::new();
    let mut registry = MemoryNamespaceRegistry::new();

    let node_types = NodeTypeImporter::new(&manager, &mut registry)
        .with_config(config.clone())
        .import_str(content)?;

    let exporter = NodeTypeExporter::new();
    let document = exporter.export_document(&registry, &node_types)?;
    Ok(exporter.to_yaml(&document)?)
}

/// Handle the normalize command
pub fn handle_normalize(
    input: &str,
    output: Option<&Path>,
    config: Option<&Path>,
) -> Result<(), CliError> {
    let config = match config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .map_err(|e| CliError::FileReadError(path.display().to_string(), e.to_string()))?;
            ImportConfig::from_yaml(&text)?
        }
        None => ImportConfig::default(),
    };

    let content = load_input(input)?;
    let normalized = normalize_content(&content, &config)?;
    write_output(output, &normalized)?;

    if let Some(path) = output {
        info!(output = %path.display(), "Wrote normalized document");
    }
    Ok(())
}
