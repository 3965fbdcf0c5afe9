//! Fields command implementation

use crate::cli::error::CliError;
use crate::validation::{EntityKind, FieldTable};

/// Render the legal keys of one kind, or of every kind
pub fn render_fields(kind: Option<EntityKind>) -> String {
    let table = FieldTable::global();
    let kinds: Vec<EntityKind> = match kind {
        Some(kind) => vec![kind],
        None => EntityKind::ALL.to_vec(),
    };

    let mut out = String::new();
    for kind in kinds {
        out.push_str(&format!("{}:\n", kind));
        let described = table.describe(kind);
        let width = described.iter().map(|(name, _)| name.len()).max().unwrap_or(0);
        for (name, shape) in described {
            out.push_str(&format!("  {:width$}  {}\n", name, shape, width = width));
        }
    }
    out
}

/// Handle the fields command
pub fn handle_fields(kind: Option<&str>) -> Result<(), CliError> {
    let kind = match kind {
        Some(name) => Some(EntityKind::parse(name).ok_or_else(|| {
            CliError::InvalidArgument(format!(
                "Unknown entity kind: {} (expected document, node-type, child or property)",
                name
            ))
        })?),
        None => None,
    };
    print!("{}", render_fields(kind));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_single_kind() {
        let out = render_fields(Some(EntityKind::Document));
        assert_eq!(
            out,
            "document:\n  namespaces  mapping of prefix to URI\n  node_types  mapping of name to node type\n"
        );
    }

    #[test]
    fn test_render_all_kinds() {
        let out = render_fields(None);
        assert!(out.contains("property definition:\n"));
        assert!(out.contains("required_type"));
    }

    #[test]
    fn test_unknown_kind() {
        assert!(matches!(
            handle_fields(Some("mixin")),
            Err(CliError::InvalidArgument(_))
        ));
    }
}
