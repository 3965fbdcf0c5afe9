//! Validate command implementation

use serde_json::json;
use serde_yaml::Value;

use super::load_input;
use crate::cli::error::CliError;
use crate::validation::{DocumentValidator, ValidationReport};

/// Parse and validate a document, returning every violation found
pub fn validate_content(content: &str) -> Result<ValidationReport, CliError> {
    let document: Value = serde_yaml::from_str(content).map_err(crate::NodeTypeError::from)?;
    Ok(DocumentValidator::new().validate(&document)?)
}

/// Render a report for the terminal, or as JSON
pub fn render_report(report: &ValidationReport, as_json: bool) -> Result<String, CliError> {
    if as_json {
        let body = json!({
            "valid": report.is_valid(),
            "messages": report.messages(),
            "violations": report.violations(),
        });
        return serde_json::to_string_pretty(&body)
            .map(|s| s + "\n")
            .map_err(|e| CliError::OutputError(e.to_string()));
    }

    if report.is_valid() {
        Ok("Validation successful\n".to_string())
    } else {
        Ok(format!("{}\n", report))
    }
}

/// Handle the validate command; returns whether the document is valid
pub fn handle_validate(input: &str, as_json: bool) -> Result<bool, CliError> {
    let content = load_input(input)?;
    let report = validate_content(&content)?;
    print!("{}", render_report(&report, as_json)?);
    Ok(report.is_valid())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_valid_report() {
        let report = validate_content("node_types:\n  article: ~\n").unwrap();
        assert_eq!(render_report(&report, false).unwrap(), "Validation successful\n");
    }

    #[test]
    fn test_render_json_report() {
        let report = validate_content("node_types:\n  article:\n    mixin: 1\n").unwrap();
        let rendered = render_report(&report, true).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(parsed["valid"], json!(false));
        assert_eq!(parsed["violations"][0]["type"], json!("invalid_value"));
        assert_eq!(parsed["violations"][0]["kind"], json!("node_type"));
        assert_eq!(parsed["violations"][0]["key"], json!("mixin"));
    }

    #[test]
    fn test_structure_error_is_an_error() {
        let err = validate_content("namespaces: {}\n").unwrap_err();
        assert!(matches!(err, CliError::NodeType(crate::NodeTypeError::Structure(_))));
    }
}
