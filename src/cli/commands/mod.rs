//! CLI command implementations

pub mod fields;
pub mod normalize;
pub mod validate;

use std::io::Read;
use std::path::Path;

use crate::cli::error::CliError;

/// Load input content from a file, or from stdin when `input` is `-`
pub fn load_input(input: &str) -> Result<String, CliError> {
    if input == "-" {
        let mut content = String::new();
        std::io::stdin()
            .read_to_string(&mut content)
            .map_err(|e| CliError::InvalidArgument(format!("Failed to read stdin: {}", e)))?;
        Ok(content)
    } else {
        std::fs::read_to_string(input)
            .map_err(|e| CliError::FileReadError(input.to_string(), e.to_string()))
    }
}

/// Write output to a file, or to stdout when no path is given
pub fn write_output(output: Option<&Path>, content: &str) -> Result<(), CliError> {
    match output {
        Some(path) => std::fs::write(path, content)
            .map_err(|e| CliError::FileWriteError(path.display().to_string(), e.to_string())),
        None => {
            print!("{}", content);
            Ok(())
        }
    }
}
