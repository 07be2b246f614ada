//! Command implementations

pub mod invoke;
pub mod operations;
pub mod profile;

use std::fs;

use crate::error::{AwsCtlError, Result as CliResult};

/// Read file input, supporting @filename notation
pub fn read_file_input(input: &str) -> CliResult<String> {
    if let Some(filename) = input.strip_prefix('@') {
        fs::read_to_string(filename).map_err(|e| AwsCtlError::FileError {
            path: filename.to_string(),
            message: e.to_string(),
        })
    } else {
        Ok(input.to_string())
    }
}
