//! Error types for awsctl
//!
//! Every failure the binary reports goes through [`AwsCtlError`], which knows how
//! to suggest a next step.

use awsctl_core::{ClientError, ConfigError, CoreError};
use colored::Colorize;
use thiserror::Error;

/// Cargo-style diagnostic formatter for CLI errors.
///
/// Produces structured output like:
/// ```text
/// error: Profile 'prod' not found
///
///   tip: List available profiles: awsctl profile list
/// ```
pub struct CliDiagnostic {
    message: String,
    detail: Option<String>,
    tips: Vec<(String, Vec<String>)>,
}

impl CliDiagnostic {
    /// Start a new error diagnostic with the given message.
    pub fn error(message: &str) -> Self {
        Self {
            message: message.to_string(),
            detail: None,
            tips: Vec::new(),
        }
    }

    /// Add a detail line below the error message.
    pub fn detail(mut self, text: &str) -> Self {
        self.detail = Some(text.to_string());
        self
    }

    /// Add a tip with optional example commands.
    pub fn tip(mut self, description: &str, commands: &[&str]) -> Self {
        self.tips.push((
            description.to_string(),
            commands.iter().map(|s| s.to_string()).collect(),
        ));
        self
    }

    /// Print the diagnostic to stderr with colored formatting.
    pub fn print(&self) {
        eprint!("{}{}", "error".red().bold(), ": ".bold());
        eprintln!("{}", self.message);

        if let Some(detail) = &self.detail {
            eprintln!("  {}", detail);
        }

        for (description, commands) in &self.tips {
            eprintln!();
            eprint!("  {}{}", "tip".yellow().bold(), ": ".bold());
            eprintln!("{}", description);
            for cmd in commands {
                eprintln!("      {}", cmd);
            }
        }
    }
}

/// Main error type for the awsctl application
#[derive(Error, Debug)]
pub enum AwsCtlError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Profile '{name}' not found")]
    ProfileNotFound { name: String },

    #[error("No region configured")]
    MissingRegion,

    #[error("Unknown operation {service}:{operation}")]
    UnknownOperation { service: String, operation: String },

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("File error for '{path}': {message}")]
    FileError { path: String, message: String },

    /// A remote or local failure reported by the engine
    #[error("{0}")]
    Invocation(CoreError),

    #[error("Output formatting error: {message}")]
    OutputError { message: String },
}

/// Result type for awsctl operations
pub type Result<T> = std::result::Result<T, AwsCtlError>;

impl AwsCtlError {
    /// Get helpful suggestions for resolving this error
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            AwsCtlError::ProfileNotFound { name } => vec![
                "List available profiles: awsctl profile list".to_string(),
                format!(
                    "Create profile '{}': awsctl profile set {} --region <region>",
                    name, name
                ),
            ],
            AwsCtlError::MissingRegion => vec![
                "Pass --region <region>".to_string(),
                "Set AWS_REGION or AWS_DEFAULT_REGION".to_string(),
                "Store one in the profile: awsctl profile set <name> --region <region>"
                    .to_string(),
            ],
            AwsCtlError::UnknownOperation { service, .. } => vec![
                format!("List operations: awsctl operations list --service {}", service),
                "List services: awsctl operations services".to_string(),
            ],
            AwsCtlError::InvalidInput { .. } => vec![
                "Check the command syntax: awsctl <command> --help".to_string(),
            ],
            AwsCtlError::FileError { path, .. } => vec![
                format!("Check that file exists: {}", path),
                "Verify file permissions are correct".to_string(),
            ],
            AwsCtlError::Invocation(err) => invocation_suggestions(err),
            _ => vec![],
        }
    }

    /// Print a cargo-style diagnostic to stderr using colored formatting.
    pub fn print_diagnostic(&self) {
        let mut diag = CliDiagnostic::error(&format!("{}", self));

        if let AwsCtlError::Invocation(err) = self
            && let Some(source) = std::error::Error::source(err)
        {
            diag = diag.detail(&format!("caused by: {}", source));
        }

        for suggestion in self.suggestions() {
            diag = diag.tip(&suggestion, &[]);
        }

        diag.print();
    }
}

fn invocation_suggestions(err: &CoreError) -> Vec<String> {
    if let CoreError::Client(ClientError::Credentials(_)) = err {
        return vec![
            "Store credentials: awsctl profile set <name> --access-key-id <id> --secret-access-key <secret>"
                .to_string(),
            "Or export AWS_ACCESS_KEY_ID and AWS_SECRET_ACCESS_KEY".to_string(),
        ];
    }
    if err.is_network() {
        return vec![
            "Check the region: --region <region> or awsctl profile show <profile>".to_string(),
            "Check --endpoint-url if you target a local emulator".to_string(),
        ];
    }
    if err.is_unauthorized() {
        return vec![
            "Check your credentials: awsctl profile show <profile>".to_string(),
            "Verify AWS_ACCESS_KEY_ID and AWS_SECRET_ACCESS_KEY if set".to_string(),
        ];
    }
    if err.is_throttling() {
        return vec!["Wait and retry, or lower --max-pages".to_string()];
    }
    if err.is_not_found() {
        return vec!["Verify the resource name and region are correct".to_string()];
    }
    match err {
        CoreError::UnknownParameter { operation, .. } => {
            let (service, name) = operation
                .split_once(':')
                .unwrap_or(("<service>", operation.as_str()));
            vec![format!(
                "List parameters: awsctl operations describe {} {}",
                service, name
            )]
        }
        _ => vec![],
    }
}

impl From<CoreError> for AwsCtlError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::UnknownOperation { service, operation } => {
                AwsCtlError::UnknownOperation { service, operation }
            }
            CoreError::Config(message) => AwsCtlError::Configuration(message),
            other => AwsCtlError::Invocation(other),
        }
    }
}

impl From<ConfigError> for AwsCtlError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::ProfileNotFound { name } => AwsCtlError::ProfileNotFound { name },
            other => AwsCtlError::Configuration(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for AwsCtlError {
    fn from(err: serde_json::Error) -> Self {
        AwsCtlError::OutputError {
            message: format!("JSON error: {}", err),
        }
    }
}

impl From<std::io::Error> for AwsCtlError {
    fn from(err: std::io::Error) -> Self {
        AwsCtlError::OutputError {
            message: format!("IO error: {}", err),
        }
    }
}

impl From<anyhow::Error> for AwsCtlError {
    fn from(err: anyhow::Error) -> Self {
        AwsCtlError::OutputError {
            message: format!("{:#}", err),
        }
    }
}
