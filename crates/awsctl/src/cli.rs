//! CLI structure and command definitions
//!
//! Every remote call goes through `invoke`; the remaining commands inspect the
//! operation catalog or manage profiles.

use awsctl_core::ConfirmImpact;
use clap::{Parser, Subcommand};

/// Generic command-line client for AWS JSON services
#[derive(Parser, Debug)]
#[command(name = "awsctl")]
#[command(version, about = "Generic CLI for AWS JSON services")]
#[command(long_about = "
Generic CLI for AWS JSON services

Every operation in the catalog is called the same way: bind parameters, confirm
anything that changes remote state, and page through results automatically.

EXAMPLES:
    # Set up a profile
    awsctl profile set dev --region eu-west-1 --access-key-id AKID --secret-access-key SECRET

    # List CodeBuild projects (all pages)
    awsctl invoke codebuild ListProjects

    # Fetch one page at a time
    awsctl invoke dynamodb ListTables --no-auto-iteration
    awsctl invoke dynamodb ListTables --next-token orders

    # Mutating operations ask first; --force skips the prompt
    awsctl invoke logs DeleteLogGroup -P LogGroupName=/app/old --force

    # Filter output with JMESPath
    awsctl invoke ssm GetParametersByPath -P Path=/app -q '[].Name'

    # Browse the catalog
    awsctl operations list --service logs
    awsctl operations describe codebuild CreateProject

For more help on a specific command, run:
    awsctl <command> --help
")]
pub struct Cli {
    /// Profile to use for this command
    #[arg(long, short, global = true, env = "AWSCTL_PROFILE")]
    pub profile: Option<String>,

    /// Region to send requests to (overrides profile and environment)
    #[arg(long, global = true)]
    pub region: Option<String>,

    /// Endpoint URL to use instead of the derived regional endpoint
    #[arg(long, global = true)]
    pub endpoint_url: Option<String>,

    /// Path to alternate configuration file
    #[arg(long, global = true, env = "AWSCTL_CONFIG_FILE")]
    pub config_file: Option<String>,

    /// Output format
    #[arg(long, short = 'o', global = true, value_enum, default_value = "auto")]
    pub output: OutputFormat,

    /// JMESPath query to filter output
    #[arg(long, short = 'q', global = true)]
    pub query: Option<String>,

    /// Enable verbose logging
    #[arg(long, short, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Automatically choose format based on command and context
    Auto,
    /// JSON output
    Json,
    /// YAML output
    Yaml,
    /// Human-readable table format
    Table,
}

/// Top-level commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Call one operation
    #[command(visible_alias = "call")]
    #[command(after_help = "EXAMPLES:
    # Parameters are Name=Value pairs; names are case-insensitive
    awsctl invoke ssm GetParameter -P Name=/app/db -P WithDecryption=true

    # Nested objects are bound field by field
    awsctl invoke codebuild CreateProject -P Name=web \\
        -P Source_Type=GITHUB -P Source_Location=https://github.com/org/web \\
        -P Artifacts_Type=NO_ARTIFACTS \\
        -P Environment_Type=LINUX_CONTAINER -P Environment_Image=aws/codebuild/standard:7.0 \\
        -P Environment_ComputeType=BUILD_GENERAL1_SMALL

    # Parameters from JSON (inline or @file); -P values win
    awsctl invoke logs PutRetentionPolicy --params-json @retention.json

    # Emit a different part of the response
    awsctl invoke codebuild ListProjects --select '*'
    awsctl invoke codebuild DeleteProject -P Name=web --select ^Name
")]
    Invoke(InvokeArgs),

    /// Browse the operation catalog
    #[command(subcommand, visible_alias = "ops")]
    Operations(OperationCommands),

    /// Profile management
    #[command(subcommand, visible_alias = "prof", visible_alias = "pr")]
    #[command(after_help = "EXAMPLES:
    # Create a profile
    awsctl profile set dev --region eu-west-1 --access-key-id AKID --secret-access-key SECRET

    # Point a profile at a local emulator
    awsctl profile set local --region us-east-1 --endpoint-url http://localhost:4566

    # List all profiles
    awsctl profile list

    # Show profile details
    awsctl profile show dev

    # Set the default profile
    awsctl profile default dev
")]
    Profile(ProfileCommands),

    /// Version information
    #[command(visible_alias = "ver", visible_alias = "v")]
    Version,

    /// Generate shell completions
    #[command(visible_alias = "comp")]
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Arguments of `awsctl invoke`
#[derive(clap::Args, Debug)]
pub struct InvokeArgs {
    /// Service id (see `awsctl operations list`)
    pub service: String,

    /// Operation name, e.g. ListProjects
    pub operation: String,

    /// Bind a parameter (repeatable)
    #[arg(short = 'P', long = "param", value_name = "NAME=VALUE")]
    pub params: Vec<String>,

    /// Parameters as a JSON object (string or @file)
    #[arg(long, value_name = "JSON")]
    pub params_json: Option<String>,

    /// Continue a listing from this token; fetches a single page
    #[arg(long)]
    pub next_token: Option<String>,

    /// Fetch only one page and report the next token
    #[arg(long)]
    pub no_auto_iteration: bool,

    /// Stop after this many pages
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub max_pages: Option<u64>,

    /// Items to request per page, for operations that accept a limit
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub page_size: Option<u32>,

    /// Part of the response to emit: '*', '^Param' or a member path
    #[arg(long)]
    pub select: Option<String>,

    /// Skip the confirmation prompt for operations that change state
    #[arg(long)]
    pub force: bool,

    /// Print the full envelope (status, payload, response, notes) for each page
    #[arg(long)]
    pub envelope: bool,
}

/// Catalog commands
#[derive(Subcommand, Debug)]
pub enum OperationCommands {
    /// List known operations
    #[command(visible_alias = "ls")]
    List {
        /// Only operations of this service
        #[arg(long, short)]
        service: Option<String>,

        /// Only operations at or above this impact
        #[arg(long, value_enum)]
        min_impact: Option<ConfirmImpact>,
    },

    /// Show the parameters of one operation
    #[command(visible_alias = "show")]
    Describe {
        /// Service id
        service: String,
        /// Operation name
        operation: String,
    },

    /// List known services
    Services,
}

/// Supported shells for completion generation
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    /// Bourne Again Shell
    Bash,
    /// Z Shell
    Zsh,
    /// Friendly Interactive Shell
    Fish,
    /// PowerShell
    #[value(name = "powershell", alias = "power-shell")]
    PowerShell,
    /// Elvish
    Elvish,
}

/// Profile management commands
#[derive(Subcommand, Debug)]
pub enum ProfileCommands {
    /// List all configured profiles
    #[command(visible_alias = "ls", visible_alias = "l")]
    List,

    /// Show the path to the configuration file
    Path,

    /// Show details of a specific profile
    #[command(visible_alias = "sh", visible_alias = "get")]
    Show {
        /// Profile name to show
        name: String,
    },

    /// Set or create a profile
    ///
    /// Only the given settings change; anything omitted keeps its current value.
    #[command(visible_alias = "add", visible_alias = "create")]
    Set {
        /// Profile name
        name: String,

        /// Default region
        #[arg(long)]
        region: Option<String>,

        /// Endpoint URL for every service (local emulators, VPC endpoints)
        #[arg(long)]
        endpoint_url: Option<String>,

        /// Access key id
        #[arg(long, requires = "secret_access_key")]
        access_key_id: Option<String>,

        /// Secret access key
        #[arg(long, requires = "access_key_id")]
        secret_access_key: Option<String>,

        /// Session token for temporary credentials
        #[arg(long)]
        session_token: Option<String>,

        /// Request timeout in seconds
        #[arg(long)]
        timeout_secs: Option<u64>,

        /// Make this the default profile
        #[arg(long)]
        default: bool,

        /// Store secrets in OS keyring instead of config file
        #[cfg(feature = "secure-storage")]
        #[arg(long)]
        use_keyring: bool,
    },

    /// Remove a profile
    #[command(visible_alias = "rm", visible_alias = "del", visible_alias = "delete")]
    Remove {
        /// Profile name to remove
        name: String,
    },

    /// Set the default profile
    #[command(name = "default", visible_alias = "def")]
    Default {
        /// Profile name to use when --profile is not given
        name: String,
    },
}
