//! `awsctl invoke`: bind, confirm, call, page, print

use std::io::{self, Write};

use awsctl_core::params::parse_assignment;
use awsctl_core::{
    CancelHandle, Completion, ConfirmRequest, Confirmer, CoreError, Envelope, HttpServiceClient,
    InvocationContext, InvocationOptions, Invoker, OutputSink, PaginationMode, ParamSet,
    Selector, catalog,
};
use colored::Colorize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::cli::{InvokeArgs, OutputFormat as CliOutputFormat};
use crate::commands::read_file_input;
use crate::connection::{ConnectionManager, SessionOverrides};
use crate::error::{AwsCtlError, Result as CliResult};
use crate::output::{self, OutputFormat};

/// Asks on the terminal before anything is changed
pub struct TerminalConfirm;

impl Confirmer for TerminalConfirm {
    fn confirm(&self, request: &ConfirmRequest) -> bool {
        eprint!("{}. Are you sure? [y/N]: ", request.prompt());
        if io::stderr().flush().is_err() {
            return false;
        }

        let mut input = String::new();
        if io::stdin().read_line(&mut input).is_err() {
            return false;
        }
        is_yes(&input)
    }
}

fn is_yes(input: &str) -> bool {
    let answer = input.trim();
    answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes")
}

/// Prints envelopes as they arrive
///
/// Payloads go to stdout; failures are rendered as diagnostics on stderr unless
/// `--envelope` asks for the raw envelopes.
pub struct TerminalSink<'a> {
    format: OutputFormat,
    query: Option<&'a str>,
    raw_envelopes: bool,
    last_token: Option<String>,
    render_failed: bool,
}

impl<'a> TerminalSink<'a> {
    pub fn new(format: OutputFormat, query: Option<&'a str>, raw_envelopes: bool) -> Self {
        Self {
            format,
            query,
            raw_envelopes,
            last_token: None,
            render_failed: false,
        }
    }

    /// Token of the most recent page, if the listing can be continued
    pub fn resume_token(&self) -> Option<&str> {
        self.last_token.as_deref().filter(|t| !t.is_empty())
    }

    fn print(&mut self, value: Value) {
        let rendered =
            output::apply_query(value, self.query).and_then(|v| output::render(&v, self.format));
        match rendered {
            Ok(text) => println!("{}", text),
            Err(e) => {
                self.render_failed = true;
                AwsCtlError::from(e).print_diagnostic();
            }
        }
    }
}

impl OutputSink for TerminalSink<'_> {
    fn emit(&mut self, envelope: Envelope) {
        if let Some(token) = envelope.next_token() {
            self.last_token = Some(token.to_string());
        }

        if self.raw_envelopes {
            match serde_json::to_value(&envelope) {
                Ok(value) => self.print(value),
                Err(e) => {
                    self.render_failed = true;
                    AwsCtlError::from(e).print_diagnostic();
                }
            }
            return;
        }

        match envelope {
            Envelope::Success { payload, .. } => self.print(payload),
            Envelope::Failure { error } => AwsCtlError::from(error).print_diagnostic(),
        }
    }
}

/// Collect parameters from `--params-json` and `-P`; `-P` wins on conflicts
fn collect_params(args: &InvokeArgs) -> CliResult<ParamSet> {
    let mut params = match &args.params_json {
        Some(raw) => {
            let text = read_file_input(raw)?;
            match serde_json::from_str::<Value>(&text) {
                Ok(Value::Object(map)) => ParamSet::from_json_object(map),
                Ok(_) => {
                    return Err(AwsCtlError::InvalidInput {
                        message: "--params-json must be a JSON object".to_string(),
                    });
                }
                Err(e) => {
                    return Err(AwsCtlError::InvalidInput {
                        message: format!("--params-json is not valid JSON: {}", e),
                    });
                }
            }
        }
        None => ParamSet::new(),
    };

    for raw in &args.params {
        let (name, value) = parse_assignment(raw)?;
        params.bind(name, value);
    }
    Ok(params)
}

/// `--next-token` or `--no-auto-iteration` put the caller in charge of paging
fn pagination_mode(args: &InvokeArgs) -> PaginationMode {
    if args.no_auto_iteration || args.next_token.is_some() {
        PaginationMode::Manual(args.next_token.clone())
    } else {
        PaginationMode::Auto
    }
}

/// Run one invocation; `Ok(false)` means a failure was already reported
pub async fn handle_invoke(
    args: &InvokeArgs,
    conn_mgr: &ConnectionManager,
    overrides: &SessionOverrides,
    output_format: CliOutputFormat,
    query: Option<&str>,
) -> CliResult<bool> {
    let operation = catalog::lookup(&args.service, &args.operation)?;
    let params = collect_params(args)?;
    let session = conn_mgr.session(overrides)?;
    debug!(
        "Invoking {} with {} bound parameter(s) in {}",
        operation.qualified_name(),
        params.len(),
        session.region
    );

    let cancel = CancelHandle::new();
    let options = InvocationOptions {
        mode: pagination_mode(args),
        force: args.force,
        select: args.select.as_deref().map(Selector::parse),
        max_pages: args.max_pages.map(|n| n as usize),
        page_size: args.page_size,
        cancel: Some(cancel.clone()),
    };
    let ctx = InvocationContext::new(operation, params, session).with_options(options);

    let client = HttpServiceClient::new().map_err(CoreError::from)?;
    let format = OutputFormat::resolve(output_format, OutputFormat::Json);
    let mut sink = TerminalSink::new(format, query, args.envelope);

    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling the in-flight call");
            cancel.cancel();
        }
    });
    let completion = Invoker::new(&client, &TerminalConfirm)
        .invoke(ctx, &mut sink)
        .await;
    interrupt.abort();

    match completion {
        Completion::Declined => {
            eprintln!("{}", "Operation cancelled; nothing was changed".yellow());
        }
        Completion::Completed { pages } => {
            info!("{} completed with {} page(s)", operation.qualified_name(), pages);
            if let Some(token) = sink.resume_token() {
                eprintln!(
                    "{} awsctl invoke {} {} --next-token {}",
                    "More results available:".yellow(),
                    operation.service.id,
                    operation.name,
                    token
                );
            }
        }
        Completion::Failed { pages_emitted } => {
            info!(
                "{} failed after {} page(s)",
                operation.qualified_name(),
                pages_emitted
            );
        }
    }

    Ok(!completion.is_failure() && !sink.render_failed)
}
