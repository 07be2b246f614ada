//! One invocation, end to end
//!
//! [`Invoker::invoke`] resolves the bound parameters, applies the confirmation gate,
//! builds the request, then streams pages into an [`OutputSink`]. It never returns an
//! error: remote and local failures become a failure [`Envelope`] and the returned
//! [`Completion`] says how it ended.

use futures::StreamExt;
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::client::ServiceClient;
use crate::confirm::{Confirmer, should_proceed};
use crate::dispatch::{CancelHandle, Dispatcher};
use crate::envelope::{
    Envelope, NOTE_NEXT_TOKEN, NOTE_PAGE_NUMBER, NOTE_WARNINGS, OutputSink, Selector,
};
use crate::error::CoreError;
use crate::operation::OperationSpec;
use crate::pagination::{PaginationMode, paginate};
use crate::params::ParamSet;
use crate::request::RequestBuilder;
use crate::session::SessionConfig;

/// Per-invocation switches
#[derive(Debug, Clone, Default)]
pub struct InvocationOptions {
    pub mode: PaginationMode,
    /// Skip the confirmation prompt for mutating operations
    pub force: bool,
    /// Overrides the operation's default selector
    pub select: Option<Selector>,
    /// Stop auto-pagination after this many pages
    pub max_pages: Option<usize>,
    /// Items requested per page, for operations with a page size member
    pub page_size: Option<u32>,
    pub cancel: Option<CancelHandle>,
}

/// Everything one invocation needs; built once, consumed by [`Invoker::invoke`]
#[derive(Debug, Clone)]
pub struct InvocationContext {
    pub operation: &'static OperationSpec,
    pub params: ParamSet,
    pub session: SessionConfig,
    pub options: InvocationOptions,
}

impl InvocationContext {
    pub fn new(operation: &'static OperationSpec, params: ParamSet, session: SessionConfig) -> Self {
        Self {
            operation,
            params,
            session,
            options: InvocationOptions::default(),
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: InvocationOptions) -> Self {
        self.options = options;
        self
    }

    #[must_use]
    pub fn with_mode(mut self, mode: PaginationMode) -> Self {
        self.options.mode = mode;
        self
    }

    #[must_use]
    pub fn with_force(mut self, force: bool) -> Self {
        self.options.force = force;
        self
    }

    #[must_use]
    pub fn with_select(mut self, select: Selector) -> Self {
        self.options.select = Some(select);
        self
    }

    #[must_use]
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.options.page_size = Some(page_size);
        self
    }
}

/// How an invocation ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// A mutating operation was not confirmed; no remote call was made
    Declined,
    /// All requested pages were emitted
    Completed { pages: usize },
    /// A failure envelope was emitted after `pages_emitted` successful pages
    Failed { pages_emitted: usize },
}

impl Completion {
    pub fn is_failure(&self) -> bool {
        matches!(self, Completion::Failed { .. })
    }
}

/// Runs invocations against one client with one confirmation policy
pub struct Invoker<'a> {
    client: &'a dyn ServiceClient,
    confirmer: &'a dyn Confirmer,
}

impl<'a> Invoker<'a> {
    pub fn new(client: &'a dyn ServiceClient, confirmer: &'a dyn Confirmer) -> Self {
        Self { client, confirmer }
    }

    pub async fn invoke<S>(&self, ctx: InvocationContext, sink: &mut S) -> Completion
    where
        S: OutputSink + ?Sized,
    {
        let InvocationContext {
            operation,
            params,
            session,
            options,
        } = ctx;
        let name = operation.qualified_name();

        let params = match params.resolve(operation) {
            Ok(params) => params,
            Err(err) => {
                error!("{}: {}", name, err);
                sink.emit(Envelope::failure(err));
                return Completion::Failed { pages_emitted: 0 };
            }
        };

        if !should_proceed(operation, &params, options.force, self.confirmer) {
            info!("{} was not confirmed; skipping", name);
            return Completion::Declined;
        }

        let mut request = RequestBuilder::new(operation).build(&params);
        if let Some(size) = options.page_size {
            match operation.page_size_member() {
                // An explicitly bound limit wins
                Some(member) if request.contains(member) => {
                    debug!("{} bound by the caller; page size {} ignored", member, size);
                }
                Some(member) => request.set_member(member, Some(Value::from(size))),
                None => warn!("{} has no page size setting; ignoring it", name),
            }
        }
        let warnings: Vec<Value> = request
            .warnings
            .iter()
            .cloned()
            .map(Value::String)
            .collect();
        let selector = options
            .select
            .clone()
            .unwrap_or_else(|| Selector::for_operation(operation));

        let mut dispatcher = Dispatcher::new(self.client);
        if let Some(cancel) = options.cancel {
            dispatcher = dispatcher.with_cancel(cancel);
        }

        let pages = paginate(
            &dispatcher,
            operation,
            &session,
            request,
            options.mode,
            options.max_pages,
        );
        futures::pin_mut!(pages);

        let mut emitted = 0;
        while let Some(page) = pages.next().await {
            match page {
                Ok(page) => {
                    let payload = selector.apply(&page.response, &params);
                    let mut envelope = Envelope::success(payload, page.response)
                        .with_note(NOTE_PAGE_NUMBER, page.number);
                    if operation.is_paginated() {
                        envelope = envelope
                            .with_note(NOTE_NEXT_TOKEN, page.next_token.unwrap_or_default());
                    }
                    if emitted == 0 && !warnings.is_empty() {
                        envelope = envelope.with_note(NOTE_WARNINGS, warnings.clone());
                    }
                    sink.emit(envelope);
                    emitted += 1;
                }
                Err(err) => {
                    error!("{} failed after {} page(s): {}", name, emitted, err);
                    sink.emit(Envelope::failure(err));
                    return Completion::Failed {
                        pages_emitted: emitted,
                    };
                }
            }
        }

        debug!("{} completed with {} page(s)", name, emitted);
        Completion::Completed { pages: emitted }
    }

    /// Blocking form of [`invoke`](Self::invoke) for synchronous callers
    ///
    /// Runs on a private current-thread runtime. Called from within an async
    /// context it makes no call and reports a failure envelope instead.
    pub fn invoke_blocking<S>(&self, ctx: InvocationContext, sink: &mut S) -> Completion
    where
        S: OutputSink + ?Sized,
    {
        if tokio::runtime::Handle::try_current().is_ok() {
            let name = ctx.operation.qualified_name();
            error!("{}: blocking invocation inside an async runtime", name);
            sink.emit(Envelope::failure(CoreError::Runtime(format!(
                "{} was invoked with invoke_blocking from inside an async runtime; use invoke instead",
                name
            ))));
            return Completion::Failed { pages_emitted: 0 };
        }
        let runtime = match tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                sink.emit(Envelope::failure(CoreError::Runtime(err.to_string())));
                return Completion::Failed { pages_emitted: 0 };
            }
        };
        runtime.block_on(self.invoke(ctx, sink))
    }
}
