//! Continuation-token pagination
//!
//! ```text
//! Start -> FetchPage -> (EmitPage -> FetchPage)* -> Done
//! ```
//!
//! Auto mode keeps fetching until the service returns no token (or an empty one).
//! Manual mode fetches exactly one page, starting from the caller's token if given,
//! and leaves the next token for the caller. Pages are yielded as they arrive; an error
//! ends the stream after being yielded.

use futures::stream::{self, Stream};
use serde_json::Value;
use tracing::{debug, warn};

use crate::dispatch::Dispatcher;
use crate::error::Result;
use crate::operation::OperationSpec;
use crate::request::BuiltRequest;
use crate::session::SessionConfig;

/// How many pages to fetch
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PaginationMode {
    /// Follow continuation tokens until the service reports no more pages
    #[default]
    Auto,
    /// Fetch one page, optionally starting from a caller-supplied token
    Manual(Option<String>),
}

impl PaginationMode {
    pub fn is_auto(&self) -> bool {
        matches!(self, PaginationMode::Auto)
    }

    fn starting_token(&self) -> Option<String> {
        match self {
            PaginationMode::Auto => None,
            PaginationMode::Manual(token) => token.clone().filter(|t| !t.is_empty()),
        }
    }
}

/// One fetched page
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    /// 1-based
    pub number: usize,
    pub response: Value,
    /// Token for the following page; `None` when the service reported none
    pub next_token: Option<String>,
}

struct Pager<'a> {
    dispatcher: &'a Dispatcher<'a>,
    operation: &'a OperationSpec,
    session: &'a SessionConfig,
    request: BuiltRequest,
    mode: PaginationMode,
    max_pages: Option<usize>,
    token: Option<String>,
    fetched: usize,
    done: bool,
}

impl Pager<'_> {
    async fn fetch(&mut self) -> Result<Page> {
        let spec = self.operation.pagination;
        if let Some(spec) = spec {
            self.request
                .set_member(spec.input_token, self.token.clone().map(Value::String));
        }

        let response = match self
            .dispatcher
            .call(self.operation, self.session, self.request.to_value())
            .await
        {
            Ok(response) => response,
            Err(err) => {
                self.done = true;
                return Err(err);
            }
        };
        self.fetched += 1;

        let mut next_token = spec.and_then(|s| token_in(&response, s.output_token));
        let sent = self.token.take();

        // Getting back the token that was sent means the listing is exhausted
        if next_token.is_some() && next_token == sent {
            warn!(
                "{} returned the same continuation token it was given; stopping",
                self.operation.qualified_name()
            );
            next_token = None;
        }

        self.done = match (&self.mode, spec) {
            (_, None) | (PaginationMode::Manual(_), _) => true,
            (PaginationMode::Auto, Some(_)) => match &next_token {
                None => true,
                Some(_) => self.max_pages.is_some_and(|max| self.fetched >= max),
            },
        };
        debug!(
            page = self.fetched,
            more = next_token.is_some(),
            "Fetched page of {}",
            self.operation.qualified_name()
        );

        self.token = next_token.clone();
        Ok(Page {
            number: self.fetched,
            response,
            next_token,
        })
    }
}

/// Non-empty string token at `member`, if present
fn token_in(response: &Value, member: &str) -> Option<String> {
    response
        .get(member)
        .and_then(Value::as_str)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

/// Stream the pages of one invocation
///
/// Operations without a pagination spec yield exactly one page regardless of mode.
pub fn paginate<'a>(
    dispatcher: &'a Dispatcher<'a>,
    operation: &'a OperationSpec,
    session: &'a SessionConfig,
    request: BuiltRequest,
    mode: PaginationMode,
    max_pages: Option<usize>,
) -> impl Stream<Item = Result<Page>> + 'a {
    let pager = Pager {
        dispatcher,
        operation,
        session,
        request,
        token: mode.starting_token(),
        mode,
        max_pages: max_pages.filter(|m| *m > 0),
        fetched: 0,
        done: false,
    };

    stream::unfold(pager, |mut pager| async move {
        if pager.done {
            return None;
        }
        let page = pager.fetch().await;
        Some((page, pager))
    })
}
