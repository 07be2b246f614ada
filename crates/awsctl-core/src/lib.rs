//! # awsctl-core
//!
//! The engine behind `awsctl`. Every remote operation is described by a static
//! [`OperationSpec`] and executed through one generic pipeline:
//!
//! 1. **Bind** - caller-supplied values land in a [`ParamSet`]; presence in the set is
//!    the "bound" bit, independent of the value.
//! 2. **Build** - [`RequestBuilder`] turns the sparse set into a request body, omitting
//!    anything unbound and dropping nested objects that have no set sub-fields.
//! 3. **Gate** - mutating operations require confirmation or `force`.
//! 4. **Dispatch** - [`Dispatcher`] awaits the [`ServiceClient`] and applies the single
//!    network error translation rule.
//! 5. **Paginate** - list operations loop on the continuation token, streaming pages.
//! 6. **Package** - each page (or failure) becomes an [`Envelope`].
//!
//! ```rust,ignore
//! use awsctl_core::{catalog, Invoker, InvocationContext, ParamSet, AlwaysConfirm};
//!
//! let op = catalog::find("codebuild", "ListProjects").unwrap();
//! let ctx = InvocationContext::new(op, ParamSet::new(), session);
//! let mut pages = Vec::new();
//! let completion = Invoker::new(&client, &AlwaysConfirm).invoke(ctx, &mut pages).await;
//! ```

pub mod catalog;
pub mod client;
pub mod config;
pub mod confirm;
pub mod dispatch;
pub mod envelope;
pub mod error;
pub mod http;
pub mod invoke;
pub mod operation;
pub mod pagination;
pub mod params;
pub mod request;
pub mod session;

pub use client::{ClientError, ServiceClient};
pub use config::{Config, ConfigError, Profile};
pub use confirm::{AlwaysConfirm, ConfirmRequest, Confirmer, NeverConfirm};
pub use dispatch::{CancelHandle, Dispatcher};
pub use envelope::{Envelope, OutputSink, Selector};
pub use error::{CoreError, Result};
pub use http::HttpServiceClient;
pub use invoke::{Completion, InvocationContext, InvocationOptions, Invoker};
pub use operation::{ConfirmImpact, FieldKind, FieldSpec, OperationSpec, PaginationSpec, ScalarType};
pub use pagination::PaginationMode;
pub use params::ParamSet;
pub use request::{BuiltRequest, RequestBuilder};
pub use session::{Credentials, SessionConfig};
