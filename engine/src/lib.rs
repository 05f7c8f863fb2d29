//! Batch incineration pipeline.
//!
//! # Architecture
//!
//! ```text
//! Coordinator::run()
//!   -> Backend::fetch()            one read, must succeed or the run aborts
//!   -> select_matches()            degradation == 0 and a string id
//!   -> Backend::dispatch() x N     tokio tasks in a JoinSet, gated by a Semaphore
//!   -> join barrier                every unit reports back before the summary
//! ```
//!
//! [`Backend`] is the seam between orchestration and IO. The HTTP
//! implementation is [`incinerator_client::ApiClient`]; tests substitute
//! in-memory fakes.

mod backend;
mod coordinator;

pub use backend::{Backend, BackendFut};
pub use coordinator::{Coordinator, CoordinatorOptions};

pub use incinerator_client::{self, ApiClient};
pub use incinerator_types::{self, DispatchFailure, RunSummary};
