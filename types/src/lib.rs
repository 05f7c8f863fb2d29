//! Core domain types for Incinerator.
//!
//! This crate contains pure domain types with no IO, no async, and minimal dependencies.
//! Everything here can be used from any layer of the application.

mod matching;
mod record;
mod summary;
mod token;

pub use matching::{ItemId, MatchRule, select_matches};
pub use record::{FieldPath, NotAnObject, Record, extract};
pub use summary::{DispatchFailure, RunSummary};
pub use token::{BearerToken, EmptyTokenError};
