//! The users HTTP API, served by every worker (and by standalone mode).
//!
//! # Data Flow
//! ```text
//! Incoming request
//!     → server.rs (explicit axum route table)
//!     → handlers.rs (id + body validation, store calls)
//!     → response.rs ({ "data": ... } / { "error": ... } envelopes)
//!     → on mutation: snapshot published through the Replicator
//! ```
//!
//! # Design Decisions
//! - Explicit route table instead of pattern matching on raw paths; the
//!   fallbacks make unmatched routes (404) and wrong verbs (405) first-class
//! - The store is injected through axum state, never a process-wide global
//! - Every error is mapped to the JSON envelope at this boundary; nothing
//!   propagates far enough to take the worker down

pub mod handlers;
pub mod response;
pub mod server;

pub use response::ApiError;
pub use server::{ApiServer, AppState};
