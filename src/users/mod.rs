//! The `users` resource.
//!
//! # Data Flow
//! ```text
//! HTTP handler (http module)
//!     → model.rs (typed payloads, validated during deserialization)
//!     → store.rs (worker-owned, insertion-ordered collection)
//!     → post-mutation snapshot published to the cluster (cluster module)
//! ```
//!
//! # Design Decisions
//! - The store holds no validation logic; payload checks live at the HTTP
//!   boundary where they can produce precise error responses
//! - Each worker process owns one store exclusively; replication replaces
//!   the whole collection instead of merging

pub mod model;
pub mod store;

pub use model::{NewUser, User, UserPatch};
pub use store::UserStore;
