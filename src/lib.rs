//! Load-balanced users CRUD service.
//!
//! One binary, two roles:
//!
//! ```text
//!                     ┌──────────────────────────────────────────────┐
//!                     │                 PRIMARY                      │
//!     Client ─────────┼─▶ balancer (round-robin over workers)        │
//!                     │        │                      ▲              │
//!                     │        │ HTTP                 │ control      │
//!                     │        ▼                      │ socket       │
//!                     │  ┌───────────┐   sync   ┌───────────┐        │
//!                     │  │ worker 1  │◀─────────│  cluster  │        │
//!                     │  │ http +    │          │  hub      │        │
//!                     │  │ store     │─────────▶│ (fan-out) │        │
//!                     │  └───────────┘  state_  └───────────┘        │
//!                     │  ┌───────────┐  changed      │               │
//!                     │  │ worker N  │◀──────────────┘               │
//!                     │  └───────────┘                               │
//!                     └──────────────────────────────────────────────┘
//! ```
//!
//! Workers each own a private, in-memory copy of the user collection; every
//! mutation ships a full snapshot to the hub, which re-broadcasts it to the
//! whole fleet. Reads between a write and its broadcast may be stale —
//! consistency is eventual by design.

// Core subsystems
pub mod config;
pub mod http;
pub mod users;

// Traffic management
pub mod balancer;
pub mod cluster;

pub use config::ClusterConfig;
pub use http::ApiServer;
