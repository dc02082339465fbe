//! forge
//!
//! Abstraction for the remote forge (GitHub).
//!
//! # Architecture
//!
//! The `Forge` trait defines the handful of REST operations this tool
//! needs. Commands build a [`github::GitHubForge`] and drive it through the
//! operations in [`ops`]; tests drive the same operations through
//! [`mock::MockForge`].
//!
//! # Modules
//!
//! - `traits`: Core `Forge` trait and request/response types
//! - [`github`]: GitHub implementation using the REST API
//! - [`http`]: Authenticated JSON transport shared with the release feed
//! - [`retry`]: Timeout and retry policy
//! - [`ops`]: Fetch file content, open pull request, create remote branch
//! - [`mock`]: Mock implementation for deterministic testing

pub mod github;
pub mod http;
pub mod mock;
pub mod ops;
pub mod retry;
mod traits;

pub use retry::RetryPolicy;
pub use traits::*;
