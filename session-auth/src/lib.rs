//! # session-auth
//!
//! Client-side session handling for the taskdeck API:
//! - Persisted credential pair (access + refresh token) behind a key-value store
//! - Authenticated requests with a one-shot refresh-and-retry on 401
//! - HTTP client building
//!
//! ## Usage
//!
//! ```rust,ignore
//! use session_auth::{
//!     http::ClientBuilder,
//!     session::{Manager, RequestOptions},
//!     store::MemoryStore,
//! };
//!
//! let client = ClientBuilder::new().build()?;
//! let manager = Manager::new(client, "http://localhost:3000/v1", Arc::new(MemoryStore::new()))?;
//! let response = manager
//!     .authenticated_request(&manager.endpoint("todo")?, RequestOptions::get())
//!     .await?;
//! ```

pub mod error;
pub mod http;
pub mod session;
pub mod store;

// Re-export commonly used types
pub use error::{Error, ErrorKind};
