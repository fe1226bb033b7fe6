//! Review backend client library
//!
//! High-level async client for the game server's AI review endpoints:
//! listing and creating reviews, requesting on-demand variation analysis,
//! and subscribing to the streamed per-review updates.
//!
//! # Example
//!
//! ```no_run
//! use review_client::{RequestedKind, RestBackend, ReviewBackend};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let backend = RestBackend::new("https://example.net/api/v1")?;
//!     let reviews = backend.list_reviews(1234).await?;
//!     println!("{} reviews available", reviews.len());
//!     Ok(())
//! }
//! ```

mod error;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
mod rest;
pub mod stream;
mod traits;
mod user;

pub use error::{ClientError, ClientResult};
pub use rest::RestBackend;
pub use stream::{parse_update, RawUpdate, StreamEvent};
pub use traits::{RequestedKind, ReviewBackend, ReviewEvents};
pub use user::{ModeratorPowers, UserContext};
