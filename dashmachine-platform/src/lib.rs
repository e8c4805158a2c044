//! Platform access layer for dashmachine.
//!
//! Wraps a ledger client behind a small, retrying surface:
//!
//! - **Connection**: one session per logical operation, with bounded
//!   connect retry
//! - **Documents**: find, submit (retried, optionally deduplicated) and
//!   wait-for-visibility polling
//! - **Names**: username to identity and public key resolution
//!
//! The ledger client itself is abstracted by [`PlatformClient`] and
//! [`ClientFactory`]. [`mock::MockPlatform`] is an in-memory implementation
//! for tests.
//!
//! # Example
//!
//! ```
//! use dashmachine_platform::mock::MockPlatform;
//! use dashmachine_platform::{Connection, ConnectionConfig, NameResolver};
//! use std::sync::Arc;
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let platform = MockPlatform::new();
//! let alice = platform.register_user("alice");
//!
//! let config = ConnectionConfig::default().with_app("dpns", MockPlatform::naming_contract());
//! let mut conn = Connection::new(Arc::new(platform), config, alice.seed.as_str().into());
//! conn.connect().await.unwrap();
//!
//! let record = NameResolver::default().resolve_user("Alice", &conn).await.unwrap();
//! assert_eq!(record.unwrap().identity_id, alice.identity_id);
//! conn.disconnect().await.unwrap();
//! # });
//! ```

pub mod client;
pub mod connection;
pub mod documents;
mod error;
pub mod mock;
pub mod names;
pub mod retry;

pub use client::{AccountSeed, ClientFactory, ClientOptions, PlatformClient, SigningKeyPath};
pub use connection::{Connection, ConnectionConfig, ConnectionState, DEFAULT_MAX_RETRIES};
pub use documents::{WaitOptions, WaitOutcome, SUBMIT_ATTEMPTS};
pub use error::{ClientError, ClientResult, PlatformError, PlatformResult};
pub use names::{NameRecord, NameResolver, NamingConfig};
