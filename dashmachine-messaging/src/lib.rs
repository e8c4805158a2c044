//! Username-addressed encrypted messaging for dashmachine.
//!
//! [`Messenger`] resolves both parties of a message through the naming
//! registry, using the local account's signing key as its own private key
//! and the other party's registered public key, then seals or opens the
//! payload with `dashmachine-crypto`.
//!
//! # Example
//!
//! ```
//! use dashmachine_messaging::{Messenger, MessagingConfig};
//! use dashmachine_platform::mock::MockPlatform;
//! use std::sync::Arc;
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let platform = MockPlatform::new();
//! let alice = platform.register_user("alice");
//! let bob = platform.register_user("bob");
//! let contract = MockPlatform::naming_contract();
//!
//! let messenger = Messenger::new(Arc::new(platform), MessagingConfig::default());
//! let sealed = messenger
//!     .encrypt_for_username("hello", "alice", "bob", &alice.seed.as_str().into(), &contract)
//!     .await
//!     .unwrap();
//! let opened = messenger
//!     .decrypt_for_username(&sealed, "bob", "alice", &bob.seed.as_str().into(), &contract)
//!     .await
//!     .unwrap();
//! assert_eq!(opened, "hello");
//! # });
//! ```

mod config;
mod error;
mod messenger;

pub use config::MessagingConfig;
pub use error::{MessagingError, MessagingResult};
pub use messenger::Messenger;
