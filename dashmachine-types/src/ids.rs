//! Identifier types used throughout dashmachine.
//!
//! The platform assigns identifiers as opaque base58 strings. They are kept
//! as validated newtypes so an identity id can never be passed where a
//! contract id is expected.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Alphabet used by the platform for identifiers.
const BASE58_ALPHABET: &str = "123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

fn validate(kind: &'static str, s: &str) -> Result<()> {
    if s.is_empty() {
        return Err(Error::InvalidId {
            kind,
            reason: "empty".to_string(),
        });
    }
    if let Some(c) = s.chars().find(|c| !BASE58_ALPHABET.contains(*c)) {
        return Err(Error::InvalidId {
            kind,
            reason: format!("invalid character {c:?}"),
        });
    }
    Ok(())
}

macro_rules! platform_id {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Parses and validates an identifier.
            pub fn parse(s: &str) -> Result<Self> {
                validate($kind, s)?;
                Ok(Self(s.to_string()))
            }

            /// Returns the identifier as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl FromStr for $name {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self> {
                Self::parse(s)
            }
        }

        impl TryFrom<String> for $name {
            type Error = Error;

            fn try_from(s: String) -> Result<Self> {
                validate($kind, &s)?;
                Ok(Self(s))
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> String {
                id.0
            }
        }
    };
}

platform_id!(
    /// Identifier of an identity (an account record holding public keys).
    IdentityId,
    "identity"
);

platform_id!(
    /// Identifier of a data contract (the schema a document validates against).
    ContractId,
    "contract"
);

platform_id!(
    /// Identifier of a document, assigned by the network on creation.
    DocumentId,
    "document"
);
