//! Newtype identifiers carried alongside a prompt.
//!
//! The host pipeline hands us a session identifier and a working directory.
//! Neither is interpreted by the decision engine; they are wrapped in distinct
//! newtypes so that they cannot be swapped by accident when they are logged.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Value used when the host omits an opaque field from the input envelope.
pub const UNKNOWN_SENTINEL: &str = "unknown";

// ---------------------------------------------------------------------------
// Macro for opaque String-wrapped newtypes supplied by the host.
// Generates: struct, unknown(), from_optional(), as_str(), Default (the
// sentinel), Display.
// ---------------------------------------------------------------------------
macro_rules! opaque_id {
    (
        $(#[$attr:meta])*
        $name:ident
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            /// The sentinel used when the host did not supply a value.
            pub fn unknown() -> Self {
                Self(UNKNOWN_SENTINEL.to_string())
            }

            /// Wraps an optional host-supplied value, substituting the sentinel
            /// only when it is missing. A present value is kept as sent, even
            /// when empty.
            pub fn from_optional(value: Option<String>) -> Self {
                value.map(Self).unwrap_or_else(Self::unknown)
            }

            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::unknown()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

opaque_id! {
    /// Identifies the host conversation the prompt was submitted in.
    SessionId
}

opaque_id! {
    /// The working directory of the host session, as reported by the host.
    ///
    /// Kept as a string: the path is never opened or canonicalised here.
    WorkingDirectory
}

// ---------------------------------------------------------------------------

/// Identifies a single decision cycle (one process invocation).
///
/// Generated fresh for every invocation and attached to the decision span so
/// every log line written during one run can be correlated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InvocationId(Uuid);

impl InvocationId {
    /// Generates a new random invocation identifier.
    pub fn new_random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for InvocationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_values_become_the_sentinel() {
        assert_eq!(SessionId::from_optional(None).as_str(), "unknown");
        assert_eq!(WorkingDirectory::from_optional(None), WorkingDirectory::default());
    }

    #[test]
    fn present_empty_values_are_kept_as_sent() {
        assert_eq!(SessionId::from_optional(Some(String::new())).as_str(), "");
        assert_eq!(
            WorkingDirectory::from_optional(Some(String::new())).as_str(),
            ""
        );
        assert_eq!(
            WorkingDirectory::from_optional(Some("/tmp/project".into())).as_str(),
            "/tmp/project"
        );
    }

    #[test]
    fn invocation_ids_are_unique() {
        assert_ne!(InvocationId::new_random(), InvocationId::new_random());
    }
}
