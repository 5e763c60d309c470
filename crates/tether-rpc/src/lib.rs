//! Tether RPC - native data model
//!
//! The native half of the bridge: object identities and request contexts,
//! the closed taxonomy of local exceptions with their structural fields, and
//! the open extension point for application-defined user exceptions.

#![warn(missing_docs)]

pub mod exception;
pub mod identity;
pub mod kind;

pub use exception::{
    FieldValue, LocalException, OwnedFieldValue, ParseKind, PlainKind, ReasonKind,
    RegistrationKind, RequestFailedKind, RpcException, RuntimeException, SyscallKind,
    UnknownKind, UserException, VersionKind,
};
pub use identity::{
    identity_to_string, string_to_identity, Context, Identity, IdentityParseError, StringSeq,
};
pub use kind::{
    FieldSpec, FieldType, LocalKind, LOCAL_EXCEPTION_SCOPED_NAME, RPC_SCOPE,
    USER_EXCEPTION_SCOPED_NAME,
};

/// Generate a random (version 4) UUID in hyphenated lowercase form
pub fn generate_uuid() -> String {
    uuid::Uuid::new_v4().hyphenated().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_uuid_shape() {
        let id = generate_uuid();
        assert_eq!(id.len(), 36);
        assert_eq!(id.matches('-').count(), 4);
        assert_eq!(id.as_bytes()[14], b'4');
        assert_ne!(id, generate_uuid());
    }
}
