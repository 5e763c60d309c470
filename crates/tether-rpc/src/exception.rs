//! Native exception values
//!
//! `RpcException` is a tagged variant over the closed set of local kinds
//! (`LocalException`), an open extension case for application-defined user
//! exceptions, and a catch-all for runtime failures that belong to neither
//! hierarchy.

use std::fmt;

use crate::identity::{identity_to_string, Identity, IdentityParseError};
use crate::kind::{FieldType, LocalKind};

/// Borrowed view of a structural field value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldValue<'a> {
    /// String field
    Str(&'a str),
    /// Integer field
    Int(i64),
    /// Identity field
    Identity(&'a Identity),
}

impl FieldValue<'_> {
    /// Declared type of this value
    pub fn ty(&self) -> FieldType {
        match self {
            FieldValue::Str(_) => FieldType::Str,
            FieldValue::Int(_) => FieldType::Int,
            FieldValue::Identity(_) => FieldType::Identity,
        }
    }

    /// Copy into an owned value
    pub fn to_owned_value(&self) -> OwnedFieldValue {
        match *self {
            FieldValue::Str(s) => OwnedFieldValue::Str(s.to_string()),
            FieldValue::Int(i) => OwnedFieldValue::Int(i),
            FieldValue::Identity(id) => OwnedFieldValue::Identity(id.clone()),
        }
    }
}

impl fmt::Display for FieldValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Str(s) => f.write_str(s),
            FieldValue::Int(i) => write!(f, "{}", i),
            FieldValue::Identity(id) => f.write_str(&identity_to_string(id)),
        }
    }
}

/// Owned structural field value, used when rebuilding an exception
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OwnedFieldValue {
    /// String field
    Str(String),
    /// Integer field
    Int(i64),
    /// Identity field
    Identity(Identity),
}

impl OwnedFieldValue {
    /// Declared type of this value
    pub fn ty(&self) -> FieldType {
        match self {
            OwnedFieldValue::Str(_) => FieldType::Str,
            OwnedFieldValue::Int(_) => FieldType::Int,
            OwnedFieldValue::Identity(_) => FieldType::Identity,
        }
    }
}

macro_rules! sub_kind {
    ($(#[$doc:meta])* $name:ident { $($variant:ident => $local:ident),+ $(,)? }) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $(
                #[doc = concat!("`", stringify!($local), "` kind")]
                $variant,
            )+
        }

        impl $name {
            /// Flat taxonomy tag
            pub const fn local_kind(self) -> LocalKind {
                match self {
                    $($name::$variant => LocalKind::$local,)+
                }
            }
        }

        impl From<$name> for LocalKind {
            fn from(kind: $name) -> LocalKind {
                kind.local_kind()
            }
        }
    };
}

sub_kind!(
    /// Members of the unknown family
    UnknownKind { Unknown => Unknown, Local => UnknownLocal, User => UnknownUser }
);
sub_kind!(
    /// Members of the parse-failure family
    ParseKind { Endpoint => EndpointParse, Identity => IdentityParse, Proxy => ProxyParse }
);
sub_kind!(
    /// Members of the request-failed family
    RequestFailedKind {
        RequestFailed => RequestFailed,
        ObjectNotExist => ObjectNotExist,
        FacetNotExist => FacetNotExist,
        OperationNotExist => OperationNotExist,
    }
);
sub_kind!(
    /// Members of the system-call family
    SyscallKind {
        Syscall => Syscall,
        Socket => Socket,
        ConnectFailed => ConnectFailed,
        ConnectionRefused => ConnectionRefused,
        ConnectionLost => ConnectionLost,
    }
);
sub_kind!(
    /// Version-mismatch kinds
    VersionKind { Protocol => UnsupportedProtocol, Encoding => UnsupportedEncoding }
);
sub_kind!(
    /// Kinds carrying only a reason string
    ReasonKind {
        Protocol => Protocol,
        Marshal => Marshal,
        MemoryLimit => MemoryLimit,
        UnmarshalOutOfBounds => UnmarshalOutOfBounds,
        PluginInitialization => PluginInitialization,
    }
);
sub_kind!(
    /// Registration failures
    RegistrationKind { AlreadyRegistered => AlreadyRegistered, NotRegistered => NotRegistered }
);
sub_kind!(
    /// Kinds without structural fields
    PlainKind {
        CommunicatorDestroyed => CommunicatorDestroyed,
        Timeout => Timeout,
        ConnectTimeout => ConnectTimeout,
        CloseTimeout => CloseTimeout,
    }
);

/// A native local exception, one variant per structural shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocalException {
    /// `unknown`
    Unknown {
        /// Family member
        kind: UnknownKind,
        /// Diagnostic text
        unknown: String,
    },
    /// `name`
    AdapterDeactivated {
        /// Adapter name
        name: String,
    },
    /// `id`
    AdapterIdInUse {
        /// Adapter id
        id: String,
    },
    /// `proxy`
    NoEndpoint {
        /// Stringified proxy
        proxy: String,
    },
    /// `str`
    Parse {
        /// Family member
        kind: ParseKind,
        /// Text that failed to parse
        str: String,
    },
    /// `id`
    IllegalIdentity {
        /// The offending identity
        id: Identity,
    },
    /// `id`, `facet`, `operation`
    RequestFailed {
        /// Family member
        kind: RequestFailedKind,
        /// Target identity
        id: Identity,
        /// Target facet
        facet: String,
        /// Operation name
        operation: String,
    },
    /// `error`
    Syscall {
        /// Family member
        kind: SyscallKind,
        /// OS error code
        error: i32,
    },
    /// `error`, `host`
    Dns {
        /// Resolver error code
        error: i32,
        /// Host being resolved
        host: String,
    },
    /// `reason`, `badMajor`, `badMinor`, `major`, `minor`
    VersionMismatch {
        /// Protocol or encoding
        kind: VersionKind,
        /// Explanation
        reason: String,
        /// Received major version
        bad_major: i32,
        /// Received minor version
        bad_minor: i32,
        /// Supported major version
        major: i32,
        /// Supported minor version
        minor: i32,
    },
    /// `reason`
    Reason {
        /// Family member
        kind: ReasonKind,
        /// Explanation
        reason: String,
    },
    /// `reason`, `type`
    NoObjectFactory {
        /// Explanation
        reason: String,
        /// Type id with no factory
        type_id: String,
    },
    /// `kindOfObject`, `id`
    Registration {
        /// Already or not registered
        kind: RegistrationKind,
        /// What kind of object
        kind_of_object: String,
        /// Its id
        id: String,
    },
    /// `operation`
    TwowayOnly {
        /// Operation name
        operation: String,
    },
    /// No fields
    Plain {
        /// Which kind
        kind: PlainKind,
    },
}

impl LocalException {
    /// A default-initialized exception of the given kind
    pub fn new(kind: LocalKind) -> Self {
        use LocalKind as K;
        let unknown = |kind| LocalException::Unknown {
            kind,
            unknown: String::new(),
        };
        let parse = |kind| LocalException::Parse {
            kind,
            str: String::new(),
        };
        let request_failed = |kind| LocalException::RequestFailed {
            kind,
            id: Identity::default(),
            facet: String::new(),
            operation: String::new(),
        };
        let syscall = |kind| LocalException::Syscall { kind, error: 0 };
        let version = |kind| LocalException::VersionMismatch {
            kind,
            reason: String::new(),
            bad_major: 0,
            bad_minor: 0,
            major: 0,
            minor: 0,
        };
        let reason = |kind| LocalException::Reason {
            kind,
            reason: String::new(),
        };
        let registration = |kind| LocalException::Registration {
            kind,
            kind_of_object: String::new(),
            id: String::new(),
        };
        let plain = |kind| LocalException::Plain { kind };

        match kind {
            K::Unknown => unknown(UnknownKind::Unknown),
            K::UnknownLocal => unknown(UnknownKind::Local),
            K::UnknownUser => unknown(UnknownKind::User),
            K::ObjectAdapterDeactivated => LocalException::AdapterDeactivated {
                name: String::new(),
            },
            K::ObjectAdapterIdInUse => LocalException::AdapterIdInUse { id: String::new() },
            K::NoEndpoint => LocalException::NoEndpoint {
                proxy: String::new(),
            },
            K::EndpointParse => parse(ParseKind::Endpoint),
            K::IdentityParse => parse(ParseKind::Identity),
            K::ProxyParse => parse(ParseKind::Proxy),
            K::IllegalIdentity => LocalException::IllegalIdentity {
                id: Identity::default(),
            },
            K::RequestFailed => request_failed(RequestFailedKind::RequestFailed),
            K::ObjectNotExist => request_failed(RequestFailedKind::ObjectNotExist),
            K::FacetNotExist => request_failed(RequestFailedKind::FacetNotExist),
            K::OperationNotExist => request_failed(RequestFailedKind::OperationNotExist),
            K::Syscall => syscall(SyscallKind::Syscall),
            K::Socket => syscall(SyscallKind::Socket),
            K::ConnectFailed => syscall(SyscallKind::ConnectFailed),
            K::ConnectionRefused => syscall(SyscallKind::ConnectionRefused),
            K::ConnectionLost => syscall(SyscallKind::ConnectionLost),
            K::Dns => LocalException::Dns {
                error: 0,
                host: String::new(),
            },
            K::Protocol => reason(ReasonKind::Protocol),
            K::UnsupportedProtocol => version(VersionKind::Protocol),
            K::UnsupportedEncoding => version(VersionKind::Encoding),
            K::Marshal => reason(ReasonKind::Marshal),
            K::MemoryLimit => reason(ReasonKind::MemoryLimit),
            K::UnmarshalOutOfBounds => reason(ReasonKind::UnmarshalOutOfBounds),
            K::NoObjectFactory => LocalException::NoObjectFactory {
                reason: String::new(),
                type_id: String::new(),
            },
            K::PluginInitialization => reason(ReasonKind::PluginInitialization),
            K::AlreadyRegistered => registration(RegistrationKind::AlreadyRegistered),
            K::NotRegistered => registration(RegistrationKind::NotRegistered),
            K::TwowayOnly => LocalException::TwowayOnly {
                operation: String::new(),
            },
            K::CommunicatorDestroyed => plain(PlainKind::CommunicatorDestroyed),
            K::Timeout => plain(PlainKind::Timeout),
            K::ConnectTimeout => plain(PlainKind::ConnectTimeout),
            K::CloseTimeout => plain(PlainKind::CloseTimeout),
        }
    }

    /// Unknown-family exception with a diagnostic
    pub fn unknown(kind: UnknownKind, unknown: impl Into<String>) -> Self {
        LocalException::Unknown {
            kind,
            unknown: unknown.into(),
        }
    }

    /// Request-failed-family exception
    pub fn request_failed(
        kind: RequestFailedKind,
        id: Identity,
        facet: impl Into<String>,
        operation: impl Into<String>,
    ) -> Self {
        LocalException::RequestFailed {
            kind,
            id,
            facet: facet.into(),
            operation: operation.into(),
        }
    }

    /// The most-derived kind of this exception
    pub fn kind(&self) -> LocalKind {
        match self {
            LocalException::Unknown { kind, .. } => kind.local_kind(),
            LocalException::AdapterDeactivated { .. } => LocalKind::ObjectAdapterDeactivated,
            LocalException::AdapterIdInUse { .. } => LocalKind::ObjectAdapterIdInUse,
            LocalException::NoEndpoint { .. } => LocalKind::NoEndpoint,
            LocalException::Parse { kind, .. } => kind.local_kind(),
            LocalException::IllegalIdentity { .. } => LocalKind::IllegalIdentity,
            LocalException::RequestFailed { kind, .. } => kind.local_kind(),
            LocalException::Syscall { kind, .. } => kind.local_kind(),
            LocalException::Dns { .. } => LocalKind::Dns,
            LocalException::VersionMismatch { kind, .. } => kind.local_kind(),
            LocalException::Reason { kind, .. } => kind.local_kind(),
            LocalException::NoObjectFactory { .. } => LocalKind::NoObjectFactory,
            LocalException::Registration { kind, .. } => kind.local_kind(),
            LocalException::TwowayOnly { .. } => LocalKind::TwowayOnly,
            LocalException::Plain { kind } => kind.local_kind(),
        }
    }

    /// Fully scoped name of the most-derived kind
    pub fn scoped_name(&self) -> &'static str {
        self.kind().scoped_name()
    }

    /// Structural field values, in the order of `self.kind().fields()`
    pub fn fields(&self) -> Vec<(&'static str, FieldValue<'_>)> {
        use FieldValue::{Identity as Id, Int, Str};
        match self {
            LocalException::Unknown { unknown, .. } => vec![("unknown", Str(unknown))],
            LocalException::AdapterDeactivated { name } => vec![("name", Str(name))],
            LocalException::AdapterIdInUse { id } => vec![("id", Str(id))],
            LocalException::NoEndpoint { proxy } => vec![("proxy", Str(proxy))],
            LocalException::Parse { str, .. } => vec![("str", Str(str))],
            LocalException::IllegalIdentity { id } => vec![("id", Id(id))],
            LocalException::RequestFailed {
                id,
                facet,
                operation,
                ..
            } => vec![("id", Id(id)), ("facet", Str(facet)), ("operation", Str(operation))],
            LocalException::Syscall { error, .. } => vec![("error", Int(*error as i64))],
            LocalException::Dns { error, host } => {
                vec![("error", Int(*error as i64)), ("host", Str(host))]
            }
            LocalException::VersionMismatch {
                reason,
                bad_major,
                bad_minor,
                major,
                minor,
                ..
            } => vec![
                ("reason", Str(reason)),
                ("badMajor", Int(*bad_major as i64)),
                ("badMinor", Int(*bad_minor as i64)),
                ("major", Int(*major as i64)),
                ("minor", Int(*minor as i64)),
            ],
            LocalException::Reason { reason, .. } => vec![("reason", Str(reason))],
            LocalException::NoObjectFactory { reason, type_id } => {
                vec![("reason", Str(reason)), ("type", Str(type_id))]
            }
            LocalException::Registration {
                kind_of_object, id, ..
            } => vec![("kindOfObject", Str(kind_of_object)), ("id", Str(id))],
            LocalException::TwowayOnly { operation } => vec![("operation", Str(operation))],
            LocalException::Plain { .. } => Vec::new(),
        }
    }

    /// Overwrite one structural field.
    ///
    /// Returns `false`, leaving the exception untouched, when the kind has
    /// no such field, the value has the wrong type, or an integer does not
    /// fit the field.
    pub fn set_field(&mut self, name: &str, value: OwnedFieldValue) -> bool {
        use OwnedFieldValue::{Identity as Id, Int, Str};

        fn narrow(slot: &mut i32, value: i64) -> bool {
            match i32::try_from(value) {
                Ok(v) => {
                    *slot = v;
                    true
                }
                Err(_) => false,
            }
        }

        match (self, name, value) {
            (LocalException::Unknown { unknown, .. }, "unknown", Str(v)) => *unknown = v,
            (LocalException::AdapterDeactivated { name }, "name", Str(v)) => *name = v,
            (LocalException::AdapterIdInUse { id }, "id", Str(v)) => *id = v,
            (LocalException::NoEndpoint { proxy }, "proxy", Str(v)) => *proxy = v,
            (LocalException::Parse { str, .. }, "str", Str(v)) => *str = v,
            (LocalException::IllegalIdentity { id }, "id", Id(v)) => *id = v,
            (LocalException::RequestFailed { id, .. }, "id", Id(v)) => *id = v,
            (LocalException::RequestFailed { facet, .. }, "facet", Str(v)) => *facet = v,
            (LocalException::RequestFailed { operation, .. }, "operation", Str(v)) => {
                *operation = v
            }
            (LocalException::Syscall { error, .. }, "error", Int(v)) => return narrow(error, v),
            (LocalException::Dns { error, .. }, "error", Int(v)) => return narrow(error, v),
            (LocalException::Dns { host, .. }, "host", Str(v)) => *host = v,
            (LocalException::VersionMismatch { reason, .. }, "reason", Str(v)) => *reason = v,
            (LocalException::VersionMismatch { bad_major, .. }, "badMajor", Int(v)) => {
                return narrow(bad_major, v)
            }
            (LocalException::VersionMismatch { bad_minor, .. }, "badMinor", Int(v)) => {
                return narrow(bad_minor, v)
            }
            (LocalException::VersionMismatch { major, .. }, "major", Int(v)) => {
                return narrow(major, v)
            }
            (LocalException::VersionMismatch { minor, .. }, "minor", Int(v)) => {
                return narrow(minor, v)
            }
            (LocalException::Reason { reason, .. }, "reason", Str(v)) => *reason = v,
            (LocalException::NoObjectFactory { reason, .. }, "reason", Str(v)) => *reason = v,
            (LocalException::NoObjectFactory { type_id, .. }, "type", Str(v)) => *type_id = v,
            (LocalException::Registration { kind_of_object, .. }, "kindOfObject", Str(v)) => {
                *kind_of_object = v
            }
            (LocalException::Registration { id, .. }, "id", Str(v)) => *id = v,
            (LocalException::TwowayOnly { operation }, "operation", Str(v)) => *operation = v,
            _ => return false,
        }
        true
    }
}

impl fmt::Display for LocalException {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = self.kind();
        write!(f, "{}:\n{}", display_name(kind.scoped_name()), kind.description())?;
        for (name, value) in self.fields() {
            write!(f, "\n{}: {}", name, value)?;
        }
        Ok(())
    }
}

impl From<IdentityParseError> for LocalException {
    fn from(err: IdentityParseError) -> Self {
        LocalException::Parse {
            kind: ParseKind::Identity,
            str: err.input().to_string(),
        }
    }
}

/// An application-defined exception.
///
/// The set of user exceptions is open: applications implement this trait for
/// their own types. `Display` supplies the diagnostic body.
pub trait UserException: fmt::Debug + fmt::Display + Send + Sync {
    /// Fully scoped name, e.g. `::Demo::InsufficientFunds`
    fn scoped_name(&self) -> &str;

    /// Structural fields to copy onto a host counterpart
    fn fields(&self) -> Vec<(&'static str, FieldValue<'_>)> {
        Vec::new()
    }

    /// Clone behind a box
    fn clone_box(&self) -> Box<dyn UserException>;
}

impl Clone for Box<dyn UserException> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

/// A native failure that is neither a local nor a user exception.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeException {
    scoped_name: String,
    message: String,
}

impl RuntimeException {
    /// Create a runtime failure
    pub fn new(scoped_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            scoped_name: scoped_name.into(),
            message: message.into(),
        }
    }

    /// Fully scoped name
    pub fn scoped_name(&self) -> &str {
        &self.scoped_name
    }

    /// Message
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Any native exception.
#[derive(Debug, Clone)]
pub enum RpcException {
    /// Closed local taxonomy
    Local(LocalException),
    /// Application-defined
    User(Box<dyn UserException>),
    /// Outside both hierarchies
    Runtime(RuntimeException),
}

impl RpcException {
    /// Fully scoped name of the concrete exception
    pub fn scoped_name(&self) -> &str {
        match self {
            RpcException::Local(e) => e.scoped_name(),
            RpcException::User(e) => e.scoped_name(),
            RpcException::Runtime(e) => e.scoped_name(),
        }
    }

    /// Structural fields of the concrete exception
    pub fn fields(&self) -> Vec<(&'static str, FieldValue<'_>)> {
        match self {
            RpcException::Local(e) => e.fields(),
            RpcException::User(e) => e.fields(),
            RpcException::Runtime(_) => Vec::new(),
        }
    }

    /// The local exception, if this is one
    pub fn as_local(&self) -> Option<&LocalException> {
        match self {
            RpcException::Local(e) => Some(e),
            _ => None,
        }
    }

    /// Is this an application-defined exception
    pub fn is_user(&self) -> bool {
        matches!(self, RpcException::User(_))
    }
}

impl fmt::Display for RpcException {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RpcException::Local(e) => fmt::Display::fmt(e, f),
            RpcException::User(e) => {
                f.write_str(display_name(e.scoped_name()))?;
                let body = e.to_string();
                if !body.is_empty() {
                    write!(f, ":\n{}", body)?;
                }
                Ok(())
            }
            RpcException::Runtime(e) => {
                f.write_str(display_name(&e.scoped_name))?;
                if !e.message.is_empty() {
                    write!(f, ":\n{}", e.message)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for RpcException {}

impl From<LocalException> for RpcException {
    fn from(e: LocalException) -> Self {
        RpcException::Local(e)
    }
}

impl From<RuntimeException> for RpcException {
    fn from(e: RuntimeException) -> Self {
        RpcException::Runtime(e)
    }
}

impl From<Box<dyn UserException>> for RpcException {
    fn from(e: Box<dyn UserException>) -> Self {
        RpcException::User(e)
    }
}

fn display_name(scoped: &str) -> &str {
    scoped.strip_prefix("::").unwrap_or(scoped)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone)]
    struct Overdrawn {
        balance: i64,
    }

    impl fmt::Display for Overdrawn {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "balance: {}", self.balance)
        }
    }

    impl UserException for Overdrawn {
        fn scoped_name(&self) -> &str {
            "::Bank::Overdrawn"
        }

        fn fields(&self) -> Vec<(&'static str, FieldValue<'_>)> {
            vec![("balance", FieldValue::Int(self.balance))]
        }

        fn clone_box(&self) -> Box<dyn UserException> {
            Box::new(self.clone())
        }
    }

    #[test]
    fn test_new_matches_kind_for_every_kind() {
        for kind in LocalKind::ALL {
            assert_eq!(LocalException::new(*kind).kind(), *kind);
        }
    }

    #[test]
    fn test_fields_match_declarations() {
        for kind in LocalKind::ALL {
            let ex = LocalException::new(*kind);
            let actual: Vec<_> = ex.fields().iter().map(|(n, v)| (*n, v.ty())).collect();
            let declared: Vec<_> = kind.fields().iter().map(|f| (f.name, f.ty)).collect();
            assert_eq!(actual, declared, "field mismatch for {:?}", kind);
        }
    }

    #[test]
    fn test_set_field_every_declared_field() {
        for kind in LocalKind::ALL {
            let mut ex = LocalException::new(*kind);
            for spec in kind.fields() {
                let value = match spec.ty {
                    FieldType::Str => OwnedFieldValue::Str("v".to_string()),
                    FieldType::Int => OwnedFieldValue::Int(7),
                    FieldType::Identity => OwnedFieldValue::Identity(Identity::new("n", "c")),
                };
                assert!(ex.set_field(spec.name, value), "{:?}.{}", kind, spec.name);
            }
        }
    }

    #[test]
    fn test_set_field_rejects_wrong_type_and_name() {
        let mut ex = LocalException::new(LocalKind::Dns);
        assert!(!ex.set_field("error", OwnedFieldValue::Str("x".into())));
        assert!(!ex.set_field("nope", OwnedFieldValue::Int(1)));
        assert!(!ex.set_field("error", OwnedFieldValue::Int(i64::MAX)));
        assert!(ex.set_field("error", OwnedFieldValue::Int(-3)));
        assert_eq!(
            ex,
            LocalException::Dns {
                error: -3,
                host: String::new()
            }
        );
    }

    #[test]
    fn test_local_display() {
        let ex = LocalException::request_failed(
            RequestFailedKind::ObjectNotExist,
            Identity::new("foo", "bar"),
            "f",
            "op",
        );
        assert_eq!(
            ex.to_string(),
            "Rpc::ObjectNotExistException:\nobject does not exist\nid: bar/foo\nfacet: f\noperation: op"
        );
    }

    #[test]
    fn test_user_display_and_fields() {
        let ex = RpcException::User(Box::new(Overdrawn { balance: -5 }));
        assert!(ex.is_user());
        assert_eq!(ex.scoped_name(), "::Bank::Overdrawn");
        assert_eq!(ex.to_string(), "Bank::Overdrawn:\nbalance: -5");
        assert_eq!(ex.fields(), vec![("balance", FieldValue::Int(-5))]);
        let copy = ex.clone();
        assert_eq!(copy.to_string(), ex.to_string());
    }

    #[test]
    fn test_runtime_display() {
        let ex: RpcException = RuntimeException::new("::Util::NullHandle", "").into();
        assert_eq!(ex.to_string(), "Util::NullHandle");
        let ex: RpcException = RuntimeException::new("::Util::NullHandle", "oops").into();
        assert_eq!(ex.to_string(), "Util::NullHandle:\noops");
    }

    #[test]
    fn test_identity_parse_error_converts() {
        let err = crate::string_to_identity("a/b/c").unwrap_err();
        let ex = LocalException::from(err);
        assert_eq!(ex.kind(), LocalKind::IdentityParse);
        assert_eq!(ex.fields(), vec![("str", FieldValue::Str("a/b/c"))]);
    }
}
