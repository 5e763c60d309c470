//! Closed taxonomy of native local exceptions
//!
//! Every local exception kind the runtime can raise is listed here exactly
//! once, with its scoped name, its parent in the native hierarchy and the
//! static list of structural fields it carries. The bridge copies fields by
//! iterating these declarations; nothing is discovered at run time.

/// Scope that owns every native exception kind
pub const RPC_SCOPE: &str = "Rpc";

/// Scoped name of the root of all local exceptions
pub const LOCAL_EXCEPTION_SCOPED_NAME: &str = "::Rpc::LocalException";

/// Scoped name of the root of all user exceptions
pub const USER_EXCEPTION_SCOPED_NAME: &str = "::Rpc::UserException";

/// Wire-independent type of a structural field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    /// UTF-8 string
    Str,
    /// Signed integer
    Int,
    /// Nested [`Identity`](crate::Identity) record
    Identity,
}

/// Declaration of one structural field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// Attribute name on both sides of the bridge
    pub name: &'static str,
    /// Field type, selects the converter
    pub ty: FieldType,
}

impl FieldSpec {
    const fn string(name: &'static str) -> Self {
        Self { name, ty: FieldType::Str }
    }

    const fn int(name: &'static str) -> Self {
        Self { name, ty: FieldType::Int }
    }

    const fn identity(name: &'static str) -> Self {
        Self { name, ty: FieldType::Identity }
    }
}

const NO_FIELDS: &[FieldSpec] = &[];
const UNKNOWN_FIELDS: &[FieldSpec] = &[FieldSpec::string("unknown")];
const NAME_FIELDS: &[FieldSpec] = &[FieldSpec::string("name")];
const ADAPTER_ID_FIELDS: &[FieldSpec] = &[FieldSpec::string("id")];
const PROXY_FIELDS: &[FieldSpec] = &[FieldSpec::string("proxy")];
const PARSE_FIELDS: &[FieldSpec] = &[FieldSpec::string("str")];
const ILLEGAL_IDENTITY_FIELDS: &[FieldSpec] = &[FieldSpec::identity("id")];
const REQUEST_FAILED_FIELDS: &[FieldSpec] = &[
    FieldSpec::identity("id"),
    FieldSpec::string("facet"),
    FieldSpec::string("operation"),
];
const SYSCALL_FIELDS: &[FieldSpec] = &[FieldSpec::int("error")];
const DNS_FIELDS: &[FieldSpec] = &[FieldSpec::int("error"), FieldSpec::string("host")];
const VERSION_FIELDS: &[FieldSpec] = &[
    FieldSpec::string("reason"),
    FieldSpec::int("badMajor"),
    FieldSpec::int("badMinor"),
    FieldSpec::int("major"),
    FieldSpec::int("minor"),
];
const REASON_FIELDS: &[FieldSpec] = &[FieldSpec::string("reason")];
const NO_FACTORY_FIELDS: &[FieldSpec] = &[FieldSpec::string("reason"), FieldSpec::string("type")];
const REGISTRATION_FIELDS: &[FieldSpec] =
    &[FieldSpec::string("kindOfObject"), FieldSpec::string("id")];
const OPERATION_FIELDS: &[FieldSpec] = &[FieldSpec::string("operation")];

macro_rules! local_kinds {
    ($(
        $(#[$doc:meta])*
        $kind:ident => $name:literal, $parent:expr, $fields:expr, $description:literal;
    )+) => {
        /// Tag of a native local exception kind
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum LocalKind {
            $( $(#[$doc])* $kind, )+
        }

        impl LocalKind {
            /// Every kind, parents before children
            pub const ALL: &'static [LocalKind] = &[$(LocalKind::$kind),+];

            /// Unscoped name, e.g. `ObjectNotExistException`
            pub const fn name(self) -> &'static str {
                match self {
                    $(LocalKind::$kind => $name,)+
                }
            }

            /// Fully scoped name, e.g. `::Rpc::ObjectNotExistException`
            pub const fn scoped_name(self) -> &'static str {
                match self {
                    $(LocalKind::$kind => concat!("::Rpc::", $name),)+
                }
            }

            /// Direct parent; `None` means the kind derives from the local
            /// exception root
            pub const fn parent(self) -> Option<LocalKind> {
                match self {
                    $(LocalKind::$kind => $parent,)+
                }
            }

            /// Structural fields, in declaration order
            pub const fn fields(self) -> &'static [FieldSpec] {
                match self {
                    $(LocalKind::$kind => $fields,)+
                }
            }

            /// One-line human description used in diagnostics
            pub const fn description(self) -> &'static str {
                match self {
                    $(LocalKind::$kind => $description,)+
                }
            }
        }
    };
}

local_kinds! {
    /// Catch-all for failures with no structural counterpart
    Unknown => "UnknownException", None, UNKNOWN_FIELDS, "unknown exception";
    /// A local exception the peer could not map
    UnknownLocal => "UnknownLocalException", Some(LocalKind::Unknown), UNKNOWN_FIELDS,
        "unknown local exception";
    /// A user exception the peer could not map
    UnknownUser => "UnknownUserException", Some(LocalKind::Unknown), UNKNOWN_FIELDS,
        "unknown user exception";
    ObjectAdapterDeactivated => "ObjectAdapterDeactivatedException", None, NAME_FIELDS,
        "object adapter deactivated";
    ObjectAdapterIdInUse => "ObjectAdapterIdInUseException", None, ADAPTER_ID_FIELDS,
        "object adapter id already in use";
    NoEndpoint => "NoEndpointException", None, PROXY_FIELDS, "no suitable endpoint available";
    EndpointParse => "EndpointParseException", None, PARSE_FIELDS, "error parsing endpoint";
    IdentityParse => "IdentityParseException", None, PARSE_FIELDS, "error parsing identity";
    ProxyParse => "ProxyParseException", None, PARSE_FIELDS, "error parsing proxy";
    IllegalIdentity => "IllegalIdentityException", None, ILLEGAL_IDENTITY_FIELDS,
        "illegal identity";
    RequestFailed => "RequestFailedException", None, REQUEST_FAILED_FIELDS, "request failed";
    ObjectNotExist => "ObjectNotExistException", Some(LocalKind::RequestFailed),
        REQUEST_FAILED_FIELDS, "object does not exist";
    FacetNotExist => "FacetNotExistException", Some(LocalKind::RequestFailed),
        REQUEST_FAILED_FIELDS, "facet does not exist";
    OperationNotExist => "OperationNotExistException", Some(LocalKind::RequestFailed),
        REQUEST_FAILED_FIELDS, "operation does not exist";
    Syscall => "SyscallException", None, SYSCALL_FIELDS, "system call failed";
    Socket => "SocketException", Some(LocalKind::Syscall), SYSCALL_FIELDS, "socket failure";
    ConnectFailed => "ConnectFailedException", Some(LocalKind::Socket), SYSCALL_FIELDS,
        "connect failed";
    ConnectionRefused => "ConnectionRefusedException", Some(LocalKind::ConnectFailed),
        SYSCALL_FIELDS, "connection refused";
    ConnectionLost => "ConnectionLostException", Some(LocalKind::Socket), SYSCALL_FIELDS,
        "connection lost";
    Dns => "DNSException", None, DNS_FIELDS, "DNS lookup failed";
    Protocol => "ProtocolException", None, REASON_FIELDS, "protocol error";
    UnsupportedProtocol => "UnsupportedProtocolException", Some(LocalKind::Protocol),
        VERSION_FIELDS, "unsupported protocol version";
    UnsupportedEncoding => "UnsupportedEncodingException", Some(LocalKind::Protocol),
        VERSION_FIELDS, "unsupported encoding version";
    Marshal => "MarshalException", Some(LocalKind::Protocol), REASON_FIELDS,
        "marshaling error";
    MemoryLimit => "MemoryLimitException", Some(LocalKind::Marshal), REASON_FIELDS,
        "memory limit exceeded";
    UnmarshalOutOfBounds => "UnmarshalOutOfBoundsException", Some(LocalKind::Marshal),
        REASON_FIELDS, "unmarshaling out of bounds";
    NoObjectFactory => "NoObjectFactoryException", Some(LocalKind::Marshal),
        NO_FACTORY_FIELDS, "no object factory registered";
    PluginInitialization => "PluginInitializationException", None, REASON_FIELDS,
        "plug-in initialization failed";
    AlreadyRegistered => "AlreadyRegisteredException", None, REGISTRATION_FIELDS,
        "already registered";
    NotRegistered => "NotRegisteredException", None, REGISTRATION_FIELDS, "not registered";
    TwowayOnly => "TwowayOnlyException", None, OPERATION_FIELDS,
        "operation can only be invoked with a twoway request";
    CommunicatorDestroyed => "CommunicatorDestroyedException", None, NO_FIELDS,
        "communicator destroyed";
    Timeout => "TimeoutException", None, NO_FIELDS, "timeout while sending or receiving data";
    ConnectTimeout => "ConnectTimeoutException", Some(LocalKind::Timeout), NO_FIELDS,
        "timeout while establishing a connection";
    CloseTimeout => "CloseTimeoutException", Some(LocalKind::Timeout), NO_FIELDS,
        "timeout while closing a connection";
}

impl LocalKind {
    /// Find a kind by scoped name
    pub fn from_scoped_name(scoped: &str) -> Option<LocalKind> {
        LocalKind::ALL.iter().copied().find(|k| k.scoped_name() == scoped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parents_listed_first() {
        for (i, kind) in LocalKind::ALL.iter().enumerate() {
            if let Some(parent) = kind.parent() {
                let pos = LocalKind::ALL.iter().position(|k| *k == parent).unwrap();
                assert!(pos < i, "{:?} listed before its parent", kind);
            }
        }
    }

    #[test]
    fn test_names_are_unique() {
        let mut names: Vec<_> = LocalKind::ALL.iter().map(|k| k.name()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), LocalKind::ALL.len());
    }

    #[test]
    fn test_scoped_names() {
        assert_eq!(
            LocalKind::ObjectNotExist.scoped_name(),
            "::Rpc::ObjectNotExistException"
        );
        assert_eq!(LocalKind::Dns.scoped_name(), "::Rpc::DNSException");
        assert_eq!(
            LocalKind::from_scoped_name("::Rpc::FacetNotExistException"),
            Some(LocalKind::FacetNotExist)
        );
        assert_eq!(LocalKind::from_scoped_name("::Rpc::NoSuchException"), None);
        assert_eq!(LocalKind::from_scoped_name("FacetNotExistException"), None);
    }

    #[test]
    fn test_hierarchy() {
        assert_eq!(
            LocalKind::ObjectNotExist.parent(),
            Some(LocalKind::RequestFailed)
        );
        assert_eq!(LocalKind::RequestFailed.parent(), None);
        assert_eq!(
            LocalKind::NoObjectFactory.parent(),
            Some(LocalKind::Marshal)
        );
        assert_eq!(LocalKind::Dns.parent(), None);
    }

    #[test]
    fn test_derived_kinds_share_parent_fields() {
        assert_eq!(
            LocalKind::ObjectNotExist.fields(),
            LocalKind::RequestFailed.fields()
        );
        assert_eq!(LocalKind::UnknownUser.fields(), LocalKind::Unknown.fields());
        assert!(LocalKind::Timeout.fields().is_empty());
    }
}
