//! Exception taxonomy translator
//!
//! Two directions over the same static field declarations:
//!
//! - native to host ([`Bridge::convert_exception`]): resolve the host class
//!   named after the native scoped name, instantiate it and copy every
//!   declared field; fall back to the generic unknown classes carrying the
//!   rendered diagnostic when no class resolves.
//! - host to native ([`Bridge::to_native_exception`]): classify the instance
//!   against the user and local hierarchies, rebuild recognised local kinds
//!   field by field, and reduce everything else to an unknown kind carrying
//!   a diagnostic string. This direction is total.
//!
//! [`Bridge::convert_exception`]: crate::Bridge::convert_exception
//! [`Bridge::to_native_exception`]: crate::Bridge::to_native_exception

mod to_host;
mod to_native;

pub(crate) use to_native::USER_NAME_METHOD;

/// Display name used when a host type cannot be stringified
const UNKNOWN_TYPE_NAME: &str = "<unknown>";

/// Display text used when a host instance cannot be stringified
const UNPRINTABLE: &str = "<unprintable>";
