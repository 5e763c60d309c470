use tether_rpc::{
    FieldType, LocalException, LocalKind, OwnedFieldValue, RpcException, UnknownKind,
};

use super::{UNKNOWN_TYPE_NAME, UNPRINTABLE};
use crate::bridge::Bridge;
use crate::error::HostErr;
use crate::handle::Handle;
use crate::ident::host_name_to_scope;
use crate::lock::HostToken;

/// Method a host user exception may define to report its own name
pub(crate) const USER_NAME_METHOD: &str = "rpc_name";

impl Bridge {
    /// Convert a host exception instance to a native exception.
    ///
    /// With `exc` absent the host's active error is fetched and cleared.
    /// Never fails: instances outside both hierarchies, and a missing active
    /// error, become an unknown exception.
    ///
    /// # Panics
    ///
    /// Panics if the configured local or user base type is not registered.
    pub fn to_native_exception<'h>(
        &self,
        py: HostToken<'h>,
        exc: Option<&Handle<'h>>,
    ) -> RpcException {
        match exc {
            Some(instance) => self.translate_instance(instance),
            None => match HostErr::fetch(py) {
                Some(err) => self.translate_instance(err.instance()),
                None => {
                    log::debug!("no active host error to translate");
                    LocalException::unknown(UnknownKind::Unknown, "unknown host exception").into()
                }
            },
        }
    }

    /// Convert a host exception and return it as the native error.
    ///
    /// Always returns `Err`, so callers can write
    /// `return bridge.throw_host_exception(py, None)`.
    pub fn throw_host_exception<'h, T>(
        &self,
        py: HostToken<'h>,
        exc: Option<&Handle<'h>>,
    ) -> Result<T, RpcException> {
        Err(self.to_native_exception(py, exc))
    }

    fn translate_instance(&self, instance: &Handle<'_>) -> RpcException {
        let py = instance.token();
        let types = &self.config().types;
        let class = instance.get_type();

        let user = self.require_type(py, &types.user);
        if instance.is_instance(&user).unwrap_or(false) {
            let name = match instance
                .call_method0(USER_NAME_METHOD)
                .and_then(|name| name.extract_str())
            {
                Ok(name) => name,
                Err(_) => type_display_name(&class),
            };
            return LocalException::unknown(UnknownKind::User, name).into();
        }

        let local = self.require_type(py, &types.local);
        if instance.is_instance(&local).unwrap_or(false) {
            let type_name = type_display_name(&class);
            return match LocalKind::from_scoped_name(&host_name_to_scope(&type_name)) {
                Some(kind) => self.local_from_host(instance, kind).into(),
                None => {
                    log::debug!("host local exception '{}' has no native kind", type_name);
                    LocalException::unknown(UnknownKind::Local, type_name).into()
                }
            };
        }

        let type_name = type_display_name(&class);
        let message = instance.str().unwrap_or_else(|_| UNPRINTABLE.to_string());
        let diagnostic = if message.is_empty() {
            type_name
        } else {
            format!("{}: {}", type_name, message)
        };
        log::debug!("host exception outside the rpc hierarchies: {}", diagnostic);
        LocalException::unknown(UnknownKind::Unknown, diagnostic).into()
    }

    fn local_from_host(&self, instance: &Handle<'_>, kind: LocalKind) -> LocalException {
        let mut ex = LocalException::new(kind);
        for field in kind.fields() {
            let attr = match instance.getattr_opt(field.name) {
                Some(attr) if !attr.is_none() => attr,
                _ => continue,
            };
            let value = match field.ty {
                FieldType::Str if attr.is_str() => attr.extract_str().ok().map(OwnedFieldValue::Str),
                FieldType::Int if attr.is_int() => attr.extract_int().ok().map(OwnedFieldValue::Int),
                FieldType::Identity if self.is_identity(&attr) => {
                    match self.host_to_identity(&attr) {
                        Ok(id) => Some(OwnedFieldValue::Identity(id)),
                        Err(err) => {
                            log::warn!(
                                "ignoring invalid identity in {}.{}: {}",
                                kind.name(),
                                field.name,
                                err
                            );
                            None
                        }
                    }
                }
                _ => None,
            };
            if let Some(value) = value {
                if !ex.set_field(field.name, value) {
                    log::debug!("{}.{} out of range, left at default", kind.name(), field.name);
                }
            }
        }
        ex
    }
}

fn type_display_name(class: &Handle<'_>) -> String {
    class.str().unwrap_or_else(|_| UNKNOWN_TYPE_NAME.to_string())
}
