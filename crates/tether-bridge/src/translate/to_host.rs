use tether_rpc::{FieldValue, RpcException};

use crate::bridge::Bridge;
use crate::error::{HostErr, HostResult};
use crate::handle::Handle;
use crate::ident::scope_to_host_name;
use crate::lock::HostToken;

impl Bridge {
    /// Convert a native exception to a host exception instance.
    ///
    /// The host class is looked up from the exception's scoped name. When it
    /// resolves, it is instantiated without arguments and every structural
    /// field is copied onto the same-named attribute; instantiation failures
    /// propagate. Otherwise the generic class for the exception's category
    /// (unknown local, unknown user, or unknown) is used and its `unknown`
    /// attribute is set to the rendered exception.
    ///
    /// # Panics
    ///
    /// Panics if the generic fallback class is needed but not registered.
    pub fn convert_exception<'h>(
        &self,
        py: HostToken<'h>,
        ex: &RpcException,
    ) -> HostResult<'h, Handle<'h>> {
        let host_name = scope_to_host_name(ex.scoped_name());
        if let Some(class) = self.lookup_type(py, &host_name) {
            let instance = class.call0()?;
            for (name, value) in ex.fields() {
                instance.setattr(name, &self.field_to_host(py, &value)?)?;
            }
            return Ok(instance);
        }

        let types = &self.config().types;
        let fallback = match ex {
            RpcException::Local(_) => &types.unknown_local,
            RpcException::User(_) => &types.unknown_user,
            RpcException::Runtime(_) => &types.unknown,
        };
        log::debug!("no host type '{}', raising as '{}'", host_name, fallback);

        let instance = self.require_type(py, fallback).call0()?;
        instance.setattr("unknown", &Handle::new_str(py, &ex.to_string())?)?;
        Ok(instance)
    }

    /// Convert a native exception into a host error.
    ///
    /// If the conversion itself fails, its failure is the error returned.
    pub fn host_err<'h>(&self, py: HostToken<'h>, ex: &RpcException) -> HostErr<'h> {
        match self.convert_exception(py, ex) {
            Ok(instance) => HostErr::from_instance(instance),
            Err(err) => err,
        }
    }

    /// Raise a native exception into the host as the active error
    pub fn set_host_exception(&self, py: HostToken<'_>, ex: &RpcException) {
        self.host_err(py, ex).restore();
    }

    fn field_to_host<'h>(
        &self,
        py: HostToken<'h>,
        value: &FieldValue<'_>,
    ) -> HostResult<'h, Handle<'h>> {
        match *value {
            FieldValue::Str(s) => Handle::new_str(py, s),
            FieldValue::Int(i) => Handle::new_int(py, i),
            FieldValue::Identity(id) => self.identity_to_host(py, id),
        }
    }
}
