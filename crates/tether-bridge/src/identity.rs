//! Identity record conversion and the host-facing identity helpers

use tether_rpc::{generate_uuid, identity_to_string, string_to_identity, Identity, RpcException};

use crate::bridge::Bridge;
use crate::error::{value_error, HostResult};
use crate::handle::Handle;
use crate::lock::HostToken;

impl Bridge {
    /// Build a host identity record.
    ///
    /// # Panics
    ///
    /// Panics if the configured identity type is not registered.
    pub fn identity_to_host<'h>(
        &self,
        py: HostToken<'h>,
        ident: &Identity,
    ) -> HostResult<'h, Handle<'h>> {
        let class = self.require_type(py, &self.config().types.identity);
        let obj = class.call0()?;
        obj.setattr("name", &Handle::new_str(py, &ident.name)?)?;
        obj.setattr("category", &Handle::new_str(py, &ident.category)?)?;
        Ok(obj)
    }

    /// Read a host identity record.
    ///
    /// Both fields must be strings; a missing field raises `AttributeError`.
    pub fn host_to_identity<'h>(&self, obj: &Handle<'h>) -> HostResult<'h, Identity> {
        let py = obj.token();
        let name = obj.getattr("name")?;
        if !name.is_str() {
            return Err(value_error(py, "identity name must be a string"));
        }
        let category = obj.getattr("category")?;
        if !category.is_str() {
            return Err(value_error(py, "identity category must be a string"));
        }
        Ok(Identity::new(name.extract_str()?, category.extract_str()?))
    }

    /// Is `obj` an instance of the host identity type
    ///
    /// # Panics
    ///
    /// Panics if the configured identity type is not registered.
    pub fn is_identity(&self, obj: &Handle<'_>) -> bool {
        let class = self.require_type(obj.token(), &self.config().types.identity);
        obj.is_instance(&class).unwrap_or(false)
    }

    /// Stringify a host identity record
    pub fn host_identity_to_string<'h>(&self, obj: &Handle<'h>) -> HostResult<'h, Handle<'h>> {
        let ident = self.host_to_identity(obj)?;
        Handle::new_str(obj.token(), &identity_to_string(&ident))
    }

    /// Parse a host string into a host identity record.
    ///
    /// A malformed identity is raised as the host counterpart of the native
    /// parse exception.
    pub fn host_string_to_identity<'h>(&self, s: &Handle<'h>) -> HostResult<'h, Handle<'h>> {
        let py = s.token();
        let text = s.extract_str()?;
        match string_to_identity(&text) {
            Ok(ident) => self.identity_to_host(py, &ident),
            Err(err) => Err(self.host_err(py, &RpcException::Local(err.into()))),
        }
    }

    /// A fresh random UUID as a host string
    pub fn host_generate_uuid<'h>(&self, py: HostToken<'h>) -> HostResult<'h, Handle<'h>> {
        Handle::new_str(py, &generate_uuid())
    }
}
