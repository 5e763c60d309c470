//! Host-side exception hierarchy
//!
//! Builds the host module mirroring the native taxonomy: `LocalException`
//! and `UserException` deriving from the host's `Exception`, one class per
//! local kind under its native parent, and the `Identity` record class.
//! Class attributes carry field defaults so a bare instantiation already
//! has every declared field.

use std::sync::Arc;

use tether_rpc::{
    FieldType, LocalKind, LOCAL_EXCEPTION_SCOPED_NAME, RPC_SCOPE, USER_EXCEPTION_SCOPED_NAME,
};
use tether_sdk::{BuiltinError, HostRef, HostResult as RawResult, HostRuntime, Raised};

use crate::error::{HostResult, RaisedExt};
use crate::handle::Handle;
use crate::ident::{
    fix_identifier, scope_to_host_name, unscoped_name, HOST_SEPARATOR, SCOPE_SEPARATOR,
};
use crate::lock::HostToken;
use crate::translate::USER_NAME_METHOD;

/// Install the hierarchy module and return it.
///
/// Installing twice returns the module registered first.
pub fn install<'h>(py: HostToken<'h>) -> HostResult<'h, Handle<'h>> {
    let host = py.host();
    let module_name = scope_to_host_name(&format!("{}{}", SCOPE_SEPARATOR, RPC_SCOPE));
    if let Some(existing) = host.sys_modules_get(&module_name) {
        return Ok(Handle::from_borrowed(py, existing));
    }

    let module = Handle::wrap(py, host.new_module(&module_name))?;
    let exception = Handle::from_borrowed(py, host.builtin_error_type(BuiltinError::Exception));

    let local = define_class(
        &module,
        &module_name,
        unscoped_name(LOCAL_EXCEPTION_SCOPED_NAME),
        &[&exception],
    )?;
    let user = define_class(
        &module,
        &module_name,
        unscoped_name(USER_EXCEPTION_SCOPED_NAME),
        &[&exception],
    )?;
    let name_method = Handle::wrap(
        py,
        host.new_function(USER_NAME_METHOD, Arc::new(user_exception_name)),
    )?;
    user.setattr(USER_NAME_METHOD, &name_method)?;

    let mut classes: Vec<(LocalKind, Handle<'h>)> = Vec::with_capacity(LocalKind::ALL.len());
    for &kind in LocalKind::ALL {
        let base = kind
            .parent()
            .and_then(|parent| classes.iter().find(|(k, _)| *k == parent))
            .map(|(_, class)| class.clone())
            .unwrap_or_else(|| local.clone());
        let class = define_class(&module, &module_name, &fix_identifier(kind.name()), &[&base])?;
        for field in kind.fields() {
            let default = match field.ty {
                FieldType::Str => Handle::new_str(py, "")?,
                FieldType::Int => Handle::new_int(py, 0)?,
                FieldType::Identity => Handle::none(py),
            };
            class.setattr(field.name, &default)?;
        }
        classes.push((kind, class));
    }

    let identity = define_class(&module, &module_name, "Identity", &[])?;
    let empty = Handle::new_str(py, "")?;
    identity.setattr("name", &empty)?;
    identity.setattr("category", &empty)?;

    host.sys_modules_set(&module_name, module.as_raw())
        .adopt_err(py)?;
    log::debug!("installed host module '{}'", module_name);
    Ok(module)
}

fn define_class<'h>(
    module: &Handle<'h>,
    module_name: &str,
    name: &str,
    bases: &[&Handle<'h>],
) -> HostResult<'h, Handle<'h>> {
    let py = module.token();
    let raw: Vec<HostRef> = bases.iter().map(|base| base.as_raw()).collect();
    let class = Handle::wrap(py, py.host().new_class(module_name, name, &raw))?;
    module.setattr(name, &class)?;
    Ok(class)
}

/// `UserException.rpc_name`: the instance's class as a scoped name
fn user_exception_name(host: &dyn HostRuntime, args: &[HostRef]) -> RawResult<HostRef> {
    let receiver = match args.first() {
        Some(receiver) => *receiver,
        None => {
            return Err(Raised(host.new_error(
                BuiltinError::TypeError,
                "rpc_name() missing its receiver",
            )))
        }
    };
    let rendered = host.to_str(host.type_of(receiver))?;
    let dotted = host.str_value(rendered);
    host.decref(rendered);
    let scoped = dotted?.replace(HOST_SEPARATOR, SCOPE_SEPARATOR);
    host.new_str(&scoped)
}
