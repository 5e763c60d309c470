//! Type registry lookup
//!
//! Resolves a dotted `module.Name` to a host class. Nothing is cached: every
//! lookup consults the host's imported-module registry and imports the
//! module when it is absent, so types from late-loaded modules are found.

use crate::handle::Handle;
use crate::lock::HostToken;

/// Resolve `name` to a host object.
///
/// Bare names are looked up in `default_module`. A module that fails to
/// import and a missing attribute both yield `None`; the import error is
/// logged and cleared. Importing runs the module's initialization code.
pub fn lookup_type<'h>(py: HostToken<'h>, name: &str, default_module: &str) -> Option<Handle<'h>> {
    let host = py.host();
    let (module_name, attr) = match name.rfind('.') {
        Some(pos) => (&name[..pos], &name[pos + 1..]),
        None => (default_module, name),
    };

    let module = match host.sys_modules_get(module_name) {
        Some(module) => Handle::from_borrowed(py, module),
        None => {
            log::debug!("importing '{}' to resolve '{}'", module_name, name);
            match Handle::wrap(py, host.import_module(module_name)) {
                Ok(module) => module,
                Err(err) => {
                    log::warn!("cannot import '{}' while resolving '{}': {}", module_name, name, err);
                    return None;
                }
            }
        }
    };

    let found = host
        .module_dict_get(module.as_raw(), attr)
        .map(|obj| Handle::from_borrowed(py, obj));
    if found.is_none() {
        log::debug!("type '{}' not found in module '{}'", attr, module_name);
    }
    found
}
