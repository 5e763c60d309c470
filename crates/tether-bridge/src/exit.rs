//! Process-exit adaptor

use tether_sdk::BuiltinError;

use crate::bridge::Bridge;
use crate::handle::Handle;

/// Exit status carried by a host exit request.
///
/// `exc` is either a `SystemExit` instance, whose `code` attribute carries
/// the status, or the status value itself. An integer that fits `i32` is the
/// status. Anything else is written to the host's diagnostic stream and
/// `fallback` is returned.
pub fn exit_status(exc: &Handle<'_>, fallback: i32) -> i32 {
    let py = exc.token();
    let host = py.host();
    let exit_class = Handle::from_borrowed(py, host.builtin_error_type(BuiltinError::SystemExit));
    let code = if exc.is_instance(&exit_class).unwrap_or(false) {
        exc.getattr_opt("code").unwrap_or_else(|| Handle::none(py))
    } else {
        exc.clone()
    };

    if code.is_int() {
        if let Some(status) = code.extract_int().ok().and_then(|v| i32::try_from(v).ok()) {
            return status;
        }
    }

    let text = code.str().unwrap_or_else(|_| "<unprintable>".to_string());
    host.write_stderr(&text);
    host.write_stderr("\n");
    log::warn!("exit code '{}' is not a status, exiting with {}", text, fallback);
    fallback
}

/// Terminate the process with the status carried by `exc`.
///
/// This does not return. Host objects still owned elsewhere are not
/// released.
pub fn handle_system_exit(exc: &Handle<'_>, fallback: i32) -> ! {
    let status = exit_status(exc, fallback);
    let host = exc.token().host();
    log::debug!("host requested exit with status {}", status);
    host.exit(status)
}

impl Bridge {
    /// [`exit_status`] with the configured fallback
    pub fn exit_status(&self, exc: &Handle<'_>) -> i32 {
        exit_status(exc, self.config().exit.fallback_status)
    }

    /// [`handle_system_exit`] with the configured fallback
    pub fn handle_system_exit(&self, exc: &Handle<'_>) -> ! {
        handle_system_exit(exc, self.config().exit.fallback_status)
    }
}
