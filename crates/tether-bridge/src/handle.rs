//! Owning handle to a host object

use std::fmt;
use std::mem::ManuallyDrop;

use tether_sdk::HostRef;

use crate::error::{HostErr, HostResult, RaisedExt};
use crate::lock::HostToken;

/// One owned reference to a host object.
///
/// Cloning adds a reference, dropping releases it, and assigning over a
/// handle releases the previous reference first. [`Handle::into_raw`]
/// transfers the reference out without releasing it. A handle is never null;
/// an optional object is `Option<Handle>`.
pub struct Handle<'h> {
    py: HostToken<'h>,
    obj: HostRef,
}

impl<'h> Handle<'h> {
    /// Take ownership of a new reference
    pub fn adopt(py: HostToken<'h>, obj: HostRef) -> Self {
        Self { py, obj }
    }

    /// Add a reference to a borrowed object and own it
    pub fn from_borrowed(py: HostToken<'h>, obj: HostRef) -> Self {
        py.host().incref(obj);
        Self { py, obj }
    }

    /// Adopt the result of a raw host call
    pub fn wrap(py: HostToken<'h>, result: tether_sdk::HostResult<HostRef>) -> HostResult<'h, Self> {
        result.map(|obj| Self::adopt(py, obj)).adopt_err(py)
    }

    /// The host's null object
    pub fn none(py: HostToken<'h>) -> Self {
        Self::from_borrowed(py, py.host().none())
    }

    /// New host string
    pub fn new_str(py: HostToken<'h>, s: &str) -> HostResult<'h, Self> {
        Self::wrap(py, py.host().new_str(s))
    }

    /// New host integer
    pub fn new_int(py: HostToken<'h>, value: i64) -> HostResult<'h, Self> {
        Self::wrap(py, py.host().new_int(value))
    }

    /// Lock token this handle was created under
    #[inline]
    pub fn token(&self) -> HostToken<'h> {
        self.py
    }

    /// The raw reference, still owned by this handle
    #[inline]
    pub fn as_raw(&self) -> HostRef {
        self.obj
    }

    /// Give up ownership without releasing; the caller must release
    pub fn into_raw(self) -> HostRef {
        ManuallyDrop::new(self).obj
    }

    /// Is this the host's null object
    pub fn is_none(&self) -> bool {
        self.py.host().is_none(self.obj)
    }

    /// Is this a string
    pub fn is_str(&self) -> bool {
        self.py.host().is_str(self.obj)
    }

    /// Is this an integer
    pub fn is_int(&self) -> bool {
        self.py.host().is_int(self.obj)
    }

    /// Is this a list
    pub fn is_list(&self) -> bool {
        self.py.host().is_list(self.obj)
    }

    /// Is this a mapping
    pub fn is_dict(&self) -> bool {
        self.py.host().is_dict(self.obj)
    }

    /// Read string data
    pub fn extract_str(&self) -> HostResult<'h, String> {
        self.py.host().str_value(self.obj).adopt_err(self.py)
    }

    /// Read integer data
    pub fn extract_int(&self) -> HostResult<'h, i64> {
        self.py.host().int_value(self.obj).adopt_err(self.py)
    }

    /// The object's class
    pub fn get_type(&self) -> Handle<'h> {
        Self::from_borrowed(self.py, self.py.host().type_of(self.obj))
    }

    /// Read an attribute
    pub fn getattr(&self, name: &str) -> HostResult<'h, Handle<'h>> {
        Self::wrap(self.py, self.py.host().get_attr(self.obj, name))
    }

    /// Read an attribute, treating absence as `None`
    pub fn getattr_opt(&self, name: &str) -> Option<Handle<'h>> {
        self.getattr(name).ok()
    }

    /// Write an attribute
    pub fn setattr(&self, name: &str, value: &Handle<'_>) -> HostResult<'h, ()> {
        self.py
            .host()
            .set_attr(self.obj, name, value.obj)
            .adopt_err(self.py)
    }

    /// Call with no arguments; calling a class instantiates it
    pub fn call0(&self) -> HostResult<'h, Handle<'h>> {
        Self::wrap(self.py, self.py.host().call(self.obj, &[]))
    }

    /// Call with positional arguments
    pub fn call(&self, args: &[&Handle<'_>]) -> HostResult<'h, Handle<'h>> {
        let raw: Vec<HostRef> = args.iter().map(|a| a.obj).collect();
        Self::wrap(self.py, self.py.host().call(self.obj, &raw))
    }

    /// Call a method with no arguments
    pub fn call_method0(&self, name: &str) -> HostResult<'h, Handle<'h>> {
        Self::wrap(self.py, self.py.host().call_method(self.obj, name, &[]))
    }

    /// Is-a test
    pub fn is_instance(&self, class: &Handle<'_>) -> HostResult<'h, bool> {
        self.py
            .host()
            .is_instance(self.obj, class.obj)
            .adopt_err(self.py)
    }

    /// Stringify
    pub fn str(&self) -> HostResult<'h, String> {
        Self::wrap(self.py, self.py.host().to_str(self.obj))?.extract_str()
    }

    /// Current reference count (diagnostics only)
    pub fn ref_count(&self) -> usize {
        self.py.host().ref_count(self.obj)
    }
}

impl Clone for Handle<'_> {
    fn clone(&self) -> Self {
        Self::from_borrowed(self.py, self.obj)
    }
}

impl Drop for Handle<'_> {
    fn drop(&mut self) {
        self.py.host().decref(self.obj);
    }
}

impl PartialEq for Handle<'_> {
    /// Identity comparison
    fn eq(&self, other: &Self) -> bool {
        self.obj == other.obj
    }
}

impl Eq for Handle<'_> {}

impl fmt::Debug for Handle<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Handle").field(&self.obj).finish()
    }
}

impl<'h> From<Handle<'h>> for HostErr<'h> {
    fn from(instance: Handle<'h>) -> Self {
        HostErr::from_instance(instance)
    }
}
