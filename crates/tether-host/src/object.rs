//! Object model for the embedded host
//!
//! Every host value lives in a heap slot as one of these variants. Variants
//! that refer to other objects own one reference to each of them; those
//! references are released when the slot is freed.

use rustc_hash::FxHashMap;
use tether_sdk::{HostFunction, HostRef};

/// Attribute namespace of a class, instance or module
pub type Namespace = FxHashMap<String, HostRef>;

/// A heap-resident host value
pub enum Object {
    /// The null singleton
    None,
    /// Immutable string
    Str(String),
    /// Integer
    Int(i64),
    /// Growable list
    List(Vec<HostRef>),
    /// Mapping with unique keys, in insertion order
    Dict(Vec<(HostRef, HostRef)>),
    /// Class
    Class(Class),
    /// Instance of a class
    Instance(Instance),
    /// Module
    Module(Module),
    /// Native function
    Function(Function),
    /// Function bound to a receiver
    Method {
        /// Passed as the first argument
        receiver: HostRef,
        /// Underlying function
        function: HostRef,
    },
}

/// Class object
pub struct Class {
    /// Owning module name
    pub module: String,
    /// Class name
    pub name: String,
    /// Direct bases, in order
    pub bases: Vec<HostRef>,
    /// Class attributes
    pub attrs: Namespace,
}

/// Instance object
pub struct Instance {
    /// The instance's class
    pub class: HostRef,
    /// Instance attributes
    pub attrs: Namespace,
}

/// Module object
pub struct Module {
    /// Module name
    pub name: String,
    /// Module namespace
    pub attrs: Namespace,
}

/// Native function object
pub struct Function {
    /// Name used in diagnostics
    pub name: String,
    /// Callable body
    pub func: HostFunction,
}

impl Object {
    /// References this object owns
    pub fn children(&self) -> Vec<HostRef> {
        match self {
            Object::None | Object::Str(_) | Object::Int(_) | Object::Function(_) => Vec::new(),
            Object::List(items) => items.clone(),
            Object::Dict(entries) => entries.iter().flat_map(|(k, v)| [*k, *v]).collect(),
            Object::Class(class) => class
                .bases
                .iter()
                .copied()
                .chain(class.attrs.values().copied())
                .collect(),
            Object::Instance(inst) => std::iter::once(inst.class)
                .chain(inst.attrs.values().copied())
                .collect(),
            Object::Module(module) => module.attrs.values().copied().collect(),
            Object::Method { receiver, function } => vec![*receiver, *function],
        }
    }

    /// Attribute namespace, for objects that have one
    pub fn namespace(&self) -> Option<&Namespace> {
        match self {
            Object::Class(class) => Some(&class.attrs),
            Object::Instance(inst) => Some(&inst.attrs),
            Object::Module(module) => Some(&module.attrs),
            _ => None,
        }
    }

    /// Mutable attribute namespace, for objects that have one
    pub fn namespace_mut(&mut self) -> Option<&mut Namespace> {
        match self {
            Object::Class(class) => Some(&mut class.attrs),
            Object::Instance(inst) => Some(&mut inst.attrs),
            Object::Module(module) => Some(&mut module.attrs),
            _ => None,
        }
    }

    /// Class data, if this is a class
    pub fn as_class(&self) -> Option<&Class> {
        match self {
            Object::Class(class) => Some(class),
            _ => None,
        }
    }
}

impl std::fmt::Debug for Object {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Object::None => f.write_str("None"),
            Object::Str(s) => write!(f, "Str({:?})", s),
            Object::Int(i) => write!(f, "Int({})", i),
            Object::List(items) => write!(f, "List(len={})", items.len()),
            Object::Dict(entries) => write!(f, "Dict(len={})", entries.len()),
            Object::Class(class) => write!(f, "Class({}.{})", class.module, class.name),
            Object::Instance(inst) => write!(f, "Instance({:?})", inst.class),
            Object::Module(module) => write!(f, "Module({})", module.name),
            Object::Function(func) => write!(f, "Function({})", func.name),
            Object::Method { function, .. } => write!(f, "Method({:?})", function),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_children_of_containers() {
        let a = HostRef::from_parts(1, 0);
        let b = HostRef::from_parts(2, 0);
        assert_eq!(Object::List(vec![a, b]).children(), vec![a, b]);
        assert_eq!(Object::Dict(vec![(a, b)]).children(), vec![a, b]);
        assert!(Object::Str("x".into()).children().is_empty());
        let method = Object::Method {
            receiver: a,
            function: b,
        };
        assert_eq!(method.children(), vec![a, b]);
    }

    #[test]
    fn test_instance_owns_class() {
        let class = HostRef::from_parts(3, 1);
        let attr = HostRef::from_parts(4, 0);
        let mut attrs = Namespace::default();
        attrs.insert("x".to_string(), attr);
        let inst = Object::Instance(Instance { class, attrs });
        assert_eq!(inst.children(), vec![class, attr]);
        assert!(inst.namespace().is_some());
    }
}
