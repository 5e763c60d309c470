//! Builtin classes and the `builtins` module

use tether_sdk::{BuiltinError, HostRef};

use crate::heap::{Heap, HeapError};
use crate::object::{Class, Instance, Module, Namespace, Object};

/// Name of the module that owns the builtin classes
pub const BUILTINS_MODULE: &str = "builtins";

/// Non-exception builtin classes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinType {
    /// Root of every class
    Object,
    /// Class of classes
    Type,
    /// Class of the null singleton
    NoneType,
    /// Strings
    Str,
    /// Integers
    Int,
    /// Lists
    List,
    /// Mappings
    Dict,
    /// Modules
    Module,
    /// Native functions
    Function,
    /// Bound methods
    Method,
}

impl BuiltinType {
    const ALL: [BuiltinType; 10] = [
        BuiltinType::Object,
        BuiltinType::Type,
        BuiltinType::NoneType,
        BuiltinType::Str,
        BuiltinType::Int,
        BuiltinType::List,
        BuiltinType::Dict,
        BuiltinType::Module,
        BuiltinType::Function,
        BuiltinType::Method,
    ];

    /// Class name
    pub const fn name(self) -> &'static str {
        match self {
            BuiltinType::Object => "object",
            BuiltinType::Type => "type",
            BuiltinType::NoneType => "NoneType",
            BuiltinType::Str => "str",
            BuiltinType::Int => "int",
            BuiltinType::List => "list",
            BuiltinType::Dict => "dict",
            BuiltinType::Module => "module",
            BuiltinType::Function => "function",
            BuiltinType::Method => "method",
        }
    }
}

/// Objects that live as long as the host
pub(crate) struct Builtins {
    pub none: HostRef,
    types: [HostRef; 10],
    errors: [HostRef; 9],
    /// Preallocated instance raised when allocation fails
    pub memory_error: HostRef,
    pub module: HostRef,
}

impl Builtins {
    /// Populate an empty heap
    pub fn create(heap: &mut Heap) -> Result<Self, HeapError> {
        let none = heap.alloc(Object::None)?;

        let mut types = Vec::with_capacity(BuiltinType::ALL.len());
        let object = new_class(heap, BuiltinType::Object.name(), Vec::new())?;
        types.push(object);
        for ty in &BuiltinType::ALL[1..] {
            heap.incref(object);
            types.push(new_class(heap, ty.name(), vec![object])?);
        }

        let mut errors: Vec<HostRef> = Vec::with_capacity(BuiltinError::ALL.len());
        for kind in BuiltinError::ALL {
            let base = match kind.parent() {
                Some(parent) => errors[error_index(parent)],
                None => object,
            };
            heap.incref(base);
            errors.push(new_class(heap, kind.name(), vec![base])?);
        }

        let memory_error_class = errors[error_index(BuiltinError::MemoryError)];
        let args = heap.alloc(Object::List(Vec::new()))?;
        let mut attrs = Namespace::default();
        attrs.insert("args".to_string(), args);
        heap.incref(memory_error_class);
        let memory_error = heap.alloc(Object::Instance(Instance {
            class: memory_error_class,
            attrs,
        }))?;

        let mut attrs = Namespace::default();
        for (ty, class) in BuiltinType::ALL.iter().zip(&types) {
            heap.incref(*class);
            attrs.insert(ty.name().to_string(), *class);
        }
        for (kind, class) in BuiltinError::ALL.iter().zip(&errors) {
            heap.incref(*class);
            attrs.insert(kind.name().to_string(), *class);
        }
        heap.incref(none);
        attrs.insert("None".to_string(), none);
        let module = heap.alloc(Object::Module(Module {
            name: BUILTINS_MODULE.to_string(),
            attrs,
        }))?;

        Ok(Self {
            none,
            types: to_array(types)?,
            errors: to_array(errors)?,
            memory_error,
            module,
        })
    }

    /// Builtin class (borrowed)
    pub fn class(&self, ty: BuiltinType) -> HostRef {
        self.types[ty as usize]
    }

    /// Builtin exception class (borrowed)
    pub fn error(&self, kind: BuiltinError) -> HostRef {
        self.errors[error_index(kind)]
    }
}

fn new_class(heap: &mut Heap, name: &str, bases: Vec<HostRef>) -> Result<HostRef, HeapError> {
    heap.alloc(Object::Class(Class {
        module: BUILTINS_MODULE.to_string(),
        name: name.to_string(),
        bases,
        attrs: Namespace::default(),
    }))
}

fn error_index(kind: BuiltinError) -> usize {
    BuiltinError::ALL
        .iter()
        .position(|k| *k == kind)
        .unwrap_or_default()
}

fn to_array<const N: usize>(refs: Vec<HostRef>) -> Result<[HostRef; N], HeapError> {
    refs.try_into().map_err(|_| HeapError::Exhausted)
}
