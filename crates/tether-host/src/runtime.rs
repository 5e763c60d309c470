//! `EmbeddedHost`: the in-process host runtime

use std::thread::{self, ThreadId};

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use tether_sdk::{
    BuiltinError, HostFunction, HostResult, HostRuntime, HostRef, LockState, Raised, SavedThread,
};

use crate::builtins::{BuiltinType, Builtins, BUILTINS_MODULE};
use crate::gil::Gil;
use crate::heap::Heap;
use crate::object::{Class, Function, Instance, Module, Namespace, Object};
use crate::{HostOptions, ModuleInit, ProcessExit};

/// Reference host runtime.
///
/// Implements the full [`HostRuntime`] contract in memory: a refcounted
/// object heap, classes with multiple bases, modules imported on demand
/// through registered initializers, a per-thread active error and a global
/// execution lock. Object operations panic when the calling thread does not
/// hold the lock.
pub struct EmbeddedHost {
    heap: Mutex<Heap>,
    builtins: Builtins,
    modules: Mutex<FxHashMap<String, HostRef>>,
    importers: Mutex<FxHashMap<String, ModuleInit>>,
    errors: Mutex<FxHashMap<ThreadId, HostRef>>,
    gil: Gil,
    stderr: Mutex<String>,
    options: HostOptions,
}

impl EmbeddedHost {
    /// Create a host with default options
    pub fn new() -> Self {
        Self::with_options(HostOptions::default())
    }

    /// Create a host.
    ///
    /// The calling thread becomes the host's persistent thread. It does not
    /// hold the execution lock on return.
    pub fn with_options(options: HostOptions) -> Self {
        let mut heap = Heap::new(None);
        let builtins =
            Builtins::create(&mut heap).expect("empty heap must fit the builtin objects");
        if let Some(limit) = options.object_limit {
            heap.set_limit(Some(heap.live() + limit));
        }
        heap.incref(builtins.module);

        let mut modules = FxHashMap::default();
        modules.insert(BUILTINS_MODULE.to_string(), builtins.module);

        Self {
            heap: Mutex::new(heap),
            builtins,
            modules: Mutex::new(modules),
            importers: Mutex::new(FxHashMap::default()),
            errors: Mutex::new(FxHashMap::default()),
            gil: Gil::new(),
            stderr: Mutex::new(String::new()),
            options,
        }
    }

    /// Register an initializer run the first time `name` is imported
    pub fn register_module<F>(&self, name: &str, init: F)
    where
        F: Fn(&dyn HostRuntime) -> HostResult<HostRef> + Send + Sync + 'static,
    {
        self.importers
            .lock()
            .insert(name.to_string(), std::sync::Arc::new(init));
    }

    /// Number of live objects, builtins included
    pub fn live_objects(&self) -> usize {
        self.heap.lock().live()
    }

    /// Allow at most `extra` more live objects than exist now (`None` lifts
    /// the limit)
    pub fn limit_new_objects(&self, extra: Option<usize>) {
        let mut heap = self.heap.lock();
        let limit = extra.map(|extra| heap.live() + extra);
        heap.set_limit(limit);
    }

    /// Number of threads affiliated with the host
    pub fn known_threads(&self) -> usize {
        self.gil.known_threads()
    }

    /// Everything written to the diagnostic stream so far
    pub fn stderr(&self) -> String {
        self.stderr.lock().clone()
    }

    /// Take and clear the captured diagnostic stream
    pub fn take_stderr(&self) -> String {
        std::mem::take(&mut *self.stderr.lock())
    }

    /// Builtin non-exception class (borrowed)
    pub fn builtin_type(&self, ty: BuiltinType) -> HostRef {
        self.builtins.class(ty)
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn require_lock(&self) {
        if !self.gil.held_by_current() {
            panic!("host object API called without holding the execution lock");
        }
    }

    fn alloc(&self, object: Object) -> HostResult<HostRef> {
        let result = self.heap.lock().alloc(object);
        result.map_err(|err| {
            log::debug!("host allocation failed: {}", err);
            self.memory_error()
        })
    }

    fn memory_error(&self) -> Raised {
        self.heap.lock().incref(self.builtins.memory_error);
        Raised(self.builtins.memory_error)
    }

    fn raise(&self, kind: BuiltinError, message: &str) -> Raised {
        Raised(self.new_error(kind, message))
    }

    fn type_of_in(&self, heap: &Heap, obj: HostRef) -> HostRef {
        let ty = match heap.get(obj) {
            Object::None => BuiltinType::NoneType,
            Object::Str(_) => BuiltinType::Str,
            Object::Int(_) => BuiltinType::Int,
            Object::List(_) => BuiltinType::List,
            Object::Dict(_) => BuiltinType::Dict,
            Object::Class(_) => BuiltinType::Type,
            Object::Instance(inst) => return inst.class,
            Object::Module(_) => BuiltinType::Module,
            Object::Function(_) => BuiltinType::Function,
            Object::Method { .. } => BuiltinType::Method,
        };
        self.builtins.class(ty)
    }

    fn type_name(&self, obj: HostRef) -> String {
        let heap = self.heap.lock();
        let ty = self.type_of_in(&heap, obj);
        heap.get(ty)
            .as_class()
            .map(|class| class.name.clone())
            .unwrap_or_default()
    }

    fn type_error(&self, expected: &str, obj: HostRef) -> Raised {
        let message = format!("expected {}, got '{}'", expected, self.type_name(obj));
        self.raise(BuiltinError::TypeError, &message)
    }

    fn is_exception_instance(&self, heap: &Heap, obj: HostRef) -> bool {
        let ty = self.type_of_in(heap, obj);
        is_subclass(heap, ty, self.builtins.error(BuiltinError::BaseException))
    }

    fn instantiate(&self, class: HostRef, args: &[HostRef]) -> HostResult<HostRef> {
        let (is_exception, is_exit, init, name) = {
            let heap = self.heap.lock();
            let name = heap
                .get(class)
                .as_class()
                .map(|c| c.name.clone())
                .unwrap_or_default();
            let base = self.builtins.error(BuiltinError::BaseException);
            let exit = self.builtins.error(BuiltinError::SystemExit);
            let init = lookup_class_attr(&heap, class, "__init__")
                .filter(|f| matches!(heap.get(*f), Object::Function(_)));
            (
                is_subclass(&heap, class, base),
                is_subclass(&heap, class, exit),
                init,
                name,
            )
        };

        self.heap.lock().incref(class);
        let instance = self.alloc(Object::Instance(Instance {
            class,
            attrs: Namespace::default(),
        }))?;

        let initialized = self.init_instance(instance, args, is_exception, is_exit, init, &name);
        match initialized {
            Ok(()) => Ok(instance),
            Err(raised) => {
                self.decref(instance);
                Err(raised)
            }
        }
    }

    fn init_instance(
        &self,
        instance: HostRef,
        args: &[HostRef],
        is_exception: bool,
        is_exit: bool,
        init: Option<HostRef>,
        name: &str,
    ) -> HostResult<()> {
        if is_exception {
            let list = self.new_list()?;
            for arg in args {
                if let Err(raised) = self.list_append(list, *arg) {
                    self.decref(list);
                    return Err(raised);
                }
            }
            let stored = self.set_attr(instance, "args", list);
            self.decref(list);
            stored?;
        }

        if is_exit {
            let code = match args {
                [] => self.builtins.none,
                [code] => *code,
                _ => self.get_attr(instance, "args")?,
            };
            let owned = args.len() > 1;
            let stored = self.set_attr(instance, "code", code);
            if owned {
                self.decref(code);
            }
            stored?;
        }

        match init {
            Some(init) => {
                let mut full = Vec::with_capacity(args.len() + 1);
                full.push(instance);
                full.extend_from_slice(args);
                let result = self.call(init, &full)?;
                self.decref(result);
                Ok(())
            }
            None if !is_exception && !args.is_empty() => Err(self.raise(
                BuiltinError::TypeError,
                &format!("{}() takes no arguments", name),
            )),
            None => Ok(()),
        }
    }

    fn render(&self, heap: &Heap, obj: HostRef, quote: bool) -> String {
        match heap.get(obj) {
            Object::None => "None".to_string(),
            Object::Str(s) if quote => format!("'{}'", s),
            Object::Str(s) => s.clone(),
            Object::Int(i) => i.to_string(),
            Object::List(items) => {
                let parts: Vec<_> = items.iter().map(|i| self.render(heap, *i, true)).collect();
                format!("[{}]", parts.join(", "))
            }
            Object::Dict(entries) => {
                let parts: Vec<_> = entries
                    .iter()
                    .map(|(k, v)| {
                        format!("{}: {}", self.render(heap, *k, true), self.render(heap, *v, true))
                    })
                    .collect();
                format!("{{{}}}", parts.join(", "))
            }
            Object::Class(class) => class_display_name(class),
            Object::Instance(inst) => {
                if !self.is_exception_instance(heap, obj) {
                    let class = heap.get(inst.class).as_class().map(class_display_name);
                    return format!("<{} object>", class.unwrap_or_default());
                }
                let args = match inst.attrs.get("args").map(|a| heap.get(*a)) {
                    Some(Object::List(args)) => args.clone(),
                    _ => Vec::new(),
                };
                match args.as_slice() {
                    [] => String::new(),
                    [arg] => self.render(heap, *arg, false),
                    many => {
                        let parts: Vec<_> =
                            many.iter().map(|a| self.render(heap, *a, true)).collect();
                        format!("({})", parts.join(", "))
                    }
                }
            }
            Object::Module(module) => format!("<module '{}'>", module.name),
            Object::Function(func) => format!("<function {}>", func.name),
            Object::Method { function, .. } => match heap.get(*function) {
                Object::Function(func) => format!("<bound method {}>", func.name),
                _ => "<bound method>".to_string(),
            },
        }
    }
}

impl Default for EmbeddedHost {
    fn default() -> Self {
        Self::new()
    }
}

impl HostRuntime for EmbeddedHost {
    // ========================================================================
    // Reference Counting
    // ========================================================================

    fn incref(&self, obj: HostRef) {
        self.require_lock();
        self.heap.lock().incref(obj);
    }

    fn decref(&self, obj: HostRef) {
        self.require_lock();
        self.heap.lock().decref(obj);
    }

    fn ref_count(&self, obj: HostRef) -> usize {
        self.heap.lock().refcount(obj)
    }

    // ========================================================================
    // Singletons
    // ========================================================================

    fn none(&self) -> HostRef {
        self.builtins.none
    }

    fn builtin_error_type(&self, kind: BuiltinError) -> HostRef {
        self.builtins.error(kind)
    }

    // ========================================================================
    // Value Creation
    // ========================================================================

    fn new_str(&self, s: &str) -> HostResult<HostRef> {
        self.require_lock();
        self.alloc(Object::Str(s.to_string()))
    }

    fn new_int(&self, value: i64) -> HostResult<HostRef> {
        self.require_lock();
        self.alloc(Object::Int(value))
    }

    fn new_list(&self) -> HostResult<HostRef> {
        self.require_lock();
        self.alloc(Object::List(Vec::new()))
    }

    fn new_dict(&self) -> HostResult<HostRef> {
        self.require_lock();
        self.alloc(Object::Dict(Vec::new()))
    }

    fn new_error(&self, kind: BuiltinError, message: &str) -> HostRef {
        self.require_lock();
        let class = self.builtins.error(kind);
        let result = self.new_str(message).and_then(|msg| {
            let instance = self.instantiate(class, &[msg]);
            self.decref(msg);
            instance
        });
        match result {
            Ok(instance) => instance,
            // The failure is itself a new reference to a MemoryError
            Err(Raised(fallback)) => fallback,
        }
    }

    fn new_function(&self, name: &str, func: HostFunction) -> HostResult<HostRef> {
        self.require_lock();
        self.alloc(Object::Function(Function {
            name: name.to_string(),
            func,
        }))
    }

    fn new_class(&self, module: &str, name: &str, bases: &[HostRef]) -> HostResult<HostRef> {
        self.require_lock();
        let mut bases = bases.to_vec();
        {
            let mut heap = self.heap.lock();
            if bases.iter().any(|b| heap.get(*b).as_class().is_none()) {
                drop(heap);
                return Err(self.raise(BuiltinError::TypeError, "bases must be classes"));
            }
            if bases.is_empty() {
                bases.push(self.builtins.class(BuiltinType::Object));
            }
            for base in &bases {
                heap.incref(*base);
            }
        }
        self.alloc(Object::Class(Class {
            module: module.to_string(),
            name: name.to_string(),
            bases,
            attrs: Namespace::default(),
        }))
    }

    fn new_module(&self, name: &str) -> HostResult<HostRef> {
        self.require_lock();
        self.alloc(Object::Module(Module {
            name: name.to_string(),
            attrs: Namespace::default(),
        }))
    }

    // ========================================================================
    // Type Predicates
    // ========================================================================

    fn type_of(&self, obj: HostRef) -> HostRef {
        self.require_lock();
        let heap = self.heap.lock();
        self.type_of_in(&heap, obj)
    }

    fn is_none(&self, obj: HostRef) -> bool {
        obj == self.builtins.none
    }

    fn is_str(&self, obj: HostRef) -> bool {
        self.require_lock();
        matches!(self.heap.lock().get(obj), Object::Str(_))
    }

    fn is_int(&self, obj: HostRef) -> bool {
        self.require_lock();
        matches!(self.heap.lock().get(obj), Object::Int(_))
    }

    fn is_list(&self, obj: HostRef) -> bool {
        self.require_lock();
        matches!(self.heap.lock().get(obj), Object::List(_))
    }

    fn is_dict(&self, obj: HostRef) -> bool {
        self.require_lock();
        matches!(self.heap.lock().get(obj), Object::Dict(_))
    }

    fn is_class(&self, obj: HostRef) -> bool {
        self.require_lock();
        matches!(self.heap.lock().get(obj), Object::Class(_))
    }

    // ========================================================================
    // Scalar Reads
    // ========================================================================

    fn str_value(&self, obj: HostRef) -> HostResult<String> {
        self.require_lock();
        let value = match self.heap.lock().get(obj) {
            Object::Str(s) => Some(s.clone()),
            _ => None,
        };
        value.ok_or_else(|| self.type_error("str", obj))
    }

    fn int_value(&self, obj: HostRef) -> HostResult<i64> {
        self.require_lock();
        let value = match self.heap.lock().get(obj) {
            Object::Int(i) => Some(*i),
            _ => None,
        };
        value.ok_or_else(|| self.type_error("int", obj))
    }

    // ========================================================================
    // Containers
    // ========================================================================

    fn list_len(&self, list: HostRef) -> HostResult<usize> {
        self.require_lock();
        let len = match self.heap.lock().get(list) {
            Object::List(items) => Some(items.len()),
            _ => None,
        };
        len.ok_or_else(|| self.type_error("list", list))
    }

    fn list_get(&self, list: HostRef, index: usize) -> HostResult<HostRef> {
        self.require_lock();
        let item = match self.heap.lock().get(list) {
            Object::List(items) => Ok(items.get(index).copied()),
            _ => Err(()),
        };
        match item {
            Ok(Some(item)) => Ok(item),
            Ok(None) => Err(self.raise(BuiltinError::ValueError, "list index out of range")),
            Err(()) => Err(self.type_error("list", list)),
        }
    }

    fn list_append(&self, list: HostRef, item: HostRef) -> HostResult<()> {
        self.require_lock();
        let mut heap = self.heap.lock();
        if !matches!(heap.get(list), Object::List(_)) {
            drop(heap);
            return Err(self.type_error("list", list));
        }
        heap.incref(item);
        if let Object::List(items) = heap.get_mut(list) {
            items.push(item);
        }
        Ok(())
    }

    fn dict_items(&self, dict: HostRef) -> HostResult<Vec<(HostRef, HostRef)>> {
        self.require_lock();
        let items = match self.heap.lock().get(dict) {
            Object::Dict(entries) => Some(entries.clone()),
            _ => None,
        };
        items.ok_or_else(|| self.type_error("dict", dict))
    }

    fn dict_set_item(&self, dict: HostRef, key: HostRef, value: HostRef) -> HostResult<()> {
        self.require_lock();
        let mut heap = self.heap.lock();
        let position = match heap.get(dict) {
            Object::Dict(entries) => entries.iter().position(|(k, _)| keys_equal(&heap, *k, key)),
            _ => {
                drop(heap);
                return Err(self.type_error("dict", dict));
            }
        };

        heap.incref(value);
        let replaced = match heap.get_mut(dict) {
            Object::Dict(entries) => match position {
                Some(i) => Some(std::mem::replace(&mut entries[i].1, value)),
                None => {
                    entries.push((key, value));
                    None
                }
            },
            _ => None,
        };
        match replaced {
            Some(old) => heap.decref(old),
            None => heap.incref(key),
        }
        Ok(())
    }

    // ========================================================================
    // Attributes and Calls
    // ========================================================================

    fn get_attr(&self, obj: HostRef, name: &str) -> HostResult<HostRef> {
        self.require_lock();

        enum Found {
            Value(HostRef),
            Bind(HostRef),
            Text(String),
            Missing,
        }

        let mut heap = self.heap.lock();
        let found = match heap.get(obj) {
            Object::Instance(inst) => {
                if name == "__class__" {
                    Found::Value(inst.class)
                } else if let Some(value) = inst.attrs.get(name) {
                    Found::Value(*value)
                } else {
                    match lookup_class_attr(&heap, inst.class, name) {
                        Some(f) if matches!(heap.get(f), Object::Function(_)) => Found::Bind(f),
                        Some(value) => Found::Value(value),
                        None => Found::Missing,
                    }
                }
            }
            Object::Class(class) => match name {
                "__name__" => Found::Text(class.name.clone()),
                "__module__" => Found::Text(class.module.clone()),
                _ => match lookup_class_attr(&heap, obj, name) {
                    Some(value) => Found::Value(value),
                    None => Found::Missing,
                },
            },
            Object::Module(module) => match (name, module.attrs.get(name)) {
                (_, Some(value)) => Found::Value(*value),
                ("__name__", None) => Found::Text(module.name.clone()),
                _ => Found::Missing,
            },
            _ if name == "__class__" => Found::Value(self.type_of_in(&heap, obj)),
            _ => Found::Missing,
        };

        match found {
            Found::Value(value) => {
                heap.incref(value);
                Ok(value)
            }
            Found::Bind(function) => {
                heap.incref(obj);
                heap.incref(function);
                drop(heap);
                self.alloc(Object::Method {
                    receiver: obj,
                    function,
                })
            }
            Found::Text(text) => {
                drop(heap);
                self.new_str(&text)
            }
            Found::Missing => {
                drop(heap);
                let message = format!(
                    "'{}' object has no attribute '{}'",
                    self.type_name(obj),
                    name
                );
                Err(self.raise(BuiltinError::AttributeError, &message))
            }
        }
    }

    fn set_attr(&self, obj: HostRef, name: &str, value: HostRef) -> HostResult<()> {
        self.require_lock();
        let mut heap = self.heap.lock();
        if heap.get(obj).namespace().is_none() {
            drop(heap);
            let message = format!(
                "'{}' object has no attribute '{}'",
                self.type_name(obj),
                name
            );
            return Err(self.raise(BuiltinError::AttributeError, &message));
        }
        heap.incref(value);
        let old = heap
            .get_mut(obj)
            .namespace_mut()
            .and_then(|attrs| attrs.insert(name.to_string(), value));
        if let Some(old) = old {
            heap.decref(old);
        }
        Ok(())
    }

    fn call(&self, callable: HostRef, args: &[HostRef]) -> HostResult<HostRef> {
        self.require_lock();

        enum Target {
            Native(HostFunction),
            Bound(HostRef, HostRef),
            Class,
            NotCallable,
        }

        let target = match self.heap.lock().get(callable) {
            Object::Function(func) => Target::Native(func.func.clone()),
            Object::Method { receiver, function } => Target::Bound(*receiver, *function),
            Object::Class(_) => Target::Class,
            _ => Target::NotCallable,
        };

        match target {
            Target::Native(func) => func(self, args),
            Target::Bound(receiver, function) => {
                let mut full = Vec::with_capacity(args.len() + 1);
                full.push(receiver);
                full.extend_from_slice(args);
                self.call(function, &full)
            }
            Target::Class => self.instantiate(callable, args),
            Target::NotCallable => {
                let message = format!("'{}' object is not callable", self.type_name(callable));
                Err(self.raise(BuiltinError::TypeError, &message))
            }
        }
    }

    fn is_instance(&self, obj: HostRef, class: HostRef) -> HostResult<bool> {
        self.require_lock();
        let heap = self.heap.lock();
        if heap.get(class).as_class().is_none() {
            drop(heap);
            return Err(self.raise(
                BuiltinError::TypeError,
                "isinstance() arg 2 must be a class",
            ));
        }
        let ty = self.type_of_in(&heap, obj);
        Ok(is_subclass(&heap, ty, class))
    }

    fn to_str(&self, obj: HostRef) -> HostResult<HostRef> {
        self.require_lock();

        let custom = {
            let mut heap = self.heap.lock();
            if matches!(heap.get(obj), Object::Str(_)) {
                heap.incref(obj);
                return Ok(obj);
            }
            match heap.get(obj) {
                Object::Instance(inst) => lookup_class_attr(&heap, inst.class, "__str__")
                    .filter(|f| matches!(heap.get(*f), Object::Function(_))),
                _ => None,
            }
        };

        if let Some(method) = custom {
            let result = self.call(method, &[obj])?;
            if !self.is_str(result) {
                self.decref(result);
                return Err(self.raise(
                    BuiltinError::TypeError,
                    "__str__ returned non-string",
                ));
            }
            return Ok(result);
        }

        let text = {
            let heap = self.heap.lock();
            self.render(&heap, obj, false)
        };
        self.new_str(&text)
    }

    // ========================================================================
    // Modules
    // ========================================================================

    fn sys_modules_get(&self, name: &str) -> Option<HostRef> {
        self.require_lock();
        self.modules.lock().get(name).copied()
    }

    fn sys_modules_set(&self, name: &str, module: HostRef) -> HostResult<()> {
        self.require_lock();
        self.heap.lock().incref(module);
        let old = self.modules.lock().insert(name.to_string(), module);
        if let Some(old) = old {
            self.heap.lock().decref(old);
        }
        Ok(())
    }

    fn import_module(&self, name: &str) -> HostResult<HostRef> {
        self.require_lock();
        if let Some(module) = self.sys_modules_get(name) {
            self.incref(module);
            return Ok(module);
        }

        let init = self.importers.lock().get(name).cloned();
        let Some(init) = init else {
            let message = format!("No module named '{}'", name);
            return Err(self.raise(BuiltinError::ImportError, &message));
        };

        log::debug!("initializing host module '{}'", name);
        let module = init(self)?;
        if let Err(raised) = self.sys_modules_set(name, module) {
            self.decref(module);
            return Err(raised);
        }
        Ok(module)
    }

    fn module_dict_get(&self, module: HostRef, name: &str) -> Option<HostRef> {
        self.require_lock();
        match self.heap.lock().get(module) {
            Object::Module(module) => module.attrs.get(name).copied(),
            _ => None,
        }
    }

    // ========================================================================
    // Active Error
    // ========================================================================

    fn err_fetch(&self) -> Option<HostRef> {
        self.require_lock();
        self.errors.lock().remove(&thread::current().id())
    }

    fn err_restore(&self, exc: HostRef) {
        self.require_lock();
        let old = self.errors.lock().insert(thread::current().id(), exc);
        if let Some(old) = old {
            self.decref(old);
        }
    }

    fn err_occurred(&self) -> bool {
        self.require_lock();
        self.errors.lock().contains_key(&thread::current().id())
    }

    // ========================================================================
    // Execution Lock
    // ========================================================================

    fn lock_held(&self) -> bool {
        self.gil.held_by_current()
    }

    fn save_thread(&self) -> SavedThread {
        self.gil.save()
    }

    fn restore_thread(&self, saved: SavedThread) {
        self.gil.restore(saved)
    }

    fn ensure_thread(&self) -> LockState {
        self.gil.ensure()
    }

    fn release_thread(&self, state: LockState) {
        self.gil.release(state)
    }

    // ========================================================================
    // Process
    // ========================================================================

    fn write_stderr(&self, text: &str) {
        if self.options.echo_stderr {
            eprint!("{}", text);
        }
        self.stderr.lock().push_str(text);
    }

    fn exit(&self, status: i32) -> ! {
        log::debug!("host exit requested with status {}", status);
        if self.options.exit_process {
            std::process::exit(status);
        }
        std::panic::panic_any(ProcessExit { status })
    }
}

fn class_display_name(class: &Class) -> String {
    if class.module == BUILTINS_MODULE {
        class.name.clone()
    } else {
        format!("{}.{}", class.module, class.name)
    }
}

/// Depth-first, left-to-right linearization without duplicates
fn mro(heap: &Heap, class: HostRef) -> Vec<HostRef> {
    let mut order = Vec::new();
    let mut pending = vec![class];
    while let Some(current) = pending.pop() {
        if order.contains(&current) {
            continue;
        }
        order.push(current);
        if let Some(class) = heap.get(current).as_class() {
            pending.extend(class.bases.iter().rev().copied());
        }
    }
    order
}

fn is_subclass(heap: &Heap, class: HostRef, base: HostRef) -> bool {
    mro(heap, class).contains(&base)
}

fn lookup_class_attr(heap: &Heap, class: HostRef, name: &str) -> Option<HostRef> {
    mro(heap, class).into_iter().find_map(|c| {
        heap.get(c)
            .as_class()
            .and_then(|class| class.attrs.get(name).copied())
    })
}

fn keys_equal(heap: &Heap, a: HostRef, b: HostRef) -> bool {
    if a == b {
        return true;
    }
    match (heap.get(a), heap.get(b)) {
        (Object::Str(x), Object::Str(y)) => x == y,
        (Object::Int(x), Object::Int(y)) => x == y,
        _ => false,
    }
}
