use fax_par::Node;
use fax_util::{FaxError, Span};
use indexmap::IndexMap;
use std::cell::RefCell;
use std::rc::Rc;

use crate::symtab::TableRef;

/// A dict's backing storage: insertion-ordered, keyed by the typed-key
/// hash string from §4.5.3. Each slot keeps the original-typed key
/// value alongside the stored value so `keys()` can hand back the
/// original key rather than its hash.
pub type DictData = IndexMap<String, (Value, Value)>;

/// A built-in method or function (§4.6). Not a spec-level AST kind —
/// it is how this implementation represents the callable a field
/// access like `v.append` or the global `print` resolves to, since a
/// [`Value::Function`] must be callable uniformly through `FUNC_CALL`
/// regardless of whether its body is language source or native code.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Builtin {
    Print,
    VectorLength,
    VectorAppend,
    StringLength,
    DictLength,
    DictKeys,
    DictContains,
}

/// A function value (§3.3): name, parameter names, body, and the
/// scope it closes over for name resolution. `home` is the table the
/// function was declared into — the program's root table for an
/// ordinary top-level function, or a module's own table for a
/// function declared inside an imported file. Since the language has
/// no closures, a call's scope chains to `home`, never to the call
/// site's locals.
pub struct FunctionValue {
    pub name: String,
    pub params: Rc<Vec<String>>,
    pub body: Rc<Node>,
    pub home: TableRef,
    pub bound_this: Option<Box<Value>>,
    pub native: Option<Builtin>,
}

/// A module value (§3.3): the result of a named `import`. Owns the
/// symbol table the imported file populated.
pub struct ModuleValue {
    pub name: String,
    pub table: TableRef,
}

/// The boxed value model (§3.3). `Vector` and `Dict` use `Rc<RefCell<_>>`
/// because they are shared, mutable handles — `v.append(x)` must be
/// visible through every binding that refers to the same vector, and a
/// dict index assignment mutates the dict in place. `Str` is immutable
/// once constructed (the spec only ever synthesizes new strings, never
/// mutates one in place), so it is a plain reference-counted `str`.
#[derive(Clone)]
pub enum Value {
    Nothing,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(Rc<str>),
    Vector(Rc<RefCell<Vec<Value>>>),
    Dict(Rc<RefCell<DictData>>),
    Function(Rc<FunctionValue>),
    Module(Rc<ModuleValue>),
}

impl Value {
    pub fn new_str(s: impl Into<Rc<str>>) -> Self {
        Value::Str(s.into())
    }

    pub fn new_vector(items: Vec<Value>) -> Self {
        Value::Vector(Rc::new(RefCell::new(items)))
    }

    pub fn new_dict(data: DictData) -> Self {
        Value::Dict(Rc::new(RefCell::new(data)))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Nothing => "nothing",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
            Value::Vector(_) => "vector",
            Value::Dict(_) => "dict",
            Value::Function(_) => "function",
            Value::Module(_) => "module",
        }
    }

    /// Structural equality (§3.3): scalars, strings, vectors, and
    /// dicts compare by content; functions and modules are never
    /// structurally equal (callers must reject `==`/`!=` on them
    /// before reaching here — see `ops::apply_binary`).
    pub fn structural_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Nothing, Value::Nothing) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Vector(a), Value::Vector(b)) => {
                let a = a.borrow();
                let b = b.borrow();
                a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| x.structural_eq(y))
            }
            (Value::Dict(a), Value::Dict(b)) => {
                let a = a.borrow();
                let b = b.borrow();
                a.len() == b.len()
                    && a.iter().all(|(hash, (_, v))| {
                        b.get(hash).map(|(_, v2)| v.structural_eq(v2)).unwrap_or(false)
                    })
            }
            _ => false,
        }
    }
}

/// Stringification (§4.5.4), used by `+` on strings, `print`, and dict
/// key canonicalization.
pub fn stringify(value: &Value) -> String {
    match value {
        Value::Nothing => "nothing".to_string(),
        Value::Bool(b) => if *b { "true" } else { "false" }.to_string(),
        Value::Int(i) => i.to_string(),
        Value::Float(f) => format_float(*f),
        Value::Str(s) => s.to_string(),
        Value::Vector(v) => {
            let parts: Vec<String> = v.borrow().iter().map(stringify_element).collect();
            format!("[{}]", parts.join(", "))
        }
        Value::Dict(d) => {
            let parts: Vec<String> = d
                .borrow()
                .values()
                .map(|(k, v)| format!("{}: {}", stringify_element(k), stringify_element(v)))
                .collect();
            format!("{{{}}}", parts.join(", "))
        }
        Value::Function(f) => format!("function:{}({})", f.name, f.params.join(",")),
        Value::Module(m) => format!("module:{}", m.name),
    }
}

/// Strings nested inside a vector/dict rendering are quoted; the
/// top-level value passed to `print` is not (§4.5.4).
fn stringify_element(value: &Value) -> String {
    match value {
        Value::Str(s) => format!("\"{s}\""),
        other => stringify(other),
    }
}

/// One-decimal-digit float formatting (§4.5.4). A deliberately low
/// precision kept identical between the interpreter and emitted C so
/// the two back ends agree on output byte-for-byte.
fn format_float(f: f64) -> String {
    format!("{f:.1}")
}

/// Dict-key canonicalization (§4.5.3): `"<type-tag>:<canonical-text>"`.
/// Only bool/int/float/string are valid keys.
pub fn hash_key(value: &Value, span: Span) -> Result<String, FaxError> {
    let tag = match value {
        Value::Bool(_) => "bool",
        Value::Int(_) => "int",
        Value::Float(_) => "float",
        Value::Str(_) => "string",
        other => {
            return Err(FaxError::type_error(
                span,
                format!("{} is not a valid dict key", other.type_name()),
            ))
        }
    };
    Ok(format!("{tag}:{}", stringify(value)))
}
