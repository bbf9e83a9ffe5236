use std::rc::Rc;

use fax_util::{FaxError, Span};

use crate::value::{hash_key, stringify, Builtin, FunctionValue, Value};

/// Builds a native function value bound to `this` for a method call
/// (`v.append`), or with no `this` for a free function (`print`).
fn native(name: &str, arity: usize, native: Builtin, this: Option<Value>) -> Value {
    Value::Function(Rc::new(FunctionValue {
        name: name.to_string(),
        params: Rc::new((0..arity).map(|i| format!("arg{i}")).collect()),
        body: Rc::new(fax_par::Node::nothing_literal(fax_util::Span::DUMMY)),
        home: crate::symtab::SymbolTable::new_root(),
        bound_this: this.map(Box::new),
        native: Some(native),
    }))
}

/// Installs the always-available global `print` function (§4.6) into
/// the program's root scope.
pub fn install_builtins(root: &crate::symtab::TableRef) {
    let print = native("print", 1, Builtin::Print, None);
    root.borrow_mut()
        .declare("print", crate::symtab::EntryKind::Const, print, Span::DUMMY)
        .expect("root scope is empty at startup");
}

/// Resolves a built-in method name against a receiver's type (§4.6),
/// returning a bound native function `Value` ready to be called, or
/// `None` if the receiver type has no such method.
pub fn lookup_method(receiver: &Value, method: &str) -> Option<Value> {
    let kind = match (receiver.type_name(), method) {
        ("vector", "length") => Builtin::VectorLength,
        ("vector", "append") => Builtin::VectorAppend,
        ("string", "length") => Builtin::StringLength,
        ("dict", "length") => Builtin::DictLength,
        ("dict", "keys") => Builtin::DictKeys,
        ("dict", "contains") => Builtin::DictContains,
        _ => return None,
    };
    let arity = match kind {
        Builtin::VectorAppend | Builtin::DictContains => 1,
        _ => 0,
    };
    Some(native(method, arity, kind, Some(receiver.clone())))
}

/// Executes a native function body (§4.6). Argument arity has already
/// been checked by the caller against `params.len()`.
pub fn dispatch(
    builtin: Builtin,
    this: Option<&Value>,
    args: &[Value],
    span: Span,
) -> Result<Value, FaxError> {
    match builtin {
        Builtin::Print => {
            println!("{}", stringify(&args[0]));
            Ok(Value::Nothing)
        }
        Builtin::VectorLength => {
            let Value::Vector(v) = this.expect("bound receiver") else {
                unreachable!("lookup_method only binds vector.length to a vector")
            };
            Ok(Value::Int(v.borrow().len() as i64))
        }
        Builtin::VectorAppend => {
            let Value::Vector(v) = this.expect("bound receiver") else {
                unreachable!("lookup_method only binds vector.append to a vector")
            };
            v.borrow_mut().push(args[0].clone());
            Ok(Value::Nothing)
        }
        Builtin::StringLength => {
            let Value::Str(s) = this.expect("bound receiver") else {
                unreachable!("lookup_method only binds string.length to a string")
            };
            Ok(Value::Int(s.len() as i64))
        }
        Builtin::DictLength => {
            let Value::Dict(d) = this.expect("bound receiver") else {
                unreachable!("lookup_method only binds dict.length to a dict")
            };
            Ok(Value::Int(d.borrow().len() as i64))
        }
        Builtin::DictKeys => {
            let Value::Dict(d) = this.expect("bound receiver") else {
                unreachable!("lookup_method only binds dict.keys to a dict")
            };
            let keys: Vec<Value> = d.borrow().values().map(|(k, _)| k.clone()).collect();
            Ok(Value::new_vector(keys))
        }
        Builtin::DictContains => {
            let Value::Dict(d) = this.expect("bound receiver") else {
                unreachable!("lookup_method only binds dict.contains to a dict")
            };
            let key = hash_key(&args[0], span)?;
            Ok(Value::Bool(d.borrow().contains_key(&key)))
        }
    }
}
