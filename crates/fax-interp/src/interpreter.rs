use std::path::{Path, PathBuf};
use std::rc::Rc;

use fax_par::{Node, NodeData, NodeKind};
use fax_util::{ErrorKind, FaxError, Span};
use indexmap::IndexMap;

use crate::builtins;
use crate::ops;
use crate::symtab::{EntryKind, SymbolTable, TableRef};
use crate::value::{hash_key, FunctionValue, ModuleValue, Value};

/// How a statement finished: either it ran to completion, or it hit a
/// `return` and the enclosing call should unwind with the given value
/// (§4.3: return propagates up through `if`/`while` bodies to the
/// nearest function call).
enum Flow {
    Normal,
    Return(Value),
}

/// Evaluates a full program's top-level declarations into a fresh root
/// scope (§4.3.1) and returns that scope so the caller can look up
/// `main` or any other top-level binding.
pub fn eval_top_level(top: &Node, base_dir: &Path) -> Result<TableRef, FaxError> {
    let root = SymbolTable::new_root();
    builtins::install_builtins(&root);
    eval_top_level_into(top, &root, base_dir)?;
    Ok(root)
}

fn eval_top_level_into(top: &Node, table: &TableRef, base_dir: &Path) -> Result<(), FaxError> {
    for decl in &top.children {
        match decl.kind {
            NodeKind::VarDeclare => {
                let NodeData::VarDecl { name, is_const } = &decl.data else {
                    unreachable!("VarDeclare always carries VarDecl data")
                };
                let value = eval_expr(&decl.children[0], table, base_dir)?;
                let kind = if *is_const { EntryKind::Const } else { EntryKind::Var };
                table.borrow_mut().declare(name, kind, value, decl.span)?;
            }
            NodeKind::FuncDeclare => {
                let NodeData::FuncDecl { name, params } = &decl.data else {
                    unreachable!("FuncDeclare always carries FuncDecl data")
                };
                let func = Value::Function(Rc::new(FunctionValue {
                    name: name.clone(),
                    params: Rc::new(params.clone()),
                    body: Rc::new(decl.children[0].clone()),
                    home: Rc::clone(table),
                    bound_this: None,
                    native: None,
                }));
                table
                    .borrow_mut()
                    .declare(name, EntryKind::Const, func, decl.span)?;
            }
            NodeKind::ModuleImport => {
                let NodeData::Import { path, alias } = &decl.data else {
                    unreachable!("ModuleImport always carries Import data")
                };
                let module_table = do_import(path, base_dir, decl.span)?;
                match alias {
                    Some(name) => {
                        let module = Value::Module(Rc::new(ModuleValue {
                            name: name.clone(),
                            table: module_table,
                        }));
                        table
                            .borrow_mut()
                            .declare(name, EntryKind::Const, module, decl.span)?;
                    }
                    None => {
                        table.borrow_mut().merge_except(&module_table, "main");
                    }
                }
            }
            other => {
                return Err(FaxError::new(
                    ErrorKind::Internal,
                    decl.span,
                    format!("{other:?} cannot appear at top level"),
                ))
            }
        }
    }
    Ok(())
}

/// Loads, parses, and evaluates an imported file into its own root
/// scope (§4.3.3), returning that scope's table. `base_dir` is the
/// *importing* file's own directory, not the process's working
/// directory, so a chain of nested imports each resolve relative to
/// the file that referenced them. The caller decides, based on
/// whether the import carried an `as` alias, whether to wrap this
/// table as a module value or merge its entries directly (§4.4.4).
fn do_import(path: &str, base_dir: &Path, span: Span) -> Result<TableRef, FaxError> {
    let full_path = base_dir.join(path);
    let source = std::fs::read_to_string(&full_path).map_err(|e| {
        FaxError::import(span, format!("cannot read '{}': {e}", full_path.display()))
    })?;
    let tokens = fax_lex::lex(&source)?;
    let top = fax_par::parse(tokens)?;
    let module_base: PathBuf = full_path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| base_dir.to_path_buf());
    eval_top_level(&top, &module_base)
}

/// Calls a function value with already-evaluated arguments (§4.3.2 /
/// §4.6), dispatching to either a language-level call frame or a
/// native built-in.
pub fn call_function(
    func: &Rc<FunctionValue>,
    args: Vec<Value>,
    base_dir: &Path,
    span: Span,
) -> Result<Value, FaxError> {
    if args.len() != func.params.len() {
        return Err(FaxError::arity(
            span,
            format!(
                "{} expects {} argument(s), got {}",
                func.name,
                func.params.len(),
                args.len()
            ),
        ));
    }
    if let Some(builtin) = func.native {
        return builtins::dispatch(builtin, func.bound_this.as_deref(), &args, span);
    }
    let call_scope = SymbolTable::new_child(&func.home);
    for (param, arg) in func.params.iter().zip(args) {
        call_scope
            .borrow_mut()
            .declare(param, EntryKind::Const, arg, span)?;
    }
    match exec_block(&func.body, &call_scope, base_dir)? {
        Flow::Return(value) => Ok(value),
        Flow::Normal => Ok(Value::Nothing),
    }
}

/// Executes a `BLOCK` node's statements in the scope its caller
/// already prepared. A block never opens its own child scope — `if`,
/// `while`, and function calls each create exactly one child scope
/// before handing control to the blocks they own, so a block's
/// statements share that single scope rather than nesting an extra,
/// invisible layer per block.
fn exec_block(block: &Node, scope: &TableRef, base_dir: &Path) -> Result<Flow, FaxError> {
    for stmt in &block.children {
        if let Flow::Return(value) = exec_stmt(stmt, scope, base_dir)? {
            return Ok(Flow::Return(value));
        }
    }
    Ok(Flow::Normal)
}

fn exec_stmt(stmt: &Node, scope: &TableRef, base_dir: &Path) -> Result<Flow, FaxError> {
    match stmt.kind {
        NodeKind::VarDeclare => {
            let NodeData::VarDecl { name, is_const } = &stmt.data else {
                unreachable!("VarDeclare always carries VarDecl data")
            };
            let value = eval_expr(&stmt.children[0], scope, base_dir)?;
            let kind = if *is_const { EntryKind::Const } else { EntryKind::Var };
            scope.borrow_mut().declare(name, kind, value, stmt.span)?;
            Ok(Flow::Normal)
        }
        NodeKind::While => {
            loop {
                let cond = eval_expr(&stmt.children[0], scope, base_dir)?;
                if !ops::condition_truthiness(&cond, stmt.children[0].span)? {
                    break;
                }
                let body_scope = SymbolTable::new_child(scope);
                if let Flow::Return(value) = exec_block(&stmt.children[1], &body_scope, base_dir)? {
                    return Ok(Flow::Return(value));
                }
            }
            Ok(Flow::Normal)
        }
        NodeKind::If => {
            let cond = eval_expr(&stmt.children[0], scope, base_dir)?;
            if ops::condition_truthiness(&cond, stmt.children[0].span)? {
                let then_scope = SymbolTable::new_child(scope);
                exec_block(&stmt.children[1], &then_scope, base_dir)
            } else if let Some(else_branch) = stmt.children.get(2) {
                if else_branch.kind == NodeKind::If {
                    exec_stmt(else_branch, scope, base_dir)
                } else {
                    let else_scope = SymbolTable::new_child(scope);
                    exec_block(else_branch, &else_scope, base_dir)
                }
            } else {
                Ok(Flow::Normal)
            }
        }
        NodeKind::Return => {
            let value = eval_expr(&stmt.children[0], scope, base_dir)?;
            Ok(Flow::Return(value))
        }
        NodeKind::AssignOp => {
            exec_assign(stmt, scope, base_dir)?;
            Ok(Flow::Normal)
        }
        _ => {
            eval_expr(stmt, scope, base_dir)?;
            Ok(Flow::Normal)
        }
    }
}

fn exec_assign(node: &Node, scope: &TableRef, base_dir: &Path) -> Result<(), FaxError> {
    let NodeData::AssignOp(op) = node.data else {
        unreachable!("AssignOp always carries AssignOp data")
    };
    let lhs = &node.children[0];
    let rhs_value = eval_expr(&node.children[1], scope, base_dir)?;

    let combine = |current: Value, span: Span| -> Result<Value, FaxError> {
        match ops::compound_to_binary(op) {
            Some(bin_op) => ops::apply_binary(bin_op, current, rhs_value.clone(), span),
            None => Ok(rhs_value.clone()),
        }
    };

    match lhs.kind {
        NodeKind::VarLookup => {
            let NodeData::Ident(name) = &lhs.data else {
                unreachable!("VarLookup always carries Ident data")
            };
            let current = SymbolTable::lookup(scope, name, lhs.span)?;
            let new_value = combine(current, node.span)?;
            SymbolTable::assign(scope, name, new_value, node.span)
        }
        NodeKind::IndexAccess => {
            let target = eval_expr(&lhs.children[0], scope, base_dir)?;
            let index_value = eval_expr(&lhs.children[1], scope, base_dir)?;
            match target {
                Value::Vector(v) => {
                    let idx = vector_index(&index_value, v.borrow().len(), lhs.span)?;
                    let current = v.borrow()[idx].clone();
                    let new_value = combine(current, node.span)?;
                    v.borrow_mut()[idx] = new_value;
                    Ok(())
                }
                Value::Dict(d) => {
                    let key = hash_key(&index_value, lhs.span)?;
                    let current = match ops::compound_to_binary(op) {
                        Some(_) => d
                            .borrow()
                            .get(&key)
                            .map(|(_, v)| v.clone())
                            .ok_or_else(|| FaxError::bounds(lhs.span, "key not found in dict"))?,
                        None => Value::Nothing,
                    };
                    let new_value = combine(current, node.span)?;
                    d.borrow_mut().insert(key, (index_value, new_value));
                    Ok(())
                }
                other => Err(FaxError::type_error(
                    lhs.span,
                    format!("cannot index into {}", other.type_name()),
                )),
            }
        }
        NodeKind::FieldAccess => Err(FaxError::type_error(
            lhs.span,
            "field access is not a valid assignment target",
        )),
        other => Err(FaxError::new(
            ErrorKind::Internal,
            lhs.span,
            format!("{other:?} is not a valid assignment target"),
        )),
    }
}

fn vector_index(value: &Value, len: usize, span: Span) -> Result<usize, FaxError> {
    match value {
        Value::Int(i) if *i >= 0 && (*i as usize) < len => Ok(*i as usize),
        Value::Int(i) => Err(FaxError::bounds(span, format!("index {i} out of range"))),
        other => Err(FaxError::type_error(
            span,
            format!("index must be int, found {}", other.type_name()),
        )),
    }
}

fn eval_expr(node: &Node, scope: &TableRef, base_dir: &Path) -> Result<Value, FaxError> {
    match node.kind {
        NodeKind::BoolLiteral => {
            let NodeData::Bool(b) = node.data else {
                unreachable!()
            };
            Ok(Value::Bool(b))
        }
        NodeKind::IntLiteral => {
            let NodeData::Int(i) = node.data else {
                unreachable!()
            };
            Ok(Value::Int(i))
        }
        NodeKind::FloatLiteral => {
            let NodeData::Float(f) = node.data else {
                unreachable!()
            };
            Ok(Value::Float(f))
        }
        NodeKind::StringLiteral => {
            let NodeData::Str(s) = &node.data else {
                unreachable!()
            };
            Ok(Value::new_str(s.clone()))
        }
        NodeKind::NothingLiteral => Ok(Value::Nothing),
        NodeKind::VarLookup => {
            let NodeData::Ident(name) = &node.data else {
                unreachable!()
            };
            SymbolTable::lookup(scope, name, node.span)
        }
        NodeKind::BinaryOp => {
            let NodeData::BinOp(op) = node.data else {
                unreachable!()
            };
            let lhs = eval_expr(&node.children[0], scope, base_dir)?;
            let rhs = eval_expr(&node.children[1], scope, base_dir)?;
            ops::apply_binary(op, lhs, rhs, node.span)
        }
        NodeKind::UnaryOp => {
            let NodeData::UnaryOp(op) = node.data else {
                unreachable!()
            };
            let operand = eval_expr(&node.children[0], scope, base_dir)?;
            ops::apply_unary(op, operand, node.span)
        }
        NodeKind::VecLiteral => {
            let mut items = Vec::with_capacity(node.children.len());
            for child in &node.children {
                items.push(eval_expr(child, scope, base_dir)?);
            }
            Ok(Value::new_vector(items))
        }
        NodeKind::DictLiteral => {
            let mut data = IndexMap::new();
            for pair in node.children.chunks_exact(2) {
                let key_value = eval_expr(&pair[0], scope, base_dir)?;
                let value = eval_expr(&pair[1], scope, base_dir)?;
                let key = hash_key(&key_value, pair[0].span)?;
                data.insert(key, (key_value, value));
            }
            Ok(Value::new_dict(data))
        }
        NodeKind::IndexAccess => {
            let target = eval_expr(&node.children[0], scope, base_dir)?;
            let index_value = eval_expr(&node.children[1], scope, base_dir)?;
            match target {
                Value::Vector(v) => {
                    let idx = vector_index(&index_value, v.borrow().len(), node.span)?;
                    Ok(v.borrow()[idx].clone())
                }
                Value::Dict(d) => {
                    let key = hash_key(&index_value, node.span)?;
                    d.borrow()
                        .get(&key)
                        .map(|(_, v)| v.clone())
                        .ok_or_else(|| FaxError::bounds(node.span, "key not found in dict"))
                }
                Value::Str(s) => {
                    let bytes = s.as_bytes();
                    let idx = vector_index(&index_value, bytes.len(), node.span)?;
                    Ok(Value::new_str(String::from_utf8_lossy(&bytes[idx..idx + 1]).into_owned()))
                }
                other => Err(FaxError::type_error(
                    node.span,
                    format!("cannot index into {}", other.type_name()),
                )),
            }
        }
        NodeKind::FieldAccess => {
            let NodeData::FieldName(field) = &node.data else {
                unreachable!()
            };
            let target = eval_expr(&node.children[0], scope, base_dir)?;
            if let Some(method) = builtins::lookup_method(&target, field) {
                return Ok(method);
            }
            match target {
                Value::Module(module) => SymbolTable::lookup(&module.table, field, node.span),
                other => Err(FaxError::type_error(
                    node.span,
                    format!("{} has no field or method '{}'", other.type_name(), field),
                )),
            }
        }
        NodeKind::FuncCall => {
            let callee = eval_expr(&node.children[0], scope, base_dir)?;
            let Value::Function(func) = callee else {
                return Err(FaxError::type_error(
                    node.span,
                    format!("cannot call a {}", callee.type_name()),
                ));
            };
            let mut args = Vec::with_capacity(node.children[1].children.len());
            for arg_node in &node.children[1].children {
                args.push(eval_expr(arg_node, scope, base_dir)?);
            }
            call_function(&func, args, base_dir, node.span)
        }
        other => Err(FaxError::new(
            ErrorKind::Internal,
            node.span,
            format!("{other:?} cannot appear in expression position"),
        )),
    }
}

/// Convenience entry point: parse and evaluate a full program's top
/// level, then call its `main` function with `argv` (§6.2's `--exec`
/// mode and §4.3.1).
pub fn run_program(source: &str, base_dir: &Path, argv: Vec<Value>) -> Result<Value, FaxError> {
    let top = fax_par::parse_source(source)?;
    let root = eval_top_level(&top, base_dir)?;
    let main_fn = SymbolTable::lookup(&root, "main", Span::DUMMY)?;
    let Value::Function(func) = main_fn else {
        return Err(FaxError::resolution(Span::DUMMY, "'main' is not a function"));
    };
    call_function(&func, argv, base_dir, Span::DUMMY)
}
