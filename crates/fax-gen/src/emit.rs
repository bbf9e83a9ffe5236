use std::fmt::Write as _;
use std::path::Path;

use fax_lex::TokenKind;
use fax_par::{Node, NodeData, NodeKind};
use fax_util::{ErrorKind, FaxError};

use crate::symtab::{Entry, EntryKind, Table, TableRef};

/// Accumulates the single C translation unit (§4.7 rule 1): forward
/// declarations, function bodies, top-level globals, and the ordered
/// list of initializer statements `main` runs before calling the
/// program's own `main` function.
pub struct Codegen {
    forward_decls: String,
    functions: String,
    globals: String,
    main_inits: Vec<String>,
    label_counter: u32,
}

/// Per-function-body emission state: each function gets its own
/// `localN` and `_intmdtK` counters (rule 10), but labels are shared
/// globally across the whole program.
struct FnBody<'a> {
    gen: &'a mut Codegen,
    body: String,
    local_counter: u32,
    intmdt_counter: u32,
}

impl Codegen {
    pub fn new() -> Self {
        Self {
            forward_decls: String::new(),
            functions: String::new(),
            globals: String::new(),
            main_inits: Vec::new(),
            label_counter: 0,
        }
    }

    fn fresh_label(&mut self) -> String {
        let n = self.label_counter;
        self.label_counter += 1;
        format!("L528LAB{n}")
    }

    /// Processes one file's `TOP_LEVEL` node into the running
    /// translation unit. `prefix` name-mangles everything this file
    /// declares (empty for the program's own entry file, `<alias>_`
    /// for each level of nested import), and `scope` is the compiler
    /// symbol table this file's declarations populate.
    pub fn emit_top_level(
        &mut self,
        top: &Node,
        scope: &TableRef,
        base_dir: &Path,
        prefix: &str,
    ) -> Result<(), FaxError> {
        for decl in &top.children {
            match decl.kind {
                NodeKind::VarDeclare => {
                    let NodeData::VarDecl { name, is_const } = &decl.data else {
                        unreachable!("VarDeclare always carries VarDecl data")
                    };
                    let c_name = format!("g_{prefix}{name}");
                    self.globals.push_str(&format!("RuntimeObject* {c_name};\n"));
                    let kind = if *is_const { EntryKind::Const } else { EntryKind::Var };
                    scope.borrow_mut().declare(
                        name,
                        Entry {
                            kind,
                            c_name: c_name.clone(),
                            module_table: None,
                        },
                        decl.span,
                    )?;
                    let mut fnbody = FnBody {
                        gen: self,
                        body: String::new(),
                        local_counter: 0,
                        intmdt_counter: 0,
                    };
                    let init_expr = fnbody.emit_expr(&decl.children[0], scope)?;
                    let mut stmt = fnbody.body;
                    let _ = write!(stmt, "{c_name} = {init_expr};\n");
                    self.main_inits.push(stmt);
                }
                NodeKind::FuncDeclare => {
                    let NodeData::FuncDecl { name, params } = &decl.data else {
                        unreachable!("FuncDeclare always carries FuncDecl data")
                    };
                    let c_name = format!("L528_{prefix}{name}");
                    scope.borrow_mut().declare(
                        name,
                        Entry {
                            kind: EntryKind::Func,
                            c_name: c_name.clone(),
                            module_table: None,
                        },
                        decl.span,
                    )?;
                    if prefix.is_empty() && name == "main" {
                        if params.len() > 1 {
                            return Err(FaxError::arity(
                                decl.span,
                                "'main' takes at most one parameter (the program argv vector)",
                            ));
                        }
                        let main_params = if params.is_empty() {
                            vec!["_argv".to_string()]
                        } else {
                            params.clone()
                        };
                        self.emit_function(&c_name, &main_params, &decl.children[0], scope)?;
                    } else {
                        self.emit_function(&c_name, params, &decl.children[0], scope)?;
                    }
                }
                NodeKind::ModuleImport => {
                    let NodeData::Import { path, alias } = &decl.data else {
                        unreachable!("ModuleImport always carries Import data")
                    };
                    let mangle_name = alias.clone().unwrap_or_else(|| module_stem(path));
                    let module_prefix = format!("{prefix}{mangle_name}_");
                    let full_path = base_dir.join(path);
                    let source = std::fs::read_to_string(&full_path).map_err(|e| {
                        FaxError::import(decl.span, format!("cannot read '{}': {e}", full_path.display()))
                    })?;
                    let module_top = fax_par::parse_source(&source)?;
                    let module_base = full_path.parent().unwrap_or(base_dir).to_path_buf();
                    let module_scope = Table::new_root();
                    self.emit_top_level(&module_top, &module_scope, &module_base, &module_prefix)?;
                    match alias {
                        Some(name) => {
                            scope.borrow_mut().declare(
                                name,
                                Entry {
                                    kind: EntryKind::Const,
                                    c_name: String::new(),
                                    module_table: Some(module_scope),
                                },
                                decl.span,
                            )?;
                        }
                        None => {
                            scope.borrow_mut().merge_except(&module_scope, "main");
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

    fn emit_function(
        &mut self,
        c_name: &str,
        params: &[String],
        body_node: &Node,
        enclosing: &TableRef,
    ) -> Result<(), FaxError> {
        let scope = Table::new_child(enclosing);
        for (i, param) in params.iter().enumerate() {
            scope.borrow_mut().declare(
                param,
                Entry {
                    kind: EntryKind::Const,
                    c_name: format!("arg{i}"),
                    module_table: None,
                },
                body_node.span,
            )?;
        }
        let params_c: Vec<String> = (0..params.len()).map(|i| format!("RuntimeObject* arg{i}")).collect();
        let signature = if params_c.is_empty() {
            format!("RuntimeObject* {c_name}(void)")
        } else {
            format!("RuntimeObject* {c_name}({})", params_c.join(", "))
        };
        self.forward_decls.push_str(&signature);
        self.forward_decls.push_str(";\n");

        let mut fnbody = FnBody {
            gen: self,
            body: String::new(),
            local_counter: 0,
            intmdt_counter: 0,
        };
        let returned = fnbody.emit_block(body_node, &scope)?;
        let mut body_text = fnbody.body;
        if !returned {
            body_text.push_str("return make_nothing();\n");
        }

        self.functions.push_str(&signature);
        self.functions.push_str(" {\n");
        self.functions.push_str(&indent(&body_text));
        self.functions.push_str("}\n\n");
        Ok(())
    }

    /// Assembles the final translation unit: prelude, globals,
    /// forward declarations, function bodies, and a synthesized
    /// `main` that runs every top-level initializer in source order
    /// before calling the program's own `main` (rule 1).
    pub fn finish(self) -> String {
        let mut out = String::new();
        out.push_str("#include \"runtime.h\"\n\n");
        out.push_str(&self.globals);
        out.push('\n');
        out.push_str(&self.forward_decls);
        out.push('\n');
        out.push_str(&self.functions);
        out.push_str("int main(int argc, char** argv) {\n");
        for init in &self.main_inits {
            out.push_str(&indent(init));
        }
        out.push_str("    RuntimeObject* program_argv = make_argv(argc, argv);\n");
        out.push_str("    L528_main(program_argv);\n");
        out.push_str("    return 0;\n");
        out.push_str("}\n");
        out
    }
}

fn module_stem(path: &str) -> String {
    Path::new(path)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string())
}

fn indent(text: &str) -> String {
    text.lines().map(|l| format!("    {l}\n")).collect()
}

impl<'a> FnBody<'a> {
    fn fresh_local(&mut self) -> String {
        let n = self.local_counter;
        self.local_counter += 1;
        format!("local{n}")
    }

    fn fresh_intmdt(&mut self) -> String {
        let n = self.intmdt_counter;
        self.intmdt_counter += 1;
        format!("_intmdt{n}")
    }

    fn stmt(&mut self, s: impl AsRef<str>) {
        self.body.push_str(s.as_ref());
        self.body.push('\n');
    }

    /// Emits a block's statements in place (§4.4: a block never opens
    /// its own scope independent of its caller's — the caller, here
    /// `emit_function`/`emit_stmt`, owns the compiler-table child
    /// scope this block's declarations populate). Returns whether the
    /// block is guaranteed to have already emitted a `return`.
    fn emit_block(&mut self, block: &Node, scope: &TableRef) -> Result<bool, FaxError> {
        let mut returned = false;
        for stmt in &block.children {
            if self.emit_stmt(stmt, scope)? {
                returned = true;
            }
        }
        Ok(returned)
    }

    fn emit_stmt(&mut self, stmt: &Node, scope: &TableRef) -> Result<bool, FaxError> {
        match stmt.kind {
            NodeKind::VarDeclare => {
                let NodeData::VarDecl { name, is_const } = &stmt.data else {
                    unreachable!("VarDeclare always carries VarDecl data")
                };
                let expr = self.emit_expr(&stmt.children[0], scope)?;
                let local = self.fresh_local();
                self.stmt(format!("RuntimeObject* {local} = {expr};"));
                let kind = if *is_const { EntryKind::Const } else { EntryKind::Var };
                scope.borrow_mut().declare(
                    name,
                    Entry {
                        kind,
                        c_name: local,
                        module_table: None,
                    },
                    stmt.span,
                )?;
                Ok(false)
            }
            NodeKind::While => {
                let top_label = self.gen.fresh_label();
                let end_label = self.gen.fresh_label();
                self.stmt(format!("{top_label}:;"));
                let cond = self.emit_expr(&stmt.children[0], scope)?;
                self.stmt(format!("if (!get_conditional_result({cond})) goto {end_label};"));
                let body_scope = Table::new_child(scope);
                self.emit_block(&stmt.children[1], &body_scope)?;
                self.stmt(format!("goto {top_label};"));
                self.stmt(format!("{end_label}:;"));
                Ok(false)
            }
            NodeKind::If => {
                let cond = self.emit_expr(&stmt.children[0], scope)?;
                self.stmt(format!("if (get_conditional_result({cond})) {{"));
                let then_scope = Table::new_child(scope);
                let then_returns = self.emit_block(&stmt.children[1], &then_scope)?;
                self.stmt("} else {");
                let else_returns = if let Some(else_branch) = stmt.children.get(2) {
                    if else_branch.kind == NodeKind::If {
                        self.emit_stmt(else_branch, scope)?
                    } else {
                        let else_scope = Table::new_child(scope);
                        self.emit_block(else_branch, &else_scope)?
                    }
                } else {
                    false
                };
                self.stmt("}");
                Ok(then_returns && else_returns)
            }
            NodeKind::Return => {
                let expr = self.emit_expr(&stmt.children[0], scope)?;
                self.stmt(format!("return {expr};"));
                Ok(true)
            }
            NodeKind::AssignOp => {
                self.emit_assign(stmt, scope)?;
                Ok(false)
            }
            _ => {
                let expr = self.emit_expr(stmt, scope)?;
                self.stmt(format!("{expr};"));
                Ok(false)
            }
        }
    }

    fn emit_assign(&mut self, node: &Node, scope: &TableRef) -> Result<(), FaxError> {
        let NodeData::AssignOp(op) = node.data else {
            unreachable!("AssignOp always carries AssignOp data")
        };
        let compound = compound_to_binary(op);
        let lhs = &node.children[0];
        let rhs = self.emit_expr(&node.children[1], scope)?;

        match lhs.kind {
            NodeKind::VarLookup => {
                let NodeData::Ident(name) = &lhs.data else {
                    unreachable!("VarLookup always carries Ident data")
                };
                let entry = Table::lookup(scope, name, lhs.span)?;
                if entry.kind == EntryKind::Const {
                    return Err(FaxError::resolution(node.span, format!("cannot assign to const '{name}'")));
                }
                let new_value = match compound {
                    Some(base) => {
                        let f = binary_runtime_fn(base).expect("compound base op is always binary");
                        format!("{f}({}, {rhs})", entry.c_name)
                    }
                    None => rhs,
                };
                self.stmt(format!("{} = {new_value};", entry.c_name));
                Ok(())
            }
            NodeKind::IndexAccess => {
                let container = self.emit_expr(&lhs.children[0], scope)?;
                let container_local = self.fresh_intmdt();
                self.stmt(format!("RuntimeObject* {container_local} = {container};"));
                let index = self.emit_expr(&lhs.children[1], scope)?;
                let index_local = self.fresh_intmdt();
                self.stmt(format!("RuntimeObject* {index_local} = {index};"));
                let new_value = match compound {
                    Some(base) => {
                        let f = binary_runtime_fn(base).expect("compound base op is always binary");
                        format!("{f}(get_index({container_local}, {index_local}), {rhs})")
                    }
                    None => rhs,
                };
                self.stmt(format!("set_index({container_local}, {index_local}, {new_value});"));
                Ok(())
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

    fn emit_expr(&mut self, node: &Node, scope: &TableRef) -> Result<String, FaxError> {
        match node.kind {
            NodeKind::BoolLiteral => {
                let NodeData::Bool(b) = node.data else { unreachable!() };
                Ok(format!("make_bool({})", if b { 1 } else { 0 }))
            }
            NodeKind::IntLiteral => {
                let NodeData::Int(i) = node.data else { unreachable!() };
                Ok(format!("make_int({i}LL)"))
            }
            NodeKind::FloatLiteral => {
                let NodeData::Float(f) = node.data else { unreachable!() };
                Ok(format!("make_float({f:?})"))
            }
            NodeKind::StringLiteral => {
                let NodeData::Str(s) = &node.data else { unreachable!() };
                Ok(format!("make_string({})", c_string_literal(s)))
            }
            NodeKind::NothingLiteral => Ok("make_nothing()".to_string()),
            NodeKind::VarLookup => {
                let NodeData::Ident(name) = &node.data else { unreachable!() };
                let entry = Table::lookup(scope, name, node.span)?;
                Ok(entry.c_name)
            }
            NodeKind::BinaryOp => {
                let NodeData::BinOp(op) = node.data else { unreachable!() };
                let lhs = self.emit_expr(&node.children[0], scope)?;
                let rhs = self.emit_expr(&node.children[1], scope)?;
                let f = binary_runtime_fn(op)
                    .ok_or_else(|| FaxError::new(ErrorKind::Internal, node.span, format!("{op:?} is not binary")))?;
                Ok(format!("{f}({lhs}, {rhs})"))
            }
            NodeKind::UnaryOp => {
                let NodeData::UnaryOp(op) = node.data else { unreachable!() };
                let operand = self.emit_expr(&node.children[0], scope)?;
                let f = match op {
                    TokenKind::Minus => "op_umin",
                    TokenKind::Bang => "op_unot",
                    _ => {
                        return Err(FaxError::new(
                            ErrorKind::Internal,
                            node.span,
                            format!("{op:?} is not unary"),
                        ))
                    }
                };
                Ok(format!("{f}({operand})"))
            }
            NodeKind::VecLiteral => {
                let local = self.fresh_intmdt();
                self.stmt(format!(
                    "RuntimeObject* {local} = make_vector_known_size({});",
                    node.children.len()
                ));
                for (i, elem) in node.children.iter().enumerate() {
                    let elem_expr = self.emit_expr(elem, scope)?;
                    self.stmt(format!("set_index({local}, make_int({i}LL), {elem_expr});"));
                }
                Ok(local)
            }
            NodeKind::DictLiteral => {
                let local = self.fresh_intmdt();
                self.stmt(format!("RuntimeObject* {local} = make_dict();"));
                for pair in node.children.chunks_exact(2) {
                    let key_expr = self.emit_expr(&pair[0], scope)?;
                    let value_expr = self.emit_expr(&pair[1], scope)?;
                    self.stmt(format!("set_index({local}, {key_expr}, {value_expr});"));
                }
                Ok(local)
            }
            NodeKind::IndexAccess => {
                let container = self.emit_expr(&node.children[0], scope)?;
                let index = self.emit_expr(&node.children[1], scope)?;
                Ok(format!("get_index({container}, {index})"))
            }
            NodeKind::FieldAccess => self.emit_field_read(node, scope),
            NodeKind::FuncCall => self.emit_call(node, scope),
            other => Err(FaxError::new(
                ErrorKind::Internal,
                node.span,
                format!("{other:?} cannot appear in expression position"),
            )),
        }
    }

    /// Resolves a `FIELD_ACCESS` statically when its base is a known
    /// module (an import binds a nested compiler table, so
    /// `m.answer`/`m.double` are ordinary named references, not
    /// runtime dispatch); otherwise falls back to the runtime's
    /// `field_access`, which is how built-in methods on vectors,
    /// dicts, and strings are resolved (§4.6) since their receiver's
    /// shape is not known until the value exists at runtime.
    fn emit_field_read(&mut self, node: &Node, scope: &TableRef) -> Result<String, FaxError> {
        let NodeData::FieldName(field) = &node.data else {
            unreachable!("FieldAccess always carries FieldName data")
        };
        if let Some(entry) = self.resolve_module_field(&node.children[0], field, scope)? {
            return Ok(entry.c_name);
        }
        let obj = self.emit_expr(&node.children[0], scope)?;
        Ok(format!("field_access({obj}, {})", c_string_literal(field)))
    }

    fn resolve_module_field(
        &self,
        base: &Node,
        field: &str,
        scope: &TableRef,
    ) -> Result<Option<Entry>, FaxError> {
        if base.kind != NodeKind::VarLookup {
            return Ok(None);
        }
        let NodeData::Ident(name) = &base.data else {
            unreachable!("VarLookup always carries Ident data")
        };
        let entry = Table::lookup(scope, name, base.span)?;
        match entry.module_table {
            Some(module_table) => Ok(Some(Table::lookup(&module_table, field, base.span)?)),
            None => Ok(None),
        }
    }

    fn emit_call(&mut self, node: &Node, scope: &TableRef) -> Result<String, FaxError> {
        let callee = &node.children[0];
        let args_node = &node.children[1];

        match callee.kind {
            NodeKind::VarLookup => {
                let NodeData::Ident(name) = &callee.data else { unreachable!() };
                let entry = Table::lookup(scope, name, callee.span)?;
                match entry.kind {
                    EntryKind::Func | EntryKind::Builtin => {
                        let args = self.emit_args(args_node, scope)?;
                        Ok(format!("{}({})", entry.c_name, args.join(", ")))
                    }
                    EntryKind::Var | EntryKind::Const => {
                        self.emit_dynamic_call(entry.c_name, args_node, scope, None)
                    }
                }
            }
            NodeKind::FieldAccess => {
                let NodeData::FieldName(field) = &callee.data else { unreachable!() };
                if let Some(entry) = self.resolve_module_field(&callee.children[0], field, scope)? {
                    if entry.kind == EntryKind::Func {
                        let args = self.emit_args(args_node, scope)?;
                        return Ok(format!("{}({})", entry.c_name, args.join(", ")));
                    }
                    return self.emit_dynamic_call(entry.c_name, args_node, scope, None);
                }
                let obj = self.emit_expr(&callee.children[0], scope)?;
                let obj_local = self.fresh_intmdt();
                self.stmt(format!("RuntimeObject* {obj_local} = {obj};"));
                let fn_expr = format!("field_access({obj_local}, {})", c_string_literal(field));
                self.emit_dynamic_call(fn_expr, args_node, scope, Some(obj_local))
            }
            _ => {
                let fn_expr = self.emit_expr(callee, scope)?;
                self.emit_dynamic_call(fn_expr, args_node, scope, None)
            }
        }
    }

    fn emit_args(&mut self, args_node: &Node, scope: &TableRef) -> Result<Vec<String>, FaxError> {
        args_node.children.iter().map(|a| self.emit_expr(a, scope)).collect()
    }

    fn emit_dynamic_call(
        &mut self,
        fn_expr: String,
        args_node: &Node,
        scope: &TableRef,
        prepend_obj: Option<String>,
    ) -> Result<String, FaxError> {
        let mut args = self.emit_args(args_node, scope)?;
        if let Some(obj) = prepend_obj {
            args.insert(0, obj);
        }
        let argv_local = self.fresh_intmdt();
        if args.is_empty() {
            self.stmt(format!("RuntimeObject** {argv_local} = NULL;"));
        } else {
            self.stmt(format!(
                "RuntimeObject* {argv_local}[{}] = {{ {} }};",
                args.len(),
                args.join(", ")
            ));
        }
        Ok(format!("dynamic_function_call({fn_expr}, {}, {argv_local})", args.len()))
    }
}

/// Desugars a compound-assignment token to the binary op it stands in
/// for (`x += y` means `x = x + y`); `Eq` itself has no base op.
fn compound_to_binary(op: TokenKind) -> Option<TokenKind> {
    use TokenKind::*;
    match op {
        PlusEq => Some(Plus),
        MinusEq => Some(Minus),
        StarEq => Some(Star),
        SlashEq => Some(Slash),
        PercentEq => Some(Percent),
        Eq => None,
        _ => None,
    }
}

fn binary_runtime_fn(op: TokenKind) -> Option<&'static str> {
    use TokenKind::*;
    Some(match op {
        Plus => "op_add",
        Minus => "op_sub",
        Star => "op_mul",
        Slash => "op_div",
        Percent => "op_mod",
        EqEq => "op_eq",
        BangEq => "op_neq",
        Lt => "op_lt",
        LtEq => "op_lte",
        Gt => "op_gt",
        GtEq => "op_gte",
        Amp => "op_and",
        Pipe => "op_or",
        _ => return None,
    })
}

fn c_string_literal(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            other => out.push(other),
        }
    }
    out.push('"');
    out
}
