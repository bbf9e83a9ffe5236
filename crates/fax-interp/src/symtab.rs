use std::cell::RefCell;
use std::rc::Rc;

use fax_util::{ErrorKind, FaxError, Span};
use rustc_hash::FxHashMap;

use crate::value::Value;

/// Whether a binding was declared `let` or `const` (§3.1). Reassigning
/// a `const` binding through `ASSIGN_OP` is a resolution error.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntryKind {
    Var,
    Const,
}

pub struct Entry {
    pub kind: EntryKind,
    pub value: Value,
}

/// A lexical scope (§4.4.1). `parent` owns a strong reference to the
/// enclosing scope rather than a borrow, since a function's `home`
/// table must outlive every call scope chained to it regardless of
/// how long the call takes — there is no single enclosing stack frame
/// a borrow could anchor to once functions are first-class values.
pub struct SymbolTable {
    entries: FxHashMap<String, Entry>,
    parent: Option<TableRef>,
}

pub type TableRef = Rc<RefCell<SymbolTable>>;

impl SymbolTable {
    pub fn new_root() -> TableRef {
        Rc::new(RefCell::new(SymbolTable {
            entries: FxHashMap::default(),
            parent: None,
        }))
    }

    pub fn new_child(parent: &TableRef) -> TableRef {
        Rc::new(RefCell::new(SymbolTable {
            entries: FxHashMap::default(),
            parent: Some(Rc::clone(parent)),
        }))
    }

    /// Declares a new binding in this scope only. Redeclaring a name
    /// already present in this same scope is a resolution error
    /// (§4.4.1); shadowing an outer scope's binding is allowed.
    pub fn declare(
        &mut self,
        name: &str,
        kind: EntryKind,
        value: Value,
        span: Span,
    ) -> Result<(), FaxError> {
        if self.entries.contains_key(name) {
            return Err(FaxError::new(
                ErrorKind::Resolution,
                span,
                format!("'{name}' is already declared in this scope"),
            ));
        }
        self.entries.insert(name.to_string(), Entry { kind, value });
        Ok(())
    }

    /// Looks up a name through the scope chain (§4.4.1), returning the
    /// bound value.
    pub fn lookup(this: &TableRef, name: &str, span: Span) -> Result<Value, FaxError> {
        let table = this.borrow();
        if let Some(entry) = table.entries.get(name) {
            return Ok(entry.value.clone());
        }
        match &table.parent {
            Some(parent) => SymbolTable::lookup(parent, name, span),
            None => Err(FaxError::new(
                ErrorKind::Resolution,
                span,
                format!("undefined name '{name}'"),
            )),
        }
    }

    /// Reassigns an existing binding through the scope chain, checking
    /// const-ness at the scope where the name is actually bound.
    pub fn assign(this: &TableRef, name: &str, value: Value, span: Span) -> Result<(), FaxError> {
        let mut table = this.borrow_mut();
        if let Some(entry) = table.entries.get_mut(name) {
            if entry.kind == EntryKind::Const {
                return Err(FaxError::new(
                    ErrorKind::Resolution,
                    span,
                    format!("cannot assign to const '{name}'"),
                ));
            }
            entry.value = value;
            return Ok(());
        }
        let parent = table.parent.clone();
        drop(table);
        match parent {
            Some(parent) => SymbolTable::assign(&parent, name, value, span),
            None => Err(FaxError::new(
                ErrorKind::Resolution,
                span,
                format!("undefined name '{name}'"),
            )),
        }
    }

    /// Copies every entry from `other` except `skip` directly into this
    /// scope (§4.4.4: an unnamed `import` merges the imported file's
    /// top-level bindings straight into the importer, rather than
    /// exposing them through a module value). Unlike `declare`, this
    /// overwrites a same-named entry already present rather than
    /// erroring, matching the reference interpreter's unchecked merge.
    pub fn merge_except(&mut self, other: &TableRef, skip: &str) {
        let other = other.borrow();
        for (name, entry) in other.entries.iter() {
            if name != skip {
                self.entries.insert(
                    name.clone(),
                    Entry {
                        kind: entry.kind,
                        value: entry.value.clone(),
                    },
                );
            }
        }
    }
}
