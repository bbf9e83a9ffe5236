use std::cell::RefCell;
use std::rc::Rc;

use fax_util::{ErrorKind, FaxError, Span};
use rustc_hash::FxHashMap;

/// Mirrors the interpreter's nested-table model (§4.7 rule 3): a
/// compile-time symbol table tracks, per name, whether it is a
/// constant, a mutable local/global, a source-level function, a
/// built-in method/function, or an imported module's own table.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum EntryKind {
    Const,
    Var,
    Func,
    Builtin,
}

#[derive(Clone)]
pub struct Entry {
    pub kind: EntryKind,
    /// The C identifier this name compiles to: a `localN`/`argN`/`g_*`
    /// variable for Const/Var, or an `L528_*` function name for
    /// Func/Builtin.
    pub c_name: String,
    /// Present only for Const entries bound to an imported module:
    /// the nested table field access resolves names against.
    pub module_table: Option<TableRef>,
}

pub struct Table {
    entries: FxHashMap<String, Entry>,
    parent: Option<TableRef>,
}

pub type TableRef = Rc<RefCell<Table>>;

impl Table {
    pub fn new_root() -> TableRef {
        Rc::new(RefCell::new(Table {
            entries: FxHashMap::default(),
            parent: None,
        }))
    }

    pub fn new_child(parent: &TableRef) -> TableRef {
        Rc::new(RefCell::new(Table {
            entries: FxHashMap::default(),
            parent: Some(Rc::clone(parent)),
        }))
    }

    pub fn declare(&mut self, name: &str, entry: Entry, span: Span) -> Result<(), FaxError> {
        if self.entries.contains_key(name) {
            return Err(FaxError::new(
                ErrorKind::Resolution,
                span,
                format!("'{name}' is already declared in this scope"),
            ));
        }
        self.entries.insert(name.to_string(), entry);
        Ok(())
    }

    pub fn lookup(this: &TableRef, name: &str, span: Span) -> Result<Entry, FaxError> {
        let table = this.borrow();
        if let Some(entry) = table.entries.get(name) {
            return Ok(entry.clone());
        }
        match &table.parent {
            Some(parent) => Table::lookup(parent, name, span),
            None => Err(FaxError::new(
                ErrorKind::Resolution,
                span,
                format!("undefined name '{name}'"),
            )),
        }
    }

    /// Copies every entry from `other` except `skip` directly into this
    /// scope, mirroring the interpreter's unnamed-import merge (§4.4.4):
    /// an import without an `as` alias exposes the imported file's own
    /// top-level names directly rather than through a nested module
    /// table, so unqualified calls to them compile the same way a call
    /// to a locally declared function would.
    pub fn merge_except(&mut self, other: &TableRef, skip: &str) {
        let other = other.borrow();
        for (name, entry) in other.entries.iter() {
            if name != skip {
                self.entries.insert(name.clone(), entry.clone());
            }
        }
    }
}
