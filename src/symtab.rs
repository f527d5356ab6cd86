//! # symtab
//!
//! The session symbol table, shared by all three passes over one program.
//!
//! Built on [`indexmap::IndexMap`] so entries keep their first-seen order.
//! The lexer registers every identifier it meets with everything unresolved;
//! the type pass fills in declared types (`let` declarations and set-builder
//! bound variables); the evaluation pass binds values. The table outlives
//! the passes and is handed to each one by mutable reference.
//!
//! ## Example
//! ```rust
//! # use setalg::{SymTab, DeclTy, Value};
//! let mut st = SymTab::new();
//! st.register("x");
//! assert_eq!(st.ty("x"), Some(DeclTy::Unresolved));
//! st.declare("x", DeclTy::Integer).unwrap();
//! st.set_value("x", Value::Int(5));
//! assert_eq!(st.ty("x"), Some(DeclTy::Integer));
//! assert!(st.declare("x", DeclTy::Set).is_err()); // redeclaration
//! ```

use crate::value::Value;
use indexmap::IndexMap;
use smartstring::alias::String;
use thiserror::Error;

/// Errors that can occur when operating on a [`SymTab`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SymTabError {
    /// A `let` declaration named an identifier that an earlier `let`
    /// already declared. The original binding is left untouched.
    #[error("identifier {name:?} is already declared")]
    Redeclared { name: String },
}

/// What a name is currently known to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclTy {
    /// Seen by the lexer, not declared by anything yet.
    Unresolved,
    Integer,
    Set,
}

impl DeclTy {
    pub fn as_str(self) -> &'static str {
        match self {
            DeclTy::Unresolved => "unresolved",
            DeclTy::Integer => "integer",
            DeclTy::Set => "set",
        }
    }
}

#[derive(Debug, Clone)]
struct Symbol {
    ty: DeclTy,
    /// Set only by `let` declarations; binders and lexer registration
    /// leave it false. Guards the redeclaration check.
    declared: bool,
    value: Option<Value>,
}

impl Symbol {
    fn unresolved() -> Self {
        Symbol {
            ty: DeclTy::Unresolved,
            declared: false,
            value: None,
        }
    }
}

/// The shared symbol table. One instance per analyzed program.
#[derive(Debug, Default)]
pub struct SymTab {
    tab: IndexMap<String, Symbol>,
}

impl SymTab {
    /// Creates a new, empty symbol table.
    pub fn new() -> Self {
        Self {
            tab: IndexMap::new(),
        }
    }

    /// Number of distinct names seen so far.
    pub fn len(&self) -> usize {
        self.tab.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tab.is_empty()
    }

    /// Registers a name the lexer has seen. First registration creates an
    /// unresolved entry; later ones are no-ops.
    pub fn register(&mut self, name: &str) {
        self.tab
            .entry(String::from(name))
            .or_insert_with(Symbol::unresolved);
    }

    /// Declares a name via `let`. Fails if a previous `let` already
    /// declared it, leaving the existing entry unchanged.
    pub fn declare(&mut self, name: &str, ty: DeclTy) -> Result<(), SymTabError> {
        let sym = self
            .tab
            .entry(String::from(name))
            .or_insert_with(Symbol::unresolved);
        if sym.declared {
            return Err(SymTabError::Redeclared {
                name: String::from(name),
            });
        }
        sym.ty = ty;
        sym.declared = true;
        Ok(())
    }

    /// Registers a set-builder bound variable as an integer. Binders are
    /// not declarations: this upserts unconditionally and never trips the
    /// redeclaration check, so `{a:a>0} U {a:a<5}` stays legal.
    pub fn bind_var(&mut self, name: &str) {
        let sym = self
            .tab
            .entry(String::from(name))
            .or_insert_with(Symbol::unresolved);
        sym.ty = DeclTy::Integer;
    }

    /// The declared type of a name, or `None` if the name was never seen.
    pub fn ty(&self, name: &str) -> Option<DeclTy> {
        self.tab.get(name).map(|s| s.ty)
    }

    /// Binds a value to a name. Rebinding overwrites: the evaluation pass
    /// does not police declarations, the type pass does.
    pub fn set_value(&mut self, name: &str, value: Value) {
        let sym = self
            .tab
            .entry(String::from(name))
            .or_insert_with(Symbol::unresolved);
        sym.value = Some(value);
    }

    /// The current value of a name, if any pass has bound one.
    pub fn value(&self, name: &str) -> Option<&Value> {
        self.tab.get(name).and_then(|s| s.value.as_ref())
    }
}
