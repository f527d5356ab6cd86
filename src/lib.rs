//! A compiler front end for a small set-algebra language.
//!
//! Programs declare integers and predicate-defined sets, then ask for one
//! result: `let int x be 5 . show x + 1 .` The front end tokenizes the
//! source, parses it three times with one table-driven shift-reduce engine,
//! and produces a tree per pass: plain syntax, attribute types, and
//! evaluated values. Sets stay symbolic; membership interprets a set's
//! defining predicate instead of enumerating elements.
//!
//! [`Pipeline`] is the whole front end behind one call:
//!
//! ```
//! use setalg::Pipeline;
//!
//! let analysis = Pipeline::bundled()?.run("show 2 + 3 .")?;
//! assert_eq!(analysis.eval.unwrap().value(), "5");
//! # Ok::<(), anyhow::Error>(())
//! ```
//!
//! The individual stages are public too: [`lexer::tokenize`] for tokens,
//! [`Tables`] for loading parse tables from their CSV and grammar-listing
//! assets, and [`Engine`] with a [`PassDriver`] for running a single pass.

pub mod engine;
pub mod error;
pub mod grammar;
pub mod lexer;
pub mod passes;
pub mod pipeline;
pub mod symtab;
pub mod tables;
pub mod token;
pub mod value;

pub use crate::engine::{Engine, PassDriver};
pub use crate::error::{
    EngineError, EvalError, LexicalError, PassError, SyntaxError, TableError,
};
pub use crate::grammar::{NonTerm, Prod};
pub use crate::lexer::tokenize;
pub use crate::passes::{EvalNode, Evaluator, SyntaxNode, TreeBuilder, Ty, TypeChecker, TypeNode};
pub use crate::pipeline::{Analysis, Pipeline};
pub use crate::symtab::{DeclTy, SymTab, SymTabError};
pub use crate::tables::{Action, Tables};
pub use crate::token::{Token, TokenKind};
pub use crate::value::{PredExpr, Predicate, RelOp, SetValue, Value};
