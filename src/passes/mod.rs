//! The three attribute-evaluation passes.
//!
//! Each pass is a [`PassDriver`](crate::engine::PassDriver) run over the
//! same token sequence: [`syntax`] builds the bare parse tree, [`types`]
//! decorates it with the typing rules, [`eval`] with rendered values. The
//! passes share one symbol table and nothing else.

pub mod eval;
pub mod syntax;
pub mod types;

pub use eval::{EvalNode, Evaluator, Payload};
pub use syntax::{SyntaxNode, TreeBuilder};
pub use types::{Ty, TypeChecker, TypeNode};
