//! Error taxonomy for the front end.
//!
//! Each pass fails on its own terms: a [`LexicalError`] aborts tokenization
//! outright, a [`SyntaxError`] aborts the pass that hit it, an [`EvalError`]
//! aborts the evaluation pass, and an [`EngineError`] marks a table/grammar
//! configuration defect rather than bad user input. Type violations are not
//! errors at all; they propagate as the `type_error` sentinel in the typed
//! tree.

use crate::grammar::NonTerm;
use crate::token::TokenKind;
use smartstring::alias::String;
use thiserror::Error;

/// Tokenization failures. Fail-fast: the whole token sequence is discarded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexicalError {
    /// A character outside the language's alphabet, including uppercase
    /// letters other than the `U`/`I` operators.
    #[error("invalid character {ch:?} at byte {pos}")]
    InvalidCharacter { ch: char, pos: usize },

    /// A numeric literal outside `[0, 4294967295]`.
    #[error("number {lexeme:?} at byte {pos} does not fit in 32 bits")]
    NumberOutOfRange { lexeme: String, pos: usize },
}

/// Failures while loading the parsing table or the grammar listing.
///
/// Malformed individual cells are not errors (they are skipped, which turns
/// into a syntax error at parse time); these cover defects that make the
/// data unusable as a whole.
#[derive(Debug, Error)]
pub enum TableError {
    #[error("parsing table has no header row")]
    MissingHeader,

    #[error("parsing table header has no S' sentinel column")]
    MissingSentinel,

    #[error("grammar line {line} is not \"<id>. <lhs> -> <rhs>\"")]
    BadRule { line: usize },

    #[error("grammar line {line}: {lhs} -> {rhs} is not a production of this language")]
    UnknownProduction {
        line: usize,
        lhs: String,
        rhs: String,
    },

    #[error("grammar listing defines rule {id} twice")]
    DuplicateRule { id: usize },

    #[error("reading table data: {0}")]
    Io(#[from] std::io::Error),
}

/// No ACTION entry for the current state and lookahead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no action for {kind} {lexeme:?} in state {state} (state stack {stack:?})")]
pub struct SyntaxError {
    pub state: usize,
    pub kind: TokenKind,
    pub lexeme: String,
    /// The automaton state stack at the point of failure, bottom first.
    pub stack: Vec<usize>,
}

/// Inconsistencies between the table, the grammar listing, and the input.
/// These cannot arise from user programs; they mean the loaded data is bad.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("reduce action references rule {id}, which the grammar listing does not define")]
    MissingRule { id: usize },

    #[error("no goto for {nt} from state {state}")]
    MissingGoto { state: usize, nt: NonTerm },

    #[error("parser stack underflow reducing rule {id}")]
    StackUnderflow { id: usize },

    #[error("shift past end of input in state {state}")]
    ShiftPastEnd { state: usize },

    #[error("accept with {frames} extra frames on the stack")]
    BadAccept { frames: usize },

    #[error("rule {id} popped {got} children, expected {want}")]
    ArityMismatch { id: usize, got: usize, want: usize },
}

/// Evaluation-pass failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    /// A predicate referenced a name that is neither the bound variable nor
    /// a symbol with a value.
    #[error("unbound variable {name:?} in predicate")]
    UnboundVariable { name: String },

    /// Membership tested against something that carries no set value.
    #[error("membership against non-set value {value:?}")]
    NotASet { value: String },

    /// A deferred predicate turned out to be undecidable when interpreted.
    #[error("membership predicate {text:?} is undecidable")]
    OpaquePredicate { text: String },
}

/// What a single pass can fail with.
#[derive(Debug, Error)]
pub enum PassError {
    #[error("syntax error: {0}")]
    Syntax(#[from] SyntaxError),

    #[error("engine configuration error: {0}")]
    Engine(#[from] EngineError),

    #[error("evaluation error: {0}")]
    Eval(#[from] EvalError),
}
