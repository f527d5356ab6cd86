//! The set-algebra grammar: nonterminal vocabulary and the production
//! catalogue the passes dispatch on.
//!
//! The catalogue is the authority on what each rule id means. The grammar
//! listing shipped next to the parsing table is validated against it at load
//! time, so reductions can dispatch on the id alone.

use serde::{Serialize, Serializer};
use std::fmt;

/// Nonterminal symbols, named for what they derive. `as_str` gives the
/// symbol as it appears in the table header and the serialized trees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NonTerm {
    /// `S'`, the augmented start symbol. Appears only in rule 0.
    Start,
    /// `S`, a whole program.
    Program,
    /// `D'`, one or more declarations.
    Decls,
    /// `D`, a single `let` declaration.
    Decl,
    /// `T`, a declared type, `int` or `set`.
    Ty,
    /// `E`, an expression at the `U` / `+` / `-` level.
    Expr,
    /// `E'`, an expression at the `I` / `*` level.
    Term,
    /// `E''`, an atomic expression.
    Factor,
    /// `Z`, a set-builder binder, `id :`.
    Binder,
    /// `P`, a predicate at the `|` level.
    Pred,
    /// `P'`, a predicate at the `&` level.
    Conj,
    /// `P''`, an atomic predicate.
    PredAtom,
    /// `R`, a relation between two expressions.
    Rel,
    /// `C`, the `show` command.
    Command,
    /// `A`, the shown argument, expression or predicate.
    Arg,
}

impl NonTerm {
    /// Number of nonterminals, for dense per-symbol table rows.
    pub const COUNT: usize = NonTerm::ALL.len();

    pub const ALL: [NonTerm; 15] = [
        NonTerm::Start,
        NonTerm::Program,
        NonTerm::Decls,
        NonTerm::Decl,
        NonTerm::Ty,
        NonTerm::Expr,
        NonTerm::Term,
        NonTerm::Factor,
        NonTerm::Binder,
        NonTerm::Pred,
        NonTerm::Conj,
        NonTerm::PredAtom,
        NonTerm::Rel,
        NonTerm::Command,
        NonTerm::Arg,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            NonTerm::Start => "S'",
            NonTerm::Program => "S",
            NonTerm::Decls => "D'",
            NonTerm::Decl => "D",
            NonTerm::Ty => "T",
            NonTerm::Expr => "E",
            NonTerm::Term => "E'",
            NonTerm::Factor => "E''",
            NonTerm::Binder => "Z",
            NonTerm::Pred => "P",
            NonTerm::Conj => "P'",
            NonTerm::PredAtom => "P''",
            NonTerm::Rel => "R",
            NonTerm::Command => "C",
            NonTerm::Arg => "A",
        }
    }

    pub fn from_symbol(sym: &str) -> Option<NonTerm> {
        NonTerm::ALL.iter().copied().find(|nt| nt.as_str() == sym)
    }
}

impl fmt::Display for NonTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for NonTerm {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// One production. `rhs` is spelled in grammar symbols, space separated,
/// exactly as the grammar listing spells it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Prod {
    pub id: usize,
    pub lhs: NonTerm,
    pub rhs: &'static str,
    pub arity: usize,
}

macro_rules! prod {
    ($id:expr, $lhs:expr, $rhs:expr, $arity:expr) => {
        Prod {
            id: $id,
            lhs: $lhs,
            rhs: $rhs,
            arity: $arity,
        }
    };
}

pub static PRODUCTIONS: [Prod; 34] = [
    prod!(0, NonTerm::Start, "S", 1),
    prod!(1, NonTerm::Program, "D' C .", 3),
    prod!(2, NonTerm::Program, "C .", 2),
    prod!(3, NonTerm::Decls, "D D'", 2),
    prod!(4, NonTerm::Decls, "D", 1),
    prod!(5, NonTerm::Decl, "let T id be E .", 6),
    prod!(6, NonTerm::Ty, "int", 1),
    prod!(7, NonTerm::Ty, "set", 1),
    prod!(8, NonTerm::Expr, "E'", 1),
    prod!(9, NonTerm::Expr, "E U E'", 3),
    prod!(10, NonTerm::Expr, "E + E'", 3),
    prod!(11, NonTerm::Expr, "E - E'", 3),
    prod!(12, NonTerm::Term, "E''", 1),
    prod!(13, NonTerm::Term, "E' I E''", 3),
    prod!(14, NonTerm::Term, "E' * E''", 3),
    prod!(15, NonTerm::Factor, "num", 1),
    prod!(16, NonTerm::Factor, "id", 1),
    prod!(17, NonTerm::Factor, "( E )", 3),
    prod!(18, NonTerm::Factor, "{ Z P }", 4),
    prod!(19, NonTerm::Binder, "id :", 2),
    prod!(20, NonTerm::Pred, "P | P'", 3),
    prod!(21, NonTerm::Pred, "P'", 1),
    prod!(22, NonTerm::Conj, "P' & P''", 3),
    prod!(23, NonTerm::Conj, "P''", 1),
    prod!(24, NonTerm::PredAtom, "R", 1),
    prod!(25, NonTerm::PredAtom, "( P )", 3),
    prod!(26, NonTerm::PredAtom, "! R", 2),
    prod!(27, NonTerm::Rel, "E < E", 3),
    prod!(28, NonTerm::Rel, "E > E", 3),
    prod!(29, NonTerm::Rel, "E = E", 3),
    prod!(30, NonTerm::Rel, "E @ E", 3),
    prod!(31, NonTerm::Command, "show A", 2),
    prod!(32, NonTerm::Arg, "E", 1),
    prod!(33, NonTerm::Arg, "P", 1),
];

/// The production with the given id, if the grammar has one.
pub fn production(id: usize) -> Option<&'static Prod> {
    PRODUCTIONS.get(id)
}

/// Finds a production by its written shape. `rhs` must already be
/// whitespace-normalized to single spaces.
pub fn by_shape(lhs: &str, rhs: &str) -> Option<&'static Prod> {
    PRODUCTIONS
        .iter()
        .find(|p| p.lhs.as_str() == lhs && p.rhs == rhs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalogue_ids_are_dense_and_arities_match() {
        for (i, p) in PRODUCTIONS.iter().enumerate() {
            assert_eq!(p.id, i);
            assert_eq!(p.arity, p.rhs.split_whitespace().count(), "rule {i}");
        }
    }

    #[test]
    fn augmented_start_wraps_the_program() {
        let p = production(0).unwrap();
        assert_eq!(p.lhs, NonTerm::Start);
        assert_eq!(p.rhs, "S");
    }

    #[test]
    fn shape_lookup_finds_the_declaration_rule() {
        let p = by_shape("D", "let T id be E .").unwrap();
        assert_eq!(p.id, 5);
        assert_eq!(p.arity, 6);
        assert!(by_shape("D", "let T id be E").is_none());
        assert!(by_shape("Q", "num").is_none());
    }

    #[test]
    fn nonterminal_symbols_round_trip() {
        for nt in NonTerm::ALL {
            assert_eq!(NonTerm::from_symbol(nt.as_str()), Some(nt));
        }
        assert_eq!(NonTerm::from_symbol("E''"), Some(NonTerm::Factor));
        assert_eq!(NonTerm::from_symbol("X"), None);
    }

    #[test]
    fn every_rule_id_resolves_and_none_beyond() {
        assert!(production(33).is_some());
        assert!(production(34).is_none());
    }
}
