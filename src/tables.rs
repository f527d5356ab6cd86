//! Loader for the SLR parsing table and its grammar listing.
//!
//! The table is a CSV in the course convention: row 0 is the
//! `ACTION` / `GOTO` banner, row 1 names the columns (one blank state-label
//! column, the terminals, then `S'` followed by the nonterminals), and each
//! later row is one automaton state, numbered by position. Cells hold `s<n>`,
//! `r<n>`, `acc`, a bare goto state, or nothing. The listing next to it
//! spells each production as `<id>. <lhs> -> <rhs>`.
//!
//! Unreadable cells are skipped rather than rejected; a skipped cell can
//! only surface later as a syntax error on inputs that needed it.

use crate::error::TableError;
use crate::grammar::{self, NonTerm, Prod};
use crate::token::TokenKind;
use log::{debug, warn};
use std::fs;
use std::path::Path;

/// One ACTION cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Shift(usize),
    Reduce(usize),
    Accept,
}

/// The loaded ACTION / GOTO tables plus the rule listing, indexed densely
/// by state and symbol.
#[derive(Debug)]
pub struct Tables {
    actions: Vec<[Option<Action>; TokenKind::COUNT]>,
    gotos: Vec<[Option<usize>; NonTerm::COUNT]>,
    rules: Vec<Option<&'static Prod>>,
}

impl Tables {
    /// Parses a table CSV and a grammar listing.
    pub fn load(table: &str, listing: &str) -> Result<Self, TableError> {
        let mut lines = table.lines();
        lines.next(); // banner row
        let header = lines.next().ok_or(TableError::MissingHeader)?;
        let cols: Vec<&str> = header.split(',').skip(1).map(str::trim).collect();
        let split = cols
            .iter()
            .position(|c| *c == "S'")
            .ok_or(TableError::MissingSentinel)?;
        let term_cols: Vec<Option<TokenKind>> =
            cols[..split].iter().map(|c| TokenKind::from_symbol(c)).collect();
        let nt_cols: Vec<Option<NonTerm>> =
            cols[split..].iter().map(|c| NonTerm::from_symbol(c)).collect();

        let mut actions = Vec::new();
        let mut gotos = Vec::new();
        for line in lines {
            if line.trim().is_empty() {
                continue;
            }
            let mut arow = [None; TokenKind::COUNT];
            let mut grow = [None; NonTerm::COUNT];
            for (j, cell) in line.split(',').skip(1).enumerate() {
                let cell = cell.trim();
                if cell.is_empty() {
                    continue;
                }
                if j < term_cols.len() {
                    match (term_cols[j], parse_action(cell)) {
                        (Some(kind), Some(act)) => arow[kind as usize] = Some(act),
                        (Some(kind), None) => {
                            warn!("skipping unreadable {kind} cell {cell:?} in state {}",
                                actions.len());
                        }
                        (None, _) => {}
                    }
                } else if let Some(Some(nt)) = nt_cols.get(j - term_cols.len()) {
                    match cell.parse::<usize>() {
                        Ok(state) => grow[*nt as usize] = Some(state),
                        Err(_) => {
                            warn!("skipping unreadable {nt} cell {cell:?} in state {}",
                                actions.len());
                        }
                    }
                }
            }
            actions.push(arow);
            gotos.push(grow);
        }

        let rules = parse_listing(listing)?;
        let tables = Tables {
            actions,
            gotos,
            rules,
        };
        debug!(
            "loaded parsing table: {} states, {} rules",
            tables.states(),
            tables.rules.iter().flatten().count()
        );
        Ok(tables)
    }

    /// Loads from files on disk.
    pub fn from_paths(table: &Path, listing: &Path) -> Result<Self, TableError> {
        Tables::load(&fs::read_to_string(table)?, &fs::read_to_string(listing)?)
    }

    /// The table and listing compiled into the binary.
    pub fn bundled() -> Result<Self, TableError> {
        Tables::load(
            include_str!("../tables/slr-table.csv"),
            include_str!("../tables/grammar.txt"),
        )
    }

    pub fn states(&self) -> usize {
        self.actions.len()
    }

    pub fn action(&self, state: usize, kind: TokenKind) -> Option<Action> {
        self.actions.get(state)?[kind as usize]
    }

    pub fn goto(&self, state: usize, nt: NonTerm) -> Option<usize> {
        self.gotos.get(state)?[nt as usize]
    }

    /// The production a `r<id>` cell refers to, resolved through the
    /// listing to the catalogue.
    pub fn rule(&self, id: usize) -> Option<&'static Prod> {
        self.rules.get(id).copied().flatten()
    }
}

fn parse_action(cell: &str) -> Option<Action> {
    if cell == "acc" {
        Some(Action::Accept)
    } else if let Some(n) = cell.strip_prefix('s') {
        n.parse().ok().map(Action::Shift)
    } else if let Some(n) = cell.strip_prefix('r') {
        n.parse().ok().map(Action::Reduce)
    } else {
        None
    }
}

/// Reads `<id>. <lhs> -> <rhs>` lines and resolves each against the
/// catalogue, so a listed id always maps to a production this crate knows
/// how to reduce.
fn parse_listing(listing: &str) -> Result<Vec<Option<&'static Prod>>, TableError> {
    let mut rules: Vec<Option<&'static Prod>> = Vec::new();
    for (n, raw) in listing.lines().enumerate() {
        let line = n + 1;
        let text = raw.trim();
        if text.is_empty() {
            continue;
        }
        let (id, rest) = text.split_once('.').ok_or(TableError::BadRule { line })?;
        let id: usize = id
            .trim()
            .parse()
            .map_err(|_| TableError::BadRule { line })?;
        let (lhs, rhs) = rest.split_once("->").ok_or(TableError::BadRule { line })?;
        let lhs = lhs.trim();
        let rhs = rhs.split_whitespace().collect::<Vec<_>>().join(" ");
        let prod = grammar::by_shape(lhs, &rhs).ok_or_else(|| TableError::UnknownProduction {
            line,
            lhs: lhs.into(),
            rhs: rhs.as_str().into(),
        })?;
        if rules.len() <= id {
            rules.resize(id + 1, None);
        }
        if rules[id].is_some() {
            return Err(TableError::DuplicateRule { id });
        }
        rules[id] = Some(prod);
    }
    Ok(rules)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_table_has_the_expected_shape() {
        let t = Tables::bundled().unwrap();
        assert_eq!(t.states(), 66);
        for id in 0..34 {
            assert!(t.rule(id).is_some(), "rule {id}");
        }
        assert_eq!(t.rule(5).unwrap().lhs, NonTerm::Decl);
        assert_eq!(t.rule(5).unwrap().arity, 6);
        assert!(t.rule(34).is_none());
    }

    #[test]
    fn pinned_cells_from_the_shipped_table() {
        let t = Tables::bundled().unwrap();
        assert_eq!(t.action(0, TokenKind::Let), Some(Action::Shift(1)));
        assert_eq!(t.action(0, TokenKind::Show), Some(Action::Shift(2)));
        assert_eq!(t.action(0, TokenKind::Number), None);
        assert_eq!(t.goto(0, NonTerm::Program), Some(3));
        assert_eq!(t.goto(0, NonTerm::Decls), Some(4));
        assert_eq!(t.goto(0, NonTerm::Command), Some(6));
    }

    #[test]
    fn exactly_one_accept_cell() {
        let t = Tables::bundled().unwrap();
        let mut accepts = Vec::new();
        for state in 0..t.states() {
            for (col, cell) in t.actions[state].iter().enumerate() {
                if *cell == Some(Action::Accept) {
                    accepts.push((state, col));
                }
            }
        }
        assert_eq!(accepts, vec![(3, TokenKind::End as usize)]);
    }

    #[test]
    fn cell_population_is_stable() {
        let t = Tables::bundled().unwrap();
        let mut populated = 0;
        for state in 0..t.states() {
            populated += t.actions[state].iter().flatten().count();
            populated += t.gotos[state].iter().flatten().count();
        }
        assert_eq!(populated, 430);
    }

    #[test]
    fn loads_the_same_assets_from_disk() {
        let root = std::path::Path::new(env!("CARGO_MANIFEST_DIR"));
        let t = Tables::from_paths(
            &root.join("tables/slr-table.csv"),
            &root.join("tables/grammar.txt"),
        )
        .unwrap();
        assert_eq!(t.states(), 66);
    }

    #[test]
    fn missing_header_and_sentinel_are_load_errors() {
        assert!(matches!(
            Tables::load("", ""),
            Err(TableError::MissingHeader)
        ));
        assert!(matches!(
            Tables::load(",ACTION\n,let,$\n0,s1,", ""),
            Err(TableError::MissingSentinel)
        ));
    }

    #[test]
    fn unreadable_cells_are_skipped_not_fatal() {
        let t = Tables::load(",ACTION,,GOTO\n,let,$,S'\n0,x9,oops,", "0. S' -> S").unwrap();
        assert_eq!(t.states(), 1);
        assert_eq!(t.action(0, TokenKind::Let), None);
        assert_eq!(t.action(0, TokenKind::End), None);
    }

    #[test]
    fn listing_defects_are_reported_by_line() {
        let err = Tables::load(",ACTION,,GOTO\n,let,$,S'\n", "0 S' S").unwrap_err();
        assert!(matches!(err, TableError::BadRule { line: 1 }));

        let err = Tables::load(",ACTION,,GOTO\n,let,$,S'\n", "0. S' -> S\n1. Q -> num").unwrap_err();
        assert!(matches!(err, TableError::UnknownProduction { line: 2, .. }));

        let err =
            Tables::load(",ACTION,,GOTO\n,let,$,S'\n", "0. S' -> S\n0. S' -> S").unwrap_err();
        assert!(matches!(err, TableError::DuplicateRule { id: 0 }));
    }
}
