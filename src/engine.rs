//! The shift-reduce automaton shared by all three passes.
//!
//! One engine, three drivers: the syntax, typing, and evaluation passes all
//! replay the same token sequence through the same tables and differ only in
//! what they build from each shift and each reduction. A [`PassDriver`]
//! supplies that: `leaf` turns a shifted token into a node, `reduce` folds
//! the popped children (left to right) into a node for the production's
//! left-hand side.
//!
//! The end marker `$` is never lexed; the engine synthesizes it once the
//! input runs out, so the lexer and the serialized token lists stay free
//! of it.

use crate::error::{EngineError, PassError, SyntaxError};
use crate::grammar::Prod;
use crate::tables::{Action, Tables};
use crate::token::{Token, TokenKind};
use log::{debug, trace};

/// What a pass builds while the engine parses.
pub trait PassDriver {
    type Node;

    /// A shifted token becomes a leaf.
    fn leaf(&mut self, token: &Token) -> Self::Node;

    /// A reduction folds `children` (in rule order) into one node.
    /// The evaluation pass can fail here; the others always succeed.
    fn reduce(&mut self, prod: &Prod, children: Vec<Self::Node>) -> Result<Self::Node, PassError>;
}

pub struct Engine<'t> {
    tables: &'t Tables,
}

impl<'t> Engine<'t> {
    pub fn new(tables: &'t Tables) -> Self {
        Engine { tables }
    }

    /// Parses `tokens` to completion, returning the driver's root node.
    ///
    /// The state stack starts with the sentinel state 0 and always holds one
    /// more entry than the node stack.
    pub fn run<D: PassDriver>(
        &self,
        tokens: &[Token],
        driver: &mut D,
    ) -> Result<D::Node, PassError> {
        let end = Token::new(TokenKind::End, "$");
        let mut states: Vec<usize> = vec![0];
        let mut nodes: Vec<D::Node> = Vec::new();
        let mut cursor = 0;
        let mut shifts = 0usize;
        let mut reductions = 0usize;

        loop {
            let state = states.last().copied().unwrap_or(0);
            let lookahead = tokens.get(cursor).unwrap_or(&end);
            match self.tables.action(state, lookahead.kind) {
                None => {
                    debug!(
                        "syntax error: state {state}, lookahead {} {:?}, stack {states:?}",
                        lookahead.kind, lookahead.lexeme
                    );
                    return Err(SyntaxError {
                        state,
                        kind: lookahead.kind,
                        lexeme: lookahead.lexeme.clone(),
                        stack: states,
                    }
                    .into());
                }

                Some(Action::Shift(next)) => {
                    trace!("shift {:?} {state} -> {next}", lookahead.lexeme);
                    if cursor >= tokens.len() {
                        return Err(EngineError::ShiftPastEnd { state }.into());
                    }
                    nodes.push(driver.leaf(lookahead));
                    states.push(next);
                    cursor += 1;
                    shifts += 1;
                }

                Some(Action::Reduce(id)) => {
                    let prod = self.tables.rule(id).ok_or(EngineError::MissingRule { id })?;
                    trace!("reduce {id} ({} -> {})", prod.lhs, prod.rhs);
                    if states.len() <= prod.arity {
                        return Err(EngineError::StackUnderflow { id }.into());
                    }
                    states.truncate(states.len() - prod.arity);
                    if nodes.len() < prod.arity {
                        return Err(EngineError::ArityMismatch {
                            id,
                            got: nodes.len(),
                            want: prod.arity,
                        }
                        .into());
                    }
                    let children = nodes.split_off(nodes.len() - prod.arity);
                    let state = states.last().copied().unwrap_or(0);
                    let next =
                        self.tables
                            .goto(state, prod.lhs)
                            .ok_or(EngineError::MissingGoto {
                                state,
                                nt: prod.lhs,
                            })?;
                    nodes.push(driver.reduce(prod, children)?);
                    states.push(next);
                    reductions += 1;
                }

                Some(Action::Accept) => {
                    let frames = nodes.len();
                    debug!("accepted: {shifts} shifts, {reductions} reductions");
                    return match nodes.pop() {
                        Some(root) if frames == 1 && states.len() == 2 => Ok(root),
                        _ => Err(EngineError::BadAccept { frames }.into()),
                    };
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    /// Builds the parse shape as text, `name(children...)` per node.
    struct ShapeDriver;

    impl PassDriver for ShapeDriver {
        type Node = std::string::String;

        fn leaf(&mut self, token: &Token) -> Self::Node {
            token.kind.as_str().to_owned()
        }

        fn reduce(
            &mut self,
            prod: &Prod,
            children: Vec<Self::Node>,
        ) -> Result<Self::Node, PassError> {
            Ok(format!("{}({})", prod.lhs, children.join(" ")))
        }
    }

    fn tok(kind: TokenKind) -> Token {
        Token::new(kind, kind.as_str())
    }

    fn show_3() -> Vec<Token> {
        vec![
            tok(TokenKind::Show),
            Token::number("3", 3),
            tok(TokenKind::Period),
        ]
    }

    #[test]
    fn show_statement_parses_to_the_expected_shape() {
        init_logger();
        let tables = Tables::bundled().unwrap();
        let shape = Engine::new(&tables).run(&show_3(), &mut ShapeDriver).unwrap();
        assert_eq!(shape, "S(C(show A(E(E'(E''(num))))) .)");
    }

    #[test]
    fn declaration_then_show_parses_to_the_expected_shape() {
        init_logger();
        let tables = Tables::bundled().unwrap();
        let tokens = vec![
            tok(TokenKind::Let),
            tok(TokenKind::Int),
            Token::new(TokenKind::Ident, "x"),
            tok(TokenKind::Be),
            Token::number("5", 5),
            tok(TokenKind::Period),
            tok(TokenKind::Show),
            Token::new(TokenKind::Ident, "x"),
            tok(TokenKind::Period),
        ];
        let shape = Engine::new(&tables).run(&tokens, &mut ShapeDriver).unwrap();
        assert_eq!(
            shape,
            "S(D'(D(let T(int) id be E(E'(E''(num))) .)) C(show A(E(E'(E''(id))))) .)"
        );
    }

    #[test]
    fn stray_operator_reports_state_and_stack() {
        init_logger();
        let tables = Tables::bundled().unwrap();
        let tokens = vec![
            tok(TokenKind::Show),
            tok(TokenKind::Union),
            tok(TokenKind::Period),
        ];
        let err = Engine::new(&tables).run(&tokens, &mut ShapeDriver).unwrap_err();
        match err {
            PassError::Syntax(e) => {
                assert_eq!(e.state, 2);
                assert_eq!(e.kind, TokenKind::Union);
                assert_eq!(e.stack, vec![0, 2]);
            }
            other => panic!("expected syntax error, got {other}"),
        }
    }

    #[test]
    fn truncated_input_fails_on_the_synthesized_end_marker() {
        init_logger();
        let tables = Tables::bundled().unwrap();
        let tokens = vec![tok(TokenKind::Show), Token::number("5", 5)];
        let err = Engine::new(&tables).run(&tokens, &mut ShapeDriver).unwrap_err();
        match err {
            PassError::Syntax(e) => {
                assert_eq!(e.state, 11);
                assert_eq!(e.kind, TokenKind::End);
                assert_eq!(e.lexeme.as_str(), "$");
            }
            other => panic!("expected syntax error, got {other}"),
        }
    }

    #[test]
    fn empty_input_is_a_syntax_error_in_the_start_state() {
        init_logger();
        let tables = Tables::bundled().unwrap();
        let err = Engine::new(&tables).run(&[], &mut ShapeDriver).unwrap_err();
        match err {
            PassError::Syntax(e) => {
                assert_eq!(e.state, 0);
                assert_eq!(e.kind, TokenKind::End);
                assert_eq!(e.stack, vec![0]);
            }
            other => panic!("expected syntax error, got {other}"),
        }
    }

    #[test]
    fn reduce_to_an_unlisted_rule_is_an_engine_error() {
        init_logger();
        // A one-state table whose only action reduces by a rule the listing
        // does not define.
        let tables = Tables::load(",ACTION,,GOTO\n,let,$,S'\n0,r9,,", "0. S' -> S").unwrap();
        let err = Engine::new(&tables)
            .run(&[tok(TokenKind::Let)], &mut ShapeDriver)
            .unwrap_err();
        assert!(matches!(
            err,
            PassError::Engine(EngineError::MissingRule { id: 9 })
        ));
    }

    #[test]
    fn underflowing_reduction_is_an_engine_error() {
        init_logger();
        // Reduces a three-symbol rule with only the sentinel on the stack.
        let tables = Tables::load(",ACTION,,GOTO\n,let,$,S'\n0,r1,,", "1. S -> D' C .").unwrap();
        let err = Engine::new(&tables)
            .run(&[tok(TokenKind::Let)], &mut ShapeDriver)
            .unwrap_err();
        assert!(matches!(
            err,
            PassError::Engine(EngineError::StackUnderflow { id: 1 })
        ));
    }
}
