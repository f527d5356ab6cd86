//! The syntax pass: the parse tree with no attributes.

use crate::engine::PassDriver;
use crate::error::PassError;
use crate::grammar::{NonTerm, Prod};
use crate::token::{Token, TokenKind};
use serde::Serialize;

/// A bare parse tree node. Leaves serialize as `{"token", "lexeme"}`,
/// interior nodes as `{"name", "children"}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SyntaxNode {
    Leaf(Token),
    Node {
        name: NonTerm,
        children: Vec<SyntaxNode>,
    },
}

impl SyntaxNode {
    pub fn name(&self) -> Option<NonTerm> {
        match self {
            SyntaxNode::Leaf(_) => None,
            SyntaxNode::Node { name, .. } => Some(*name),
        }
    }

    pub fn children(&self) -> &[SyntaxNode] {
        match self {
            SyntaxNode::Leaf(_) => &[],
            SyntaxNode::Node { children, .. } => children,
        }
    }

    /// Restores `simplify` leaves that the pre-parse rewrite turned into
    /// `show`, recognizable by their untouched lexeme.
    pub fn restore_simplify(&mut self) {
        match self {
            SyntaxNode::Leaf(token) => {
                if token.kind == TokenKind::Show && token.lexeme.as_str() == "simplify" {
                    token.kind = TokenKind::Simplify;
                }
            }
            SyntaxNode::Node { children, .. } => {
                for child in children {
                    child.restore_simplify();
                }
            }
        }
    }
}

/// Builds [`SyntaxNode`] trees; the only pass with no per-rule behavior.
pub struct TreeBuilder;

impl PassDriver for TreeBuilder {
    type Node = SyntaxNode;

    fn leaf(&mut self, token: &Token) -> SyntaxNode {
        SyntaxNode::Leaf(token.clone())
    }

    fn reduce(&mut self, prod: &Prod, children: Vec<SyntaxNode>) -> Result<SyntaxNode, PassError> {
        Ok(SyntaxNode::Node {
            name: prod.lhs,
            children,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Engine;
    use crate::lexer::tokenize;
    use crate::tables::Tables;
    use serde_json::json;

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn parse(src: &str) -> SyntaxNode {
        let tables = Tables::bundled().unwrap();
        let (tokens, _) = tokenize(src).unwrap();
        Engine::new(&tables).run(&tokens, &mut TreeBuilder).unwrap()
    }

    #[test]
    fn show_statement_serializes_with_names_and_leaves() {
        init_logger();
        let tree = parse("show 3 .");
        let v = serde_json::to_value(&tree).unwrap();
        assert_eq!(
            v,
            json!({
                "name": "S",
                "children": [
                    {"name": "C", "children": [
                        {"token": "show", "lexeme": "show"},
                        {"name": "A", "children": [
                            {"name": "E", "children": [
                                {"name": "E'", "children": [
                                    {"name": "E''", "children": [
                                        {"token": "num", "lexeme": "3"}
                                    ]}
                                ]}
                            ]}
                        ]}
                    ]},
                    {"token": ".", "lexeme": "."}
                ]
            })
        );
    }

    #[test]
    fn declarations_hang_off_the_left_spine() {
        init_logger();
        let tree = parse("let int x be 5 . show x .");
        assert_eq!(tree.name(), Some(NonTerm::Program));
        let kids = tree.children();
        assert_eq!(kids.len(), 3);
        assert_eq!(kids[0].name(), Some(NonTerm::Decls));
        assert_eq!(kids[1].name(), Some(NonTerm::Command));
        assert!(matches!(&kids[2], SyntaxNode::Leaf(t) if t.kind == TokenKind::Period));
        let decl = &kids[0].children()[0];
        assert_eq!(decl.name(), Some(NonTerm::Decl));
        assert_eq!(decl.children().len(), 6);
    }

    #[test]
    fn restore_turns_rewritten_show_leaves_back() {
        init_logger();
        // As the pipeline sees it after the pre-parse rewrite: kind `show`,
        // lexeme still `simplify`.
        let mut tree = SyntaxNode::Node {
            name: NonTerm::Command,
            children: vec![
                SyntaxNode::Leaf(Token::new(TokenKind::Show, "simplify")),
                SyntaxNode::Leaf(Token::new(TokenKind::Show, "show")),
            ],
        };
        tree.restore_simplify();
        let kids = tree.children();
        assert!(matches!(&kids[0], SyntaxNode::Leaf(t) if t.kind == TokenKind::Simplify));
        assert!(matches!(&kids[1], SyntaxNode::Leaf(t) if t.kind == TokenKind::Show));
    }
}
