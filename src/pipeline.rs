//! The front end as one call: tokenize once, parse three times.
//!
//! Every pass runs over the same token sequence with the same tables; only
//! the driver changes. A `simplify` command keyword is rewritten to `show`
//! in a working copy of the tokens before parsing, since the two command
//! forms share one grammar rule, and the original keyword is restored in
//! each produced tree afterwards. The reported token list is the unrewritten
//! one.
//!
//! Pass failures do not abort the run; each pass reports its own result and
//! the symbol table keeps whatever the completed passes recorded.

use crate::engine::Engine;
use crate::error::{LexicalError, PassError, TableError};
use crate::lexer::tokenize;
use crate::passes::{EvalNode, Evaluator, SyntaxNode, TreeBuilder, TypeChecker, TypeNode};
use crate::symtab::SymTab;
use crate::tables::Tables;
use crate::token::{Token, TokenKind};

/// Everything one run of the front end produces.
#[derive(Debug)]
pub struct Analysis {
    /// The token sequence as written, `simplify` keywords intact.
    pub tokens: Vec<Token>,
    /// Whether the program used `simplify` instead of `show`.
    pub simplified: bool,
    pub syntax: Result<SyntaxNode, PassError>,
    pub types: Result<TypeNode, PassError>,
    pub eval: Result<EvalNode, PassError>,
    /// Identifier classifications and values accumulated across passes.
    pub symtab: SymTab,
}

/// A loaded front end. Holds the parse tables; `run` borrows them for each
/// pass.
pub struct Pipeline {
    tables: Tables,
}

impl Pipeline {
    pub fn new(tables: Tables) -> Self {
        Pipeline { tables }
    }

    /// A pipeline over the shipped table and grammar assets.
    pub fn bundled() -> Result<Self, TableError> {
        Ok(Pipeline::new(Tables::bundled()?))
    }

    /// Tokenize `source` and run the syntax, typing, and evaluation passes.
    ///
    /// Only a lexical error is fatal; pass errors land in the corresponding
    /// `Analysis` field.
    pub fn run(&self, source: &str) -> Result<Analysis, LexicalError> {
        let (tokens, mut symtab) = tokenize(source)?;

        let mut parse_tokens = tokens.clone();
        let mut simplified = false;
        for token in &mut parse_tokens {
            if token.kind == TokenKind::Simplify {
                token.kind = TokenKind::Show;
                simplified = true;
            }
        }

        let engine = Engine::new(&self.tables);
        let mut syntax = engine.run(&parse_tokens, &mut TreeBuilder);
        let mut types = engine.run(&parse_tokens, &mut TypeChecker::new(&mut symtab));
        let mut eval = engine.run(&parse_tokens, &mut Evaluator::new(&mut symtab));

        if simplified {
            if let Ok(tree) = syntax.as_mut() {
                tree.restore_simplify();
            }
            if let Ok(tree) = types.as_mut() {
                tree.restore_simplify();
            }
            if let Ok(tree) = eval.as_mut() {
                tree.restore_simplify();
            }
        }

        Ok(Analysis {
            tokens,
            simplified,
            syntax,
            types,
            eval,
            symtab,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EvalError;
    use crate::passes::Ty;
    use crate::symtab::DeclTy;

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn run(src: &str) -> Analysis {
        Pipeline::bundled().unwrap().run(src).unwrap()
    }

    /// One structural fingerprint for both tree kinds: interior nodes by
    /// name, leaves by token kind.
    fn syntax_shape(n: &SyntaxNode) -> String {
        match n {
            SyntaxNode::Leaf(token) => token.kind.as_str().to_string(),
            SyntaxNode::Node { name, children } => {
                let kids: Vec<_> = children.iter().map(syntax_shape).collect();
                format!("{}({})", name, kids.join(" "))
            }
        }
    }

    fn type_shape(n: &TypeNode) -> String {
        match n {
            TypeNode::Leaf { token, .. } => token.kind.as_str().to_string(),
            TypeNode::Node { name, children, .. } => {
                let kids: Vec<_> = children.iter().map(type_shape).collect();
                format!("{}({})", name, kids.join(" "))
            }
        }
    }

    #[test]
    fn all_three_passes_run_over_one_token_stream() {
        init_logger();
        let analysis = run("let int x be 2 . show x + 3 .");
        assert_eq!(analysis.tokens.len(), 11);
        assert!(!analysis.simplified);
        assert!(analysis.syntax.is_ok());
        assert_eq!(analysis.types.unwrap().ty(), Ty::Program);
        assert_eq!(analysis.eval.unwrap().value(), "5");
        assert_eq!(analysis.symtab.ty("x"), Some(DeclTy::Integer));
    }

    #[test]
    fn syntax_and_type_trees_share_a_shape() {
        init_logger();
        for src in [
            "show 3 .",
            "let int x be 5 . show x + 1 .",
            "let set s be { a : a > 3 } . show 5 @ s .",
        ] {
            let analysis = run(src);
            assert_eq!(
                syntax_shape(&analysis.syntax.unwrap()),
                type_shape(&analysis.types.unwrap()),
                "trees disagree for {src:?}"
            );
        }
    }

    #[test]
    fn simplify_parses_like_show_and_survives_in_the_trees() {
        init_logger();
        let analysis = run("simplify 5 + 5 .");
        assert!(analysis.simplified);
        // The reported token list is untouched.
        assert_eq!(analysis.tokens[0].kind, TokenKind::Simplify);
        assert_eq!(analysis.tokens[0].lexeme.as_str(), "simplify");

        // Each tree got its keyword back.
        let tree = analysis.syntax.unwrap();
        let command = &tree.children()[0];
        assert!(matches!(
            &command.children()[0],
            SyntaxNode::Leaf(t) if t.kind == TokenKind::Simplify
        ));
        let tree = analysis.types.unwrap();
        let command = &tree.children()[0];
        assert!(matches!(
            &command.children()[0],
            TypeNode::Leaf { token, .. } if token.kind == TokenKind::Simplify
        ));
        assert_eq!(analysis.eval.unwrap().value(), "10");
    }

    #[test]
    fn show_programs_do_not_set_the_simplify_flag() {
        init_logger();
        assert!(!run("show 5 .").simplified);
    }

    #[test]
    fn lexical_errors_abort_before_any_pass() {
        init_logger();
        let err = Pipeline::bundled().unwrap().run("show 5 # .").unwrap_err();
        assert!(matches!(err, LexicalError::InvalidCharacter { ch: '#', .. }));
    }

    #[test]
    fn a_syntax_error_fails_every_pass() {
        init_logger();
        let analysis = run("show 5"); // missing period
        assert!(matches!(analysis.syntax, Err(PassError::Syntax { .. })));
        assert!(matches!(analysis.types, Err(PassError::Syntax { .. })));
        assert!(matches!(analysis.eval, Err(PassError::Syntax { .. })));
    }

    #[test]
    fn an_evaluation_error_leaves_the_other_passes_intact() {
        init_logger();
        let analysis = run("show 3 @ 4 .");
        assert!(analysis.syntax.is_ok());
        // The type pass flags it as a sentinel, not a failure.
        assert_eq!(analysis.types.unwrap().ty(), Ty::TypeError);
        assert!(matches!(
            analysis.eval,
            Err(PassError::Eval(EvalError::NotASet { .. }))
        ));
    }

    #[test]
    fn type_errors_are_sentinels_not_failures() {
        init_logger();
        let analysis = run("show x .");
        assert_eq!(analysis.types.unwrap().ty(), Ty::TypeError);
        assert_eq!(analysis.eval.unwrap().value(), "x");
    }
}
