//! The typing pass.
//!
//! Types are attributes computed bottom-up during the second parse. There
//! is no type *error* in the pass sense: a violation produces the
//! `type_error` sentinel, which propagates to the root and leaves the pass
//! itself successful. Declarations register their identifier's type in the
//! shared symbol table as a side effect of the `D` reduction; set-builder
//! binders register their variable as an integer.

use crate::engine::PassDriver;
use crate::error::PassError;
use crate::grammar::{NonTerm, Prod};
use crate::symtab::{DeclTy, SymTab};
use crate::token::{Token, TokenKind};
use serde::ser::{Serialize, SerializeMap, Serializer};

/// The attribute a type-pass node carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ty {
    Integer,
    Set,
    Void,
    Program,
    Declaration,
    Declarations,
    Predicate,
    Relation,
    Calculation,
    /// The propagating sentinel. Not an error: the pass completes and the
    /// sentinel shows up in the tree.
    TypeError,
}

impl Ty {
    pub fn as_str(self) -> &'static str {
        match self {
            Ty::Integer => "integer",
            Ty::Set => "set",
            Ty::Void => "void",
            Ty::Program => "program",
            Ty::Declaration => "declaration",
            Ty::Declarations => "declarations",
            Ty::Predicate => "predicate",
            Ty::Relation => "relation",
            Ty::Calculation => "calculation",
            Ty::TypeError => "type_error",
        }
    }
}

impl std::fmt::Display for Ty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Ty {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// A typed parse tree node.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeNode {
    Leaf { token: Token, ty: Ty },
    Node {
        name: NonTerm,
        ty: Ty,
        children: Vec<TypeNode>,
    },
}

impl TypeNode {
    pub fn ty(&self) -> Ty {
        match self {
            TypeNode::Leaf { ty, .. } | TypeNode::Node { ty, .. } => *ty,
        }
    }

    pub fn children(&self) -> &[TypeNode] {
        match self {
            TypeNode::Leaf { .. } => &[],
            TypeNode::Node { children, .. } => children,
        }
    }

    /// The lexeme, if this is an identifier leaf.
    fn ident(&self) -> Option<&str> {
        match self {
            TypeNode::Leaf { token, .. } if token.kind == TokenKind::Ident => {
                Some(token.lexeme.as_str())
            }
            _ => None,
        }
    }

    pub fn restore_simplify(&mut self) {
        match self {
            TypeNode::Leaf { token, .. } => {
                if token.kind == TokenKind::Show && token.lexeme.as_str() == "simplify" {
                    token.kind = TokenKind::Simplify;
                }
            }
            TypeNode::Node { children, .. } => {
                for child in children {
                    child.restore_simplify();
                }
            }
        }
    }
}

// Leaves serialize as `{"token", "lexeme", "type"}`, interior nodes as
// `{"name", "type", "children"}`.
impl Serialize for TypeNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            TypeNode::Leaf { token, ty } => {
                let mut map = serializer.serialize_map(Some(3))?;
                map.serialize_entry("token", token.kind.as_str())?;
                map.serialize_entry("lexeme", token.lexeme.as_str())?;
                map.serialize_entry("type", ty)?;
                map.end()
            }
            TypeNode::Node { name, ty, children } => {
                let mut map = serializer.serialize_map(Some(3))?;
                map.serialize_entry("name", name)?;
                map.serialize_entry("type", ty)?;
                map.serialize_entry("children", children)?;
                map.end()
            }
        }
    }
}

/// The typing-pass driver. Holds the shared symbol table for declaration
/// registration and identifier lookups.
pub struct TypeChecker<'s> {
    symtab: &'s mut SymTab,
}

impl<'s> TypeChecker<'s> {
    pub fn new(symtab: &'s mut SymTab) -> Self {
        TypeChecker { symtab }
    }

    fn rule_type(&mut self, prod: &Prod, children: &[TypeNode]) -> Ty {
        // Binary rules read their operands from slots 0 and 2, the operator
        // sits in slot 1.
        let both = |want: Ty, result: Ty| {
            if children[0].ty() == want && children[2].ty() == want {
                result
            } else {
                Ty::TypeError
            }
        };
        match prod.id {
            // S' -> S
            0 => children[0].ty(),
            // S -> D' C .
            1 => {
                if children[0].ty() != Ty::TypeError && children[1].ty() != Ty::TypeError {
                    Ty::Program
                } else {
                    Ty::TypeError
                }
            }
            // S -> C .
            2 => children[0].ty(),
            // D' -> D D'
            3 => {
                if children[0].ty() == Ty::Declaration && children[1].ty() == Ty::Declarations {
                    Ty::Declarations
                } else {
                    Ty::TypeError
                }
            }
            // D' -> D
            4 => {
                if children[0].ty() == Ty::Declaration {
                    Ty::Declarations
                } else {
                    Ty::TypeError
                }
            }
            // D -> let T id be E .
            5 => {
                let decl = match children[1].ty() {
                    Ty::Integer => DeclTy::Integer,
                    Ty::Set => DeclTy::Set,
                    _ => return Ty::TypeError,
                };
                if children[4].ty() == Ty::TypeError {
                    return Ty::TypeError;
                }
                match children[2].ident() {
                    Some(name) if self.symtab.declare(name, decl).is_ok() => Ty::Declaration,
                    _ => Ty::TypeError,
                }
            }
            // T -> int
            6 => Ty::Integer,
            // T -> set
            7 => Ty::Set,
            // E -> E'
            8 => children[0].ty(),
            // E -> E U E'
            9 => both(Ty::Set, Ty::Set),
            // E -> E + E' | E -> E - E'
            10 | 11 => both(Ty::Integer, Ty::Integer),
            // E' -> E''
            12 => children[0].ty(),
            // E' -> E' I E''
            13 => both(Ty::Set, Ty::Set),
            // E' -> E' * E''
            14 => both(Ty::Integer, Ty::Integer),
            // E'' -> num
            15 => Ty::Integer,
            // E'' -> id
            16 => match children[0].ident().and_then(|n| self.symtab.ty(n)) {
                Some(DeclTy::Integer) => Ty::Integer,
                Some(DeclTy::Set) => Ty::Set,
                _ => Ty::TypeError,
            },
            // E'' -> ( E )
            17 => children[1].ty(),
            // E'' -> { Z P }
            18 => {
                if children[2].ty() == Ty::Predicate {
                    Ty::Set
                } else {
                    Ty::TypeError
                }
            }
            // Z -> id :
            19 => match children[0].ident() {
                Some(name) => {
                    self.symtab.bind_var(name);
                    Ty::Void
                }
                None => Ty::TypeError,
            },
            // P -> P | P'
            20 => both(Ty::Predicate, Ty::Predicate),
            // P -> P'
            21 => children[0].ty(),
            // P' -> P' & P''
            22 => both(Ty::Predicate, Ty::Predicate),
            // P' -> P''
            23 => children[0].ty(),
            // P'' -> R
            24 => {
                if children[0].ty() == Ty::Relation {
                    Ty::Predicate
                } else {
                    Ty::TypeError
                }
            }
            // P'' -> ( P )
            25 => children[1].ty(),
            // P'' -> ! R
            26 => {
                if children[1].ty() == Ty::Relation {
                    Ty::Predicate
                } else {
                    Ty::TypeError
                }
            }
            // R -> E < E | R -> E > E | R -> E = E
            27 | 28 | 29 => both(Ty::Integer, Ty::Relation),
            // R -> E @ E
            30 => {
                if children[0].ty() == Ty::Integer && children[2].ty() == Ty::Set {
                    Ty::Relation
                } else {
                    Ty::TypeError
                }
            }
            // C -> show A
            31 => children[1].ty(),
            // A -> E | A -> P
            32 | 33 => {
                if children[0].ty() != Ty::TypeError {
                    Ty::Calculation
                } else {
                    Ty::TypeError
                }
            }
            // Ids beyond the catalogue cannot come out of a validated table.
            _ => Ty::TypeError,
        }
    }
}

impl PassDriver for TypeChecker<'_> {
    type Node = TypeNode;

    fn leaf(&mut self, token: &Token) -> TypeNode {
        let ty = match token.kind {
            TokenKind::Number => Ty::Integer,
            _ => Ty::Void,
        };
        TypeNode::Leaf {
            token: token.clone(),
            ty,
        }
    }

    fn reduce(&mut self, prod: &Prod, children: Vec<TypeNode>) -> Result<TypeNode, PassError> {
        let ty = self.rule_type(prod, &children);
        Ok(TypeNode::Node {
            name: prod.lhs,
            ty,
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

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn typecheck(src: &str) -> (TypeNode, SymTab) {
        let tables = Tables::bundled().unwrap();
        let (tokens, mut symtab) = tokenize(src).unwrap();
        let tree = Engine::new(&tables)
            .run(&tokens, &mut TypeChecker::new(&mut symtab))
            .unwrap();
        (tree, symtab)
    }

    #[test]
    fn full_program_types_as_program() {
        init_logger();
        let (tree, symtab) = typecheck("let int x be 5 . show x .");
        assert_eq!(tree.ty(), Ty::Program);
        assert_eq!(symtab.ty("x"), Some(DeclTy::Integer));
    }

    #[test]
    fn bare_show_types_as_calculation() {
        init_logger();
        let (tree, _) = typecheck("show 3 .");
        assert_eq!(tree.ty(), Ty::Calculation);
    }

    #[test]
    fn number_leaves_are_integer_keyword_leaves_void() {
        init_logger();
        let (tree, _) = typecheck("show 3 .");
        // S -> C .; C -> show A.
        let c = &tree.children()[0];
        assert_eq!(c.children()[0].ty(), Ty::Void); // `show` leaf
        let mut node = &c.children()[1]; // A
        while !node.children().is_empty() {
            node = &node.children()[0];
        }
        assert_eq!(node.ty(), Ty::Integer); // the `3` leaf
    }

    #[test]
    fn set_declaration_registers_a_set() {
        init_logger();
        let (tree, symtab) = typecheck("let set s be { a : a > 3 } . show 5 @ s .");
        assert_eq!(tree.ty(), Ty::Program);
        assert_eq!(symtab.ty("s"), Some(DeclTy::Set));
        assert_eq!(symtab.ty("a"), Some(DeclTy::Integer)); // builder binder
    }

    #[test]
    fn redeclaration_is_a_type_error_and_keeps_the_first_binding() {
        init_logger();
        let (tree, symtab) =
            typecheck("let int x be 5 . let set x be { a : a > 1 } . show x .");
        assert_eq!(tree.ty(), Ty::TypeError);
        assert_eq!(symtab.ty("x"), Some(DeclTy::Integer));
    }

    #[test]
    fn reusing_a_binder_variable_is_fine() {
        init_logger();
        let (tree, _) = typecheck("show { a : a > 0 } U { a : a < 5 } .");
        assert_eq!(tree.ty(), Ty::Calculation);
    }

    #[test]
    fn undeclared_identifier_poisons_the_root() {
        init_logger();
        let (tree, _) = typecheck("show x .");
        assert_eq!(tree.ty(), Ty::TypeError);
    }

    #[test]
    fn operand_mismatch_is_the_sentinel_not_a_failure() {
        init_logger();
        let (tree, _) =
            typecheck("let int x be 5 . let set s be { a : a > 0 } . show x + s .");
        assert_eq!(tree.ty(), Ty::TypeError);
    }

    #[test]
    fn membership_needs_integer_into_set() {
        init_logger();
        let (tree, _) = typecheck("let set s be { a : a > 3 } . show 5 @ s .");
        assert_eq!(tree.ty(), Ty::Program);
        let (tree, _) = typecheck("let set s be { a : a > 3 } . show s @ s .");
        assert_eq!(tree.ty(), Ty::TypeError);
        let (tree, _) = typecheck("show 5 @ 3 .");
        assert_eq!(tree.ty(), Ty::TypeError);
    }

    #[test]
    fn declaration_with_bad_initializer_does_not_register() {
        init_logger();
        let (tree, symtab) = typecheck("let int x be y . show 1 .");
        assert_eq!(tree.ty(), Ty::TypeError);
        // `y` poisoned `E`, so `x` was never declared.
        assert_eq!(symtab.ty("x"), Some(DeclTy::Unresolved));
    }

    #[test]
    fn leaves_serialize_with_their_type() {
        init_logger();
        let (tree, _) = typecheck("show 3 .");
        let v = serde_json::to_value(&tree).unwrap();
        assert_eq!(v["name"], "S");
        assert_eq!(v["type"], "calculation");
        let show_leaf = v.pointer("/children/0/children/0").unwrap();
        assert_eq!(show_leaf["token"], "show");
        assert_eq!(show_leaf["type"], "void");
    }
}
