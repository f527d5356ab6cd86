//! The evaluation pass.
//!
//! Every node carries a rendered string `value`; that is the whole
//! observable result. Internally a node also carries a tri-state flag
//! (relational and logical results, when both sides were concrete) and a
//! payload: a concrete integer, a set value, a symbolic integer term, or a
//! predicate. Sets are never enumerated; a set value is its rendered
//! builder text plus a predicate AST, and membership interprets that AST
//! directly with the builder variable bound to the candidate.
//!
//! Identifiers substitute their bound value at reduction time. An unvalued
//! identifier stays symbolic, which is exactly what a set-builder bound
//! variable does inside its own body. Flag and payload never serialize;
//! artifact trees carry `value` only.

use crate::engine::PassDriver;
use crate::error::{EvalError, PassError};
use crate::grammar::{NonTerm, Prod};
use crate::symtab::SymTab;
use crate::token::{Token, TokenKind};
use crate::value::{PredExpr, Predicate, RelOp, SetValue, Value};
use serde::ser::{Serialize, SerializeMap, Serializer};
use smartstring::alias::String;

/// What an evaluation node carries besides its rendering.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Payload {
    #[default]
    None,
    /// A concrete integer.
    Int(i64),
    /// A symbolic integer-valued term (contains a bound variable).
    Term(PredExpr),
    /// A set: rendered text plus its membership predicate.
    Set(SetValue),
    /// A predicate over the enclosing builder's variable.
    Pred(Predicate),
}

/// An evaluation tree node.
#[derive(Debug, Clone, PartialEq)]
pub enum EvalNode {
    Leaf {
        token: Token,
        value: String,
        payload: Payload,
    },
    Node {
        name: NonTerm,
        value: String,
        flag: Option<bool>,
        payload: Payload,
        children: Vec<EvalNode>,
    },
}

impl EvalNode {
    /// The rendered result.
    pub fn value(&self) -> &str {
        match self {
            EvalNode::Leaf { value, .. } | EvalNode::Node { value, .. } => value,
        }
    }

    /// The tri-state relational flag. Leaves never carry one.
    pub fn flag(&self) -> Option<bool> {
        match self {
            EvalNode::Leaf { .. } => None,
            EvalNode::Node { flag, .. } => *flag,
        }
    }

    pub fn payload(&self) -> &Payload {
        match self {
            EvalNode::Leaf { payload, .. } | EvalNode::Node { payload, .. } => payload,
        }
    }

    pub fn children(&self) -> &[EvalNode] {
        match self {
            EvalNode::Leaf { .. } => &[],
            EvalNode::Node { children, .. } => children,
        }
    }

    fn ident(&self) -> Option<&str> {
        match self {
            EvalNode::Leaf { token, .. } if token.kind == TokenKind::Ident => {
                Some(token.lexeme.as_str())
            }
            _ => None,
        }
    }

    pub fn restore_simplify(&mut self) {
        match self {
            EvalNode::Leaf { token, .. } => {
                if token.kind == TokenKind::Show && token.lexeme.as_str() == "simplify" {
                    token.kind = TokenKind::Simplify;
                }
            }
            EvalNode::Node { children, .. } => {
                for child in children {
                    child.restore_simplify();
                }
            }
        }
    }
}

// Flag and payload are pass-internal; leaves serialize as
// `{"token", "lexeme", "value"}`, interior nodes as
// `{"name", "value", "children"}`.
impl Serialize for EvalNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            EvalNode::Leaf { token, value, .. } => {
                let mut map = serializer.serialize_map(Some(3))?;
                map.serialize_entry("token", token.kind.as_str())?;
                map.serialize_entry("lexeme", token.lexeme.as_str())?;
                map.serialize_entry("value", value.as_str())?;
                map.end()
            }
            EvalNode::Node {
                name,
                value,
                children,
                ..
            } => {
                let mut map = serializer.serialize_map(Some(3))?;
                map.serialize_entry("name", name)?;
                map.serialize_entry("value", value.as_str())?;
                map.serialize_entry("children", children)?;
                map.end()
            }
        }
    }
}

fn node(
    name: NonTerm,
    value: impl Into<String>,
    flag: Option<bool>,
    payload: Payload,
    children: Vec<EvalNode>,
) -> EvalNode {
    EvalNode::Node {
        name,
        value: value.into(),
        flag,
        payload,
        children,
    }
}

/// A chain production: the node takes one child's result wholesale.
fn chain(name: NonTerm, idx: usize, children: Vec<EvalNode>) -> EvalNode {
    let value: String = children[idx].value().into();
    let flag = children[idx].flag();
    let payload = children[idx].payload().clone();
    node(name, value, flag, payload, children)
}

fn binary_value(l: &EvalNode, op: &str, r: &EvalNode) -> String {
    format!("{} {} {}", l.value(), op, r.value()).into()
}

/// An integer-valued side of an operator, if it is expressible: a concrete
/// integer or a symbolic term. Sets and predicates are not.
fn as_term(n: &EvalNode) -> Option<PredExpr> {
    match n.payload() {
        Payload::Int(v) => Some(PredExpr::Num(*v)),
        Payload::Term(t) => Some(t.clone()),
        _ => None,
    }
}

/// The evaluation-pass driver. Reads and writes identifier values in the
/// shared symbol table.
pub struct Evaluator<'s> {
    symtab: &'s mut SymTab,
}

impl<'s> Evaluator<'s> {
    pub fn new(symtab: &'s mut SymTab) -> Self {
        Evaluator { symtab }
    }
}

impl PassDriver for Evaluator<'_> {
    type Node = EvalNode;

    fn leaf(&mut self, token: &Token) -> EvalNode {
        let payload = match token.value {
            Some(n) => Payload::Int(n as i64),
            None => Payload::None,
        };
        EvalNode::Leaf {
            value: token.lexeme.clone(),
            token: token.clone(),
            payload,
        }
    }

    fn reduce(&mut self, prod: &Prod, children: Vec<EvalNode>) -> Result<EvalNode, PassError> {
        Ok(match prod.id {
            // S' -> S
            0 => chain(prod.lhs, 0, children),
            // S -> D' C .
            1 => chain(prod.lhs, 1, children),
            // S -> C .
            2 => chain(prod.lhs, 0, children),
            // D' -> D D' | D' -> D : declarations render empty
            3 | 4 => node(prod.lhs, "", None, Payload::None, children),
            // D -> let T id be E . : bind the initializer's value now;
            // symbolic initializers bind nothing
            5 => {
                let value: String = children[4].value().into();
                if let Some(name) = children[2].ident() {
                    match children[4].payload() {
                        Payload::Int(n) => self.symtab.set_value(name, Value::Int(*n)),
                        Payload::Set(s) => self.symtab.set_value(name, Value::Set(s.clone())),
                        _ => {}
                    }
                }
                node(prod.lhs, value, None, Payload::None, children)
            }
            // T -> int | T -> set
            6 | 7 => chain(prod.lhs, 0, children),
            // E -> E'
            8 => chain(prod.lhs, 0, children),
            // E -> E U E' | E' -> E' I E''
            9 | 13 => {
                let union = prod.id == 9;
                let (l, r) = (&children[0], &children[2]);
                match (l.payload(), r.payload()) {
                    (Payload::Set(a), Payload::Set(b)) => {
                        let set = if union {
                            SetValue::union(a.clone(), b.clone())
                        } else {
                            SetValue::intersect(a.clone(), b.clone())
                        };
                        let value = set.text.clone();
                        node(prod.lhs, value, None, Payload::Set(set), children)
                    }
                    _ => {
                        let value = binary_value(l, if union { "U" } else { "I" }, r);
                        node(prod.lhs, value, None, Payload::None, children)
                    }
                }
            }
            // E -> E + E' | E -> E - E' | E' -> E' * E''
            10 | 11 | 14 => {
                let (op, apply): (&str, fn(i64, i64) -> i64) = match prod.id {
                    10 => ("+", i64::wrapping_add),
                    11 => ("-", i64::wrapping_sub),
                    _ => ("*", i64::wrapping_mul),
                };
                let (l, r) = (&children[0], &children[2]);
                match (l.payload(), r.payload()) {
                    (Payload::Int(a), Payload::Int(b)) => {
                        let v = apply(*a, *b);
                        node(prod.lhs, v.to_string(), None, Payload::Int(v), children)
                    }
                    _ => {
                        let value = binary_value(l, op, r);
                        let payload = match (as_term(l), as_term(r)) {
                            (Some(a), Some(b)) => Payload::Term(match prod.id {
                                10 => PredExpr::Add(Box::new(a), Box::new(b)),
                                11 => PredExpr::Sub(Box::new(a), Box::new(b)),
                                _ => PredExpr::Mul(Box::new(a), Box::new(b)),
                            }),
                            _ => Payload::None,
                        };
                        node(prod.lhs, value, None, payload, children)
                    }
                }
            }
            // E' -> E''
            12 => chain(prod.lhs, 0, children),
            // E'' -> num
            15 => chain(prod.lhs, 0, children),
            // E'' -> id : substitute the bound value, else stay symbolic
            16 => {
                let resolved = match children[0].ident() {
                    Some(name) => self.symtab.value(name).cloned(),
                    None => None,
                };
                match resolved {
                    Some(Value::Int(n)) => {
                        node(prod.lhs, n.to_string(), None, Payload::Int(n), children)
                    }
                    Some(Value::Set(s)) => {
                        let text = s.text.clone();
                        node(prod.lhs, text, None, Payload::Set(s), children)
                    }
                    None => {
                        let name: String = children[0].value().into();
                        let term = PredExpr::Var(name.clone());
                        node(prod.lhs, name, None, Payload::Term(term), children)
                    }
                }
            }
            // E'' -> ( E ) : concrete results drop the parentheses,
            // symbolic ones keep them in the rendering
            17 => {
                let inner = &children[1];
                match inner.payload() {
                    Payload::Int(_) | Payload::Set(_) => chain(prod.lhs, 1, children),
                    _ => {
                        let value: String = format!("({})", inner.value()).into();
                        let flag = inner.flag();
                        let payload = inner.payload().clone();
                        node(prod.lhs, value, flag, payload, children)
                    }
                }
            }
            // E'' -> { Z P }
            18 => {
                let body = &children[2];
                let pred = match body.payload() {
                    Payload::Pred(p) => p.clone(),
                    _ => Predicate::Opaque(body.value().into()),
                };
                let set = SetValue::builder(children[1].value(), pred, body.value());
                let value = set.text.clone();
                node(prod.lhs, value, None, Payload::Set(set), children)
            }
            // Z -> id : the binder's value is its variable name
            19 => chain(prod.lhs, 0, children),
            // P -> P | P' | P' -> P' & P''
            20 | 22 => {
                let or = prod.id == 20;
                let (l, r) = (&children[0], &children[2]);
                let value = binary_value(l, if or { "|" } else { "&" }, r);
                let flag = match (l.flag(), r.flag()) {
                    (Some(a), Some(b)) => Some(if or { a || b } else { a && b }),
                    _ => None,
                };
                let payload = match (l.payload(), r.payload()) {
                    (Payload::Pred(a), Payload::Pred(b)) => {
                        let (a, b) = (Box::new(a.clone()), Box::new(b.clone()));
                        Payload::Pred(if or {
                            Predicate::Or(a, b)
                        } else {
                            Predicate::And(a, b)
                        })
                    }
                    _ => Payload::Pred(Predicate::Opaque(value.clone())),
                };
                node(prod.lhs, value, flag, payload, children)
            }
            // P -> P' | P' -> P''
            21 | 23 => chain(prod.lhs, 0, children),
            // P'' -> R
            24 => chain(prod.lhs, 0, children),
            // P'' -> ( P )
            25 => {
                let inner = &children[1];
                let value: String = format!("({})", inner.value()).into();
                let flag = inner.flag();
                let payload = inner.payload().clone();
                node(prod.lhs, value, flag, payload, children)
            }
            // P'' -> ! R
            26 => {
                let r = &children[1];
                let value: String = format!("! {}", r.value()).into();
                let flag = r.flag().map(|b| !b);
                let payload = match r.payload() {
                    Payload::Pred(p) => Payload::Pred(Predicate::Not(Box::new(p.clone()))),
                    _ => Payload::Pred(Predicate::Opaque(value.clone())),
                };
                node(prod.lhs, value, flag, payload, children)
            }
            // R -> E < E | R -> E > E | R -> E = E
            27 | 28 | 29 => {
                let op = match prod.id {
                    27 => RelOp::Less,
                    28 => RelOp::Greater,
                    _ => RelOp::Equal,
                };
                let (l, r) = (&children[0], &children[2]);
                let value = binary_value(l, op.as_str(), r);
                let flag = match (l.payload(), r.payload()) {
                    (Payload::Int(a), Payload::Int(b)) => Some(op.test(*a, *b)),
                    _ => None,
                };
                let payload = match (as_term(l), as_term(r)) {
                    (Some(a), Some(b)) => Payload::Pred(Predicate::Rel { op, lhs: a, rhs: b }),
                    _ => Payload::Pred(Predicate::Opaque(value.clone())),
                };
                node(prod.lhs, value, flag, payload, children)
            }
            // R -> E @ E : decide now against a concrete left side, defer a
            // symbolic one into the predicate
            30 => {
                let (l, r) = (&children[0], &children[2]);
                let value = binary_value(l, "@", r);
                let (flag, payload) = match (l.payload(), r.payload()) {
                    (Payload::Int(n), Payload::Set(s)) => {
                        let member = s.contains(*n)?;
                        let pred = Predicate::Member {
                            lhs: PredExpr::Num(*n),
                            set: s.clone(),
                        };
                        (Some(member), Payload::Pred(pred))
                    }
                    (Payload::Term(t), Payload::Set(s)) => {
                        let pred = Predicate::Member {
                            lhs: t.clone(),
                            set: s.clone(),
                        };
                        (None, Payload::Pred(pred))
                    }
                    (Payload::Int(_), _) => {
                        return Err(EvalError::NotASet {
                            value: r.value().into(),
                        }
                        .into());
                    }
                    _ => (None, Payload::Pred(Predicate::Opaque(value.clone()))),
                };
                node(prod.lhs, value, flag, payload, children)
            }
            // C -> show A
            31 => chain(prod.lhs, 1, children),
            // A -> E | A -> P
            32 | 33 => chain(prod.lhs, 0, children),
            // Ids beyond the catalogue cannot come out of a validated table.
            _ => node(prod.lhs, "", None, Payload::None, children),
        })
    }
}
