//! Run-time values and the typed predicate AST.
//!
//! Sets in this language are never materialized as element collections.
//! A set value is its rendered predicate text plus a small AST that can be
//! interpreted directly: membership `n @ s` binds `s`'s variable to `n` and
//! evaluates the predicate, with union as OR and intersection as AND. This
//! replaces textual substitute-and-evaluate entirely; the rendered text is
//! display-only.

use crate::error::EvalError;
use smartstring::alias::String;

/// A value bindable to an identifier.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Set(SetValue),
}

impl Value {
    /// The rendered form a declaration binds and an identifier reference
    /// substitutes.
    pub fn render(&self) -> String {
        match self {
            Value::Int(n) => n.to_string().into(),
            Value::Set(s) => s.text.clone(),
        }
    }
}

/// A symbolic set: rendered text plus the structure membership needs.
#[derive(Debug, Clone, PartialEq)]
pub struct SetValue {
    /// Canonical rendering, e.g. `{ a: a > 3 }` or `({ a: a > 0 } U { b: b < 10 })`.
    pub text: String,
    pub shape: SetShape,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SetShape {
    /// `{ var: pred }`.
    Builder { var: String, pred: Box<Predicate> },
    Union(Box<SetValue>, Box<SetValue>),
    Intersect(Box<SetValue>, Box<SetValue>),
}

impl SetValue {
    /// A set-builder value. `body` is the predicate's rendered text.
    pub fn builder(var: impl Into<String>, pred: Predicate, body: &str) -> Self {
        let var = var.into();
        SetValue {
            text: format!("{{ {var}: {body} }}").into(),
            shape: SetShape::Builder {
                var,
                pred: Box::new(pred),
            },
        }
    }

    pub fn union(lhs: SetValue, rhs: SetValue) -> Self {
        SetValue {
            text: format!("({} U {})", lhs.text, rhs.text).into(),
            shape: SetShape::Union(Box::new(lhs), Box::new(rhs)),
        }
    }

    pub fn intersect(lhs: SetValue, rhs: SetValue) -> Self {
        SetValue {
            text: format!("({} I {})", lhs.text, rhs.text).into(),
            shape: SetShape::Intersect(Box::new(lhs), Box::new(rhs)),
        }
    }

    /// Decides `n @ self` by direct interpretation.
    pub fn contains(&self, n: i64) -> Result<bool, EvalError> {
        match &self.shape {
            SetShape::Builder { var, pred } => pred.eval(var, n),
            SetShape::Union(l, r) => Ok(l.contains(n)? || r.contains(n)?),
            SetShape::Intersect(l, r) => Ok(l.contains(n)? && r.contains(n)?),
        }
    }
}

/// A boolean predicate over one bound integer variable.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Rel {
        op: RelOp,
        lhs: PredExpr,
        rhs: PredExpr,
    },
    /// `lhs @ set`, with the set resolved when the predicate was built.
    Member { lhs: PredExpr, set: SetValue },
    And(Box<Predicate>, Box<Predicate>),
    Or(Box<Predicate>, Box<Predicate>),
    Not(Box<Predicate>),
    /// A condition that could not be expressed as an AST (for example a
    /// relation over a set operand). Carries its rendered text and fails
    /// if membership ever needs to decide it.
    Opaque(String),
}

impl Predicate {
    /// Evaluates with the builder's variable `var` bound to `n`.
    pub fn eval(&self, var: &str, n: i64) -> Result<bool, EvalError> {
        match self {
            Predicate::Rel { op, lhs, rhs } => Ok(op.test(lhs.eval(var, n)?, rhs.eval(var, n)?)),
            Predicate::Member { lhs, set } => set.contains(lhs.eval(var, n)?),
            Predicate::And(l, r) => Ok(l.eval(var, n)? && r.eval(var, n)?),
            Predicate::Or(l, r) => Ok(l.eval(var, n)? || r.eval(var, n)?),
            Predicate::Not(p) => Ok(!p.eval(var, n)?),
            Predicate::Opaque(text) => Err(EvalError::OpaquePredicate { text: text.clone() }),
        }
    }
}

/// An integer-valued expression inside a predicate.
#[derive(Debug, Clone, PartialEq)]
pub enum PredExpr {
    Num(i64),
    Var(String),
    Add(Box<PredExpr>, Box<PredExpr>),
    Sub(Box<PredExpr>, Box<PredExpr>),
    Mul(Box<PredExpr>, Box<PredExpr>),
}

impl PredExpr {
    /// Evaluates with `var` bound to `n`. Any other variable is unbound:
    /// identifiers with values were already substituted at build time.
    pub fn eval(&self, var: &str, n: i64) -> Result<i64, EvalError> {
        match self {
            PredExpr::Num(v) => Ok(*v),
            PredExpr::Var(name) => {
                if name.as_str() == var {
                    Ok(n)
                } else {
                    Err(EvalError::UnboundVariable { name: name.clone() })
                }
            }
            PredExpr::Add(l, r) => Ok(l.eval(var, n)?.wrapping_add(r.eval(var, n)?)),
            PredExpr::Sub(l, r) => Ok(l.eval(var, n)?.wrapping_sub(r.eval(var, n)?)),
            PredExpr::Mul(l, r) => Ok(l.eval(var, n)?.wrapping_mul(r.eval(var, n)?)),
        }
    }
}

/// The three comparison operators relations are built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelOp {
    Less,
    Greater,
    Equal,
}

impl RelOp {
    pub fn as_str(self) -> &'static str {
        match self {
            RelOp::Less => "<",
            RelOp::Greater => ">",
            RelOp::Equal => "=",
        }
    }

    pub fn test(self, l: i64, r: i64) -> bool {
        match self {
            RelOp::Less => l < r,
            RelOp::Greater => l > r,
            RelOp::Equal => l == r,
        }
    }
}
