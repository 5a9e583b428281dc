use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{Signed, Zero};
use serde::Serialize;
use std::fmt;

/// Index of a node inside a [`Context`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ExprId(pub u32);

/// One node of the expression tree.
///
/// `Add` and `Mul` are n-ary once the engine has flattened the tree; `Sub`
/// only survives between parsing and flattening, where it becomes
/// `Add(a, Neg(b))`. The `bool` on `Mul` records implicit multiplication
/// (`2x` vs `2 * x`); it affects printing only and is ignored by
/// [`exprs_equal`](crate::ordering::exprs_equal).
///
/// `Number` values are kept non-negative by convention: signs live in `Neg`
/// wrappers, and non-integer constants live in `Div(Number, Number)` nodes
/// (the "constant fraction" shape) rather than in a single rational.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Expr {
    Number(BigRational),
    Symbol(String),
    Add(Vec<ExprId>),
    Sub(ExprId, ExprId),
    Mul(bool, Vec<ExprId>),
    Div(ExprId, ExprId),
    Pow(ExprId, ExprId),
    Neg(ExprId),
    Paren(ExprId),
    Function(String, Vec<ExprId>),
}

/// Append-only arena holding every node of one computation.
///
/// Nodes are immutable once added; rewrites allocate fresh nodes and leave
/// the old ones in place, so an `ExprId` recorded in a step stays valid for
/// the lifetime of the context.
#[derive(Default, Clone)]
pub struct Context {
    pub nodes: Vec<Expr>,
}

impl Context {
    pub fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    pub fn add(&mut self, expr: Expr) -> ExprId {
        let id = ExprId(self.nodes.len() as u32);
        self.nodes.push(expr);
        id
    }

    pub fn get(&self, id: ExprId) -> &Expr {
        &self.nodes[id.0 as usize]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Integer constant; negative values build `Neg(Number(|n|))`.
    pub fn num(&mut self, n: i64) -> ExprId {
        self.big(BigInt::from(n))
    }

    pub fn big(&mut self, n: BigInt) -> ExprId {
        if n.is_negative() {
            let inner = self.add(Expr::Number(BigRational::from_integer(-n)));
            self.add(Expr::Neg(inner))
        } else {
            self.add(Expr::Number(BigRational::from_integer(n)))
        }
    }

    /// Canonical constant for an arbitrary rational: an integer `Number`,
    /// or a `Div(Number, Number)` constant fraction with positive
    /// denominator, wrapped in `Neg` when the value is negative.
    pub fn rat(&mut self, r: &BigRational) -> ExprId {
        if r.is_integer() {
            return self.big(r.to_integer());
        }
        let num = self.add(Expr::Number(BigRational::from_integer(r.numer().abs())));
        let den = self.add(Expr::Number(BigRational::from_integer(r.denom().abs())));
        let frac = self.add(Expr::Div(num, den));
        if r.is_negative() {
            self.add(Expr::Neg(frac))
        } else {
            frac
        }
    }

    pub fn var(&mut self, name: &str) -> ExprId {
        self.add(Expr::Symbol(name.to_string()))
    }

    /// Ordered child list, for generic traversals.
    pub fn children(&self, id: ExprId) -> Vec<ExprId> {
        match self.get(id) {
            Expr::Number(_) | Expr::Symbol(_) => Vec::new(),
            Expr::Add(terms) => terms.clone(),
            Expr::Mul(_, factors) => factors.clone(),
            Expr::Sub(l, r) | Expr::Div(l, r) | Expr::Pow(l, r) => vec![*l, *r],
            Expr::Neg(inner) | Expr::Paren(inner) => vec![*inner],
            Expr::Function(_, args) => args.clone(),
        }
    }

    /// Clone of `id` with its children replaced in order. `new_children`
    /// must have the node's arity.
    pub fn rebuild(&mut self, id: ExprId, new_children: &[ExprId]) -> ExprId {
        let expr = match self.get(id) {
            Expr::Number(_) | Expr::Symbol(_) => return id,
            Expr::Add(_) => Expr::Add(new_children.to_vec()),
            Expr::Mul(implicit, _) => Expr::Mul(*implicit, new_children.to_vec()),
            Expr::Sub(_, _) => Expr::Sub(new_children[0], new_children[1]),
            Expr::Div(_, _) => Expr::Div(new_children[0], new_children[1]),
            Expr::Pow(_, _) => Expr::Pow(new_children[0], new_children[1]),
            Expr::Neg(_) => Expr::Neg(new_children[0]),
            Expr::Paren(_) => Expr::Paren(new_children[0]),
            Expr::Function(name, _) => Expr::Function(name.clone(), new_children.to_vec()),
        };
        self.add(expr)
    }

    /// Strip any number of `Paren` wrappers.
    pub fn unwrap_parens(&self, mut id: ExprId) -> ExprId {
        while let Expr::Paren(inner) = self.get(id) {
            id = *inner;
        }
        id
    }

    /// Signed value of a constant-valued node: `Number`, `Neg(Number)`, or
    /// either behind parentheses. Constant *fractions* are deliberately not
    /// constant-valued; they are a preserved tree shape.
    pub fn constant_value(&self, id: ExprId) -> Option<BigRational> {
        match self.get(self.unwrap_parens(id)) {
            Expr::Number(n) => Some(n.clone()),
            Expr::Neg(inner) => match self.get(self.unwrap_parens(*inner)) {
                Expr::Number(n) => Some(-n),
                _ => None,
            },
            _ => None,
        }
    }

    /// True when every leaf of the subtree is a `Number`.
    pub fn is_constant_subtree(&self, id: ExprId) -> bool {
        match self.get(id) {
            Expr::Number(_) => true,
            Expr::Symbol(_) => false,
            _ => self
                .children(id)
                .iter()
                .all(|&c| self.is_constant_subtree(c)),
        }
    }

    /// True when the symbol occurs anywhere in the subtree.
    pub fn contains_symbol(&self, id: ExprId, name: &str) -> bool {
        match self.get(id) {
            Expr::Symbol(s) => s == name,
            _ => self
                .children(id)
                .iter()
                .any(|&c| self.contains_symbol(c, name)),
        }
    }

    /// Number of nodes in the subtree.
    pub fn node_count(&self, id: ExprId) -> usize {
        1 + self
            .children(id)
            .iter()
            .map(|&c| self.node_count(c))
            .sum::<usize>()
    }
}

/// Shape test for the canonical constant-fraction node:
/// `Div` whose operands are constant-valued with a positive denominator
/// allowed to carry its sign on the numerator.
pub fn as_constant_fraction(ctx: &Context, id: ExprId) -> Option<(BigRational, BigRational)> {
    if let Expr::Div(num, den) = ctx.get(ctx.unwrap_parens(id)) {
        let n = ctx.constant_value(*num)?;
        let d = ctx.constant_value(*den)?;
        if n.is_integer() && d.is_integer() && !d.is_zero() {
            return Some((n, d));
        }
    }
    None
}

/// Constant fraction, or a `Neg` of one (sign folded into the numerator).
pub fn as_signed_constant_fraction(ctx: &Context, id: ExprId) -> Option<(BigRational, BigRational)> {
    let id = ctx.unwrap_parens(id);
    if let Expr::Neg(inner) = ctx.get(id) {
        let (n, d) = as_constant_fraction(ctx, *inner)?;
        return Some((-n, d));
    }
    as_constant_fraction(ctx, id)
}

/// Value of a node that is either constant-valued or a constant fraction.
pub fn numeric_value(ctx: &Context, id: ExprId) -> Option<BigRational> {
    if let Some(v) = ctx.constant_value(id) {
        return Some(v);
    }
    as_signed_constant_fraction(ctx, id).map(|(n, d)| n / d)
}

impl fmt::Display for ExprId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Expr#{}", self.0)
    }
}
