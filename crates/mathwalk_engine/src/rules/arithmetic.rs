//! Constant folding and the identity/absorption basics.
//!
//! Everything here reports `ARITHMETIC`. Folding works on immediate
//! children only — `4/5 + 3/5` is not folded here because its addends are
//! fraction nodes, not constants; the fraction rules own that shape. A `/`
//! of two integers folds only when the quotient is exact (`6/2` but never
//! `2/4`), keeping the constant fraction as the canonical non-integer form.

use crate::change::ChangeKind;
use crate::define_rule;
use crate::rule::Rewrite;
use mathwalk_ast::{Expr, ExprId};
use num_rational::BigRational;
use num_traits::{One, Signed, ToPrimitive, Zero};

fn fold_description(values: &[BigRational], op: &str, result: &BigRational) -> String {
    let rendered: Vec<String> = values.iter().map(|v| v.to_string()).collect();
    format!("{} = {}", rendered.join(op), result)
}

define_rule!(
    FoldConstantsRule,
    "Evaluate Constant Arithmetic",
    ChangeKind::Arithmetic,
    |ctx, expr| {
        match ctx.get(expr).clone() {
            Expr::Add(terms) => {
                let values: Vec<Option<BigRational>> =
                    terms.iter().map(|&t| ctx.constant_value(t)).collect();
                let const_count = values.iter().filter(|v| v.is_some()).count();
                if const_count < 2 {
                    return None;
                }
                let folded: Vec<BigRational> = values.iter().flatten().cloned().collect();
                let sum: BigRational = folded.iter().sum();
                let mut new_terms = Vec::new();
                let mut placed = false;
                for (i, &t) in terms.iter().enumerate() {
                    if values[i].is_some() {
                        if !placed {
                            let s = ctx.rat(&sum);
                            new_terms.push(s);
                            placed = true;
                        }
                    } else {
                        new_terms.push(t);
                    }
                }
                let new_expr = if new_terms.len() == 1 {
                    new_terms[0]
                } else {
                    ctx.add(Expr::Add(new_terms))
                };
                Some(Rewrite::new(new_expr).desc(fold_description(&folded, " + ", &sum)))
            }
            Expr::Mul(implicit, factors) => {
                let values: Vec<Option<BigRational>> =
                    factors.iter().map(|&f| ctx.constant_value(f)).collect();
                let const_count = values.iter().filter(|v| v.is_some()).count();
                if const_count < 2 {
                    return None;
                }
                let folded: Vec<BigRational> = values.iter().flatten().cloned().collect();
                let product: BigRational = folded.iter().product();
                if product.is_zero() {
                    let zero = ctx.num(0);
                    return Some(Rewrite::new(zero).desc("multiplication by 0 is 0"));
                }
                let mut new_factors = Vec::new();
                let mut placed = false;
                for (i, &f) in factors.iter().enumerate() {
                    if values[i].is_some() {
                        if !placed {
                            let p = ctx.rat(&product);
                            new_factors.push(p);
                            placed = true;
                        }
                    } else {
                        new_factors.push(f);
                    }
                }
                let new_expr = if new_factors.len() == 1 {
                    new_factors[0]
                } else {
                    ctx.add(Expr::Mul(implicit, new_factors))
                };
                Some(Rewrite::new(new_expr).desc(fold_description(&folded, " * ", &product)))
            }
            Expr::Div(num, den) => {
                let a = ctx.constant_value(num)?;
                let b = ctx.constant_value(den)?;
                if b.is_zero() {
                    return None;
                }
                if a.is_zero() {
                    let zero = ctx.num(0);
                    return Some(Rewrite::new(zero).desc("0 divided by anything is 0"));
                }
                let q = &a / &b;
                if !q.is_integer() {
                    // Non-integer quotients stay in fraction form.
                    return None;
                }
                let new_expr = ctx.rat(&q);
                Some(Rewrite::new(new_expr).desc(format!("{} / {} = {}", a, b, q)))
            }
            Expr::Pow(base, exp) => {
                let b = ctx.constant_value(base)?;
                let e = ctx.constant_value(exp)?;
                if !e.is_integer() || e.is_negative() {
                    return None;
                }
                let n = e.to_integer().to_i32().filter(|&n| n <= 64)?;
                if b.is_zero() && n == 0 {
                    return None;
                }
                let result = b.pow(n);
                let new_expr = ctx.rat(&result);
                Some(Rewrite::new(new_expr).desc(format!("{}^{} = {}", b, e, result)))
            }
            _ => None,
        }
    }
);

define_rule!(
    MulZeroRule,
    "Multiplication by Zero",
    ChangeKind::Arithmetic,
    |ctx, expr| {
        if let Expr::Mul(_, factors) = ctx.get(expr) {
            let has_zero = factors
                .iter()
                .any(|&f| ctx.constant_value(f).is_some_and(|v| v.is_zero()));
            if has_zero {
                let zero = ctx.num(0);
                return Some(Rewrite::new(zero).desc("0 * x = 0"));
            }
        }
        None
    }
);

define_rule!(
    AddZeroRule,
    "Remove Addition of Zero",
    ChangeKind::Arithmetic,
    |ctx, expr| {
        if let Expr::Add(terms) = ctx.get(expr).clone() {
            let keep: Vec<ExprId> = terms
                .iter()
                .copied()
                .filter(|&t| !ctx.constant_value(t).is_some_and(|v| v.is_zero()))
                .collect();
            if keep.len() == terms.len() || keep.is_empty() {
                return None;
            }
            let new_expr = if keep.len() == 1 {
                keep[0]
            } else {
                ctx.add(Expr::Add(keep))
            };
            return Some(Rewrite::new(new_expr).desc("x + 0 = x"));
        }
        None
    }
);

define_rule!(
    MulOneRule,
    "Remove Multiplication by One",
    ChangeKind::Arithmetic,
    |ctx, expr| {
        if let Expr::Mul(implicit, factors) = ctx.get(expr).clone() {
            let keep: Vec<ExprId> = factors
                .iter()
                .copied()
                .filter(|&f| !ctx.constant_value(f).is_some_and(|v| v.is_one()))
                .collect();
            if keep.len() == factors.len() || keep.is_empty() {
                return None;
            }
            let new_expr = if keep.len() == 1 {
                keep[0]
            } else {
                ctx.add(Expr::Mul(implicit, keep))
            };
            return Some(Rewrite::new(new_expr).desc("1 * x = x"));
        }
        None
    }
);

define_rule!(
    DivOneRule,
    "Remove Division by One",
    ChangeKind::Arithmetic,
    |ctx, expr| {
        if let Expr::Div(num, den) = ctx.get(expr) {
            let (num, den) = (*num, *den);
            let v = ctx.constant_value(den)?;
            if v.is_one() {
                return Some(Rewrite::new(num).desc("x / 1 = x"));
            }
            if crate::helpers::rational_is_negative_one(&v) {
                let new_expr = ctx.add(Expr::Neg(num));
                return Some(Rewrite::new(new_expr).desc("x / -1 = -x"));
            }
        }
        None
    }
);

define_rule!(
    PowOneRule,
    "Remove Exponent of One",
    ChangeKind::Arithmetic,
    |ctx, expr| {
        if let Expr::Pow(base, exp) = ctx.get(expr) {
            let (base, exp) = (*base, *exp);
            if ctx.constant_value(exp).is_some_and(|v| v.is_one()) {
                return Some(Rewrite::new(base).desc("x^1 = x"));
            }
        }
        None
    }
);

define_rule!(
    PowZeroRule,
    "Exponent of Zero",
    ChangeKind::Arithmetic,
    |ctx, expr| {
        if let Expr::Pow(base, exp) = ctx.get(expr) {
            let (base, exp) = (*base, *exp);
            if ctx.constant_value(exp).is_some_and(|v| v.is_zero())
                && !ctx.constant_value(base).is_some_and(|v| v.is_zero())
            {
                let one = ctx.num(1);
                return Some(Rewrite::new(one).desc("x^0 = 1"));
            }
        }
        None
    }
);

pub fn register(simplifier: &mut crate::simplifier::Simplifier) {
    simplifier.add_rule(Box::new(FoldConstantsRule));
    simplifier.add_rule(Box::new(MulZeroRule));
    simplifier.add_rule(Box::new(DivOneRule));
    simplifier.add_rule(Box::new(AddZeroRule));
    simplifier.add_rule(Box::new(MulOneRule));
    simplifier.add_rule(Box::new(PowOneRule));
    simplifier.add_rule(Box::new(PowZeroRule));
}
