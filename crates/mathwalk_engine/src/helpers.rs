//! Small destructuring and numeric helpers shared by the rule library.

use mathwalk_ast::{Context, Expr, ExprId};
use num_bigint::BigInt;
use num_integer::Integer;
use num_rational::BigRational;
use num_traits::{One, Signed};

/// Symbol name of a node that is a symbol, possibly behind parentheses.
pub fn as_symbol(ctx: &Context, id: ExprId) -> Option<&str> {
    match ctx.get(ctx.unwrap_parens(id)) {
        Expr::Symbol(name) => Some(name),
        _ => None,
    }
}

/// `x` or `x^e`, through parentheses: `(symbol, Some(exponent))`.
pub fn as_symbol_power(ctx: &Context, id: ExprId) -> Option<(String, Option<ExprId>)> {
    let id = ctx.unwrap_parens(id);
    match ctx.get(id) {
        Expr::Symbol(name) => Some((name.clone(), None)),
        Expr::Pow(base, exp) => {
            let name = as_symbol(ctx, *base)?;
            Some((name.to_string(), Some(*exp)))
        }
        _ => None,
    }
}

/// The engine models `abs` only; any other function call makes the whole
/// tree unsupported and simplification returns it untouched.
pub fn contains_unsupported(ctx: &Context, id: ExprId) -> bool {
    match ctx.get(id) {
        Expr::Function(name, args) => {
            name != "abs" || args.len() != 1 || args.iter().any(|&a| contains_unsupported(ctx, a))
        }
        _ => ctx
            .children(id)
            .iter()
            .any(|&c| contains_unsupported(ctx, c)),
    }
}

/// Exact evaluation of a fully-constant subtree. `None` for symbols,
/// division by zero, unsupported functions, or exponents outside small
/// non-negative integers.
pub fn const_eval(ctx: &Context, id: ExprId) -> Option<BigRational> {
    use num_traits::{Signed as _, ToPrimitive as _, Zero as _};
    match ctx.get(id) {
        Expr::Number(n) => Some(n.clone()),
        Expr::Symbol(_) => None,
        Expr::Add(terms) => {
            let mut sum = BigRational::zero();
            for &t in terms {
                sum += const_eval(ctx, t)?;
            }
            Some(sum)
        }
        Expr::Sub(l, r) => Some(const_eval(ctx, *l)? - const_eval(ctx, *r)?),
        Expr::Mul(_, factors) => {
            let mut product = BigRational::one();
            for &f in factors {
                product *= const_eval(ctx, f)?;
            }
            Some(product)
        }
        Expr::Div(l, r) => {
            let den = const_eval(ctx, *r)?;
            if den.is_zero() {
                return None;
            }
            Some(const_eval(ctx, *l)? / den)
        }
        Expr::Pow(b, e) => {
            let exp = const_eval(ctx, *e)?;
            if !exp.is_integer() || exp.is_negative() {
                return None;
            }
            let n = exp.to_integer().to_i32().filter(|&n| n <= 64)?;
            Some(const_eval(ctx, *b)?.pow(n))
        }
        Expr::Neg(inner) => Some(-const_eval(ctx, *inner)?),
        Expr::Paren(inner) => const_eval(ctx, *inner),
        Expr::Function(name, args) => {
            if name == "abs" && args.len() == 1 {
                Some(const_eval(ctx, args[0])?.abs())
            } else {
                None
            }
        }
    }
}

pub fn gcd(a: &BigInt, b: &BigInt) -> BigInt {
    a.gcd(b)
}

pub fn lcm(a: &BigInt, b: &BigInt) -> BigInt {
    a.lcm(b)
}

pub fn rational_is_negative_one(r: &BigRational) -> bool {
    r.is_negative() && r.abs().is_one()
}

#[cfg(test)]
mod tests {
    use super::*;
    use mathwalk_parser::parse;

    #[test]
    fn unsupported_detection() {
        let mut ctx = Context::new();
        let ok = parse("abs(x) + 1", &mut ctx).unwrap();
        assert!(!contains_unsupported(&ctx, ok));

        let bad = parse("sqrt(x) + 1", &mut ctx).unwrap();
        assert!(contains_unsupported(&ctx, bad));
    }

    #[test]
    fn symbol_power_sees_through_parens() {
        let mut ctx = Context::new();
        let id = parse("(x^2)", &mut ctx).unwrap();
        let (name, exp) = as_symbol_power(&ctx, id).unwrap();
        assert_eq!(name, "x");
        assert!(exp.is_some());
    }

    #[test]
    fn const_eval_handles_nested_arithmetic() {
        let mut ctx = Context::new();
        let id = parse("(8 - 2) * 2^2 / 3", &mut ctx).unwrap();
        assert_eq!(
            const_eval(&ctx, id),
            Some(BigRational::from_integer(8.into()))
        );

        let symbolic = parse("2 * x", &mut ctx).unwrap();
        assert_eq!(const_eval(&ctx, symbolic), None);
    }

    #[test]
    fn negative_one_detection() {
        let minus_one = BigRational::from_integer((-1).into());
        let one = BigRational::from_integer(1.into());
        assert!(rational_is_negative_one(&minus_one));
        assert!(!rational_is_negative_one(&one));
    }
}
