//! Linear equation and inequality solving.
//!
//! The solver drives the simplifier on both sides, then applies one balance
//! operation per round: swap sides when the variable sits on the right,
//! subtract the smaller variable occurrence when it sits on both, move
//! non-variable addends across one at a time, and finish by dividing out an
//! integer coefficient or multiplying by the reciprocal of a fractional
//! one — flipping the comparator whenever the multiplier is negative.
//!
//! Contradictions reduce to a constant relation and come back as
//! `Truth(false)` (the "no solution" sentinel); shapes the solver cannot
//! isolate are errors, so callers can tell "no solution" from "not
//! solvable here".

use mathwalk_ast::{
    numeric_value, Context, DisplayExpr, Equation, Expr, ExprId, RelOp,
};
use mathwalk_engine::{
    helpers::contains_unsupported, ChangeKind, EngineError, PolyTerm, Simplifier,
};
use num_rational::BigRational;
use num_traits::{One, Signed};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use thiserror::Error;
use tracing::debug;

/// Balance operations applied per solver round, bounded for the same reason
/// the simplifier bounds its rewrite loop.
const MAX_ROUNDS: usize = 64;

#[derive(Debug, Clone, Copy, Default)]
pub struct SolverCapabilities {
    /// Solving through a fraction whose denominator contains the variable
    /// is unimplemented in the original engine; attempts are refused unless
    /// this is set.
    pub fraction_with_variable: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct SolveStep {
    pub change: ChangeKind,
    pub description: String,
    pub equation_after: Equation,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolveOutcome {
    /// `symbol op constant` (or constant-free right side).
    Solved(Equation),
    /// Constant relation: `Truth(true)` for identities like `1 < 2`,
    /// `Truth(false)` for contradictions — that is, no solution.
    Truth(bool),
}

impl SolveOutcome {
    pub fn display<'a>(&'a self, context: &'a Context) -> DisplayOutcome<'a> {
        DisplayOutcome {
            context,
            outcome: self,
        }
    }
}

pub struct DisplayOutcome<'a> {
    context: &'a Context,
    outcome: &'a SolveOutcome,
}

impl<'a> fmt::Display for DisplayOutcome<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.outcome {
            SolveOutcome::Truth(true) => write!(f, "True"),
            SolveOutcome::Truth(false) => write!(f, "False"),
            SolveOutcome::Solved(eq) => write!(f, "{}", eq.display(self.context)),
        }
    }
}

#[derive(Error, Debug)]
pub enum SolveError {
    #[error("variable '{0}' does not occur in the equation")]
    MissingVariable(String),
    #[error("cannot solve: the equation is not linear in '{0}'")]
    NonLinear(String),
    #[error("cannot solve through a fraction containing '{0}'")]
    VariableFraction(String),
    #[error("cannot isolate '{0}': {1}")]
    CannotIsolate(String, String),
    #[error("solver made no progress")]
    Stalled,
    #[error(transparent)]
    Engine(#[from] EngineError),
}

pub struct Solver {
    pub simplifier: Simplifier,
    pub capabilities: SolverCapabilities,
}

impl Default for Solver {
    fn default() -> Self {
        Self::new()
    }
}

impl Solver {
    pub fn new() -> Self {
        Self {
            simplifier: Simplifier::with_default_rules(),
            capabilities: SolverCapabilities::default(),
        }
    }

    fn ctx(&self) -> &Context {
        &self.simplifier.context
    }

    /// Solve for the single variable of the equation; constant equations
    /// evaluate to `Truth`.
    pub fn solve(&mut self, equation: Equation) -> Result<(SolveOutcome, Vec<SolveStep>), SolveError> {
        let mut symbols = BTreeSet::new();
        collect_symbols(self.ctx(), equation.lhs, &mut symbols);
        collect_symbols(self.ctx(), equation.rhs, &mut symbols);
        match symbols.len() {
            0 => {
                let mut steps = Vec::new();
                let eq = self.simplify_sides(equation, &mut steps)?;
                let outcome = self
                    .truth_value(&eq)
                    .map(SolveOutcome::Truth)
                    .ok_or(SolveError::Stalled)?;
                Ok((outcome, steps))
            }
            1 => match symbols.into_iter().next() {
                Some(var) => self.solve_for(equation, &var),
                None => Err(SolveError::Stalled),
            },
            _ => Err(SolveError::CannotIsolate(
                symbols.into_iter().collect::<Vec<_>>().join(", "),
                "more than one variable; use solve_for".to_string(),
            )),
        }
    }

    pub fn solve_for(
        &mut self,
        equation: Equation,
        var: &str,
    ) -> Result<(SolveOutcome, Vec<SolveStep>), SolveError> {
        if contains_unsupported(self.ctx(), equation.lhs)
            || contains_unsupported(self.ctx(), equation.rhs)
        {
            return Err(SolveError::CannotIsolate(
                var.to_string(),
                "the equation contains an unsupported function".to_string(),
            ));
        }
        if !self.ctx().contains_symbol(equation.lhs, var)
            && !self.ctx().contains_symbol(equation.rhs, var)
        {
            return Err(SolveError::MissingVariable(var.to_string()));
        }
        if !self.capabilities.fraction_with_variable
            && (variable_in_denominator(self.ctx(), equation.lhs, var)
                || variable_in_denominator(self.ctx(), equation.rhs, var))
        {
            return Err(SolveError::VariableFraction(var.to_string()));
        }

        let mut steps: Vec<SolveStep> = Vec::new();
        let mut eq = equation;
        for round in 0..MAX_ROUNDS {
            eq = self.simplify_sides(eq, &mut steps)?;
            debug!(round, equation = %eq.display(self.ctx()), "solver round");

            let lhs_has = self.ctx().contains_symbol(eq.lhs, var);
            let rhs_has = self.ctx().contains_symbol(eq.rhs, var);

            if !lhs_has && !rhs_has {
                // The variable vanished: the relation is now constant.
                let truth = self.truth_value(&eq).ok_or(SolveError::Stalled)?;
                return Ok((SolveOutcome::Truth(truth), steps));
            }

            if !lhs_has && rhs_has {
                eq = Equation::new(eq.rhs, eq.op.flipped(), eq.lhs);
                self.record(&mut steps, ChangeKind::SwapSides, "swap the two sides", eq);
                continue;
            }

            if lhs_has && rhs_has {
                let lhs_term = self.find_variable_term(eq.lhs, var)?;
                let rhs_term = self.find_variable_term(eq.rhs, var)?;
                let chosen = smaller_term(self.ctx(), &lhs_term, &rhs_term);
                eq = self.subtract_from_both_sides(eq, &chosen, &mut steps);
                continue;
            }

            // Variable on the left only: clear non-variable addends first.
            if let Some(addend) = self.first_non_variable_addend(eq.lhs, var) {
                eq = self.move_addend(eq, addend, &mut steps);
                continue;
            }

            // The left side is a lone variable term.
            let term = PolyTerm::from_expr(self.ctx(), eq.lhs).ok_or_else(|| {
                SolveError::CannotIsolate(
                    var.to_string(),
                    "the variable side is not a polynomial term".to_string(),
                )
            })?;
            let degree = term
                .degree(self.ctx())
                .ok_or_else(|| SolveError::NonLinear(var.to_string()))?;
            if !degree.is_one() {
                return Err(SolveError::NonLinear(var.to_string()));
            }
            if term.coefficient.is_one() {
                return Ok((SolveOutcome::Solved(eq), steps));
            }
            eq = self.divide_out_coefficient(eq, &term.coefficient, &mut steps);
        }
        Err(SolveError::Stalled)
    }

    fn record(
        &self,
        steps: &mut Vec<SolveStep>,
        change: ChangeKind,
        description: impl Into<String>,
        equation_after: Equation,
    ) {
        steps.push(SolveStep {
            change,
            description: description.into(),
            equation_after,
        });
    }

    /// Simplify both sides independently, recording every engine step as a
    /// solver step showing the whole equation.
    fn simplify_sides(
        &mut self,
        eq: Equation,
        steps: &mut Vec<SolveStep>,
    ) -> Result<Equation, SolveError> {
        let (new_lhs, lhs_steps) = self.simplifier.simplify(eq.lhs)?;
        let mut current = Equation::new(eq.lhs, eq.op, eq.rhs);
        for s in lhs_steps {
            current = Equation::new(s.after, current.op, current.rhs);
            self.record(steps, s.change, s.description.clone(), current);
        }
        current = Equation::new(new_lhs, current.op, current.rhs);

        let (new_rhs, rhs_steps) = self.simplifier.simplify(current.rhs)?;
        for s in rhs_steps {
            current = Equation::new(current.lhs, current.op, s.after);
            self.record(steps, s.change, s.description.clone(), current);
        }
        Ok(Equation::new(current.lhs, current.op, new_rhs))
    }

    fn truth_value(&self, eq: &Equation) -> Option<bool> {
        let l = numeric_value(self.ctx(), eq.lhs)?;
        let r = numeric_value(self.ctx(), eq.rhs)?;
        Some(match eq.op {
            RelOp::Eq => l == r,
            RelOp::Lt => l < r,
            RelOp::Leq => l <= r,
            RelOp::Gt => l > r,
            RelOp::Geq => l >= r,
        })
    }

    /// First addend of `side` that reads as a polynomial term in `var`.
    fn find_variable_term(&self, side: ExprId, var: &str) -> Result<PolyTerm, SolveError> {
        let ctx = self.ctx();
        let addends: Vec<ExprId> = match ctx.get(side) {
            Expr::Add(terms) => terms.clone(),
            _ => vec![side],
        };
        for addend in addends {
            if !ctx.contains_symbol(addend, var) {
                continue;
            }
            if let Some(term) = PolyTerm::from_expr(ctx, addend) {
                if term.symbol == var {
                    return Ok(term);
                }
            }
            return Err(SolveError::CannotIsolate(
                var.to_string(),
                "the variable occurs in a shape the solver does not handle".to_string(),
            ));
        }
        Err(SolveError::CannotIsolate(
            var.to_string(),
            "no variable term found".to_string(),
        ))
    }

    fn first_non_variable_addend(&self, side: ExprId, var: &str) -> Option<ExprId> {
        let ctx = self.ctx();
        match ctx.get(side) {
            Expr::Add(terms) => terms
                .iter()
                .copied()
                .find(|&t| !ctx.contains_symbol(t, var)),
            _ => None,
        }
    }

    /// Subtract `term` from both sides (adding when the term is negative),
    /// leaving the arithmetic to the next simplification round.
    fn subtract_from_both_sides(
        &mut self,
        eq: Equation,
        term: &PolyTerm,
        steps: &mut Vec<SolveStep>,
    ) -> Equation {
        let ctx = &mut self.simplifier.context;
        let negative = term.coefficient.is_negative();
        // Subtracting a negative occurrence means adding its magnitude.
        let magnitude = PolyTerm {
            coefficient: term.coefficient.abs(),
            symbol: term.symbol.clone(),
            exponent: term.exponent,
        };
        let operand = magnitude.build(ctx);
        let (change, verb) = if negative {
            (ChangeKind::AddToBothSides, "add")
        } else {
            (ChangeKind::SubtractFromBothSides, "subtract")
        };
        let (new_lhs, new_rhs) = if negative {
            let l = ctx.add(Expr::Add(vec![eq.lhs, operand]));
            let r = ctx.add(Expr::Add(vec![eq.rhs, operand]));
            (l, r)
        } else {
            let l = ctx.add(Expr::Sub(eq.lhs, operand));
            let r = ctx.add(Expr::Sub(eq.rhs, operand));
            (l, r)
        };
        let new_eq = Equation::new(new_lhs, eq.op, new_rhs);
        let rendered = format!(
            "{} {} on both sides",
            verb,
            DisplayExpr {
                context: self.ctx(),
                id: operand
            }
        );
        self.record(steps, change, rendered, new_eq);
        new_eq
    }

    /// Move one non-variable addend to the other side.
    fn move_addend(
        &mut self,
        eq: Equation,
        addend: ExprId,
        steps: &mut Vec<SolveStep>,
    ) -> Equation {
        let ctx = &mut self.simplifier.context;
        let negative = matches!(ctx.get(ctx.unwrap_parens(addend)), Expr::Neg(_))
            || ctx.constant_value(addend).is_some_and(|v| v.is_negative());
        let change = if negative {
            ChangeKind::AddToBothSides
        } else {
            ChangeKind::SubtractFromBothSides
        };
        let shown = match ctx.get(ctx.unwrap_parens(addend)) {
            Expr::Neg(inner) => *inner,
            _ => addend,
        };
        let new_lhs = ctx.add(Expr::Sub(eq.lhs, addend));
        let new_rhs = ctx.add(Expr::Sub(eq.rhs, addend));
        let new_eq = Equation::new(new_lhs, eq.op, new_rhs);
        let verb = if negative { "add" } else { "subtract" };
        let rendered = format!(
            "{} {} on both sides",
            verb,
            DisplayExpr {
                context: self.ctx(),
                id: shown
            }
        );
        self.record(steps, change, rendered, new_eq);
        new_eq
    }

    /// `c·x = r` finishes by division for integer `c`, or multiplication by
    /// the reciprocal for fractional `c`; either flips an inequality when
    /// `c` is negative.
    fn divide_out_coefficient(
        &mut self,
        eq: Equation,
        coefficient: &BigRational,
        steps: &mut Vec<SolveStep>,
    ) -> Equation {
        let ctx = &mut self.simplifier.context;
        let op = if coefficient.is_negative() {
            eq.op.flipped()
        } else {
            eq.op
        };
        if coefficient.is_integer() {
            let divisor = ctx.rat(coefficient);
            let new_lhs = ctx.add(Expr::Div(eq.lhs, divisor));
            let new_rhs = ctx.add(Expr::Div(eq.rhs, divisor));
            let new_eq = Equation::new(new_lhs, op, new_rhs);
            let rendered = format!(
                "divide both sides by {}",
                DisplayExpr {
                    context: self.ctx(),
                    id: divisor
                }
            );
            self.record(steps, ChangeKind::DivideFromBothSides, rendered, new_eq);
            new_eq
        } else {
            let reciprocal = coefficient.recip();
            let multiplier = ctx.rat(&reciprocal);
            let new_lhs = ctx.add(Expr::Mul(false, vec![multiplier, eq.lhs]));
            let new_rhs = ctx.add(Expr::Mul(false, vec![multiplier, eq.rhs]));
            let new_eq = Equation::new(new_lhs, op, new_rhs);
            let rendered = format!(
                "multiply both sides by {}",
                DisplayExpr {
                    context: self.ctx(),
                    id: multiplier
                }
            );
            self.record(steps, ChangeKind::MultiplyBothSides, rendered, new_eq);
            new_eq
        }
    }
}

fn collect_symbols(ctx: &Context, id: ExprId, out: &mut BTreeSet<String>) {
    match ctx.get(id) {
        Expr::Symbol(name) => {
            out.insert(name.clone());
        }
        _ => {
            for child in ctx.children(id) {
                collect_symbols(ctx, child, out);
            }
        }
    }
}

fn variable_in_denominator(ctx: &Context, id: ExprId, var: &str) -> bool {
    match ctx.get(id) {
        Expr::Div(num, den) => {
            ctx.contains_symbol(*den, var)
                || variable_in_denominator(ctx, *num, var)
                || variable_in_denominator(ctx, *den, var)
        }
        _ => ctx
            .children(id)
            .iter()
            .any(|&c| variable_in_denominator(ctx, c, var)),
    }
}

/// Pick the occurrence to eliminate when the variable sits on both sides:
/// lower degree first, then smaller coefficient magnitude, ties to the
/// right side so subtraction clears the right.
fn smaller_term(ctx: &Context, lhs: &PolyTerm, rhs: &PolyTerm) -> PolyTerm {
    let ld = lhs.degree(ctx);
    let rd = rhs.degree(ctx);
    match (ld, rd) {
        (Some(a), Some(b)) if a < b => lhs.clone(),
        (Some(a), Some(b)) if b < a => rhs.clone(),
        _ => {
            if lhs.coefficient.abs() < rhs.coefficient.abs() {
                lhs.clone()
            } else {
                rhs.clone()
            }
        }
    }
}
