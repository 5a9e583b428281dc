//! The stepping driver.
//!
//! `step` finds the single next rewrite: rules are consulted in their
//! registration order, and each rule searches the whole tree depth-first
//! before the next rule gets a turn. The rule-major sweep is what makes
//! constant folding anywhere in the tree win over distribution anywhere
//! else — `(2+2)*5` folds its sum; it never expands. Within one rule the
//! pre-order walk makes the firing site deterministic, so traces are
//! reproducible.

use crate::error::EngineError;
use crate::helpers::contains_unsupported;
use crate::normalize::normalize;
use crate::rule::{Rewrite, Rule};
use crate::step::Step;
use mathwalk_ast::{exprs_equal, Context, ExprId};
use std::sync::Arc;
use tracing::debug;

/// Iteration cap; exceeding it means a rule pair is undoing itself.
pub const MAX_STEPS: usize = 1024;

pub struct Simplifier {
    pub context: Context,
    rules: Vec<Arc<dyn Rule>>,
    pub max_steps: usize,
}

impl Default for Simplifier {
    fn default() -> Self {
        Self::with_default_rules()
    }
}

impl Simplifier {
    /// A driver with no rules registered; `step` will never fire.
    pub fn new() -> Self {
        Self {
            context: Context::new(),
            rules: Vec::new(),
            max_steps: MAX_STEPS,
        }
    }

    /// The standard engine: every rule family, in the documented order.
    pub fn with_default_rules() -> Self {
        let mut s = Self::new();
        s.register_default_rules();
        s
    }

    /// Family order matters. Fractions sweep before constant folding:
    /// the common-denominator rewrite produces divisible fractions like
    /// `2/2` on purpose, and folding them first would undo the rewrite and
    /// loop (`6/3 + 1/3` is the minimal victim). Arithmetic still sweeps
    /// before distribution so `(2+2)*5` folds instead of expanding.
    pub fn register_default_rules(&mut self) {
        crate::rules::signs::register(self);
        crate::rules::fractions::register(self);
        crate::rules::arithmetic::register(self);
        crate::rules::poly_terms::register(self);
        crate::rules::distribute::register(self);
        crate::rules::cancel::register(self);
        crate::rules::absolute_value::register(self);
    }

    pub fn add_rule(&mut self, rule: Box<dyn Rule>) {
        self.rules.push(rule.into());
    }

    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    /// Apply the single next rewrite, or `None` at a normal form. The input
    /// is expected to be normalized (as `simplify` guarantees between
    /// steps); `after` in the returned record is re-normalized.
    pub fn step(&mut self, expr: ExprId) -> Option<Step> {
        for i in 0..self.rules.len() {
            let rule = self.rules[i].clone();
            if let Some((new_root, rewrite)) = self.apply_anywhere(rule.as_ref(), expr) {
                let after = normalize(&mut self.context, new_root);
                let change = rewrite.change.unwrap_or_else(|| rule.change_kind());
                debug!(rule = rule.name(), change = %change, "rule fired");
                return Some(Step {
                    change,
                    rule_name: rule.name().to_string(),
                    description: rewrite.description,
                    before: expr,
                    after,
                });
            }
        }
        None
    }

    /// Depth-first, pre-order search for the first node where `rule` fires;
    /// rebuilds the path back to the root around the replacement.
    fn apply_anywhere(&mut self, rule: &dyn Rule, id: ExprId) -> Option<(ExprId, Rewrite)> {
        if let Some(rewrite) = rule.apply(&mut self.context, id) {
            // A structurally equal result is a no-op, not a change.
            if !exprs_equal(&self.context, rewrite.new_expr, id) {
                return Some((rewrite.new_expr, rewrite));
            }
        }
        let children = self.context.children(id);
        for (i, &child) in children.iter().enumerate() {
            if let Some((new_child, rewrite)) = self.apply_anywhere(rule, child) {
                let mut new_children = children.clone();
                new_children[i] = new_child;
                let rebuilt = self.context.rebuild(id, &new_children);
                return Some((rebuilt, rewrite));
            }
        }
        None
    }

    /// Rewrite to a fixed point. Unsupported trees (any function other than
    /// `abs`) come back untouched with an empty trace.
    pub fn simplify(&mut self, expr: ExprId) -> Result<(ExprId, Vec<Step>), EngineError> {
        if contains_unsupported(&self.context, expr) {
            debug!("expression contains an unsupported function; returning unchanged");
            return Ok((expr, Vec::new()));
        }
        let mut current = normalize(&mut self.context, expr);
        let mut steps: Vec<Step> = Vec::new();
        loop {
            match self.step(current) {
                Some(step) => {
                    current = step.after;
                    steps.push(step);
                    if steps.len() > self.max_steps {
                        return Err(EngineError::RuleLoop {
                            iterations: steps.len(),
                            trace: steps,
                        });
                    }
                }
                None => break,
            }
        }
        #[cfg(debug_assertions)]
        self.assert_normal_form_invariants(current);
        Ok((current, steps))
    }

    /// The full ordered trace of `simplify`.
    pub fn step_through(&mut self, expr: ExprId) -> Result<Vec<Step>, EngineError> {
        self.simplify(expr).map(|(_, steps)| steps)
    }

    /// Flatness and canonical fraction sign, checked on final forms in
    /// debug builds.
    #[cfg(debug_assertions)]
    fn assert_normal_form_invariants(&self, id: ExprId) {
        use mathwalk_ast::Expr;
        match self.context.get(id) {
            Expr::Add(terms) => {
                for &t in terms {
                    debug_assert!(
                        !matches!(self.context.get(t), Expr::Add(_)),
                        "flatness violated: + directly under +"
                    );
                }
            }
            Expr::Mul(_, factors) => {
                // Canonical polynomial terms are atoms; any other product
                // nested in a product is a flatten failure.
                for &f in factors {
                    debug_assert!(
                        !matches!(self.context.get(f), Expr::Mul(_, _))
                            || crate::normalize::is_atomic_term(&self.context, f),
                        "flatness violated: * directly under *"
                    );
                }
            }
            Expr::Div(_, _) => {
                if let Some((_, den)) = mathwalk_ast::as_constant_fraction(&self.context, id) {
                    debug_assert!(
                        den > num_rational::BigRational::from_integer(0.into()),
                        "canonical sign violated: non-positive denominator"
                    );
                }
            }
            _ => {}
        }
        for child in self.context.children(id) {
            self.assert_normal_form_invariants(child);
        }
    }
}

