use crate::change::ChangeKind;
use mathwalk_ast::{Context, ExprId};

/// Result of one rule firing: the replacement subtree, a human-readable
/// description, and an optional change-kind override for rules that report
/// different kinds depending on what they found.
pub struct Rewrite {
    pub new_expr: ExprId,
    pub description: String,
    pub change: Option<ChangeKind>,
}

impl Rewrite {
    pub fn new(new_expr: ExprId) -> Self {
        Self {
            new_expr,
            description: String::new(),
            change: None,
        }
    }

    pub fn desc(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_change(mut self, change: ChangeKind) -> Self {
        self.change = Some(change);
        self
    }
}

/// A local rewrite. `apply` either returns a replacement for `expr` or
/// `None`; it must not mutate existing nodes (the arena is append-only, so
/// it cannot), and a rewrite that is structurally equal to its input is
/// treated as no change by the driver.
pub trait Rule {
    fn name(&self) -> &'static str;

    /// The step annotation this rule reports unless its `Rewrite` overrides.
    fn change_kind(&self) -> ChangeKind;

    fn apply(&self, ctx: &mut Context, expr: ExprId) -> Option<Rewrite>;
}
