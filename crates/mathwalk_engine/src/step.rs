use crate::change::ChangeKind;
use mathwalk_ast::ExprId;
use serde::Serialize;

/// One entry of a simplification trace. `before` and `after` are full trees
/// (the arena keeps every intermediate state alive), `after` already
/// re-normalized.
#[derive(Debug, Clone, Serialize)]
pub struct Step {
    pub change: ChangeKind,
    pub rule_name: String,
    pub description: String,
    pub before: ExprId,
    pub after: ExprId,
}
