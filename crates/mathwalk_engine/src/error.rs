use crate::step::Step;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    /// The rewrite loop exceeded its iteration cap. This always indicates a
    /// rule bug (a pair of rules undoing each other); the trace collected so
    /// far is attached for reproduction.
    #[error("no fixed point after {iterations} rewrite steps")]
    RuleLoop { iterations: usize, trace: Vec<Step> },
}
