pub mod solve;

pub use solve::{SolveError, SolveOutcome, SolveStep, Solver, SolverCapabilities};
