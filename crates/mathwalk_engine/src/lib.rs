pub mod change;
pub mod error;
pub mod helpers;
#[macro_use]
pub mod macros;
pub mod normalize;
pub mod poly_term;
pub mod rule;
pub mod rules;
pub mod simplifier;
pub mod step;

pub use change::ChangeKind;
pub use error::EngineError;
pub use normalize::{flatten, normalize, remove_unnecessary_parens, Slot};
pub use poly_term::PolyTerm;
pub use rule::{Rewrite, Rule};
pub use simplifier::{Simplifier, MAX_STEPS};
pub use step::Step;
