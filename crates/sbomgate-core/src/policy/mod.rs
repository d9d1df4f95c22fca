pub mod config;
pub mod eval;
pub mod index;
pub mod version;

pub use config::{PackagePolicy, PolicyConfig};
pub use eval::{EvalError, Violations, evaluate};
pub use index::PolicyIndex;
