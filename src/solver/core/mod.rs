// package together all of the following and re-export
// in a partially flattened structure :
// : engine traits
// : problem data, options and results
// : error types and diagnostics sinks
// : the solve session

pub mod traits;

//partially flatten top level pieces

mod channels;
mod error;
mod problem;
mod session;
mod settings;
mod solution;
pub use channels::*;
pub use error::*;
pub use problem::*;
pub(crate) use problem::check_quadratic;
pub use session::*;
pub use settings::*;
pub use solution::*;
