mod core;
pub use self::core::*;
mod utils;
pub use utils::*;
mod matrix_math;
