//! Wall clock timing of session phases.

#[allow(clippy::module_inception)]
mod timers;
pub use timers::*;
