//! Engine backends.
//!
//! Each backend implements the [traits](crate::solver::traits) for one
//! external optimization engine, and is enabled by the cargo feature of
//! the same name.

#[cfg(any(feature = "clarabel", feature = "highs"))]
mod channels;
#[cfg(any(feature = "clarabel", feature = "highs"))]
pub(crate) use channels::*;

#[cfg(feature = "clarabel")]
pub mod clarabel;

#[cfg(feature = "highs")]
pub mod highs;
