//! Command implementations.
//!
//! - [`build`] - write the vendor tree and import list
//! - [`check`] - report the resolution without writing
//!
//! Each command exposes an `execute` function taking its parsed arguments.

pub mod build;
pub mod check;
pub(crate) mod utils;

pub use build::execute as build_execute;
pub use check::execute as check_execute;
