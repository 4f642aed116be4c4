//! Core abstractions and types.
//!
//! *Users* are mainly interested in implementing the [`System`] trait (or in
//! wrapping a closure with [`FieldSystem`](crate::FieldSystem)) and in
//! describing the admissible [domain](Domain) of the state variables.
//!
//! Algorithm *developers* are interested in implementing the [`Solver`]
//! trait, using tools from the [derivatives](crate::derivatives) module.

mod base;
mod domain;
mod solver;
mod system;

pub use base::*;
pub use domain::*;
pub use solver::*;
pub use system::*;
