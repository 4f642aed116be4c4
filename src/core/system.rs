use nalgebra::{
    storage::{Storage, StorageMut},
    Dyn, IsContiguous, Vector,
};
use thiserror::Error;

use super::base::Problem;

/// Error encountered while evaluating the residuals of a system.
///
/// Any such error is fatal for a steady-state search. It is not a
/// non-convergence signal.
#[derive(Debug, Error)]
pub enum SystemError {
    /// The number of residuals does not match the number of variables.
    #[error("invalid dimensionality: expected {expected}, got {actual}")]
    InvalidDimensionality {
        /// Dimension of the domain.
        expected: usize,
        /// Length actually produced.
        actual: usize,
    },
    /// A custom error raised by the system itself.
    #[error("{0}")]
    Custom(Box<dyn std::error::Error + Send + Sync>),
}

impl SystemError {
    /// Wraps an arbitrary error raised by a user-provided system.
    pub fn custom<E>(error: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        SystemError::Custom(error.into())
    }
}

/// Definition of a system of equations.
///
/// ## Defining a system
///
/// A system is any type that implements [`System`] and [`Problem`] traits.
///
/// ```rust
/// use equilibria::nalgebra as na;
/// use equilibria::{Domain, Problem, System, SystemError};
/// use na::{Dyn, IsContiguous};
///
/// struct Bistable;
///
/// impl Problem for Bistable {
///     type Field = f64;
///
///     fn domain(&self) -> Domain<Self::Field> {
///         Domain::unconstrained(1)
///     }
/// }
///
/// impl System for Bistable {
///     fn eval<Sx, Srx>(
///         &self,
///         x: &na::Vector<Self::Field, Dyn, Sx>,
///         rx: &mut na::Vector<Self::Field, Dyn, Srx>,
///     ) -> Result<(), SystemError>
///     where
///         Sx: na::storage::Storage<Self::Field, Dyn> + IsContiguous,
///         Srx: na::storage::StorageMut<Self::Field, Dyn>,
///     {
///         rx[0] = x[0] - x[0].powi(3);
///         Ok(())
///     }
/// }
/// ```
pub trait System: Problem {
    /// Calculates the system residuals in given point.
    fn eval<Sx, Srx>(
        &self,
        x: &Vector<Self::Field, Dyn, Sx>,
        rx: &mut Vector<Self::Field, Dyn, Srx>,
    ) -> Result<(), SystemError>
    where
        Sx: Storage<Self::Field, Dyn> + IsContiguous,
        Srx: StorageMut<Self::Field, Dyn>;
}
