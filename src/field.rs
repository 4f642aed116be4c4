//! Adapter turning a plain closure into a [`System`].
//!
//! Most callers of the steady-state search do not want to implement
//! [`Problem`] and [`System`] by hand. [`FieldSystem`] wraps a function from
//! the state vector to its time derivative and checks the dimension of what
//! the function returns.
//!
//! ```rust
//! use equilibria::{FieldSystem, Problem};
//!
//! let logistic = FieldSystem::infallible(1, |x: &[f64]| vec![x[0] * (1.0 - x[0])]);
//! assert_eq!(logistic.domain().dim(), 1);
//! ```

use std::{convert::Infallible, error::Error as StdError, marker::PhantomData};

use nalgebra::{
    storage::{Storage, StorageMut},
    Dyn, IsContiguous, Vector,
};

use crate::core::{Domain, Problem, RealField, System, SystemError};

/// A vector field given by a fallible function `&[T] -> Result<Vec<T>, E>`.
///
/// The domain of the system is unconstrained. Admissibility of the roots is a
/// concern of the steady-state search, not of the solver.
pub struct FieldSystem<T, F, E> {
    field: F,
    dim: usize,
    _marker: PhantomData<fn(&[T]) -> Result<Vec<T>, E>>,
}

impl<T, F, E> FieldSystem<T, F, E>
where
    T: RealField,
    F: Fn(&[T]) -> Result<Vec<T>, E>,
{
    /// Wraps a fallible vector field in `dim` variables.
    ///
    /// An error returned by the field aborts any computation that evaluates
    /// it.
    pub fn new(dim: usize, field: F) -> Self {
        Self {
            field,
            dim,
            _marker: PhantomData,
        }
    }

    /// Gets the number of variables.
    pub fn dim(&self) -> usize {
        self.dim
    }
}

impl<T: RealField> FieldSystem<T, (), Infallible> {
    /// Wraps a vector field that cannot fail.
    pub fn infallible<G>(
        dim: usize,
        field: G,
    ) -> FieldSystem<T, impl Fn(&[T]) -> Result<Vec<T>, Infallible>, Infallible>
    where
        G: Fn(&[T]) -> Vec<T>,
    {
        FieldSystem::new(dim, move |x: &[T]| Ok(field(x)))
    }
}

impl<T, F, E> Problem for FieldSystem<T, F, E>
where
    T: RealField,
    F: Fn(&[T]) -> Result<Vec<T>, E>,
{
    type Field = T;

    fn domain(&self) -> Domain<Self::Field> {
        Domain::unconstrained(self.dim)
    }
}

impl<T, F, E> System for FieldSystem<T, F, E>
where
    T: RealField,
    F: Fn(&[T]) -> Result<Vec<T>, E>,
    E: Into<Box<dyn StdError + Send + Sync>>,
{
    fn eval<Sx, Srx>(
        &self,
        x: &Vector<Self::Field, Dyn, Sx>,
        rx: &mut Vector<Self::Field, Dyn, Srx>,
    ) -> Result<(), SystemError>
    where
        Sx: Storage<Self::Field, Dyn> + IsContiguous,
        Srx: StorageMut<Self::Field, Dyn>,
    {
        let values = (self.field)(x.as_slice()).map_err(SystemError::custom)?;

        if values.len() != rx.len() {
            return Err(SystemError::InvalidDimensionality {
                expected: rx.len(),
                actual: values.len(),
            });
        }

        rx.iter_mut()
            .zip(values)
            .for_each(|(rxi, value)| *rxi = value);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use nalgebra::dvector;

    #[derive(Debug, thiserror::Error)]
    #[error("division by zero")]
    struct DivisionByZero;

    #[test]
    fn evaluates_closure() {
        let r = FieldSystem::infallible(2, |x: &[f64]| vec![x[0] - x[1], x[0] + x[1] - 1.0]);
        let x = dvector![0.5, 0.5];
        let mut rx = dvector![1.0, 1.0];

        r.eval(&x, &mut rx).unwrap();
        assert_eq!(rx, dvector![0.0, 0.0]);
        assert_eq!(r.domain().dim(), 2);
    }

    #[test]
    fn wrong_output_length() {
        let r = FieldSystem::infallible(2, |x: &[f64]| vec![x[0]]);
        let x = dvector![1.0, 2.0];
        let mut rx = x.clone_owned();

        assert!(matches!(
            r.eval(&x, &mut rx),
            Err(SystemError::InvalidDimensionality {
                expected: 2,
                actual: 1
            })
        ));
    }

    #[test]
    fn field_error_is_custom() {
        let r = FieldSystem::new(1, |x: &[f64]| {
            if x[0] == 0.0 {
                Err(DivisionByZero)
            } else {
                Ok(vec![1.0 / x[0]])
            }
        });
        let mut rx = dvector![0.0];

        r.eval(&dvector![2.0], &mut rx).unwrap();
        assert_eq!(rx, dvector![0.5]);

        let error = r.eval(&dvector![0.0], &mut rx).unwrap_err();
        assert!(matches!(error, SystemError::Custom(_)));
        assert_eq!(error.to_string(), "division by zero");
    }
}
