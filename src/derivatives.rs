//! Tools for derivative-based methods.

use std::ops::Deref;

use nalgebra::{
    storage::{Storage, StorageMut},
    ComplexField, DimName, Dyn, IsContiguous, OMatrix, OVector, RealField as _, Vector, U1,
};
use num_traits::{One, Zero};

use crate::core::{Problem, RealField as _, System, SystemError};

/// Jacobian matrix of a system.
#[derive(Debug)]
pub struct Jacobian<R: Problem> {
    jac: OMatrix<R::Field, Dyn, Dyn>,
    backward: OVector<R::Field, Dyn>,
}

impl<R: Problem> Jacobian<R> {
    /// Initializes the Jacobian matrix with zeros.
    pub fn zeros(r: &R) -> Self {
        let dim = Dyn(r.domain().dim());

        Self {
            jac: OMatrix::zeros_generic(dim, dim),
            backward: OVector::zeros_generic(dim, U1::name()),
        }
    }
}

impl<R: System> Jacobian<R> {
    /// Computes the Jacobian matrix of the system in given point with given
    /// scale of variables. See [`compute`](Jacobian::compute) for more
    /// details.
    pub fn new<Sx, Sscale>(
        r: &R,
        x: &mut Vector<R::Field, Dyn, Sx>,
        scale: &Vector<R::Field, Dyn, Sscale>,
    ) -> Result<Self, SystemError>
    where
        Sx: StorageMut<R::Field, Dyn> + IsContiguous,
        Sscale: Storage<R::Field, Dyn>,
    {
        let mut jac = Self::zeros(r);
        jac.compute(r, x, scale, R::Field::EPSILON_SQRT)?;
        Ok(jac)
    }

    /// Computes the Jacobian matrix of the system in given point with given
    /// scale of variables, using central differences with relative step
    /// `eps`.
    ///
    /// The error of central differences is second order in the step, so the
    /// derivative stays accurate near a multiple root where it vanishes.
    ///
    /// The parameter `x` is mutable to allow temporary mutations avoiding
    /// unnecessary allocations, but after this method ends, the content of the
    /// vector is exactly the same as before.
    ///
    /// Information about variable scale is useful for problematic cases of
    /// finite differentiation (e.g., when the value is near zero).
    pub fn compute<Sx, Sscale>(
        &mut self,
        r: &R,
        x: &mut Vector<R::Field, Dyn, Sx>,
        scale: &Vector<R::Field, Dyn, Sscale>,
        eps: R::Field,
    ) -> Result<&mut Self, SystemError>
    where
        Sx: StorageMut<R::Field, Dyn> + IsContiguous,
        Sscale: Storage<R::Field, Dyn>,
    {
        let Self { jac, backward } = self;

        for (j, mut col) in jac.column_iter_mut().enumerate() {
            let xj = x[j];

            // The step is proportional to x_j so that F(x +- e_j * step_j)
            // and F(x) still differ in enough digits. Near zero, the typical
            // magnitude (inverse of the scale) is used instead.
            let magnitude = R::Field::one() / scale[j];
            let step = eps * xj.abs().max(magnitude);
            let step = if step == R::Field::zero() { eps } else { step };

            x[j] = xj + step;
            let x_forward = x[j];
            let mut result = r.eval(x, &mut col);

            x[j] = xj - step;
            let x_backward = x[j];
            if result.is_ok() {
                result = r.eval(x, backward);
            }

            // Restore the original value before propagating any failure.
            x[j] = xj;
            result?;

            // J[i, j] = (F(x + e_j * step_j) - F(x - e_j * step_j)) / (2 step_j),
            // with the steps actually representable in the field.
            col -= &*backward;
            col /= x_forward - x_backward;
        }

        Ok(self)
    }
}

impl<R: Problem> Deref for Jacobian<R> {
    type Target = OMatrix<R::Field, Dyn, Dyn>;

    fn deref(&self) -> &Self::Target {
        &self.jac
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::{field::FieldSystem, testing::*};
    use approx::assert_abs_diff_eq;
    use nalgebra::{dmatrix, dvector};

    #[test]
    fn rosenbrock_jacobian() {
        let r = ExtendedRosenbrock::new(2);
        let mut x = dvector![2.0, 2.0];
        let scale = dvector![1.0, 1.0];

        let jac = Jacobian::new(&r, &mut x, &scale).unwrap();
        let expected = dmatrix![-40.0, 10.0; -1.0, 0.0];
        assert_abs_diff_eq!(&*jac, &expected, epsilon = 1e-6);
        assert_eq!(x, dvector![2.0, 2.0]);
    }

    #[test]
    fn bistable_jacobian_at_zero() {
        let r = Bistable::new();
        let mut x = dvector![0.0];
        let scale = dvector![1.0];

        let jac = Jacobian::new(&r, &mut x, &scale).unwrap();
        assert_abs_diff_eq!(jac[(0, 0)], 1.0, epsilon = 1e-6);
    }

    #[test]
    fn derivative_vanishing_at_double_root() {
        let r = FieldSystem::infallible(1, |x: &[f64]| vec![x[0] * (1.0 - x[0]).powi(2)]);
        let mut x = dvector![1.0 + 1e-9];
        let scale = dvector![1.0];

        // f'(x) = (1 - x)(1 - 3x), about 2e-9 here.
        let jac = Jacobian::new(&r, &mut x, &scale).unwrap();
        assert_abs_diff_eq!(jac[(0, 0)], 2e-9, epsilon = 1e-14);
    }

    #[test]
    fn failing_system_restores_point() {
        let r = Failing::after(1);
        let mut x = dvector![0.5, -0.5];
        let scale = dvector![1.0, 1.0];
        let mut rx = x.clone_owned();
        r.eval(&x, &mut rx).unwrap();

        assert!(Jacobian::new(&r, &mut x, &scale).is_err());
        assert_eq!(x, dvector![0.5, -0.5]);
    }
}
