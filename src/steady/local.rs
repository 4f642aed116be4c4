//! Local root finding from a single initial guess.

use std::fmt::Display;

use getset::{CopyGetters, Setters};
use log::debug;
use nalgebra::{convert, ComplexField, RealField as _};
use num_traits::Zero;

use crate::{
    core::{Problem, RealField, Solver, StepError, System, SystemError},
    driver::SolverDriver,
};

/// Raw output of a local solve: the final point and whether it converged.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate<T> {
    point: Vec<T>,
    converged: bool,
}

impl<T> Candidate<T> {
    /// A point the solver converged to.
    pub fn converged(point: Vec<T>) -> Self {
        Self {
            point,
            converged: true,
        }
    }

    /// The point where the solver gave up.
    pub fn diverged(point: Vec<T>) -> Self {
        Self {
            point,
            converged: false,
        }
    }

    /// Whether the solver reported success.
    pub fn is_converged(&self) -> bool {
        self.converged
    }

    /// Gets the final point.
    pub fn point(&self) -> &[T] {
        &self.point
    }

    /// Takes the final point.
    pub fn into_point(self) -> Vec<T> {
        self.point
    }
}

/// Interface of a local root finder used by the steady-state search.
///
/// Soft failures (divergence, exhausted iterations) are reported through the
/// [`Candidate`] flag. An `Err` is reserved for failures of the system itself
/// and aborts the whole search.
pub trait LocalSolver<T> {
    /// Attempts to converge from the guess to a root.
    fn solve(&mut self, guess: &[T]) -> Result<Candidate<T>, SystemError>;
}

impl<T, L: LocalSolver<T> + ?Sized> LocalSolver<T> for &mut L {
    fn solve(&mut self, guess: &[T]) -> Result<Candidate<T>, SystemError> {
        (**self).solve(guess)
    }
}

/// Stopping rules of [`LocalDriver`].
///
/// An iterate is accepted as a root when its residual vector is exactly zero,
/// or when the last step satisfies `|| dx || <= xtol * (xtol + || x ||)` and
/// the residual norm is at most `ftol`. A small residual alone is not enough:
/// near a multiple root, the residual drops below `ftol` long before the
/// iterate is close to the root.
#[derive(Debug, Clone, Copy, CopyGetters, Setters)]
#[getset(get_copy = "pub", set = "pub")]
pub struct Convergence<T: Copy> {
    /// Maximum number of solver iterations per guess. Default: `200`.
    max_iters: usize,
    /// Largest residual norm of an accepted root. Default: `1e-12`.
    ftol: T,
    /// Relative step length under which the iteration has converged.
    /// Default: `1e-10`.
    xtol: T,
}

impl<T: RealField> Default for Convergence<T> {
    fn default() -> Self {
        Self {
            max_iters: 200,
            ftol: convert(1e-12),
            xtol: convert(1e-10),
        }
    }
}

/// [`LocalSolver`] that runs a [`Solver`] algorithm through a reusable
/// [`SolverDriver`].
pub struct LocalDriver<'a, R: Problem, A> {
    driver: SolverDriver<'a, R, A>,
    convergence: Convergence<R::Field>,
    x_prev: Vec<R::Field>,
}

impl<'a, R: Problem, A> LocalDriver<'a, R, A> {
    /// Wraps the driver with given stopping rules.
    pub fn new(driver: SolverDriver<'a, R, A>, convergence: Convergence<R::Field>) -> Self {
        Self {
            driver,
            convergence,
            x_prev: Vec::new(),
        }
    }

    /// Gets the stopping rules.
    pub fn convergence(&self) -> &Convergence<R::Field> {
        &self.convergence
    }

    /// Replaces the stopping rules.
    pub fn set_convergence(&mut self, convergence: Convergence<R::Field>) {
        self.convergence = convergence;
    }
}

impl<'a, R, A> LocalSolver<R::Field> for LocalDriver<'a, R, A>
where
    R: System,
    A: Solver<R>,
    A::Error: Display,
{
    fn solve(&mut self, guess: &[R::Field]) -> Result<Candidate<R::Field>, SystemError> {
        let Convergence {
            max_iters,
            ftol,
            xtol,
        } = self.convergence;

        self.driver.restart(guess)?;

        if self.driver.norm() == R::Field::zero() {
            return Ok(Candidate::converged(self.driver.x().to_vec()));
        }

        self.x_prev.clear();
        self.x_prev.extend_from_slice(self.driver.x());

        for iter in 0..max_iters {
            let norm = match self.driver.next().map(|(_, norm)| norm) {
                Ok(norm) => norm,
                Err(StepError::System(error)) => return Err(error),
                Err(StepError::Solver(error)) => {
                    debug!("{} stopped after {} iterations: {}", A::NAME, iter, error);
                    return Ok(Candidate::diverged(self.driver.x().to_vec()));
                }
            };

            if !norm.is_finite() {
                debug!("residuals are not finite after {} iterations", iter);
                return Ok(Candidate::diverged(self.driver.x().to_vec()));
            }

            if norm == R::Field::zero() {
                return Ok(Candidate::converged(self.driver.x().to_vec()));
            }

            let x = self.driver.x();
            let (step_norm2, x_norm2) = x.iter().zip(self.x_prev.iter()).fold(
                (R::Field::zero(), R::Field::zero()),
                |(step, len), (&xi, &pi)| (step + (xi - pi) * (xi - pi), len + xi * xi),
            );
            let step_norm = step_norm2.sqrt();

            // A rejected step leaves x unchanged, which counts as a zero step.
            if norm <= ftol && step_norm <= xtol * (xtol + x_norm2.sqrt()) {
                return Ok(Candidate::converged(x.to_vec()));
            }

            self.x_prev.copy_from_slice(x);
        }

        debug!("no convergence within {} iterations", max_iters);
        Ok(Candidate::diverged(self.driver.x().to_vec()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::{field::FieldSystem, testing::*};
    use approx::assert_abs_diff_eq;

    #[test]
    fn converges_to_nearest_equilibrium() {
        let r = Bistable::new();
        let mut local = LocalDriver::new(SolverDriver::new(&r), Convergence::default());

        let candidate = local.solve(&[0.9]).unwrap();
        assert!(candidate.is_converged());
        assert_abs_diff_eq!(candidate.point()[0], 1.0, epsilon = 1e-10);

        let candidate = local.solve(&[-0.8]).unwrap();
        assert!(candidate.is_converged());
        assert_abs_diff_eq!(candidate.point()[0], -1.0, epsilon = 1e-10);

        let candidate = local.solve(&[0.1]).unwrap();
        assert!(candidate.is_converged());
        assert_abs_diff_eq!(candidate.point()[0], 0.0, epsilon = 1e-10);
    }

    #[test]
    fn converges_outside_of_any_bounds() {
        let r = Offset::new(5.0);
        let mut local = LocalDriver::new(SolverDriver::new(&r), Convergence::default());

        let candidate = local.solve(&[0.5]).unwrap();
        assert!(candidate.is_converged());
        assert_abs_diff_eq!(candidate.point()[0], -5.0, epsilon = 1e-10);
    }

    #[test]
    fn iteration_budget_is_respected() {
        let r = ExtendedRosenbrock::new(2);
        let mut convergence = Convergence::default();
        convergence.set_max_iters(1);
        let mut local = LocalDriver::new(SolverDriver::new(&r), convergence);

        let candidate = local.solve(&[6.39, -0.221]).unwrap();
        assert!(!candidate.is_converged());
    }

    #[test]
    fn solver_failure_is_not_fatal() {
        // No real root, the residual norm never gets below one.
        let r = FieldSystem::infallible(1, |x: &[f64]| vec![x[0] * x[0] + 1.0]);
        let mut local = LocalDriver::new(SolverDriver::new(&r), Convergence::default());

        let candidate = local.solve(&[0.7]).unwrap();
        assert!(!candidate.is_converged());
    }

    #[test]
    fn guess_at_root_is_accepted() {
        let r = InfiniteSolutions::new(2);
        let mut local = LocalDriver::new(SolverDriver::new(&r), Convergence::default());

        let candidate = local.solve(&[3.0, -1.0]).unwrap();
        assert!(candidate.is_converged());
        assert_eq!(candidate.point(), &[3.0, -1.0]);
    }

    #[test]
    fn small_residual_is_not_enough_at_double_root() {
        // The residual is below 1e-12 already 1e-6 away from the root at 1.
        let r = FieldSystem::infallible(1, |x: &[f64]| vec![x[0] * (1.0 - x[0]).powi(2)]);
        let mut local = LocalDriver::new(SolverDriver::new(&r), Convergence::default());

        for guess in [0.6, 0.8, 1.3, 1.9] {
            let candidate = local.solve(&[guess]).unwrap();
            assert!(candidate.is_converged());
            assert_abs_diff_eq!(candidate.point()[0], 1.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn system_failure_is_fatal() {
        let r = Failing::after(2);
        let mut local = LocalDriver::new(SolverDriver::new(&r), Convergence::default());

        assert!(local.solve(&[0.5, -0.5]).is_err());
    }
}
