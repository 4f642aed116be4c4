use nalgebra::{storage::StorageMut, Dyn, IsContiguous, Vector};
use thiserror::Error;

use super::{domain::Domain, system::System, SystemError};

/// Failure of a single solver step.
///
/// The two variants are handled differently by callers. A system error
/// means the residual function itself failed and cannot be recovered from,
/// while a solver error only means the current trajectory went nowhere.
#[derive(Debug, Error)]
pub enum StepError<E> {
    /// Evaluation of the system failed.
    #[error("{0}")]
    System(#[from] SystemError),
    /// The solver could not make a step.
    #[error("{0}")]
    Solver(E),
}

/// Interface of a solver.
///
/// A solver is an iterative algorithm which takes a point _x_ and computes the
/// next step in the solving process. Repeated calls to the next step should
/// eventually converge into a solution _x'_ in successful cases.
pub trait Solver<R: System> {
    /// Name of the solver.
    const NAME: &'static str;

    /// Error while computing the next step.
    type Error;

    /// Computes the next step in the solving process.
    ///
    /// The value of `x` is the current point. After the method returns, `x`
    /// should hold the variable values of the performed step and `rx` _must_
    /// contain residuals of that step as computed by [`System::eval`].
    ///
    /// The implementations _can_ assume that subsequent calls to `solve_next`
    /// pass the value of `x` as was returned in the previous iteration, unless
    /// [`Solver::reset`] was called in between.
    fn solve_next<Sx, Srx>(
        &mut self,
        r: &R,
        dom: &Domain<R::Field>,
        x: &mut Vector<R::Field, Dyn, Sx>,
        rx: &mut Vector<R::Field, Dyn, Srx>,
    ) -> Result<(), StepError<Self::Error>>
    where
        Sx: StorageMut<R::Field, Dyn> + IsContiguous,
        Srx: StorageMut<R::Field, Dyn>;

    /// Forgets any state carried over from previous iterations.
    ///
    /// Called whenever the solving process is restarted from an unrelated
    /// point.
    fn reset(&mut self) {}
}
