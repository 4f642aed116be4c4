//! Testing systems and utilities useful for benchmarking, debugging and smoke
//! testing.
//!
//! [`ExtendedRosenbrock`] and [`Bistable`] are recommended for first tests.
//! Others can be used for specific conditions (e.g., roots outside of a
//! domain, a singular Jacobian matrix or a failing residual function).
//!
//! # References
//!
//! \[1\] [A Literature Survey of Benchmark Functions For Global Optimization
//! Problems](https://arxiv.org/abs/1308.4008)
//!
//! \[2\] [Numerical Methods for Unconstrained Optimization and Nonlinear
//! Equations](https://epubs.siam.org/doi/book/10.1137/1.9781611971200)
//!
//! \[3\] [Nonlinear Dynamics and Chaos](https://www.routledge.com/9780367026509)

#![allow(unused)]

use std::{cell::Cell, error::Error as StdError};

use nalgebra::{
    dvector,
    storage::{Storage, StorageMut},
    ComplexField, DVector, DimName, Dyn, IsContiguous, OVector, Vector, U1,
};
use thiserror::Error;

use crate::core::{Domain, Problem, Solver, StepError, System, SystemError};

/// Extension of the [`System`] trait that provides additional information that
/// is useful for testing solvers.
pub trait TestSystem: System {
    /// Standard initial values for the system. Using the same initial values is
    /// essential for fair comparison of methods.
    fn initials(&self) -> Vec<OVector<Self::Field, Dyn>>;

    /// The set of equilibria (if known and finite). This is mostly just for
    /// information, for example to know how close a solver got even if it
    /// failed. For testing if a given point is root, [`TestSystem::is_root`]
    /// should be used.
    fn equilibria(&self) -> Vec<OVector<Self::Field, Dyn>> {
        Vec::new()
    }

    /// Tests if given point is a root of the system, given the tolerance `eps`.
    fn is_root<Sx>(&self, x: &Vector<Self::Field, Dyn, Sx>, eps: Self::Field) -> bool
    where
        Sx: Storage<Self::Field, Dyn> + IsContiguous,
    {
        let mut rx = x.clone_owned();
        match self.eval(x, &mut rx) {
            Ok(()) => rx.norm() <= eps,
            Err(_) => false,
        }
    }

    /// Tests if given point is within `eps` (in every coordinate) of one of the
    /// known [equilibria](TestSystem::equilibria).
    fn is_equilibrium(&self, x: &[Self::Field], eps: Self::Field) -> bool {
        self.equilibria().iter().any(|e| {
            e.len() == x.len()
                && e.iter()
                    .zip(x.iter())
                    .all(|(ei, xi)| (*ei - *xi).abs() <= eps)
        })
    }
}

/// [Extended Rosenbrock
/// function](https://en.wikipedia.org/wiki/Rosenbrock_function) \[1,2\] (also
/// known as Rosenbrock's valley or banana function).
///
/// The only root is inside a long, narrow, parabolic shaped flat valley.
#[derive(Debug, Clone, Copy)]
pub struct ExtendedRosenbrock {
    n: usize,
    alpha: f64,
}

impl ExtendedRosenbrock {
    /// Initializes the system with given dimension.
    ///
    /// The dimension **must** be a multiplier of 2.
    pub fn new(n: usize) -> Self {
        Self::with_scaling(n, 1.0)
    }

    /// Initializes the system with given dimension and scaling factor.
    ///
    /// The dimension **must** be a multiplier of 2. The higher the scaling
    /// factor is, the more difficult the system is.
    pub fn with_scaling(n: usize, alpha: f64) -> Self {
        assert!(n > 0, "n must be greater than zero");
        assert!(n % 2 == 0, "n must be a multiple of 2");
        assert!(alpha > 0.0, "alpha must be greater than zero");
        Self { n, alpha }
    }

    fn residuals<'a, Sx>(&self, x: &'a Vector<f64, Dyn, Sx>) -> impl Iterator<Item = f64> + 'a
    where
        Sx: Storage<f64, Dyn> + IsContiguous,
    {
        let alpha = self.alpha;
        (0..(self.n / 2)).flat_map(move |i| {
            let x1 = x[2 * i] * alpha;
            let x2 = x[2 * i + 1] / alpha;

            [10.0 * (x2 - x1 * x1), 1.0 - x1].into_iter()
        })
    }
}

impl Default for ExtendedRosenbrock {
    fn default() -> Self {
        Self::new(2)
    }
}

impl Problem for ExtendedRosenbrock {
    type Field = f64;

    fn domain(&self) -> Domain<Self::Field> {
        (0..self.n)
            .map(|i| {
                if i % 2 == 0 {
                    self.alpha
                } else {
                    1.0 / self.alpha
                }
            })
            .collect()
    }
}

impl System for ExtendedRosenbrock {
    fn eval<Sx, Srx>(
        &self,
        x: &Vector<Self::Field, Dyn, Sx>,
        rx: &mut Vector<Self::Field, Dyn, Srx>,
    ) -> Result<(), SystemError>
    where
        Sx: Storage<Self::Field, Dyn> + IsContiguous,
        Srx: StorageMut<Self::Field, Dyn>,
    {
        eval(self.residuals(x), rx);
        Ok(())
    }
}

impl TestSystem for ExtendedRosenbrock {
    fn initials(&self) -> Vec<OVector<Self::Field, Dyn>> {
        let init1 = DVector::from_iterator(
            self.n,
            (0..self.n).map(|i| if i % 2 == 0 { -1.2 } else { 1.0 }),
        );

        let init2 = DVector::from_iterator(
            self.n,
            (0..self.n).map(|i| if i % 2 == 0 { 6.39 } else { -0.221 }),
        );

        vec![init1, init2]
    }

    fn equilibria(&self) -> Vec<OVector<Self::Field, Dyn>> {
        let root = (0..self.n).map(|i| {
            if i % 2 == 0 {
                1.0 / self.alpha
            } else {
                self.alpha
            }
        });

        vec![DVector::from_iterator(self.n, root)]
    }
}

/// One-dimensional bistable system `dx/dt = x - x^3` \[3\].
///
/// Two stable equilibria at -1 and 1 are separated by an unstable one at 0.
#[derive(Debug, Clone, Copy, Default)]
pub struct Bistable(());

impl Bistable {
    /// Initializes the system.
    pub fn new() -> Self {
        Self(())
    }
}

impl Problem for Bistable {
    type Field = f64;

    fn domain(&self) -> Domain<Self::Field> {
        Domain::unconstrained(1)
    }
}

impl System for Bistable {
    fn eval<Sx, Srx>(
        &self,
        x: &Vector<Self::Field, Dyn, Sx>,
        rx: &mut Vector<Self::Field, Dyn, Srx>,
    ) -> Result<(), SystemError>
    where
        Sx: Storage<Self::Field, Dyn> + IsContiguous,
        Srx: StorageMut<Self::Field, Dyn>,
    {
        rx[0] = x[0] - x[0].powi(3);
        Ok(())
    }
}

impl TestSystem for Bistable {
    fn initials(&self) -> Vec<OVector<Self::Field, Dyn>> {
        vec![dvector![0.9], dvector![-0.8], dvector![0.1], dvector![2.0]]
    }

    fn equilibria(&self) -> Vec<OVector<Self::Field, Dyn>> {
        vec![dvector![-1.0], dvector![0.0], dvector![1.0]]
    }
}

/// [Lotka-Volterra](https://en.wikipedia.org/wiki/Lotka%E2%80%93Volterra_equations)
/// predator-prey model
///
/// ```text
/// dx/dt = alpha x - beta x y
/// dy/dt = delta x y - gamma y
/// ```
///
/// with the extinction equilibrium at the origin and the coexistence
/// equilibrium at `(gamma / delta, alpha / beta)`.
#[derive(Debug, Clone, Copy)]
pub struct LotkaVolterra {
    alpha: f64,
    beta: f64,
    gamma: f64,
    delta: f64,
}

impl LotkaVolterra {
    /// Initializes the model with given rates.
    pub fn new(alpha: f64, beta: f64, gamma: f64, delta: f64) -> Self {
        assert!(
            alpha > 0.0 && beta > 0.0 && gamma > 0.0 && delta > 0.0,
            "rates must be positive"
        );
        Self {
            alpha,
            beta,
            gamma,
            delta,
        }
    }

    /// Evaluates the vector field on a plain slice.
    pub fn field(&self, x: &[f64]) -> Vec<f64> {
        let (prey, predator) = (x[0], x[1]);
        vec![
            self.alpha * prey - self.beta * prey * predator,
            self.delta * prey * predator - self.gamma * predator,
        ]
    }
}

impl Default for LotkaVolterra {
    fn default() -> Self {
        Self::new(2.0 / 3.0, 4.0 / 3.0, 1.0, 1.0)
    }
}

impl Problem for LotkaVolterra {
    type Field = f64;

    fn domain(&self) -> Domain<Self::Field> {
        Domain::unconstrained(2)
    }
}

impl System for LotkaVolterra {
    fn eval<Sx, Srx>(
        &self,
        x: &Vector<Self::Field, Dyn, Sx>,
        rx: &mut Vector<Self::Field, Dyn, Srx>,
    ) -> Result<(), SystemError>
    where
        Sx: Storage<Self::Field, Dyn> + IsContiguous,
        Srx: StorageMut<Self::Field, Dyn>,
    {
        eval(self.field(x.as_slice()).into_iter(), rx);
        Ok(())
    }
}

impl TestSystem for LotkaVolterra {
    fn initials(&self) -> Vec<OVector<Self::Field, Dyn>> {
        vec![dvector![0.9, 0.4], dvector![0.05, -0.02]]
    }

    fn equilibria(&self) -> Vec<OVector<Self::Field, Dyn>> {
        vec![
            dvector![0.0, 0.0],
            dvector![self.gamma / self.delta, self.alpha / self.beta],
        ]
    }
}

/// Linear one-dimensional system `x + c` with the only root at `-c`.
///
/// Combined with a domain that excludes `-c`, it models a system whose every
/// convergent trajectory ends outside of the admissible region.
#[derive(Debug, Clone, Copy)]
pub struct Offset {
    c: f64,
}

impl Offset {
    /// Initializes the system with given offset.
    pub fn new(c: f64) -> Self {
        Self { c }
    }
}

impl Problem for Offset {
    type Field = f64;

    fn domain(&self) -> Domain<Self::Field> {
        Domain::unconstrained(1)
    }
}

impl System for Offset {
    fn eval<Sx, Srx>(
        &self,
        x: &Vector<Self::Field, Dyn, Sx>,
        rx: &mut Vector<Self::Field, Dyn, Srx>,
    ) -> Result<(), SystemError>
    where
        Sx: Storage<Self::Field, Dyn> + IsContiguous,
        Srx: StorageMut<Self::Field, Dyn>,
    {
        rx[0] = x[0] + self.c;
        Ok(())
    }
}

impl TestSystem for Offset {
    fn initials(&self) -> Vec<OVector<Self::Field, Dyn>> {
        vec![dvector![0.5], dvector![100.0]]
    }

    fn equilibria(&self) -> Vec<OVector<Self::Field, Dyn>> {
        vec![dvector![-self.c]]
    }
}

/// Linear system `[x - y, x + y - 1]` with the unique root `(0.5, 0.5)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Plane(());

impl Plane {
    /// Initializes the system.
    pub fn new() -> Self {
        Self(())
    }
}

impl Problem for Plane {
    type Field = f64;

    fn domain(&self) -> Domain<Self::Field> {
        Domain::unconstrained(2)
    }
}

impl System for Plane {
    fn eval<Sx, Srx>(
        &self,
        x: &Vector<Self::Field, Dyn, Sx>,
        rx: &mut Vector<Self::Field, Dyn, Srx>,
    ) -> Result<(), SystemError>
    where
        Sx: Storage<Self::Field, Dyn> + IsContiguous,
        Srx: StorageMut<Self::Field, Dyn>,
    {
        rx[0] = x[0] - x[1];
        rx[1] = x[0] + x[1] - 1.0;
        Ok(())
    }
}

impl TestSystem for Plane {
    fn initials(&self) -> Vec<OVector<Self::Field, Dyn>> {
        vec![dvector![0.0, 0.0], dvector![10.0, -3.0]]
    }

    fn equilibria(&self) -> Vec<OVector<Self::Field, Dyn>> {
        vec![dvector![0.5, 0.5]]
    }
}

/// This system is true for any assignment of x.
#[derive(Debug, Clone, Copy)]
pub struct InfiniteSolutions {
    n: usize,
}

impl InfiniteSolutions {
    /// Initializes the system with given dimension.
    pub fn new(n: usize) -> Self {
        assert!(n > 0, "n must be greater than zero");
        Self { n }
    }
}

impl Default for InfiniteSolutions {
    fn default() -> Self {
        Self { n: 1 }
    }
}

impl Problem for InfiniteSolutions {
    type Field = f64;

    fn domain(&self) -> Domain<Self::Field> {
        Domain::unconstrained(self.n)
    }
}

impl System for InfiniteSolutions {
    fn eval<Sx, Srx>(
        &self,
        _x: &Vector<Self::Field, Dyn, Sx>,
        rx: &mut Vector<Self::Field, Dyn, Srx>,
    ) -> Result<(), SystemError>
    where
        Sx: Storage<Self::Field, Dyn> + IsContiguous,
        Srx: StorageMut<Self::Field, Dyn>,
    {
        rx.fill(0.0);
        Ok(())
    }
}

impl TestSystem for InfiniteSolutions {
    fn initials(&self) -> Vec<OVector<Self::Field, Dyn>> {
        let init = DVector::zeros_generic(Dyn(self.n), U1::name());
        vec![init]
    }
}

/// Identity system in two variables whose evaluation starts failing after a
/// given number of calls.
///
/// Models a vector field that raises at some point of the solving process,
/// for example by hitting a singularity.
#[derive(Debug)]
pub struct Failing {
    limit: usize,
    calls: Cell<usize>,
}

impl Failing {
    /// Initializes the system that succeeds `limit` times and then fails.
    pub fn after(limit: usize) -> Self {
        Self {
            limit,
            calls: Cell::new(0),
        }
    }

    /// Number of evaluations so far.
    pub fn calls(&self) -> usize {
        self.calls.get()
    }
}

impl Problem for Failing {
    type Field = f64;

    fn domain(&self) -> Domain<Self::Field> {
        Domain::unconstrained(2)
    }
}

impl System for Failing {
    fn eval<Sx, Srx>(
        &self,
        x: &Vector<Self::Field, Dyn, Sx>,
        rx: &mut Vector<Self::Field, Dyn, Srx>,
    ) -> Result<(), SystemError>
    where
        Sx: Storage<Self::Field, Dyn> + IsContiguous,
        Srx: StorageMut<Self::Field, Dyn>,
    {
        let calls = self.calls.get() + 1;
        self.calls.set(calls);

        if calls > self.limit {
            return Err(SystemError::custom("singular point"));
        }

        rx.copy_from(x);
        Ok(())
    }
}

impl TestSystem for Failing {
    fn initials(&self) -> Vec<OVector<Self::Field, Dyn>> {
        vec![dvector![0.5, -0.5]]
    }

    fn equilibria(&self) -> Vec<OVector<Self::Field, Dyn>> {
        vec![dvector![0.0, 0.0]]
    }
}

/// Solving error of the testing solver driver (see [`solve`]).
#[derive(Debug, Error)]
pub enum TestingError<E: StdError + 'static> {
    /// Error of the solver used.
    #[error("{0}")]
    Inner(E),
    /// Error of the system being solved.
    #[error("{0}")]
    System(#[from] SystemError),
    /// Solver did not terminate.
    #[error("solver did not terminate")]
    Termination,
}

impl<E: StdError + 'static> From<StepError<E>> for TestingError<E> {
    fn from(error: StepError<E>) -> Self {
        match error {
            StepError::System(error) => TestingError::System(error),
            StepError::Solver(error) => TestingError::Inner(error),
        }
    }
}

/// A simple solver driver that can be used in tests.
pub fn solve<R: TestSystem, S: Solver<R>>(
    r: &R,
    dom: &Domain<R::Field>,
    mut solver: S,
    mut x: OVector<R::Field, Dyn>,
    max_iters: usize,
    tolerance: R::Field,
) -> Result<OVector<R::Field, Dyn>, TestingError<S::Error>>
where
    S::Error: StdError,
{
    let mut rx = x.clone_owned();
    let mut iter = 0;

    loop {
        solver.solve_next(r, dom, &mut x, &mut rx)?;

        if rx.norm() <= tolerance {
            return Ok(x);
        }

        if iter == max_iters {
            return Err(TestingError::Termination);
        } else {
            iter += 1;
        }
    }
}

fn eval<Srx>(residuals: impl Iterator<Item = f64>, rx: &mut Vector<f64, Dyn, Srx>)
where
    Srx: StorageMut<f64, Dyn>,
{
    rx.iter_mut().zip(residuals).for_each(|(rxi, v)| *rxi = v);
}
