//! High-level API for running a solver.
//!
//! The driver encapsulates all internal state of the iterative process and
//! provides a simple API to run it. The simplest way of using the driver is to
//! initialize it with the defaults:
//!
//! ```rust
//! use equilibria::SolverDriver;
//! # use equilibria::{Domain, Problem};
//! #
//! # struct MySystem;
//! #
//! # impl Problem for MySystem {
//! #     type Field = f64;
//! #
//! #     fn domain(&self) -> Domain<Self::Field> {
//! #         Domain::unconstrained(2)
//! #     }
//! # }
//!
//! let r = MySystem;
//!
//! let mut solver = SolverDriver::new(&r);
//! ```
//!
//! If you need to specify additional settings, use the builder:
//!
//! ```rust
//! use equilibria::SolverDriver;
//! use equilibria::algo::trust_region::{TrustRegion, TrustRegionOptions};
//! # use equilibria::{Domain, Problem};
//! #
//! # struct MySystem;
//! #
//! # impl Problem for MySystem {
//! #     type Field = f64;
//! #
//! #     fn domain(&self) -> Domain<Self::Field> {
//! #         Domain::unconstrained(2)
//! #     }
//! # }
//!
//! let r = MySystem;
//!
//! let mut solver = SolverDriver::builder(&r)
//!     .with_initial(vec![10.0, -10.0])
//!     .with_algo(|r, dom| {
//!         let mut options = TrustRegionOptions::default();
//!         options.set_rejections_thresh(20);
//!         TrustRegion::with_options(r, dom, options)
//!     })
//!     .build();
//! ```
//!
//! Once you have the solver, you can use it to find the solution:
//!
//! ```rust
//! # use equilibria::nalgebra as na;
//! # use equilibria::{Domain, Problem, SolverDriver, System, SystemError};
//! # use na::{Dyn, IsContiguous};
//! #
//! # struct MySystem;
//! #
//! # impl Problem for MySystem {
//! #     type Field = f64;
//! #
//! #     fn domain(&self) -> Domain<Self::Field> {
//! #         Domain::unconstrained(2)
//! #     }
//! # }
//! #
//! # impl System for MySystem {
//! #     fn eval<Sx, Srx>(
//! #         &self,
//! #         x: &na::Vector<Self::Field, Dyn, Sx>,
//! #         rx: &mut na::Vector<Self::Field, Dyn, Srx>,
//! #     ) -> Result<(), SystemError>
//! #     where
//! #         Sx: na::storage::Storage<Self::Field, Dyn> + IsContiguous,
//! #         Srx: na::storage::StorageMut<Self::Field, Dyn>,
//! #     {
//! #         rx[0] = x[0] + x[1] + 1.0;
//! #         rx[1] = (x[0] + x[1] - 1.0).powi(2);
//! #         Ok(())
//! #     }
//! # }
//! #
//! # let r = MySystem;
//! #
//! # let mut solver = SolverDriver::new(&r);
//! #
//! let result = solver.find(|state| state.norm() <= 1e-6 || state.iter() >= 100);
//! ```
//!
//! The same driver can be reused for many starting points with
//! [`SolverDriver::restart`], which is what the steady-state search does.

use nalgebra::{convert, DimName, Dyn, OVector, U1};

use crate::{algo::TrustRegion, Domain, Problem, Solver, StepError, System, SystemError};

struct Builder<'a, R: Problem, A> {
    r: &'a R,
    dom: Domain<R::Field>,
    algo: A,
    x0: OVector<R::Field, Dyn>,
}

impl<'a, R: Problem> Builder<'a, R, TrustRegion<R>> {
    fn new(r: &'a R) -> Self {
        let dom = r.domain();
        let algo = TrustRegion::new(r, &dom);

        let dim = Dyn(dom.dim());
        let x0 = OVector::from_element_generic(dim, U1::name(), convert(0.0));

        Self { r, dom, algo, x0 }
    }
}

impl<'a, R: Problem, A> Builder<'a, R, A> {
    fn with_initial(mut self, x0: Vec<R::Field>) -> Self {
        let dim = Dyn(self.dom.dim());
        self.x0 = OVector::from_vec_generic(dim, U1::name(), x0);
        self
    }

    fn with_algo<S2, FA>(self, factory: FA) -> Builder<'a, R, S2>
    where
        FA: FnOnce(&R, &Domain<R::Field>) -> S2,
    {
        let algo = factory(self.r, &self.dom);

        Builder {
            r: self.r,
            dom: self.dom,
            algo,
            x0: self.x0,
        }
    }

    fn build(mut self) -> Self {
        self.dom.project(&mut self.x0);
        self
    }
}

/// Builder for the [`SolverDriver`].
pub struct SolverBuilder<'a, R: Problem, A>(Builder<'a, R, A>);

impl<'a, R: Problem, A> SolverBuilder<'a, R, A> {
    /// Sets the initial point from which the iterative process starts.
    pub fn with_initial(self, x0: Vec<R::Field>) -> Self {
        Self(self.0.with_initial(x0))
    }

    /// Sets specific algorithm to be used.
    ///
    /// This builder method accepts a closure that takes the reference to the
    /// problem and its domain. For the algorithms in this crate, you can simply
    /// pass the `new` constructor directly (e.g., `TrustRegion::new`).
    pub fn with_algo<S2, FA>(self, factory: FA) -> SolverBuilder<'a, R, S2>
    where
        FA: FnOnce(&R, &Domain<R::Field>) -> S2,
    {
        SolverBuilder(self.0.with_algo(factory))
    }

    /// Builds the [`SolverDriver`].
    pub fn build(self) -> SolverDriver<'a, R, A> {
        let Builder { r, dom, algo, x0 } = self.0.build();
        let rx = x0.clone_owned();

        SolverDriver {
            r,
            dom,
            algo,
            x: x0,
            rx,
        }
    }
}

/// The driver for the process of solving a system of equations.
///
/// For default settings, use [`SolverDriver::new`]. For more flexibility, use
/// [`SolverDriver::builder`]. For the usage of the driver, see [module](self)
/// documentation.
pub struct SolverDriver<'a, R: Problem, A> {
    r: &'a R,
    dom: Domain<R::Field>,
    algo: A,
    x: OVector<R::Field, Dyn>,
    rx: OVector<R::Field, Dyn>,
}

impl<'a, R: Problem> SolverDriver<'a, R, TrustRegion<R>> {
    /// Returns the builder for specifying additional settings.
    pub fn builder(r: &'a R) -> SolverBuilder<'a, R, TrustRegion<R>> {
        SolverBuilder(Builder::new(r))
    }

    /// Initializes the driver with the default settings.
    pub fn new(r: &'a R) -> Self {
        SolverDriver::builder(r).build()
    }
}

impl<'a, R: Problem, S> SolverDriver<'a, R, S> {
    /// Returns reference to the current point.
    pub fn x(&self) -> &[R::Field] {
        self.x.as_slice()
    }

    /// Returns reference to the current residuals.
    pub fn rx(&self) -> &[R::Field] {
        self.rx.as_slice()
    }

    /// Returns norm of the residuals.
    pub fn norm(&self) -> R::Field {
        self.rx.norm()
    }

    /// Returns the domain the solver operates in.
    pub fn domain(&self) -> &Domain<R::Field> {
        &self.dom
    }
}

impl<'a, R: System, A: Solver<R>> SolverDriver<'a, R, A> {
    /// Does one iteration of the process, returning the current point and the
    /// norm of the residuals in case of no error.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Result<(&[R::Field], R::Field), StepError<A::Error>> {
        self.algo
            .solve_next(self.r, &self.dom, &mut self.x, &mut self.rx)?;
        Ok((self.x.as_slice(), self.rx.norm()))
    }

    /// Runs the iterative process until given stopping criterion is satisfied.
    pub fn find<C>(&mut self, stop: C) -> Result<(&[R::Field], R::Field), StepError<A::Error>>
    where
        C: Fn(SolverIterState<'_, R>) -> bool,
    {
        let mut iter = 0;

        loop {
            let norm = self.next()?.1;

            let state = SolverIterState {
                x: &self.x,
                rx: &self.rx,
                iter,
            };

            if stop(state) {
                return Ok((self.x.as_slice(), norm));
            }

            iter += 1;
        }
    }

    /// Moves the process to a new starting point and clears the state the
    /// algorithm accumulated so far.
    ///
    /// The point is projected into the domain, the same way as the initial
    /// point given to the builder, and the residuals are evaluated in it.
    pub fn restart(&mut self, x0: &[R::Field]) -> Result<(), SystemError> {
        self.x.copy_from_slice(x0);
        self.dom.project(&mut self.x);
        self.algo.reset();
        self.r.eval(&self.x, &mut self.rx)
    }
}

/// State of the current iteration.
pub struct SolverIterState<'a, R: Problem> {
    x: &'a OVector<R::Field, Dyn>,
    rx: &'a OVector<R::Field, Dyn>,
    iter: usize,
}

impl<'a, R: Problem> SolverIterState<'a, R> {
    /// Returns reference to the current point.
    pub fn x(&self) -> &[R::Field] {
        self.x.as_slice()
    }

    /// Returns reference to the current residuals.
    pub fn rx(&self) -> &[R::Field] {
        self.rx.as_slice()
    }

    /// Returns norm of the residuals.
    pub fn norm(&self) -> R::Field {
        self.rx.norm()
    }

    /// Returns the current iteration number.
    pub fn iter(&self) -> usize {
        self.iter
    }
}

#[cfg(test)]
mod tests {
    use crate::testing::{Bistable, ExtendedRosenbrock, LotkaVolterra, TestSystem};

    use super::*;

    use nalgebra::{
        storage::{Storage, StorageMut},
        IsContiguous, Vector,
    };

    struct WithDomain(pub Domain<f64>);

    impl Problem for WithDomain {
        type Field = f64;

        fn domain(&self) -> Domain<Self::Field> {
            self.0.clone()
        }
    }

    impl System for WithDomain {
        fn eval<Sx, Srx>(
            &self,
            x: &Vector<f64, Dyn, Sx>,
            rx: &mut Vector<f64, Dyn, Srx>,
        ) -> Result<(), SystemError>
        where
            Sx: Storage<f64, Dyn> + IsContiguous,
            Srx: StorageMut<f64, Dyn>,
        {
            rx.copy_from(x);
            Ok(())
        }
    }

    #[test]
    fn solver_basic_use_case() {
        let r = ExtendedRosenbrock::new(4);
        let mut solver = SolverDriver::builder(&r)
            .with_initial(vec![-1.2, 1.0, -1.2, 1.0])
            .build();

        let tolerance = 1e-6;
        let (_, norm) = solver
            .find(|state| state.iter() >= 100 || state.norm() < tolerance)
            .unwrap();

        assert!(norm <= tolerance);
    }

    #[test]
    fn solver_custom() {
        let r = LotkaVolterra::default();
        let mut solver = SolverDriver::builder(&r)
            .with_algo(|r, dom| {
                let mut options = crate::algo::trust_region::TrustRegionOptions::default();
                options.set_rejections_thresh(20);
                TrustRegion::with_options(r, dom, options)
            })
            .with_initial(vec![0.9, 0.4])
            .build();

        let tolerance = 1e-9;
        let (x, norm) = solver
            .find(|state| state.iter() >= 100 || state.norm() < tolerance)
            .unwrap();

        assert!(norm <= tolerance);
        assert!(r.is_equilibrium(x, 1e-6));
    }

    #[test]
    fn solver_initial() {
        let x0 = vec![10.0; 4];

        let r = ExtendedRosenbrock::new(4);
        let solver = SolverDriver::builder(&r).with_initial(x0.clone()).build();

        assert_eq!(solver.x(), &x0);
    }

    #[test]
    fn solver_initial_in_domain() {
        let r = WithDomain(Domain::rect(vec![0.0, 0.0], vec![1.0, 1.0]));
        let solver = SolverDriver::builder(&r)
            .with_initial(vec![10.0, -10.0])
            .build();

        assert_eq!(solver.x(), &[1.0, 0.0]);
    }

    #[test]
    fn restart_moves_to_new_point() {
        let r = Bistable::new();
        let mut solver = SolverDriver::builder(&r).with_initial(vec![0.9]).build();

        let tolerance = 1e-10;
        let (x, _) = solver
            .find(|state| state.iter() >= 100 || state.norm() < tolerance)
            .unwrap();
        assert!((x[0] - 1.0).abs() < 1e-6);

        solver.restart(&[-0.8]).unwrap();
        assert_eq!(solver.x(), &[-0.8]);

        let (x, _) = solver
            .find(|state| state.iter() >= 100 || state.norm() < tolerance)
            .unwrap();
        assert!((x[0] + 1.0).abs() < 1e-6);
    }

    #[test]
    fn restart_projects_into_domain() {
        let r = WithDomain(Domain::rect(vec![0.0], vec![1.0]));
        let mut solver = SolverDriver::builder(&r).build();

        solver.restart(&[3.0]).unwrap();
        assert_eq!(solver.x(), &[1.0]);
        assert_eq!(solver.rx(), &[1.0]);
    }
}
