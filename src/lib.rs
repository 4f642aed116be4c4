#![allow(clippy::many_single_char_names)]
#![allow(clippy::type_complexity)]
#![warn(missing_docs)]

//! # Equilibria
//!
//! Discovery of the steady states (equilibria) of dynamical systems
//! `dx/dt = F(x)` by a multi-start local root search.
//!
//! A steady state is a point where the vector field vanishes. Nonlinear
//! systems often have several of them and no single initial guess reaches
//! all. This library draws many initial guesses from a box derived from the
//! admissible domain, runs a bound-aware local solver from each of them and
//! returns the distinct admissible roots in a deterministic order.
//!
//! The search is a heuristic. Roots with small basins of attraction may be
//! missed and there is no certificate of completeness.
//!
//! ## Quick start
//!
//! For a vector field given by a closure, use [`find_steady_states`]:
//!
//! ```rust
//! use equilibria::{find_steady_states, Bound, Domain, SteadyStateOptions};
//!
//! // Lotka-Volterra predator-prey model.
//! let (alpha, beta, gamma, delta) = (2.0 / 3.0, 4.0 / 3.0, 1.0, 1.0);
//! let field = |x: &[f64]| {
//!     vec![
//!         alpha * x[0] - beta * x[0] * x[1],
//!         delta * x[0] * x[1] - gamma * x[1],
//!     ]
//! };
//!
//! let domain: Domain<f64> = [Bound::TwoSided(-0.5, 3.0), Bound::TwoSided(-0.5, 3.0)]
//!     .into_iter()
//!     .collect();
//!
//! let mut options = SteadyStateOptions::default();
//! options.set_num_samples(200).set_seed(Some(42));
//!
//! let roots = find_steady_states(field, 2, Some(domain), options)?;
//! assert_eq!(roots.len(), 2);
//! assert_eq!(roots[0], vec![0.0, 0.0]);
//! # Ok::<(), equilibria::SteadyStateError>(())
//! ```
//!
//! Without an explicit domain, every variable is restricted to `[0, 1]`.
//! Unbounded and one-sided bounds are admissible, but the initial guesses
//! for such variables are drawn from `[0, 1]`.
//!
//! ## Systems
//!
//! Any type implementing the [`System`] and [`Problem`] traits can be
//! searched with [`SteadyStateFinder`]. The [`Domain`] of the problem is the
//! domain the local solver iterates in. The admissible domain of the search
//! is given to the builder separately.
//!
//! ```rust
//! use equilibria::nalgebra as na;
//! use equilibria::{Domain, Problem, System, SystemError};
//! use na::{Dyn, IsContiguous};
//!
//! // Pitchfork normal form dx/dt = r x - x^3.
//! struct Pitchfork {
//!     r: f64,
//! }
//!
//! impl Problem for Pitchfork {
//!     type Field = f64;
//!
//!     fn domain(&self) -> Domain<Self::Field> {
//!         Domain::unconstrained(1)
//!     }
//! }
//!
//! impl System for Pitchfork {
//!     fn eval<Sx, Srx>(
//!         &self,
//!         x: &na::Vector<Self::Field, Dyn, Sx>,
//!         rx: &mut na::Vector<Self::Field, Dyn, Srx>,
//!     ) -> Result<(), SystemError>
//!     where
//!         Sx: na::storage::Storage<Self::Field, Dyn> + IsContiguous,
//!         Srx: na::storage::StorageMut<Self::Field, Dyn>,
//!     {
//!         rx[0] = self.r * x[0] - x[0].powi(3);
//!         Ok(())
//!     }
//! }
//! ```
//!
//! ## Searching
//!
//! ```rust
//! use equilibria::{Domain, SteadyStateFinder};
//! # use equilibria::nalgebra as na;
//! # use equilibria::{Problem, System, SystemError};
//! # use na::{Dyn, IsContiguous};
//! #
//! # struct Pitchfork {
//! #     r: f64,
//! # }
//! #
//! # impl Problem for Pitchfork {
//! #     type Field = f64;
//! #
//! #     fn domain(&self) -> Domain<Self::Field> {
//! #         Domain::unconstrained(1)
//! #     }
//! # }
//! #
//! # impl System for Pitchfork {
//! #     fn eval<Sx, Srx>(
//! #         &self,
//! #         x: &na::Vector<Self::Field, Dyn, Sx>,
//! #         rx: &mut na::Vector<Self::Field, Dyn, Srx>,
//! #     ) -> Result<(), SystemError>
//! #     where
//! #         Sx: na::storage::Storage<Self::Field, Dyn> + IsContiguous,
//! #         Srx: na::storage::StorageMut<Self::Field, Dyn>,
//! #     {
//! #         rx[0] = self.r * x[0] - x[0].powi(3);
//! #         Ok(())
//! #     }
//! # }
//!
//! let r = Pitchfork { r: 4.0 };
//! let mut finder = SteadyStateFinder::builder(&r)
//!     .with_domain(Domain::rect(vec![-5.0], vec![5.0]))
//!     .with_samples(100)
//!     .with_seed(0)
//!     .build()?;
//!
//! let states = finder.find()?;
//! for root in states.iter() {
//!     println!("x* = {:?}", root);
//! }
//!
//! println!("{:?}", states.stats());
//! # Ok::<(), equilibria::SteadyStateError>(())
//! ```
//!
//! The progress of the search is reported through the [`log`] facade at debug
//! level, or at info level with the `verbose` option.
//!
//! ## Lower level
//!
//! The local solver is exposed as well. The [`SolverDriver`] runs an
//! [algorithm](algo) from a single initial point and gives full control over
//! the iteration.
//!
//! [`log`]: https://docs.rs/log
//!
//! ## License
//!
//! Licensed under MIT.

pub mod algo;
mod core;
pub mod derivatives;
pub mod driver;
pub mod field;
pub mod steady;

pub use core::*;
pub use driver::SolverDriver;
pub use field::FieldSystem;
pub use steady::{
    find_steady_states, try_find_steady_states, SearchStats, SteadyStateError,
    SteadyStateFinder, SteadyStateOptions, SteadyStates,
};

#[cfg(feature = "testing")]
pub mod testing;

#[cfg(not(feature = "testing"))]
pub(crate) mod testing;

pub use nalgebra;
