//! Problem domain definition (dimensionality, bounds, sampling box).

use std::iter::FromIterator;

use approx::AbsDiffEq;
use nalgebra::{
    convert, storage::StorageMut, ComplexField, Dim, DimName, Dyn, OVector, RealField as _,
    Vector, U1,
};
use num_traits::{One, Zero};

use crate::core::RealField;

/// Admissible range of a single variable.
///
/// A missing bound and an unbounded bound are the same thing, there is no
/// separate "absent" state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Bound<T> {
    /// The variable can take any value.
    Unbounded,
    /// `value >= low`.
    LowerBounded(T),
    /// `value <= high`.
    UpperBounded(T),
    /// `low <= value <= high`.
    TwoSided(T, T),
}

impl<T: RealField> Bound<T> {
    /// Creates the bound from optional limits.
    ///
    /// Infinite limits are treated as absent, so `(Some(-inf), None)` is
    /// [`Bound::Unbounded`].
    pub fn from_limits(lower: Option<T>, upper: Option<T>) -> Self {
        let lower = lower.filter(|l| *l != -infinity::<T>());
        let upper = upper.filter(|u| *u != infinity::<T>());

        match (lower, upper) {
            (None, None) => Bound::Unbounded,
            (Some(low), None) => Bound::LowerBounded(low),
            (None, Some(high)) => Bound::UpperBounded(high),
            (Some(low), Some(high)) => Bound::TwoSided(low, high),
        }
    }

    /// Lower limit, negative infinity if there is none.
    pub fn lower(&self) -> T {
        match *self {
            Bound::LowerBounded(low) | Bound::TwoSided(low, _) => low,
            _ => -infinity::<T>(),
        }
    }

    /// Upper limit, positive infinity if there is none.
    pub fn upper(&self) -> T {
        match *self {
            Bound::UpperBounded(high) | Bound::TwoSided(_, high) => high,
            _ => infinity::<T>(),
        }
    }

    /// Checks whether the value lies inside the bound.
    pub fn contains(&self, value: T) -> bool {
        match *self {
            Bound::Unbounded => true,
            Bound::LowerBounded(low) => value >= low,
            Bound::UpperBounded(high) => value <= high,
            Bound::TwoSided(low, high) => low <= value && value <= high,
        }
    }

    /// Interval from which initial guesses are drawn.
    ///
    /// Only a two-sided bound is used as is. Any other bound, including a
    /// one-sided one such as `LowerBounded(5)`, falls back to `[0, 1]`.
    pub fn sampling_interval(&self) -> (T, T) {
        match *self {
            Bound::TwoSided(low, high) => (low, high),
            _ => (T::zero(), T::one()),
        }
    }

    /// Checks the invariants of the bound: no NaN limits and `low <= high`
    /// with a finite width for a two-sided bound.
    ///
    /// The width must stay finite even after division by `1 - EPSILON`, which
    /// is what the uniform sampler of the interval computes.
    pub fn is_valid(&self) -> bool {
        match *self {
            Bound::Unbounded => true,
            Bound::LowerBounded(limit) | Bound::UpperBounded(limit) => !is_nan(limit),
            Bound::TwoSided(low, high) => {
                let max_rand = T::one() - T::default_epsilon();
                low <= high && ((high - low) / max_rand).is_finite()
            }
        }
    }

    /// Estimates the magnitude of the variable from its limits.
    ///
    /// Unbounded directions count as infinite and make the estimate fall back
    /// to one.
    pub fn magnitude(&self) -> T {
        let ten: T = convert(10.0);
        let half: T = convert(0.5);

        let avg = half * (self.lower().abs() + self.upper().abs());
        let magnitude = ten.powf(avg.abs().log10().trunc());

        // For [0, 0] range, the computed magnitude is undefined. Such ranges
        // are allowed to support fixing a variable to a value.
        if magnitude.is_finite() && magnitude > T::zero() {
            magnitude
        } else {
            T::one()
        }
    }

    /// Moves the value inside the bound. Returns true if the value was
    /// changed.
    fn clamp(&self, value: &mut T) -> bool {
        let lower = self.lower();
        let upper = self.upper();

        if *value < lower {
            *value = lower;
            true
        } else if *value > upper {
            *value = upper;
            true
        } else {
            false
        }
    }
}

impl<T: RealField> From<(T, T)> for Bound<T> {
    fn from((low, high): (T, T)) -> Self {
        Bound::TwoSided(low, high)
    }
}

impl<T: RealField> From<(Option<T>, Option<T>)> for Bound<T> {
    fn from((low, high): (Option<T>, Option<T>)) -> Self {
        Bound::from_limits(low, high)
    }
}

fn infinity<T: RealField>() -> T {
    convert(f64::INFINITY)
}

fn is_nan<T: RealField>(value: T) -> bool {
    value.partial_cmp(&value).is_none()
}

/// Domain for a problem: one [`Bound`] per variable and an optional scale.
#[derive(Debug, Clone)]
pub struct Domain<T: RealField> {
    bounds: Vec<Bound<T>>,
    scale: Option<OVector<T, Dyn>>,
}

impl<T: RealField> Domain<T> {
    /// Creates unconstrained domain with given dimensionality.
    pub fn unconstrained(dim: usize) -> Self {
        assert!(dim > 0, "empty domain");

        Self {
            bounds: vec![Bound::Unbounded; dim],
            scale: None,
        }
    }

    /// Creates the domain `[0, 1]^dim`.
    pub fn unit(dim: usize) -> Self {
        (0..dim)
            .map(|_| Bound::TwoSided(T::zero(), T::one()))
            .collect()
    }

    /// Creates rectangular domain with given lower and upper bounds.
    ///
    /// Positive and negative infinity can be used to indicate a value
    /// unbounded in that dimension and direction.
    pub fn rect(lower: Vec<T>, upper: Vec<T>) -> Self {
        assert!(
            lower.len() == upper.len(),
            "lower and upper have different size"
        );
        assert!(!lower.is_empty(), "empty domain");

        lower
            .into_iter()
            .zip(upper)
            .map(|(l, u)| Bound::from_limits(Some(l), Some(u)))
            .collect()
    }

    /// Sets a custom scale for the domain.
    ///
    /// Scale of a variable is the inverse of its expected magnitude.
    /// Appropriate scaling may be crucial for a solver to work well on
    /// "poorly scaled" problems with highly varying magnitudes of its
    /// variables.
    pub fn with_scale(mut self, scale: Vec<T>) -> Self {
        assert!(scale.len() == self.dim(), "scale has invalid dimension");

        let dim = Dyn(self.dim());
        self.scale = Some(OVector::from_iterator_generic(dim, U1::name(), scale));
        self
    }

    /// Gets the dimensionality of the domain.
    pub fn dim(&self) -> usize {
        self.bounds.len()
    }

    /// Gets the bounds of all variables.
    pub fn bounds(&self) -> &[Bound<T>] {
        &self.bounds
    }

    /// Gets the scale if available.
    ///
    /// Scale can be either provided by [`Domain::with_scale`] or estimated for
    /// a domain created from bounds. If there is no reliable way to estimate
    /// the scale (unconstrained domain), `None` is returned.
    pub fn scale(&self) -> Option<&OVector<T, Dyn>> {
        self.scale.as_ref()
    }

    /// Checks whether all coordinates of the point satisfy their bounds.
    pub fn contains(&self, x: &[T]) -> bool {
        x.len() == self.dim()
            && self
                .bounds
                .iter()
                .zip(x.iter().copied())
                .all(|(bound, xi)| bound.contains(xi))
    }

    /// Derives the finite box used for drawing initial guesses.
    pub fn sampling_box(&self) -> SamplingBox<T> {
        SamplingBox {
            intervals: self.bounds.iter().map(Bound::sampling_interval).collect(),
        }
    }

    /// Projects given point into the domain.
    pub fn project<D, Sx>(&self, x: &mut Vector<T, D, Sx>) -> bool
    where
        D: Dim,
        Sx: StorageMut<T, D>,
    {
        let mut not_feasible = false;

        self.bounds.iter().zip(x.iter_mut()).for_each(|(bound, xi)| {
            not_feasible |= bound.clamp(xi);
        });

        not_feasible
    }
}

impl<T: RealField> FromIterator<Bound<T>> for Domain<T> {
    fn from_iter<I: IntoIterator<Item = Bound<T>>>(iter: I) -> Self {
        let bounds = iter.into_iter().collect::<Vec<_>>();

        let dim = Dyn(bounds.len());
        let scale = bounds.iter().map(|bound| T::one() / bound.magnitude());
        let scale = OVector::from_iterator_generic(dim, U1::name(), scale);

        Self {
            bounds,
            scale: Some(scale),
        }
    }
}

impl<T: RealField> FromIterator<(T, T)> for Domain<T> {
    fn from_iter<I: IntoIterator<Item = (T, T)>>(iter: I) -> Self {
        iter.into_iter().map(Bound::from).collect()
    }
}

impl<T: RealField> FromIterator<T> for Domain<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let scale = iter
            .into_iter()
            .map(|magnitude| T::one() / magnitude)
            .collect::<Vec<_>>();

        Self::unconstrained(scale.len()).with_scale(scale)
    }
}

/// Finite per-variable intervals from which initial guesses are drawn.
///
/// Derived from a [`Domain`] by [`Domain::sampling_box`]. It is never used
/// for deciding whether a root is admissible.
#[derive(Debug, Clone, PartialEq)]
pub struct SamplingBox<T> {
    intervals: Vec<(T, T)>,
}

impl<T: RealField> SamplingBox<T> {
    /// Gets the `[lo, hi]` intervals of all variables.
    pub fn intervals(&self) -> &[(T, T)] {
        &self.intervals
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    use nalgebra::dvector;

    #[test]
    fn admissibility() {
        assert!(Bound::<f64>::Unbounded.contains(-1e300));
        assert!(Bound::LowerBounded(2.0).contains(2.0));
        assert!(!Bound::LowerBounded(2.0).contains(1.999));
        assert!(Bound::UpperBounded(-1.0).contains(-5.0));
        assert!(!Bound::UpperBounded(-1.0).contains(0.0));
        assert!(Bound::TwoSided(0.0, 1.0).contains(0.0));
        assert!(Bound::TwoSided(0.0, 1.0).contains(1.0));
        assert!(!Bound::TwoSided(0.0, 1.0).contains(1.0 + 1e-12));
    }

    #[test]
    fn missing_and_infinite_limits_collapse() {
        assert_eq!(Bound::<f64>::from((None, None)), Bound::Unbounded);
        assert_eq!(
            Bound::from_limits(Some(f64::NEG_INFINITY), Some(f64::INFINITY)),
            Bound::Unbounded
        );
        assert_eq!(
            Bound::from((Some(3.0), Some(f64::INFINITY))),
            Bound::LowerBounded(3.0)
        );
        assert_eq!(Bound::from((None, Some(4.0))), Bound::UpperBounded(4.0));
        assert_eq!(Bound::from((1.0, 2.0)), Bound::TwoSided(1.0, 2.0));
    }

    #[test]
    fn sampling_box_falls_back_to_unit_interval() {
        let dom: Domain<f64> = [
            Bound::TwoSided(-10.0, 10.0),
            Bound::LowerBounded(5.0),
            Bound::UpperBounded(-3.0),
            Bound::Unbounded,
        ]
        .into_iter()
        .collect();

        assert_eq!(
            dom.sampling_box().intervals(),
            &[(-10.0, 10.0), (0.0, 1.0), (0.0, 1.0), (0.0, 1.0)]
        );
    }

    #[test]
    fn domain_contains_uses_original_bounds() {
        let dom: Domain<f64> = [Bound::LowerBounded(5.0), Bound::Unbounded]
            .into_iter()
            .collect();

        assert!(dom.contains(&[7.0, -100.0]));
        assert!(!dom.contains(&[0.5, 0.5]));
        assert!(!dom.contains(&[7.0]));
    }

    #[test]
    fn invalid_bounds() {
        assert!(Bound::TwoSided(0.0, 0.0).is_valid());
        assert!(!Bound::TwoSided(1.0, 0.0).is_valid());
        assert!(!Bound::TwoSided(f64::NAN, 0.0).is_valid());
        assert!(!Bound::TwoSided(-f64::MAX, f64::MAX).is_valid());
        assert!(!Bound::LowerBounded(f64::NAN).is_valid());
    }

    #[test]
    fn widest_valid_bound() {
        // The width is finite, but not after the division done by the uniform
        // sampler.
        assert!(!Bound::TwoSided(0.0, f64::MAX).is_valid());
        assert!(!Bound::TwoSided(-f64::MAX / 2.0, f64::MAX / 2.0).is_valid());

        assert!(Bound::TwoSided(0.0, f64::MAX / 2.0).is_valid());
        assert!(Bound::TwoSided(-f64::MAX / 4.0, f64::MAX / 4.0).is_valid());
    }

    #[test]
    fn projection() {
        let dom = Domain::rect(vec![0.0, f64::NEG_INFINITY], vec![1.0, 2.0]);
        let mut x = dvector![-3.0, 5.0];

        assert!(dom.project(&mut x));
        assert_eq!(x, dvector![0.0, 2.0]);
        assert!(!dom.project(&mut x));
    }

    #[test]
    fn magnitude() {
        assert_eq!(Bound::TwoSided(-1e10f64, 1e10).magnitude().log10(), 10.0);
        assert_eq!(Bound::TwoSided(-1e4f64, -1e2).magnitude().log10(), 3.0);
        assert_eq!(Bound::TwoSided(-6e-6f64, 9e-6).magnitude() / 1e-5, 1.0);
    }

    #[test]
    fn magnitude_edge_cases() {
        assert_eq!(Bound::TwoSided(0.0f64, 1e2).magnitude().log10(), 1.0);
        assert_eq!(Bound::TwoSided(0.0f64, 0.0).magnitude(), 1.0);
        assert_eq!(Bound::<f64>::LowerBounded(3.0).magnitude(), 1.0);
    }
}
