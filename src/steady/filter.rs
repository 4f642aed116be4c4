//! Numeric predicates applied to every converged candidate.

use nalgebra::ComplexField;
use num_traits::Zero;

use crate::core::RealField;

/// Replaces a value with exact zero if its magnitude is below `zero_tol`.
pub fn snap<T: RealField>(value: T, zero_tol: T) -> T {
    if value.abs() < zero_tol {
        T::zero()
    } else {
        value
    }
}

/// Applies [`snap`] to every coordinate of the point.
pub fn snap_to_zero<T: RealField>(x: &mut [T], zero_tol: T) {
    x.iter_mut().for_each(|xi| *xi = snap(*xi, zero_tol));
}

/// Two points are duplicates if they differ by less than `tol` in every
/// coordinate (max-norm closeness).
pub fn is_duplicate<T: RealField>(a: &[T], b: &[T], tol: T) -> bool {
    a.len() == b.len()
        && a.iter()
            .zip(b.iter())
            .all(|(ai, bi)| (*ai - *bi).abs() < tol)
}

/// Finds the index of the first root the point is a duplicate of.
pub fn find_duplicate<T: RealField, V: AsRef<[T]>>(roots: &[V], x: &[T], tol: T) -> Option<usize> {
    roots
        .iter()
        .position(|root| is_duplicate(root.as_ref(), x, tol))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapping() {
        assert_eq!(snap(1e-11, 1e-10), 0.0);
        assert_eq!(snap(-1e-11, 1e-10), 0.0);
        assert_eq!(snap(1e-10, 1e-10), 1e-10);
        assert_eq!(snap(0.5, 1e-10), 0.5);

        let mut x = [1e-12, -3.0, -5e-11, 2e-10];
        snap_to_zero(&mut x, 1e-10);
        assert_eq!(x, [0.0, -3.0, 0.0, 2e-10]);
    }

    #[test]
    fn snapping_is_idempotent() {
        let points = [
            vec![1e-12, 1.0, -1e-9],
            vec![0.0, -0.0, 1e-10],
            vec![f64::INFINITY, f64::NAN, -1e-300],
        ];

        for zero_tol in [0.0, 1e-10, 1e-8, 1.0] {
            for point in &points {
                let mut once = point.clone();
                snap_to_zero(&mut once, zero_tol);
                let mut twice = once.clone();
                snap_to_zero(&mut twice, zero_tol);

                assert_eq!(
                    once.iter().map(|v| v.to_bits()).collect::<Vec<_>>(),
                    twice.iter().map(|v| v.to_bits()).collect::<Vec<_>>()
                );
            }
        }
    }

    #[test]
    fn scalar_and_vector_snapping_agree() {
        for value in [3e-11, -2.0, 0.0, 1e-10, -9.99e-11] {
            let mut x = [value];
            snap_to_zero(&mut x, 1e-10);
            assert_eq!(x[0], snap(value, 1e-10));
        }
    }

    #[test]
    fn duplicates() {
        assert!(is_duplicate(&[1.0, 2.0], &[1.0 + 5e-9, 2.0 - 5e-9], 1e-8));
        assert!(!is_duplicate(&[1.0, 2.0], &[1.0, 2.0 + 1.5e-8], 1e-8));
        assert!(!is_duplicate(&[1.0, 2.0], &[1.0 + 2e-8, 2.0], 1e-8));
        assert!(!is_duplicate(&[1.0], &[1.0, 2.0], 1e-8));
    }

    #[test]
    fn first_duplicate_wins() {
        let roots = vec![vec![0.0, 0.0], vec![1.0, 1.0], vec![1.0, 1.0 + 5e-9]];

        assert_eq!(find_duplicate(&roots, &[1.0, 1.0 + 2e-9], 1e-8), Some(1));
        assert_eq!(find_duplicate(&roots, &[0.5, 0.5], 1e-8), None);
        assert_eq!(find_duplicate::<f64, Vec<f64>>(&[], &[0.5, 0.5], 1e-8), None);
    }
}
