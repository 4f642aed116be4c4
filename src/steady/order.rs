//! Canonical ordering of the found roots.

use std::cmp::Ordering;

use nalgebra::{convert, ComplexField};

use crate::core::RealField;

/// Number of decimal digits kept in the sort key.
pub const SORT_DECIMALS: i32 = 12;

/// Rounds every coordinate to [`SORT_DECIMALS`] decimal digits.
///
/// The key only decides the order. The roots themselves keep full precision.
/// Values so large that the scaling overflows are used as they are.
pub fn sort_key<T: RealField>(x: &[T]) -> Vec<T> {
    let factor: T = convert(10f64.powi(SORT_DECIMALS));

    x.iter()
        .map(|&xi| {
            let rounded = (xi * factor).round() / factor;
            if rounded.is_finite() {
                rounded
            } else {
                xi
            }
        })
        .collect()
}

/// Lexicographic comparison of two keys, coordinate 0 first.
///
/// Incomparable coordinates (NaN) are treated as equal.
pub fn canonical_cmp<T: RealField>(a: &[T], b: &[T]) -> Ordering {
    a.iter()
        .zip(b.iter())
        .map(|(ai, bi)| ai.partial_cmp(bi).unwrap_or(Ordering::Equal))
        .find(|ord| *ord != Ordering::Equal)
        .unwrap_or_else(|| a.len().cmp(&b.len()))
}

/// Sorts the roots ascending by their [`sort_key`].
///
/// The sort is stable, so roots with equal keys keep their discovery order.
pub fn sort_canonical<T: RealField>(roots: &mut Vec<Vec<T>>) {
    let mut keyed = roots
        .drain(..)
        .map(|root| (sort_key(&root), root))
        .collect::<Vec<_>>();

    keyed.sort_by(|(a, _), (b, _)| canonical_cmp(a, b));
    roots.extend(keyed.into_iter().map(|(_, root)| root));
}
