use super::domain::Domain;

/// Numeric field of the state variables, usually `f64`.
///
/// Extends [`nalgebra::RealField`] with a couple of constants that the
/// finite-difference and trust-region code needs all the time.
pub trait RealField: nalgebra::RealField + Copy {
    /// Square root of the machine epsilon.
    const EPSILON_SQRT: Self;
}

impl RealField for f32 {
    const EPSILON_SQRT: Self = 0.00034526698;
}

impl RealField for f64 {
    const EPSILON_SQRT: Self = 0.000000014901161193847656;
}

/// The base trait for [`System`](super::system::System).
pub trait Problem {
    /// Type of the field, usually f64.
    type Field: RealField;

    /// Get the domain of the problem. The dimension of the domain is the
    /// number of variables.
    ///
    /// For systems solved by the local solvers, this is the region where the
    /// iterates are allowed to move. It is usually unconstrained, the
    /// admissibility of found roots is decided separately.
    fn domain(&self) -> Domain<Self::Field>;
}
