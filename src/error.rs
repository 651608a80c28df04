//! Error type for the few operations that reject their input outright.
//!
//! Almost every degeneracy (zero-length segments, collinear tangents,
//! non-finite weights) is smoothed into a simpler verb instead of being
//! reported. Only geometry with no defined meaning ends up here.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    /// An elliptical arc with both radii zero between two distinct points.
    #[error("elliptical arc has zero radii but a non-zero chord of length {chord}")]
    ZeroRadiusArc { chord: f64 },
    /// A coordinate or parameter was NaN or infinite.
    #[error("non-finite value in {what}")]
    NonFiniteInput { what: &'static str },
}

pub type Result<T> = std::result::Result<T, GeometryError>;
