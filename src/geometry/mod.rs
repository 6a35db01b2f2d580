//! Time-frequency geometry: the validated sum type and its operations.
//!
//! Geometries are generic over a coordinate [`Space`]. Geometries built by
//! callers live in [`Physical`] space (seconds, hertz);
//! [`to_index_space`] produces [`Index`]-space geometries aligned to the
//! bins of a [`Discretization`].

mod bounds;
mod coord;
pub mod features;
mod index;
mod model;
pub mod ops;
pub mod positions;
mod space;
pub mod transform;

use thiserror::Error;

pub use bounds::{Bounds, FrequencyBounds, MAX_FREQUENCY};
pub use coord::Position;
pub use features::{compute_geometric_features, GeometricFeature};
pub use index::{to_index_space, to_physical_space, Discretization, IndexOptions, TieBreak};
pub use model::{Coordinates, Dimensionality, Geometry, GeometryType};
pub use ops::{contains, intersection_bounds, intersects, iou};
pub use positions::{geometry_point, PointPosition};
pub use space::{Index, Physical, Space};
pub use transform::{buffer, scale, translate};

/// Degenerate input to a geometry operation.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum GeometryError {
    #[error("{axis} discretization has no bins")]
    EmptyDiscretization { axis: &'static str },

    #[error("{axis} discretization bin {index} is not finite")]
    NonFiniteDiscretization { axis: &'static str, index: usize },

    #[error("{axis} discretization is not strictly increasing at bin {index}")]
    NonMonotonicDiscretization { axis: &'static str, index: usize },

    #[error("{axis} index {index} is outside the {len} available bins")]
    IndexOutOfRange {
        axis: &'static str,
        index: f64,
        len: usize,
    },

    #[error("operands have a union of zero measure")]
    ZeroMeasureUnion,

    #[error("geometry collapsed during mapping: {reason}")]
    Collapsed { reason: String },
}
