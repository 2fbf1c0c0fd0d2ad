//! 🍇欢迎光临🍓
//!
//! 涵盖了本 crate 一系列常用的功能.

pub use crate::{Idx2d, Idx3d};

pub use crate::{MetricError, MetricResult};
pub use crate::{PixelGrid, VoxelGrid};

pub use crate::{BorderSample, SurfaceDistances};
pub use crate::{compute_surface_distances, compute_surface_distances_2d};

pub use crate::metrics::{
    compute_average_surface_distance, compute_dice_coefficient, compute_robust_hausdorff,
    compute_surface_dice_at_tolerance, compute_surface_overlap_at_tolerance,
};
pub use crate::metrics::{EvalSpec, SurfaceMetrics};

pub use crate::edt::distance_transform_edt;
pub use crate::lookup::{ContourLengthTable, SurfaceAreaTable};
