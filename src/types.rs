pub use units::{Length, Time, Frequency};
pub use units::todo::{SValuef64, Activityf64, Percentf64};

/// Non-negative voxel offset `[dx, dy, dz]` from a source voxel
pub type Index3 = [usize; 3];
pub type BoxDim = [usize; 3];

/// Dense 3D arrays indexed `[x, y, z]`
pub type Volume<T> = ndarray::Array3<T>;
pub type Mask = Volume<bool>;

/// Structure (ROI) masks, keyed by structure name
pub type Masks = std::collections::HashMap<String, Mask>;

/// Cumulated activity assumed for simulated kernels whose file name does not
/// say otherwise, in MBq s
pub const DEFAULT_CUMULATED_ACTIVITY: Activityf64 = 10.0;

/// Initial value of the common lookup range, in voxels, before any kernel
/// table narrows it
pub const DEFAULT_MAXIMUM_DISTANCE_IN_VOXELS: usize = 6;

/// 1 mCi = 37 MBq
pub const MBQ_PER_MCI: f64 = 37.0;
/// 1 Gy = 1000 mGy
pub const MGY_PER_GY: f64 = 1e3;
