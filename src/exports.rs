pub use crate::types::*;

pub use crate::error::{Error, QueryError, Result};
pub use crate::kernel::{Physics, Source, Tissue, VoxelKernelTable};
pub use crate::library::{DatasetPaths, KernelLibrary, LoadFailure};
pub use crate::nuclide::{RadionuclideId, Registry};
pub use crate::dose::{DoseUnit, DoseVolume};
