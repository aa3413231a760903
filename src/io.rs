pub mod raw;
pub mod volume;

use std::path::Path;

use crate::dose::DoseVolume;
use crate::error::Result;
use crate::types::Masks;

/// Source of patient dose volumes and organ contours, and sink for derived
/// dose volumes.
pub trait PatientImaging {
    fn load_dose_volume(&self, path: &Path) -> Result<DoseVolume>;

    /// Boolean voxel masks indexed by ROI name
    fn load_structure_masks(&self, path: &Path) -> Result<Masks>;

    /// Write `volume` to `path`, in its own unit
    fn write_dose_volume(&self, volume: &DoseVolume, path: &Path) -> Result<()>;
}
