//! Volumes stored as a small TOML header next to raw `f32` data
//!
//! A dose volume header:
//!
//! ```toml
//! shape = [128, 128, 90]
//! unit  = "Gy/mCi"
//! data  = "dose.raw"
//! ```
//!
//! A structure set header:
//!
//! ```toml
//! shape = [128, 128, 90]
//!
//! [[structure]]
//! name = "Liver"
//! data = "liver.raw"
//! ```
//!
//! Data paths are relative to the directory containing the header. Mask
//! voxels are set wherever the stored value is non-zero.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::dose::{DoseUnit, DoseVolume};
use crate::error::{Error, Result};
use crate::types::{BoxDim, Masks};
use super::{raw, PatientImaging};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct VolumeHeader {
    pub shape: BoxDim,
    pub unit: String,
    pub data: PathBuf,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct StructureSetHeader {
    pub shape: BoxDim,
    #[serde(default, rename = "structure")]
    pub structures: Vec<StructureEntry>,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct StructureEntry {
    pub name: String,
    pub data: PathBuf,
}

/// `PatientImaging` over TOML-headed raw volumes
#[derive(Clone, Copy, Debug, Default)]
pub struct RawVolumes;

fn read_header<H: serde::de::DeserializeOwned>(path: &Path) -> Result<H> {
    let text = fs::read_to_string(path).map_err(|_| Error::MissingPath(path.into()))?;
    Ok(toml::from_str(&text)?)
}

fn beside(header: &Path, data: &Path) -> PathBuf {
    match header.parent() {
        Some(dir) => dir.join(data),
        None      => data.into(),
    }
}

impl PatientImaging for RawVolumes {
    fn load_dose_volume(&self, path: &Path) -> Result<DoseVolume> {
        let VolumeHeader { shape, unit, data } = read_header(path)?;
        let data = raw::read_volume(&beside(path, &data), shape)?;
        let unit: DoseUnit = match unit.parse() { Ok(u) => u, Err(never) => match never {} };
        log::info!("Loaded dose volume {} of shape {shape:?} in {unit}", path.display());
        Ok(DoseVolume::new(data, unit))
    }

    fn load_structure_masks(&self, path: &Path) -> Result<Masks> {
        let StructureSetHeader { shape, structures } = read_header(path)?;
        structures.into_iter()
            .map(|StructureEntry { name, data }| {
                let values = raw::read_volume(&beside(path, &data), shape)?;
                log::debug!("Structure `{name}` loaded from {}", data.display());
                Ok((name, values.mapv(|v| v != 0.0)))
            })
            .collect()
    }

    /// The data go to `path` with its extension replaced by `raw`; the
    /// header to `path` itself.
    fn write_dose_volume(&self, volume: &DoseVolume, path: &Path) -> Result<()> {
        let data_path = path.with_extension("raw");
        raw::write_volume(&volume.data, &data_path)?;
        let data = data_path.file_name()
            .map(PathBuf::from)
            .ok_or_else(|| Error::MissingPath(path.into()))?;
        let header = VolumeHeader { shape: volume.dim(), unit: volume.unit.to_string(), data };
        fs::write(path, toml::to_string(&header)?)?;
        log::info!("Wrote {}", path.display());
        Ok(())
    }
}
