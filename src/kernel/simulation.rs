//! Parser for kernels scored in Monte Carlo (TOPAS) simulations.
//!
//! ```text
//! # Results for scorer DoseAtPhantom
//! # X in 21 bins of 0.1 cm
//! # Y in 21 bins of 0.1 cm
//! # Z in 21 bins of 0.1 cm
//! # DoseToMedium ( Gy ) : Sum   Mean   Standard_Deviation
//! 0,0,0,1.2e-09,1.2e-16,3.4e-15
//! ```
//!
//! Rows are `x, y, z, dose, mean dose per event, std dev of dose per
//! event`. Tissue and physics list are encoded in the file name, e.g.
//! `90Y_1000MBqs_opt4_soft.csv`.

use std::path::Path;

use super::fold::{Folded, RawBox, Sample};
use super::{Physics, Tissue, VoxelKernelTable};
use crate::error::{Error, Result};
use crate::types::{Activityf64, Length, DEFAULT_CUMULATED_ACTIVITY};
use units::{cm, mm, mm_};

/// Read and fold the simulated kernel in `path`, normalizing it by the
/// cumulated activity found in the file name.
pub fn read(path: &Path) -> Result<VoxelKernelTable> {
    let text = std::fs::read_to_string(path)?;
    let name = file_name(path);
    let activity = cumulated_activity(&name).unwrap_or_else(|| {
        if name.contains("MBqs") {
            log::warn!("{}: cannot read cumulated activity, assuming {DEFAULT_CUMULATED_ACTIVITY} MBq s", path.display());
        }
        DEFAULT_CUMULATED_ACTIVITY
    });
    parse(&text, path, activity)
}

/// Parse simulation output; `path` supplies tissue and physics list.
pub fn parse(text: &str, path: &Path, cumulated_activity: Activityf64) -> Result<VoxelKernelTable> {
    let err = |line: usize, message: String| Error::parse(path, line, message);
    let name = file_name(path);
    let tissue = tissue_from_file_name(path).map_err(|e| err(0, e.to_string()))?;
    let physics = physics_from_file_name(&name);

    let mut voxel_size = None;
    let mut samples = vec![];
    for (n, line) in text.lines().enumerate() {
        let line_number = n + 1;
        if line.trim().is_empty() { continue }
        if line.starts_with('#') {
            if line.chars().nth(2) == Some('X') {
                voxel_size = Some(voxel_size_from_comment(line).map_err(|m| err(line_number, m))?);
            }
            continue
        }
        samples.push(parse_row(line).map_err(|m| err(line_number, m))?);
    }
    let voxel_size = voxel_size.ok_or_else(|| err(0, "no `# X ... of <size> <unit>` comment".into()))?;
    let raw = RawBox::from_samples(&samples).ok_or_else(|| err(0, "no dose rows".into()))?;
    let Folded { dose, sigma } = raw.fold();

    let (svalues, uncertainty) = to_svalues(dose, sigma, cumulated_activity);
    log::debug!("{}: {tissue} ({physics}) at {} mm, {} samples, folded to {:?}",
                path.display(), mm_(voxel_size), samples.len(), svalues.dim());
    Ok(VoxelKernelTable::new(voxel_size, tissue, Some(physics), svalues, Some(uncertainty)))
}

/// Convert folded dose (Gy) into S-values, mGy/(MBq s).
///
/// The uncertainty scales with the square root of the number of decays,
/// `activity × 1e6`, which the simulation is assumed to have generated.
pub fn to_svalues(
    dose: ndarray::Array3<f64>,
    sigma: ndarray::Array3<f64>,
    activity: Activityf64,
) -> (ndarray::Array3<f64>, ndarray::Array3<f64>) {
    let decays = activity * 1e6;
    let svalues = dose / activity * 1000.0;
    let uncertainty = sigma * decays / decays.sqrt() / activity * 1000.0;
    (svalues, uncertainty)
}

/// Cumulated activity (MBq s) written just before `MBqs` in a file name:
/// `90Y_1000MBqs_soft.csv` → 1000
pub fn cumulated_activity(file_name: &str) -> Option<Activityf64> {
    let end = file_name.find("MBqs")?;
    let start = file_name[..end]
        .rfind(|c: char| !(c.is_ascii_digit() || c == '.'))
        .map_or(0, |i| i + 1);
    file_name[start..end].parse().ok()
}

/// Tissue tag in the last four characters of the file stem
pub fn tissue_from_file_name(path: &Path) -> Result<Tissue> {
    let stem = path.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default();
    let tag: String = stem.chars().rev().take(4).collect::<Vec<_>>().into_iter().rev().collect();
    match tag.as_str() {
        "soft" => Ok(Tissue::Soft),
        "bone" => Ok(Tissue::Bone),
        _      => Err(Error::UnknownTissue(tag)),
    }
}

pub fn physics_from_file_name(file_name: &str) -> Physics {
    if file_name.contains("opt4") { Physics::Option4 } else { Physics::Standard }
}

fn file_name(path: &Path) -> String {
    path.file_name().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default()
}

/// `# X in 21 bins of 0.1 cm` → 1 mm
fn voxel_size_from_comment(line: &str) -> std::result::Result<Length, String> {
    let bad = || format!("cannot read voxel size from `{line}`");
    let after = line.find("of").map(|i| line[i + 2..].trim()).ok_or_else(bad)?;
    let (value, unit) = if let Some(v) = after.strip_suffix("cm") { (v, cm as fn(f64) -> Length) }
                   else if let Some(v) = after.strip_suffix("mm") { (v, mm as fn(f64) -> Length) }
                   else { return Err(bad()) };
    let value: f64 = value.trim().parse().map_err(|_| bad())?;
    Ok(unit(value))
}

fn parse_row(line: &str) -> std::result::Result<Sample, String> {
    let fields: Vec<_> = line.split(',').map(str::trim).collect();
    if fields.len() < 6 {
        return Err(format!("expected 6 comma-separated fields, found {}", fields.len()))
    }
    let index = |i: usize| fields[i].parse::<usize>().map_err(|e| format!("bad index `{}`: {e}", fields[i]));
    let value = |i: usize| fields[i].parse::<f64>  ().map_err(|e| format!("bad value `{}`: {e}", fields[i]));
    let index = [index(0)?, index(1)?, index(2)?];
    let dose = value(3)?;
    let _mean_per_event = value(4)?;
    let sigma = value(5)?;
    Ok(Sample { index, dose, sigma })
}
