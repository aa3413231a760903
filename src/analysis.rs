//! Kernel profiles and comparisons between kernel sources, as consumed by
//! plotting front ends.

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, QueryError};
use crate::kernel::{Physics, Source, Tissue};
use crate::library::KernelLibrary;
use crate::types::{Length, Percentf64, SValuef64};
use units::mm_;

/// Number of voxels along an axis covered by a default profile
pub const PROFILE_VOXELS: usize = 6;

/// Which kernel to take from a library
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct KernelSelection {
    pub source: Source,
    pub tissue: Tissue,
    pub physics: Physics,
}

/// A kernel named without its tissue: `reference`, or the physics list of a
/// simulated kernel (`standard`, `option4`)
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KernelName {
    Reference,
    Simulated(Physics),
}

impl KernelName {
    pub fn selection(self, tissue: Tissue) -> KernelSelection {
        match self {
            KernelName::Reference          => KernelSelection { source: Source::Reference , tissue, physics: Physics::default() },
            KernelName::Simulated(physics) => KernelSelection { source: Source::Simulation, tissue, physics },
        }
    }
}

impl FromStr for KernelName {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Error> {
        if let Ok(Source::Reference) = s.parse::<Source>() { return Ok(KernelName::Reference) }
        s.parse().map(KernelName::Simulated)
    }
}

impl fmt::Display for KernelName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KernelName::Reference          => f.write_str("reference"),
            KernelName::Simulated(physics) => write!(f, "{physics}"),
        }
    }
}

/// S-values along one axis, starting at the source voxel
#[derive(Clone, Debug, PartialEq)]
pub struct Profile {
    /// Distance from the source voxel centre, mm
    pub distance: Vec<f64>,
    pub svalue: Vec<SValuef64>,
    /// Present for simulated kernels tabulated at exactly this voxel size
    pub uncertainty: Option<Vec<SValuef64>>,
}

/// S-values at offsets `(0, 0, i)` for `i` in `0..n`, with uncertainties
/// taken along `(i, 0, 0)` where the kernel provides them.
pub fn profile(
    library: &KernelLibrary,
    selection: KernelSelection,
    voxel_size: Length,
    n: usize,
) -> Result<Profile, QueryError> {
    let KernelSelection { source, tissue, physics } = selection;
    let distance = (0..n).map(|i| i as f64 * mm_(voxel_size)).collect();
    let svalue = (0..n)
        .map(|i| library.interpolate(source, tissue, physics, voxel_size, [0, 0, i]))
        .collect::<Result<_, _>>()?;
    let uncertainty = match source {
        Source::Reference  => None,
        Source::Simulation => (0..n)
            .map(|i| library.interpolate_uncertainty(tissue, physics, voxel_size, [i, 0, 0]))
            .collect::<Result<Vec<_>, _>>()
            .ok(),
    };
    Ok(Profile { distance, svalue, uncertainty })
}

/// Percent difference of kernel `a` with respect to kernel `b` along a
/// profile: `(a - b) / b × 100`
pub fn percent_differences(
    library: &KernelLibrary,
    a: KernelSelection,
    b: KernelSelection,
    voxel_size: Length,
    n: usize,
) -> Result<Vec<Percentf64>, QueryError> {
    let a = profile(library, a, voxel_size, n)?;
    let b = profile(library, b, voxel_size, n)?;
    Ok(a.svalue.iter().zip(&b.svalue)
        .map(|(a, b)| (a - b) / b * 100.0)
        .collect())
}
