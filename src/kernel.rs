//! Voxel S-value kernels: the dose rate delivered by a unit of activity in one
//! voxel to each voxel in its neighbourhood.
//!
//! Kernels are stored as one octant, indexed by non-negative offsets
//! `[dx, dy, dz]` from the source voxel; the other octants follow by symmetry.

pub mod fold;
pub mod reference;
pub mod simulation;

use std::fmt;
use std::str::FromStr;

use ndarray::Array3;

use crate::error::Error;
use crate::types::{BoxDim, Index3, Length, SValuef64};
use units::mm_;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Tissue { Soft, Bone, Lung, Liver }

impl FromStr for Tissue {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Error> {
        match s.to_ascii_lowercase().as_str() {
            "soft"  => Ok(Tissue::Soft),
            "bone"  => Ok(Tissue::Bone),
            "lung"  => Ok(Tissue::Lung),
            "liver" => Ok(Tissue::Liver),
            _       => Err(Error::UnknownTissue(s.into())),
        }
    }
}

impl fmt::Display for Tissue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Tissue::Soft  => "Soft",
            Tissue::Bone  => "Bone",
            Tissue::Lung  => "Lung",
            Tissue::Liver => "Liver",
        })
    }
}

/// Physics list used in the Monte Carlo simulation which produced a kernel
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Physics {
    #[default]
    Standard,
    Option4,
}

impl FromStr for Physics {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Error> {
        match s.to_ascii_lowercase().as_str() {
            "standard"         => Ok(Physics::Standard),
            "option4" | "opt4" => Ok(Physics::Option4),
            _                  => Err(Error::UnknownPhysics(s.into())),
        }
    }
}

impl fmt::Display for Physics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Physics::Standard => "standard",
            Physics::Option4  => "option4",
        })
    }
}

/// Where a kernel table comes from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Source {
    /// Published voxel S-value tables (Lanconelli et al.)
    Reference,
    /// Tables derived from Monte Carlo (TOPAS) simulation output
    Simulation,
}

impl FromStr for Source {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Error> {
        match s.to_ascii_lowercase().as_str() {
            "reference"  | "ref"   => Ok(Source::Reference),
            "simulation" | "topas" => Ok(Source::Simulation),
            _                      => Err(Error::UnknownSource(s.into())),
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Source::Reference  => "reference",
            Source::Simulation => "simulation",
        })
    }
}

/// S-values of one radionuclide in one tissue at one voxel size (and, for
/// simulated kernels, one physics list).
#[derive(Clone, Debug)]
pub struct VoxelKernelTable {
    pub voxel_size: Length,
    pub tissue: Tissue,
    pub physics: Option<Physics>,
    svalues: Array3<SValuef64>,
    uncertainty: Option<Array3<SValuef64>>,
}

impl VoxelKernelTable {

    /// Panics if `uncertainty` is present and differs in shape from `svalues`
    pub fn new(
        voxel_size : Length,
        tissue     : Tissue,
        physics    : Option<Physics>,
        svalues    : Array3<SValuef64>,
        uncertainty: Option<Array3<SValuef64>>,
    ) -> Self {
        if let Some(u) = &uncertainty {
            assert_eq!(u.dim(), svalues.dim(), "S-value and uncertainty arrays differ in shape");
        }
        Self { voxel_size, tissue, physics, svalues, uncertainty }
    }

    pub fn voxel_size_mm(&self) -> f64 { mm_(self.voxel_size) }

    /// Number of tabulated offsets along each axis
    pub fn extent(&self) -> BoxDim {
        let (nx, ny, nz) = self.svalues.dim();
        [nx, ny, nz]
    }

    /// S-value in mGy/(MBq s) at `offset`, if it lies within the table
    pub fn svalue(&self, offset: Index3) -> Option<SValuef64> {
        self.svalues.get(offset).copied()
    }

    /// Standard uncertainty of the S-value at `offset`, if the table has one
    pub fn uncertainty(&self, offset: Index3) -> Option<SValuef64> {
        self.uncertainty.as_ref()?.get(offset).copied()
    }

    pub fn svalues(&self) -> &Array3<SValuef64> { &self.svalues }

    /// Does this table describe `tissue` (and `physics`, when it carries one)?
    pub fn matches(&self, tissue: Tissue, physics: Option<Physics>) -> bool {
        self.tissue == tissue && (physics.is_none() || self.physics == physics)
    }
}
