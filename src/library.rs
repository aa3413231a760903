//! All kernel tables of one radionuclide, from both sources, and
//! interpolation between their voxel sizes.

use std::path::{Path, PathBuf};

use ordered_float::OrderedFloat;

use crate::error::{Error, QueryError, Result};
use crate::kernel::{reference, simulation, Physics, Source, Tissue, VoxelKernelTable};
use crate::nuclide::RadionuclideId;
use crate::types::{Index3, Length, SValuef64, DEFAULT_MAXIMUM_DISTANCE_IN_VOXELS};
use crate::utils::{interp, rounded};
use units::mm_;

/// Directories holding the kernel files of each source. A source without a
/// directory is simply unavailable.
#[derive(Clone, Debug, Default)]
pub struct DatasetPaths {
    pub reference : Option<PathBuf>,
    pub simulation: Option<PathBuf>,
}

/// A kernel file which matched the radionuclide but could not be loaded
#[derive(Debug)]
pub struct LoadFailure {
    pub path: PathBuf,
    pub error: Error,
}

#[derive(Debug)]
pub struct KernelLibrary {
    nuclide: RadionuclideId,
    reference : Vec<VoxelKernelTable>,
    simulation: Vec<VoxelKernelTable>,
    maximum_distance_in_voxels: usize,
    failures: Vec<LoadFailure>,
}

impl KernelLibrary {

    /// Load every file in `paths` whose name starts with `nuclide`.
    ///
    /// A directory which is given but cannot be listed is an error. Files
    /// which fail to parse are skipped and recorded in `failures`.
    pub fn load(nuclide: &RadionuclideId, paths: &DatasetPaths) -> Result<Self> {
        let mut failures = vec![];
        let mut load_source = |dir: &Option<PathBuf>, read: fn(&Path) -> Result<VoxelKernelTable>| -> Result<_> {
            let Some(dir) = dir else { return Ok(vec![]) };
            let mut tables = vec![];
            for path in matching_files(dir, nuclide)? {
                match read(&path) {
                    Ok(table) => tables.push(table),
                    Err(error) => {
                        log::warn!("skipping {}: {error}", path.display());
                        failures.push(LoadFailure { path, error });
                    }
                }
            }
            Ok(tables)
        };
        let reference  = load_source(&paths.reference , reference ::read)?;
        let simulation = load_source(&paths.simulation, simulation::read)?;
        let library = Self::from_tables(nuclide.clone(), reference, simulation, failures);
        log::info!("{}: {} reference and {} simulation tables, {} failures, common range {} voxels",
                   library.nuclide, library.reference.len(), library.simulation.len(),
                   library.failures.len(), library.maximum_distance_in_voxels);
        Ok(library)
    }

    /// Assemble a library from already-parsed tables
    pub fn from_tables(
        nuclide: RadionuclideId,
        mut reference : Vec<VoxelKernelTable>,
        mut simulation: Vec<VoxelKernelTable>,
        failures: Vec<LoadFailure>,
    ) -> Self {
        // Stable, so tables of equal size keep their file order
        let by_size = |t: &VoxelKernelTable| OrderedFloat(mm_(t.voxel_size));
        reference .sort_by_key(by_size);
        simulation.sort_by_key(by_size);
        for (source, tables) in [(Source::Reference, &reference), (Source::Simulation, &simulation)] {
            for (size, tissue, physics) in duplicates(tables) {
                log::warn!("ambiguous {source} tables: several for {tissue} {physics:?} at {size} mm");
            }
        }

        let maximum_distance_in_voxels = reference.iter().chain(simulation.iter())
            .flat_map(VoxelKernelTable::extent)
            .fold(DEFAULT_MAXIMUM_DISTANCE_IN_VOXELS, usize::min);

        Self { nuclide, reference, simulation, maximum_distance_in_voxels, failures }
    }

    pub fn nuclide(&self) -> &RadionuclideId { &self.nuclide }

    /// Tables of `source`, in ascending order of voxel size
    pub fn tables(&self, source: Source) -> &[VoxelKernelTable] {
        match source {
            Source::Reference  => &self.reference,
            Source::Simulation => &self.simulation,
        }
    }

    pub fn is_available(&self, source: Source) -> bool { !self.tables(source).is_empty() }

    /// Smallest per-axis extent of any loaded table: offsets below this are
    /// defined in every table.
    pub fn maximum_distance_in_voxels(&self) -> usize { self.maximum_distance_in_voxels }

    pub fn failures(&self) -> &[LoadFailure] { &self.failures }

    /// Tables of `source` describing `tissue` (and `physics`, for simulated
    /// kernels), in ascending order of voxel size
    pub fn matching(&self, source: Source, tissue: Tissue, physics: Physics)
                    -> std::result::Result<Vec<&VoxelKernelTable>, QueryError> {
        if !self.is_available(source) {
            return Err(QueryError::SourceUnavailable(source))
        }
        let physics = physics_filter(source, physics);
        let tables: Vec<_> = self.tables(source).iter()
            .filter(|t| t.matches(tissue, physics))
            .collect();
        if tables.is_empty() {
            return Err(QueryError::NoMatchingTables { dataset: source, tissue, physics })
        }
        Ok(tables)
    }

    /// Voxel sizes available for `tissue` and `physics` in `source`, mm
    pub fn voxel_sizes(&self, source: Source, tissue: Tissue, physics: Physics) -> Vec<f64> {
        self.matching(source, tissue, physics)
            .map(|tables| tables.iter().map(|t| t.voxel_size_mm()).collect())
            .unwrap_or_default()
    }

    /// S-value at `offset` for a voxel of `voxel_size`, interpolated linearly
    /// between the tabulated voxel sizes and clamped at both ends.
    ///
    /// `physics` only selects among simulated kernels; it is ignored for the
    /// reference source.
    pub fn interpolate(
        &self,
        source: Source,
        tissue: Tissue,
        physics: Physics,
        voxel_size: Length,
        offset: Index3,
    ) -> std::result::Result<SValuef64, QueryError> {
        self.try_interpolate(source, tissue, physics, voxel_size, offset).map_err(warn)
    }

    /// Standard uncertainty of the simulated S-value at `offset`.
    ///
    /// Uncertainties are not interpolated: a simulated table whose voxel size
    /// agrees with `voxel_size` to three decimal places (in mm) must exist.
    pub fn interpolate_uncertainty(
        &self,
        tissue: Tissue,
        physics: Physics,
        voxel_size: Length,
        offset: Index3,
    ) -> std::result::Result<SValuef64, QueryError> {
        self.try_uncertainty(tissue, physics, voxel_size, offset).map_err(warn)
    }

    fn try_interpolate(
        &self,
        source: Source,
        tissue: Tissue,
        physics: Physics,
        voxel_size: Length,
        offset: Index3,
    ) -> std::result::Result<SValuef64, QueryError> {
        let size = finite_mm(voxel_size)?;
        self.check_offset(offset)?;
        let tables = self.matching(source, tissue, physics)?;
        let mut sizes   = Vec::with_capacity(tables.len());
        let mut svalues = Vec::with_capacity(tables.len());
        for table in tables {
            sizes  .push(table.voxel_size_mm());
            svalues.push(table.svalue(offset).ok_or(self.out_of_range(offset))?);
        }
        interp(size, &sizes, &svalues)
            .ok_or(QueryError::NoMatchingTables { dataset: source, tissue, physics: physics_filter(source, physics) })
    }

    fn try_uncertainty(
        &self,
        tissue: Tissue,
        physics: Physics,
        voxel_size: Length,
        offset: Index3,
    ) -> std::result::Result<SValuef64, QueryError> {
        let size = finite_mm(voxel_size)?;
        self.check_offset(offset)?;
        let wanted = rounded(size, 3);
        let table = self.matching(Source::Simulation, tissue, physics)?
            .into_iter()
            .find(|t| rounded(t.voxel_size_mm(), 3) == wanted)
            .ok_or(QueryError::NoExactVoxelSize { tissue, physics, voxel_size_mm: size })?;
        table.uncertainty(offset).ok_or(self.out_of_range(offset))
    }

    fn check_offset(&self, offset: Index3) -> std::result::Result<(), QueryError> {
        if offset.iter().any(|&i| i >= self.maximum_distance_in_voxels) {
            return Err(self.out_of_range(offset))
        }
        Ok(())
    }

    fn out_of_range(&self, offset: Index3) -> QueryError {
        QueryError::OffsetOutOfRange { offset, limit: self.maximum_distance_in_voxels }
    }
}

fn physics_filter(source: Source, physics: Physics) -> Option<Physics> {
    match source {
        Source::Reference  => None,
        Source::Simulation => Some(physics),
    }
}

fn finite_mm(voxel_size: Length) -> std::result::Result<f64, QueryError> {
    let size = mm_(voxel_size);
    if size.is_finite() { Ok(size) } else { Err(QueryError::InvalidVoxelSize(size)) }
}

fn warn(e: QueryError) -> QueryError {
    log::warn!("{e}");
    e
}

/// `(size in mm, tissue, physics)` shared by more than one of `tables`
fn duplicates(tables: &[VoxelKernelTable]) -> Vec<(f64, Tissue, Option<Physics>)> {
    use itertools::Itertools;
    let key = |t: &VoxelKernelTable| (rounded(t.voxel_size_mm(), 6), t.tissue, t.physics);
    tables.iter().map(key).duplicates()
        .map(|(OrderedFloat(size), tissue, physics)| (size, tissue, physics))
        .collect()
}

/// Regular files (or links to them) in `dir` whose names start with
/// `nuclide`, in name order
fn matching_files(dir: &Path, nuclide: &RadionuclideId) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir).map_err(|_| Error::MissingPath(dir.into()))?;
    let mut files = vec![];
    for entry in entries {
        let entry = entry?;
        let name = entry.file_name();
        // `Path::is_file` follows symlinks, `DirEntry::file_type` does not
        let path = entry.path();
        if nuclide.is_prefix_of(&name.to_string_lossy()) && path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}
