/// Command line interface for `mirdose` executable
#[derive(clap::Parser, Debug, Clone)]
#[clap(
    name = "mirdose",
    about = "Voxel S-value kernels, BED and DVH for radionuclide therapy",
)]
pub (super) struct Cli {
    /// Half-lives and tissue parameters replacing the built-in ones
    #[clap(short, long)]
    pub config: Option<PathBuf>,

    /// Maximum number of rayon threads
    #[clap(short = 'j', long, default_value = "4")]
    pub threads: usize,

    #[clap(subcommand)]
    pub (super) command: Command,
}

#[derive(clap::Subcommand, Debug, Clone)]
pub (super) enum Command {

    /// S-value at one offset, interpolated to the requested voxel size
    Svalue {
        #[clap(flatten)]
        dataset: Dataset,

        #[clap(flatten)]
        kernel: Kernel,

        #[clap(short, long)]
        voxel_size: Length,

        /// Offset from the source voxel, in voxels
        #[clap(short, long, value_parser = parse_offset, default_value = "0,0,0")]
        offset: Index3,
    },

    /// S-values along z, and their uncertainties where available
    Profile {
        #[clap(flatten)]
        dataset: Dataset,

        #[clap(flatten)]
        kernel: Kernel,

        #[clap(short, long)]
        voxel_size: Length,

        /// Number of voxels in the profile
        #[clap(short, long, default_value = "6")]
        n: usize,
    },

    /// Percent difference of some kernels relative to a baseline kernel
    Compare {
        #[clap(flatten)]
        dataset: Dataset,

        #[clap(short, long, default_value = "soft")]
        tissue: Tissue,

        /// Kernel in the denominator: reference, standard or option4
        #[clap(short, long, default_value = "option4")]
        baseline: KernelName,

        /// Kernels compared with the baseline, one series each
        #[clap(short, long = "kernel", default_values = ["reference", "standard"])]
        kernels: Vec<KernelName>,

        /// Voxel sizes at which to compare [default: every baseline size]
        #[clap(short, long)]
        voxel_size: Vec<Length>,

        #[clap(short, long, default_value = "6")]
        n: usize,
    },

    /// Biological effective dose, per voxel
    Bed {
        #[clap(flatten)]
        patient: Patient,

        /// Radionuclide whose decay sets the dose rate
        #[clap(long)]
        nuclide: String,

        /// Header of the BED volume [default: BEDCalculation_<dose stem>.toml beside the dose]
        #[clap(short, long)]
        out: Option<PathBuf>,
    },

    /// Cumulative dose-volume histograms of some structures
    Dvh {
        #[clap(flatten)]
        patient: Patient,

        /// Structures to histogram
        #[clap(short, long = "roi", required = true)]
        rois: Vec<String>,

        #[clap(short, long, default_value_t = DEFAULT_BINS)]
        bins: usize,
    },
}

/// Where the kernels of one radionuclide are found
#[derive(clap::Args, Debug, Clone)]
pub (super) struct Dataset {
    /// Radionuclide, e.g. 177Lu or Lu-177
    #[clap(long)]
    pub nuclide: String,

    /// Directory with the published reference tables
    #[clap(long)]
    pub reference: Option<PathBuf>,

    /// Directory with the Monte Carlo simulation tables
    #[clap(long)]
    pub simulation: Option<PathBuf>,
}

#[derive(clap::Args, Debug, Clone)]
pub (super) struct Kernel {
    #[clap(short, long, default_value = "reference")]
    pub source: Source,

    #[clap(short, long, default_value = "soft")]
    pub tissue: Tissue,

    /// Ignored for reference kernels
    #[clap(short, long, default_value = "standard")]
    pub physics: Physics,
}

#[derive(clap::Args, Debug, Clone)]
pub (super) struct Patient {
    /// Header of the dose volume
    #[clap(short, long)]
    pub dose: PathBuf,

    /// Header of the structure set
    #[clap(long)]
    pub structures: PathBuf,
}

fn parse_offset(s: &str) -> Result<Index3, String> {
    if s.split(',').count() != 3 { return Err(format!("expected `x,y,z`, got `{s}`")) }
    let (x, y, z) = parse_triplet(s).map_err(|e| format!("{e}"))?;
    Ok([x, y, z])
}

// ----- Imports -----------------------------------------------------------------------------------------
use std::path::PathBuf;
use units::Length;
use mirdose::{
    Index3, Physics, Source, Tissue,
    analysis::KernelName,
    dose::dvh::DEFAULT_BINS,
    utils::parse_triplet,
};
