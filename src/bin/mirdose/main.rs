mod cli;
mod progress;

fn main() -> Result<()> {
    let args = Cli::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    rayon::ThreadPoolBuilder::new().num_threads(args.threads).build_global()
        .unwrap_or_else(|e| log::warn!("could not configure {} threads: {e}", args.threads));

    let config = match &args.config {
        Some(path) => read_config_file(path)?,
        None       => Config::default(),
    };
    let registry = config.registry()?;

    match args.command {
        Command::Svalue { dataset, kernel, voxel_size, offset } => {
            let library = load_library(&dataset)?;
            let Kernel { source, tissue, physics } = kernel;
            let s = library.interpolate(source, tissue, physics, voxel_size, offset)?;
            let [x, y, z] = offset;
            println!("{}\t{x},{y},{z}\t{s:e}", mm_(voxel_size));
        }

        Command::Profile { dataset, kernel, voxel_size, n } => {
            let library = load_library(&dataset)?;
            let Kernel { source, tissue, physics } = kernel;
            let profile = analysis::profile(&library, KernelSelection { source, tissue, physics }, voxel_size, n)?;
            println!("# {} {source} {tissue} {physics}: distance/mm\tS\tsigma", library.nuclide());
            for (i, (d, s)) in profile.distance.iter().zip(&profile.svalue).enumerate() {
                match &profile.uncertainty {
                    Some(u) => println!("{d}\t{s:e}\t{:e}", u[i]),
                    None    => println!("{d}\t{s:e}"),
                }
            }
        }

        Command::Compare { dataset, tissue, baseline, kernels, voxel_size, n } => {
            let library = load_library(&dataset)?;
            let denominator = baseline.selection(tissue);
            let sizes = if voxel_size.is_empty() {
                library.voxel_sizes(denominator.source, tissue, denominator.physics).into_iter().map(mm).collect()
            } else { voxel_size };
            println!("# {} {tissue}: (kernel - {baseline}) / {baseline}, %", library.nuclide());
            for size in sizes {
                for kernel in &kernels {
                    let diffs = analysis::percent_differences(&library, kernel.selection(tissue), denominator, size, n)?;
                    println!("{}\t{kernel}\t{}", mm_(size), diffs.iter().map(|d| format!("{d:.2}")).join("\t"));
                }
            }
        }

        Command::Bed { patient, nuclide, out } => {
            let lambda = registry.resolve_str(&nuclide)?;
            let (dose, masks) = load_patient(&patient)?;
            let mut timing = Timing::new();
            timing.start("Calculating BED");
            let bed = BedCalculator::new(&config.tissues, lambda).compute(&dose, &masks)?;
            timing.done();
            let out = out.unwrap_or_else(|| bed_destination(&patient.dose));
            RawVolumes.write_dose_volume(&bed, &out)?;
            println!("Wrote BED in {} to {}", bed.unit, out.display());
        }

        Command::Dvh { patient, rois, bins } => {
            let (dose, masks) = load_patient(&patient)?;
            let progress = progress::Progress::new(&rois);
            let dvhs = Dvh::for_rois(&dose.data, &masks, &rois, bins, |roi| progress.roi_done(roi))?;
            progress.finish();
            println!("# dose/{}\t{}", dose.unit, rois.iter().join("\t"));
            for h in 0..bins {
                let threshold = h as f64 * dvhs[0].1.bin_width;
                let row = dvhs.iter().map(|(_, dvh)| format!("{:.3}", dvh.volume_percent[h])).join("\t");
                println!("{threshold:.4}\t{row}");
            }
        }
    }
    Ok(())
}

fn load_library(dataset: &Dataset) -> Result<KernelLibrary> {
    let nuclide: RadionuclideId = dataset.nuclide.parse()?;
    let paths = DatasetPaths { reference: dataset.reference.clone(), simulation: dataset.simulation.clone() };
    let mut timing = Timing::new();
    timing.start(&format!("Loading {nuclide} kernels"));
    let library = KernelLibrary::load(&nuclide, &paths)?;
    timing.done();
    for LoadFailure { path, error } in library.failures() {
        eprintln!("Skipped {}: {error}", path.display());
    }
    Ok(library)
}

fn load_patient(patient: &Patient) -> Result<(DoseVolume, Masks)> {
    let mut timing = Timing::new();
    timing.start("Loading dose and structures");
    let dose  = RawVolumes.load_dose_volume    (&patient.dose)?;
    let masks = RawVolumes.load_structure_masks(&patient.structures)?;
    timing.done();
    Ok((dose, masks))
}

/// `BEDCalculation_<stem>.toml` in the directory of `dose`
fn bed_destination(dose: &Path) -> PathBuf {
    let stem = dose.file_stem().map(|s| s.to_string_lossy()).unwrap_or_default();
    dose.with_file_name(format!("BEDCalculation_{stem}.toml"))
}



// ----- Imports -----------------------------------------------------------------------------------------
use std::path::{Path, PathBuf};
use clap::Parser;
use itertools::Itertools;
use units::{mm, mm_};
use mirdose::{
    DatasetPaths, DoseVolume, KernelLibrary, LoadFailure, Masks, RadionuclideId, Result,
    analysis::{self, KernelSelection},
    config::radiobiology::{read_config_file, Config},
    dose::{bed::BedCalculator, dvh::Dvh},
    io::{PatientImaging, volume::RawVolumes},
    utils::timing::Progress as Timing,
};
use cli::{Cli, Command, Dataset, Kernel, Patient};
