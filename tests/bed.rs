// BED of patient volumes read from, and written to, disk

use std::fs;

use float_eq::assert_float_eq;
use tempfile::tempdir;

use mirdose::{
    DoseUnit, DoseVolume, Registry, Volume,
    config::radiobiology::read_config_file,
    dose::{bed::BedCalculator, dvh::Dvh},
    io::{raw, volume::RawVolumes, PatientImaging},
};

const SHAPE: [usize; 3] = [4, 3, 2];

fn dose_values() -> Volume<f64> {
    Volume::from_shape_fn(SHAPE, |(x, y, z)| 0.05 * (1 + x + 4 * y + 12 * z) as f64)
}

/// Liver in the x = 0 plane, left lung in the x = 3 plane
fn write_structures(dir: &std::path::Path) {
    let plane = |x0: usize| Volume::from_shape_fn(SHAPE, |(x, _, _)| if x == x0 { 1.0 } else { 0.0 });
    raw::write_volume(&plane(0), &dir.join("liver.raw")).unwrap();
    raw::write_volume(&plane(3), &dir.join("lung.raw" )).unwrap();
    fs::write(dir.join("structures.toml"), r#"
        shape = [4, 3, 2]

        [[structure]]
        name = "Liver"
        data = "liver.raw"

        [[structure]]
        name = "Lung_L"
        data = "lung.raw"
    "#).unwrap();
}

#[test]
fn bed_in_gy_per_mci_matches_direct_calculation() -> mirdose::Result<()> {
    let dir = tempdir()?;
    write_structures(dir.path());
    let dose_path = dir.path().join("dose.toml");
    RawVolumes.write_dose_volume(&DoseVolume::new(dose_values(), DoseUnit::GrayPerMilliCurie), &dose_path)?;

    let config = read_config_file("radiobiology.toml".as_ref())?;
    let lambda = Registry::try_from(&config)?.resolve_str("Lu-177")?;
    let calculator = BedCalculator::new(&config.tissues, lambda);

    let dose  = RawVolumes.load_dose_volume(&dose_path)?;
    let masks = RawVolumes.load_structure_masks(&dir.path().join("structures.toml"))?;
    let bed = calculator.compute(&dose, &masks)?;

    let bed_path = dir.path().join("BEDCalculation_dose.toml");
    RawVolumes.write_dose_volume(&bed, &bed_path)?;
    let written = RawVolumes.load_dose_volume(&bed_path)?;
    assert_eq!(written.unit, DoseUnit::GrayPerMilliCurie);

    // The same calculation in mGy-equivalent units throughout
    let factor = 1000.0 / 37.0;
    let in_mgy = DoseVolume::new(&dose.data * factor, DoseUnit::Other("mGy".into()));
    let direct = calculator.compute(&in_mgy, &masks)?;
    for (w, d) in written.data.iter().zip(direct.data.iter()) {
        // Written as f32
        assert_float_eq!(*w, d / factor, rmax <= 1e-6);
    }

    // BED exceeds the physical dose wherever there is dose
    for (b, d) in bed.data.iter().zip(dose.data.iter()) { assert!(b > d); }
    Ok(())
}

#[test]
fn dvh_of_structures_on_disk() -> mirdose::Result<()> {
    let dir = tempdir()?;
    write_structures(dir.path());
    let dose_path = dir.path().join("dose.toml");
    RawVolumes.write_dose_volume(&DoseVolume::new(dose_values(), DoseUnit::GrayPerMegaBecquerel), &dose_path)?;
    let dose  = RawVolumes.load_dose_volume(&dose_path)?;
    let masks = RawVolumes.load_structure_masks(&dir.path().join("structures.toml"))?;

    let rois = ["Liver".to_string(), "Lung_L".to_string()];
    let dvhs = Dvh::for_rois(&dose.data, &masks, &rois, 100, |_| ())?;
    for (_, dvh) in &dvhs {
        assert_eq!(dvh.volume_percent.len(), 100);
        assert_eq!(dvh.volume_percent[0], 100.0);
        assert!(dvh.volume_percent.windows(2).all(|w| w[1] <= w[0]));
    }
    Ok(())
}
