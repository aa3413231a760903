//! Biological effective dose for a single, protracted irradiation
//!
//! Each voxel belongs to one tissue class: Liver if it lies in any liver
//! structure, otherwise Lung if it lies in any lung structure, otherwise
//! Default. With the repair time `Trep` and `α/β` of that class:
//!
//!   BED = D (1 + D Trep / (α/β (Trep + 1/λ)))

use ndarray::Zip;
use serde::Deserialize;

use crate::config::deserialize_uom;
use crate::error::Result;
use crate::types::{Frequency, Masks, Time, Volume};
use super::{union_of, DoseVolume};
use units::{hour, mean_life_from_half_life, s_};

/// Radiobiological parameters of one tissue class
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct TissueClass {
    /// Names of the structures whose voxels belong to this class
    #[serde(default)]
    pub structures: Vec<String>,
    /// mGy-equivalent
    pub alpha_beta: f64,
    #[serde(deserialize_with = "deserialize_uom")]
    pub repair_half_time: Time,
}

impl TissueClass {
    pub fn new(structures: &[&str], alpha_beta: f64, repair_half_time: Time) -> Self {
        let structures = structures.iter().map(|s| s.to_string()).collect();
        Self { structures, alpha_beta, repair_half_time }
    }

    /// Mean repair time `Trep = T½ / ln 2`, in seconds
    pub fn repair_time_s(&self) -> f64 {
        s_(mean_life_from_half_life(self.repair_half_time))
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct TissueParameters {
    #[serde(default = "default_liver")]   pub liver  : TissueClass,
    #[serde(default = "default_lung")]    pub lung   : TissueClass,
    #[serde(default = "default_default")] pub default: TissueClass,
}

fn default_liver  () -> TissueClass { TissueClass::new(&["Liver"],            2_500.0, hour(1.5)) }
fn default_lung   () -> TissueClass { TissueClass::new(&["Lung_L", "Lung_R"], 3_000.0, hour(1.5)) }
fn default_default() -> TissueClass { TissueClass::new(&[],                  10_000.0, hour(1.5)) }

impl Default for TissueParameters {
    fn default() -> Self {
        Self { liver: default_liver(), lung: default_lung(), default: default_default() }
    }
}

/// `(Trep, α/β)` in seconds and mGy-equivalent
#[derive(Clone, Copy, Debug)]
struct Coefficients { trep: f64, alpha_beta: f64 }

impl From<&TissueClass> for Coefficients {
    fn from(class: &TissueClass) -> Self {
        Self { trep: class.repair_time_s(), alpha_beta: class.alpha_beta }
    }
}

pub struct BedCalculator<'t> {
    tissues: &'t TissueParameters,
    /// Decay constant, per second
    lambda: f64,
}

impl<'t> BedCalculator<'t> {
    pub fn new(tissues: &'t TissueParameters, decay_constant: Frequency) -> Self {
        Self { tissues, lambda: units::hz_(decay_constant) }
    }

    /// BED of a single voxel receiving mGy-equivalent `dose`
    fn bed(&self, dose: f64, Coefficients { trep, alpha_beta }: Coefficients) -> f64 {
        dose * (1.0 + dose * trep / (alpha_beta * (trep + 1.0 / self.lambda)))
    }

    /// BED volume, in the unit of `dose`
    pub fn compute(&self, dose: &DoseVolume, masks: &Masks) -> Result<DoseVolume> {
        let dim = dose.dim();
        let liver = union_of(masks, &self.tissues.liver.structures, dim)?;
        let lung  = union_of(masks, &self.tissues.lung .structures, dim)?;
        let [c_liver, c_lung, c_default] = [&self.tissues.liver, &self.tissues.lung, &self.tissues.default]
            .map(Coefficients::from);

        let normalized = dose.normalized();
        let mut bed = Volume::zeros(dim);
        Zip::from(&mut bed)
            .and(&normalized)
            .and(&liver)
            .and(&lung)
            .par_for_each(|b, &d, &in_liver, &in_lung| {
                let class = if in_liver { c_liver } else if in_lung { c_lung } else { c_default };
                *b = self.bed(d, class);
            });
        log::debug!("BED computed over {} voxels ({} liver, {} lung)",
                    bed.len(),
                    liver.iter().filter(|&&x| x).count(),
                    lung .iter().filter(|&&x| x).count());
        Ok(DoseVolume::from_normalized(bed, dose.unit.clone()))
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::dose::DoseUnit;
    use crate::error::Error;
    use crate::nuclide::Registry;
    use crate::types::Mask;
    use float_eq::assert_float_eq;
    use rstest::{fixture, rstest};

    const DIM: [usize; 3] = [3, 1, 1];

    #[fixture]
    fn lambda() -> Frequency { Registry::default().resolve_str("177Lu").unwrap() }

    /// Voxel 0 in the liver, voxel 1 in both liver and left lung, voxel 2 in neither
    fn masks() -> Masks {
        let mut liver = Mask::from_elem(DIM, false);
        let mut lung  = Mask::from_elem(DIM, false);
        liver[[0, 0, 0]] = true;
        liver[[1, 0, 0]] = true;
        lung [[1, 0, 0]] = true;
        [("Liver".to_string(), liver), ("Lung_L".to_string(), lung)].into_iter().collect()
    }

    fn expected(d: f64, trep_h: f64, ab: f64, lambda: Frequency) -> f64 {
        let trep = trep_h * 3600.0 / std::f64::consts::LN_2;
        d * (1.0 + d * trep / (ab * (trep + 1.0 / units::hz_(lambda))))
    }

    #[rstest]
    fn tissue_precedence(lambda: Frequency) {
        let tissues = TissueParameters::default();
        let dose = DoseVolume::new(Volume::from_elem(DIM, 200.0), DoseUnit::Other("mGy".into()));
        let bed = BedCalculator::new(&tissues, lambda).compute(&dose, &masks()).unwrap();
        assert_eq!(bed.unit, dose.unit);
        assert_float_eq!(bed.data[[0, 0, 0]], expected(200.0, 1.5,  2_500.0, lambda), rmax <= 1e-12);
        assert_float_eq!(bed.data[[1, 0, 0]], expected(200.0, 1.5,  2_500.0, lambda), rmax <= 1e-12);
        assert_float_eq!(bed.data[[2, 0, 0]], expected(200.0, 1.5, 10_000.0, lambda), rmax <= 1e-12);
    }

    #[rstest]
    fn lung_when_not_liver(lambda: Frequency) {
        let tissues = TissueParameters::default();
        let mut masks = masks();
        masks.remove("Liver");
        let dose = DoseVolume::new(Volume::from_elem(DIM, 50.0), DoseUnit::Other("mGy".into()));
        let bed = BedCalculator::new(&tissues, lambda).compute(&dose, &masks).unwrap();
        assert_float_eq!(bed.data[[1, 0, 0]], expected(50.0, 1.5, 3_000.0, lambda), rmax <= 1e-12);
    }

    #[rstest]
    fn zero_dose_gives_zero_bed(lambda: Frequency) {
        let tissues = TissueParameters::default();
        let dose = DoseVolume::new(Volume::zeros(DIM), DoseUnit::GrayPerMegaBecquerel);
        let bed = BedCalculator::new(&tissues, lambda).compute(&dose, &masks()).unwrap();
        assert!(bed.data.iter().all(|&b| b == 0.0));
    }

    #[rstest]
    fn unit_normalization_round_trip(lambda: Frequency) {
        let tissues = TissueParameters::default();
        let calc = BedCalculator::new(&tissues, lambda);
        let data = Volume::from_shape_vec(DIM, vec![0.3, 1.2, 4.5]).unwrap();
        let in_gy_per_mci = DoseVolume::new(data.clone(), DoseUnit::GrayPerMilliCurie);
        let in_mgy        = DoseVolume::new(&data * (1000.0 / 37.0), DoseUnit::Other("mGy".into()));
        let via_unit = calc.compute(&in_gy_per_mci, &masks()).unwrap();
        let direct   = calc.compute(&in_mgy       , &masks()).unwrap();
        for (a, b) in via_unit.data.iter().zip(direct.data.iter()) {
            assert_float_eq!(*a, b / (1000.0 / 37.0), rmax <= 1e-12);
        }
    }

    #[rstest]
    fn mismatched_mask_is_rejected(lambda: Frequency) {
        let tissues = TissueParameters::default();
        let dose = DoseVolume::new(Volume::zeros([4, 1, 1]), DoseUnit::GrayPerMegaBecquerel);
        let result = BedCalculator::new(&tissues, lambda).compute(&dose, &masks());
        assert!(matches!(result, Err(Error::ShapeMismatch { .. })));
    }

    #[test]
    fn repair_time() {
        let class = default_liver();
        assert_float_eq!(class.repair_time_s(), 5400.0 / std::f64::consts::LN_2, rmax <= 1e-12);
    }
}
