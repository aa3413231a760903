//! Absorbed-dose volumes and the quantities derived from them

pub mod bed;
pub mod dvh;

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::types::{BoxDim, Mask, Masks, Volume, MBQ_PER_MCI, MGY_PER_GY};

/// Unit of a dose volume, as written in its DoseUnits attribute
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DoseUnit {
    MilliGrayPerMilliCurie,
    GrayPerMegaBecquerel,
    GrayPerMilliCurie,
    /// Any other unit is taken to be mGy-equivalent already
    Other(String),
}

impl DoseUnit {
    /// Factor which converts values in this unit into mGy-equivalent ones
    pub fn to_mgy_equivalent(&self) -> f64 {
        match self {
            DoseUnit::MilliGrayPerMilliCurie => 1.0 / MBQ_PER_MCI,
            DoseUnit::GrayPerMegaBecquerel   => MGY_PER_GY,
            DoseUnit::GrayPerMilliCurie      => MGY_PER_GY / MBQ_PER_MCI,
            DoseUnit::Other(_)               => 1.0,
        }
    }
}

impl FromStr for DoseUnit {
    type Err = std::convert::Infallible;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(match s.trim() {
            "mGy/mCi" => DoseUnit::MilliGrayPerMilliCurie,
            "Gy/MBq"  => DoseUnit::GrayPerMegaBecquerel,
            "Gy/mCi"  => DoseUnit::GrayPerMilliCurie,
            other     => DoseUnit::Other(other.into()),
        })
    }
}

impl fmt::Display for DoseUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DoseUnit::MilliGrayPerMilliCurie => "mGy/mCi",
            DoseUnit::GrayPerMegaBecquerel   => "Gy/MBq",
            DoseUnit::GrayPerMilliCurie      => "Gy/mCi",
            DoseUnit::Other(s)               => s,
        })
    }
}

/// Dose per voxel, in `unit`
#[derive(Clone, Debug, PartialEq)]
pub struct DoseVolume {
    pub data: Volume<f64>,
    pub unit: DoseUnit,
}

impl DoseVolume {
    pub fn new(data: Volume<f64>, unit: DoseUnit) -> Self { Self { data, unit } }

    pub fn dim(&self) -> BoxDim {
        let (x, y, z) = self.data.dim();
        [x, y, z]
    }

    /// Values converted into mGy-equivalent units
    pub fn normalized(&self) -> Volume<f64> {
        &self.data * self.unit.to_mgy_equivalent()
    }

    /// Volume in `unit` holding `mgy_equivalent` converted back into it
    pub fn from_normalized(mgy_equivalent: Volume<f64>, unit: DoseUnit) -> Self {
        let data = mgy_equivalent / unit.to_mgy_equivalent();
        Self { data, unit }
    }
}

/// Ensure that `mask` covers the same voxels as a volume of shape `expected`
pub fn check_shape(name: &str, mask: &Mask, expected: BoxDim) -> Result<()> {
    let (x, y, z) = mask.dim();
    if [x, y, z] == expected { return Ok(()) }
    Err(Error::ShapeMismatch { name: name.into(), expected, found: [x, y, z] })
}

/// Union of the masks called `names`. Names absent from `masks` are
/// skipped with a warning.
pub fn union_of(masks: &Masks, names: &[String], dim: BoxDim) -> Result<Mask> {
    let mut union = Mask::from_elem(dim, false);
    for name in names {
        match masks.get(name) {
            Some(mask) => {
                check_shape(name, mask, dim)?;
                ndarray::Zip::from(&mut union).and(mask).for_each(|u, &m| *u |= m);
            }
            None => log::warn!("no structure called `{name}`: treating it as empty"),
        }
    }
    Ok(union)
}


#[cfg(test)]
mod tests {
    use super::*;
    use float_eq::assert_float_eq;
    use rstest::rstest;

    #[rstest(/**/ text     , factor,
             case("mGy/mCi", 1.0 / 37.0   ),
             case("Gy/MBq" , 1000.0       ),
             case("Gy/mCi" , 1000.0 / 37.0),
             case("mGy/MBq", 1.0          ),
             case("Gy"     , 1.0          ),
    )]
    fn unit_factors(text: &str, factor: f64) {
        let unit: DoseUnit = text.parse().unwrap();
        assert_float_eq!(unit.to_mgy_equivalent(), factor, rmax <= 1e-15);
        assert_eq!(unit.to_string(), text);
    }

    #[test]
    fn normalization_round_trip() {
        let data = Volume::from_shape_fn((2, 2, 2), |(x, y, z)| (x + 2 * y + 4 * z) as f64);
        let dose = DoseVolume::new(data.clone(), DoseUnit::GrayPerMilliCurie);
        let mgy = dose.normalized();
        assert_float_eq!(mgy[[1, 1, 1]], 7.0 * 1000.0 / 37.0, rmax <= 1e-12);
        let back = DoseVolume::from_normalized(mgy, DoseUnit::GrayPerMilliCurie);
        for (a, b) in back.data.iter().zip(data.iter()) { assert_float_eq!(a, b, rmax <= 1e-12); }
    }

    #[test]
    fn union_of_masks() {
        let mut left  = Mask::from_elem([2, 1, 1], false);
        let mut right = Mask::from_elem([2, 1, 1], false);
        left [[0, 0, 0]] = true;
        right[[1, 0, 0]] = true;
        let masks: Masks = [("Lung_L".to_string(), left), ("Lung_R".to_string(), right)].into_iter().collect();
        let names = ["Lung_L".to_string(), "Lung_R".to_string(), "Lung_X".to_string()];
        let union = union_of(&masks, &names, [2, 1, 1]).unwrap();
        assert!(union.iter().all(|&x| x));
        assert!(matches!(union_of(&masks, &names, [3, 1, 1]), Err(Error::ShapeMismatch { .. })));
    }
}
