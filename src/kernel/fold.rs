//! Folding of simulated dose boxes into single-octant kernels.
//!
//! Simulation output covers a full rectangular box of voxels around the
//! source. Each non-negative offset of the octant kernel averages the two
//! samples mirrored through the box centre.

use itertools::{Itertools, MinMaxResult};
use ndarray::Array3;

use crate::types::{BoxDim, Index3};

/// Index of the source voxel along an axis whose samples span `min..=max`.
///
/// This is `max - floor((max - min) / 2)`, which is what anchors the
/// reference kernels' octant; it is *not* the geometric midpoint when the
/// range is odd: `centre(0, 3) == 2`, not 1.
pub fn centre(min: usize, max: usize) -> usize {
    max - half_range(min, max)
}

/// Largest non-negative offset reachable on both sides of `centre(min, max)`
pub fn half_range(min: usize, max: usize) -> usize {
    (max - min) / 2
}

/// One scored voxel of a simulation
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sample {
    pub index: Index3,
    pub dose: f64,
    /// Standard deviation of `dose`
    pub sigma: f64,
}

/// Dose and uncertainty over the full simulated box, indexed by absolute
/// voxel index. Cells with no sample hold zero.
#[derive(Clone, Debug)]
pub struct RawBox {
    dose : Array3<f64>,
    sigma: Array3<f64>,
    min: Index3,
    max: Index3,
}

/// Octant kernel produced by [`RawBox::fold`]
#[derive(Clone, Debug)]
pub struct Folded {
    pub dose : Array3<f64>,
    pub sigma: Array3<f64>,
}

impl RawBox {

    /// `None` if there are no samples
    pub fn from_samples(samples: &[Sample]) -> Option<Self> {
        let mut min = [0; 3];
        let mut max = [0; 3];
        for axis in 0..3 {
            match samples.iter().map(|s| s.index[axis]).minmax() {
                MinMaxResult::NoElements       => return None,
                MinMaxResult::OneElement(i)    => { min[axis] = i; max[axis] = i; }
                MinMaxResult::MinMax(lo, hi)   => { min[axis] = lo; max[axis] = hi; }
            }
        }
        let shape = (max[0] + 1, max[1] + 1, max[2] + 1);
        let mut dose  = Array3::zeros(shape);
        let mut sigma = Array3::zeros(shape);
        for &Sample { index, dose: d, sigma: s } in samples {
            dose [index] = d;
            sigma[index] = s;
        }
        Some(Self { dose, sigma, min, max })
    }

    pub fn centre(&self) -> Index3 {
        [0, 1, 2].map(|axis| centre(self.min[axis], self.max[axis]))
    }

    /// Shape of the octant kernel which `fold` will produce
    pub fn folded_dim(&self) -> BoxDim {
        [0, 1, 2].map(|axis| half_range(self.min[axis], self.max[axis]) + 1)
    }

    /// Average each pair of samples mirrored through the centre: the mean of
    /// the doses, and the quadrature mean `sqrt((σ₊² + σ₋²) / 2)` of their
    /// uncertainties.
    pub fn fold(&self) -> Folded {
        let [cx, cy, cz] = self.centre();
        let [nx, ny, nz] = self.folded_dim();
        let plus  = |(ix, iy, iz): (usize, usize, usize)| [cx + ix, cy + iy, cz + iz];
        let minus = |(ix, iy, iz): (usize, usize, usize)| [cx - ix, cy - iy, cz - iz];
        let dose = Array3::from_shape_fn((nx, ny, nz), |i| {
            (self.dose[plus(i)] + self.dose[minus(i)]) / 2.0
        });
        let sigma = Array3::from_shape_fn((nx, ny, nz), |i| {
            let (p, m) = (self.sigma[plus(i)], self.sigma[minus(i)]);
            ((p * p + m * m) / 2.0).sqrt()
        });
        Folded { dose, sigma }
    }
}
