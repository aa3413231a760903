//! Cumulative dose-volume histograms

use crate::error::{Error, Result};
use crate::types::{Mask, Masks, Percentf64, Volume};
use super::check_shape;

pub const DEFAULT_BINS: usize = 2000;

/// Percentage of a region's dosed voxels receiving more than each threshold
#[derive(Clone, Debug, PartialEq)]
pub struct Dvh {
    /// Thresholds are `h * bin_width` for `h` in `0..volume_percent.len()`
    pub bin_width: f64,
    pub volume_percent: Vec<Percentf64>,
}

impl Dvh {
    /// Thresholds span `0..round(max(dose))`, where the maximum is taken over
    /// the whole volume, not just the region, and halves round to even.
    pub fn build(dose: &Volume<f64>, mask: &Mask, bins: usize) -> Result<Self> {
        Self::build_named("region", dose, mask, bins)
    }

    fn build_named(name: &str, dose: &Volume<f64>, mask: &Mask, bins: usize) -> Result<Self> {
        if bins == 0 { return Err(Error::NoBins) }
        let (x, y, z) = dose.dim();
        check_shape(name, mask, [x, y, z])?;

        let max = dose.iter().copied().fold(f64::NEG_INFINITY, f64::max).round_ties_even();
        let mut dosed: Vec<f64> = dose.iter().zip(mask)
            .filter_map(|(&d, &m)| (m && d > 0.0).then_some(d))
            .collect();
        if dosed.is_empty() { return Err(Error::EmptyRegion(name.into())) }
        dosed.sort_unstable_by(f64::total_cmp);

        let n = dosed.len() as f64;
        let bin_width = max / bins as f64;
        let volume_percent = (0..bins)
            .map(|h| {
                let threshold = h as f64 * bin_width;
                let above = dosed.len() - dosed.partition_point(|&d| d <= threshold);
                above as f64 / n * 100.0
            })
            .collect();
        Ok(Self { bin_width, volume_percent })
    }

    /// DVHs of the regions called `rois`, in the given order. `each` is
    /// called after every region, e.g. to report progress.
    pub fn for_rois(
        dose: &Volume<f64>,
        masks: &Masks,
        rois: &[String],
        bins: usize,
        mut each: impl FnMut(&str),
    ) -> Result<Vec<(String, Dvh)>> {
        rois.iter()
            .map(|roi| {
                let mask = masks.get(roi).ok_or_else(|| Error::MissingStructure(roi.clone()))?;
                let dvh = Self::build_named(roi, dose, mask, bins)?;
                log::debug!("DVH of `{roi}`: {} bins of {:.3}", bins, dvh.bin_width);
                each(roi);
                Ok((roi.clone(), dvh))
            })
            .collect()
    }

    /// `(threshold, percent)` pairs
    pub fn points(&self) -> impl Iterator<Item = (f64, Percentf64)> + '_ {
        self.volume_percent.iter().enumerate()
            .map(|(h, &v)| (h as f64 * self.bin_width, v))
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use float_eq::assert_float_eq;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn line(doses: &[f64]) -> Volume<f64> {
        Volume::from_shape_vec([doses.len(), 1, 1], doses.to_vec()).unwrap()
    }

    #[test]
    fn small_histogram() {
        let dose = line(&[0.0, 1.0, 2.0, 3.0, 4.0]);
        let mask = Mask::from_elem([5, 1, 1], true);
        let dvh = Dvh::build(&dose, &mask, 4).unwrap();
        assert_float_eq!(dvh.bin_width, 1.0, abs <= 1e-15);
        assert_eq!(dvh.volume_percent, vec![100.0, 75.0, 50.0, 25.0]);
    }

    #[test]
    fn maximum_comes_from_whole_volume() {
        let dose = line(&[2.0, 4.0, 10.0]);
        let mut mask = Mask::from_elem([3, 1, 1], true);
        mask[[2, 0, 0]] = false;
        let dvh = Dvh::build(&dose, &mask, 5).unwrap();
        assert_float_eq!(dvh.bin_width, 2.0, abs <= 1e-15);
        // Thresholds 0, 2, 4, 6, 8
        assert_eq!(dvh.volume_percent, vec![100.0, 50.0, 0.0, 0.0, 0.0]);
    }

    #[rstest(/**/ max, bin_width,
             case(2.5, 0.4), // ties go to the even neighbour
             case(3.5, 0.8),
             case(2.4, 0.4),
             case(2.6, 0.6),
    )]
    fn maximum_rounds_half_to_even(max: f64, bin_width: f64) {
        let dose = line(&[max, 1.0]);
        let mask = Mask::from_elem([2, 1, 1], true);
        let dvh = Dvh::build(&dose, &mask, 5).unwrap();
        assert_float_eq!(dvh.bin_width, bin_width, abs <= 1e-12);
    }

    #[test]
    fn tie_at_half_gives_narrow_bins() {
        let dvh = Dvh::build(&line(&[2.5, 1.0]), &Mask::from_elem([2, 1, 1], true), 5).unwrap();
        // Thresholds 0, 0.4, 0.8, 1.2, 1.6
        assert_eq!(dvh.volume_percent, vec![100.0, 100.0, 100.0, 50.0, 50.0]);
    }

    #[test]
    fn rejects_degenerate_input() {
        let dose = line(&[0.0, 3.0]);
        let mut mask = Mask::from_elem([2, 1, 1], false);
        assert!(matches!(Dvh::build(&dose, &mask, 0), Err(Error::NoBins)));
        mask[[0, 0, 0]] = true;
        assert!(matches!(Dvh::build(&dose, &mask, 10), Err(Error::EmptyRegion(_))));
        assert!(matches!(Dvh::build(&dose, &Mask::from_elem([3, 1, 1], true), 10),
                         Err(Error::ShapeMismatch { .. })));
    }

    #[test]
    fn several_rois() {
        let dose = line(&[1.0, 2.0, 3.0, 4.0]);
        let mut liver = Mask::from_elem([4, 1, 1], false);
        liver[[3, 0, 0]] = true;
        let masks: Masks = [("Liver".to_string(), liver), ("Body".to_string(), Mask::from_elem([4, 1, 1], true))]
            .into_iter().collect();
        let mut seen = vec![];
        let rois = ["Body".to_string(), "Liver".to_string()];
        let dvhs = Dvh::for_rois(&dose, &masks, &rois, DEFAULT_BINS, |r| seen.push(r.to_string())).unwrap();
        assert_eq!(seen, vec!["Body", "Liver"]);
        assert_eq!(dvhs[1].1.volume_percent[DEFAULT_BINS - 1], 100.0);
        assert!(matches!(Dvh::for_rois(&dose, &masks, &["Lung_L".into()], 10, |_| ()),
                         Err(Error::MissingStructure(n)) if n == "Lung_L"));
    }

    use proptest::prelude::*;

    proptest! {
        #[test]
        fn curve_is_non_increasing_from_one_hundred(
            doses in proptest::collection::vec(0.0..50.0_f64, 1..40),
            bins  in 1..200_usize,
        ) {
            let mut doses = doses;
            doses[0] += 1.0;
            let dose = line(&doses);
            let mask = Mask::from_elem([doses.len(), 1, 1], true);
            let dvh = Dvh::build(&dose, &mask, bins).unwrap();
            prop_assert_eq!(dvh.volume_percent[0], 100.0);
            for w in dvh.volume_percent.windows(2) { prop_assert!(w[1] <= w[0]); }
        }
    }
}
