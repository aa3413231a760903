use ordered_float::OrderedFloat;

#[allow(clippy::many_single_char_names)]
pub fn parse_triplet<T: std::str::FromStr>(s: &str) -> Result<(T,T,T), <T as std::str::FromStr>::Err> {
    let v = s.split(',').collect::<Vec<_>>();
    assert!(v.len() == 3);
    let x = v[0].trim().parse()?;
    let y = v[1].trim().parse()?;
    let z = v[2].trim().parse()?;
    Ok((x, y, z))
}

/// Piecewise-linear interpolation of the points `(xs[i], ys[i])` at `x`.
///
/// `xs` must be sorted in ascending order. Outside `xs[0]..=xs[n-1]` the
/// value is clamped to the nearest end point rather than extrapolated.
/// Returns `None` if there are no points.
pub fn interp(x: f64, xs: &[f64], ys: &[f64]) -> Option<f64> {
    assert_eq!(xs.len(), ys.len(), "interp: xs and ys differ in length");
    let (&first, &last) = (xs.first()?, xs.last()?);
    if x <= first { return ys.first().copied() }
    if x >= last  { return ys.last ().copied() }
    // First point strictly beyond x; 0 < hi < n because of the clamps above
    let hi = xs.partition_point(|&xi| xi <= x);
    let lo = hi - 1;
    let (x0, x1, y0, y1) = (xs[lo], xs[hi], ys[lo], ys[hi]);
    if x1 == x0 { return Some(y1) }
    Some(y0 + (x - x0) * (y1 - y0) / (x1 - x0))
}

/// Round `x` to `decimals` decimal places, as a totally-ordered key
pub fn rounded(x: f64, decimals: i32) -> OrderedFloat<f64> {
    let scale = 10_f64.powi(decimals);
    OrderedFloat((x * scale).round() / scale)
}

pub mod timing {

    use std::time::Instant;
    use std::io::Write;

    pub struct Progress {
        previous: Instant,
    }

    impl Progress {

        #[allow(clippy::new_without_default)]
        pub fn new() -> Self { Self { previous: Instant::now() } }

        /// Print message, append ellipsis, flush stderr, stay on same line, start timer.
        pub fn start(&mut self, message: &str) {
            eprint!("{message} ... ");
            std::io::stderr().flush().ok();
            self.start_timer();
        }

        // Print time elapsed since last start or done
        pub fn done(&mut self) {
            eprintln!("{} ms", self.previous.elapsed().as_millis());
            self.start_timer();
        }

        fn start_timer(&mut self) { self.previous = Instant::now() }
    }
}


#[cfg(test)]
mod test_interp {
    use super::*;
    use rstest::rstest;
    use float_eq::assert_float_eq;

    const XS: [f64; 3] = [2.21, 5.0, 9.28];
    const YS: [f64; 3] = [9.0, 3.0, 1.0];

    #[rstest(/**/ x  , expected,
             case(2.21, 9.0),
             case(5.0 , 3.0),
             case(9.28, 1.0),
             case(1.0 , 9.0), // clamped below
             case(0.0 , 9.0),
             case(20.0, 1.0), // clamped above
             case(7.14, 2.0), // midpoint of second segment
    )]
    fn hand_picked(x: f64, expected: f64) {
        assert_float_eq!(interp(x, &XS, &YS).unwrap(), expected, abs <= 1e-12);
    }

    #[test]
    fn degenerate_inputs() {
        assert_eq!(interp(1.0, &[], &[]), None);
        assert_eq!(interp(0.0, &[3.0], &[7.0]), Some(7.0));
        assert_eq!(interp(9.0, &[3.0], &[7.0]), Some(7.0));
        assert_eq!(interp(3.0, &[3.0, 3.0], &[1.0, 2.0]), Some(1.0));
    }

    #[rstest(/**/ x    , expected,
             case(2.2104, 2.21),
             case(2.2106, 2.211),
             case(5.0   , 5.0),
    )]
    fn rounding(x: f64, expected: f64) {
        assert_eq!(rounded(x, 3), rounded(expected, 3));
    }

    use proptest::prelude::*;

    proptest! {
        #[test]
        fn interpolated_values_lie_between_neighbours(
            x in 0.0..12.0_f64,
            ys in proptest::array::uniform3(-100.0..100.0_f64),
        ) {
            let y = interp(x, &XS, &ys).unwrap();
            let i = XS.partition_point(|&xi| xi <= x).clamp(1, 2);
            let (lo, hi) = (ys[i - 1].min(ys[i]), ys[i - 1].max(ys[i]));
            prop_assert!(y >= lo - 1e-9 && y <= hi + 1e-9);
        }
    }

    #[test]
    fn parse_triplet_of_offsets() {
        assert_eq!(parse_triplet::<usize>("0, 1,2"), Ok((0, 1, 2)));
        assert!(parse_triplet::<usize>("0,a,2").is_err());
    }
}
