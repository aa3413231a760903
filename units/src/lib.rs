pub mod todo;

pub use uom;
pub use uom::si::Quantity;
pub use uom::si::f64::{Length, Time, Frequency};

mod units {
  pub use uom::si::{length   ::{millimeter, centimeter},
                    time     ::{second, minute, hour, day},
                    frequency::hertz,
  };
}
// Making values from float literals seems to be very long-winded, so provide
// some pithily-named convenience constructors.

/// Generate a function called NAME which returns QUANTITY by interpreting its
/// argument as UNIT
///
/// wrap!(NAME QUANTITY UNIT);
macro_rules! wrap {
  ($name:ident $quantity:ident $unit:ident ) => {
    pub fn $name(x: f64) -> $quantity { $quantity::new::<units::$unit>(x) }
  };
}

wrap!(mm     Length         millimeter);
wrap!(cm     Length         centimeter);
wrap!(s      Time               second);
wrap!(minute Time               minute);
wrap!(hour   Time                 hour);
wrap!(day    Time                  day);
wrap!(hz     Frequency           hertz);

// Reverse direction of the above.
pub fn mm_   (x: Length   ) -> f64 { x.get::<units::millimeter>() }
pub fn s_    (x: Time     ) -> f64 { x.get::<units::second>    () }
pub fn hour_ (x: Time     ) -> f64 { x.get::<units::hour>      () }
pub fn hz_   (x: Frequency) -> f64 { x.get::<units::hertz>     () }

/// Decay (or repair) rate corresponding to `half_life`: `ln 2 / T½`
pub fn rate_from_half_life(half_life: Time) -> Frequency {
  hz(std::f64::consts::LN_2 / s_(half_life))
}

/// Mean lifetime corresponding to `half_life`: `T½ / ln 2`
pub fn mean_life_from_half_life(half_life: Time) -> Time {
  s(s_(half_life) / std::f64::consts::LN_2)
}

#[macro_export]
macro_rules! assert_uom_eq {
  ($unit:ident, $lhs:expr, $rhs:expr, $algo:ident <= $tol:expr) => {
    $crate::float_eq::assert_float_eq!($lhs.get::<$unit>(), $rhs.get::<$unit>(), $algo <= $tol)
  };
}

#[doc(hidden)]
pub use float_eq;
