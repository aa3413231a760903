/// Quantities which are simply type aliases for `f64` rather than having an
/// implementation as a `uom` `Quantity`.
///
/// Mostly they are mixtures of several units which are only meaningful as
/// tabulated, like S-values in `mGy/(MBq s)`.

/// S-value in mGy/(MBq s)
pub type SValuef64      = f64;
/// Cumulated activity in MBq s
pub type Activityf64    = f64;
/// Percentage of a region's volume
pub type Percentf64     = f64;
