//! Radionuclide identifiers and their decay constants

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use units::{day, hour, rate_from_half_life};

use crate::error::{Error, Result};
use crate::types::{Frequency, Time};

/// Radionuclide in canonical, number-first form: `177Lu`, `90Y`.
///
/// Parsing accepts the symbol-first form (`Lu177`, `Lu-177`) as well, and
/// drops any separators. The letter case of the symbol is preserved.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RadionuclideId(String);

impl RadionuclideId {
    pub fn as_str(&self) -> &str { &self.0 }

    /// Does `file_name` belong to this radionuclide's datasets?
    ///
    /// Exact, case-sensitive prefix match against the canonical form.
    pub fn is_prefix_of(&self, file_name: &str) -> bool { file_name.starts_with(&self.0) }
}

impl FromStr for RadionuclideId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let number: String = s.chars().filter(char::is_ascii_digit    ).collect();
        let symbol: String = s.chars().filter(char::is_ascii_alphabetic).collect();
        let only_separators = s.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ' '));
        if number.is_empty() || symbol.is_empty() || !only_separators {
            return Err(Error::InvalidNuclide(s.into()))
        }
        Ok(Self(number + &symbol))
    }
}

impl fmt::Display for RadionuclideId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

/// Half-lives of the supported radionuclides
#[derive(Clone, Debug)]
pub struct Registry {
    half_lives: BTreeMap<RadionuclideId, Time>,
}

impl Registry {

    pub fn new(half_lives: impl IntoIterator<Item = (RadionuclideId, Time)>) -> Self {
        Self { half_lives: half_lives.into_iter().collect() }
    }

    pub fn half_life(&self, id: &RadionuclideId) -> Result<Time> {
        self.half_lives
            .get(id)
            .copied()
            .ok_or_else(|| Error::UnsupportedNuclide(id.to_string()))
    }

    /// Decay constant `λ = ln 2 / T½`
    pub fn resolve(&self, id: &RadionuclideId) -> Result<Frequency> {
        self.half_life(id).map(rate_from_half_life)
    }

    /// Canonicalize `name` and look up its decay constant
    pub fn resolve_str(&self, name: &str) -> Result<Frequency> {
        self.resolve(&name.parse()?)
    }

    /// Add `id`, replacing any half-life it already had
    pub fn insert(&mut self, id: RadionuclideId, half_life: Time) {
        self.half_lives.insert(id, half_life);
    }
}

impl Default for Registry {
    fn default() -> Self {
        let known = [
            ( "89Sr",   day(50.5  )),
            ( "90Y" ,  hour(64.2  )),
            ("131I" ,   day( 8.02 )),
            ("153Sm",  hour(46.3  )),
            ("177Lu",   day( 6.647)),
            ("186Re",   day( 3.8  )),
            ("188Re",  hour(16.98 )),
        ];
        Self::new(known.into_iter().map(|(id, t)| (RadionuclideId(id.into()), t)))
    }
}
