//! Configuration file parser for half-lives and tissue parameters

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::dose::bed::TissueParameters;
use crate::error::{Error, Result};
use crate::nuclide::Registry;
use crate::types::Time;
use super::deserialize_uom_map;

#[derive(Deserialize, Debug, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {

    /// Extra or overriding half-lives, keyed by radionuclide in any
    /// accepted spelling
    #[serde(default)]
    #[serde(deserialize_with = "deserialize_uom_map")]
    pub half_lives: BTreeMap<String, Time>,

    #[serde(default)]
    pub tissues: TissueParameters,
}

impl Config {
    /// The built-in half-lives, extended and overridden by `half_lives`
    pub fn registry(&self) -> Result<Registry> { Registry::try_from(self) }
}

impl TryFrom<&Config> for Registry {
    type Error = Error;
    fn try_from(config: &Config) -> Result<Self> {
        let mut registry = Registry::default();
        for (name, &half_life) in &config.half_lives {
            registry.insert(name.parse()?, half_life);
        }
        Ok(registry)
    }
}

pub fn read_config_file(path: &Path) -> Result<Config> {
    let config = fs::read_to_string(path).map_err(|_| Error::MissingPath(path.into()))?;
    let config = toml::from_str(&config)?;
    log::info!("Read configuration from {}", path.display());
    Ok(config)
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::dose::bed::TissueClass;
    use float_eq::assert_float_eq;
    use units::{day, hour, minute};

    // ----- Test an example on-disk config file -----------------------------------------
    #[test]
    fn test_config_file() {
        let config = read_config_file("radiobiology.toml".as_ref()).unwrap();
        assert_eq!(config.tissues, TissueParameters::default());
        assert_eq!(config.half_lives["177Lu"], day(6.647));
    }

    // ----- Some helpers to make the tests more concise ---------------------------------
    //  ---  Parse string as TOML  -------------------------
    fn parse<'d, D: Deserialize<'d>>(input: &'d str) -> D {
        toml::from_str(input).unwrap()
    }
    //  ---  Parse string as TOML, with explicit error reporting -------------------------
    fn parse_carefully<'d, D: Deserialize<'d>>(input: &'d str) -> std::result::Result<D, toml::de::Error> {
        toml::from_str(input)
    }
    //  ---  Macro for concise assertions about values of parsed fields -------------------
    macro_rules! check {
        ($type:ident($text:expr).$field:ident = $expected:expr) => {
            let config: $type = parse::<$type>($text);
            println!("DESERIALIZED: {config:?}");
            assert_eq!(config.$field, $expected);
        };
        ($type:ident($text:expr) fields: $($field:ident = $expected:expr);+$(;)?) => {
            let config: $type = parse::<$type>($text);
            println!("DESERIALIZED: {config:?}");
            $(assert_eq!(config.$field, $expected);)*
        }
    }
    // ----- Test deserializing of individual aspects of the Config type ----------------
    #[test]
    fn config_empty() {
        check!{Config("") fields:
               half_lives = BTreeMap::new();
               tissues    = TissueParameters::default();
        }
    }

    #[test]
    fn config_half_lives() {
        check!{Config(r#"
                 [half_lives]
                 "Tb-161" = "6.89 d"
                 "90Y"    = "64 h"
               "#).half_lives = [("Tb-161".to_string(), day(6.89)),
                                 ("90Y"   .to_string(), hour(64.0))].into_iter().collect()
        }
    }

    #[test]
    fn config_tissue_class() {
        check!{TissueClass(r#"
                 structures = ["Liver", "Liver_2"]
                 alpha_beta = 2000.0
                 repair_half_time = "90 min"
               "#) fields:
               structures       = vec!["Liver".to_string(), "Liver_2".to_string()];
               alpha_beta       = 2000.0;
               repair_half_time = minute(90.0);
        }
    }

    #[test]
    fn config_partial_tissues() {
        let c: Config = parse(r#"
                 [tissues.lung]
                 structures = ["Lungs"]
                 alpha_beta = 3500.0
                 repair_half_time = "2 h"
              "#);
        let defaults = TissueParameters::default();
        assert_eq!(c.tissues.liver  , defaults.liver  );
        assert_eq!(c.tissues.default, defaults.default);
        assert_eq!(c.tissues.lung.structures, vec!["Lungs".to_string()]);
        assert_float_eq!(units::hour_(c.tissues.lung.repair_half_time), 2.0, rmax <= 1e-12);
    }

    // ----- Make sure that unknown fields are not accepted -----------------------------
    #[test]
    #[should_panic]
    fn config_reject_unknown_field() {
        parse::<Config>("unknown_field = 666");
    }

    #[test]
    fn config_reject_unitless_time() {
        assert!(parse_carefully::<TissueClass>(r#"
                 alpha_beta = 2000.0
                 repair_half_time = 1.5
               "#).is_err());
        assert!(parse_carefully::<Config>(r#"
                 [half_lives]
                 "177Lu" = "6.647 parsecs"
               "#).is_err());
    }

    // ----- The registry built from a configuration ------------------------------------
    #[test]
    fn registry_merges_defaults() {
        let c: Config = parse(r#"
                 [half_lives]
                 "Tb161" = "6.89 d"
                 "Y-90"  = "1 h"
              "#);
        let registry = c.registry().unwrap();
        assert_eq!(registry.half_life(&"161Tb".parse().unwrap()).unwrap(), day(6.89));
        assert_eq!(registry.half_life(&"90Y"  .parse().unwrap()).unwrap(), hour(1.0));
        assert_eq!(registry.half_life(&"177Lu".parse().unwrap()).unwrap(), day(6.647));
    }

    #[test]
    fn registry_rejects_malformed_nuclide() {
        let c: Config = parse(r#"
                 [half_lives]
                 "Lutetium" = "6.647 d"
              "#);
        assert!(matches!(c.registry(), Err(Error::InvalidNuclide(_))));
    }
}
