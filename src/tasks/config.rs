/* ************************************************************************ **
** This file is part of densemat, and is licensed under EITHER the MIT      **
** license or the Apache 2.0 license, at your option.                       **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
** ************************************************************************ */

#![allow(non_snake_case)]

// NOTE: Please use the YamlRead trait when deserializing these types,
//       so that typos in config files get reported.

use crate::FailResult;

use ::densemat_matrix::Backend;
use ::std::io::Read;

/// Root settings object.
///
/// Every field has a default, so an empty file (or no file at all)
/// is a valid config.
#[derive(Serialize, Deserialize)]
#[derive(Debug, Clone, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct Settings {
    /// Size of the rayon thread pool.  Defaults to the number of CPUs.
    ///
    /// `DENSEMAT_NUM_THREADS` takes priority over this.
    #[serde(default)]
    pub threads: Option<usize>,

    /// Multiply backend under test (alongside the portable one).
    #[serde(default)]
    pub backend: Backend,

    #[serde(default)]
    pub check: Check,

    #[serde(default)]
    pub bench: Bench,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            threads: None,
            backend: Backend::default(),
            check: Check::default(),
            bench: Bench::default(),
        }
    }
}

#[derive(Serialize, Deserialize)]
#[derive(Debug, Clone, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct Check {
    /// Side length of the square matrices in the product check.
    #[serde(default="check__size")]
    pub size: usize,

    /// Number of randomly shaped products compared between backends.
    #[serde(default="check__random_trials")]
    pub random_trials: usize,
}
fn check__size() -> usize { 10 }
fn check__random_trials() -> usize { 20 }

impl Default for Check {
    fn default() -> Self {
        Check {
            size: check__size(),
            random_trials: check__random_trials(),
        }
    }
}

#[derive(Serialize, Deserialize)]
#[derive(Debug, Clone, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct Bench {
    /// Side lengths of the square matrices to multiply.
    #[serde(default="bench__sizes")]
    pub sizes: Vec<usize>,

    /// Number of timed products per size and backend.
    #[serde(default="bench__repeats")]
    pub repeats: u32,
}
fn bench__sizes() -> Vec<usize> { vec![64, 128, 256, 512] }
fn bench__repeats() -> u32 { 5 }

impl Default for Bench {
    fn default() -> Self {
        Bench {
            sizes: bench__sizes(),
            repeats: bench__repeats(),
        }
    }
}

impl Settings {
    /// Sanity checks that serde cannot express.
    pub fn validate(&self) -> FailResult<()> {
        if self.threads == Some(0) {
            bail!("threads: must be positive");
        }
        if self.check.size == 0 {
            bail!("check.size: must be positive");
        }
        if self.bench.repeats == 0 {
            bail!("bench.repeats: must be positive");
        }
        if let Some(&n) = self.bench.sizes.iter().find(|&&n| n == 0) {
            bail!("bench.sizes: invalid size {}", n);
        }
        Ok(())
    }
}

/// Alternative to `serde_yaml::from_reader` that warns about unrecognized
/// keys through `serde_ignored`.
pub trait YamlRead: for<'de> ::serde::Deserialize<'de> {
    fn from_reader(mut r: impl Read) -> FailResult<Self>
    { YamlRead::from_dyn_reader(&mut r) }

    fn from_dyn_reader(r: &mut dyn Read) -> FailResult<Self> {
        // First, parse to a form that we can read from multiple times.
        let mut s = String::new();
        r.read_to_string(&mut s)?;

        // an empty document is treated as an empty mapping
        let value = match s.trim().is_empty() {
            true => ::serde_yaml::Value::Mapping(Default::default()),
            false => match ::serde_yaml::from_str::<::serde_yaml::Value>(&s)? {
                ::serde_yaml::Value::Null => ::serde_yaml::Value::Mapping(Default::default()),
                value => value,
            },
        };

        let result = ::serde_ignored::deserialize(
            value,
            |path| warn!("Unused config item (possible typo?): {}", path),
        );
        match result {
            Ok(out) => Ok(out),
            Err(_) => {
                // deserializing through a Value loses all of the detail from the
                // error message, so re-parse from the string for a better one
                match ::serde_yaml::from_str::<Self>(&s) {
                    Err(e) => Err(e.into()),
                    Ok(_) => bail!("config could not be read, but no error was produced when re-parsing it"),
                }
            },
        }
    }
}

impl YamlRead for Settings {}

#[cfg(test)]
mod tests {
    use super::*;
    use ::pretty_assertions::assert_eq;

    #[test]
    fn empty_config_is_default() {
        assert_eq!(Settings::from_reader("".as_bytes()).unwrap(), Settings::default());
        assert_eq!(Settings::from_reader("{}".as_bytes()).unwrap(), Settings::default());
    }

    #[test]
    fn full_config() {
        let yaml = "\
threads: 3
backend: portable
check:
  size: 16
  random-trials: 4
bench:
  sizes: [8, 32]
  repeats: 2
";
        let settings = Settings::from_reader(yaml.as_bytes()).unwrap();
        assert_eq!(settings, Settings {
            threads: Some(3),
            backend: Backend::Portable,
            check: Check { size: 16, random_trials: 4 },
            bench: Bench { sizes: vec![8, 32], repeats: 2 },
        });
        settings.validate().unwrap();
    }

    #[test]
    fn partial_sections_are_filled() {
        let settings = Settings::from_reader("check: {size: 5}".as_bytes()).unwrap();
        assert_eq!(settings.check, Check { size: 5, random_trials: check__random_trials() });
        assert_eq!(settings.bench, Bench::default());
    }

    #[test]
    fn unknown_keys_are_tolerated() {
        let settings = Settings::from_reader("thread: 4\nbackend: blas".as_bytes()).unwrap();
        assert_eq!(settings.threads, None);
        assert_eq!(settings.backend, Backend::Blas);
    }

    #[test]
    fn bad_values_are_errors() {
        assert!(Settings::from_reader("backend: cuda".as_bytes()).is_err());
        assert!(Settings::from_reader("check: {size: -1}".as_bytes()).is_err());

        let settings = Settings::from_reader("bench: {sizes: [4, 0]}".as_bytes()).unwrap();
        assert!(settings.validate().is_err());
        let settings = Settings::from_reader("threads: 0".as_bytes()).unwrap();
        assert!(settings.validate().is_err());
    }
}
