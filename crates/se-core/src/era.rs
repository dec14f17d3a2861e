//! Experiment eras and the era-keyed extrapolation-factor policy.

use std::str::FromStr;

use crate::error::Error;

/// Data-taking era of the analyzed samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Era {
    /// 2016 data-taking period.
    Y2016,
    /// 2017 data-taking period.
    Y2017,
    /// 2018 data-taking period.
    Y2018,
}

impl Era {
    /// Same-sign to opposite-sign transfer factor for the QCD estimation.
    pub fn extrapolation_factor(self) -> f64 {
        match self {
            Era::Y2016 => 1.17,
            Era::Y2017 | Era::Y2018 => 1.0,
        }
    }
}

impl FromStr for Era {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "2016" => Ok(Era::Y2016),
            "2017" => Ok(Era::Y2017),
            "2018" => Ok(Era::Y2018),
            other => Err(Error::Config(format!("unknown era: {}", other))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extrapolation_factor_policy() {
        assert_eq!("2016".parse::<Era>().unwrap().extrapolation_factor(), 1.17);
        assert_eq!("2017".parse::<Era>().unwrap().extrapolation_factor(), 1.0);
        assert_eq!("2018".parse::<Era>().unwrap().extrapolation_factor(), 1.0);
    }

    #[test]
    fn unknown_era_is_fatal() {
        assert!("2015".parse::<Era>().is_err());
    }
}
