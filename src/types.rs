use std::{
    fmt::{
        Debug,
        Display,
    },
    str::FromStr,
};

use serde::{
    Deserialize,
    Serialize,
};

/// Physical height of a tank in meters.
///
/// Only finite values are accepted. Heights at or below the sensor's dead
/// zone are valid and always read as full.
#[derive(Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct TankHeight(f64);

impl TankHeight {
    /// 20-lb propane tank
    pub const DEFAULT: Self = Self(0.254);

    pub fn from_meters(meters: f64) -> Option<Self> {
        meters.is_finite().then_some(Self(meters))
    }

    pub fn meters(&self) -> f64 {
        self.0
    }
}

impl Default for TankHeight {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl Display for TankHeight {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Debug for TankHeight {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TankHeight({} m)", self.0)
    }
}

impl FromStr for TankHeight {
    type Err = TankHeightFromStrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || {
            TankHeightFromStrError {
                input: s.to_owned(),
            }
        };
        let meters: f64 = s.trim().parse().map_err(|_| err())?;
        Self::from_meters(meters).ok_or_else(err)
    }
}

#[derive(Clone, Debug, thiserror::Error)]
#[error("Invalid tank height: {input}")]
pub struct TankHeightFromStrError {
    pub input: String,
}

impl TryFrom<f64> for TankHeight {
    type Error = TankHeightFromStrError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::from_meters(value).ok_or_else(|| {
            TankHeightFromStrError {
                input: value.to_string(),
            }
        })
    }
}

impl From<TankHeight> for f64 {
    fn from(value: TankHeight) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use crate::types::TankHeight;

    #[test]
    fn it_parses_tank_heights() {
        assert_eq!("0.254".parse::<TankHeight>().unwrap(), TankHeight::DEFAULT);
        assert_eq!(" 1.5 ".parse::<TankHeight>().unwrap().meters(), 1.5);
        assert_eq!("-0.1".parse::<TankHeight>().unwrap().meters(), -0.1);
    }

    #[test]
    fn it_rejects_non_finite_heights() {
        assert!("abc".parse::<TankHeight>().is_err());
        assert!("NaN".parse::<TankHeight>().is_err());
        assert!("inf".parse::<TankHeight>().is_err());
        assert!(TankHeight::from_meters(f64::NAN).is_none());
    }

    #[test]
    fn it_deserializes_from_a_number() {
        let height: TankHeight = serde_json::from_str("0.5").unwrap();
        assert_eq!(height.meters(), 0.5);
        assert_eq!(serde_json::to_string(&height).unwrap(), "0.5");
    }
}
