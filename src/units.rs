//! Distance and duration units used when reporting summaries.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceUnit {
    #[default]
    Km,
    M,
    Mi,
    Nmi,
    Ft,
}

impl DistanceUnit {
    /// Number of this unit in one kilometre.
    pub fn per_km(self) -> f64 {
        match self {
            DistanceUnit::Km => 1.0,
            DistanceUnit::M => 1000.0,
            DistanceUnit::Mi => 0.621_371_192,
            DistanceUnit::Nmi => 0.539_956_803,
            DistanceUnit::Ft => 3280.839_895,
        }
    }

    pub fn convert_km(self, km: f64) -> f64 {
        km * self.per_km()
    }

    pub fn convert_meters(self, meters: f64) -> f64 {
        self.convert_km(meters / 1000.0)
    }
}

impl FromStr for DistanceUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "km" => Ok(DistanceUnit::Km),
            "m" => Ok(DistanceUnit::M),
            "mi" => Ok(DistanceUnit::Mi),
            "nmi" => Ok(DistanceUnit::Nmi),
            "ft" => Ok(DistanceUnit::Ft),
            other => Err(format!("unknown distance unit '{other}'")),
        }
    }
}

impl fmt::Display for DistanceUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DistanceUnit::Km => "km",
            DistanceUnit::M => "m",
            DistanceUnit::Mi => "mi",
            DistanceUnit::Nmi => "nmi",
            DistanceUnit::Ft => "ft",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    #[default]
    Minutes,
    Seconds,
}

impl TimeUnit {
    pub fn convert_seconds(self, seconds: f64) -> f64 {
        match self {
            TimeUnit::Minutes => seconds / 60.0,
            TimeUnit::Seconds => seconds,
        }
    }
}

impl FromStr for TimeUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "m" | "min" | "minutes" => Ok(TimeUnit::Minutes),
            "s" | "sec" | "seconds" => Ok(TimeUnit::Seconds),
            other => Err(format!("unknown time unit '{other}'")),
        }
    }
}
