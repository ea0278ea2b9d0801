use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Closed time interval `[start, end]` in simulation minutes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: f64,
    pub end: f64,
}

impl Default for TimeWindow {
    /// The whole simulated day.
    fn default() -> Self {
        Self {
            start: 0.0,
            end: 1440.0,
        }
    }
}

impl TimeWindow {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    /// True when `[s, e]` lies entirely inside the window.
    ///
    /// Intervals that only overlap the window are not clamped; they fail.
    pub fn contains(&self, s: f64, e: f64) -> bool {
        s >= self.start && e <= self.end
    }
}

impl FromStr for TimeWindow {
    type Err = String;

    /// Parses `start:end`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (start, end) = s
            .split_once(':')
            .ok_or_else(|| format!("window '{s}' must look like start:end"))?;
        let start: f64 = start
            .trim()
            .parse()
            .map_err(|e| format!("bad window start '{start}': {e}"))?;
        let end: f64 = end
            .trim()
            .parse()
            .map_err(|e| format!("bad window end '{end}': {e}"))?;
        if start > end {
            return Err(format!("window start {start} is after end {end}"));
        }
        Ok(TimeWindow { start, end })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_are_inclusive() {
        let w = TimeWindow::new(10.0, 20.0);
        assert!(w.contains(10.0, 20.0));
        assert!(w.contains(12.0, 12.0));
    }

    #[test]
    fn test_partial_overlap_is_excluded() {
        let w = TimeWindow::new(10.0, 20.0);
        assert!(!w.contains(9.9, 15.0));
        assert!(!w.contains(15.0, 20.1));
        assert!(!w.contains(0.0, 30.0));
    }

    #[test]
    fn test_default_is_full_day() {
        assert_eq!(TimeWindow::default(), TimeWindow::new(0.0, 1440.0));
    }

    #[test]
    fn test_parse() {
        assert_eq!("60:120".parse::<TimeWindow>().unwrap(), TimeWindow::new(60.0, 120.0));
        assert!("120:60".parse::<TimeWindow>().is_err());
        assert!("abc".parse::<TimeWindow>().is_err());
    }
}
