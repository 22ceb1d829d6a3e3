use serde::{Deserialize, Serialize};

use crate::{EngineError, EngineResult};

/// How a band limit is compared against the observed value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BandDirection {
    /// A band applies when `value <= limit`; limits ascend.
    AtMost,
    /// A band applies when `value >= limit`; limits descend.
    AtLeast,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Band {
    pub limit: f64,
    pub points: f64,
}

/// Stepwise point table. Bands are tried top to bottom and the first that applies wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BandTable {
    pub direction: BandDirection,
    pub bands: Vec<Band>,
    /// Points when no band applies.
    pub otherwise_points: f64,
    /// Points when the metric is absent.
    pub neutral_points: f64,
}

impl BandTable {
    pub fn at_most(bands: &[(f64, f64)], otherwise_points: f64, neutral_points: f64) -> Self {
        Self::build(BandDirection::AtMost, bands, otherwise_points, neutral_points)
    }

    pub fn at_least(bands: &[(f64, f64)], otherwise_points: f64, neutral_points: f64) -> Self {
        Self::build(BandDirection::AtLeast, bands, otherwise_points, neutral_points)
    }

    fn build(
        direction: BandDirection,
        bands: &[(f64, f64)],
        otherwise_points: f64,
        neutral_points: f64,
    ) -> Self {
        Self {
            direction,
            bands: bands
                .iter()
                .map(|(limit, points)| Band {
                    limit: *limit,
                    points: *points,
                })
                .collect(),
            otherwise_points,
            neutral_points,
        }
    }

    pub fn points_for(&self, value: Option<f64>) -> f64 {
        let Some(value) = value.filter(|value| value.is_finite()) else {
            return self.neutral_points;
        };
        self.bands
            .iter()
            .find(|band| match self.direction {
                BandDirection::AtMost => value <= band.limit,
                BandDirection::AtLeast => value >= band.limit,
            })
            .map_or(self.otherwise_points, |band| band.points)
    }

    pub fn max_points(&self) -> f64 {
        self.bands
            .iter()
            .map(|band| band.points)
            .fold(self.otherwise_points, f64::max)
    }

    /// Better bands come first, so points never rise further down the table.
    pub fn validate(&self, setting: &str) -> EngineResult<()> {
        if self.bands.is_empty() {
            return Err(EngineError::config_invalid(setting, "band table is empty"));
        }
        if !self.otherwise_points.is_finite() || !self.neutral_points.is_finite() {
            return Err(EngineError::config_invalid(
                setting,
                "otherwise_points and neutral_points must be finite",
            ));
        }

        for (position, band) in self.bands.iter().enumerate() {
            let path = format!("{setting}.bands[{position}]");
            if !band.limit.is_finite() || !band.points.is_finite() {
                return Err(EngineError::config_invalid(&path, "limit and points must be finite"));
            }
            let Some(previous) = position.checked_sub(1).map(|p| self.bands[p]) else {
                continue;
            };
            let ordered = match self.direction {
                BandDirection::AtMost => band.limit > previous.limit,
                BandDirection::AtLeast => band.limit < previous.limit,
            };
            if !ordered {
                return Err(EngineError::config_invalid(
                    &path,
                    "band limits must be strictly ordered in the table direction",
                ));
            }
            if band.points > previous.points {
                return Err(EngineError::config_invalid(
                    &path,
                    "points must not increase further down the table",
                ));
            }
        }

        if let Some(last) = self.bands.last()
            && self.otherwise_points > last.points
        {
            return Err(EngineError::config_invalid(
                &format!("{setting}.otherwise_points"),
                "must not exceed the last band's points",
            ));
        }
        Ok(())
    }
}

/// Proportional points: `max_points * value / full_marks_at`, clamped to `[0, max_points]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearScale {
    pub max_points: f64,
    pub full_marks_at: f64,
    pub neutral_points: f64,
}

impl LinearScale {
    pub fn points_for(&self, value: Option<f64>) -> f64 {
        let Some(value) = value.filter(|value| value.is_finite()) else {
            return self.neutral_points;
        };
        (value / self.full_marks_at * self.max_points).clamp(0.0, self.max_points)
    }

    pub fn validate(&self, setting: &str) -> EngineResult<()> {
        if !self.max_points.is_finite() || self.max_points < 0.0 {
            return Err(EngineError::config_invalid(
                &format!("{setting}.max_points"),
                "must be a finite non-negative number",
            ));
        }
        if !self.full_marks_at.is_finite() || self.full_marks_at <= 0.0 {
            return Err(EngineError::config_invalid(
                &format!("{setting}.full_marks_at"),
                "must be greater than zero",
            ));
        }
        if !self.neutral_points.is_finite() || self.neutral_points > self.max_points {
            return Err(EngineError::config_invalid(
                &format!("{setting}.neutral_points"),
                "must be finite and within max_points",
            ));
        }
        Ok(())
    }
}
