use chrono::{Months, NaiveDate};
use serde::Serialize;

pub const LOOKBACK_MIN_YEARS: u32 = 2;
pub const LOOKBACK_MAX_YEARS: u32 = 25;
pub const LOOKBACK_DEFAULT_YEARS: u32 = 5;

/// Rows between a print and the same print one year earlier, for monthly data.
const YOY_PERIODS: usize = 12;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub date: NaiveDate,
    pub value: f64,
}

/// One FRED series, oldest observation first.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Series {
    pub points: Vec<Point>,
    /// FRED's `realtime_end` for the request that produced the data.
    pub last_updated: String,
}

/// How a raw FRED series is reshaped before it is shown.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Transform {
    /// Shown as published.
    Level,
    /// Percent change against the print twelve rows earlier.
    Yoy,
    /// Difference from the previous print, multiplied by `scale`.
    Change { scale: f64 },
    /// Every value multiplied by `factor`.
    Scale { factor: f64 },
}

impl Transform {
    pub fn apply(&self, raw: &Series) -> Series {
        let mut points = raw.points.clone();
        points.sort_by_key(|p| p.date);

        let points: Vec<Point> = match *self {
            Transform::Level => points,
            Transform::Yoy => points
                .iter()
                .enumerate()
                .skip(YOY_PERIODS)
                .map(|(i, p)| Point {
                    date: p.date,
                    value: (p.value / points[i - YOY_PERIODS].value - 1.0) * 100.0,
                })
                .collect(),
            Transform::Change { scale } => points
                .windows(2)
                .map(|w| Point {
                    date: w[1].date,
                    value: (w[1].value - w[0].value) * scale,
                })
                .collect(),
            Transform::Scale { factor } => points
                .into_iter()
                .map(|p| Point {
                    date: p.date,
                    value: p.value * factor,
                })
                .collect(),
        };

        Series {
            // division by a zero base leaves nothing worth plotting
            points: points.into_iter().filter(|p| p.value.is_finite()).collect(),
            last_updated: raw.last_updated.clone(),
        }
    }

    /// Only untransformed levels get a "vs prior" delta on their card.
    pub fn shows_delta(&self) -> bool {
        matches!(self, Transform::Level)
    }
}

impl Series {
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Most recent value and the date it was observed.
    pub fn latest(&self) -> Option<(f64, NaiveDate)> {
        self.points.last().map(|p| (p.value, p.date))
    }

    /// Percent change of the latest value over the value `periods` rows earlier.
    pub fn pct_change_latest(&self, periods: usize) -> Option<f64> {
        if self.len() <= periods {
            return None;
        }
        let last = self.points[self.len() - 1].value;
        let base = self.points[self.len() - 1 - periods].value;
        let change = (last / base - 1.0) * 100.0;
        change.is_finite().then_some(change)
    }

    /// Points on or after `cutoff`.
    pub fn since(&self, cutoff: NaiveDate) -> Series {
        Series {
            points: self
                .points
                .iter()
                .copied()
                .filter(|p| p.date >= cutoff)
                .collect(),
            last_updated: self.last_updated.clone(),
        }
    }
}

pub fn clamp_lookback(years: u32) -> u32 {
    years.clamp(LOOKBACK_MIN_YEARS, LOOKBACK_MAX_YEARS)
}

/// The same calendar day `years` years before `today`.
pub fn lookback_cutoff(today: NaiveDate, years: u32) -> NaiveDate {
    today
        .checked_sub_months(Months::new(years * 12))
        .unwrap_or(NaiveDate::MIN)
}

pub fn format_val(x: Option<f64>, decimals: usize) -> String {
    match x {
        Some(x) => format!("{x:.decimals$}"),
        None => "—".to_string(),
    }
}
