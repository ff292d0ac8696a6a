use crate::series::Transform;
use serde::Serialize;
use std::fmt;

/// Sampling frequency requested from FRED; FRED does the downsampling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Quarterly,
}

impl Frequency {
    /// The `frequency` query parameter FRED expects.
    pub fn code(&self) -> &'static str {
        match self {
            Frequency::Daily => "d",
            Frequency::Weekly => "w",
            Frequency::Monthly => "m",
            Frequency::Quarterly => "q",
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Group {
    Prices,
    Labor,
    Activity,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Indicator {
    pub name: &'static str,
    pub id: &'static str,
    pub frequency: Frequency,
    pub transform: Transform,
    pub group: Group,
}

const fn indicator(
    name: &'static str,
    id: &'static str,
    frequency: Frequency,
    transform: Transform,
    group: Group,
) -> Indicator {
    Indicator {
        name,
        id,
        frequency,
        transform,
        group,
    }
}

use Frequency::*;
use Group::*;

pub static INDICATORS: [Indicator; 14] = [
    // prices
    indicator("CPI (YoY, %)", "CPIAUCSL", Monthly, Transform::Yoy, Prices),
    indicator("Core CPI (YoY, %)", "CPILFESL", Monthly, Transform::Yoy, Prices),
    indicator("PCE (YoY, %)", "PCEPI", Monthly, Transform::Yoy, Prices),
    indicator("Core PCE (YoY, %)", "PCEPILFE", Monthly, Transform::Yoy, Prices),
    indicator("PPI All Commodities (YoY, %)", "PPIACO", Monthly, Transform::Yoy, Prices),
    // labor; PAYEMS and JTSJOL are published in thousands, ICSA in persons
    indicator(
        "Nonfarm Payrolls (k, m/m)",
        "PAYEMS",
        Monthly,
        Transform::Change { scale: 1.0 },
        Labor,
    ),
    indicator("Unemployment Rate (%)", "UNRATE", Monthly, Transform::Level, Labor),
    indicator("Avg Hourly Earnings (YoY, %)", "CES0500000003", Monthly, Transform::Yoy, Labor),
    indicator(
        "Initial Jobless Claims (thous)",
        "ICSA",
        Weekly,
        Transform::Scale { factor: 1e-3 },
        Labor,
    ),
    indicator(
        "Job Openings, JOLTS (millions)",
        "JTSJOL",
        Monthly,
        Transform::Scale { factor: 1e-3 },
        Labor,
    ),
    // activity
    indicator("Retail Sales (YoY, %)", "RSAFS", Monthly, Transform::Yoy, Activity),
    indicator("ISM Manufacturing PMI", "NAPM", Monthly, Transform::Level, Activity),
    indicator("ISM Services PMI", "NMFBS", Monthly, Transform::Level, Activity),
    indicator(
        "Real GDP (QoQ SAAR, %)",
        "A191RL1Q225SBEA",
        Quarterly,
        Transform::Level,
        Activity,
    ),
];

/// Indicators charted when the request does not pick any.
pub const DEFAULT_SELECTION: [&str; 3] = ["CPIAUCSL", "PCEPILFE", "UNRATE"];

pub fn by_id(id: &str) -> Option<&'static Indicator> {
    INDICATORS.iter().find(|i| i.id.eq_ignore_ascii_case(id))
}

/// Resolve requested ids against the catalog in the order given, dropping
/// unknowns and repeats; falls back to [`DEFAULT_SELECTION`].
pub fn selection<'a, I>(ids: I) -> Vec<&'static Indicator>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut picked: Vec<&'static Indicator> = Vec::new();
    for indicator in ids.into_iter().filter_map(by_id) {
        if !picked.iter().any(|p| p.id == indicator.id) {
            picked.push(indicator);
        }
    }

    if picked.is_empty() {
        return DEFAULT_SELECTION.iter().filter_map(|id| by_id(id)).collect();
    }
    picked
}
