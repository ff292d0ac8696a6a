use crate::api::{build_client, HttpClient};
use crate::cache::TtlCache;
use crate::config::{Config, CALENDAR_TTL, SERIES_TTL};
use crate::indicators::{Group, Indicator, INDICATORS};
use crate::schema::econ::fred::{Fred, Probe};
use crate::schema::econ::trading_economics::{
    upcoming, CalendarEvent, CalendarWindow, TradingEconomics,
};
use crate::series::{format_val, lookback_cutoff, Series};
use chrono::{DateTime, NaiveDate, Utc};
use futures::{stream, StreamExt};
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Upper bound on simultaneous FRED requests when filling the card grid.
const CARD_CONCURRENCY: usize = 4;

pub const CARD_ERROR: &str = "No data or API key missing.";

/// Everything a page render needs: both upstream clients plus their caches.
#[derive(Clone)]
pub struct Dashboard {
    inner: Arc<Inner>,
}

struct Inner {
    config: Config,
    http_client: HttpClient,
    fred: Fred,
    te: TradingEconomics,
    series: TtlCache<Series>,
    calendar: TtlCache<Vec<CalendarEvent>>,
}

impl Dashboard {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let http_client = build_client()?;
        Ok(Dashboard {
            inner: Arc::new(Inner {
                fred: Fred::new(&config),
                te: TradingEconomics::new(&config),
                config,
                http_client,
                series: TtlCache::new(SERIES_TTL),
                calendar: TtlCache::new(CALENDAR_TTL),
            }),
        })
    }

    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// The series as FRED publishes it, served from cache for a minute.
    pub async fn raw_series(&self, indicator: &Indicator) -> anyhow::Result<Series> {
        let key = format!("{}:{}", indicator.id, indicator.frequency);
        if let Some(series) = self.inner.series.get(&key).await {
            return Ok(series);
        }

        let series = self
            .inner
            .fred
            .get_series(&self.inner.http_client, indicator.id, indicator.frequency)
            .await?;
        self.inner.series.insert(key, series.clone()).await;
        Ok(series)
    }

    /// The series after its indicator's transform.
    pub async fn series(&self, indicator: &Indicator) -> anyhow::Result<Series> {
        let raw = self.raw_series(indicator).await?;
        Ok(indicator.transform.apply(&raw))
    }

    pub async fn card(&self, indicator: &'static Indicator) -> Card {
        match self.series(indicator).await {
            Ok(series) => Card::from_series(indicator, &series),
            Err(e) => {
                error!("card {} failed: {e}", indicator.id);
                Card::failed(indicator, Some(e.to_string()))
            }
        }
    }

    /// One card per catalog indicator, in catalog order.
    pub async fn cards(&self) -> Vec<Card> {
        stream::iter(INDICATORS.iter())
            .map(|indicator| self.card(indicator))
            .buffered(CARD_CONCURRENCY)
            .collect()
            .await
    }

    pub async fn chart(&self, indicator: &'static Indicator, today: NaiveDate, lookback_years: u32) -> Chart {
        match self.series(indicator).await {
            Ok(series) => {
                let chart = Chart::from_series(indicator, &series.since(lookback_cutoff(today, lookback_years)));
                if chart.is_empty() {
                    warn!("chart {} has no points in the last {lookback_years} years", indicator.id);
                }
                chart
            }
            Err(e) => {
                warn!("chart {} failed: {e}", indicator.id);
                Chart::empty(indicator)
            }
        }
    }

    pub async fn charts(&self, selection: &[&'static Indicator], today: NaiveDate, lookback_years: u32) -> Vec<Chart> {
        stream::iter(selection.iter().copied())
            .map(|indicator| self.chart(indicator, today, lookback_years))
            .buffered(CARD_CONCURRENCY)
            .collect()
            .await
    }

    /// Calendar events for the window around `today`, served from cache for 30 seconds.
    pub async fn calendar_events(&self, today: NaiveDate) -> anyhow::Result<Vec<CalendarEvent>> {
        let window = CalendarWindow::around(today);
        let key = window.cache_key();
        if let Some(events) = self.inner.calendar.get(&key).await {
            return Ok(events);
        }

        let events = self.inner.te.calendar(&self.inner.http_client, &window).await?;
        self.inner.calendar.insert(key, events.clone()).await;
        Ok(events)
    }

    pub async fn calendar(&self, today: NaiveDate, now: DateTime<Utc>) -> CalendarState {
        if !self.inner.te.is_configured() {
            return CalendarState::Unconfigured;
        }

        match self.calendar_events(today).await {
            Ok(events) if events.is_empty() => CalendarState::Empty,
            Ok(events) => CalendarState::Events {
                upcoming: upcoming(&events, now),
                all: events,
            },
            Err(e) => {
                error!("calendar failed: {e}");
                CalendarState::Failed {
                    message: e.to_string(),
                }
            }
        }
    }

    pub async fn probe(&self) -> anyhow::Result<Probe> {
        self.inner.fred.probe(&self.inner.http_client).await
    }

    /// Drop every cached series and calendar window.
    pub async fn clear_cache(&self) {
        self.inner.series.clear().await;
        self.inner.calendar.clear().await;
        info!("caches cleared");
    }
}

//////////////////////////////////////////////////////////////////////////////////////

/// The latest print of one indicator.
#[derive(Debug, Clone, Serialize)]
pub struct Card {
    pub name: &'static str,
    pub id: &'static str,
    pub group: Group,
    pub latest: Option<f64>,
    pub as_of: Option<NaiveDate>,
    /// "Latest (as of YYYY-MM-DD)", or just "Latest" without a print.
    pub label: String,
    pub value: String,
    pub delta: Option<String>,
    pub error: Option<String>,
    /// What the upstream said, when it said anything.
    pub detail: Option<String>,
}

impl Card {
    pub fn from_series(indicator: &'static Indicator, series: &Series) -> Self {
        let Some((latest, as_of)) = series.latest() else {
            return Card::failed(indicator, None);
        };
        let delta = if indicator.transform.shows_delta() {
            series
                .pct_change_latest(1)
                .map(|chg| format!("{}% vs prior", format_val(Some(chg), 2)))
        } else {
            None
        };

        Card {
            name: indicator.name,
            id: indicator.id,
            group: indicator.group,
            latest: Some(latest),
            as_of: Some(as_of),
            label: metric_label(Some(as_of)),
            value: format_val(Some(latest), 2),
            delta,
            error: None,
            detail: None,
        }
    }

    pub fn failed(indicator: &'static Indicator, detail: Option<String>) -> Self {
        Card {
            name: indicator.name,
            id: indicator.id,
            group: indicator.group,
            latest: None,
            as_of: None,
            label: metric_label(None),
            value: format_val(None, 2),
            delta: None,
            error: Some(CARD_ERROR.to_string()),
            detail,
        }
    }
}

fn metric_label(as_of: Option<NaiveDate>) -> String {
    match as_of {
        Some(d) => format!("Latest (as of {d})"),
        None => "Latest".to_string(),
    }
}

/// A lookback-trimmed series ready for plotting.
#[derive(Debug, Clone, Serialize)]
pub struct Chart {
    pub name: &'static str,
    pub id: &'static str,
    pub labels: Vec<String>,
    pub values: Vec<f64>,
    pub latest: String,
    pub as_of: Option<NaiveDate>,
}

impl Chart {
    pub fn from_series(indicator: &'static Indicator, series: &Series) -> Self {
        let latest = series.latest();
        Chart {
            name: indicator.name,
            id: indicator.id,
            labels: series.points.iter().map(|p| p.date.to_string()).collect(),
            values: series.points.iter().map(|p| p.value).collect(),
            latest: format_val(latest.map(|(v, _)| v), 2),
            as_of: latest.map(|(_, d)| d),
        }
    }

    pub fn empty(indicator: &'static Indicator) -> Self {
        Chart::from_series(indicator, &Series::default())
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum CalendarState {
    /// No Trading Economics key.
    Unconfigured,
    Empty,
    Events {
        upcoming: Vec<CalendarEvent>,
        all: Vec<CalendarEvent>,
    },
    Failed { message: String },
}
