use crate::api::*;
use crate::clock::to_eastern;
use crate::config::Config;
use crate::schema::common::{de_importance, de_loose_text, parse_utc_timestamp};
use anyhow::bail;
use async_trait::async_trait;
use chrono::{DateTime, Days, FixedOffset, NaiveDate, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, trace, warn};
use url::Url;

//////////////////////////////////////////////////////////////////////////////////////

const CALENDAR_PATH: &str = "calendar/country/united%20states";

/// Events that started less than this long ago still count as "next up".
const UPCOMING_GRACE_MINUTES: i64 = 5;
const UPCOMING_LIMIT: usize = 15;

pub const DISPLAY_FORMAT: &str = "%a %b %d, %I:%M %p";

pub struct TradingEconomics {
    base_url: Url,
    api_key: Option<String>,
}

impl TradingEconomics {
    pub fn new(config: &Config) -> Self {
        TradingEconomics {
            base_url: config.te_base_url.clone(),
            api_key: config.te_api_key.clone(),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// U.S. calendar between `window.start` and `window.end`, sorted by time,
    /// with times in U.S. Eastern.
    pub async fn calendar(
        &self,
        http_client: &HttpClient,
        window: &CalendarWindow,
    ) -> anyhow::Result<Vec<CalendarEvent>> {
        trace!("fetching calendar {} .. {}", window.start, window.end);
        let raw = self.fetch(http_client, window).await?;

        let mut events: Vec<CalendarEvent> = raw.into_iter().filter_map(RawEvent::into_event).collect();
        events.sort_by_key(|e| e.date);
        debug!("calendar returned {} events", events.len());

        Ok(events)
    }
}

//////////////////////////////////////////////////////////////////////////////////////

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CalendarWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl CalendarWindow {
    /// Yesterday through a week from today.
    pub fn around(today: NaiveDate) -> Self {
        CalendarWindow {
            start: today.checked_sub_days(Days::new(1)).unwrap_or(today),
            end: today.checked_add_days(Days::new(7)).unwrap_or(today),
        }
    }

    pub fn cache_key(&self) -> String {
        format!("{}:{}", self.start, self.end)
    }
}

#[async_trait]
impl Http<Vec<RawEvent>> for TradingEconomics {
    type Query = CalendarWindow;

    async fn fetch(&self, http_client: &HttpClient, window: &CalendarWindow) -> anyhow::Result<Vec<RawEvent>> {
        let Some(api_key) = self.api_key.as_deref() else {
            bail!("TE_API_KEY is not set");
        };

        let (d1, d2) = (window.start.to_string(), window.end.to_string());
        let response = http_client
            .get(self.base_url.join(CALENDAR_PATH)?)
            .query(&[
                ("d1", d1.as_str()),
                ("d2", d2.as_str()),
                ("c", api_key),
                ("format", "json"),
            ])
            .send()
            .await?
            .error_for_status()
            .map_err(|e| {
                error!("Trading Economics calendar request failed: {e}");
                e
            })?;

        // the API answers an empty window with `null` as often as `[]`
        let events: Option<Vec<RawEvent>> = response.json().await?;
        Ok(events.unwrap_or_default())
    }
}

//////////////////////////////////////////////////////////////////////////////////////

#[derive(Debug, Deserialize)]
pub struct RawEvent {
    #[serde(rename = "Date", default)]
    pub date: Option<String>,
    #[serde(rename = "Country", default, deserialize_with = "de_loose_text")]
    pub country: Option<String>,
    #[serde(rename = "Category", default, deserialize_with = "de_loose_text")]
    pub category: Option<String>,
    #[serde(rename = "Event", default, deserialize_with = "de_loose_text")]
    pub event: Option<String>,
    #[serde(rename = "Reference", default, deserialize_with = "de_loose_text")]
    pub reference: Option<String>,
    #[serde(rename = "Actual", default, deserialize_with = "de_loose_text")]
    pub actual: Option<String>,
    #[serde(rename = "Previous", default, deserialize_with = "de_loose_text")]
    pub previous: Option<String>,
    #[serde(rename = "Forecast", default, deserialize_with = "de_loose_text")]
    pub forecast: Option<String>,
    #[serde(rename = "Importance", default, deserialize_with = "de_importance")]
    pub importance: Option<i64>,
}

impl RawEvent {
    fn into_event(self) -> Option<CalendarEvent> {
        let raw_date = self.date?;
        let date = match parse_utc_timestamp(&raw_date) {
            Ok(date) => to_eastern(date),
            Err(_) => {
                warn!("skipping calendar event with bad date: {raw_date}");
                return None;
            }
        };

        Some(CalendarEvent {
            date,
            country: self.country,
            category: self.category,
            event: self.event,
            reference: self.reference,
            actual: self.actual,
            previous: self.previous,
            forecast: self.forecast,
            importance: self.importance,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CalendarEvent {
    /// U.S. Eastern.
    pub date: DateTime<FixedOffset>,
    pub country: Option<String>,
    pub category: Option<String>,
    pub event: Option<String>,
    pub reference: Option<String>,
    pub actual: Option<String>,
    pub previous: Option<String>,
    pub forecast: Option<String>,
    pub importance: Option<i64>,
}

impl CalendarEvent {
    pub fn display_date(&self) -> String {
        self.date.format(DISPLAY_FORMAT).to_string()
    }
}

/// The next events from `now` on, allowing for ones that just started.
pub fn upcoming(events: &[CalendarEvent], now: DateTime<Utc>) -> Vec<CalendarEvent> {
    let threshold = now - TimeDelta::minutes(UPCOMING_GRACE_MINUTES);
    events
        .iter()
        .filter(|e| e.date >= threshold)
        .take(UPCOMING_LIMIT)
        .cloned()
        .collect()
}
