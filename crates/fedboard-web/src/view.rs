use fedboard_data::indicators::{Indicator, INDICATORS};
use fedboard_data::schema::econ::trading_economics::CalendarEvent;
use fedboard_data::series::{clamp_lookback, LOOKBACK_DEFAULT_YEARS, LOOKBACK_MAX_YEARS, LOOKBACK_MIN_YEARS};
use fedboard_data::{CalendarState, Card, Chart};
use serde::Serialize;
use std::time::Duration;
use tera::{Context, Tera};

const DASHBOARD_TEMPLATE: &str = "dashboard.html";

pub fn templates() -> tera::Result<Tera> {
    let mut tera = Tera::default();
    tera.add_raw_template(DASHBOARD_TEMPLATE, include_str!("../templates/dashboard.html"))?;
    Ok(tera)
}

//////////////////////////////////////////////////////////////////////////////////////

/// What the dashboard query string asks for.
#[derive(Debug, Clone, PartialEq)]
pub struct PageParams {
    pub lookback: u32,
    pub series: Vec<String>,
    pub cleared: bool,
}

impl PageParams {
    /// `lookback` falls back to the default when missing or unparseable and
    /// is clamped otherwise; `series` may repeat.
    pub fn from_query(query: &str) -> Self {
        let mut params = PageParams {
            lookback: LOOKBACK_DEFAULT_YEARS,
            series: Vec::new(),
            cleared: false,
        };
        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            match key.as_ref() {
                "lookback" => {
                    if let Ok(years) = value.trim().parse::<u32>() {
                        params.lookback = clamp_lookback(years);
                    }
                }
                "series" => params.series.extend(
                    value
                        .split(',')
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(str::to_string),
                ),
                "cleared" => params.cleared = value == "1",
                _ => {}
            }
        }
        params
    }
}

//////////////////////////////////////////////////////////////////////////////////////

#[derive(Debug, Serialize)]
struct Choice {
    id: &'static str,
    name: &'static str,
    selected: bool,
}

#[derive(Debug, Serialize)]
pub struct EventRow {
    pub date: String,
    pub country: String,
    pub category: String,
    pub event: String,
    pub reference: String,
    pub actual: String,
    pub previous: String,
    pub forecast: String,
    pub importance: String,
}

impl From<&CalendarEvent> for EventRow {
    fn from(e: &CalendarEvent) -> Self {
        let text = |v: &Option<String>| v.clone().unwrap_or_default();
        EventRow {
            date: e.display_date(),
            country: text(&e.country),
            category: text(&e.category),
            event: text(&e.event),
            reference: text(&e.reference),
            actual: text(&e.actual),
            previous: text(&e.previous),
            forecast: text(&e.forecast),
            importance: e.importance.map(|i| i.to_string()).unwrap_or_default(),
        }
    }
}

#[derive(Debug, Serialize)]
struct CalendarView {
    state: &'static str,
    message: Option<String>,
    upcoming: Vec<EventRow>,
    all: Vec<EventRow>,
}

impl From<&CalendarState> for CalendarView {
    fn from(state: &CalendarState) -> Self {
        let view = |state, message| CalendarView {
            state,
            message,
            upcoming: Vec::new(),
            all: Vec::new(),
        };
        match state {
            CalendarState::Unconfigured => view("unconfigured", None),
            CalendarState::Empty => view("empty", None),
            CalendarState::Failed { message } => view("failed", Some(message.clone())),
            CalendarState::Events { upcoming, all } => CalendarView {
                state: "events",
                message: None,
                upcoming: upcoming.iter().map(EventRow::from).collect(),
                all: all.iter().map(EventRow::from).collect(),
            },
        }
    }
}

/// The current view without one-shot flags such as `cleared`.
fn refresh_url(lookback: u32, selection: &[&'static Indicator]) -> String {
    let mut query = url::form_urlencoded::Serializer::new(String::new());
    query.append_pair("lookback", &lookback.to_string());
    for indicator in selection {
        query.append_pair("series", indicator.id);
    }
    format!("/?{}", query.finish())
}

/// Everything the dashboard template reads.
#[derive(Debug, Serialize)]
pub struct Page {
    refresh_secs: Option<u64>,
    refresh_minutes: Option<u64>,
    refresh_url: String,
    fred_ok: bool,
    te_ok: bool,
    cleared: bool,
    lookback: u32,
    lookback_min: u32,
    lookback_max: u32,
    choices: Vec<Choice>,
    cards: Vec<Card>,
    charts: Vec<Chart>,
    calendar: CalendarView,
}

pub struct PageInput<'a> {
    pub refresh: Option<Duration>,
    pub fred_ok: bool,
    pub te_ok: bool,
    pub params: &'a PageParams,
    pub selection: &'a [&'static Indicator],
    pub cards: Vec<Card>,
    pub charts: Vec<Chart>,
    pub calendar: &'a CalendarState,
}

impl Page {
    pub fn new(input: PageInput<'_>) -> Self {
        Page {
            refresh_secs: input.refresh.map(|d| d.as_secs()),
            refresh_minutes: input.refresh.map(|d| (d.as_secs() / 60).max(1)),
            refresh_url: refresh_url(input.params.lookback, input.selection),
            fred_ok: input.fred_ok,
            te_ok: input.te_ok,
            cleared: input.params.cleared,
            lookback: input.params.lookback,
            lookback_min: LOOKBACK_MIN_YEARS,
            lookback_max: LOOKBACK_MAX_YEARS,
            choices: INDICATORS
                .iter()
                .map(|i| Choice {
                    id: i.id,
                    name: i.name,
                    selected: input.selection.iter().any(|s| s.id == i.id),
                })
                .collect(),
            cards: input.cards,
            charts: input.charts,
            calendar: CalendarView::from(input.calendar),
        }
    }

    pub fn render(&self, tera: &Tera) -> anyhow::Result<String> {
        let context = Context::from_serialize(self)?;
        Ok(tera.render(DASHBOARD_TEMPLATE, &context)?)
    }
}
