pub mod api;
pub mod cache;
pub mod clock;
pub mod config;
pub mod dashboard;
pub mod indicators;
pub mod schema;
pub mod series;

pub use crate::config::Config;
pub use crate::dashboard::{CalendarState, Card, Chart, Dashboard};
pub use crate::indicators::{Indicator, INDICATORS};
pub use crate::series::{Series, Transform};
