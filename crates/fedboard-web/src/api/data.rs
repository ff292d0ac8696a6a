use crate::view::PageParams;
use crate::AppState;
use actix_web::{get, web, HttpRequest, HttpResponse, Responder};
use chrono::Utc;
use fedboard_data::clock::{now_eastern, to_eastern};
use fedboard_data::indicators::{by_id, Indicator};
use fedboard_data::series::{lookback_cutoff, Point};
use fedboard_data::CalendarState;
use serde::Serialize;
use serde_json::json;
use tracing::error;

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// Latest print of every indicator, in catalog order.
#[get("/api/cards")]
pub async fn cards(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(state.dashboard.cards().await)
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(Serialize)]
struct SeriesBody<'a> {
    indicator: &'a Indicator,
    lookback: u32,
    last_updated: String,
    points: Vec<Point>,
}

/// One transformed series, trimmed to the lookback window.
///
/// ```json
/// {
///     "indicator": { "name": "Unemployment Rate (%)", "id": "UNRATE", "frequency": "Monthly", ... },
///     "lookback": 5,
///     "last_updated": "2024-06-14",
///     "points": [ { "date": "2024-05-01", "value": 4.0 } ]
/// }
/// ```
#[get("/api/series/{id}")]
pub async fn series(path: web::Path<String>, req: HttpRequest, state: web::Data<AppState>) -> impl Responder {
    let id = path.into_inner();
    let Some(indicator) = by_id(&id) else {
        return HttpResponse::NotFound().json(json!({ "error": format!("unknown indicator: {id}") }));
    };
    let lookback = PageParams::from_query(req.query_string()).lookback;

    match state.dashboard.series(indicator).await {
        Ok(series) => {
            let today = now_eastern().date_naive();
            let series = series.since(lookback_cutoff(today, lookback));
            HttpResponse::Ok().json(SeriesBody {
                indicator,
                lookback,
                last_updated: series.last_updated,
                points: series.points,
            })
        }
        Err(e) => {
            error!("series {id} failed: {e}");
            HttpResponse::BadGateway().json(json!({ "error": e.to_string() }))
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// The calendar window around today, with the "next up" subset.
#[get("/api/calendar")]
pub async fn calendar(state: web::Data<AppState>) -> impl Responder {
    let now = Utc::now();
    let today = to_eastern(now).date_naive();

    let state = state.dashboard.calendar(today, now).await;
    match state {
        CalendarState::Unconfigured => HttpResponse::NotFound().json(json!({
            "state": "unconfigured",
            "error": "TE_API_KEY is not set"
        })),
        CalendarState::Failed { .. } => HttpResponse::BadGateway().json(state),
        _ => HttpResponse::Ok().json(state),
    }
}
