use crate::view::{Page, PageInput, PageParams};
use crate::AppState;
use actix_web::{get, web, HttpRequest, HttpResponse, Responder};
use chrono::Utc;
use fedboard_data::clock::{refresh_interval, to_eastern};
use fedboard_data::indicators::selection;
use tracing::{debug, error};

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// The dashboard.
///
/// ```text
/// GET /?lookback=10&series=UNRATE&series=ICSA
/// ```
#[get("/")]
pub async fn dashboard(req: HttpRequest, state: web::Data<AppState>) -> impl Responder {
    let params = PageParams::from_query(req.query_string());
    let dashboard = &state.dashboard;

    let now = Utc::now();
    let today = to_eastern(now).date_naive();
    let picked = selection(params.series.iter().map(String::as_str));
    debug!("rendering dashboard: lookback = {}, series = {:?}", params.lookback, picked.iter().map(|i| i.id).collect::<Vec<_>>());

    // charts read the series the card grid has just cached
    let ((cards, charts), calendar) = tokio::join!(
        async {
            let cards = dashboard.cards().await;
            let charts = dashboard.charts(&picked, today, params.lookback).await;
            (cards, charts)
        },
        dashboard.calendar(today, now),
    );

    let page = Page::new(PageInput {
        refresh: refresh_interval(now),
        fred_ok: dashboard.config().fred_key_present(),
        te_ok: dashboard.config().te_key_present(),
        params: &params,
        selection: &picked,
        cards,
        charts,
        calendar: &calendar,
    });

    match page.render(&state.templates) {
        Ok(html) => HttpResponse::Ok()
            .content_type("text/html; charset=utf-8")
            .body(html),
        Err(e) => {
            error!("failed to render dashboard: {e:?}");
            HttpResponse::InternalServerError().body("Template rendering failed")
        }
    }
}
