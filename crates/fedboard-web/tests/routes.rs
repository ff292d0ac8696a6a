use actix_web::{http::header, http::StatusCode, test, web, App, HttpResponse, HttpServer};
use fedboard_data::{Config, Dashboard, INDICATORS};
use fedboard_web::{routes, AppState};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use url::Url;

const OBSERVATIONS: &str = r#"{
    "realtime_start": "2026-10-14",
    "realtime_end": "2026-10-14",
    "observations": [
        {"date": "2026-06-01", "value": "4.1"},
        {"date": "2026-07-01", "value": "4.2"},
        {"date": "2026-08-01", "value": "."},
        {"date": "2026-09-01", "value": "4.3"}
    ]
}"#;

const EVENTS: &str = r#"[
    {"Date": "2099-07-10T12:30:00", "Country": "United States", "Category": "Inflation Rate",
     "Event": "CPI YoY", "Reference": "Jun", "Actual": "", "Previous": "3.3%", "Forecast": "3.1%", "Importance": 3},
    {"Date": "2099-07-05T12:30:00", "Country": "United States", "Category": "Non Farm Payrolls",
     "Event": "Non Farm Payrolls", "Reference": "Jun", "Actual": "", "Previous": "218K", "Forecast": "190K", "Importance": 3}
]"#;

const FRED_PATH: &str = "/fred/series/observations";
const TE_PATH: &str = "/calendar/country/{country}";

/// A local upstream answering `path` with a fixed reply and counting hits.
struct Upstream {
    url: Url,
    hits: Arc<AtomicUsize>,
}

impl Upstream {
    async fn start(path: &'static str, status: StatusCode, body: &'static str) -> Self {
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        let server = HttpServer::new(move || {
            let counter = counter.clone();
            App::new().route(
                path,
                web::get().to(move || {
                    let counter = counter.clone();
                    async move {
                        counter.fetch_add(1, Ordering::SeqCst);
                        HttpResponse::build(status)
                            .content_type("application/json")
                            .body(body)
                    }
                }),
            )
        })
        .workers(1)
        .bind(("127.0.0.1", 0))
        .unwrap();
        let addr = server.addrs()[0];
        actix_web::rt::spawn(server.run());
        Upstream {
            url: Url::parse(&format!("http://{addr}")).unwrap(),
            hits,
        }
    }

    fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

fn state(config: Config) -> web::Data<AppState> {
    web::Data::new(AppState::new(Dashboard::new(config).unwrap()).unwrap())
}

fn keyless() -> web::Data<AppState> {
    state(Config::default())
}

fn fred_state(fred: &Upstream) -> web::Data<AppState> {
    let mut config = Config::with_bases(fred.url.clone(), fred.url.clone());
    config.fred_api_key = Some("test-key".to_string());
    state(config)
}

async fn with_fred() -> web::Data<AppState> {
    fred_state(&Upstream::start(FRED_PATH, StatusCode::OK, OBSERVATIONS).await)
}

/// No FRED key, so only the calendar reaches the network.
async fn with_calendar(status: StatusCode, body: &'static str) -> web::Data<AppState> {
    let te = Upstream::start(TE_PATH, status, body).await;
    let mut config = Config::with_bases(te.url.clone(), te.url.clone());
    config.te_api_key = Some("te-key".to_string());
    state(config)
}

async fn page(app_data: web::Data<AppState>, uri: &str) -> String {
    let app = test::init_service(App::new().app_data(app_data).configure(routes)).await;
    let req = test::TestRequest::get().uri(uri).to_request();
    let body = test::call_and_read_body(&app, req).await;
    String::from_utf8(body.to_vec()).unwrap()
}

async fn calendar_status(app_data: web::Data<AppState>) -> (StatusCode, serde_json::Value) {
    let app = test::init_service(App::new().app_data(app_data).configure(routes)).await;
    let req = test::TestRequest::get().uri("/api/calendar").to_request();
    let resp = test::call_service(&app, req).await;
    let status = resp.status();
    let body = test::read_body(resp).await;
    (status, serde_json::from_slice(&body).unwrap())
}

#[actix_web::test]
async fn dashboard_without_keys_shows_messages() {
    let app = test::init_service(App::new().app_data(keyless()).configure(routes)).await;
    let req = test::TestRequest::get().uri("/").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
    assert!(body.contains("❌ Missing"));
    assert!(body.contains("No data or API key missing."));
    assert!(body.contains("FRED_API_KEY is not set"));
    assert!(body.contains("No data for CPI (YoY, %)."));
    assert!(body.contains("Add a Trading Economics API key"));
    assert!(!body.contains("Cache cleared."));
}

#[actix_web::test]
async fn clear_cache_redirects_with_notice() {
    let app = test::init_service(App::new().app_data(keyless()).configure(routes)).await;

    let req = test::TestRequest::post().uri("/diagnostics/clear-cache").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(resp.headers().get(header::LOCATION).unwrap(), "/?cleared=1");

    let req = test::TestRequest::get().uri("/?cleared=1").to_request();
    let body = test::call_and_read_body(&app, req).await;
    let body = String::from_utf8(body.to_vec()).unwrap();
    assert!(body.contains("Cache cleared."));
}

#[actix_web::test]
async fn unknown_series_is_not_found() {
    let app = test::init_service(App::new().app_data(keyless()).configure(routes)).await;
    let req = test::TestRequest::get().uri("/api/series/NOPE").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn series_without_key_is_bad_gateway() {
    let app = test::init_service(App::new().app_data(keyless()).configure(routes)).await;
    let req = test::TestRequest::get().uri("/api/series/UNRATE").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
}

#[actix_web::test]
async fn calendar_without_key_is_not_found() {
    let app = test::init_service(App::new().app_data(keyless()).configure(routes)).await;
    let req = test::TestRequest::get().uri("/api/calendar").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn series_from_stub_fred() {
    let app = test::init_service(App::new().app_data(with_fred().await).configure(routes)).await;
    let req = test::TestRequest::get()
        .uri("/api/series/UNRATE?lookback=25")
        .to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["indicator"]["id"], "UNRATE");
    assert_eq!(body["lookback"], 25);
    assert_eq!(body["last_updated"], "2026-10-14");
    assert_eq!(body["points"].as_array().unwrap().len(), 3);
}

#[actix_web::test]
async fn dashboard_with_data_draws_charts() {
    let body = page(with_fred().await, "/?series=UNRATE&lookback=25").await;

    assert!(body.contains("✅ Set"));
    assert!(body.contains(r#"id="chart-UNRATE""#));
    assert!(body.contains("Latest (as of 2026-09-01)"));
    assert!(body.contains("2.38% vs prior"));
}

#[actix_web::test]
async fn page_load_fetches_each_series_once() {
    let fred = Upstream::start(FRED_PATH, StatusCode::OK, OBSERVATIONS).await;
    let app = test::init_service(App::new().app_data(fred_state(&fred)).configure(routes)).await;

    let req = test::TestRequest::get().uri("/").to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
    assert_eq!(fred.hits(), INDICATORS.len());

    let req = test::TestRequest::get().uri("/?series=ICSA&series=UNRATE").to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
    assert_eq!(fred.hits(), INDICATORS.len());
}

#[actix_web::test]
async fn cards_from_stub_fred() {
    let app = test::init_service(App::new().app_data(with_fred().await).configure(routes)).await;
    let req = test::TestRequest::get().uri("/api/cards").to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;

    let cards = body.as_array().unwrap();
    assert_eq!(cards.len(), INDICATORS.len());
    let unrate = cards.iter().find(|c| c["id"] == "UNRATE").unwrap();
    assert_eq!(unrate["value"], "4.30");
    assert_eq!(unrate["label"], "Latest (as of 2026-09-01)");
    assert_eq!(unrate["delta"], "2.38% vs prior");
    assert!(unrate["error"].is_null());
}

#[actix_web::test]
async fn fred_diagnostics_reports_sample() {
    let app = test::init_service(App::new().app_data(with_fred().await).configure(routes)).await;
    let req = test::TestRequest::get().uri("/diagnostics/fred").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: serde_json::Value = serde_json::from_slice(&test::read_body(resp).await).unwrap();
    assert_eq!(body["status"], 200);
    assert_eq!(body["ok"], true);
    assert!(body["error"].is_null());
    assert_eq!(body["sample"]["realtime_end"], "2026-10-14");
    assert_eq!(body["sample"]["observations"].as_array().unwrap().len(), 4);
}

#[actix_web::test]
async fn empty_calendar_warns() {
    let body = page(with_calendar(StatusCode::OK, "[]").await, "/").await;
    assert!(body.contains("No events returned."));

    let (status, json) = calendar_status(with_calendar(StatusCode::OK, "[]").await).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["state"], "empty");
}

#[actix_web::test]
async fn null_calendar_is_empty() {
    let body = page(with_calendar(StatusCode::OK, "null").await, "/").await;
    assert!(body.contains("No events returned."));

    let (status, json) = calendar_status(with_calendar(StatusCode::OK, "null").await).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["state"], "empty");
}

#[actix_web::test]
async fn rejected_calendar_shows_error() {
    let body = page(with_calendar(StatusCode::UNAUTHORIZED, r#""invalid key""#).await, "/").await;
    assert!(body.contains("Calendar request failed: "));
    assert!(body.contains("401"));

    let (status, json) =
        calendar_status(with_calendar(StatusCode::UNAUTHORIZED, r#""invalid key""#).await).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(json["state"], "failed");
}

#[actix_web::test]
async fn calendar_events_fill_both_tables() {
    let body = page(with_calendar(StatusCode::OK, EVENTS).await, "/").await;
    assert!(body.contains("Next Up (ET)"));
    assert!(body.contains("This Week — Details"));
    assert!(body.contains("<td>Non Farm Payrolls</td>"));
    assert!(body.contains("<td>CPI YoY</td>"));
    // sorted by release time
    assert!(body.find("Non Farm Payrolls").unwrap() < body.find("CPI YoY").unwrap());

    let (status, json) = calendar_status(with_calendar(StatusCode::OK, EVENTS).await).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["state"], "events");
    assert_eq!(json["all"].as_array().unwrap().len(), 2);
    assert_eq!(json["upcoming"].as_array().unwrap().len(), 2);
}
