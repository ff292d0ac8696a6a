use crate::api::*;
use crate::config::Config;
use crate::indicators::Frequency;
use crate::schema::common::{convert_date_type, de_fred_value, excerpt};
use crate::series::{Point, Series};
use anyhow::{anyhow, bail};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, trace, warn};
use url::Url;

//////////////////////////////////////////////////////////////////////////////////////

const OBSERVATIONS_PATH: &str = "fred/series/observations";

/// Series and window used by the connectivity check.
const PROBE_SERIES: &str = "UNRATE";
const PROBE_START: (i32, u32, u32) = (2015, 1, 1);
const PROBE_SAMPLE: usize = 5;

pub struct Fred {
    base_url: Url,
    api_key: Option<String>,
}

impl Fred {
    pub fn new(config: &Config) -> Self {
        Fred {
            base_url: config.fred_base_url.clone(),
            api_key: config.fred_api_key.clone(),
        }
    }

    /// Fetch a series from 2000 onwards, downsampled by FRED to `frequency`.
    pub async fn get_series(
        &self,
        http_client: &HttpClient,
        series_id: &str,
        frequency: Frequency,
    ) -> anyhow::Result<Series> {
        let query = SeriesQuery {
            series_id: series_id.to_string(),
            frequency,
            observation_start: observation_start(),
        };
        trace!("fetching FRED series {series_id} ({frequency})");
        let data = self.fetch(http_client, &query).await?;
        let series = data.into_series();
        debug!("FRED series {series_id}: {} observations", series.len());
        Ok(series)
    }

    /// Issue a small request and report what came back, without failing on
    /// a bad status.
    pub async fn probe(&self, http_client: &HttpClient) -> anyhow::Result<Probe> {
        let (y, m, d) = PROBE_START;
        let start = NaiveDate::from_ymd_opt(y, m, d).ok_or_else(|| anyhow!("probe start date"))?;
        let api_key = self.api_key.clone().unwrap_or_default();
        let start = start.to_string();

        let response = http_client
            .get(self.observations_url()?)
            .query(&[
                ("series_id", PROBE_SERIES),
                ("api_key", api_key.as_str()),
                ("file_type", "json"),
                ("frequency", Frequency::Monthly.code()),
                ("observation_start", start.as_str()),
            ])
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            warn!("FRED probe returned {status}");
            return Ok(Probe {
                status: status.as_u16(),
                ok: false,
                error: Some(format!(
                    "FRED error (status {}): {}",
                    status.as_u16(),
                    excerpt(&body, 500)
                )),
                sample: None,
            });
        }

        let payload: serde_json::Value = serde_json::from_str(&body)?;
        Ok(Probe {
            status: status.as_u16(),
            ok: true,
            error: None,
            sample: Some(sample_of(&payload)),
        })
    }

    fn observations_url(&self) -> anyhow::Result<Url> {
        Ok(self.base_url.join(OBSERVATIONS_PATH)?)
    }
}

fn observation_start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2000, 1, 1).unwrap_or(NaiveDate::MIN)
}

// the interesting top-level fields, with observations cut down to a few rows
fn sample_of(payload: &serde_json::Value) -> serde_json::Value {
    let mut sample = serde_json::Map::new();
    for key in ["realtime_start", "realtime_end", "seriess", "observations"] {
        if let Some(value) = payload.get(key) {
            let value = match (key, value) {
                ("observations", serde_json::Value::Array(rows)) => {
                    serde_json::Value::Array(rows.iter().take(PROBE_SAMPLE).cloned().collect())
                }
                _ => value.clone(),
            };
            sample.insert(key.to_string(), value);
        }
    }
    serde_json::Value::Object(sample)
}

//////////////////////////////////////////////////////////////////////////////////////

pub struct SeriesQuery {
    pub series_id: String,
    pub frequency: Frequency,
    pub observation_start: NaiveDate,
}

#[async_trait]
impl Http<Observations> for Fred {
    type Query = SeriesQuery;

    async fn fetch(&self, http_client: &HttpClient, query: &SeriesQuery) -> anyhow::Result<Observations> {
        let Some(api_key) = self.api_key.as_deref() else {
            bail!("FRED_API_KEY is not set");
        };

        let start = query.observation_start.to_string();
        let response = http_client
            .get(self.observations_url()?)
            .query(&[
                ("series_id", query.series_id.as_str()),
                ("api_key", api_key),
                ("file_type", "json"),
                ("frequency", query.frequency.code()),
                ("observation_start", start.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("FRED request for {} failed with {status}", query.series_id);
            bail!(
                "FRED request failed: {} - {}",
                status.as_u16(),
                excerpt(&body, 200)
            );
        }

        Ok(response.json().await?)
    }
}

//////////////////////////////////////////////////////////////////////////////////////

#[derive(Debug, Deserialize)]
pub struct Observations {
    #[serde(default)]
    pub realtime_end: String,
    #[serde(rename = "observations", default)]
    pub inner: Vec<Observation>,
}

#[derive(Debug, Deserialize)]
pub struct Observation {
    #[serde(rename = "date")]
    pub dated: String,
    #[serde(deserialize_with = "de_fred_value")]
    pub value: Option<f64>,
}

impl Observations {
    /// Keep rows with a real number and a parseable date, oldest first.
    pub fn into_series(self) -> Series {
        let mut points: Vec<Point> = self
            .inner
            .into_iter()
            .filter_map(|obs| {
                let value = obs.value?;
                match convert_date_type(&obs.dated) {
                    Ok(date) => Some(Point { date, value }),
                    Err(_) => {
                        warn!("skipping FRED observation with bad date: {}", obs.dated);
                        None
                    }
                }
            })
            .collect();
        points.sort_by_key(|p| p.date);

        Series {
            points,
            last_updated: self.realtime_end,
        }
    }
}

/// Result of [`Fred::probe`].
#[derive(Debug, Clone, Serialize)]
pub struct Probe {
    pub status: u16,
    pub ok: bool,
    pub error: Option<String>,
    pub sample: Option<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{web, App, HttpRequest, HttpResponse, HttpServer};
    use std::collections::HashMap;

    const PAYLOAD: &str = r#"{
        "realtime_start": "2024-06-14",
        "realtime_end": "2024-06-14",
        "seriess": [],
        "observations": [
            {"realtime_start": "2024-06-14", "realtime_end": "2024-06-14", "date": "2024-03-01", "value": "3.8"},
            {"realtime_start": "2024-06-14", "realtime_end": "2024-06-14", "date": "2024-01-01", "value": "3.7"},
            {"realtime_start": "2024-06-14", "realtime_end": "2024-06-14", "date": "2024-02-01", "value": "."},
            {"realtime_start": "2024-06-14", "realtime_end": "2024-06-14", "date": "2024-04-01", "value": "3.9"}
        ]
    }"#;

    #[test]
    fn observations_become_sorted_series() {
        let data: Observations = serde_json::from_str(PAYLOAD).unwrap();
        let series = data.into_series();

        let values: Vec<f64> = series.points.iter().map(|p| p.value).collect();
        assert_eq!(values, vec![3.7, 3.8, 3.9]);
        assert_eq!(series.last_updated, "2024-06-14");
    }

    #[test]
    fn empty_payload_is_empty_series() {
        let data: Observations = serde_json::from_str(r#"{"observations": []}"#).unwrap();
        assert!(data.into_series().is_empty());
    }

    #[test]
    fn sample_trims_observations() {
        let rows: Vec<serde_json::Value> = (0..20)
            .map(|i| serde_json::json!({"date": format!("2020-01-{:02}", i + 1), "value": "1"}))
            .collect();
        let payload = serde_json::json!({
            "realtime_end": "2024-06-14",
            "observations": rows,
            "units": "lin"
        });
        let sample = sample_of(&payload);
        assert_eq!(sample["observations"].as_array().unwrap().len(), PROBE_SAMPLE);
        assert_eq!(sample["realtime_end"], "2024-06-14");
        assert!(sample.get("units").is_none());
        assert!(sample.get("realtime_start").is_none());
    }

    async fn observations(req: HttpRequest) -> HttpResponse {
        let query: HashMap<String, String> =
            url::form_urlencoded::parse(req.query_string().as_bytes())
                .into_owned()
                .collect();
        if query.get("api_key").map(String::as_str) != Some("good-key") {
            return HttpResponse::BadRequest()
                .body(r#"{"error_code":400,"error_message":"Bad Request. The value for variable api_key is not registered."}"#);
        }
        assert_eq!(query.get("file_type").map(String::as_str), Some("json"));
        HttpResponse::Ok().content_type("application/json").body(PAYLOAD)
    }

    async fn stub_fred() -> Url {
        let server = HttpServer::new(|| {
            App::new().route("/fred/series/observations", web::get().to(observations))
        })
        .workers(1)
        .bind(("127.0.0.1", 0))
        .unwrap();
        let addr = server.addrs()[0];
        actix_web::rt::spawn(server.run());
        Url::parse(&format!("http://{addr}")).unwrap()
    }

    fn fred_with(base: Url, key: Option<&str>) -> Fred {
        let mut config = Config::with_bases(base.clone(), base);
        config.fred_api_key = key.map(str::to_string);
        Fred::new(&config)
    }

    #[actix_web::test]
    async fn fetches_from_stub() {
        let base = stub_fred().await;
        let client = build_client().unwrap();
        let series = fred_with(base, Some("good-key"))
            .get_series(&client, "UNRATE", Frequency::Monthly)
            .await
            .unwrap();
        assert_eq!(series.len(), 3);
        assert_eq!(series.latest().map(|(v, _)| v), Some(3.9));
    }

    #[actix_web::test]
    async fn bad_key_surfaces_status_and_body() {
        let base = stub_fred().await;
        let client = build_client().unwrap();
        let err = fred_with(base, Some("bad-key"))
            .get_series(&client, "UNRATE", Frequency::Monthly)
            .await
            .unwrap_err();
        let msg = err.to_string();
        assert!(msg.starts_with("FRED request failed: 400"), "{msg}");
        assert!(msg.contains("api_key"), "{msg}");
    }

    #[actix_web::test]
    async fn missing_key_fails_without_request() {
        // nothing listens here; the error must come before any connection attempt
        let base = Url::parse("http://127.0.0.1:9").unwrap();
        let client = build_client().unwrap();
        let err = fred_with(base, None)
            .get_series(&client, "UNRATE", Frequency::Monthly)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "FRED_API_KEY is not set");
    }

    #[actix_web::test]
    async fn probe_reports_both_outcomes() {
        let base = stub_fred().await;
        let client = build_client().unwrap();

        let good = fred_with(base.clone(), Some("good-key")).probe(&client).await.unwrap();
        assert!(good.ok);
        assert_eq!(good.status, 200);
        assert!(good.sample.unwrap().get("observations").is_some());

        let bad = fred_with(base, None).probe(&client).await.unwrap();
        assert!(!bad.ok);
        assert_eq!(bad.status, 400);
        assert!(bad.error.unwrap().starts_with("FRED error (status 400)"));
    }
}
