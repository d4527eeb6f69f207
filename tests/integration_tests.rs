use anyhow::Result;
use aq_ranker::classify::{Category, Classifier, FULL_LEADERBOARD, Leaderboards, RankDirection, classify, rank_stations};
use aq_ranker::fetch::{HttpClient, decode_envelope};
use aq_ranker::forms::{AlertSubscription, FeedbackSubmission};
use aq_ranker::infra::portal::PortalClient;
use aq_ranker::model::{HistoricalDataPoint, HistoryWindow, PollutantKind, Station};
use aq_ranker::services::{FormsApi, StationRepository};
use aq_ranker::trends::{summarize, trend_series};
use aq_ranker::view::{LastKnownGood, ViewState, station_rows};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

const STATIONS_JSON: &[u8] = include_bytes!("fixtures/stations.json");

/// (method, url, body) of every request the fake saw.
type Seen = Arc<Mutex<Vec<(String, String, Option<String>)>>>;

/// Serves canned responses keyed by URL path.
struct FakeHttp {
    routes: HashMap<String, (u16, String)>,
    seen: Seen,
}

impl FakeHttp {
    fn new(routes: &[(&str, u16, &str)]) -> (Self, Seen) {
        let seen: Seen = Arc::default();
        let fake = Self {
            routes: routes
                .iter()
                .map(|(path, status, body)| (path.to_string(), (*status, body.to_string())))
                .collect(),
            seen: seen.clone(),
        };
        (fake, seen)
    }
}

#[async_trait]
impl HttpClient for FakeHttp {
    async fn execute(&self, req: reqwest::Request) -> reqwest::Result<reqwest::Response> {
        let body = req
            .body()
            .and_then(|b| b.as_bytes())
            .map(|b| String::from_utf8_lossy(b).into_owned());
        self.seen
            .lock()
            .unwrap()
            .push((req.method().to_string(), req.url().to_string(), body));

        let (status, body) = self
            .routes
            .get(req.url().path())
            .cloned()
            .unwrap_or((404, "not found".to_string()));
        let resp = http::Response::builder().status(status).body(body).unwrap();
        Ok(reqwest::Response::from(resp))
    }
}

fn fixture_stations() -> Vec<Station> {
    let stations: Vec<Station> = decode_envelope(STATIONS_JSON).expect("Failed to parse fixture");
    stations.into_iter().map(Station::normalized).collect()
}

#[test]
fn test_full_pipeline() {
    let stations = fixture_stations();
    assert_eq!(stations.len(), 4);

    assert_eq!(classify(30.0, PollutantKind::Aqi).category, Category::Good);
    assert_eq!(classify(95.0, PollutantKind::Aqi).category, Category::Moderate);
    assert_eq!(classify(160.0, PollutantKind::Aqi).category, Category::Unhealthy);

    let asc = rank_stations(&stations, PollutantKind::Aqi, RankDirection::Cleanest, 2);
    let desc = rank_stations(&stations, PollutantKind::Aqi, RankDirection::MostPolluted, 2);
    let names = |v: &[&Station]| v.iter().map(|s| s.name.clone()).collect::<Vec<_>>();

    assert_eq!(names(&asc), vec!["Westlands", "Embakasi"]);
    assert_eq!(names(&desc), vec!["Industrial Area", "Embakasi"]);
}

#[test]
fn test_fixture_keeps_missing_readings_absent() {
    let stations = fixture_stations();
    let kibera = stations.iter().find(|s| s.id == "st-d").unwrap();
    assert_eq!(kibera.aqi, None);
    assert_eq!(kibera.pm25, None);

    let boards = Leaderboards::build(&stations, PollutantKind::Pm25, FULL_LEADERBOARD);
    assert!(boards.cleanest.iter().all(|s| s.id != "st-d"));
    assert!(boards.most_polluted.iter().all(|s| s.id != "st-d"));
    assert_eq!(boards.cleanest.len(), 3);

    let view = ViewState::default().with_pollutant(PollutantKind::Pm25);
    let rows = station_rows(&stations, &view, &Classifier::default());
    let kibera_row = rows.iter().find(|r| r.station.id == "st-d").unwrap();
    assert!(!kibera_row.has_data());
    assert_eq!(kibera_row.label, "No data");
}

#[test]
fn test_pm_classification_uses_pm_tables() {
    let stations = fixture_stations();
    let view = ViewState::default().with_pollutant(PollutantKind::Pm10);
    let rows = station_rows(&stations, &view, &Classifier::default());
    let labels: Vec<_> = rows.iter().map(|r| r.label).collect();

    assert_eq!(
        labels,
        vec!["Good", "Moderate", "Unhealthy", "No data"]
    );
}

#[tokio::test]
async fn test_portal_client_fetches_and_normalizes_stations() {
    let body = String::from_utf8(STATIONS_JSON.to_vec()).unwrap();
    let (fake, seen) = FakeHttp::new(&[("/api/v1/stations", 200, &body)]);
    let client = PortalClient::new(fake, "http://portal.test/api/v1").unwrap();

    let stations = client.fetch_stations().await.unwrap();

    assert_eq!(stations.len(), 4);
    assert_eq!(stations[0].pm25, Some(7.12));
    assert_eq!(stations[1].pm25, Some(33.46));
    assert_eq!(stations[0].sensor_type.as_deref(), Some("SDS011"));

    let seen = seen.lock().unwrap();
    assert_eq!(seen[0].0, "GET");
    assert_eq!(seen[0].1, "http://portal.test/api/v1/stations");
}

#[tokio::test]
async fn test_portal_client_skips_malformed_station_records() {
    let body = r#"{"data":[
        {"id":"st-a","sensorId":"sn-101","name":"Westlands","lat":-1.2676,"lng":36.8108,"aqi":30,"pm25":7.123},
        {"id":"st-b","name":"Embakasi","lat":null,"aqi":95},
        {"name":"Unnamed record","aqi":12}
    ]}"#;
    let (fake, _) = FakeHttp::new(&[("/api/v1/stations", 200, body)]);
    let client = PortalClient::new(fake, "http://portal.test/api/v1").unwrap();

    let stations = client.fetch_stations().await.unwrap();

    assert_eq!(stations.len(), 2);
    assert_eq!(stations[0].pm25, Some(7.12));
    assert_eq!(stations[1].lat, None);

    let desc = rank_stations(&stations, PollutantKind::Aqi, RankDirection::MostPolluted, 1);
    assert_eq!(desc[0].id, "st-b");
}

#[tokio::test]
async fn test_portal_client_history_query() {
    let body = r#"{"data":[
        {"date":"2025-03-01","avg_aqi":40,"avg_pm25":10.5},
        {"date":"2025-03-02","avg_aqi":60,"avg_pm25":14.5}
    ]}"#;
    let (fake, seen) = FakeHttp::new(&[("/api/v1/stations/sn-101/readings", 200, body)]);
    let client = PortalClient::new(fake, "http://portal.test/api/v1").unwrap();

    let points = client
        .fetch_history("sn-101", HistoryWindow::Days(30))
        .await
        .unwrap();
    assert_eq!(points.len(), 2);

    let series = trend_series(&points, PollutantKind::Pm25, 30);
    let summary = summarize(&series).unwrap();
    assert_eq!(summary.mean, 12.5);

    let url = &seen.lock().unwrap()[0].1;
    assert!(url.ends_with("/stations/sn-101/readings?range=720&direction=asc&sort=timeStamp"));
}

#[tokio::test]
async fn test_portal_client_surfaces_http_errors() {
    let (fake, _) = FakeHttp::new(&[("/api/v1/stations", 503, "maintenance")]);
    let client = PortalClient::new(fake, "http://portal.test/api/v1").unwrap();

    let err = client.fetch_stations().await.unwrap_err().to_string();
    assert!(err.contains("503"), "{err}");
    assert!(err.contains("maintenance"), "{err}");
}

#[tokio::test]
async fn test_portal_client_posts_forms() {
    let (fake, seen) = FakeHttp::new(&[
        ("/api/v1/alerts/users", 200, r#"{"data":{"id":"sub-1"}}"#),
        ("/api/v1/alerts/users/sub-1/unsubscribe", 200, r#"{"data":null}"#),
        ("/api/v1/feedback", 200, r#"{"data":{"ok":true}}"#),
    ]);
    let client = PortalClient::new(fake, "http://portal.test/api/v1").unwrap();

    let subscription = AlertSubscription {
        name: "Amina".to_string(),
        email: "amina@example.com".to_string(),
        sensors: vec!["sn-101".to_string()],
    };
    let created = client.subscribe(&subscription).await.unwrap();
    assert_eq!(created["id"], "sub-1");

    client.unsubscribe("sub-1").await.unwrap();

    let feedback = FeedbackSubmission {
        name: "Amina".to_string(),
        email: "amina@example.com".to_string(),
        message: "Please add Thika Road".to_string(),
        rating: 5,
    };
    client.submit_feedback(&feedback).await.unwrap();

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 3);
    assert!(seen.iter().all(|(method, _, _)| method == "POST"));

    let sent: AlertSubscription = serde_json::from_str(seen[0].2.as_deref().unwrap()).unwrap();
    assert_eq!(sent, subscription);
    assert_eq!(seen[1].2, None);
    assert!(seen[2].2.as_deref().unwrap().contains("Thika Road"));
}

/// Succeeds once, then fails on every later call.
struct FlakyRepository {
    calls: Mutex<u32>,
}

#[async_trait]
impl StationRepository for FlakyRepository {
    async fn fetch_stations(&self) -> Result<Vec<Station>> {
        let mut calls = self.calls.lock().unwrap();
        *calls += 1;
        if *calls == 1 {
            Ok(fixture_stations())
        } else {
            Err(anyhow::anyhow!("connection reset"))
        }
    }

    async fn fetch_history(
        &self,
        _sensor_id: &str,
        _window: HistoryWindow,
    ) -> Result<Vec<HistoricalDataPoint>> {
        Ok(Vec::new())
    }
}

#[tokio::test]
async fn test_failed_refresh_keeps_last_known_good() {
    let repo = FlakyRepository {
        calls: Mutex::new(0),
    };
    let mut cache = LastKnownGood::new();

    assert_eq!(cache.update(repo.fetch_stations().await).map(Vec::len), Some(4));
    assert_eq!(cache.update(repo.fetch_stations().await).map(Vec::len), Some(4));
    assert!(cache.is_stale());

    let stations = cache.get().unwrap();
    let desc = rank_stations(stations, PollutantKind::Aqi, RankDirection::MostPolluted, 1);
    assert_eq!(desc[0].id, "st-c");
}
