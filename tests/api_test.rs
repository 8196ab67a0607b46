use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use chrono::NaiveDate;
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};
use tower::ServiceExt; // for `oneshot`

use adfetch::adlib::{AdLibraryClient, ClientError, ClientFactory, ParameterSet, ResultSet};
use adfetch::api::{AppState, models::HealthResponse, router};
use adfetch::config::Config;
use adfetch::media::{MediaDownloader, MediaError, MediaJob, MediaOutcome};
use adfetch::normalize::Defaults;
use adfetch::pipeline::{DownloadPipeline, DownloadResponse};

/// What the fake Ad Library returns
#[derive(Clone)]
enum Upstream {
    Rows(Value),
    NoData,
    Fail,
}

/// Records every client it hands out so tests can assert on calls
#[derive(Clone)]
struct FakeClients {
    upstream: Upstream,
    created: Arc<Mutex<Vec<(String, String)>>>,
}

impl FakeClients {
    fn new(upstream: Upstream) -> Self {
        Self {
            upstream,
            created: Arc::default(),
        }
    }
}

struct FakeClient {
    upstream: Upstream,
    params: ParameterSet,
}

impl ClientFactory for FakeClients {
    fn create(
        &self,
        credential: &str,
        project_name: &str,
    ) -> Result<Box<dyn AdLibraryClient>, ClientError> {
        if credential.is_empty() {
            return Err(ClientError::InvalidCredential("access token must not be empty".into()));
        }
        self.created
            .lock()
            .unwrap()
            .push((credential.to_string(), project_name.to_string()));

        Ok(Box::new(FakeClient {
            upstream: self.upstream.clone(),
            params: ParameterSet::new(),
        }))
    }
}

#[async_trait]
impl AdLibraryClient for FakeClient {
    fn add_parameters(&mut self, params: ParameterSet) -> Result<(), ClientError> {
        if let Some(Value::String(ad_type)) = params.get("ad_type") {
            if ad_type == "BOGUS" {
                return Err(ClientError::InvalidParameter {
                    key: "ad_type".into(),
                    reason: "unsupported ad type".into(),
                });
            }
        }
        self.params.extend(params);
        Ok(())
    }

    fn parameters(&self) -> ParameterSet {
        self.params.clone()
    }

    async fn fetch(&self) -> Result<Option<ResultSet>, ClientError> {
        match &self.upstream {
            Upstream::Rows(rows) => Ok(Some(serde_json::from_value(rows.clone()).unwrap())),
            Upstream::NoData => Ok(None),
            Upstream::Fail => Err(ClientError::Upstream("(#4) Application request limit reached".into())),
        }
    }
}

#[derive(Default)]
struct FakeMedia {
    fail: bool,
    jobs: Mutex<Vec<MediaJob>>,
}

#[async_trait]
impl MediaDownloader for FakeMedia {
    async fn download(&self, job: MediaJob) -> Result<MediaOutcome, MediaError> {
        let requested = job.limit.min(job.rows.len());
        self.jobs.lock().unwrap().push(job);

        if self.fail {
            return Err(MediaError::Failed("snapshot renderer crashed".into()));
        }
        Ok(MediaOutcome {
            requested,
            succeeded: requested,
            ..MediaOutcome::default()
        })
    }
}

struct TestApp {
    router: Router,
    clients: FakeClients,
    media: Arc<FakeMedia>,
}

fn build_test_app(upstream: Upstream, media: FakeMedia) -> TestApp {
    let clients = FakeClients::new(upstream);
    let media = Arc::new(media);
    let defaults = Defaults {
        country: "NL".into(),
        start_date: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
    };

    let pipeline = DownloadPipeline::new(Arc::new(clients.clone()), media.clone(), defaults);
    let state = AppState::new(Config::default(), pipeline);

    TestApp {
        router: router(state),
        clients,
        media,
    }
}

fn snapshot_rows(ids: &[&str]) -> Value {
    Value::Array(
        ids.iter()
            .map(|id| {
                json!({
                    "id": id,
                    "page_name": "Example Page",
                    "ad_snapshot_url": format!(
                        "https://www.facebook.com/ads/archive/render_ad/?id={id}&access_token=stale"
                    )
                })
            })
            .collect(),
    )
}

fn post_download(body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/download")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn send(router: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap()
    };
    (status, value)
}

#[tokio::test]
async fn test_download_success() {
    let app = build_test_app(Upstream::Rows(snapshot_rows(&["1", "2"])), FakeMedia::default());

    let (status, body) = send(
        app.router,
        post_download(json!({
            "access_token": "fresh-token",
            "project_name": "elections",
            "ad_reached_countries": ["nl", "NL", " be "],
            "page_ids": "123,456",
            "date_range": {"min": "2024-01-01", "max": "2024-03-31"}
        })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let response: DownloadResponse = serde_json::from_value(body.clone()).unwrap();
    assert_eq!(response.project.name, "elections");
    assert!(response.project.requested_at.ends_with('Z'));
    assert_eq!(response.summary.total_ads, 2);
    assert_eq!(response.summary.media.requested, 2);
    assert!(body["summary"]["media"].get("error").is_none());

    let params = &response.project.parameters;
    assert_eq!(params["ad_reached_countries"], json!("NL,BE"));
    assert_eq!(params["search_page_ids"], json!(["123", "456"]));
    assert_eq!(params["ad_delivery_date_min"], json!("2024-01-01"));
    assert_eq!(params["ad_delivery_date_max"], json!("2024-03-31"));
    assert!(params.get("access_token").is_none());

    for row in response.ads.rows() {
        let url = row["ad_snapshot_url"].as_str().unwrap();
        assert!(url.contains("access_token=fresh-token"), "{url}");
    }

    assert_eq!(
        app.clients.created.lock().unwrap().as_slice(),
        [("fresh-token".to_string(), "elections".to_string())]
    );
}

#[tokio::test]
async fn test_download_derives_project_name() {
    let app = build_test_app(Upstream::Rows(json!([{"id": "1"}])), FakeMedia::default());

    let (status, body) = send(
        app.router.clone(),
        post_download(json!({"access_token": "t", "ad_library_ids": ["111"]})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let first = body["project"]["name"].as_str().unwrap().to_string();
    assert_eq!(first.len(), 14);
    assert!(first.chars().all(|c| c.is_ascii_digit()));

    let (_, body) = send(
        app.router,
        post_download(json!({"access_token": "t", "ad_library_ids": ["111"]})),
    )
    .await;
    let second = body["project"]["name"].as_str().unwrap().to_string();
    assert!(second >= first, "{second} < {first}");
}

#[tokio::test]
async fn test_download_unknown_field() {
    let app = build_test_app(Upstream::Rows(snapshot_rows(&["1"])), FakeMedia::default());

    let (status, body) = send(
        app.router,
        post_download(json!({"access_token": "t", "page_ids": "1", "page_id": "2"})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_PAYLOAD");
    assert!(app.clients.created.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_download_missing_identifier() {
    let app = build_test_app(Upstream::Rows(snapshot_rows(&["1"])), FakeMedia::default());

    let (status, body) = send(app.router, post_download(json!({"access_token": "t"}))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_FAILED");
    assert!(app.clients.created.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_download_inverted_date_range() {
    let app = build_test_app(Upstream::Rows(snapshot_rows(&["1"])), FakeMedia::default());

    let (status, body) = send(
        app.router,
        post_download(json!({
            "access_token": "t",
            "page_ids": "1",
            "date_range": {"min": "2024-05-01", "max": "2024-04-01"}
        })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_FAILED");
    assert!(app.clients.created.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_download_zero_media_limit() {
    let app = build_test_app(Upstream::Rows(snapshot_rows(&["1"])), FakeMedia::default());

    let (status, body) = send(
        app.router,
        post_download(json!({"access_token": "t", "page_ids": "1", "media_limit": 0})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_FAILED");
}

#[tokio::test]
async fn test_download_client_init_failure() {
    let app = build_test_app(Upstream::Rows(snapshot_rows(&["1"])), FakeMedia::default());

    let (status, body) = send(
        app.router,
        post_download(json!({"access_token": "   ", "page_ids": "1"})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "CLIENT_INIT_FAILED");
}

#[tokio::test]
async fn test_download_parameter_error() {
    let app = build_test_app(Upstream::Rows(snapshot_rows(&["1"])), FakeMedia::default());

    let (status, body) = send(
        app.router,
        post_download(json!({"access_token": "t", "page_ids": "1", "ad_type": "BOGUS"})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "PARAMETER_ERROR");
}

#[tokio::test]
async fn test_download_fetch_failure() {
    let app = build_test_app(Upstream::Fail, FakeMedia::default());

    let (status, body) = send(
        app.router,
        post_download(json!({"access_token": "t", "page_ids": "1"})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["code"], "FETCH_FAILED");
    assert!(body["message"].as_str().unwrap().contains("request limit"));
}

#[tokio::test]
async fn test_download_empty_result() {
    for upstream in [Upstream::Rows(json!([])), Upstream::NoData] {
        let app = build_test_app(upstream, FakeMedia::default());

        let (status, body) = send(
            app.router,
            post_download(json!({"access_token": "t", "page_ids": "1"})),
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "NO_ADS_FOUND");
        assert!(app.media.jobs.lock().unwrap().is_empty());
    }
}

#[tokio::test]
async fn test_download_media_failure_still_succeeds() {
    let app = build_test_app(
        Upstream::Rows(snapshot_rows(&["1", "2", "3", "4", "5"])),
        FakeMedia {
            fail: true,
            ..FakeMedia::default()
        },
    );

    let (status, body) = send(
        app.router,
        post_download(json!({"access_token": "t", "page_ids": "1"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ads"].as_array().unwrap().len(), 5);
    assert_eq!(
        body["summary"]["media"],
        json!({
            "ads_requested": 5,
            "ads_succeeded": 0,
            "ads_failed": 5,
            "assets": [],
            "error": "media download failed: snapshot renderer crashed"
        })
    );
}

#[tokio::test]
async fn test_download_media_id_filter_disables_sampling() {
    let app = build_test_app(Upstream::Rows(snapshot_rows(&["7", "8"])), FakeMedia::default());

    let (status, _) = send(
        app.router,
        post_download(json!({
            "access_token": "t",
            "page_ids": "1",
            "media_ad_ids": ["7"],
            "random_sample_media": true
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let jobs = app.media.jobs.lock().unwrap();
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].rows.len(), 1);
    assert_eq!(jobs[0].rows[0]["id"], json!("7"));
    assert!(!jobs[0].random_sample);
}

#[tokio::test]
async fn test_download_media_id_filter_without_match_skips_media() {
    let app = build_test_app(Upstream::Rows(snapshot_rows(&["7", "8"])), FakeMedia::default());

    let (status, body) = send(
        app.router,
        post_download(json!({"access_token": "t", "page_ids": "1", "media_ad_ids": ["99"]})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["summary"]["media"]["ads_requested"], 0);
    assert!(app.media.jobs.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_download_blank_media_id_filter_skips_media() {
    let app = build_test_app(Upstream::Rows(snapshot_rows(&["7", "8"])), FakeMedia::default());

    let (status, body) = send(
        app.router,
        post_download(json!({"access_token": "t", "page_ids": "1", "media_ad_ids": [" "]})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["summary"]["total_ads"], 2);
    assert_eq!(body["summary"]["media"]["ads_requested"], 0);
    assert!(app.media.jobs.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_download_invalid_content_type() {
    let app = build_test_app(Upstream::Rows(snapshot_rows(&["1"])), FakeMedia::default());

    let request = Request::builder()
        .method("POST")
        .uri("/download")
        .header(header::CONTENT_TYPE, "text/plain")
        .body(Body::from(json!({"access_token": "t", "page_ids": "1"}).to_string()))
        .unwrap();

    let (status, body) = send(app.router, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_PAYLOAD");
}

#[tokio::test]
async fn test_download_payload_too_large() {
    let app = build_test_app(Upstream::Rows(snapshot_rows(&["1"])), FakeMedia::default());

    let padding = "x".repeat(2 * 1024 * 1024);
    let (status, body) = send(
        app.router,
        post_download(json!({"access_token": padding, "page_ids": "1"})),
    )
    .await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body["code"], "PAYLOAD_TOO_LARGE");
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = build_test_app(Upstream::Rows(snapshot_rows(&["1"])), FakeMedia::default());

    let (status, _) = send(
        app.router.clone(),
        post_download(json!({"access_token": "t", "page_ids": "1"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(app.router, request).await;

    assert_eq!(status, StatusCode::OK);
    let health: HealthResponse = serde_json::from_value(body).unwrap();
    assert_eq!(health.status, "healthy");
    assert_eq!(health.counters.requests_accepted, 1);
    assert_eq!(health.counters.requests_failed, 0);
    assert!(health.components.contains_key("storage"));
}
