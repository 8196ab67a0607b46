//! Snapshot-page media downloader
//!
//! Opens each ad's snapshot page, collects the image and video sources it
//! references, and stores every asset under the project's folders:
//!
//! ```text
//! {project}/ads_images/ad_{id}_img{n}.{ext}
//! {project}/ads_videos/ad_{id}_vid{n}.{ext}
//! ```

use async_trait::async_trait;
use regex::Regex;
use std::sync::LazyLock;
use tracing::{debug, info, warn};

use super::http::{HttpClient, HttpConfig};
use super::traits::{MediaDownloader, MediaError};
use super::types::{AssetKind, AssetRef, MediaJob, MediaOutcome};
use crate::adlib::{ResultRow, SNAPSHOT_URL_FIELD, row_id};
use crate::config::MediaConfig;
use crate::storage::StorageClient;

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];
const VIDEO_EXTENSIONS: &[&str] = &["mp4", "webm", "mov"];

/// Source URLs found on a snapshot page
#[derive(Debug, Clone, PartialEq)]
pub struct AssetSource {
    pub kind: AssetKind,
    pub url: String,
}

static IMAGE_SRC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<img\b[^>]*?\bsrc\s*=\s*["']([^"']+)["']"#).expect("valid regex")
});

static VIDEO_SRC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<(?:video|source)\b[^>]*?\bsrc\s*=\s*["']([^"']+)["']"#).expect("valid regex")
});

/// Pulls `<img>`, `<video>` and `<source>` URLs out of snapshot HTML
#[derive(Debug, Clone)]
pub struct AssetExtractor {
    max_assets: usize,
}

impl AssetExtractor {
    pub fn new(max_assets: usize) -> Self {
        Self { max_assets }
    }

    /// Distinct http(s) asset URLs in page order, images before videos
    pub fn extract(&self, html: &str) -> Vec<AssetSource> {
        let images = IMAGE_SRC
            .captures_iter(html)
            .map(|c| (AssetKind::Image, c[1].to_string()));
        let videos = VIDEO_SRC
            .captures_iter(html)
            .map(|c| (AssetKind::Video, c[1].to_string()));

        let mut sources: Vec<AssetSource> = Vec::new();
        for (kind, raw) in images.chain(videos) {
            if sources.len() >= self.max_assets {
                break;
            }
            let url = raw.replace("&amp;", "&");
            if !url.starts_with("http://") && !url.starts_with("https://") {
                continue;
            }
            if sources.iter().any(|s| s.url == url) {
                continue;
            }
            sources.push(AssetSource { kind, url });
        }
        sources
    }
}

/// Pick the rows to process: the first `limit`, or a random sample of
/// `limit` rows kept in their original order.
pub fn select_rows(rows: &[ResultRow], limit: usize, random_sample: bool) -> Vec<&ResultRow> {
    let amount = limit.min(rows.len());

    if !random_sample {
        return rows.iter().take(amount).collect();
    }

    let mut indices = rand::seq::index::sample(&mut rand::rng(), rows.len(), amount).into_vec();
    indices.sort_unstable();
    indices.into_iter().map(|i| &rows[i]).collect()
}

/// Storage key for the `n`-th asset of an ad
pub fn asset_key(project: &str, ad_id: &str, kind: AssetKind, n: usize, url: &str) -> String {
    format!(
        "{}/{}/ad_{}_{}{}.{}",
        project,
        kind.folder(),
        ad_id,
        kind.tag(),
        n,
        extension_for(kind, url)
    )
}

fn extension_for(kind: AssetKind, url: &str) -> &'static str {
    let (known, fallback) = match kind {
        AssetKind::Image => (IMAGE_EXTENSIONS, "jpg"),
        AssetKind::Video => (VIDEO_EXTENSIONS, "mp4"),
    };

    let path = url.split(['?', '#']).next().unwrap_or_default();
    let ext = path
        .rsplit('/')
        .next()
        .and_then(|name| name.rsplit_once('.'))
        .map(|(_, ext)| ext.to_ascii_lowercase());

    ext.and_then(|ext| known.iter().find(|k| **k == ext).copied())
        .unwrap_or(fallback)
}

/// Per-ad download tally
#[derive(Debug, Default)]
struct RowReport {
    assets: Vec<AssetRef>,
    failures: usize,
}

impl RowReport {
    fn succeeded(&self) -> bool {
        self.failures == 0 && !self.assets.is_empty()
    }
}

/// Downloads creatives referenced by snapshot pages
pub struct SnapshotDownloader {
    http_config: HttpConfig,
    storage: StorageClient,
    extractor: AssetExtractor,
}

impl SnapshotDownloader {
    pub fn new(config: &MediaConfig, storage: StorageClient) -> Self {
        Self {
            http_config: HttpConfig::from(config),
            storage,
            extractor: AssetExtractor::new(config.max_assets_per_ad),
        }
    }

    async fn download_row(
        &self,
        http: &HttpClient,
        project: &str,
        ad_id: &str,
        row: &ResultRow,
    ) -> RowReport {
        let mut report = RowReport::default();

        let Some(snapshot_url) = row.get(SNAPSHOT_URL_FIELD).and_then(|v| v.as_str()) else {
            warn!(project, ad_id, "Row has no snapshot URL");
            report.failures += 1;
            return report;
        };

        let html = match http.fetch_text(snapshot_url).await {
            Ok(html) => html,
            Err(e) => {
                warn!(project, ad_id, error = %e, "Snapshot page unavailable");
                report.failures += 1;
                return report;
            }
        };

        let sources = self.extractor.extract(&html);
        if sources.is_empty() {
            debug!(project, ad_id, "No media found on snapshot page");
        }

        let mut counters = [0usize; 2];
        for source in sources {
            let slot = match source.kind {
                AssetKind::Image => 0,
                AssetKind::Video => 1,
            };
            let key = asset_key(project, ad_id, source.kind, counters[slot], &source.url);
            counters[slot] += 1;

            let stored = match http.download(&source.url).await {
                Ok(bytes) => self
                    .storage
                    .upload(&key, bytes.to_vec())
                    .await
                    .map_err(|e| e.to_string()),
                Err(e) => Err(e.to_string()),
            };

            match stored {
                Ok(meta) => report.assets.push(AssetRef {
                    ad_id: ad_id.to_string(),
                    kind: source.kind,
                    source_url: source.url,
                    key: meta.key,
                    size: meta.size,
                }),
                Err(error) => {
                    warn!(project, ad_id, url = %source.url, error = %error, "Asset download failed");
                    report.failures += 1;
                }
            }
        }

        report
    }
}

#[async_trait]
impl MediaDownloader for SnapshotDownloader {
    async fn download(&self, job: MediaJob) -> Result<MediaOutcome, MediaError> {
        if job.project_name.trim().is_empty() {
            return Err(MediaError::InvalidJob("project name is empty".into()));
        }

        let http = HttpClient::new(self.http_config.clone())?;
        let selected = select_rows(&job.rows, job.limit, job.random_sample);

        info!(
            project = %job.project_name,
            selected = selected.len(),
            random_sample = job.random_sample,
            storage = %self.storage.location,
            "Starting media download"
        );

        let mut outcome = MediaOutcome {
            requested: selected.len(),
            ..MediaOutcome::default()
        };

        for (index, row) in selected.into_iter().enumerate() {
            let ad_id = row_id(row).unwrap_or_else(|| format!("row{}", index));
            let report = self.download_row(&http, &job.project_name, &ad_id, row).await;

            if report.succeeded() {
                outcome.succeeded += 1;
            } else {
                outcome.failed += 1;
            }
            outcome.assets.extend(report.assets);
        }

        info!(
            project = %job.project_name,
            succeeded = outcome.succeeded,
            failed = outcome.failed,
            assets = outcome.assets.len(),
            "Media download finished"
        );

        Ok(outcome)
    }
}
