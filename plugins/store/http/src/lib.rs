use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};

use relay_api::{PluginError, Record, RecordStore, StoreFactory};

/// REST store backend.
///
/// `GET {base_url}{records_path}` → JSON array of records, oldest first.
/// `POST {base_url}{records_path}` ← one JSON record.
///
/// One `reqwest::Client` for the lifetime of the store, so connections
/// are pooled between datagrams.
pub struct HttpStore {
    http: reqwest::Client,
    records_url: String,
}

impl HttpStore {
    pub fn new(base_url: &str, records_path: &str, timeout: Duration) -> Result<Self, PluginError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| PluginError::config(format!("HTTP client: {e}")))?;
        Ok(Self {
            http,
            records_url: join_url(base_url, records_path),
        })
    }

    pub fn records_url(&self) -> &str {
        &self.records_url
    }
}

impl RecordStore for HttpStore {
    fn list(&self) -> Pin<Box<dyn Future<Output = Result<Vec<Record>, PluginError>> + Send + '_>> {
        Box::pin(async move {
            let resp = self
                .http
                .get(&self.records_url)
                .send()
                .await
                .map_err(|e| PluginError::io(format!("GET {}: {e}", self.records_url)))?;

            let status = resp.status();
            let body = resp
                .text()
                .await
                .map_err(|e| PluginError::io(format!("GET {} read: {e}", self.records_url)))?;
            if !status.is_success() {
                return Err(PluginError::io(format!("GET {}: {status}: {body}", self.records_url)));
            }

            let records: Vec<Record> = serde_json::from_str(&body)
                .map_err(|e| PluginError::format(format!("records: {e}")))?;
            tracing::debug!(url = %self.records_url, count = records.len(), "listed records");
            Ok(records)
        })
    }

    fn save(&self, record: &Record) -> Pin<Box<dyn Future<Output = Result<(), PluginError>> + Send + '_>> {
        let record = record.clone();
        Box::pin(async move {
            let resp = self
                .http
                .post(&self.records_url)
                .json(&record)
                .send()
                .await
                .map_err(|e| PluginError::io(format!("POST {}: {e}", self.records_url)))?;

            let status = resp.status();
            if status.is_success() {
                Ok(())
            } else {
                let body = resp.text().await.unwrap_or_default();
                Err(PluginError::io(format!("POST {}: {status}: {body}", self.records_url)))
            }
        })
    }
}

/// `base` + `path` with exactly one `/` between them.
fn join_url(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}

// ---- Factory ----

#[derive(serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct HttpStoreConfig {
    base_url: String,
    #[serde(default = "default_records_path")]
    records_path: String,
    #[serde(default = "default_timeout_ms")]
    timeout_ms: u64,
}

fn default_records_path() -> String {
    "notificatons".into()
}
fn default_timeout_ms() -> u64 {
    10_000
}

pub struct HttpStoreFactory;

impl StoreFactory for HttpStoreFactory {
    fn create(&self, config_json: &str) -> Result<Arc<dyn RecordStore>, PluginError> {
        let cfg: HttpStoreConfig = serde_json::from_str(config_json)
            .map_err(|e| PluginError::config(format!("http store config: {e}")))?;
        let store = HttpStore::new(
            &cfg.base_url,
            &cfg.records_path,
            Duration::from_millis(cfg.timeout_ms),
        )?;
        tracing::info!(url = %store.records_url(), timeout_ms = cfg.timeout_ms, "http store ready");
        Ok(Arc::new(store))
    }
}
