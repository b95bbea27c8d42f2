use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};

use relay_api::{Email, Notifier, NotifierFactory, PluginError, Subscriber};

/// Subscribers come from the web app's profile listing, emails go out
/// through a separate mail endpoint that accepts `{to, subject, body}`.
pub struct HttpNotifier {
    http: reqwest::Client,
    subscribers_url: String,
    email_url: String,
}

impl HttpNotifier {
    pub fn new(subscribers_url: String, email_url: String, timeout: Duration) -> Result<Self, PluginError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| PluginError::config(format!("HTTP client: {e}")))?;
        Ok(Self {
            http,
            subscribers_url,
            email_url,
        })
    }
}

impl Notifier for HttpNotifier {
    fn subscribers(
        &self,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<Subscriber>, PluginError>> + Send + '_>> {
        Box::pin(async move {
            let resp = self
                .http
                .get(&self.subscribers_url)
                .send()
                .await
                .map_err(|e| PluginError::io(format!("GET {}: {e}", self.subscribers_url)))?;

            let status = resp.status();
            if !status.is_success() {
                return Err(PluginError::io(format!("GET {}: {status}", self.subscribers_url)));
            }
            let bytes = resp
                .bytes()
                .await
                .map_err(|e| PluginError::io(format!("GET {} read: {e}", self.subscribers_url)))?;
            let subscribers: Vec<Subscriber> = serde_json::from_slice(&bytes)?;
            Ok(subscribers)
        })
    }

    fn send(&self, email: &Email) -> Pin<Box<dyn Future<Output = Result<(), PluginError>> + Send + '_>> {
        let email = email.clone();
        Box::pin(async move {
            let resp = self
                .http
                .post(&self.email_url)
                .json(&email)
                .send()
                .await
                .map_err(|e| PluginError::io(format!("POST {}: {e}", self.email_url)))?;

            let status = resp.status();
            if status.is_success() {
                tracing::debug!(to = %email.to, "email sent");
                Ok(())
            } else {
                Err(PluginError::io(format!("POST {}: {status}", self.email_url)))
            }
        })
    }
}

// ---- Factory ----

#[derive(serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct HttpNotifierConfig {
    base_url: String,
    #[serde(default = "default_subscribers_path")]
    subscribers_path: String,
    email_url: String,
    #[serde(default = "default_timeout_ms")]
    timeout_ms: u64,
}

fn default_subscribers_path() -> String {
    "profiles".into()
}
fn default_timeout_ms() -> u64 {
    10_000
}

pub struct HttpNotifierFactory;

impl NotifierFactory for HttpNotifierFactory {
    fn create(&self, config_json: &str) -> Result<Arc<dyn Notifier>, PluginError> {
        let cfg: HttpNotifierConfig = serde_json::from_str(config_json)
            .map_err(|e| PluginError::config(format!("http notifier config: {e}")))?;
        let subscribers_url = format!(
            "{}/{}",
            cfg.base_url.trim_end_matches('/'),
            cfg.subscribers_path.trim_start_matches('/')
        );
        tracing::info!(subscribers = %subscribers_url, email = %cfg.email_url, "http notifier ready");
        let notifier = HttpNotifier::new(subscribers_url, cfg.email_url, Duration::from_millis(cfg.timeout_ms))?;
        Ok(Arc::new(notifier))
    }
}
