// src/services/webhook_client.rs
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Url;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::ChatConfig;
use crate::error::{ChatError, WebhookError};
use crate::message::{HistoryEntry, Message, OutboundPayload, RequestContext, RequestMetadata};
use crate::services::interpreter::RawResponse;
use crate::services::metrics_manager::MetricsManager;

const PROBE_TIMEOUT: Duration = Duration::from_secs(5);
const PROBE_MESSAGE: &str = "test_connection";

/// Anything that can turn an outbound payload into a raw reply.
#[async_trait]
pub trait ReplySource: Send + Sync {
    async fn fetch(&self, payload: &OutboundPayload) -> Result<RawResponse, WebhookError>;

    fn metrics(&self) -> Option<&MetricsManager> {
        None
    }
}

/// Exponential backoff: `base`, `base * multiplier`, `base * multiplier^2`, ...
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
    pub multiplier: u32,
}

impl RetryPolicy {
    pub fn from_config(config: &ChatConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            base_delay: config.retry_delay,
            multiplier: config.retry_multiplier.max(1),
        }
    }

    /// Delay before retry number `retry` (1-based).
    pub fn delay_for(&self, retry: u32) -> Duration {
        let factor = self.multiplier.saturating_pow(retry.saturating_sub(1));
        self.base_delay.saturating_mul(factor)
    }
}

pub fn build_payload(config: &ChatConfig, session_id: &str, text: &str, history: &[Message]) -> OutboundPayload {
    OutboundPayload {
        message: text.trim().to_string(),
        session_id: session_id.to_string(),
        timestamp: Utc::now(),
        context: RequestContext {
            user_agent: config.user_agent.clone(),
            url: config.page_url.clone(),
            locale: config.locale.clone(),
            timezone: config.timezone.clone(),
            history: history.iter().map(HistoryEntry::from).collect(),
        },
        metadata: RequestMetadata {
            request_id: format!("req_{}", Uuid::new_v4().simple()),
            source: config.source.clone(),
            version: config.version.clone(),
        },
    }
}

#[derive(Debug, Clone)]
pub struct WebhookClient {
    http: reqwest::Client,
    url: Url,
    timeout: Duration,
    retry: RetryPolicy,
    metrics: MetricsManager,
}

impl WebhookClient {
    pub fn new(config: &ChatConfig) -> Result<Self, ChatError> {
        let url = config.parsed_webhook_url()?;
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| ChatError::InvalidConfiguration(format!("cannot build HTTP client: {e}")))?;

        Ok(Self {
            http,
            url,
            timeout: config.timeout,
            retry: RetryPolicy::from_config(config),
            metrics: MetricsManager::new(),
        })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// POST the payload, retrying transient failures per the retry policy.
    pub async fn send(&self, payload: &OutboundPayload) -> Result<RawResponse, WebhookError> {
        let request_id = payload.metadata.request_id.as_str();
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;
            let started = Instant::now();
            debug!(request_id, attempt, url = %self.url, "sending message to webhook");

            match self.send_once(payload, self.timeout).await {
                Ok(raw) => {
                    let elapsed = started.elapsed();
                    self.metrics.record_success(elapsed).await;
                    info!(request_id, attempt, duration_ms = elapsed.as_millis() as u64, "webhook replied");
                    return Ok(raw);
                }
                Err(e) if e.is_retryable() && attempt <= self.retry.max_retries => {
                    let delay = self.retry.delay_for(attempt);
                    warn!(
                        request_id,
                        attempt,
                        max_retries = self.retry.max_retries,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "webhook request failed, retrying"
                    );
                    self.metrics.record_retry().await;
                    tokio::time::sleep(delay).await;
                }
                Err(e) => {
                    self.metrics.record_failure(e.kind()).await;
                    warn!(request_id, attempt, error = %e, "webhook request failed");
                    return Err(e);
                }
            }
        }
    }

    /// One-shot connectivity check. Never retried and never fatal.
    pub async fn probe(&self, config: &ChatConfig, session_id: &str) -> bool {
        let payload = build_payload(config, session_id, PROBE_MESSAGE, &[]);
        match self.send_once(&payload, PROBE_TIMEOUT.min(self.timeout)).await {
            Ok(_) => {
                info!(url = %self.url, "webhook connection test succeeded");
                true
            }
            Err(e) => {
                warn!(url = %self.url, error = %e, "webhook connection test failed, continuing");
                false
            }
        }
    }

    async fn send_once(&self, payload: &OutboundPayload, timeout: Duration) -> Result<RawResponse, WebhookError> {
        tokio::time::timeout(timeout, self.exchange(payload))
            .await
            .map_err(|_| WebhookError::Timeout)?
    }

    async fn exchange(&self, payload: &OutboundPayload) -> Result<RawResponse, WebhookError> {
        let response = self
            .http
            .post(self.url.clone())
            .header("X-Session-ID", payload.session_id.as_str())
            .header("X-Request-ID", payload.metadata.request_id.as_str())
            .json(payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(WebhookError::HttpError { status: status.as_u16() });
        }

        let body = response.text().await?;
        Ok(RawResponse::from_body(&body))
    }
}

#[async_trait]
impl ReplySource for WebhookClient {
    async fn fetch(&self, payload: &OutboundPayload) -> Result<RawResponse, WebhookError> {
        self.send(payload).await
    }

    fn metrics(&self) -> Option<&MetricsManager> {
        Some(&self.metrics)
    }
}
