use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

#[derive(Debug, Default, Clone, Serialize)]
pub struct MetricsData {
    pub total_requests: u64,
    pub successful_requests: u64,
    pub failed_requests: u64,
    pub retries: u64,
    pub failures_by_kind: HashMap<String, u64>,
    /// Running mean over successful requests, in milliseconds.
    pub average_response_ms: f64,
}

impl MetricsData {
    pub fn success_rate(&self) -> f64 {
        if self.total_requests == 0 {
            return 0.0;
        }
        self.successful_requests as f64 / self.total_requests as f64 * 100.0
    }
}

#[derive(Debug, Clone)]
pub struct MetricsManager {
    inner: Arc<RwLock<MetricsData>>,
}

impl Default for MetricsManager {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsManager {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(MetricsData::default())),
        }
    }

    pub async fn record_success(&self, elapsed: Duration) {
        let mut data = self.inner.write().await;
        data.total_requests += 1;
        data.successful_requests += 1;
        let ms = elapsed.as_secs_f64() * 1000.0;
        let n = data.successful_requests as f64;
        data.average_response_ms += (ms - data.average_response_ms) / n;
    }

    pub async fn record_failure(&self, kind: &str) {
        let mut data = self.inner.write().await;
        data.total_requests += 1;
        data.failed_requests += 1;
        *data.failures_by_kind.entry(kind.to_string()).or_insert(0) += 1;
    }

    pub async fn record_retry(&self) {
        self.inner.write().await.retries += 1;
    }

    pub async fn get_metrics(&self) -> MetricsData {
        self.inner.read().await.clone()
    }
}
