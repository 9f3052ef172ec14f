use anyhow::Result;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use tracing::{info, warn};

#[derive(Debug, Clone, Serialize)]
pub struct AlertPayload {
    pub timestamp: DateTime<Utc>,
    pub alert_type: String,
    pub severity: String,
    pub node_name: String,
    pub message: String,
    pub details: Option<serde_json::Value>,
}

/// Posts cycle-failure alerts to a webhook. An empty webhook URL
/// disables alerting entirely.
pub struct AlertService {
    webhook_url: String,
    client: Client,
}

impl AlertService {
    pub fn new(webhook_url: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("Failed to create HTTP client for AlertService");

        Self {
            webhook_url,
            client,
        }
    }

    pub fn is_enabled(&self) -> bool {
        !self.webhook_url.is_empty()
    }

    /// Sends a failed-cycle alert. Alert delivery problems are the
    /// caller's to log; they must never fail the snapshot path itself.
    pub async fn send_cycle_failure(
        &self,
        node_name: &str,
        chain_id: &str,
        message: &str,
    ) -> Result<()> {
        if !self.is_enabled() {
            return Ok(());
        }

        let payload = AlertPayload {
            timestamp: Utc::now(),
            alert_type: "snapshot_cycle".to_string(),
            severity: "high".to_string(),
            node_name: node_name.to_string(),
            message: message.to_string(),
            details: Some(serde_json::json!({
                "chain_id": chain_id,
                "timestamp": Utc::now().to_rfc3339(),
            })),
        };

        let response = self
            .client
            .post(&self.webhook_url)
            .json(&payload)
            .send()
            .await?;

        if response.status().is_success() {
            info!("Sent cycle failure alert for {}", node_name);
        } else {
            warn!(
                "Failed to send cycle failure alert for {}: HTTP {}",
                node_name,
                response.status()
            );
        }

        Ok(())
    }
}
