//! HTTP run-registry client.

use async_trait::async_trait;
use daqsim_core::{RegistryError, RunRegistry};
use daqsim_types::RunId;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Configuration for the run-monitor client.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Base URL of the monitor service.
    pub base_url: String,

    /// API token sent as `Authorization: Token <token>`, if any.
    pub api_token: Option<String>,

    /// Accept invalid TLS certificates (testbed deployments only).
    pub insecure: bool,

    /// Request timeout.
    pub timeout: Duration,
}

impl MonitorConfig {
    /// Config for a monitor at the given base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_token: None,
            insecure: false,
            timeout: Duration::from_secs(10),
        }
    }

    /// Set the API token.
    pub fn with_api_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(token.into());
        self
    }

    /// Accept invalid TLS certificates.
    pub fn with_insecure(mut self, insecure: bool) -> Self {
        self.insecure = insecure;
        self
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[derive(Debug, Deserialize)]
struct NextRunNumberResponse {
    run_number: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct HeartbeatResponse {
    status: Option<String>,
}

#[derive(Debug, Serialize)]
struct HeartbeatPayload<'a> {
    instance_name: &'a str,
    agent_type: &'a str,
    status: &'a str,
    description: String,
    workflow_enabled: bool,
}

/// Run registry backed by the monitor's REST API.
pub struct HttpRunRegistry {
    config: MonitorConfig,
    client: reqwest::Client,
    agent_name: String,
    agent_type: String,
}

impl HttpRunRegistry {
    /// Build a client for the given monitor.
    pub fn new(config: MonitorConfig) -> Result<Self, RegistryError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .danger_accept_invalid_certs(config.insecure)
            .build()
            .map_err(|e| RegistryError::Request(e.to_string()))?;

        Ok(Self {
            config,
            client,
            agent_name: "daq-simulator".to_string(),
            agent_type: "daqsim".to_string(),
        })
    }

    fn request(&self, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.config.base_url.trim_end_matches('/'), path);
        let mut builder = self.client.post(url);
        if let Some(token) = &self.config.api_token {
            builder = builder.header("Authorization", format!("Token {}", token));
        }
        builder
    }
}

#[async_trait]
impl RunRegistry for HttpRunRegistry {
    async fn next_run_id(&self) -> Result<RunId, RegistryError> {
        let response = self
            .request("/api/state/next-run-number/")
            .send()
            .await
            .map_err(|e| RegistryError::Request(e.to_string()))?
            .error_for_status()
            .map_err(|e| RegistryError::Request(e.to_string()))?;

        let body: NextRunNumberResponse = response
            .json()
            .await
            .map_err(|e| RegistryError::Response(e.to_string()))?;

        match body.run_number {
            Some(id) => {
                debug!(run_id = id, "Allocated run number from monitor");
                Ok(RunId(id))
            }
            None => Err(RegistryError::Response(
                "no run_number in response".to_string(),
            )),
        }
    }

    async fn heartbeat(&self, status: &str) -> Result<(), RegistryError> {
        let payload = HeartbeatPayload {
            instance_name: &self.agent_name,
            agent_type: &self.agent_type,
            status,
            description: format!("DAQ simulator agent {} is running", self.agent_name),
            workflow_enabled: false,
        };

        let response = self
            .request("/api/systemagents/heartbeat/")
            .json(&payload)
            .send()
            .await
            .map_err(|e| RegistryError::Request(e.to_string()))?
            .error_for_status()
            .map_err(|e| RegistryError::Request(e.to_string()))?;

        let body: HeartbeatResponse = response
            .json()
            .await
            .map_err(|e| RegistryError::Response(e.to_string()))?;

        match body.status.as_deref() {
            Some("ok") => Ok(()),
            other => Err(RegistryError::Response(format!(
                "unexpected heartbeat status: {:?}",
                other
            ))),
        }
    }
}
