use crate::domain::plan::{ContainerPlacement, NetworkPolicy, ObservedContainer, ObservedState};
use crate::domain::ports::{ClusterApi, ConfigProvider};
use crate::utils::error::{DeployError, Result};
use reqwest::Client;
use std::time::Duration;

const RETRY_DELAY: Duration = Duration::from_millis(500);

/// 透過 HTTP/JSON 操作遠端叢集管理器的 ClusterApi 實作
pub struct HttpClusterApi {
    base_url: String,
    client: Client,
    retry_attempts: u32,
}

impl HttpClusterApi {
    pub fn new(endpoint: &str, timeout: Duration, retry_attempts: u32) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: endpoint.trim_end_matches('/').to_string(),
            client,
            retry_attempts,
        })
    }

    pub fn from_config<F: ConfigProvider>(config: &F) -> Result<Self> {
        Self::new(
            config.cluster_endpoint(),
            Duration::from_secs(config.request_timeout_secs()),
            config.retry_attempts(),
        )
    }

    fn url(&self, namespace: &str, suffix: &str) -> String {
        format!("{}/namespaces/{}/{}", self.base_url, namespace, suffix)
    }

    /// 傳輸層錯誤（連不上、逾時）重試；非 2xx 回應直接視為叢集錯誤
    async fn send_checked(
        &self,
        label: &str,
        build: impl Fn() -> reqwest::RequestBuilder,
    ) -> Result<reqwest::Response> {
        let mut attempt = 0u32;
        let response = loop {
            match build().send().await {
                Ok(response) => break response,
                Err(err) if attempt < self.retry_attempts && (err.is_connect() || err.is_timeout()) => {
                    attempt += 1;
                    tracing::warn!(
                        "🔶 {} failed ({}); retry {}/{}",
                        label,
                        err,
                        attempt,
                        self.retry_attempts
                    );
                    tokio::time::sleep(RETRY_DELAY).await;
                }
                Err(err) => return Err(err.into()),
            }
        };

        tracing::debug!("{} -> {}", label, response.status());
        if !response.status().is_success() {
            return Err(DeployError::ClusterError {
                message: format!("{} returned status {}", label, response.status()),
            });
        }
        Ok(response)
    }
}

impl ClusterApi for HttpClusterApi {
    async fn observed_state(&self, namespace: &str) -> Result<ObservedState> {
        let url = self.url(namespace, "state");
        let response = self
            .send_checked("GET state", || self.client.get(&url))
            .await?;
        Ok(response.json::<ObservedState>().await?)
    }

    async fn boot_container(
        &self,
        namespace: &str,
        placement: &ContainerPlacement,
    ) -> Result<ObservedContainer> {
        let url = self.url(namespace, "containers");
        let response = self
            .send_checked("POST containers", || {
                self.client.post(&url).json(placement)
            })
            .await?;
        Ok(response.json::<ObservedContainer>().await?)
    }

    async fn terminate_container(&self, namespace: &str, container_id: &str) -> Result<()> {
        let url = self.url(namespace, &format!("containers/{}", container_id));
        self.send_checked("DELETE container", || self.client.delete(&url))
            .await?;
        Ok(())
    }

    async fn open_policy(&self, namespace: &str, policy: &NetworkPolicy) -> Result<()> {
        let url = self.url(namespace, "policies");
        self.send_checked("POST policies", || self.client.post(&url).json(policy))
            .await?;
        Ok(())
    }

    async fn close_policy(&self, namespace: &str, policy: &NetworkPolicy) -> Result<()> {
        let url = self.url(namespace, "policies");
        self.send_checked("DELETE policies", || self.client.delete(&url).json(policy))
            .await?;
        Ok(())
    }
}
