use crate::domain::ports::ConfigProvider;
use crate::utils::error::{DeployError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;
const DEFAULT_CONVERGE_TIMEOUT_SECS: u64 = 120;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
const DEFAULT_RETRY_ATTEMPTS: u32 = 3;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    pub engine: EngineSection,
    pub cluster: ClusterSection,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineSection {
    pub namespace: Option<String>,
    pub poll_interval_seconds: Option<u64>,
    pub converge_timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterSection {
    pub endpoint: String,
    pub timeout_seconds: Option<u64>,
    pub retry_attempts: Option<u32>,
}

impl EngineConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(DeployError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| DeployError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${CLUSTER_ENDPOINT})；未設定的變數原樣保留
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").unwrap();

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        validation::validate_url("cluster.endpoint", &self.cluster.endpoint)?;

        if let Some(namespace) = &self.engine.namespace {
            validation::validate_label("engine.namespace", namespace)?;
        }

        if let Some(poll) = self.engine.poll_interval_seconds {
            validation::validate_range("engine.poll_interval_seconds", poll, 1, 3600)?;
        }

        if let Some(timeout) = self.engine.converge_timeout_seconds {
            validation::validate_positive_number(
                "engine.converge_timeout_seconds",
                timeout as usize,
                1,
            )?;
        }

        if let Some(timeout) = self.cluster.timeout_seconds {
            validation::validate_range("cluster.timeout_seconds", timeout, 1, 300)?;
        }

        Ok(())
    }
}

impl ConfigProvider for EngineConfig {
    fn cluster_endpoint(&self) -> &str {
        &self.cluster.endpoint
    }

    fn namespace_override(&self) -> Option<&str> {
        self.engine.namespace.as_deref()
    }

    fn poll_interval_secs(&self) -> u64 {
        self.engine
            .poll_interval_seconds
            .unwrap_or(DEFAULT_POLL_INTERVAL_SECS)
    }

    fn converge_timeout_secs(&self) -> u64 {
        self.engine
            .converge_timeout_seconds
            .unwrap_or(DEFAULT_CONVERGE_TIMEOUT_SECS)
    }

    fn request_timeout_secs(&self) -> u64 {
        self.cluster
            .timeout_seconds
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS)
    }

    fn retry_attempts(&self) -> u32 {
        self.cluster.retry_attempts.unwrap_or(DEFAULT_RETRY_ATTEMPTS)
    }
}

impl Validate for EngineConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
