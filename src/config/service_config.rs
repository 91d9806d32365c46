use crate::utils::error::{SetupError, SetupResult};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    #[serde(default)]
    pub server: ServerConfig,
    pub seller_service: SellerServiceConfig,
    #[serde(default)]
    pub logs: LogsConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_http_port")]
    pub http_port: u16,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
    /// Upper bound on draining in-flight requests after a shutdown signal.
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SellerServiceConfig {
    pub base_url: String,
    #[serde(default = "default_seller_timeout")]
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogsConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// `compact` or `json`
    #[serde(default = "default_log_format")]
    pub format: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_metrics_path")]
    pub path: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_http_port() -> u16 {
    8080
}

fn default_request_timeout() -> u64 {
    10
}

fn default_shutdown_timeout() -> u64 {
    10
}

fn default_metrics_path() -> String {
    "/metrics".to_string()
}

fn default_seller_timeout() -> u64 {
    5
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "compact".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            http_port: default_http_port(),
            request_timeout_seconds: default_request_timeout(),
            shutdown_timeout_seconds: default_shutdown_timeout(),
        }
    }
}

impl Default for LogsConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            path: default_metrics_path(),
        }
    }
}

impl ServiceConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> SetupResult<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> SetupResult<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| SetupError::ConfigParseError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${SELLER_SERVICE_URL})；未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> SetupResult<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| SetupError::ConfigParseError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn listen_addr(&self) -> SetupResult<SocketAddr> {
        let raw = format!("{}:{}", self.server.host, self.server.http_port);
        raw.parse()
            .map_err(|e: std::net::AddrParseError| SetupError::InvalidConfigValueError {
                field: "server.host".to_string(),
                value: raw.clone(),
                reason: e.to_string(),
            })
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.server.request_timeout_seconds)
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.server.shutdown_timeout_seconds)
    }

    pub fn seller_timeout(&self) -> Duration {
        Duration::from_secs(self.seller_service.timeout_seconds)
    }
}

impl Validate for ServiceConfig {
    fn validate(&self) -> SetupResult<()> {
        validation::validate_non_empty_string("server.host", &self.server.host)?;
        validation::validate_range("server.http_port", self.server.http_port, 1, u16::MAX)?;
        validation::validate_positive_number(
            "server.request_timeout_seconds",
            self.server.request_timeout_seconds,
            1,
        )?;
        validation::validate_positive_number(
            "server.shutdown_timeout_seconds",
            self.server.shutdown_timeout_seconds,
            1,
        )?;
        self.listen_addr()?;

        if self.seller_service.base_url.trim().is_empty() {
            return Err(SetupError::MissingConfigError {
                field: "seller_service.base_url".to_string(),
            });
        }
        validation::validate_url("seller_service.base_url", &self.seller_service.base_url)?;
        validation::validate_positive_number(
            "seller_service.timeout_seconds",
            self.seller_service.timeout_seconds,
            1,
        )?;

        validation::validate_non_empty_string("logs.level", &self.logs.level)?;
        validation::validate_one_of("logs.format", &self.logs.format, &["compact", "json"])?;

        if self.metrics.enabled {
            validation::validate_route_path("metrics.path", &self.metrics.path)?;
        }

        tracing::debug!("Service configuration validation passed");
        Ok(())
    }
}
