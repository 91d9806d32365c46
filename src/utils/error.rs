use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Failures produced by the loyalty orchestrator.
///
/// Every variant except `SellerServiceUnavailable` and `Internal` is an expected
/// business outcome. The transport layer translates each of them into a wire response.
#[derive(Error, Debug)]
pub enum LoyaltyError {
    #[error("loyalty card not found")]
    CardNotFound,

    #[error("loyalty card already exists")]
    CardAlreadyExists,

    #[error("loyalty program not configured for this company")]
    ConfigNotFound,

    #[error("loyalty program is disabled for this company")]
    ConfigDisabled,

    #[error("loyalty program already configured for this company")]
    ConfigAlreadyExists,

    #[error("access denied: user is not a manager of this company")]
    AccessDenied,

    #[error("seller service unavailable")]
    SellerServiceUnavailable {
        #[source]
        source: LookupError,
    },

    #[error("invalid input: {message}")]
    InvalidInput { message: String },

    #[error("internal error: {context}")]
    Internal {
        context: String,
        #[source]
        source: Option<BoxError>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    RuleViolation,
    NotFound,
    Conflict,
    Dependency,
    Internal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl LoyaltyError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    pub fn internal<E>(context: impl Into<String>, source: E) -> Self
    where
        E: Into<BoxError>,
    {
        Self::Internal {
            context: context.into(),
            source: Some(source.into()),
        }
    }

    pub fn internal_without_source(context: impl Into<String>) -> Self {
        Self::Internal {
            context: context.into(),
            source: None,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ConfigDisabled | Self::AccessDenied | Self::InvalidInput { .. } => {
                ErrorCategory::RuleViolation
            }
            Self::CardNotFound | Self::ConfigNotFound => ErrorCategory::NotFound,
            Self::CardAlreadyExists | Self::ConfigAlreadyExists => ErrorCategory::Conflict,
            Self::SellerServiceUnavailable { .. } => ErrorCategory::Dependency,
            Self::Internal { .. } => ErrorCategory::Internal,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::RuleViolation | ErrorCategory::NotFound => ErrorSeverity::Low,
            ErrorCategory::Conflict => ErrorSeverity::Medium,
            ErrorCategory::Dependency => ErrorSeverity::High,
            ErrorCategory::Internal => ErrorSeverity::Critical,
        }
    }

    /// Whether the failure is the system's fault rather than an expected business outcome.
    pub fn is_system_failure(&self) -> bool {
        matches!(
            self.category(),
            ErrorCategory::Dependency | ErrorCategory::Internal
        )
    }

    /// Message safe to return to API callers. Never includes the underlying cause.
    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::CardNotFound => "Loyalty card not found".to_string(),
            Self::CardAlreadyExists => "Loyalty card already exists".to_string(),
            Self::ConfigNotFound => {
                "Loyalty program is not configured for this company".to_string()
            }
            Self::ConfigDisabled => "Loyalty program is disabled for this company".to_string(),
            Self::ConfigAlreadyExists => {
                "Loyalty program is already configured for this company".to_string()
            }
            Self::AccessDenied => {
                "Access denied: user is not a manager of this company".to_string()
            }
            Self::SellerServiceUnavailable { .. } => {
                "Seller service is temporarily unavailable, please retry later".to_string()
            }
            Self::InvalidInput { message } => format!("Invalid input: {}", message),
            Self::Internal { .. } => "Internal server error".to_string(),
        }
    }

    /// Stable machine-readable code for API error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            Self::CardNotFound => "CARD_NOT_FOUND",
            Self::CardAlreadyExists => "CARD_ALREADY_EXISTS",
            Self::ConfigNotFound => "CONFIG_NOT_FOUND",
            Self::ConfigDisabled => "CONFIG_DISABLED",
            Self::ConfigAlreadyExists => "CONFIG_ALREADY_EXISTS",
            Self::AccessDenied => "ACCESS_DENIED",
            Self::SellerServiceUnavailable { .. } => "SELLER_SERVICE_UNAVAILABLE",
            Self::InvalidInput { .. } => "INVALID_INPUT",
            Self::Internal { .. } => "INTERNAL_ERROR",
        }
    }
}

/// Outcomes reported by card and config stores.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,

    #[error("record already exists")]
    AlreadyExists,

    #[error("update has no fields to change")]
    EmptyUpdate,

    #[error("storage backend failure: {message}")]
    Backend { message: String },
}

/// Failure modes of the company (authorization) lookup.
#[derive(Error, Debug)]
pub enum LookupError {
    #[error("company not found")]
    CompanyNotFound,

    #[error("seller service request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("seller service returned unexpected status {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    #[error("seller service response could not be decoded: {message}")]
    InvalidResponse { message: String },
}

/// Errors raised while bootstrapping the service (configuration, clients, listeners).
#[derive(Error, Debug)]
pub enum SetupError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("HTTP client error: {0}")]
    HttpClientError(#[from] reqwest::Error),

    #[error("Configuration parse error: {message}")]
    ConfigParseError { message: String },

    #[error("Invalid configuration value for '{field}' ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },
}

impl SetupError {
    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::IoError(e) => format!("Could not read or bind a required resource: {}", e),
            Self::HttpClientError(_) => "Could not initialise the seller service client".to_string(),
            Self::ConfigParseError { message } => {
                format!("Configuration file could not be parsed: {}", message)
            }
            Self::InvalidConfigValueError { field, reason, .. } => {
                format!("Configuration field '{}' is invalid: {}", field, reason)
            }
            Self::MissingConfigError { field } => {
                format!("Configuration field '{}' is required", field)
            }
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            Self::IoError(_) => "Check that the config file exists and the port is free",
            Self::HttpClientError(_) => "Check the TLS setup and the seller_service section",
            Self::ConfigParseError { .. } => "Fix the TOML syntax in the configuration file",
            Self::InvalidConfigValueError { .. } => "Correct the value and restart the service",
            Self::MissingConfigError { .. } => "Add the missing field to the configuration file",
        }
    }
}

pub type Result<T> = std::result::Result<T, LoyaltyError>;
pub type StoreResult<T> = std::result::Result<T, StoreError>;
pub type SetupResult<T> = std::result::Result<T, SetupError>;
