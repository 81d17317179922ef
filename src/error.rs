use thiserror::Error;

/// Main error type for azresolve operations
#[derive(Debug, Error)]
pub enum AzResolveError {
    #[error(
        "Authentication failed: interactive session: {interactive}; environment credentials: {environment}"
    )]
    AuthenticationFailure {
        interactive: String,
        environment: String,
    },

    #[error("Authentication error: {0}")]
    AuthenticationError(String),

    #[error("Logged in identity does not have access to any subscriptions")]
    SubscriptionNotFound,

    #[error("{kind} '{name}' not found")]
    ResourceNotFound { kind: String, name: String },

    #[error("Malformed resource identifier: '{id}'")]
    MalformedIdentifier { id: String },

    #[error("No keys returned for {resource}")]
    KeyListEmpty { resource: String },

    #[error("Azure API error: HTTP {status}: {message}")]
    AzureApiError { status: u16, message: String },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Connection timeout: {0}")]
    ConnectionTimeout(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("HTTP request error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Configuration file error: {0}")]
    ConfigFileError(#[from] toml::de::Error),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("{context}: {source}")]
    Context {
        context: String,
        #[source]
        source: Box<AzResolveError>,
    },
}

impl AzResolveError {
    pub fn authentication_failure<S: Into<String>>(interactive: S, environment: S) -> Self {
        Self::AuthenticationFailure {
            interactive: interactive.into(),
            environment: environment.into(),
        }
    }

    pub fn authentication<S: Into<String>>(msg: S) -> Self {
        Self::AuthenticationError(msg.into())
    }

    pub fn resource_not_found<K: Into<String>, N: Into<String>>(kind: K, name: N) -> Self {
        Self::ResourceNotFound {
            kind: kind.into(),
            name: name.into(),
        }
    }

    pub fn malformed_identifier<S: Into<String>>(id: S) -> Self {
        Self::MalformedIdentifier { id: id.into() }
    }

    pub fn key_list_empty<S: Into<String>>(resource: S) -> Self {
        Self::KeyListEmpty {
            resource: resource.into(),
        }
    }

    pub fn azure_api<S: Into<String>>(status: u16, message: S) -> Self {
        Self::AzureApiError {
            status,
            message: message.into(),
        }
    }

    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::ConfigError(msg.into())
    }

    pub fn network<S: Into<String>>(msg: S) -> Self {
        Self::NetworkError(msg.into())
    }

    pub fn connection_timeout<S: Into<String>>(msg: S) -> Self {
        Self::ConnectionTimeout(msg.into())
    }

    pub fn serialization<S: Into<String>>(msg: S) -> Self {
        Self::SerializationError(msg.into())
    }

    /// Wrap this error with a description of the stage that produced it
    pub fn with_context<S: Into<String>>(self, context: S) -> Self {
        Self::Context {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// The innermost error, with all stage context peeled off
    pub fn root(&self) -> &AzResolveError {
        let mut current = self;
        while let Self::Context { source, .. } = current {
            current = &**source;
        }
        current
    }
}

/// Result type alias for azresolve operations
pub type Result<T> = std::result::Result<T, AzResolveError>;

/// Attach stage context to a failed result
pub trait ResultExt<T> {
    fn context<S: Into<String>>(self, context: S) -> Result<T>;

    fn with_context<S: Into<String>, F: FnOnce() -> S>(self, f: F) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context<S: Into<String>>(self, context: S) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }

    fn with_context<S: Into<String>, F: FnOnce() -> S>(self, f: F) -> Result<T> {
        self.map_err(|e| e.with_context(f()))
    }
}

/// Convert Azure Core errors to AzResolveError
impl From<azure_core::Error> for AzResolveError {
    fn from(error: azure_core::Error) -> Self {
        Self::NetworkError(error.to_string())
    }
}
