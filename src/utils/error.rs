use thiserror::Error;

/// Failure raised by the CMS boundary client.
#[derive(Error, Debug)]
pub enum CmsError {
    /// The CMS answered with an error document (bad query, version mismatch, unknown id, ...).
    #[error("CMS rejected the request ({status} {error_id}): {message}")]
    Api {
        status: u16,
        error_id: String,
        message: String,
        request_id: Option<String>,
    },

    #[error("CMS transport failure: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Unable to decode CMS payload: {0}")]
    Deserialization(#[from] serde_json::Error),

    #[error("Unexpected CMS failure: {0}")]
    Unexpected(String),
}

impl CmsError {
    /// True when the CMS itself reported a request-level fault.
    pub fn is_cms_fault(&self) -> bool {
        matches!(self, CmsError::Api { .. })
    }
}

#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("Missing required parameter: {parameter}")]
    InvalidArgument { parameter: &'static str },

    #[error("Error during {operation}({input}): {source}")]
    Content {
        operation: &'static str,
        input: String,
        #[source]
        source: CmsError,
    },

    #[error("Unable to complete {operation}({input}): {source}")]
    Process {
        operation: &'static str,
        input: String,
        #[source]
        source: CmsError,
    },

    #[error("Invalid configuration: {}", describe_config_problems(.missing, .invalid))]
    Config {
        missing: Vec<&'static str>,
        invalid: Vec<String>,
    },
}

fn describe_config_problems(missing: &[&'static str], invalid: &[String]) -> String {
    let mut parts = Vec::new();
    if !missing.is_empty() {
        parts.push(format!("missing {}", missing.join(", ")));
    }
    if !invalid.is_empty() {
        parts.push(invalid.join("; "));
    }
    parts.join("; ")
}

impl RepositoryError {
    /// Process errors are potentially transient; everything else needs different input.
    pub fn is_retryable(&self) -> bool {
        matches!(self, RepositoryError::Process { .. })
    }

    pub fn is_content_error(&self) -> bool {
        matches!(self, RepositoryError::Content { .. })
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            RepositoryError::InvalidArgument { .. } => "Supply a non-empty value for the parameter",
            RepositoryError::Content { source, .. } => match source {
                CmsError::Api { error_id, .. } if error_id == "VersionMismatch" => {
                    "Re-fetch the entry and retry with its current version"
                }
                _ => "Check the slug, id or payload sent to the CMS",
            },
            RepositoryError::Process { .. } => "Retry later; the failure may be transient",
            RepositoryError::Config { .. } => "Provide every required setting and retry",
        }
    }
}

/// Maps a boundary failure onto the two recoverability tiers.
pub fn classify(operation: &'static str, input: impl Into<String>, error: CmsError) -> RepositoryError {
    let input = input.into();
    if error.is_cms_fault() {
        RepositoryError::Content {
            operation,
            input,
            source: error,
        }
    } else {
        RepositoryError::Process {
            operation,
            input,
            source: error,
        }
    }
}

pub type Result<T> = std::result::Result<T, RepositoryError>;
