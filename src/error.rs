//! Error types and handling for Sunrise Navigator

use thiserror::Error;

/// Main error type for the Sunrise Navigator library
#[derive(Error, Debug)]
pub enum SunriseError {
    /// Configuration-related errors (missing or malformed API keys, bad URLs)
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Upstream API answered, but not with something usable
    #[error("API error: {message}")]
    Api { message: String },

    /// Input validation errors
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// Upstream did not settle before its deadline or could not be reached
    #[error("{service} is unavailable: {message}")]
    UpstreamUnavailable { service: String, message: String },

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// General application errors
    #[error("Application error: {message}")]
    General { message: String },
}

impl SunriseError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new API error
    pub fn api<S: Into<String>>(message: S) -> Self {
        Self::Api {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a new upstream-unavailable error for the named service
    pub fn unavailable<S: Into<String>, M: Into<String>>(service: S, message: M) -> Self {
        Self::UpstreamUnavailable {
            service: service.into(),
            message: message.into(),
        }
    }

    /// Create a new general error
    pub fn general<S: Into<String>>(message: S) -> Self {
        Self::General {
            message: message.into(),
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            SunriseError::Config { .. } => {
                "Configuration error. Please check your config file and API keys.".to_string()
            }
            SunriseError::Api { .. } | SunriseError::UpstreamUnavailable { .. } => {
                "Could not fetch all morning briefing data. Please try again.".to_string()
            }
            SunriseError::Validation { message } => {
                format!("Invalid input: {message}")
            }
            SunriseError::Io { .. } => {
                "File operation failed. Please check file permissions.".to_string()
            }
            SunriseError::General { message } => message.clone(),
        }
    }
}

impl From<reqwest::Error> for SunriseError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            SunriseError::api(format!("Failed to parse response: {err}"))
        } else {
            let service = err
                .url()
                .and_then(|url| url.host_str().map(str::to_string))
                .unwrap_or_else(|| "upstream".to_string());
            SunriseError::unavailable(service, redact(&err.without_url().to_string()))
        }
    }
}

/// Strip anything that looks like a credential from a message or URL.
#[must_use]
pub fn redact(text: &str) -> String {
    const SECRET_PARAMS: [&str; 4] = ["key=", "appid=", "apiKey=", "api_key="];

    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some((pos, param)) = SECRET_PARAMS
        .iter()
        .filter_map(|p| rest.find(p).map(|pos| (pos, *p)))
        .min_by_key(|(pos, _)| *pos)
    {
        let value_start = pos + param.len();
        out.push_str(&rest[..value_start]);
        out.push_str("***");
        let value_end = rest[value_start..]
            .find(['&', ' ', ')', '"'])
            .map_or(rest.len(), |end| value_start + end);
        rest = &rest[value_end..];
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let config_err = SunriseError::config("missing API key");
        assert!(matches!(config_err, SunriseError::Config { .. }));

        let api_err = SunriseError::api("bad payload");
        assert!(matches!(api_err, SunriseError::Api { .. }));

        let unavailable = SunriseError::unavailable("weather", "deadline elapsed");
        assert_eq!(
            unavailable.to_string(),
            "weather is unavailable: deadline elapsed"
        );
    }

    #[test]
    fn test_user_messages() {
        let config_err = SunriseError::config("test");
        assert!(config_err.user_message().contains("Configuration error"));

        let unavailable = SunriseError::unavailable("news", "timeout");
        assert!(unavailable.user_message().contains("morning briefing"));

        let validation_err = SunriseError::validation("bad time");
        assert!(validation_err.user_message().contains("bad time"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: SunriseError = io_err.into();
        assert!(matches!(err, SunriseError::Io { .. }));
    }

    #[test]
    fn test_redact_hides_keys() {
        let url = "https://api.example.com/weather?q=Tokyo&appid=secret123&units=metric";
        assert_eq!(
            redact(url),
            "https://api.example.com/weather?q=Tokyo&appid=***&units=metric"
        );

        let two = "origins=a&key=abc destinations apiKey=xyz";
        assert_eq!(redact(two), "origins=a&key=*** destinations apiKey=***");
        assert_eq!(redact("nothing to hide"), "nothing to hide");
    }
}
