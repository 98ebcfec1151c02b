use crate::error::ConfigError;

/// Runtime configuration, read from the environment at startup.
///
/// AWS credentials are not handled here; `aws-config` resolves them through
/// the standard environment/profile chain when the S3 client is built.
#[derive(Debug, Clone)]
pub struct Config {
    /// LINE channel secret, the webhook signing key.
    pub channel_secret: String,
    /// LINE channel access token for the reply and content APIs.
    pub channel_access_token: String,
    /// S3 bucket receiving uploaded photos.
    pub bucket: String,
    /// CDN domain the bucket is served from, e.g. `d13rqy4yzh3fb6.cloudfront.net`.
    pub cdn_domain: String,
    /// Path of the SQLite database file.
    pub database_path: String,
    /// URL pinged every 20 minutes to keep the dyno awake, if set.
    pub keepalive_url: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            channel_secret: require("LINE_CHANNEL_SECRET")?,
            channel_access_token: require("LINE_CHANNEL_ACCESS_TOKEN")?,
            bucket: require("S3_BUCKET")?,
            cdn_domain: require("CDN_DOMAIN")?,
            database_path: std::env::var("DATABASE_PATH")
                .unwrap_or_else(|_| "photoline.sqlite".to_string()),
            keepalive_url: std::env::var("KEEPALIVE_URL").ok().filter(|v| !v.is_empty()),
        })
    }
}

fn require(name: &'static str) -> Result<String, ConfigError> {
    match std::env::var(name) {
        Ok(v) if !v.is_empty() => Ok(v),
        _ => Err(ConfigError::MissingEnv(name)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_missing() {
        assert!(matches!(
            require("PHOTOLINE_TEST_DOES_NOT_EXIST"),
            Err(ConfigError::MissingEnv("PHOTOLINE_TEST_DOES_NOT_EXIST"))
        ));
    }
}
