//! Client configuration.

use std::path::PathBuf;
use std::time::Duration;

use tracing::warn;

use crate::api::Endpoints;
use crate::auth::CognitoClient;
use crate::dashboard::{Credentials, Presigner};
use crate::trigger::DEFAULT_QUIET_INTERVAL;

pub const DEFAULT_REGION: &str = "us-east-2";
pub const DEFAULT_OBJECT_KEY: &str = "{user_id}/dashboard.json";
pub const DEFAULT_DASHBOARD_TTL_SECS: u64 = 300;

/// Configuration for the Omnicode client.
#[derive(Clone, Debug)]
pub struct OmnicodeConfig {
    pub region: String,
    /// Identity provider app client id.
    pub cognito_client_id: String,
    /// Identity provider endpoint; regional default when unset.
    pub cognito_endpoint: String,
    pub endpoints: Endpoints,
    pub quiet_interval: Duration,
    pub access_key_id: String,
    pub secret_access_key: String,
    pub bucket: String,
    /// Object key template; `{user_id}` is replaced by the signed-in user.
    pub object_key: String,
    pub object_endpoint: Option<String>,
    pub dashboard_ttl_secs: u64,
    /// Where the session file lives.
    pub data_dir: PathBuf,
}

impl OmnicodeConfig {
    /// Reads configuration from environment variables.
    ///
    /// | Variable                      | Default                      |
    /// |-------------------------------|------------------------------|
    /// | `AWS_REGION`                  | `us-east-2`                  |
    /// | `AWS_COGNITO_APP_CLIENT_ID`   | empty (auth disabled)        |
    /// | `AWS_COGNITO_ENDPOINT`        | regional endpoint            |
    /// | `OMNICODE_COMPLETION_URL`     | empty                        |
    /// | `OMNICODE_REFACTOR_URL`       | empty                        |
    /// | `OMNICODE_DOC_URL`            | empty                        |
    /// | `OMNICODE_DEBOUNCE_MS`        | `3000`                       |
    /// | `AWS_ACCESS_KEY`              | empty                        |
    /// | `AWS_SECRET_KEY`              | empty                        |
    /// | `AWS_S3_BUCKET_NAME`          | empty                        |
    /// | `AWS_S3_OBJECT_KEY`           | `{user_id}/dashboard.json`   |
    /// | `AWS_S3_ENDPOINT`             | virtual-hosted AWS endpoint  |
    /// | `OMNICODE_DASHBOARD_TTL_SECS` | `300`                        |
    /// | `OMNICODE_DATA_DIR`           | `<data dir>/omnicode`        |
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) over an arbitrary source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let region = get("AWS_REGION").unwrap_or_else(|| DEFAULT_REGION.into());
        let cognito_endpoint = get("AWS_COGNITO_ENDPOINT")
            .unwrap_or_else(|| CognitoClient::regional_endpoint(&region));
        let debounce_ms = number(
            "OMNICODE_DEBOUNCE_MS",
            get("OMNICODE_DEBOUNCE_MS"),
            DEFAULT_QUIET_INTERVAL.as_millis() as u64,
        );

        Self {
            cognito_client_id: get("AWS_COGNITO_APP_CLIENT_ID").unwrap_or_default(),
            cognito_endpoint,
            endpoints: Endpoints {
                completion: get("OMNICODE_COMPLETION_URL").unwrap_or_default(),
                refactor: get("OMNICODE_REFACTOR_URL").unwrap_or_default(),
                doc_comment: get("OMNICODE_DOC_URL").unwrap_or_default(),
            },
            quiet_interval: Duration::from_millis(debounce_ms),
            access_key_id: get("AWS_ACCESS_KEY").unwrap_or_default(),
            secret_access_key: get("AWS_SECRET_KEY").unwrap_or_default(),
            bucket: get("AWS_S3_BUCKET_NAME").unwrap_or_default(),
            object_key: get("AWS_S3_OBJECT_KEY").unwrap_or_else(|| DEFAULT_OBJECT_KEY.into()),
            object_endpoint: get("AWS_S3_ENDPOINT"),
            dashboard_ttl_secs: number(
                "OMNICODE_DASHBOARD_TTL_SECS",
                get("OMNICODE_DASHBOARD_TTL_SECS"),
                DEFAULT_DASHBOARD_TTL_SECS,
            ),
            data_dir: get("OMNICODE_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(default_data_dir),
            region,
        }
    }

    pub fn presigner(&self) -> Presigner {
        Presigner::new(
            Credentials {
                access_key_id: self.access_key_id.clone(),
                secret_access_key: self.secret_access_key.clone(),
            },
            self.region.clone(),
            self.bucket.clone(),
            self.object_endpoint.clone(),
        )
    }
}

fn number(key: &str, raw: Option<String>, default: u64) -> u64 {
    match raw {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!(key, value = %raw, default, "ignoring malformed number");
            default
        }),
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join("omnicode")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> OmnicodeConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        OmnicodeConfig::from_lookup(|k| vars.get(k).cloned())
    }

    #[test]
    fn defaults() {
        let c = config(&[]);
        assert_eq!(c.region, "us-east-2");
        assert_eq!(c.cognito_endpoint, "https://cognito-idp.us-east-2.amazonaws.com/");
        assert_eq!(c.quiet_interval, Duration::from_millis(3000));
        assert_eq!(c.dashboard_ttl_secs, 300);
        assert_eq!(c.endpoints, Endpoints::default());
        assert!(c.data_dir.ends_with("omnicode"));
        assert_eq!(c.object_key, "{user_id}/dashboard.json");
    }

    #[test]
    fn overrides() {
        let c = config(&[
            ("AWS_REGION", "eu-west-1"),
            ("OMNICODE_DEBOUNCE_MS", "750"),
            ("OMNICODE_COMPLETION_URL", "http://x/complete"),
            ("OMNICODE_DATA_DIR", "/tmp/omni"),
            ("AWS_S3_OBJECT_KEY", "dash/{user_id}.json"),
        ]);
        assert_eq!(c.cognito_endpoint, "https://cognito-idp.eu-west-1.amazonaws.com/");
        assert_eq!(c.quiet_interval, Duration::from_millis(750));
        assert_eq!(c.endpoints.completion, "http://x/complete");
        assert_eq!(c.data_dir, PathBuf::from("/tmp/omni"));
        assert_eq!(c.object_key, "dash/{user_id}.json");
    }

    #[test]
    fn malformed_numbers_fall_back() {
        let c = config(&[
            ("OMNICODE_DEBOUNCE_MS", "soon"),
            ("OMNICODE_DASHBOARD_TTL_SECS", "-5"),
        ]);
        assert_eq!(c.quiet_interval, DEFAULT_QUIET_INTERVAL);
        assert_eq!(c.dashboard_ttl_secs, DEFAULT_DASHBOARD_TTL_SECS);
    }

    #[test]
    fn blank_values_count_as_unset() {
        let c = config(&[("AWS_REGION", "  ")]);
        assert_eq!(c.region, DEFAULT_REGION);
    }
}
