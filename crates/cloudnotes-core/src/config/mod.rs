//! Backend and orchestrator configuration.
//!
//! `BackendConfig` carries the public endpoints and keys needed to reach the
//! managed platform. It is read from a JSON file or from environment
//! variables; a partial configuration is a `Configuration` error naming the
//! missing keys.

use std::env;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::util::{is_http_url, normalize_text_option};
use crate::{Error, Result};

const ENV_SUPABASE_URL: &str = "SUPABASE_URL";
const ENV_SUPABASE_ANON_KEY: &str = "SUPABASE_ANON_KEY";
const ENV_GRAPHQL_ENDPOINT: &str = "GRAPHQL_ENDPOINT";
const ENV_R2_ACCOUNT_ID: &str = "R2_ACCOUNT_ID";
const ENV_R2_BUCKET: &str = "R2_BUCKET";
const ENV_R2_ACCESS_KEY_ID: &str = "R2_ACCESS_KEY_ID";
const ENV_R2_SECRET_ACCESS_KEY: &str = "R2_SECRET_ACCESS_KEY";

pub const DEFAULT_CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct BackendConfig {
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub graphql_endpoint: String,
    #[serde(default)]
    pub storage: Option<StorageConfig>,
}

/// S3-compatible (Cloudflare R2) object storage settings.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    pub account_id: String,
    pub bucket: String,
    pub access_key_id: String,
    pub secret_access_key: String,
}

impl StorageConfig {
    /// Cloudflare R2 S3-compatible endpoint URL.
    #[must_use]
    pub fn endpoint_url(&self) -> String {
        format!("https://{}.r2.cloudflarestorage.com", self.account_id)
    }

    fn validated(self) -> Result<Self> {
        Ok(Self {
            account_id: required_text(self.account_id, "storage.account_id")?,
            bucket: required_text(self.bucket, "storage.bucket")?,
            access_key_id: required_text(self.access_key_id, "storage.access_key_id")?,
            secret_access_key: required_text(
                self.secret_access_key,
                "storage.secret_access_key",
            )?,
        })
    }
}

impl std::fmt::Debug for StorageConfig {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("StorageConfig")
            .field("account_id", &self.account_id)
            .field("bucket", &self.bucket)
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"[REDACTED]")
            .finish()
    }
}

impl BackendConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        parse_config(|key| env::var(key).ok())
    }

    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|error| {
            Error::Configuration(format!("failed to read {}: {error}", path.display()))
        })?;
        let config: Self = serde_json::from_str(&content).map_err(|error| {
            Error::Configuration(format!("invalid config {}: {error}", path.display()))
        })?;
        config.validated()
    }

    /// Load from `path` when given, otherwise from the environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Self::from_env(),
        }
    }

    fn validated(self) -> Result<Self> {
        let supabase_url = required_url(Some(self.supabase_url), "supabase_url")?;
        let graphql_endpoint = required_url(Some(self.graphql_endpoint), "graphql_endpoint")?;
        let supabase_anon_key = required_text(self.supabase_anon_key, "supabase_anon_key")?;
        let storage = self.storage.map(StorageConfig::validated).transpose()?;

        Ok(Self {
            supabase_url,
            supabase_anon_key,
            graphql_endpoint,
            storage,
        })
    }
}

/// Settings for the session orchestrator itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrchestratorConfig {
    /// Capacity of the channel feeding the UI loop.
    pub channel_capacity: usize,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

fn parse_config(lookup: impl Fn(&str) -> Option<String>) -> Result<BackendConfig> {
    let read = |key: &str| normalize_text_option(lookup(key));

    let supabase_url = read(ENV_SUPABASE_URL);
    let supabase_anon_key = read(ENV_SUPABASE_ANON_KEY);
    let graphql_endpoint = read(ENV_GRAPHQL_ENDPOINT);

    let mut missing = Vec::new();
    if supabase_url.is_none() {
        missing.push(ENV_SUPABASE_URL);
    }
    if supabase_anon_key.is_none() {
        missing.push(ENV_SUPABASE_ANON_KEY);
    }
    if graphql_endpoint.is_none() {
        missing.push(ENV_GRAPHQL_ENDPOINT);
    }
    if !missing.is_empty() {
        return Err(Error::Configuration(format!(
            "backend configuration is incomplete. Missing: {}",
            missing.join(", ")
        )));
    }

    let storage = parse_storage_config(&read)?;

    BackendConfig {
        supabase_url: supabase_url.unwrap_or_default(),
        supabase_anon_key: supabase_anon_key.unwrap_or_default(),
        graphql_endpoint: graphql_endpoint.unwrap_or_default(),
        storage,
    }
    .validated()
}

fn parse_storage_config(read: &impl Fn(&str) -> Option<String>) -> Result<Option<StorageConfig>> {
    let account_id = read(ENV_R2_ACCOUNT_ID);
    let bucket = read(ENV_R2_BUCKET);
    let access_key_id = read(ENV_R2_ACCESS_KEY_ID);
    let secret_access_key = read(ENV_R2_SECRET_ACCESS_KEY);

    match (account_id, bucket, access_key_id, secret_access_key) {
        (None, None, None, None) => Ok(None),
        (Some(account_id), Some(bucket), Some(access_key_id), Some(secret_access_key)) => {
            Ok(Some(StorageConfig {
                account_id,
                bucket,
                access_key_id,
                secret_access_key,
            }))
        }
        (account_id, bucket, access_key_id, secret_access_key) => {
            let missing = [
                (ENV_R2_ACCOUNT_ID, account_id.is_none()),
                (ENV_R2_BUCKET, bucket.is_none()),
                (ENV_R2_ACCESS_KEY_ID, access_key_id.is_none()),
                (ENV_R2_SECRET_ACCESS_KEY, secret_access_key.is_none()),
            ]
            .into_iter()
            .filter_map(|(key, is_missing)| is_missing.then_some(key))
            .collect::<Vec<_>>();
            Err(Error::Configuration(format!(
                "R2 configuration is incomplete. Missing: {}",
                missing.join(", ")
            )))
        }
    }
}

fn required_text(value: String, field: &str) -> Result<String> {
    normalize_text_option(Some(value))
        .ok_or_else(|| Error::Configuration(format!("{field} must not be empty")))
}

fn required_url(value: Option<String>, field: &str) -> Result<String> {
    let value = normalize_text_option(value)
        .ok_or_else(|| Error::Configuration(format!("{field} must not be empty")))?;
    if !is_http_url(&value) {
        return Err(Error::Configuration(format!(
            "{field} must include http:// or https://"
        )));
    }
    Ok(value.trim_end_matches('/').to_string())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::io::Write;

    use pretty_assertions::assert_eq;

    use super::*;

    fn parse_from_map(map: &HashMap<&str, &str>) -> Result<BackendConfig> {
        parse_config(|key| map.get(key).map(|value| (*value).to_string()))
    }

    fn base_map() -> HashMap<&'static str, &'static str> {
        HashMap::from([
            (ENV_SUPABASE_URL, " https://demo.supabase.co/ "),
            (ENV_SUPABASE_ANON_KEY, "anon"),
            (ENV_GRAPHQL_ENDPOINT, "https://api.example.com/graphql"),
        ])
    }

    #[test]
    fn parse_config_reports_missing_keys() {
        let err = parse_from_map(&HashMap::new()).unwrap_err();
        match err {
            Error::Configuration(message) => {
                assert!(message.contains(ENV_SUPABASE_URL));
                assert!(message.contains(ENV_GRAPHQL_ENDPOINT));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn parse_config_without_storage() {
        let config = parse_from_map(&base_map()).unwrap();
        assert_eq!(config.supabase_url, "https://demo.supabase.co");
        assert_eq!(config.storage, None);
    }

    #[test]
    fn parse_config_rejects_partial_storage() {
        let mut map = base_map();
        map.insert(ENV_R2_ACCOUNT_ID, "account");
        map.insert(ENV_R2_BUCKET, "bucket");

        let err = parse_from_map(&map).unwrap_err();
        match err {
            Error::Configuration(message) => {
                assert!(message.contains(ENV_R2_ACCESS_KEY_ID));
                assert!(message.contains(ENV_R2_SECRET_ACCESS_KEY));
                assert!(!message.contains(ENV_R2_BUCKET));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn parse_config_rejects_non_http_endpoint() {
        let mut map = base_map();
        map.insert(ENV_GRAPHQL_ENDPOINT, "api.example.com/graphql");
        assert!(matches!(
            parse_from_map(&map),
            Err(Error::Configuration(_))
        ));
    }

    #[test]
    fn from_file_reads_full_config() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "supabase_url": "https://demo.supabase.co",
                "supabase_anon_key": "anon",
                "graphql_endpoint": "https://api.example.com/graphql",
                "storage": {{
                    "account_id": "acct",
                    "bucket": "notes",
                    "access_key_id": "key",
                    "secret_access_key": "top-secret-value"
                }}
            }}"#
        )
        .unwrap();

        let config = BackendConfig::from_file(file.path()).unwrap();
        let storage = config.storage.unwrap();
        assert_eq!(storage.bucket, "notes");
        assert_eq!(
            storage.endpoint_url(),
            "https://acct.r2.cloudflarestorage.com"
        );
        assert!(!format!("{storage:?}").contains("top-secret-value"));
    }

    #[test]
    fn from_file_trims_storage_and_rejects_blank_fields() {
        let write_config = |storage: &str| {
            let mut file = tempfile::NamedTempFile::new().unwrap();
            write!(
                file,
                r#"{{"supabase_url":"https://a.co","supabase_anon_key":"k","graphql_endpoint":"https://b.co","storage":{storage}}}"#
            )
            .unwrap();
            file
        };

        let file = write_config(
            r#"{"account_id":" acct ","bucket":"notes","access_key_id":" id ","secret_access_key":"s"}"#,
        );
        let storage = BackendConfig::from_file(file.path())
            .unwrap()
            .storage
            .unwrap();
        assert_eq!(storage.account_id, "acct");
        assert_eq!(storage.access_key_id, "id");

        let file = write_config(
            r#"{"account_id":"  ","bucket":"","access_key_id":" id ","secret_access_key":"s"}"#,
        );
        match BackendConfig::from_file(file.path()) {
            Err(Error::Configuration(message)) => {
                assert!(message.contains("storage.account_id"), "{message}");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn from_file_rejects_unknown_fields() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"supabase_url":"https://a.co","supabase_anon_key":"k","graphql_endpoint":"https://b.co","extra":1}}"#
        )
        .unwrap();
        assert!(matches!(
            BackendConfig::from_file(file.path()),
            Err(Error::Configuration(_))
        ));
    }

    #[test]
    fn orchestrator_config_default_capacity() {
        assert_eq!(
            OrchestratorConfig::default().channel_capacity,
            DEFAULT_CHANNEL_CAPACITY
        );
    }
}
