//! Cloudflare R2 object store scoped by access level.

use std::sync::Arc;

use async_trait::async_trait;
use aws_credential_types::Credentials;
use aws_sdk_s3::{primitives::ByteStream, Client};
use aws_types::region::Region;

use crate::backend::{AccessLevel, ObjectStore, TokenSource};
use crate::config::StorageConfig;
use crate::{Error, Result};

/// Object store over an R2 bucket.
///
/// Keys passed by callers are relative; the stored key is prefixed by the
/// access level and, for non-guest levels, the signed-in user's id.
#[derive(Clone)]
pub struct R2ObjectStore {
    config: StorageConfig,
    client: Client,
    tokens: Arc<dyn TokenSource>,
}

impl R2ObjectStore {
    pub fn new(config: StorageConfig, tokens: Arc<dyn TokenSource>) -> Self {
        let client = build_s3_client(&config);
        Self {
            config,
            client,
            tokens,
        }
    }

    async fn scoped_key(&self, key: &str, access: AccessLevel) -> Result<String> {
        let key = normalize_object_key(key)?;
        let user_id = match access {
            AccessLevel::Guest => String::new(),
            AccessLevel::Protected | AccessLevel::Private => {
                self.tokens.current_session().await?.user.id
            }
        };
        Ok(scope_key(&key, access, &user_id))
    }
}

#[async_trait]
impl ObjectStore for R2ObjectStore {
    async fn upload(&self, key: &str, bytes: Vec<u8>, access: AccessLevel) -> Result<()> {
        let object_key = self.scoped_key(key, access).await?;
        let mut request = self
            .client
            .put_object()
            .bucket(&self.config.bucket)
            .key(&object_key)
            .body(ByteStream::from(bytes));

        if let Some(content_type) = guess_content_type(&object_key) {
            request = request.content_type(content_type);
        }

        request.send().await.map_err(|error| {
            storage_error("put_object", &self.config.bucket, Some(&object_key), error)
        })?;
        Ok(())
    }

    async fn download(&self, key: &str, access: AccessLevel) -> Result<Vec<u8>> {
        let object_key = self.scoped_key(key, access).await?;
        let response = self
            .client
            .get_object()
            .bucket(&self.config.bucket)
            .key(&object_key)
            .send()
            .await
            .map_err(|error| {
                storage_error("get_object", &self.config.bucket, Some(&object_key), error)
            })?;

        let payload = response.body.collect().await.map_err(|error| {
            storage_error(
                "get_object_body",
                &self.config.bucket,
                Some(&object_key),
                error,
            )
        })?;
        Ok(payload.into_bytes().to_vec())
    }

    async fn remove(&self, key: &str, access: AccessLevel) -> Result<()> {
        let object_key = self.scoped_key(key, access).await?;
        self.client
            .delete_object()
            .bucket(&self.config.bucket)
            .key(&object_key)
            .send()
            .await
            .map_err(|error| {
                storage_error(
                    "delete_object",
                    &self.config.bucket,
                    Some(&object_key),
                    error,
                )
            })?;
        Ok(())
    }
}

fn build_s3_client(config: &StorageConfig) -> Client {
    let credentials = Credentials::new(
        config.access_key_id.clone(),
        config.secret_access_key.clone(),
        None,
        None,
        "cloudnotes-r2-storage",
    );

    let sdk_config = aws_sdk_s3::config::Builder::new()
        .region(Region::new("auto"))
        .credentials_provider(credentials)
        .endpoint_url(config.endpoint_url())
        .force_path_style(true)
        .build();

    Client::from_conf(sdk_config)
}

fn scope_key(key: &str, access: AccessLevel, user_id: &str) -> String {
    format!("{}{key}", access.key_prefix(user_id))
}

fn storage_error(
    operation: &str,
    bucket: &str,
    object_key: Option<&str>,
    error: impl std::fmt::Display,
) -> Error {
    let target = object_key.map_or_else(|| bucket.to_string(), |key| format!("{bucket}/{key}"));
    Error::Storage(format!("R2 {operation} failed for {target}: {error}"))
}

fn normalize_object_key(object_key: &str) -> Result<String> {
    let object_key = object_key.trim().trim_matches('/').to_string();
    if object_key.is_empty() {
        return Err(Error::InvalidInput("Object key cannot be empty".to_string()));
    }
    if object_key.split('/').any(|segment| segment == "..") {
        return Err(Error::InvalidInput(format!(
            "Object key '{object_key}' must not contain '..' segments"
        )));
    }
    Ok(object_key)
}

fn guess_content_type(object_key: &str) -> Option<&'static str> {
    let (_, ext) = object_key.rsplit_once('.')?;
    match ext.to_ascii_lowercase().as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "heic" => Some("image/heic"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_object_key_trims_slashes() {
        assert_eq!(normalize_object_key(" /cat.png/ ").unwrap(), "cat.png");
        assert!(normalize_object_key("  /  ").is_err());
        assert!(normalize_object_key("a/../b.png").is_err());
    }

    #[test]
    fn scope_key_applies_access_prefix() {
        assert_eq!(
            scope_key("cat.png", AccessLevel::Private, "u-1"),
            "private/u-1/cat.png"
        );
        assert_eq!(scope_key("cat.png", AccessLevel::Guest, ""), "public/cat.png");
    }

    #[test]
    fn storage_error_names_target() {
        let error = storage_error("get_object", "notes", Some("private/u/a.png"), "boom");
        match error {
            Error::Storage(message) => {
                assert_eq!(message, "R2 get_object failed for notes/private/u/a.png: boom");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn guess_content_type_for_images() {
        assert_eq!(guess_content_type("a/b.PNG"), Some("image/png"));
        assert_eq!(guess_content_type("a/b.jpeg"), Some("image/jpeg"));
        assert_eq!(guess_content_type("noext"), None);
    }
}
