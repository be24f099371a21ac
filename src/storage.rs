use anyhow::Context;
use async_trait::async_trait;
use aws_config::{defaults, BehaviorVersion};
use aws_credential_types::Credentials;
use aws_sdk_s3::{
    config::{Builder as S3ConfigBuilder, Region},
    Client,
};
use aws_smithy_types::byte_stream::ByteStream;
use bytes::Bytes;

use crate::config::StorageConfig;

/// Blob store for profile photos and post images.
#[async_trait]
pub trait StorageClient: Send + Sync {
    async fn put_object(&self, key: &str, body: Bytes, content_type: &str) -> anyhow::Result<()>;
    async fn delete_object(&self, key: &str) -> anyhow::Result<()>;
    fn public_url(&self, key: &str) -> String;

    /// Stores the object and returns its permanent URL.
    async fn upload(&self, key: &str, body: Bytes, content_type: &str) -> anyhow::Result<String> {
        self.put_object(key, body, content_type).await?;
        Ok(self.public_url(key))
    }
}

pub fn profile_photo_key(user_id: &str) -> String {
    format!("profile_pictures/{}", user_id)
}

pub fn post_image_key(post_id: &str) -> String {
    format!("community_posts/{}", post_id)
}

/// Types the app lets users pick as photos or post images.
pub fn is_supported_image(content_type: &str) -> bool {
    matches!(
        content_type,
        "image/jpeg" | "image/jpg" | "image/png" | "image/webp" | "image/heic"
    )
}

/// Image bytes taken from a form, already checked for a supported type.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub body: Bytes,
    pub content_type: String,
}

impl ImageUpload {
    /// `None` for empty bodies and non-image content types.
    pub fn new(body: Bytes, content_type: &str) -> Option<Self> {
        if body.is_empty() || !is_supported_image(content_type) {
            return None;
        }
        Some(Self {
            body,
            content_type: content_type.to_string(),
        })
    }

    pub async fn store(self, storage: &dyn StorageClient, key: &str) -> anyhow::Result<String> {
        storage.upload(key, self.body, &self.content_type).await
    }
}

#[derive(Clone)]
pub struct Storage {
    client: Client,
    bucket: String,
    public_url: String,
}

impl Storage {
    pub async fn new(cfg: &StorageConfig) -> anyhow::Result<Self> {
        let shared = defaults(BehaviorVersion::latest())
            .region(Region::new(cfg.region.clone()))
            .credentials_provider(Credentials::new(
                &cfg.access_key,
                &cfg.secret_key,
                None,
                None,
                "static",
            ))
            .endpoint_url(&cfg.endpoint)
            .load()
            .await;

        let conf = S3ConfigBuilder::from(&shared)
            .endpoint_url(&cfg.endpoint)
            .force_path_style(true)
            .build();

        Ok(Self {
            client: Client::from_conf(conf),
            bucket: cfg.bucket.clone(),
            public_url: cfg.public_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl StorageClient for Storage {
    async fn put_object(&self, key: &str, body: Bytes, content_type: &str) -> anyhow::Result<()> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(body))
            .content_type(content_type)
            .send()
            .await
            .context("s3 put_object")?;
        Ok(())
    }

    async fn delete_object(&self, key: &str) -> anyhow::Result<()> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .context("s3 delete_object")?;
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.public_url, key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::AppState;

    #[test]
    fn only_image_types_are_accepted() {
        assert!(is_supported_image("image/jpeg"));
        assert!(is_supported_image("image/jpg"));
        assert!(is_supported_image("image/png"));
        assert!(is_supported_image("image/webp"));
        assert!(is_supported_image("image/heic"));
        assert!(!is_supported_image("application/octet-stream"));
        assert!(!is_supported_image("text/html"));
    }

    #[test]
    fn uploads_need_bytes_and_an_image_type() {
        assert!(ImageUpload::new(Bytes::from_static(b"x"), "image/png").is_some());
        assert!(ImageUpload::new(Bytes::new(), "image/png").is_none());
        assert!(ImageUpload::new(Bytes::from_static(b"x"), "text/plain").is_none());
    }

    #[test]
    fn keys_follow_owner_ids() {
        assert_eq!(profile_photo_key("u1"), "profile_pictures/u1");
        assert_eq!(post_image_key("p1"), "community_posts/p1");
    }

    #[tokio::test]
    async fn upload_returns_public_url() {
        let state = AppState::fake();
        let url = state
            .storage
            .upload("profile_pictures/abc", Bytes::from_static(b"img"), "image/png")
            .await
            .unwrap();
        assert!(url.ends_with("profile_pictures/abc"));
    }
}
