use anyhow::Context;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::documents::{DocPath, DocumentStore, USERS, USER_EMAILS};

/// User profile document at `users/{uid}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub uid: Uuid,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub photo_url: Option<String>,
    pub birth_date: Option<String>,
    pub password_hash: Option<String>,
    #[serde(default)]
    pub anonymous: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Serialize, Deserialize)]
struct EmailIndex {
    uid: Uuid,
}

fn user_path(uid: Uuid) -> DocPath {
    DocPath::new(USERS, uid.to_string())
}

fn email_path(email: &str) -> DocPath {
    DocPath::new(USER_EMAILS, email)
}

impl User {
    pub fn new(email: Option<String>, display_name: Option<String>, password_hash: Option<String>) -> Self {
        let anonymous = email.is_none();
        Self {
            uid: Uuid::new_v4(),
            email,
            display_name,
            photo_url: None,
            birth_date: None,
            password_hash,
            anonymous,
            created_at: OffsetDateTime::now_utc(),
        }
    }

    /// Name shown on posts and comments.
    pub fn author_name(&self) -> String {
        self.display_name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or("Usuário")
            .to_string()
    }

    pub fn avatar_url(&self) -> String {
        match &self.photo_url {
            Some(url) if !url.is_empty() => url.clone(),
            _ => format!(
                "https://ui-avatars.com/api/?name={}",
                self.author_name().replace(' ', "+")
            ),
        }
    }

    pub async fn find_by_id(docs: &dyn DocumentStore, uid: Uuid) -> anyhow::Result<Option<User>> {
        docs.read(&user_path(uid)).await
    }

    pub async fn find_by_email(docs: &dyn DocumentStore, email: &str) -> anyhow::Result<Option<User>> {
        let Some(index) = docs.read::<EmailIndex>(&email_path(email)).await? else {
            return Ok(None);
        };
        Self::find_by_id(docs, index.uid).await
    }

    /// Writes the email index first so a concurrent registration sees the claim.
    pub async fn create(docs: &dyn DocumentStore, user: &User) -> anyhow::Result<()> {
        if let Some(email) = &user.email {
            docs.write(&email_path(email), &EmailIndex { uid: user.uid })
                .await
                .context("write email index")?;
        }
        user.save(docs).await
    }

    pub async fn save(&self, docs: &dyn DocumentStore) -> anyhow::Result<()> {
        docs.write(&user_path(self.uid), self)
            .await
            .context("write user document")
    }

    pub async fn delete(&self, docs: &dyn DocumentStore) -> anyhow::Result<()> {
        if let Some(email) = &self.email {
            docs.delete(&email_path(email)).await.context("delete email index")?;
        }
        docs.delete(&user_path(self.uid)).await.context("delete user document")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::documents::MemoryDocumentStore;

    #[tokio::test]
    async fn create_find_delete() {
        let docs = MemoryDocumentStore::new();
        let user = User::new(Some("ana@example.com".into()), Some("Ana".into()), Some("h".into()));
        User::create(&docs, &user).await.unwrap();

        let by_email = User::find_by_email(&docs, "ana@example.com").await.unwrap().unwrap();
        assert_eq!(by_email.uid, user.uid);
        assert!(!by_email.anonymous);

        user.delete(&docs).await.unwrap();
        assert!(User::find_by_email(&docs, "ana@example.com").await.unwrap().is_none());
        assert!(User::find_by_id(&docs, user.uid).await.unwrap().is_none());
    }

    #[test]
    fn author_defaults() {
        let visitor = User::new(None, None, None);
        assert!(visitor.anonymous);
        assert_eq!(visitor.author_name(), "Usuário");
        assert_eq!(visitor.avatar_url(), "https://ui-avatars.com/api/?name=Usuário");

        let mut named = User::new(Some("a@b.co".into()), Some("Ana Souza".into()), None);
        assert_eq!(named.avatar_url(), "https://ui-avatars.com/api/?name=Ana+Souza");
        named.photo_url = Some("https://cdn/p.png".into());
        assert_eq!(named.avatar_url(), "https://cdn/p.png");
    }
}
