use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Append-only; never edited or deleted once posted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub author_id: String,
    pub author: String,
    pub avatar: String,
    pub text: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Stored at `communityPosts/{id}`. Rating aggregates are never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommunityPost {
    pub id: String,
    pub author_id: String,
    pub author: String,
    pub avatar: String,
    #[serde(default)]
    pub body: String,
    pub image: String,
    #[serde(default)]
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub preparation: String,
    /// One rating (1..=5) per user id.
    #[serde(default)]
    pub ratings: BTreeMap<String, u8>,
    #[serde(default)]
    pub comments: Vec<Comment>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(default, with = "time::serde::rfc3339::option", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<OffsetDateTime>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RatingSummary {
    /// Mean rounded to one decimal; 0 when unrated.
    pub average_rating: f64,
    pub total_ratings: usize,
}

impl CommunityPost {
    pub fn rating_summary(&self) -> RatingSummary {
        let total_ratings = self.ratings.len();
        if total_ratings == 0 {
            return RatingSummary {
                average_rating: 0.0,
                total_ratings,
            };
        }
        let sum: u32 = self.ratings.values().map(|&v| u32::from(v)).sum();
        let mean = f64::from(sum) / total_ratings as f64;
        RatingSummary {
            average_rating: (mean * 10.0).round() / 10.0,
            total_ratings,
        }
    }

    /// Score used by the "popular" feed order.
    pub fn popularity(&self) -> f64 {
        self.rating_summary().average_rating * 10.0 + self.comments.len() as f64
    }

    pub fn is_authored_by(&self, user_id: &str) -> bool {
        self.author_id == user_id
    }
}

/// A post as served, with its rating aggregate derived at read time.
#[derive(Debug, Clone, Serialize)]
pub struct PostView {
    #[serde(flatten)]
    pub post: CommunityPost,
    #[serde(flatten)]
    pub rating: RatingSummary,
}

impl From<CommunityPost> for PostView {
    fn from(post: CommunityPost) -> Self {
        let rating = post.rating_summary();
        Self { post, rating }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post(ratings: &[(&str, u8)], comments: usize) -> CommunityPost {
        let now = OffsetDateTime::now_utc();
        CommunityPost {
            id: "p1".into(),
            author_id: "a".into(),
            author: "Ana".into(),
            avatar: String::new(),
            body: String::new(),
            image: String::new(),
            ingredients: vec![],
            preparation: String::new(),
            ratings: ratings.iter().map(|(u, v)| (u.to_string(), *v)).collect(),
            comments: (0..comments)
                .map(|i| Comment {
                    id: i.to_string(),
                    author_id: "b".into(),
                    author: "Bia".into(),
                    avatar: String::new(),
                    text: "oi".into(),
                    created_at: now,
                })
                .collect(),
            created_at: now,
            updated_at: None,
        }
    }

    #[test]
    fn average_rounds_to_one_decimal() {
        assert_eq!(post(&[], 0).rating_summary().average_rating, 0.0);
        let s = post(&[("x", 5), ("y", 4), ("z", 4)], 0).rating_summary();
        assert_eq!(s.total_ratings, 3);
        assert_eq!(s.average_rating, 4.3);
    }

    #[test]
    fn popularity_weights_rating_over_comments() {
        let rated = post(&[("x", 5)], 0);
        let chatty = post(&[("x", 3)], 12);
        assert_eq!(rated.popularity(), 50.0);
        assert_eq!(chatty.popularity(), 42.0);
    }

    #[test]
    fn view_flattens_aggregate() {
        let v = serde_json::to_value(PostView::from(post(&[("x", 2)], 1))).unwrap();
        assert_eq!(v["average_rating"], 2.0);
        assert_eq!(v["total_ratings"], 1);
        assert_eq!(v["author"], "Ana");
        assert!(v.get("updated_at").is_none());
    }
}
