use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::recipes::model::Recipe;

/// A bookmarked recipe, stored independently of where it came from.
/// Fields the recipe shape does not know (such as a client `folder`) are dropped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FavoriteRecipe {
    #[serde(flatten)]
    pub recipe: Recipe,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub saved_at: Option<OffsetDateTime>,
}

impl FavoriteRecipe {
    pub fn stamped(recipe: Recipe) -> Self {
        Self {
            recipe,
            saved_at: Some(OffsetDateTime::now_utc()),
        }
    }
}
