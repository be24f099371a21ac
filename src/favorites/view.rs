use std::cmp::Ordering;
use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::model::FavoriteRecipe;
use crate::collation;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortOrder {
    #[default]
    TitleAsc,
    TitleDesc,
    /// Newest first.
    DateAdded,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Grid,
    List,
}

/// Favorites page state, built from the query string.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FavoritesView {
    #[serde(default)]
    pub search: String,
    /// `all` or a category label, compared case-insensitively.
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub sort: SortOrder,
    #[serde(default)]
    pub view: ViewMode,
}

#[derive(Debug, Clone, Serialize)]
pub struct FavoritesPage {
    pub view: ViewMode,
    /// Filter tags: "all" first, then every category present.
    pub categories: Vec<String>,
    pub recipes: Vec<FavoriteRecipe>,
    pub empty: bool,
}

impl FavoritesView {
    fn category_filter(&self) -> Option<String> {
        self.category
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty() && !c.eq_ignore_ascii_case("all"))
            .map(str::to_lowercase)
    }

    fn matches(&self, fav: &FavoriteRecipe) -> bool {
        let needle = self.search.trim().to_lowercase();
        let category_ok = match self.category_filter() {
            None => true,
            Some(wanted) => fav
                .recipe
                .category
                .as_deref()
                .map(|c| c.to_lowercase() == wanted)
                .unwrap_or(false),
        };
        let search_ok = needle.is_empty()
            || fav.recipe.title.to_lowercase().contains(&needle)
            || fav.recipe.description.to_lowercase().contains(&needle);
        category_ok && search_ok
    }

    fn compare(&self, a: &FavoriteRecipe, b: &FavoriteRecipe) -> Ordering {
        let by_title = || collation::compare(&a.recipe.title, &b.recipe.title);
        match self.sort {
            SortOrder::TitleAsc => by_title(),
            SortOrder::TitleDesc => by_title().reverse(),
            SortOrder::DateAdded => b.saved_at.cmp(&a.saved_at).then_with(by_title),
        }
    }

    pub fn apply(&self, mut all: Vec<FavoriteRecipe>) -> Vec<FavoriteRecipe> {
        all.retain(|f| self.matches(f));
        all.sort_by(|a, b| self.compare(a, b));
        all
    }

    pub fn render(&self, all: Vec<FavoriteRecipe>) -> FavoritesPage {
        let present: BTreeSet<String> = all
            .iter()
            .filter_map(|f| f.recipe.category.clone())
            .filter(|c| !c.trim().is_empty())
            .collect();
        let mut categories = vec!["all".to_string()];
        categories.extend(present);

        let recipes = self.apply(all);
        FavoritesPage {
            view: self.view,
            categories,
            empty: recipes.is_empty(),
            recipes,
        }
    }
}
