use tracing::{error, info, instrument};

use super::category::{categorize, Category};
use super::model::{group_by_category, normalize_name, CategoryMap, Ingredient};
use super::view::{PantryEvent, PantryView};
use crate::state::AppState;

/// Grouped pantry; a failed read degrades to an empty map.
#[instrument(skip(state))]
pub async fn load(state: &AppState, user_id: &str) -> CategoryMap {
    match Ingredient::list(state.documents.as_ref(), user_id).await {
        Ok(items) => group_by_category(items),
        Err(e) => {
            error!(%user_id, error = %e, "failed to load pantry");
            CategoryMap::new()
        }
    }
}

/// Categorizes and stores an already-normalized name.
#[instrument(skip(state))]
pub async fn add(state: &AppState, user_id: &str, name: &str) -> anyhow::Result<Ingredient> {
    let category = categorize(state.llm.as_ref(), name).await;
    let item = Ingredient {
        name: name.to_string(),
        category,
    };
    item.put(state.documents.as_ref(), user_id).await?;
    info!(%user_id, ingredient = %item.name, category = %item.category, "ingredient added");
    Ok(item)
}

#[instrument(skip(state))]
pub async fn remove(state: &AppState, user_id: &str, name: &str) -> anyhow::Result<()> {
    Ingredient::remove(state.documents.as_ref(), user_id, name).await?;
    info!(%user_id, ingredient = %name, "ingredient removed");
    Ok(())
}

/// Same name: category merged in place. New name: the new document is
/// written before the old one is deleted, so a failure in between leaves a
/// duplicate rather than losing the item.
#[instrument(skip(state))]
pub async fn rename(
    state: &AppState,
    user_id: &str,
    old: &str,
    new: &str,
    category: Category,
) -> anyhow::Result<Ingredient> {
    let docs = state.documents.as_ref();
    let item = Ingredient {
        name: new.to_string(),
        category,
    };
    if old == new {
        item.update_category(docs, user_id).await?;
    } else {
        item.put(docs, user_id).await?;
        Ingredient::remove(docs, user_id, old).await?;
    }
    info!(%user_id, from = %old, to = %new, "ingredient updated");
    Ok(item)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddOutcome {
    Added(Ingredient),
    Blank,
    Duplicate,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenameOutcome {
    Updated(Ingredient),
    Blank,
    NotFound,
    Duplicate,
    Failed,
}

/// Runs pantry mutations against one view, reloading the grouping after each.
pub struct PantryManager<'a> {
    state: &'a AppState,
    user_id: String,
    view: PantryView,
}

impl<'a> PantryManager<'a> {
    pub fn new(state: &'a AppState, user_id: impl Into<String>, view: PantryView) -> Self {
        Self {
            state,
            user_id: user_id.into(),
            view,
        }
    }

    pub fn view(&self) -> &PantryView {
        &self.view
    }

    pub fn apply(&mut self, event: PantryEvent) {
        self.view.update(event);
    }

    pub async fn reload(&mut self) {
        let items = load(self.state, &self.user_id).await;
        self.view.update(PantryEvent::Loaded(items));
    }

    /// Duplicates are caught against the loaded grouping before any write.
    pub async fn add(&mut self, raw: &str) -> AddOutcome {
        let Some(name) = normalize_name(raw) else {
            return AddOutcome::Blank;
        };
        if self.view.contains(&name) {
            return AddOutcome::Duplicate;
        }
        match add(self.state, &self.user_id, &name).await {
            Ok(item) => {
                self.reload().await;
                AddOutcome::Added(item)
            }
            Err(e) => {
                error!(user_id = %self.user_id, ingredient = %name, error = %e, "failed to add ingredient");
                AddOutcome::Failed
            }
        }
    }

    pub async fn remove(&mut self, name: &str) -> bool {
        match remove(self.state, &self.user_id, name).await {
            Ok(()) => {
                self.view.update(PantryEvent::Removed(name.to_string()));
                self.reload().await;
                true
            }
            Err(e) => {
                error!(user_id = %self.user_id, ingredient = %name, error = %e, "failed to remove ingredient");
                false
            }
        }
    }

    pub async fn rename(&mut self, old: &str, new_raw: &str, category: Category) -> RenameOutcome {
        let Some(new) = normalize_name(new_raw) else {
            return RenameOutcome::Blank;
        };
        if !self.view.contains(old) {
            return RenameOutcome::NotFound;
        }
        if new != old && self.view.contains(&new) {
            return RenameOutcome::Duplicate;
        }
        match rename(self.state, &self.user_id, old, &new, category).await {
            Ok(item) => {
                self.view.update(PantryEvent::Renamed {
                    old: old.to_string(),
                    new,
                });
                self.reload().await;
                RenameOutcome::Updated(item)
            }
            Err(e) => {
                error!(user_id = %self.user_id, ingredient = %old, error = %e, "failed to update ingredient");
                RenameOutcome::Failed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::testing::ScriptedClient;
    use std::sync::Arc;

    #[tokio::test]
    async fn add_categorizes_and_groups() {
        let state = AppState::fake_with_llm(Arc::new(
            ScriptedClient::new().reply("Legumes e Verduras"),
        ));
        let mut pantry = PantryManager::new(&state, "u1", PantryView::default());
        pantry.reload().await;

        let outcome = pantry.add("Tomate").await;
        let expected = Ingredient {
            name: "tomate".into(),
            category: Category::Vegetables,
        };
        assert_eq!(outcome, AddOutcome::Added(expected.clone()));

        let grouped = load(&state, "u1").await;
        assert_eq!(grouped.len(), 1);
        assert_eq!(grouped["Legumes e Verduras"], vec![expected]);
        assert_eq!(pantry.view().by_category(), &grouped);
    }

    #[tokio::test]
    async fn duplicate_and_blank_rejected_locally() {
        let llm = Arc::new(ScriptedClient::new().reply("Frutas"));
        let state = AppState::fake_with_llm(llm.clone());
        let mut pantry = PantryManager::new(&state, "u1", PantryView::default());
        pantry.reload().await;

        assert!(matches!(pantry.add("banana").await, AddOutcome::Added(_)));
        assert_eq!(pantry.add("  BANANA ").await, AddOutcome::Duplicate);
        assert_eq!(pantry.add("   ").await, AddOutcome::Blank);
        assert_eq!(llm.calls(), 1);
    }

    #[tokio::test]
    async fn categorizer_failure_files_under_other() {
        let state = AppState::fake_with_llm(Arc::new(
            ScriptedClient::new().fail(crate::llm::LlmError::RequestFailed("down".into())),
        ));
        let mut pantry = PantryManager::new(&state, "u1", PantryView::default());
        pantry.reload().await;

        assert!(matches!(pantry.add("quinoa").await, AddOutcome::Added(_)));
        let grouped = load(&state, "u1").await;
        assert_eq!(grouped["Outros"][0].name, "quinoa");
    }

    #[tokio::test]
    async fn same_name_rename_only_changes_category() {
        let state = AppState::fake();
        let mut pantry = PantryManager::new(&state, "u1", PantryView::default());
        pantry.reload().await;
        pantry.add("arroz").await;

        let outcome = pantry.rename("arroz", " Arroz ", Category::GrainsAndCereals).await;
        assert!(matches!(outcome, RenameOutcome::Updated(_)));

        let grouped = load(&state, "u1").await;
        assert_eq!(grouped.len(), 1);
        assert_eq!(grouped["Grãos e Cereais"][0].name, "arroz");
    }

    #[tokio::test]
    async fn rename_moves_item_and_tray_entry() {
        let state = AppState::fake();
        let mut pantry = PantryManager::new(&state, "u1", PantryView::default());
        pantry.reload().await;
        pantry.add("leite").await;
        pantry.add("ovo").await;
        pantry.apply(PantryEvent::Toggle("leite".into()));

        assert_eq!(
            pantry.rename("leite", "ovo", Category::DairyAndEggs).await,
            RenameOutcome::Duplicate
        );
        assert_eq!(
            pantry.rename("queijo", "brie", Category::DairyAndEggs).await,
            RenameOutcome::NotFound
        );

        let outcome = pantry.rename("leite", "Leite Integral", Category::DairyAndEggs).await;
        assert!(matches!(outcome, RenameOutcome::Updated(_)));
        assert!(pantry.view().contains("leite integral"));
        assert!(!pantry.view().contains("leite"));
        assert_eq!(pantry.view().selected(), ["leite integral"]);
    }

    #[tokio::test]
    async fn remove_reloads_and_drops_selection() {
        let state = AppState::fake();
        let mut pantry = PantryManager::new(&state, "u1", PantryView::default());
        pantry.reload().await;
        pantry.add("sal").await;
        pantry.apply(PantryEvent::Toggle("sal".into()));

        assert!(pantry.remove("sal").await);
        assert!(pantry.view().by_category().is_empty());
        assert!(pantry.view().selected().is_empty());
    }
}
