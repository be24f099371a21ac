//! Pantry page state.
//!
//! `PantryView` is the single owner of what one pantry screen shows: the last
//! loaded grouping, the category tab, the search text, the selection tray and
//! the card being edited. Every change goes through [`PantryView::update`];
//! [`PantryView::render`] turns the state into the page model.

use serde::Serialize;

use super::category::Category;
use super::model::{CategoryMap, Ingredient};

pub const ALL_TAB: &str = "Todos";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(String),
}

impl CategoryFilter {
    /// Missing, blank or "Todos" selects every category.
    pub fn from_param(param: Option<&str>) -> Self {
        match param.map(str::trim) {
            None | Some("") | Some(ALL_TAB) => Self::All,
            Some(label) => Self::Only(label.to_string()),
        }
    }

    fn label(&self) -> &str {
        match self {
            Self::All => ALL_TAB,
            Self::Only(label) => label,
        }
    }
}

#[derive(Debug, Clone)]
pub enum PantryEvent {
    /// Fresh grouping; the tray survives reloads.
    Loaded(CategoryMap),
    SelectCategory(CategoryFilter),
    Search(String),
    Toggle(String),
    DropOnTray(String),
    BeginEdit(String),
    CancelEdit,
    Removed(String),
    Renamed { old: String, new: String },
    Navigate,
}

#[derive(Debug, Clone, Default)]
pub struct PantryView {
    by_category: CategoryMap,
    selected: Vec<String>,
    filter: CategoryFilter,
    search: String,
    editing: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryTab {
    pub name: String,
    pub count: usize,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemCard {
    pub name: String,
    pub category: Category,
    pub selected: bool,
    pub editing: bool,
    pub draggable: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct PantryPage {
    pub tabs: Vec<CategoryTab>,
    pub items: Vec<ItemCard>,
    pub tray: Vec<String>,
    pub search: String,
    pub empty: bool,
    pub category_options: Vec<&'static str>,
}

impl PantryView {
    #[cfg(test)]
    pub fn by_category(&self) -> &CategoryMap {
        &self.by_category
    }

    #[cfg(test)]
    pub fn selected(&self) -> &[String] {
        &self.selected
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_category
            .values()
            .flatten()
            .any(|i| i.name == name)
    }

    fn select(&mut self, name: String) {
        if !name.is_empty() && !self.selected.contains(&name) {
            self.selected.push(name);
        }
    }

    pub fn update(&mut self, event: PantryEvent) {
        match event {
            PantryEvent::Loaded(items) => {
                self.by_category = items;
                if let Some(name) = &self.editing {
                    if !self.contains(name) {
                        self.editing = None;
                    }
                }
            }
            PantryEvent::SelectCategory(filter) => self.filter = filter,
            PantryEvent::Search(text) => self.search = text,
            PantryEvent::Toggle(name) => {
                if self.editing.as_deref() == Some(name.as_str()) {
                    return;
                }
                if let Some(pos) = self.selected.iter().position(|n| *n == name) {
                    self.selected.remove(pos);
                } else {
                    self.select(name);
                }
            }
            PantryEvent::DropOnTray(name) => self.select(name),
            PantryEvent::BeginEdit(name) => {
                if self.contains(&name) {
                    self.editing = Some(name);
                }
            }
            PantryEvent::CancelEdit => self.editing = None,
            PantryEvent::Removed(name) => {
                self.selected.retain(|n| *n != name);
                if self.editing.as_deref() == Some(name.as_str()) {
                    self.editing = None;
                }
            }
            PantryEvent::Renamed { old, new } => {
                if let Some(pos) = self.selected.iter().position(|n| *n == old) {
                    if self.selected.contains(&new) {
                        self.selected.remove(pos);
                    } else {
                        self.selected[pos] = new;
                    }
                }
                self.editing = None;
            }
            PantryEvent::Navigate => {
                self.selected.clear();
                self.editing = None;
            }
        }
    }

    /// Items under the active tab whose name contains the search text.
    pub fn visible_items(&self) -> Vec<&Ingredient> {
        let needle = self.search.trim().to_lowercase();
        let pool: Vec<&Ingredient> = match &self.filter {
            CategoryFilter::All => self.by_category.values().flatten().collect(),
            CategoryFilter::Only(label) => self
                .by_category
                .get(label)
                .map(|items| items.iter().collect())
                .unwrap_or_default(),
        };
        pool.into_iter()
            .filter(|i| needle.is_empty() || i.name.to_lowercase().contains(&needle))
            .collect()
    }

    pub fn render(&self) -> PantryPage {
        let total: usize = self.by_category.values().map(Vec::len).sum();
        let mut tabs = vec![CategoryTab {
            name: ALL_TAB.to_string(),
            count: total,
            active: self.filter == CategoryFilter::All,
        }];
        tabs.extend(self.by_category.iter().map(|(name, items)| CategoryTab {
            name: name.clone(),
            count: items.len(),
            active: self.filter.label() == name,
        }));

        let items: Vec<ItemCard> = self
            .visible_items()
            .into_iter()
            .map(|i| {
                let editing = self.editing.as_deref() == Some(i.name.as_str());
                ItemCard {
                    name: i.name.clone(),
                    category: i.category,
                    selected: self.selected.contains(&i.name),
                    editing,
                    draggable: !editing,
                }
            })
            .collect();

        PantryPage {
            empty: items.is_empty(),
            tabs,
            items,
            tray: self.selected.clone(),
            search: self.search.clone(),
            category_options: Category::labels(),
        }
    }

    /// Tray contents for recipe generation; `None` when nothing is selected.
    pub fn take_to_kitchen(&self) -> Option<Vec<String>> {
        (!self.selected.is_empty()).then(|| self.selected.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pantry::model::group_by_category;

    fn loaded() -> PantryView {
        let mut view = PantryView::default();
        view.update(PantryEvent::Loaded(group_by_category(vec![
            Ingredient { name: "tomate".into(), category: Category::Vegetables },
            Ingredient { name: "alface".into(), category: Category::Vegetables },
            Ingredient { name: "banana".into(), category: Category::Fruits },
        ])));
        view
    }

    #[test]
    fn toggle_and_drop() {
        let mut view = loaded();
        view.update(PantryEvent::Toggle("tomate".into()));
        view.update(PantryEvent::DropOnTray("banana".into()));
        view.update(PantryEvent::DropOnTray("banana".into()));
        assert_eq!(view.selected(), ["tomate", "banana"]);

        view.update(PantryEvent::Toggle("tomate".into()));
        assert_eq!(view.selected(), ["banana"]);
    }

    #[test]
    fn toggle_ignored_on_card_being_edited() {
        let mut view = loaded();
        view.update(PantryEvent::BeginEdit("tomate".into()));
        view.update(PantryEvent::Toggle("tomate".into()));
        assert!(view.selected().is_empty());

        let page = view.render();
        let card = page.items.iter().find(|c| c.name == "tomate").unwrap();
        assert!(card.editing && !card.draggable);

        view.update(PantryEvent::CancelEdit);
        view.update(PantryEvent::Toggle("tomate".into()));
        assert_eq!(view.selected(), ["tomate"]);
    }

    #[test]
    fn reload_preserves_tray_but_navigation_clears_it() {
        let mut view = loaded();
        view.update(PantryEvent::Toggle("alface".into()));
        view.update(PantryEvent::Loaded(view.by_category().clone()));
        assert_eq!(view.selected(), ["alface"]);

        view.update(PantryEvent::Navigate);
        assert!(view.take_to_kitchen().is_none());
    }

    #[test]
    fn remove_and_rename_follow_the_tray() {
        let mut view = loaded();
        view.update(PantryEvent::Toggle("tomate".into()));
        view.update(PantryEvent::Toggle("banana".into()));
        view.update(PantryEvent::Renamed {
            old: "tomate".into(),
            new: "tomate cereja".into(),
        });
        view.update(PantryEvent::Removed("banana".into()));
        assert_eq!(view.take_to_kitchen(), Some(vec!["tomate cereja".to_string()]));
    }

    #[test]
    fn render_tabs_filters_and_search() {
        let mut view = loaded();
        let page = view.render();
        let tabs: Vec<_> = page.tabs.iter().map(|t| (t.name.as_str(), t.count, t.active)).collect();
        assert_eq!(
            tabs,
            vec![("Todos", 3, true), ("Frutas", 1, false), ("Legumes e Verduras", 2, false)]
        );
        assert_eq!(page.items.len(), 3);

        view.update(PantryEvent::SelectCategory(CategoryFilter::from_param(Some(
            "Legumes e Verduras",
        ))));
        view.update(PantryEvent::Search("ALF".into()));
        let page = view.render();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].name, "alface");
        assert!(page.tabs.iter().any(|t| t.name == "Legumes e Verduras" && t.active));

        view.update(PantryEvent::Search("pepino".into()));
        assert!(view.render().empty);
    }

    #[test]
    fn filter_param() {
        assert_eq!(CategoryFilter::from_param(None), CategoryFilter::All);
        assert_eq!(CategoryFilter::from_param(Some("Todos")), CategoryFilter::All);
        assert_eq!(
            CategoryFilter::from_param(Some("Frutas")),
            CategoryFilter::Only("Frutas".into())
        );
    }
}
