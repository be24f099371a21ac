//! Closed ingredient category list and the best-effort categorizer.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::llm::{GenerativeClient, ResponseFormat};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Category {
    DairyAndEggs,
    MeatPoultryFish,
    Vegetables,
    Fruits,
    GrainsAndCereals,
    PastaAndBread,
    BeansAndLegumes,
    OilsAndFats,
    HerbsAndSpices,
    SaucesAndCondiments,
    Sweets,
    Drinks,
    Other,
}

impl Category {
    pub const ALL: [Category; 13] = [
        Self::DairyAndEggs,
        Self::MeatPoultryFish,
        Self::Vegetables,
        Self::Fruits,
        Self::GrainsAndCereals,
        Self::PastaAndBread,
        Self::BeansAndLegumes,
        Self::OilsAndFats,
        Self::HerbsAndSpices,
        Self::SaucesAndCondiments,
        Self::Sweets,
        Self::Drinks,
        Self::Other,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::DairyAndEggs => "Laticínios e Ovos",
            Self::MeatPoultryFish => "Carnes, Aves e Peixes",
            Self::Vegetables => "Legumes e Verduras",
            Self::Fruits => "Frutas",
            Self::GrainsAndCereals => "Grãos e Cereais",
            Self::PastaAndBread => "Massas e Pães",
            Self::BeansAndLegumes => "Feijões e Leguminosas",
            Self::OilsAndFats => "Óleos e Gorduras",
            Self::HerbsAndSpices => "Ervas e Especiarias",
            Self::SaucesAndCondiments => "Molhos e Condimentos",
            Self::Sweets => "Doces e Sobremesas",
            Self::Drinks => "Bebidas",
            Self::Other => "Outros",
        }
    }

    pub fn labels() -> Vec<&'static str> {
        Self::ALL.iter().map(|c| c.label()).collect()
    }
}

impl Default for Category {
    fn default() -> Self {
        Self::Other
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct UnknownCategory(pub String);

impl fmt::Display for UnknownCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown category: {}", self.0)
    }
}

impl std::error::Error for UnknownCategory {}

/// Exact label match only.
impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.label() == s)
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

/// Stored labels outside the closed list read as `Outros`.
impl From<String> for Category {
    fn from(s: String) -> Self {
        s.parse().unwrap_or_default()
    }
}

impl From<Category> for String {
    fn from(c: Category) -> Self {
        c.label().to_string()
    }
}

fn categorize_prompt(name: &str) -> String {
    let categories = Category::labels().join(", ");
    format!(
        r#"Categorize o ingrediente a seguir em UMA das seguintes categorias: {categories}.
Ingrediente: "{name}".
Responda APENAS com o nome exato da categoria."#
    )
}

/// Classifies an ingredient. Every failure collapses to `Outros`.
pub async fn categorize(llm: &dyn GenerativeClient, name: &str) -> Category {
    if !llm.is_configured() {
        return Category::Other;
    }
    match llm.complete(&categorize_prompt(name), ResponseFormat::Text).await {
        Ok(reply) => match reply.trim().parse::<Category>() {
            Ok(c) => {
                debug!(ingredient = %name, category = %c, "ingredient categorized");
                c
            }
            Err(e) => {
                warn!(ingredient = %name, error = %e, "unrecognized category from model");
                Category::Other
            }
        },
        Err(e) => {
            warn!(ingredient = %name, error = %e, "categorization failed");
            Category::Other
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::testing::ScriptedClient;
    use crate::llm::LlmError;

    #[test]
    fn labels_round_trip_through_serde() {
        for c in Category::ALL {
            let json = serde_json::to_string(&c).unwrap();
            assert_eq!(json, format!("\"{}\"", c.label()));
            let back: Category = serde_json::from_str(&json).unwrap();
            assert_eq!(back, c);
        }
    }

    #[test]
    fn unknown_labels_read_as_other() {
        let c: Category = serde_json::from_str("\"Congelados\"").unwrap();
        assert_eq!(c, Category::Other);
        assert!("frutas".parse::<Category>().is_err());
    }

    #[tokio::test]
    async fn exact_reply_is_accepted() {
        let llm = ScriptedClient::new().reply("  Legumes e Verduras\n");
        assert_eq!(categorize(&llm, "tomate").await, Category::Vegetables);
        assert!(llm.prompts.lock().unwrap()[0].contains("\"tomate\""));
    }

    #[tokio::test]
    async fn anything_else_falls_back() {
        let llm = ScriptedClient::new()
            .reply("Legumes")
            .reply("A categoria é Frutas")
            .fail(LlmError::ApiError {
                status: 500,
                message: "boom".into(),
            });
        for _ in 0..3 {
            assert_eq!(categorize(&llm, "x").await, Category::Other);
        }
    }

    #[tokio::test]
    async fn unconfigured_skips_request() {
        let llm = ScriptedClient::unconfigured();
        assert_eq!(categorize(&llm, "tomate").await, Category::Other);
        assert_eq!(llm.calls(), 0);
    }
}
