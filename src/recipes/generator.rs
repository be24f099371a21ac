//! Recipe suggestions from the generative endpoint.
//!
//! The whole call yields either a complete list or nothing: any transport,
//! API or parse failure becomes an empty list.

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use time::OffsetDateTime;
use tracing::{error, warn};

use super::model::Recipe;
use crate::llm::{GenerativeClient, ResponseFormat};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Taste {
    Salty,
    Sweet,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Quick,
    Elaborate,
}

/// Optional taste/difficulty/style hints.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RefinementOptions {
    #[serde(default, alias = "type")]
    pub taste: Option<Taste>,
    #[serde(default)]
    pub difficulty: Option<Difficulty>,
    #[serde(default)]
    pub style: Option<String>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GenerateError {
    #[error("at least one ingredient is required")]
    NoIngredients,
}

fn refinement_prompt(opts: &RefinementOptions) -> String {
    let mut out = String::new();
    match opts.taste {
        Some(Taste::Salty) => out.push_str(" A receita deve ser salgada."),
        Some(Taste::Sweet) => out.push_str(" A receita deve ser doce."),
        None => {}
    }
    match opts.difficulty {
        Some(Difficulty::Quick) => {
            out.push_str(" A receita deve ser rápida e fácil (menos de 30 minutos).")
        }
        Some(Difficulty::Elaborate) => {
            out.push_str(" A receita pode ser mais elaborada e gourmet.")
        }
        None => {}
    }
    if let Some(style) = opts.style.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        out.push_str(&format!(" A receita deve ter um estilo {}.", style));
    }
    out
}

pub fn build_prompt(ingredients: &[String], opts: &RefinementOptions) -> String {
    let ingredients_text = ingredients.join(", ");
    let refinement = refinement_prompt(opts);
    format!(
        r#"Você é um chef de cozinha criativo. Sua tarefa é criar entre 1 e 3 receitas deliciosas
usando os seguintes ingredientes: {ingredients_text}.
{refinement}

Responda APENAS com um array JSON válido, seguindo esta estrutura:
[
  {{
    "id": "receita_gerada_1",
    "title": "Nome da Receita",
    "description": "Uma descrição curta, apetitosa e que chame a atenção.",
    "category": "Uma categoria apropriada, como 'Prato Principal', 'Sobremesa', 'Lanche', 'Café da Manhã', 'Bebida' ou 'Acompanhamento'",
    "ingredients": ["Ingrediente 1 (com quantidade)", "Ingrediente 2 (com quantidade)"],
    "preparation": "Passo a passo detalhado do modo de preparo, com cada passo em uma nova linha."
  }}
]

Se não for possível criar uma receita com os ingredientes, retorne um array vazio [].
Não inclua nenhuma formatação ou texto adicional fora do array JSON."#
    )
}

/// Single record returned when the endpoint has no API key.
fn placeholder(ingredients: &[String]) -> Recipe {
    Recipe {
        id: "exemplo_sem_chave".into(),
        title: "Receita de Exemplo (Sem Chave)".into(),
        description: "Configure GEMINI_API_KEY no servidor para gerar receitas.".into(),
        category: Some("Exemplos".into()),
        ingredients: ingredients.iter().map(|i| format!("Item: {}", i)).collect(),
        preparation: "1. Defina a variável GEMINI_API_KEY.\n2. Reinicie o servidor.".into(),
        image_url: None,
    }
}

fn strip_code_fence(text: &str) -> &str {
    let t = text.trim();
    let Some(rest) = t.strip_prefix("```") else {
        return t;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

/// Parses a JSON array of recipes. Anything else yields an empty list.
pub fn parse_recipes(text: &str) -> Vec<Recipe> {
    let value: Value = match serde_json::from_str(strip_code_fence(text)) {
        Ok(v) => v,
        Err(e) => {
            warn!(error = %e, "generated recipes are not valid JSON");
            return Vec::new();
        }
    };
    if !value.is_array() {
        warn!("generated recipes are not a JSON array");
        return Vec::new();
    }
    let mut recipes: Vec<Recipe> = match serde_json::from_value(value) {
        Ok(r) => r,
        Err(e) => {
            warn!(error = %e, "generated recipes do not match the recipe shape");
            return Vec::new();
        }
    };

    let stamp = OffsetDateTime::now_utc().unix_timestamp_nanos();
    for (i, r) in recipes.iter_mut().enumerate() {
        if r.id.trim().is_empty() {
            r.id = format!("receita_gerada_{}_{}", stamp, i + 1);
        }
    }
    recipes
}

pub async fn generate(
    llm: &dyn GenerativeClient,
    ingredients: &[String],
    opts: &RefinementOptions,
) -> Result<Vec<Recipe>, GenerateError> {
    let ingredients: Vec<String> = ingredients
        .iter()
        .map(|i| i.trim().to_string())
        .filter(|i| !i.is_empty())
        .collect();
    if ingredients.is_empty() {
        return Err(GenerateError::NoIngredients);
    }

    if !llm.is_configured() {
        error!("generative endpoint not configured; returning placeholder recipe");
        return Ok(vec![placeholder(&ingredients)]);
    }

    let prompt = build_prompt(&ingredients, opts);
    match llm.complete(&prompt, ResponseFormat::Json).await {
        Ok(text) => Ok(parse_recipes(&text)),
        Err(e) => {
            error!(error = %e, "recipe generation failed");
            Ok(Vec::new())
        }
    }
}
