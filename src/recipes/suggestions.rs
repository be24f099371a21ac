//! Autocomplete for the ingredient box on the recipe search page.

pub const COMMON_INGREDIENTS: &[&str] = &[
    "ovo",
    "farinha de trigo",
    "açúcar",
    "leite",
    "manteiga",
    "chocolate em pó",
    "fermento",
    "sal",
    "pimenta do reino",
    "cebola",
    "alho",
    "tomate",
    "batata",
    "cenoura",
    "arroz",
    "feijão",
    "frango",
    "carne moída",
    "queijo mussarela",
    "presunto",
    "macarrão",
    "azeite de oliva",
    "limão",
    "laranja",
    "banana",
    "maçã",
    "abacate",
];

pub const MAX_SUGGESTIONS: usize = 5;

/// Common ingredients starting with `query`, minus the ones already picked.
pub fn suggest(query: &str, exclude: &[String]) -> Vec<&'static str> {
    suggest_from(COMMON_INGREDIENTS, query, exclude)
}

fn suggest_from(
    candidates: &[&'static str],
    query: &str,
    exclude: &[String],
) -> Vec<&'static str> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return Vec::new();
    }
    let picked: Vec<String> = exclude.iter().map(|e| e.trim().to_lowercase()).collect();
    candidates
        .iter()
        .copied()
        .filter(|name| name.starts_with(&query))
        .filter(|name| !picked.iter().any(|p| p == name))
        .take(MAX_SUGGESTIONS)
        .collect()
}
