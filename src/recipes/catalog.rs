use super::model::Recipe;

fn recipe(id: u32, title: &str, description: &str, image: &str, ingredients: &[&str], preparation: &str) -> Recipe {
    Recipe {
        id: id.to_string(),
        title: title.to_string(),
        description: description.to_string(),
        category: None,
        ingredients: ingredients.iter().map(|s| s.to_string()).collect(),
        preparation: preparation.to_string(),
        image_url: Some(image.to_string()),
    }
}

/// Built-in recipes shown before the user generates anything.
pub fn builtin_recipes() -> Vec<Recipe> {
    vec![
        recipe(
            1,
            "Omelete Simples",
            "Um café da manhã rápido e nutritivo.",
            "https://placehold.co/600x400/f8b400/ffffff?text=Omelete",
            &["2 Ovos", "Sal a gosto", "Pimenta a gosto", "1 colher de sopa de Leite"],
            "Bata os ovos com o leite, sal e pimenta. Despeje em uma frigideira untada e cozinhe em fogo baixo até dourar. Dobre e sirva.",
        ),
        recipe(
            2,
            "Bolo de Chocolate",
            "Um bolo fofinho e delicioso para o lanche da tarde.",
            "https://placehold.co/600x400/5d4037/ffffff?text=Bolo",
            &[
                "2 xícaras de Farinha",
                "1 xícara de Açúcar",
                "1/2 xícara de Chocolate em pó",
                "2 Ovos",
                "1 xícara de Leite",
                "1/2 xícara de Óleo",
                "1 colher de sopa de Fermento",
            ],
            "Misture os ingredientes secos. Adicione os ovos, leite e óleo e bata bem. Por último, adicione o fermento. Asse em forno pré-aquecido a 180°C por 40 minutos.",
        ),
        recipe(
            3,
            "Panqueca Americana",
            "Perfeita para um café da manhã especial com mel ou frutas.",
            "https://placehold.co/600x400/e67e22/ffffff?text=Panqueca",
            &[
                "1 1/2 xícara de Farinha",
                "1 xícara de Leite",
                "1 Ovo",
                "2 colheres de sopa de Açúcar",
                "1 colher de sopa de Fermento",
                "2 colheres de sopa de Manteiga derretida",
            ],
            "Misture os ingredientes secos. Em outra tigela, misture o ovo, o leite e a manteiga. Junte as duas misturas e mexa até incorporar. Aqueça uma frigideira e despeje pequenas porções da massa. Cozinhe até dourar dos dois lados.",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_ids_are_unique() {
        let recipes = builtin_recipes();
        assert_eq!(recipes.len(), 3);
        let mut ids: Vec<_> = recipes.iter().map(|r| r.id.as_str()).collect();
        ids.dedup();
        assert_eq!(ids, vec!["1", "2", "3"]);
    }
}
