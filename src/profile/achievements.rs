use serde::Serialize;

use crate::auth::repo::User;

/// What the profile needs to evaluate achievements.
#[derive(Debug, Clone, Copy)]
pub struct Activity<'a> {
    pub posts: usize,
    pub saved: usize,
    pub user: &'a User,
}

pub struct Achievement {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    requires: fn(&Activity<'_>) -> bool,
}

fn profile_complete(a: &Activity<'_>) -> bool {
    let filled = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());
    filled(&a.user.display_name) && filled(&a.user.birth_date)
}

/// Listed in unlock order; the last unlocked one titles the profile.
pub static ACHIEVEMENTS: [Achievement; 10] = [
    Achievement {
        id: "first_login",
        title: "Pé na Cozinha",
        description: "Fez seu primeiro login no Combinet.",
        icon: "👋",
        requires: |_| true,
    },
    Achievement {
        id: "profile_complete",
        title: "Tudo em Ordem",
        description: "Preencheu nome e data de nascimento.",
        icon: "✅",
        requires: profile_complete,
    },
    Achievement {
        id: "posts_1",
        title: "Chef Iniciante",
        description: "Publicou sua primeira receita.",
        icon: "🍳",
        requires: |a| a.posts >= 1,
    },
    Achievement {
        id: "saved_1",
        title: "Curioso",
        description: "Salvou seu primeiro post.",
        icon: "👀",
        requires: |a| a.saved >= 1,
    },
    Achievement {
        id: "posts_5",
        title: "Cozinheiro Júnior",
        description: "Publicou 5 receitas.",
        icon: "👨‍🍳",
        requires: |a| a.posts >= 5,
    },
    Achievement {
        id: "saved_10",
        title: "Explorador Culinário",
        description: "Salvou 10 posts da comunidade.",
        icon: "🗺️",
        requires: |a| a.saved >= 10,
    },
    Achievement {
        id: "posts_10",
        title: "Chef de Partida",
        description: "Publicou 10 receitas.",
        icon: "🔪",
        requires: |a| a.posts >= 10,
    },
    Achievement {
        id: "posts_25",
        title: "Sous Chef",
        description: "Publicou 25 receitas. Você está no caminho!",
        icon: "🔥",
        requires: |a| a.posts >= 25,
    },
    Achievement {
        id: "posts_50",
        title: "Chef Executivo",
        description: "Publicou 50 receitas. Uma verdadeira inspiração!",
        icon: "⭐",
        requires: |a| a.posts >= 50,
    },
    Achievement {
        id: "posts_100",
        title: "MasterChef Combinet",
        description: "Publicou 100 receitas. Lenda da comunidade!",
        icon: "🏆",
        requires: |a| a.posts >= 100,
    },
];

const DEFAULT_TITLE: &str = "Amante da Culinária";

#[derive(Debug, Clone, Serialize)]
pub struct AchievementCard {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub unlocked: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct AchievementsPage {
    /// Title of the most recently unlocked achievement.
    pub profile_title: &'static str,
    pub unlocked_count: usize,
    pub total_count: usize,
    pub achievements: Vec<AchievementCard>,
}

pub fn evaluate(activity: &Activity<'_>) -> AchievementsPage {
    let achievements: Vec<AchievementCard> = ACHIEVEMENTS
        .iter()
        .map(|a| AchievementCard {
            id: a.id,
            title: a.title,
            description: a.description,
            icon: a.icon,
            unlocked: (a.requires)(activity),
        })
        .collect();
    let profile_title = achievements
        .iter()
        .filter(|a| a.unlocked)
        .last()
        .map(|a| a.title)
        .unwrap_or(DEFAULT_TITLE);
    AchievementsPage {
        profile_title,
        unlocked_count: achievements.iter().filter(|a| a.unlocked).count(),
        total_count: achievements.len(),
        achievements,
    }
}
