use serde::Serialize;

use super::{Page, Route};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CardStatus {
    Active,
    Soon,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleCard {
    pub route: Route,
    pub title: &'static str,
    pub description: &'static str,
    pub status: CardStatus,
}

/// Landing page: a grid of module cards.
#[derive(Debug, Clone)]
pub struct HomePage {
    cards: Vec<ModuleCard>,
}

impl Default for HomePage {
    fn default() -> Self {
        Self::new()
    }
}

impl HomePage {
    pub fn new() -> Self {
        let cards = vec![
            ModuleCard {
                route: Route::Stress,
                title: "Stress Reduction",
                description: "Relaxation techniques that work with your mind",
                status: CardStatus::Active,
            },
            ModuleCard {
                route: Route::Pomodoro,
                title: "Pomodoro Timer",
                description: "Time management for maximum productivity",
                status: CardStatus::Active,
            },
            ModuleCard {
                route: Route::Concentration,
                title: "Concentration",
                description: "A reflex game to sharpen your attention",
                status: CardStatus::Active,
            },
        ];
        Self { cards }
    }

    pub fn cards(&self) -> &[ModuleCard] {
        &self.cards
    }

    /// Route for the `n`-th card, if it exists and is active.
    pub fn open(&self, n: usize) -> Option<Route> {
        self.cards
            .get(n)
            .filter(|c| c.status == CardStatus::Active)
            .map(|c| c.route)
    }
}

impl Page for HomePage {
    fn route(&self) -> Route {
        Route::Home
    }
}
