//! URL hash routing: `#/` is the menu, `#/snake?seed=42` mounts a game

use crate::games::GameId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Menu,
    Game {
        id: GameId,
        /// Fixed RNG seed for reproducible runs
        seed: Option<u64>,
    },
}

impl Route {
    /// Parse `location.hash`. Unknown slugs fall back to the menu.
    pub fn parse(hash: &str) -> Self {
        let path = hash.trim_start_matches('#').trim_start_matches('/');
        let (slug, query) = match path.split_once('?') {
            Some((slug, query)) => (slug, Some(query)),
            None => (path, None),
        };
        let slug = slug.trim_end_matches('/');
        if slug.is_empty() {
            return Route::Menu;
        }
        let Some(id) = GameId::from_slug(slug) else {
            log::warn!("Unknown route '{}', showing menu", hash);
            return Route::Menu;
        };
        let seed = query.and_then(|q| {
            q.split('&')
                .filter_map(|pair| pair.split_once('='))
                .find(|(key, _)| *key == "seed")
                .and_then(|(_, value)| value.parse().ok())
        });
        Route::Game { id, seed }
    }

    pub fn to_hash(&self) -> String {
        match self {
            Route::Menu => "#/".to_string(),
            Route::Game { id, seed: None } => format!("#/{}", id.slug()),
            Route::Game {
                id,
                seed: Some(seed),
            } => format!("#/{}?seed={}", id.slug(), seed),
        }
    }

    pub fn game(&self) -> Option<GameId> {
        match self {
            Route::Menu => None,
            Route::Game { id, .. } => Some(*id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_hash_is_menu() {
        assert_eq!(Route::parse(""), Route::Menu);
        assert_eq!(Route::parse("#"), Route::Menu);
        assert_eq!(Route::parse("#/"), Route::Menu);
    }

    #[test]
    fn parses_game_and_seed() {
        assert_eq!(
            Route::parse("#/snake"),
            Route::Game {
                id: GameId::Snake,
                seed: None
            }
        );
        assert_eq!(
            Route::parse("#/tower-defense?seed=42"),
            Route::Game {
                id: GameId::TowerDefense,
                seed: Some(42)
            }
        );
        assert_eq!(
            Route::parse("#/2048?foo=1&seed=7"),
            Route::Game {
                id: GameId::Twenty48,
                seed: Some(7)
            }
        );
    }

    #[test]
    fn bad_seed_is_ignored() {
        assert_eq!(
            Route::parse("#/pong?seed=abc"),
            Route::Game {
                id: GameId::Pong,
                seed: None
            }
        );
    }

    #[test]
    fn unknown_slug_falls_back_to_menu() {
        assert_eq!(Route::parse("#/galaga"), Route::Menu);
    }

    #[test]
    fn hashes_parse_back() {
        for id in GameId::ALL {
            for seed in [None, Some(123)] {
                let route = Route::Game { id, seed };
                assert_eq!(Route::parse(&route.to_hash()), route);
            }
        }
        assert_eq!(Route::parse(&Route::Menu.to_hash()), Route::Menu);
    }
}
