//! The cabinet shell: menu, routing, pause/restart and score bookkeeping
//!
//! [`Cabinet`] is platform independent. The browser binding feeds it one
//! [`FrameInput`] per animation frame and mirrors its state into the DOM; the
//! native attract mode and the tests drive it directly with a [`MemoryStore`].
//!
//! [`MemoryStore`]: crate::platform::MemoryStore

pub mod router;

pub use router::Route;

use crate::games::{self, ArcadeGame, GameEvent, GameId};
use crate::highscores::ScoreBook;
use crate::platform::{FrameInput, Key, KeyValueStore};
use crate::settings::Settings;

/// A mounted game run
struct Session {
    game: Box<dyn ArcadeGame>,
    seed: u64,
    paused: bool,
    /// Result already submitted to the leaderboard
    recorded: bool,
    /// Presses and clicks from frames that ran no tick
    unticked: Option<FrameInput>,
}

impl Session {
    fn mount(id: GameId, seed: u64) -> Self {
        log::info!("Mounting {} with seed {}", id.slug(), seed);
        Self {
            game: games::create(id, seed),
            seed,
            paused: false,
            recorded: false,
            unticked: None,
        }
    }
}

pub struct Cabinet<S: KeyValueStore> {
    store: S,
    scores: ScoreBook,
    settings: Settings,
    route: Route,
    menu_cursor: usize,
    session: Option<Session>,
    /// Rank of the last recorded result (1-indexed)
    last_rank: Option<usize>,
    /// Timestamp of the latest frame, used to stamp results
    now_ms: f64,
}

impl<S: KeyValueStore> Cabinet<S> {
    pub fn new(store: S) -> Self {
        let scores = ScoreBook::load(&store);
        let settings = Settings::load(&store);
        Self {
            store,
            scores,
            settings,
            route: Route::Menu,
            menu_cursor: 0,
            session: None,
            last_rank: None,
            now_ms: 0.0,
        }
    }

    pub fn route(&self) -> Route {
        self.route
    }

    pub fn game(&self) -> Option<&dyn ArcadeGame> {
        self.session.as_ref().map(|s| s.game.as_ref())
    }

    /// Seed of the mounted run
    pub fn seed(&self) -> Option<u64> {
        self.session.as_ref().map(|s| s.seed)
    }

    pub fn is_paused(&self) -> bool {
        self.session.as_ref().is_some_and(|s| s.paused)
    }

    pub fn scores(&self) -> &ScoreBook {
        &self.scores
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn last_rank(&self) -> Option<usize> {
        self.last_rank
    }

    pub fn menu_cursor(&self) -> usize {
        self.menu_cursor
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Change settings and persist them
    pub fn update_settings(&mut self, change: impl FnOnce(&mut Settings)) {
        change(&mut self.settings);
        if let Err(e) = self.settings.save(&mut self.store) {
            log::warn!("Could not save settings: {}", e);
        }
    }

    /// Mount `route`, replacing the current session. `seed` is used when the
    /// route does not pin one.
    pub fn navigate(&mut self, route: Route, seed: u64) {
        self.record_result();
        self.last_rank = None;
        self.route = route;
        match route {
            Route::Menu => {
                if let Some(session) = self.session.take() {
                    let id = session.game.id();
                    self.menu_cursor = GameId::ALL.iter().position(|g| *g == id).unwrap_or(0);
                }
            }
            Route::Game { id, seed: pinned } => {
                self.session = Some(Session::mount(id, pinned.unwrap_or(seed)));
            }
        }
    }

    pub fn return_to_menu(&mut self) {
        self.navigate(Route::Menu, 0);
    }

    /// Fresh run of the mounted game. A seed pinned by the route wins.
    pub fn restart(&mut self, seed: u64) {
        if let Route::Game { .. } = self.route {
            self.navigate(self.route, seed);
        }
    }

    /// Pause the mounted run (blur, hidden tab). No-op once it has ended.
    pub fn pause(&mut self) {
        if let Some(session) = &mut self.session {
            if !session.game.phase().is_terminal() && !session.paused {
                session.paused = true;
                session.unticked = None;
                log::info!("Paused");
            }
        }
    }

    pub fn toggle_pause(&mut self) {
        if let Some(session) = &mut self.session {
            if !session.game.phase().is_terminal() {
                session.paused = !session.paused;
                session.unticked = None;
            }
        }
    }

    /// Run one animation frame: shell keys, then `steps` fixed ticks
    pub fn frame(&mut self, input: &FrameInput, steps: u32, dt: f32, now_ms: f64) -> Vec<GameEvent> {
        self.now_ms = now_ms;
        if input.pressed(Key::Mute) {
            self.update_settings(|s| {
                s.toggle_mute();
            });
        }
        match self.route {
            Route::Menu => {
                self.menu_frame(input, now_ms as u64);
                Vec::new()
            }
            Route::Game { .. } => self.game_frame(input, steps, dt, now_ms as u64),
        }
    }

    fn menu_frame(&mut self, input: &FrameInput, seed: u64) {
        let count = GameId::ALL.len();
        for key in input.pressed_keys() {
            match key {
                Key::Left | Key::Up => self.menu_cursor = (self.menu_cursor + count - 1) % count,
                Key::Right | Key::Down => self.menu_cursor = (self.menu_cursor + 1) % count,
                Key::Confirm | Key::Action => {
                    let id = GameId::ALL[self.menu_cursor];
                    self.navigate(Route::Game { id, seed: None }, seed);
                    return;
                }
                _ => {}
            }
        }
    }

    fn game_frame(&mut self, input: &FrameInput, steps: u32, dt: f32, seed: u64) -> Vec<GameEvent> {
        if input.pressed(Key::Back) {
            self.return_to_menu();
            return Vec::new();
        }
        if input.pressed(Key::Restart) {
            self.restart(seed);
            return Vec::new();
        }
        if input.pressed(Key::Pause) {
            self.toggle_pause();
        }

        let Some(session) = &mut self.session else {
            return Vec::new();
        };
        if !session.paused {
            let input = match session.unticked.take() {
                Some(earlier) => input.clone().carry_over(earlier),
                None => input.clone(),
            };
            if steps == 0 {
                // Fast displays run frames shorter than a tick; hold the
                // one-shots until one runs
                if input.has_one_shots() {
                    session.unticked = Some(input);
                }
            } else {
                // One-shot inputs only count once per frame
                let continuous = input.continuous();
                for step in 0..steps {
                    let step_input = if step == 0 { &input } else { &continuous };
                    session.game.tick(step_input, dt);
                }
            }
        }
        let mut events = session.game.take_events();
        if session.game.phase().is_terminal() && self.record_result() == Some(1) {
            events.push(GameEvent::NewHighScore);
        }
        events
    }

    /// Submit a finished run once. Returns the rank it earned, if any.
    fn record_result(&mut self) -> Option<usize> {
        let session = self.session.as_mut()?;
        if session.recorded || !session.game.phase().is_terminal() {
            return None;
        }
        session.recorded = true;
        let id = session.game.id();
        let score = session.game.result()?;
        match self.scores.record(&mut self.store, id, score, self.now_ms) {
            Ok(rank) => {
                self.last_rank = rank;
                rank
            }
            Err(e) => {
                log::warn!("Could not save {} score: {}", id.slug(), e);
                None
            }
        }
    }
}
