//! Maze Chase: eat every pellet while four ghosts hunt you down
//!
//! Actors move tile to tile. A [`Mover`] sits on a cell with a heading and a
//! fractional progress toward the next cell; decisions happen only on cell
//! centres. Ghosts pick the open exit closest to a target tile and never
//! double back, which is enough to give each one a distinct personality.

use glam::Vec2;

use super::{ArcadeGame, GameEvent, GameId, HudItem, Phase, pressed_dir, start_pressed};
use crate::platform::FrameInput;
use crate::renderer::{Color, Scene, colors, with_alpha};
use crate::sim::{Cell, Dir, GameRng, Grid, Rect};

const LAYOUT: [&str; 21] = [
    "###################",
    "#........#........#",
    "#o##.###.#.###.##o#",
    "#.................#",
    "#.##.#.#####.#.##.#",
    "#....#...#...#....#",
    "####.### # ###.####",
    "   #.#       #.#   ",
    "####.# ##-## #.####",
    "    .  #GGG#  .    ",
    "####.# ##### #.####",
    "   #.#       #.#   ",
    "####.# ##### #.####",
    "#........#........#",
    "#.##.###.#.###.##.#",
    "#o.#.....P.....#.o#",
    "##.#.#.#####.#.#.##",
    "#....#...#...#....#",
    "#.######.#.######.#",
    "#.................#",
    "###################",
];

pub const COLS: i32 = 19;
pub const ROWS: i32 = 21;
const TILE: f32 = 28.0;
const PLAYER_START: Cell = (9, 15);
const HOUSE_EXIT: Cell = (9, 7);
const HOUSE_CENTER: Cell = (9, 9);
const GHOST_STARTS: [Cell; 4] = [HOUSE_EXIT, (8, 9), (9, 9), (10, 9)];
/// Seconds each ghost waits in the house after a (re)start
const RELEASE_TIMES: [f32; 4] = [0.0, 1.0, 5.0, 9.0];
/// Scatter targets sit just outside the maze corners
const SCATTER_CORNERS: [Cell; 4] = [(COLS - 2, -2), (1, -2), (COLS - 1, ROWS), (0, ROWS)];
const MODE_SCHEDULE: [(Mode, f32); 6] = [
    (Mode::Scatter, 7.0),
    (Mode::Chase, 20.0),
    (Mode::Scatter, 7.0),
    (Mode::Chase, 20.0),
    (Mode::Scatter, 5.0),
    (Mode::Chase, f32::INFINITY),
];
const GHOST_POINTS: [u64; 4] = [200, 400, 800, 1600];
const DOT_POINTS: u64 = 10;
const POWER_POINTS: u64 = 50;
pub const START_LIVES: u32 = 3;

/// Speeds in tiles per second
const PLAYER_SPEED: f32 = 7.5;
const GHOST_SPEED: f32 = 7.0;
const FRIGHTENED_SPEED: f32 = 4.0;
const LEAVING_SPEED: f32 = 4.0;
const EATEN_SPEED: f32 = 14.0;
/// Pause after a death or a cleared maze
const FREEZE_TIME: f32 = 1.2;
/// Actors closer than this many tiles collide
const CATCH_DISTANCE: f32 = 0.6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tile {
    Wall,
    Open,
    /// Ghost house gate; ghosts only
    Door,
    House,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pellet {
    None,
    Dot,
    Power,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Scatter,
    Chase,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Personality {
    /// Targets the player's tile
    Shadow,
    /// Targets four tiles ahead of the player
    Ambush,
    /// Mirrors the shadow ghost around a point two tiles ahead of the player
    Flank,
    /// Chases from afar, retreats up close
    Shy,
}

const PERSONALITIES: [Personality; 4] = [
    Personality::Shadow,
    Personality::Ambush,
    Personality::Flank,
    Personality::Shy,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GhostState {
    InHouse,
    Leaving,
    Active,
    /// Eyes heading home after being eaten
    Eaten,
}

fn wrap((x, y): Cell) -> Cell {
    (x.rem_euclid(COLS), y)
}

fn tile_at(tiles: &Grid<Tile>, cell: Cell) -> Tile {
    tiles.get(wrap(cell)).copied().unwrap_or(Tile::Wall)
}

fn ghost_passable(tiles: &Grid<Tile>, cell: Cell, through_door: bool) -> bool {
    match tile_at(tiles, cell) {
        Tile::Open => true,
        Tile::Door | Tile::House => through_door,
        Tile::Wall => false,
    }
}

fn dist2((ax, ay): Cell, (bx, by): Cell) -> i32 {
    (ax - bx).pow(2) + (ay - by).pow(2)
}

/// Exit a ghost takes from `cell`. Never reverses unless the cell is a dead end.
fn choose_dir(
    tiles: &Grid<Tile>,
    cell: Cell,
    current: Option<Dir>,
    target: Cell,
    through_door: bool,
    random: Option<&mut GameRng>,
) -> Option<Dir> {
    // Tie-break order: up, left, down, right
    let options: Vec<Dir> = [Dir::Up, Dir::Left, Dir::Down, Dir::Right]
        .into_iter()
        .filter(|d| current != Some(d.opposite()))
        .filter(|d| ghost_passable(tiles, d.step(cell), through_door))
        .collect();
    if options.is_empty() {
        return current
            .map(|d| d.opposite())
            .filter(|d| ghost_passable(tiles, d.step(cell), through_door));
    }
    match random {
        Some(rng) => rng.pick(&options).copied(),
        None => options
            .into_iter()
            .min_by_key(|d| dist2(d.step(cell), target)),
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Mover {
    cell: Cell,
    dir: Option<Dir>,
    /// 0 at `cell`, 1 at the next cell along `dir`
    progress: f32,
}

impl Mover {
    fn new(cell: Cell) -> Self {
        Self {
            cell,
            dir: None,
            progress: 0.0,
        }
    }

    /// Position in tiles, centre of the cell
    fn pos(&self) -> Vec2 {
        let (dx, dy) = self.dir.map_or((0, 0), |d| d.delta());
        Vec2::new(
            self.cell.0 as f32 + dx as f32 * self.progress + 0.5,
            self.cell.1 as f32 + dy as f32 * self.progress + 0.5,
        )
    }

    fn reverse(&mut self) {
        let Some(dir) = self.dir else {
            return;
        };
        if self.progress > 0.0 {
            self.cell = wrap(dir.step(self.cell));
            self.progress = 1.0 - self.progress;
        }
        self.dir = Some(dir.opposite());
    }

    /// Move `distance` tiles, consulting `decide` on every cell centre.
    /// Returns the cells reached.
    fn advance(
        &mut self,
        distance: f32,
        mut decide: impl FnMut(Cell, Option<Dir>) -> Option<Dir>,
    ) -> Vec<Cell> {
        let mut left = distance;
        let mut arrived = Vec::new();
        loop {
            if self.progress <= 0.0 {
                self.dir = decide(self.cell, self.dir);
            }
            let Some(dir) = self.dir else {
                break;
            };
            let remaining = 1.0 - self.progress;
            if left < remaining {
                self.progress += left;
                break;
            }
            left -= remaining;
            self.cell = wrap(dir.step(self.cell));
            self.progress = 0.0;
            arrived.push(self.cell);
        }
        arrived
    }
}

#[derive(Debug, Clone)]
struct Ghost {
    personality: Personality,
    mover: Mover,
    state: GhostState,
    frightened: bool,
    release: f32,
}

pub struct MazeChase {
    phase: Phase,
    rng: GameRng,
    tiles: Grid<Tile>,
    pellets: Grid<Pellet>,
    player: Mover,
    /// Buffered turn, taken at the first cell where it is open
    want: Option<Dir>,
    ghosts: Vec<Ghost>,
    mode_index: usize,
    mode_timer: f32,
    frightened_timer: f32,
    /// Ghosts eaten during the current power pellet
    streak: usize,
    freeze: f32,
    lives: u32,
    level: u32,
    score: u64,
    clock: f32,
    events: Vec<GameEvent>,
}

fn parse_layout() -> (Grid<Tile>, Grid<Pellet>) {
    let tiles = LAYOUT
        .iter()
        .map(|row| {
            row.chars()
                .map(|c| match c {
                    '#' => Tile::Wall,
                    '-' => Tile::Door,
                    'G' => Tile::House,
                    _ => Tile::Open,
                })
                .collect()
        })
        .collect();
    let pellets = LAYOUT
        .iter()
        .map(|row| {
            row.chars()
                .map(|c| match c {
                    '.' => Pellet::Dot,
                    'o' => Pellet::Power,
                    _ => Pellet::None,
                })
                .collect()
        })
        .collect();
    (Grid::from_rows(tiles), Grid::from_rows(pellets))
}

impl MazeChase {
    pub fn new(seed: u64) -> Self {
        let (tiles, pellets) = parse_layout();
        let mut game = Self {
            phase: Phase::Ready,
            rng: GameRng::new(seed),
            tiles,
            pellets,
            player: Mover::new(PLAYER_START),
            want: None,
            ghosts: Vec::new(),
            mode_index: 0,
            mode_timer: MODE_SCHEDULE[0].1,
            frightened_timer: 0.0,
            streak: 0,
            freeze: 0.0,
            lives: START_LIVES,
            level: 1,
            score: 0,
            clock: 0.0,
            events: Vec::new(),
        };
        game.reset_actors();
        game
    }

    pub fn lives(&self) -> u32 {
        self.lives
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn pellets_left(&self) -> usize {
        self.pellets.values().filter(|p| **p != Pellet::None).count()
    }

    fn mode(&self) -> Mode {
        MODE_SCHEDULE[self.mode_index].0
    }

    fn reset_actors(&mut self) {
        self.player = Mover::new(PLAYER_START);
        self.want = None;
        self.ghosts = PERSONALITIES
            .iter()
            .enumerate()
            .map(|(i, &personality)| {
                let mut mover = Mover::new(GHOST_STARTS[i]);
                let state = if i == 0 {
                    mover.dir = Some(Dir::Left);
                    GhostState::Active
                } else {
                    GhostState::InHouse
                };
                Ghost {
                    personality,
                    mover,
                    state,
                    frightened: false,
                    release: RELEASE_TIMES[i],
                }
            })
            .collect();
        self.frightened_timer = 0.0;
        self.streak = 0;
        self.mode_index = 0;
        self.mode_timer = MODE_SCHEDULE[0].1;
    }

    fn frightened_duration(&self) -> f32 {
        (7.0 - self.level as f32).max(2.0)
    }

    fn ghost_speed(&self, ghost: &Ghost) -> f32 {
        match ghost.state {
            GhostState::InHouse | GhostState::Leaving => LEAVING_SPEED,
            GhostState::Eaten => EATEN_SPEED,
            GhostState::Active if ghost.frightened => FRIGHTENED_SPEED,
            GhostState::Active => (GHOST_SPEED * (1.0 + 0.05 * (self.level - 1) as f32)).min(9.0),
        }
    }

    fn ghost_target(&self, index: usize) -> Cell {
        let ghost = &self.ghosts[index];
        match ghost.state {
            GhostState::Eaten => return HOUSE_CENTER,
            GhostState::InHouse | GhostState::Leaving => return HOUSE_EXIT,
            GhostState::Active => {}
        }
        if self.mode() == Mode::Scatter {
            return SCATTER_CORNERS[index];
        }
        let player = self.player.cell;
        let (hx, hy) = self.player.dir.unwrap_or(Dir::Left).delta();
        let ahead = |n: i32| (player.0 + hx * n, player.1 + hy * n);
        match ghost.personality {
            Personality::Shadow => player,
            Personality::Ambush => ahead(4),
            Personality::Flank => {
                let pivot = ahead(2);
                let shadow = self.ghosts[0].mover.cell;
                (2 * pivot.0 - shadow.0, 2 * pivot.1 - shadow.1)
            }
            Personality::Shy if dist2(ghost.mover.cell, player) > 64 => player,
            Personality::Shy => SCATTER_CORNERS[index],
        }
    }

    fn eat(&mut self, cell: Cell) {
        let Some(pellet) = self.pellets.get_mut(cell) else {
            return;
        };
        match std::mem::replace(pellet, Pellet::None) {
            Pellet::None => return,
            Pellet::Dot => {
                self.score += DOT_POINTS;
                self.events.push(GameEvent::Blip);
            }
            Pellet::Power => {
                self.score += POWER_POINTS;
                self.frightened_timer = self.frightened_duration();
                self.streak = 0;
                for ghost in &mut self.ghosts {
                    if ghost.state != GhostState::Eaten {
                        ghost.frightened = true;
                        if ghost.state == GhostState::Active {
                            ghost.mover.reverse();
                        }
                    }
                }
                self.events.push(GameEvent::PowerUp);
            }
        }

        if self.pellets_left() == 0 {
            self.level += 1;
            self.pellets = parse_layout().1;
            self.reset_actors();
            self.freeze = FREEZE_TIME;
            self.events.push(GameEvent::LevelUp);
        }
    }

    fn resolve_collisions(&mut self) {
        let player = self.player.pos();
        let mut caught = false;
        for ghost in &mut self.ghosts {
            if !matches!(ghost.state, GhostState::Active | GhostState::Leaving) {
                continue;
            }
            if ghost.mover.pos().distance(player) >= CATCH_DISTANCE {
                continue;
            }
            if ghost.frightened {
                ghost.state = GhostState::Eaten;
                ghost.frightened = false;
                self.score += GHOST_POINTS[self.streak.min(GHOST_POINTS.len() - 1)];
                self.streak += 1;
                self.events.push(GameEvent::Score);
            } else {
                caught = true;
            }
        }
        if caught {
            self.lose_life();
        }
    }

    fn lose_life(&mut self) {
        self.lives = self.lives.saturating_sub(1);
        if self.lives == 0 {
            self.phase = Phase::GameOver;
            self.events.push(GameEvent::GameOver);
            return;
        }
        self.events.push(GameEvent::LifeLost);
        self.reset_actors();
        self.freeze = FREEZE_TIME;
    }

    fn move_player(&mut self, dt: f32) {
        if let (Some(want), Some(dir)) = (self.want, self.player.dir) {
            if want == dir.opposite() {
                self.player.reverse();
                self.want = None;
            }
        }
        let tiles = &self.tiles;
        let want = &mut self.want;
        let open = |cell: Cell| tile_at(tiles, cell) == Tile::Open;
        let arrived = self.player.advance(PLAYER_SPEED * dt, |cell, dir| {
            if let Some(turn) = want.filter(|w| open(w.step(cell))) {
                *want = None;
                return Some(turn);
            }
            dir.filter(|d| open(d.step(cell)))
        });
        for cell in arrived {
            self.eat(cell);
            if self.freeze > 0.0 {
                break;
            }
        }
    }

    fn move_ghosts(&mut self, dt: f32) {
        for i in 0..self.ghosts.len() {
            if self.ghosts[i].state == GhostState::InHouse {
                self.ghosts[i].release -= dt;
                if self.ghosts[i].release <= 0.0 {
                    self.ghosts[i].state = GhostState::Leaving;
                }
                continue;
            }
            let target = self.ghost_target(i);
            let speed = self.ghost_speed(&self.ghosts[i]);
            let ghost = &mut self.ghosts[i];
            let through_door = matches!(ghost.state, GhostState::Leaving | GhostState::Eaten);
            let random = ghost.frightened && ghost.state == GhostState::Active;
            let tiles = &self.tiles;
            let rng = &mut self.rng;
            let arrived = ghost.mover.advance(speed * dt, |cell, dir| {
                choose_dir(tiles, cell, dir, target, through_door, random.then_some(&mut *rng))
            });
            for cell in arrived {
                match ghost.state {
                    GhostState::Leaving if cell == HOUSE_EXIT => ghost.state = GhostState::Active,
                    GhostState::Eaten if cell == HOUSE_CENTER => ghost.state = GhostState::Leaving,
                    _ => {}
                }
            }
        }
    }

    fn ghost_color(&self, ghost: &Ghost) -> Color {
        if ghost.frightened {
            // Flash as the power runs out
            let flashing = self.frightened_timer < 2.0 && (self.clock * 8.0).sin() > 0.0;
            return if flashing { colors::WHITE } else { colors::BLUE };
        }
        match ghost.personality {
            Personality::Shadow => colors::RED,
            Personality::Ambush => colors::PINK,
            Personality::Flank => colors::TEAL,
            Personality::Shy => colors::ORANGE,
        }
    }
}

impl ArcadeGame for MazeChase {
    fn id(&self) -> GameId {
        GameId::MazeChase
    }

    fn size(&self) -> Vec2 {
        Vec2::new(COLS as f32 * TILE, ROWS as f32 * TILE)
    }

    fn phase(&self) -> Phase {
        self.phase
    }

    fn score(&self) -> u64 {
        self.score
    }

    fn hud(&self) -> Vec<HudItem> {
        vec![
            HudItem::new("Lives", self.lives),
            HudItem::new("Level", self.level),
            HudItem::new("Pellets", self.pellets_left()),
        ]
    }

    fn tick(&mut self, input: &FrameInput, dt: f32) {
        self.clock += dt;
        let dir = pressed_dir(input);
        match self.phase {
            Phase::Ready if start_pressed(input) || dir.is_some() => self.phase = Phase::Playing,
            Phase::Ready => return,
            Phase::Playing => {}
            Phase::Won | Phase::GameOver => return,
        }
        if dir.is_some() {
            self.want = dir;
        }

        if self.freeze > 0.0 {
            self.freeze -= dt;
            return;
        }

        if self.frightened_timer > 0.0 {
            self.frightened_timer -= dt;
            if self.frightened_timer <= 0.0 {
                for ghost in &mut self.ghosts {
                    ghost.frightened = false;
                }
            }
        } else {
            self.mode_timer -= dt;
            if self.mode_timer <= 0.0 && self.mode_index + 1 < MODE_SCHEDULE.len() {
                self.mode_index += 1;
                self.mode_timer = MODE_SCHEDULE[self.mode_index].1;
            }
        }

        let level = self.level;
        self.move_player(dt);
        if self.freeze > 0.0 || self.level != level {
            return;
        }
        self.resolve_collisions();
        if self.phase != Phase::Playing || self.freeze > 0.0 {
            return;
        }
        self.move_ghosts(dt);
        self.resolve_collisions();
    }

    fn draw(&self, scene: &mut Scene) {
        for ((x, y), tile) in self.tiles.iter() {
            let rect = Rect::new(x as f32 * TILE, y as f32 * TILE, TILE, TILE);
            match tile {
                Tile::Wall => scene.rect(rect.inflate(-2.0), colors::NAVY),
                Tile::Door => scene.rect(
                    Rect::new(rect.x, rect.center().y - 2.0, TILE, 4.0),
                    colors::PINK,
                ),
                Tile::Open | Tile::House => {}
            }
        }
        for ((x, y), pellet) in self.pellets.iter() {
            let center = Vec2::new((x as f32 + 0.5) * TILE, (y as f32 + 0.5) * TILE);
            match pellet {
                Pellet::Dot => scene.circle(center, 3.0, colors::WHITE),
                Pellet::Power if (self.clock * 4.0).sin() > -0.5 => {
                    scene.circle(center, 8.0, colors::WHITE)
                }
                _ => {}
            }
        }

        for ghost in &self.ghosts {
            let center = ghost.mover.pos() * TILE;
            let r = TILE * 0.45;
            if ghost.state != GhostState::Eaten {
                let color = self.ghost_color(ghost);
                scene.circle(center, r, color);
                scene.rect(Rect::new(center.x - r, center.y, r * 2.0, r), color);
            }
            // Eyes look where the ghost is heading
            let (lx, ly) = ghost.mover.dir.map_or((0, 0), |d| d.delta());
            let look = Vec2::new(lx as f32, ly as f32) * 2.0;
            for side in [-1.0, 1.0] {
                let eye = center + Vec2::new(side * r * 0.4, -r * 0.2);
                scene.circle(eye, 4.0, colors::WHITE);
                scene.circle(eye + look, 2.0, colors::NAVY);
            }
        }

        let center = self.player.pos() * TILE;
        let r = TILE * 0.45;
        scene.circle(center, r, colors::YELLOW);
        if self.phase == Phase::Playing {
            let (dx, dy) = self.player.dir.unwrap_or(Dir::Right).delta();
            let facing = Vec2::new(dx as f32, dy as f32);
            let open = ((self.clock * 12.0).sin().abs() * 0.8 + 0.1) * r;
            let side = facing.perp() * open;
            let mouth = scene.background();
            scene.triangle(
                center,
                center + facing * r * 1.1 + side,
                center + facing * r * 1.1 - side,
                mouth,
            );
        }

        if self.frightened_timer > 0.0 {
            let frac = self.frightened_timer / self.frightened_duration();
            scene.rect(
                Rect::new(0.0, 0.0, COLS as f32 * TILE * frac, 3.0),
                with_alpha(colors::BLUE, 0.8),
            );
        }
    }

    fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::Key;

    const DT: f32 = 1.0 / 60.0;

    /// Playing, with every ghost parked in the house
    fn calm() -> MazeChase {
        let mut game = MazeChase::new(1);
        game.phase = Phase::Playing;
        for ghost in &mut game.ghosts {
            ghost.state = GhostState::InHouse;
            ghost.release = f32::INFINITY;
        }
        game
    }

    fn ghost_on_player(game: &mut MazeChase, index: usize) {
        game.ghosts[index].state = GhostState::Active;
        game.ghosts[index].mover = game.player;
    }

    #[test]
    fn layout_is_rectangular_and_stocked() {
        assert!(LAYOUT.iter().all(|row| row.len() == COLS as usize));
        let game = MazeChase::new(0);
        assert!(game.pellets_left() > 100);
        assert_eq!(tile_at(&game.tiles, PLAYER_START), Tile::Open);
        assert_eq!(tile_at(&game.tiles, (9, 8)), Tile::Door);
        // The side tunnel wraps
        assert_eq!(wrap((-1, 9)), (COLS - 1, 9));
    }

    #[test]
    fn player_eats_along_corridor() {
        let mut game = calm();
        game.tick(&FrameInput::idle().with_pressed(Key::Right), DT);
        for _ in 0..20 {
            game.tick(&FrameInput::idle(), DT);
        }
        assert!(game.score() >= 2 * DOT_POINTS);
        assert_eq!(game.pellets.get((10, 15)), Some(&Pellet::None));
    }

    #[test]
    fn turn_is_buffered_until_open() {
        let mut game = calm();
        game.player.dir = Some(Dir::Right);
        game.tick(&FrameInput::idle().with_pressed(Key::Up), DT);
        for _ in 0..20 {
            game.tick(&FrameInput::idle(), DT);
        }
        assert_eq!(game.player.cell.0, 10);
        assert!(game.player.cell.1 < 15);
    }

    #[test]
    fn walls_stop_the_player() {
        let mut game = calm();
        game.player = Mover::new((1, 1));
        game.player.dir = Some(Dir::Left);
        game.tick(&FrameInput::idle(), DT);
        assert_eq!(game.player.dir, None);
        assert_eq!(game.player.cell, (1, 1));
    }

    #[test]
    fn reversing_is_immediate() {
        let mut game = calm();
        game.player.dir = Some(Dir::Right);
        game.player.progress = 0.5;
        game.tick(&FrameInput::idle().with_pressed(Key::Left), DT);
        assert_eq!(game.player.dir, Some(Dir::Left));
        assert_eq!(game.player.cell, (10, 15));
    }

    #[test]
    fn power_pellet_frightens_and_ghosts_pay_double() {
        let mut game = calm();
        game.ghosts[1].state = GhostState::Active;
        game.ghosts[2].state = GhostState::Active;
        game.eat((1, 15));
        assert_eq!(game.score(), POWER_POINTS);
        assert!(game.ghosts.iter().all(|g| g.frightened));

        ghost_on_player(&mut game, 1);
        game.resolve_collisions();
        assert_eq!(game.score(), POWER_POINTS + 200);
        ghost_on_player(&mut game, 2);
        game.resolve_collisions();
        assert_eq!(game.score(), POWER_POINTS + 600);
        assert_eq!(game.ghosts[1].state, GhostState::Eaten);
        assert_eq!(game.lives(), START_LIVES);
    }

    #[test]
    fn hunting_ghost_costs_a_life() {
        let mut game = calm();
        game.player = Mover::new((4, 3));
        ghost_on_player(&mut game, 0);
        game.resolve_collisions();
        assert_eq!(game.lives(), START_LIVES - 1);
        assert_eq!(game.player.cell, PLAYER_START);
    }

    #[test]
    fn clearing_the_maze_advances_level() {
        let mut game = calm();
        for pellet in game.pellets.values_mut() {
            *pellet = Pellet::None;
        }
        game.pellets.set((10, 15), Pellet::Dot);
        game.eat((10, 15));
        assert_eq!(game.level(), 2);
        assert!(game.pellets_left() > 100);
    }

    #[test]
    fn ghosts_do_not_reverse() {
        let (tiles, _) = parse_layout();
        // Corridor on row 3, target behind the ghost
        let dir = choose_dir(&tiles, (5, 3), Some(Dir::Right), (0, 3), false, None);
        assert_eq!(dir, Some(Dir::Right));
        // Dead ends are the exception
        let dir = choose_dir(&tiles, (8, 9), Some(Dir::Left), HOUSE_EXIT, true, None);
        assert_eq!(dir, Some(Dir::Right));
    }

    #[test]
    fn ghosts_leave_the_house() {
        let mut game = calm();
        game.ghosts[1].release = 0.0;
        for _ in 0..60 {
            game.tick(&FrameInput::idle(), DT);
        }
        assert_eq!(game.ghosts[1].state, GhostState::Active);
    }

    #[test]
    fn mode_schedule_advances() {
        let mut game = calm();
        assert_eq!(game.mode(), Mode::Scatter);
        game.mode_timer = DT / 2.0;
        game.tick(&FrameInput::idle(), DT);
        assert_eq!(game.mode(), Mode::Chase);
    }
}
