//! Missile Command: defend six cities from falling warheads

use glam::Vec2;

use super::{ArcadeGame, GameEvent, GameId, HudItem, Phase, start_pressed};
use crate::platform::{FrameInput, Key};
use crate::renderer::{Scene, colors, with_alpha};
use crate::sim::{GameRng, Rect, point_in_circle};

const WIDTH: f32 = 800.0;
const HEIGHT: f32 = 600.0;
const GROUND_Y: f32 = 560.0;
const CITY_XS: [f32; 6] = [150.0, 230.0, 310.0, 490.0, 570.0, 650.0];
const BASE_XS: [f32; 3] = [50.0, 400.0, 750.0];
const BASE_AMMO: u32 = 10;
const INTERCEPTOR_SPEED: f32 = 650.0;
const EXPLOSION_RADIUS: f32 = 48.0;
/// Seconds to grow to full radius; shrinking takes as long
const EXPLOSION_GROW: f32 = 0.45;
const CROSSHAIR_SPEED: f32 = 420.0;
/// Interceptors cannot be aimed below this line
const MIN_TARGET_Y: f32 = GROUND_Y - 40.0;
const MISSILE_POINTS: u64 = 25;
const CITY_BONUS: u64 = 100;
const AMMO_BONUS: u64 = 5;
/// Wave-clear pause before the next wave starts
const INTERMISSION: f32 = 2.0;
/// Warheads may split above this line
const SPLIT_CEILING: f32 = 320.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Target {
    City(usize),
    Base(usize),
}

impl Target {
    fn position(self) -> Vec2 {
        match self {
            Target::City(i) => Vec2::new(CITY_XS[i], GROUND_Y),
            Target::Base(i) => Vec2::new(BASE_XS[i], GROUND_Y - 10.0),
        }
    }
}

#[derive(Debug, Clone)]
struct Warhead {
    origin: Vec2,
    pos: Vec2,
    target: Target,
    speed: f32,
    splits: bool,
}

#[derive(Debug, Clone)]
struct Interceptor {
    origin: Vec2,
    pos: Vec2,
    target: Vec2,
}

#[derive(Debug, Clone)]
struct Explosion {
    pos: Vec2,
    age: f32,
    /// Player blasts score kills; ground impacts do not
    friendly: bool,
}

impl Explosion {
    fn radius(&self) -> f32 {
        let t = self.age / EXPLOSION_GROW;
        if t <= 1.0 {
            EXPLOSION_RADIUS * t
        } else {
            EXPLOSION_RADIUS * (2.0 - t).max(0.0)
        }
    }

    fn finished(&self) -> bool {
        self.age >= EXPLOSION_GROW * 2.0
    }
}

#[derive(Debug, Clone, Copy)]
struct Base {
    ammo: u32,
    alive: bool,
}

pub struct MissileCommand {
    phase: Phase,
    rng: GameRng,
    cities: [bool; 6],
    bases: [Base; 3],
    warheads: Vec<Warhead>,
    interceptors: Vec<Interceptor>,
    explosions: Vec<Explosion>,
    crosshair: Vec2,
    wave: u32,
    /// Warheads still to launch this wave
    to_launch: u32,
    launch_timer: f32,
    intermission: Option<f32>,
    score: u64,
    events: Vec<GameEvent>,
}

impl MissileCommand {
    pub fn new(seed: u64) -> Self {
        let mut game = Self {
            phase: Phase::Ready,
            rng: GameRng::new(seed),
            cities: [true; 6],
            bases: [Base {
                ammo: BASE_AMMO,
                alive: true,
            }; 3],
            warheads: Vec::new(),
            interceptors: Vec::new(),
            explosions: Vec::new(),
            crosshair: Vec2::new(WIDTH / 2.0, HEIGHT / 2.0),
            wave: 0,
            to_launch: 0,
            launch_timer: 0.0,
            intermission: None,
            score: 0,
            events: Vec::new(),
        };
        game.start_wave();
        game
    }

    pub fn wave(&self) -> u32 {
        self.wave
    }

    pub fn cities_left(&self) -> usize {
        self.cities.iter().filter(|c| **c).count()
    }

    pub fn ammo(&self) -> u32 {
        self.bases.iter().filter(|b| b.alive).map(|b| b.ammo).sum()
    }

    fn start_wave(&mut self) {
        self.wave += 1;
        self.to_launch = 8 + 2 * self.wave;
        self.launch_timer = 1.0;
        self.bases = [Base {
            ammo: BASE_AMMO,
            alive: true,
        }; 3];
    }

    fn warhead_speed(&self) -> f32 {
        (35.0 + 9.0 * self.wave as f32).min(160.0)
    }

    fn pick_target(&mut self) -> Target {
        let mut targets: Vec<Target> = (0..CITY_XS.len())
            .filter(|i| self.cities[*i])
            .map(Target::City)
            .collect();
        targets.extend((0..BASE_XS.len()).map(Target::Base));
        *self.rng.pick(&targets).unwrap_or(&Target::Base(1))
    }

    fn launch_warhead(&mut self, origin: Vec2) {
        let target = self.pick_target();
        let splits = self.wave >= 2 && origin.y < SPLIT_CEILING - 100.0 && self.rng.chance(0.2);
        self.warheads.push(Warhead {
            origin,
            pos: origin,
            target,
            speed: self.warhead_speed(),
            splits,
        });
    }

    /// Nearest living base that still has ammo
    fn firing_base(&self, target: Vec2) -> Option<usize> {
        (0..BASE_XS.len())
            .filter(|i| self.bases[*i].alive && self.bases[*i].ammo > 0)
            .min_by(|a, b| {
                let da = (BASE_XS[*a] - target.x).abs();
                let db = (BASE_XS[*b] - target.x).abs();
                da.total_cmp(&db)
            })
    }

    fn fire(&mut self, target: Vec2) {
        let target = Vec2::new(target.x.clamp(0.0, WIDTH), target.y.min(MIN_TARGET_Y));
        let Some(base) = self.firing_base(target) else {
            return;
        };
        self.bases[base].ammo -= 1;
        let origin = Vec2::new(BASE_XS[base], GROUND_Y - 24.0);
        self.interceptors.push(Interceptor {
            origin,
            pos: origin,
            target,
        });
        self.events.push(GameEvent::Blip);
    }

    fn detonate(&mut self, pos: Vec2, friendly: bool) {
        self.explosions.push(Explosion {
            pos,
            age: 0.0,
            friendly,
        });
        self.events.push(GameEvent::Explosion);
    }

    fn strike(&mut self, target: Target) {
        match target {
            Target::City(i) if self.cities[i] => {
                self.cities[i] = false;
                self.events.push(GameEvent::Hit);
            }
            Target::Base(i) if self.bases[i].alive => {
                self.bases[i].alive = false;
                self.events.push(GameEvent::Hit);
            }
            _ => {}
        }
    }

    fn update_warheads(&mut self, dt: f32) {
        let mut impacts = Vec::new();
        let mut splits = Vec::new();
        for w in &mut self.warheads {
            let to_target = w.target.position() - w.pos;
            let step = w.speed * dt;
            if to_target.length() <= step {
                impacts.push(w.target);
                w.pos = w.target.position();
                continue;
            }
            w.pos += to_target.normalize() * step;
            if w.splits && w.pos.y >= SPLIT_CEILING {
                w.splits = false;
                splits.push(w.pos);
            }
        }
        self.warheads
            .retain(|w| w.pos.distance(w.target.position()) > 0.5);

        for target in impacts {
            self.strike(target);
            self.detonate(target.position(), false);
        }
        for pos in splits {
            let extra = self.rng.range_i32(1, 2);
            for _ in 0..extra {
                self.launch_warhead(pos);
            }
        }
    }

    fn update_interceptors(&mut self, dt: f32) {
        let mut arrived = Vec::new();
        self.interceptors.retain_mut(|i| {
            let to_target = i.target - i.pos;
            let step = INTERCEPTOR_SPEED * dt;
            if to_target.length() <= step {
                arrived.push(i.target);
                false
            } else {
                i.pos += to_target.normalize() * step;
                true
            }
        });
        for pos in arrived {
            self.detonate(pos, true);
        }
    }

    fn update_explosions(&mut self, dt: f32) {
        for e in &mut self.explosions {
            e.age += dt;
        }
        self.explosions.retain(|e| !e.finished());

        // Any blast destroys warheads inside it; kills chain into new blasts
        let blasts: Vec<(Vec2, f32, bool)> = self
            .explosions
            .iter()
            .map(|e| (e.pos, e.radius(), e.friendly))
            .collect();
        let mut killed = Vec::new();
        self.warheads.retain(|w| {
            let hit = blasts
                .iter()
                .find(|(pos, r, _)| point_in_circle(w.pos, *pos, *r));
            match hit {
                Some((_, _, friendly)) => {
                    killed.push((w.pos, *friendly));
                    false
                }
                None => true,
            }
        });
        for (pos, friendly) in killed {
            if friendly {
                self.score += MISSILE_POINTS;
                self.events.push(GameEvent::Score);
            }
            self.detonate(pos, friendly);
        }
    }

    fn wave_over(&self) -> bool {
        self.to_launch == 0 && self.warheads.is_empty() && self.explosions.is_empty()
    }

    fn award_wave_bonus(&mut self) {
        let bonus = self.cities_left() as u64 * CITY_BONUS + u64::from(self.ammo()) * AMMO_BONUS;
        self.score += bonus * u64::from(self.wave.div_ceil(2).min(6));
        self.events.push(GameEvent::LevelUp);
    }
}

impl ArcadeGame for MissileCommand {
    fn id(&self) -> GameId {
        GameId::MissileCommand
    }

    fn size(&self) -> Vec2 {
        Vec2::new(WIDTH, HEIGHT)
    }

    fn phase(&self) -> Phase {
        self.phase
    }

    fn score(&self) -> u64 {
        self.score
    }

    fn hud(&self) -> Vec<HudItem> {
        vec![
            HudItem::new("Wave", self.wave),
            HudItem::new("Cities", self.cities_left()),
            HudItem::new("Ammo", self.ammo()),
        ]
    }

    fn banner(&self) -> Option<String> {
        match self.phase {
            Phase::Ready => Some("Click to fire. Protect the cities!".to_string()),
            Phase::GameOver => Some(format!("The end. Wave {}. R to retry", self.wave)),
            Phase::Playing if self.intermission.is_some() => {
                Some(format!("Wave {} cleared", self.wave))
            }
            _ => None,
        }
    }

    fn tick(&mut self, input: &FrameInput, dt: f32) {
        match self.phase {
            Phase::Ready if start_pressed(input) => {
                self.phase = Phase::Playing;
                return;
            }
            Phase::Ready => return,
            Phase::Playing => {}
            Phase::Won | Phase::GameOver => return,
        }

        if let Some(pos) = input.pointer {
            self.crosshair = pos;
        }
        let axis = Vec2::new(input.axis_x(), input.axis_y());
        self.crosshair = (self.crosshair + axis * CROSSHAIR_SPEED * dt)
            .clamp(Vec2::ZERO, Vec2::new(WIDTH, MIN_TARGET_Y));

        if let Some(timer) = self.intermission {
            if timer - dt > 0.0 {
                self.intermission = Some(timer - dt);
                return;
            }
            self.intermission = None;
            self.start_wave();
        }

        if let Some(pos) = input.primary_click() {
            self.fire(pos);
        } else if input.pressed(Key::Action) {
            self.fire(self.crosshair);
        }

        self.launch_timer -= dt;
        if self.to_launch > 0 && self.launch_timer <= 0.0 {
            self.to_launch -= 1;
            let origin = Vec2::new(self.rng.range_f32(20.0, WIDTH - 20.0), 0.0);
            self.launch_warhead(origin);
            self.launch_timer = self.rng.range_f32(0.6, 1.8) / (1.0 + self.wave as f32 * 0.1);
        }

        self.update_interceptors(dt);
        self.update_warheads(dt);
        self.update_explosions(dt);

        if self.cities_left() == 0 {
            self.phase = Phase::GameOver;
            self.events.push(GameEvent::GameOver);
        } else if self.wave_over() {
            self.award_wave_bonus();
            self.intermission = Some(INTERMISSION);
        }
    }

    fn draw(&self, scene: &mut Scene) {
        scene.rect(Rect::new(0.0, GROUND_Y, WIDTH, HEIGHT - GROUND_Y), colors::BROWN);

        for (i, alive) in self.cities.iter().enumerate() {
            let x = CITY_XS[i];
            if *alive {
                scene.rect(Rect::new(x - 24.0, GROUND_Y - 14.0, 48.0, 14.0), colors::TEAL);
                scene.rect(Rect::new(x - 14.0, GROUND_Y - 26.0, 10.0, 12.0), colors::TEAL);
                scene.rect(Rect::new(x + 4.0, GROUND_Y - 22.0, 10.0, 8.0), colors::TEAL);
            } else {
                scene.rect(Rect::new(x - 24.0, GROUND_Y - 4.0, 48.0, 4.0), colors::DIM);
            }
        }
        for (i, base) in self.bases.iter().enumerate() {
            let x = BASE_XS[i];
            let color = if base.alive { colors::YELLOW } else { colors::DIM };
            scene.triangle(
                Vec2::new(x - 34.0, GROUND_Y),
                Vec2::new(x, GROUND_Y - 28.0),
                Vec2::new(x + 34.0, GROUND_Y),
                color,
            );
            if base.alive {
                // One pip per remaining interceptor
                for n in 0..base.ammo {
                    let px = x - 22.0 + (n % 5) as f32 * 11.0;
                    let py = GROUND_Y + 10.0 + (n / 5) as f32 * 10.0;
                    scene.rect(Rect::new(px, py, 6.0, 6.0), colors::BLUE);
                }
            }
        }

        for w in &self.warheads {
            scene.line(w.origin, w.pos, 2.0, with_alpha(colors::RED, 0.7));
            scene.rect(Rect::from_center(w.pos, Vec2::splat(4.0)), colors::WHITE);
        }
        for i in &self.interceptors {
            scene.line(i.origin, i.pos, 2.0, with_alpha(colors::BLUE, 0.7));
            let x = i.target;
            scene.line(x + Vec2::new(-5.0, -5.0), x + Vec2::new(5.0, 5.0), 2.0, colors::BLUE);
            scene.line(x + Vec2::new(-5.0, 5.0), x + Vec2::new(5.0, -5.0), 2.0, colors::BLUE);
        }
        for e in &self.explosions {
            let color = if e.friendly { colors::WHITE } else { colors::ORANGE };
            scene.circle(e.pos, e.radius(), with_alpha(color, 0.85));
        }

        let c = self.crosshair;
        scene.line(c + Vec2::new(-10.0, 0.0), c + Vec2::new(10.0, 0.0), 2.0, colors::LIME);
        scene.line(c + Vec2::new(0.0, -10.0), c + Vec2::new(0.0, 10.0), 2.0, colors::LIME);
    }

    fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::PointerButton;

    const DT: f32 = 1.0 / 60.0;

    fn quiet() -> MissileCommand {
        let mut game = MissileCommand::new(17);
        game.phase = Phase::Playing;
        game.to_launch = 0;
        game
    }

    fn warhead_at(pos: Vec2, target: Target) -> Warhead {
        Warhead {
            origin: Vec2::new(pos.x, 0.0),
            pos,
            target,
            speed: 50.0,
            splits: false,
        }
    }

    #[test]
    fn click_fires_from_nearest_base() {
        let mut game = quiet();
        game.warheads.push(warhead_at(Vec2::new(400.0, 10.0), Target::City(0)));
        game.tick(
            &FrameInput::idle().with_click(Vec2::new(720.0, 200.0), PointerButton::Primary),
            DT,
        );
        assert_eq!(game.bases[2].ammo, BASE_AMMO - 1);
        assert_eq!(game.interceptors.len(), 1);
    }

    #[test]
    fn empty_base_hands_off_to_next() {
        let mut game = quiet();
        game.bases[0].ammo = 0;
        game.fire(Vec2::new(10.0, 200.0));
        assert_eq!(game.bases[1].ammo, BASE_AMMO - 1);
    }

    #[test]
    fn blast_destroys_warhead_and_scores() {
        let mut game = quiet();
        let pos = Vec2::new(300.0, 200.0);
        game.warheads.push(warhead_at(pos, Target::City(2)));
        game.explosions.push(Explosion {
            pos,
            age: EXPLOSION_GROW,
            friendly: true,
        });
        game.tick(&FrameInput::idle(), DT);
        assert!(game.warheads.is_empty());
        assert_eq!(game.score(), MISSILE_POINTS);
    }

    #[test]
    fn impact_destroys_city() {
        let mut game = quiet();
        let target = Target::City(3);
        game.warheads.push(warhead_at(target.position() - Vec2::new(0.0, 0.5), target));
        game.tick(&FrameInput::idle(), DT);
        assert!(!game.cities[3]);
        assert_eq!(game.cities_left(), 5);
    }

    #[test]
    fn splitting_warhead_spawns_more() {
        let mut game = quiet();
        let mut w = warhead_at(Vec2::new(400.0, SPLIT_CEILING - 0.1), Target::City(1));
        w.splits = true;
        game.warheads.push(w);
        game.update_warheads(DT);
        assert!(game.warheads.len() >= 2);
    }

    #[test]
    fn surviving_wave_pays_bonus_and_restocks() {
        let mut game = quiet();
        game.bases[0].ammo = 4;
        game.tick(&FrameInput::idle(), DT);
        let bonus = 6 * CITY_BONUS + 24 * AMMO_BONUS;
        assert_eq!(game.score(), bonus);
        for _ in 0..(INTERMISSION / DT) as usize + 2 {
            game.tick(&FrameInput::idle(), DT);
        }
        assert_eq!(game.wave(), 2);
        assert_eq!(game.ammo(), 3 * BASE_AMMO);
    }

    #[test]
    fn losing_every_city_ends() {
        let mut game = quiet();
        game.cities = [false, false, false, false, false, true];
        let target = Target::City(5);
        game.warheads.push(warhead_at(target.position() - Vec2::new(0.0, 0.5), target));
        game.tick(&FrameInput::idle(), DT);
        assert_eq!(game.phase(), Phase::GameOver);
    }

    #[test]
    fn explosion_grows_then_fades() {
        let mut e = Explosion {
            pos: Vec2::ZERO,
            age: 0.0,
            friendly: true,
        };
        assert_eq!(e.radius(), 0.0);
        e.age = EXPLOSION_GROW;
        assert!((e.radius() - EXPLOSION_RADIUS).abs() < 1e-3);
        e.age = EXPLOSION_GROW * 2.0;
        assert!(e.finished());
    }
}
