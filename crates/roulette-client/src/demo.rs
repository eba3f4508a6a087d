//! Scripted race that feeds the renderer.
//!
//! Physics is out of scope for this client: marbles fall down a fixed funnel
//! at per-marble speeds with a sideways sway, which is enough to exercise
//! every render pass (countdown, ranking, skills, winner).

use std::collections::HashMap;

use rand::Rng;
use rand::rngs::StdRng;
use roulette_core::assets::PortraitManifest;
use roulette_core::effects::{ParticleManager, VisualEffect};
use roulette_core::entity::{EntityShape, MapEntityState, ShapeGeometry};
use roulette_core::geometry::Vec2;
use roulette_core::marble::{MarbleId, MarbleSnapshot};
use roulette_core::stage::{StageDef, StageEntity};
use roulette_core::{Camera, ColorTheme, RenderError, RenderParameters};
use serde::Deserialize;

const COUNTDOWN_MS: f64 = 3000.0;
const GOAL_Y: f64 = 120.0;
const SPAWN_Y: f64 = 0.5;
const LANE_MIN_X: f64 = 3.0;
const LANE_MAX_X: f64 = 23.0;
/// World units per millisecond.
const BASE_SPEED: f64 = 0.006;
const SWAY: f64 = 1.5;
const SPINNER_RATE: f64 = 0.002;
const SKILL_INTERVAL_MS: f64 = 1500.0;
const SKILL_COOLDOWN_MS: f64 = 4000.0;
const IMPACT_RADIUS: f64 = 2.0;
const IMPACT_MS: f64 = 600.0;
const CAMERA_EASE_MS: f64 = 300.0;

/// Participants and portraits, loaded from `roster.json`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Roster {
    pub names: Vec<String>,
    #[serde(default)]
    pub winner_rank: usize,
    #[serde(default)]
    pub portraits: PortraitManifest,
}

impl Roster {
    pub fn from_json(json: &str) -> Result<Self, RenderError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn builtin() -> Result<Self, RenderError> {
        Self::from_json(include_str!("roster.json"))
    }
}

#[derive(Debug, Clone, Copy)]
struct Motion {
    lane_x: f64,
    speed: f64,
    sway_phase: f64,
    cooldown_ms: f64,
}

/// Race producer. Owns everything a [`RenderParameters`] borrows.
pub struct DemoRace {
    stage: StageDef,
    entities: Vec<MapEntityState>,
    marbles: Vec<MarbleSnapshot>,
    motion: HashMap<MarbleId, Motion>,
    winners: Vec<MarbleSnapshot>,
    effects: Vec<VisualEffect>,
    winner_rank: usize,
    countdown_ms: f64,
    elapsed_ms: f64,
    skill_timer_ms: f64,
    camera: Camera,
    rng: StdRng,
}

fn funnel_stage() -> StageDef {
    let wall = |points: &[(f64, f64)]| StageEntity {
        position: Vec2::ZERO,
        shape: EntityShape::new(ShapeGeometry::Polyline {
            points: points.iter().map(|&(x, y)| Vec2::new(x, y)).collect(),
        }),
    };
    let peg = |x: f64, y: f64| StageEntity {
        position: Vec2::new(x, y),
        shape: EntityShape::new(ShapeGeometry::Circle { radius: 0.6 }),
    };
    let spinner = |x: f64, y: f64| StageEntity {
        position: Vec2::new(x, y),
        shape: EntityShape::new(ShapeGeometry::Box {
            width: 2.5,
            height: 0.2,
            rotation: 0.0,
        }),
    };

    // Vertices at the start and goal heights bracket the line extents there.
    let left = [(1.0, -5.0), (1.0, 2.5), (4.0, 40.0), (1.0, 80.0), (5.0, 118.0), (5.0, 122.0)];
    let right = [
        (25.0, -5.0),
        (25.0, 2.5),
        (22.0, 40.0),
        (25.0, 80.0),
        (21.0, 118.0),
        (21.0, 122.0),
    ];
    let mut entities = vec![wall(&left), wall(&right)];
    for row in 0..6 {
        let y = 15.0 + f64::from(row) * 10.0;
        let offset = if row % 2 == 0 { 0.0 } else { 2.5 };
        for col in 0..4 {
            entities.push(peg(6.0 + offset + f64::from(col) * 5.0, y));
        }
    }
    entities.push(spinner(9.0, 85.0));
    entities.push(spinner(17.0, 95.0));

    StageDef {
        title: "Funnel".to_string(),
        goal_y: GOAL_Y,
        entities,
    }
}

impl DemoRace {
    pub fn new(roster: &Roster, mut rng: StdRng) -> Self {
        let stage = funnel_stage();
        let count = roster.names.len().max(1);
        let mut motion = HashMap::new();
        let marbles = roster
            .names
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let t = i as f64 / count as f64;
                let lane_x = LANE_MIN_X + t * (LANE_MAX_X - LANE_MIN_X);
                #[allow(clippy::cast_possible_truncation)]
                let id = i as MarbleId;
                motion.insert(
                    id,
                    Motion {
                        lane_x,
                        speed: BASE_SPEED * rng.random_range(0.8..1.2),
                        sway_phase: rng.random_range(0.0..std::f64::consts::TAU),
                        cooldown_ms: 0.0,
                    },
                );
                MarbleSnapshot::new(id, name.clone(), t * 360.0, Vec2::new(lane_x, SPAWN_Y))
            })
            .collect();

        let mut race = Self {
            entities: Vec::new(),
            stage,
            marbles,
            motion,
            winners: Vec::new(),
            effects: Vec::new(),
            winner_rank: roster.winner_rank,
            countdown_ms: COUNTDOWN_MS,
            elapsed_ms: 0.0,
            skill_timer_ms: 0.0,
            camera: Camera {
                x: 13.0,
                y: SPAWN_Y + 5.0,
                zoom: 1.0,
            },
            rng,
        };
        race.place_entities();
        tracing::info!(marbles = race.marbles.len(), winner_rank = race.winner_rank, "Race ready");
        race
    }

    fn place_entities(&mut self) {
        let spin = self.elapsed_ms * SPINNER_RATE;
        self.entities = self
            .stage
            .entities
            .iter()
            .map(|e| MapEntityState {
                x: e.position.x,
                y: e.position.y,
                angle: if matches!(e.shape.geometry, ShapeGeometry::Box { .. }) {
                    spin
                } else {
                    0.0
                },
                shape: e.shape.clone(),
            })
            .collect();
    }

    pub fn camera(&self) -> Camera {
        self.camera
    }

    /// Whole seconds left on the countdown, while it runs.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn countdown(&self) -> Option<u32> {
        (self.countdown_ms > 0.0).then(|| (self.countdown_ms / 1000.0).ceil() as u32)
    }

    /// The marble holding the winning rank, once decided.
    pub fn winner(&self) -> Option<&MarbleSnapshot> {
        self.winners.get(self.winner_rank)
    }

    /// Steps the race by `dt_ms`. Returns the marbles that crossed the goal
    /// during this step, in finish order.
    pub fn advance(&mut self, dt_ms: f64) -> Vec<MarbleSnapshot> {
        self.elapsed_ms += dt_ms;
        self.place_entities();
        for effect in &mut self.effects {
            effect.advance(dt_ms);
        }
        self.effects.retain(|e| !e.is_finished());

        if self.countdown_ms > 0.0 {
            self.countdown_ms = (self.countdown_ms - dt_ms).max(0.0);
            if self.countdown_ms <= 0.0 {
                tracing::info!("Race started");
            }
            return Vec::new();
        }

        let sway_t = self.elapsed_ms / 500.0;
        for marble in &mut self.marbles {
            let Some(m) = self.motion.get_mut(&marble.id) else {
                continue;
            };
            marble.y += m.speed * dt_ms;
            marble.x = (m.lane_x + (m.sway_phase + sway_t).sin() * SWAY).clamp(2.0, 24.0);
            marble.angle += m.speed * dt_ms / marble.radius;
            m.cooldown_ms = (m.cooldown_ms - dt_ms).max(0.0);
            marble.cooldown = (m.cooldown_ms > 0.0).then(|| m.cooldown_ms / SKILL_COOLDOWN_MS);
        }

        self.skill_timer_ms += dt_ms;
        if self.skill_timer_ms >= SKILL_INTERVAL_MS {
            self.skill_timer_ms -= SKILL_INTERVAL_MS;
            self.trigger_skill();
        }

        // Leader first.
        self.marbles.sort_by(|a, b| b.y.total_cmp(&a.y));
        let split = self.marbles.partition_point(|m| m.y >= self.stage.goal_y);
        let finished: Vec<_> = self.marbles.drain(..split).collect();
        for marble in &finished {
            tracing::debug!(name = %marble.name, rank = self.winners.len(), "Marble finished");
            self.winners.push(marble.clone());
        }
        if !finished.is_empty() && self.marbles.is_empty() {
            tracing::info!(winners = self.winners.len(), "Race finished");
        }

        self.follow(dt_ms);
        finished
    }

    fn trigger_skill(&mut self) {
        let ready: Vec<usize> = self
            .marbles
            .iter()
            .enumerate()
            .filter(|(_, m)| self.motion.get(&m.id).is_some_and(|mo| mo.cooldown_ms <= 0.0))
            .map(|(i, _)| i)
            .collect();
        if ready.is_empty() {
            return;
        }
        let pick = ready[self.rng.random_range(0..ready.len())];
        let marble = &self.marbles[pick];
        if let Some(m) = self.motion.get_mut(&marble.id) {
            m.cooldown_ms = SKILL_COOLDOWN_MS;
        }
        self.effects
            .push(VisualEffect::impact(marble.position(), IMPACT_RADIUS, IMPACT_MS));
    }

    /// Eases the camera toward the marble contending for the winning rank.
    fn follow(&mut self, dt_ms: f64) {
        let target = self
            .winner_rank
            .checked_sub(self.winners.len())
            .and_then(|i| self.marbles.get(i))
            .or_else(|| self.marbles.first())
            .or_else(|| self.winners.last())
            .map(MarbleSnapshot::position);
        if let Some(target) = target {
            let k = 1.0 - (-dt_ms / CAMERA_EASE_MS).exp();
            self.camera.x += (target.x - self.camera.x) * k;
            self.camera.y += (target.y - self.camera.y) * k;
        }
    }

    /// Borrows the current state as a render snapshot.
    pub fn params<'a>(
        &'a self,
        theme: &'a ColorTheme,
        size: (f64, f64),
        particles: &'a ParticleManager,
        fps: f64,
    ) -> RenderParameters<'a> {
        RenderParameters {
            camera: self.camera,
            entities: &self.entities,
            marbles: &self.marbles,
            winners: &self.winners,
            winner_rank: self.winner_rank,
            winner: self.winner(),
            effects: &self.effects,
            particles: Some(particles),
            countdown: self.countdown(),
            show_start_line: true,
            fps,
            ..RenderParameters::new(&self.stage, theme, size)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn race(names: &[&str], winner_rank: usize) -> DemoRace {
        let roster = Roster {
            names: names.iter().map(ToString::to_string).collect(),
            winner_rank,
            portraits: PortraitManifest::default(),
        };
        DemoRace::new(&roster, StdRng::seed_from_u64(3))
    }

    #[test]
    fn test_builtin_roster_parses() {
        let roster = Roster::builtin().unwrap();
        assert!(roster.names.len() >= 2);
        assert!(roster.portraits.entries.iter().all(|p| roster.names.contains(&p.name)));
    }

    #[test]
    fn test_countdown_holds_marbles() {
        let mut r = race(&["a", "b"], 0);
        assert_eq!(r.countdown(), Some(3));
        let before: Vec<_> = r.marbles.iter().map(|m| m.y).collect();
        r.advance(1500.0);
        assert_eq!(r.countdown(), Some(2));
        let after: Vec<_> = r.marbles.iter().map(|m| m.y).collect();
        assert_eq!(before, after);
        r.advance(1500.0);
        assert_eq!(r.countdown(), None);
    }

    #[test]
    fn test_every_marble_finishes_once() {
        let mut r = race(&["a", "b", "c", "d"], 1);
        let mut finished = Vec::new();
        for _ in 0..10_000 {
            finished.extend(r.advance(16.0).into_iter().map(|m| m.id));
            if r.marbles.is_empty() {
                break;
            }
        }
        assert!(r.marbles.is_empty());
        finished.sort_unstable();
        assert_eq!(finished, [0, 1, 2, 3]);
        assert_eq!(r.winners.len(), 4);
        assert_eq!(r.winner().map(|m| m.id), Some(r.winners[1].id));
    }

    #[test]
    fn test_params_borrow_race_state() {
        let r = race(&["a", "b", "c"], 0);
        let theme = ColorTheme::dark();
        let particles = ParticleManager::new();
        let params = r.params(&theme, (800.0, 600.0), &particles, 60.0);
        assert_eq!(params.total(), 3);
        assert_eq!(params.countdown, Some(3));
        assert_eq!(params.entities.len(), r.stage.entities.len());
        assert!(params.winner.is_none());
    }
}
