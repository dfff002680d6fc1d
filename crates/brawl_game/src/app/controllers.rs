use brawl_engine::{
    seeded_rng, Character, CharacterId, Direction, DuelEligibility, DuelPair, InputAction,
    InputDevice, InputSnapshot, Intent, NpcBrain, SceneRng, SceneWorld,
};
use rand::Rng;
use thiserror::Error;

const WANDER_MIN_TICKS: u32 = 10;
const WANDER_MAX_TICKS: u32 = 40;
const WANDER_INTERACT_CHANCE: f64 = 0.5;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub(crate) enum ScriptError {
    #[error("input script step '{step}' has unknown action '{token}'")]
    UnknownAction { step: String, token: String },
    #[error("input script step '{step}' needs a positive repeat count")]
    InvalidRepeat { step: String },
}

/// Replays a fixed input sequence such as `right*30,up+left*5,interact`.
/// Each comma-separated step holds its actions for `*n` ticks (default 1).
/// Once the script runs out the device reports no input.
#[derive(Debug, Clone)]
pub(crate) struct ScriptedInput {
    steps: Vec<(InputSnapshot, u32)>,
    cursor: usize,
    used: u32,
}

impl ScriptedInput {
    pub(crate) fn idle() -> Self {
        Self {
            steps: Vec::new(),
            cursor: 0,
            used: 0,
        }
    }

    pub(crate) fn parse(script: &str) -> Result<Self, ScriptError> {
        let mut steps = Vec::new();
        for step in script.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            let (actions, repeat) = match step.split_once('*') {
                Some((actions, count)) => {
                    let repeat = count
                        .trim()
                        .parse::<u32>()
                        .ok()
                        .filter(|count| *count > 0)
                        .ok_or_else(|| ScriptError::InvalidRepeat {
                            step: step.to_string(),
                        })?;
                    (actions, repeat)
                }
                None => (step, 1),
            };

            let mut snapshot = InputSnapshot::empty();
            for token in actions.split('+').map(str::trim) {
                let action = match token {
                    "idle" => continue,
                    "up" => InputAction::MoveUp,
                    "down" => InputAction::MoveDown,
                    "left" => InputAction::MoveLeft,
                    "right" => InputAction::MoveRight,
                    "interact" => InputAction::Interact,
                    other => {
                        return Err(ScriptError::UnknownAction {
                            step: step.to_string(),
                            token: other.to_string(),
                        })
                    }
                };
                snapshot = snapshot.with_action_down(action, true);
            }
            steps.push((snapshot, repeat));
        }
        Ok(Self {
            steps,
            cursor: 0,
            used: 0,
        })
    }
}

impl InputDevice for ScriptedInput {
    fn poll(&mut self) -> InputSnapshot {
        while let Some(&(snapshot, repeat)) = self.steps.get(self.cursor) {
            if self.used < repeat {
                self.used += 1;
                return snapshot;
            }
            self.cursor += 1;
            self.used = 0;
        }
        InputSnapshot::empty()
    }

    fn label(&self) -> &str {
        "scripted"
    }
}

/// Walks in a random cardinal direction (or waits) for a random stretch of
/// ticks, and sometimes uses the interaction zone it is standing in.
#[derive(Debug)]
pub(crate) struct WanderBrain {
    rng: SceneRng,
    heading: (f32, f32),
    remaining: u32,
}

impl WanderBrain {
    pub(crate) fn new(seed: u64) -> Self {
        Self {
            rng: seeded_rng(seed),
            heading: (0.0, 0.0),
            remaining: 0,
        }
    }

    /// Per-character brain so npcs do not march in lockstep.
    pub(crate) fn for_character(scene_seed: u64, character: &Character) -> Self {
        Self::new(scene_seed ^ character.id().0.wrapping_mul(0x9E37_79B9_7F4A_7C15))
    }
}

impl NpcBrain for WanderBrain {
    fn decide(&mut self, world: &SceneWorld, character: CharacterId) -> Intent {
        if self.remaining == 0 {
            let in_zone = world
                .character(character)
                .and_then(|c| world.interaction_zone_at(c.position))
                .is_some();
            if in_zone && self.rng.gen_bool(WANDER_INTERACT_CHANCE) {
                return Intent::Interact;
            }
            self.remaining = self.rng.gen_range(WANDER_MIN_TICKS..=WANDER_MAX_TICKS);
            self.heading = match self.rng.gen_range(0..5) {
                0 => (0.0, 0.0),
                1 => (-1.0, 0.0),
                2 => (1.0, 0.0),
                3 => (0.0, -1.0),
                _ => (0.0, 1.0),
            };
        }
        self.remaining -= 1;
        match self.heading {
            (dx, dy) if dx == 0.0 && dy == 0.0 => Intent::Idle,
            (dx, dy) => Intent::Walk { dx, dy },
        }
    }
}

/// Two characters may duel when they stand on roughly the same row, within
/// range, each facing the other.
#[derive(Debug, Clone, Copy)]
pub(crate) struct FacingDuelRule {
    pub(crate) max_distance_px: f32,
    pub(crate) row_tolerance_px: f32,
}

impl Default for FacingDuelRule {
    fn default() -> Self {
        Self {
            max_distance_px: 400.0,
            row_tolerance_px: 12.0,
        }
    }
}

impl FacingDuelRule {
    fn facing_off(&self, a: &Character, b: &Character) -> bool {
        if (a.position.y - b.position.y).abs() > self.row_tolerance_px {
            return false;
        }
        let (left, right) = if a.position.x <= b.position.x {
            (a, b)
        } else {
            (b, a)
        };
        let gap = right.position.x - left.position.x;
        gap > 0.0
            && gap <= self.max_distance_px
            && left.direction == Direction::Right
            && right.direction == Direction::Left
    }
}

impl DuelEligibility for FacingDuelRule {
    fn possible_duels(&self, world: &SceneWorld) -> Vec<DuelPair> {
        let characters = world.characters().collect::<Vec<_>>();
        let mut pairs = Vec::new();
        for (index, a) in characters.iter().enumerate() {
            for b in &characters[index + 1..] {
                if self.facing_off(a, b) {
                    pairs.push(DuelPair::new(a.id(), b.id()));
                }
            }
        }
        pairs
    }
}

#[cfg(test)]
mod tests {
    use brawl_engine::{
        InteractionZone, Rect, SceneElement, SpriteSheetKey, Vec2, ZoneAction,
    };

    use super::*;

    fn gunslinger(id: u64, x: f32, y: f32, direction: Direction) -> SceneElement {
        SceneElement::Character(Character::new(
            CharacterId(id),
            Vec2::new(x, y),
            direction,
            SpriteSheetKey(0),
        ))
    }

    fn world(elements: Vec<SceneElement>) -> SceneWorld {
        SceneWorld::new(
            "saloon",
            elements,
            Vec::new(),
            vec![InteractionZone {
                zone: Rect::new(0.0, 0.0, 50.0, 50.0),
                action: ZoneAction("bet".to_string()),
                target_position: Vec2::new(25.0, 25.0),
                direction: Direction::Up,
            }],
        )
    }

    #[test]
    fn script_replays_steps_then_goes_idle() {
        let mut input = ScriptedInput::parse("right*2, up+left, interact").expect("script");
        let right = input.poll();
        assert!(right.is_down(InputAction::MoveRight));
        assert!(input.poll().is_down(InputAction::MoveRight));
        let diagonal = input.poll();
        assert!(diagonal.is_down(InputAction::MoveUp) && diagonal.is_down(InputAction::MoveLeft));
        assert!(input.poll().is_down(InputAction::Interact));
        assert_eq!(input.poll().axis(), (0.0, 0.0));
        assert!(!input.poll().is_down(InputAction::Interact));
    }

    #[test]
    fn script_idle_step_holds_nothing() {
        let mut input = ScriptedInput::parse("idle*2,left").expect("script");
        assert_eq!(input.poll().axis(), (0.0, 0.0));
        assert_eq!(input.poll().axis(), (0.0, 0.0));
        assert_eq!(input.poll().axis(), (-1.0, 0.0));
    }

    #[test]
    fn script_rejects_bad_steps() {
        assert!(matches!(
            ScriptedInput::parse("jump*2"),
            Err(ScriptError::UnknownAction { .. })
        ));
        assert!(matches!(
            ScriptedInput::parse("left*0"),
            Err(ScriptError::InvalidRepeat { .. })
        ));
        assert!(matches!(
            ScriptedInput::parse("left*x"),
            Err(ScriptError::InvalidRepeat { .. })
        ));
    }

    #[test]
    fn facing_pair_within_range_may_duel() {
        let world = world(vec![
            gunslinger(0, 100.0, 300.0, Direction::Right),
            gunslinger(1, 300.0, 305.0, Direction::Left),
            gunslinger(2, 600.0, 300.0, Direction::Left),
        ]);
        let pairs = FacingDuelRule::default().possible_duels(&world);
        assert_eq!(pairs, vec![DuelPair::new(CharacterId(0), CharacterId(1))]);
    }

    #[test]
    fn backs_turned_or_other_rows_never_duel() {
        let world = world(vec![
            gunslinger(0, 100.0, 300.0, Direction::Left),
            gunslinger(1, 300.0, 300.0, Direction::Right),
            gunslinger(2, 200.0, 500.0, Direction::Left),
        ]);
        assert!(FacingDuelRule::default().possible_duels(&world).is_empty());
    }

    #[test]
    fn wander_is_reproducible_per_seed() {
        let world = world(vec![gunslinger(0, 200.0, 200.0, Direction::Left)]);
        let run = |seed| {
            let mut brain = WanderBrain::new(seed);
            (0..200)
                .map(|_| brain.decide(&world, CharacterId(0)))
                .collect::<Vec<_>>()
        };
        assert_eq!(run(11), run(11));
    }

    #[test]
    fn wander_only_interacts_inside_zones() {
        let outside = world(vec![gunslinger(0, 200.0, 200.0, Direction::Left)]);
        let mut brain = WanderBrain::new(3);
        assert!((0..1000).all(|_| brain.decide(&outside, CharacterId(0)) != Intent::Interact));

        let inside = world(vec![gunslinger(0, 20.0, 20.0, Direction::Left)]);
        let mut brain = WanderBrain::new(3);
        assert!((0..1000).any(|_| brain.decide(&inside, CharacterId(0)) == Intent::Interact));
    }
}
