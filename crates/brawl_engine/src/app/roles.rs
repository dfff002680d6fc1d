use std::fmt;

use tracing::{debug, warn};

use crate::geometry::{Rect, Vec2};

use super::input::{InputAction, InputDevice};
use super::scene::{CharacterId, Direction, SceneWorld};
use super::zone::ZoneAction;

pub const WALK_SPEED_PX_PER_TICK: f32 = 3.0;
/// Feet box used for static collision, centered on the character position.
pub const CHARACTER_FOOTPRINT_PX: Vec2 = Vec2::new(24.0, 10.0);

/// What a controller asks its character to do during one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Intent {
    Idle,
    /// Step direction; normalized before the walk speed is applied.
    Walk { dx: f32, dy: f32 },
    Interact,
}

/// Anything the scene can step forward once per tick.
pub trait Advanceable {
    fn character(&self) -> CharacterId;
    fn advance_tick(&mut self, world: &mut SceneWorld);
}

/// Autonomous decision making for an npc.
pub trait NpcBrain {
    fn decide(&mut self, world: &SceneWorld, character: CharacterId) -> Intent;
}

/// Stands still forever.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdleBrain;

impl NpcBrain for IdleBrain {
    fn decide(&mut self, _world: &SceneWorld, _character: CharacterId) -> Intent {
        Intent::Idle
    }
}

/// Moves `character` according to `intent`, refusing any step whose
/// footprint would overlap static geometry. Returns the action of the zone
/// the character just used, if any.
pub fn apply_intent(
    world: &mut SceneWorld,
    character: CharacterId,
    intent: Intent,
) -> Option<ZoneAction> {
    let Some(current) = world.character(character).map(|c| c.position) else {
        warn!(character = character.0, "intent_for_missing_character");
        return None;
    };

    match intent {
        Intent::Idle => None,
        Intent::Walk { dx, dy } => {
            let length = (dx * dx + dy * dy).sqrt();
            if !length.is_finite() || length <= f32::EPSILON {
                return None;
            }
            let step = WALK_SPEED_PX_PER_TICK / length;
            let candidate = current.offset(dx * step, dy * step);
            let blocked =
                world.collides_with_static(&Rect::centered_on(candidate, CHARACTER_FOOTPRINT_PX));
            let entity = world.character_mut(character)?;
            if dx < 0.0 {
                entity.direction = Direction::Left;
            } else if dx > 0.0 {
                entity.direction = Direction::Right;
            }
            if !blocked {
                entity.position = candidate;
            }
            None
        }
        Intent::Interact => {
            let zone = world.interaction_zone_at(current)?.clone();
            let entity = world.character_mut(character)?;
            entity.position = zone.target_position;
            entity.direction = zone.direction;
            debug!(
                character = character.0,
                action = zone.action.as_str(),
                facing = zone.direction.as_token(),
                "zone_interaction"
            );
            Some(zone.action)
        }
    }
}

/// Human-controlled role wrapper.
pub struct Player {
    character: CharacterId,
    device: Box<dyn InputDevice>,
    last_interaction: Option<ZoneAction>,
}

impl Player {
    pub fn new(character: CharacterId, device: Box<dyn InputDevice>) -> Self {
        Self {
            character,
            device,
            last_interaction: None,
        }
    }

    /// Zone action triggered during the most recent tick.
    pub fn last_interaction(&self) -> Option<&ZoneAction> {
        self.last_interaction.as_ref()
    }

    fn read_intent(&mut self) -> Intent {
        let snapshot = self.device.poll();
        if snapshot.is_down(InputAction::Interact) {
            return Intent::Interact;
        }
        let (dx, dy) = snapshot.axis();
        if dx == 0.0 && dy == 0.0 {
            Intent::Idle
        } else {
            Intent::Walk { dx, dy }
        }
    }
}

impl fmt::Debug for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Player")
            .field("character", &self.character)
            .field("device", &self.device.label())
            .finish()
    }
}

impl Advanceable for Player {
    fn character(&self) -> CharacterId {
        self.character
    }

    fn advance_tick(&mut self, world: &mut SceneWorld) {
        let intent = self.read_intent();
        self.last_interaction = apply_intent(world, self.character, intent);
    }
}

/// Autonomous role wrapper.
pub struct Npc {
    character: CharacterId,
    brain: Box<dyn NpcBrain>,
    last_interaction: Option<ZoneAction>,
}

impl Npc {
    pub fn new(character: CharacterId, brain: Box<dyn NpcBrain>) -> Self {
        Self {
            character,
            brain,
            last_interaction: None,
        }
    }

    pub fn last_interaction(&self) -> Option<&ZoneAction> {
        self.last_interaction.as_ref()
    }
}

impl fmt::Debug for Npc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Npc")
            .field("character", &self.character)
            .finish_non_exhaustive()
    }
}

impl Advanceable for Npc {
    fn character(&self) -> CharacterId {
        self.character
    }

    fn advance_tick(&mut self, world: &mut SceneWorld) {
        let intent = self.brain.decide(world, self.character);
        self.last_interaction = apply_intent(world, self.character, intent);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::input::InputSnapshot;
    use crate::app::scene::{Character, SceneElement};
    use crate::app::zone::InteractionZone;
    use crate::content::SpriteSheetKey;

    const GUNNER: CharacterId = CharacterId(7);

    fn world_with(position: Vec2, no_go_zones: Vec<Rect>) -> SceneWorld {
        SceneWorld::new(
            "saloon",
            vec![SceneElement::Character(Character::new(
                GUNNER,
                position,
                Direction::Right,
                SpriteSheetKey(0),
            ))],
            no_go_zones,
            vec![InteractionZone {
                zone: Rect::new(200.0, 200.0, 40.0, 40.0),
                action: ZoneAction("piano".to_string()),
                target_position: Vec2::new(220.0, 235.0),
                direction: Direction::Up,
            }],
        )
    }

    fn gunner(world: &SceneWorld) -> &Character {
        world.character(GUNNER).expect("gunner")
    }

    #[test]
    fn walk_moves_by_speed_and_faces_left() {
        let mut world = world_with(Vec2::new(100.0, 100.0), Vec::new());
        apply_intent(&mut world, GUNNER, Intent::Walk { dx: -1.0, dy: 0.0 });
        assert_eq!(
            gunner(&world).position,
            Vec2::new(100.0 - WALK_SPEED_PX_PER_TICK, 100.0)
        );
        assert_eq!(gunner(&world).direction, Direction::Left);
    }

    #[test]
    fn vertical_walk_keeps_facing() {
        let mut world = world_with(Vec2::new(100.0, 100.0), Vec::new());
        apply_intent(&mut world, GUNNER, Intent::Walk { dx: 0.0, dy: 2.0 });
        assert_eq!(
            gunner(&world).position,
            Vec2::new(100.0, 100.0 + WALK_SPEED_PX_PER_TICK)
        );
        assert_eq!(gunner(&world).direction, Direction::Right);
    }

    #[test]
    fn walk_into_no_go_zone_is_refused_but_turns() {
        let wall = Rect::new(0.0, 0.0, 88.0, 200.0);
        let mut world = world_with(Vec2::new(100.0, 100.0), vec![wall]);
        apply_intent(&mut world, GUNNER, Intent::Walk { dx: -1.0, dy: 0.0 });
        assert_eq!(gunner(&world).position, Vec2::new(100.0, 100.0));
        assert_eq!(gunner(&world).direction, Direction::Left);
    }

    #[test]
    fn interact_snaps_to_zone_target() {
        let mut world = world_with(Vec2::new(205.0, 210.0), Vec::new());
        let action = apply_intent(&mut world, GUNNER, Intent::Interact);
        assert_eq!(action, Some(ZoneAction("piano".to_string())));
        assert_eq!(gunner(&world).position, Vec2::new(220.0, 235.0));
        assert_eq!(gunner(&world).direction, Direction::Up);
    }

    #[test]
    fn interact_outside_zones_does_nothing() {
        let mut world = world_with(Vec2::new(10.0, 10.0), Vec::new());
        assert_eq!(apply_intent(&mut world, GUNNER, Intent::Interact), None);
        assert_eq!(gunner(&world).position, Vec2::new(10.0, 10.0));
    }

    #[test]
    fn missing_character_is_ignored() {
        let mut world = world_with(Vec2::new(10.0, 10.0), Vec::new());
        let result = apply_intent(&mut world, CharacterId(99), Intent::Interact);
        assert_eq!(result, None);
    }

    struct Script(Vec<InputSnapshot>);

    impl InputDevice for Script {
        fn poll(&mut self) -> InputSnapshot {
            if self.0.is_empty() {
                InputSnapshot::empty()
            } else {
                self.0.remove(0)
            }
        }
    }

    #[test]
    fn player_maps_input_to_intents() {
        let mut world = world_with(Vec2::new(195.0, 210.0), Vec::new());
        let mut player = Player::new(
            GUNNER,
            Box::new(Script(vec![
                InputSnapshot::empty().with_action_down(InputAction::MoveRight, true),
                InputSnapshot::empty().with_action_down(InputAction::MoveRight, true),
                InputSnapshot::empty().with_action_down(InputAction::Interact, true),
            ])),
        );

        player.advance_tick(&mut world);
        player.advance_tick(&mut world);
        assert_eq!(gunner(&world).position.x, 195.0 + 2.0 * WALK_SPEED_PX_PER_TICK);
        assert!(player.last_interaction().is_none());

        player.advance_tick(&mut world);
        assert_eq!(player.last_interaction().map(ZoneAction::as_str), Some("piano"));

        player.advance_tick(&mut world);
        assert!(player.last_interaction().is_none(), "cleared on idle tick");
    }

    #[test]
    fn idle_brain_never_moves() {
        let mut world = world_with(Vec2::new(50.0, 50.0), Vec::new());
        let mut npc = Npc::new(GUNNER, Box::new(IdleBrain));
        npc.advance_tick(&mut world);
        assert_eq!(gunner(&world).position, Vec2::new(50.0, 50.0));
        assert_eq!(npc.character(), GUNNER);
    }
}
