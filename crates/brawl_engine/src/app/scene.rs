use std::fmt;
use std::str::FromStr;

use thiserror::Error;
use tracing::{debug, info, trace};

use crate::content::{ImageKey, SpriteSheetKey};
use crate::geometry::{boxes_overlap, Rect, Vec2};

use super::duel::{DuelEligibility, DuelPair};
use super::input::InputDevice;
use super::roles::{Advanceable, Npc, NpcBrain, Player};
use super::zone::InteractionZone;

/// Identity of a character for the lifetime of its scene. Role bindings
/// compare ids, never positions or facing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CharacterId(pub u64);

impl fmt::Display for CharacterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "character#{}", self.0)
    }
}

#[derive(Debug, Default)]
pub(crate) struct CharacterIdAllocator {
    next: u64,
}

impl CharacterIdAllocator {
    pub(crate) fn allocate(&mut self) -> CharacterId {
        let id = CharacterId(self.next);
        self.next = self.next.saturating_add(1);
        id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

impl Direction {
    pub fn as_token(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
            Self::Up => "up",
            Self::Down => "down",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown direction '{0}'; expected left, right, up or down")]
pub struct UnknownDirection(pub String);

impl FromStr for Direction {
    type Err = UnknownDirection;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "left" => Ok(Self::Left),
            "right" => Ok(Self::Right),
            "up" => Ok(Self::Up),
            "down" => Ok(Self::Down),
            other => Err(UnknownDirection(other.to_string())),
        }
    }
}

/// Static scenery. Only props with a `collision_box` block movement.
#[derive(Debug, Clone, PartialEq)]
pub struct Prop {
    pub image: ImageKey,
    pub position: Vec2,
    pub center: Vec2,
    pub collision_box: Option<Rect>,
}

/// A placed character. Position and facing are mutable through the world;
/// the id is fixed at placement so role bindings cannot be rewired.
#[derive(Debug, Clone, PartialEq)]
pub struct Character {
    id: CharacterId,
    pub position: Vec2,
    pub direction: Direction,
    pub sprite_sheet: SpriteSheetKey,
}

impl Character {
    pub fn new(
        id: CharacterId,
        position: Vec2,
        direction: Direction,
        sprite_sheet: SpriteSheetKey,
    ) -> Self {
        Self {
            id,
            position,
            direction,
            sprite_sheet,
        }
    }

    pub fn id(&self) -> CharacterId {
        self.id
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SceneElement {
    Prop(Prop),
    Character(Character),
}

impl SceneElement {
    pub fn as_prop(&self) -> Option<&Prop> {
        match self {
            Self::Prop(prop) => Some(prop),
            Self::Character(_) => None,
        }
    }

    pub fn as_character(&self) -> Option<&Character> {
        match self {
            Self::Character(character) => Some(character),
            Self::Prop(_) => None,
        }
    }

    pub fn as_character_mut(&mut self) -> Option<&mut Character> {
        match self {
            Self::Character(character) => Some(character),
            Self::Prop(_) => None,
        }
    }
}

/// The placed content of a scene. Role wrappers and the duel query only ever
/// see this part, so they can move characters without reaching the rosters.
#[derive(Debug, Clone, Default)]
pub struct SceneWorld {
    name: String,
    elements: Vec<SceneElement>,
    no_go_zones: Vec<Rect>,
    interaction_zones: Vec<InteractionZone>,
}

impl SceneWorld {
    pub fn new(
        name: impl Into<String>,
        elements: Vec<SceneElement>,
        no_go_zones: Vec<Rect>,
        interaction_zones: Vec<InteractionZone>,
    ) -> Self {
        Self {
            name: name.into(),
            elements,
            no_go_zones,
            interaction_zones,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn elements(&self) -> &[SceneElement] {
        &self.elements
    }

    pub fn no_go_zones(&self) -> &[Rect] {
        &self.no_go_zones
    }

    pub fn interaction_zones(&self) -> &[InteractionZone] {
        &self.interaction_zones
    }

    pub fn props(&self) -> impl Iterator<Item = &Prop> + '_ {
        self.elements.iter().filter_map(SceneElement::as_prop)
    }

    /// Characters in element order. Calling it again restarts from the first.
    pub fn characters(&self) -> impl Iterator<Item = &Character> + '_ {
        self.elements.iter().filter_map(SceneElement::as_character)
    }

    pub fn character_count(&self) -> usize {
        self.characters().count()
    }

    pub fn character(&self, id: CharacterId) -> Option<&Character> {
        self.characters().find(|character| character.id() == id)
    }

    pub fn character_mut(&mut self, id: CharacterId) -> Option<&mut Character> {
        self.elements
            .iter_mut()
            .filter_map(SceneElement::as_character_mut)
            .find(|character| character.id() == id)
    }

    pub fn collides_with_static(&self, probe: &Rect) -> bool {
        let hits_prop = self
            .props()
            .filter_map(|prop| prop.collision_box.as_ref())
            .any(|collision_box| boxes_overlap(probe, collision_box));
        hits_prop || self.no_go_zones.iter().any(|zone| boxes_overlap(zone, probe))
    }

    /// First zone, in descriptor order, whose rectangle contains `position`.
    pub fn interaction_zone_at(&self, position: Vec2) -> Option<&InteractionZone> {
        self.interaction_zones
            .iter()
            .find(|zone| zone.contains(position))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Player,
    Npc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SceneError {
    #[error("character index {index} is out of range; scene has {count} characters")]
    IndexOutOfRange { index: usize, count: usize },
    #[error("character {index} ({character}) already assigned to player")]
    AlreadyAssigned { index: usize, character: CharacterId },
    #[error("character {index} ({character}) is already controlled by an npc")]
    BoundToNpc { index: usize, character: CharacterId },
}

/// A loaded level: its world plus who controls which character.
///
/// Setup order is `assign_player` for every human, then `create_npcs` once.
/// After that the driver calls `advance_tick` once per simulation step.
pub struct Scene {
    world: SceneWorld,
    players: Vec<Player>,
    npcs: Vec<Npc>,
    possible_duels: Vec<DuelPair>,
    tick: u64,
}

impl fmt::Debug for Scene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scene")
            .field("name", &self.world.name)
            .field("elements", &self.world.elements.len())
            .field("players", &self.players.len())
            .field("npcs", &self.npcs.len())
            .field("possible_duels", &self.possible_duels)
            .field("tick", &self.tick)
            .finish()
    }
}

impl Scene {
    pub fn new(world: SceneWorld) -> Self {
        Self {
            world,
            players: Vec::new(),
            npcs: Vec::new(),
            possible_duels: Vec::new(),
            tick: 0,
        }
    }

    pub fn name(&self) -> &str {
        self.world.name()
    }

    pub fn world(&self) -> &SceneWorld {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut SceneWorld {
        &mut self.world
    }

    pub fn characters(&self) -> impl Iterator<Item = &Character> + '_ {
        self.world.characters()
    }

    pub fn collides_with_static(&self, probe: &Rect) -> bool {
        self.world.collides_with_static(probe)
    }

    pub fn interaction_zone_at(&self, position: Vec2) -> Option<&InteractionZone> {
        self.world.interaction_zone_at(position)
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn npcs(&self) -> &[Npc] {
        &self.npcs
    }

    pub fn possible_duels(&self) -> &[DuelPair] {
        &self.possible_duels
    }

    /// Number of completed `advance_tick` calls.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn role_of(&self, id: CharacterId) -> Option<Role> {
        if self.players.iter().any(|player| player.character() == id) {
            Some(Role::Player)
        } else if self.npcs.iter().any(|npc| npc.character() == id) {
            Some(Role::Npc)
        } else {
            None
        }
    }

    /// Binds the `index`-th character (in `characters()` order) to a human
    /// input device. The scene is left untouched on error.
    pub fn assign_player(
        &mut self,
        index: usize,
        device: Box<dyn InputDevice>,
    ) -> Result<CharacterId, SceneError> {
        let count = self.world.character_count();
        let character = self
            .world
            .characters()
            .nth(index)
            .map(|character| character.id())
            .ok_or(SceneError::IndexOutOfRange { index, count })?;

        match self.role_of(character) {
            Some(Role::Player) => return Err(SceneError::AlreadyAssigned { index, character }),
            Some(Role::Npc) => return Err(SceneError::BoundToNpc { index, character }),
            None => {}
        }

        info!(
            scene = self.world.name(),
            index,
            character = character.0,
            device = device.label(),
            "player_assigned"
        );
        self.players.push(Player::new(character, device));
        Ok(character)
    }

    /// Hands every character without a role to an npc whose brain comes from
    /// `brain_for`. Must run after all `assign_player` calls: characters
    /// taken here can no longer be given to a human.
    pub fn create_npcs<F>(&mut self, mut brain_for: F) -> usize
    where
        F: FnMut(&Character) -> Box<dyn NpcBrain>,
    {
        let mut created = 0;
        for character in self.world.characters() {
            let taken = self
                .players
                .iter()
                .map(Advanceable::character)
                .chain(self.npcs.iter().map(Advanceable::character))
                .any(|id| id == character.id());
            if taken {
                continue;
            }
            self.npcs.push(Npc::new(character.id(), brain_for(character)));
            created += 1;
        }
        info!(
            scene = self.world.name(),
            created,
            players = self.players.len(),
            npcs = self.npcs.len(),
            "npcs_created"
        );
        created
    }

    /// One simulation step: every npc, then every player, then a single
    /// duel query whose result replaces `possible_duels`.
    pub fn advance_tick(&mut self, duels: &dyn DuelEligibility) {
        let roles = self
            .npcs
            .iter_mut()
            .map(|npc| npc as &mut dyn Advanceable)
            .chain(
                self.players
                    .iter_mut()
                    .map(|player| player as &mut dyn Advanceable),
            );
        for role in roles {
            role.advance_tick(&mut self.world);
        }

        let mut pairs = duels.possible_duels(&self.world);
        pairs.sort_unstable();
        pairs.dedup();
        if pairs != self.possible_duels {
            debug!(
                scene = self.world.name(),
                tick = self.tick,
                count = pairs.len(),
                "duel_pairs_changed"
            );
        }
        self.possible_duels = pairs;
        self.tick = self.tick.saturating_add(1);
        trace!(tick = self.tick, "tick_advanced");
    }
}
