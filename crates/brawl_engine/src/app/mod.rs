mod duel;
mod input;
mod roles;
mod scene;
mod zone;

pub use duel::{DuelEligibility, DuelPair, NoDuels};
pub use input::{InputAction, InputDevice, InputSnapshot};
pub use roles::{
    apply_intent, Advanceable, IdleBrain, Intent, Npc, NpcBrain, Player, CHARACTER_FOOTPRINT_PX,
    WALK_SPEED_PX_PER_TICK,
};
pub(crate) use scene::CharacterIdAllocator;
pub use scene::{
    Character, CharacterId, Direction, Prop, Role, Scene, SceneElement, SceneError, SceneWorld,
    UnknownDirection,
};
pub use zone::{InteractionZone, ZoneAction};
