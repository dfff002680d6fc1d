use std::fmt;

use crate::geometry::{point_in_rect, Rect, Vec2};

use super::scene::Direction;

/// Name of the scripted behavior a zone unlocks (`bet`, `rob`, `piano`,
/// `poker`, `balcony`, `stairs`, ...). Kept open-ended: the set grows with
/// the level content, not with the engine.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ZoneAction(pub String);

impl ZoneAction {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ZoneAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct InteractionZone {
    pub zone: Rect,
    pub action: ZoneAction,
    pub target_position: Vec2,
    pub direction: Direction,
}

impl InteractionZone {
    pub fn contains(&self, position: Vec2) -> bool {
        point_in_rect(position, &self.zone)
    }
}
