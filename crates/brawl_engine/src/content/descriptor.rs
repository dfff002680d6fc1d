use serde::Deserialize;

use crate::app::{Direction, InteractionZone, ZoneAction};
use crate::asset_keys::validate_asset_key;
use crate::geometry::{Rect, Vec2};

use super::loader::LoadError;

pub const ELEMENT_TYPE_PROP: &str = "prop";
pub const ELEMENT_TYPE_CHARACTER: &str = "character";

/// Scene file as written by the authoring tools. Keys this engine does not
/// consume (`walls`, `stairs`, `targets`, `backgrounds`, ...) are ignored.
#[derive(Debug, Clone, Deserialize)]
struct RawSceneDescriptor {
    name: String,
    popspot: Vec<Vec2>,
    #[serde(default)]
    no_go_zones: Vec<Rect>,
    elements: Vec<RawElement>,
    #[serde(default)]
    interaction_zones: Vec<RawInteractionZone>,
}

#[derive(Debug, Clone, Deserialize)]
struct RawElement {
    #[serde(rename = "type")]
    kind: String,
    file: String,
    position: Option<Vec2>,
    center: Option<Vec2>,
    #[serde(rename = "box")]
    collision_box: Option<Rect>,
}

#[derive(Debug, Clone, Deserialize)]
struct RawInteractionZone {
    target_position: Vec2,
    action: String,
    zone: Rect,
    direction: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ElementDescriptor {
    Prop {
        file: String,
        position: Vec2,
        center: Vec2,
        collision_box: Option<Rect>,
    },
    /// Position comes from the spawn pool, never from the file.
    Character { file: String },
}

/// Validated scene content, ready to be placed.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneDescriptor {
    pub name: String,
    pub spawn_points: Vec<Vec2>,
    pub no_go_zones: Vec<Rect>,
    pub elements: Vec<ElementDescriptor>,
    pub interaction_zones: Vec<InteractionZone>,
}

impl SceneDescriptor {
    pub fn character_count(&self) -> usize {
        self.elements
            .iter()
            .filter(|element| matches!(element, ElementDescriptor::Character { .. }))
            .count()
    }
}

pub fn parse_descriptor(raw: &str) -> Result<SceneDescriptor, LoadError> {
    let mut deserializer = serde_json::Deserializer::from_str(raw);
    let parsed = serde_path_to_error::deserialize::<_, RawSceneDescriptor>(&mut deserializer)
        .map_err(|error| {
            let path = error.path().to_string();
            LoadError::Parse {
                path: if path.is_empty() { ".".to_string() } else { path },
                message: error.into_inner().to_string(),
            }
        })?;
    decode(parsed)
}

fn decode(raw: RawSceneDescriptor) -> Result<SceneDescriptor, LoadError> {
    check_spawn_points(&raw.popspot)?;
    for (index, zone) in raw.no_go_zones.iter().enumerate() {
        check_rect(format!("no_go_zones[{index}]"), zone)?;
    }

    let elements = raw
        .elements
        .into_iter()
        .enumerate()
        .map(|(index, element)| decode_element(index, element))
        .collect::<Result<Vec<_>, _>>()?;

    let interaction_zones = raw
        .interaction_zones
        .into_iter()
        .enumerate()
        .map(|(index, zone)| decode_interaction_zone(index, zone))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(SceneDescriptor {
        name: raw.name,
        spawn_points: raw.popspot,
        no_go_zones: raw.no_go_zones,
        elements,
        interaction_zones,
    })
}

fn decode_element(index: usize, raw: RawElement) -> Result<ElementDescriptor, LoadError> {
    validate_asset_key(&raw.file).map_err(|source| LoadError::InvalidAssetKey {
        path: format!("elements[{index}].file"),
        source,
    })?;

    match raw.kind.as_str() {
        ELEMENT_TYPE_PROP => {
            let path = format!("elements[{index}]");
            let position = raw.position.ok_or_else(|| LoadError::MissingField {
                path: path.clone(),
                field: "position",
            })?;
            let center = raw.center.ok_or_else(|| LoadError::MissingField {
                path: path.clone(),
                field: "center",
            })?;
            if let Some(collision_box) = &raw.collision_box {
                check_rect(format!("{path}.box"), collision_box)?;
            }
            Ok(ElementDescriptor::Prop {
                file: raw.file,
                position,
                center,
                collision_box: raw.collision_box,
            })
        }
        ELEMENT_TYPE_CHARACTER => Ok(ElementDescriptor::Character { file: raw.file }),
        other => Err(LoadError::UnrecognizedElementType {
            index,
            tag: other.to_string(),
        }),
    }
}

fn decode_interaction_zone(
    index: usize,
    raw: RawInteractionZone,
) -> Result<InteractionZone, LoadError> {
    let path = format!("interaction_zones[{index}]");
    check_rect(format!("{path}.zone"), &raw.zone)?;
    if raw.action.trim().is_empty() {
        return Err(LoadError::InvalidValue {
            path: format!("{path}.action"),
            message: "action must not be empty".to_string(),
        });
    }
    let direction = raw
        .direction
        .parse::<Direction>()
        .map_err(|error| LoadError::InvalidValue {
            path: format!("{path}.direction"),
            message: error.to_string(),
        })?;

    Ok(InteractionZone {
        zone: raw.zone,
        action: ZoneAction(raw.action),
        target_position: raw.target_position,
        direction,
    })
}

/// Every spawn point must be a distinct position, so no two characters can
/// be placed on the same spot.
pub(crate) fn check_spawn_points(points: &[Vec2]) -> Result<(), LoadError> {
    for (index, point) in points.iter().enumerate() {
        if let Some(first) = points[..index].iter().position(|earlier| earlier == point) {
            return Err(LoadError::InvalidValue {
                path: format!("popspot[{index}]"),
                message: format!("duplicates popspot[{first}] at ({}, {})", point.x, point.y),
            });
        }
    }
    Ok(())
}

fn check_rect(path: String, rect: &Rect) -> Result<(), LoadError> {
    if rect.is_well_formed() {
        Ok(())
    } else {
        Err(LoadError::MalformedRect { path, rect: *rect })
    }
}
