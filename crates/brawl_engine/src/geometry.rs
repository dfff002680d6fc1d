use serde::Deserialize;

/// Scene-space point. `y` grows downward, matching the descriptor's image
/// coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
#[serde(from = "[f32; 2]")]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: f32, dy: f32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

impl From<[f32; 2]> for Vec2 {
    fn from([x, y]: [f32; 2]) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle stored as `[left, top, width, height]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
#[serde(from = "[f32; 4]")]
pub struct Rect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl From<[f32; 4]> for Rect {
    fn from([left, top, width, height]: [f32; 4]) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }
}

impl Rect {
    pub const fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Rectangle of `size` whose center sits on `center`.
    pub fn centered_on(center: Vec2, size: Vec2) -> Self {
        Self {
            left: center.x - size.x * 0.5,
            top: center.y - size.y * 0.5,
            width: size.x,
            height: size.y,
        }
    }

    pub fn right(&self) -> f32 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }

    /// Finite components and non-negative extent. Anything else is rejected
    /// when the descriptor is decoded.
    pub fn is_well_formed(&self) -> bool {
        let finite = self.left.is_finite()
            && self.top.is_finite()
            && self.width.is_finite()
            && self.height.is_finite();
        finite && self.width >= 0.0 && self.height >= 0.0
    }
}

/// Open-interval overlap: rectangles that only share an edge do not collide,
/// so a character can slide along a wall it is touching.
pub fn boxes_overlap(a: &Rect, b: &Rect) -> bool {
    a.left < b.right() && b.left < a.right() && a.top < b.bottom() && b.top < a.bottom()
}

/// Inclusive on all four edges.
pub fn point_in_rect(point: Vec2, rect: &Rect) -> bool {
    rect.left <= point.x
        && point.x <= rect.right()
        && rect.top <= point.y
        && point.y <= rect.bottom()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlap_requires_shared_area() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(boxes_overlap(&a, &Rect::new(5.0, 5.0, 10.0, 10.0)));
        assert!(boxes_overlap(&a, &Rect::new(2.0, 2.0, 1.0, 1.0)));
        assert!(!boxes_overlap(&a, &Rect::new(10.0, 0.0, 5.0, 5.0)));
        assert!(!boxes_overlap(&a, &Rect::new(0.0, 11.0, 5.0, 5.0)));
    }

    #[test]
    fn overlap_is_symmetric() {
        let a = Rect::new(0.0, 0.0, 4.0, 4.0);
        let b = Rect::new(3.0, -2.0, 4.0, 4.0);
        assert_eq!(boxes_overlap(&a, &b), boxes_overlap(&b, &a));
    }

    #[test]
    fn point_in_rect_counts_edges() {
        let rect = Rect::new(10.0, 20.0, 30.0, 40.0);
        assert!(point_in_rect(Vec2::new(10.0, 20.0), &rect));
        assert!(point_in_rect(Vec2::new(40.0, 60.0), &rect));
        assert!(!point_in_rect(Vec2::new(9.0, 30.0), &rect));
        assert!(!point_in_rect(Vec2::new(20.0, 61.0), &rect));
    }

    #[test]
    fn centered_on_places_center() {
        let rect = Rect::centered_on(Vec2::new(10.0, 10.0), Vec2::new(4.0, 2.0));
        assert_eq!(rect, Rect::new(8.0, 9.0, 4.0, 2.0));
    }

    #[test]
    fn well_formed_rejects_negative_and_nan() {
        assert!(Rect::new(0.0, 0.0, 0.0, 0.0).is_well_formed());
        assert!(!Rect::new(0.0, 0.0, -1.0, 2.0).is_well_formed());
        assert!(!Rect::new(f32::NAN, 0.0, 1.0, 2.0).is_well_formed());
    }

    #[test]
    fn deserializes_from_arrays() {
        let rect: Rect = serde_json::from_str("[1, 2, 3, 4]").expect("rect");
        assert_eq!(rect, Rect::new(1.0, 2.0, 3.0, 4.0));
        let point: Vec2 = serde_json::from_str("[5.5, 6]").expect("point");
        assert_eq!(point, Vec2::new(5.5, 6.0));
    }
}
