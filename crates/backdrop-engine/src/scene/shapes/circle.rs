use crate::coords::Vec2;
use crate::paint::Color;
use crate::scene::{DrawCmd, DrawList};

/// Filled disc payload.
#[derive(Debug, Clone, PartialEq)]
pub struct CircleCmd {
    pub center: Vec2,
    pub radius: f32,
    pub color: Color,
}

impl CircleCmd {
    #[inline]
    pub fn new(center: Vec2, radius: f32, color: Color) -> Self {
        Self { center, radius, color }
    }
}

impl DrawList {
    /// Records a filled disc.
    #[inline]
    pub fn push_circle(&mut self, center: Vec2, radius: f32, color: Color) {
        self.push(DrawCmd::Circle(CircleCmd::new(center, radius, color)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_circle_records_in_order() {
        let mut list = DrawList::new();
        list.push_circle(Vec2::new(1.0, 1.0), 2.0, Color::from_rgb8([0, 0, 0]));
        list.push_circle(Vec2::new(5.0, 1.0), 3.0, Color::from_rgb8([0, 0, 0]));
        assert_eq!(list.len(), 2);
        let DrawCmd::Circle(second) = &list.items()[1];
        assert_eq!(second.radius, 3.0);

        list.clear();
        assert!(list.is_empty());
    }
}
