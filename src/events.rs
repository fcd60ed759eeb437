//! Events and intents.
//!
//! Raw input arrives as [`InputEvent`]s from an [`InputSource`]. The window stack translates them
//! into [`Intent`]s, which are what controls actually see.

use cgmath::{Point2, Vector2};

/// Mouse buttons.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left = 0,
    Right = 1,
    Middle = 2,
    X1 = 3,
    X2 = 4,
}

impl MouseButton {
    /// If true, presses of this button select and focus.
    pub fn is_selection(&self) -> bool {
        match self {
            MouseButton::Left | MouseButton::Right => true,
            MouseButton::Middle | MouseButton::X1 | MouseButton::X2 => false,
        }
    }
}

/// A raw input event, in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// A button went down.
    Pressed {
        button: MouseButton,
        position: Point2<f64>,
    },

    /// A button is still down. Sources repeat this while the button is held.
    Held {
        button: MouseButton,
        position: Point2<f64>,
    },

    /// A button went up.
    Released {
        button: MouseButton,
        position: Point2<f64>,
    },

    /// The pointer moved by this amount.
    Motion { delta: Vector2<f64> },

    /// The pointer is at this position.
    Position { position: Point2<f64> },

    /// Scroll wheel or trackpad scroll, in points.
    Scroll {
        position: Point2<f64>,
        delta: Vector2<f64>,
    },
}

/// Something that produces raw input, e.g. a platform event loop.
pub trait InputSource {
    /// Returns the next pending event, if any. Must not block.
    fn poll_event(&mut self) -> Option<InputEvent>;
}

/// What the user means to do to a control.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Intent {
    /// Primary selection ended (left button up) at this position.
    Released(Point2<f64>),

    /// Secondary selection ended (right button up) at this position.
    AltReleased(Point2<f64>),

    /// Primary selection is being held at this position.
    Held(Point2<f64>),

    /// Secondary selection is being held at this position.
    AltHeld(Point2<f64>),

    /// The control should move by this amount.
    Move(Vector2<f64>),

    /// The pointer is over the control without any other input.
    Hovered(Point2<f64>),

    /// Content under this position should scroll by this amount.
    Scroll {
        position: Point2<f64>,
        delta: Vector2<f64>,
    },
}

impl Intent {
    /// The screen position this intent refers to, if any.
    pub fn position(&self) -> Option<Point2<f64>> {
        match *self {
            Intent::Released(p)
            | Intent::AltReleased(p)
            | Intent::Held(p)
            | Intent::AltHeld(p)
            | Intent::Hovered(p) => Some(p),
            Intent::Scroll { position, .. } => Some(position),
            Intent::Move(_) => None,
        }
    }
}

/// An edge or corner being dragged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResizeEdge {
    Up,
    Down,
    Left,
    Right,
    UpRight,
    UpLeft,
    DownRight,
    DownLeft,
}

impl ResizeEdge {
    /// Returns the edge for a point `inset` away from a `size` box's borders, if it is near any.
    ///
    /// `local` is relative to the box origin.
    pub fn hit(local: Point2<f64>, size: Vector2<f64>, inset: f64) -> Option<ResizeEdge> {
        if local.x < 0. || local.y < 0. || local.x >= size.x || local.y >= size.y {
            return None;
        }
        let up = local.y < inset;
        let down = local.y >= size.y - inset;
        let left = local.x < inset;
        let right = local.x >= size.x - inset;
        match (up, down, left, right) {
            (true, _, true, _) => Some(ResizeEdge::UpLeft),
            (true, _, _, true) => Some(ResizeEdge::UpRight),
            (_, true, true, _) => Some(ResizeEdge::DownLeft),
            (_, true, _, true) => Some(ResizeEdge::DownRight),
            (true, _, _, _) => Some(ResizeEdge::Up),
            (_, true, _, _) => Some(ResizeEdge::Down),
            (_, _, true, _) => Some(ResizeEdge::Left),
            (_, _, _, true) => Some(ResizeEdge::Right),
            _ => None,
        }
    }

    /// Splits a pointer delta into (position change, size change) for this edge.
    pub fn apply(self, delta: Vector2<f64>) -> (Vector2<f64>, Vector2<f64>) {
        let (dx, dy) = (delta.x, delta.y);
        let (moved, resized) = match self {
            ResizeEdge::Up => ((0., dy), (0., -dy)),
            ResizeEdge::Down => ((0., 0.), (0., dy)),
            ResizeEdge::Left => ((dx, 0.), (-dx, 0.)),
            ResizeEdge::Right => ((0., 0.), (dx, 0.)),
            ResizeEdge::UpRight => ((0., dy), (dx, -dy)),
            ResizeEdge::UpLeft => ((dx, dy), (-dx, -dy)),
            ResizeEdge::DownRight => ((0., 0.), (dx, dy)),
            ResizeEdge::DownLeft => ((dx, 0.), (-dx, dy)),
        };
        (moved.into(), resized.into())
    }
}

/// Drag state of a composite, stored on its root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DragState {
    Idle,
    Moving,
    Resizing(ResizeEdge),
}

impl Default for DragState {
    fn default() -> Self {
        DragState::Idle
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edge_hit_prefers_corners() {
        let size = Vector2::new(100., 100.);
        assert_eq!(
            ResizeEdge::hit(Point2::new(98., 98.), size, 6.),
            Some(ResizeEdge::DownRight)
        );
        assert_eq!(
            ResizeEdge::hit(Point2::new(50., 2.), size, 6.),
            Some(ResizeEdge::Up)
        );
        assert_eq!(ResizeEdge::hit(Point2::new(50., 50.), size, 6.), None);
        assert_eq!(
            ResizeEdge::hit(Point2::new(-1., 50.), size, 6.),
            None,
            "points outside the box are not edges"
        );
    }

    #[test]
    fn dragging_the_left_edge_moves_and_shrinks() {
        let (moved, resized) = ResizeEdge::Left.apply(Vector2::new(10., 3.));
        assert_eq!(moved, Vector2::new(10., 0.));
        assert_eq!(resized, Vector2::new(-10., 0.));
    }
}
