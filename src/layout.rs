//! Layout algorithms.
//!
//! These are pure functions over child frames; [`Container`](crate::container::Container) takes a
//! snapshot of its children, runs them, and writes the results back.

use crate::control::{Fill, HorizontalAlignment};
use cgmath::{Point2, Vector2};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayoutDirection {
    /// Children keep their positions.
    None,
    /// Children stack top to bottom.
    Vertical,
    /// Children stack left to right.
    ///
    /// Vertical alignment is not applied: every child shares the first child's y.
    Horizontal,
}

impl Default for LayoutDirection {
    fn default() -> Self {
        LayoutDirection::None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResizePolicy {
    /// The container keeps its size.
    None,
    /// Shrink to fit the children.
    WrapChildren,
    /// Grow to fit the children, but never shrink.
    ExpandForChildren,
}

impl Default for ResizePolicy {
    fn default() -> Self {
        ResizePolicy::WrapChildren
    }
}

/// Layout settings for a container.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutConfig {
    pub direction: LayoutDirection,
    pub resize: ResizePolicy,
    /// Space between the container edge and its children.
    pub margin: f64,
    /// Space between adjacent children.
    pub padding: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        LayoutConfig {
            direction: LayoutDirection::default(),
            resize: ResizePolicy::default(),
            margin: 8.,
            padding: 8.,
        }
    }
}

/// A child's frame, as seen by the layout pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Item {
    pub position: Point2<f64>,
    pub size: Vector2<f64>,
    pub horizontal: HorizontalAlignment,
    pub fill: Fill,
}

impl Item {
    pub fn right(&self) -> f64 {
        self.position.x + self.size.x
    }

    pub fn bottom(&self) -> f64 {
        self.position.y + self.size.y
    }
}

/// Stretches filling children to the container's inner extent.
///
/// Has no effect when the container wraps its children, since the two would depend on each other.
pub fn apply_fill(items: &mut [Item], container: Vector2<f64>, config: &LayoutConfig) {
    if config.resize == ResizePolicy::WrapChildren {
        return;
    }
    let inner = Vector2::new(
        (container.x - 2. * config.margin).max(0.),
        (container.y - 2. * config.margin).max(0.),
    );
    for item in items {
        if item.fill.horizontal {
            item.size.x = inner.x;
        }
        if item.fill.vertical {
            item.size.y = inner.y;
        }
    }
}

/// Positions children according to the layout direction.
pub fn arrange(items: &mut [Item], width: f64, config: &LayoutConfig) {
    match config.direction {
        LayoutDirection::None => (),
        LayoutDirection::Vertical => arrange_vertical(items, width, config),
        LayoutDirection::Horizontal => arrange_horizontal(items, config),
    }
}

/// Stacks children top to bottom, aligning each against `width` (the container's current width).
///
/// The first child is always pinned at (margin, margin).
pub fn arrange_vertical(items: &mut [Item], width: f64, config: &LayoutConfig) {
    let mut previous: Option<Item> = None;
    for item in items.iter_mut() {
        item.position = match previous {
            None => Point2::new(config.margin, config.margin),
            Some(previous) => {
                let x = match item.horizontal {
                    HorizontalAlignment::Center => (width - item.size.x) / 2.,
                    HorizontalAlignment::Right => width - config.margin - item.size.x,
                    HorizontalAlignment::Left | HorizontalAlignment::None => config.margin,
                };
                Point2::new(x, previous.bottom() + config.padding)
            }
        };
        previous = Some(*item);
    }
}

/// Places children left to right on the first child's row.
pub fn arrange_horizontal(items: &mut [Item], config: &LayoutConfig) {
    let mut previous: Option<Item> = None;
    for item in items.iter_mut() {
        item.position = match previous {
            None => Point2::new(config.margin, config.margin),
            Some(previous) => Point2::new(previous.right() + config.padding, previous.position.y),
        };
        previous = Some(*item);
    }
}

/// Computes the container size for the resize policy, or None if it keeps its size.
///
/// The result is clamped to `[min, max]`.
pub fn fit_size(
    items: &[Item],
    current: Vector2<f64>,
    min: Vector2<f64>,
    max: Vector2<f64>,
    config: &LayoutConfig,
) -> Option<Vector2<f64>> {
    let m = config.margin;
    let mut size = match config.resize {
        ResizePolicy::None => return None,
        ResizePolicy::WrapChildren => Vector2::new(2. * m, 2. * m),
        ResizePolicy::ExpandForChildren => current,
    };
    for item in items {
        if item.right() + m > size.x {
            size.x = item.right() + m;
        }
        if item.bottom() + m > size.y {
            size.y = item.bottom() + m;
        }
    }
    Some(Vector2::new(
        size.x.max(min.x).min(max.x),
        size.y.max(min.y).min(max.y),
    ))
}
