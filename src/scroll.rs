//! Scrollable content behind a fixed viewport.

use crate::assets::SharedAssets;
use crate::container::Container;
use crate::control::{Control, ControlBase, ControlId, ControlRef};
use crate::error::{ContentError, RenderError, TreeError};
use crate::events::Intent;
use crate::layout::{LayoutConfig, LayoutDirection, ResizePolicy};
use crate::rect::Rect;
use crate::surface::RenderSurface;
use cgmath::{Point2, Vector2, Zero};
use core::any::Any;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

/// Content never grows beyond this in either dimension.
pub const MAX_CONTENT_SIZE: f64 = 32_000.;

/// A viewport over a content container that may be larger than the viewport.
///
/// The scroll view's own size is the viewport size. The content is positioned at the negated
/// scroll offset, so children keep their layout positions regardless of scrolling.
#[derive(Debug)]
pub struct ScrollView {
    base: ControlBase,
    content: Arc<Container>,
    offset: Mutex<Vector2<f64>>,
}

impl ScrollView {
    /// Creates a scroll view whose content stacks vertically and wraps its children.
    pub fn new(viewport: Vector2<f64>) -> Arc<ScrollView> {
        ScrollView::with_layout(
            viewport,
            LayoutConfig {
                direction: LayoutDirection::Vertical,
                resize: ResizePolicy::WrapChildren,
                ..LayoutConfig::default()
            },
        )
    }

    pub fn with_layout(viewport: Vector2<f64>, layout: LayoutConfig) -> Arc<ScrollView> {
        let view = Arc::new_cyclic(|me| ScrollView {
            base: ControlBase::new(me),
            content: Container::new(layout),
            offset: Mutex::new(Vector2::zero()),
        });
        view.content
            .base()
            .set_max_size(Vector2::new(MAX_CONTENT_SIZE, MAX_CONTENT_SIZE));
        view.content.base().set_parent(Some(view.base.me_weak()));
        view.set_size(viewport);
        view
    }

    pub fn content(&self) -> &Arc<Container> {
        &self.content
    }

    pub fn offset(&self) -> Vector2<f64> {
        *self.offset.lock()
    }

    /// The largest offset that still keeps the viewport covered by content.
    pub fn max_offset(&self) -> Vector2<f64> {
        let content = self.content.base().size();
        let viewport = self.base.size();
        Vector2::new(
            (content.x - viewport.x).max(0.),
            (content.y - viewport.y).max(0.),
        )
    }

    /// Scrolls by `delta`, clamped to the content bounds.
    pub fn scroll_by(&self, delta: Vector2<f64>) {
        let offset = self.offset() + delta;
        self.scroll_to(offset);
    }

    pub fn scroll_to(&self, offset: Vector2<f64>) {
        let max = self.max_offset();
        let offset = Vector2::new(offset.x.max(0.).min(max.x), offset.y.max(0.).min(max.y));
        *self.offset.lock() = offset;
        self.content.set_position(Point2::new(-offset.x, -offset.y));
    }

    pub fn add_control(&self, control: ControlRef) -> Result<(), TreeError> {
        self.content.add_control(control)
    }

    pub fn remove_control(&self, control: &ControlRef) -> Result<(), TreeError> {
        self.content.remove_control(control)
    }

    fn clamp_offset(&self) {
        let offset = self.offset();
        self.scroll_to(offset);
    }
}

impl Control for ScrollView {
    fn base(&self) -> &ControlBase {
        &self.base
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_container(&self) -> Option<&Container> {
        Some(&self.content)
    }

    fn update(&self, elapsed: Duration) {
        self.base.refresh_transform();
        self.content.update(elapsed);
    }

    fn render(&self, surface: &mut dyn RenderSurface) -> Result<(), RenderError> {
        surface.set_transform(self.base.transform());
        surface.push_clip(Rect::new(Point2::new(0., 0.), self.base.size()));
        let result = self.content.render(surface);
        surface.pop_clip();
        result
    }

    fn process_intent(&self, intent: &Intent) -> bool {
        if let Some(position) = intent.position() {
            if !self.base.screen_rect().contains(position) {
                return false;
            }
        }
        if self.content.process_intent(intent) {
            return true;
        }
        match *intent {
            Intent::Scroll { delta, .. } => {
                self.scroll_by(delta);
                true
            }
            _ => false,
        }
    }

    fn load_content(&self, assets: &SharedAssets) -> Result<(), ContentError> {
        self.content.load_content(assets)
    }

    fn unload_content(&self) -> Result<(), ContentError> {
        self.content.unload_content()
    }

    fn on_resized(&self) {
        self.clamp_offset();
    }

    fn on_closed(&self) {
        self.content.base().set_parent(None);
        self.content.close();
    }

    fn child_resized(&self, _child: ControlId) {
        self.clamp_offset();
    }
}
