use super::panel::Panel;
use super::titlebar::Titlebar;
use crate::config::GuiConfig;
use crate::control::{Control, ControlBase, ControlRef, HorizontalAlignment};
use crate::error::TreeError;
use crate::events::{DragState, Intent, ResizeEdge};
use crate::layout::{LayoutConfig, LayoutDirection, ResizePolicy};
use crate::scroll::ScrollView;
use cgmath::Vector2;
use core::any::Any;
use std::sync::Arc;

pub const DEFAULT_WINDOW_SIZE: Vector2<f64> = Vector2 { x: 412., y: 412. };

/// Width of the band along the window edges that starts a resize.
pub const RESIZE_BORDER: f64 = 6.;

/// A titled, movable, resizable panel with scrolling content.
///
/// Controls added to a window go into its scroll view.
#[derive(Debug)]
pub struct Window {
    panel: Panel,
    titlebar: Arc<Titlebar>,
    scroll: Arc<ScrollView>,
}

impl Window {
    pub fn new(config: &GuiConfig, title: &str) -> Arc<Window> {
        let layout = LayoutConfig {
            direction: LayoutDirection::Vertical,
            resize: ResizePolicy::WrapChildren,
            margin: 0.,
            padding: 0.,
        };
        let th = config.titlebar_height;
        let window = Arc::new_cyclic(|me| Window {
            panel: Panel::embedded(me, config, layout),
            titlebar: Titlebar::new(config, title),
            scroll: ScrollView::new(Vector2::new(
                DEFAULT_WINDOW_SIZE.x,
                DEFAULT_WINDOW_SIZE.y - th,
            )),
        });
        window
            .scroll
            .base()
            .set_horizontal_alignment(HorizontalAlignment::Left);
        window.base().set_min_size(Vector2::new(64., th + 16.));

        let titlebar: ControlRef = window.titlebar.clone();
        let scroll: ControlRef = window.scroll.clone();
        for child in vec![titlebar, scroll] {
            if let Err(err) = window.panel.add_control(child) {
                tracing::warn!(control = %window.base().id(), "could not build window: {}", err);
            }
        }
        window.set_size(DEFAULT_WINDOW_SIZE);
        window
    }

    pub fn panel(&self) -> &Panel {
        &self.panel
    }

    pub fn titlebar(&self) -> &Arc<Titlebar> {
        &self.titlebar
    }

    pub fn scroll_view(&self) -> &Arc<ScrollView> {
        &self.scroll
    }

    pub fn title(&self) -> String {
        self.titlebar.title()
    }

    pub fn set_title(&self, title: &str) {
        self.titlebar.set_title(title);
    }

    /// Adds a control to the window's content.
    pub fn add_control(&self, control: ControlRef) -> Result<(), TreeError> {
        self.scroll.add_control(control)
    }

    pub fn remove_control(&self, control: &ControlRef) -> Result<(), TreeError> {
        self.scroll.remove_control(control)
    }

    fn resize_from(&self, edge: ResizeEdge, delta: Vector2<f64>) {
        let (moved, resized) = edge.apply(delta);
        let old = self.base().size();
        self.set_size(old + resized);
        let change = self.base().size() - old;

        // the opposite edge stays put, even when the size was clamped
        let shift = Vector2::new(
            if moved.x != 0. { -change.x } else { 0. },
            if moved.y != 0. { -change.y } else { 0. },
        );
        if shift != Vector2::new(0., 0.) {
            self.move_by(shift);
        }
    }
}

impl Control for Window {
    fn base(&self) -> &ControlBase {
        self.panel.base()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn delegate(&self) -> Option<&dyn Control> {
        Some(&self.panel)
    }

    fn process_intent(&self, intent: &Intent) -> bool {
        let state = self.base().drag_state();
        match (*intent, state) {
            (Intent::Held(_), DragState::Resizing(_)) => true,
            (Intent::Held(p), DragState::Idle) => {
                let local = self.base().to_local(p);
                match ResizeEdge::hit(local, self.base().size(), RESIZE_BORDER) {
                    Some(edge) => {
                        self.base().set_drag_state(DragState::Resizing(edge));
                        true
                    }
                    None => self.panel.process_intent(intent),
                }
            }
            (Intent::Move(delta), DragState::Resizing(edge)) => {
                self.resize_from(edge, delta);
                true
            }
            _ => self.panel.process_intent(intent),
        }
    }

    fn on_resized(&self) {
        let size = self.base().size();
        let th = self.titlebar.base().size().y;
        self.titlebar.set_size(Vector2::new(size.x, th));
        self.scroll.set_size(Vector2::new(size.x, size.y - th));
        self.panel.on_resized();
    }
}
