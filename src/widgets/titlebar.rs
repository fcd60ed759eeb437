use super::button::Button;
use super::panel::Panel;
use crate::color::Color;
use crate::config::GuiConfig;
use crate::control::{Control, ControlBase, HorizontalAlignment, VerticalAlignment};
use crate::events::{DragState, Intent};
use crate::layout::{LayoutConfig, LayoutDirection, ResizePolicy};
use cgmath::{Point2, Vector2};
use core::any::Any;
use std::sync::{Arc, Weak};

/// The draggable title row of a [`Window`](super::Window).
///
/// Holding the primary button on the bar starts moving its parent; the button at the right edge
/// closes the parent.
#[derive(Debug)]
pub struct Titlebar {
    panel: Panel,
    close_button: Arc<Button>,
}

impl Titlebar {
    pub fn new(config: &GuiConfig, title: &str) -> Arc<Titlebar> {
        let layout = LayoutConfig {
            direction: LayoutDirection::None,
            resize: ResizePolicy::None,
            margin: 0.,
            padding: 0.,
        };
        let bar = Arc::new_cyclic(|me: &Weak<Titlebar>| {
            let owner = me.clone();
            Titlebar {
                panel: Panel::embedded(me, config, layout),
                close_button: Button::new(config, "", move || {
                    let parent = owner.upgrade().and_then(|bar| bar.base().parent());
                    match parent {
                        Some(parent) => parent.close(),
                        None => tracing::warn!("close button pressed on a detached titlebar"),
                    }
                }),
            }
        });

        bar.panel.update_style(|style| {
            style.draw_background = false;
            style.draw_border = false;
            style.font_name = config.title_font.clone();
            style.text_indent = 4.;
        });
        bar.panel.set_text(title);
        bar.base().set_vertical_alignment(VerticalAlignment::Top);
        bar.base().set_horizontal_alignment(HorizontalAlignment::Left);

        let button = &bar.close_button;
        button.panel().update_style(|style| {
            style.draw_border = false;
            style.rounded = false;
            style.active_texture = Some(config.close_button_asset.clone());
            style.colors.active_background = Color::TRANSPARENT;
            style.colors.inactive_background = Color::TRANSPARENT;
        });
        let height = config.titlebar_height;
        button.set_size(Vector2::new(height, height));
        if let Err(err) = bar.panel.add_control(button.clone()) {
            tracing::warn!(control = %bar.base().id(), "could not attach close button: {}", err);
        }
        bar.set_size(Vector2::new(height, height));
        bar
    }

    pub fn panel(&self) -> &Panel {
        &self.panel
    }

    pub fn close_button(&self) -> &Arc<Button> {
        &self.close_button
    }

    pub fn title(&self) -> String {
        self.panel.text()
    }

    pub fn set_title(&self, title: &str) {
        self.panel.set_text(title);
    }
}

impl Control for Titlebar {
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
        match *intent {
            Intent::Held(p) => {
                if self.close_button.base().screen_rect().contains(p) {
                    self.panel.process_intent(intent)
                } else if self.base().screen_rect().contains(p) {
                    self.base().set_drag_state(DragState::Moving);
                    true
                } else {
                    false
                }
            }
            Intent::Move(delta) => {
                if self.base().drag_state() != DragState::Moving {
                    return false;
                }
                match self.base().parent() {
                    Some(parent) => parent.move_by(delta),
                    None => self.move_by(delta),
                }
                true
            }
            _ => self.panel.process_intent(intent),
        }
    }

    fn on_resized(&self) {
        let width = self.base().size().x;
        let button_width = self.close_button.base().size().x;
        self.close_button
            .set_position(Point2::new(width - button_width, 0.));
        self.panel.on_resized();
    }
}
