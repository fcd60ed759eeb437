use super::panel::Panel;
use crate::config::GuiConfig;
use crate::control::{Control, ControlBase};
use crate::events::Intent;
use core::any::Any;
use std::fmt;
use std::sync::Arc;

/// Runs when a button is clicked.
pub type Action = Box<dyn Fn() + Send + Sync>;

/// A panel that runs an action when clicked.
///
/// The primary action runs on a primary release over the button, the secondary one on a secondary
/// release. While a selection is held over the button it draws with the pressed look.
pub struct Button {
    panel: Panel,
    primary: Action,
    secondary: Option<Action>,
}

struct DebugifyOption<'a, T>(&'a Option<T>);
impl<'a, T> fmt::Debug for DebugifyOption<'a, T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.0.is_some() {
            write!(f, "Some(..)")
        } else {
            write!(f, "None")
        }
    }
}

impl fmt::Debug for Button {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Button")
            .field("panel", &self.panel)
            .field("secondary", &DebugifyOption(&self.secondary))
            .finish()
    }
}

impl Button {
    pub fn new(
        config: &GuiConfig,
        text: &str,
        primary: impl Fn() + Send + Sync + 'static,
    ) -> Arc<Button> {
        Button::with_actions(config, text, Box::new(primary), None)
    }

    pub fn with_actions(
        config: &GuiConfig,
        text: &str,
        primary: Action,
        secondary: Option<Action>,
    ) -> Arc<Button> {
        let button = Arc::new_cyclic(|me| Button {
            panel: Panel::embedded(me, config, Panel::default_layout(config)),
            primary,
            secondary,
        });
        button.panel.set_text(text);
        button
    }

    pub fn panel(&self) -> &Panel {
        &self.panel
    }

    pub fn is_pressed(&self) -> bool {
        self.panel.is_pressed()
    }

    fn is_over(&self, position: cgmath::Point2<f64>) -> bool {
        self.base().screen_rect().contains(position)
    }
}

impl Control for Button {
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
        self.panel.set_pressed(false);
        match *intent {
            Intent::Released(p) if self.is_over(p) => {
                (self.primary)();
                true
            }
            Intent::AltReleased(p) if self.is_over(p) => {
                if let Some(secondary) = &self.secondary {
                    secondary();
                }
                true
            }
            Intent::Released(_) | Intent::AltReleased(_) => false,
            Intent::Held(p) | Intent::AltHeld(p) => {
                if self.is_over(p) {
                    self.panel.set_pressed(true);
                }
                false
            }
            _ => self.panel.process_intent(intent),
        }
    }
}
