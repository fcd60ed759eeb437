use super::button::Button;
use super::label::Label;
use super::panel::Panel;
use crate::clock::IntervalTimer;
use crate::config::GuiConfig;
use crate::control::{Control, ControlBase, HorizontalAlignment, VerticalAlignment};
use crate::layout::{LayoutConfig, LayoutDirection, ResizePolicy};
use cgmath::Vector2;
use core::any::Any;
use parking_lot::Mutex;
use std::sync::{Arc, Weak};
use std::time::Duration;

pub const DEFAULT_NOTIFICATION_SIZE: Vector2<f64> = Vector2 { x: 384., y: 84. };

const BUTTON_HEIGHT: f64 = 32.;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationKind {
    /// Stays until dismissed with its "Ok" button.
    Message,
    /// Closes itself after the configured notification duration.
    Temporary,
}

/// A message box, centred on screen when added to a window stack.
#[derive(Debug)]
pub struct Notification {
    panel: Panel,
    kind: NotificationKind,
    label: Arc<Label>,
    button: Option<Arc<Button>>,
    expiry: Mutex<Option<IntervalTimer>>,
}

impl Notification {
    pub fn new(config: &GuiConfig, message: &str, kind: NotificationKind) -> Arc<Notification> {
        Notification::with_size(config, message, kind, DEFAULT_NOTIFICATION_SIZE)
    }

    pub fn with_size(
        config: &GuiConfig,
        message: &str,
        kind: NotificationKind,
        size: Vector2<f64>,
    ) -> Arc<Notification> {
        let layout = LayoutConfig {
            direction: LayoutDirection::Vertical,
            resize: ResizePolicy::WrapChildren,
            margin: config.margin,
            padding: config.padding,
        };
        let notification = Arc::new_cyclic(|me: &Weak<Notification>| {
            let owner = me.clone();
            let (button, expiry) = match kind {
                NotificationKind::Message => {
                    let button = Button::new(config, "Ok", move || {
                        if let Some(notification) = owner.upgrade() {
                            notification.close();
                        }
                    });
                    (Some(button), None)
                }
                NotificationKind::Temporary => {
                    (None, Some(IntervalTimer::new(config.notification_duration())))
                }
            };
            let label = Label::new(config, message);
            label.use_large_font(config);
            Notification {
                panel: Panel::embedded(me, config, layout),
                kind,
                label,
                button,
                expiry: Mutex::new(expiry),
            }
        });

        notification.panel.update_style(|style| style.rounded = false);
        let base = notification.base();
        base.set_vertical_alignment(VerticalAlignment::Center);
        base.set_horizontal_alignment(HorizontalAlignment::Center);
        base.set_active(true);
        notification.set_size(size);

        let label = &notification.label;
        label.base().set_vertical_alignment(VerticalAlignment::Top);
        label.base().set_horizontal_alignment(HorizontalAlignment::Center);
        label.set_size(size);
        notification.attach(label.clone());

        if let Some(button) = &notification.button {
            button.base().set_vertical_alignment(VerticalAlignment::Top);
            button.base().set_horizontal_alignment(HorizontalAlignment::Center);
            button.set_size(Vector2::new(size.x / 4., BUTTON_HEIGHT));
            notification.attach(button.clone());
        }
        notification
    }

    fn attach(&self, control: Arc<dyn Control>) {
        if let Err(err) = self.panel.add_control(control) {
            tracing::warn!(control = %self.base().id(), "could not build notification: {}", err);
        }
    }

    pub fn kind(&self) -> NotificationKind {
        self.kind
    }

    pub fn message(&self) -> String {
        self.label.text()
    }

    pub fn panel(&self) -> &Panel {
        &self.panel
    }

    pub fn button(&self) -> Option<&Arc<Button>> {
        self.button.as_ref()
    }

    /// Time left before a temporary notification closes itself.
    pub fn remaining(&self) -> Option<Duration> {
        self.expiry.lock().as_ref().map(IntervalTimer::remaining)
    }
}

impl Control for Notification {
    fn base(&self) -> &ControlBase {
        self.panel.base()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn delegate(&self) -> Option<&dyn Control> {
        Some(&self.panel)
    }

    fn update(&self, elapsed: Duration) {
        self.panel.update(elapsed);
        let expired = match self.expiry.lock().as_mut() {
            Some(timer) => timer.advance(elapsed),
            None => false,
        };
        if expired {
            tracing::debug!(control = %self.base().id(), "notification expired");
            self.close();
        }
    }
}
