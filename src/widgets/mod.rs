//! Drawable controls built on [`Panel`].

mod button;
mod image;
mod label;
mod notification;
mod panel;
mod titlebar;
mod window;

pub use button::{Action, Button};
pub use image::Image;
pub use label::Label;
pub use notification::{Notification, NotificationKind, DEFAULT_NOTIFICATION_SIZE};
pub use panel::{Panel, PanelStyle};
pub use titlebar::Titlebar;
pub use window::{Window, DEFAULT_WINDOW_SIZE, RESIZE_BORDER};
