//! A thread-safe tree of UI controls.
//!
//! Controls are shared as [`ControlRef`]s and may be mutated from any thread. Containers lay out
//! their children and forward input intents to them; a [`WindowStack`] orders root controls,
//! tracks focus and turns raw input into intents. Drawing and asset loading go through the
//! [`RenderSurface`] and [`AssetProvider`] traits.

pub mod assets;
pub mod clock;
pub mod color;
pub mod config;
pub mod container;
pub mod control;
pub mod error;
pub mod events;
pub mod layout;
mod lock;
pub mod rect;
pub mod scroll;
pub mod stack;
pub mod surface;
pub mod widgets;

#[cfg(test)]
mod testing;

pub use assets::{AssetProvider, SharedAssets};
pub use color::Color;
pub use config::GuiConfig;
pub use container::Container;
pub use control::{Control, ControlBase, ControlId, ControlRef};
pub use error::{
    AssetError, ConfigError, ContentError, LockError, RenderError, StackGone, TreeError,
};
pub use events::{InputEvent, InputSource, Intent};
pub use layout::{LayoutConfig, LayoutDirection, ResizePolicy};
pub use lock::ListLock;
pub use scroll::ScrollView;
pub use stack::{StackHandle, WindowStack};
pub use surface::RenderSurface;
