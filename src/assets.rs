//! The asset provider collaborator.
//!
//! Decoding images and fonts happens elsewhere; the control tree only asks for handles at
//! `load_content` time and drops them at `unload_content` or close. Handles are reference counted,
//! so the provider may hand out the same resource to many controls.

use crate::color::Color;
use crate::error::AssetError;
use crate::rect::Rect;
use cgmath::Vector2;
use std::fmt;
use std::sync::Arc;

/// Identifies a resource inside an asset provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AssetId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FontWeight {
    Light,
    Normal,
    Bold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FontStyle {
    Normal,
    Italic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FontStretch {
    Condensed,
    Normal,
    Expanded,
}

/// Everything needed to look up a font.
#[derive(Debug, Clone, PartialEq)]
pub struct FontDescriptor {
    pub name: String,
    pub size: f64,
    pub weight: FontWeight,
    pub style: FontStyle,
    pub stretch: FontStretch,
}

impl FontDescriptor {
    pub fn regular(name: &str, size: f64) -> FontDescriptor {
        FontDescriptor {
            name: name.to_string(),
            size,
            weight: FontWeight::Normal,
            style: FontStyle::Normal,
            stretch: FontStretch::Normal,
        }
    }
}

/// What a brush paints with.
#[derive(Debug, Clone)]
pub enum BrushSource {
    Solid(Color),
    /// A texture tiled across the painted area.
    Texture(TextureHandle),
}

#[derive(Debug)]
pub struct Texture {
    pub id: AssetId,
    pub size: Vector2<f64>,
}

#[derive(Debug)]
pub struct Font {
    pub id: AssetId,
    pub descriptor: FontDescriptor,
}

#[derive(Debug)]
pub struct Brush {
    pub id: AssetId,
    pub source: BrushSource,
}

/// Text shaped into a box.
#[derive(Debug)]
pub struct TextLayout {
    pub id: AssetId,
    pub text: String,
    /// The box the text was laid out into.
    pub bounds: Rect,
}

pub type TextureHandle = Arc<Texture>;
pub type FontHandle = Arc<Font>;
pub type BrushHandle = Arc<Brush>;
pub type TextLayoutHandle = Arc<TextLayout>;

/// Loads and shares backing resources.
pub trait AssetProvider: fmt::Debug + Send + Sync {
    fn load_texture(&self, path: &str) -> Result<TextureHandle, AssetError>;

    fn load_font(&self, descriptor: &FontDescriptor) -> Result<FontHandle, AssetError>;

    fn load_brush(&self, source: BrushSource) -> Result<BrushHandle, AssetError>;

    fn make_text_layout(
        &self,
        font: &FontHandle,
        text: &str,
        max_width: f64,
        max_height: f64,
    ) -> Result<TextLayoutHandle, AssetError>;
}

/// A shared asset provider, as remembered by loaded containers.
pub type SharedAssets = Arc<dyn AssetProvider>;
