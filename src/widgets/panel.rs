use crate::assets::{
    BrushHandle, BrushSource, FontDescriptor, FontHandle, SharedAssets, TextLayoutHandle,
    TextureHandle,
};
use crate::config::{ColorScheme, GuiConfig};
use crate::container::Container;
use crate::control::{Control, ControlBase, ControlRef};
use crate::error::{AssetError, ContentError, RenderError, TreeError};
use crate::layout::LayoutConfig;
use crate::rect::Rect;
use crate::surface::RenderSurface;
use cgmath::Point2;
use core::any::Any;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

/// How a panel looks.
#[derive(Debug, Clone, PartialEq)]
pub struct PanelStyle {
    /// Invisible panels draw neither themselves nor their children.
    pub visible: bool,
    pub draw_background: bool,
    pub draw_border: bool,
    pub draw_text: bool,
    /// Whether corners are rounded by `corner_radius`.
    pub rounded: bool,
    pub corner_radius: f64,
    pub opacity: f64,
    pub colors: ColorScheme,
    /// Tiled background textures; the inactive and pressed ones fall back to the active one.
    pub active_texture: Option<String>,
    pub inactive_texture: Option<String>,
    pub pressed_texture: Option<String>,
    pub font_name: String,
    pub font_size: f64,
    /// Horizontal offset of the text.
    pub text_indent: f64,
}

impl PanelStyle {
    pub fn from_config(config: &GuiConfig) -> PanelStyle {
        PanelStyle {
            visible: true,
            draw_background: true,
            draw_border: true,
            draw_text: true,
            rounded: true,
            corner_radius: config.corner_radius,
            opacity: config.window_opacity,
            colors: config.colors.clone(),
            active_texture: None,
            inactive_texture: None,
            pressed_texture: None,
            font_name: config.standard_font.clone(),
            font_size: config.standard_font_size,
            text_indent: 0.,
        }
    }
}

/// Which set of brushes is in use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Look {
    Active = 0,
    Inactive = 1,
    Pressed = 2,
}

/// Handles acquired at load time.
#[derive(Debug)]
struct Decor {
    font: FontHandle,
    backgrounds: [BrushHandle; 3],
    borders: [BrushHandle; 3],
    /// Active and inactive.
    fonts: [BrushHandle; 2],
    textures: [Option<TextureHandle>; 3],
    text: Option<TextLayoutHandle>,
    look: Look,
}

/// What a single frame draws with.
#[derive(Debug, Clone)]
struct Paint {
    background: BrushHandle,
    border: BrushHandle,
    font: BrushHandle,
    text: Option<TextLayoutHandle>,
}

impl Decor {
    fn load(assets: &SharedAssets, style: &PanelStyle) -> Result<Decor, AssetError> {
        let font = assets.load_font(&FontDescriptor::regular(&style.font_name, style.font_size))?;

        let active_texture = match &style.active_texture {
            Some(path) => Some(assets.load_texture(path)?),
            None => None,
        };
        let fallback = |path: &Option<String>| -> Result<Option<TextureHandle>, AssetError> {
            match path {
                Some(path) if active_texture.is_some() => Ok(Some(assets.load_texture(path)?)),
                _ => Ok(active_texture.clone()),
            }
        };
        let inactive_texture = fallback(&style.inactive_texture)?;
        let pressed_texture = fallback(&style.pressed_texture)?;

        let colors = &style.colors;
        let background = |texture: &Option<TextureHandle>, color| match texture {
            Some(texture) => assets.load_brush(BrushSource::Texture(texture.clone())),
            None => assets.load_brush(BrushSource::Solid(color)),
        };
        let solid = |color| assets.load_brush(BrushSource::Solid(color));

        Ok(Decor {
            font,
            backgrounds: [
                background(&active_texture, colors.active_background)?,
                background(&inactive_texture, colors.inactive_background)?,
                solid(colors.pressed_background)?,
            ],
            borders: [
                solid(colors.active_border)?,
                solid(colors.inactive_border)?,
                solid(colors.pressed_border)?,
            ],
            fonts: [solid(colors.font_active)?, solid(colors.font_inactive)?],
            textures: [active_texture, inactive_texture, pressed_texture],
            text: None,
            look: Look::Inactive,
        })
    }

    fn paint(&self) -> Paint {
        let i = self.look as usize;
        let font = match self.look {
            Look::Inactive => &self.fonts[1],
            Look::Active | Look::Pressed => &self.fonts[0],
        };
        Paint {
            background: self.backgrounds[i].clone(),
            border: self.borders[i].clone(),
            font: font.clone(),
            text: self.text.clone(),
        }
    }
}

/// A container that draws a background, a border and a line of text.
///
/// Panels are the base of every drawable widget. Brushes and fonts are acquired in
/// `load_content`; `update` picks the brushes for the current state and re-shapes the text when
/// it or the panel size changed.
#[derive(Debug)]
pub struct Panel {
    container: Container,
    style: Mutex<PanelStyle>,
    text: Mutex<String>,
    text_dirty: AtomicBool,
    pressed: AtomicBool,
    decor: Mutex<Option<Decor>>,
}

impl Panel {
    pub fn new(config: &GuiConfig) -> Arc<Panel> {
        Panel::with_layout(config, Panel::default_layout(config))
    }

    pub fn with_layout(config: &GuiConfig, layout: LayoutConfig) -> Arc<Panel> {
        Arc::new_cyclic(|me| Panel::embedded(me, config, layout))
    }

    /// Creates a panel to be embedded in the control behind `me`.
    pub fn embedded<C: Control>(me: &Weak<C>, config: &GuiConfig, layout: LayoutConfig) -> Panel {
        Panel {
            container: Container::embedded(me, layout),
            style: Mutex::new(PanelStyle::from_config(config)),
            text: Mutex::new(String::new()),
            text_dirty: AtomicBool::new(true),
            pressed: AtomicBool::new(false),
            decor: Mutex::new(None),
        }
    }

    /// Margin and padding from the configuration; no layout direction.
    pub fn default_layout(config: &GuiConfig) -> LayoutConfig {
        LayoutConfig {
            margin: config.margin,
            padding: config.padding,
            ..LayoutConfig::default()
        }
    }

    pub fn container(&self) -> &Container {
        &self.container
    }

    pub fn add_control(&self, control: ControlRef) -> Result<(), TreeError> {
        self.container.add_control(control)
    }

    pub fn remove_control(&self, control: &ControlRef) -> Result<(), TreeError> {
        self.container.remove_control(control)
    }

    pub fn style(&self) -> PanelStyle {
        self.style.lock().clone()
    }

    /// Edits the style. Brush and texture changes take effect at the next load.
    pub fn update_style(&self, f: impl FnOnce(&mut PanelStyle)) {
        f(&mut self.style.lock());
        self.text_dirty.store(true, Ordering::Release);
    }

    pub fn text(&self) -> String {
        self.text.lock().clone()
    }

    pub fn set_text(&self, text: &str) {
        *self.text.lock() = text.to_string();
        self.text_dirty.store(true, Ordering::Release);
    }

    pub fn is_pressed(&self) -> bool {
        self.pressed.load(Ordering::Acquire)
    }

    pub fn set_pressed(&self, pressed: bool) {
        self.pressed.store(pressed, Ordering::Release);
    }

    pub fn is_loaded(&self) -> bool {
        self.decor.lock().is_some()
    }

    /// The layout of the current text, if any has been shaped.
    pub fn text_layout(&self) -> Option<TextLayoutHandle> {
        self.decor.lock().as_ref().and_then(|decor| decor.text.clone())
    }

    fn current_look(&self) -> Look {
        if !self.base().is_active() {
            Look::Inactive
        } else if self.is_pressed() {
            Look::Pressed
        } else {
            Look::Active
        }
    }

    /// Shapes the text for the current size, outside of any lock.
    fn shape_text(&self, font: &FontHandle) -> Option<TextLayoutHandle> {
        let text = self.text();
        if text.is_empty() {
            return None;
        }
        let assets = self.container.assets()?;
        let size = self.base().size();
        match assets.make_text_layout(font, &text, size.x, size.y) {
            Ok(layout) => Some(layout),
            Err(err) => {
                tracing::warn!(control = %self.base().id(), "could not lay out text: {}", err);
                None
            }
        }
    }

    fn draw(
        &self,
        surface: &mut dyn RenderSurface,
        style: &PanelStyle,
        paint: &Paint,
    ) -> Result<(), RenderError> {
        let bounds = Rect::new(Point2::new(0., 0.), self.base().size());
        let radius = if style.rounded { style.corner_radius } else { 0. };
        if style.draw_background {
            surface.fill_rect(bounds, radius, &paint.background, style.opacity)?;
        }
        if style.draw_border {
            surface.stroke_rect(bounds, radius, &paint.border, style.opacity)?;
        }
        if let (true, Some(text)) = (style.draw_text, &paint.text) {
            surface.draw_text_layout(Point2::new(style.text_indent, 0.), text, &paint.font)?;
        }
        Ok(())
    }
}

impl Control for Panel {
    fn base(&self) -> &ControlBase {
        self.container.base()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn delegate(&self) -> Option<&dyn Control> {
        Some(&self.container)
    }

    fn update(&self, elapsed: Duration) {
        self.container.update(elapsed);

        let font = self.decor.lock().as_ref().map(|decor| decor.font.clone());
        let font = match font {
            Some(font) => font,
            None => return,
        };
        let text = if self.text_dirty.swap(false, Ordering::AcqRel) {
            Some(self.shape_text(&font))
        } else {
            None
        };
        let look = self.current_look();

        if let Some(decor) = self.decor.lock().as_mut() {
            if let Some(text) = text {
                decor.text = text;
            }
            decor.look = look;
        }
    }

    fn render(&self, surface: &mut dyn RenderSurface) -> Result<(), RenderError> {
        let style = self.style();
        if !style.visible {
            return Ok(());
        }
        let paint = match self.decor.lock().as_ref() {
            Some(decor) => decor.paint(),
            None => return Err(RenderError::NotLoaded(self.base().id())),
        };

        let size = self.base().size();
        surface.set_transform(self.base().transform());
        surface.push_clip(Rect::from_xywh(-1., -1., size.x + 2., size.y + 2.));
        let result = self.draw(surface, &style, &paint);
        if result.is_ok() {
            self.container.render_children(surface);
        }
        surface.pop_clip();
        result
    }

    fn load_content(&self, assets: &SharedAssets) -> Result<(), ContentError> {
        self.container.load_children(assets)?;
        let style = self.style();
        match Decor::load(assets, &style) {
            Ok(decor) => {
                *self.decor.lock() = Some(decor);
                self.text_dirty.store(true, Ordering::Release);
                Ok(())
            }
            Err(err) => {
                let _ = self.container.unload_children();
                Err(err.into())
            }
        }
    }

    fn unload_content(&self) -> Result<(), ContentError> {
        self.decor.lock().take();
        self.container.unload_children()
    }

    fn on_resized(&self) {
        self.text_dirty.store(true, Ordering::Release);
        self.container.on_resized();
    }

    fn on_closed(&self) {
        self.decor.lock().take();
        self.container.on_closed();
    }
}
