use crate::assets::{SharedAssets, TextureHandle};
use crate::control::{Control, ControlBase};
use crate::error::{ContentError, RenderError};
use crate::rect::Rect;
use crate::surface::RenderSurface;
use cgmath::Point2;
use core::any::Any;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A bitmap loaded from a path.
#[derive(Debug)]
pub struct Image {
    base: ControlBase,
    path: String,
    texture: Mutex<Option<TextureHandle>>,
    opacity: Mutex<f64>,
    resize_to_image: AtomicBool,
}

impl Image {
    pub fn new(path: &str) -> Arc<Image> {
        Arc::new_cyclic(|me| Image {
            base: ControlBase::new(me),
            path: path.to_string(),
            texture: Mutex::new(None),
            opacity: Mutex::new(1.),
            resize_to_image: AtomicBool::new(true),
        })
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn opacity(&self) -> f64 {
        *self.opacity.lock()
    }

    pub fn set_opacity(&self, opacity: f64) {
        *self.opacity.lock() = opacity.max(0.).min(1.);
    }

    /// Whether loading resizes the control to the bitmap's size. On by default.
    pub fn set_resize_to_image(&self, resize: bool) {
        self.resize_to_image.store(resize, Ordering::Release);
    }

    pub fn is_loaded(&self) -> bool {
        self.texture.lock().is_some()
    }
}

impl Control for Image {
    fn base(&self) -> &ControlBase {
        &self.base
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn render(&self, surface: &mut dyn RenderSurface) -> Result<(), RenderError> {
        let texture = match &*self.texture.lock() {
            Some(texture) => texture.clone(),
            None => return Err(RenderError::NotLoaded(self.base.id())),
        };
        surface.set_transform(self.base.transform());
        surface.draw_bitmap(
            &texture,
            Rect::new(Point2::new(0., 0.), self.base.size()),
            self.opacity(),
        )
    }

    fn load_content(&self, assets: &SharedAssets) -> Result<(), ContentError> {
        let texture = assets.load_texture(&self.path)?;
        let size = texture.size;
        *self.texture.lock() = Some(texture);
        if self.resize_to_image.load(Ordering::Acquire) {
            self.set_size(size);
        }
        Ok(())
    }

    fn unload_content(&self) -> Result<(), ContentError> {
        self.texture.lock().take();
        Ok(())
    }

    fn on_closed(&self) {
        self.texture.lock().take();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::Container;
    use crate::layout::{LayoutConfig, LayoutDirection};
    use crate::testing::{Call, MemoryAssets, RecordingSurface};
    use cgmath::Vector2;

    #[test]
    fn loading_resizes_to_the_bitmap() {
        let image = Image::new("logo.png");
        let assets = MemoryAssets::new();
        assets.set_texture_size("logo.png", Vector2::new(64., 48.));
        let shared: SharedAssets = assets;
        image.load_content(&shared).unwrap();
        assert_eq!(image.base().size(), Vector2::new(64., 48.));

        let mut surface = RecordingSurface::default();
        image.render(&mut surface).unwrap();
        assert_eq!(
            surface
                .calls
                .iter()
                .filter(|c| matches!(c, Call::Bitmap(_)))
                .count(),
            1
        );
    }

    #[test]
    fn fixed_size_images_keep_their_size() {
        let image = Image::new("logo.png");
        image.set_resize_to_image(false);
        image.set_size(Vector2::new(20., 20.));
        image.load_content(&MemoryAssets::shared()).unwrap();
        assert_eq!(image.base().size(), Vector2::new(20., 20.));
    }

    #[test]
    fn loading_into_a_wrapping_container_resizes_the_container() {
        let container = Container::new(LayoutConfig {
            direction: LayoutDirection::Vertical,
            ..LayoutConfig::default()
        });
        let image = Image::new("logo.png");
        container.add_control(image.clone()).unwrap();
        container.load_content(&MemoryAssets::shared()).unwrap();
        // default 32x32 bitmap plus margins
        assert_eq!(container.base().size(), Vector2::new(48., 48.));
    }

    #[test]
    fn unloaded_image_cannot_render() {
        let image = Image::new("logo.png");
        let mut surface = RecordingSurface::default();
        assert!(matches!(
            image.render(&mut surface),
            Err(RenderError::NotLoaded(_))
        ));
        image.load_content(&MemoryAssets::shared()).unwrap();
        image.unload_content().unwrap();
        assert!(!image.is_loaded());
    }
}
