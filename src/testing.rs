//! Test doubles for the collaborator traits.

use crate::assets::{
    AssetId, AssetProvider, Brush, BrushHandle, BrushSource, Font, FontDescriptor, FontHandle,
    SharedAssets, TextLayout, TextLayoutHandle, Texture, TextureHandle,
};
use crate::color::Color;
use crate::control::{Control, ControlBase};
use crate::error::{AssetError, ContentError, RenderError};
use crate::events::{InputEvent, InputSource, Intent};
use crate::rect::{self, Rect};
use crate::surface::RenderSurface;
use cgmath::{Matrix3, Point2, Vector2};
use core::any::Any;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// A recorded draw call.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
    BeginFrame,
    EndFrame,
    /// The translation part of the transform.
    Transform(Point2<f64>),
    Fill(AssetId),
    Stroke(AssetId),
    Text(String),
    Bitmap(AssetId),
    PushClip(Rect),
    PopClip,
}

/// Records every call instead of drawing.
#[derive(Debug, Default)]
pub(crate) struct RecordingSurface {
    pub calls: Vec<Call>,
}

impl RecordingSurface {
    /// Brush ids of every fill, in order.
    pub fn fills(&self) -> Vec<AssetId> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                Call::Fill(id) => Some(*id),
                _ => None,
            })
            .collect()
    }

    pub fn texts(&self) -> Vec<String> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                Call::Text(text) => Some(text.clone()),
                _ => None,
            })
            .collect()
    }
}

impl RenderSurface for RecordingSurface {
    fn begin_frame(&mut self) -> Result<(), RenderError> {
        self.calls.push(Call::BeginFrame);
        Ok(())
    }

    fn end_frame(&mut self) -> Result<(), RenderError> {
        self.calls.push(Call::EndFrame);
        Ok(())
    }

    fn set_transform(&mut self, transform: Matrix3<f64>) {
        self.calls
            .push(Call::Transform(rect::translation_of(&transform)));
    }

    fn fill_rect(
        &mut self,
        _rect: Rect,
        _corner_radius: f64,
        brush: &BrushHandle,
        _opacity: f64,
    ) -> Result<(), RenderError> {
        self.calls.push(Call::Fill(brush.id));
        Ok(())
    }

    fn stroke_rect(
        &mut self,
        _rect: Rect,
        _corner_radius: f64,
        brush: &BrushHandle,
        _opacity: f64,
    ) -> Result<(), RenderError> {
        self.calls.push(Call::Stroke(brush.id));
        Ok(())
    }

    fn draw_text_layout(
        &mut self,
        _origin: Point2<f64>,
        layout: &TextLayoutHandle,
        _brush: &BrushHandle,
    ) -> Result<(), RenderError> {
        self.calls.push(Call::Text(layout.text.clone()));
        Ok(())
    }

    fn draw_bitmap(
        &mut self,
        texture: &TextureHandle,
        _rect: Rect,
        _opacity: f64,
    ) -> Result<(), RenderError> {
        self.calls.push(Call::Bitmap(texture.id));
        Ok(())
    }

    fn push_clip(&mut self, rect: Rect) {
        self.calls.push(Call::PushClip(rect));
    }

    fn pop_clip(&mut self) {
        self.calls.push(Call::PopClip);
    }
}

/// An in-memory asset provider. Paths registered with `fail` report `NotFound`.
#[derive(Debug, Default)]
pub(crate) struct MemoryAssets {
    next_id: AtomicU64,
    missing: Mutex<HashSet<String>>,
    texture_sizes: Mutex<HashMap<String, Vector2<f64>>>,
}

impl MemoryAssets {
    pub fn new() -> Arc<MemoryAssets> {
        Arc::new(MemoryAssets {
            next_id: AtomicU64::new(1000),
            ..MemoryAssets::default()
        })
    }

    pub fn shared() -> SharedAssets {
        MemoryAssets::new()
    }

    pub fn fail(&self, name: &str) {
        self.missing.lock().insert(name.to_string());
    }

    pub fn set_texture_size(&self, path: &str, size: Vector2<f64>) {
        self.texture_sizes.lock().insert(path.to_string(), size);
    }

    fn next(&self) -> AssetId {
        AssetId(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    fn check(&self, name: &str) -> Result<(), AssetError> {
        if self.missing.lock().contains(name) {
            Err(AssetError::NotFound(name.to_string()))
        } else {
            Ok(())
        }
    }
}

impl AssetProvider for MemoryAssets {
    fn load_texture(&self, path: &str) -> Result<TextureHandle, AssetError> {
        self.check(path)?;
        let size = self
            .texture_sizes
            .lock()
            .get(path)
            .copied()
            .unwrap_or_else(|| Vector2::new(32., 32.));
        Ok(Arc::new(Texture {
            id: self.next(),
            size,
        }))
    }

    fn load_font(&self, descriptor: &FontDescriptor) -> Result<FontHandle, AssetError> {
        self.check(&descriptor.name)?;
        Ok(Arc::new(Font {
            id: self.next(),
            descriptor: descriptor.clone(),
        }))
    }

    fn load_brush(&self, source: BrushSource) -> Result<BrushHandle, AssetError> {
        Ok(Arc::new(Brush {
            id: self.next(),
            source,
        }))
    }

    fn make_text_layout(
        &self,
        font: &FontHandle,
        text: &str,
        max_width: f64,
        max_height: f64,
    ) -> Result<TextLayoutHandle, AssetError> {
        let size = font.descriptor.size;
        let width = (text.chars().count() as f64 * size * 0.5).min(max_width);
        Ok(Arc::new(TextLayout {
            id: self.next(),
            text: text.to_string(),
            bounds: Rect::from_xywh(0., 0., width, size.min(max_height)),
        }))
    }
}

/// A leaf control that records what happens to it.
#[derive(Debug)]
pub(crate) struct Stub {
    base: ControlBase,
    brush: BrushHandle,
    closed: AtomicUsize,
    resized: AtomicUsize,
    renders: AtomicUsize,
    loaded: AtomicBool,
    fail_render: AtomicBool,
    fail_load: AtomicBool,
    handles: AtomicBool,
    load_delay: Mutex<Duration>,
    intents: Mutex<Vec<Intent>>,
}

impl Stub {
    pub fn new() -> Arc<Stub> {
        Stub::tagged(0)
    }

    /// A stub whose fills use the brush id `tag`.
    pub fn tagged(tag: u64) -> Arc<Stub> {
        Arc::new_cyclic(|me| Stub {
            base: ControlBase::new(me),
            brush: Arc::new(Brush {
                id: AssetId(tag),
                source: BrushSource::Solid(Color::BLACK),
            }),
            closed: AtomicUsize::new(0),
            resized: AtomicUsize::new(0),
            renders: AtomicUsize::new(0),
            loaded: AtomicBool::new(false),
            fail_render: AtomicBool::new(false),
            fail_load: AtomicBool::new(false),
            handles: AtomicBool::new(false),
            load_delay: Mutex::new(Duration::default()),
            intents: Mutex::new(Vec::new()),
        })
    }

    pub fn with_size(size: Vector2<f64>) -> Arc<Stub> {
        let stub = Stub::new();
        stub.set_size(size);
        stub
    }

    pub fn closed_count(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }

    pub fn resized_count(&self) -> usize {
        self.resized.load(Ordering::SeqCst)
    }

    pub fn render_count(&self) -> usize {
        self.renders.load(Ordering::SeqCst)
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded.load(Ordering::SeqCst)
    }

    pub fn fail_render(&self, fail: bool) {
        self.fail_render.store(fail, Ordering::SeqCst);
    }

    pub fn fail_load(&self, fail: bool) {
        self.fail_load.store(fail, Ordering::SeqCst);
    }

    /// Makes `load_content` block for `delay` before it succeeds.
    pub fn slow_load(&self, delay: Duration) {
        *self.load_delay.lock() = delay;
    }

    pub fn handle_intents(&self, handle: bool) {
        self.handles.store(handle, Ordering::SeqCst);
    }

    pub fn intents(&self) -> Vec<Intent> {
        self.intents.lock().clone()
    }
}

impl Control for Stub {
    fn base(&self) -> &ControlBase {
        &self.base
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn render(&self, surface: &mut dyn RenderSurface) -> Result<(), RenderError> {
        self.renders.fetch_add(1, Ordering::SeqCst);
        if self.fail_render.load(Ordering::SeqCst) {
            return Err(RenderError::Surface("stub failure".to_string()));
        }
        surface.set_transform(self.base.transform());
        surface.fill_rect(
            Rect::new(Point2::new(0., 0.), self.base.size()),
            0.,
            &self.brush,
            1.,
        )
    }

    fn process_intent(&self, intent: &Intent) -> bool {
        self.intents.lock().push(*intent);
        self.handles.load(Ordering::SeqCst)
    }

    fn load_content(&self, _assets: &SharedAssets) -> Result<(), ContentError> {
        if self.fail_load.load(Ordering::SeqCst) {
            return Err(AssetError::NotFound("stub".to_string()).into());
        }
        let delay = *self.load_delay.lock();
        if delay > Duration::default() {
            thread::sleep(delay);
        }
        self.loaded.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn unload_content(&self) -> Result<(), ContentError> {
        self.loaded.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn on_resized(&self) {
        self.resized.fetch_add(1, Ordering::SeqCst);
    }

    fn on_closed(&self) {
        self.closed.fetch_add(1, Ordering::SeqCst);
        self.loaded.store(false, Ordering::SeqCst);
    }
}

/// Replays a fixed list of events.
#[derive(Debug, Default)]
pub(crate) struct ScriptedInput {
    pub events: VecDeque<InputEvent>,
}

impl ScriptedInput {
    pub fn new(events: impl IntoIterator<Item = InputEvent>) -> ScriptedInput {
        ScriptedInput {
            events: events.into_iter().collect(),
        }
    }
}

impl InputSource for ScriptedInput {
    fn poll_event(&mut self) -> Option<InputEvent> {
        self.events.pop_front()
    }
}
