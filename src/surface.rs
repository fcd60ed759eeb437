//! Traits for render backends.

use crate::assets::{BrushHandle, TextLayoutHandle, TextureHandle};
use crate::error::RenderError;
use crate::rect::Rect;
use cgmath::{Matrix3, Point2};

/// A render target.
///
/// Controls only issue primitive draw calls in their local coordinate system after setting their
/// transform; device and swap-chain management stays with the implementor.
pub trait RenderSurface {
    fn begin_frame(&mut self) -> Result<(), RenderError>;

    fn end_frame(&mut self) -> Result<(), RenderError>;

    /// Sets the transform applied to subsequent draw calls.
    fn set_transform(&mut self, transform: Matrix3<f64>);

    fn fill_rect(
        &mut self,
        rect: Rect,
        corner_radius: f64,
        brush: &BrushHandle,
        opacity: f64,
    ) -> Result<(), RenderError>;

    fn stroke_rect(
        &mut self,
        rect: Rect,
        corner_radius: f64,
        brush: &BrushHandle,
        opacity: f64,
    ) -> Result<(), RenderError>;

    fn draw_text_layout(
        &mut self,
        origin: Point2<f64>,
        layout: &TextLayoutHandle,
        brush: &BrushHandle,
    ) -> Result<(), RenderError>;

    fn draw_bitmap(
        &mut self,
        texture: &TextureHandle,
        rect: Rect,
        opacity: f64,
    ) -> Result<(), RenderError>;

    /// Pushes an axis-aligned clip in the current coordinate system.
    fn push_clip(&mut self, rect: Rect);

    fn pop_clip(&mut self);
}
