//! The control node contract.
//!
//! Every node in a control tree is an `Arc<dyn Control>`. Concrete controls embed a
//! [`ControlBase`] holding identity, geometry and the parent back-reference, and are constructed
//! with [`Arc::new_cyclic`] so the base knows its own owner.
//!
//! Invalidation is explicit: [`Control::set_size`], [`Control::set_position`] and
//! [`Control::close`] call the control's own hooks and then notify the parent directly.

use crate::assets::SharedAssets;
use crate::container::Container;
use crate::error::{ContentError, RenderError};
use crate::events::{DragState, Intent};
use crate::rect::{self, Rect};
use crate::surface::RenderSurface;
use cgmath::{Matrix3, Point2, SquareMatrix, Vector2};
use core::any::Any;
use core::fmt;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;
use uuid::Uuid;

/// Controls never get smaller than this in either dimension.
pub const MIN_SIZE: f64 = 8.;

/// An owning reference to a control.
pub type ControlRef = Arc<dyn Control>;

/// A non-owning reference to a control, used for parent links.
pub type WeakControlRef = Weak<dyn Control>;

/// A unique identifier for a control.
///
/// (this is just a UUID)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ControlId(Uuid);

impl ControlId {
    pub(crate) fn new() -> ControlId {
        ControlId(Uuid::new_v4())
    }
}

impl fmt::Display for ControlId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VerticalAlignment {
    None,
    Top,
    Center,
    Bottom,
}

impl Default for VerticalAlignment {
    fn default() -> Self {
        VerticalAlignment::Center
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HorizontalAlignment {
    None,
    Left,
    Center,
    Right,
}

impl Default for HorizontalAlignment {
    fn default() -> Self {
        HorizontalAlignment::Center
    }
}

/// Whether a child stretches to its container's inner extent during layout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Fill {
    pub horizontal: bool,
    pub vertical: bool,
}

impl Fill {
    pub const NONE: Fill = Fill {
        horizontal: false,
        vertical: false,
    };
    pub const HORIZONTAL: Fill = Fill {
        horizontal: true,
        vertical: false,
    };
    pub const VERTICAL: Fill = Fill {
        horizontal: false,
        vertical: true,
    };
    pub const BOTH: Fill = Fill {
        horizontal: true,
        vertical: true,
    };
}

#[derive(Debug, Clone, Copy)]
struct Geometry {
    position: Point2<f64>,
    size: Vector2<f64>,
    min_size: Vector2<f64>,
    max_size: Vector2<f64>,
    vertical: VerticalAlignment,
    horizontal: HorizontalAlignment,
    fill: Fill,
    /// Transform as of the last update.
    transform: Matrix3<f64>,
}

/// Sets an atomic flag for the lifetime of the guard.
pub(crate) struct FlagGuard<'a>(&'a AtomicBool);

impl<'a> FlagGuard<'a> {
    /// Returns None if the flag is already set.
    pub(crate) fn acquire(flag: &'a AtomicBool) -> Option<FlagGuard<'a>> {
        if flag.swap(true, Ordering::AcqRel) {
            None
        } else {
            Some(FlagGuard(flag))
        }
    }
}

impl<'a> Drop for FlagGuard<'a> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// State shared by every control.
#[derive(Debug)]
pub struct ControlBase {
    id: ControlId,
    me: WeakControlRef,
    parent: Mutex<Option<WeakControlRef>>,
    geometry: Mutex<Geometry>,
    /// Only meaningful on roots.
    active: AtomicBool,
    /// Only meaningful on roots.
    drag: Mutex<DragState>,
    closed: AtomicBool,
    resizing: AtomicBool,
}

impl ControlBase {
    /// Creates a detached base for the control behind `me`.
    ///
    /// `me` is the weak reference handed out by [`Arc::new_cyclic`].
    pub fn new<C: Control>(me: &Weak<C>) -> ControlBase {
        let me: WeakControlRef = me.clone();
        ControlBase {
            id: ControlId::new(),
            me,
            parent: Mutex::new(None),
            geometry: Mutex::new(Geometry {
                position: Point2::new(0., 0.),
                size: Vector2::new(MIN_SIZE, MIN_SIZE),
                min_size: Vector2::new(MIN_SIZE, MIN_SIZE),
                max_size: Vector2::new(f64::INFINITY, f64::INFINITY),
                vertical: VerticalAlignment::default(),
                horizontal: HorizontalAlignment::default(),
                fill: Fill::NONE,
                transform: Matrix3::identity(),
            }),
            active: AtomicBool::new(false),
            drag: Mutex::new(DragState::Idle),
            closed: AtomicBool::new(false),
            resizing: AtomicBool::new(false),
        }
    }

    pub fn id(&self) -> ControlId {
        self.id
    }

    /// The control owning this base, unless it is being dropped.
    pub fn me(&self) -> Option<ControlRef> {
        self.me.upgrade()
    }

    pub(crate) fn me_weak(&self) -> WeakControlRef {
        self.me.clone()
    }

    pub fn parent(&self) -> Option<ControlRef> {
        self.parent.lock().as_ref().and_then(Weak::upgrade)
    }

    pub fn has_parent(&self) -> bool {
        self.parent().is_some()
    }

    pub(crate) fn set_parent(&self, parent: Option<WeakControlRef>) {
        *self.parent.lock() = parent;
    }

    /// Runs `f` on the base of the owning root (the ancestor without a parent).
    pub fn with_root<R>(&self, f: impl FnOnce(&ControlBase) -> R) -> R {
        match self.parent() {
            Some(parent) => parent.base().with_root(f),
            None => f(self),
        }
    }

    /// The owning root. A detached control is its own root.
    pub fn root(&self) -> Option<ControlRef> {
        self.with_root(|root| root.me())
    }

    /// Returns true if `ancestor` is this control or one of its ancestors.
    pub fn is_or_descends_from(&self, ancestor: ControlId) -> bool {
        if self.id == ancestor {
            return true;
        }
        let mut cursor = self.parent();
        while let Some(control) = cursor {
            if control.id() == ancestor {
                return true;
            }
            cursor = control.base().parent();
        }
        false
    }

    pub fn is_active(&self) -> bool {
        self.with_root(|root| root.active.load(Ordering::Acquire))
    }

    pub fn set_active(&self, active: bool) {
        self.with_root(|root| root.active.store(active, Ordering::Release))
    }

    pub fn drag_state(&self) -> DragState {
        self.with_root(|root| *root.drag.lock())
    }

    pub fn set_drag_state(&self, state: DragState) {
        self.with_root(|root| *root.drag.lock() = state)
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Marks the control closed; returns false if it already was.
    fn mark_closed(&self) -> bool {
        !self.closed.swap(true, Ordering::AcqRel)
    }

    pub fn position(&self) -> Point2<f64> {
        self.geometry.lock().position
    }

    pub fn size(&self) -> Vector2<f64> {
        self.geometry.lock().size
    }

    pub fn min_size(&self) -> Vector2<f64> {
        self.geometry.lock().min_size
    }

    pub fn max_size(&self) -> Vector2<f64> {
        self.geometry.lock().max_size
    }

    /// The bounds in the parent's coordinate system.
    pub fn frame(&self) -> Rect {
        let geometry = self.geometry.lock();
        Rect::new(geometry.position, geometry.size)
    }

    /// Sets the minimum size. It never goes below [`MIN_SIZE`].
    pub fn set_min_size(&self, min_size: Vector2<f64>) {
        let mut geometry = self.geometry.lock();
        geometry.min_size = Vector2::new(min_size.x.max(MIN_SIZE), min_size.y.max(MIN_SIZE));
        geometry.max_size.x = geometry.max_size.x.max(geometry.min_size.x);
        geometry.max_size.y = geometry.max_size.y.max(geometry.min_size.y);
    }

    /// Sets the maximum size. It never goes below the minimum size.
    pub fn set_max_size(&self, max_size: Vector2<f64>) {
        let mut geometry = self.geometry.lock();
        geometry.max_size = Vector2::new(
            max_size.x.max(geometry.min_size.x),
            max_size.y.max(geometry.min_size.y),
        );
    }

    pub fn vertical_alignment(&self) -> VerticalAlignment {
        self.geometry.lock().vertical
    }

    pub fn set_vertical_alignment(&self, alignment: VerticalAlignment) {
        self.geometry.lock().vertical = alignment;
    }

    pub fn horizontal_alignment(&self) -> HorizontalAlignment {
        self.geometry.lock().horizontal
    }

    pub fn set_horizontal_alignment(&self, alignment: HorizontalAlignment) {
        self.geometry.lock().horizontal = alignment;
    }

    pub fn fill(&self) -> Fill {
        self.geometry.lock().fill
    }

    pub fn set_fill(&self, fill: Fill) {
        self.geometry.lock().fill = fill;
    }

    /// Stores a clamped size; returns true if it changed.
    fn store_size(&self, size: Vector2<f64>) -> bool {
        let mut geometry = self.geometry.lock();
        let size = Vector2::new(
            size.x.max(geometry.min_size.x).min(geometry.max_size.x),
            size.y.max(geometry.min_size.y).min(geometry.max_size.y),
        );
        if size == geometry.size {
            false
        } else {
            geometry.size = size;
            true
        }
    }

    fn store_position(&self, position: Point2<f64>) -> bool {
        let mut geometry = self.geometry.lock();
        if position == geometry.position {
            false
        } else {
            geometry.position = position;
            true
        }
    }

    /// Composes every ancestor's transform with this control's position.
    pub fn compute_transform(&self) -> Matrix3<f64> {
        let local = rect::translation(rect::offset_of(self.position()));
        match self.parent() {
            Some(parent) => parent.base().compute_transform() * local,
            None => local,
        }
    }

    /// Recomputes the cached transform from the parent chain.
    pub fn refresh_transform(&self) {
        let transform = self.compute_transform();
        self.geometry.lock().transform = transform;
    }

    /// The transform as of the last update.
    pub fn transform(&self) -> Matrix3<f64> {
        self.geometry.lock().transform
    }

    /// The current bounds in screen coordinates.
    pub fn screen_rect(&self) -> Rect {
        Rect::new(rect::translation_of(&self.compute_transform()), self.size())
    }

    /// Converts a screen point to this control's coordinate system.
    pub fn to_local(&self, point: Point2<f64>) -> Point2<f64> {
        let origin = rect::translation_of(&self.compute_transform());
        Point2::new(point.x - origin.x, point.y - origin.y)
    }
}

/// A node in the control tree.
///
/// Implementors that wrap another control (e.g. a button wrapping a panel) return it from
/// [`Control::delegate`]; every hook they don't override then forwards to it.
pub trait Control: Any + fmt::Debug + Send + Sync {
    fn base(&self) -> &ControlBase;

    /// For downcasting.
    fn as_any(&self) -> &dyn Any;

    /// The wrapped control, if any.
    fn delegate(&self) -> Option<&dyn Control> {
        None
    }

    /// The child list, if this control has one.
    fn as_container(&self) -> Option<&Container> {
        self.delegate().and_then(|inner| inner.as_container())
    }

    /// Advances timers and refreshes the transform from the parent chain.
    fn update(&self, elapsed: Duration) {
        match self.delegate() {
            Some(inner) => inner.update(elapsed),
            None => self.base().refresh_transform(),
        }
    }

    fn render(&self, surface: &mut dyn RenderSurface) -> Result<(), RenderError> {
        match self.delegate() {
            Some(inner) => inner.render(surface),
            None => Ok(()),
        }
    }

    /// Returns true if the intent was handled.
    fn process_intent(&self, intent: &Intent) -> bool {
        match self.delegate() {
            Some(inner) => inner.process_intent(intent),
            None => false,
        }
    }

    fn load_content(&self, assets: &SharedAssets) -> Result<(), ContentError> {
        match self.delegate() {
            Some(inner) => inner.load_content(assets),
            None => Ok(()),
        }
    }

    fn unload_content(&self) -> Result<(), ContentError> {
        match self.delegate() {
            Some(inner) => inner.unload_content(),
            None => Ok(()),
        }
    }

    /// Called after the size changed.
    fn on_resized(&self) {
        if let Some(inner) = self.delegate() {
            inner.on_resized();
        }
    }

    /// Called after the position changed.
    fn on_moved(&self) {
        if let Some(inner) = self.delegate() {
            inner.on_moved();
        }
    }

    /// Called once, when the control closes. Releases resources and closes children.
    fn on_closed(&self) {
        if let Some(inner) = self.delegate() {
            inner.on_closed();
        }
    }

    /// Called when a child's size changed.
    fn child_resized(&self, child: ControlId) {
        if let Some(inner) = self.delegate() {
            inner.child_resized(child);
        }
    }

    /// Called when a child closed; the child should be detached.
    fn child_closed(&self, child: &ControlRef) {
        if let Some(inner) = self.delegate() {
            inner.child_closed(child);
        }
    }

    fn id(&self) -> ControlId {
        self.base().id()
    }

    fn is_closed(&self) -> bool {
        self.base().is_closed()
    }

    /// Sets the size (clamped to the min/max size) and notifies this control and its parent.
    ///
    /// While a resize notification for this control is running, further calls only store the size.
    fn set_size(&self, size: Vector2<f64>) {
        let base = self.base();
        if !base.store_size(size) {
            return;
        }
        let _guard = match FlagGuard::acquire(&base.resizing) {
            Some(guard) => guard,
            None => return,
        };
        self.on_resized();
        if let Some(parent) = base.parent() {
            parent.child_resized(base.id());
        }
    }

    fn set_position(&self, position: Point2<f64>) {
        if self.base().store_position(position) {
            self.on_moved();
        }
    }

    fn move_by(&self, delta: Vector2<f64>) {
        self.set_position(self.base().position() + delta);
    }

    /// Closes the control. Only the first call has any effect.
    fn close(&self) {
        let base = self.base();
        if !base.mark_closed() {
            return;
        }
        self.on_closed();
        if let (Some(parent), Some(me)) = (base.parent(), base.me()) {
            parent.child_closed(&me);
        }
    }
}
