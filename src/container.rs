//! Controls with children.
//!
//! A [`Container`] owns an ordered list of child controls. List order is both layout order and
//! intent order. The list sits behind a [`ListLock`]; every walk over it works on a snapshot so
//! no child code ever runs inside the critical section.

use crate::assets::SharedAssets;
use crate::control::{Control, ControlBase, ControlId, ControlRef, FlagGuard};
use crate::error::{ContentError, LockError, RenderError, TreeError};
use crate::events::Intent;
use crate::layout::{self, Item, LayoutConfig, ResizePolicy};
use crate::lock::ListLock;
use crate::surface::RenderSurface;
use core::any::Any;
use parking_lot::Mutex;
use std::mem;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Weak};
use std::time::Duration;

#[derive(Debug)]
pub struct Container {
    base: ControlBase,
    children: ListLock<Vec<ControlRef>>,
    layout: Mutex<LayoutConfig>,
    aligning: AtomicBool,
    /// The provider this container was loaded with, if it is loaded.
    assets: Mutex<Option<SharedAssets>>,
}

impl Container {
    /// Creates a standalone container.
    pub fn new(layout: LayoutConfig) -> Arc<Container> {
        Arc::new_cyclic(|me| Container::embedded(me, layout))
    }

    /// Creates a container to be embedded in the control behind `me`.
    ///
    /// The embedding control should return it from [`Control::delegate`].
    pub fn embedded<C: Control>(me: &Weak<C>, layout: LayoutConfig) -> Container {
        Container {
            base: ControlBase::new(me),
            children: ListLock::new(Vec::new()),
            layout: Mutex::new(layout),
            aligning: AtomicBool::new(false),
            assets: Mutex::new(None),
        }
    }

    pub fn layout(&self) -> LayoutConfig {
        *self.layout.lock()
    }

    /// Replaces the layout configuration and lays out the children again.
    pub fn set_layout(&self, layout: LayoutConfig) {
        *self.layout.lock() = layout;
        self.relayout();
    }

    /// Returns a snapshot of the children.
    pub fn children(&self) -> Result<Vec<ControlRef>, LockError> {
        self.children.snapshot("children")
    }

    pub fn child_count(&self) -> Result<usize, LockError> {
        self.children.with("child_count", |list| list.len())
    }

    pub fn contains(&self, id: ControlId) -> Result<bool, LockError> {
        self.children
            .with("contains", |list| list.iter().any(|child| child.id() == id))
    }

    pub fn is_loaded(&self) -> bool {
        self.assets.lock().is_some()
    }

    /// The provider this container was loaded with.
    pub fn assets(&self) -> Option<SharedAssets> {
        self.assets.lock().clone()
    }

    /// Appends a control, parents it, loads it if this container is loaded, and lays out.
    ///
    /// A control that is attached elsewhere is detached from its old parent first. If the control
    /// is this container or one of its ancestors, nothing changes and `InvalidHierarchy` is
    /// returned. If the list lock can't be acquired, the control is closed.
    pub fn add_control(&self, control: ControlRef) -> Result<(), TreeError> {
        let child = control.id();
        let parent = self.base.id();
        if self.base.is_or_descends_from(child) {
            tracing::warn!(control = %child, "rejected adding a control to its own subtree");
            return Err(TreeError::InvalidHierarchy { child, parent });
        }

        if let Some(previous) = control.base().parent() {
            match previous.as_container() {
                Some(container) => {
                    if let Err(err) = container.remove_control(&control) {
                        tracing::warn!(control = %child, "detaching from previous parent: {}", err);
                    }
                }
                None => control.base().set_parent(None),
            }
        }

        if let Err(err) = self.children.with("add_control", |list| list.push(control.clone())) {
            tracing::warn!(control = %child, "discarding control: {}", err);
            control.close();
            return Err(err.into());
        }
        control.base().set_parent(Some(self.base.me_weak()));

        let assets = self.assets.lock().clone();
        if let Some(assets) = assets {
            if let Err(err) = control.load_content(&assets) {
                tracing::error!(control = %child, "failed to load added control: {}", err);
                let _ = self.remove_control(&control);
                control.close();
                return Err(err.into());
            }
        }

        tracing::debug!(control = %child, parent = %parent, "control added");
        self.relayout();
        Ok(())
    }

    /// Detaches a child without closing it. Does not lay out.
    pub fn remove_control(&self, control: &ControlRef) -> Result<(), TreeError> {
        let child = control.id();
        let parent = self.base.id();
        let owned = control
            .base()
            .parent()
            .map_or(false, |owner| owner.id() == parent);
        if !owned {
            tracing::warn!(control = %child, container = %parent, "not a child of this container");
            return Err(TreeError::StaleRemoval { child, parent });
        }

        let removed = self.children.with("remove_control", |list| {
            let before = list.len();
            list.retain(|c| c.id() != child);
            list.len() != before
        })?;
        if !removed {
            tracing::warn!(control = %child, container = %parent, "child is not in the list");
            return Err(TreeError::StaleRemoval { child, parent });
        }
        control.base().set_parent(None);
        tracing::debug!(control = %child, parent = %parent, "control removed");
        Ok(())
    }

    /// Positions the children and resizes the owning control per the layout configuration.
    ///
    /// Does nothing if a layout pass for this container is already running.
    pub fn relayout(&self) {
        let _guard = match FlagGuard::acquire(&self.aligning) {
            Some(guard) => guard,
            None => return,
        };
        let children = match self.children.snapshot("relayout") {
            Ok(children) => children,
            Err(err) => {
                tracing::warn!("skipping layout: {}", err);
                return;
            }
        };
        if children.is_empty() {
            return;
        }

        let config = self.layout();
        let size = self.base.size();
        let mut items: Vec<Item> = children
            .iter()
            .map(|child| {
                let base = child.base();
                Item {
                    position: base.position(),
                    size: base.size(),
                    horizontal: base.horizontal_alignment(),
                    fill: base.fill(),
                }
            })
            .collect();

        layout::apply_fill(&mut items, size, &config);
        for (child, item) in children.iter().zip(items.iter_mut()) {
            child.set_size(item.size);
            // children clamp to their own limits
            item.size = child.base().size();
        }

        layout::arrange(&mut items, size.x, &config);
        for (child, item) in children.iter().zip(&items) {
            child.set_position(item.position);
        }

        let fitted = layout::fit_size(
            &items,
            size,
            self.base.min_size(),
            self.base.max_size(),
            &config,
        );
        if let (Some(fitted), Some(outer)) = (fitted, self.base.me()) {
            outer.set_size(fitted);
        }
    }

    /// Updates every child.
    pub fn update_children(&self, elapsed: Duration) {
        let children = match self.children.snapshot("update") {
            Ok(children) => children,
            Err(err) => {
                tracing::warn!(container = %self.base.id(), "skipping update: {}", err);
                return;
            }
        };
        for child in children {
            child.update(elapsed);
        }
    }

    /// Renders every child in list order. A child that fails is logged and skipped.
    pub fn render_children(&self, surface: &mut dyn RenderSurface) {
        let children = match self.children.snapshot("render") {
            Ok(children) => children,
            Err(err) => {
                tracing::warn!(container = %self.base.id(), "skipping render: {}", err);
                return;
            }
        };
        for child in children {
            if let Err(err) = child.render(surface) {
                tracing::warn!(control = %child.id(), "render failed: {}", err);
            }
        }
    }

    /// Offers the intent to each child in list order until one handles it.
    pub fn dispatch_intent(&self, intent: &Intent) -> bool {
        match self.children.snapshot("process_intent") {
            Ok(children) => children.iter().any(|child| child.process_intent(intent)),
            Err(err) => {
                tracing::warn!(container = %self.base.id(), "dropping intent: {}", err);
                false
            }
        }
    }

    /// Loads every child. On failure, children loaded so far are unloaded again.
    ///
    /// The provider is remembered first so that children added concurrently get loaded too.
    pub fn load_children(&self, assets: &SharedAssets) -> Result<(), ContentError> {
        *self.assets.lock() = Some(assets.clone());
        let result = self.try_load_children(assets);
        if result.is_err() {
            *self.assets.lock() = None;
        }
        result
    }

    fn try_load_children(&self, assets: &SharedAssets) -> Result<(), ContentError> {
        let children = self.children.snapshot("load_content")?;
        for (i, child) in children.iter().enumerate() {
            if let Err(err) = child.load_content(assets) {
                tracing::error!(control = %child.id(), "failed to load content: {}", err);
                for loaded in &children[..i] {
                    let _ = loaded.unload_content();
                }
                return Err(err);
            }
        }
        Ok(())
    }

    /// Unloads every child.
    pub fn unload_children(&self) -> Result<(), ContentError> {
        *self.assets.lock() = None;
        let children = self.children.snapshot("unload_content")?;
        let mut result = Ok(());
        for child in children {
            if let Err(err) = child.unload_content() {
                tracing::error!(control = %child.id(), "failed to unload content: {}", err);
                result = Err(err);
            }
        }
        result
    }

    /// Detaches and closes every child.
    pub fn close_children(&self) {
        *self.assets.lock() = None;
        let drained = match self.children.with("close", mem::take) {
            Ok(drained) => drained,
            Err(err) => {
                tracing::warn!(container = %self.base.id(), "children not closed: {}", err);
                return;
            }
        };
        for child in &drained {
            child.base().set_parent(None);
        }
        for child in drained {
            child.close();
        }
    }
}

impl Control for Container {
    fn base(&self) -> &ControlBase {
        &self.base
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_container(&self) -> Option<&Container> {
        Some(self)
    }

    fn update(&self, elapsed: Duration) {
        self.base.refresh_transform();
        self.update_children(elapsed);
    }

    fn render(&self, surface: &mut dyn RenderSurface) -> Result<(), RenderError> {
        self.render_children(surface);
        Ok(())
    }

    fn process_intent(&self, intent: &Intent) -> bool {
        self.dispatch_intent(intent)
    }

    fn load_content(&self, assets: &SharedAssets) -> Result<(), ContentError> {
        self.load_children(assets)
    }

    fn unload_content(&self) -> Result<(), ContentError> {
        self.unload_children()
    }

    fn on_resized(&self) {
        // a wrapping container's size is derived from its children
        if self.layout().resize != ResizePolicy::WrapChildren {
            self.relayout();
        }
    }

    fn on_closed(&self) {
        self.close_children();
    }

    fn child_resized(&self, _child: ControlId) {
        self.relayout();
    }

    fn child_closed(&self, child: &ControlRef) {
        let _ = self.remove_control(child);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::HorizontalAlignment;
    use crate::layout::LayoutDirection;
    use crate::testing::{MemoryAssets, RecordingSurface, Stub};
    use cgmath::{Point2, Vector2};
    use std::thread;

    fn vertical(margin: f64, padding: f64) -> LayoutConfig {
        LayoutConfig {
            direction: LayoutDirection::Vertical,
            resize: ResizePolicy::WrapChildren,
            margin,
            padding,
        }
    }

    #[test]
    fn add_sets_parent_and_count() {
        let container = Container::new(LayoutConfig::default());
        let stub: ControlRef = Stub::new();
        container.add_control(stub.clone()).unwrap();
        assert_eq!(container.child_count().unwrap(), 1);
        assert_eq!(
            stub.base().parent().map(|p| p.id()),
            Some(container.id()),
            "child should point back at its container"
        );
    }

    #[test]
    fn adding_self_or_ancestor_is_rejected() {
        let outer = Container::new(LayoutConfig::default());
        let inner = Container::new(LayoutConfig::default());
        outer.add_control(inner.clone()).unwrap();

        let err = inner.add_control(inner.clone()).unwrap_err();
        assert!(matches!(err, TreeError::InvalidHierarchy { .. }));
        let err = inner.add_control(outer.clone()).unwrap_err();
        assert!(matches!(err, TreeError::InvalidHierarchy { .. }));

        assert_eq!(inner.child_count().unwrap(), 0, "tree should be unchanged");
        assert_eq!(outer.child_count().unwrap(), 1);
        assert!(!outer.is_closed(), "rejected candidates are not discarded");
        assert!(outer.base().parent().is_none());
    }

    #[test]
    fn vertical_layout_positions_children() {
        let container = Container::new(vertical(8., 4.));
        let stubs: Vec<_> = [20., 30., 10.]
            .iter()
            .map(|&h| left_aligned(40., h))
            .collect();
        for stub in &stubs {
            container.add_control(stub.clone()).unwrap();
        }
        let positions: Vec<_> = stubs.iter().map(|p| p.base().position()).collect();
        assert_eq!(
            positions,
            vec![Point2::new(8., 8.), Point2::new(8., 32.), Point2::new(8., 66.)]
        );
    }

    fn left_aligned(width: f64, height: f64) -> Arc<Stub> {
        let stub = Stub::with_size(Vector2::new(width, height));
        stub.base().set_horizontal_alignment(HorizontalAlignment::Left);
        stub
    }

    #[test]
    fn wrap_children_fits_and_respects_max_size() {
        let container = Container::new(vertical(8., 4.));
        container.add_control(left_aligned(40., 20.)).unwrap();
        container.add_control(left_aligned(60., 30.)).unwrap();
        assert_eq!(container.base().size(), Vector2::new(76., 70.));

        let capped = Container::new(vertical(8., 4.));
        capped.base().set_max_size(Vector2::new(50., 50.));
        capped.add_control(left_aligned(100., 100.)).unwrap();
        assert_eq!(capped.base().size(), Vector2::new(50., 50.));
    }

    #[test]
    fn child_resize_triggers_layout() {
        let container = Container::new(vertical(8., 4.));
        let first = Stub::with_size(Vector2::new(40., 20.));
        let second = Stub::with_size(Vector2::new(40., 20.));
        container.add_control(first.clone()).unwrap();
        container.add_control(second.clone()).unwrap();

        first.set_size(Vector2::new(40., 50.));
        assert_eq!(second.base().position().y, 62.);
        assert_eq!(container.base().size().y, 90.);
    }

    #[test]
    fn remove_then_add_round_trip() {
        let a = Container::new(LayoutConfig::default());
        let b = Container::new(LayoutConfig::default());
        let stub: ControlRef = Stub::new();
        a.add_control(stub.clone()).unwrap();
        a.remove_control(&stub).unwrap();
        assert!(stub.base().parent().is_none());
        assert!(!stub.is_closed(), "removal does not close");

        b.add_control(stub.clone()).unwrap();
        b.add_control(stub.clone()).unwrap();
        assert_eq!(b.child_count().unwrap(), 1, "re-adding must not duplicate");
        assert_eq!(stub.base().parent().map(|p| p.id()), Some(b.id()));
    }

    #[test]
    fn adding_moves_between_containers() {
        let a = Container::new(LayoutConfig::default());
        let b = Container::new(LayoutConfig::default());
        let stub: ControlRef = Stub::new();
        a.add_control(stub.clone()).unwrap();
        b.add_control(stub.clone()).unwrap();
        assert_eq!(a.child_count().unwrap(), 0);
        assert_eq!(b.child_count().unwrap(), 1);
    }

    #[test]
    fn stale_removal_is_rejected() {
        let a = Container::new(LayoutConfig::default());
        let b = Container::new(LayoutConfig::default());
        let stub: ControlRef = Stub::new();
        a.add_control(stub.clone()).unwrap();
        let err = b.remove_control(&stub).unwrap_err();
        assert!(matches!(err, TreeError::StaleRemoval { .. }));
        assert_eq!(a.child_count().unwrap(), 1);
    }

    #[test]
    fn closing_a_child_detaches_it() {
        let container = Container::new(LayoutConfig::default());
        let stub = Stub::new();
        container.add_control(stub.clone()).unwrap();
        stub.close();
        assert_eq!(container.child_count().unwrap(), 0);
        assert_eq!(stub.closed_count(), 1);
    }

    #[test]
    fn closing_cascades_once() {
        let outer = Container::new(LayoutConfig::default());
        let inner = Container::new(LayoutConfig::default());
        let stub = Stub::new();
        inner.add_control(stub.clone()).unwrap();
        outer.add_control(inner.clone()).unwrap();

        outer.close();
        outer.close();
        inner.close();
        assert!(inner.is_closed());
        assert_eq!(stub.closed_count(), 1);
        assert!(stub.base().parent().is_none());
    }

    #[test]
    fn render_fault_is_isolated() {
        let container = Container::new(LayoutConfig::default());
        let first = Stub::new();
        let broken = Stub::new();
        broken.fail_render(true);
        let last = Stub::new();
        container.add_control(first.clone()).unwrap();
        container.add_control(broken.clone()).unwrap();
        container.add_control(last.clone()).unwrap();
        let mut surface = RecordingSurface::default();
        container.render(&mut surface).unwrap();
        assert_eq!(first.render_count(), 1);
        assert_eq!(last.render_count(), 1, "later children still render");
    }

    #[test]
    fn intent_stops_at_first_handler() {
        let container = Container::new(LayoutConfig::default());
        let first = Stub::new();
        let handler = Stub::new();
        handler.handle_intents(true);
        let last = Stub::new();
        container.add_control(first.clone()).unwrap();
        container.add_control(handler.clone()).unwrap();
        container.add_control(last.clone()).unwrap();

        assert!(container.process_intent(&Intent::Hovered(Point2::new(1., 1.))));
        assert_eq!(first.intents().len(), 1);
        assert_eq!(handler.intents().len(), 1);
        assert!(last.intents().is_empty());
    }

    #[test]
    fn added_child_is_loaded_when_container_is_loaded() {
        let assets = MemoryAssets::shared();
        let container = Container::new(LayoutConfig::default());
        container.load_content(&assets).unwrap();
        let stub = Stub::new();
        container.add_control(stub.clone()).unwrap();
        assert!(stub.is_loaded());
    }

    #[test]
    fn failed_child_load_rolls_back() {
        let assets = MemoryAssets::shared();
        let container = Container::new(LayoutConfig::default());
        let good = Stub::new();
        let bad = Stub::new();
        bad.fail_load(true);
        container.add_control(good.clone()).unwrap();
        container.add_control(bad.clone()).unwrap();

        assert!(container.load_content(&assets).is_err());
        assert!(!good.is_loaded(), "already loaded children are unloaded again");
        assert!(!container.is_loaded());

        bad.fail_load(false);
        container.load_content(&assets).unwrap();
        let late = Stub::new();
        late.fail_load(true);
        assert!(matches!(
            container.add_control(late.clone()),
            Err(TreeError::Content(_))
        ));
        assert!(late.is_closed());
        assert!(!container.contains(late.id()).unwrap());
    }

    #[test]
    fn add_under_a_held_lock_discards_the_control() {
        let container = Container::new(LayoutConfig::default());
        let stub = Stub::new();
        {
            let _held = container.children.hold();
            assert!(matches!(
                container.add_control(stub.clone()),
                Err(TreeError::Lock(LockError { op: "add_control" }))
            ));
        }
        assert!(stub.is_closed());
        assert_eq!(stub.closed_count(), 1);
        assert!(!stub.base().has_parent());
        assert_eq!(container.child_count().unwrap(), 0);
    }

    #[test]
    fn walks_under_a_held_lock_are_skipped() {
        let container = Container::new(LayoutConfig::default());
        container.set_position(Point2::new(10., 10.));
        let stub = Stub::with_size(Vector2::new(5., 5.));
        container.add_control(stub.clone()).unwrap();

        let mut surface = RecordingSurface::default();
        {
            let _held = container.children.hold();
            container.update(Duration::from_millis(16));
            container.render_children(&mut surface);
            assert!(!container.dispatch_intent(&Intent::Hovered(Point2::new(1., 1.))));
        }
        assert_eq!(stub.render_count(), 0);
        assert!(surface.calls.is_empty());
        assert!(stub.intents().is_empty());
        assert_ne!(stub.base().transform(), stub.base().compute_transform());

        container.update(Duration::from_millis(16));
        container.render_children(&mut surface);
        assert_eq!(stub.render_count(), 1);
        assert_eq!(stub.base().transform(), stub.base().compute_transform());
    }

    #[test]
    fn load_under_a_held_lock_fails() {
        let assets = MemoryAssets::shared();
        let container = Container::new(LayoutConfig::default());
        let stub = Stub::new();
        container.add_control(stub.clone()).unwrap();
        {
            let _held = container.children.hold();
            assert!(matches!(
                container.load_content(&assets),
                Err(ContentError::Lock(LockError { op: "load_content" }))
            ));
        }
        assert!(!container.is_loaded());
        assert!(!stub.is_loaded());
    }

    #[test]
    fn unload_under_a_held_lock_fails() {
        let assets = MemoryAssets::shared();
        let container = Container::new(LayoutConfig::default());
        let stub = Stub::new();
        container.add_control(stub.clone()).unwrap();
        container.load_content(&assets).unwrap();
        {
            let _held = container.children.hold();
            assert!(matches!(
                container.unload_content(),
                Err(ContentError::Lock(LockError { op: "unload_content" }))
            ));
        }
        assert!(!container.is_loaded(), "the provider is dropped even if the walk fails");
        assert!(stub.is_loaded(), "children are left as they were");
    }

    #[test]
    fn concurrent_adds_from_workers() {
        let container = Container::new(vertical(2., 2.));
        thread::scope(|scope| {
            for _ in 0..4 {
                let container = &container;
                scope.spawn(move || {
                    for _ in 0..25 {
                        container
                            .add_control(Stub::with_size(Vector2::new(10., 10.)))
                            .expect("add should succeed under normal load");
                    }
                });
            }
            // the loop thread keeps walking the tree meanwhile
            let mut surface = RecordingSurface::default();
            for _ in 0..50 {
                container.update(Duration::from_millis(16));
                container.render(&mut surface).unwrap();
            }
        });
        assert_eq!(container.child_count().unwrap(), 100);
        let children = container.children().unwrap();
        assert!(children
            .iter()
            .all(|c| c.base().parent().map(|p| p.id()) == Some(container.id())));
    }
}
