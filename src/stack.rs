//! The window stack.
//!
//! A [`WindowStack`] owns the top-level controls ("layers"), most recently focused first. Only the
//! head layer is ever active. It is the entry point for input and drives the per-frame update and
//! render passes.
//!
//! Threads other than the frame loop can mutate the stack through a [`StackHandle`], which queues
//! commands that are drained at the start of the next [`WindowStack::update`].

use crate::assets::SharedAssets;
use crate::clock::FrameClock;
use crate::control::{Control, ControlRef, HorizontalAlignment, VerticalAlignment};
use crate::error::{ContentError, LockError, RenderError, StackGone, TreeError};
use crate::events::{DragState, InputEvent, InputSource, Intent, MouseButton};
use crate::lock::ListLock;
use crate::surface::RenderSurface;
use cgmath::{Point2, Vector2};
use crossbeam::channel::{self, Receiver, Sender, TryRecvError};
use parking_lot::Mutex;
use std::time::Duration;

/// A queued mutation.
#[derive(Debug)]
pub enum Command {
    Add(ControlRef),
    Remove(ControlRef),
    Focus(ControlRef),
    Input(InputEvent),
}

/// Queues commands for a window stack from any thread.
#[derive(Debug, Clone)]
pub struct StackHandle {
    sender: Sender<Command>,
}

impl StackHandle {
    pub fn send(&self, command: Command) -> Result<(), StackGone> {
        self.sender.send(command).map_err(|_| StackGone)
    }

    pub fn add_control(&self, layer: ControlRef) -> Result<(), StackGone> {
        self.send(Command::Add(layer))
    }

    pub fn remove_control(&self, layer: ControlRef) -> Result<(), StackGone> {
        self.send(Command::Remove(layer))
    }

    pub fn set_new_focus(&self, layer: ControlRef) -> Result<(), StackGone> {
        self.send(Command::Focus(layer))
    }

    pub fn send_input(&self, event: InputEvent) -> Result<(), StackGone> {
        self.send(Command::Input(event))
    }
}

/// Owns the layers and routes input to them.
#[derive(Debug)]
pub struct WindowStack {
    layers: ListLock<Vec<ControlRef>>,
    screen_size: Mutex<Vector2<f64>>,
    assets: Mutex<Option<SharedAssets>>,
    clock: Mutex<FrameClock>,
    command_recv: Receiver<Command>,
    command_sender: Sender<Command>,
}

impl WindowStack {
    /// Creates an empty stack for a screen of the given size.
    ///
    /// Nothing is loaded until `load_content` is called.
    pub fn new(screen_size: Vector2<f64>) -> WindowStack {
        let (command_sender, command_recv) = channel::unbounded();

        WindowStack {
            layers: ListLock::new(Vec::new()),
            screen_size: Mutex::new(screen_size),
            assets: Mutex::new(None),
            clock: Mutex::new(FrameClock::new()),
            command_recv,
            command_sender,
        }
    }

    pub fn handle(&self) -> StackHandle {
        StackHandle {
            sender: self.command_sender.clone(),
        }
    }

    pub fn screen_size(&self) -> Vector2<f64> {
        *self.screen_size.lock()
    }

    pub fn set_screen_size(&self, size: Vector2<f64>) {
        *self.screen_size.lock() = size;
    }

    pub fn is_loaded(&self) -> bool {
        self.assets.lock().is_some()
    }

    /// Returns a snapshot of the layers, head first.
    pub fn layers(&self) -> Result<Vec<ControlRef>, LockError> {
        self.layers.snapshot("layers")
    }

    /// The focused layer.
    pub fn head(&self) -> Option<ControlRef> {
        self.layers
            .with("head", |list| list.first().cloned())
            .ok()
            .flatten()
    }

    /// Adds a layer at the head and focuses it.
    ///
    /// The layer is loaded if the stack is loaded, shrunk to fit the screen and aligned to the
    /// screen. A layer that is already in the stack just moves to the head.
    pub fn add_control(&self, layer: ControlRef) -> Result<(), TreeError> {
        let child = layer.id();
        if let Some(parent) = layer.base().parent() {
            tracing::warn!(control = %child, "only parentless controls can be layers");
            return Err(TreeError::InvalidHierarchy {
                child,
                parent: parent.id(),
            });
        }

        if let Err(err) = self.layers.with("add_control", |list| {
            list.retain(|l| l.id() != child);
            promote(list, &layer);
        }) {
            tracing::warn!(control = %child, "discarding layer: {}", err);
            layer.close();
            return Err(err.into());
        }

        let assets = self.assets.lock().clone();
        if let Some(assets) = assets {
            if let Err(err) = layer.load_content(&assets) {
                tracing::error!(control = %child, "failed to load layer: {}", err);
                let _ = self.remove_control(&layer);
                return Err(err.into());
            }
        }

        self.fit_to_screen(&layer);
        self.align_to_screen(&layer);
        tracing::debug!(control = %child, "layer added");
        Ok(())
    }

    /// Moves a layer to the head and makes it the only active layer.
    pub fn set_new_focus(&self, layer: &ControlRef) -> Result<(), TreeError> {
        let id = layer.id();
        if let Some(parent) = layer.base().parent() {
            return Err(TreeError::InvalidHierarchy {
                child: id,
                parent: parent.id(),
            });
        }
        let changed = self.layers.with("set_new_focus", |list| {
            if list.first().map(|head| head.id()) == Some(id) {
                layer.base().set_active(true);
                return false;
            }
            list.retain(|l| l.id() != id);
            promote(list, layer);
            true
        })?;
        if changed {
            tracing::debug!(control = %id, "focus changed");
        }
        Ok(())
    }

    /// Removes and closes a layer. If it was the head, the next layer becomes active.
    pub fn remove_control(&self, layer: &ControlRef) -> Result<(), TreeError> {
        let id = layer.id();
        let position = self.layers.with("remove_control", |list| {
            let position = list.iter().position(|l| l.id() == id);
            if let Some(position) = position {
                list.remove(position);
                layer.base().set_active(false);
                if position == 0 {
                    activate_first(list);
                }
            }
            position
        })?;
        if position.is_none() {
            tracing::warn!(control = %id, "removing a control that is not a layer");
            return Err(TreeError::NotALayer(id));
        }
        layer.close();
        tracing::debug!(control = %id, "layer removed");
        Ok(())
    }

    /// Drops layers that closed themselves or were attached to a container.
    fn sweep(&self) {
        let swept = self.layers.with("sweep", |list| {
            let head = list.first().map(|head| head.id());
            list.retain(|l| !l.is_closed() && !l.base().has_parent());
            if head.is_some() && list.first().map(|head| head.id()) != head {
                activate_first(list);
            }
        });
        if let Err(err) = swept {
            tracing::warn!("skipping sweep: {}", err);
        }
    }

    /// Shrinks a layer that is larger than the screen.
    fn fit_to_screen(&self, layer: &ControlRef) {
        let screen = self.screen_size();
        let size = layer.base().size();
        if size.x > screen.x || size.y > screen.y {
            layer.set_size(Vector2::new(size.x.min(screen.x), size.y.min(screen.y)));
        }
    }

    /// Positions a layer on the screen according to its alignment.
    fn align_to_screen(&self, layer: &ControlRef) {
        let screen = self.screen_size();
        let base = layer.base();
        let size = base.size();
        let mut position = base.position();
        match base.vertical_alignment() {
            VerticalAlignment::Top => position.y = 0.,
            VerticalAlignment::Center => position.y = (screen.y - size.y) / 2.,
            VerticalAlignment::Bottom => position.y = screen.y - size.y,
            VerticalAlignment::None => (),
        }
        match base.horizontal_alignment() {
            HorizontalAlignment::Left => position.x = 0.,
            HorizontalAlignment::Center => position.x = (screen.x - size.x) / 2.,
            HorizontalAlignment::Right => position.x = screen.x - size.x,
            HorizontalAlignment::None => (),
        }
        layer.set_position(position);
    }

    /// Moves a layer back so it is entirely on screen.
    fn keep_on_screen(&self, layer: &ControlRef) {
        let screen = self.screen_size();
        let base = layer.base();
        let size = base.size();
        let position = base.position();
        let clamped = Point2::new(
            position.x.min(screen.x - size.x).max(0.),
            position.y.min(screen.y - size.y).max(0.),
        );
        if clamped != position {
            layer.set_position(clamped);
        }
    }

    /// Loads every layer. On failure, layers loaded so far are unloaded again.
    pub fn load_content(&self, assets: &SharedAssets) -> Result<(), ContentError> {
        *self.assets.lock() = Some(assets.clone());
        let layers = match self.layers.snapshot("load_content") {
            Ok(layers) => layers,
            Err(err) => {
                *self.assets.lock() = None;
                return Err(err.into());
            }
        };
        for (i, layer) in layers.iter().enumerate() {
            if let Err(err) = layer.load_content(assets) {
                tracing::error!(control = %layer.id(), "failed to load layer: {}", err);
                for loaded in &layers[..i] {
                    let _ = loaded.unload_content();
                }
                *self.assets.lock() = None;
                return Err(err);
            }
        }
        self.clock.lock().start();
        Ok(())
    }

    /// Unloads every layer and stops the frame clock.
    pub fn unload_content(&self) -> Result<(), ContentError> {
        *self.assets.lock() = None;
        self.clock.lock().reset();
        let layers = self.layers.snapshot("unload_content")?;
        let mut result = Ok(());
        for layer in layers {
            if let Err(err) = layer.unload_content() {
                tracing::error!(control = %layer.id(), "failed to unload layer: {}", err);
                result = Err(err);
            }
        }
        result
    }

    /// Runs one frame's update with the time elapsed since the last one.
    pub fn update(&self) {
        let elapsed = self.clock.lock().tick();
        self.update_elapsed(elapsed);
    }

    /// Drains queued commands, then updates every layer, head first.
    pub fn update_elapsed(&self, elapsed: Duration) {
        self.drain_commands();
        self.sweep();
        let layers = match self.layers.snapshot("update") {
            Ok(layers) => layers,
            Err(err) => {
                tracing::warn!("skipping update: {}", err);
                return;
            }
        };
        for layer in layers {
            layer.update(elapsed);
        }
    }

    /// Applies all queued commands.
    pub fn drain_commands(&self) {
        loop {
            match self.command_recv.try_recv() {
                Ok(command) => self.apply(command),
                Err(TryRecvError::Empty) => break,
                // we hold a sender, so this can't happen
                Err(TryRecvError::Disconnected) => break,
            }
        }
    }

    fn apply(&self, command: Command) {
        let result = match command {
            Command::Add(layer) => self.add_control(layer),
            Command::Remove(layer) => self.remove_control(&layer),
            Command::Focus(layer) => self.set_new_focus(&layer),
            Command::Input(event) => {
                self.dispatch_event(event);
                Ok(())
            }
        };
        if let Err(err) = result {
            tracing::warn!("queued command failed: {}", err);
        }
    }

    /// Renders every layer back to front, so the head is drawn last.
    pub fn render(&self, surface: &mut dyn RenderSurface) -> Result<(), RenderError> {
        let layers = match self.layers.snapshot("render") {
            Ok(layers) => layers,
            Err(err) => {
                tracing::warn!("skipping render: {}", err);
                return Ok(());
            }
        };
        if layers.is_empty() {
            return Ok(());
        }
        surface.begin_frame()?;
        for layer in layers.iter().rev() {
            if let Err(err) = layer.render(surface) {
                tracing::warn!(control = %layer.id(), "layer render failed: {}", err);
            }
        }
        surface.end_frame()
    }

    /// Dispatches every pending event from `source`. Returns how many were handled.
    pub fn pump(&self, source: &mut dyn InputSource) -> usize {
        let mut handled = 0;
        while let Some(event) = source.poll_event() {
            if self.dispatch_event(event) {
                handled += 1;
            }
        }
        handled
    }

    /// Translates a raw event into an intent for the right layer. Returns true if handled.
    pub fn dispatch_event(&self, event: InputEvent) -> bool {
        self.sweep();
        let layers = match self.layers.snapshot("dispatch_event") {
            Ok(layers) => layers,
            Err(err) => {
                tracing::warn!("dropping input: {}", err);
                return false;
            }
        };
        let head = match layers.first() {
            Some(head) => head.clone(),
            None => return false,
        };
        let hit = |position: Point2<f64>| {
            layers
                .iter()
                .find(|layer| layer.base().screen_rect().contains(position))
        };

        match event {
            InputEvent::Pressed { button, position } => {
                if !button.is_selection() {
                    return false;
                }
                head.base().set_active(false);
                match hit(position) {
                    Some(layer) => {
                        if let Err(err) = self.set_new_focus(layer) {
                            tracing::warn!("could not focus layer: {}", err);
                        }
                        true
                    }
                    None => false,
                }
            }
            InputEvent::Held { button, position } => {
                if !head.base().is_active() {
                    return false;
                }
                match button {
                    MouseButton::Left => head.process_intent(&Intent::Held(position)),
                    MouseButton::Right => head.process_intent(&Intent::AltHeld(position)),
                    _ => false,
                }
            }
            InputEvent::Released { button, position } => {
                if !head.base().is_active() {
                    return false;
                }
                if head.base().drag_state() != DragState::Idle {
                    head.base().set_drag_state(DragState::Idle);
                    return true;
                }
                match button {
                    MouseButton::Left => head.process_intent(&Intent::Released(position)),
                    MouseButton::Right => head.process_intent(&Intent::AltReleased(position)),
                    _ => false,
                }
            }
            InputEvent::Motion { delta } => {
                if !head.base().is_active() || head.base().drag_state() == DragState::Idle {
                    return false;
                }
                let handled = head.process_intent(&Intent::Move(delta));
                if handled {
                    self.keep_on_screen(&head);
                }
                handled
            }
            InputEvent::Position { position } => match hit(position) {
                Some(layer) => layer.process_intent(&Intent::Hovered(position)),
                None => false,
            },
            InputEvent::Scroll { position, delta } => match hit(position) {
                Some(layer) => layer.process_intent(&Intent::Scroll { position, delta }),
                None => false,
            },
        }
    }
}

/// Puts `layer` at the head and moves the active flag to it. Runs under the layer lock.
fn promote(list: &mut Vec<ControlRef>, layer: &ControlRef) {
    if let Some(previous) = list.first() {
        previous.base().set_active(false);
    }
    list.insert(0, layer.clone());
    layer.base().set_active(true);
}

fn activate_first(list: &[ControlRef]) {
    if let Some(head) = list.first() {
        head.base().set_active(true);
    }
}
