//! Decoded input signals and their routing to cameras.
//!
//! The host's event source pushes [`InputEvent`]s into an [`InputRouter`].
//! A camera only receives events while it holds an [`InputBinding`]; the
//! binding is a scoped registration, so dropping it always tears the route
//! down and releases every key the camera saw as held.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use crate::engine::scene::{NodeId, Scene};

/// Held/released state per platform key identifier (`"KeyW"`, `"Space"`, ...).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputState {
    keys: HashMap<String, bool>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key_down(&mut self, code: impl Into<String>) {
        self.keys.insert(code.into(), true);
    }

    pub fn key_up(&mut self, code: impl Into<String>) {
        self.keys.insert(code.into(), false);
    }

    /// Codes never seen read as released.
    pub fn is_held(&self, code: &str) -> bool {
        self.keys.get(code).copied().unwrap_or(false)
    }

    /// Marks every tracked key as released. Codes stay tracked.
    pub fn release_all(&mut self) {
        for held in self.keys.values_mut() {
            *held = false;
        }
    }

    pub fn held(&self) -> impl Iterator<Item = &str> {
        self.keys
            .iter()
            .filter(|(_, held)| **held)
            .map(|(code, _)| code.as_str())
    }

    pub fn tracked(&self) -> usize {
        self.keys.len()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// Relative pointer motion in pixels.
    MouseMove { dx: f32, dy: f32 },
    KeyDown(String),
    KeyUp(String),
}

#[derive(Debug, Default)]
struct Route {
    enabled: bool,
    /// Bumped on every `enable`; a binding only tears down its own generation.
    generation: u64,
    state: InputState,
}

#[derive(Debug, Default)]
struct RouteTable {
    routes: HashMap<NodeId, Route>,
}

impl RouteTable {
    fn disable(&mut self, target: NodeId) {
        if let Some(route) = self.routes.get_mut(&target) {
            if route.enabled {
                tracing::debug!(target: "input", camera = %target, "input route disabled");
            }
            route.enabled = false;
            route.state.release_all();
        }
    }

    /// Disables `target` only if it was not re-enabled since `generation`.
    fn release(&mut self, target: NodeId, generation: u64) {
        let current = self.routes.get(&target).map(|route| route.generation);
        if current == Some(generation) {
            self.disable(target);
        } else {
            tracing::trace!(target: "input", camera = %target, "stale binding dropped");
        }
    }
}

/// Input-routing table shared by the host's event source and frame loop.
///
/// Cloning yields another handle onto the same table. Single-threaded.
#[derive(Debug, Clone, Default)]
pub struct InputRouter {
    table: Rc<RefCell<RouteTable>>,
}

impl InputRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts routing events to `target`. Held keys from an earlier binding
    /// were released when it ended, so they do not carry over.
    pub fn enable(&self, target: NodeId) -> InputBinding {
        let mut table = self.table.borrow_mut();
        let route = table.routes.entry(target).or_default();
        route.enabled = true;
        route.generation += 1;
        let generation = route.generation;
        let active = table.routes.values().filter(|route| route.enabled).count();
        tracing::debug!(target: "input", camera = %target, active, "input route enabled");

        InputBinding {
            target,
            generation,
            table: Rc::downgrade(&self.table),
        }
    }

    /// Stops routing to `target` and releases all its keys. Calling this for
    /// an already disabled or unknown target is a no-op.
    pub fn disable(&self, target: NodeId) {
        self.table.borrow_mut().disable(target);
    }

    pub fn is_enabled(&self, target: NodeId) -> bool {
        self.table
            .borrow()
            .routes
            .get(&target)
            .is_some_and(|route| route.enabled)
    }

    pub fn enabled_targets(&self) -> Vec<NodeId> {
        let mut targets: Vec<NodeId> = self
            .table
            .borrow()
            .routes
            .iter()
            .filter(|(_, route)| route.enabled)
            .map(|(id, _)| *id)
            .collect();
        targets.sort();
        targets
    }

    /// Runs `f` against the key state of `target`; targets that never had a
    /// route see an empty state.
    pub fn with_input<R>(&self, target: NodeId, f: impl FnOnce(&InputState) -> R) -> R {
        let table = self.table.borrow();
        match table.routes.get(&target) {
            Some(route) => f(&route.state),
            None => f(&InputState::default()),
        }
    }

    /// Delivers `event` to every enabled camera in `scene`. Returns how many
    /// cameras received it.
    pub fn dispatch(&self, scene: &mut Scene, event: &InputEvent) -> usize {
        let mut table = self.table.borrow_mut();
        let mut delivered = 0;
        for (id, route) in table.routes.iter_mut().filter(|(_, route)| route.enabled) {
            let Some((transform, camera)) = scene.node_mut(*id).and_then(|n| n.camera_parts_mut())
            else {
                tracing::trace!(target: "input", camera = %id, "routed node is not a camera in this scene");
                continue;
            };
            camera.handle_event(transform, &mut route.state, event);
            delivered += 1;
        }
        delivered
    }
}

/// Scoped registration returned by [`InputRouter::enable`].
#[must_use = "dropping the binding disables the input route immediately"]
#[derive(Debug)]
pub struct InputBinding {
    target: NodeId,
    generation: u64,
    table: Weak<RefCell<RouteTable>>,
}

impl InputBinding {
    pub fn target(&self) -> NodeId {
        self.target
    }

    /// Ends the binding now. Equivalent to dropping it.
    pub fn release(self) {}
}

impl Drop for InputBinding {
    fn drop(&mut self) {
        let Some(table) = self.table.upgrade() else {
            return;
        };
        let released = match table.try_borrow_mut() {
            Ok(mut routes) => {
                routes.release(self.target, self.generation);
                true
            }
            Err(_) => false,
        };
        if !released {
            tracing::warn!(target: "input", camera = %self.target, "route table busy, binding not released");
        }
    }
}
