//! Shared test helpers: an in-memory rendering backend.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::{Arc, Mutex};

use eoview::controller::ControllerContext;
use eoview::layer::{
    same_resource, Extent, NativeContainer, NativeHandle, NativeResource, ResourceHost,
};
use eoview::registry::FactoryRegistry;

/// What the backend currently knows about one resource.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceState {
    pub host: String,
    pub opacity: Option<f64>,
    pub visible: Option<bool>,
    pub z_index: Option<i32>,
    pub extent: Option<Extent>,
    pub children: Vec<String>,
}

/// Live resources and an event log shared by every resource of one backend.
#[derive(Default)]
pub struct Backend {
    created: Mutex<usize>,
    resources: Mutex<HashMap<String, ResourceState>>,
    events: Mutex<Vec<String>>,
}

impl Backend {
    pub fn created(&self) -> usize {
        *self.created.lock().unwrap()
    }

    /// Number of resources created and not yet destroyed.
    pub fn live(&self) -> usize {
        self.resources.lock().unwrap().len()
    }

    pub fn resource(&self, id: &str) -> Option<ResourceState> {
        self.resources.lock().unwrap().get(id).cloned()
    }

    pub fn children_of(&self, id: &str) -> Vec<String> {
        self.resource(id).map(|r| r.children).unwrap_or_default()
    }

    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    pub fn clear_events(&self) {
        self.events.lock().unwrap().clear();
    }

    fn record(&self, event: String) {
        self.events.lock().unwrap().push(event);
    }

    fn update(&self, id: &str, f: impl FnOnce(&mut ResourceState)) {
        if let Some(state) = self.resources.lock().unwrap().get_mut(id) {
            f(state);
        }
    }
}

struct MockResource {
    id: String,
    backend: Arc<Backend>,
    container: bool,
    children: RefCell<Vec<NativeHandle>>,
    destroyed: Cell<bool>,
}

impl MockResource {
    fn sync_children(&self) {
        let ids: Vec<String> = self
            .children
            .borrow()
            .iter()
            .map(|c| c.resource_id().to_string())
            .collect();
        self.backend.update(&self.id, |state| state.children = ids);
    }
}

impl NativeResource for MockResource {
    fn resource_id(&self) -> &str {
        &self.id
    }

    fn set_opacity(&self, opacity: f64) {
        self.backend.update(&self.id, |s| s.opacity = Some(opacity));
    }

    fn set_visible(&self, visible: bool) {
        self.backend.update(&self.id, |s| s.visible = Some(visible));
    }

    fn set_extent(&self, extent: Option<Extent>) {
        self.backend.update(&self.id, |s| s.extent = extent);
    }

    fn set_z_index(&self, z_index: i32) {
        self.backend.update(&self.id, |s| s.z_index = Some(z_index));
    }

    fn as_container(&self) -> Option<&dyn NativeContainer> {
        if self.container {
            Some(self)
        } else {
            None
        }
    }

    fn destroy(&self) {
        assert!(!self.destroyed.replace(true), "{} destroyed twice", self.id);
        self.backend.resources.lock().unwrap().remove(&self.id);
        self.backend.record(format!("destroy:{}", self.id));
    }
}

impl NativeContainer for MockResource {
    fn insert_child(&self, index: usize, child: NativeHandle) {
        let index = index.min(self.children.borrow().len());
        self.backend
            .record(format!("insert:{}:{}@{}", self.id, child.resource_id(), index));
        self.children.borrow_mut().insert(index, child);
        self.sync_children();
    }

    fn remove_child(&self, child: &NativeHandle) -> bool {
        let position = self
            .children
            .borrow()
            .iter()
            .position(|c| same_resource(c, child));
        let Some(position) = position else {
            return false;
        };
        self.children.borrow_mut().remove(position);
        self.backend
            .record(format!("remove:{}:{}", self.id, child.resource_id()));
        self.sync_children();
        true
    }

    fn child_count(&self) -> usize {
        self.children.borrow().len()
    }
}

/// A top-level map host.
pub struct MapHost(pub &'static str);

impl ResourceHost for MapHost {
    fn host_id(&self) -> &str {
        self.0
    }
}

/// Registers `tile` and `group` factories backed by a fresh [`Backend`],
/// plus a `broken` type whose factory always fails.
pub fn mock_context() -> (ControllerContext, Arc<Backend>) {
    let backend = Arc::new(Backend::default());
    let registry = FactoryRegistry::new();

    for (tag, container) in [("tile", false), ("group", true)] {
        let backend = Arc::clone(&backend);
        registry.register(tag, move |model, host| {
            *backend.created.lock().unwrap() += 1;
            backend.resources.lock().unwrap().insert(
                model.id().to_string(),
                ResourceState {
                    host: host.host_id().to_string(),
                    ..ResourceState::default()
                },
            );
            backend.record(format!("create:{}", model.id()));

            let resource = MockResource {
                id: model.id().to_string(),
                backend: Arc::clone(&backend),
                container,
                children: RefCell::new(Vec::new()),
                destroyed: Cell::new(false),
            };
            Ok(Some(Rc::new(resource) as NativeHandle))
        });
    }
    registry.register("broken", |model, _host| {
        Err(format!("backend rejected layer {}", model.id()).into())
    });

    (ControllerContext::new(Arc::new(registry)), backend)
}
