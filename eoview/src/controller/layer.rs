//! Attach/detach lifecycle binding a layer model to its native resource.

use std::cell::RefCell;
use std::collections::HashSet;
use std::fmt;
use std::rc::{Rc, Weak};

use tracing::{debug, error, info};

use super::context::ControllerContext;
use super::error::ControllerError;
use crate::layer::{LayerModel, NativeHandle, ParentHost, ResourceHost};
use crate::reactive::SubscriptionTracker;
use crate::reconcile::{Key, KeyedReconciler};

type ChildFailures = Rc<RefCell<Vec<ControllerError>>>;

/// Owns the native resource mirroring one [`LayerModel`].
///
/// # Lifecycle
///
/// ```text
///            attach(Some(host))                 detach() / attach(None)
/// Detached ─────────────────────► Attached ─────────────────────────► Detached
///    ▲                              │  attach(Some(other))
///    │  factory error               └─► detach() then attach again
///    └──────────────────────────────
/// ```
///
/// While attached, changes to the model's opacity, visibility, extent and
/// z-index are forwarded to the resource's setters. For group layers the
/// controller also owns a [`KeyedReconciler`] over the child list, which
/// creates one child controller per child model and keeps the resource's
/// container in the same order as the list.
///
/// The controller is detached when dropped.
pub struct LayerController {
    model: Rc<LayerModel>,
    context: ControllerContext,
    native: Option<NativeHandle>,
    subscriptions: SubscriptionTracker,
    children: Option<KeyedReconciler<Rc<LayerModel>, LayerController>>,
    child_failures: ChildFailures,
}

impl LayerController {
    /// Creates a detached controller using the process-wide factory registry.
    pub fn new(model: Rc<LayerModel>) -> Self {
        Self::with_context(model, ControllerContext::global())
    }

    /// Creates a detached controller working against `context`.
    pub fn with_context(model: Rc<LayerModel>, context: ControllerContext) -> Self {
        Self {
            model,
            context,
            native: None,
            subscriptions: SubscriptionTracker::new(),
            children: None,
            child_failures: Rc::new(RefCell::new(Vec::new())),
        }
    }

    pub fn model(&self) -> &Rc<LayerModel> {
        &self.model
    }

    pub fn context(&self) -> &ControllerContext {
        &self.context
    }

    /// The native resource, if attached.
    pub fn native_handle(&self) -> Option<NativeHandle> {
        self.native.clone()
    }

    pub fn is_attached(&self) -> bool {
        self.native.is_some()
    }

    /// Number of live field/child bindings.
    pub fn subscription_count(&self) -> usize {
        self.subscriptions.len()
    }

    /// Number of child controllers (group layers only).
    pub fn child_count(&self) -> usize {
        self.children.as_ref().map_or(0, |c| c.len())
    }

    /// Runs `f` on the child controller for `child_id`.
    pub fn with_child<R>(&self, child_id: &str, f: impl FnOnce(&LayerController) -> R) -> Option<R> {
        self.children.as_ref()?.with_item(child_id, f)
    }

    /// Drains child attach failures recorded since the last call.
    ///
    /// Children that fail to attach after the initial pass stay tracked but
    /// detached; their errors accumulate here.
    pub fn take_child_failures(&self) -> Vec<ControllerError> {
        std::mem::take(&mut *self.child_failures.borrow_mut())
    }

    /// Creates the native resource on `host` and binds the model to it.
    ///
    /// Any existing resource is detached first. `None` leaves the controller
    /// detached. On error nothing stays bound and no resource is left alive.
    pub fn attach(&mut self, host: Option<&dyn ResourceHost>) -> Result<(), ControllerError> {
        if self.native.is_some() {
            self.detach();
        }
        let Some(host) = host else {
            return Ok(());
        };

        let handle = self
            .context
            .factories()
            .create(&self.model, host)
            .map_err(|source| ControllerError::Resource {
                layer_id: self.model.id().to_string(),
                source,
            })?;

        // From here on the resource exists; every failure path goes through
        // detach() so observers and children are unwound with it.
        self.native = Some(Rc::clone(&handle));
        self.model.set_native_handle(Some(Rc::clone(&handle)));
        self.context.instances().register(self.model.id(), &self.model);

        self.sync_fields(&handle);
        self.bind_fields(&handle);

        if let Err(err) = self.attach_children(&handle) {
            error!(
                layer = %self.model.id(),
                error = %err,
                "Layer attach failed, detaching"
            );
            self.detach();
            return Err(err);
        }

        info!(
            layer = %self.model.id(),
            type_tag = %self.model.type_tag(),
            host = %host.host_id(),
            children = self.child_count(),
            "Layer attached"
        );
        Ok(())
    }

    /// Unbinds everything and destroys the native resource. Idempotent.
    pub fn detach(&mut self) {
        // Children first: they remove themselves from this resource's container.
        if let Some(mut children) = self.children.take() {
            children.destroy();
        }
        self.subscriptions.unsubscribe();

        if let Some(handle) = self.native.take() {
            handle.destroy();
            self.model.set_native_handle(None);
            self.context.instances().unregister(self.model.id());
            debug!(layer = %self.model.id(), "Layer detached");
        }
    }

    fn sync_fields(&self, handle: &NativeHandle) {
        handle.set_opacity(self.model.opacity());
        handle.set_visible(self.model.is_visible());
        handle.set_extent(self.model.extent());
        handle.set_z_index(self.model.z_index());
    }

    fn bind_fields(&mut self, handle: &NativeHandle) {
        let target = Rc::downgrade(handle);
        self.subscriptions
            .add(self.model.opacity_observable().subscribe(move |opacity| {
                if let Some(resource) = target.upgrade() {
                    resource.set_opacity(*opacity);
                }
            }));

        let target = Rc::downgrade(handle);
        self.subscriptions
            .add(self.model.visible_observable().subscribe(move |visible| {
                if let Some(resource) = target.upgrade() {
                    resource.set_visible(*visible);
                }
            }));

        let target = Rc::downgrade(handle);
        self.subscriptions
            .add(self.model.extent_observable().subscribe(move |extent| {
                if let Some(resource) = target.upgrade() {
                    resource.set_extent(*extent);
                }
            }));

        let target = Rc::downgrade(handle);
        self.subscriptions
            .add(self.model.z_index_observable().subscribe(move |z_index| {
                if let Some(resource) = target.upgrade() {
                    resource.set_z_index(*z_index);
                }
            }));
    }

    fn attach_children(&mut self, handle: &NativeHandle) -> Result<(), ControllerError> {
        let Some(children) = self.model.children() else {
            return Ok(());
        };
        if handle.as_container().is_none() {
            return Err(ControllerError::NotAContainer {
                layer_id: self.model.id().to_string(),
                type_tag: self.model.type_tag().to_string(),
            });
        }

        self.child_failures.borrow_mut().clear();

        let parent_id = self.model.id().to_string();
        let context = self.context.clone();
        let failures = Rc::clone(&self.child_failures);
        let add_parent = Rc::clone(handle);
        let remove_parent = Rc::clone(handle);
        let group = Rc::downgrade(&self.model);
        let attached: Rc<RefCell<HashSet<Key>>> = Rc::default();
        let attached_on_remove = Rc::clone(&attached);

        let reconciler = KeyedReconciler::new(
            children,
            move |child: &Rc<LayerModel>, index| {
                let mut controller = LayerController::with_context(Rc::clone(child), context.clone());
                let host = ParentHost::new(Rc::clone(&add_parent));

                match controller.attach(Some(&host)) {
                    Ok(()) => {
                        if let (Some(container), Some(child_handle)) =
                            (add_parent.as_container(), controller.native_handle())
                        {
                            let position = container_position(&group, &attached.borrow(), index);
                            container.insert_child(position, child_handle);
                        }
                        attached.borrow_mut().insert(child.id().to_string());
                    }
                    Err(err) => {
                        error!(
                            parent = %parent_id,
                            child = %child.id(),
                            error = %err,
                            "Child layer failed to attach"
                        );
                        failures.borrow_mut().push(ControllerError::ChildAttach {
                            parent_id: parent_id.clone(),
                            child_id: child.id().to_string(),
                            source: Box::new(err),
                        });
                    }
                }
                controller
            },
            move |mut controller: LayerController| {
                attached_on_remove.borrow_mut().remove(controller.model().id());
                if let (Some(container), Some(child_handle)) =
                    (remove_parent.as_container(), controller.native_handle())
                {
                    container.remove_child(&child_handle);
                }
                controller.detach();
            },
        );
        self.children = Some(reconciler);

        // A failure in the initial pass fails the whole attach.
        let first_failure = self.child_failures.borrow_mut().drain(..).next();
        match first_failure {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

/// Container index for a child at `index` in the group's child list.
///
/// Children that failed to attach have no resource in the container, so
/// only attached siblings before `index` count.
fn container_position(group: &Weak<LayerModel>, attached: &HashSet<Key>, index: usize) -> usize {
    let Some(group) = group.upgrade() else {
        return index;
    };
    match group.children() {
        Some(children) => children.with_items(|items| {
            items[..index.min(items.len())]
                .iter()
                .filter(|child| attached.contains(child.id()))
                .count()
        }),
        None => index,
    }
}

impl Drop for LayerController {
    fn drop(&mut self) {
        self.detach();
    }
}

impl fmt::Debug for LayerController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LayerController")
            .field("layer", &self.model.id())
            .field("attached", &self.is_attached())
            .field("subscriptions", &self.subscriptions.len())
            .field("children", &self.child_count())
            .finish()
    }
}
