//! Boundary traits for native rendering resources.
//!
//! Rendering backends (tile, vector, volume renderers) implement these
//! traits. Controllers only ever talk to a backend through them.
//!
//! Every method takes `&self`; backends hold their mutable state behind
//! `Cell`/`RefCell` since handles are shared with field observers.

use std::fmt;
use std::rc::Rc;

use super::extent::Extent;

/// Shared handle to a native resource.
pub type NativeHandle = Rc<dyn NativeResource>;

/// Something a layer can be attached to: a map renderer, or the native
/// container of a parent layer.
pub trait ResourceHost {
    /// Identifier used in logs.
    fn host_id(&self) -> &str;

    /// The parent's native resource when attaching a child layer.
    fn parent_resource(&self) -> Option<&NativeHandle> {
        None
    }
}

/// A resource created by a factory for one layer model.
pub trait NativeResource {
    /// Identifier of the resource, usually the layer id.
    fn resource_id(&self) -> &str;

    fn set_opacity(&self, opacity: f64);

    fn set_visible(&self, visible: bool);

    fn set_extent(&self, extent: Option<Extent>);

    fn set_z_index(&self, z_index: i32);

    /// Container view for resources that hold child resources.
    fn as_container(&self) -> Option<&dyn NativeContainer> {
        None
    }

    /// Releases backend state. Called exactly once by the owning controller.
    fn destroy(&self);
}

/// Ordered child storage of a group resource.
pub trait NativeContainer {
    /// Inserts `child` at `index`; implementations clamp `index` to their length.
    fn insert_child(&self, index: usize, child: NativeHandle);

    /// Removes `child` (by identity). Returns false if it was not present.
    fn remove_child(&self, child: &NativeHandle) -> bool;

    fn child_count(&self) -> usize;
}

/// Host adapter used when attaching a child layer to its parent.
#[derive(Clone)]
pub struct ParentHost {
    parent: NativeHandle,
}

impl ParentHost {
    pub fn new(parent: NativeHandle) -> Self {
        Self { parent }
    }
}

impl ResourceHost for ParentHost {
    fn host_id(&self) -> &str {
        self.parent.resource_id()
    }

    fn parent_resource(&self) -> Option<&NativeHandle> {
        Some(&self.parent)
    }
}

impl fmt::Debug for ParentHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParentHost")
            .field("parent", &self.parent.resource_id())
            .finish()
    }
}

/// Compares two handles by identity.
pub fn same_resource(a: &NativeHandle, b: &NativeHandle) -> bool {
    std::ptr::addr_eq(Rc::as_ptr(a), Rc::as_ptr(b))
}
