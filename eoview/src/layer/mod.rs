//! Map layer models and the native-resource boundary.
//!
//! A [`LayerModel`] is the declarative side: what the user configured. A
//! [`NativeResource`] is the rendering backend's object mirroring it. The
//! two are bound together by a [`LayerController`](crate::controller::LayerController).

mod extent;
mod model;
mod native;

pub use extent::{Extent, ExtentError};
pub use model::{LayerConfig, LayerModel};
pub use native::{
    same_resource, NativeContainer, NativeHandle, NativeResource, ParentHost, ResourceHost,
};
