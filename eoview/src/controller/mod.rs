//! Layer controllers.
//!
//! A [`LayerController`] turns a [`LayerModel`](crate::layer::LayerModel)
//! into a live native resource on a host and keeps the two in sync until it
//! is detached. Group layers recursively get one child controller per child
//! model, maintained by a [`KeyedReconciler`](crate::reconcile::KeyedReconciler).
//!
//! Controllers resolve resource factories and record attached models through
//! a shared [`ControllerContext`].

mod context;
mod error;
mod layer;

pub use context::ControllerContext;
pub use error::ControllerError;
pub use layer::LayerController;
