//! Lookup tables shared by controllers.
//!
//! - [`FactoryRegistry`]: type tag → native resource factory, populated at
//!   startup and consulted on every attach.
//! - [`InstanceRegistry`]: id → weak instance, used by hosts to find the
//!   model behind an attached layer without extending its lifetime.

mod factory;
mod instances;

pub use factory::{BoxError, FactoryError, FactoryRegistry, ResourceFactory};
pub use instances::InstanceRegistry;
