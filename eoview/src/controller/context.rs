//! Shared dependencies handed from a controller to its children.

use std::rc::Rc;
use std::sync::Arc;

use crate::layer::LayerModel;
use crate::registry::{FactoryRegistry, InstanceRegistry};

/// Registries a controller tree works against.
///
/// Cloning is cheap; every controller in a tree shares the same registries.
#[derive(Clone, Debug)]
pub struct ControllerContext {
    factories: Arc<FactoryRegistry>,
    instances: Rc<InstanceRegistry<LayerModel>>,
}

impl ControllerContext {
    /// Uses `factories` with a fresh instance registry.
    pub fn new(factories: Arc<FactoryRegistry>) -> Self {
        Self {
            factories,
            instances: Rc::new(InstanceRegistry::new()),
        }
    }

    /// Uses the process-wide factory registry.
    pub fn global() -> Self {
        Self::new(FactoryRegistry::global())
    }

    pub fn factories(&self) -> &FactoryRegistry {
        &self.factories
    }

    /// Models currently attached through controllers sharing this context.
    pub fn instances(&self) -> &InstanceRegistry<LayerModel> {
        &self.instances
    }
}

impl Default for ControllerContext {
    fn default() -> Self {
        Self::global()
    }
}
