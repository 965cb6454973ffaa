//! Resource factory registry.
//!
//! Maps a layer's type tag to the function that builds its native resource.
//! Backends register their factories once at startup; controllers look them
//! up on every attach.
//!
//! # Example
//!
//! ```ignore
//! use eoview::registry::FactoryRegistry;
//!
//! FactoryRegistry::global().register("tile", |model, host| {
//!     Ok(Some(TileRenderer::create(model, host)?))
//! });
//! ```

use std::error::Error as StdError;
use std::sync::{Arc, OnceLock};

use dashmap::DashMap;
use thiserror::Error;
use tracing::{debug, warn};

use crate::layer::{LayerModel, NativeHandle, ResourceHost};

/// Error type factories may return.
pub type BoxError = Box<dyn StdError + Send + Sync>;

/// Builds the native resource for a model. `Ok(None)` means the backend
/// declined to create one.
pub type ResourceFactory =
    Arc<dyn Fn(&LayerModel, &dyn ResourceHost) -> Result<Option<NativeHandle>, BoxError> + Send + Sync>;

/// Errors raised while creating a native resource.
#[derive(Debug, Error)]
pub enum FactoryError {
    /// No factory registered for the tag
    #[error("no resource factory registered for type '{0}'")]
    UnknownType(String),

    /// The factory returned an error
    #[error("resource factory for type '{type_tag}' failed: {source}")]
    Construction {
        type_tag: String,
        #[source]
        source: BoxError,
    },

    /// The factory returned no resource
    #[error("resource factory for type '{0}' produced no resource")]
    NoResource(String),
}

/// Type tag → factory mapping.
///
/// Lookups clone the factory out of the map before calling it, so a factory
/// may itself consult the registry.
#[derive(Default)]
pub struct FactoryRegistry {
    factories: DashMap<String, ResourceFactory>,
}

static GLOBAL: OnceLock<Arc<FactoryRegistry>> = OnceLock::new();

impl FactoryRegistry {
    /// Creates an empty, isolated registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide registry.
    pub fn global() -> Arc<FactoryRegistry> {
        Arc::clone(GLOBAL.get_or_init(|| Arc::new(FactoryRegistry::new())))
    }

    /// Registers `factory` under `type_tag`, returning the one it replaces.
    pub fn register<F>(&self, type_tag: impl Into<String>, factory: F) -> Option<ResourceFactory>
    where
        F: Fn(&LayerModel, &dyn ResourceHost) -> Result<Option<NativeHandle>, BoxError>
            + Send
            + Sync
            + 'static,
    {
        let type_tag = type_tag.into();
        let previous = self.factories.insert(type_tag.clone(), Arc::new(factory));
        if previous.is_some() {
            warn!(type_tag = %type_tag, "Replacing existing resource factory");
        } else {
            debug!(type_tag = %type_tag, "Registered resource factory");
        }
        previous
    }

    /// Removes the factory for `type_tag`.
    pub fn unregister(&self, type_tag: &str) -> Option<ResourceFactory> {
        self.factories.remove(type_tag).map(|(_, factory)| factory)
    }

    pub fn contains(&self, type_tag: &str) -> bool {
        self.factories.contains_key(type_tag)
    }

    /// Registered tags, sorted.
    pub fn type_tags(&self) -> Vec<String> {
        let mut tags: Vec<String> = self.factories.iter().map(|e| e.key().clone()).collect();
        tags.sort();
        tags
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// Builds the native resource for `model` on `host`.
    pub fn create(
        &self,
        model: &LayerModel,
        host: &dyn ResourceHost,
    ) -> Result<NativeHandle, FactoryError> {
        let type_tag = model.type_tag();
        let factory = self
            .factories
            .get(type_tag)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| FactoryError::UnknownType(type_tag.to_string()))?;

        match factory(model, host) {
            Ok(Some(handle)) => Ok(handle),
            Ok(None) => Err(FactoryError::NoResource(type_tag.to_string())),
            Err(source) => Err(FactoryError::Construction {
                type_tag: type_tag.to_string(),
                source,
            }),
        }
    }
}

impl std::fmt::Debug for FactoryRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FactoryRegistry")
            .field("type_tags", &self.type_tags())
            .finish()
    }
}
