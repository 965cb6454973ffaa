//! Error types for layer controllers.

use thiserror::Error;

use crate::registry::FactoryError;

/// Errors raised by [`LayerController::attach`](super::LayerController::attach).
///
/// Whenever one of these is returned the controller is fully detached.
#[derive(Debug, Error)]
pub enum ControllerError {
    /// The native resource could not be created
    #[error("failed to create resource for layer '{layer_id}': {source}")]
    Resource {
        layer_id: String,
        #[source]
        source: FactoryError,
    },

    /// A group layer's resource cannot hold children
    #[error("layer '{layer_id}' has children but its '{type_tag}' resource is not a container")]
    NotAContainer { layer_id: String, type_tag: String },

    /// A child layer failed to attach
    #[error("child layer '{child_id}' of '{parent_id}' failed to attach: {source}")]
    ChildAttach {
        parent_id: String,
        child_id: String,
        #[source]
        source: Box<ControllerError>,
    },
}

impl ControllerError {
    /// Id of the layer the error originated from (innermost child for
    /// nested failures).
    pub fn layer_id(&self) -> &str {
        match self {
            Self::Resource { layer_id, .. } | Self::NotAContainer { layer_id, .. } => layer_id,
            Self::ChildAttach { source, .. } => source.layer_id(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_error_display() {
        let err = ControllerError::Resource {
            layer_id: "ndvi".to_string(),
            source: FactoryError::UnknownType("volume".to_string()),
        };
        assert_eq!(
            err.to_string(),
            "failed to create resource for layer 'ndvi': no resource factory registered for type 'volume'"
        );
        assert_eq!(err.layer_id(), "ndvi");
    }

    #[test]
    fn test_nested_layer_id() {
        let err = ControllerError::ChildAttach {
            parent_id: "group".to_string(),
            child_id: "inner".to_string(),
            source: Box::new(ControllerError::NotAContainer {
                layer_id: "inner".to_string(),
                type_tag: "tile".to_string(),
            }),
        };
        assert_eq!(err.layer_id(), "inner");
        assert!(err.to_string().starts_with("child layer 'inner' of 'group'"));
    }
}
