//! eoview - reactive layer kernel for Earth-observation map viewers
//!
//! This library keeps a rendering backend's native map resources in sync
//! with declarative layer models, and coordinates the async data requests
//! that feed charts and statistics panels.
//!
//! # Architecture
//!
//! ```text
//! LayerModel (observable fields, child list)
//!      │
//!      ▼
//! LayerController ──► FactoryRegistry ──► NativeResource
//!      │                                      ▲
//!      └── KeyedReconciler (group layers) ────┘ one child controller per child
//!
//! DataProcessing ──► AsyncRequestCoordinator ──► operation(params, token)
//!                          │
//!                          └──► LoadingState (watch)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use eoview::controller::LayerController;
//! use eoview::layer::LayerModel;
//! use eoview::registry::FactoryRegistry;
//!
//! FactoryRegistry::global().register("tile", |model, host| {
//!     Ok(Some(backend::create_tile_layer(model, host)?))
//! });
//!
//! let model = LayerModel::new("sentinel-2", "tile").into_shared();
//! let mut controller = LayerController::new(model.clone());
//! controller.attach(Some(&map))?;
//!
//! model.set_opacity(0.5); // forwarded to the native layer
//! ```

pub mod config;
pub mod controller;
pub mod layer;
pub mod logging;
pub mod processing;
pub mod reactive;
pub mod reconcile;
pub mod registry;
pub mod request;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
