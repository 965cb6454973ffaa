//! Declarative layer model.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use super::extent::Extent;
use super::native::NativeHandle;
use crate::reactive::{Observable, ObservableSequence};
use crate::reconcile::{Key, Keyed};

/// Free-form backend settings (tile URL template, style name, band mode...).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LayerConfig {
    values: BTreeMap<String, String>,
}

impl LayerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a setting.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Declarative state of one map layer.
///
/// The baseline fields (`opacity`, `visible`, `extent`, `z_index`) are
/// observable; a controller attached to the model mirrors every change onto
/// the native resource. Group layers additionally carry an ordered child
/// list.
pub struct LayerModel {
    id: String,
    type_tag: String,
    config: LayerConfig,
    opacity: Observable<f64>,
    visible: Observable<bool>,
    extent: Observable<Option<Extent>>,
    z_index: Observable<i32>,
    children: Option<ObservableSequence<Rc<LayerModel>>>,
    native: RefCell<Option<NativeHandle>>,
}

impl LayerModel {
    /// Creates a visible, fully opaque layer with no extent.
    pub fn new(id: impl Into<String>, type_tag: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            type_tag: type_tag.into(),
            config: LayerConfig::default(),
            opacity: Observable::new(1.0),
            visible: Observable::new(true),
            extent: Observable::new(None),
            z_index: Observable::new(0),
            children: None,
            native: RefCell::new(None),
        }
    }

    pub fn with_config(mut self, config: LayerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_opacity(self, opacity: f64) -> Self {
        self.set_opacity(opacity);
        self
    }

    pub fn with_visible(self, visible: bool) -> Self {
        self.visible.set(visible);
        self
    }

    pub fn with_extent(self, extent: Extent) -> Self {
        self.extent.set(Some(extent));
        self
    }

    pub fn with_z_index(self, z_index: i32) -> Self {
        self.z_index.set(z_index);
        self
    }

    /// Turns the model into a group holding `children`.
    pub fn with_children(mut self, children: Vec<Rc<LayerModel>>) -> Self {
        self.children = Some(ObservableSequence::from_vec(children));
        self
    }

    /// Wraps the model for sharing with controllers and parent lists.
    pub fn into_shared(self) -> Rc<LayerModel> {
        Rc::new(self)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Tag used to look up the resource factory.
    pub fn type_tag(&self) -> &str {
        &self.type_tag
    }

    pub fn config(&self) -> &LayerConfig {
        &self.config
    }

    pub fn opacity(&self) -> f64 {
        self.opacity.get()
    }

    /// Sets opacity, clamped to `0.0..=1.0`. NaN is ignored.
    pub fn set_opacity(&self, opacity: f64) {
        if opacity.is_nan() {
            return;
        }
        self.opacity.set(opacity.clamp(0.0, 1.0));
    }

    pub fn opacity_observable(&self) -> &Observable<f64> {
        &self.opacity
    }

    pub fn is_visible(&self) -> bool {
        self.visible.get()
    }

    pub fn set_visible(&self, visible: bool) {
        self.visible.set(visible);
    }

    pub fn visible_observable(&self) -> &Observable<bool> {
        &self.visible
    }

    pub fn extent(&self) -> Option<Extent> {
        self.extent.get()
    }

    pub fn set_extent(&self, extent: Option<Extent>) {
        self.extent.set(extent);
    }

    pub fn extent_observable(&self) -> &Observable<Option<Extent>> {
        &self.extent
    }

    pub fn z_index(&self) -> i32 {
        self.z_index.get()
    }

    pub fn set_z_index(&self, z_index: i32) {
        self.z_index.set(z_index);
    }

    pub fn z_index_observable(&self) -> &Observable<i32> {
        &self.z_index
    }

    /// Child list of a group layer.
    pub fn children(&self) -> Option<&ObservableSequence<Rc<LayerModel>>> {
        self.children.as_ref()
    }

    pub fn is_group(&self) -> bool {
        self.children.is_some()
    }

    /// Native resource currently mirroring this model, if attached.
    pub fn native_handle(&self) -> Option<NativeHandle> {
        self.native.borrow().clone()
    }

    pub fn is_attached(&self) -> bool {
        self.native.borrow().is_some()
    }

    pub(crate) fn set_native_handle(&self, handle: Option<NativeHandle>) {
        *self.native.borrow_mut() = handle;
    }
}

impl Keyed for LayerModel {
    fn key(&self) -> Key {
        self.id.clone()
    }
}

impl fmt::Debug for LayerModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LayerModel")
            .field("id", &self.id)
            .field("type_tag", &self.type_tag)
            .field("opacity", &self.opacity())
            .field("visible", &self.is_visible())
            .field("extent", &self.extent())
            .field("z_index", &self.z_index())
            .field("children", &self.children.as_ref().map(|c| c.len()))
            .field("attached", &self.is_attached())
            .finish()
    }
}
