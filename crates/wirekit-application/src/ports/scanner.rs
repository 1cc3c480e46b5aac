use std::sync::Arc;

use wirekit_domain::{FieldSpec, Holder, Meta};

/// A field found while walking a component and its embedded structs
#[derive(Debug, Clone)]
pub struct ScannedField {
    pub holder: Arc<Holder>,
    pub field: FieldSpec,
    /// Pre-order position within the component
    pub position: usize,
}

pub trait Scanner: Send + Sync {
    /// Every bindable field of `meta`, embedded fields included, in declaration order
    fn scan(&self, meta: &Meta) -> Vec<ScannedField>;
}
