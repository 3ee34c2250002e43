use serde::{Deserialize, Serialize};

/// Optional annotations attached to a network spec.
/// All fields are Option<> so specs written without metadata deserialize cleanly.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ModelMetadata {
    /// Short human-readable label, used in chart legends (e.g. "Base").
    pub label: Option<String>,
}
