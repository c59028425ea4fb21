// libs/doctor-cell/src/models.rs
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Provider record, read-only to the scheduling side. `name` is the key the
/// appointment records reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Doctor {
    pub id: Uuid,
    pub name: String,
    pub specialization: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}
