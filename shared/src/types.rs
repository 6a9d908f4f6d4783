use serde::{Deserialize, Serialize};

// ========== PROVISIONING ==========
/// Body of the provisioning request. Every field is optional at the parse
/// layer so that a well-formed object with missing fields reaches the
/// presence check instead of failing deserialization.
#[derive(Debug, Deserialize)]
pub struct ProvisionUserRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>, // SCHOOL_ADMIN | TEACHER
    pub school_id: Option<String>,
    pub turmas: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
pub struct ProvisionUserResponse {
    pub ok: bool,
    pub user_id: String,
}
