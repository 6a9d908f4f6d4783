use lambda_http::http::StatusCode;
use thiserror::Error;

/// Terminal failure of the provisioning pipeline. The display text of each
/// variant is exactly the `message` the caller receives.
#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error("missing auth")]
    MissingAuth,
    #[error("not logged")]
    NotLogged,
    #[error("only MASTER")]
    NotMaster,
    #[error("email/password/role/school_id required")]
    MissingFields,
    #[error("invalid role")]
    InvalidRole,
    /// Provider-reported failure, surfaced verbatim (account creation or
    /// either upsert).
    #[error("{0}")]
    Provider(String),
    /// Anything the pipeline cannot classify: body parse failures, lookup
    /// faults.
    #[error("{0}")]
    Unexpected(String),
}

impl ProvisionError {
    pub fn status(&self) -> StatusCode {
        match self {
            ProvisionError::MissingAuth | ProvisionError::NotLogged => StatusCode::UNAUTHORIZED,
            ProvisionError::NotMaster => StatusCode::FORBIDDEN,
            ProvisionError::MissingFields
            | ProvisionError::InvalidRole
            | ProvisionError::Provider(_) => StatusCode::BAD_REQUEST,
            ProvisionError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ProvisionError::MissingAuth.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ProvisionError::NotLogged.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ProvisionError::NotMaster.status(), StatusCode::FORBIDDEN);
        assert_eq!(ProvisionError::MissingFields.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ProvisionError::InvalidRole.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ProvisionError::Provider("duplicate".to_string()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ProvisionError::Unexpected("boom".to_string()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_messages_match_contract() {
        assert_eq!(ProvisionError::MissingAuth.to_string(), "missing auth");
        assert_eq!(ProvisionError::NotLogged.to_string(), "not logged");
        assert_eq!(ProvisionError::NotMaster.to_string(), "only MASTER");
        assert_eq!(
            ProvisionError::MissingFields.to_string(),
            "email/password/role/school_id required"
        );
        assert_eq!(ProvisionError::InvalidRole.to_string(), "invalid role");
        assert_eq!(
            ProvisionError::Provider("User already exists".to_string()).to_string(),
            "User already exists"
        );
    }
}
