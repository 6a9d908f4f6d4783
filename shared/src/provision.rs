use crate::accounts::AccountProvider;
use crate::directory::DirectoryStore;
use crate::error::ProvisionError;
use crate::types::{ProvisionUserRequest, ProvisionUserResponse};

/// Runs the provisioning pipeline for one request: caller verification,
/// MASTER check, body validation, account lookup-or-create, profile upsert
/// and (for teachers) assignment upserts. Stops at the first failure;
/// transport concerns stay with the HTTP handler.
pub async fn provision_user<A, D>(
    accounts: &A,
    directory: &D,
    authorization: Option<&str>,
    body: &[u8],
) -> Result<ProvisionUserResponse, ProvisionError>
where
    A: AccountProvider,
    D: DirectoryStore,
{
    let token = authorization
        .map(|header| header.strip_prefix("Bearer ").unwrap_or(header))
        .filter(|token| !token.is_empty())
        .ok_or(ProvisionError::MissingAuth)?;

    let caller_id = accounts
        .verify_token(token)
        .await
        .ok_or(ProvisionError::NotLogged)?;

    // Absent profile and wrong role fail the same check.
    let caller_role = directory.profile_role(&caller_id).await;
    if caller_role.as_deref() != Some("MASTER") {
        return Err(ProvisionError::NotMaster);
    }

    let request: ProvisionUserRequest =
        serde_json::from_slice(body).map_err(|e| ProvisionError::Unexpected(e.to_string()))?;

    let email = request.email.as_deref().unwrap_or("");
    let password = request.password.as_deref().unwrap_or("");
    let role = request.role.as_deref().unwrap_or("");
    let school_id = request.school_id.as_deref().unwrap_or("");
    if email.is_empty() || password.is_empty() || role.is_empty() || school_id.is_empty() {
        return Err(ProvisionError::MissingFields);
    }
    if !["SCHOOL_ADMIN", "TEACHER"].contains(&role) {
        return Err(ProvisionError::InvalidRole);
    }

    let user_id = match accounts.find_account_by_email(email).await.map_err(|e| {
        tracing::error!("Account lookup failed for {}: {}", email, e);
        ProvisionError::Unexpected(e.to_string())
    })? {
        Some(existing) => {
            tracing::info!("Reusing existing account for {}", email);
            existing
        }
        None => {
            let created = accounts.create_account(email, password).await.map_err(|e| {
                tracing::error!("Account creation failed for {}: {}", email, e);
                ProvisionError::Provider(e.to_string())
            })?;
            tracing::info!("Created account {} for {}", created, email);
            created
        }
    };

    directory
        .upsert_profile(&user_id, role, school_id)
        .await
        .map_err(|e| {
            tracing::error!("Profile upsert failed for {}: {}", user_id, e);
            ProvisionError::Provider(e.to_string())
        })?;

    if role == "TEACHER" {
        if let Some(turmas) = request.turmas.as_deref().filter(|t| !t.is_empty()) {
            directory
                .upsert_assignments(&user_id, school_id, turmas)
                .await
                .map_err(|e| {
                    tracing::error!("Assignment upsert failed for {}: {}", user_id, e);
                    ProvisionError::Provider(e.to_string())
                })?;
        }
    }

    Ok(ProvisionUserResponse { ok: true, user_id })
}
