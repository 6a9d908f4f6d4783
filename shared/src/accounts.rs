use async_trait::async_trait;
use aws_sdk_cognitoidentityprovider::error::ProvideErrorMetadata;
use aws_sdk_cognitoidentityprovider::types::{AttributeType, MessageActionType};
use aws_sdk_cognitoidentityprovider::Client as CognitoClient;
use thiserror::Error;

/// Identity-provider failure carrying the provider's own message.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct AccountError(pub String);

/// Seam to the external identity provider: token verification plus account
/// lookup and creation. Accounts are owned by the provider; this side never
/// stores them.
#[async_trait]
pub trait AccountProvider: Send + Sync {
    /// Resolve a bearer access token to the account id it belongs to.
    /// Every verification failure resolves to `None`.
    async fn verify_token(&self, access_token: &str) -> Option<String>;

    /// Exact-match account lookup by email. `Err` is a provider fault, not
    /// "absent".
    async fn find_account_by_email(&self, email: &str) -> Result<Option<String>, AccountError>;

    /// Create an account with the email pre-verified and no invitation sent,
    /// returning the new account id.
    async fn create_account(&self, email: &str, password: &str) -> Result<String, AccountError>;
}

/// Cognito-backed implementation, scoped to a single user pool.
pub struct CognitoAccounts {
    client: CognitoClient,
    user_pool_id: String,
}

impl CognitoAccounts {
    pub fn new(client: CognitoClient, user_pool_id: String) -> Self {
        Self {
            client,
            user_pool_id,
        }
    }
}

/// The `sub` attribute is the pool-unique account id.
fn sub_attribute(attributes: &[AttributeType]) -> Option<String> {
    attributes
        .iter()
        .find(|attr| attr.name() == "sub")
        .and_then(|attr| attr.value())
        .map(|value| value.to_string())
}

#[async_trait]
impl AccountProvider for CognitoAccounts {
    async fn verify_token(&self, access_token: &str) -> Option<String> {
        match self
            .client
            .get_user()
            .access_token(access_token)
            .send()
            .await
        {
            Ok(out) => sub_attribute(out.user_attributes()),
            Err(e) => {
                tracing::info!(
                    "Token verification failed: {}",
                    e.message().unwrap_or("unknown error")
                );
                None
            }
        }
    }

    async fn find_account_by_email(&self, email: &str) -> Result<Option<String>, AccountError> {
        let result = self
            .client
            .list_users()
            .user_pool_id(&self.user_pool_id)
            .filter(format!("email = \"{}\"", email))
            .limit(1)
            .send()
            .await
            .map_err(|e| {
                AccountError(e.message().unwrap_or("account lookup failed").to_string())
            })?;

        Ok(result
            .users()
            .iter()
            .find_map(|user| sub_attribute(user.attributes())))
    }

    async fn create_account(&self, email: &str, password: &str) -> Result<String, AccountError> {
        let email_attr = AttributeType::builder()
            .name("email")
            .value(email)
            .build()
            .map_err(|e| AccountError(e.to_string()))?;
        let verified_attr = AttributeType::builder()
            .name("email_verified")
            .value("true")
            .build()
            .map_err(|e| AccountError(e.to_string()))?;

        let created = self
            .client
            .admin_create_user()
            .user_pool_id(&self.user_pool_id)
            .username(email)
            .user_attributes(email_attr)
            .user_attributes(verified_attr)
            .message_action(MessageActionType::Suppress)
            .send()
            .await
            .map_err(|e| {
                AccountError(e.message().unwrap_or("account creation failed").to_string())
            })?;

        // AdminCreateUser only assigns a temporary password; the caller-chosen
        // one is applied permanently on top.
        self.client
            .admin_set_user_password()
            .user_pool_id(&self.user_pool_id)
            .username(email)
            .password(password)
            .permanent(true)
            .send()
            .await
            .map_err(|e| {
                AccountError(
                    e.message()
                        .unwrap_or("password assignment failed")
                        .to_string(),
                )
            })?;

        created
            .user()
            .and_then(|user| sub_attribute(user.attributes()))
            .ok_or_else(|| AccountError("provider returned no account id".to_string()))
    }
}
