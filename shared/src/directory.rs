use async_trait::async_trait;
use aws_sdk_dynamodb::error::ProvideErrorMetadata;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client as DynamoClient;
use thiserror::Error;

/// Store failure carrying the provider's own message.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct DirectoryError(pub String);

/// Seam to the external directory store: the profile table and the
/// teacher-assignment table.
#[async_trait]
pub trait DirectoryStore: Send + Sync {
    /// Stored profile role for a user. `None` covers both an absent row and
    /// an unreadable one; the caller treats them the same.
    async fn profile_role(&self, user_id: &str) -> Option<String>;

    /// Write the profile row for `user_id`, replacing any previous row.
    async fn upsert_profile(
        &self,
        user_id: &str,
        role: &str,
        school_id: &str,
    ) -> Result<(), DirectoryError>;

    /// Write one assignment row per class id, in order. Rewriting an existing
    /// `(teacher, school, class)` row overwrites it in place.
    async fn upsert_assignments(
        &self,
        teacher_id: &str,
        school_id: &str,
        class_ids: &[String],
    ) -> Result<(), DirectoryError>;
}

/// DynamoDB-backed implementation using the single-table `PK`/`SK` layout.
pub struct DynamoDirectory {
    client: DynamoClient,
    table_name: String,
}

impl DynamoDirectory {
    pub fn new(client: DynamoClient, table_name: String) -> Self {
        Self { client, table_name }
    }
}

fn profile_key(user_id: &str) -> String {
    format!("PROFILE#{}", user_id)
}

fn assignment_sort_key(school_id: &str, class_id: &str) -> String {
    format!("ASSIGN#{}#{}", school_id, class_id)
}

#[async_trait]
impl DirectoryStore for DynamoDirectory {
    async fn profile_role(&self, user_id: &str) -> Option<String> {
        let pk = profile_key(user_id);

        let result = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .key("PK", AttributeValue::S(pk.clone()))
            .key("SK", AttributeValue::S(pk))
            .send()
            .await;

        match result {
            Ok(out) => out
                .item()
                .and_then(|item| item.get("role"))
                .and_then(|v| v.as_s().ok())
                .map(|s| s.to_string()),
            Err(e) => {
                tracing::error!(
                    "Failed to read profile for {}: {}",
                    user_id,
                    e.message().unwrap_or("unknown error")
                );
                None
            }
        }
    }

    async fn upsert_profile(
        &self,
        user_id: &str,
        role: &str,
        school_id: &str,
    ) -> Result<(), DirectoryError> {
        let pk = profile_key(user_id);
        let now = chrono::Utc::now().to_rfc3339();

        self.client
            .put_item()
            .table_name(&self.table_name)
            .item("PK", AttributeValue::S(pk.clone()))
            .item("SK", AttributeValue::S(pk))
            .item("user_id", AttributeValue::S(user_id.to_string()))
            .item("role", AttributeValue::S(role.to_string()))
            .item("school_id", AttributeValue::S(school_id.to_string()))
            .item("updated_at", AttributeValue::S(now))
            .send()
            .await
            .map_err(|e| {
                DirectoryError(e.message().unwrap_or("profile upsert failed").to_string())
            })?;

        Ok(())
    }

    async fn upsert_assignments(
        &self,
        teacher_id: &str,
        school_id: &str,
        class_ids: &[String],
    ) -> Result<(), DirectoryError> {
        let now = chrono::Utc::now().to_rfc3339();

        for class_id in class_ids {
            self.client
                .put_item()
                .table_name(&self.table_name)
                .item(
                    "PK",
                    AttributeValue::S(format!("TEACHER#{}", teacher_id)),
                )
                .item(
                    "SK",
                    AttributeValue::S(assignment_sort_key(school_id, class_id)),
                )
                .item("teacher_id", AttributeValue::S(teacher_id.to_string()))
                .item("school_id", AttributeValue::S(school_id.to_string()))
                .item("class_id", AttributeValue::S(class_id.to_string()))
                .item("assigned_at", AttributeValue::S(now.clone()))
                .send()
                .await
                .map_err(|e| {
                    DirectoryError(
                        e.message()
                            .unwrap_or("assignment upsert failed")
                            .to_string(),
                    )
                })?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_key() {
        assert_eq!(profile_key("abc-123"), "PROFILE#abc-123");
    }

    #[test]
    fn test_assignment_sort_key() {
        assert_eq!(assignment_sort_key("S1", "C1"), "ASSIGN#S1#C1");
        assert_ne!(
            assignment_sort_key("S1", "C1"),
            assignment_sort_key("S1", "C2")
        );
        assert_ne!(
            assignment_sort_key("S1", "C1"),
            assignment_sort_key("S2", "C1")
        );
    }
}
