//! In-memory doubles for the two external-service seams, used by the test
//! suites in this workspace.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;

use crate::accounts::{AccountError, AccountProvider};
use crate::directory::{DirectoryError, DirectoryStore};

/// Identity provider backed by plain maps: issued tokens resolve to user ids,
/// accounts live in an append-only list keyed by email.
#[derive(Default)]
pub struct InMemoryAccounts {
    tokens: Mutex<HashMap<String, String>>,
    accounts: Mutex<Vec<(String, String)>>, // (account id, email)
    create_failure: Mutex<Option<String>>,
}

impl InMemoryAccounts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `token` verify as `user_id`.
    pub fn issue_token(&self, token: &str, user_id: &str) {
        self.tokens
            .lock()
            .unwrap()
            .insert(token.to_string(), user_id.to_string());
    }

    /// Fail the next `create_account` call with `message`.
    pub fn fail_next_create(&self, message: &str) {
        *self.create_failure.lock().unwrap() = Some(message.to_string());
    }

    pub fn account_count(&self) -> usize {
        self.accounts.lock().unwrap().len()
    }
}

#[async_trait]
impl AccountProvider for InMemoryAccounts {
    async fn verify_token(&self, access_token: &str) -> Option<String> {
        self.tokens.lock().unwrap().get(access_token).cloned()
    }

    async fn find_account_by_email(&self, email: &str) -> Result<Option<String>, AccountError> {
        Ok(self
            .accounts
            .lock()
            .unwrap()
            .iter()
            .find(|(_, stored)| stored == email)
            .map(|(id, _)| id.clone()))
    }

    async fn create_account(&self, email: &str, _password: &str) -> Result<String, AccountError> {
        if let Some(message) = self.create_failure.lock().unwrap().take() {
            return Err(AccountError(message));
        }
        let id = Uuid::new_v4().to_string();
        self.accounts
            .lock()
            .unwrap()
            .push((id.clone(), email.to_string()));
        Ok(id)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProfileRow {
    pub role: String,
    pub school_id: String,
}

/// Directory store holding profile rows keyed by user id and assignment rows
/// keyed by the (teacher, school, class) composite.
#[derive(Default)]
pub struct InMemoryDirectory {
    profiles: Mutex<HashMap<String, ProfileRow>>,
    assignments: Mutex<Vec<(String, String, String)>>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed_profile(&self, user_id: &str, role: &str, school_id: &str) {
        self.profiles.lock().unwrap().insert(
            user_id.to_string(),
            ProfileRow {
                role: role.to_string(),
                school_id: school_id.to_string(),
            },
        );
    }

    pub fn profile(&self, user_id: &str) -> Option<ProfileRow> {
        self.profiles.lock().unwrap().get(user_id).cloned()
    }

    /// Assignment rows for one teacher, in insertion order.
    pub fn assignments_for(&self, teacher_id: &str) -> Vec<(String, String, String)> {
        self.assignments
            .lock()
            .unwrap()
            .iter()
            .filter(|(teacher, _, _)| teacher == teacher_id)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl DirectoryStore for InMemoryDirectory {
    async fn profile_role(&self, user_id: &str) -> Option<String> {
        self.profiles
            .lock()
            .unwrap()
            .get(user_id)
            .map(|profile| profile.role.clone())
    }

    async fn upsert_profile(
        &self,
        user_id: &str,
        role: &str,
        school_id: &str,
    ) -> Result<(), DirectoryError> {
        self.profiles.lock().unwrap().insert(
            user_id.to_string(),
            ProfileRow {
                role: role.to_string(),
                school_id: school_id.to_string(),
            },
        );
        Ok(())
    }

    async fn upsert_assignments(
        &self,
        teacher_id: &str,
        school_id: &str,
        class_ids: &[String],
    ) -> Result<(), DirectoryError> {
        let mut rows = self.assignments.lock().unwrap();
        for class_id in class_ids {
            let row = (
                teacher_id.to_string(),
                school_id.to_string(),
                class_id.clone(),
            );
            // Overwrite semantics on the composite key.
            if !rows.contains(&row) {
                rows.push(row);
            }
        }
        Ok(())
    }
}
