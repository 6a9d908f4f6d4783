pub mod accounts;
pub mod directory;
pub mod error;
pub mod provision;
pub mod testing;
pub mod types;

use std::sync::Arc;

use crate::accounts::AccountProvider;
use crate::directory::DirectoryStore;

/// Shared application state
pub struct AppState<A, D> {
    pub accounts: A,
    pub directory: D,
}

impl<A: AccountProvider, D: DirectoryStore> AppState<A, D> {
    pub fn new(accounts: A, directory: D) -> Arc<Self> {
        Arc::new(Self {
            accounts,
            directory,
        })
    }
}
