//! Shared test utilities for dindinho-db unit tests.

#[cfg(test)]
pub(crate) mod helpers {
    use dindinho_core::entities::{Account, User};
    use dindinho_schema::schemas::account::CreateAccount;
    use serde_json::json;

    use crate::service::DindinhoService;

    /// In-memory service with migrations applied.
    pub async fn test_service() -> DindinhoService {
        DindinhoService::new_local(":memory:").await.unwrap()
    }

    /// Create a user with a throwaway password hash.
    pub async fn create_test_user(svc: &DindinhoService, name: &str, email: &str) -> User {
        svc.create_user(name, email, "$argon2id$test", None).await.unwrap()
    }

    /// Create a standard account owned by `owner_id`.
    pub async fn create_test_account(svc: &DindinhoService, owner_id: &str, name: &str) -> Account {
        let input = CreateAccount::parse(&json!({ "name": name })).unwrap();
        svc.create_account(owner_id, &input).await.unwrap()
    }
}
