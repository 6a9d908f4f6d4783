use escola_shared::accounts::AccountProvider;
use escola_shared::directory::DirectoryStore;
use escola_shared::{provision, AppState};
use lambda_http::{
    http::{Method, StatusCode},
    Body, Error, Request, Response,
};
use std::sync::Arc;

/// Single-route handler: POST provisions an account, every other method is
/// rejected up front.
pub(crate) async fn function_handler<A, D>(
    event: Request,
    state: Arc<AppState<A, D>>,
) -> Result<Response<Body>, Error>
where
    A: AccountProvider,
    D: DirectoryStore,
{
    tracing::info!("Provision Lambda invoked - Method: {}", event.method());

    if event.method() != Method::POST {
        return Ok(Response::builder()
            .status(StatusCode::METHOD_NOT_ALLOWED)
            .body(Body::from("Method not allowed"))
            .map_err(Box::new)?);
    }

    let authorization = event
        .headers()
        .get("Authorization")
        .and_then(|value| value.to_str().ok());

    match provision::provision_user(&state.accounts, &state.directory, authorization, event.body())
        .await
    {
        Ok(created) => Ok(Response::builder()
            .status(StatusCode::OK)
            .header("Content-Type", "application/json")
            .body(serde_json::to_string(&created)?.into())
            .map_err(Box::new)?),
        Err(error) => {
            if error.status() == StatusCode::INTERNAL_SERVER_ERROR {
                tracing::error!("Provisioning failed unexpectedly: {}", error);
            }
            Ok(Response::builder()
                .status(error.status())
                .body(
                    serde_json::json!({"message": error.to_string()})
                        .to_string()
                        .into(),
                )
                .map_err(Box::new)?)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use escola_shared::testing::{InMemoryAccounts, InMemoryDirectory};
    use lambda_http::http;

    fn master_state() -> Arc<AppState<InMemoryAccounts, InMemoryDirectory>> {
        let accounts = InMemoryAccounts::new();
        accounts.issue_token("master-token", "master-1");
        let directory = InMemoryDirectory::new();
        directory.seed_profile("master-1", "MASTER", "S1");
        AppState::new(accounts, directory)
    }

    fn request(method: &str, authorization: Option<&str>, body: &str) -> Request {
        let mut builder = http::Request::builder().method(method).uri("/");
        if let Some(value) = authorization {
            builder = builder.header("Authorization", value);
        }
        builder.body(Body::from(body)).unwrap()
    }

    fn teacher_body() -> String {
        serde_json::json!({
            "email": "t@x.com",
            "password": "pw123456",
            "role": "TEACHER",
            "school_id": "S1",
            "turmas": ["C1", "C2"],
        })
        .to_string()
    }

    #[tokio::test]
    async fn test_non_post_methods_are_rejected() {
        for method in ["GET", "PUT", "PATCH", "DELETE", "OPTIONS"] {
            let response =
                function_handler(request(method, None, ""), master_state())
                    .await
                    .unwrap();

            assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
            let body = String::from_utf8(response.body().to_vec()).unwrap();
            assert_eq!(body, "Method not allowed");
        }
    }

    #[tokio::test]
    async fn test_missing_auth_is_401() {
        let response = function_handler(request("POST", None, &teacher_body()), master_state())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body: serde_json::Value =
            serde_json::from_slice(&response.body().to_vec()).unwrap();
        assert_eq!(body["message"], "missing auth");
    }

    #[tokio::test]
    async fn test_unknown_token_is_401() {
        let response = function_handler(
            request("POST", Some("Bearer nope"), &teacher_body()),
            master_state(),
        )
        .await
        .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body: serde_json::Value =
            serde_json::from_slice(&response.body().to_vec()).unwrap();
        assert_eq!(body["message"], "not logged");
    }

    #[tokio::test]
    async fn test_non_master_is_403() {
        let state = master_state();
        state.accounts.issue_token("teacher-token", "teacher-1");
        state.directory.seed_profile("teacher-1", "TEACHER", "S1");

        let response = function_handler(
            request("POST", Some("Bearer teacher-token"), &teacher_body()),
            state,
        )
        .await
        .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let body: serde_json::Value =
            serde_json::from_slice(&response.body().to_vec()).unwrap();
        assert_eq!(body["message"], "only MASTER");
    }

    #[tokio::test]
    async fn test_malformed_body_is_500() {
        let response = function_handler(
            request("POST", Some("Bearer master-token"), "{not json"),
            master_state(),
        )
        .await
        .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_provisioning_succeeds_end_to_end() {
        let state = master_state();

        let response = function_handler(
            request("POST", Some("Bearer master-token"), &teacher_body()),
            Arc::clone(&state),
        )
        .await
        .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get("Content-Type").unwrap(),
            "application/json"
        );

        let body: serde_json::Value =
            serde_json::from_slice(&response.body().to_vec()).unwrap();
        assert_eq!(body["ok"], true);
        let user_id = body["user_id"].as_str().unwrap();

        let profile = state.directory.profile(user_id).unwrap();
        assert_eq!(profile.role, "TEACHER");
        assert_eq!(profile.school_id, "S1");
        assert_eq!(state.directory.assignments_for(user_id).len(), 2);
    }
}
