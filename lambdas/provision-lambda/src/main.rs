use aws_sdk_cognitoidentityprovider::Client as CognitoClient;
use aws_sdk_dynamodb::Client as DynamoClient;
use escola_shared::accounts::CognitoAccounts;
use escola_shared::directory::DynamoDirectory;
use escola_shared::AppState;
use lambda_http::{run, service_fn, tracing, Error, Request};
use std::env;
use std::sync::Arc;

mod http_handler;

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing::init_default_subscriber();

    // Initialize AWS clients once at startup
    let config = aws_config::load_from_env().await;
    let user_pool_id =
        env::var("COGNITO_USER_POOL_ID").expect("COGNITO_USER_POOL_ID must be set");
    let table_name = env::var("TABLE_NAME").expect("TABLE_NAME must be set");

    let state = AppState::new(
        CognitoAccounts::new(CognitoClient::new(&config), user_pool_id),
        DynamoDirectory::new(DynamoClient::new(&config), table_name),
    );

    run(service_fn(move |event: Request| {
        let state = Arc::clone(&state);
        async move { http_handler::function_handler(event, state).await }
    }))
    .await
}
