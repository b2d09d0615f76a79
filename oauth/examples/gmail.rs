use std::env;

use oauth::v2_0::{Client, RefreshAccessToken};

#[test_log::test(tokio::main)]
pub async fn main() {
    let client_id = env::var("CLIENT_ID").expect("Missing the CLIENT_ID environment variable");
    let client_secret =
        env::var("CLIENT_SECRET").expect("Missing the CLIENT_SECRET environment variable");
    let refresh_token =
        env::var("REFRESH_TOKEN").expect("Missing the REFRESH_TOKEN environment variable");

    let client = Client::new(
        client_id,
        Some(client_secret),
        "https://www.googleapis.com/oauth2/v3/token",
    )
    .unwrap();

    let (access_token, refresh_token) = RefreshAccessToken::new()
        .refresh_access_token(&client, refresh_token)
        .await
        .unwrap();

    println!("access token: {:?}", access_token);
    println!("new refresh token: {:?}", refresh_token);
}
