use oauth::v2_0::{Client, Error, RefreshAccessToken};
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::TcpListener,
};

/// Spawns a token endpoint answering every request with the given
/// status and JSON body, and returns its URL.
async fn spawn_token_endpoint(status: &'static str, body: &'static str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();

        let mut req = Vec::new();
        let mut buf = [0; 1024];
        while !String::from_utf8_lossy(&req).contains("refresh_token=") {
            let n = stream.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            req.extend_from_slice(&buf[..n]);
        }

        let res = format!(
            "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
            body.len()
        );
        stream.write_all(res.as_bytes()).await.unwrap();
        stream.shutdown().await.unwrap();
    });

    format!("http://{addr}/token")
}

#[test_log::test(tokio::test)]
async fn refresh_access_token() {
    let url = spawn_token_endpoint(
        "200 OK",
        r#"{"access_token":"ya29.access","token_type":"Bearer","expires_in":3599}"#,
    )
    .await;

    let client = Client::new("id", Some("secret"), url).unwrap();
    let (access_token, refresh_token) = RefreshAccessToken::new()
        .refresh_access_token(&client, "refresh")
        .await
        .unwrap();

    assert_eq!(access_token, "ya29.access");
    assert_eq!(refresh_token, None);
}

#[test_log::test(tokio::test)]
async fn rejected_refresh_token() {
    let url = spawn_token_endpoint(
        "400 Bad Request",
        r#"{"error":"invalid_grant","error_description":"Token has been expired or revoked."}"#,
    )
    .await;

    let client = Client::new("id", Some("secret"), url).unwrap();
    let err = RefreshAccessToken::new()
        .refresh_access_token(&client, "refresh")
        .await
        .unwrap_err();

    assert!(err.is_rejected());
    assert_eq!(
        err.to_string(),
        "cannot refresh access token: token endpoint answered invalid_grant (Token has been expired or revoked.)"
    );
}

#[test_log::test(tokio::test)]
async fn unreachable_token_endpoint() {
    let addr = TcpListener::bind("127.0.0.1:0")
        .await
        .unwrap()
        .local_addr()
        .unwrap();

    let client = Client::new("id", Some("secret"), format!("http://{addr}/token")).unwrap();
    let err = RefreshAccessToken::new()
        .refresh_access_token(&client, "refresh")
        .await
        .unwrap_err();

    assert!(!err.is_rejected());
    assert!(matches!(err, Error::SendRefreshAccessTokenRequestError(_)));
}
