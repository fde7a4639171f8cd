//! Integration test: start the webhook server on a free port, GET /, assert
//! the fixed probe body. Does not require OpenAI or a gateway account.

use lib::config::Config;
use lib::server;
use std::time::Duration;

fn free_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind free port");
    listener.local_addr().expect("local_addr").port()
}

#[tokio::test]
async fn health_route_reports_running() {
    let port = free_port();

    let mut config = Config::default();
    config.server.port = port;
    config.server.bind = "127.0.0.1".to_string();

    let server_handle = tokio::spawn(async move {
        let _ = server::run_server(config).await;
    });

    let url = format!("http://127.0.0.1:{}/", port);
    let client = reqwest::Client::new();
    let mut last_err = None;
    for _ in 0..100 {
        match client.get(&url).send().await {
            Ok(resp) if resp.status().is_success() => {
                let body = resp.text().await.expect("read body");
                assert_eq!(body, "Bot is running");
                return;
            }
            Ok(_) => {}
            Err(e) => last_err = Some(e),
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }

    server_handle.abort();
    panic!(
        "GET {} did not return 200 with the probe body within 5s; last error: {:?}",
        url, last_err
    );
}
