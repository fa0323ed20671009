//! Shared utilities for the API and cluster integration tests.

use std::sync::Arc;
use std::time::Duration;

use users_cluster::cluster::Replicator;
use users_cluster::http::ApiServer;
use users_cluster::users::UserStore;

/// Serve the users API in-process on an ephemeral port. Returns the base
/// URL and a handle to the backing store for white-box assertions.
#[allow(dead_code)]
pub async fn start_api_server() -> (String, Arc<UserStore>) {
    let store = Arc::new(UserStore::new());
    let server = ApiServer::new(store.clone(), Replicator::disconnected());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = server.run(listener).await;
    });

    (format!("http://{addr}"), store)
}

/// HTTP client that never picks up a system proxy.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}

/// Poll `GET {base}/api/users` until the server answers, or panic after a
/// generous startup budget.
#[allow(dead_code)]
pub async fn wait_until_ready(client: &reqwest::Client, base: &str) {
    for _ in 0..100 {
        if let Ok(response) = client.get(format!("{base}/api/users")).send().await {
            if response.status().is_success() {
                return;
            }
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    panic!("server at {base} did not become ready");
}
