//! Test support: an in-process stand-in backend bound to an ephemeral
//! port, plus a client pointed at it.

use std::time::Duration;

use axum::Router;
use tiffin_orderflow::{BackendClient, Config};
use url::Url;

pub async fn serve(app: Router) -> Url {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve stand-in backend");
    });
    Url::parse(&format!("http://{addr}/")).expect("listener URL")
}

pub fn client_for(base: Url) -> BackendClient {
    let config = Config {
        backend_url: base,
        request_timeout: Duration::from_secs(5),
    };
    BackendClient::new(&config).expect("build backend client")
}
