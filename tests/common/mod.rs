//! Shared test utilities.

#![allow(dead_code, unused_imports)]

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use navbridge::config::Config;
use navbridge::server::{NavigationServer, ServerHandle};
use tempfile::TempDir;

/// Create a temporary config file with the given TOML content.
pub fn temp_config(content: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = temp_dir.path().join("config.toml");
    std::fs::write(&config_path, content).expect("Failed to write config");
    (temp_dir, config_path)
}

/// Config used by the HTTP tests: context path `/app` and one mapping
/// redirecting `show` to a bookmarkable hotel URL.
pub fn test_config() -> Config {
    let content = r#"
[server]
bind_addr = "127.0.0.1:0"
context_path = "/app"

[[navigation.mappings]]
outcome = "show"
destination = "redirect:/hotels/{id}"
model = { id = 12 }

[[views.named]]
name = "home"
template = "/WEB-INF/views/index.xhtml"
"#;
    toml::from_str(content).expect("test config parses")
}

/// Start a server on a free port and return its address and handle.
pub async fn start_server(config: &Config) -> (SocketAddr, ServerHandle) {
    let mut server = NavigationServer::new(config);
    let addr = server
        .try_bind(&config.server.bind_addr)
        .await
        .expect("Failed to bind");
    let handle = server.handle();

    tokio::spawn(async move {
        let _ = server.run().await;
    });
    tokio::time::sleep(Duration::from_millis(50)).await;

    (addr, handle)
}

/// Client that leaves redirects to the test.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .expect("Failed to build client")
}

/// Encode form fields as `application/x-www-form-urlencoded`.
pub fn form_body(fields: &[(&str, &str)]) -> String {
    fields
        .iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

/// Pull the view state token out of a rendered page.
pub fn token_from_page(page: &str) -> String {
    let marker = "value=\"";
    let start = page.find(marker).expect("page has a hidden field") + marker.len();
    let end = page[start..].find('"').expect("value is terminated") + start;
    page[start..end].to_string()
}

/// Session cookie value from a `Set-Cookie` header.
pub fn session_cookie(response: &reqwest::Response) -> String {
    let header = response
        .headers()
        .get("set-cookie")
        .expect("session cookie issued")
        .to_str()
        .unwrap();
    header.split(';').next().unwrap().to_string()
}
