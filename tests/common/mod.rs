#![allow(dead_code)]

use base64::{engine::general_purpose::STANDARD, Engine as _};
use community_scan::github::GitHubClient;
use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const STATS_PATH: &str = "monkey_data/stats.json";
pub const IMAGE_PATH: &str = "monkey_data/monkey.svg";

/// Build a client pointed at the mock server
pub fn create_test_client(server: &MockServer) -> GitHubClient {
    GitHubClient::new(&server.uri(), None).expect("Failed to create test client")
}

/// Repository object as returned by the GitHub API
pub fn repo_json(owner: &str, name: &str) -> Value {
    json!({
        "id": 1,
        "name": name,
        "full_name": format!("{}/{}", owner, name),
        "html_url": format!("https://github.com/{}/{}", owner, name),
        "owner": { "login": owner, "id": 1 },
        "fork": false
    })
}

pub fn fork_json(owner: &str, name: &str, parent: Value) -> Value {
    let mut repo = repo_json(owner, name);
    repo["fork"] = json!(true);
    repo["parent"] = parent;
    repo
}

/// Contents API body, base64 wrapped the way GitHub does it
pub fn content_json(file_path: &str, body: &str) -> Value {
    let encoded = STANDARD.encode(body);
    let wrapped: Vec<String> = encoded
        .as_bytes()
        .chunks(60)
        .map(|chunk| String::from_utf8_lossy(chunk).into_owned())
        .collect();

    json!({
        "type": "file",
        "path": file_path,
        "sha": "3d21ec53a331a6f037a91c368710b99387d012c1",
        "size": body.len(),
        "encoding": "base64",
        "content": wrapped.join("\n")
    })
}

pub fn stats_body(generation: u32, rarity: f64) -> String {
    json!({ "generation": generation, "rarity_score": rarity, "age_days": 12 }).to_string()
}

pub async fn mount_repo(server: &MockServer, owner: &str, name: &str, body: Value) {
    Mock::given(method("GET"))
        .and(path(format!("/repos/{}/{}", owner, name)))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

pub async fn mount_forks(server: &MockServer, owner: &str, name: &str, forks: Vec<Value>) {
    Mock::given(method("GET"))
        .and(path(format!("/repos/{}/{}/forks", owner, name)))
        .respond_with(ResponseTemplate::new(200).set_body_json(Value::Array(forks)))
        .mount(server)
        .await;
}

pub async fn mount_file(server: &MockServer, owner: &str, name: &str, file_path: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/repos/{}/{}/contents/{}", owner, name, file_path)))
        .respond_with(ResponseTemplate::new(200).set_body_json(content_json(file_path, body)))
        .mount(server)
        .await;
}

pub async fn mount_status(server: &MockServer, route: &str, status: u16, body: Value) {
    Mock::given(method("GET"))
        .and(path(route.to_string()))
        .respond_with(ResponseTemplate::new(status).set_body_json(body))
        .mount(server)
        .await;
}

pub fn not_found() -> Value {
    json!({
        "message": "Not Found",
        "documentation_url": "https://docs.github.com/rest"
    })
}

pub fn rate_limited() -> Value {
    json!({
        "message": "API rate limit exceeded for 127.0.0.1.",
        "documentation_url": "https://docs.github.com/rest/overview/resources-in-the-rest-api#rate-limiting"
    })
}
