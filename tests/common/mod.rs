#![allow(dead_code)]

use github_stars_export::github::{GitHubClient, PER_PAGE};
use github_stars_export::retry::RetryPolicy;
use serde_json::{json, Value};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const LOGIN: &str = "octocat";

/// Client pointed at the mock server, retrying without sleeping
pub fn test_client(server: &MockServer) -> GitHubClient {
    test_client_with(server, RetryPolicy::new(0.0, 3))
}

pub fn test_client_with(server: &MockServer, retry: RetryPolicy) -> GitHubClient {
    GitHubClient::with_base_url(&server.uri(), None, retry).expect("Failed to create client")
}

pub fn repo_json(index: usize) -> Value {
    json!({
        "id": index,
        "name": format!("repo-{}", index),
        "full_name": format!("owner/repo-{}", index),
        "html_url": format!("https://github.com/owner/repo-{}", index),
        "stargazers_count": index * 3,
        "private": false
    })
}

pub fn user_json(login: &str) -> Value {
    json!({
        "login": login,
        "id": 583231,
        "html_url": format!("https://github.com/{}", login),
        "type": "User"
    })
}

pub async fn mount_user(server: &MockServer, login: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/users/{}", login)))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_json(login)))
        .mount(server)
        .await;
}

/// Mounts the count probe and every page of `total` starred repositories.
/// Each must be requested exactly once.
pub async fn mount_starred(server: &MockServer, login: &str, total: usize) {
    mount_starred_probe(server, login, total).await;
    mount_starred_pages(server, login, total).await;
}

/// The `per_page=1` request used to size the starred list
pub async fn mount_starred_probe(server: &MockServer, login: &str, total: usize) {
    let starred_path = format!("/users/{}/starred", login);

    let mut probe = ResponseTemplate::new(200);
    if total > 1 {
        let first: Vec<Value> = vec![repo_json(0)];
        let link = format!(
            "<{uri}{path}?per_page=1&page=2>; rel=\"next\", <{uri}{path}?per_page=1&page={total}>; rel=\"last\"",
            uri = server.uri(),
            path = starred_path,
            total = total
        );
        probe = probe.set_body_json(first).insert_header("Link", link.as_str());
    } else {
        let body: Vec<Value> = (0..total).map(repo_json).collect();
        probe = probe.set_body_json(body);
    }

    Mock::given(method("GET"))
        .and(path(starred_path.clone()))
        .and(query_param("per_page", "1"))
        .respond_with(probe)
        .expect(1)
        .mount(server)
        .await;
}

pub async fn mount_starred_pages(server: &MockServer, login: &str, total: usize) {
    let starred_path = format!("/users/{}/starred", login);
    let per_page = PER_PAGE as usize;
    let pages = total.div_ceil(per_page);
    for page in 1..=pages {
        let start = (page - 1) * per_page;
        let end = (start + per_page).min(total);
        let body: Vec<Value> = (start..end).map(repo_json).collect();

        Mock::given(method("GET"))
            .and(path(starred_path.clone()))
            .and(query_param("per_page", PER_PAGE.to_string()))
            .and(query_param("page", page.to_string()))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .expect(1)
            .mount(server)
            .await;
    }
}
