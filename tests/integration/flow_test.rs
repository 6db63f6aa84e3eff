//! End-to-end request flow through the router.

use http::StatusCode;
use url::Url;

use crate::helpers::{AUTH_URL, TestApp, body_json, location};

const README_ACL: &[(&str, &[&str])] = &[("docs/readme.md", &["docs-team/readers"])];

fn redirect_param(location: &str) -> Option<String> {
    Url::parse(location)
        .ok()?
        .query_pairs()
        .find(|(k, _)| k == "redirect")
        .map(|(_, v)| v.into_owned())
}

#[tokio::test]
async fn test_no_cookie_redirects_to_login() {
    let app = TestApp::new(README_ACL);

    let response = app.get("/?bucket=docs&path=readme.md", None).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let location = location(&response);
    assert!(location.starts_with(AUTH_URL));
    assert_eq!(
        redirect_param(&location).as_deref(),
        Some("https://files.example.com/?bucket=docs&path=readme.md")
    );
    assert!(app.issuer.calls().is_empty());
}

#[tokio::test]
async fn test_member_redirected_to_signed_url() {
    let app = TestApp::new(README_ACL);
    let token = app.token("octocat", &["docs-team/readers"]);

    let response = app.get("/?bucket=docs&path=readme.md", Some(&token)).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(location(&response).starts_with("https://objects.example.com/docs/readme.md?"));
    assert_eq!(
        app.issuer.calls(),
        vec![("docs".to_string(), "readme.md".to_string())]
    );
}

#[tokio::test]
async fn test_each_download_gets_fresh_link() {
    let app = TestApp::new(README_ACL);
    let token = app.token("octocat", &["docs-team/readers"]);

    let first = app.get("/?bucket=docs&path=readme.md", Some(&token)).await;
    let second = app.get("/?bucket=docs&path=readme.md", Some(&token)).await;

    assert_ne!(location(&first), location(&second));
    assert_eq!(app.issuer.calls().len(), 2);
}

#[tokio::test]
async fn test_non_member_forbidden() {
    let app = TestApp::new(README_ACL);
    let token = app.token("octocat", &["docs-team/writers"]);

    let response = app.get("/?bucket=docs&path=readme.md", Some(&token)).await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = body_json(response).await;
    assert_eq!(body["error"], "FORBIDDEN");
    assert_eq!(body["message"], "not authorized");
    assert!(app.issuer.calls().is_empty());
}

#[tokio::test]
async fn test_leading_slash_key_not_aliased() {
    let app = TestApp::new(&[
        ("docs//secret.txt", &["admins"]),
        ("docs", &["docs-team"]),
    ]);
    let token = app.token("octocat", &["docs-team/readers"]);

    let response = app
        .get("/?bucket=docs&path=%2Fsecret.txt", Some(&token))
        .await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert!(app.issuer.calls().is_empty());

    let admin = app.token("root", &["admins"]);
    let response = app
        .get("/?bucket=docs&path=%2Fsecret.txt", Some(&admin))
        .await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        app.issuer.calls(),
        vec![("docs".to_string(), "/secret.txt".to_string())]
    );
}

#[tokio::test]
async fn test_path_style_route() {
    let app = TestApp::new(&[("docs", &["docs-team"])]);
    let token = app.token("octocat", &["docs-team/anything"]);

    let response = app.get("/docs/guides/intro.md", Some(&token)).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        app.issuer.calls(),
        vec![("docs".to_string(), "guides/intro.md".to_string())]
    );
}

#[tokio::test]
async fn test_path_style_login_redirect_keeps_path() {
    let app = TestApp::new(&[("docs", &["docs-team"])]);

    let response = app.get("/docs/guides/intro.md", None).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        redirect_param(&location(&response)).as_deref(),
        Some("https://files.example.com/docs/guides/intro.md")
    );
}

#[tokio::test]
async fn test_missing_parameters_bad_request() {
    let app = TestApp::new(README_ACL);
    let token = app.token("octocat", &["docs-team/readers"]);

    for uri in ["/", "/?bucket=docs", "/?path=readme.md", "/?bucket=&path="] {
        let response = app.get(uri, Some(&token)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "uri {uri}");
        let body = body_json(response).await;
        assert_eq!(body["error"], "BAD_REQUEST");
    }

    // Checked before the session: no login redirect either.
    let response = app.get("/?bucket=docs", None).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(app.issuer.calls().is_empty());
}

#[tokio::test]
async fn test_tampered_cookie_redirects_to_login() {
    let app = TestApp::new(README_ACL);
    let mut token = app.token("octocat", &["docs-team/readers"]);
    let last = token.pop().unwrap();
    token.push(if last == 'A' { 'B' } else { 'A' });

    let response = app.get("/?bucket=docs&path=readme.md", Some(&token)).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(location(&response).starts_with(AUTH_URL));
    assert!(app.issuer.calls().is_empty());
}

#[tokio::test]
async fn test_default_acl_applies_to_unlisted_paths() {
    let app = TestApp::new(&[("private", &[]), ("default", &["anonymous"])]);
    let token = app.token("octocat", &[]);

    let open = app.get("/?bucket=public&path=a/b.txt", Some(&token)).await;
    assert_eq!(open.status(), StatusCode::SEE_OTHER);

    let closed = app.get("/?bucket=private&path=a/b.txt", Some(&token)).await;
    assert_eq!(closed.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_authorization_only_mode() {
    let app = TestApp::authorization_only(README_ACL);
    let token = app.token("octocat", &["docs-team/readers"]);

    let response = app.get("/?bucket=docs&path=readme.md", Some(&token)).await;

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(
        response.headers().get("x-gatekeeper-login").unwrap(),
        "octocat"
    );
    assert!(app.issuer.calls().is_empty());

    let denied = app.get("/?bucket=docs&path=other.md", Some(&token)).await;
    assert_eq!(denied.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_upstream_failure_is_generic() {
    let app = TestApp::new(README_ACL);
    app.issuer.fail();
    let token = app.token("octocat", &["docs-team/readers"]);

    let response = app.get("/?bucket=docs&path=readme.md", Some(&token)).await;

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = body_json(response).await;
    assert_eq!(body["error"], "UPSTREAM_ERROR");
    assert_eq!(body["message"], "failed to load signed url");
}

#[tokio::test]
async fn test_health() {
    let app = TestApp::new(&[("docs", &["docs-team"]), ("default", &[])]);

    let response = app.get("/healthz", None).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["status"], "ok");
    assert_eq!(body["data"]["mode"], "integrated");
    assert_eq!(body["data"]["acl_keys"], 2);
}
