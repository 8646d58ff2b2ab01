use std::sync::Arc;

use chrono::Utc;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::StatusCode;
use serde_json::json;

use pipecrm_api::app::{AppServices, build_app};
use pipecrm_auth::{Claims, Role};

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn(secret: &str) -> Self {
        // Same router as prod, in-memory stores, ephemeral port.
        let app = build_app(Arc::new(AppServices::in_memory(secret)));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Mint a token outside the service, bypassing signup's member-only role.
fn mint_token(secret: &str, email: &str, role: Role, ttl_secs: i64) -> String {
    let now = Utc::now().timestamp();
    let claims = Claims {
        sub: email.to_string(),
        role,
        iat: now,
        exp: now + ttl_secs,
    };

    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .expect("failed to encode token")
}

async fn signup_and_login(
    client: &reqwest::Client,
    base_url: &str,
    email: &str,
    password: &str,
) -> String {
    let res = client
        .post(format!("{base_url}/auth/signup"))
        .form(&[("email", email), ("password", password)])
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = client
        .post(format!("{base_url}/auth/login"))
        .form(&[("email", email), ("password", password)])
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["token_type"], "bearer");
    body["access_token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn protected_endpoints_require_a_token() {
    let srv = TestServer::spawn("test-secret").await;
    let client = reqwest::Client::new();

    for path in ["/auth/me", "/leads", "/deals", "/dashboard/stats"] {
        let res = client
            .get(format!("{}{}", srv.base_url, path))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED, "path {path}");
    }
}

#[tokio::test]
async fn signup_login_and_me_round_trip() {
    let srv = TestServer::spawn("test-secret").await;
    let client = reqwest::Client::new();

    let token = signup_and_login(&client, &srv.base_url, "jane@acme.io", "pw123").await;

    let res = client
        .get(format!("{}/auth/me", srv.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["email"], "jane@acme.io");

    // Same email again is a conflict.
    let res = client
        .post(format!("{}/auth/signup", srv.base_url))
        .form(&[("email", "jane@acme.io"), ("password", "other")])
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn login_failures_share_one_message() {
    let srv = TestServer::spawn("test-secret").await;
    let client = reqwest::Client::new();
    signup_and_login(&client, &srv.base_url, "jane@acme.io", "pw123").await;

    let mut messages = Vec::new();
    for (email, password) in [("nobody@acme.io", "pw123"), ("jane@acme.io", "wrong")] {
        let res = client
            .post(format!("{}/auth/login", srv.base_url))
            .form(&[("email", email), ("password", password)])
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        let body: serde_json::Value = res.json().await.unwrap();
        messages.push(body["message"].clone());
    }
    assert_eq!(messages[0], messages[1]);
}

#[tokio::test]
async fn forged_and_expired_tokens_are_rejected() {
    let srv = TestServer::spawn("test-secret").await;
    let client = reqwest::Client::new();

    let forged = mint_token("wrong-secret", "jane@acme.io", Role::Member, 3600);
    let expired = mint_token("test-secret", "jane@acme.io", Role::Member, -3600);

    for token in [forged, expired, "garbage".to_string()] {
        let res = client
            .get(format!("{}/leads", srv.base_url))
            .bearer_auth(&token)
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }
}

#[tokio::test]
async fn lead_lifecycle_feeds_the_activity_log() {
    let srv = TestServer::spawn("test-secret").await;
    let client = reqwest::Client::new();
    let token = signup_and_login(&client, &srv.base_url, "jane@acme.io", "pw").await;

    let res = client
        .post(format!("{}/leads", srv.base_url))
        .bearer_auth(&token)
        .json(&json!({ "first_name": "Jane", "last_name": "Doe", "company": "Acme" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: serde_json::Value = res.json().await.unwrap();
    let lead_id = body["lead"]["id"].as_str().unwrap().to_string();

    // Empty patch is rejected before touching the store.
    let res = client
        .put(format!("{}/leads/{lead_id}", srv.base_url))
        .bearer_auth(&token)
        .json(&json!({}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = client
        .put(format!("{}/leads/{lead_id}", srv.base_url))
        .bearer_auth(&token)
        .json(&json!({ "status": "qualified" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .get(format!("{}/dashboard/activities", srv.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let feed: serde_json::Value = res.json().await.unwrap();
    let feed = feed.as_array().unwrap();

    // Newest first: the update precedes the creation.
    assert_eq!(feed[0]["type"], "lead_updated");
    assert_eq!(feed[0]["message"], "Lead updated: Jane Doe");
    assert_eq!(feed[1]["type"], "lead_created");
    assert_eq!(feed[1]["message"], "New lead created: Jane Doe");
}

#[tokio::test]
async fn leads_are_scoped_to_their_owner() {
    let srv = TestServer::spawn("test-secret").await;
    let client = reqwest::Client::new();
    let alice = signup_and_login(&client, &srv.base_url, "alice@acme.io", "pw").await;
    let bob = signup_and_login(&client, &srv.base_url, "bob@acme.io", "pw").await;

    let res = client
        .post(format!("{}/leads", srv.base_url))
        .bearer_auth(&alice)
        .json(&json!({ "first_name": "Ada", "last_name": "Lovelace" }))
        .send()
        .await
        .unwrap();
    let lead_id = res.json::<serde_json::Value>().await.unwrap()["lead"]["id"]
        .as_str()
        .unwrap()
        .to_string();

    let res = client
        .get(format!("{}/leads", srv.base_url))
        .bearer_auth(&bob)
        .send()
        .await
        .unwrap();
    assert!(res.json::<Vec<serde_json::Value>>().await.unwrap().is_empty());

    // Someone else's lead behaves as absent.
    let res = client
        .put(format!("{}/leads/{lead_id}", srv.base_url))
        .bearer_auth(&bob)
        .json(&json!({ "status": "poached" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn lead_listing_supports_search_and_status_filters() {
    let srv = TestServer::spawn("test-secret").await;
    let client = reqwest::Client::new();
    let token = signup_and_login(&client, &srv.base_url, "jane@acme.io", "pw").await;

    for (first, company, status) in [
        ("Ada", "Acme Corp", "new"),
        ("Grace", "Initech", "new"),
        ("Linus", "Acme Labs", "qualified"),
    ] {
        let res = client
            .post(format!("{}/leads", srv.base_url))
            .bearer_auth(&token)
            .json(&json!({
                "first_name": first,
                "last_name": "X",
                "company": company,
                "status": status,
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::CREATED);
    }

    let res = client
        .get(format!("{}/leads?search=acme", srv.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let leads: Vec<serde_json::Value> = res.json().await.unwrap();
    assert_eq!(leads.len(), 2);

    let res = client
        .get(format!("{}/leads?status=qualified", srv.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let leads: Vec<serde_json::Value> = res.json().await.unwrap();
    assert_eq!(leads.len(), 1);
    assert_eq!(leads[0]["first_name"], "Linus");
}

#[tokio::test]
async fn csv_export_then_import_round_trips() {
    let srv = TestServer::spawn("test-secret").await;
    let client = reqwest::Client::new();
    let token = signup_and_login(&client, &srv.base_url, "jane@acme.io", "pw").await;

    let res = client
        .post(format!("{}/leads", srv.base_url))
        .bearer_auth(&token)
        .json(&json!({ "first_name": "Ada", "last_name": "Lovelace", "company": "Analytical" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = client
        .get(format!("{}/leads/export", srv.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert!(
        res.headers()[reqwest::header::CONTENT_DISPOSITION]
            .to_str()
            .unwrap()
            .contains("leads.csv")
    );
    let exported = res.text().await.unwrap();
    assert!(exported.starts_with(
        "first_name,last_name,email,company,phone,source,status,notes,owner_email,created"
    ));
    assert!(exported.contains("Ada"));

    // Import the export back in as a second copy.
    let form = reqwest::multipart::Form::new().part(
        "file",
        reqwest::multipart::Part::text(exported).file_name("leads.csv"),
    );
    let res = client
        .post(format!("{}/leads/import", srv.base_url))
        .bearer_auth(&token)
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["count"], 1);
}

#[tokio::test]
async fn csv_import_rejects_wrong_files() {
    let srv = TestServer::spawn("test-secret").await;
    let client = reqwest::Client::new();
    let token = signup_and_login(&client, &srv.base_url, "jane@acme.io", "pw").await;

    // Wrong extension.
    let form = reqwest::multipart::Form::new().part(
        "file",
        reqwest::multipart::Part::text("first_name\nAda\n").file_name("leads.txt"),
    );
    let res = client
        .post(format!("{}/leads/import", srv.base_url))
        .bearer_auth(&token)
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    // Header only, no rows.
    let form = reqwest::multipart::Form::new().part(
        "file",
        reqwest::multipart::Part::text("first_name,last_name\n").file_name("leads.csv"),
    );
    let res = client
        .post(format!("{}/leads/import", srv.base_url))
        .bearer_auth(&token)
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["message"], "CSV file is empty");
}

#[tokio::test]
async fn deal_lifecycle_with_won_activity() {
    let srv = TestServer::spawn("test-secret").await;
    let client = reqwest::Client::new();
    let token = signup_and_login(&client, &srv.base_url, "jane@acme.io", "pw").await;

    let res = client
        .post(format!("{}/deals", srv.base_url))
        .bearer_auth(&token)
        .json(&json!({ "title": "Acme expansion", "value": 25000.0 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: serde_json::Value = res.json().await.unwrap();
    let deal_id = body["deal"]["id"].as_str().unwrap().to_string();
    assert_eq!(body["deal"]["stage"], "new");

    // Stage input is case-insensitive.
    let res = client
        .put(format!("{}/deals/{deal_id}", srv.base_url))
        .bearer_auth(&token)
        .json(&json!({ "stage": "Won" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .get(format!("{}/dashboard/activities", srv.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let feed: serde_json::Value = res.json().await.unwrap();
    let feed = feed.as_array().unwrap();
    assert_eq!(feed[0]["type"], "deal_won");
    assert_eq!(feed[0]["amount"], 25000.0);
    assert_eq!(feed[1]["type"], "deal_created");

    let res = client
        .delete(format!("{}/deals/{deal_id}", srv.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .get(format!("{}/deals/{deal_id}", srv.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn repeating_a_won_update_records_another_win() {
    let srv = TestServer::spawn("test-secret").await;
    let client = reqwest::Client::new();
    let token = signup_and_login(&client, &srv.base_url, "jane@acme.io", "pw").await;

    let res = client
        .post(format!("{}/deals", srv.base_url))
        .bearer_auth(&token)
        .json(&json!({ "title": "Acme expansion", "value": 25000.0 }))
        .send()
        .await
        .unwrap();
    let deal_id = res.json::<serde_json::Value>().await.unwrap()["deal"]["id"]
        .as_str()
        .unwrap()
        .to_string();

    // The audit check reads the updated row, not the transition edge, so an
    // identical second update of an already-won deal logs a second win.
    for _ in 0..2 {
        let res = client
            .put(format!("{}/deals/{deal_id}", srv.base_url))
            .bearer_auth(&token)
            .json(&json!({ "stage": "won" }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let body: serde_json::Value = res.json().await.unwrap();
        assert_eq!(body["deal"]["stage"], "won");
        assert_eq!(body["deal"]["value"], 25000.0);
    }

    let res = client
        .get(format!("{}/dashboard/activities", srv.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let feed: serde_json::Value = res.json().await.unwrap();
    let wins: Vec<&serde_json::Value> = feed
        .as_array()
        .unwrap()
        .iter()
        .filter(|r| r["type"] == "deal_won")
        .collect();
    assert_eq!(wins.len(), 2);
    assert!(wins.iter().all(|r| r["amount"] == 25000.0));
}

#[tokio::test]
async fn deals_are_scoped_even_for_reads_and_deletes() {
    let srv = TestServer::spawn("test-secret").await;
    let client = reqwest::Client::new();
    let alice = signup_and_login(&client, &srv.base_url, "alice@acme.io", "pw").await;
    let bob = signup_and_login(&client, &srv.base_url, "bob@acme.io", "pw").await;

    let res = client
        .post(format!("{}/deals", srv.base_url))
        .bearer_auth(&alice)
        .json(&json!({ "title": "Secret deal", "value": 100.0 }))
        .send()
        .await
        .unwrap();
    let deal_id = res.json::<serde_json::Value>().await.unwrap()["deal"]["id"]
        .as_str()
        .unwrap()
        .to_string();

    for method in ["get", "delete"] {
        let req = match method {
            "get" => client.get(format!("{}/deals/{deal_id}", srv.base_url)),
            _ => client.delete(format!("{}/deals/{deal_id}", srv.base_url)),
        };
        let res = req.bearer_auth(&bob).send().await.unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND, "method {method}");
    }

    // Still there for the owner.
    let res = client
        .get(format!("{}/deals/{deal_id}", srv.base_url))
        .bearer_auth(&alice)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn dashboard_stats_reflect_won_revenue_and_active_leads() {
    let srv = TestServer::spawn("test-secret").await;
    let client = reqwest::Client::new();
    let token = signup_and_login(&client, &srv.base_url, "jane@acme.io", "pw").await;

    for (first, status) in [("A", Some("new")), ("B", Some("lost")), ("C", None)] {
        let res = client
            .post(format!("{}/leads", srv.base_url))
            .bearer_auth(&token)
            .json(&json!({ "first_name": first, "last_name": "X", "status": status }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::CREATED);
    }

    for (title, value, stage) in [
        ("won one", 1000.0, "won"),
        ("open one", 500.0, "proposal"),
    ] {
        let res = client
            .post(format!("{}/deals", srv.base_url))
            .bearer_auth(&token)
            .json(&json!({ "title": title, "value": value, "stage": stage }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::CREATED);
    }

    let res = client
        .get(format!("{}/dashboard/stats", srv.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let stats: serde_json::Value = res.json().await.unwrap();
    assert_eq!(stats["total_revenue"], 1000.0);
    assert_eq!(stats["active_leads"], 1);
    assert_eq!(stats["closed_deals"], 1);
    // 1 won deal over 3 leads.
    assert_eq!(stats["conversion_rate"], 33.33);
}

#[tokio::test]
async fn campaign_dispatch_requires_an_elevated_role() {
    let secret = "test-secret";
    let srv = TestServer::spawn(secret).await;
    let client = reqwest::Client::new();

    // Signup grants member; members cannot send campaigns.
    let member = signup_and_login(&client, &srv.base_url, "jane@acme.io", "pw").await;
    let res = client
        .post(format!("{}/dashboard/send-campaign", srv.base_url))
        .bearer_auth(&member)
        .json(&json!({ "subject": "Q3 launch", "message": "hello" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let manager = mint_token(secret, "boss@acme.io", Role::Manager, 3600);
    let res = client
        .post(format!("{}/dashboard/send-campaign", srv.base_url))
        .bearer_auth(&manager)
        .json(&json!({ "subject": "Q3 launch", "message": "hello" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["subject"], "Q3 launch");
}

#[tokio::test]
async fn reports_are_public_and_answer_404_when_empty() {
    let srv = TestServer::spawn("test-secret").await;
    let client = reqwest::Client::new();

    for path in [
        "/reports/deals-by-stage",
        "/reports/revenue-by-month",
        "/reports/top-sales",
    ] {
        let res = client
            .get(format!("{}{}", srv.base_url, path))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND, "path {path}");
    }

    // Conversion rate renders zeros instead of 404.
    let res = client
        .get(format!("{}/reports/conversion-rate", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["conversion_rate"], 0.0);

    let token = signup_and_login(&client, &srv.base_url, "jane@acme.io", "pw").await;
    let res = client
        .post(format!("{}/deals", srv.base_url))
        .bearer_auth(&token)
        .json(&json!({ "title": "One", "value": 750.0, "stage": "won", "close_date": "2026-08-01" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = client
        .get(format!("{}/reports/deals-by-stage", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["won"], 1);

    let res = client
        .get(format!("{}/reports/revenue-by-month", srv.base_url))
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body[0]["month"], "2026-08");
    assert_eq!(body[0]["revenue"], 750.0);

    let res = client
        .get(format!("{}/reports/top-sales", srv.base_url))
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body[0]["email"], "jane@acme.io");
    assert_eq!(body[0]["deals_won"], 1);
}

#[tokio::test]
async fn profile_update_rejects_empty_bodies() {
    let srv = TestServer::spawn("test-secret").await;
    let client = reqwest::Client::new();
    let token = signup_and_login(&client, &srv.base_url, "jane@acme.io", "pw").await;

    let res = client
        .put(format!("{}/auth/update-profile", srv.base_url))
        .bearer_auth(&token)
        .json(&json!({}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = client
        .put(format!("{}/auth/update-profile", srv.base_url))
        .bearer_auth(&token)
        .json(&json!({ "name": "Jane D." }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["name"], "Jane D.");

    let res = client
        .get(format!("{}/auth/profile", srv.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["name"], "Jane D.");
}

#[tokio::test]
async fn health_is_public() {
    let srv = TestServer::spawn("test-secret").await;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/health", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}
