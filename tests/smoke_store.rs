use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::json;
use std::{env, time::Duration};
use tokio::time::sleep;
use uuid::Uuid;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct User {
    id: String,
    email: String,
    provider: String,
    has_custom_avatar: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SessionResponse {
    token: String,
    user: User,
    is_new_user: Option<bool>,
}

#[derive(Deserialize)]
struct MeResponse {
    user: User,
}

#[derive(Deserialize)]
struct ErrorResponse {
    code: Option<String>,
}

#[derive(Deserialize)]
struct Faq {
    id: String,
    answers: Vec<serde_json::Value>,
}

#[tokio::test]
async fn smoke_store_flow() {
    dotenvy::dotenv().ok();

    // Needs a running server with a database behind it; opt in explicitly.
    let run_smoke = env::var("RUN_SMOKE_STORE")
        .ok()
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false);
    if !run_smoke {
        eprintln!("skipping smoke_store_flow (set RUN_SMOKE_STORE=1 to enable)");
        return;
    }

    let base_url = env::var("BASE_URL").unwrap_or_else(|_| "http://localhost:5000".to_string());
    let email_domain = env::var("SMOKE_EMAIL_DOMAIN").unwrap_or_else(|_| "gmail.com".to_string());
    let retries: usize = env::var("SMOKE_STORE_RETRIES")
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(30);
    let retry_delay_ms: u64 = env::var("SMOKE_STORE_RETRY_DELAY_MS")
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(300);

    let client = reqwest::Client::new();
    wait_for_health(&client, &base_url, retries, retry_delay_ms).await;

    let email = format!("smoke+{}@{}", Uuid::new_v4().simple(), email_domain);
    let register = client
        .post(format!("{}/api/auth/register", base_url))
        .json(&json!({"name": "Smoke Test", "email": email, "password": "Abcdef1!"}))
        .send()
        .await
        .expect("register request failed");
    assert_eq!(register.status(), StatusCode::CREATED);
    let registered: SessionResponse = register.json().await.expect("register json");
    assert_eq!(registered.user.provider, "local");
    assert!(!registered.user.has_custom_avatar);
    assert_eq!(registered.is_new_user, Some(true));

    let duplicate = client
        .post(format!("{}/api/auth/register", base_url))
        .json(&json!({"name": "Smoke Test", "email": email, "password": "Abcdef1!"}))
        .send()
        .await
        .expect("duplicate register failed");
    assert_eq!(duplicate.status(), StatusCode::CONFLICT);
    let duplicate_body: ErrorResponse = duplicate.json().await.expect("duplicate json");
    assert_eq!(duplicate_body.code.as_deref(), Some("email_taken"));

    let bad_login = client
        .post(format!("{}/api/auth/login", base_url))
        .json(&json!({"email": email, "password": "wrong"}))
        .send()
        .await
        .expect("bad login failed");
    assert_eq!(bad_login.status(), StatusCode::UNAUTHORIZED);

    let login = client
        .post(format!("{}/api/auth/login", base_url))
        .json(&json!({"email": email, "password": "Abcdef1!"}))
        .send()
        .await
        .expect("login failed");
    assert_eq!(login.status(), StatusCode::OK);
    let session: SessionResponse = login.json().await.expect("login json");
    assert_eq!(session.user.id, registered.user.id);
    assert!(session.is_new_user.is_none());

    let me = client
        .get(format!("{}/api/auth/me", base_url))
        .bearer_auth(&session.token)
        .send()
        .await
        .expect("me failed");
    assert_eq!(me.status(), StatusCode::OK);
    let me_body: MeResponse = me.json().await.expect("me json");
    assert_eq!(me_body.user.email, email);

    let users = client
        .get(format!("{}/api/users", base_url))
        .bearer_auth(&session.token)
        .send()
        .await
        .expect("users failed");
    assert_eq!(users.status(), StatusCode::FORBIDDEN);

    let products = client
        .get(format!("{}/api/products", base_url))
        .send()
        .await
        .expect("products failed");
    assert_eq!(products.status(), StatusCode::OK);

    let lead = client
        .post(format!("{}/api/leads", base_url))
        .json(&json!({
            "name": "Smoke Test",
            "email": email,
            "phone": "555-0100",
            "vehicle": {"name": "Smoke Bike", "price": "1000", "category": "moto"}
        }))
        .send()
        .await
        .expect("lead failed");
    assert_eq!(lead.status(), StatusCode::CREATED);

    let asked = client
        .post(format!("{}/api/faq", base_url))
        .bearer_auth(&session.token)
        .json(&json!({"question": "Do you ship?"}))
        .send()
        .await
        .expect("ask failed");
    assert_eq!(asked.status(), StatusCode::CREATED);
    let faq: Faq = asked.json().await.expect("faq json");

    let answered = client
        .post(format!("{}/api/faq/{}/answers", base_url, faq.id))
        .bearer_auth(&session.token)
        .json(&json!({"text": "Within the country."}))
        .send()
        .await
        .expect("answer failed");
    assert_eq!(answered.status(), StatusCode::CREATED);
    let faq: Faq = answered.json().await.expect("answered json");
    assert_eq!(faq.answers.len(), 1);

    let removed = client
        .delete(format!("{}/api/faq/{}", base_url, faq.id))
        .bearer_auth(&session.token)
        .send()
        .await
        .expect("delete faq failed");
    assert_eq!(removed.status(), StatusCode::OK);

    let missing = client
        .get(format!("{}/api/does-not-exist", base_url))
        .send()
        .await
        .expect("404 request failed");
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

async fn wait_for_health(client: &reqwest::Client, base_url: &str, retries: usize, delay_ms: u64) {
    let url = format!("{}/health", base_url);
    for attempt in 0..retries {
        match client.get(&url).send().await {
            Ok(response) if response.status() == StatusCode::OK => return,
            _ => {
                if attempt + 1 >= retries {
                    panic!(
                        "service not ready after {} attempts (base_url={})",
                        retries, base_url
                    );
                }
                sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}
