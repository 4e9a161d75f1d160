//! Integration tests against a live Service Layer.
//!
//! These tests need a reachable server and are ignored by default. To run
//! them, create a `.env` file in the b1-lib directory with:
//!
//! ```env
//! B1_URL=https://sap.example.com:50000/b1s/v2/
//! B1_COMPANY_DB=SBODEMOUS
//! B1_USERNAME=manager
//! B1_PASSWORD=your-password
//! ```
//!
//! Then run: `cargo test -p b1-lib -- --ignored`

use std::env;

use b1_lib::B1Client;
use b1_lib::auth::Credentials;
use b1_lib::error::ApiError;
use b1_lib::error::AuthError;
use b1_lib::error::Error;
use b1_lib::model::BusinessPartner;
use b1_lib::model::Entity;
use tokio_util::sync::CancellationToken;

fn load_client() -> Option<B1Client> {
    let _ = dotenvy::dotenv();

    let url = env::var("B1_URL").ok()?;
    let credentials = Credentials::from_env().ok()?;

    B1Client::builder()
        .url(url)
        .credentials(credentials)
        .build()
        .ok()
}

#[tokio::test]
#[ignore = "requires a live Service Layer in .env"]
async fn test_login_and_logout() {
    let client = load_client().expect("Missing required environment variables. See module docs.");

    let session = client.login().await.expect("Login failed");
    assert!(!session.session_id.is_empty());
    assert!(!session.is_expired());
    println!("Service Layer version {}", session.version);

    client.logout().await.expect("Logout failed");
    assert!(client.session().await.is_none());
}

#[tokio::test]
#[ignore = "requires a live Service Layer in .env"]
async fn test_wrong_password_is_rejected() {
    let _ = dotenvy::dotenv();
    let url = env::var("B1_URL").expect("B1_URL not set");
    let company_db = env::var("B1_COMPANY_DB").expect("B1_COMPANY_DB not set");

    let client = B1Client::builder()
        .url(url)
        .credentials(Credentials::new(company_db, "manager", "definitely-wrong"))
        .build()
        .unwrap();

    let error = client.login().await.unwrap_err();
    assert!(matches!(
        error,
        Error::Auth(AuthError::InvalidCredentials | AuthError::Rejected { .. })
    ));
}

#[tokio::test]
#[ignore = "requires a live Service Layer in .env"]
async fn test_query_customers() {
    let client = load_client().expect("Missing required environment variables. See module docs.");
    let bp = BusinessPartner::fields();

    let customers = client
        .query::<BusinessPartner>()
        .filter(bp.card_type.eq(b1_lib::model::BoCardTypes::Customer))
        .order_by(bp.card_code)
        .take(5)
        .to_list()
        .await
        .expect("Query failed");
    assert!(customers.len() <= 5);

    let total = client
        .query::<BusinessPartner>()
        .count()
        .await
        .expect("Count failed");
    assert!(total >= customers.len() as u64);
}

#[tokio::test]
#[ignore = "requires a live Service Layer in .env"]
async fn test_find_missing_partner() {
    let client = load_client().expect("Missing required environment variables. See module docs.");

    let found = client
        .find::<BusinessPartner>("NO-SUCH-CARD-CODE")
        .await
        .expect("Find failed");
    assert!(found.is_none());
}

#[tokio::test]
#[ignore = "requires a live Service Layer in .env"]
async fn test_server_rejects_unknown_field() {
    let client = load_client().expect("Missing required environment variables. See module docs.");

    let error = client
        .resource("BusinessPartners")
        .select("NoSuchField")
        .execute::<serde_json::Value>()
        .await
        .unwrap_err();
    assert!(error.is_remote());
    if let Error::Api(api) = &error {
        assert!(matches!(api, ApiError::Http { .. }));
        println!("Server said: {:?}", api.detail());
    }
}

#[tokio::test]
#[ignore = "requires a live Service Layer in .env"]
async fn test_cancelled_query() {
    let client = load_client().expect("Missing required environment variables. See module docs.");
    let cancel = CancellationToken::new();
    cancel.cancel();

    let result = client
        .query::<BusinessPartner>()
        .cancel_on(cancel)
        .to_list()
        .await;
    assert!(matches!(result, Err(Error::Cancelled)));
}
