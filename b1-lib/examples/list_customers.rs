//! Lists customers page by page.
//!
//! Reads `B1_URL`, `B1_COMPANY_DB`, `B1_USERNAME` and `B1_PASSWORD` from the
//! environment or a `.env` file.
//!
//! Run with: `cargo run -p b1-lib --example list_customers`

use b1_lib::B1Client;
use b1_lib::auth::Credentials;
use b1_lib::error::Error;
use b1_lib::model::BoCardTypes;
use b1_lib::model::BusinessPartner;
use b1_lib::model::Entity;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Error> {
    let _ = dotenvy::dotenv();

    let url = std::env::var("B1_URL").map_err(|_| Error::Config("B1_URL is not set".into()))?;
    let client = B1Client::builder()
        .url(url)
        .credentials(Credentials::from_env()?)
        .build()?;

    let bp = BusinessPartner::fields();
    let mut pages = client
        .query::<BusinessPartner>()
        .filter(bp.card_type.eq(BoCardTypes::Customer))
        .order_by(bp.card_name)
        .into_pages()?;

    let mut page_number = 0;
    while let Some(page) = pages.next().await {
        let page = page?;
        page_number += 1;
        println!("Page {} ({} partners)", page_number, page.len());
        for partner in page.items() {
            println!(
                "  {:<15} {}",
                partner.card_code.as_deref().unwrap_or("-"),
                partner.card_name.as_deref().unwrap_or("-")
            );
        }
    }

    client.logout().await?;
    Ok(())
}
