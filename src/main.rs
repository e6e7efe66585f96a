#[rocket::main]
#[allow(clippy::result_large_err)]
async fn main() -> Result<(), rocket::Error> {
    dotenvy::dotenv().ok();

    eprintln!("📄 Tax Advisor starting...");

    let caps = tax_advisor::capability::negotiate();
    tax_advisor::build_rocket(caps).launch().await?;

    Ok(())
}
