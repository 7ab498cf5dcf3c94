// Prints the OpenAPI components for the shared envelopes.
// Run: cargo run --bin openapi_export > envelope.openapi.json

use anyhow::{Context, Result};
use rest_envelope::api::openapi::ApiDoc;
use utoipa::OpenApi;

fn main() -> Result<()> {
    let json = ApiDoc::openapi()
        .to_pretty_json()
        .context("Failed to serialize OpenAPI document")?;
    println!("{json}");
    Ok(())
}
