//! Writes the OpenAPI document for the lesson API.
//!
//! Usage: `openapi [OUTPUT_PATH]` (defaults to `openapi.json`).

use std::path::PathBuf;
use tutor_api::router::ApiDoc;
use utoipa::OpenApi;

fn main() -> anyhow::Result<()> {
    let path = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("openapi.json"));

    let spec_json = ApiDoc::openapi().to_pretty_json()?;
    std::fs::write(&path, spec_json)?;
    println!("Wrote OpenAPI spec to {}", path.display());
    Ok(())
}
