//! services/api/src/bin/openapi.rs
//!
//! Writes the REST API's OpenAPI document for client code generation.
//!
//! Usage: `openapi [PATH]`. `PATH` defaults to `openapi.json`; `-` prints the
//! document to stdout instead.

use api_lib::{error::ApiError, web::rest::api_doc};
use std::io::Write;

fn main() -> Result<(), ApiError> {
    let target = std::env::args().nth(1).unwrap_or_else(|| "openapi.json".to_string());
    let doc = api_doc();
    let json = doc
        .to_pretty_json()
        .map_err(|e| ApiError::Internal(format!("Failed to serialize OpenAPI document: {}", e)))?;

    if target == "-" {
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(json.as_bytes())?;
        stdout.write_all(b"\n")?;
        return Ok(());
    }

    std::fs::write(&target, json)?;
    eprintln!(
        "Wrote {} v{} ({} paths) to {}",
        doc.info.title,
        doc.info.version,
        doc.paths.paths.len(),
        target
    );
    Ok(())
}
