//! services/api/src/bin/openapi.rs
//!
//! Dumps the proxy's OpenAPI document. With no argument it is written to
//! `openapi.json`; `-` prints it to stdout instead.

use std::io::Write;
use wordpocket_lib::web::rest::openapi_document;

const DEFAULT_OUTPUT: &str = "openapi.json";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let target = std::env::args().nth(1).unwrap_or_else(|| DEFAULT_OUTPUT.to_string());
    let json = openapi_document().to_pretty_json()?;

    if target == "-" {
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(json.as_bytes())?;
        writeln!(stdout)?;
    } else {
        std::fs::write(&target, json)?;
        eprintln!("Wrote {} routes to {}", openapi_document().paths.paths.len(), target);
    }
    Ok(())
}
