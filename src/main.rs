//! sastoken demo - mint one provisioning token and print it
//!
//! Usage: `sastoken <id-scope> <registration-id> <base64-key>`
//!
//! Prints the serialized token on stdout (one line, ready to paste into an
//! authorization header) plus a machine-readable JSON form of its fields.

use anyhow::Context;
use log::info;

use sastoken::SymmetricKeyClient;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    info!("sastoken v{} starting", env!("CARGO_PKG_VERSION"));

    let mut args = std::env::args().skip(1);
    let usage = "usage: sastoken <id-scope> <registration-id> <base64-key>";
    let id_scope = args.next().context(usage)?;
    let registration_id = args.next().context(usage)?;
    let key = args.next().context(usage)?;

    let client = SymmetricKeyClient::new(registration_id, key);
    let token = client.create_authentication_token(&id_scope)?;

    info!("=== TOKEN ===");
    info!("Resource: {}", token.resource());
    info!("Expires: {}", token.expiry());
    info!("Key name: {}", token.key_name());

    // Serialized wire form, then a machine-readable breakdown
    println!("{token}");
    println!("{}", serde_json::to_string(&token)?);

    Ok(())
}
