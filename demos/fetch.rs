//! Fetch a URL and print the status, headers and body.
//!
//! ```text
//! RUST_LOG=spindle_client=debug cargo run -p spindle --example fetch -- https://example.com/
//! ```

use std::io::Write;

use spindle::Http;
use tracing_subscriber::EnvFilter;

fn main() -> spindle::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let url = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "http://example.com/".to_owned());

    let response = Http::get(&url).send()?;
    println!("{:?} {}", response.version(), response.status());
    for (name, value) in response.headers() {
        println!("{name}: {value}");
    }
    println!();

    let body = response.bytes()?;
    std::io::stdout().write_all(&body)?;
    Ok(())
}
