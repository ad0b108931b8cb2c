//! Fetch catalog data through the live TMDB client and print it as JSON,
//! together with the derived price tier.
//! Usage:
//!   cargo run --bin catalog_probe -- now-playing [page]
//!   cargo run --bin catalog_probe -- movie <tmdb_id>
//! Requires TMDB_API_KEY in the environment (.env supported).

use anyhow::{Context, Result};
use dotenvy::dotenv;
use serde_json::json;
use tokoflix::pricing::{format_rupiah, price_for};
use tokoflix::tmdb::{CatalogApi, TmdbClient};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: cargo run --bin catalog_probe -- now-playing [page]");
        eprintln!("       cargo run --bin catalog_probe -- movie <tmdb_id>");
        std::process::exit(1);
    }

    let client = TmdbClient::from_env()?;

    match args[1].as_str() {
        "now-playing" => {
            let page: u32 = match args.get(2) {
                Some(raw) => raw.parse().context("page must be an integer")?,
                None => 1,
            };
            let listing = client.now_playing(page).await?;
            let priced: Vec<_> = listing
                .movies
                .iter()
                .map(|m| {
                    let price = price_for(m.rating).ok();
                    json!({
                        "movie": m,
                        "price": price,
                        "price_label": price.map(format_rupiah),
                    })
                })
                .collect();
            let output = json!({
                "page": listing.page,
                "total_pages": listing.total_pages,
                "movies": priced,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        "movie" => {
            let id: i64 = args
                .get(2)
                .ok_or_else(|| anyhow::anyhow!("missing tmdb_id"))?
                .parse()
                .context("tmdb_id must be an integer")?;
            let detail = client.fetch_movie(id).await?;
            let price = price_for(detail.rating).ok();
            let output = json!({
                "movie": detail,
                "price": price,
                "price_label": price.map(format_rupiah),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        other => {
            anyhow::bail!("unknown command '{}', expected 'now-playing' or 'movie'", other);
        }
    }

    Ok(())
}
