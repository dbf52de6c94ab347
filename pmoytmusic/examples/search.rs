//! Recherche et navigation dans le catalogue YouTube Music
//!
//! Usage :
//!
//! ```text
//! RUST_LOG=pmoytmusic=debug cargo run -p pmoytmusic --example search -- "abba waterloo"
//! ```
//!
//! L'exemple :
//! - lance une recherche et affiche les résultats ;
//! - récupère le premier album trouvé avec ses pistes ;
//! - enrichit la première piste (ISRC, liens vers les autres plateformes).

use pmoytmusic::{ItemType, SearchResult, YtMusicClient};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let query = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "abba dancing queen".to_string());

    println!("=== PMOYtMusic - Recherche ===\n");
    let client = YtMusicClient::new()?;

    let results = client.search(&query).await;
    println!("✓ {} résultat(s) pour '{}'\n", results.len(), query);

    for (i, result) in results.iter().enumerate() {
        match result {
            SearchResult::Track(track) => println!(
                "  {:2}. [track] {} - {} ({} s)",
                i + 1,
                track.artists,
                track.name,
                track.duration_ms / 1000
            ),
            SearchResult::Collection(c) => println!(
                "  {:2}. [{}] {} - {} {}",
                i + 1,
                c.item_type.as_str(),
                c.artists,
                c.name,
                c.release_date
            ),
        }
    }

    let first_album = results
        .iter()
        .find(|r| r.item_type() == ItemType::Album)
        .map(|r| r.id().to_string());
    if let Some(album_id) = first_album {
        println!("\n--- Album {} ---", album_id);
        match client.get_album(&album_id).await {
            Some(album) => {
                println!("{} - {} ({} pistes)", album.artists, album.name, album.total_tracks);
                for (i, track) in album.tracks.iter().enumerate() {
                    println!("  {:2}. {}", i + 1, track.name);
                }
            }
            None => println!("✗ album indisponible"),
        }
    }

    let first_track = results.iter().find_map(|r| match r {
        SearchResult::Track(track) => Some(track.clone()),
        SearchResult::Collection(_) => None,
    });
    if let Some(track) = first_track {
        println!("\n--- Enrichissement de '{}' ---", track.name);
        let enriched = client.enrich(track).await;
        println!("ISRC: {}", enriched.enrichment.isrc.as_deref().unwrap_or("-"));
        println!("{}", serde_json::to_string_pretty(&enriched.enrichment.external_links)?);
    }

    Ok(())
}
