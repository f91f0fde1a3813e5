mod config;
mod description;
mod extract;
mod model;
mod normalizer;
mod pipeline;
mod sources;
mod stores;

use config::{AppConfig, load_config};
use description::{DescriptionPager, clean_description};
use model::ResolveOutcome;
use pipeline::Resolver;
use sources::{CheapSharkClient, GameCatalog, RawgClient};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::fmt::init();

    // Load configuration from file; defaults cover the public endpoints
    let config: AppConfig = match load_config("config.json") {
        Ok(cfg) => cfg,
        Err(e) => {
            warn!("Config load failed ({}), falling back to defaults", e);
            AppConfig::default()
        }
    };

    let transport_timeout = Duration::from_secs(config.step_timeout_seconds + 2);
    let catalog_client = match RawgClient::new(
        &config.catalog_base_url,
        config.catalog_api_key.clone(),
        transport_timeout,
    ) {
        Ok(client) => client,
        Err(e) => {
            error!("Failed to build catalog client: {}", e);
            return;
        }
    };
    let deal_feed = match CheapSharkClient::new(&config.deals_base_url, transport_timeout) {
        Ok(client) => client,
        Err(e) => {
            error!("Failed to build deal feed client: {}", e);
            return;
        }
    };

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        Some("top") => show_top_rated(&catalog_client).await,
        Some("search") => match args.get(1) {
            Some(query) => show_search(&catalog_client, query).await,
            None => eprintln!("usage: shark-scout search <query>"),
        },
        Some("genre") => match args.get(1) {
            Some(slug) => show_genre(&catalog_client, slug).await,
            None => eprintln!("usage: shark-scout genre <slug>"),
        },
        Some("stores") => show_stores(&deal_feed).await,
        Some("deal") => match args.get(1) {
            Some(deal_id) => show_deal(&deal_feed, deal_id).await,
            None => eprintln!("usage: shark-scout deal <deal-id>"),
        },
        Some("resolve") => {
            let game_id = args.get(1).cloned().unwrap_or_else(|| "3328".to_string());
            let title = args
                .get(2)
                .cloned()
                .unwrap_or_else(|| "Elden Ring".to_string());
            resolve_game(&catalog_client, deal_feed, &config, &game_id, &title).await;
        }
        Some(other) => {
            eprintln!("unknown command '{}'", other);
            eprintln!(
                "usage: shark-scout [resolve <id> <title> | top | search <query> | genre <slug> | stores | deal <deal-id>]"
            );
        }
        None => {
            resolve_game(&catalog_client, deal_feed, &config, "3328", "Elden Ring").await;
        }
    }
}

/// Fetches game details (best effort), resolves the deal catalog and
/// prints one block per title variant.
async fn resolve_game(
    catalog_client: &RawgClient,
    deal_feed: CheapSharkClient,
    config: &AppConfig,
    game_id: &str,
    display_title: &str,
) {
    info!("Fetching details for game {}...", game_id);
    let detail = match catalog_client.game_details(game_id).await {
        Ok(detail) => Some(detail),
        Err(e) => {
            warn!("Detail fetch failed: {}", e);
            None
        }
    };

    if let Some(detail) = &detail {
        let cleaned = clean_description(detail.description());
        let pager = DescriptionPager::new();
        println!("{}", pager.render(&cleaned));
        if let Some(rating) = detail.rating() {
            println!("Rating: {:.1}", rating);
        }
        let genres = detail.genre_names();
        if !genres.is_empty() {
            println!("Genres: {}", genres.join(", "));
        }
    }

    let resolver = Resolver::new(Arc::new(deal_feed), config);
    let query = pipeline::build_query(game_id, display_title, detail.as_ref());

    info!("Resolving offers for '{}'...", display_title);
    let catalog = match resolver.resolve(&query).await {
        ResolveOutcome::Resolved(catalog) => catalog,
        ResolveOutcome::Superseded => return,
    };

    if catalog.is_empty() {
        println!("\nNo offers found for '{}'.", display_title);
        return;
    }

    for variant in &catalog.variants {
        println!(
            "\n{} ({} stores)",
            variant.title_variant,
            variant.offers.len()
        );
        for offer in &variant.offers {
            let store = offer
                .store_id
                .as_deref()
                .map(stores::display_name)
                .unwrap_or("Unknown");
            println!("  {:<18} {:>7.2} $", store, offer.effective_price());
        }
    }
}

async fn show_top_rated(catalog_client: &RawgClient) {
    match catalog_client.top_rated_games(1, 5).await {
        Ok(games) => {
            for game in games {
                let rating = game.rating.unwrap_or(0.0);
                println!("{} [{:.1}]", game.name, rating);
                if let Some(description) = game.description_raw.as_deref() {
                    if !description.is_empty() {
                        let pager = DescriptionPager::new();
                        println!("  {}", pager.render(description));
                    }
                }
            }
        }
        Err(e) => error!("Top-rated lookup failed: {}", e),
    }
}

async fn show_search(catalog_client: &RawgClient, query: &str) {
    match catalog_client.search_games(query, 1, 12).await {
        Ok(games) => print_summaries(&games),
        Err(e) => error!("Search failed: {}", e),
    }
}

async fn show_genre(catalog_client: &RawgClient, slug: &str) {
    match catalog_client.games_by_genre(slug, 1, 12).await {
        Ok(games) => print_summaries(&games),
        Err(e) => error!("Genre lookup failed: {}", e),
    }
}

fn print_summaries(games: &[model::GameSummary]) {
    if games.is_empty() {
        println!("No games found.");
        return;
    }
    for game in games {
        let genres: Vec<&str> = game.genres.iter().map(|g| g.name.as_str()).collect();
        println!(
            "{:>8}  {} ({}) [{}]",
            game.id,
            game.name,
            game.released.as_deref().unwrap_or("?"),
            if genres.is_empty() {
                "-".to_string()
            } else {
                genres.join(", ")
            }
        );
    }
}

async fn show_deal(deal_feed: &CheapSharkClient, deal_id: &str) {
    match deal_feed.deal_by_id(deal_id).await {
        Ok(deal) => match serde_json::to_string_pretty(&deal) {
            Ok(pretty) => println!("{}", pretty),
            Err(e) => error!("Deal lookup returned unprintable payload: {}", e),
        },
        Err(e) => error!("Deal lookup failed: {}", e),
    }
}

async fn show_stores(deal_feed: &CheapSharkClient) {
    match deal_feed.stores().await {
        Ok(stores) => {
            for store in stores.iter().filter(|s| s.is_active == 1) {
                println!("{:>4}  {}", store.store_id, store.store_name);
            }
        }
        Err(e) => error!("Store directory fetch failed: {}", e),
    }
}
