//! Command handlers. Every handler prints one JSON document to stdout.

use std::collections::BTreeSet;

use anyhow::Context;
use kainan_core::{AppConfig, Coordinate, PageRequest, SearchFilters, SearchRequest};
use kainan_resolver::BusinessResolver;
use serde::Serialize;

use crate::Commands;

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let rendered = serde_json::to_string_pretty(value).context("failed to render JSON output")?;
    println!("{rendered}");
    Ok(())
}

pub(crate) async fn run(resolver: &BusinessResolver, command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::List { page, limit } => {
            let result = resolver
                .list_businesses(PageRequest::new(page, limit))
                .await?;
            print_json(&result)
        }
        Commands::Search {
            query,
            category,
            price,
            min_rating,
            open_now,
            sort,
            page,
            limit,
        } => {
            let request = SearchRequest {
                query: query.unwrap_or_default(),
                filters: SearchFilters {
                    categories: category.into_iter().collect(),
                    price_tiers: price.into_iter().collect::<BTreeSet<_>>(),
                    min_rating,
                    open_now,
                    near: None,
                },
                sort_by: sort,
                page: PageRequest::new(page, limit),
            };
            let result = resolver.search_businesses(&request).await?;
            print_json(&result)
        }
        Commands::Nearby {
            lat,
            lng,
            radius_km,
            sort,
            page,
            limit,
        } => {
            let result = resolver
                .nearby_businesses(
                    Coordinate::new(lat, lng),
                    radius_km,
                    sort,
                    PageRequest::new(page, limit),
                )
                .await?;
            print_json(&result)
        }
        Commands::Show { id } => print_json(&resolver.get_business_by_id(&id).await?),
        Commands::Owner { owner_id } => {
            print_json(&resolver.get_businesses_by_owner(&owner_id).await?)
        }
        Commands::Stats => print_json(&serde_json::json!({
            "active_providers": resolver.active_providers(),
            "cache_remote_results": resolver.config().cache_remote_results,
            "counters": resolver.stats(),
        })),
        Commands::Migrate => anyhow::bail!("migrate does not use the resolver"),
    }
}

pub(crate) async fn run_migrate(config: &AppConfig) -> anyhow::Result<()> {
    let pool = kainan_db::connect_pool_from_app_config(config)
        .await
        .context("failed to connect to database")?;
    let applied = kainan_db::run_migrations(&pool)
        .await
        .context("failed to run migrations")?;
    tracing::info!(applied, "migrations complete");
    print_json(&serde_json::json!({ "applied": applied }))
}
