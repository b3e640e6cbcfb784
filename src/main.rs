use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;

mod cli;
mod config;
mod outreach;
mod profiles;
mod semantic;
#[cfg(test)]
mod tests;
mod web;

use config::Config;
use outreach::OutreachService;
use profiles::ProfileStore;
use semantic::{EmbeddingModel, ProfileSearchService, SearchOptions};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let args = cli::Args::parse();

    let config = Config::load();
    let profiles = Arc::new(ProfileStore::load_with(config.base_path())?);

    match args.command {
        cli::Command::Daemon {} => {
            let search = build_search_service(&config, profiles.clone(), None)?;

            // Startup barrier: a failed build must not let the daemon claim
            // readiness over a partial index.
            search.initialize()?;

            let outreach = Arc::new(OutreachService::new(config.outreach.clone()));

            web::start_daemon(web::Backend {
                config,
                profiles,
                search,
                outreach,
            });
            Ok(())
        }

        cli::Command::List {} => {
            println!("{}", serde_json::to_string_pretty(profiles.all())?);
            Ok(())
        }

        cli::Command::Search {
            query,
            limit,
            scores,
        } => {
            let search = build_search_service(&config, profiles.clone(), limit)?;
            search.initialize()?;

            let hits = search.search(&query);

            let output: Vec<serde_json::Value> = hits
                .into_iter()
                .map(|hit| {
                    let mut value = serde_json::to_value(&hit.profile).unwrap();
                    if scores {
                        value["similarity_score"] = serde_json::json!(hit.score);
                    }
                    value
                })
                .collect();

            println!("{}", serde_json::to_string_pretty(&output)?);
            Ok(())
        }

        cli::Command::Describe {} => {
            for profile in profiles.all() {
                println!("{}: {}", profile.id, semantic::describe::describe(profile));
            }
            Ok(())
        }
    }
}

fn build_search_service(
    config: &Config,
    profiles: Arc<ProfileStore>,
    result_cap_override: Option<usize>,
) -> anyhow::Result<Arc<ProfileSearchService>> {
    let model = EmbeddingModel::new(&config.search.model, PathBuf::from(config.base_path()))?;

    let id = model.model_id_hash();
    log::debug!(
        "embedding model '{}' fingerprint {:02x}{:02x}{:02x}{:02x}",
        config.search.model,
        id[0],
        id[1],
        id[2],
        id[3]
    );

    let opts = SearchOptions {
        result_cap: result_cap_override.unwrap_or(config.search.result_cap),
        candidate_pool: config.search.candidate_pool,
        timeout: Duration::from_secs(config.search.embed_timeout_secs),
    };

    Ok(Arc::new(ProfileSearchService::new(
        Arc::new(model),
        profiles,
        opts,
    )))
}
