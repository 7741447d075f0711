use anyhow::Result;
use partner_eval::config::Config;
use partner_eval::music::MusicRest;
use partner_eval::RunCoordinator;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("partner_eval=info")),
        )
        .init();

    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("config.toml"));
    let config = Config::load(&config_path)?;

    // Session cookie may live in .env (real env vars take precedence)
    Config::load_env_file();

    let api_config = config.api.clone();
    let mut coordinator = RunCoordinator::new(config, StdRng::from_entropy());
    let report = coordinator
        .execute(|| MusicRest::connect(&api_config, Config::session_from_env()))
        .await?;

    println!(
        "{} execute success: daily {} evaluated / {} already done, extra {} evaluated (quota {}){}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        report.daily.accepted,
        report.daily.already_evaluated,
        report.extra.accepted,
        report.extra_quota,
        if report.session_refreshed { "" } else { ", session not refreshed" },
    );
    Ok(())
}
