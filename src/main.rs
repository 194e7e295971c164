use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fpl_league::api::{build_router, state::AppState};
use fpl_league::calculate::{resolve_outcome, settle_gameweek};
use fpl_league::config::AppConfig;
use fpl_league::fetch::{Fetcher, FetcherConfig};
use fpl_league::fpl::{FantasyApi, FplClient};
use fpl_league::ingest::{LeagueIngest, LeagueSnapshot};
use fpl_league::models::{
    choose_gameweek, is_valid_gameweek, team_name, Placing, Team, MAX_GAMEWEEK,
};

#[derive(Parser)]
#[command(name = "fpl-league")]
#[command(about = "Fantasy Premier League mini-league standings and pot tracker")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "./config.toml")]
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error); overrides the config file
    #[arg(long)]
    log_level: Option<String>,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the API server
    Serve {
        /// Bind address (defaults to server.host)
        #[arg(long)]
        host: Option<String>,

        /// Port number (defaults to server.port)
        #[arg(long)]
        port: Option<u16>,
    },

    /// Print the season standings
    Standings,

    /// Print one gameweek's table and placings
    Gameweek {
        /// Gameweek number (defaults to the current one)
        #[arg(long)]
        gw: Option<u32>,
    },

    /// Print the money position of every team and the pot
    Finances,

    /// Validate the configuration and print a summary
    CheckConfig,
}

fn init_tracing(level: &str, json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

fn build_client(config: &AppConfig) -> Result<Arc<dyn FantasyApi>> {
    let fetcher =
        Fetcher::new(FetcherConfig::from(&config.api)).context("Failed to build HTTP client")?;
    Ok(Arc::new(FplClient::new(fetcher, config.api.base_url.clone())))
}

async fn load_snapshot(config: &AppConfig) -> Result<LeagueSnapshot> {
    let ingest = LeagueIngest::new(build_client(config)?);
    let snapshot = ingest.snapshot(&config.league, &config.finance).await?;
    Ok(snapshot)
}

fn placing_names(teams: &[Team], placing: &Option<Placing>) -> String {
    match placing {
        Some(p) => p
            .teams()
            .into_iter()
            .map(|id| team_name(teams, id))
            .collect::<Vec<_>>()
            .join(" / "),
        None => "-".to_string(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load(&cli.config)
        .with_context(|| format!("Failed to load config from {}", cli.config.display()))?;

    let level = cli.log_level.clone().unwrap_or_else(|| config.log_level.clone());
    init_tracing(&level, cli.json_logs);

    tracing::info!("Starting fpl-league v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Serve { host, port } => {
            let host = host.unwrap_or_else(|| config.server.host.clone());
            let port = port.unwrap_or(config.server.port);

            let api = build_client(&config)?;
            let app = build_router(AppState::new(api, Arc::new(config)));

            let addr = format!("{}:{}", host, port);
            let listener = tokio::net::TcpListener::bind(&addr)
                .await
                .with_context(|| format!("Failed to bind {}", addr))?;
            tracing::info!("Dashboard API: http://{}", addr);

            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = tokio::signal::ctrl_c().await;
                    tracing::info!("Shutting down");
                })
                .await?;
        }
        Commands::Standings => {
            let snap = load_snapshot(&config).await?;
            println!(
                "{} after {} gameweek(s)",
                snap.league,
                snap.outcomes.len()
            );
            println!(
                "{:>3}  {:<24} {:>6} {:>6} {:>6} {:>4} {:>4} {:>4} {:>4}",
                "Pos", "Team", "Pts", "C+VC", "Bench", "W", "2nd", "L", "Cap"
            );
            for entry in &snap.leaderboard {
                let s = &entry.stats;
                println!(
                    "{:>3}  {:<24} {:>6} {:>6} {:>6} {:>4} {:>4} {:>4} {:>4}",
                    entry.position,
                    entry.team_name,
                    s.total_points,
                    s.total_captaincy_points,
                    s.total_bench_points,
                    s.wins,
                    s.seconds,
                    s.lasts,
                    s.captaincy_wins
                );
            }
        }
        Commands::Gameweek { gw } => {
            if let Some(gw) = gw {
                if !is_valid_gameweek(gw) {
                    bail!("--gw must be between 1 and {}", MAX_GAMEWEEK);
                }
            }

            let api = build_client(&config)?;
            let bootstrap = api
                .bootstrap()
                .await
                .context("FPL bootstrap data unavailable")?;
            let gw = choose_gameweek(gw, bootstrap.current_gameweek())?;

            let teams = &config.league.teams;
            let results = LeagueIngest::new(api).load_gameweek(teams, gw).await;
            let outcome = resolve_outcome(gw, bootstrap.is_finished(gw), &results);
            let settlement = settle_gameweek(&outcome, &config.finance);

            println!(
                "Gameweek {}{}",
                gw,
                if outcome.finished { "" } else { " (in progress)" }
            );
            for row in &outcome.table {
                let r = &row.result;
                println!(
                    "{:>3}{} {:<24} {:>4} pts  C+VC {:>3}  bench {:>3}",
                    row.position,
                    if row.tied { "=" } else { " " },
                    team_name(teams, r.team_id),
                    r.points,
                    r.captaincy_points,
                    r.bench_points
                );
            }
            if let Some(top) = outcome.top_score() {
                println!("Top score: {}", top);
            }
            println!("Winner:    {}", placing_names(teams, &outcome.winner));
            println!("Runner-up: {}", placing_names(teams, &outcome.runner_up));
            println!("Last:      {}", placing_names(teams, &outcome.last));
            println!(
                "Captaincy: {}",
                placing_names(teams, &outcome.captaincy_winner)
            );
            println!(
                "Pot: collected {} paid out {}",
                settlement.collected,
                settlement.paid_out()
            );
        }
        Commands::Finances => {
            let snap = load_snapshot(&config).await?;
            let settlement = &snap.settlement;
            println!(
                "{} after {} gameweek(s){}",
                snap.league,
                settlement.gameweeks_settled,
                if settlement.provisional {
                    " (provisional)"
                } else {
                    ""
                }
            );
            println!(
                "{:<24} {:>9} {:>9} {:>9} {:>9} {:>9}",
                "Team", "Paid in", "Penalty", "Won", "Prize", "Net"
            );
            for t in &settlement.teams {
                println!(
                    "{:<24} {:>9} {:>9} {:>9} {:>9} {:>9}",
                    t.team_name, t.buy_ins, t.penalties, t.winnings, t.prize_money, t.net
                );
            }
            println!(
                "Pot: collected {} paid out {} balance {}",
                settlement.pot.collected, settlement.pot.paid_out, settlement.pot.balance
            );
        }
        Commands::CheckConfig => {
            config.validate()?;
            println!("Configuration OK: {}", cli.config.display());
            println!("  League:   {} ({} teams)", config.league.name, config.league.teams.len());
            for team in &config.league.teams {
                println!("    {:>10}  {}", team.id, team.name);
            }
            println!("  API:      {}", config.api.base_url);
            println!("  Cache:    {} (ttl {})", config.api.cache_dir.display(), config.api.cache_ttl);
            println!("  Server:   {}:{}", config.server.host, config.server.port);
            println!(
                "  Buy-ins:  {} season, {} per gameweek",
                config.finance.season_buy_in, config.finance.gameweek_buy_in
            );
        }
    }

    Ok(())
}
