use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use config::{Config, Environment, File};
use serde::Serialize;

use godo_swipes::db::{establish_connection_pool, run_pending_migrations};
use godo_swipes::domain::types::{EventId, UserId};
use godo_swipes::gesture::{SwipeThresholds, Vector2, classify};
use godo_swipes::models::config::AppConfig;
use godo_swipes::pagination::{DEFAULT_ITEMS_PER_PAGE, Pagination};
use godo_swipes::repository::{DieselRepository, SwipeReader};
use godo_swipes::services::buckets::{
    event_analytics, get_calendar, get_going, get_passed, get_public, get_saved, get_stats,
    list_calendar_page,
};
use godo_swipes::services::preferences::{rebuild_preferences, verify_preferences};

/// Maintenance commands for the swipe ledger.
#[derive(Parser)]
#[command(name = "godo-swipes", version, about)]
struct Cli {
    /// Directory holding `default.yaml` and per-environment overrides.
    #[arg(long, env = "APP_CONFIG_DIR", default_value = "config")]
    config_dir: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Apply pending database migrations.
    Migrate,
    /// Print events a user is going to (swiped right).
    Going { user_id: String },
    /// Print events a user shares on the public calendar (swiped up).
    Public { user_id: String },
    /// Print events a user saved for later (swiped down).
    Saved { user_id: String },
    /// Print events a user passed on (swiped left).
    Passed { user_id: String },
    /// Print a user's calendar (going and public) as JSON.
    Calendar {
        user_id: String,
        /// One-based page; prints every entry when omitted.
        #[arg(long)]
        page: Option<usize>,
    },
    /// Print a user's bucket tallies as JSON.
    Stats { user_id: String },
    /// Print direction counts and rates for an event as JSON.
    Analytics { event_id: String },
    /// Classify a released gesture with the configured thresholds.
    Classify {
        #[arg(allow_hyphen_values = true)]
        translation_x: f64,
        #[arg(allow_hyphen_values = true)]
        translation_y: f64,
        #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
        velocity_x: f64,
        #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
        velocity_y: f64,
    },
    /// Replace stored preference scores with values replayed from history.
    RebuildPreferences {
        /// Limit to one user; defaults to every user with history.
        #[arg(long)]
        user_id: Option<String>,
    },
    /// Compare stored preference scores against replayed history.
    VerifyPreferences {
        #[arg(long)]
        user_id: Option<String>,
    },
}

fn load_config(config_dir: &str) -> Result<AppConfig> {
    let app_env = std::env::var("APP_ENV").unwrap_or_else(|_| "local".into());

    let settings = Config::builder()
        .add_source(File::with_name(&format!("{config_dir}/default")).required(false))
        .add_source(File::with_name(&format!("{config_dir}/{app_env}")).required(false))
        .add_source(Environment::with_prefix("APP").separator("__"))
        .build()
        .context("failed to read configuration")?;

    settings
        .try_deserialize::<AppConfig>()
        .context("invalid configuration")
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn target_users(repo: &DieselRepository, user_id: Option<String>) -> Result<Vec<UserId>> {
    match user_id {
        Some(user_id) => Ok(vec![UserId::new(user_id)?]),
        None => Ok(repo.list_swiping_users()?),
    }
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let cli = Cli::parse();
    let app_config = load_config(&cli.config_dir)?;

    let pool = establish_connection_pool(&app_config.database_url)?;
    let repo = DieselRepository::new(pool.clone());

    match cli.command {
        Command::Migrate => {
            let applied = run_pending_migrations(&pool)?;
            log::info!("{applied} migrations applied");
        }
        Command::Going { user_id } => {
            print_json(&get_going(&repo, &UserId::new(user_id)?)?)?;
        }
        Command::Public { user_id } => {
            print_json(&get_public(&repo, &UserId::new(user_id)?)?)?;
        }
        Command::Saved { user_id } => {
            print_json(&get_saved(&repo, &UserId::new(user_id)?)?)?;
        }
        Command::Passed { user_id } => {
            print_json(&get_passed(&repo, &UserId::new(user_id)?)?)?;
        }
        Command::Calendar { user_id, page } => {
            let user_id = UserId::new(user_id)?;
            match page {
                Some(page) => {
                    let pagination = Pagination {
                        page,
                        per_page: DEFAULT_ITEMS_PER_PAGE,
                    };
                    let (total, items) = list_calendar_page(&repo, &user_id, Some(pagination))?;
                    print_json(&serde_json::json!({ "total": total, "page": page, "items": items }))?;
                }
                None => print_json(&get_calendar(&repo, &user_id)?)?,
            }
        }
        Command::Stats { user_id } => {
            print_json(&get_stats(&repo, &UserId::new(user_id)?)?)?;
        }
        Command::Analytics { event_id } => {
            print_json(&event_analytics(&repo, &EventId::new(event_id)?)?)?;
        }
        Command::Classify {
            translation_x,
            translation_y,
            velocity_x,
            velocity_y,
        } => {
            let thresholds = SwipeThresholds::from(app_config.gesture);
            let direction = classify(
                Vector2::new(translation_x, translation_y),
                Vector2::new(velocity_x, velocity_y),
                &thresholds,
            );
            print_json(&serde_json::json!({
                "direction": direction,
                "bucket": direction.map(|d| d.bucket()),
            }))?;
        }
        Command::RebuildPreferences { user_id } => {
            for user_id in target_users(&repo, user_id)? {
                let rebuilt = rebuild_preferences(&repo, &user_id)?;
                print_json(&serde_json::json!({ "user_id": user_id, "preferences": rebuilt }))?;
            }
        }
        Command::VerifyPreferences { user_id } => {
            let mut drifted = 0;
            for user_id in target_users(&repo, user_id)? {
                let drifts = verify_preferences(&repo, &user_id)?;
                if !drifts.is_empty() {
                    drifted += 1;
                    print_json(&serde_json::json!({ "user_id": user_id, "drifts": drifts }))?;
                }
            }
            if drifted > 0 {
                anyhow::bail!("{drifted} users have preference scores that disagree with history");
            }
            log::info!("Stored preference scores match history");
        }
    }

    Ok(())
}
