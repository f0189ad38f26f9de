//! DashSync - dashboard preference and analytics sync
//!
//! Command-line entry point for inspecting and driving the sync layer.
//!
//! ```text
//! dashsync status              loading state and cache counters
//! dashsync refresh [domain]    refresh every domain, or one
//! dashsync invalidate [domain] drop cached analytics
//! dashsync pull                sync the server profile down
//! dashsync export              print the preference snapshot
//! dashsync reset               restore default preferences
//! ```

use anyhow::{anyhow, bail, Context, Result};
use dashsync_app::{commands, AppContext};
use serde::Serialize;

#[tokio::main]
async fn main() -> Result<()> {
    let ctx = AppContext::bootstrap().context("failed to initialise dashsync")?;

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = args.first().map(String::as_str).unwrap_or("status");
    let target = args.get(1).cloned();

    match command {
        "status" => {
            print_json(&commands::get_loading_state(&ctx).await.map_err(|e| anyhow!(e))?)?;
            print_json(&commands::get_cache_stats(&ctx).await.map_err(|e| anyhow!(e))?)?;
        }
        "refresh" => match target {
            Some(domain) => {
                let outcome = commands::refresh_domain(&ctx, domain).await.map_err(|e| anyhow!(e))?;
                print_json(&outcome)?;
            }
            None => commands::refresh_all_analytics(&ctx).await.map_err(|e| anyhow!(e))?,
        },
        "invalidate" => {
            let result = commands::invalidate_analytics(&ctx, target).await.map_err(|e| anyhow!(e))?;
            print_json(&result)?;
        }
        "pull" => print_json(&commands::pull_preferences(&ctx).await.map_err(|e| anyhow!(e))?)?,
        "export" => print_json(&commands::export_preferences(&ctx).await.map_err(|e| anyhow!(e))?)?,
        "reset" => {
            if !commands::reset_preferences(&ctx).await.map_err(|e| anyhow!(e))? {
                bail!("preferences could not be reset");
            }
        }
        other => bail!("unknown command '{other}'"),
    }

    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
