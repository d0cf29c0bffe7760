use anyhow::Result;

use crate::api::AppState;
use crate::core::{AppConfig, db::async_db};
use crate::jobs::renew_gmail_watch;

pub async fn run(config: AppConfig) -> Result<()> {
    let db = async_db(&config.db_path).await?;
    let state = AppState::new(db, config)?;

    match renew_gmail_watch(&state).await? {
        Some(watch) => println!("{}", serde_json::to_string_pretty(&watch)?),
        None => println!("No topic configured, set RELAY_GMAIL_TOPIC"),
    }

    Ok(())
}
