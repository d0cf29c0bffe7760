use anyhow::{Context, Result};
use std::io::{self, Write};

use crate::api::AppState;
use crate::core::{AppConfig, db::async_db};

/// Offline bootstrap for the stored credential. This is the only place
/// that blocks on operator input; the server uses `/oauth2callback`.
pub async fn run(config: AppConfig) -> Result<()> {
    let db = async_db(&config.db_path).await?;
    let state = AppState::new(db, config)?;

    println!(
        "\nPlease open the following URL in your browser and authorize access:\n\n{}\n",
        state.credentials.authorization_url()
    );
    print!("Paste the authorization code here: ");
    io::stdout().flush()?;
    let mut code = String::new();
    io::stdin()
        .read_line(&mut code)
        .context("Failed to read authorization code")?;
    let code = code.trim();
    anyhow::ensure!(!code.is_empty(), "No authorization code entered");

    let credential = state.credentials.complete_authorization(code).await?;
    if credential.refresh_token.is_none() {
        tracing::warn!("No refresh token in response, re-run with a fresh consent to get one");
    }
    println!("Credential for {} saved.", state.config.gmail_account);

    Ok(())
}
