//! Persisted session tokens for the CLI, stored alongside the rest of the
//! user's finboard config.

use std::fs;
use std::path::PathBuf;

use crate::session::StoredSession;

pub fn get_config_dir() -> anyhow::Result<PathBuf> {
    let config_dir = if let Ok(custom_dir) = std::env::var("FINBOARD_CLI_CONFIG_DIR") {
        PathBuf::from(custom_dir)
    } else {
        let home = std::env::var("HOME")
            .map_err(|_| anyhow::anyhow!("HOME environment variable not set"))?;
        PathBuf::from(home).join(".config").join("finboard").join("cli")
    };

    if !config_dir.exists() {
        fs::create_dir_all(&config_dir)?;
    }

    Ok(config_dir)
}

pub fn load_session() -> anyhow::Result<Option<StoredSession>> {
    let config_dir = get_config_dir()?;
    let session_file = config_dir.join("session.json");

    if !session_file.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(session_file)?;
    let stored: StoredSession = serde_json::from_str(&content)?;
    Ok(Some(stored))
}

pub fn save_session(stored: &StoredSession) -> anyhow::Result<()> {
    let config_dir = get_config_dir()?;
    let session_file = config_dir.join("session.json");

    let content = serde_json::to_string_pretty(stored)?;
    fs::write(session_file, content)?;
    Ok(())
}

pub fn clear_session() -> anyhow::Result<()> {
    let config_dir = get_config_dir()?;
    let session_file = config_dir.join("session.json");

    if session_file.exists() {
        fs::remove_file(session_file)?;
    }
    Ok(())
}
