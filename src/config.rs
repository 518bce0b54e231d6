use anyhow::{anyhow, Result};
use std::path::PathBuf;

use crate::db::Database;
use crate::models::Settings;

pub const DB_FILE_NAME: &str = "item-import.sqlite";

pub const KEY_API_BASE_URL: &str = "api_base_url";
pub const KEY_USER_ID: &str = "user_id";
pub const KEY_AUTH_TOKEN: &str = "auth_token";
pub const KEY_INBOX_FOLDER: &str = "inbox_folder";

pub const SETTING_KEYS: [&str; 4] = [KEY_API_BASE_URL, KEY_USER_ID, KEY_AUTH_TOKEN, KEY_INBOX_FOLDER];

/// `ITEM_IMPORT_DATA_DIR`, else `$HOME/.item-import`.
pub fn data_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("ITEM_IMPORT_DATA_DIR") {
        if !dir.trim().is_empty() {
            return Ok(PathBuf::from(dir));
        }
    }
    let home = std::env::var("HOME").map_err(|_| anyhow!("HOME is not set; set ITEM_IMPORT_DATA_DIR"))?;
    Ok(PathBuf::from(home).join(".item-import"))
}

pub fn load_settings(db: &Database) -> Settings {
    let stored = Settings {
        api_base_url: db.get_setting(KEY_API_BASE_URL).ok().flatten(),
        user_id: db.get_setting(KEY_USER_ID).ok().flatten(),
        auth_token: db.get_setting(KEY_AUTH_TOKEN).ok().flatten(),
        inbox_folder: db.get_setting(KEY_INBOX_FOLDER).ok().flatten(),
    };
    apply_overrides(stored, |key| std::env::var(key).ok())
}

/// Non-empty environment values win over stored ones.
pub fn apply_overrides<F>(mut settings: Settings, lookup: F) -> Settings
where
    F: Fn(&str) -> Option<String>,
{
    let value = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
    if let Some(v) = value("ITEM_IMPORT_API_URL") {
        settings.api_base_url = Some(v);
    }
    if let Some(v) = value("ITEM_IMPORT_USER_ID") {
        settings.user_id = Some(v);
    }
    if let Some(v) = value("ITEM_IMPORT_TOKEN") {
        settings.auth_token = Some(v);
    }
    if let Some(v) = value("ITEM_IMPORT_INBOX") {
        settings.inbox_folder = Some(v);
    }
    settings
}
