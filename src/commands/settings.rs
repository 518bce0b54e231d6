use crate::config::{load_settings, KEY_AUTH_TOKEN, SETTING_KEYS};
use crate::models::Settings;
use crate::services::crypto::CryptoService;
use crate::services::state::AppState;

/// Current settings with the token masked.
pub fn get_settings(state: &AppState) -> Result<Settings, String> {
    let mut settings = state.settings().map_err(|e| e.to_string())?;
    if settings.auth_token.is_some() {
        settings.auth_token = Some("********".to_string());
    }
    Ok(settings)
}

pub fn save_setting(key: String, value: String, state: &AppState) -> Result<(), String> {
    if !SETTING_KEYS.contains(&key.as_str()) {
        return Err(format!("Unknown setting: {} (expected one of {})", key, SETTING_KEYS.join(", ")));
    }

    let settings = {
        let db = state.db.lock().map_err(|_| "DB lock".to_string())?;
        if key == KEY_AUTH_TOKEN {
            if value.trim().is_empty() {
                return Err("Auth token cannot be empty".to_string());
            }
            let encrypted = CryptoService::encrypt_token(value.trim()).map_err(|e| e.to_string())?;
            db.set_setting(&key, &encrypted).map_err(|e| e.to_string())?;
        } else {
            db.set_setting(&key, value.trim()).map_err(|e| e.to_string())?;
        }
        load_settings(&db)
    };

    state.update_settings(settings).map_err(|e| e.to_string())
}

pub async fn test_connection(state: &AppState) -> Result<bool, String> {
    let client = state.api_client().map_err(|e| e.to_string())?;
    client.test_connection().await.map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;

    #[test]
    fn token_is_stored_encrypted_and_masked() {
        let state = AppState::new(Database::in_memory().unwrap(), Settings::default());
        save_setting("auth_token".to_string(), "s3cret".to_string(), &state).unwrap();

        let stored = state.db.lock().unwrap().get_setting("auth_token").unwrap().unwrap();
        assert!(stored.starts_with("enc:"));
        assert_eq!(CryptoService::decrypt_token(&stored).unwrap(), "s3cret");
        assert_eq!(get_settings(&state).unwrap().auth_token.as_deref(), Some("********"));
    }

    #[test]
    fn unknown_key_is_rejected() {
        let state = AppState::new(Database::in_memory().unwrap(), Settings::default());
        assert!(save_setting("colour".to_string(), "red".to_string(), &state).is_err());
    }
}
