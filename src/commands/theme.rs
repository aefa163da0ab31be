//! Theme command handler.

use lostboard::services::ThemePreference;
use lostboard::storage::KeyValueStore;
use lostboard::{LostboardConfig, Theme};

use super::{CmdResult, ThemeAction};

/// Theme command.
///
/// Without an action, prints the stored theme.
pub async fn cmd_theme(config: &LostboardConfig, action: Option<ThemeAction>) -> CmdResult {
    let prefs = ThemePreference::new(KeyValueStore::open(&config.data_dir)?);

    let theme = match action {
        None => prefs.get().await?,
        Some(ThemeAction::Toggle) => prefs.toggle().await?,
        Some(ThemeAction::Light) => {
            prefs.set(Theme::Light).await?;
            Theme::Light
        },
        Some(ThemeAction::Dark) => {
            prefs.set(Theme::Dark).await?;
            Theme::Dark
        },
    };

    println!("Theme: {}", theme.as_str());
    Ok(())
}
