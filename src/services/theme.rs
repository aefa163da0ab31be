//! Persisted display theme.

use crate::Result;
use crate::models::Theme;
use crate::storage::KeyValueStore;

/// Key holding the theme preference.
pub const THEME_KEY: &str = "theme";

/// Reads and writes the theme preference in the key-value store.
#[derive(Debug, Clone)]
pub struct ThemePreference {
    kv: KeyValueStore,
}

impl ThemePreference {
    /// Creates a preference handle over `kv`.
    #[must_use]
    pub const fn new(kv: KeyValueStore) -> Self {
        Self { kv }
    }

    /// Returns the stored theme, light when unset.
    ///
    /// # Errors
    ///
    /// Returns an error if the key-value file cannot be read.
    pub async fn get(&self) -> Result<Theme> {
        Ok(self
            .kv
            .get(THEME_KEY)
            .await?
            .map_or_else(Theme::default, |s| Theme::parse(&s)))
    }

    /// Stores `theme`.
    ///
    /// # Errors
    ///
    /// Returns an error if the key-value file cannot be written.
    pub async fn set(&self, theme: Theme) -> Result<()> {
        self.kv.set(THEME_KEY, theme.as_str()).await?;
        tracing::debug!(theme = theme.as_str(), "Saved theme");
        Ok(())
    }

    /// Flips the stored theme and returns the new one.
    ///
    /// # Errors
    ///
    /// Returns an error if the key-value file cannot be read or written.
    pub async fn toggle(&self) -> Result<Theme> {
        let theme = self.get().await?.toggled();
        self.set(theme).await?;
        Ok(theme)
    }
}
