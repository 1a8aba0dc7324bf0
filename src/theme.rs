use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::storage::PreferenceStore;

pub const THEME_KEY: &str = "theme-preference";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "light" => Some(Self::Light),
            "dark" => Some(Self::Dark),
            _ => None,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Guess the terminal background from `COLORFGBG` (`"<fg>;<bg>"`).
pub fn detect_system_theme() -> Option<Theme> {
    let raw = std::env::var("COLORFGBG").ok()?;
    theme_from_colorfgbg(&raw)
}

fn theme_from_colorfgbg(raw: &str) -> Option<Theme> {
    let bg: u8 = raw.rsplit(';').next()?.trim().parse().ok()?;
    Some(if bg == 7 || bg == 15 { Theme::Light } else { Theme::Dark })
}

/// Light/dark preference: stored value, else system preference, else light.
pub struct ThemeService {
    store: Arc<dyn PreferenceStore>,
    system: Option<Theme>,
}

impl ThemeService {
    pub fn new(store: Arc<dyn PreferenceStore>) -> Self {
        Self::with_system_preference(store, detect_system_theme())
    }

    pub fn with_system_preference(store: Arc<dyn PreferenceStore>, system: Option<Theme>) -> Self {
        Self { store, system }
    }

    /// Valid stored preference, if any. Unreadable stores count as unset.
    pub async fn stored(&self) -> Option<Theme> {
        match self.store.get(THEME_KEY).await {
            Ok(raw) => raw.as_deref().and_then(Theme::parse),
            Err(e) => {
                tracing::warn!(error = %e, "could not read theme preference");
                None
            }
        }
    }

    pub async fn current(&self) -> Theme {
        self.stored().await.or(self.system).unwrap_or(Theme::Light)
    }

    pub async fn set(&self, theme: Theme) -> Result<()> {
        tracing::info!(%theme, "activating theme");
        self.store.put(THEME_KEY, theme.as_str()).await
    }

    pub async fn toggle(&self) -> Result<Theme> {
        let next = self.current().await.toggled();
        self.set(next).await?;
        Ok(next)
    }
}
