//! Theme configuration (`appConfig/themeOfTheWeek`)
//!
//! Holds the week's tag vocabulary, the subset active today, and the common
//! note sent to every parent. Reads are served from a cache that is refreshed
//! on every write made through this service; call [`ThemeConfigService::invalidate`]
//! when the document may have been changed elsewhere.

use crate::domain::clock::Clock;
use crate::domain::models::ThemeConfig;
use crate::store::types::require_object;
use crate::store::{Collection, DocumentStore, StoreError};
use chrono::NaiveDate;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{Mutex, RwLock};

/// Document id of the singleton theme config
pub const THEME_DOC_ID: &str = "themeOfTheWeek";

#[derive(Error, Debug)]
pub enum ThemeError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unknown theme tag: {0:?}")]
    UnknownTag(String),
}

impl ThemeError {
    pub fn user_message(&self) -> String {
        match self {
            ThemeError::Store(_) => "Failed to save theme settings.".to_string(),
            other => other.to_string(),
        }
    }
}

pub type ThemeResult<T> = Result<T, ThemeError>;

/// What the theme screen shows for a given day
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ThemeView {
    pub theme: Vec<String>,
    pub theme_of_the_day: Vec<String>,
    pub common_parents_note: Option<String>,
}

pub struct ThemeConfigService {
    store: Arc<dyn DocumentStore>,
    clock: Arc<dyn Clock>,
    cache: RwLock<Option<ThemeConfig>>,
    // serializes read-modify-write cycles
    write_lock: Mutex<()>,
}

impl ThemeConfigService {
    pub fn new(store: Arc<dyn DocumentStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            cache: RwLock::new(None),
            write_lock: Mutex::new(()),
        }
    }

    /// Current config; a missing document reads as empty
    pub async fn current(&self) -> ThemeResult<ThemeConfig> {
        if let Some(cached) = self.cache.read().await.as_ref() {
            return Ok(cached.clone());
        }

        let config = self.load().await?;
        *self.cache.write().await = Some(config.clone());
        Ok(config)
    }

    pub async fn invalidate(&self) {
        *self.cache.write().await = None;
    }

    async fn load(&self) -> ThemeResult<ThemeConfig> {
        let config = match self.store.get(Collection::AppConfig, THEME_DOC_ID).await? {
            Some(doc) => match doc.decode::<ThemeConfig>() {
                Ok(config) => config.normalized(),
                Err(e) => {
                    tracing::warn!(error = %e, "Theme config document is malformed, using empty config");
                    ThemeConfig::default()
                }
            },
            None => ThemeConfig::default(),
        };
        Ok(config)
    }

    async fn persist(&self, patch: Value) -> ThemeResult<ThemeConfig> {
        let patch = require_object(patch)?;
        let doc = self
            .store
            .set_merge(Collection::AppConfig, THEME_DOC_ID, patch)
            .await?;
        let config = doc.decode::<ThemeConfig>()?.normalized();
        *self.cache.write().await = Some(config.clone());
        Ok(config)
    }

    /// Add a tag to the vocabulary; adding an existing tag changes nothing
    pub async fn add_tag(&self, tag: &str) -> ThemeResult<ThemeConfig> {
        let tag = tag.trim();
        if tag.is_empty() {
            return Err(ThemeError::Validation("Theme tag cannot be empty".to_string()));
        }

        let _guard = self.write_lock.lock().await;
        let mut config = self.load().await?;
        if config.theme.iter().any(|t| t == tag) {
            return Ok(config);
        }
        config.theme.push(tag.to_string());

        let config = self.persist(json!({ "theme": config.theme })).await?;
        tracing::info!(tag = %tag, "Added theme tag");
        Ok(config)
    }

    /// Remove a tag from the vocabulary and from today's selection
    pub async fn remove_tag(&self, tag: &str) -> ThemeResult<ThemeConfig> {
        let tag = tag.trim();

        let _guard = self.write_lock.lock().await;
        let mut config = self.load().await?;
        if !config.theme.iter().any(|t| t == tag) {
            return Err(ThemeError::UnknownTag(tag.to_string()));
        }
        config.theme.retain(|t| t != tag);
        config.theme_of_the_day.retain(|t| t != tag);

        let config = self
            .persist(json!({
                "theme": config.theme,
                "themeOfTheDay": config.theme_of_the_day,
            }))
            .await?;
        tracing::info!(tag = %tag, "Removed theme tag");
        Ok(config)
    }

    /// Replace today's selection
    pub async fn set_day_themes(&self, tags: &[String]) -> ThemeResult<ThemeConfig> {
        let _guard = self.write_lock.lock().await;
        let config = self.load().await?;
        self.write_day_themes(&config, tags).await
    }

    /// Turn a single tag on or off for today
    pub async fn toggle_day_theme(&self, tag: &str, on: bool) -> ThemeResult<ThemeConfig> {
        let tag = tag.trim().to_string();

        let _guard = self.write_lock.lock().await;
        let config = self.load().await?;
        let mut tags = config.theme_of_the_day.clone();
        tags.retain(|t| *t != tag);
        if on {
            tags.push(tag);
        }
        self.write_day_themes(&config, &tags).await
    }

    // caller holds write_lock; `config` is the freshly loaded document
    async fn write_day_themes(
        &self,
        config: &ThemeConfig,
        tags: &[String],
    ) -> ThemeResult<ThemeConfig> {
        if let Some(unknown) = tags
            .iter()
            .map(|t| t.trim())
            .find(|t| !config.theme.iter().any(|v| v == t))
        {
            return Err(ThemeError::UnknownTag(unknown.to_string()));
        }

        let selected: Vec<&String> = config
            .theme
            .iter()
            .filter(|v| tags.iter().any(|t| t.trim() == v.as_str()))
            .collect();

        let config = self.persist(json!({ "themeOfTheDay": selected })).await?;
        tracing::info!(themes = ?config.theme_of_the_day, "Updated themes of the day");
        Ok(config)
    }

    /// Save the common parents note, dated today
    pub async fn save_note(&self, note: &str) -> ThemeResult<ThemeConfig> {
        let today = self.clock.today();

        let _guard = self.write_lock.lock().await;
        let config = self
            .persist(json!({
                "commonParentsNote": note.trim(),
                "commonParentsNoteDate": today.format("%Y-%m-%d").to_string(),
            }))
            .await?;
        tracing::info!(date = %today, "Saved common parents note");
        Ok(config)
    }

    /// The note saved on `day`, if any
    pub async fn note_for(&self, day: NaiveDate) -> ThemeResult<Option<String>> {
        Ok(self.current().await?.note_for(day).map(str::to_string))
    }

    pub async fn view(&self, day: NaiveDate) -> ThemeResult<ThemeView> {
        let config = self.current().await?;
        Ok(ThemeView {
            common_parents_note: config.note_for(day).map(str::to_string),
            theme: config.theme,
            theme_of_the_day: config.theme_of_the_day,
        })
    }

    pub async fn view_today(&self) -> ThemeResult<ThemeView> {
        self.view(self.clock.today()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::clock::FixedClock;
    use crate::store::MemoryStore;
    use chrono::{DateTime, Duration};

    fn service() -> (ThemeConfigService, Arc<dyn DocumentStore>, Arc<FixedClock>) {
        let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
        let clock = Arc::new(FixedClock::new(
            DateTime::parse_from_rfc3339("2026-10-14T08:00:00-04:00").unwrap(),
        ));
        let service = ThemeConfigService::new(Arc::clone(&store), clock.clone());
        (service, store, clock)
    }

    #[tokio::test]
    async fn test_missing_document_is_empty() {
        let (themes, _, _) = service();
        let config = themes.current().await.unwrap();
        assert!(config.theme.is_empty());
        assert!(config.theme_of_the_day.is_empty());
    }

    #[tokio::test]
    async fn test_colors_animals_scenario() {
        let (themes, store, _) = service();
        themes.add_tag("Colors").await.unwrap();
        themes.add_tag("Animals").await.unwrap();
        themes.toggle_day_theme("Animals", true).await.unwrap();

        let config = themes.remove_tag("Animals").await.unwrap();
        assert_eq!(config.theme, vec!["Colors"]);
        assert!(config.theme_of_the_day.is_empty());

        let doc = store
            .get(Collection::AppConfig, THEME_DOC_ID)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(doc.data["theme"], json!(["Colors"]));
        assert_eq!(doc.data["themeOfTheDay"], json!([]));
    }

    #[tokio::test]
    async fn test_add_tag_trims_and_ignores_duplicates() {
        let (themes, _, _) = service();
        themes.add_tag(" Colors ").await.unwrap();
        let config = themes.add_tag("Colors").await.unwrap();
        assert_eq!(config.theme, vec!["Colors"]);

        assert!(matches!(
            themes.add_tag("   ").await,
            Err(ThemeError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_day_themes_must_be_in_vocabulary() {
        let (themes, _, _) = service();
        themes.add_tag("Colors").await.unwrap();
        themes.add_tag("Animals").await.unwrap();

        let err = themes
            .set_day_themes(&["Space".to_string()])
            .await
            .unwrap_err();
        assert!(matches!(err, ThemeError::UnknownTag(_)));

        let config = themes
            .set_day_themes(&["Animals".to_string(), "Colors".to_string(), "Animals".to_string()])
            .await
            .unwrap();
        assert_eq!(config.theme_of_the_day, vec!["Colors", "Animals"]);

        let config = themes.toggle_day_theme("Colors", false).await.unwrap();
        assert_eq!(config.theme_of_the_day, vec!["Animals"]);
    }

    #[tokio::test]
    async fn test_toggle_reads_latest_document() {
        let (a, store, clock) = service();
        let b = ThemeConfigService::new(Arc::clone(&store), clock);
        a.add_tag("Colors").await.unwrap();
        a.add_tag("Animals").await.unwrap();

        // b caches a selection that is about to go stale
        assert!(b.current().await.unwrap().theme_of_the_day.is_empty());

        a.toggle_day_theme("Colors", true).await.unwrap();
        let config = b.toggle_day_theme("Animals", true).await.unwrap();
        assert_eq!(config.theme_of_the_day, vec!["Colors", "Animals"]);
    }

    #[tokio::test]
    async fn test_note_is_stale_next_day() {
        let (themes, _, clock) = service();
        themes.save_note("Picture day tomorrow").await.unwrap();

        let today = clock.today();
        assert_eq!(
            themes.note_for(today).await.unwrap().as_deref(),
            Some("Picture day tomorrow")
        );

        clock.advance(Duration::days(1));
        let view = themes.view_today().await.unwrap();
        assert_eq!(view.common_parents_note, None);
    }

    #[tokio::test]
    async fn test_invalidate_picks_up_external_writes() {
        let (themes, store, _) = service();
        themes.add_tag("Colors").await.unwrap();

        let patch = require_object(json!({"theme": ["Colors", "Music"]})).unwrap();
        store
            .set_merge(Collection::AppConfig, THEME_DOC_ID, patch)
            .await
            .unwrap();

        assert_eq!(themes.current().await.unwrap().theme, vec!["Colors"]);
        themes.invalidate().await;
        assert_eq!(themes.current().await.unwrap().theme, vec!["Colors", "Music"]);
    }
}
