//! Page Configuration
//!
//! Defaults match the route as deployed: 20 open todos per page, new todos
//! created as MEDIUM / "general". Values can be overridden at build time
//! through `TODO_PAGE_CONFIG` (JSON), `TODO_API_URL` and `TODO_LOG_LEVEL`.

use log::LevelFilter;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{Priority, TodoFilter};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid page config JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("page_size must be positive, got {0}")]
    InvalidPageSize(i32),
    #[error("api_url must not be empty")]
    MissingApiUrl,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageConfig {
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default = "default_page_size")]
    pub page_size: i32,
    /// Completion filter for the list; `None` lists everything
    #[serde(default = "default_completed")]
    pub completed: Option<bool>,
    #[serde(default = "default_priority")]
    pub default_priority: Priority,
    #[serde(default = "default_category")]
    pub default_category: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_api_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_page_size() -> i32 {
    20
}

fn default_completed() -> Option<bool> {
    Some(false)
}

fn default_priority() -> Priority {
    Priority::Medium
}

fn default_category() -> String {
    "general".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            page_size: default_page_size(),
            completed: default_completed(),
            default_priority: default_priority(),
            default_category: default_category(),
            log_level: default_log_level(),
        }
    }
}

impl PageConfig {
    /// Build the config from values baked in at compile time
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_sources(option_env!("TODO_PAGE_CONFIG"), option_env!("TODO_API_URL"), option_env!("TODO_LOG_LEVEL"))
    }

    fn from_sources(json: Option<&str>, api_url: Option<&str>, log_level: Option<&str>) -> Result<Self, ConfigError> {
        let mut config = match json {
            Some(json) => serde_json::from_str(json)?,
            None => Self::default(),
        };
        if let Some(url) = api_url {
            config.api_url = url.to_string();
        }
        if let Some(level) = log_level {
            config.log_level = level.to_string();
        }
        config.validate()?;
        Ok(config)
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Self::from_sources(Some(json), None, None)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.page_size <= 0 {
            return Err(ConfigError::InvalidPageSize(self.page_size));
        }
        if self.api_url.trim().is_empty() {
            return Err(ConfigError::MissingApiUrl);
        }
        Ok(())
    }

    /// Filter used by the list query
    pub fn filter(&self) -> TodoFilter {
        TodoFilter {
            page_size: self.page_size,
            completed: self.completed,
            priority: None,
            category: None,
        }
    }

    /// Parsed log level; unknown names fall back to `Info`
    pub fn log_level(&self) -> LevelFilter {
        self.log_level.parse().unwrap_or(LevelFilter::Info)
    }
}
