use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::favorites::{FavoritesStore, JsonFileStore, KeyValueStore, MemoryStore};
use crate::pagination::{DEFAULT_GROUP_SIZE, DEFAULT_ITEMS_PER_PAGE};
use crate::record::Record;
use crate::source::{self, RecordSource, RetryPolicy, SourceError};
use crate::state::AppState;

#[derive(Clone, Debug)]
pub enum FavoritesBackend {
    File(PathBuf),
    Memory,
}

#[derive(Clone, Debug)]
pub struct Options {
    pub source: RecordSource,
    pub favorites: FavoritesBackend,
    pub timeout_seconds: u64,
    pub retry: RetryPolicy,
    pub proxy: Option<String>,
    pub items_per_page: usize,
    pub group_size: usize,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            source: RecordSource::Url(source::DEFAULT_SOURCE_URL.to_string()),
            favorites: FavoritesBackend::Memory,
            timeout_seconds: 10,
            retry: RetryPolicy::default(),
            proxy: None,
            items_per_page: DEFAULT_ITEMS_PER_PAGE,
            group_size: DEFAULT_GROUP_SIZE,
        }
    }
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("invalid URL: {url}")]
    InvalidUrl { url: String },

    #[error("invalid items_per_page {value}, expected positive integer")]
    InvalidItemsPerPage { value: usize },

    #[error("invalid group_size {value}, expected positive integer")]
    InvalidGroupSize { value: usize },

    #[error("invalid retry attempts {value}, expected at least 1")]
    InvalidRetries { value: u32 },

    #[error("failed to build HTTP client: {source}")]
    HttpClientBuild {
        #[source]
        source: reqwest::Error,
    },
}

/// Owns the collaborators of a browsing session: the HTTP client, the
/// record source and the favorites storage.
#[derive(Debug)]
pub struct Session {
    options: Options,
    client: reqwest::Client,
}

impl Session {
    pub fn new(options: Options) -> Result<Self, SessionError> {
        if let RecordSource::Url(url) = &options.source {
            if reqwest::Url::parse(url).is_err() {
                return Err(SessionError::InvalidUrl { url: url.clone() });
            }
        }
        if options.items_per_page == 0 {
            return Err(SessionError::InvalidItemsPerPage {
                value: options.items_per_page,
            });
        }
        if options.group_size == 0 {
            return Err(SessionError::InvalidGroupSize {
                value: options.group_size,
            });
        }
        if options.retry.max_attempts == 0 {
            return Err(SessionError::InvalidRetries {
                value: options.retry.max_attempts,
            });
        }
        let client = source::build_client(options.timeout_seconds, options.proxy.as_deref())
            .map_err(|e| SessionError::HttpClientBuild { source: e })?;
        Ok(Self { options, client })
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    fn favorites_store(&self) -> Box<dyn KeyValueStore> {
        match &self.options.favorites {
            FavoritesBackend::File(path) => Box::new(JsonFileStore::new(path.clone())),
            FavoritesBackend::Memory => Box::new(MemoryStore::new()),
        }
    }

    /// Fresh state in the loading phase, with favorites read from storage.
    pub fn open(&self) -> AppState {
        let favorites = FavoritesStore::load(self.favorites_store());
        AppState::new(
            favorites,
            self.options.items_per_page,
            self.options.group_size,
        )
    }

    pub async fn fetch(&self) -> Result<Vec<Record>, SourceError> {
        source::load_records(&self.client, &self.options.source, self.options.retry).await
    }

    /// Loads the records into `state`. A failure is logged and turned into
    /// the failed-load state; it is returned for callers that want it.
    pub async fn load_into(&self, state: &mut AppState) -> Option<SourceError> {
        match self.fetch().await {
            Ok(records) => {
                tracing::debug!(count = records.len(), "services loaded");
                state.finish_loading(Ok(records));
                None
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    source = %self.options.source.describe(),
                    "failed to load services"
                );
                state.finish_loading(Err(e.to_string()));
                Some(e)
            }
        }
    }

    pub async fn start(&self) -> (AppState, Option<SourceError>) {
        let mut state = self.open();
        let err = self.load_into(&mut state).await;
        (state, err)
    }
}

pub fn retry_policy(attempts: u32, backoff_ms: u64) -> RetryPolicy {
    RetryPolicy {
        max_attempts: attempts,
        initial_backoff: Duration::from_millis(backoff_ms),
        ..RetryPolicy::default()
    }
}
