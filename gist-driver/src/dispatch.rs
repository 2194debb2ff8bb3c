//! Inbound command handling.

use std::sync::Arc;

use gist_config::{ConfigStore, snapshot};
use gist_types::{
    Channel, Command, CompletionError, FillFormRequest, Settings, SummarizeRequest, Transport,
};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::cache::ResultCache;
use crate::driver::{Driver, Outcome, fail};
use crate::prompts::{form_fill_messages, summary_messages};

/// Message published when a summarize command carries nothing to summarize.
pub const ERR_NO_CONTENT: &str = "No content to summarize";

/// Turns [`Command`]s from UI surfaces into driver runs.
///
/// Each request runs on its own spawned task with its own settings
/// snapshot; the only state shared between requests is the store and the
/// [`ResultCache`].
pub struct Dispatcher<T: Transport> {
    store: Arc<dyn ConfigStore>,
    driver: Arc<Driver<T>>,
    cache: ResultCache,
}

impl<T: Transport + 'static> Dispatcher<T> {
    /// Create a dispatcher with an empty result cache.
    pub fn new(store: Arc<dyn ConfigStore>, transport: T) -> Self {
        Self {
            store,
            driver: Arc::new(Driver::new(transport)),
            cache: ResultCache::new(),
        }
    }

    /// Share an existing result cache.
    #[must_use]
    pub fn with_cache(mut self, cache: ResultCache) -> Self {
        self.cache = cache;
        self
    }

    /// Completed summaries, by page URL.
    pub fn cache(&self) -> &ResultCache {
        &self.cache
    }

    /// Handle one command, publishing its events to `channel`.
    ///
    /// Returns the spawned request task, or `None` for commands that
    /// publish nothing to `channel`.
    pub fn dispatch<C>(&self, command: Command, channel: C) -> Option<JoinHandle<Outcome>>
    where
        C: Channel + 'static,
    {
        let job = Job {
            store: Arc::clone(&self.store),
            driver: Arc::clone(&self.driver),
            cache: self.cache.clone(),
        };
        match command {
            Command::Summarize(request) => {
                Some(tokio::spawn(async move { job.summarize(&channel, request).await }))
            }
            Command::FillForm(request) => {
                Some(tokio::spawn(async move { job.fill_form(&channel, request).await }))
            }
            Command::KeepAlive => {
                tracing::trace!("keep-alive");
                None
            }
            Command::Forget { url } => {
                tracing::debug!(url = %url, "forgetting cached summary");
                tokio::spawn(async move { job.cache.forget(&url).await });
                None
            }
        }
    }

    /// Dispatch every command received on `commands` until the sender
    /// side closes.
    pub async fn serve<C>(&self, mut commands: mpsc::UnboundedReceiver<Command>, channel: C)
    where
        C: Channel + Clone + 'static,
    {
        while let Some(command) = commands.recv().await {
            self.dispatch(command, channel.clone());
        }
        tracing::debug!("command stream closed");
    }
}

/// Everything one spawned request needs.
struct Job<T: Transport> {
    store: Arc<dyn ConfigStore>,
    driver: Arc<Driver<T>>,
    cache: ResultCache,
}

impl<T: Transport> Job<T> {
    async fn summarize<C: Channel>(&self, channel: &C, request: SummarizeRequest) -> Outcome {
        let settings = match self.settings(channel).await {
            Ok(settings) => settings,
            Err(outcome) => return outcome,
        };

        let mut profile = settings.resolve_profile(request.profile.as_deref());
        if let Some(model) = request.model.filter(|m| !m.trim().is_empty()) {
            profile.model = model;
        }
        if request.reasoning_effort.is_some() {
            profile.reasoning = request.reasoning_effort;
        }

        let messages = if !request.messages.is_empty() {
            request.messages
        } else if let Some(content) = request.content.as_deref() {
            summary_messages(&profile, request.instructions.as_deref(), content)
        } else {
            return fail(channel, CompletionError::Configuration(ERR_NO_CONTENT.into())).await;
        };

        let outcome = self
            .driver
            .fetch_and_stream(channel, &settings, &profile, messages)
            .await;

        if let (Outcome::Completed(Some(summary)), Some(url)) = (&outcome, &request.url) {
            self.cache.record(url, &profile.model, summary).await;
        }
        outcome
    }

    async fn fill_form<C: Channel>(&self, channel: &C, request: FillFormRequest) -> Outcome {
        let settings = match self.settings(channel).await {
            Ok(settings) => settings,
            Err(outcome) => return outcome,
        };
        let profile = settings.resolve_profile(request.profile.as_deref());
        let messages = form_fill_messages(&request.prompt, request.context.as_deref());
        self.driver
            .fetch_and_stream(channel, &settings, &profile, messages)
            .await
    }

    /// Take this request's snapshot, reporting a store failure to the consumer.
    async fn settings<C: Channel>(&self, channel: &C) -> Result<Settings, Outcome> {
        match snapshot(self.store.as_ref()).await {
            Ok(settings) => Ok(settings),
            Err(err) => {
                tracing::error!(error = %err, "failed to load settings");
                Err(fail(channel, CompletionError::Configuration(err.to_string())).await)
            }
        }
    }
}
