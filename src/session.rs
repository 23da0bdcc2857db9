//! One interactive search/chat session.
//!
//! A [`Session`] owns the API client (and with it the endpoint resolver's
//! fallback decision), the chat history, and the in-flight indicator shown
//! while a request is running. Nothing is persisted.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use govsearch_hybrid::router::{self, SearchOutcome};
use govsearch_hybrid::{ApiClient, ChatMessage, EndpointState, SearchApi, SearchMode};

use crate::chat::{ChatResponse, grounded_turn};
use crate::config::AppConfig;
use crate::error::Result;

/// Shared "request in flight" flag.
///
/// Cloning shares the flag, so a UI can watch it while the session works.
#[derive(Debug, Clone, Default)]
pub struct LoadingIndicator(Arc<AtomicBool>);

impl LoadingIndicator {
    /// `true` while a request is running.
    pub fn is_active(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Set the flag until the returned guard is dropped.
    pub fn begin(&self) -> LoadingGuard {
        self.0.store(true, Ordering::Release);
        LoadingGuard(Arc::clone(&self.0))
    }
}

/// Clears the [`LoadingIndicator`] on drop, including on early return.
#[derive(Debug)]
pub struct LoadingGuard(Arc<AtomicBool>);

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// An interactive session against one search/chat service.
#[derive(Debug)]
pub struct Session<A = ApiClient> {
    api: A,
    config: AppConfig,
    mode: SearchMode,
    history: Vec<ChatMessage>,
    loading: LoadingIndicator,
}

impl Session<ApiClient> {
    /// Connect using `config`.
    ///
    /// Probes the primary endpoint (switching to the local fallback if it
    /// does not answer in time) and resolves the search mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub async fn connect(config: AppConfig) -> Result<Self> {
        config.validate()?;
        let api = ApiClient::new(&config.client_config())?;
        let state = api.probe().await;
        tracing::info!(endpoint = %api.resolver().current(), ?state, "session connected");
        let mode = router::resolve_mode(&api, config.search.mode.explicit()).await;
        Ok(Self::with_api(api, config, mode))
    }

    /// Which endpoint the session is using.
    pub fn endpoint_state(&self) -> EndpointState {
        self.api.resolver().state()
    }
}

impl<A: SearchApi> Session<A> {
    /// Build a session around an existing backend.
    pub fn with_api(api: A, config: AppConfig, mode: SearchMode) -> Self {
        Self {
            api,
            config,
            mode,
            history: Vec::new(),
            loading: LoadingIndicator::default(),
        }
    }

    /// The backend.
    pub fn api(&self) -> &A {
        &self.api
    }

    /// Current search mode.
    pub fn mode(&self) -> SearchMode {
        self.mode
    }

    /// Switch search mode for subsequent searches.
    pub fn set_mode(&mut self, mode: SearchMode) {
        self.mode = mode;
    }

    /// Conversation so far, oldest first.
    pub fn history(&self) -> &[ChatMessage] {
        &self.history
    }

    /// Forget the conversation.
    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    /// A handle on the in-flight indicator.
    pub fn loading(&self) -> LoadingIndicator {
        self.loading.clone()
    }

    /// Search with the session's mode and configured defaults.
    ///
    /// # Errors
    ///
    /// Returns the search error; an empty result is not an error.
    pub async fn search(&self, query: &str) -> Result<SearchOutcome> {
        let _loading = self.loading.begin();
        let params = self.config.search_params(query);
        let outcome =
            router::search(&self.api, self.mode, &params, self.config.hybrid_execution()).await?;
        Ok(outcome)
    }

    /// Run one grounded chat turn and record it in the history.
    ///
    /// Never fails; see [`grounded_turn`]. Only exchanges the model
    /// answered are recorded, so a failed turn is never sent back upstream
    /// as an assistant message.
    pub async fn chat(&mut self, message: &str) -> ChatResponse {
        let _loading = self.loading.begin();
        let policy = self.config.chat_policy();
        let response = grounded_turn(&self.api, message, &self.history, &policy).await;
        if !response.synthesized {
            self.history.push(ChatMessage::user(message));
            self.history.push(response.message.clone());
        }
        response
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;
    use govsearch_hybrid::{
        ChatRole, ClientError, MergedResult, SearchCapabilities, SearchParams, SearchResult,
    };
    use std::sync::Mutex;

    /// Backend that records whether the loading flag was set during each call.
    #[derive(Default)]
    struct WatchingApi {
        indicator: Mutex<Option<LoadingIndicator>>,
        seen_active: Mutex<Vec<bool>>,
        seen_history: Mutex<Vec<usize>>,
        fail: bool,
    }

    impl WatchingApi {
        fn observe(&self) {
            let active = self
                .indicator
                .lock()
                .unwrap()
                .as_ref()
                .is_some_and(LoadingIndicator::is_active);
            self.seen_active.lock().unwrap().push(active);
        }

        fn outcome<T>(&self, value: T) -> govsearch_hybrid::Result<T> {
            if self.fail {
                Err(ClientError::Connect("refused".into()))
            } else {
                Ok(value)
            }
        }
    }

    impl SearchApi for WatchingApi {
        async fn hybrid_search(
            &self,
            _params: &SearchParams,
        ) -> govsearch_hybrid::Result<Vec<MergedResult>> {
            self.observe();
            self.outcome(Vec::new())
        }

        async fn vector_search(
            &self,
            _q: &str,
            _l: usize,
        ) -> govsearch_hybrid::Result<Vec<SearchResult>> {
            self.observe();
            self.outcome(Vec::new())
        }

        async fn kg_search(&self, _q: &str, _l: usize) -> govsearch_hybrid::Result<Vec<SearchResult>> {
            self.observe();
            self.outcome(Vec::new())
        }

        async fn capabilities(&self) -> govsearch_hybrid::Result<SearchCapabilities> {
            self.outcome(SearchCapabilities::default())
        }

        async fn chat(
            &self,
            _query: &str,
            history: &[ChatMessage],
            _context: &[MergedResult],
        ) -> govsearch_hybrid::Result<String> {
            self.observe();
            self.seen_history.lock().unwrap().push(history.len());
            self.outcome("answer".to_owned())
        }
    }

    fn session(fail: bool) -> Session<WatchingApi> {
        let api = WatchingApi {
            fail,
            ..Default::default()
        };
        let session = Session::with_api(api, AppConfig::default(), SearchMode::Hybrid);
        *session.api().indicator.lock().unwrap() = Some(session.loading());
        session
    }

    #[test]
    fn guard_clears_flag_on_drop() {
        let indicator = LoadingIndicator::default();
        {
            let _guard = indicator.begin();
            assert!(indicator.is_active());
        }
        assert!(!indicator.is_active());
    }

    #[tokio::test]
    async fn loading_set_during_search_and_cleared_after_error() {
        let session = session(true);
        let result = session.search("jobs").await;
        assert!(result.is_err());
        assert_eq!(*session.api().seen_active.lock().unwrap(), vec![true]);
        assert!(!session.loading().is_active());
    }

    #[tokio::test]
    async fn empty_search_reports_notice() {
        let session = session(false);
        let outcome = session.search("nothing matches").await.unwrap();
        assert_eq!(
            outcome.notice().as_deref(),
            Some("No results found for \"nothing matches\"")
        );
        assert!(!session.loading().is_active());
    }

    #[tokio::test]
    async fn chat_turns_accumulate_history() {
        let mut session = session(false);
        session.chat("first question").await;
        session.chat("follow-up").await;

        let history = session.history();
        assert_eq!(history.len(), 4);
        assert_eq!(history[0], ChatMessage::user("first question"));
        assert_eq!(history[1].role, ChatRole::Assistant);
        assert_eq!(history[2].content, "follow-up");
        // The second turn was sent the first exchange as history.
        assert_eq!(*session.api().seen_history.lock().unwrap(), vec![0, 2]);
        assert!(!session.loading().is_active());
    }

    #[tokio::test]
    async fn failed_chat_is_not_recorded() {
        let mut session = session(true);
        let response = session.chat("anyone there?").await;
        assert!(response.sources.is_empty());
        assert!(response.synthesized);
        assert!(session.history().is_empty());
        assert!(!session.loading().is_active());
    }

    #[tokio::test]
    async fn blank_chat_not_recorded() {
        let mut session = session(false);
        session.chat("   ").await;
        assert!(session.history().is_empty());
    }

    #[tokio::test]
    async fn mode_can_be_switched() {
        let mut session = session(false);
        session.set_mode(SearchMode::Vector);
        let outcome = session.search("jobs").await.unwrap();
        assert_eq!(outcome.mode, SearchMode::Vector);
        session.clear_history();
        assert!(session.history().is_empty());
    }
}
