//! Service container for dependency injection
//!
//! Wires up all services with their dependencies.

use std::sync::Arc;

use url::Url;

use crate::application::services::{DocumentService, NavigationService, TreeStore};
use crate::application::ApplicationError;
use crate::config::Settings;
use crate::infrastructure::http::HttpApiClient;
use crate::infrastructure::messages::WebSocketMessages;
use crate::infrastructure::traits::{ApiClient, MessageSource, Selector, SkimSelector};
use crate::infrastructure::{InfraError, InfraResult};

/// Container holding all application services.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Backend client
    pub api: Arc<dyn ApiClient>,

    /// Interactive selector
    pub selector: Arc<dyn Selector>,

    pub store: Arc<TreeStore>,
    pub navigation: NavigationService,
    pub documents: DocumentService,
}

impl ServiceContainer {
    /// Create a new service container with real implementations.
    pub fn new(settings: Settings) -> InfraResult<Self> {
        let api = Arc::new(HttpApiClient::new(&settings)?);
        Self::with_deps(settings, api, Arc::new(SkimSelector))
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(
        settings: Settings,
        api: Arc<dyn ApiClient>,
        selector: Arc<dyn Selector>,
    ) -> InfraResult<Self> {
        let settings = Arc::new(settings);
        let store = Arc::new(TreeStore::new(Arc::clone(&api)));
        let navigation =
            NavigationService::new(Arc::clone(&api), Arc::clone(&store), settings.source.clone());
        let documents = DocumentService::new(&settings.doc)?;

        Ok(Self {
            settings,
            api,
            selector,
            store,
            navigation,
            documents,
        })
    }

    /// Open the backend's push message channel.
    pub fn connect_messages(&self) -> InfraResult<Box<dyn MessageSource>> {
        let base = Url::parse(&self.settings.api_url).map_err(|e| {
            InfraError::Application(ApplicationError::Config {
                message: format!("invalid api_url {:?}: {e}", self.settings.api_url),
            })
        })?;
        let messages = WebSocketMessages::connect(&base, self.settings.api_version).map_err(|e| {
            InfraError::Messages {
                message: e.to_string(),
            }
        })?;
        Ok(Box::new(messages))
    }
}
