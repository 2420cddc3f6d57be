//! Shared application state injected into every handler.

use std::sync::Arc;
use tokio::sync::mpsc;

use crate::application::services::{ClickService, LinkService, LinkServiceOptions};
use crate::domain::click_event::ClickEvent;
use crate::domain::repositories::KeyValueStore;
use crate::infrastructure::cache::CacheService;
use crate::infrastructure::persistence::{KvClickRepository, KvLinkRepository};

pub type AppLinkService = LinkService<KvLinkRepository, KvClickRepository>;
pub type AppClickService = ClickService<KvClickRepository>;

/// Handles shared by all requests.
///
/// Cheap to clone; every field is reference-counted.
#[derive(Clone)]
pub struct AppState {
    pub link_service: Arc<AppLinkService>,
    pub click_service: Arc<AppClickService>,
    pub store: Arc<dyn KeyValueStore>,
    pub cache: Arc<dyn CacheService>,
    pub click_sender: mpsc::Sender<ClickEvent>,
}

impl AppState {
    /// Wires the repositories and services over `store`.
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        cache: Arc<dyn CacheService>,
        click_sender: mpsc::Sender<ClickEvent>,
        options: LinkServiceOptions,
    ) -> Self {
        let link_repository = Arc::new(KvLinkRepository::new(store.clone()));
        let click_repository = Arc::new(KvClickRepository::new(store.clone()));

        let click_service = Arc::new(ClickService::new(click_repository));
        let link_service = Arc::new(LinkService::new(
            link_repository,
            click_service.clone(),
            cache.clone(),
            click_sender.clone(),
            options,
        ));

        Self {
            link_service,
            click_service,
            store,
            cache,
            click_sender,
        }
    }
}
