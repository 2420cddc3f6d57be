#![allow(dead_code)]

use async_trait::async_trait;
use axum::Router;
use axum::extract::ConnectInfo;
use axum_test::TestServer;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::future::Future;
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;
use tower::Layer;

use snaplink::application::services::LinkServiceOptions;
use snaplink::domain::click_event::ClickEvent;
use snaplink::domain::entities::LinkRecord;
use snaplink::domain::repositories::{
    CellCondition, ClickRepository, Columns, KeyValueStore, Mutation, Row, StoreError, StoreResult,
};
use snaplink::infrastructure::cache::{CacheResult, CacheService, NullCache};
use snaplink::infrastructure::persistence::TRACKING_TABLE;
use snaplink::infrastructure::persistence::kv_link_repository::{encode_link, link_row_key};
use snaplink::infrastructure::store::MemoryStore;
use snaplink::routes::routes;
use snaplink::state::AppState;

pub fn create_test_state() -> (AppState, mpsc::Receiver<ClickEvent>) {
    create_test_state_with(Arc::new(MemoryStore::new()), LinkServiceOptions::default())
}

pub fn create_test_state_with(
    store: Arc<dyn KeyValueStore>,
    options: LinkServiceOptions,
) -> (AppState, mpsc::Receiver<ClickEvent>) {
    create_test_state_cached(store, Arc::new(NullCache::new()), options)
}

pub fn create_test_state_cached(
    store: Arc<dyn KeyValueStore>,
    cache: Arc<dyn CacheService>,
    options: LinkServiceOptions,
) -> (AppState, mpsc::Receiver<ClickEvent>) {
    let (tx, rx) = mpsc::channel(100);
    let state = AppState::new(store, cache, tx, options);
    (state, rx)
}

/// Every route, with a fixed peer address in place of a real socket.
pub fn test_server(state: AppState) -> TestServer {
    let app: Router = routes().layer(MockConnectInfoLayer).with_state(state);
    TestServer::new(app).unwrap()
}

/// Writes a record directly, bypassing creation-time stamping.
pub async fn insert_record(state: &AppState, record: &LinkRecord) {
    state
        .store
        .put(
            TRACKING_TABLE,
            &link_row_key(&record.short_code),
            encode_link(record),
        )
        .await
        .unwrap();
}

pub fn record(
    code: &str,
    url: &str,
    owner: &str,
    created: DateTime<Utc>,
    expires: DateTime<Utc>,
) -> LinkRecord {
    LinkRecord {
        short_code: code.to_string(),
        long_url: url.to_string(),
        owner_id: owner.to_string(),
        creation_timestamp: created,
        expiration_timestamp: expires,
        one_time_use: false,
        active: true,
        custom_alias: Some(code.to_string()),
    }
}

/// Persists every queued click event, then returns how many were written.
pub async fn drain_clicks(state: &AppState, rx: &mut mpsc::Receiver<ClickEvent>) -> usize {
    let repository = state.click_service.repository();
    let mut written = 0;
    while let Ok(event) = rx.try_recv() {
        repository.record_click(event.into_new_click()).await.unwrap();
        written += 1;
    }
    written
}

/// Process-local [`CacheService`] without expiry.
#[derive(Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, LinkRecord>>,
}

impl MemoryCache {
    pub fn contains(&self, code: &str) -> bool {
        self.entries.lock().unwrap().contains_key(code)
    }
}

#[async_trait]
impl CacheService for MemoryCache {
    async fn get_link(&self, short_code: &str) -> CacheResult<Option<LinkRecord>> {
        Ok(self.entries.lock().unwrap().get(short_code).cloned())
    }

    async fn set_link(&self, record: &LinkRecord, _ttl_seconds: Option<u64>) -> CacheResult<bool> {
        self.entries
            .lock()
            .unwrap()
            .insert(record.short_code.clone(), record.clone());
        Ok(true)
    }

    async fn invalidate(&self, short_code: &str) -> CacheResult<()> {
        self.entries.lock().unwrap().remove(short_code);
        Ok(())
    }

    async fn health_check(&self) -> bool {
        true
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

pub type StoreHook = Box<dyn FnOnce() -> Pin<Box<dyn Future<Output = ()> + Send>> + Send>;

/// [`MemoryStore`] wrapper that can interleave other work with a caller's calls.
///
/// - `after_get`: runs a hook once, right after the first read of a key
/// - `time_out_first_insert`: the first `put_if_absent` under a prefix is
///   committed but reported as a timeout
#[derive(Default)]
pub struct HookedStore {
    pub inner: Arc<MemoryStore>,
    get_hook: Mutex<Option<(String, StoreHook)>>,
    insert_fault: Mutex<Option<String>>,
    insert_faulted: AtomicBool,
}

impl HookedStore {
    pub fn new(inner: Arc<MemoryStore>) -> Self {
        Self {
            inner,
            ..Self::default()
        }
    }

    pub fn after_get(self, key: &str, hook: StoreHook) -> Self {
        *self.get_hook.lock().unwrap() = Some((key.to_string(), hook));
        self
    }

    pub fn time_out_first_insert(self, prefix: &str) -> Self {
        *self.insert_fault.lock().unwrap() = Some(prefix.to_string());
        self
    }

    fn take_hook(&self, key: &str) -> Option<StoreHook> {
        let mut slot = self.get_hook.lock().unwrap();
        match slot.as_ref() {
            Some((trigger, _)) if trigger == key => slot.take().map(|(_, hook)| hook),
            _ => None,
        }
    }
}

#[async_trait]
impl KeyValueStore for HookedStore {
    async fn get(&self, table: &str, key: &str) -> StoreResult<Option<Row>> {
        let row = self.inner.get(table, key).await;
        if let Some(hook) = self.take_hook(key) {
            hook().await;
        }
        row
    }

    async fn put(&self, table: &str, key: &str, columns: Columns) -> StoreResult<()> {
        self.inner.put(table, key, columns).await
    }

    async fn put_if_absent(&self, table: &str, key: &str, columns: Columns) -> StoreResult<bool> {
        let written = self.inner.put_if_absent(table, key, columns).await?;
        let faulty = self
            .insert_fault
            .lock()
            .unwrap()
            .as_deref()
            .is_some_and(|prefix| key.starts_with(prefix));
        if written && faulty && !self.insert_faulted.swap(true, Ordering::SeqCst) {
            return Err(StoreError::Timeout(Duration::from_millis(50)));
        }
        Ok(written)
    }

    async fn check_and_put(
        &self,
        table: &str,
        key: &str,
        condition: CellCondition,
        columns: Columns,
    ) -> StoreResult<bool> {
        self.inner.check_and_put(table, key, condition, columns).await
    }

    async fn delete(&self, table: &str, key: &str) -> StoreResult<bool> {
        self.inner.delete(table, key).await
    }

    async fn scan_prefix(&self, table: &str, prefix: &str) -> StoreResult<Vec<Row>> {
        self.inner.scan_prefix(table, prefix).await
    }

    async fn scan_all(&self, table: &str) -> StoreResult<Vec<Row>> {
        self.inner.scan_all(table).await
    }

    async fn count_prefix(&self, table: &str, prefix: &str) -> StoreResult<u64> {
        self.inner.count_prefix(table, prefix).await
    }

    async fn write_batch(&self, table: &str, mutations: Vec<Mutation>) -> StoreResult<bool> {
        self.inner.write_batch(table, mutations).await
    }

    async fn health_check(&self) -> StoreResult<()> {
        self.inner.health_check().await
    }

    fn backend_name(&self) -> &'static str {
        "hooked"
    }
}

#[derive(Clone)]
pub struct MockConnectInfoLayer;

impl<S> Layer<S> for MockConnectInfoLayer {
    type Service = MockConnectInfoService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        MockConnectInfoService { inner }
    }
}

#[derive(Clone)]
pub struct MockConnectInfoService<S> {
    inner: S,
}

impl<S, B> tower::Service<axum::http::Request<B>> for MockConnectInfoService<S>
where
    S: tower::Service<axum::http::Request<B>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    B: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: axum::http::Request<B>) -> Self::Future {
        let addr: SocketAddr = "127.0.0.1:12345".parse().unwrap();
        req.extensions_mut().insert(ConnectInfo(addr));
        self.inner.call(req)
    }
}
