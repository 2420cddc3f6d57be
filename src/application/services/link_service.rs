//! Link lifecycle service: creation, resolution, rename, removal and search.

use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, info, warn};

use crate::application::services::ClickService;
use crate::domain::click_event::{ClickContext, ClickEvent};
use crate::domain::entities::{LinkRecord, LinkStatus, LinkSummary, NewLink};
use crate::domain::repositories::{ClickRepository, LinkRepository};
use crate::error::AppError;
use crate::infrastructure::cache::CacheService;
use crate::utils::code_generator::{candidate_code, validate_alias};
use crate::utils::timestamp::parse_expiration;
use crate::utils::url_normalizer::validate_long_url;

/// Default number of generated candidates tried before giving up.
pub const DEFAULT_CODE_MAX_ATTEMPTS: u32 = 5;

/// Tunables for [`LinkService`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkServiceOptions {
    /// Generated candidates tried per creation; at least 1.
    pub code_max_attempts: u32,
    /// Delete a link's clicks together with the link.
    pub cascade_delete_clicks: bool,
}

impl Default for LinkServiceOptions {
    fn default() -> Self {
        Self {
            code_max_attempts: DEFAULT_CODE_MAX_ATTEMPTS,
            cascade_delete_clicks: false,
        }
    }
}

/// Input of [`LinkService::create`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateLinkRequest {
    pub long_url: String,
    pub owner_id: String,
    pub one_time_use: bool,
    /// ISO-8601 instant; `None` or empty means never.
    pub expiration: Option<String>,
    /// Caller-chosen code; `None` or empty means generate one.
    pub custom_alias: Option<String>,
}

/// Outcome of a successful resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    /// Redirect target with a scheme guaranteed.
    pub destination: String,
    pub record: LinkRecord,
}

/// Service owning the link record state machine.
///
/// Reads go through the cache first; every write goes to the repository
/// and then invalidates the cached copy. Successful resolutions hand a
/// [`ClickEvent`] to the click worker without waiting for it.
pub struct LinkService<L: LinkRepository, C: ClickRepository> {
    link_repository: Arc<L>,
    clicks: Arc<ClickService<C>>,
    cache: Arc<dyn CacheService>,
    click_sender: mpsc::Sender<ClickEvent>,
    options: LinkServiceOptions,
}

impl<L: LinkRepository, C: ClickRepository> LinkService<L, C> {
    pub fn new(
        link_repository: Arc<L>,
        clicks: Arc<ClickService<C>>,
        cache: Arc<dyn CacheService>,
        click_sender: mpsc::Sender<ClickEvent>,
        options: LinkServiceOptions,
    ) -> Self {
        Self {
            link_repository,
            clicks,
            cache,
            click_sender,
            options,
        }
    }

    /// Creates a link, with the caller's alias when one is given.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] for a bad URL, owner, alias or
    /// expiration, and [`AppError::Conflict`] when the code is taken.
    pub async fn create(&self, request: CreateLinkRequest) -> Result<LinkRecord, AppError> {
        let alias = request
            .custom_alias
            .as_deref()
            .map(str::trim)
            .filter(|a| !a.is_empty());

        match alias {
            Some(alias) => {
                self.create_with_alias(
                    alias,
                    &request.long_url,
                    &request.owner_id,
                    request.one_time_use,
                    request.expiration.as_deref(),
                )
                .await
            }
            None => {
                self.create_auto(
                    &request.long_url,
                    &request.owner_id,
                    request.one_time_use,
                    request.expiration.as_deref(),
                )
                .await
            }
        }
    }

    /// Creates a link under a code derived from the URL.
    ///
    /// The first candidate is the plain hash of the URL; on conflict salted
    /// candidates are tried up to `code_max_attempts` in total.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if every candidate is taken.
    pub async fn create_auto(
        &self,
        long_url: &str,
        owner_id: &str,
        one_time_use: bool,
        expiration: Option<&str>,
    ) -> Result<LinkRecord, AppError> {
        let draft = prepare(long_url, owner_id, one_time_use, expiration)?;
        let attempts = self.options.code_max_attempts.max(1);

        for attempt in 0..attempts {
            let code = candidate_code(&draft.long_url, attempt);
            let new_link = NewLink {
                code: code.clone(),
                ..draft.clone()
            };

            match self.link_repository.create(new_link).await {
                Ok(record) => {
                    metrics::counter!("snaplink_links_created_total").increment(1);
                    info!(code = %record.short_code, owner = %record.owner_id, "Link created");
                    return Ok(record);
                }
                Err(AppError::Conflict { .. }) => {
                    debug!(code = %code, attempt, "Generated code taken, retrying");
                }
                Err(e) => return Err(e),
            }
        }

        Err(AppError::conflict(
            "Could not allocate a unique short code",
            json!({ "attempts": attempts }),
        ))
    }

    /// Creates a link under a caller-chosen alias.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the alias exists; the existing
    /// record is left untouched.
    pub async fn create_with_alias(
        &self,
        alias: &str,
        long_url: &str,
        owner_id: &str,
        one_time_use: bool,
        expiration: Option<&str>,
    ) -> Result<LinkRecord, AppError> {
        validate_alias(alias)?;
        let draft = prepare(long_url, owner_id, one_time_use, expiration)?;

        let record = self
            .link_repository
            .create(NewLink {
                code: alias.to_string(),
                ..draft
            })
            .await?;

        metrics::counter!("snaplink_links_created_total").increment(1);
        info!(code = %record.short_code, owner = %record.owner_id, "Link created with alias");
        Ok(record)
    }

    /// Resolves `code` to its destination and dispatches a click event.
    ///
    /// One-time links are consumed here: only the caller that flips the
    /// record to inactive gets the destination.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] for unknown or inactive codes and
    /// [`AppError::Expired`] for links past their effective expiration.
    pub async fn resolve(&self, code: &str, context: ClickContext) -> Result<Resolution, AppError> {
        let outcome = self.resolve_inner(code, context).await;
        let label = match &outcome {
            Ok(_) => "ok",
            Err(AppError::NotFound { .. }) => "not_found",
            Err(AppError::Expired { .. }) => "expired",
            Err(_) => "error",
        };
        metrics::counter!("snaplink_redirects_total", "outcome" => label).increment(1);
        outcome
    }

    async fn resolve_inner(
        &self,
        code: &str,
        context: ClickContext,
    ) -> Result<Resolution, AppError> {
        let mut record = self.load(code).await?.ok_or_else(|| not_found(code))?;

        match record.status_at(Utc::now()) {
            LinkStatus::Active => {}
            LinkStatus::Inactive => return Err(not_found(code)),
            LinkStatus::Expired => {
                return Err(AppError::expired(
                    "Short link has expired",
                    json!({ "code": code, "expired_at": record.effective_expiration() }),
                ));
            }
        }

        if record.one_time_use {
            if !self.link_repository.deactivate(code).await? {
                debug!(code = %code, "One-time link already consumed");
                return Err(not_found(code));
            }
            record.active = false;
            self.invalidate(code).await;
            info!(code = %code, "One-time link consumed");
        }

        self.dispatch_click(ClickEvent::new(code, context));

        Ok(Resolution {
            destination: record.destination(),
            record,
        })
    }

    /// Returns the record stored under `code`, active or not.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no record exists.
    pub async fn get(&self, code: &str) -> Result<LinkRecord, AppError> {
        self.link_repository
            .find_by_code(code)
            .await?
            .ok_or_else(|| not_found(code))
    }

    /// Deletes the link under `code`. Deleting a missing link succeeds.
    ///
    /// Clicks are kept unless `cascade_delete_clicks` is set. Returns whether
    /// a record was removed.
    pub async fn remove(&self, code: &str) -> Result<bool, AppError> {
        let deleted = self.link_repository.delete(code).await?;
        self.invalidate(code).await;

        if self.options.cascade_delete_clicks {
            let removed = self.clicks.delete_for(code).await?;
            debug!(code = %code, removed, "Cascaded click deletion");
        }

        if deleted {
            info!(code = %code, "Link deleted");
        }
        Ok(deleted)
    }

    /// Moves a link from `old_code` to `new_code`.
    ///
    /// Every other field is preserved. Clicks recorded under `old_code` stay
    /// there.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if `new_code` is not a valid alias,
    /// [`AppError::NotFound`] if `old_code` is absent and
    /// [`AppError::Conflict`] if `new_code` is taken.
    pub async fn rename(&self, old_code: &str, new_code: &str) -> Result<LinkRecord, AppError> {
        validate_alias(new_code)?;

        let record = self
            .link_repository
            .find_by_code(old_code)
            .await?
            .ok_or_else(|| not_found(old_code))?;

        if self.link_repository.exists(new_code).await? {
            return Err(AppError::conflict(
                "Short code already exists",
                json!({ "code": new_code }),
            ));
        }

        let renamed = self.link_repository.rename(&record, new_code).await?;
        self.invalidate(old_code).await;
        self.invalidate(new_code).await;

        info!(old = %old_code, new = %new_code, "Link renamed");
        Ok(renamed)
    }

    /// Links whose code, alias or URL contains `query`, newest first.
    pub async fn search(&self, query: &str) -> Result<Vec<LinkRecord>, AppError> {
        self.link_repository.search(query).await
    }

    /// Links of one owner, newest first.
    pub async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<LinkRecord>, AppError> {
        self.link_repository.list_by_owner(owner_id).await
    }

    pub async fn search_with_counts(&self, query: &str) -> Result<Vec<LinkSummary>, AppError> {
        let records = self.search(query).await?;
        self.clicks.with_counts(records).await
    }

    pub async fn owner_links_with_counts(
        &self,
        owner_id: &str,
    ) -> Result<Vec<LinkSummary>, AppError> {
        let records = self.list_by_owner(owner_id).await?;
        self.clicks.with_counts(records).await
    }

    /// Total number of link records.
    pub async fn count(&self) -> Result<u64, AppError> {
        self.link_repository.count().await
    }

    async fn load(&self, code: &str) -> Result<Option<LinkRecord>, AppError> {
        match self.cache.get_link(code).await {
            Ok(Some(record)) => return Ok(Some(record)),
            Ok(None) => {}
            Err(e) => warn!(code = %code, error = %e, "Cache lookup failed"),
        }

        let record = self.link_repository.find_by_code(code).await?;

        let Some(cacheable) = record.as_ref().filter(|r| r.active && !r.one_time_use) else {
            return Ok(record);
        };
        match self.cache.set_link(cacheable, None).await {
            Ok(true) => {}
            Ok(false) => return Ok(record),
            Err(e) => {
                warn!(code = %code, error = %e, "Failed to cache link");
                return Ok(record);
            }
        }

        // A write that landed between the read and the fill has already run
        // its invalidation; re-read so the stale copy does not outlive it.
        let current = self.link_repository.find_by_code(code).await?;
        if current.as_ref() != Some(cacheable) {
            debug!(code = %code, "Link changed while caching, dropping cached copy");
            self.invalidate(code).await;
        }
        Ok(current)
    }

    async fn invalidate(&self, code: &str) {
        if let Err(e) = self.cache.invalidate(code).await {
            warn!(code = %code, error = %e, "Failed to invalidate cached link");
        }
    }

    fn dispatch_click(&self, event: ClickEvent) {
        match self.click_sender.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(event)) => {
                metrics::counter!("snaplink_clicks_dropped_total").increment(1);
                warn!(code = %event.code, "Click queue full, dropping click");
            }
            Err(TrySendError::Closed(event)) => {
                metrics::counter!("snaplink_clicks_dropped_total").increment(1);
                warn!(code = %event.code, "Click worker stopped, dropping click");
            }
        }
    }
}

fn not_found(code: &str) -> AppError {
    AppError::not_found("Short link not found", json!({ "code": code }))
}

/// Validates creation input shared by both creation paths.
///
/// The returned draft carries an empty code.
fn prepare(
    long_url: &str,
    owner_id: &str,
    one_time_use: bool,
    expiration: Option<&str>,
) -> Result<NewLink, AppError> {
    let owner_id = owner_id.trim();
    if owner_id.is_empty() {
        return Err(AppError::bad_request(
            "userId is required",
            json!({ "field": "userId" }),
        ));
    }

    let long_url = validate_long_url(long_url).map_err(|e| {
        AppError::bad_request("Invalid URL format", json!({ "reason": e.to_string() }))
    })?;

    Ok(NewLink {
        code: String::new(),
        long_url,
        owner_id: owner_id.to_string(),
        one_time_use,
        expiration_timestamp: parse_expiration(expiration)?,
    })
}
