//! Session-scoped cache over the work-tracking client.
//!
//! Each category is fetched from the remote service at most once per
//! session and served from the cache afterwards. Concurrent fetch attempts
//! for the same category join the outstanding request instead of racing.
//! User stories are the exception: they are re-derived on every call from
//! whichever iteration currently applies.

use std::future::Future;
use std::sync::{Arc, RwLock};
use std::time::Instant;

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::devops::client::WorkTrackingClient;
use crate::devops::types::{IterationInfo, TeamMemberInfo, UserStoryInfo};
use crate::editor::{DocumentSource, StatusSink};
use crate::error::{Error, RemoteError, Result};

use super::cell::CachedCell;
use super::hint::extract_iteration_hint;

/// Lazily-populated, request-deduplicating cache in front of the remote
/// work-tracking service.
///
/// The store exclusively owns every cached field. It lives for one editor
/// session; [`SessionStore::reset`] returns it to the unfetched state when
/// the host's configuration changes.
pub struct SessionStore {
  client: Arc<dyn WorkTrackingClient>,
  config: Arc<RwLock<Config>>,
  documents: Arc<dyn DocumentSource>,
  status: Arc<dyn StatusSink>,

  activity_types: CachedCell<Vec<String>>,
  iterations: CachedCell<Vec<IterationInfo>>,
  areas: CachedCell<Vec<String>>,
  tags: CachedCell<Vec<String>>,
  team_members: CachedCell<Vec<TeamMemberInfo>>,

  /// Remote-resolved "active" iteration; cleared whenever a custom
  /// iteration takes precedence.
  current_iteration: CachedCell<IterationInfo>,
  /// Iteration referenced by the active document; re-resolved on every
  /// `determine_iteration` call.
  custom_iteration: Mutex<Option<IterationInfo>>,
  /// Overwritten on every successful `ensure_has_user_stories` call.
  user_stories: Mutex<Option<Vec<UserStoryInfo>>>,
}

impl SessionStore {
  pub fn new(
    client: Arc<dyn WorkTrackingClient>,
    config: Arc<RwLock<Config>>,
    documents: Arc<dyn DocumentSource>,
    status: Arc<dyn StatusSink>,
  ) -> Self {
    Self {
      client,
      config,
      documents,
      status,
      activity_types: CachedCell::new(),
      iterations: CachedCell::new(),
      areas: CachedCell::new(),
      tags: CachedCell::new(),
      team_members: CachedCell::new(),
      current_iteration: CachedCell::new(),
      custom_iteration: Mutex::new(None),
      user_stories: Mutex::new(None),
    }
  }

  // ==========================================================================
  // Ensure operations
  // ==========================================================================

  pub async fn ensure_has_activity_types(&self) -> Result<()> {
    self
      .ensure_category("activity types", &self.activity_types, || {
        self.client.get_activity_types()
      })
      .await
  }

  pub async fn ensure_has_iterations(&self) -> Result<()> {
    self
      .ensure_category("iterations", &self.iterations, || {
        self.client.get_iterations_info()
      })
      .await
  }

  pub async fn ensure_has_areas(&self) -> Result<()> {
    self
      .ensure_category("areas", &self.areas, || self.client.get_project_areas())
      .await
  }

  pub async fn ensure_has_tags(&self) -> Result<()> {
    self
      .ensure_category("tags", &self.tags, || self.client.get_tags())
      .await
  }

  pub async fn ensure_has_team_members(&self) -> Result<()> {
    self
      .ensure_category("team members", &self.team_members, || {
        self.client.get_team_members()
      })
      .await
  }

  /// Refresh the user stories for whichever iteration currently applies.
  ///
  /// Unlike the other categories this never serves a cached value: every
  /// call re-resolves the iteration, fetches the work-item ids assigned to
  /// it, then expands them into story details (two dependent remote
  /// calls). An iteration without work items fails with
  /// [`Error::NoUserStories`] and leaves any previous value in place.
  pub async fn ensure_has_user_stories(&self) -> Result<()> {
    if !self.config_valid() {
      return Err(Error::MissingConfiguration);
    }

    let started = Instant::now();
    let iteration = self.determine_iteration().await?;

    let ids = self.client.get_iteration_work_items(&iteration.id).await?;
    if ids.is_empty() {
      warn!(iteration = %iteration.path, "no user stories found");
      return Err(Error::NoUserStories {
        path: iteration.path,
      });
    }

    let stories = self.client.get_user_story_info(&ids).await?;
    let count = stories.len();
    *self.user_stories.lock().await = Some(stories);
    self.report("user stories", count, started);
    Ok(())
  }

  /// Shared contract of the fetch-once categories: configuration must be
  /// valid, an already-populated category is a no-op, and a concurrent
  /// fetch for the same category is joined rather than duplicated.
  async fn ensure_category<T, F, Fut>(
    &self,
    category: &'static str,
    cell: &CachedCell<Vec<T>>,
    fetch: F,
  ) -> Result<()>
  where
    T: Clone,
    F: FnOnce() -> Fut,
    Fut: Future<Output = std::result::Result<Vec<T>, RemoteError>>,
  {
    if !self.config_valid() {
      return Err(Error::MissingConfiguration);
    }
    if cell.is_populated().await {
      return Ok(());
    }

    // Reporting happens inside the fetch closure: a caller that joins an
    // in-flight fetch observes the stored value without logging a second
    // population line
    cell
      .get_or_fetch(|| async move {
        let started = Instant::now();
        let items = fetch().await.map_err(Error::from)?;
        self.report(category, items.len(), started);
        Ok::<_, Error>(items)
      })
      .await?;
    Ok(())
  }

  fn report(&self, category: &'static str, count: usize, started: Instant) {
    let elapsed_ms = started.elapsed().as_millis() as u64;
    info!(category, count, elapsed_ms, "session cache populated");
    self.status.show(&format!("Loaded {count} {category}"));
  }

  fn config_valid(&self) -> bool {
    self.config.read().map(|c| c.is_valid()).unwrap_or(false)
  }

  // ==========================================================================
  // Iteration resolution
  // ==========================================================================

  /// Resolve which iteration applies right now.
  ///
  /// An iteration referenced by the active document wins; otherwise the
  /// remote-resolved current iteration is fetched once and cached. The
  /// document is re-read on every call, so switching documents switches
  /// iterations.
  pub async fn determine_iteration(&self) -> Result<IterationInfo> {
    self.refresh_custom_iteration().await;

    if let Some(custom) = self.custom_iteration.lock().await.clone() {
      // Custom takes precedence; drop the cached remote resolution so a
      // later call without a hint re-resolves it.
      self.current_iteration.clear().await;
      debug!(iteration = %custom.path, "using iteration referenced by the active document");
      return Ok(custom);
    }

    if !self.config_valid() {
      return Err(Error::MissingConfiguration);
    }

    let current = self
      .current_iteration
      .get_or_fetch(|| async {
        self
          .client
          .get_current_iteration_info()
          .await
          .map_err(Error::from)
      })
      .await?;
    debug!(iteration = %current.path, "using default iteration");
    Ok(current)
  }

  /// Re-resolve the custom iteration from the top of the active document.
  ///
  /// A hint only sticks when its id matches an already-fetched iteration;
  /// no document, no hint, or an unknown id clears the previous value so a
  /// stale reference cannot leak into the decision above.
  async fn refresh_custom_iteration(&self) {
    let hint = self.documents.active_document_text().and_then(|text| {
      let lines: Vec<&str> = text.lines().collect();
      extract_iteration_hint(&lines, 0)
    });

    let resolved = match hint {
      Some(hint) => {
        let known = self.iterations.get().await.unwrap_or_default();
        let found = known.into_iter().find(|it| it.id == hint.id);
        if found.is_none() {
          debug!(id = %hint.id, "active document references an unknown iteration");
        }
        found
      }
      None => {
        debug!("no iteration referenced by the active document; the default applies");
        None
      }
    };

    *self.custom_iteration.lock().await = resolved;
  }

  // ==========================================================================
  // Lifecycle and read accessors
  // ==========================================================================

  /// Return every category to the unfetched state. The host calls this
  /// when its configuration changes.
  pub async fn reset(&self) {
    self.activity_types.clear().await;
    self.iterations.clear().await;
    self.areas.clear().await;
    self.tags.clear().await;
    self.team_members.clear().await;
    self.current_iteration.clear().await;
    *self.custom_iteration.lock().await = None;
    *self.user_stories.lock().await = None;
    debug!("session cache cleared");
  }

  pub async fn activity_types(&self) -> Option<Vec<String>> {
    self.activity_types.get().await
  }

  pub async fn iterations(&self) -> Option<Vec<IterationInfo>> {
    self.iterations.get().await
  }

  pub async fn areas(&self) -> Option<Vec<String>> {
    self.areas.get().await
  }

  pub async fn tags(&self) -> Option<Vec<String>> {
    self.tags.get().await
  }

  pub async fn team_members(&self) -> Option<Vec<TeamMemberInfo>> {
    self.team_members.get().await
  }

  pub async fn user_stories(&self) -> Option<Vec<UserStoryInfo>> {
    self.user_stories.lock().await.clone()
  }

  pub async fn current_iteration(&self) -> Option<IterationInfo> {
    self.current_iteration.get().await
  }

  pub async fn custom_iteration(&self) -> Option<IterationInfo> {
    self.custom_iteration.lock().await.clone()
  }
}
