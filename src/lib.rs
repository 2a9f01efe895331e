//! Session-scoped cache over a remote work-tracking service.
//!
//! The crate centers on [`SessionStore`]: a lazily-populated cache that
//! fetches each work-tracking category (iterations, user stories, tags,
//! team members, areas, activity types) at most once per editor session,
//! deduplicates concurrent fetch attempts, and resolves which iteration
//! applies based on an optional hint in the active document.
//!
//! The remote service is reached through the [`WorkTrackingClient`] trait;
//! [`RestClient`] implements it against the Azure DevOps REST API. Editor
//! facilities (active document, transient status messages) come in through
//! the traits in [`editor`].

pub mod config;
pub mod devops;
pub mod editor;
pub mod error;
pub mod session;

pub use config::Config;
pub use devops::client::{RestClient, WorkTrackingClient};
pub use devops::types::{IterationInfo, TeamMemberInfo, UserStoryInfo};
pub use editor::{DocumentSource, StatusSink};
pub use error::{Error, RemoteError, Result};
pub use session::store::SessionStore;
