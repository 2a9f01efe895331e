//! The session store and its supporting pieces.
//!
//! [`store::SessionStore`] caches each work-tracking category for the
//! lifetime of an editor session. [`cell::CachedCell`] is the per-category
//! fetch-once primitive; [`hint`] reads iteration references out of
//! document text.

pub mod cell;
pub mod hint;
pub mod store;
