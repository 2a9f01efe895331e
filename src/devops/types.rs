use chrono::{DateTime, Utc};

/// A time-boxed work period (sprint), identified by id and hierarchical path
#[derive(Debug, Clone, PartialEq)]
pub struct IterationInfo {
  pub id: String,
  pub path: String,
  pub start_date: Option<DateTime<Utc>>,
  pub finish_date: Option<DateTime<Utc>>,
}

/// A unit of planned work with its board-relevant fields
#[derive(Debug, Clone, PartialEq)]
pub struct UserStoryInfo {
  pub id: u64,
  pub title: String,
  pub state: String,
  pub assigned_to: Option<String>,
  pub story_points: Option<f64>,
}

/// A member of the configured team
#[derive(Debug, Clone, PartialEq)]
pub struct TeamMemberInfo {
  pub id: String,
  pub display_name: String,
  pub unique_name: String,
}
