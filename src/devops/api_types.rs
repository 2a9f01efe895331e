//! Serde-deserializable types matching Azure DevOps REST responses.
//!
//! These types are separate from domain types to allow clean deserialization
//! while keeping domain types focused on what the session store serves.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::types::{IterationInfo, TeamMemberInfo, UserStoryInfo};

/// Standard `{ "count": n, "value": [...] }` list envelope.
#[derive(Debug, Deserialize)]
pub struct ApiListResponse<T> {
  // A bare `default` would demand `T: Default`; the path form only
  // requires `Vec::new`
  #[serde(default = "Vec::new")]
  pub value: Vec<T>,
}

// ============================================================================
// Iterations
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ApiIteration {
  pub id: String,
  pub path: String,
  pub attributes: Option<ApiIterationAttributes>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiIterationAttributes {
  pub start_date: Option<DateTime<Utc>>,
  pub finish_date: Option<DateTime<Utc>>,
}

impl From<ApiIteration> for IterationInfo {
  fn from(api: ApiIteration) -> Self {
    let (start_date, finish_date) = match api.attributes {
      Some(attrs) => (attrs.start_date, attrs.finish_date),
      None => (None, None),
    };
    IterationInfo {
      id: api.id,
      path: api.path,
      start_date,
      finish_date,
    }
  }
}

// ============================================================================
// Iteration work items
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiIterationWorkItems {
  #[serde(default)]
  pub work_item_relations: Vec<ApiWorkItemRelation>,
}

#[derive(Debug, Deserialize)]
pub struct ApiWorkItemRelation {
  pub target: Option<ApiWorkItemRef>,
}

#[derive(Debug, Deserialize)]
pub struct ApiWorkItemRef {
  pub id: u64,
}

impl ApiIterationWorkItems {
  /// Ids of the work items assigned to the iteration, in board order.
  pub fn target_ids(self) -> Vec<u64> {
    self
      .work_item_relations
      .into_iter()
      .filter_map(|rel| rel.target.map(|t| t.id))
      .collect()
  }
}

// ============================================================================
// Work item details
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ApiWorkItem {
  pub id: u64,
  #[serde(default)]
  pub fields: ApiWorkItemFields,
}

#[derive(Debug, Deserialize, Default)]
pub struct ApiWorkItemFields {
  #[serde(rename = "System.Title", default)]
  pub title: String,
  #[serde(rename = "System.State", default)]
  pub state: String,
  #[serde(rename = "System.AssignedTo")]
  pub assigned_to: Option<ApiIdentity>,
  #[serde(rename = "Microsoft.VSTS.Scheduling.StoryPoints")]
  pub story_points: Option<f64>,
}

impl From<ApiWorkItem> for UserStoryInfo {
  fn from(api: ApiWorkItem) -> Self {
    UserStoryInfo {
      id: api.id,
      title: api.fields.title,
      state: api.fields.state,
      assigned_to: api.fields.assigned_to.map(|a| a.display_name),
      story_points: api.fields.story_points,
    }
  }
}

// ============================================================================
// Identities and team members
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiIdentity {
  #[serde(default)]
  pub id: String,
  pub display_name: String,
  #[serde(default)]
  pub unique_name: String,
}

#[derive(Debug, Deserialize)]
pub struct ApiTeamMember {
  pub identity: ApiIdentity,
}

impl From<ApiTeamMember> for TeamMemberInfo {
  fn from(api: ApiTeamMember) -> Self {
    TeamMemberInfo {
      id: api.identity.id,
      display_name: api.identity.display_name,
      unique_name: api.identity.unique_name,
    }
  }
}

// ============================================================================
// Tags, areas and activity types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ApiTag {
  pub name: String,
}

/// Node of the area classification tree; flattened into path strings.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiClassificationNode {
  pub name: String,
  pub path: Option<String>,
  #[serde(default)]
  pub children: Vec<ApiClassificationNode>,
}

impl ApiClassificationNode {
  /// Depth-first flatten into hierarchical path strings. The REST `path`
  /// field is preferred; the node name is the fallback for roots that
  /// omit it.
  pub fn flatten_paths(self) -> Vec<String> {
    let mut paths = Vec::new();
    self.collect_paths(&mut paths);
    paths
  }

  fn collect_paths(self, paths: &mut Vec<String>) {
    paths.push(self.path.unwrap_or(self.name));
    for child in self.children {
      child.collect_paths(paths);
    }
  }
}

/// Work-item field definition; only the allowed values are interesting.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiFieldDefinition {
  #[serde(default)]
  pub allowed_values: Vec<String>,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_parse_iteration_with_attributes() {
    let json = r#"{
      "id": "a589a806-bf11-4d4f-a031-c19813331553",
      "name": "Sprint 2",
      "path": "Fabrikam\\Sprint 2",
      "attributes": {
        "startDate": "2026-08-01T00:00:00Z",
        "finishDate": "2026-08-14T00:00:00Z",
        "timeFrame": "current"
      }
    }"#;
    let api: ApiIteration = serde_json::from_str(json).unwrap();
    let info: super::IterationInfo = api.into();
    assert_eq!(info.path, "Fabrikam\\Sprint 2");
    assert!(info.start_date.is_some());
    assert!(info.finish_date.is_some());
  }

  #[test]
  fn test_parse_iteration_work_items() {
    let json = r#"{
      "workItemRelations": [
        { "rel": null, "source": null, "target": { "id": 297 } },
        { "rel": "System.LinkTypes.Hierarchy-Forward", "source": { "id": 297 }, "target": { "id": 299 } },
        { "rel": null, "source": null, "target": null }
      ]
    }"#;
    let api: ApiIterationWorkItems = serde_json::from_str(json).unwrap();
    assert_eq!(api.target_ids(), vec![297, 299]);
  }

  #[test]
  fn test_parse_work_item_fields() {
    let json = r#"{
      "id": 297,
      "fields": {
        "System.Title": "Customer can sign in using their Microsoft Account",
        "System.State": "Active",
        "System.AssignedTo": {
          "displayName": "Jamal Hartnett",
          "uniqueName": "fabrikamfiber4@hotmail.com",
          "id": "d291b0c4-a05c-4ea6-8df1-4b41d5f39eff"
        },
        "Microsoft.VSTS.Scheduling.StoryPoints": 8.0
      }
    }"#;
    let api: ApiWorkItem = serde_json::from_str(json).unwrap();
    let story: UserStoryInfo = api.into();
    assert_eq!(story.id, 297);
    assert_eq!(story.assigned_to.as_deref(), Some("Jamal Hartnett"));
    assert_eq!(story.story_points, Some(8.0));
  }

  #[test]
  fn test_parse_work_item_missing_optional_fields() {
    let json = r#"{ "id": 300, "fields": { "System.Title": "Spike" } }"#;
    let api: ApiWorkItem = serde_json::from_str(json).unwrap();
    let story: UserStoryInfo = api.into();
    assert_eq!(story.title, "Spike");
    assert!(story.assigned_to.is_none());
    assert!(story.story_points.is_none());
  }

  #[test]
  fn test_flatten_area_tree() {
    let json = r#"{
      "name": "Fabrikam",
      "path": "\\Fabrikam\\Area",
      "children": [
        { "name": "Web", "path": "\\Fabrikam\\Area\\Web" },
        {
          "name": "Service",
          "path": "\\Fabrikam\\Area\\Service",
          "children": [ { "name": "Auth", "path": "\\Fabrikam\\Area\\Service\\Auth" } ]
        }
      ]
    }"#;
    let node: ApiClassificationNode = serde_json::from_str(json).unwrap();
    assert_eq!(
      node.flatten_paths(),
      vec![
        "\\Fabrikam\\Area",
        "\\Fabrikam\\Area\\Web",
        "\\Fabrikam\\Area\\Service",
        "\\Fabrikam\\Area\\Service\\Auth",
      ]
    );
  }

  #[test]
  fn test_list_envelope_tolerates_missing_value() {
    // The envelope element types carry no Default impl; the envelope must
    // still deserialize without one
    let empty: ApiListResponse<ApiIteration> = serde_json::from_str(r#"{ "count": 0 }"#).unwrap();
    assert!(empty.value.is_empty());

    let tags: ApiListResponse<ApiTag> =
      serde_json::from_str(r#"{ "count": 1, "value": [ { "name": "backend" } ] }"#).unwrap();
    assert_eq!(tags.value.len(), 1);
  }

  #[test]
  fn test_parse_team_members() {
    let json = r#"{
      "value": [
        {
          "identity": {
            "displayName": "Normal Paulk",
            "uniqueName": "fabrikamfiber16@hotmail.com",
            "id": "ba8315b6-f69e-42ce-a4ef-201250812332"
          },
          "isTeamAdmin": true
        }
      ],
      "count": 1
    }"#;
    let api: ApiListResponse<ApiTeamMember> = serde_json::from_str(json).unwrap();
    let member: TeamMemberInfo = api.value.into_iter().next().unwrap().into();
    assert_eq!(member.display_name, "Normal Paulk");
    assert_eq!(member.unique_name, "fabrikamfiber16@hotmail.com");
  }
}
