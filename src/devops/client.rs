//! The work-tracking client trait and its REST implementation.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use url::Url;

use crate::config::Config;
use crate::error::{Error, RemoteError};

use super::api_types::{
  ApiClassificationNode, ApiFieldDefinition, ApiIteration, ApiIterationWorkItems,
  ApiListResponse, ApiTag, ApiTeamMember, ApiWorkItem,
};
use super::types::{IterationInfo, TeamMemberInfo, UserStoryInfo};

const API_VERSION: &str = "7.0";

/// Fields requested when expanding work-item ids into story details.
const STORY_FIELDS: &str = "System.Title,System.State,System.AssignedTo,Microsoft.VSTS.Scheduling.StoryPoints";

/// Asynchronous access to the remote work-tracking service.
///
/// Every operation either returns the described data or fails with a
/// transport/service error; the session store decides what to cache.
#[async_trait]
pub trait WorkTrackingClient: Send + Sync {
  /// Allowed values of the activity field (e.g. "Development", "Testing").
  async fn get_activity_types(&self) -> Result<Vec<String>, RemoteError>;

  /// All iterations configured for the team, in schedule order.
  async fn get_iterations_info(&self) -> Result<Vec<IterationInfo>, RemoteError>;

  /// Area paths of the project, flattened from the classification tree.
  async fn get_project_areas(&self) -> Result<Vec<String>, RemoteError>;

  /// The iteration the service considers active right now.
  async fn get_current_iteration_info(&self) -> Result<IterationInfo, RemoteError>;

  /// Ids of the work items assigned to an iteration.
  async fn get_iteration_work_items(&self, iteration_id: &str) -> Result<Vec<u64>, RemoteError>;

  /// Full story details for a set of work-item ids.
  async fn get_user_story_info(&self, ids: &[u64]) -> Result<Vec<UserStoryInfo>, RemoteError>;

  /// All work-item tags defined in the project.
  async fn get_tags(&self) -> Result<Vec<String>, RemoteError>;

  /// Members of the configured team.
  async fn get_team_members(&self) -> Result<Vec<TeamMemberInfo>, RemoteError>;
}

/// Azure DevOps REST client, authenticating with a personal access token.
#[derive(Clone)]
pub struct RestClient {
  http: reqwest::Client,
  base: Url,
  project: String,
  team: Option<String>,
  token: String,
}

impl std::fmt::Debug for RestClient {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    // The token must never reach logs
    f.debug_struct("RestClient")
      .field("base", &self.base.as_str())
      .field("project", &self.project)
      .field("team", &self.team)
      .field("token", &"<redacted>")
      .finish()
  }
}

impl RestClient {
  /// Build a client from configuration.
  ///
  /// Fails with [`Error::MissingConfiguration`] when the endpoint URL,
  /// project or token is absent.
  pub fn new(config: &Config) -> Result<Self, Error> {
    let (url, project, token) = match (&config.url, &config.project, &config.token) {
      (Some(url), Some(project), Some(token)) => (url, project.clone(), token.clone()),
      _ => return Err(Error::MissingConfiguration),
    };

    let base = Url::parse(url).map_err(RemoteError::from)?;

    Ok(Self {
      http: reqwest::Client::new(),
      base,
      project,
      team: config.team.clone(),
      token,
    })
  }

  /// Build a URL under the organization root: `{base}/{segments...}`.
  fn api_url(&self, segments: &[&str], query: &[(&str, &str)]) -> Result<Url, RemoteError> {
    let mut url = self.base.clone();
    url
      .path_segments_mut()
      .map_err(|_| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
      .pop_if_empty()
      .extend(segments);
    {
      let mut pairs = url.query_pairs_mut();
      pairs.append_pair("api-version", API_VERSION);
      for (name, value) in query {
        pairs.append_pair(name, value);
      }
    }
    Ok(url)
  }

  /// Team-scoped URL: `{base}/{project}[/{team}]/_apis/{segments...}`.
  fn team_url(&self, segments: &[&str], query: &[(&str, &str)]) -> Result<Url, RemoteError> {
    let mut all = vec![self.project.as_str()];
    if let Some(team) = &self.team {
      all.push(team.as_str());
    }
    all.push("_apis");
    all.extend_from_slice(segments);
    self.api_url(&all, query)
  }

  /// Project-scoped URL: `{base}/{project}/_apis/{segments...}`.
  fn project_url(&self, segments: &[&str], query: &[(&str, &str)]) -> Result<Url, RemoteError> {
    let mut all = vec![self.project.as_str(), "_apis"];
    all.extend_from_slice(segments);
    self.api_url(&all, query)
  }

  async fn get_json<T: DeserializeOwned>(
    &self,
    url: Url,
    operation: &'static str,
  ) -> Result<T, RemoteError> {
    let response = self
      .http
      .get(url)
      // PAT auth: empty user, token as password
      .basic_auth("", Some(&self.token))
      .send()
      .await?;

    let status = response.status();
    if status != StatusCode::OK {
      return Err(RemoteError::Api {
        operation,
        status: status.as_u16(),
      });
    }

    let body = response.bytes().await?;
    serde_json::from_slice(&body).map_err(|source| RemoteError::Decode { operation, source })
  }
}

#[async_trait]
impl WorkTrackingClient for RestClient {
  async fn get_activity_types(&self) -> Result<Vec<String>, RemoteError> {
    let url = self.project_url(
      &[
        "wit",
        "workitemtypes",
        "Task",
        "fields",
        "Microsoft.VSTS.Common.Activity",
      ],
      &[("$expand", "allowedValues")],
    )?;
    let field: ApiFieldDefinition = self.get_json(url, "get activity types").await?;
    Ok(field.allowed_values)
  }

  async fn get_iterations_info(&self) -> Result<Vec<IterationInfo>, RemoteError> {
    let url = self.team_url(&["work", "teamsettings", "iterations"], &[])?;
    let response: ApiListResponse<ApiIteration> = self.get_json(url, "get iterations").await?;
    Ok(response.value.into_iter().map(IterationInfo::from).collect())
  }

  async fn get_project_areas(&self) -> Result<Vec<String>, RemoteError> {
    let url = self.project_url(
      &["wit", "classificationnodes", "areas"],
      &[("$depth", "10")],
    )?;
    let root: ApiClassificationNode = self.get_json(url, "get areas").await?;
    Ok(root.flatten_paths())
  }

  async fn get_current_iteration_info(&self) -> Result<IterationInfo, RemoteError> {
    let url = self.team_url(
      &["work", "teamsettings", "iterations"],
      &[("$timeframe", "current")],
    )?;
    let response: ApiListResponse<ApiIteration> =
      self.get_json(url, "get current iteration").await?;
    response
      .value
      .into_iter()
      .next()
      .map(IterationInfo::from)
      .ok_or(RemoteError::Api {
        operation: "get current iteration",
        status: 404,
      })
  }

  async fn get_iteration_work_items(&self, iteration_id: &str) -> Result<Vec<u64>, RemoteError> {
    let url = self.team_url(
      &["work", "teamsettings", "iterations", iteration_id, "workitems"],
      &[],
    )?;
    let response: ApiIterationWorkItems = self.get_json(url, "get iteration work items").await?;
    Ok(response.target_ids())
  }

  async fn get_user_story_info(&self, ids: &[u64]) -> Result<Vec<UserStoryInfo>, RemoteError> {
    let id_list = ids
      .iter()
      .map(|id| id.to_string())
      .collect::<Vec<_>>()
      .join(",");
    let url = self.project_url(
      &["wit", "workitems"],
      &[("ids", id_list.as_str()), ("fields", STORY_FIELDS)],
    )?;
    let response: ApiListResponse<ApiWorkItem> = self.get_json(url, "get user stories").await?;
    Ok(response.value.into_iter().map(UserStoryInfo::from).collect())
  }

  async fn get_tags(&self) -> Result<Vec<String>, RemoteError> {
    let url = self.project_url(&["wit", "tags"], &[])?;
    let response: ApiListResponse<ApiTag> = self.get_json(url, "get tags").await?;
    Ok(response.value.into_iter().map(|tag| tag.name).collect())
  }

  async fn get_team_members(&self) -> Result<Vec<TeamMemberInfo>, RemoteError> {
    // The members endpoint lives under the project collection, not the team
    let team = self.team.as_deref().unwrap_or(self.project.as_str());
    let url = self.api_url(
      &["_apis", "projects", &self.project, "teams", team, "members"],
      &[],
    )?;
    let response: ApiListResponse<ApiTeamMember> = self.get_json(url, "get team members").await?;
    Ok(response.value.into_iter().map(TeamMemberInfo::from).collect())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn client() -> RestClient {
    RestClient::new(&Config {
      url: Some("https://dev.azure.com/fabrikam".into()),
      project: Some("Fabrikam".into()),
      team: Some("Fabrikam Team".into()),
      token: Some("pat".into()),
    })
    .unwrap()
  }

  #[test]
  fn test_new_requires_configuration() {
    let err = RestClient::new(&Config::default()).unwrap_err();
    assert!(matches!(err, Error::MissingConfiguration));
  }

  #[test]
  fn test_debug_output_redacts_token() {
    let formatted = format!("{:?}", client());
    assert!(!formatted.contains("pat"));
    assert!(formatted.contains("<redacted>"));
  }

  #[test]
  fn test_team_url_shape() {
    let url = client()
      .team_url(&["work", "teamsettings", "iterations"], &[("$timeframe", "current")])
      .unwrap();
    assert_eq!(
      url.as_str(),
      "https://dev.azure.com/fabrikam/Fabrikam/Fabrikam%20Team/_apis/work/teamsettings/iterations?api-version=7.0&%24timeframe=current"
    );
  }

  #[test]
  fn test_project_url_shape() {
    let url = client().project_url(&["wit", "tags"], &[]).unwrap();
    assert_eq!(
      url.as_str(),
      "https://dev.azure.com/fabrikam/Fabrikam/_apis/wit/tags?api-version=7.0"
    );
  }
}
