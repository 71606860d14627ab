//! REST API backend.
//!
//! Blocking client for the Actions secrets endpoints. Requests are issued
//! one at a time with a fixed timeout and are never retried.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use reqwest::blocking::{Client, Response};
use reqwest::header::ACCEPT;
use reqwest::{Method, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, trace};

use super::{PutSecret, Remote, RemotePublicKey};
use crate::core::constants::{
    PAGE_SIZE, REQUEST_TIMEOUT_SECS, WORKFLOWS_DIR, WORKFLOW_SUFFIXES,
};
use crate::core::target::SyncTarget;
use crate::core::types::{RepositoryId, RepositoryIds, SecretName, WorkflowFile};
use crate::error::{ApiError, Error, Result};

const MEDIA_TYPE: &str = "application/vnd.github+json";
const API_VERSION_HEADER: &str = "X-GitHub-Api-Version";
const API_VERSION: &str = "2022-11-28";
const USER_AGENT: &str = concat!("secretsync/", env!("CARGO_PKG_VERSION"));

/// Live API client.
pub struct GitHub {
    client: Client,
    base: Url,
    token: String,
}

impl std::fmt::Debug for GitHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHub")
            .field("base", &self.base.as_str())
            .finish_non_exhaustive()
    }
}

#[derive(Deserialize)]
struct SecretList {
    total_count: usize,
    secrets: Vec<SecretEntry>,
}

#[derive(Deserialize)]
struct SecretEntry {
    name: SecretName,
}

#[derive(Deserialize)]
struct RepoEntry {
    id: RepositoryId,
    name: String,
}

#[derive(Deserialize)]
struct ContentEntry {
    name: String,
    path: String,
    #[serde(rename = "type")]
    kind: String,
}

#[derive(Deserialize)]
struct FileContent {
    content: String,
    encoding: String,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

impl GitHub {
    /// Create a client for the API at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidUrl` if `base_url` cannot be used as a base,
    /// or `ApiError::Transport` if the HTTP client cannot be built.
    pub fn new(base_url: &str, token: impl Into<String>) -> Result<Self> {
        let base = Url::parse(base_url)
            .ok()
            .filter(|url| !url.cannot_be_a_base())
            .ok_or_else(|| ApiError::InvalidUrl(base_url.to_string()))?;

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|source| ApiError::Transport {
                url: base_url.to_string(),
                source,
            })?;

        Ok(Self {
            client,
            base,
            token: token.into(),
        })
    }

    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty();
            path.extend(segments);
        }
        url
    }

    fn paged(&self, mut url: Url, page: usize) -> Url {
        url.query_pairs_mut()
            .append_pair("per_page", &PAGE_SIZE.to_string())
            .append_pair("page", &page.to_string());
        url
    }

    fn execute(
        &self,
        method: Method,
        url: &Url,
        body: Option<serde_json::Value>,
    ) -> Result<Response> {
        debug!(method = %method, url = %url, "request");

        let mut request = self
            .client
            .request(method, url.clone())
            .bearer_auth(&self.token)
            .header(ACCEPT, MEDIA_TYPE)
            .header(API_VERSION_HEADER, API_VERSION);
        if let Some(body) = body {
            request = request.json(&body);
        }

        request.send().map_err(|source| {
            ApiError::Transport {
                url: url.to_string(),
                source,
            }
            .into()
        })
    }

    fn send(&self, method: Method, url: &Url, body: Option<serde_json::Value>) -> Result<Response> {
        let response = self.execute(method.clone(), url, body)?;
        trace!(status = response.status().as_u16(), "response");

        if response.status().is_success() {
            Ok(response)
        } else {
            Err(status_error(&method, url, response))
        }
    }

    fn get_json<T: DeserializeOwned>(&self, url: &Url) -> Result<T> {
        let response = self.send(Method::GET, url, None)?;
        decode(url, response)
    }

    fn workflow_file(&self, owner: &str, repo: &str, path: &str) -> Result<Vec<u8>> {
        let mut segments = vec!["repos", owner, repo, "contents"];
        segments.extend(path.split('/'));
        let url = self.url(&segments);

        let file: FileContent = self.get_json(&url)?;
        if file.encoding != "base64" {
            return Err(ApiError::Decode {
                url: url.to_string(),
                reason: format!("unsupported content encoding '{}'", file.encoding),
            }
            .into());
        }

        let compact: String = file.content.split_whitespace().collect();
        BASE64.decode(compact).map_err(|e| {
            ApiError::Decode {
                url: url.to_string(),
                reason: e.to_string(),
            }
            .into()
        })
    }
}

/// Path segments of the secrets collection of `target`.
fn secrets_path(target: &SyncTarget) -> Vec<&str> {
    match target {
        SyncTarget::Repository { owner, name } => {
            vec!["repos", owner.as_str(), name.as_str(), "actions", "secrets"]
        }
        SyncTarget::Environment {
            owner,
            name,
            environment,
        } => vec![
            "repos",
            owner.as_str(),
            name.as_str(),
            "environments",
            environment.as_str(),
            "secrets",
        ],
        SyncTarget::Organization { name } => vec!["orgs", name.as_str(), "actions", "secrets"],
    }
}

fn decode<T: DeserializeOwned>(url: &Url, response: Response) -> Result<T> {
    response.json().map_err(|e| {
        ApiError::Decode {
            url: url.to_string(),
            reason: e.to_string(),
        }
        .into()
    })
}

fn status_error(method: &Method, url: &Url, response: Response) -> Error {
    let status = response.status().as_u16();
    let message = response
        .json::<ErrorBody>()
        .map(|body| body.message)
        .unwrap_or_else(|_| "no error message".to_string());

    ApiError::Status {
        method: method.to_string(),
        url: url.to_string(),
        status,
        message,
    }
    .into()
}

fn is_workflow(name: &str) -> bool {
    WORKFLOW_SUFFIXES.iter().any(|suffix| name.ends_with(suffix))
}

impl Remote for GitHub {
    fn secret_names(&self, target: &SyncTarget) -> Result<Vec<SecretName>> {
        let base = self.url(&secrets_path(target));
        let mut names = Vec::new();

        for page in 1.. {
            let list: SecretList = self.get_json(&self.paged(base.clone(), page))?;
            let count = list.secrets.len();
            names.extend(list.secrets.into_iter().map(|s| s.name));

            if count < PAGE_SIZE || names.len() >= list.total_count {
                break;
            }
        }

        debug!(target = %target, secrets = names.len(), "listed secrets");
        Ok(names)
    }

    fn public_key(&self, target: &SyncTarget) -> Result<RemotePublicKey> {
        let mut segments = secrets_path(target);
        segments.push("public-key");
        self.get_json(&self.url(&segments))
    }

    fn put_secret(&self, target: &SyncTarget, secret: PutSecret<'_>) -> Result<()> {
        let mut segments = secrets_path(target);
        segments.push(secret.name);
        let url = self.url(&segments);

        let mut body = json!({
            "encrypted_value": secret.encrypted_value,
            "key_id": secret.key_id,
        });
        if let Some(scope) = secret.scope {
            body["visibility"] = json!(scope.visibility.as_api_str());
            if let Some(ids) = &scope.repository_ids {
                body["selected_repository_ids"] = json!(ids);
            }
        }

        self.send(Method::PUT, &url, Some(body))?;
        Ok(())
    }

    fn delete_secret(&self, target: &SyncTarget, name: &str) -> Result<()> {
        let mut segments = secrets_path(target);
        segments.push(name);
        self.send(Method::DELETE, &self.url(&segments), None)?;
        Ok(())
    }

    fn repository_ids(&self, org: &str) -> Result<RepositoryIds> {
        let base = self.url(&["orgs", org, "repos"]);
        let mut ids = RepositoryIds::new();

        for page in 1.. {
            let repos: Vec<RepoEntry> = self.get_json(&self.paged(base.clone(), page))?;
            let count = repos.len();
            ids.extend(repos.into_iter().map(|r| (r.name, r.id)));

            if count < PAGE_SIZE {
                break;
            }
        }

        debug!(org, repositories = ids.len(), "listed repositories");
        Ok(ids)
    }

    fn workflow_files(&self, owner: &str, repo: &str) -> Result<BTreeMap<WorkflowFile, Vec<u8>>> {
        let mut segments = vec!["repos", owner, repo, "contents"];
        segments.extend(WORKFLOWS_DIR.split('/'));
        let url = self.url(&segments);

        let response = self.execute(Method::GET, &url, None)?;
        if response.status() == StatusCode::NOT_FOUND {
            debug!(owner, repo, "no workflows directory");
            return Ok(BTreeMap::new());
        }
        if !response.status().is_success() {
            return Err(status_error(&Method::GET, &url, response));
        }

        let entries: Vec<ContentEntry> = decode(&url, response)?;
        let mut files = BTreeMap::new();
        for entry in entries
            .into_iter()
            .filter(|e| e.kind == "file" && is_workflow(&e.name))
        {
            let content = self.workflow_file(owner, repo, &entry.path)?;
            files.insert(entry.name, content);
        }

        debug!(owner, repo, files = files.len(), "fetched workflows");
        Ok(files)
    }
}
