//! Dropbox client implementation using `reqwest`.
//!
//! Talks to the Dropbox HTTP API v2 (`files/list_folder`,
//! `files/list_folder/continue`, `files/get_metadata`) with a bearer token.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::RemoteDirectoryClient;
use crate::archive::{Cursor, DirectoryEntry, EntryKind, Page, RemotePath};
use crate::error::TransportError;

const API_BASE: &str = "https://api.dropboxapi.com/2";

/// Configuration for a Dropbox connection.
#[derive(Clone)]
pub struct DropboxConfig {
    pub access_token: String,
    pub page_size: u32,
    pub timeout: Duration,
}

impl fmt::Debug for DropboxConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DropboxConfig")
            .field("access_token", &"<redacted>")
            .field("page_size", &self.page_size)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// An authenticated Dropbox API client.
pub struct DropboxClient {
    http: reqwest::Client,
    config: DropboxConfig,
    account: String,
}

#[derive(Serialize)]
struct ListFolderArg<'a> {
    path: &'a str,
    limit: u32,
    include_deleted: bool,
}

#[derive(Serialize)]
struct ListFolderContinueArg<'a> {
    cursor: &'a str,
}

#[derive(Serialize)]
struct GetMetadataArg<'a> {
    path: &'a str,
}

#[derive(Debug, Deserialize)]
struct ListFolderResult {
    entries: Vec<Metadata>,
    cursor: String,
    has_more: bool,
}

#[derive(Debug, Deserialize)]
#[serde(tag = ".tag", rename_all = "lowercase")]
enum Metadata {
    File {
        name: String,
        id: String,
        size: u64,
        #[serde(default)]
        server_modified: Option<DateTime<Utc>>,
    },
    Folder {
        name: String,
        id: String,
    },
    Deleted {},
}

#[derive(Debug, Deserialize)]
struct Account {
    name: AccountName,
}

#[derive(Debug, Deserialize)]
struct AccountName {
    display_name: String,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    error_summary: String,
}

impl Metadata {
    /// Converts to a [`DirectoryEntry`]. Deleted and malformed entries yield `None`.
    fn into_entry(self) -> Option<DirectoryEntry> {
        let result = match self {
            Metadata::File {
                name,
                id,
                size,
                server_modified,
            } => DirectoryEntry::new(&name, EntryKind::File, size, server_modified, id),
            Metadata::Folder { name, id } => DirectoryEntry::folder(&name, id),
            Metadata::Deleted { .. } => return None,
        };
        match result {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::warn!(error = %e, "skipping entry with invalid name");
                None
            }
        }
    }
}

/// Dropbox addresses the root as the empty string.
fn wire_path(path: &RemotePath) -> &str {
    if path.is_root() {
        ""
    } else {
        path.as_str()
    }
}

/// Maps a non-success HTTP response to a [`TransportError`].
fn map_status(status: StatusCode, body: &str, subject: &str) -> TransportError {
    let summary = serde_json::from_str::<ApiError>(body)
        .map(|e| e.error_summary)
        .unwrap_or_else(|_| body.trim().to_string());
    match status {
        StatusCode::UNAUTHORIZED => TransportError::Unauthorized(summary),
        StatusCode::TOO_MANY_REQUESTS => TransportError::RateLimited(summary),
        StatusCode::CONFLICT if summary.contains("not_found") => {
            TransportError::NotFound(subject.to_string())
        }
        _ => TransportError::Remote(format!("{status}: {summary}")),
    }
}

impl DropboxClient {
    /// Builds a client and verifies the token against the current account.
    pub async fn connect(config: DropboxConfig) -> Result<Self, TransportError> {
        if config.access_token.trim().is_empty() {
            return Err(TransportError::Unauthorized(
                "no access token configured".to_string(),
            ));
        }

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| TransportError::Connection(e.to_string()))?;

        let mut client = Self {
            http,
            config,
            account: String::new(),
        };
        let account: Account = client
            .rpc("users/get_current_account", &serde_json::Value::Null, "account")
            .await?;
        tracing::info!(account = %account.name.display_name, "connected to Dropbox");
        client.account = account.name.display_name;
        Ok(client)
    }

    /// Returns the connection configuration.
    pub fn config(&self) -> &DropboxConfig {
        &self.config
    }

    async fn rpc<B, R>(&self, endpoint: &str, body: &B, subject: &str) -> Result<R, TransportError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let response = self
            .http
            .post(format!("{API_BASE}/{endpoint}"))
            .bearer_auth(&self.config.access_token)
            .json(body)
            .send()
            .await
            .map_err(|e| TransportError::Connection(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            tracing::debug!(endpoint, %status, "Dropbox call failed");
            return Err(map_status(status, &text, subject));
        }

        response
            .json::<R>()
            .await
            .map_err(|e| TransportError::Protocol(e.to_string()))
    }
}

fn into_page(result: ListFolderResult) -> Page {
    let entries = result
        .entries
        .into_iter()
        .filter_map(Metadata::into_entry)
        .collect();
    if result.has_more {
        Page::more(entries, Cursor::new(result.cursor))
    } else {
        Page::last(entries)
    }
}

#[async_trait]
impl RemoteDirectoryClient for DropboxClient {
    async fn list(
        &self,
        path: &RemotePath,
        cursor: Option<&Cursor>,
    ) -> Result<Page, TransportError> {
        let subject = path.to_string();
        let result: ListFolderResult = match cursor {
            Some(cursor) => {
                let arg = ListFolderContinueArg {
                    cursor: cursor.as_str(),
                };
                self.rpc("files/list_folder/continue", &arg, &subject).await?
            }
            None => {
                let arg = ListFolderArg {
                    path: wire_path(path),
                    limit: self.config.page_size,
                    include_deleted: false,
                };
                self.rpc("files/list_folder", &arg, &subject).await?
            }
        };
        Ok(into_page(result))
    }

    async fn stat(&self, path: &RemotePath) -> Result<DirectoryEntry, TransportError> {
        if path.is_root() {
            return Err(TransportError::Protocol("the root has no metadata".to_string()));
        }
        let arg = GetMetadataArg {
            path: wire_path(path),
        };
        let metadata: Metadata = self
            .rpc("files/get_metadata", &arg, path.as_str())
            .await?;
        metadata
            .into_entry()
            .ok_or_else(|| TransportError::NotFound(path.to_string()))
    }

    fn label(&self) -> String {
        format!("Dropbox ({})", self.account)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_is_empty_on_the_wire() {
        assert_eq!(wire_path(&RemotePath::root()), "");
        assert_eq!(wire_path(&RemotePath::parse("/Archive/2024")), "/Archive/2024");
    }

    #[test]
    fn list_folder_result_parses() {
        let json = r#"{
            "entries": [
                {".tag": "folder", "name": "jan", "id": "id:a", "path_display": "/Archive/2024/jan"},
                {".tag": "file", "name": "notes.txt", "id": "id:b", "size": 120,
                 "server_modified": "2024-01-31T12:00:00Z", "rev": "015"},
                {".tag": "deleted", "name": "old.txt"}
            ],
            "cursor": "AAE",
            "has_more": true
        }"#;
        let result: ListFolderResult = serde_json::from_str(json).unwrap();
        let page = into_page(result);

        assert_eq!(page.entries.len(), 2, "deleted entries are dropped");
        assert!(page.entries[0].is_folder());
        assert_eq!(page.entries[1].size(), 120);
        assert!(page.entries[1].modified_at().is_some());
        assert_eq!(page.next_cursor, Some(Cursor::new("AAE")));
    }

    #[test]
    fn final_page_has_no_cursor() {
        let json = r#"{"entries": [], "cursor": "AAF", "has_more": false}"#;
        let page = into_page(serde_json::from_str(json).unwrap());
        assert!(!page.has_more);
        assert!(page.next_cursor.is_none());
    }

    #[test]
    fn invalid_names_are_skipped() {
        let meta = Metadata::Folder {
            name: "a/b".to_string(),
            id: "id".to_string(),
        };
        assert!(meta.into_entry().is_none());
    }

    #[test]
    fn conflict_not_found_maps_to_not_found() {
        let body = r#"{"error_summary": "path/not_found/..", "error": {".tag": "path"}}"#;
        let err = map_status(StatusCode::CONFLICT, body, "/Archive/gone");
        assert_eq!(err, TransportError::NotFound("/Archive/gone".to_string()));
    }

    #[test]
    fn other_statuses_map_by_kind() {
        assert!(matches!(
            map_status(StatusCode::UNAUTHORIZED, "{}", "/"),
            TransportError::Unauthorized(_)
        ));
        assert!(matches!(
            map_status(StatusCode::TOO_MANY_REQUESTS, "slow down", "/"),
            TransportError::RateLimited(_)
        ));
        assert!(matches!(
            map_status(StatusCode::INTERNAL_SERVER_ERROR, "oops", "/"),
            TransportError::Remote(_)
        ));
    }

    #[test]
    fn config_debug_hides_token() {
        let config = DropboxConfig {
            access_token: "sl.secret".to_string(),
            page_size: 200,
            timeout: Duration::from_secs(30),
        };
        assert!(!format!("{config:?}").contains("sl.secret"));
    }
}
