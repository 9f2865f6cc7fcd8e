// Google Drive + Sheets REST client.
//
// Three read-only calls, each made once with a bearer token:
// - Drive files.list filtered to spreadsheets, newest first
// - Sheets spreadsheets.get for the title and first tab
// - Sheets spreadsheets.values.get for the cell grid
//
// A 403 becomes SheetsError::Forbidden so the core can ask for a fresh
// authorization; any other non-2xx keeps the status text in SheetsError::Api.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::core::sheets::{Grid, SheetSummary, SheetsError, SheetsGateway, SpreadsheetInfo};

pub const DRIVE_API_BASE: &str = "https://www.googleapis.com/drive/v3";
pub const SHEETS_API_BASE: &str = "https://sheets.googleapis.com/v4";

const SPREADSHEET_QUERY: &str = "mimeType='application/vnd.google-apps.spreadsheet'";
const LIST_FIELDS: &str = "files(id,name,createdTime,modifiedTime)";
const LIST_ORDER: &str = "modifiedTime desc";

// =============================================================================
// API RESPONSE STRUCTURES
// =============================================================================

#[derive(Debug, Deserialize)]
struct FileList {
    #[serde(default)]
    files: Vec<DriveFile>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DriveFile {
    id: String,
    #[serde(default)]
    name: String,
    created_time: Option<String>,
    modified_time: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Spreadsheet {
    properties: Option<SpreadsheetProperties>,
    #[serde(default)]
    sheets: Vec<SheetEntry>,
}

#[derive(Debug, Deserialize)]
struct SpreadsheetProperties {
    title: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SheetEntry {
    properties: Option<SheetProperties>,
}

#[derive(Debug, Deserialize)]
struct SheetProperties {
    title: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    values: Option<Grid>,
}

fn parse_datetime(value: Option<&str>) -> Option<DateTime<Utc>> {
    value
        .and_then(|v| DateTime::parse_from_rfc3339(v).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

impl From<DriveFile> for SheetSummary {
    fn from(file: DriveFile) -> Self {
        SheetSummary {
            created_time: parse_datetime(file.created_time.as_deref()),
            modified_time: parse_datetime(file.modified_time.as_deref()),
            id: file.id,
            name: file.name,
        }
    }
}

impl From<Spreadsheet> for SpreadsheetInfo {
    fn from(spreadsheet: Spreadsheet) -> Self {
        SpreadsheetInfo {
            title: spreadsheet.properties.and_then(|p| p.title),
            first_tab_title: spreadsheet
                .sheets
                .into_iter()
                .next()
                .and_then(|s| s.properties)
                .and_then(|p| p.title),
        }
    }
}

// =============================================================================
// CLIENT
// =============================================================================

pub struct GoogleSheetsClient {
    client: Client,
    drive_base: String,
    sheets_base: String,
}

impl GoogleSheetsClient {
    pub fn new() -> Self {
        Self::with_base_urls(DRIVE_API_BASE, SHEETS_API_BASE)
    }

    /// Points the client at other hosts (a proxy or a local stub).
    pub fn with_base_urls(drive_base: impl Into<String>, sheets_base: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            drive_base: drive_base.into().trim_end_matches('/').to_string(),
            sheets_base: sheets_base.into().trim_end_matches('/').to_string(),
        }
    }

    fn files_url(&self) -> Result<Url, SheetsError> {
        Url::parse_with_params(
            &format!("{}/files", self.drive_base),
            &[
                ("q", SPREADSHEET_QUERY),
                ("fields", LIST_FIELDS),
                ("orderBy", LIST_ORDER),
            ],
        )
        .map_err(|e| SheetsError::Api(e.to_string()))
    }

    /// `{sheets_base}/spreadsheets/{id}[/values/{range}]`, each segment
    /// percent-encoded (tab names may contain spaces or slashes).
    fn spreadsheet_url(&self, spreadsheet_id: &str, range: Option<&str>) -> Result<Url, SheetsError> {
        let mut url = Url::parse(&self.sheets_base).map_err(|e| SheetsError::Api(e.to_string()))?;
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| SheetsError::Api(format!("Invalid base URL: {}", self.sheets_base)))?;
            segments.pop_if_empty().push("spreadsheets").push(spreadsheet_id);
            if let Some(range) = range {
                segments.push("values").push(range);
            }
        }
        Ok(url)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, SheetsError> {
        let response = request
            .send()
            .await
            .map_err(|e| SheetsError::Network(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        tracing::warn!(status = status.as_u16(), body = %body, "Google API call failed");

        Err(status_error(status))
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url, token: &str) -> Result<T, SheetsError> {
        tracing::debug!(url = %url, "GET");
        let response = self.send(self.client.get(url).bearer_auth(token)).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| SheetsError::Decode(e.to_string()))
    }
}

/// Error for a non-2xx answer. Only 403 asks for a new authorization.
fn status_error(status: StatusCode) -> SheetsError {
    let reason = status.canonical_reason().unwrap_or("Unknown status");
    if status == StatusCode::FORBIDDEN {
        return SheetsError::Forbidden(reason.to_string());
    }
    SheetsError::Api(format!("{} {}", status.as_u16(), reason))
}

impl Default for GoogleSheetsClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SheetsGateway for GoogleSheetsClient {
    async fn list_spreadsheets(&self, token: &str) -> Result<Vec<SheetSummary>, SheetsError> {
        let list: FileList = self.get_json(self.files_url()?, token).await?;
        Ok(list.files.into_iter().map(SheetSummary::from).collect())
    }

    async fn spreadsheet_info(
        &self,
        token: &str,
        spreadsheet_id: &str,
    ) -> Result<SpreadsheetInfo, SheetsError> {
        let url = self.spreadsheet_url(spreadsheet_id, None)?;
        let spreadsheet: Spreadsheet = self.get_json(url, token).await?;
        Ok(spreadsheet.into())
    }

    async fn values(
        &self,
        token: &str,
        spreadsheet_id: &str,
        range: &str,
    ) -> Result<Grid, SheetsError> {
        let url = self.spreadsheet_url(spreadsheet_id, Some(range))?;
        let value_range: ValueRange = self.get_json(url, token).await?;
        Ok(value_range.values.unwrap_or_default())
    }
}

/// Grid from a saved `values.get` response, or from a bare 2D array.
pub fn grid_from_json(text: &str) -> Result<Grid, SheetsError> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum GridDocument {
        Bare(Grid),
        Response(ValueRange),
    }

    let document: GridDocument =
        serde_json::from_str(text).map_err(|e| SheetsError::Decode(e.to_string()))?;
    Ok(match document {
        GridDocument::Bare(grid) => grid,
        GridDocument::Response(range) => range.values.unwrap_or_default(),
    })
}
