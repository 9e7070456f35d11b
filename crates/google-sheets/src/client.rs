//! Sheets v4 / Drive v3 HTTP client.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use sheet_core::{
    CellValue, CheckboxRule, DocumentId, DocumentInfo, DocumentLocator, Result, Row, RowHandle,
    SheetData, SheetStore, SortOrder, StoreError, ValueInput, SPREADSHEET_MIME_TYPE,
};
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::config::GoogleConfig;
use crate::requests;

/// First-worksheet metadata needed to address a document.
#[derive(Debug, Clone)]
struct SheetMeta {
    sheet_id: i64,
    title: String,
}

#[derive(Debug, Deserialize)]
struct SpreadsheetResponse {
    #[serde(default)]
    sheets: Vec<SheetEntry>,
}

#[derive(Debug, Deserialize)]
struct SheetEntry {
    properties: SheetProperties,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SheetProperties {
    sheet_id: i64,
    title: String,
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
struct FileList {
    #[serde(default)]
    files: Vec<DriveFile>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DriveFile {
    id: String,
    name: String,
    modified_time: Option<DateTime<Utc>>,
}

impl From<DriveFile> for DocumentInfo {
    fn from(file: DriveFile) -> Self {
        Self {
            id: DocumentId::new(file.id),
            name: file.name,
            modified: file.modified_time,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

/// Google Sheets and Drive backed store.
///
/// Row handles are the sheet row index observed at read time.
#[derive(Clone)]
pub struct GoogleWorkspace {
    http: Client,
    config: GoogleConfig,
    metadata: Arc<RwLock<HashMap<DocumentId, SheetMeta>>>,
}

impl GoogleWorkspace {
    /// Build a workspace client.
    pub fn new(config: GoogleConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| StoreError::Transport(e.to_string()))?;

        info!(
            "Google workspace client ready (sheets: {}, drive: {})",
            config.sheets_url, config.drive_url
        );

        Ok(Self {
            http,
            config,
            metadata: Arc::new(RwLock::new(HashMap::new())),
        })
    }

    /// Get the configuration.
    pub fn config(&self) -> &GoogleConfig {
        &self.config
    }

    async fn meta(&self, doc: &DocumentId) -> Result<SheetMeta> {
        if let Some(meta) = self.metadata.read().await.get(doc) {
            return Ok(meta.clone());
        }

        let url = self.config.spreadsheet_url(doc.as_str());
        debug!("Fetching spreadsheet metadata for {}", doc);
        let response: SpreadsheetResponse = self
            .send(
                doc,
                self.http
                    .get(&url)
                    .query(&[("fields", "sheets.properties(sheetId,title)")]),
            )
            .await?;

        let first = response
            .sheets
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::DocumentNotFound(format!("{} has no worksheets", doc)))?;
        let meta = SheetMeta {
            sheet_id: first.properties.sheet_id,
            title: first.properties.title,
        };

        self.metadata
            .write()
            .await
            .insert(doc.clone(), meta.clone());
        Ok(meta)
    }

    async fn batch_update(&self, doc: &DocumentId, requests: Vec<Value>) -> Result<()> {
        if requests.is_empty() {
            return Ok(());
        }
        let url = format!(
            "{}:batchUpdate",
            self.config.spreadsheet_url(doc.as_str())
        );
        debug!("batchUpdate on {} ({} requests)", doc, requests.len());
        let _: Value = self
            .send(doc, self.http.post(&url).json(&json!({ "requests": requests })))
            .await?;
        Ok(())
    }

    async fn send<T: DeserializeOwned>(&self, doc: &DocumentId, request: RequestBuilder) -> Result<T> {
        let response = request
            .bearer_auth(&self.config.access_token)
            .send()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?;
        let response = check_status(doc.as_str(), response).await?;
        response
            .json()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))
    }

    async fn drive_files(&self, query: String, page_size: u32) -> Result<Vec<DocumentInfo>> {
        let url = self.config.files_url();
        let page_size = page_size.to_string();
        debug!("Drive query: {}", query);
        let response = self
            .http
            .get(&url)
            .query(&[
                ("q", query.as_str()),
                ("fields", "files(id,name,modifiedTime)"),
                ("spaces", "drive"),
                ("pageSize", page_size.as_str()),
            ])
            .bearer_auth(&self.config.access_token)
            .send()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?;
        let list: FileList = check_status("drive", response)
            .await?
            .json()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?;
        Ok(list.files.into_iter().map(DocumentInfo::from).collect())
    }
}

async fn check_status(subject: &str, response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    if status.as_u16() == 404 {
        return Err(StoreError::DocumentNotFound(subject.to_string()));
    }
    let message = serde_json::from_str::<ApiErrorBody>(&body)
        .map(|b| b.error.message)
        .unwrap_or(body);
    Err(StoreError::Api {
        status: status.as_u16(),
        message,
    })
}

fn json_row(values: &[CellValue]) -> Vec<Value> {
    values.iter().map(CellValue::to_json).collect()
}

#[async_trait]
impl SheetStore for GoogleWorkspace {
    async fn read_sheet(&self, doc: &DocumentId) -> Result<SheetData> {
        let meta = self.meta(doc).await?;
        let url = self
            .config
            .values_url(doc.as_str(), &requests::quote_title(&meta.title));
        let range: ValueRange = self
            .send(
                doc,
                self.http
                    .get(&url)
                    .query(&[("valueRenderOption", "FORMATTED_VALUE")]),
            )
            .await?;

        let mut rows = range.values.into_iter();
        let header = rows
            .next()
            .map(|cells| cells.iter().map(|c| CellValue::from(c).to_text()).collect())
            .unwrap_or_default();
        let rows = rows
            .enumerate()
            .map(|(i, cells)| {
                let position = i + 1;
                Row {
                    handle: RowHandle(position as u64),
                    position,
                    values: cells.iter().map(CellValue::from).collect(),
                }
            })
            .collect();

        Ok(SheetData { header, rows })
    }

    async fn insert_rows(&self, doc: &DocumentId, at: usize, count: usize) -> Result<()> {
        if count == 0 {
            return Ok(());
        }
        let meta = self.meta(doc).await?;
        self.batch_update(doc, vec![requests::insert_rows(meta.sheet_id, at, count)])
            .await
    }

    async fn write_rows(
        &self,
        doc: &DocumentId,
        at: usize,
        values: Vec<Vec<CellValue>>,
        input: ValueInput,
    ) -> Result<()> {
        if values.is_empty() {
            return Ok(());
        }
        let meta = self.meta(doc).await?;
        let width = values.iter().map(Vec::len).max().unwrap_or(1);
        let range = requests::block_range(&meta.title, at, values.len(), width);
        let url = self.config.values_url(doc.as_str(), &range);
        let body = json!({
            "range": range,
            "majorDimension": "ROWS",
            "values": values.iter().map(|row| json_row(row)).collect::<Vec<_>>(),
        });
        let _: Value = self
            .send(
                doc,
                self.http
                    .put(&url)
                    .query(&[("valueInputOption", input.as_str())])
                    .json(&body),
            )
            .await?;
        Ok(())
    }

    async fn update_cell(
        &self,
        doc: &DocumentId,
        position: usize,
        column: usize,
        value: CellValue,
        input: ValueInput,
    ) -> Result<()> {
        let meta = self.meta(doc).await?;
        let range = requests::cell_range(&meta.title, position, column);
        let url = self.config.values_url(doc.as_str(), &range);
        let body = json!({
            "range": range,
            "majorDimension": "ROWS",
            "values": [[value.to_json()]],
        });
        let _: Value = self
            .send(
                doc,
                self.http
                    .put(&url)
                    .query(&[("valueInputOption", input.as_str())])
                    .json(&body),
            )
            .await?;
        Ok(())
    }

    async fn append_row(
        &self,
        doc: &DocumentId,
        values: Vec<CellValue>,
        input: ValueInput,
    ) -> Result<()> {
        let meta = self.meta(doc).await?;
        let range = requests::quote_title(&meta.title);
        let url = format!("{}:append", self.config.values_url(doc.as_str(), &range));
        let body = json!({ "majorDimension": "ROWS", "values": [json_row(&values)] });
        let _: Value = self
            .send(
                doc,
                self.http
                    .post(&url)
                    .query(&[
                        ("valueInputOption", input.as_str()),
                        ("insertDataOption", "INSERT_ROWS"),
                    ])
                    .json(&body),
            )
            .await?;
        Ok(())
    }

    async fn delete_row(&self, doc: &DocumentId, handle: RowHandle) -> Result<()> {
        if handle.0 == 0 {
            return Err(StoreError::RowNotFound {
                document: doc.to_string(),
                handle: handle.to_string(),
            });
        }
        let meta = self.meta(doc).await?;
        self.batch_update(
            doc,
            vec![requests::delete_row(meta.sheet_id, handle.0 as usize)],
        )
        .await
    }

    async fn sort_rows(&self, doc: &DocumentId, column: usize, order: SortOrder) -> Result<()> {
        let meta = self.meta(doc).await?;
        self.batch_update(doc, vec![requests::sort_rows(meta.sheet_id, column, order)])
            .await
    }

    async fn set_checkbox_rules(&self, doc: &DocumentId, rules: Vec<CheckboxRule>) -> Result<()> {
        if rules.is_empty() {
            return Ok(());
        }
        let meta = self.meta(doc).await?;
        let requests = rules
            .iter()
            .map(|rule| requests::checkbox_rule(meta.sheet_id, rule))
            .collect();
        self.batch_update(doc, requests).await
    }
}

#[async_trait]
impl DocumentLocator for GoogleWorkspace {
    async fn find_document(&self, folder: &str, fragment: &str) -> Result<Option<DocumentInfo>> {
        let query = requests::folder_query(folder, Some(fragment), None);
        let files = self.drive_files(query, 10).await?;
        debug!("{} documents in {} match '{}'", files.len(), folder, fragment);
        Ok(files.into_iter().next())
    }

    async fn list_documents(
        &self,
        folder: &str,
        modified_since: Option<DateTime<Utc>>,
    ) -> Result<Vec<DocumentInfo>> {
        let query = requests::folder_query(folder, None, modified_since);
        self.drive_files(query, 1000).await
    }

    async fn create_spreadsheet(&self, folder: &str, name: &str) -> Result<DocumentInfo> {
        let url = self.config.files_url();
        let body = json!({
            "name": name,
            "mimeType": SPREADSHEET_MIME_TYPE,
            "parents": [folder],
        });
        let response = self
            .http
            .post(&url)
            .query(&[("fields", "id,name,modifiedTime")])
            .bearer_auth(&self.config.access_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?;
        let file: DriveFile = check_status(folder, response)
            .await?
            .json()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?;
        info!("Created spreadsheet '{}' ({}) in {}", file.name, file.id, folder);
        Ok(file.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drive_file_conversion() {
        let file: DriveFile = serde_json::from_value(json!({
            "id": "abc",
            "name": "Max 123456789012345",
            "modifiedTime": "2026-10-02T08:00:00.000Z"
        }))
        .unwrap();
        let info = DocumentInfo::from(file);
        assert_eq!(info.id.as_str(), "abc");
        assert!(info.modified.is_some());
    }

    #[test]
    fn test_api_error_body() {
        let body: ApiErrorBody = serde_json::from_str(
            r#"{"error":{"code":400,"message":"Unable to parse range","status":"INVALID_ARGUMENT"}}"#,
        )
        .unwrap();
        assert_eq!(body.error.message, "Unable to parse range");
    }

    #[test]
    fn test_value_range_missing_values() {
        let range: ValueRange = serde_json::from_str(r#"{"range":"A1:L1"}"#).unwrap();
        assert!(range.values.is_empty());
    }

    #[tokio::test]
    async fn test_new_builds_client() {
        let workspace = GoogleWorkspace::new(GoogleConfig::new("token")).unwrap();
        assert_eq!(workspace.config().access_token, "token");
    }
}
