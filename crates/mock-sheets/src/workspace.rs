//! In-memory workspace holding documents, rows and folder membership.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use sheet_core::{
    CellValue, CheckboxRule, DocumentId, DocumentInfo, DocumentLocator, Result, Row, RowHandle,
    SheetData, SheetStore, SortOrder, StoreError, ValueInput,
};

use crate::interpret::{compare_cells, interpret};

#[derive(Debug, Clone)]
struct MemoryRow {
    handle: RowHandle,
    values: Vec<CellValue>,
    checkboxes: BTreeSet<usize>,
}

#[derive(Debug, Clone)]
struct MemoryDocument {
    name: String,
    folder: Option<String>,
    modified: DateTime<Utc>,
    header: Vec<String>,
    rows: Vec<MemoryRow>,
}

#[derive(Debug, Default)]
struct State {
    documents: IndexMap<DocumentId, MemoryDocument>,
    next_handle: u64,
    next_document: u64,
    reads: HashMap<DocumentId, usize>,
    failing: HashSet<&'static str>,
}

impl State {
    fn handle(&mut self) -> RowHandle {
        self.next_handle += 1;
        RowHandle(self.next_handle)
    }

    fn check(&self, operation: &'static str) -> Result<()> {
        if self.failing.contains(operation) {
            return Err(StoreError::Api {
                status: 503,
                message: format!("{} unavailable", operation),
            });
        }
        Ok(())
    }

    fn document(&mut self, doc: &DocumentId) -> Result<&mut MemoryDocument> {
        self.documents
            .get_mut(doc)
            .ok_or_else(|| StoreError::DocumentNotFound(doc.to_string()))
    }

    fn blank_row(&mut self) -> MemoryRow {
        MemoryRow {
            handle: self.handle(),
            values: Vec::new(),
            checkboxes: BTreeSet::new(),
        }
    }

    /// Ensure data row `index` exists, padding with blank rows.
    fn pad_rows(&mut self, doc: &DocumentId, index: usize) -> Result<()> {
        let missing = index + 1 - self.document(doc)?.rows.len().min(index + 1);
        let padding: Vec<MemoryRow> = (0..missing).map(|_| self.blank_row()).collect();
        self.document(doc)?.rows.extend(padding);
        Ok(())
    }
}

/// A spreadsheet workspace held entirely in memory.
///
/// Cloning shares the underlying state, so a test can hand one clone to the
/// code under test and inspect another.
#[derive(Debug, Clone, Default)]
pub struct MemoryWorkspace {
    state: Arc<Mutex<State>>,
}

impl MemoryWorkspace {
    /// Create an empty workspace.
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Add a document with the given header row.
    pub fn add_document(
        &self,
        id: &str,
        name: &str,
        folder: Option<&str>,
        header: &[&str],
    ) -> DocumentId {
        let id = DocumentId::new(id);
        self.state().documents.insert(
            id.clone(),
            MemoryDocument {
                name: name.to_string(),
                folder: folder.map(str::to_string),
                modified: Utc::now(),
                header: header.iter().map(|h| h.to_string()).collect(),
                rows: Vec::new(),
            },
        );
        id
    }

    /// Append a data row exactly as given (no value interpretation).
    pub fn push_row(&self, doc: &DocumentId, values: Vec<CellValue>) {
        let mut state = self.state();
        let handle = state.handle();
        if let Some(document) = state.documents.get_mut(doc) {
            document.rows.push(MemoryRow {
                handle,
                values,
                checkboxes: BTreeSet::new(),
            });
        }
    }

    /// Override a document's modification time.
    pub fn set_modified(&self, doc: &DocumentId, modified: DateTime<Utc>) {
        if let Some(document) = self.state().documents.get_mut(doc) {
            document.modified = modified;
        }
    }

    /// Snapshot of a document's data rows, untrimmed.
    pub fn rows(&self, doc: &DocumentId) -> Vec<Vec<CellValue>> {
        self.state()
            .documents
            .get(doc)
            .map(|d| d.rows.iter().map(|r| r.values.clone()).collect())
            .unwrap_or_default()
    }

    /// Snapshot of a document's header.
    pub fn header(&self, doc: &DocumentId) -> Vec<String> {
        self.state()
            .documents
            .get(doc)
            .map(|d| d.header.clone())
            .unwrap_or_default()
    }

    /// Whether the cell at a 0-based sheet row index carries a checkbox rule.
    pub fn has_checkbox(&self, doc: &DocumentId, position: usize, column: usize) -> bool {
        let state = self.state();
        let Some(document) = state.documents.get(doc) else {
            return false;
        };
        position
            .checked_sub(1)
            .and_then(|index| document.rows.get(index))
            .map(|row| row.checkboxes.contains(&column))
            .unwrap_or(false)
    }

    /// Number of [`SheetStore::read_sheet`] calls made against a document.
    pub fn read_count(&self, doc: &DocumentId) -> usize {
        self.state().reads.get(doc).copied().unwrap_or(0)
    }

    /// Make every future call of the named operation fail with a 503.
    ///
    /// Operation names match the trait method names, e.g. `"create_spreadsheet"`.
    pub fn fail_operation(&self, operation: &'static str) {
        self.state().failing.insert(operation);
    }

    /// Undo [`MemoryWorkspace::fail_operation`].
    pub fn restore_operation(&self, operation: &'static str) {
        self.state().failing.remove(operation);
    }

    /// Names of documents in a folder, in creation order.
    pub fn document_names(&self, folder: &str) -> Vec<String> {
        self.state()
            .documents
            .values()
            .filter(|d| d.folder.as_deref() == Some(folder))
            .map(|d| d.name.clone())
            .collect()
    }
}

fn data_index(position: usize) -> Result<usize> {
    position.checked_sub(1).ok_or_else(|| StoreError::Api {
        status: 400,
        message: "row index 0 is the header row".to_string(),
    })
}

fn trimmed(values: &[CellValue]) -> Vec<CellValue> {
    let end = values
        .iter()
        .rposition(|v| *v != CellValue::Empty)
        .map(|i| i + 1)
        .unwrap_or(0);
    values[..end].to_vec()
}

#[async_trait]
impl SheetStore for MemoryWorkspace {
    async fn read_sheet(&self, doc: &DocumentId) -> Result<SheetData> {
        let mut state = self.state();
        state.check("read_sheet")?;
        *state.reads.entry(doc.clone()).or_insert(0) += 1;
        let document = state.document(doc)?;
        Ok(SheetData {
            header: document.header.clone(),
            rows: document
                .rows
                .iter()
                .enumerate()
                .map(|(i, row)| Row {
                    handle: row.handle,
                    position: i + 1,
                    values: trimmed(&row.values),
                })
                .collect(),
        })
    }

    async fn insert_rows(&self, doc: &DocumentId, at: usize, count: usize) -> Result<()> {
        let mut state = self.state();
        state.check("insert_rows")?;
        let index = data_index(at)?;
        if index > 0 {
            state.pad_rows(doc, index - 1)?;
        }
        let blanks: Vec<MemoryRow> = (0..count).map(|_| state.blank_row()).collect();
        let document = state.document(doc)?;
        document.rows.splice(index..index, blanks);
        document.modified = Utc::now();
        Ok(())
    }

    async fn write_rows(
        &self,
        doc: &DocumentId,
        at: usize,
        values: Vec<Vec<CellValue>>,
        input: ValueInput,
    ) -> Result<()> {
        let mut state = self.state();
        state.check("write_rows")?;
        let mut rows = values.into_iter();
        let mut position = at;
        if position == 0 {
            if let Some(header) = rows.next() {
                state.document(doc)?.header = header.iter().map(CellValue::to_text).collect();
            }
            position = 1;
        }
        for (offset, row) in rows.enumerate() {
            let index = position + offset - 1;
            state.pad_rows(doc, index)?;
            let document = state.document(doc)?;
            document.rows[index].values =
                row.into_iter().map(|v| interpret(v, input)).collect();
        }
        state.document(doc)?.modified = Utc::now();
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
        let mut state = self.state();
        state.check("update_cell")?;
        let index = data_index(position)?;
        state.pad_rows(doc, index)?;
        let document = state.document(doc)?;
        let row = &mut document.rows[index].values;
        if row.len() <= column {
            row.resize(column + 1, CellValue::Empty);
        }
        row[column] = interpret(value, input);
        document.modified = Utc::now();
        Ok(())
    }

    async fn append_row(
        &self,
        doc: &DocumentId,
        values: Vec<CellValue>,
        input: ValueInput,
    ) -> Result<()> {
        let mut state = self.state();
        state.check("append_row")?;
        let handle = state.handle();
        let document = state.document(doc)?;
        document.rows.push(MemoryRow {
            handle,
            values: values.into_iter().map(|v| interpret(v, input)).collect(),
            checkboxes: BTreeSet::new(),
        });
        document.modified = Utc::now();
        Ok(())
    }

    async fn delete_row(&self, doc: &DocumentId, handle: RowHandle) -> Result<()> {
        let mut state = self.state();
        state.check("delete_row")?;
        let document = state.document(doc)?;
        let index = document
            .rows
            .iter()
            .position(|r| r.handle == handle)
            .ok_or_else(|| StoreError::RowNotFound {
                document: doc.to_string(),
                handle: handle.to_string(),
            })?;
        document.rows.remove(index);
        document.modified = Utc::now();
        Ok(())
    }

    async fn sort_rows(&self, doc: &DocumentId, column: usize, order: SortOrder) -> Result<()> {
        let mut state = self.state();
        state.check("sort_rows")?;
        let document = state.document(doc)?;
        document.rows.sort_by(|a, b| {
            let empty = CellValue::Empty;
            let left = a.values.get(column).unwrap_or(&empty);
            let right = b.values.get(column).unwrap_or(&empty);
            compare_cells(left, right, order)
        });
        document.modified = Utc::now();
        Ok(())
    }

    async fn set_checkbox_rules(&self, doc: &DocumentId, rules: Vec<CheckboxRule>) -> Result<()> {
        let mut state = self.state();
        state.check("set_checkbox_rules")?;
        for rule in rules {
            let index = data_index(rule.position)?;
            state.pad_rows(doc, index)?;
            let row = &mut state.document(doc)?.rows[index];
            if rule.checkbox {
                row.checkboxes.insert(rule.column);
            } else {
                row.checkboxes.remove(&rule.column);
            }
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentLocator for MemoryWorkspace {
    async fn find_document(&self, folder: &str, fragment: &str) -> Result<Option<DocumentInfo>> {
        let state = self.state();
        state.check("find_document")?;
        Ok(state
            .documents
            .iter()
            .find(|(_, d)| d.folder.as_deref() == Some(folder) && d.name.contains(fragment))
            .map(|(id, d)| DocumentInfo {
                id: id.clone(),
                name: d.name.clone(),
                modified: Some(d.modified),
            }))
    }

    async fn list_documents(
        &self,
        folder: &str,
        modified_since: Option<DateTime<Utc>>,
    ) -> Result<Vec<DocumentInfo>> {
        let state = self.state();
        state.check("list_documents")?;
        Ok(state
            .documents
            .iter()
            .filter(|(_, d)| d.folder.as_deref() == Some(folder))
            .filter(|(_, d)| modified_since.map_or(true, |since| d.modified >= since))
            .map(|(id, d)| DocumentInfo {
                id: id.clone(),
                name: d.name.clone(),
                modified: Some(d.modified),
            })
            .collect())
    }

    async fn create_spreadsheet(&self, folder: &str, name: &str) -> Result<DocumentInfo> {
        let mut state = self.state();
        state.check("create_spreadsheet")?;
        state.next_document += 1;
        let id = DocumentId::new(format!("mem-doc-{}", state.next_document));
        let modified = Utc::now();
        state.documents.insert(
            id.clone(),
            MemoryDocument {
                name: name.to_string(),
                folder: Some(folder.to_string()),
                modified,
                header: Vec::new(),
                rows: Vec::new(),
            },
        );
        Ok(DocumentInfo {
            id,
            name: name.to_string(),
            modified: Some(modified),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(values: &[&str]) -> Vec<CellValue> {
        values.iter().map(|v| CellValue::text(*v)).collect()
    }

    #[tokio::test]
    async fn test_read_trims_trailing_blanks() {
        let ws = MemoryWorkspace::new();
        let doc = ws.add_document("d", "doc", None, &["a", "b", "c"]);
        ws.push_row(&doc, texts(&["x", "", ""]));

        let sheet = ws.read_sheet(&doc).await.unwrap();
        assert_eq!(sheet.header, vec!["a", "b", "c"]);
        assert_eq!(sheet.rows[0].values, texts(&["x"]));
        assert_eq!(sheet.rows[0].position, 1);
        assert_eq!(ws.read_count(&doc), 1);
    }

    #[tokio::test]
    async fn test_insert_then_write_at_top() {
        let ws = MemoryWorkspace::new();
        let doc = ws.add_document("d", "doc", None, &["date"]);
        ws.push_row(&doc, texts(&["old"]));

        ws.insert_rows(&doc, 1, 2).await.unwrap();
        ws.write_rows(&doc, 1, vec![texts(&["new1"]), texts(&["new2"])], ValueInput::Raw)
            .await
            .unwrap();

        let rows = ws.rows(&doc);
        assert_eq!(rows, vec![texts(&["new1"]), texts(&["new2"]), texts(&["old"])]);
    }

    #[tokio::test]
    async fn test_insert_before_header_is_rejected() {
        let ws = MemoryWorkspace::new();
        let doc = ws.add_document("d", "doc", None, &["date"]);
        assert!(ws.insert_rows(&doc, 0, 1).await.is_err());
    }

    #[tokio::test]
    async fn test_delete_by_handle_survives_shifts() {
        let ws = MemoryWorkspace::new();
        let doc = ws.add_document("d", "doc", None, &["v"]);
        for v in ["a", "b", "c"] {
            ws.push_row(&doc, texts(&[v]));
        }
        let sheet = ws.read_sheet(&doc).await.unwrap();

        // Delete the first row, then the third: the handle still finds "c".
        ws.delete_row(&doc, sheet.rows[0].handle).await.unwrap();
        ws.delete_row(&doc, sheet.rows[2].handle).await.unwrap();
        assert_eq!(ws.rows(&doc), vec![texts(&["b"])]);

        let err = ws.delete_row(&doc, sheet.rows[2].handle).await.unwrap_err();
        assert!(matches!(err, StoreError::RowNotFound { .. }));
    }

    #[tokio::test]
    async fn test_sort_descending_by_date_keeps_checkboxes_with_rows() {
        let ws = MemoryWorkspace::new();
        let doc = ws.add_document("d", "doc", None, &["date", "flag"]);
        ws.push_row(&doc, texts(&["01/10/2026", "x"]));
        ws.push_row(&doc, texts(&["", "blank"]));
        ws.push_row(&doc, texts(&["15/10/2026", "y"]));
        ws.set_checkbox_rules(
            &doc,
            vec![CheckboxRule {
                position: 3,
                column: 1,
                checkbox: true,
            }],
        )
        .await
        .unwrap();

        ws.sort_rows(&doc, 0, SortOrder::Descending).await.unwrap();

        let rows = ws.rows(&doc);
        assert_eq!(rows[0], texts(&["15/10/2026", "y"]));
        assert_eq!(rows[1], texts(&["01/10/2026", "x"]));
        assert_eq!(rows[2], texts(&["", "blank"]));
        assert!(ws.has_checkbox(&doc, 1, 1));
        assert!(!ws.has_checkbox(&doc, 3, 1));
    }

    #[tokio::test]
    async fn test_update_cell_interprets_booleans() {
        let ws = MemoryWorkspace::new();
        let doc = ws.add_document("d", "doc", None, &["a", "b"]);
        ws.push_row(&doc, texts(&["x"]));

        ws.update_cell(&doc, 1, 1, CellValue::text("TRUE"), ValueInput::UserEntered)
            .await
            .unwrap();
        assert_eq!(ws.rows(&doc)[0][1], CellValue::Bool(true));
    }

    #[tokio::test]
    async fn test_locator_find_and_list() {
        let ws = MemoryWorkspace::new();
        let max = ws.add_document("d1", "Max 900000000000001", Some("donkeys"), &[]);
        ws.add_document("d2", "Bella", Some("horses"), &[]);
        let old = ws.add_document("d3", "Old Timer", Some("donkeys"), &[]);
        ws.set_modified(&old, Utc::now() - chrono::Duration::days(30));

        let found = ws.find_document("donkeys", "Max").await.unwrap().unwrap();
        assert_eq!(found.id, max);
        assert!(ws.find_document("donkeys", "Bella").await.unwrap().is_none());

        let recent = ws
            .list_documents("donkeys", Some(Utc::now() - chrono::Duration::days(1)))
            .await
            .unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(ws.list_documents("donkeys", None).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_create_spreadsheet_and_write_header() {
        let ws = MemoryWorkspace::new();
        let info = ws.create_spreadsheet("cats", "Luna").await.unwrap();
        ws.write_rows(&info.id, 0, vec![texts(&["תאריך", "יום"])], ValueInput::Raw)
            .await
            .unwrap();

        assert_eq!(ws.header(&info.id), vec!["תאריך", "יום"]);
        assert_eq!(ws.document_names("cats"), vec!["Luna"]);
    }

    #[tokio::test]
    async fn test_injected_failure() {
        let ws = MemoryWorkspace::new();
        ws.fail_operation("create_spreadsheet");
        let err = ws.create_spreadsheet("cats", "Luna").await.unwrap_err();
        assert!(matches!(err, StoreError::Api { status: 503, .. }));
    }
}
