//! Caregiver roster lookups.

use sheet_core::{DocumentId, SheetData, SheetStore};
use tracing::debug;

use crate::error::{CareError, Result};

const NAME_HEADER: &str = "מטפל";
const EMAIL_HEADER: &str = "מייל";

fn name_column(sheet: &SheetData, doc: &DocumentId) -> Result<usize> {
    sheet.column_of(NAME_HEADER).ok_or_else(|| {
        CareError::Configuration(format!(
            "could not find '{}' header in sheet {}",
            NAME_HEADER, doc
        ))
    })
}

/// Name of the caregiver with `email`, or an empty string when unknown.
pub async fn caregiver_name(store: &dyn SheetStore, doc: &DocumentId, email: &str) -> Result<String> {
    let sheet = store.read_sheet(doc).await?;
    let name = name_column(&sheet, doc)?;
    let Some(email_column) = sheet.column_of(EMAIL_HEADER) else {
        return Ok(String::new());
    };

    let email = email.trim();
    let found = sheet
        .rows
        .iter()
        .find(|row| !email.is_empty() && row.cell(email_column).to_text().trim() == email)
        .map(|row| row.cell(name).to_text().trim().to_string())
        .unwrap_or_default();
    debug!(email, caregiver = %found, "Caregiver lookup");
    Ok(found)
}

/// Unique trimmed caregiver names in sheet order.
pub async fn list_caregivers(store: &dyn SheetStore, doc: &DocumentId) -> Result<Vec<String>> {
    let sheet = store.read_sheet(doc).await?;
    let column = name_column(&sheet, doc)?;

    let mut names: Vec<String> = Vec::new();
    for row in &sheet.rows {
        let name = row.cell(column).to_text().trim().to_string();
        if !name.is_empty() && !names.contains(&name) {
            names.push(name);
        }
    }
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mock_sheets::MemoryWorkspace;
    use sheet_core::CellValue;

    fn caregivers(store: &MemoryWorkspace) -> DocumentId {
        let doc = store.add_document("cg", "Caregivers", None, &["מטפל", "מייל"]);
        for (name, email) in [
            ("Dana", "dana@example.org"),
            (" Avi ", "avi@example.org"),
            ("Dana", "dana.other@example.org"),
            ("", "ghost@example.org"),
        ] {
            store.push_row(&doc, vec![CellValue::text(name), CellValue::text(email)]);
        }
        doc
    }

    #[tokio::test]
    async fn test_name_by_email() {
        let store = MemoryWorkspace::new();
        let doc = caregivers(&store);
        assert_eq!(caregiver_name(&store, &doc, "avi@example.org").await.unwrap(), "Avi");
        assert_eq!(caregiver_name(&store, &doc, "nobody@example.org").await.unwrap(), "");
        assert_eq!(caregiver_name(&store, &doc, "").await.unwrap(), "");
    }

    #[tokio::test]
    async fn test_unique_names() {
        let store = MemoryWorkspace::new();
        let doc = caregivers(&store);
        assert_eq!(list_caregivers(&store, &doc).await.unwrap(), vec!["Dana", "Avi"]);
    }

    #[tokio::test]
    async fn test_missing_name_column() {
        let store = MemoryWorkspace::new();
        let doc = store.add_document("cg", "Caregivers", None, &["Name"]);
        let result = list_caregivers(&store, &doc).await;
        assert!(matches!(result, Err(CareError::Configuration(_))));
    }
}
