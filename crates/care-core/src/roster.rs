//! Species rosters: listing, adding and editing animals.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sheet_core::{CellValue, DocumentId, DocumentLocator, Row, SheetData, SheetStore, ValueInput};
use tracing::{info, warn};

use crate::error::{CareError, Result};
use crate::treatment::TREATMENT_HEADER;

/// Name column of every roster.
pub const NAME_HEADER: &str = "שם";

/// Field name, legacy field name and roster header, in [`Animal`] field order.
const FIELDS: [(&str, &str, &str); 18] = [
    ("chipId", "id", "שבב"),
    ("secondaryChipId", "id2", "שבב נוסף"),
    ("name", "name", "שם"),
    ("sex", "sex", "מין"),
    ("description", "description", "תיאור"),
    ("weight", "weight", "משקל"),
    ("arrivalDate", "arrival_date", "תאריך הגעה"),
    ("birthDate", "birth_date", "תאריך לידה"),
    ("location", "location", "מתחם"),
    ("specialTrimming", "special_trimming", "טילוף מיוחד"),
    ("notes", "notes", "התנהגותי/ הערות"),
    ("drugs", "drugs", "טשטוש"),
    ("castrationDate", "castration", "ת.סירוס"),
    ("dewormingDate", "deworming", "תאריך תילוע"),
    ("source", "source", "מקור"),
    ("status", "status", "סטטוס"),
    ("friends", "friends", "חברויות"),
    ("assignedCaregivers", "in_treatment", "בטיפול"),
];

/// Roster header for a patch key, accepting current and legacy names.
pub fn header_for(key: &str) -> Option<&'static str> {
    FIELDS
        .iter()
        .find(|(field, legacy, _)| *field == key || *legacy == key)
        .map(|(_, _, header)| *header)
}

/// One roster row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Animal {
    #[serde(alias = "id")]
    pub chip_id: String,
    #[serde(alias = "id2")]
    pub secondary_chip_id: String,
    pub name: String,
    pub sex: String,
    pub description: String,
    pub weight: String,
    #[serde(alias = "arrival_date")]
    pub arrival_date: String,
    #[serde(alias = "birth_date")]
    pub birth_date: String,
    pub location: String,
    #[serde(alias = "special_trimming")]
    pub special_trimming: String,
    pub notes: String,
    pub drugs: String,
    #[serde(alias = "castration")]
    pub castration_date: String,
    #[serde(alias = "deworming")]
    pub deworming_date: String,
    pub source: String,
    pub status: String,
    pub friends: String,
    /// Comma-separated caregiver names.
    #[serde(alias = "in_treatment")]
    pub assigned_caregivers: String,
}

impl Animal {
    fn field(&self, index: usize) -> &str {
        match index {
            0 => &self.chip_id,
            1 => &self.secondary_chip_id,
            2 => &self.name,
            3 => &self.sex,
            4 => &self.description,
            5 => &self.weight,
            6 => &self.arrival_date,
            7 => &self.birth_date,
            8 => &self.location,
            9 => &self.special_trimming,
            10 => &self.notes,
            11 => &self.drugs,
            12 => &self.castration_date,
            13 => &self.deworming_date,
            14 => &self.source,
            15 => &self.status,
            16 => &self.friends,
            _ => &self.assigned_caregivers,
        }
    }

    fn field_mut(&mut self, index: usize) -> &mut String {
        match index {
            0 => &mut self.chip_id,
            1 => &mut self.secondary_chip_id,
            2 => &mut self.name,
            3 => &mut self.sex,
            4 => &mut self.description,
            5 => &mut self.weight,
            6 => &mut self.arrival_date,
            7 => &mut self.birth_date,
            8 => &mut self.location,
            9 => &mut self.special_trimming,
            10 => &mut self.notes,
            11 => &mut self.drugs,
            12 => &mut self.castration_date,
            13 => &mut self.deworming_date,
            14 => &mut self.source,
            15 => &mut self.status,
            16 => &mut self.friends,
            _ => &mut self.assigned_caregivers,
        }
    }

    /// Decode a roster row using the sheet's header labels.
    pub fn from_row(sheet: &SheetData, row: &Row) -> Self {
        let mut animal = Self::default();
        for (index, (_, _, header)) in FIELDS.iter().enumerate() {
            if let Some(column) = sheet.column_of(header) {
                *animal.field_mut(index) = row.cell(column).to_text();
            }
        }
        animal
    }

    /// Encode aligned to `header`; unknown columns stay blank.
    pub fn to_cells(&self, header: &[String]) -> Vec<CellValue> {
        header
            .iter()
            .map(|label| {
                FIELDS
                    .iter()
                    .position(|(_, _, h)| *h == label.trim())
                    .map(|index| CellValue::text(self.field(index)))
                    .unwrap_or_default()
            })
            .collect()
    }

    /// Trimmed names from [`Animal::assigned_caregivers`].
    pub fn caregivers(&self) -> impl Iterator<Item = &str> {
        self.assigned_caregivers
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }

    /// Exact membership test on the assigned caregivers.
    pub fn is_assigned_to(&self, caregiver: &str) -> bool {
        let caregiver = caregiver.trim();
        self.caregivers().any(|name| name == caregiver)
    }

    /// Fragment used to locate the animal's treatment sheet.
    pub fn sheet_search_key(&self) -> &str {
        let chip = self.chip_id.trim();
        if chip.is_empty() {
            self.name.trim()
        } else {
            chip
        }
    }

    /// File name of a newly provisioned treatment sheet.
    pub fn treatment_sheet_name(&self) -> String {
        format!("{} {}", self.name.trim(), self.chip_id.trim())
            .trim()
            .to_string()
    }
}

/// Every animal on a roster, in sheet order.
pub async fn list_animals(store: &dyn SheetStore, roster: &DocumentId) -> Result<Vec<Animal>> {
    let sheet = store.read_sheet(roster).await?;
    Ok(sheet
        .rows
        .iter()
        .map(|row| Animal::from_row(&sheet, row))
        .collect())
}

fn find_row<'a>(sheet: &'a SheetData, name: &str) -> Result<Option<&'a Row>> {
    let column = sheet.column_of(NAME_HEADER).ok_or_else(|| {
        CareError::Configuration(format!("roster has no '{}' column", NAME_HEADER))
    })?;
    let name = name.trim();
    Ok(sheet
        .rows
        .iter()
        .find(|row| row.cell(column).to_text().trim() == name))
}

/// First animal whose trimmed name matches.
pub async fn find_animal(
    store: &dyn SheetStore,
    roster: &DocumentId,
    name: &str,
) -> Result<Option<Animal>> {
    let sheet = store.read_sheet(roster).await?;
    Ok(find_row(&sheet, name)?.map(|row| Animal::from_row(&sheet, row)))
}

/// Append an animal after the last roster row.
pub async fn append_animal(store: &dyn SheetStore, roster: &DocumentId, animal: &Animal) -> Result<()> {
    let sheet = store.read_sheet(roster).await?;
    store
        .append_row(roster, animal.to_cells(&sheet.header), ValueInput::UserEntered)
        .await?;
    info!(roster = %roster, animal = %animal.name, "Appended animal");
    Ok(())
}

fn patch_cell(value: &Value) -> CellValue {
    match value {
        Value::String(s) => CellValue::text(s.as_str()),
        other => CellValue::from(other),
    }
}

/// Rewrite named columns of the first roster row called `name`.
///
/// Keys are mapped through the field table; unknown keys and keys whose
/// column is missing from the roster are skipped with a warning. Returns the
/// number of cells written.
pub async fn update_animal(
    store: &dyn SheetStore,
    roster: &DocumentId,
    name: &str,
    patch: &serde_json::Map<String, Value>,
) -> Result<usize> {
    let sheet = store.read_sheet(roster).await?;
    let row = find_row(&sheet, name)?.ok_or_else(|| CareError::not_found("animal", name))?;

    let mut written = 0;
    for (key, value) in patch {
        let Some(header) = header_for(key) else {
            warn!(roster = %roster, key = %key, "No roster column for field; skipping");
            continue;
        };
        let Some(column) = sheet.column_of(header) else {
            warn!(roster = %roster, key = %key, header, "Roster is missing column; skipping");
            continue;
        };
        store
            .update_cell(roster, row.position, column, patch_cell(value), ValueInput::UserEntered)
            .await?;
        written += 1;
    }

    info!(roster = %roster, animal = %name.trim(), cells = written, "Updated animal");
    Ok(written)
}

/// Result of [`add_animal`]: the roster append always succeeded, the sheet
/// provisioning may not have.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddAnimalOutcome {
    pub success: bool,
    pub animal: Animal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub treatment_sheet_id: Option<DocumentId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub treatment_sheet_error: Option<String>,
}

/// Append an animal, then provision its treatment sheet in `folder`.
///
/// A failed append is an error. A failed provisioning is reported in the
/// outcome so the caller can retry just that half.
pub async fn add_animal(
    store: &dyn SheetStore,
    locator: &dyn DocumentLocator,
    roster: &DocumentId,
    folder: Option<&str>,
    animal: Animal,
) -> Result<AddAnimalOutcome> {
    if animal.name.trim().is_empty() {
        return Err(CareError::InvalidInput("animal name is required".to_string()));
    }
    append_animal(store, roster, &animal).await?;

    let provisioned = match folder {
        Some(folder) => provision_sheet(store, locator, folder, &animal).await,
        None => Err(CareError::Configuration(
            "no treatment folder configured for this animal type".to_string(),
        )),
    };

    let (treatment_sheet_id, treatment_sheet_error) = match provisioned {
        Ok(id) => (Some(id), None),
        Err(e) => {
            warn!(animal = %animal.name, "Treatment sheet not created: {}", e);
            (None, Some(e.to_string()))
        }
    };

    Ok(AddAnimalOutcome {
        success: true,
        animal,
        treatment_sheet_id,
        treatment_sheet_error,
    })
}

async fn provision_sheet(
    store: &dyn SheetStore,
    locator: &dyn DocumentLocator,
    folder: &str,
    animal: &Animal,
) -> Result<DocumentId> {
    let info = locator
        .create_spreadsheet(folder, &animal.treatment_sheet_name())
        .await?;
    let header = TREATMENT_HEADER.iter().map(|h| CellValue::text(*h)).collect();
    store
        .write_rows(&info.id, 0, vec![header], ValueInput::Raw)
        .await?;
    info!(animal = %animal.name, document = %info.id, "Provisioned treatment sheet");
    Ok(info.id)
}
