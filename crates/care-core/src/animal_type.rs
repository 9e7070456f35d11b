//! Animal types and the per-type document catalogue.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sheet_core::DocumentId;

use crate::error::CareError;

/// A species tracked by the facility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AnimalType {
    Donkey,
    Horse,
    Cow,
    Dog,
    Cat,
    Goat,
    Rabbit,
    Chicken,
    Pig,
}

impl AnimalType {
    /// Every type, in board order.
    pub const ALL: [AnimalType; 9] = [
        Self::Donkey,
        Self::Horse,
        Self::Cow,
        Self::Dog,
        Self::Cat,
        Self::Goat,
        Self::Rabbit,
        Self::Chicken,
        Self::Pig,
    ];

    /// Stable English key used in URLs.
    pub fn key(&self) -> &'static str {
        match self {
            Self::Donkey => "donkey",
            Self::Horse => "horse",
            Self::Cow => "cow",
            Self::Dog => "dog",
            Self::Cat => "cat",
            Self::Goat => "goat",
            Self::Rabbit => "rabbit",
            Self::Chicken => "chicken",
            Self::Pig => "pig",
        }
    }

    /// Hebrew display label, also used in the protocol table.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Donkey => "חמור",
            Self::Horse => "סוס",
            Self::Cow => "פרה",
            Self::Dog => "כלב",
            Self::Cat => "חתול",
            Self::Goat => "עז",
            Self::Rabbit => "ארנב",
            Self::Chicken => "עופות",
            Self::Pig => "חזיר",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            Self::Donkey => "🫏",
            Self::Horse => "🐴",
            Self::Cow => "🐄",
            Self::Dog => "🐕",
            Self::Cat => "🐈",
            Self::Goat => "🐐",
            Self::Rabbit => "🐰",
            Self::Chicken => "🐔",
            Self::Pig => "🐖",
        }
    }

    /// Setting key of the roster spreadsheet, e.g. `DONKEYS_SHEET_ID`.
    pub fn roster_key(&self) -> String {
        format!("{}S_SHEET_ID", self.key().to_ascii_uppercase())
    }

    /// Setting key of the treatment folder, e.g. `DONKEYS_DRIVE_FOLDER_ID`.
    pub fn folder_key(&self) -> String {
        format!("{}S_DRIVE_FOLDER_ID", self.key().to_ascii_uppercase())
    }

    /// Resolve an English key or a Hebrew label.
    pub fn resolve(input: &str) -> Option<Self> {
        let input = input.trim();
        Self::ALL
            .into_iter()
            .find(|t| t.key().eq_ignore_ascii_case(input) || t.label() == input)
    }
}

impl fmt::Display for AnimalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for AnimalType {
    type Err = CareError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::resolve(s).ok_or_else(|| CareError::InvalidInput(format!("unknown animal type: {}", s)))
    }
}

impl Serialize for AnimalType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.key())
    }
}

impl<'de> Deserialize<'de> for AnimalType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::resolve(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown animal type: {}", raw)))
    }
}

/// Catalogue entry returned by `GET /treatments`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeSummary {
    pub id: AnimalType,
    pub display_name: &'static str,
    pub emoji: &'static str,
}

impl From<AnimalType> for TypeSummary {
    fn from(kind: AnimalType) -> Self {
        Self {
            id: kind,
            display_name: kind.label(),
            emoji: kind.emoji(),
        }
    }
}

/// Documents configured for one type.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TypeSources {
    /// Roster spreadsheet.
    pub roster: Option<DocumentId>,
    /// Drive folder holding one treatment spreadsheet per animal.
    pub folder: Option<String>,
}

/// Per-type roster and folder IDs, built once from settings.
#[derive(Debug, Clone, Default)]
pub struct TypeCatalog {
    sources: HashMap<AnimalType, TypeSources>,
}

impl TypeCatalog {
    /// Build from a settings lookup; blank values count as missing.
    pub fn from_lookup<'a>(lookup: impl Fn(&str) -> Option<&'a str>) -> Self {
        let present = |key: String| {
            lookup(&key)
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };
        let sources = AnimalType::ALL
            .into_iter()
            .map(|kind| {
                let entry = TypeSources {
                    roster: present(kind.roster_key()).map(DocumentId::new),
                    folder: present(kind.folder_key()),
                };
                (kind, entry)
            })
            .collect();
        Self { sources }
    }

    /// Sources of one type (empty if nothing is configured).
    pub fn sources(&self, kind: AnimalType) -> TypeSources {
        self.sources.get(&kind).cloned().unwrap_or_default()
    }

    /// Roster document, or a configuration error naming the missing key.
    pub fn roster(&self, kind: AnimalType) -> crate::Result<DocumentId> {
        self.sources(kind).roster.ok_or_else(|| {
            CareError::Configuration(format!(
                "no roster sheet for {}; set {}",
                kind,
                kind.roster_key()
            ))
        })
    }

    /// Treatment folder, or a configuration error naming the missing key.
    pub fn folder(&self, kind: AnimalType) -> crate::Result<String> {
        self.sources(kind).folder.ok_or_else(|| {
            CareError::Configuration(format!(
                "no treatment folder for {}; set {}",
                kind,
                kind.folder_key()
            ))
        })
    }

    /// Types with a treatment folder, in board order.
    pub fn with_folders(&self) -> Vec<(AnimalType, String)> {
        AnimalType::ALL
            .into_iter()
            .filter_map(|kind| self.sources(kind).folder.map(|f| (kind, f)))
            .collect()
    }

    /// Types with a roster sheet, in board order.
    pub fn with_rosters(&self) -> Vec<(AnimalType, DocumentId)> {
        AnimalType::ALL
            .into_iter()
            .filter_map(|kind| self.sources(kind).roster.map(|r| (kind, r)))
            .collect()
    }
}
