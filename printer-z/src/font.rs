use printer_z_query::Entry;
use serde::Serialize;

use crate::error::ParseError;

/// Where a font lives in the printer.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, strum::EnumString, strum::Display,
)]
pub enum FontLocation {
    /// Built into the firmware.
    #[strum(serialize = "R")]
    Resident,
    /// Loaded into flash or RAM by the host.
    #[strum(serialize = "D")]
    Downloaded,
}

/// One font reported by `{FN?}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct FontData {
    pub id: String,
    pub location: FontLocation,
    pub name: Option<String>,
}

impl FontData {
    pub fn new(id: impl Into<String>, location: FontLocation) -> Self {
        Self {
            id: id.into(),
            location,
            name: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn is_resident(&self) -> bool {
        self.location == FontLocation::Resident
    }

    /// Decode `<id>,<location>[,<name>]`.
    pub(crate) fn from_entry(entry: &Entry) -> Result<Self, ParseError> {
        let invalid = |reason: &str| {
            ParseError::invalid_value(entry.key(), entry.raw_value(), reason)
        };

        let parts = entry.split_value(',', 3)?;
        let mut parts = parts.into_iter();
        let id = parts.next().unwrap_or_default();
        if id.is_empty() {
            return Err(invalid("missing font id"));
        }
        let location = parts
            .next()
            .ok_or_else(|| invalid("missing font location"))?
            .parse::<FontLocation>()
            .map_err(|_| invalid("font location must be R or D"))?;
        let name = parts.next().filter(|name| !name.is_empty());

        Ok(Self { id, location, name })
    }
}
