use strum::IntoEnumIterator;

/// Status queries understood by this crate, keyed by their two-letter code.
#[derive(
    Debug,
    Hash,
    Eq,
    PartialEq,
    Clone,
    Copy,
    strum::EnumString,
    strum::Display,
    strum::EnumIter,
    strum::IntoStaticStr,
)]
#[strum(ascii_case_insensitive)]
pub enum QueryId {
    #[strum(serialize = "FN")]
    FontList,
    #[strum(serialize = "FL")]
    FileList,
    #[strum(serialize = "ST")]
    GeneralStatus,
}

impl QueryId {
    pub fn code(self) -> &'static str {
        self.into()
    }

    /// Request text, e.g. `{FN?}`.
    pub fn request(self) -> String {
        format!("{{{}?}}", self.code())
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::FontList => "fonts loaded in the printer, resident and downloaded",
            Self::FileList => "files stored in printer memory",
            Self::GeneralStatus => "paper, latch, battery and printhead condition",
        }
    }

    pub fn all() -> impl Iterator<Item = QueryId> {
        Self::iter()
    }
}
