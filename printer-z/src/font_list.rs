//! Font list, answered by `{FN?}`.
//!
//! The response carries one `F:<id>,<location>[,<name>]` entry per font,
//! resident and downloaded, optionally announced by `N:<count>`:
//!
//! ```text
//! {FN!N:2;F:50,R,Sans 10pt;F:MF204,D,Custom}
//! ```
//!
//! `{FN!N:0}` reports a printer with no fonts; `{FN!}` reports nothing at all,
//! which leaves the fonts parameter absent.

use printer_z_query::Response;
use serde::Serialize;

use crate::{
    decode,
    error::ParseError,
    font::FontData,
    query::QueryId,
    state::{ParameterDecoder, PrinterState},
};

pub const COUNT_KEY: &str = "N";
pub const FONT_KEY: &str = "F";

/// View over the `{FN?}` response.
pub type FontList = PrinterState<FontListFields>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FontListFields {
    fonts: Option<Vec<FontData>>,
}

impl FontListFields {
    /// Fonts loaded in the printer, in the order the printer listed them.
    /// `None` when the last response did not report them.
    pub fn fonts(&self) -> Option<&[FontData]> {
        self.fonts.as_deref()
    }

    /// Whether the fonts parameter is supported and was reported. Check this
    /// before trusting [`fonts_or_empty`](Self::fonts_or_empty).
    pub fn fonts_is_present(&self) -> bool {
        self.fonts.is_some()
    }

    /// The reported fonts, or an empty slice when absent.
    pub fn fonts_or_empty(&self) -> &[FontData] {
        self.fonts.as_deref().unwrap_or_default()
    }
}

impl ParameterDecoder for FontListFields {
    const QUERY: QueryId = QueryId::FontList;

    fn try_update(response: &Response) -> Result<Self, ParseError> {
        Ok(Self {
            fonts: decode::counted_list(response, COUNT_KEY, FONT_KEY, FontData::from_entry)?,
        })
    }

    fn has_any(&self) -> bool {
        self.fonts.is_some()
    }
}
