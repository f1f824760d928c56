//! File list, answered by `{FL?}`: `FILE:<name>,<size>` per stored file,
//! optional `N:<count>`, and `FREE:<bytes>` for the remaining storage.

use printer_z_query::{Entry, Response};
use serde::Serialize;

use crate::{
    decode,
    error::ParseError,
    query::QueryId,
    state::{ParameterDecoder, PrinterState},
    utils::impl_presence_accessors,
};

pub const COUNT_KEY: &str = "N";
pub const FILE_KEY: &str = "FILE";
pub const FREE_KEY: &str = "FREE";

pub type FileList = PrinterState<FileListFields>;

/// One file stored in printer memory.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct FileData {
    pub name: String,
    pub size: u64,
}

impl FileData {
    pub fn new(name: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            size,
        }
    }

    fn from_entry(entry: &Entry) -> Result<Self, ParseError> {
        let invalid = |reason: &str| {
            ParseError::invalid_value(entry.key(), entry.raw_value(), reason)
        };

        let [name, size]: [String; 2] = entry
            .split_value(',', 2)?
            .try_into()
            .map_err(|_| invalid("expected <name>,<size>"))?;
        if name.is_empty() {
            return Err(invalid("missing file name"));
        }
        let size = size
            .parse::<u64>()
            .map_err(|_| invalid("file size must be a byte count"))?;
        Ok(Self { name, size })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FileListFields {
    files: Option<Vec<FileData>>,
    free: Option<u64>,
}

impl FileListFields {
    pub fn files(&self) -> Option<&[FileData]> {
        self.files.as_deref()
    }

    pub fn files_is_present(&self) -> bool {
        self.files.is_some()
    }

    pub fn files_or_empty(&self) -> &[FileData] {
        self.files.as_deref().unwrap_or_default()
    }
}

impl_presence_accessors!(FileListFields {
    /// Free storage in bytes.
    free, free_is_present: u64;
});

impl ParameterDecoder for FileListFields {
    const QUERY: QueryId = QueryId::FileList;

    fn try_update(response: &Response) -> Result<Self, ParseError> {
        Ok(Self {
            files: decode::counted_list(response, COUNT_KEY, FILE_KEY, FileData::from_entry)?,
            free: decode::number(response, FREE_KEY)?,
        })
    }

    fn has_any(&self) -> bool {
        self.files.is_some() || self.free.is_some()
    }
}
