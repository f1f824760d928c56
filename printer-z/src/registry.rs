//! Decoding of any supported query response without naming its view type.

use printer_z_query::{Error as FrameError, Frame, Response, parse_response};
use serde::Serialize;

use crate::{
    error::ParseError,
    file_list::FileListFields,
    font_list::FontListFields,
    general_status::GeneralStatusFields,
    query::QueryId,
    state::ParameterDecoder,
};

/// Fields decoded from one response, tagged by the query that produced them.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "query", content = "fields")]
pub enum DecodedFields {
    #[serde(rename = "FN")]
    FontList(FontListFields),
    #[serde(rename = "FL")]
    FileList(FileListFields),
    #[serde(rename = "ST")]
    GeneralStatus(GeneralStatusFields),
}

impl DecodedFields {
    pub fn query_id(&self) -> QueryId {
        match self {
            Self::FontList(_) => QueryId::FontList,
            Self::FileList(_) => QueryId::FileList,
            Self::GeneralStatus(_) => QueryId::GeneralStatus,
        }
    }

    pub fn has_any(&self) -> bool {
        match self {
            Self::FontList(fields) => fields.has_any(),
            Self::FileList(fields) => fields.has_any(),
            Self::GeneralStatus(fields) => fields.has_any(),
        }
    }
}

pub fn decode_response(query: QueryId, response: &Response) -> Result<DecodedFields, ParseError> {
    Ok(match query {
        QueryId::FontList => DecodedFields::FontList(FontListFields::try_update(response)?),
        QueryId::FileList => DecodedFields::FileList(FileListFields::try_update(response)?),
        QueryId::GeneralStatus => {
            DecodedFields::GeneralStatus(GeneralStatusFields::try_update(response)?)
        }
    })
}

/// Decode raw response text for `query`.
pub fn decode(query: QueryId, text: &str) -> Result<DecodedFields, ParseError> {
    let response = parse_response(text, query.code())?;
    decode_response(query, &response)
}

/// Decode a frame, picking the query from its code.
pub fn decode_frame(frame: &Frame) -> Result<DecodedFields, ParseError> {
    let query = frame
        .code()
        .parse::<QueryId>()
        .map_err(|_| FrameError::InvalidCode(frame.code().to_string()))?;
    decode_response(query, &Response::from_frame(frame)?)
}
