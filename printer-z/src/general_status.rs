//! General status, answered by `{ST?}`.
//!
//! | key | field                 | value     |
//! |-----|-----------------------|-----------|
//! | PO  | paper out             | `0`/`1`   |
//! | LO  | latch open            | `0`/`1`   |
//! | BL  | battery low           | `0`/`1`   |
//! | HT  | head over temperature | `0`/`1`   |
//! | BV  | battery voltage       | volts     |
//!
//! Printers without a battery or sensor simply leave the key out.

use printer_z_query::Response;
use serde::Serialize;

use crate::{
    decode,
    error::ParseError,
    query::QueryId,
    state::{ParameterDecoder, PrinterState},
    utils::impl_presence_accessors,
};

pub type GeneralStatus = PrinterState<GeneralStatusFields>;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GeneralStatusFields {
    paper_out: Option<bool>,
    latch_open: Option<bool>,
    battery_low: Option<bool>,
    head_over_temperature: Option<bool>,
    battery_voltage: Option<f32>,
}

impl_presence_accessors!(GeneralStatusFields {
    paper_out, paper_out_is_present: bool;
    latch_open, latch_open_is_present: bool;
    battery_low, battery_low_is_present: bool;
    head_over_temperature, head_over_temperature_is_present: bool;
    /// Battery voltage in volts.
    battery_voltage, battery_voltage_is_present: f32;
});

impl GeneralStatusFields {
    /// Whether any reported condition prevents printing.
    pub fn has_fault(&self) -> bool {
        [self.paper_out, self.latch_open, self.head_over_temperature]
            .into_iter()
            .any(|flag| flag == Some(true))
    }
}

impl ParameterDecoder for GeneralStatusFields {
    const QUERY: QueryId = QueryId::GeneralStatus;

    fn try_update(response: &Response) -> Result<Self, ParseError> {
        Ok(Self {
            paper_out: decode::flag(response, "PO")?,
            latch_open: decode::flag(response, "LO")?,
            battery_low: decode::flag(response, "BL")?,
            head_over_temperature: decode::flag(response, "HT")?,
            battery_voltage: decode::number(response, "BV")?,
        })
    }

    fn has_any(&self) -> bool {
        self.paper_out.is_some()
            || self.latch_open.is_some()
            || self.battery_low.is_some()
            || self.head_over_temperature.is_some()
            || self.battery_voltage.is_some()
    }
}
