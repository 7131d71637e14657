//! Emulated device models and their sample telemetry

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use vedirect_protocol::RawRecord;

/// Device families the emulator can impersonate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeviceModel {
    /// Every field of every family in one frame
    All,
    /// BMV-600 battery monitor
    #[serde(rename = "BMV_600")]
    Bmv600,
    /// BMV-700 battery monitor
    #[serde(rename = "BMV_700")]
    Bmv700,
    /// BlueSolar / SmartSolar MPPT charge controller
    Mppt,
    /// Phoenix inverter
    PhxInverter,
}

/// Unrecognized model name
#[derive(Debug, Error)]
#[error("Unknown device model {0:?}, expected one of ALL, BMV_600, BMV_700, MPPT, PHX_INVERTER")]
pub struct ParseModelError(String);

const ALL_FIELDS: &[(&str, &str)] = &[
    ("V", "12800"), ("VS", "12800"), ("VM", "1280"), ("DM", "120"),
    ("VPV", "3350"), ("PPV", "130"), ("I", "15000"), ("IL", "1500"),
    ("LOAD", "ON"), ("T", "25"), ("P", "130"), ("CE", "13500"),
    ("SOC", "876"), ("TTG", "45"), ("Alarm", "OFF"), ("Relay", "OFF"),
    ("AR", "1"), ("H1", "55000"), ("H2", "15000"), ("H3", "13000"),
    ("H4", "230"), ("H5", "12"), ("H6", "234000"), ("H7", "11000"),
    ("H8", "14800"), ("H9", "7200"), ("H10", "45"), ("H11", "5"),
    ("H12", "0"), ("H13", "0"), ("H14", "0"), ("H15", "11500"),
    ("H16", "14800"), ("H17", "34"), ("H18", "45"), ("H19", "456"),
    ("H20", "45"), ("H21", "300"), ("H22", "45"), ("H23", "350"),
    ("ERR", "0"), ("CS", "5"), ("BMV", "702"), ("FW", "1.19"),
    ("PID", "0x204"), ("SER#", "HQ141112345"), ("HSDS", "0"),
    ("MODE", "2"), ("AC_OUT_V", "23000"), ("AC_OUT_I", "50"), ("WARN", "1"),
];

const BMV_600_FIELDS: &[(&str, &str)] = &[
    ("V", "12800"), ("VS", "12800"), ("I", "15000"), ("CE", "13500"),
    ("SOC", "876"), ("TTG", "45"), ("Alarm", "OFF"), ("Relay", "OFF"),
    ("AR", "1"), ("H1", "55000"), ("H2", "15000"), ("H3", "13000"),
    ("H4", "230"), ("H5", "12"), ("H6", "234000"), ("H7", "11000"),
    ("H8", "14800"), ("H9", "7200"), ("H10", "45"), ("H11", "5"),
    ("H12", "0"), ("H13", "0"), ("H14", "0"), ("H15", "11500"),
    ("H16", "14800"), ("BMV", "702"), ("FW", "1.19"),
];

const BMV_700_FIELDS: &[(&str, &str)] = &[
    ("V", "12800"), ("VS", "12800"), ("VM", "1280"), ("DM", "120"),
    ("I", "15000"), ("T", "25"), ("P", "130"), ("CE", "13500"),
    ("SOC", "876"), ("TTG", "45"), ("Alarm", "OFF"), ("Relay", "OFF"),
    ("AR", "1"), ("H1", "55000"), ("H2", "15000"), ("H3", "13000"),
    ("H4", "230"), ("H5", "12"), ("H6", "234000"), ("H7", "11000"),
    ("H8", "14800"), ("H9", "7200"), ("H10", "45"), ("H11", "5"),
    ("H12", "0"), ("H15", "11500"), ("H16", "14800"), ("H17", "34"),
    ("H18", "45"), ("BMV", "702"), ("FW", "1.19"), ("PID", "0x204"),
];

const MPPT_FIELDS: &[(&str, &str)] = &[
    ("V", "12800"), ("VPV", "3350"), ("PPV", "130"), ("I", "15000"),
    ("IL", "1500"), ("LOAD", "ON"), ("Relay", "OFF"), ("H19", "456"),
    ("H20", "45"), ("H21", "300"), ("H22", "45"), ("H23", "350"),
    ("ERR", "0"), ("CS", "5"), ("FW", "1.19"), ("PID", "0xA042"),
    ("SER#", "HQ141112345"), ("HSDS", "0"),
];

const PHX_INVERTER_FIELDS: &[(&str, &str)] = &[
    ("AR", "1"), ("CS", "5"), ("FW", "1.19"), ("PID", "0xA201"),
    ("SER#", "HQ141112345"), ("MODE", "2"), ("AC_OUT_V", "23000"),
    ("AC_OUT_I", "50"), ("WARN", "1"),
];

impl DeviceModel {
    pub const ALL_MODELS: [DeviceModel; 5] = [
        DeviceModel::All,
        DeviceModel::Bmv600,
        DeviceModel::Bmv700,
        DeviceModel::Mppt,
        DeviceModel::PhxInverter,
    ];

    /// Wire name of the model
    pub fn name(&self) -> &'static str {
        match self {
            DeviceModel::All => "ALL",
            DeviceModel::Bmv600 => "BMV_600",
            DeviceModel::Bmv700 => "BMV_700",
            DeviceModel::Mppt => "MPPT",
            DeviceModel::PhxInverter => "PHX_INVERTER",
        }
    }

    /// Fields the model reports, in transmission order
    pub fn sample_fields(&self) -> &'static [(&'static str, &'static str)] {
        match self {
            DeviceModel::All => ALL_FIELDS,
            DeviceModel::Bmv600 => BMV_600_FIELDS,
            DeviceModel::Bmv700 => BMV_700_FIELDS,
            DeviceModel::Mppt => MPPT_FIELDS,
            DeviceModel::PhxInverter => PHX_INVERTER_FIELDS,
        }
    }

    pub fn sample_record(&self) -> RawRecord {
        self.sample_fields().iter().copied().collect()
    }
}

impl Default for DeviceModel {
    fn default() -> Self {
        DeviceModel::All
    }
}

impl fmt::Display for DeviceModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DeviceModel {
    type Err = ParseModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DeviceModel::ALL_MODELS
            .into_iter()
            .find(|m| m.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseModelError(s.to_string()))
    }
}
