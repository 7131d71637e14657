//! VE.Direct Field Catalog
//!
//! Static table of every text-protocol field emitted by BMV battery monitors,
//! MPPT solar chargers and Phoenix inverters, with its canonical name, unit
//! and decode rule.

use serde::{Deserialize, Serialize};

/// Unit of a decoded value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Unit {
    /// Dimensionless, text or coded value
    None,
    MilliVolt,
    MilliAmp,
    MilliAmpHour,
    Watt,
    VoltAmp,
    Volt,
    Amp,
    KiloWattHour,
    Percent,
    Celsius,
    Minutes,
    Seconds,
}

impl Unit {
    /// Short unit symbol
    pub fn symbol(&self) -> &'static str {
        match self {
            Unit::None => "",
            Unit::MilliVolt => "mV",
            Unit::MilliAmp => "mA",
            Unit::MilliAmpHour => "mAh",
            Unit::Watt => "W",
            Unit::VoltAmp => "VA",
            Unit::Volt => "V",
            Unit::Amp => "A",
            Unit::KiloWattHour => "kWh",
            Unit::Percent => "%",
            Unit::Celsius => "°C",
            Unit::Minutes => "Mins",
            Unit::Seconds => "Secs",
        }
    }

    /// Human readable rendering, converting milli-units to their base unit
    pub fn display(&self, value: f64) -> String {
        match self {
            Unit::None => format!("{}", value),
            Unit::MilliVolt => format!("{:.2} V", value / 1000.0),
            Unit::MilliAmp => format!("{:.2} A", value / 1000.0),
            Unit::MilliAmpHour => format!("{:.2} Ah", value / 1000.0),
            Unit::KiloWattHour => format!("{:.2} kWh", value),
            Unit::Volt | Unit::Amp => format!("{:.2} {}", value, self.symbol()),
            Unit::Percent => format!("{:.1} %", value),
            _ => format!("{:.0} {}", value, self.symbol()),
        }
    }
}

/// Code-to-text translation table
#[derive(Debug, PartialEq)]
pub struct LookupTable {
    pub name: &'static str,
    pub entries: &'static [(i64, &'static str)],
}

impl LookupTable {
    pub fn get(&self, code: i64) -> Option<&'static str> {
        self.entries
            .iter()
            .find(|(c, _)| *c == code)
            .map(|(_, text)| *text)
    }
}

/// How a raw field string becomes a typed value
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Decode {
    /// Signed decimal integer
    Int,
    /// Integer whose literal selects its base (`0x`, `0o`, `0b` or decimal)
    AutoBaseInt,
    /// Passed through unchanged
    Text,
    /// Integer multiplied by the factor, yielding a float in the descriptor's unit
    ScaledFloat(f64),
    /// Integer code translated through a table
    Lookup(&'static LookupTable),
}

/// Catalog entry for one field key
#[derive(Debug, PartialEq)]
pub struct FieldDescriptor {
    /// Key as it appears on the wire
    pub key: &'static str,
    /// Canonical camelCase name
    pub name: &'static str,
    /// Unit of the decoded value
    pub unit: Unit,
    pub decode: Decode,
    /// Factor from the decoded unit to the SI base unit, when they differ
    pub scale: Option<f64>,
}

/// Device operating state (`CS`)
pub static DEVICE_STATE: LookupTable = LookupTable {
    name: "device state",
    entries: &[
        (0, "Off"),
        (1, "Low power"),
        (2, "Fault"),
        (3, "Bulk"),
        (4, "Absorption"),
        (5, "Float"),
        (6, "Storage"),
        (7, "Equalize (manual)"),
        (9, "Inverting"),
        (11, "Power supply"),
        (245, "Starting-up"),
        (246, "Repeated absorption"),
        (247, "Auto equalize / Recondition"),
        (248, "BatterySafe"),
        (252, "External Control"),
    ],
};

/// Charger error codes (`ERR`)
pub static ERROR_CODE: LookupTable = LookupTable {
    name: "error code",
    entries: &[
        (0, "No error"),
        (2, "Battery voltage too high"),
        (17, "Charger temperature too high"),
        (18, "Charger over current"),
        (19, "Charger current reversed"),
        (20, "Bulk time limit exceeded"),
        (21, "Current sensor issue (sensor bias/sensor broken)"),
        (26, "Terminals overheated"),
        (33, "Input voltage too high (solar panel)"),
        (34, "Input current too high (solar panel)"),
        (38, "Input shutdown (due to excessive battery voltage)"),
        (116, "Factory calibration data lost"),
        (117, "Invalid/incompatible firmware"),
        (119, "User settings invalid"),
    ],
};

/// MPPT tracker operation mode (`MPPT`)
pub static TRACKER_MODE: LookupTable = LookupTable {
    name: "tracker mode",
    entries: &[
        (0, "Off"),
        (1, "Voltage or current limited"),
        (2, "MPPT Tracker active"),
    ],
};

const fn field(
    key: &'static str,
    name: &'static str,
    unit: Unit,
    decode: Decode,
    scale: Option<f64>,
) -> FieldDescriptor {
    FieldDescriptor {
        key,
        name,
        unit,
        decode,
        scale,
    }
}

const MILLI: Option<f64> = Some(0.001);

/// All known VE.Direct text fields
pub static CATALOG: &[FieldDescriptor] = &[
    // Voltages and currents
    field("V", "batteryVoltage", Unit::MilliVolt, Decode::Int, MILLI),
    field("V2", "batteryVoltage2", Unit::MilliVolt, Decode::Int, MILLI),
    field("V3", "batteryVoltage3", Unit::MilliVolt, Decode::Int, MILLI),
    field("VS", "auxVoltage", Unit::MilliVolt, Decode::Int, MILLI),
    field("VM", "midPointVoltage", Unit::MilliVolt, Decode::Int, MILLI),
    field("DM", "midPointDeviation", Unit::Percent, Decode::ScaledFloat(0.1), None),
    field("VPV", "panelVoltage", Unit::MilliVolt, Decode::Int, MILLI),
    field("PPV", "panelPower", Unit::Watt, Decode::Int, None),
    field("I", "current", Unit::MilliAmp, Decode::Int, MILLI),
    field("I2", "current2", Unit::MilliAmp, Decode::Int, MILLI),
    field("I3", "current3", Unit::MilliAmp, Decode::Int, MILLI),
    field("IL", "loadCurrent", Unit::MilliAmp, Decode::Int, MILLI),
    field("LOAD", "load", Unit::None, Decode::Text, None),
    field("T", "batteryTemperature", Unit::Celsius, Decode::Int, None),
    field("P", "instantaneousPower", Unit::Watt, Decode::Int, None),
    field("CE", "consumedAmpHours", Unit::MilliAmpHour, Decode::Int, MILLI),
    field("SOC", "stateOfCharge", Unit::Percent, Decode::ScaledFloat(0.1), None),
    field("TTG", "timeToGo", Unit::Minutes, Decode::Int, Some(60.0)),
    field("Alarm", "alarm", Unit::None, Decode::Text, None),
    field("Relay", "relay", Unit::None, Decode::Text, None),
    field("AR", "alarmReason", Unit::None, Decode::AutoBaseInt, None),
    field("OR", "offReason", Unit::None, Decode::AutoBaseInt, None),
    // History
    field("H1", "deepestDischarge", Unit::MilliAmpHour, Decode::Int, MILLI),
    field("H2", "lastDischarge", Unit::MilliAmpHour, Decode::Int, MILLI),
    field("H3", "averageDischarge", Unit::MilliAmpHour, Decode::Int, MILLI),
    field("H4", "chargeCycles", Unit::None, Decode::Int, None),
    field("H5", "fullDischarges", Unit::None, Decode::Int, None),
    field("H6", "cumulativeAmpHours", Unit::MilliAmpHour, Decode::Int, MILLI),
    field("H7", "minimumBatteryVoltage", Unit::MilliVolt, Decode::Int, MILLI),
    field("H8", "maximumBatteryVoltage", Unit::MilliVolt, Decode::Int, MILLI),
    field("H9", "secondsSinceFullCharge", Unit::Seconds, Decode::Int, None),
    field("H10", "automaticSyncs", Unit::None, Decode::AutoBaseInt, None),
    field("H11", "lowVoltageAlarms", Unit::None, Decode::AutoBaseInt, None),
    field("H12", "highVoltageAlarms", Unit::None, Decode::AutoBaseInt, None),
    field("H13", "lowAuxVoltageAlarms", Unit::None, Decode::AutoBaseInt, None),
    field("H14", "highAuxVoltageAlarms", Unit::None, Decode::AutoBaseInt, None),
    field("H15", "minimumAuxVoltage", Unit::MilliVolt, Decode::Int, MILLI),
    field("H16", "maximumAuxVoltage", Unit::MilliVolt, Decode::Int, MILLI),
    field("H17", "dischargedEnergy", Unit::KiloWattHour, Decode::ScaledFloat(0.01), None),
    field("H18", "chargedEnergy", Unit::KiloWattHour, Decode::ScaledFloat(0.01), None),
    field("H19", "yieldTotal", Unit::KiloWattHour, Decode::ScaledFloat(0.01), None),
    field("H20", "yieldToday", Unit::KiloWattHour, Decode::ScaledFloat(0.01), None),
    field("H21", "maximumPowerToday", Unit::Watt, Decode::Int, None),
    field("H22", "yieldYesterday", Unit::KiloWattHour, Decode::ScaledFloat(0.01), None),
    field("H23", "maximumPowerYesterday", Unit::Watt, Decode::Int, None),
    // Device status and identity
    field("ERR", "error", Unit::None, Decode::Lookup(&ERROR_CODE), None),
    field("CS", "mode", Unit::None, Decode::Lookup(&DEVICE_STATE), None),
    field("BMV", "modelDescription", Unit::None, Decode::Text, None),
    field("FW", "firmwareVersion", Unit::None, Decode::Text, None),
    field("FWE", "firmwareVersionExtended", Unit::None, Decode::Text, None),
    field("PID", "productId", Unit::None, Decode::Text, None),
    field("SER#", "serialNumber", Unit::None, Decode::Text, None),
    field("HSDS", "daySequenceNumber", Unit::None, Decode::AutoBaseInt, None),
    field("MODE", "deviceMode", Unit::None, Decode::AutoBaseInt, None),
    field("AC_OUT_V", "acOutputVoltage", Unit::Volt, Decode::ScaledFloat(0.01), None),
    field("AC_OUT_I", "acOutputCurrent", Unit::Amp, Decode::ScaledFloat(0.1), None),
    field("AC_OUT_S", "acOutputApparentPower", Unit::VoltAmp, Decode::Int, None),
    field("WARN", "warningReason", Unit::None, Decode::AutoBaseInt, None),
    field("MPPT", "trackerMode", Unit::None, Decode::Lookup(&TRACKER_MODE), None),
];

/// Find the descriptor for a wire key
pub fn lookup(key: &str) -> Option<&'static FieldDescriptor> {
    CATALOG.iter().find(|d| d.key == key)
}

/// Find the descriptor for a canonical name
pub fn lookup_by_name(name: &str) -> Option<&'static FieldDescriptor> {
    CATALOG.iter().find(|d| d.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_keys_and_names_unique() {
        let keys: HashSet<_> = CATALOG.iter().map(|d| d.key).collect();
        let names: HashSet<_> = CATALOG.iter().map(|d| d.name).collect();
        assert_eq!(keys.len(), CATALOG.len());
        assert_eq!(names.len(), CATALOG.len());
    }

    #[test]
    fn test_lookup() {
        let v = lookup("V").unwrap();
        assert_eq!(v.name, "batteryVoltage");
        assert_eq!(v.unit, Unit::MilliVolt);
        assert_eq!(v.decode, Decode::Int);
        assert!(lookup("Checksum").is_none());
        assert_eq!(lookup_by_name("serialNumber").unwrap().key, "SER#");
    }

    #[test]
    fn test_device_state_table() {
        assert_eq!(DEVICE_STATE.get(3), Some("Bulk"));
        assert_eq!(DEVICE_STATE.get(5), Some("Float"));
        assert_eq!(DEVICE_STATE.get(8), None);
    }

    #[test]
    fn test_unit_display() {
        assert_eq!(Unit::MilliVolt.display(12800.0), "12.80 V");
        assert_eq!(Unit::Percent.display(87.6), "87.6 %");
        assert_eq!(Unit::Watt.display(130.0), "130 W");
    }
}
