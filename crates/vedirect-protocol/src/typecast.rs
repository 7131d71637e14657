//! Field typing: raw record strings to unit-tagged values

use crate::catalog::{self, Decode, FieldDescriptor};
use crate::error::VeDirectError;
use crate::record::{RawRecord, TypedField, TypedRecord, Value};
use tracing::warn;

/// Decode every catalogued field of a raw record
///
/// Fields without a catalog entry are skipped with a warning. A lookup miss or
/// an unparseable number in a catalogued field fails the whole record.
pub fn typecast(raw: &RawRecord) -> Result<TypedRecord, VeDirectError> {
    let mut typed = TypedRecord::new();
    for (key, value) in raw.iter() {
        let Some(descriptor) = catalog::lookup(key) else {
            warn!("Got unknown VE.Direct key: {}, skipping", key);
            continue;
        };
        typed.push(TypedField {
            key: key.to_string(),
            name: descriptor.name,
            unit: descriptor.unit,
            value: decode_value(descriptor, value)?,
        });
    }
    Ok(typed)
}

/// Apply a descriptor's decode rule to one raw value
pub fn decode_value(descriptor: &FieldDescriptor, raw: &str) -> Result<Value, VeDirectError> {
    let invalid = || VeDirectError::InvalidValue {
        key: descriptor.key.to_string(),
        value: raw.to_string(),
    };

    match descriptor.decode {
        Decode::Int => raw.trim().parse::<i64>().map(Value::Int).map_err(|_| invalid()),
        Decode::AutoBaseInt => parse_auto_base(raw).map(Value::Int).ok_or_else(invalid),
        Decode::Text => Ok(Value::Text(raw.to_string())),
        Decode::ScaledFloat(factor) => raw
            .trim()
            .parse::<i64>()
            .map(|v| Value::Float(v as f64 * factor))
            .map_err(|_| invalid()),
        Decode::Lookup(table) => {
            let code = parse_auto_base(raw).ok_or_else(invalid)?;
            table
                .get(code)
                .map(|text| Value::Text(text.to_string()))
                .ok_or_else(|| VeDirectError::UnknownCode {
                    key: descriptor.key.to_string(),
                    code: raw.to_string(),
                })
        }
    }
}

/// Parse an integer literal whose prefix selects the base
///
/// Accepts an optional sign followed by `0x`/`0X` (hex), `0o` (octal),
/// `0b` (binary) or plain decimal digits.
pub fn parse_auto_base(literal: &str) -> Option<i64> {
    let literal = literal.trim();
    let (negative, digits) = match literal.as_bytes().first()? {
        b'-' => (true, &literal[1..]),
        b'+' => (false, &literal[1..]),
        _ => (false, literal),
    };

    let (radix, digits) = match digits.get(..2) {
        Some("0x") | Some("0X") => (16, &digits[2..]),
        Some("0o") | Some("0O") => (8, &digits[2..]),
        Some("0b") | Some("0B") => (2, &digits[2..]),
        _ => (10, digits),
    };
    if digits.is_empty() || digits.starts_with(['+', '-']) {
        return None;
    }

    let magnitude = i64::from_str_radix(digits, radix).ok()?;
    Some(if negative { -magnitude } else { magnitude })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(fields: &[(&str, &str)]) -> RawRecord {
        fields.iter().copied().collect()
    }

    #[test]
    fn test_solar_charger_record() {
        let typed = typecast(&raw(&[("V", "12800"), ("PPV", "130"), ("CS", "3")])).unwrap();
        assert_eq!(typed.get_by_name("batteryVoltage"), Some(&Value::Int(12800)));
        assert_eq!(typed.get_by_name("panelPower"), Some(&Value::Int(130)));
        assert_eq!(typed.get_by_name("mode"), Some(&Value::Text("Bulk".into())));

        let typed = typecast(&raw(&[("CS", "5")])).unwrap();
        assert_eq!(typed.get("CS"), Some(&Value::Text("Float".into())));
    }

    #[test]
    fn test_scaled_fields() {
        let typed = typecast(&raw(&[("SOC", "876"), ("H20", "45"), ("AC_OUT_V", "23000")])).unwrap();
        let soc = typed.get("SOC").and_then(Value::as_f64).unwrap();
        assert!((soc - 87.6).abs() < 1e-9);
        let yield_today = typed.get("H20").and_then(Value::as_f64).unwrap();
        assert!((yield_today - 0.45).abs() < 1e-9);
        let ac_volts = typed.get("AC_OUT_V").and_then(Value::as_f64).unwrap();
        assert!((ac_volts - 230.0).abs() < 1e-9);
    }

    #[test]
    fn test_auto_base_fields() {
        let typed = typecast(&raw(&[("OR", "0x00000001"), ("AR", "4"), ("PID", "0xA042")])).unwrap();
        assert_eq!(typed.get("OR"), Some(&Value::Int(1)));
        assert_eq!(typed.get("AR"), Some(&Value::Int(4)));
        assert_eq!(typed.get("PID"), Some(&Value::Text("0xA042".into())));
    }

    #[test]
    fn test_negative_current() {
        let typed = typecast(&raw(&[("I", "-1500")])).unwrap();
        assert_eq!(typed.get("I"), Some(&Value::Int(-1500)));
    }

    #[test]
    fn test_unknown_key_skipped() {
        let record = raw(&[("V", "12800"), ("XYZ", "1"), ("Checksum", "x")]);
        let typed = typecast(&record).unwrap();
        assert_eq!(typed.len(), 1);
        assert!(typed.get("XYZ").is_none());

        // Re-casting the same raw record repeats the result and never fails on unknown keys
        assert_eq!(typecast(&record).unwrap(), typed);
        let unknown_only = raw(&[("XYZ", "1")]);
        assert!(typecast(&unknown_only).unwrap().is_empty());
        assert!(typecast(&unknown_only).unwrap().is_empty());
    }

    #[test]
    fn test_unknown_code_surfaces() {
        let err = typecast(&raw(&[("CS", "8")])).unwrap_err();
        assert!(matches!(err, VeDirectError::UnknownCode { ref key, ref code } if key == "CS" && code == "8"));
        assert!(err.is_catalog_gap());

        let err = typecast(&raw(&[("ERR", "99")])).unwrap_err();
        assert!(matches!(err, VeDirectError::UnknownCode { .. }));
    }

    #[test]
    fn test_invalid_number_surfaces() {
        let err = typecast(&raw(&[("V", "12.8")])).unwrap_err();
        assert!(matches!(err, VeDirectError::InvalidValue { .. }));
    }

    #[test]
    fn test_parse_auto_base() {
        assert_eq!(parse_auto_base("42"), Some(42));
        assert_eq!(parse_auto_base("0x2A"), Some(42));
        assert_eq!(parse_auto_base("0X2a"), Some(42));
        assert_eq!(parse_auto_base("0o52"), Some(42));
        assert_eq!(parse_auto_base("0b101010"), Some(42));
        assert_eq!(parse_auto_base("-0x10"), Some(-16));
        assert_eq!(parse_auto_base(" 7 "), Some(7));
        assert_eq!(parse_auto_base(""), None);
        assert_eq!(parse_auto_base("0x"), None);
        assert_eq!(parse_auto_base("--1"), None);
        assert_eq!(parse_auto_base("ON"), None);
    }
}
