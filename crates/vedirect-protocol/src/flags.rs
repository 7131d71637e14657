//! Bit-flag words (`AR`, `WARN`, `OR`) expanded to their reason texts

/// Alarm and warning reason bits, shared by `AR` and `WARN`
pub const ALARM_REASONS: &[(u32, &str)] = &[
    (1 << 0, "Low Voltage"),
    (1 << 1, "High Voltage"),
    (1 << 2, "Low SOC"),
    (1 << 3, "Low Starter Voltage"),
    (1 << 4, "High Starter Voltage"),
    (1 << 5, "Low Temperature"),
    (1 << 6, "High Temperature"),
    (1 << 7, "Mid Voltage"),
    (1 << 8, "Overload"),
    (1 << 9, "DC-ripple"),
    (1 << 10, "Low V AC out"),
    (1 << 11, "High V AC out"),
    (1 << 12, "Short Circuit"),
    (1 << 13, "BMS Lockout"),
];

/// Off reason bits of `OR`
pub const OFF_REASONS: &[(u32, &str)] = &[
    (0x001, "No input power"),
    (0x002, "Switched off (power switch)"),
    (0x004, "Switched off (device mode register)"),
    (0x008, "Remote input"),
    (0x010, "Protection active"),
    (0x020, "Paygo"),
    (0x040, "BMS"),
    (0x080, "Engine shutdown detection"),
    (0x100, "Analyzing input voltage"),
];

fn expand(bits: u32, table: &[(u32, &'static str)]) -> Vec<&'static str> {
    table
        .iter()
        .filter(|(mask, _)| bits & mask != 0)
        .map(|(_, text)| *text)
        .collect()
}

/// Reasons set in an `AR` or `WARN` word, lowest bit first
pub fn alarm_reasons(bits: u32) -> Vec<&'static str> {
    expand(bits, ALARM_REASONS)
}

/// Reasons set in an `OR` word, lowest bit first
pub fn off_reasons(bits: u32) -> Vec<&'static str> {
    expand(bits, OFF_REASONS)
}
