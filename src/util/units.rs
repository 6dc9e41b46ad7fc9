//! Unit formatting for report lines
//!
//! [`format`] turns a raw count into a number followed by a unit prefix, leaving
//! the base unit (`B`, `bit`) to the caller:
//!
//! ```
//! use iosweep::util::units::{format, UnitMode};
//!
//! assert_eq!(format(512.0, 0, UnitMode::Iec), "512 ");
//! assert_eq!(format(4096.0, 0, UnitMode::Iec), "4 Ki");
//! assert_eq!(format(1_500_000.0, 1, UnitMode::Si), "1.5 M");
//! assert_eq!(format(1_500_000.0, 1, UnitMode::Raw), "1500000.0 ");
//! ```

use serde::{Deserialize, Serialize};

const IEC_PREFIXES: &[&str] = &["", "Ki", "Mi", "Gi", "Ti", "Pi", "Ei"];
const SI_PREFIXES: &[&str] = &["", "k", "M", "G", "T", "P", "E"];

/// How quantities are rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitMode {
    /// Binary prefixes (1024-based)
    #[default]
    Iec,
    /// Decimal prefixes (1000-based)
    Si,
    /// Plain numbers, no scaling
    Raw,
}

/// Format `value` with `precision` decimals and the largest fitting prefix
///
/// Negative and non-finite inputs are printed unscaled.
pub fn format(value: f64, precision: usize, mode: UnitMode) -> String {
    let (base, prefixes) = match mode {
        UnitMode::Iec => (1024.0, IEC_PREFIXES),
        UnitMode::Si => (1000.0, SI_PREFIXES),
        UnitMode::Raw => return format!("{:.*} ", precision, value),
    };

    if !value.is_finite() || value < 0.0 {
        return format!("{:.*} ", precision, value);
    }

    let mut scaled = value;
    let mut index = 0;
    while scaled >= base && index < prefixes.len() - 1 {
        scaled /= base;
        index += 1;
    }

    format!("{:.*} {}", precision, scaled, prefixes[index])
}
