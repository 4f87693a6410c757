// SecureValues — Flavor selectors
//
// A flavor is the integer tag the native library uses to pick which secret
// variant to return. The known range is closed: anything outside it is
// rejected here, before a library is loaded or a native call is made.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

use crate::provider::ProviderError;

/// The secret variants exposed by the native library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
#[repr(i32)]
pub enum Flavor {
    /// The secret used in normal operation.
    Primary = 0,
    /// The fallback secret, used while the primary is being rotated.
    Backup = 1,
}

impl Flavor {
    /// Every known flavor, in selector order.
    pub const ALL: [Flavor; 2] = [Flavor::Primary, Flavor::Backup];

    /// The raw selector passed across the native boundary.
    pub fn as_raw(self) -> i32 {
        self as i32
    }

    pub fn name(self) -> &'static str {
        match self {
            Flavor::Primary => "primary",
            Flavor::Backup => "backup",
        }
    }
}

impl TryFrom<i32> for Flavor {
    type Error = ProviderError;

    fn try_from(raw: i32) -> Result<Self, Self::Error> {
        Flavor::ALL
            .into_iter()
            .find(|flavor| flavor.as_raw() == raw)
            .ok_or(ProviderError::InvalidSelector(raw))
    }
}

impl fmt::Display for Flavor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Returned when a flavor name does not match any known variant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown flavor `{0}` (expected one of: primary, backup)")]
pub struct ParseFlavorError(pub String);

impl FromStr for Flavor {
    type Err = ParseFlavorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Flavor::ALL
            .into_iter()
            .find(|flavor| flavor.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ParseFlavorError(wanted.to_string()))
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
