// SecureValues — Provider error types
//
// SECURITY: no variant carries secret bytes. Messages name the library,
// symbol, selector, or failure category only.

use thiserror::Error;

use crate::flavor::Flavor;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    #[error("Failed to load native library `{library}`: {reason}")]
    Load { library: String, reason: String },

    #[error("Native entry point `{symbol}` not found in `{library}`: {reason}")]
    Symbol {
        library: String,
        symbol: String,
        reason: String,
    },

    #[error("Invalid flavor selector {0} (expected 0 = primary, 1 = backup)")]
    InvalidSelector(i32),

    #[error("Native call for flavor `{flavor}` failed: {failure}")]
    NativeCall {
        flavor: Flavor,
        failure: NativeCallFailure,
    },
}

/// Why a native call was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum NativeCallFailure {
    #[error("provider returned status {0}")]
    Status(i32),

    #[error("provider returned an empty value")]
    Empty,

    #[error("provider reported {reported} bytes, exceeding the {capacity}-byte buffer")]
    Oversized { reported: usize, capacity: usize },
}
