// SecureValues — Library root
//
// Safe front end for the `secure-values` native library: lazy, at-most-once
// loading, validated flavor selectors, and redacted secret values.

pub mod cli;
pub mod config;
pub mod error;
pub mod flavor;
pub mod provider;
pub mod secret;

use once_cell::sync::Lazy;

pub use config::ProviderConfig;
pub use error::{Result, SecureValuesError};
pub use flavor::Flavor;
pub use provider::{LoadState, NativeCallFailure, NativeSecretProvider, ProviderError};
pub use secret::SecretValue;

/// Process-wide provider using the default configuration.
static SHARED: Lazy<NativeSecretProvider> = Lazy::new(NativeSecretProvider::default);

/// The process-wide provider. The library is loaded on first lookup.
pub fn shared() -> &'static NativeSecretProvider {
    &SHARED
}

/// Fetch the API key for `selector` from the process-wide provider.
pub fn get_api_key(selector: i32) -> std::result::Result<SecretValue, ProviderError> {
    shared().get_secret(selector)
}

// ─── Tests ───────────────────────────────────────────────────────────────────
