// SecureValues — Provider Module
//
// Loads the platform `secure-values` library exactly once and answers
// flavor-keyed secret lookups through its single exported entry point.
// All `unsafe` interop stays inside `native`.

mod error;
mod native;
mod secret_provider;

pub use error::{NativeCallFailure, ProviderError};
pub use native::{DylibLoader, ModuleInfo, ModuleLoader, NativeModule, RawReply};
pub use secret_provider::{LoadState, NativeSecretProvider};

#[cfg(test)]
pub(crate) use native::mock;
