// SecureValues — Native module loading
//
// The seam between safe Rust and the platform library. `ModuleLoader`
// produces a `NativeModule`; the production pair (`DylibLoader`,
// `DylibModule`) wraps `libloading` and is the only place in the crate
// that contains `unsafe` code.
//
// ABI of the exported entry point (see include/secure_values.h):
//
//   int32_t secure_values_get(int32_t flavor, uint8_t *buf, size_t cap, size_t *out_len);
//
//   - writes at most `cap` bytes into `buf`
//   - stores the full secret length in `*out_len`
//   - returns 0 on success, anything else on failure

use std::fs;
use std::path::{Path, PathBuf};

use libloading::Library;
use serde::Serialize;
use sha2::{Digest, Sha256};

use super::ProviderError;
use crate::config::ProviderConfig;

/// C signature of the exported lookup function.
type EntryFn = unsafe extern "C" fn(i32, *mut u8, usize, *mut usize) -> i32;

// ─── Traits ──────────────────────────────────────────────────────────────────

/// What the native entry point reported for one call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawReply {
    pub status: i32,
    pub len: usize,
}

/// Where a module came from, for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleInfo {
    /// The candidate path the loader opened.
    pub path: PathBuf,
    /// SHA-256 of the library file, when it could be read directly.
    /// Libraries found through the system search path have none.
    pub sha256: Option<String>,
    pub entry_symbol: String,
}

/// A loaded library with its entry point resolved.
pub trait NativeModule: Send + Sync {
    fn info(&self) -> &ModuleInfo;

    /// Invoke the entry point. `buf` is the caller-owned output buffer; the
    /// module must not write past its length.
    fn call(&self, selector: i32, buf: &mut [u8]) -> RawReply;
}

/// Abstraction over library loading, enabling the real dynamic loader in
/// production and in-memory modules in tests.
pub trait ModuleLoader: Send + Sync {
    fn load(&self, config: &ProviderConfig) -> Result<Box<dyn NativeModule>, ProviderError>;
}

// ─── Platform Implementation ─────────────────────────────────────────────────

/// Production loader backed by the platform dynamic linker
/// (`dlopen` on Linux/macOS, `LoadLibraryW` on Windows).
#[derive(Debug, Default, Clone, Copy)]
pub struct DylibLoader;

impl ModuleLoader for DylibLoader {
    fn load(&self, config: &ProviderConfig) -> Result<Box<dyn NativeModule>, ProviderError> {
        let mut failures = Vec::new();

        for candidate in config.candidates() {
            // SAFETY: opening a library runs its initializers. The library is
            // the trusted `secure-values` artifact shipped with the host
            // application; we only choose where to look for it.
            match unsafe { Library::new(&candidate) } {
                Ok(library) => {
                    tracing::debug!(path = %candidate.display(), "Opened native library");
                    let module = DylibModule::bind(library, candidate, config)?;
                    return Ok(Box::new(module));
                }
                Err(e) => {
                    tracing::debug!(path = %candidate.display(), error = %e, "Library candidate rejected");
                    failures.push(format!("{}: {}", candidate.display(), e));
                }
            }
        }

        Err(ProviderError::Load {
            library: config.display_name(),
            reason: if failures.is_empty() {
                "no candidate paths".to_string()
            } else {
                failures.join("; ")
            },
        })
    }
}

/// A `libloading::Library` plus its resolved entry point.
struct DylibModule {
    // Valid only while `_library` stays loaded; both are dropped together.
    entry: EntryFn,
    info: ModuleInfo,
    _library: Library,
}

impl DylibModule {
    fn bind(
        library: Library,
        path: PathBuf,
        config: &ProviderConfig,
    ) -> Result<Self, ProviderError> {
        // SAFETY: the symbol is declared with the documented C signature.
        // A library exporting the name with a different signature breaks the
        // ABI contract and cannot be detected here.
        let entry: EntryFn = unsafe {
            let symbol = library
                .get::<EntryFn>(config.entry_symbol.as_bytes())
                .map_err(|e| ProviderError::Symbol {
                    library: path.display().to_string(),
                    symbol: config.entry_symbol.clone(),
                    reason: e.to_string(),
                })?;
            *symbol
        };

        let info = ModuleInfo {
            sha256: file_sha256(&path),
            path,
            entry_symbol: config.entry_symbol.clone(),
        };

        Ok(Self {
            entry,
            info,
            _library: library,
        })
    }
}

impl NativeModule for DylibModule {
    fn info(&self) -> &ModuleInfo {
        &self.info
    }

    fn call(&self, selector: i32, buf: &mut [u8]) -> RawReply {
        let mut len: usize = 0;
        // SAFETY: `buf` is valid for `buf.len()` writes and `len` is a live
        // local; the entry point is kept valid by `self._library`.
        let status = unsafe { (self.entry)(selector, buf.as_mut_ptr(), buf.len(), &mut len) };
        RawReply { status, len }
    }
}

/// Hex SHA-256 of a library file. `None` when the path is a bare name
/// resolved by the system loader.
fn file_sha256(path: &Path) -> Option<String> {
    let bytes = fs::read(path).ok()?;
    let digest = Sha256::digest(&bytes);
    Some(digest.iter().map(|b| format!("{:02x}", b)).collect())
}

// ─── In-Memory Mock for Testing ──────────────────────────────────────────────


// ─── Tests ───────────────────────────────────────────────────────────────────
