// SecureValues — Native Secret Provider
//
// Owns the lifecycle of the loaded native module and answers flavor-keyed
// secret lookups.
//
// Lifecycle:
//   Unloaded ──load()──▶ Loading ──▶ Loaded      (terminal)
//                               └──▶ LoadFailed  (terminal until reinitialize())
//
// Concurrent first callers block on a condvar while one thread runs the
// loader; all of them observe that single attempt's outcome. After a
// successful load the module sits in a `OnceLock` and lookups take no lock.

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, OnceLock, PoisonError};

use zeroize::Zeroizing;

use super::native::{DylibLoader, ModuleInfo, ModuleLoader, NativeModule};
use super::{NativeCallFailure, ProviderError};
use crate::config::{ConfigError, ProviderConfig};
use crate::flavor::Flavor;
use crate::secret::SecretValue;

/// Externally visible lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Unloaded,
    Loading,
    Loaded,
    LoadFailed,
}

enum Slot {
    Unloaded,
    Loading,
    Loaded(Arc<dyn NativeModule>),
    Failed(ProviderError),
}

enum Next {
    Wait,
    Load,
}

pub struct NativeSecretProvider<L: ModuleLoader = DylibLoader> {
    config: ProviderConfig,
    loader: L,
    module: OnceLock<Arc<dyn NativeModule>>,
    slot: Mutex<Slot>,
    settled: Condvar,
    attempts: AtomicUsize,
}

impl NativeSecretProvider<DylibLoader> {
    /// Provider backed by the platform dynamic loader. Nothing is loaded
    /// until the first lookup or an explicit `load()`.
    pub fn new(config: ProviderConfig) -> Result<Self, ConfigError> {
        Self::with_loader(config, DylibLoader)
    }
}

impl Default for NativeSecretProvider<DylibLoader> {
    fn default() -> Self {
        Self::from_parts(ProviderConfig::default(), DylibLoader)
    }
}

impl<L: ModuleLoader> NativeSecretProvider<L> {
    pub fn with_loader(config: ProviderConfig, loader: L) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::from_parts(config, loader))
    }

    fn from_parts(config: ProviderConfig, loader: L) -> Self {
        Self {
            config,
            loader,
            module: OnceLock::new(),
            slot: Mutex::new(Slot::Unloaded),
            settled: Condvar::new(),
            attempts: AtomicUsize::new(0),
        }
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    pub fn state(&self) -> LoadState {
        if self.module.get().is_some() {
            return LoadState::Loaded;
        }
        match &*self.lock_slot() {
            Slot::Unloaded => LoadState::Unloaded,
            Slot::Loading => LoadState::Loading,
            Slot::Loaded(_) => LoadState::Loaded,
            Slot::Failed(_) => LoadState::LoadFailed,
        }
    }

    /// Number of times the loader has been invoked.
    pub fn load_attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    /// Load the native module if it is not loaded yet.
    ///
    /// Idempotent: once loaded, the cached module is reused. Once failed, the
    /// same error is returned until `reinitialize()` is called.
    pub fn load(&self) -> Result<ModuleInfo, ProviderError> {
        self.module().map(|module| module.info().clone())
    }

    /// Clear a failed load and try again. A loaded module is kept as is.
    pub fn reinitialize(&self) -> Result<ModuleInfo, ProviderError> {
        {
            let mut slot = self.lock_slot();
            if matches!(*slot, Slot::Failed(_)) {
                tracing::info!(library = %self.config.display_name(), "Re-initializing after failed load");
                *slot = Slot::Unloaded;
            }
        }
        self.load()
    }

    /// Fetch the secret for a raw integer selector.
    ///
    /// The selector is validated before anything is loaded or called.
    pub fn get_secret(&self, selector: i32) -> Result<SecretValue, ProviderError> {
        let flavor = Flavor::try_from(selector).inspect_err(|_| {
            tracing::warn!(selector, "Rejected out-of-range flavor selector");
        })?;
        self.fetch(flavor)
    }

    /// Fetch the secret for a known flavor.
    pub fn fetch(&self, flavor: Flavor) -> Result<SecretValue, ProviderError> {
        let module = self.module()?;

        let capacity = self.config.max_secret_len;
        let mut buf = Zeroizing::new(vec![0u8; capacity]);
        let reply = module.call(flavor.as_raw(), &mut buf);

        let failure = if reply.status != 0 {
            Some(NativeCallFailure::Status(reply.status))
        } else if reply.len == 0 {
            Some(NativeCallFailure::Empty)
        } else if reply.len > capacity {
            Some(NativeCallFailure::Oversized {
                reported: reply.len,
                capacity,
            })
        } else {
            None
        };

        if let Some(failure) = failure {
            tracing::warn!(flavor = %flavor, %failure, "Native secret lookup failed");
            return Err(ProviderError::NativeCall { flavor, failure });
        }

        tracing::debug!(flavor = %flavor, "Retrieved secret from native library");
        Ok(SecretValue::from_bytes(buf[..reply.len].to_vec()))
    }

    fn module(&self) -> Result<Arc<dyn NativeModule>, ProviderError> {
        if let Some(module) = self.module.get() {
            return Ok(Arc::clone(module));
        }

        let mut slot = self.lock_slot();
        loop {
            let next = match &*slot {
                Slot::Loaded(module) => return Ok(Arc::clone(module)),
                Slot::Failed(err) => return Err(err.clone()),
                Slot::Loading => Next::Wait,
                Slot::Unloaded => Next::Load,
            };

            match next {
                Next::Wait => {
                    slot = self
                        .settled
                        .wait(slot)
                        .unwrap_or_else(PoisonError::into_inner);
                }
                Next::Load => {
                    *slot = Slot::Loading;
                    drop(slot);

                    let outcome = self.attempt_load();

                    slot = self.lock_slot();
                    *slot = match outcome {
                        Ok(module) => {
                            let _ = self.module.set(Arc::clone(&module));
                            Slot::Loaded(module)
                        }
                        Err(err) => Slot::Failed(err),
                    };
                    self.settled.notify_all();
                }
            }
        }
    }

    fn attempt_load(&self) -> Result<Arc<dyn NativeModule>, ProviderError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        let library = self.config.display_name();
        tracing::debug!(%library, "Loading native library");

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.loader.load(&self.config)))
            .unwrap_or_else(|_| {
                Err(ProviderError::Load {
                    library: library.clone(),
                    reason: "module loader panicked".to_string(),
                })
            });

        match outcome {
            Ok(module) => {
                let info = module.info();
                tracing::info!(
                    path = %info.path.display(),
                    sha256 = info.sha256.as_deref().unwrap_or("-"),
                    "Native library loaded"
                );
                Ok(Arc::from(module))
            }
            Err(err) => {
                tracing::warn!(%library, error = %err, "Native library failed to load");
                Err(err)
            }
        }
    }

    fn lock_slot(&self) -> MutexGuard<'_, Slot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
