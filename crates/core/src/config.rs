//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup from already-read
//! environment values and then passed into construction. Nothing in the core
//! reads process-wide environment variables during request handling, which
//! keeps behaviour consistent across multi-threaded runtimes and test
//! harnesses.

use std::path::{Path, PathBuf};

use pcr_types::WalletAddress;

use crate::error::RegistryResult;

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    seed_path: Option<PathBuf>,
    oracle_address: Option<WalletAddress>,
}

impl CoreConfig {
    /// Builds a config from raw environment values.
    ///
    /// An empty or whitespace-only `seed_path` counts as unset. When
    /// `oracle_address` is present it must parse as a wallet address;
    /// when absent the signer generates its own.
    ///
    /// # Errors
    ///
    /// Returns [`crate::RegistryError::InvalidArgument`] if `oracle_address`
    /// is present but malformed.
    pub fn from_env_values(
        seed_path: Option<String>,
        oracle_address: Option<String>,
    ) -> RegistryResult<Self> {
        let seed_path = seed_path
            .map(|v| v.trim().to_owned())
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);

        let oracle_address = oracle_address
            .map(|v| v.trim().to_owned())
            .filter(|v| !v.is_empty())
            .map(WalletAddress::new)
            .transpose()?;

        Ok(Self {
            seed_path,
            oracle_address,
        })
    }

    /// Path of the JSON seed dataset to load at startup, if any.
    pub fn seed_path(&self) -> Option<&Path> {
        self.seed_path.as_deref()
    }

    /// Wallet address the local signing oracle binds to, if configured.
    pub fn oracle_address(&self) -> Option<&WalletAddress> {
        self.oracle_address.as_ref()
    }
}
