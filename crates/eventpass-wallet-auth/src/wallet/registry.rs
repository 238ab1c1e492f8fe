/*
[INPUT]:  Wallet provider objects discovered at startup
[OUTPUT]: Highest-priority provider kind and resolved adapters
[POS]:    Wallet layer - explicit replacement for ambient injected globals
[UPDATE]: When detection priority or discovery routes change
*/

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use super::adapter::ProviderAdapter;
use super::provider::WalletProvider;
use crate::types::ProviderKind;

/// How a provider object was found in its environment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Discovery {
    /// Dedicated global (`pontem`, `martian`, `petra`)
    Injected,
    /// Generic `aptos` object carrying the `isPetra` flag
    PetraFlag,
    /// Bare `petra` object found without the flag
    PetraFallback,
}

/// Objects a browser wallet extension would inject, as seen by a detection routine
#[derive(Default)]
pub struct InjectedGlobals {
    pub pontem: Option<Arc<dyn WalletProvider>>,
    pub martian: Option<Arc<dyn WalletProvider>>,
    /// Generic `aptos` object and whether it reports `isPetra`
    pub aptos: Option<(Arc<dyn WalletProvider>, bool)>,
    pub petra: Option<Arc<dyn WalletProvider>>,
}

#[derive(Clone)]
struct Entry {
    kind: ProviderKind,
    discovery: Discovery,
    provider: Arc<dyn WalletProvider>,
}

impl Entry {
    /// Lower is preferred: pontem, martian, petra-by-flag, petra-by-fallback
    fn priority(&self) -> u8 {
        match (self.kind, self.discovery) {
            (ProviderKind::Pontem, _) => 0,
            (ProviderKind::Martian, _) => 1,
            (ProviderKind::Petra, Discovery::PetraFlag) => 2,
            (ProviderKind::Petra, _) => 3,
        }
    }
}

/// Installed wallet providers, populated once at startup
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    entries: Vec<Entry>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from injected wallet objects
    ///
    /// An `aptos` object without the `isPetra` flag is not treated as Petra.
    pub fn from_injected(globals: InjectedGlobals) -> Self {
        let mut registry = Self::new();
        if let Some(provider) = globals.pontem {
            registry.register(ProviderKind::Pontem, Discovery::Injected, provider);
        }
        if let Some(provider) = globals.martian {
            registry.register(ProviderKind::Martian, Discovery::Injected, provider);
        }
        if let Some((provider, true)) = globals.aptos {
            registry.register(ProviderKind::Petra, Discovery::PetraFlag, provider);
        }
        if let Some(provider) = globals.petra {
            registry.register(ProviderKind::Petra, Discovery::PetraFallback, provider);
        }
        registry
    }

    /// Add a provider, replacing any earlier one with the same kind and discovery
    pub fn register(
        &mut self,
        kind: ProviderKind,
        discovery: Discovery,
        provider: Arc<dyn WalletProvider>,
    ) -> &mut Self {
        debug!(%kind, ?discovery, "registering wallet provider");
        self.entries
            .retain(|entry| !(entry.kind == kind && entry.discovery == discovery));
        self.entries.push(Entry {
            kind,
            discovery,
            provider,
        });
        self.entries.sort_by_key(Entry::priority);
        self
    }

    pub fn with_provider(
        mut self,
        kind: ProviderKind,
        discovery: Discovery,
        provider: Arc<dyn WalletProvider>,
    ) -> Self {
        self.register(kind, discovery, provider);
        self
    }

    /// Highest-priority installed provider kind, if any
    pub fn detect(&self) -> Option<ProviderKind> {
        self.entries.first().map(|entry| entry.kind)
    }

    /// Adapter for `kind`, preferring the higher-priority discovery route
    pub fn resolve(&self, kind: ProviderKind) -> Option<ProviderAdapter> {
        self.entries
            .iter()
            .find(|entry| entry.kind == kind)
            .map(|entry| ProviderAdapter::new(kind, entry.provider.clone()))
    }

    pub fn discovery_of(&self, kind: ProviderKind) -> Option<Discovery> {
        self.entries
            .iter()
            .find(|entry| entry.kind == kind)
            .map(|entry| entry.discovery)
    }

    /// Installed kinds in detection priority order, without duplicates
    pub fn installed(&self) -> Vec<ProviderKind> {
        let mut kinds: Vec<ProviderKind> = Vec::new();
        for entry in &self.entries {
            if !kinds.contains(&entry.kind) {
                kinds.push(entry.kind);
            }
        }
        kinds
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.entries.iter().map(|entry| (entry.kind, entry.discovery)))
            .finish()
    }
}
