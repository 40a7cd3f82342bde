//! Optional patcher behavior activated by provider presence.
//!
//! Behaviors are registered against the provider they need. `scan(load_order)`
//! walks the registry in registration order and builds every behavior whose
//! provider is listed, enabled and loaded. Missing providers are expected and
//! skipped without a diagnostic. The activation line goes to the registry's
//! `ReportSink`, `tracing` by default.

use std::fmt;

use indexmap::IndexMap;
use patchwork_core::{LoadOrder, ProviderKey, ReportSink, TracingSink};
use patchwork_pipeline::PipelineError;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// Static information about a plugin: the provider it depends on.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PluginDescriptor {
    pub provider: ProviderKey,
}

impl PluginDescriptor {
    pub fn new(provider: impl Into<ProviderKey>) -> Self {
        Self {
            provider: provider.into(),
        }
    }
}

/// Errors from plugin registration.
#[derive(Debug, Error)]
pub enum PluginError {
    #[error("a plugin is already registered for provider '{provider}'")]
    DuplicateProvider { provider: ProviderKey },
}

/// A behavior that runs against the patcher state `S`, usually by driving
/// one or more patch pipelines.
pub trait PatcherPlugin<S> {
    /// Display name used in activation and run logs.
    fn name(&self) -> &str;

    fn run(&mut self, state: &mut S) -> Result<(), PipelineError>;
}

pub type BoxedPlugin<S> = Box<dyn PatcherPlugin<S>>;

type Factory<M, B> = Box<dyn Fn(&M) -> B>;

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Maps provider keys to factories building behaviors of type `B` from the
/// provider content `M`.
pub struct PluginRegistry<M, B> {
    factories: IndexMap<ProviderKey, Factory<M, B>>,
    sink: Box<dyn ReportSink>,
}

impl<M, B> Default for PluginRegistry<M, B> {
    fn default() -> Self {
        Self {
            factories: IndexMap::new(),
            sink: Box::new(TracingSink),
        }
    }
}

impl<M, B> fmt::Debug for PluginRegistry<M, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginRegistry")
            .field("providers", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl<M, B> PluginRegistry<M, B> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sends the activation line to `sink` instead of `tracing`.
    pub fn with_sink(mut self, sink: impl ReportSink + 'static) -> Self {
        self.sink = Box::new(sink);
        self
    }

    /// Registers `factory` for the descriptor's provider.
    ///
    /// Returns `PluginError::DuplicateProvider` if that provider already has a
    /// plugin; the registry is left unchanged.
    pub fn register<F>(
        &mut self,
        descriptor: PluginDescriptor,
        factory: F,
    ) -> Result<(), PluginError>
    where
        F: Fn(&M) -> B + 'static,
    {
        if self.factories.contains_key(&descriptor.provider) {
            return Err(PluginError::DuplicateProvider {
                provider: descriptor.provider,
            });
        }
        tracing::debug!("registered plugin for {}", descriptor.provider);
        self.factories.insert(descriptor.provider, Box::new(factory));
        Ok(())
    }

    /// Builds every plugin whose provider is enabled and loaded in
    /// `load_order`, in registration order.
    pub fn scan(&self, load_order: &LoadOrder<M>) -> Vec<B> {
        let mut activated = Vec::new();
        let mut loaded = Vec::new();
        for (provider, factory) in &self.factories {
            if let Some(content) = load_order.try_get_if_enabled_and_exists(provider) {
                loaded.push(factory(content));
                activated.push(provider.name());
            }
        }
        self.sink.notice(&format!(
            "Detected and loaded the following plugins: [{}]",
            activated.join(",")
        ));
        loaded
    }

    /// Registered descriptors in registration order.
    pub fn registered(&self) -> Vec<PluginDescriptor> {
        self.factories
            .keys()
            .map(|provider| PluginDescriptor {
                provider: provider.clone(),
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Running
// ---------------------------------------------------------------------------

/// Runs activated plugins one after another against `state`. Stops at the
/// first failure.
pub fn run_plugins<S>(
    plugins: &mut [BoxedPlugin<S>],
    state: &mut S,
) -> Result<(), PipelineError> {
    for plugin in plugins.iter_mut() {
        tracing::info!("running plugin {}", plugin.name());
        plugin.run(state)?;
    }
    Ok(())
}
