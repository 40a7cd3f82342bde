//! Provider resolution list: the ordered, enable-flagged layering of providers.

use crate::config::PatchworkConfig;
use crate::types::ProviderKey;

/// One entry of the load order. A listing *exists* when its content is loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderListing<M> {
    pub key: ProviderKey,
    pub enabled: bool,
    pub content: Option<M>,
}

impl<M> ProviderListing<M> {
    /// An enabled listing with loaded content.
    pub fn new(key: impl Into<ProviderKey>, content: M) -> Self {
        Self {
            key: key.into(),
            enabled: true,
            content: Some(content),
        }
    }

    /// An enabled listing whose content is not available.
    pub fn missing(key: impl Into<ProviderKey>) -> Self {
        Self {
            key: key.into(),
            enabled: true,
            content: None,
        }
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    pub fn exists(&self) -> bool {
        self.content.is_some()
    }
}

/// Ordered provider listings, lowest priority first.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadOrder<M> {
    listings: Vec<ProviderListing<M>>,
}

impl<M> Default for LoadOrder<M> {
    fn default() -> Self {
        Self {
            listings: Vec::new(),
        }
    }
}

impl<M> LoadOrder<M> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_listings(listings: Vec<ProviderListing<M>>) -> Self {
        Self { listings }
    }

    /// Binds each configured listing to its content. `load` returns `None`
    /// for providers that cannot be found; those stay listed but absent.
    pub fn from_config<F>(config: &PatchworkConfig, mut load: F) -> Self
    where
        F: FnMut(&ProviderKey) -> Option<M>,
    {
        let listings = config
            .load_order
            .iter()
            .map(|entry| {
                let content = load(&entry.key);
                if content.is_none() {
                    tracing::debug!("provider {} listed but not loaded", entry.key);
                }
                ProviderListing {
                    key: entry.key.clone(),
                    enabled: entry.enabled,
                    content,
                }
            })
            .collect();
        Self { listings }
    }

    pub fn push(&mut self, listing: ProviderListing<M>) {
        self.listings.push(listing);
    }

    pub fn listings(&self) -> &[ProviderListing<M>] {
        &self.listings
    }

    pub fn len(&self) -> usize {
        self.listings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listings.is_empty()
    }

    /// First listing for `key`, regardless of state.
    pub fn get(&self, key: &ProviderKey) -> Option<&ProviderListing<M>> {
        self.listings.iter().find(|l| &l.key == key)
    }

    /// Content of `key` if it is listed, enabled, and loaded.
    pub fn try_get_if_enabled_and_exists(&self, key: &ProviderKey) -> Option<&M> {
        self.get(key)
            .filter(|l| l.enabled)
            .and_then(|l| l.content.as_ref())
    }

    /// Enabled, loaded providers in load order.
    pub fn enabled(&self) -> impl DoubleEndedIterator<Item = (&ProviderKey, &M)> {
        self.listings
            .iter()
            .filter(|l| l.enabled)
            .filter_map(|l| l.content.as_ref().map(|c| (&l.key, c)))
    }
}
