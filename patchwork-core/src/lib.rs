//! patchwork core library: record identities, the record store adapter,
//! load order configuration, reporting sinks.
//!
//! Public API surface:
//! - [`types`]: identity newtypes and the [`Record`] capability
//! - [`context`]: [`RecordContext`] and provider lookups over context chains
//! - [`store`]: override catalogs and the in-memory [`MemoryStore`]
//! - [`load_order`]: [`LoadOrder`] / [`ProviderListing`]
//! - [`config`]: YAML run configuration
//! - [`report`]: [`ReportSink`] implementations
//! - [`logging`]: `tracing` subscriber bootstrap
//! - [`error`]: [`StoreError`]

pub mod config;
pub mod context;
pub mod error;
pub mod load_order;
pub mod logging;
pub mod report;
pub mod store;
pub mod types;

pub use config::{ListingEntry, PatchworkConfig};
pub use context::{ModContext, RecordContext};
pub use error::StoreError;
pub use load_order::{LoadOrder, ProviderListing};
pub use report::{MemorySink, ReportSink, TracingSink};
pub use store::{MemoryStore, OutputCatalog, OverrideCatalog, Provider, RecordStore};
pub use types::{progress_line, ProviderKey, Record, RecordId};
