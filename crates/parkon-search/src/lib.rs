pub mod aggregate;
mod chain;
pub mod error;
mod fetch;
pub mod geocode;
pub mod params;
pub mod pipeline;
pub mod providers;
pub mod sink;

pub use aggregate::{merge, Aggregated, ProviderReport};
pub use error::{ProviderError, SearchError, ValidationError};
pub use geocode::{GeocodedPostcode, PostcodeClient};
pub use params::{parse_query, RawSearchParams, DEFAULT_RADIUS_MILES};
pub use pipeline::SearchService;
pub use providers::{
    FetchOutcome, InventoryProvider, ProviderBatch, ProviderKind, TflClient, TflSettings,
};
pub use sink::{MemorySink, PgSearchSink, SearchRecord, SearchSink, TracingSink};
