pub mod graphql;
pub mod indexer;
pub mod price_reader;
pub mod source;

pub use indexer::{
    aggregate_volume_24h, build_stats_record, select_tvl, window_start, IndexerVolumeAggregator,
};
pub use price_reader::OnChainPriceReader;
pub use source::{PriceSource, StatsSource};
