pub mod stats;

pub use stats::SeriesSummary;
