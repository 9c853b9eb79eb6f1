pub mod engine;
pub mod locate;
pub mod style;
pub mod timing;
pub mod viewport;

pub use engine::{reduce, reduce_viewport, ChartFrame, PlaybackState, SyncEngine, SyncEvent, SyncState};
pub use locate::{find_active_chunk, BinarySearch, LinearScan};
pub use style::{style_point, style_series, MarkerFill, MarkerStyle};
pub use timing::ChunkTiming;
pub use viewport::{derive_viewport, ViewportCommand, ViewportWindow};
