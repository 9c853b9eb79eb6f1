//! Playback-sync core for the Lie To Us deception-analysis client.
//!
//! Keeps a chunked prediction series, a scrubbable playback position and the
//! chart viewport consistent with one another. The remote analysis service is
//! represented only by its wire contracts in [`analysis`].

pub mod analysis;
pub mod math;
pub mod prelude;
pub mod session;
pub mod sync;
pub mod telemetry;

pub use analysis::{PredictionPoint, PredictionSeries, Verdict};
pub use prelude::{ChunkLocator, LocatorKind, SyncConfig, SyncError, SyncResult};
pub use session::SessionCode;
pub use sync::{SyncEngine, SyncEvent, ViewportCommand, ViewportWindow};
