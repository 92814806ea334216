mod actions;
pub mod dashboard;
pub mod detail;
mod feed;
mod generation;
mod upload;

pub use actions::{ActionState, MaterialActions};
pub use dashboard::{DashboardSummary, DashboardView};
pub use feed::{FeedSnapshot, MaterialsFeed};
pub use generation::GenerationPanel;
pub use upload::{UploadPhase, UploadPipeline};
