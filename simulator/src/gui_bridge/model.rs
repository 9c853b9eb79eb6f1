use lietouscore::analysis::PredictionSeries;
use std::path::{Path, PathBuf};

/// State behind the fixture service the visualizer talks to.
#[derive(Debug, Clone)]
pub struct BridgeModel {
    pub series: PredictionSeries,
    pub fps: f64,
    pub upload_dir: PathBuf,
    /// PDF streamed back for every report request.
    pub report_fixture: Option<PathBuf>,
    pub uploads: Vec<PathBuf>,
    /// Prediction data is only served once a report has been requested.
    pub analyzed: bool,
}

impl BridgeModel {
    pub fn new(series: PredictionSeries, fps: f64, upload_dir: PathBuf) -> Self {
        Self {
            series,
            fps,
            upload_dir,
            report_fixture: None,
            uploads: Vec::new(),
            analyzed: false,
        }
    }

    pub fn with_report(mut self, report: Option<PathBuf>) -> Self {
        self.report_fixture = report;
        self
    }

    pub fn is_upload(&self, path: &Path) -> bool {
        self.uploads.iter().any(|stored| stored == path)
    }
}
