pub mod point;
pub mod series;
pub mod service;

pub use point::{PredictionPoint, PredictionRecord, Verdict};
pub use series::PredictionSeries;
pub use service::{
    video_media_type, PredictionResponse, ReportQuery, ServiceErrorBody, UploadDetails,
    UploadResponse,
};
