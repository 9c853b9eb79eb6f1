//! Request and response shapes of the remote analysis service.

use crate::analysis::point::PredictionRecord;
use crate::analysis::series::PredictionSeries;
use crate::prelude::{SyncError, SyncResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const STATUS_SUCCESS: &str = "success";

/// Body of a successful `POST /upload-video`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    pub status: String,
    #[serde(default)]
    pub message: String,
    pub details: UploadDetails,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadDetails {
    #[serde(default)]
    pub filename: String,
    #[serde(default)]
    pub original_filename: String,
    #[serde(default)]
    pub content_type: String,
    pub file_path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fps: Option<f64>,
    #[serde(default)]
    pub uploaded_at: String,
}

/// Body of `GET /prediction-data`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionResponse {
    pub status: String,
    #[serde(default)]
    pub data: Vec<PredictionRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fps: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl PredictionResponse {
    pub fn success(series: &PredictionSeries, fps: Option<f64>) -> Self {
        Self {
            status: STATUS_SUCCESS.into(),
            data: series.to_records(),
            fps,
            message: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error".into(),
            data: Vec::new(),
            fps: None,
            message: Some(message.into()),
        }
    }

    /// Validates the payload into an engine series plus the reported frame rate.
    pub fn into_series(self) -> SyncResult<(PredictionSeries, Option<f64>)> {
        if self.status != STATUS_SUCCESS {
            return Err(SyncError::Service(
                self.message
                    .unwrap_or_else(|| "Failed to get prediction data".into()),
            ));
        }
        let series = PredictionSeries::from_records(self.data)?;
        Ok((series, self.fps))
    }
}

/// Error body returned by the service; uploads use `detail`, the rest `message`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceErrorBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ServiceErrorBody {
    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            status: Some("error".into()),
            detail: None,
            message: Some(message.into()),
        }
    }

    pub fn with_detail(detail: impl Into<String>) -> Self {
        Self {
            status: None,
            detail: Some(detail.into()),
            message: None,
        }
    }

    pub fn describe(&self) -> Option<&str> {
        self.detail.as_deref().or(self.message.as_deref())
    }
}

/// Query string of `GET /report`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportQuery {
    #[serde(rename = "filePath")]
    pub file_path: String,
    #[serde(rename = "sessionCode", default)]
    pub session_code: String,
}

/// Media type the service uses when streaming a stored video back.
pub fn video_media_type(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("webm") => "video/webm",
        Some("ogg") | Some("ogv") => "video/ogg",
        Some("mov") => "video/quicktime",
        Some("avi") => "video/x-msvideo",
        Some("wmv") => "video/x-ms-wmv",
        _ => "video/mp4",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_response_reads_details() {
        let json = r#"{
            "status": "success",
            "message": "Video uploaded successfully",
            "details": {
                "filename": "20250501_023329_ab12cd34.mp4",
                "original_filename": "me.mp4",
                "content_type": "video/mp4",
                "file_path": "Videos/20250501_023329_ab12cd34.mp4",
                "fps": 29.97,
                "uploaded_at": "20250501_023329"
            }
        }"#;
        let response: UploadResponse = serde_json::from_str(json).unwrap();
        assert_eq!(
            response.details.file_path,
            "Videos/20250501_023329_ab12cd34.mp4"
        );
        assert_eq!(response.details.fps, Some(29.97));
    }

    #[test]
    fn failed_status_surfaces_service_message() {
        let response: PredictionResponse = serde_json::from_str(
            r#"{"status": "error", "message": "Prediction data not found. Run a report first."}"#,
        )
        .unwrap();
        match response.into_series() {
            Err(SyncError::Service(message)) => {
                assert_eq!(message, "Prediction data not found. Run a report first.")
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn success_without_fps_yields_series() {
        let response: PredictionResponse = serde_json::from_str(
            r#"{"status": "success", "data": [
                {"Chunk_Start_Time": 0.0, "Chunk_End_Time": 1.0, "Deception_Score": 0.2,
                 "Binary_Prediction": 0, "Confidence": 0.6}
            ]}"#,
        )
        .unwrap();
        let (series, fps) = response.into_series().unwrap();
        assert_eq!(series.len(), 1);
        assert_eq!(fps, None);
    }

    #[test]
    fn error_body_prefers_detail() {
        let body: ServiceErrorBody = serde_json::from_str(
            r#"{"detail": "Invalid file format. Only video files are accepted."}"#,
        )
        .unwrap();
        assert_eq!(
            body.describe(),
            Some("Invalid file format. Only video files are accepted.")
        );
        assert_eq!(ServiceErrorBody::default().describe(), None);
    }

    #[test]
    fn report_query_uses_camel_case_keys() {
        let query = ReportQuery {
            file_path: "Videos/a.mp4".into(),
            session_code: "123456".into(),
        };
        let value = serde_json::to_value(&query).unwrap();
        assert_eq!(value["filePath"], "Videos/a.mp4");
        assert_eq!(value["sessionCode"], "123456");
    }

    #[test]
    fn media_type_follows_extension() {
        assert_eq!(video_media_type(Path::new("a.WEBM")), "video/webm");
        assert_eq!(video_media_type(Path::new("a.ogv")), "video/ogg");
        assert_eq!(video_media_type(Path::new("clip")), "video/mp4");
    }
}
