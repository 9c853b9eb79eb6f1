//! Client side of the analysis service: upload, report download and prediction fetch.

use lietouscore::analysis::{
    video_media_type, PredictionResponse, PredictionSeries, ServiceErrorBody, UploadDetails,
    UploadResponse,
};
use lietouscore::prelude::SyncError;
use lietouscore::SessionCode;
use log::{info, warn};
use reqwest::{multipart, StatusCode, Url};
use std::path::{Path, PathBuf};

pub const DEFAULT_API_BASE: &str = "http://localhost:8000";
pub const REPORT_FILENAME: &str = "deception_analysis_report.pdf";

#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Transport(#[from] reqwest::Error),
    #[error("invalid service url: {0}")]
    Url(String),
    #[error("{0}")]
    Io(#[from] std::io::Error),
    /// Service answered with a non-success status.
    #[error("{message}")]
    Rejected { status: StatusCode, message: String },
    #[error("{0}")]
    Payload(#[from] SyncError),
}

/// Where the client reaches the service and where downloaded reports go.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiConfig {
    pub base_url: String,
    pub report_dir: PathBuf,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE.into(),
            report_dir: PathBuf::from("."),
        }
    }
}

impl ApiConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads `LIETOUS_API_BASE` and `LIETOUS_REPORT_DIR` through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let base_url = lookup("LIETOUS_API_BASE")
            .map(|value| value.trim().trim_end_matches('/').to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or(defaults.base_url);
        let report_dir = lookup("LIETOUS_REPORT_DIR")
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.report_dir);
        Self {
            base_url,
            report_dir,
        }
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        Url::parse(&format!("{}/{}", self.base_url, path))
            .map_err(|err| ApiError::Url(err.to_string()))
    }

    pub fn upload_url(&self) -> Result<Url, ApiError> {
        self.endpoint("upload-video")
    }

    pub fn report_url(&self, file_path: &str, session: &SessionCode) -> Result<Url, ApiError> {
        let mut url = self.endpoint("report")?;
        url.query_pairs_mut()
            .append_pair("filePath", file_path)
            .append_pair("sessionCode", session.as_str());
        Ok(url)
    }

    pub fn prediction_url(&self) -> Result<Url, ApiError> {
        self.endpoint("prediction-data")
    }

    pub fn report_path(&self) -> PathBuf {
        self.report_dir.join(REPORT_FILENAME)
    }
}

/// Status line shown after a failed upload.
pub fn upload_failure(err: &ApiError) -> String {
    match err {
        ApiError::Rejected { message, .. } => format!("Upload failed: {message}"),
        other => format!("Upload error: {other}"),
    }
}

async fn rejection(response: reqwest::Response) -> ApiError {
    let status = response.status();
    let fallback = status
        .canonical_reason()
        .unwrap_or("request failed")
        .to_string();
    let message = match response.json::<ServiceErrorBody>().await {
        Ok(body) => body.describe().map(str::to_string).unwrap_or(fallback),
        Err(_) => fallback,
    };
    warn!("service rejected request ({status}): {message}");
    ApiError::Rejected { status, message }
}

pub async fn upload_video(
    config: ApiConfig,
    video: PathBuf,
    session: SessionCode,
) -> Result<UploadDetails, ApiError> {
    let bytes = tokio::fs::read(&video).await?;
    let filename = video
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("video")
        .to_string();
    let part = multipart::Part::bytes(bytes)
        .file_name(filename)
        .mime_str(video_media_type(&video))?;
    let form = multipart::Form::new()
        .part("file", part)
        .text("sessionCode", session.to_string());

    info!("uploading {} for session {}", video.display(), session);
    let response = reqwest::Client::new()
        .post(config.upload_url()?)
        .multipart(form)
        .send()
        .await?;
    if !response.status().is_success() {
        return Err(rejection(response).await);
    }
    let body = response.json::<UploadResponse>().await?;
    Ok(body.details)
}

/// Requests the PDF report and stores it under the configured report dir.
pub async fn download_report(
    config: ApiConfig,
    file_path: String,
    session: SessionCode,
) -> Result<PathBuf, ApiError> {
    let response = reqwest::get(config.report_url(&file_path, &session)?).await?;
    if !response.status().is_success() {
        return Err(rejection(response).await);
    }
    let bytes = response.bytes().await?;
    let target = config.report_path();
    if let Some(parent) = target.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(&target, &bytes).await?;
    info!("saved report ({} bytes) to {}", bytes.len(), target.display());
    Ok(target)
}

pub async fn fetch_predictions(
    config: ApiConfig,
) -> Result<(PredictionSeries, Option<f64>), ApiError> {
    let response = reqwest::get(config.prediction_url()?).await?;
    if !response.status().is_success() {
        let status = response.status();
        warn!("prediction fetch failed with {status}");
        return Err(ApiError::Rejected {
            status,
            message: "Failed to fetch prediction data".into(),
        });
    }
    let body = response.json::<PredictionResponse>().await?;
    Ok(body.into_series()?)
}

/// Video picked by path input or drop; only video-like extensions qualify.
pub fn is_video_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            matches!(
                ext.to_ascii_lowercase().as_str(),
                "mp4" | "webm" | "ogg" | "ogv" | "mov" | "avi" | "wmv" | "mkv" | "m4v"
            )
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn config_defaults_to_local_service() {
        let config = ApiConfig::from_lookup(|_| None);
        assert_eq!(config, ApiConfig::default());
        assert_eq!(
            config.prediction_url().unwrap().as_str(),
            "http://localhost:8000/prediction-data"
        );
    }

    #[test]
    fn config_reads_overrides() {
        let env: HashMap<&str, &str> = [
            ("LIETOUS_API_BASE", "http://analysis.local:9000/"),
            ("LIETOUS_REPORT_DIR", "/tmp/reports"),
        ]
        .into_iter()
        .collect();
        let config = ApiConfig::from_lookup(|key| env.get(key).map(|value| value.to_string()));
        assert_eq!(config.base_url, "http://analysis.local:9000");
        assert_eq!(
            config.report_path(),
            PathBuf::from("/tmp/reports/deception_analysis_report.pdf")
        );
        assert_eq!(
            config.upload_url().unwrap().as_str(),
            "http://analysis.local:9000/upload-video"
        );
    }

    #[test]
    fn report_url_encodes_query() {
        let config = ApiConfig::default();
        let session = SessionCode::parse("482913").unwrap();
        let url = config
            .report_url("Videos/20250501_023329_ab12cd34 copy.mp4", &session)
            .unwrap();
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(key, value)| (key.into_owned(), value.into_owned()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                (
                    "filePath".to_string(),
                    "Videos/20250501_023329_ab12cd34 copy.mp4".to_string()
                ),
                ("sessionCode".to_string(), "482913".to_string()),
            ]
        );
    }

    #[test]
    fn upload_failure_distinguishes_rejection() {
        let rejected = ApiError::Rejected {
            status: StatusCode::BAD_REQUEST,
            message: "Invalid file format. Only video files are accepted.".into(),
        };
        assert_eq!(
            upload_failure(&rejected),
            "Upload failed: Invalid file format. Only video files are accepted."
        );
        let io = ApiError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "no such file",
        ));
        assert_eq!(upload_failure(&io), "Upload error: no such file");
    }

    #[test]
    fn video_paths_are_recognised_by_extension() {
        assert!(is_video_path(Path::new("/home/me/interview.MP4")));
        assert!(is_video_path(Path::new("clip.webm")));
        assert!(!is_video_path(Path::new("notes.txt")));
        assert!(!is_video_path(Path::new("video")));
    }
}
