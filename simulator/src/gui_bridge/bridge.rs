use crate::gui_bridge::model::BridgeModel;
use anyhow::{Context, Result};
use futures_util::TryStreamExt;
use lietouscore::analysis::{
    video_media_type, PredictionResponse, ReportQuery, ServiceErrorBody, UploadDetails,
    UploadResponse,
};
use lietouscore::analysis::service::STATUS_SUCCESS;
use lietouscore::analysis::PredictionSeries;
use log::{info, warn};
use serde_json::json;
use std::{
    convert::Infallible,
    net::SocketAddr,
    path::{Path, PathBuf},
    sync::{Arc, RwLock},
    thread,
};
use tokio::{io::AsyncWriteExt, runtime::Builder};
use warp::{
    http::StatusCode,
    multipart::{FormData, Part},
    reply::Response,
    Buf, Filter, Reply,
};

const MAX_UPLOAD_BYTES: u64 = 2 * 1024 * 1024 * 1024;
const REPORT_FILENAME: &str = "deception_analysis_report.pdf";

type SharedModel = Arc<RwLock<BridgeModel>>;

pub fn bind_address(port: u16) -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], port))
}

/// Hosts the analysis-service fixture the visualizer uploads to and polls.
pub struct GuiBridge {
    state: SharedModel,
}

impl GuiBridge {
    pub fn new(model: BridgeModel) -> Self {
        Self {
            state: Arc::new(RwLock::new(model)),
        }
    }

    /// Starts serving on a background thread with its own runtime.
    pub fn serve(&self, address: SocketAddr) -> Result<()> {
        let upload_dir = self
            .state
            .read()
            .map(|model| model.upload_dir.clone())
            .map_err(|_| anyhow::anyhow!("bridge state poisoned"))?;
        std::fs::create_dir_all(&upload_dir)
            .with_context(|| format!("creating upload dir {}", upload_dir.display()))?;

        let filter = routes(self.state.clone());
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .context("building runtime for fixture service")?;
        thread::spawn(move || {
            runtime.block_on(async move {
                info!("fixture service listening on http://{address}");
                warp::serve(filter).run(address).await;
            });
        });
        Ok(())
    }

    pub fn publish(&self, series: PredictionSeries, fps: f64) -> Result<()> {
        let mut guard = self
            .state
            .write()
            .map_err(|_| anyhow::anyhow!("bridge state poisoned"))?;
        guard.series = series;
        guard.fps = fps;
        info!(
            "[bridge] prediction points: {}, fps: {}",
            guard.series.len(),
            guard.fps
        );
        Ok(())
    }

    pub fn publish_status(&self, message: &str) {
        info!("[bridge] {}", message);
    }

    #[cfg(test)]
    pub fn snapshot(&self) -> BridgeModel {
        self.state.read().unwrap().clone()
    }
}

pub fn routes(
    state: SharedModel,
) -> impl Filter<Extract = (Response,), Error = warp::Rejection> + Clone {
    let state_filter = warp::any().map(move || state.clone());

    let ping = warp::path("ping")
        .and(warp::path::end())
        .and(warp::get())
        .map(|| warp::reply::json(&json!({"status": "ok", "message": "pong"})).into_response());

    let upload = warp::path("upload-video")
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::multipart::form().max_length(MAX_UPLOAD_BYTES))
        .and(state_filter.clone())
        .and_then(handle_upload);

    let report = warp::path("report")
        .and(warp::path::end())
        .and(warp::get())
        .and(warp::query::<ReportQuery>())
        .and(state_filter.clone())
        .and_then(handle_report);

    let predictions = warp::path("prediction-data")
        .and(warp::path::end())
        .and(warp::get())
        .and(state_filter.clone())
        .and_then(handle_predictions);

    let video = warp::path("video")
        .and(warp::path::tail())
        .and(warp::get())
        .and(state_filter)
        .and_then(handle_video);

    ping.or(upload)
        .unify()
        .or(report)
        .unify()
        .or(predictions)
        .unify()
        .or(video)
        .unify()
}

fn json_error(status: StatusCode, body: &ServiceErrorBody) -> Response {
    warp::reply::with_status(warp::reply::json(body), status).into_response()
}

fn poisoned() -> Response {
    json_error(
        StatusCode::INTERNAL_SERVER_ERROR,
        &ServiceErrorBody::with_message("fixture state unavailable"),
    )
}

struct StoredVideo {
    filename: String,
    original_filename: String,
    content_type: String,
    path: PathBuf,
    size: u64,
}

enum UploadFailure {
    Malformed(warp::Error),
    NotVideo,
    Write(PathBuf, std::io::Error),
}

impl UploadFailure {
    fn into_response(self) -> Response {
        match self {
            UploadFailure::Malformed(err) => {
                warn!("upload-video: unreadable form: {err}");
                json_error(
                    StatusCode::BAD_REQUEST,
                    &ServiceErrorBody::with_detail(format!("Malformed upload: {err}")),
                )
            }
            UploadFailure::NotVideo => json_error(
                StatusCode::BAD_REQUEST,
                &ServiceErrorBody::with_detail("Invalid file format. Only video files are accepted."),
            ),
            UploadFailure::Write(path, err) => {
                warn!("upload-video: writing {}: {err}", path.display());
                json_error(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    &ServiceErrorBody::with_detail(err.to_string()),
                )
            }
        }
    }
}

async fn read_part(part: Part) -> Result<Vec<u8>, warp::Error> {
    part.stream()
        .try_fold(Vec::new(), |mut buffer, chunk| async move {
            buffer.extend_from_slice(chunk.chunk());
            Ok(buffer)
        })
        .await
}

/// Copies a part's body to `path` chunk by chunk and returns the byte count.
async fn write_part(part: Part, path: &Path) -> Result<u64, UploadFailure> {
    let write_err = |err: std::io::Error| UploadFailure::Write(path.to_path_buf(), err);
    let mut file = tokio::fs::File::create(path).await.map_err(write_err)?;
    let mut stream = Box::pin(part.stream());
    let mut written = 0u64;
    while let Some(mut chunk) = stream.try_next().await.map_err(UploadFailure::Malformed)? {
        while chunk.has_remaining() {
            let slice = chunk.chunk();
            let len = slice.len();
            file.write_all(slice).await.map_err(write_err)?;
            chunk.advance(len);
            written += len as u64;
        }
    }
    file.flush().await.map_err(write_err)?;
    Ok(written)
}

/// Each part is drained before the next one is requested.
async fn read_form(
    mut form: FormData,
    upload_dir: &Path,
) -> Result<(Option<StoredVideo>, Option<String>), UploadFailure> {
    let mut video = None;
    let mut session = None;
    while let Some(part) = form.try_next().await.map_err(UploadFailure::Malformed)? {
        let name = part.name().to_string();
        match name.as_str() {
            "file" => {
                let original_filename = part.filename().unwrap_or("upload").to_string();
                let content_type = part.content_type().unwrap_or_default().to_string();
                if !content_type.starts_with("video/") {
                    return Err(UploadFailure::NotVideo);
                }
                let filename = stored_name(&original_filename);
                let path = upload_dir.join(&filename);
                let size = match write_part(part, &path).await {
                    Ok(size) => size,
                    Err(failure) => {
                        let _ = tokio::fs::remove_file(&path).await;
                        return Err(failure);
                    }
                };
                video = Some(StoredVideo {
                    filename,
                    original_filename,
                    content_type,
                    path,
                    size,
                });
            }
            "sessionCode" => {
                let bytes = read_part(part).await.map_err(UploadFailure::Malformed)?;
                session = Some(String::from_utf8_lossy(&bytes).into_owned());
            }
            _ => {
                read_part(part).await.map_err(UploadFailure::Malformed)?;
            }
        }
    }
    Ok((video, session))
}

fn stored_name(original: &str) -> String {
    let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    let id = uuid::Uuid::new_v4().simple().to_string();
    let extension = Path::new(original)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| format!(".{ext}"))
        .unwrap_or_default();
    format!("{timestamp}_{}{extension}", &id[..8])
}

async fn handle_upload(form: FormData, state: SharedModel) -> Result<Response, Infallible> {
    let (upload_dir, fps) = match state.read() {
        Ok(model) => (model.upload_dir.clone(), model.fps),
        Err(_) => return Ok(poisoned()),
    };
    let (video, session) = match read_form(form, &upload_dir).await {
        Ok(parsed) => parsed,
        Err(failure) => return Ok(failure.into_response()),
    };
    let Some(video) = video else {
        return Ok(json_error(
            StatusCode::BAD_REQUEST,
            &ServiceErrorBody::with_detail("No file provided."),
        ));
    };

    match state.write() {
        Ok(mut model) => {
            model.uploads.push(video.path.clone());
            model.analyzed = false;
        }
        Err(_) => return Ok(poisoned()),
    }
    info!(
        "upload-video: stored {} ({} bytes) for session {}",
        video.path.display(),
        video.size,
        session.as_deref().unwrap_or("-")
    );

    let response = UploadResponse {
        status: STATUS_SUCCESS.into(),
        message: "Video uploaded successfully".into(),
        details: UploadDetails {
            filename: video.filename,
            original_filename: video.original_filename,
            content_type: video.content_type,
            file_path: video.path.display().to_string(),
            fps: Some(fps),
            uploaded_at: chrono::Local::now().format("%Y%m%d_%H%M%S").to_string(),
        },
    };
    Ok(warp::reply::json(&response).into_response())
}

async fn handle_report(query: ReportQuery, state: SharedModel) -> Result<Response, Infallible> {
    let requested = PathBuf::from(&query.file_path);
    let report = match state.read() {
        Ok(model) => {
            if !model.is_upload(&requested) {
                return Ok(json_error(
                    StatusCode::NOT_FOUND,
                    &ServiceErrorBody::with_message(format!(
                        "Video file not found: {}",
                        query.file_path
                    )),
                ));
            }
            model.report_fixture.clone()
        }
        Err(_) => return Ok(poisoned()),
    };
    let Some(report) = report else {
        return Ok(json_error(
            StatusCode::NOT_FOUND,
            &ServiceErrorBody::with_message("No report fixture configured"),
        ));
    };
    let bytes = match tokio::fs::read(&report).await {
        Ok(bytes) => bytes,
        Err(err) => {
            warn!("report: reading {}: {err}", report.display());
            return Ok(json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                &ServiceErrorBody::with_message(err.to_string()),
            ));
        }
    };

    match state.write() {
        Ok(mut model) => model.analyzed = true,
        Err(_) => return Ok(poisoned()),
    }
    info!(
        "report: served {} for {} (session {})",
        report.display(),
        query.file_path,
        query.session_code
    );

    let reply = warp::reply::with_header(bytes, "content-type", "application/pdf");
    let reply = warp::reply::with_header(
        reply,
        "content-disposition",
        format!("attachment; filename=\"{REPORT_FILENAME}\""),
    );
    Ok(reply.into_response())
}

async fn handle_predictions(state: SharedModel) -> Result<Response, Infallible> {
    let model = match state.read() {
        Ok(model) => model,
        Err(_) => return Ok(poisoned()),
    };
    if !model.analyzed {
        let body = PredictionResponse::error("Prediction data not found. Run a report first.");
        return Ok(
            warp::reply::with_status(warp::reply::json(&body), StatusCode::NOT_FOUND)
                .into_response(),
        );
    }
    let body = PredictionResponse::success(&model.series, Some(model.fps));
    Ok(warp::reply::json(&body).into_response())
}

async fn handle_video(tail: warp::path::Tail, state: SharedModel) -> Result<Response, Infallible> {
    let requested = match urlencoding::decode(tail.as_str()) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => tail.as_str().to_string(),
    };
    let upload_dir = match state.read() {
        Ok(model) => model.upload_dir.clone(),
        Err(_) => return Ok(poisoned()),
    };
    // only the basename is honoured, so nothing outside the upload dir is reachable
    let Some(name) = Path::new(&requested).file_name() else {
        return Ok(json_error(
            StatusCode::NOT_FOUND,
            &ServiceErrorBody::with_message(format!("Video file not found: {requested}")),
        ));
    };
    let path = upload_dir.join(name);
    match tokio::fs::read(&path).await {
        Ok(bytes) => {
            let reply = warp::reply::with_header(bytes, "content-type", video_media_type(&path));
            Ok(reply.into_response())
        }
        Err(_) => Ok(json_error(
            StatusCode::NOT_FOUND,
            &ServiceErrorBody::with_message(format!("Video file not found: {requested}")),
        )),
    }
}
