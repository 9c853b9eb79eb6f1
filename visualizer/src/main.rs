use api::ApiConfig;
use chart::PredictionChart;
use iced::{
    event, time,
    widget::{button, column, row, scrollable, slider, text, text_input, Canvas, Column, Container},
    window, Alignment, Color, Element, Event, Length, Subscription, Task, Theme,
};
use lietouscore::analysis::{PredictionSeries, UploadDetails, Verdict};
use lietouscore::math::SeriesSummary;
use lietouscore::sync::{ChartFrame, SyncEngine, SyncEvent, ViewportCommand};
use lietouscore::{SessionCode, SyncConfig};
use log::info;
use playback::{format_clock, PlaybackClock, TICK_INTERVAL};
use std::path::{Path, PathBuf};

mod api;
mod chart;
mod playback;

const HISTORY_LIMIT: usize = 20;

fn main() -> iced::Result {
    env_logger::init();
    iced::application(LieToUs::boot, LieToUs::update, LieToUs::view)
        .title(application_title)
        .subscription(application_subscription)
        .theme(application_theme)
        .run()
}

fn application_title(state: &LieToUs) -> String {
    match &state.screen {
        Screen::Session(session) => format!("Lie To Us - Session {}", session.code),
        Screen::Home(_) => "Lie To Us".into(),
    }
}

fn application_subscription(state: &LieToUs) -> Subscription<Message> {
    let drops = event::listen_with(file_dropped);
    if state.is_playing() {
        Subscription::batch([drops, time::every(TICK_INTERVAL).map(|_| Message::Tick)])
    } else {
        drops
    }
}

fn file_dropped(event: Event, _status: event::Status, _window: window::Id) -> Option<Message> {
    match event {
        Event::Window(window::Event::FileDropped(path)) => Some(Message::FileDropped(path)),
        _ => None,
    }
}

fn application_theme(_: &LieToUs) -> Theme {
    Theme::Dark
}

struct LieToUs {
    api: ApiConfig,
    sync_config: SyncConfig,
    screen: Screen,
    status: String,
    history: Vec<String>,
}

enum Screen {
    Home(Home),
    Session(Session),
}

#[derive(Default)]
struct Home {
    created: Option<SessionCode>,
    join_code: String,
}

struct Session {
    code: SessionCode,
    video_input: String,
    uploaded: Option<UploadDetails>,
    fps: f64,
    generating: bool,
    analysis: Option<Analysis>,
}

/// Prediction series loaded for the uploaded video, kept in step with the clock.
struct Analysis {
    engine: SyncEngine,
    clock: PlaybackClock,
    summary: SeriesSummary,
    frame: ChartFrame,
}

impl Analysis {
    fn new(
        config: SyncConfig,
        series: PredictionSeries,
        fps: f64,
        resume_at: f64,
    ) -> lietouscore::SyncResult<Self> {
        let duration = series.max_end_time();
        let summary = SeriesSummary::from_points(&series);
        let mut engine = SyncEngine::new(config, series)?;
        let mut clock = PlaybackClock::new(duration);
        engine.handle(SyncEvent::DurationLoaded(duration));
        engine.handle(SyncEvent::FpsUpdated(fps));
        engine.handle(SyncEvent::TimeUpdated(clock.seek(resume_at)));
        let frame = engine.frame();
        Ok(Self {
            engine,
            clock,
            summary,
            frame,
        })
    }

    fn apply(&mut self, event: SyncEvent) {
        self.engine.handle(event);
        self.frame = self.engine.frame();
    }
}

#[derive(Debug, Clone)]
enum Message {
    CreateSession,
    EnterCreatedSession,
    JoinCodeChanged(String),
    JoinSession,
    LeaveSession,
    VideoPathChanged(String),
    FileDropped(PathBuf),
    UploadVideo,
    VideoUploaded(Result<UploadDetails, String>),
    GenerateReport,
    ReportSaved(Result<PathBuf, String>),
    PredictionsLoaded(Result<(PredictionSeries, Option<f64>), String>),
    TogglePlayback,
    Tick,
    Seek(f64),
    Viewport(ViewportCommand),
}

impl LieToUs {
    fn boot() -> (Self, Task<Message>) {
        let api = ApiConfig::from_env();
        info!("analysis service at {}", api.base_url);
        (
            LieToUs {
                api,
                sync_config: SyncConfig::default(),
                screen: Screen::Home(Home::default()),
                status: String::new(),
                history: Vec::new(),
            },
            Task::none(),
        )
    }

    fn is_playing(&self) -> bool {
        match &self.screen {
            Screen::Session(Session {
                analysis: Some(analysis),
                ..
            }) => analysis.clock.is_playing(),
            _ => false,
        }
    }

    fn enter_session(&mut self, code: SessionCode) {
        info!("entering session {code}");
        self.push_history(format!("Joined session {code}"));
        self.status.clear();
        self.screen = Screen::Session(Session {
            code,
            video_input: String::new(),
            uploaded: None,
            fps: self.sync_config.default_fps,
            generating: false,
            analysis: None,
        });
    }

    fn update(state: &mut Self, message: Message) -> Task<Message> {
        match message {
            Message::CreateSession => {
                if let Screen::Home(home) = &mut state.screen {
                    home.created = Some(SessionCode::from_random(rand::random()));
                }
                Task::none()
            }
            Message::EnterCreatedSession => {
                if let Screen::Home(home) = &mut state.screen {
                    if let Some(code) = home.created.take() {
                        state.enter_session(code);
                    }
                }
                Task::none()
            }
            Message::JoinCodeChanged(value) => {
                if let Screen::Home(home) = &mut state.screen {
                    home.join_code = value;
                }
                Task::none()
            }
            Message::JoinSession => {
                // blank codes are ignored without feedback
                if let Screen::Home(home) = &state.screen {
                    if let Ok(code) = SessionCode::parse(&home.join_code) {
                        state.enter_session(code);
                    }
                }
                Task::none()
            }
            Message::LeaveSession => {
                state.screen = Screen::Home(Home::default());
                state.status.clear();
                Task::none()
            }
            other => {
                let api = state.api.clone();
                let sync_config = state.sync_config.clone();
                let Screen::Session(session) = &mut state.screen else {
                    return Task::none();
                };
                let (task, note) = session.update(other, api, sync_config, &mut state.status);
                if let Some(note) = note {
                    state.push_history(note);
                }
                task
            }
        }
    }

    fn view(state: &Self) -> Element<'_, Message> {
        let content = match &state.screen {
            Screen::Home(home) => home_view(home),
            Screen::Session(session) => session_view(session, &state.status, &state.history),
        };
        Container::new(content)
            .width(Length::Fill)
            .height(Length::Fill)
            .padding(20)
            .into()
    }

    fn push_history(&mut self, entry: String) {
        self.history.push(entry);
        if self.history.len() > HISTORY_LIMIT {
            self.history.remove(0);
        }
    }
}

impl Session {
    /// Session-screen messages; returns the follow-up task and an activity note.
    fn update(
        &mut self,
        message: Message,
        api: ApiConfig,
        sync_config: SyncConfig,
        status: &mut String,
    ) -> (Task<Message>, Option<String>) {
        match message {
            Message::VideoPathChanged(value) => {
                self.video_input = value;
                (Task::none(), None)
            }
            Message::FileDropped(path) => {
                if !api::is_video_path(&path) {
                    return (Task::none(), None);
                }
                self.video_input = path.display().to_string();
                (Task::none(), Some(format!("Selected {}", display_name(&path))))
            }
            Message::UploadVideo => {
                let input = self.video_input.trim();
                if input.is_empty() {
                    return (Task::none(), None);
                }
                *status = "Uploading video...".into();
                let task = Task::perform(
                    api::upload_video(api, PathBuf::from(input), self.code.clone()),
                    |result| Message::VideoUploaded(result.map_err(|err| api::upload_failure(&err))),
                );
                (task, None)
            }
            Message::VideoUploaded(Ok(details)) => {
                if let Some(fps) = details.fps.filter(|fps| fps.is_finite() && *fps > 0.0) {
                    self.fps = fps;
                }
                let note = format!("Uploaded {}", details.original_filename);
                self.uploaded = Some(details);
                *status =
                    "Video uploaded successfully! Click 'Generate Analysis Report' to proceed."
                        .into();
                (Task::none(), Some(note))
            }
            Message::VideoUploaded(Err(err)) => {
                *status = err;
                (Task::none(), None)
            }
            Message::GenerateReport => {
                let Some(details) = &self.uploaded else {
                    return (Task::none(), None);
                };
                if self.generating {
                    return (Task::none(), None);
                }
                self.generating = true;
                *status = "Generating analysis report... This may take a few minutes.".into();
                let task = Task::perform(
                    api::download_report(api, details.file_path.clone(), self.code.clone()),
                    |result| Message::ReportSaved(result.map_err(|err| err.to_string())),
                );
                (task, None)
            }
            Message::ReportSaved(Ok(path)) => {
                let task = Task::perform(api::fetch_predictions(api), |result| {
                    Message::PredictionsLoaded(result.map_err(|err| err.to_string()))
                });
                (task, Some(format!("Report saved to {}", path.display())))
            }
            Message::ReportSaved(Err(err)) => {
                self.generating = false;
                *status = format!("Report generation failed: {err}");
                (Task::none(), None)
            }
            Message::PredictionsLoaded(Ok((series, reported_fps))) => {
                self.generating = false;
                if let Some(fps) = reported_fps.filter(|fps| fps.is_finite() && *fps > 0.0) {
                    self.fps = fps;
                }
                let resume_at = self
                    .analysis
                    .as_ref()
                    .map(|analysis| analysis.clock.position())
                    .unwrap_or(0.0);
                let chunks = series.len();
                match Analysis::new(sync_config, series, self.fps, resume_at) {
                    Ok(analysis) => {
                        self.analysis = Some(analysis);
                        *status = "Analysis complete! Report downloaded.".into();
                        (Task::none(), Some(format!("Loaded {chunks} prediction chunks")))
                    }
                    Err(err) => {
                        *status = format!("Error loading prediction data: {err}");
                        (Task::none(), None)
                    }
                }
            }
            Message::PredictionsLoaded(Err(err)) => {
                self.generating = false;
                *status = format!("Error loading prediction data: {err}");
                (Task::none(), None)
            }
            Message::TogglePlayback => {
                if let Some(analysis) = &mut self.analysis {
                    analysis.clock.toggle();
                }
                (Task::none(), None)
            }
            Message::Tick => {
                if let Some(analysis) = &mut self.analysis {
                    if let Some(time) = analysis.clock.advance(TICK_INTERVAL) {
                        analysis.apply(SyncEvent::TimeUpdated(time));
                    }
                }
                (Task::none(), None)
            }
            Message::Seek(time) => {
                if let Some(analysis) = &mut self.analysis {
                    let time = analysis.clock.seek(time);
                    analysis.apply(SyncEvent::TimeUpdated(time));
                }
                (Task::none(), None)
            }
            Message::Viewport(command) => {
                if let Some(analysis) = &mut self.analysis {
                    analysis.apply(SyncEvent::Command(command));
                }
                (Task::none(), None)
            }
            _ => (Task::none(), None),
        }
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn verdict_color(verdict: Verdict) -> Color {
    match verdict {
        Verdict::Truthful => Color::from_rgb(0.2, 0.8, 0.3),
        Verdict::Deceptive => Color::from_rgb(0.9, 0.25, 0.2),
    }
}

fn home_view(home: &Home) -> Element<'_, Message> {
    let mut create = Column::new()
        .spacing(8)
        .push(text("Create a Session").size(20))
        .push(button("Create Session").on_press(Message::CreateSession).padding(10));
    if let Some(code) = &home.created {
        create = create
            .push(text(format!("Your session code: {code}")).size(18))
            .push(text("Share this code with the other participant.").size(12))
            .push(
                button("Start Session")
                    .on_press(Message::EnterCreatedSession)
                    .padding(10),
            );
    }

    let join = column![
        text("Join a Deception Detection Session").size(20),
        text("Enter your session code and click \"Join\" to continue").size(12),
        row![
            text_input("Session code", &home.join_code)
                .on_input(Message::JoinCodeChanged)
                .on_submit(Message::JoinSession)
                .padding(6)
                .width(Length::Fixed(220.0)),
            button("Join").on_press(Message::JoinSession).padding(8),
        ]
        .spacing(8)
        .align_y(Alignment::Center),
    ]
    .spacing(8);

    column![
        text("Lie To Us").size(36),
        text("Deception detection for recorded interviews").size(14),
        row![create, join].spacing(60),
    ]
    .spacing(24)
    .into()
}

fn session_view<'a>(
    session: &'a Session,
    status: &'a str,
    history: &'a [String],
) -> Element<'a, Message> {
    let can_upload = !session.video_input.trim().is_empty();
    let can_generate =
        session.uploaded.is_some() && !session.generating && session.analysis.is_none();

    let header = row![
        text(format!("Session {}", session.code)).size(26),
        button("Leave").on_press(Message::LeaveSession).padding(6),
    ]
    .spacing(16)
    .align_y(Alignment::Center);

    let upload = row![
        text_input(
            "Path to a video file (or drop one onto the window)",
            &session.video_input
        )
        .on_input(Message::VideoPathChanged)
        .on_submit(Message::UploadVideo)
        .padding(6),
        button("Upload")
            .on_press_maybe(can_upload.then_some(Message::UploadVideo))
            .padding(8),
        button("Generate Analysis Report")
            .on_press_maybe(can_generate.then_some(Message::GenerateReport))
            .padding(8),
    ]
    .spacing(8)
    .align_y(Alignment::Center);

    let history_list = if history.is_empty() {
        Column::new().push(text("No activity yet").size(12))
    } else {
        history
            .iter()
            .rev()
            .fold(Column::new().spacing(4), |col, entry| {
                col.push(text(entry.as_str()).size(12))
            })
    };

    let mut layout = Column::new()
        .spacing(12)
        .push(header)
        .push(upload)
        .push(text(status).size(14));

    if let Some(analysis) = &session.analysis {
        layout = layout.push(analysis_view(session, analysis));
    } else if session.generating {
        layout = layout.push(text("Waiting for the analysis service...").size(14));
    }

    layout
        .push(text("Activity log").size(16))
        .push(Container::new(scrollable(history_list).height(Length::Fixed(90.0))).padding(6))
        .into()
}

fn analysis_view<'a>(session: &'a Session, analysis: &'a Analysis) -> Element<'a, Message> {
    let clock = &analysis.clock;
    let frame = &analysis.frame;

    let transport = row![
        button(if clock.is_playing() { "Pause" } else { "Play" })
            .on_press(Message::TogglePlayback)
            .padding(8),
        text(format!(
            "{} / {}",
            format_clock(clock.position()),
            format_clock(clock.duration())
        ))
        .size(14),
        slider(0.0..=clock.duration(), clock.position(), Message::Seek).step(0.05),
    ]
    .spacing(12)
    .align_y(Alignment::Center);

    let badges = match analysis.engine.active_point() {
        Some(point) => row![
            text(point.binary_prediction.label())
                .size(18)
                .color(verdict_color(point.binary_prediction)),
            text(format!(
                "Chunk {} | Score {:.4} | Confidence {:.2}%",
                frame.active_index.map(|index| index + 1).unwrap_or(1),
                point.deception_score,
                point.confidence * 100.0
            ))
            .size(14),
        ],
        None => row![text("No prediction data").size(14)],
    }
    .spacing(12)
    .align_y(Alignment::Center);

    let zoom = row![
        button("Zoom In")
            .on_press(Message::Viewport(ViewportCommand::ZoomIn))
            .padding(6),
        button("Zoom Out")
            .on_press(Message::Viewport(ViewportCommand::ZoomOut))
            .padding(6),
        button("Reset Zoom")
            .on_press(Message::Viewport(ViewportCommand::ResetZoom))
            .padding(6),
        button("Jump to Current")
            .on_press(Message::Viewport(ViewportCommand::JumpToCurrent))
            .padding(6),
    ]
    .spacing(8);

    let chart = Canvas::new(PredictionChart::new(
        analysis.engine.series().points(),
        frame,
    ))
    .width(Length::Fill)
    .height(Length::Fixed(320.0));

    let summary = &analysis.summary;
    let summary_text = text(format!(
        "Truthful {:.1}% | Deceptive {:.1}% | Above threshold {:.1}% | Mean score {:.4} | Mean confidence {:.2}%",
        summary.truthful_percent,
        summary.deceptive_percent,
        summary.above_threshold_percent,
        summary.mean_score,
        summary.mean_confidence * 100.0
    ))
    .size(13);

    let footer = column![
        text(format!(
            "Video duration: {:.2}s | Data points: {} | Viewing: {:.1}s - {:.1}s",
            clock.duration(),
            analysis.engine.series().len(),
            frame.window.min,
            frame.window.max
        ))
        .size(12),
        row![
            text(format!(
                "Video FPS: {} | Chunk size: {} frames ({:.2} seconds)",
                session.fps,
                analysis.engine.config().frames_per_chunk,
                frame.seconds_per_chunk
            ))
            .size(12),
            button("Regenerate Report")
                .on_press_maybe((!session.generating).then_some(Message::GenerateReport))
                .padding(4),
        ]
        .spacing(12)
        .align_y(Alignment::Center),
    ]
    .spacing(6);

    column![transport, badges, zoom, chart, summary_text, footer]
        .spacing(10)
        .into()
}
