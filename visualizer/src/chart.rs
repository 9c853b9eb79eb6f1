use crate::Message;
use iced::{
    alignment::{Horizontal, Vertical},
    mouse,
    widget::canvas::{self, Event, Frame, Geometry, Path, Stroke, Text},
    Color, Point, Rectangle, Renderer, Size, Theme,
};
use lietouscore::analysis::PredictionPoint;
use lietouscore::prelude::DECEPTION_THRESHOLD;
use lietouscore::sync::{ChartFrame, MarkerStyle, ViewportWindow};

const MARGIN_LEFT: f32 = 44.0;
const MARGIN_RIGHT: f32 = 12.0;
const MARGIN_TOP: f32 = 12.0;
const MARGIN_BOTTOM: f32 = 28.0;
/// Extra pixels around a marker that still count as hovering it.
const HOVER_SLACK: f32 = 4.0;
const TOOLTIP_WIDTH: f32 = 210.0;
const TOOLTIP_LINE: f32 = 16.0;

const BACKGROUND: Color = Color::from_rgb(0.05, 0.05, 0.07);
const GRID: Color = Color::from_rgb(0.2, 0.2, 0.25);
const SCORE_LINE: Color = Color::from_rgb(0.29, 0.56, 0.89);
const THRESHOLD: Color = Color::from_rgb(0.85, 0.65, 0.15);
const CURSOR: Color = Color::from_rgb(0.95, 0.95, 0.95);
const LABEL: Color = Color::from_rgb(0.7, 0.7, 0.75);

/// Maps chart data (seconds, score) onto the plot area of the canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    pub window: ViewportWindow,
    pub plot: Rectangle,
}

impl Projection {
    pub fn new(window: ViewportWindow, bounds: Size) -> Self {
        let plot = Rectangle {
            x: MARGIN_LEFT,
            y: MARGIN_TOP,
            width: (bounds.width - MARGIN_LEFT - MARGIN_RIGHT).max(1.0),
            height: (bounds.height - MARGIN_TOP - MARGIN_BOTTOM).max(1.0),
        };
        Self { window, plot }
    }

    pub fn x_for(&self, time: f64) -> f32 {
        let span = self.window.width().max(f64::EPSILON);
        let ratio = (time - self.window.min) / span;
        self.plot.x + ratio as f32 * self.plot.width
    }

    /// Scores are plotted on a fixed `0..=1` axis.
    pub fn y_for(&self, score: f64) -> f32 {
        let ratio = score.clamp(0.0, 1.0) as f32;
        self.plot.y + self.plot.height * (1.0 - ratio)
    }

    pub fn time_at(&self, x: f32) -> f64 {
        let ratio = f64::from((x - self.plot.x) / self.plot.width);
        self.window.min + ratio.clamp(0.0, 1.0) * self.window.width()
    }

    pub fn shows(&self, time: f64) -> bool {
        self.window.contains(time)
    }
}

/// Index of the marker under `position`, preferring the closest one.
pub fn hit_test(
    points: &[PredictionPoint],
    markers: &[MarkerStyle],
    projection: &Projection,
    position: Point,
) -> Option<usize> {
    points
        .iter()
        .zip(markers)
        .enumerate()
        .filter(|(_, (point, _))| projection.shows(point.video_time))
        .filter_map(|(index, (point, marker))| {
            let center = Point::new(
                projection.x_for(point.video_time),
                projection.y_for(point.deception_score),
            );
            let distance = center.distance(position);
            (distance <= marker.radius + HOVER_SLACK).then_some((index, distance))
        })
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(index, _)| index)
}

/// Seconds between labelled ticks so that a window shows at most ten of them.
pub fn tick_step(width: f64) -> f64 {
    [0.5, 1.0, 2.0, 5.0, 10.0, 30.0, 60.0, 120.0, 300.0]
        .into_iter()
        .find(|step| width / step <= 10.0)
        .unwrap_or(600.0)
}

fn marker_color(marker: &MarkerStyle) -> Color {
    let [r, g, b, a] = marker.fill.rgba();
    Color::from_rgba(r, g, b, a)
}

/// Score chart kept in step with playback.
pub struct PredictionChart<'a> {
    points: &'a [PredictionPoint],
    frame: &'a ChartFrame,
}

impl<'a> PredictionChart<'a> {
    pub fn new(points: &'a [PredictionPoint], frame: &'a ChartFrame) -> Self {
        Self { points, frame }
    }

    fn draw_grid(&self, frame: &mut Frame, projection: &Projection) {
        let plot = projection.plot;
        let window = projection.window;
        let step = tick_step(window.width());
        let mut tick = (window.min / step).ceil() * step;
        while tick <= window.max + 1e-9 {
            let x = projection.x_for(tick);
            frame.stroke(
                &Path::line(Point::new(x, plot.y), Point::new(x, plot.y + plot.height)),
                Stroke::default().with_color(GRID).with_width(1.0),
            );
            frame.fill_text(Text {
                content: format!("{tick:.1}s"),
                position: Point::new(x, plot.y + plot.height + 6.0),
                size: 11.0.into(),
                color: LABEL,
                align_x: Horizontal::Center.into(),
                align_y: Vertical::Top.into(),
                ..Text::default()
            });
            tick += step;
        }

        for score in [0.0, 0.25, 0.5, 0.75, 1.0] {
            let y = projection.y_for(score);
            frame.stroke(
                &Path::line(Point::new(plot.x, y), Point::new(plot.x + plot.width, y)),
                Stroke::default().with_color(GRID).with_width(1.0),
            );
            frame.fill_text(Text {
                content: format!("{score:.2}"),
                position: Point::new(plot.x - 6.0, y),
                size: 11.0.into(),
                color: LABEL,
                align_x: Horizontal::Right.into(),
                align_y: Vertical::Center.into(),
                ..Text::default()
            });
        }
    }

    /// Each chunk holds its score from its start until the next chunk starts.
    fn draw_scores(&self, frame: &mut Frame, projection: &Projection) {
        if self.points.is_empty() {
            return;
        }
        let window = projection.window;
        let path = Path::new(|builder| {
            let mut started = false;
            for (index, point) in self.points.iter().enumerate() {
                let until = self
                    .points
                    .get(index + 1)
                    .map(|next| next.video_time)
                    .unwrap_or(point.chunk_end_time);
                if until < window.min || point.video_time > window.max {
                    continue;
                }
                let from_x = projection.x_for(point.video_time.max(window.min));
                let to_x = projection.x_for(until.min(window.max));
                let y = projection.y_for(point.deception_score);
                if started {
                    builder.line_to(Point::new(from_x, y));
                } else {
                    builder.move_to(Point::new(from_x, y));
                    started = true;
                }
                builder.line_to(Point::new(to_x, y));
            }
        });
        frame.stroke(
            &path,
            Stroke::default().with_color(SCORE_LINE).with_width(2.0),
        );
    }

    fn draw_markers(&self, frame: &mut Frame, projection: &Projection) {
        for (point, marker) in self.points.iter().zip(&self.frame.markers) {
            if !projection.shows(point.video_time) {
                continue;
            }
            let center = Point::new(
                projection.x_for(point.video_time),
                projection.y_for(point.deception_score),
            );
            let circle = Path::circle(center, marker.radius);
            frame.fill(&circle, marker_color(marker));
            if marker.border {
                frame.stroke(
                    &circle,
                    Stroke::default()
                        .with_color(Color::BLACK)
                        .with_width(marker.border_width()),
                );
            }
        }
    }

    fn draw_threshold(&self, frame: &mut Frame, projection: &Projection) {
        let plot = projection.plot;
        let y = projection.y_for(DECEPTION_THRESHOLD);
        frame.stroke(
            &Path::line(Point::new(plot.x, y), Point::new(plot.x + plot.width, y)),
            Stroke::default().with_color(THRESHOLD).with_width(1.5),
        );
    }

    fn draw_cursor(&self, frame: &mut Frame, projection: &Projection) {
        let time = self.frame.current_time;
        if time <= 0.0 || !projection.shows(time) {
            return;
        }
        let plot = projection.plot;
        let x = projection.x_for(time);
        frame.stroke(
            &Path::line(Point::new(x, plot.y), Point::new(x, plot.y + plot.height)),
            Stroke::default().with_color(CURSOR).with_width(1.5),
        );
    }

    fn draw_tooltip(&self, frame: &mut Frame, projection: &Projection, index: usize) {
        let Some(point) = self.points.get(index) else {
            return;
        };
        let mut lines = vec![point.title(index)];
        lines.extend(point.describe());

        let height = TOOLTIP_LINE * lines.len() as f32 + 10.0;
        let anchor_x = projection.x_for(point.video_time) + 10.0;
        let anchor_y = projection.y_for(point.deception_score) - height - 6.0;
        let x = anchor_x.min(frame.width() - TOOLTIP_WIDTH - 2.0).max(2.0);
        let y = anchor_y.max(2.0);

        frame.fill_rectangle(
            Point::new(x, y),
            Size::new(TOOLTIP_WIDTH, height),
            Color::from_rgba(0.0, 0.0, 0.0, 0.85),
        );
        for (row, line) in lines.into_iter().enumerate() {
            frame.fill_text(Text {
                content: line,
                position: Point::new(x + 8.0, y + 5.0 + row as f32 * TOOLTIP_LINE),
                size: 12.0.into(),
                color: Color::WHITE,
                ..Text::default()
            });
        }
    }
}

impl canvas::Program<Message> for PredictionChart<'_> {
    type State = Option<Point>;

    fn update(
        &self,
        hover: &mut Self::State,
        event: &Event,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> Option<canvas::Action<Message>> {
        match event {
            Event::Mouse(mouse::Event::CursorMoved { .. }) => {
                let position = cursor.position_in(bounds);
                if position != *hover {
                    *hover = position;
                    return Some(canvas::Action::request_redraw());
                }
                None
            }
            Event::Mouse(mouse::Event::ButtonPressed(mouse::Button::Left)) => {
                let position = cursor.position_in(bounds)?;
                let projection = Projection::new(self.frame.window, bounds.size());
                if !projection.plot.contains(position) {
                    return None;
                }
                Some(canvas::Action::publish(Message::Seek(projection.time_at(position.x))).and_capture())
            }
            _ => None,
        }
    }

    fn draw(
        &self,
        hover: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        let mut frame = Frame::new(renderer, bounds.size());
        frame.fill_rectangle(Point::ORIGIN, bounds.size(), BACKGROUND);

        let projection = Projection::new(self.frame.window, bounds.size());
        self.draw_grid(&mut frame, &projection);
        self.draw_threshold(&mut frame, &projection);
        self.draw_scores(&mut frame, &projection);
        self.draw_markers(&mut frame, &projection);
        self.draw_cursor(&mut frame, &projection);

        if let Some(position) = hover {
            if let Some(index) =
                hit_test(self.points, &self.frame.markers, &projection, *position)
            {
                self.draw_tooltip(&mut frame, &projection, index);
            }
        }

        vec![frame.into_geometry()]
    }

    fn mouse_interaction(
        &self,
        _hover: &Self::State,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> mouse::Interaction {
        if cursor.is_over(bounds) {
            mouse::Interaction::Crosshair
        } else {
            mouse::Interaction::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lietouscore::analysis::Verdict;
    use lietouscore::sync::style_series;

    fn projection() -> Projection {
        // 400x200 canvas leaves a 344x160 plot
        Projection::new(ViewportWindow::new(10.0, 20.0), Size::new(400.0, 200.0))
    }

    #[test]
    fn projection_maps_window_edges_to_plot_edges() {
        let projection = projection();
        assert_eq!(projection.x_for(10.0), MARGIN_LEFT);
        assert_eq!(projection.x_for(20.0), MARGIN_LEFT + 344.0);
        assert_eq!(projection.y_for(1.0), MARGIN_TOP);
        assert_eq!(projection.y_for(0.0), MARGIN_TOP + 160.0);
        assert_eq!(projection.y_for(1.7), MARGIN_TOP);
    }

    #[test]
    fn time_at_inverts_x_for() {
        let projection = projection();
        let x = projection.x_for(13.5);
        assert!((projection.time_at(x) - 13.5).abs() < 1e-4);
        assert_eq!(projection.time_at(0.0), 10.0);
        assert_eq!(projection.time_at(1_000.0), 20.0);
    }

    #[test]
    fn hit_test_finds_marker_under_cursor() {
        let points = vec![
            PredictionPoint::new(11.0, 12.0, 0.2, 0.6, Verdict::Truthful),
            PredictionPoint::new(12.0, 13.0, 0.8, 0.6, Verdict::Deceptive),
            PredictionPoint::new(25.0, 26.0, 0.8, 0.6, Verdict::Deceptive),
        ];
        let markers = style_series(&points, Some(1), 12.5, 1.0);
        let projection = projection();

        let on_second = Point::new(projection.x_for(12.0) + 3.0, projection.y_for(0.8));
        assert_eq!(hit_test(&points, &markers, &projection, on_second), Some(1));

        let empty_space = Point::new(projection.x_for(18.0), projection.y_for(0.5));
        assert_eq!(hit_test(&points, &markers, &projection, empty_space), None);

        // off-window points never match even if the pixel math would
        let clamped = Point::new(projection.x_for(25.0), projection.y_for(0.8));
        assert_eq!(hit_test(&points, &markers, &projection, clamped), None);
    }

    #[test]
    fn tick_step_keeps_labels_sparse() {
        assert_eq!(tick_step(2.0), 0.5);
        assert_eq!(tick_step(15.0), 2.0);
        assert_eq!(tick_step(100.0), 10.0);
        assert_eq!(tick_step(10_000.0), 600.0);
    }
}
