pub mod grid;
pub mod overview;

use data::Surface;
use data::engine::{Extent, Plot};
use data::format::format_number;
use data::reshape::paint_order;
use data::tooltip::{self, Candidate, Tooltip};

use iced::theme::palette::Extended;
use iced::widget::canvas;
use iced::{Alignment, Color, Point, Rectangle, Size};

const TEXT_SIZE: f32 = 11.0;
const MIN_X_TICK_PX: f32 = 64.0;

/// What the pointer did over one of the chart canvases.
#[derive(Debug, Clone)]
pub enum Interaction {
    Hovered(Surface, Vec<Candidate>),
    Left,
    PanelClicked(String),
    Scrolled(f32),
}

/// Space kept free around a plotting area for ticks and axis titles.
#[derive(Debug, Clone, Copy)]
pub struct Gutter {
    left: f32,
    right: f32,
    top: f32,
    bottom: f32,
}

impl Gutter {
    pub const OVERVIEW: Gutter = Gutter {
        left: 56.0,
        right: 12.0,
        top: 22.0,
        bottom: 40.0,
    };
    pub const PANEL: Gutter = Gutter {
        left: 40.0,
        right: 6.0,
        top: 20.0,
        bottom: 20.0,
    };

    pub fn plot_area(self, bounds: Rectangle) -> Rectangle {
        Rectangle {
            x: bounds.x + self.left,
            y: bounds.y + self.top,
            width: (bounds.width - self.left - self.right).max(1.0),
            height: (bounds.height - self.top - self.bottom).max(1.0),
        }
    }
}

/// Compute a "nice" step close to range/target using 1/2/5*10^k
fn nice_step(range: f64, target: usize) -> f64 {
    let target = target.max(2) as f64;
    let raw = (range / target).max(f64::EPSILON);
    let power = raw.log10().floor();
    let base = 10f64.powf(power);
    let n = raw / base;
    let nice = if n <= 1.0 {
        1.0
    } else if n <= 2.0 {
        2.0
    } else if n <= 5.0 {
        5.0
    } else {
        10.0
    };
    nice * base
}

fn ticks(min: f64, max: f64, target: usize) -> (Vec<f64>, f64) {
    let span = (max - min).abs().max(1e-9);
    let step = nice_step(span, target);
    let start = (min / step).ceil() * step;

    let mut v = Vec::new();
    let mut t = start;
    for _ in 0..100 {
        if t > max + step * 1e-6 {
            break;
        }
        v.push(t);
        t += step;
    }
    (v, step)
}

fn tick_decimals(step: f64) -> usize {
    if step >= 1.0 {
        0
    } else {
        (-step.log10().floor()).max(0.0) as usize
    }
}

fn fill_label(frame: &mut canvas::Frame, content: String, position: Point, color: Color, align_x: Alignment) {
    frame.fill_text(canvas::Text {
        content,
        position,
        color,
        size: TEXT_SIZE.into(),
        align_x: align_x.into(),
        align_y: Alignment::Center.into(),
        ..Default::default()
    });
}

fn stroke_line(frame: &mut canvas::Frame, from: Point, to: Point, color: Color) {
    frame.stroke(
        &canvas::Path::line(from, to),
        canvas::Stroke::default().with_color(color).with_width(1.0),
    );
}

/// Axes, ticks and every series of `plot` inside `area`. `titled` adds the
/// axis titles, which detail panels leave out for lack of room.
pub fn fill_plot(
    frame: &mut canvas::Frame,
    plot: &Plot,
    area: Rectangle,
    palette: &Extended,
    titled: bool,
) {
    let axis_color = palette.background.strong.color;
    let text_color = palette.background.base.text;

    let bottom_left = Point::new(area.x, area.y + area.height);
    stroke_line(frame, Point::new(area.x, area.y), bottom_left, axis_color);
    stroke_line(
        frame,
        bottom_left,
        Point::new(area.x + area.width, area.y + area.height),
        axis_color,
    );

    if titled {
        fill_label(
            frame,
            plot.x_label.clone(),
            Point::new(area.center_x(), area.y + area.height + 28.0),
            text_color,
            Alignment::Center,
        );
        fill_label(
            frame,
            plot.y_label.clone(),
            Point::new(area.x - 48.0, area.y - 12.0),
            text_color,
            Alignment::Start,
        );
    }

    let Some(extent) = plot.extent() else {
        return;
    };

    fill_ticks(frame, &extent, area, text_color);

    for series in paint_order(&plot.series) {
        let mut builder = canvas::path::Builder::new();
        let mut pen_down = false;

        for &(x, y) in &series.points {
            if !(x.is_finite() && y.is_finite()) {
                pen_down = false;
                continue;
            }
            let point = extent.to_screen((x, y), area);
            if pen_down {
                builder.line_to(point);
            } else {
                builder.move_to(point);
                pen_down = true;
            }
        }

        frame.stroke(
            &builder.build(),
            canvas::Stroke::default()
                .with_color(series.stroke_color())
                .with_width(series.border_width),
        );
    }
}

fn fill_ticks(frame: &mut canvas::Frame, extent: &Extent, area: Rectangle, color: Color) {
    let y_target = (area.height / (TEXT_SIZE * 3.0)).floor() as usize;
    let (y_ticks, y_step) = ticks(extent.min_y, extent.max_y, y_target);
    for tick in y_ticks {
        let at = extent.to_screen((extent.min_x, tick), area);
        fill_label(
            frame,
            format_number(tick, tick_decimals(y_step)),
            Point::new(area.x - 4.0, at.y),
            color,
            Alignment::End,
        );
    }

    let x_target = (area.width / MIN_X_TICK_PX).floor() as usize;
    let (x_ticks, x_step) = ticks(extent.min_x, extent.max_x, x_target);
    for tick in x_ticks {
        let at = extent.to_screen((tick, extent.min_y), area);
        fill_label(
            frame,
            format_number(tick, tick_decimals(x_step)),
            Point::new(at.x, area.y + area.height + TEXT_SIZE),
            color,
            Alignment::Center,
        );
    }
}

/// The chart's tooltip box for a point at `anchor`, kept inside `bounds`.
pub fn fill_tooltip(
    frame: &mut canvas::Frame,
    tooltip: &Tooltip,
    anchor: Point,
    bounds: Rectangle,
    palette: &Extended,
) {
    let Some(content) = tooltip.content() else {
        return;
    };
    let opacity = tooltip.opacity();
    let size = content.measure();
    let origin = tooltip::place(anchor, size, bounds);

    frame.fill_rectangle(
        origin,
        size,
        palette.background.weak.color.scale_alpha(0.95 * opacity),
    );
    frame.stroke(
        &canvas::Path::rectangle(origin, size),
        canvas::Stroke::default()
            .with_color(palette.background.strong.color.scale_alpha(opacity))
            .with_width(1.0),
    );

    let text_x = origin.x + tooltip::PADDING * 2.0 + tooltip::SWATCH;
    let mut y = origin.y + tooltip::PADDING;

    for block in &content.blocks {
        frame.fill_rectangle(
            Point::new(
                origin.x + tooltip::PADDING,
                y + (tooltip::LINE_HEIGHT - tooltip::SWATCH) / 2.0,
            ),
            Size::new(tooltip::SWATCH, tooltip::SWATCH),
            block.swatch.scale_alpha(opacity),
        );

        for line in block.lines() {
            frame.fill_text(canvas::Text {
                content: line,
                position: Point::new(text_x, y + tooltip::LINE_HEIGHT / 2.0),
                color: palette.background.base.text.scale_alpha(opacity),
                size: tooltip::TEXT_SIZE.into(),
                align_x: Alignment::Start.into(),
                align_y: Alignment::Center.into(),
                ..Default::default()
            });
            y += tooltip::LINE_HEIGHT;
        }
        y += tooltip::BLOCK_GAP;
    }
}
