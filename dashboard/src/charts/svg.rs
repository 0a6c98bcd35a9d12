use maud::{Markup, html};
use volume::{Series, StyleConfig};

const WIDTH: f64 = 600.0;
const HEIGHT: f64 = 200.0;
const MARGIN_LEFT: f64 = 40.0;
const MARGIN_RIGHT: f64 = 20.0;
const MARGIN_TOP: f64 = 20.0;
const MARGIN_BOTTOM: f64 = 30.0;

const TEXT_STYLE: &str = "fill: var(--foreground); font-family: inherit";
const SVG_CONTAINER_STYLE: &str = "width:100%;height:auto";

fn points(series: &Series) -> impl Iterator<Item = (&str, u64)> {
    series
        .labels
        .iter()
        .map(String::as_str)
        .zip(series.counts.iter().copied())
}

fn scale_max(series: &Series) -> u64 {
    series.counts.iter().copied().max().unwrap_or(0).max(1)
}

pub fn render_bar_chart(series: &Series, style: &StyleConfig) -> Markup {
    if series.is_empty() {
        return empty_chart();
    }

    let max_val = scale_max(series) as f64;
    let chart_w = WIDTH - MARGIN_LEFT - MARGIN_RIGHT;
    let chart_h = HEIGHT - MARGIN_TOP - MARGIN_BOTTOM;
    let bar_w = chart_w / series.len() as f64;

    html! {
        svg viewBox=(format!("0 0 {WIDTH} {HEIGHT}")) xmlns="http://www.w3.org/2000/svg" style=(SVG_CONTAINER_STYLE) {
            rect width=(WIDTH) height=(HEIGHT) style="fill: var(--background)" {}
            (y_axis(max_val, chart_h))
            @for (i, (label, count)) in points(series).enumerate() {
                @let bar_h = (count as f64 / max_val) * chart_h;
                @let x = MARGIN_LEFT + i as f64 * bar_w;
                @let y = MARGIN_TOP + chart_h - bar_h;
                rect x=(x + 1.0) y=(y) width=((bar_w - 2.0).max(0.5)) height=(bar_h)
                    fill=(style.fill_color) stroke=(style.stroke_color)
                {
                    title { (label) ": " (count) }
                }
            }
            (x_axis(series, |i| MARGIN_LEFT + (i as f64 + 0.5) * bar_w))
        }
    }
}

pub fn render_line_chart(series: &Series, style: &StyleConfig) -> Markup {
    if series.is_empty() {
        return empty_chart();
    }

    let max_val = scale_max(series) as f64;
    let chart_w = WIDTH - MARGIN_LEFT - MARGIN_RIGHT;
    let chart_h = HEIGHT - MARGIN_TOP - MARGIN_BOTTOM;
    let step = chart_w / (series.len() - 1).max(1) as f64;
    let x_at = |i: usize| MARGIN_LEFT + i as f64 * step;
    let y_at = |count: u64| MARGIN_TOP + chart_h - (count as f64 / max_val) * chart_h;

    let polyline = points(series)
        .enumerate()
        .map(|(i, (_, count))| format!("{},{}", x_at(i), y_at(count)))
        .collect::<Vec<_>>()
        .join(" ");

    html! {
        svg viewBox=(format!("0 0 {WIDTH} {HEIGHT}")) xmlns="http://www.w3.org/2000/svg" style=(SVG_CONTAINER_STYLE) {
            rect width=(WIDTH) height=(HEIGHT) style="fill: var(--background)" {}
            (y_axis(max_val, chart_h))
            polyline points=(polyline) fill="none" stroke-width="2" stroke=(style.stroke_color) {}
            @for (i, (label, count)) in points(series).enumerate() {
                circle cx=(x_at(i)) cy=(y_at(count)) r="3" fill=(style.highlight_fill) stroke=(style.highlight_stroke) {
                    title { (label) ": " (count) }
                }
            }
            (x_axis(series, x_at))
        }
    }
}

fn y_axis(max_val: f64, chart_h: f64) -> Markup {
    html! {
        text x=(MARGIN_LEFT - 5.0) y=(MARGIN_TOP + 10.0) font-size="10" text-anchor="end" style=(TEXT_STYLE) {
            (max_val)
        }
        text x=(MARGIN_LEFT - 5.0) y=(MARGIN_TOP + chart_h) font-size="10" text-anchor="end" style=(TEXT_STYLE) { "0" }
    }
}

/// One label per bucket; the buckets are few enough that they all fit.
fn x_axis(series: &Series, x_at: impl Fn(usize) -> f64) -> Markup {
    let label_y = HEIGHT - 8.0;
    html! {
        @for (i, label) in series.labels.iter().enumerate() {
            text x=(x_at(i)) y=(label_y) font-size="11" text-anchor="middle" style=(TEXT_STYLE) {
                (label)
            }
        }
    }
}

fn empty_chart() -> Markup {
    html! {
        svg viewBox=(format!("0 0 {WIDTH} {HEIGHT}")) xmlns="http://www.w3.org/2000/svg" style=(SVG_CONTAINER_STYLE) {
            rect width=(WIDTH) height=(HEIGHT) style="fill: var(--background)" {}
            text x=(WIDTH / 2.0) y=(HEIGHT / 2.0) font-size="14" text-anchor="middle" style=(TEXT_STYLE) {
                "no data"
            }
        }
    }
}
