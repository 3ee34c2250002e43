//! Standalone SVG rendering of per-epoch loss curves.
//!
//! A chart is a row of panels sharing one canvas. Every panel has its own
//! y scale (0 to 1.05 x the largest value it shows), gridlines, tick labels
//! and legend.

use std::fmt::Write as _;
use std::path::Path;

use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStyle {
    Solid,
    Dashed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub label: String,
    pub values: Vec<f64>,
    pub style: LineStyle,
}

impl Series {
    pub fn new(label: impl Into<String>, values: Vec<f64>, style: LineStyle) -> Self {
        Series { label: label.into(), values, style }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Panel {
    pub title: String,
    pub series: Vec<Series>,
}

impl Panel {
    pub fn new(title: impl Into<String>) -> Self {
        Panel { title: title.into(), series: Vec::new() }
    }

    pub fn with_series(mut self, series: Series) -> Self {
        self.series.push(series);
        self
    }

    fn max_value(&self) -> f64 {
        self.series.iter()
            .flat_map(|s| s.values.iter())
            .cloned()
            .filter(|v| v.is_finite())
            .fold(0.0f64, f64::max)
    }

    fn max_len(&self) -> usize {
        self.series.iter().map(|s| s.values.len()).max().unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartOptions {
    pub width: f64,
    pub height: f64,
    pub x_label: String,
    pub y_label: String,
}

impl Default for ChartOptions {
    fn default() -> Self {
        ChartOptions {
            width: 1200.0,
            height: 600.0,
            x_label: "Epoch".into(),
            y_label: "Loss".into(),
        }
    }
}

const PALETTE: [&str; 6] = ["#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b"];
const GREY_GRID: &str = "#e5e7eb";
const GREY_TEXT: &str = "#666";
const DARK_TEXT: &str = "#222";

const PAD_L: f64 = 64.0;
const PAD_R: f64 = 20.0;
const PAD_T: f64 = 44.0;
const PAD_B: f64 = 48.0;

/// Renders all panels side by side into one SVG document.
pub fn render_loss_chart(panels: &[Panel], options: &ChartOptions) -> String {
    let mut svg = String::new();
    let _ = writeln!(
        svg,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\" font-family=\"sans-serif\">",
        w = options.width, h = options.height
    );
    let _ = writeln!(svg, "<rect width=\"100%\" height=\"100%\" fill=\"white\"/>");

    let panel_w = options.width / panels.len().max(1) as f64;
    for (i, panel) in panels.iter().enumerate() {
        render_panel(&mut svg, panel, options, i as f64 * panel_w, panel_w);
    }

    svg.push_str("</svg>\n");
    svg
}

/// Renders the chart and writes it to `path`.
pub fn write_loss_chart(path: impl AsRef<Path>, panels: &[Panel], options: &ChartOptions) -> Result<()> {
    std::fs::write(path, render_loss_chart(panels, options))?;
    Ok(())
}

fn render_panel(svg: &mut String, panel: &Panel, options: &ChartOptions, x0: f64, panel_w: f64) {
    let h = options.height;
    let plot_l = x0 + PAD_L;
    let plot_r = x0 + panel_w - PAD_R;
    let plot_t = PAD_T;
    let plot_b = h - PAD_B;
    let plot_w = plot_r - plot_l;
    let plot_h = plot_b - plot_t;
    let mid_x = (plot_l + plot_r) / 2.0;

    let _ = writeln!(svg, "<g class=\"panel\">");
    let _ = writeln!(
        svg,
        "<text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"middle\" fill=\"{}\" font-size=\"16\">{}</text>",
        mid_x, PAD_T / 2.0 + 6.0, DARK_TEXT, escape(&panel.title)
    );

    // Axis labels.
    let _ = writeln!(
        svg,
        "<text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"middle\" fill=\"{}\" font-size=\"12\">{}</text>",
        mid_x, h - 10.0, DARK_TEXT, escape(&options.x_label)
    );
    let y_mid = (plot_t + plot_b) / 2.0;
    let _ = writeln!(
        svg,
        "<text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"middle\" fill=\"{}\" font-size=\"12\" transform=\"rotate(-90 {:.1} {:.1})\">{}</text>",
        x0 + 16.0, y_mid, DARK_TEXT, x0 + 16.0, y_mid, escape(&options.y_label)
    );

    let n = panel.max_len();
    if n == 0 {
        let _ = writeln!(
            svg,
            "<text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"middle\" fill=\"{}\" font-size=\"12\">no data</text>\n</g>",
            mid_x, y_mid, GREY_TEXT
        );
        return;
    }

    let max_y = match panel.max_value() {
        m if m > 0.0 => m * 1.05,
        _ => 1.0,
    };

    let px = |i: usize, v: f64| -> (f64, f64) {
        let x = if n > 1 {
            plot_l + (i as f64 / (n - 1) as f64) * plot_w
        } else {
            mid_x
        };
        let y = plot_t + (max_y - v.clamp(0.0, max_y)) / max_y * plot_h;
        (x, y)
    };

    // Y gridlines and tick labels.
    for g in 0..=4 {
        let frac = g as f64 / 4.0;
        let val = max_y * frac;
        let y = plot_t + (1.0 - frac) * plot_h;
        let _ = writeln!(
            svg,
            "<line x1=\"{:.1}\" y1=\"{:.1}\" x2=\"{:.1}\" y2=\"{:.1}\" stroke=\"{}\" stroke-width=\"1\"/>\n\
             <text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"end\" fill=\"{}\" font-size=\"10\">{:.3}</text>",
            plot_l, y, plot_r, y, GREY_GRID,
            plot_l - 6.0, y + 4.0, GREY_TEXT, val
        );
    }

    // X ticks at the first, middle and last epoch.
    let mut ticks = vec![0, n / 2, n - 1];
    ticks.dedup();
    for i in ticks {
        let (x, _) = px(i, 0.0);
        let _ = writeln!(
            svg,
            "<text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"middle\" fill=\"{}\" font-size=\"10\">{}</text>",
            x, plot_b + 16.0, GREY_TEXT, i + 1
        );
    }

    let _ = writeln!(
        svg,
        "<rect x=\"{:.1}\" y=\"{:.1}\" width=\"{:.1}\" height=\"{:.1}\" fill=\"none\" stroke=\"{}\"/>",
        plot_l, plot_t, plot_w, plot_h, GREY_TEXT
    );

    for (k, series) in panel.series.iter().enumerate() {
        let colour = PALETTE[k % PALETTE.len()];
        let dash = match series.style {
            LineStyle::Solid => "",
            LineStyle::Dashed => " stroke-dasharray=\"6,4\"",
        };

        let finite = series.values.iter().filter(|v| v.is_finite()).count();
        if finite == 1 {
            if let Some((i, &v)) = series.values.iter().enumerate().find(|(_, v)| v.is_finite()) {
                let (x, y) = px(i, v);
                let _ = writeln!(svg, "<circle cx=\"{:.1}\" cy=\"{:.1}\" r=\"3\" fill=\"{}\"/>", x, y, colour);
            }
        } else if finite > 1 {
            // Non-finite losses leave a gap; the curve resumes with a new segment.
            let mut path = String::new();
            let mut pen_down = false;
            for (i, &v) in series.values.iter().enumerate() {
                if !v.is_finite() {
                    pen_down = false;
                    continue;
                }
                let (x, y) = px(i, v);
                let cmd = if pen_down { 'L' } else { 'M' };
                if !path.is_empty() {
                    path.push(' ');
                }
                let _ = write!(path, "{cmd}{x:.1},{y:.1}");
                pen_down = true;
            }
            let _ = writeln!(
                svg,
                "<path d=\"{}\" stroke=\"{}\" stroke-width=\"2\" fill=\"none\"{}/>",
                path, colour, dash
            );
        }

        // Legend entry, stacked in the top-right corner of the plot area.
        let ly = plot_t + 14.0 + k as f64 * 16.0;
        let lx = plot_r - 170.0;
        let _ = writeln!(
            svg,
            "<line x1=\"{:.1}\" y1=\"{:.1}\" x2=\"{:.1}\" y2=\"{:.1}\" stroke=\"{}\" stroke-width=\"2\"{}/>\n\
             <text x=\"{:.1}\" y=\"{:.1}\" fill=\"{}\" font-size=\"11\">{}</text>",
            lx, ly - 4.0, lx + 22.0, ly - 4.0, colour, dash,
            lx + 28.0, ly, DARK_TEXT, escape(&series.label)
        );
    }

    let _ = writeln!(svg, "</g>");
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
