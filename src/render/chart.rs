//! Four-panel report rendering
//!
//! Lays the computed figures out on a 1600x1000 bitmap in a 2x2 grid:
//! text summary, agreement pie, consistency bars, latency histogram.
//! The renderer consumes plot-ready series; it computes nothing itself.

use std::path::Path;

use chrono::Local;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::full_palette::{GREY, ORANGE, PURPLE};
use plotters::style::text_anchor::{HPos, Pos, VPos};
use tracing::info;

use crate::core::metrics::ReportFigures;
use crate::storage::artifacts::Subject;
use crate::utils::error::{ReportError, Result};

/// Report image width in pixels
pub const REPORT_WIDTH: u32 = 1600;
/// Report image height in pixels
pub const REPORT_HEIGHT: u32 = 1000;

/// Labels identifying the report in the summary panel
#[derive(Debug, Clone)]
pub struct ReportContext {
    pub experiment: String,
    pub model: String,
    pub subject: Subject,
}

type Panel<'a> = DrawingArea<BitMapBackend<'a>, Shift>;

/// Render the four-panel report to `path`, overwriting any existing
/// file. The parent directory must already exist (the store creates it).
pub fn render_report(ctx: &ReportContext, figures: &ReportFigures, path: &Path) -> Result<()> {
    let root = BitMapBackend::new(path, (REPORT_WIDTH, REPORT_HEIGHT)).into_drawing_area();
    root.fill(&WHITE).map_err(render_err)?;

    let panels = root.split_evenly((2, 2));
    draw_summary(&panels[0], ctx, figures)?;
    draw_agreement_pie(&panels[1], figures)?;
    draw_consistency_bars(&panels[2], figures)?;
    draw_latency_histogram(&panels[3], figures)?;

    root.present().map_err(render_err)?;
    info!(path = %path.display(), "report rendered");
    Ok(())
}

fn draw_summary(panel: &Panel<'_>, ctx: &ReportContext, figures: &ReportFigures) -> Result<()> {
    let metrics = &figures.metrics;
    let title_style = ("sans-serif", 30).into_font().color(&BLACK);
    panel
        .draw_text("Report Summary", &title_style, (40, 30))
        .map_err(render_err)?;

    let lines = [
        format!("Experiment: {}", ctx.experiment),
        format!("Model: {}", ctx.model),
        format!("Subject: {}", ctx.subject),
        format!(
            "Prompt Tokens: {}",
            group_thousands(metrics.total_prompt_tokens)
        ),
        format!(
            "Completion Tokens: {}",
            group_thousands(metrics.total_completion_tokens)
        ),
        format!("Total Cost: ${}", metrics.total_cost_usd),
        format!("Consistency: {}%", metrics.consistency_pct),
        format!("Latency (avg/min/max): {}", metrics.latency.display()),
        format!("Generated: {}", Local::now().format("%Y-%m-%d %H:%M")),
    ];

    let line_style = ("sans-serif", 22).into_font().color(&BLACK);
    for (i, line) in lines.iter().enumerate() {
        panel
            .draw_text(line, &line_style, (40, 90 + 40 * i as i32))
            .map_err(render_err)?;
    }
    Ok(())
}

fn draw_agreement_pie(panel: &Panel<'_>, figures: &ReportFigures) -> Result<()> {
    let panel = panel
        .titled("AI-Human Agreement", ("sans-serif", 28))
        .map_err(render_err)?;

    let sizes: Vec<f64> = figures.agreement.iter().map(|s| s.pct).collect();
    if sizes.iter().sum::<f64>() <= 0.0 {
        let style = ("sans-serif", 22).into_font().color(&BLACK);
        panel
            .draw_text("No recognized agreement categories", &style, (60, 120))
            .map_err(render_err)?;
        return Ok(());
    }

    let labels: Vec<String> = figures
        .agreement
        .iter()
        .map(|s| s.label.clone())
        .collect();
    let colors = [GREEN, ORANGE, RED];

    let (width, height) = panel.dim_in_pixel();
    let center = (width as i32 / 2, height as i32 / 2);
    let radius = (width.min(height) as f64) * 0.32;

    let mut pie = Pie::new(&center, &radius, &sizes, &colors, &labels);
    pie.start_angle(140.0);
    pie.label_style(("sans-serif", 20).into_font().color(&BLACK));
    pie.percentages(("sans-serif", 16).into_font().color(&BLACK));
    panel.draw(&pie).map_err(render_err)?;
    Ok(())
}

fn draw_consistency_bars(panel: &Panel<'_>, figures: &ReportFigures) -> Result<()> {
    let mut chart = ChartBuilder::on(panel)
        .caption("AI Consistency", ("sans-serif", 28))
        .margin(20)
        .x_label_area_size(30)
        .y_label_area_size(50)
        .build_cartesian_2d(0f64..2.4f64, 0f64..110f64)
        .map_err(render_err)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_label_formatter(&|_| String::new())
        .y_desc("Percentage")
        .label_style(("sans-serif", 16))
        .draw()
        .map_err(render_err)?;

    let colors = [BLUE.to_rgba(), GREY.to_rgba()];
    let bars = figures.consistency.iter().zip(colors).enumerate().map(
        |(i, (bar, color))| {
            let x0 = 0.3 + 1.2 * i as f64;
            Rectangle::new([(x0, 0.0), (x0 + 0.6, bar.pct)], color.filled())
        },
    );
    chart.draw_series(bars).map_err(render_err)?;

    let label_style = ("sans-serif", 18)
        .into_font()
        .color(&BLACK)
        .pos(Pos::new(HPos::Center, VPos::Bottom));
    let labels = figures.consistency.iter().enumerate().map(|(i, bar)| {
        let x_mid = 0.6 + 1.2 * i as f64;
        Text::new(
            format!("{} ({}%)", bar.label, bar.pct),
            (x_mid, bar.pct + 2.0),
            label_style.clone(),
        )
    });
    chart.draw_series(labels).map_err(render_err)?;
    Ok(())
}

fn draw_latency_histogram(panel: &Panel<'_>, figures: &ReportFigures) -> Result<()> {
    let Some(hist) = &figures.latency_histogram else {
        let panel = panel
            .titled("Latency Distribution", ("sans-serif", 28))
            .map_err(render_err)?;
        let style = ("sans-serif", 22).into_font().color(&BLACK);
        panel
            .draw_text("N/A - no latency values", &style, (60, 120))
            .map_err(render_err)?;
        return Ok(());
    };

    let y_max = (hist.max_count() + 1) as f64;
    let mut chart = ChartBuilder::on(panel)
        .caption("Latency Distribution", ("sans-serif", 28))
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(hist.start..hist.end(), 0f64..y_max)
        .map_err(render_err)?;

    chart
        .configure_mesh()
        .x_desc("Latency (s)")
        .y_desc("Frequency")
        .label_style(("sans-serif", 16))
        .draw()
        .map_err(render_err)?;

    let bars = hist.counts.iter().enumerate().map(|(i, &count)| {
        let x0 = hist.start + hist.bin_width * i as f64;
        Rectangle::new(
            [(x0, 0.0), (x0 + hist.bin_width, count as f64)],
            PURPLE.filled(),
        )
    });
    chart.draw_series(bars).map_err(render_err)?;
    Ok(())
}

fn render_err<E: std::fmt::Display>(err: E) -> ReportError {
    ReportError::Render(err.to_string())
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}
