// Presentation of the scores: charts on the terminal or as JSON descriptions.

use std::io::Write;

use serde_json::json;
use serde_json::Value as JSValue;

use crate::survey::*;

#[derive(PartialEq, Debug, Clone)]
pub enum Chart {
    Bar {
        title: String,
        x_label: String,
        y_label: String,
        series: Vec<(String, f64)>,
    },
    Pie {
        title: String,
        series: Vec<(String, f64)>,
    },
    StackedBar {
        title: String,
        y_label: String,
        labels: Vec<String>,
        stacks: Vec<(String, Vec<f64>)>,
    },
}

impl Chart {
    pub fn title(&self) -> &str {
        match self {
            Chart::Bar { title, .. } | Chart::Pie { title, .. } | Chart::StackedBar { title, .. } => {
                title
            }
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum ChartStyle {
    Bar,
    Pie,
}

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum ChartFormat {
    Text,
    Json,
}

fn subject(request: &AnalysisRequest) -> String {
    request
        .competency
        .clone()
        .unwrap_or_else(|| "all competencies".to_string())
}

/// The chart for an analysis, or nothing if there is nothing to plot.
pub fn chart_for(analysis: &Analysis, request: &AnalysisRequest, style: ChartStyle) -> Option<Chart> {
    if analysis.is_empty() {
        return None;
    }
    let chart = match analysis {
        Analysis::Scores(scores) => {
            let (title, x_label) = match request.mode {
                AnalysisMode::SubCompetency => (
                    format!(
                        "Subcompetency Analysis for {} (Higher is Better)",
                        subject(request)
                    ),
                    "Subcompetency",
                ),
                _ => (
                    "Overall Competency Rankings (Higher is Better)".to_string(),
                    "Competency",
                ),
            };
            match style {
                ChartStyle::Bar => Chart::Bar {
                    title,
                    x_label: x_label.to_string(),
                    y_label: "Weighted Average Score".to_string(),
                    series: scores.entries.clone(),
                },
                ChartStyle::Pie => Chart::Pie {
                    title,
                    series: scores.entries.clone(),
                },
            }
        }
        Analysis::Relevance(rb) => {
            if style == ChartStyle::Pie {
                warn!("chart_for: relevance codes are always drawn as stacked bars");
            }
            Chart::StackedBar {
                title: format!("Relevance Code Analysis for {}", subject(request)),
                y_label: "Percentage (%)".to_string(),
                labels: rb.labels.clone(),
                stacks: vec![
                    ("Core".to_string(), rb.core.clone()),
                    ("Differentiator".to_string(), rb.differentiator.clone()),
                ],
            }
        }
    };
    Some(chart)
}

/// Something that can draw the charts.
pub trait ChartRenderer {
    fn render(&mut self, chart: &Chart) -> SurveyResult<()>;

    /// Called instead of `render` when no column matched the selection.
    fn nothing_to_show(&mut self, what: &str) -> SurveyResult<()>;
}

/// Draws the charts with characters.
pub struct TextRenderer<W: Write> {
    out: W,
    width: usize,
}

impl<W: Write> TextRenderer<W> {
    pub fn new(out: W) -> TextRenderer<W> {
        TextRenderer { out, width: 40 }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }

    fn lines(&self, chart: &Chart) -> Vec<String> {
        let mut lines = vec![chart.title().to_string()];
        match chart {
            Chart::Bar {
                x_label,
                y_label,
                series,
                ..
            } => {
                lines.push(format!("({} / {})", x_label, y_label));
                let max = series.iter().map(|(_, v)| *v).fold(0.0, f64::max);
                let lw = label_width(series.iter().map(|(l, _)| l.as_str()));
                for (label, value) in series {
                    let bar = "#".repeat(scaled(*value, max, self.width));
                    lines.push(format!(
                        "{:<lw$} | {:<w$} {:.3}",
                        label,
                        bar,
                        value,
                        lw = lw,
                        w = self.width
                    ));
                }
            }
            Chart::Pie { series, .. } => {
                let total: f64 = series.iter().map(|(_, v)| (*v).max(0.0)).sum();
                let lw = label_width(series.iter().map(|(l, _)| l.as_str()));
                for (label, value) in series {
                    let share = if total > 0.0 {
                        100.0 * (*value).max(0.0) / total
                    } else {
                        0.0
                    };
                    let bar = "*".repeat(scaled(share, 100.0, self.width));
                    lines.push(format!(
                        "{:<lw$} | {:<w$} {:5.1}%",
                        label,
                        bar,
                        share,
                        lw = lw,
                        w = self.width
                    ));
                }
            }
            Chart::StackedBar {
                y_label,
                labels,
                stacks,
                ..
            } => {
                lines.push(format!("({})", y_label));
                let legend: Vec<String> = stacks
                    .iter()
                    .enumerate()
                    .map(|(idx, (name, _))| format!("{} = {}", stack_char(idx), name))
                    .collect();
                lines.push(legend.join(", "));
                let lw = label_width(labels.iter().map(|l| l.as_str()));
                for (row, label) in labels.iter().enumerate() {
                    let mut bar = String::new();
                    let mut figures: Vec<String> = Vec::new();
                    for (idx, (name, values)) in stacks.iter().enumerate() {
                        let v = values.get(row).cloned().unwrap_or(0.0);
                        let room = self.width.saturating_sub(bar.chars().count());
                        let n = scaled(v, 100.0, self.width).min(room);
                        bar.push_str(&stack_char(idx).to_string().repeat(n));
                        figures.push(format!("{} {:.1}%", name, v));
                    }
                    lines.push(format!(
                        "{:<lw$} | {:<w$} {}",
                        label,
                        bar,
                        figures.join(" / "),
                        lw = lw,
                        w = self.width
                    ));
                }
            }
        }
        lines
    }
}

fn stack_char(idx: usize) -> char {
    ['C', 'D', '+', '='].get(idx).cloned().unwrap_or('?')
}

fn label_width<'a>(labels: impl Iterator<Item = &'a str>) -> usize {
    labels.map(|l| l.chars().count()).max().unwrap_or(0)
}

fn scaled(value: f64, max: f64, width: usize) -> usize {
    if max <= 0.0 || !value.is_finite() || value <= 0.0 {
        return 0;
    }
    let n = (value / max * width as f64).round() as usize;
    n.min(width)
}

impl<W: Write> ChartRenderer for TextRenderer<W> {
    fn render(&mut self, chart: &Chart) -> SurveyResult<()> {
        for line in self.lines(chart) {
            writeln!(self.out, "{}", line.trim_end()).context(WritingOutputSnafu { path: "chart" })?;
        }
        Ok(())
    }

    fn nothing_to_show(&mut self, what: &str) -> SurveyResult<()> {
        writeln!(self.out, "Nothing to show for {}", what)
            .context(WritingOutputSnafu { path: "chart" })
    }
}

/// Collects JSON descriptions of the charts, for an external dashboard.
#[derive(Default)]
pub struct JsonRenderer {
    pub charts: Vec<JSValue>,
}

fn series_to_json(series: &[(String, f64)]) -> Vec<JSValue> {
    series
        .iter()
        .map(|(label, value)| json!({"label": label, "value": value}))
        .collect()
}

pub fn chart_to_json(chart: &Chart) -> JSValue {
    match chart {
        Chart::Bar {
            title,
            x_label,
            y_label,
            series,
        } => json!({
            "kind": "bar",
            "title": title,
            "xLabel": x_label,
            "yLabel": y_label,
            "series": series_to_json(series),
        }),
        Chart::Pie { title, series } => json!({
            "kind": "pie",
            "title": title,
            "series": series_to_json(series),
        }),
        Chart::StackedBar {
            title,
            y_label,
            labels,
            stacks,
        } => {
            let traces: Vec<JSValue> = stacks
                .iter()
                .map(|(name, values)| json!({"name": name, "values": values}))
                .collect();
            json!({
                "kind": "stackedBar",
                "title": title,
                "yLabel": y_label,
                "labels": labels,
                "stacks": traces,
            })
        }
    }
}

impl ChartRenderer for JsonRenderer {
    fn render(&mut self, chart: &Chart) -> SurveyResult<()> {
        self.charts.push(chart_to_json(chart));
        Ok(())
    }

    fn nothing_to_show(&mut self, what: &str) -> SurveyResult<()> {
        self.charts
            .push(json!({"kind": "empty", "title": format!("Nothing to show for {}", what)}));
        Ok(())
    }
}
