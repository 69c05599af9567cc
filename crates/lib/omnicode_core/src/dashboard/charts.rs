//! Chart descriptions for the dashboard: a language pie and a per-day,
//! per-feature request bar chart. Output is shaped as Chart.js configs.

use serde::Serialize;
use serde_json::{Value, json};

use crate::models::usage::{DashboardSummary, FeatureKind};

/// Slice colours for the language pie, reused cyclically.
pub const PALETTE: [&str; 8] = [
    "#ffdd59", "#575fcf", "#ff3f34", "#0be881", "#ffa801", "#3c40c6", "#05c46b", "#f53b57",
];

pub fn palette_color(index: usize) -> &'static str {
    PALETTE[index % PALETTE.len()]
}

/// Fixed bar colour per feature.
pub fn feature_color(feature: FeatureKind) -> &'static str {
    match feature {
        FeatureKind::CodeCompletion => "#ffdd59",
        FeatureKind::RefactorCode => "#ff3f34",
        FeatureKind::DocString => "#575fcf",
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Pie,
    Bar,
}

/// One colour for the whole dataset, or one per data point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Fill {
    Single(String),
    PerPoint(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    pub label: String,
    pub data: Vec<u64>,
    pub background_color: Fill,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chart {
    pub kind: ChartKind,
    pub title: String,
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
    /// Axis titles `(x, y)`; pies have none.
    pub axes: Option<(String, String)>,
}

impl Chart {
    /// Chart.js configuration object.
    pub fn to_chartjs(&self) -> Value {
        let mut options = json!({
            "responsive": true,
            "plugins": {
                "legend": { "position": "top" },
                "title": { "display": true, "text": self.title },
            },
        });
        if let Some((x, y)) = &self.axes {
            options["scales"] = json!({
                "x": { "title": { "display": true, "text": x } },
                "y": { "beginAtZero": true, "title": { "display": true, "text": y } },
            });
        }
        json!({
            "type": self.kind,
            "data": { "labels": self.labels, "datasets": self.datasets },
            "options": options,
        })
    }
}

/// Both dashboard charts. `languages` is `None` when there is no usage yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardCharts {
    pub languages: Option<Chart>,
    pub requests: Chart,
}

pub fn render_charts(summary: &DashboardSummary) -> DashboardCharts {
    DashboardCharts {
        languages: language_chart(summary),
        requests: request_chart(summary),
    }
}

fn language_chart(summary: &DashboardSummary) -> Option<Chart> {
    if summary.code_languages.is_empty() {
        return None;
    }
    let (labels, data): (Vec<String>, Vec<u64>) = summary
        .code_languages
        .iter()
        .map(|(lang, count)| (lang.clone(), *count))
        .unzip();
    let colors = (0..labels.len())
        .map(|i| palette_color(i).to_string())
        .collect();
    Some(Chart {
        kind: ChartKind::Pie,
        title: "Requests by Language".to_string(),
        labels,
        datasets: vec![Dataset {
            label: "Requests".to_string(),
            data,
            background_color: Fill::PerPoint(colors),
        }],
        axes: None,
    })
}

fn request_chart(summary: &DashboardSummary) -> Chart {
    let history = &summary.requests;
    let datasets = FeatureKind::ALL
        .iter()
        .map(|&feature| Dataset {
            label: feature.label().to_string(),
            data: (0..history.len())
                .map(|i| history.count_at(i, feature))
                .collect(),
            background_color: Fill::Single(feature_color(feature).to_string()),
        })
        .collect();
    Chart {
        kind: ChartKind::Bar,
        title: "Requests per Day".to_string(),
        labels: history.labels().map(str::to_string).collect(),
        datasets,
        axes: Some(("Days".to_string(), "Requests".to_string())),
    }
}
