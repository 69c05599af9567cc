//! Standalone HTML page for the dashboard.

use super::charts::{Chart, render_charts};
use crate::models::usage::DashboardSummary;

const CHART_JS: &str = "https://cdn.jsdelivr.net/npm/chart.js";
const NO_DATA: &str = "No usage recorded yet.";

/// Render `summary` as a self-contained page that draws both charts.
pub fn render_html(summary: &DashboardSummary) -> String {
    let charts = render_charts(summary);

    let languages = match &charts.languages {
        Some(chart) => canvas("languages", chart),
        None => format!("<p class=\"empty\">{NO_DATA}</p>"),
    };
    let requests = canvas("requests", &charts.requests);

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Omnicode Dashboard</title>
<script src="{CHART_JS}"></script>
<style>
body {{ font-family: sans-serif; margin: 2rem; }}
section {{ max-width: 720px; margin-bottom: 2rem; }}
.empty {{ color: #777; }}
</style>
</head>
<body>
<h1>Omnicode Dashboard</h1>
<p>Data written: {bytes} bytes</p>
<section>
<h2>Languages</h2>
{languages}
</section>
<section>
<h2>Requests</h2>
{requests}
</section>
</body>
</html>
"#,
        bytes = summary.data_written,
    )
}

fn canvas(id: &str, chart: &Chart) -> String {
    // A "</" inside the JSON would close the script element early.
    let config = chart.to_chartjs().to_string().replace("</", "<\\/");
    format!(
        "<canvas id=\"{id}\"></canvas>\n<script>new Chart(document.getElementById(\"{id}\"), {config});</script>"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_summary_shows_placeholder() {
        let page = render_html(&DashboardSummary::default());
        assert!(page.contains(NO_DATA));
        assert!(!page.contains("id=\"languages\""));
        assert!(page.contains("id=\"requests\""));
        assert!(page.contains("Data written: 0 bytes"));
    }

    #[test]
    fn embeds_both_charts() {
        let summary = DashboardSummary {
            code_languages: [("rust".to_string(), 2)].into_iter().collect(),
            data_written: 64,
            ..DashboardSummary::default()
        };
        let page = render_html(&summary);
        assert!(page.contains("id=\"languages\""));
        assert!(page.contains("\"rust\""));
        assert!(page.contains("Data written: 64 bytes"));
    }

    #[test]
    fn script_close_tags_are_escaped() {
        let summary = DashboardSummary {
            code_languages: [("</script><b>".to_string(), 1)].into_iter().collect(),
            ..DashboardSummary::default()
        };
        let page = render_html(&summary);
        assert!(!page.contains("</script><b>"));
        assert!(page.contains("<\\/script><b>"));
    }
}
