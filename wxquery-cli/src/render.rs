use std::{fs, path::PathBuf};

use wxquery_core::{ChartInstance, ChartRenderer, ChartSpec, RenderError};

const CHART_JS_CDN: &str = "https://cdn.jsdelivr.net/npm/chart.js";

/// Writes a standalone HTML page drawing the chart with Chart.js.
#[derive(Debug, Clone)]
pub struct HtmlChartRenderer {
    path: PathBuf,
}

impl HtmlChartRenderer {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

/// Destroying the chart removes its file.
#[derive(Debug)]
pub struct HtmlChart {
    path: PathBuf,
}

impl ChartInstance for HtmlChart {
    fn destroy(self: Box<Self>) {
        if let Err(err) = fs::remove_file(&self.path) {
            log::warn!("Failed to remove chart {}: {err}", self.path.display());
        }
    }
}

impl ChartRenderer for HtmlChartRenderer {
    fn render(&mut self, spec: &ChartSpec) -> Result<Box<dyn ChartInstance>, RenderError> {
        let config = serde_json::to_string(&spec.to_chartjs())?;
        let page = html_page(&config);

        fs::write(&self.path, page)
            .map_err(|source| RenderError::Write { path: self.path.clone(), source })?;

        log::info!("Chart written to {}", self.path.display());
        Ok(Box::new(HtmlChart { path: self.path.clone() }))
    }
}

fn html_page(config_json: &str) -> String {
    // Keep the JSON from closing the script element early.
    let config_json = config_json.replace("</", "<\\/");

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Weather chart</title>
<script src="{CHART_JS_CDN}"></script>
<style>#chart-container {{ position: relative; height: 80vh; }}</style>
</head>
<body>
<div id="chart-container"><canvas id="weather-chart"></canvas></div>
<script>
new Chart(document.getElementById('weather-chart').getContext('2d'), {config_json});
</script>
</body>
</html>
"#
    )
}
