//! Embedded chart extraction
//!
//! The proprietary editor embeds charts as a `<div>` carrying a JSON config
//! attribute and a 2-D data attribute (first row = column headers, first
//! column = row labels). Each chart becomes three outputs registered as new
//! attachments on the note: a rendered image, the data as CSV, and an HTML
//! data table substituted in place of the original markup together with the
//! image and the CSV link.
//!
//! Rendering itself is a collaborator concern behind [`ChartRenderer`]; the
//! built-in renderer emits a simple SVG.

use notedown_core::{Attachment, AttachmentKind, AttachmentPayload};
use regex::{Captures, Regex};
use std::sync::LazyLock;
use thiserror::Error;
use tracing::warn;

static CHART_DIV_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)<div([^>]*class="[^"]*syno-ns-chart-object[^"]*"[^>]*)>\s*</div>"#)
        .expect("chart div regex")
});

/// Chart error type; chart failures are stage-local, logged, never fatal
#[derive(Error, Debug)]
pub enum ChartError {
    /// The chart div lacks a required attribute
    #[error("Chart markup missing attribute '{0}'")]
    MissingAttribute(&'static str),

    /// The config attribute is not the JSON it should be
    #[error("Invalid chart config: {0}")]
    Config(String),

    /// The data attribute is not a usable 2-D table
    #[error("Invalid chart data: {0}")]
    Data(String),

    /// The renderer rejected the table
    #[error("Chart rendering failed: {0}")]
    Render(String),
}

/// The closed set of chart kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Bar,
    Line,
    Pie,
}

impl ChartKind {
    /// Select a kind by the declared chart type string
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "bar" => Some(ChartKind::Bar),
            "line" => Some(ChartKind::Line),
            "pie" => Some(ChartKind::Pie),
            _ => None,
        }
    }
}

/// Parsed chart configuration
#[derive(Debug, Clone)]
pub struct ChartConfig {
    pub kind: ChartKind,
    pub title: String,
}

impl ChartConfig {
    fn from_json(value: &serde_json::Value) -> Result<Self, ChartError> {
        let declared = value
            .get("chartType")
            .and_then(|v| v.as_str())
            .ok_or_else(|| ChartError::Config("missing chartType".to_string()))?;
        let kind = ChartKind::from_key(declared)
            .ok_or_else(|| ChartError::Config(format!("unknown chart type '{}'", declared)))?;
        let title = value
            .get("title")
            .and_then(|v| v.as_str())
            .unwrap_or("Chart")
            .to_string();
        Ok(Self { kind, title })
    }
}

/// Tabular chart data: numeric cells with separate header and row-label axes
#[derive(Debug, Clone)]
pub struct ChartTable {
    /// Column headers; the first entry labels the row-label column
    pub headers: Vec<String>,
    pub row_labels: Vec<String>,
    /// Numeric cells, one inner vec per row
    pub rows: Vec<Vec<f64>>,
    /// Index into `rows[i]` of the percent column, when present
    percent_col: Option<usize>,
}

impl ChartTable {
    /// Parse the 2-D data attribute: first row headers, first column labels
    pub fn from_json(value: &serde_json::Value) -> Result<Self, ChartError> {
        let grid = value
            .as_array()
            .ok_or_else(|| ChartError::Data("expected a 2-D array".to_string()))?;
        if grid.len() < 2 {
            return Err(ChartError::Data("need a header row and data rows".to_string()));
        }

        let headers: Vec<String> = grid[0]
            .as_array()
            .ok_or_else(|| ChartError::Data("header row is not an array".to_string()))?
            .iter()
            .map(cell_text)
            .collect();

        let mut row_labels = Vec::new();
        let mut rows = Vec::new();
        for raw_row in &grid[1..] {
            let cells = raw_row
                .as_array()
                .ok_or_else(|| ChartError::Data("data row is not an array".to_string()))?;
            if cells.is_empty() {
                continue;
            }
            row_labels.push(cell_text(&cells[0]));
            let values: Result<Vec<f64>, ChartError> = cells[1..].iter().map(cell_number).collect();
            rows.push(values?);
        }

        Ok(Self {
            headers,
            row_labels,
            rows,
            percent_col: None,
        })
    }

    /// Derived table for pie charts: appends a per-row sum column and a
    /// percent-of-grand-total column. Percent values keep full floating
    /// precision; only the HTML rendering rounds them.
    pub fn with_totals(&self) -> ChartTable {
        let grand_total: f64 = self.rows.iter().flatten().sum();
        let mut headers = self.headers.clone();
        headers.push("sum".to_string());
        headers.push("percent".to_string());

        let rows: Vec<Vec<f64>> = self
            .rows
            .iter()
            .map(|row| {
                let sum: f64 = row.iter().sum();
                let percent = if grand_total == 0.0 {
                    0.0
                } else {
                    sum / grand_total * 100.0
                };
                let mut extended = row.clone();
                extended.push(sum);
                extended.push(percent);
                extended
            })
            .collect();

        let percent_col = rows.first().map(|r| r.len() - 1);
        ChartTable {
            headers,
            row_labels: self.row_labels.clone(),
            rows,
            percent_col,
        }
    }

    /// Serialize as CSV text, full precision
    pub fn to_csv(&self) -> String {
        let mut out = String::new();
        out.push_str(&join_csv_row(self.headers.iter().map(String::as_str)));
        out.push('\n');
        for (label, row) in self.row_labels.iter().zip(&self.rows) {
            let cells: Vec<String> = std::iter::once(label.clone())
                .chain(row.iter().map(|v| format_number(*v)))
                .collect();
            out.push_str(&join_csv_row(cells.iter().map(String::as_str)));
            out.push('\n');
        }
        out
    }

    /// Render as an HTML table with bold header row and bold first column.
    /// The percent column, when present, is rounded to 2 decimal places.
    pub fn to_html_table(&self) -> String {
        let mut out = String::from("<table><thead><tr>");
        for header in &self.headers {
            out.push_str(&format!("<th><strong>{}</strong></th>", header));
        }
        out.push_str("</tr></thead><tbody>");
        for (label, row) in self.row_labels.iter().zip(&self.rows) {
            out.push_str(&format!("<tr><td><strong>{}</strong></td>", label));
            for (col, value) in row.iter().enumerate() {
                let text = if self.percent_col == Some(col) {
                    format!("{:.2}", value)
                } else {
                    format_number(*value)
                };
                out.push_str(&format!("<td>{}</td>", text));
            }
            out.push_str("</tr>");
        }
        out.push_str("</tbody></table>");
        out
    }

    /// Per-row sums, the series pie slices are drawn from
    pub fn row_sums(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.iter().sum()).collect()
    }
}

fn cell_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn cell_number(value: &serde_json::Value) -> Result<f64, ChartError> {
    match value {
        serde_json::Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| ChartError::Data(format!("non-finite number {}", n))),
        serde_json::Value::String(s) => s
            .trim()
            .parse()
            .map_err(|_| ChartError::Data(format!("non-numeric cell '{}'", s))),
        other => Err(ChartError::Data(format!("non-numeric cell {}", other))),
    }
}

fn format_number(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        format!("{}", v)
    }
}

fn join_csv_row<'a>(cells: impl Iterator<Item = &'a str>) -> String {
    cells
        .map(|cell| {
            if cell.contains(',') || cell.contains('"') || cell.contains('\n') {
                format!("\"{}\"", cell.replace('"', "\"\""))
            } else {
                cell.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(",")
}

/// Renders tabular chart data to an opaque image blob
pub trait ChartRenderer {
    /// File extension of the produced image
    fn extension(&self) -> &'static str;

    /// Render the table as an image for the given chart kind
    fn render(&self, config: &ChartConfig, table: &ChartTable) -> Result<Vec<u8>, ChartError>;
}

/// Built-in renderer producing a minimal SVG per chart kind
pub struct SvgChartRenderer;

const SVG_WIDTH: f64 = 640.0;
const SVG_HEIGHT: f64 = 400.0;
const PALETTE: [&str; 6] = [
    "#4e79a7", "#f28e2b", "#e15759", "#76b7b2", "#59a14f", "#edc948",
];

impl ChartRenderer for SvgChartRenderer {
    fn extension(&self) -> &'static str {
        "svg"
    }

    fn render(&self, config: &ChartConfig, table: &ChartTable) -> Result<Vec<u8>, ChartError> {
        if table.rows.is_empty() {
            return Err(ChartError::Render("no data rows".to_string()));
        }
        let mut svg = format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\">\n<text x=\"{tx}\" y=\"24\" text-anchor=\"middle\" font-size=\"18\">{title}</text>\n",
            w = SVG_WIDTH,
            h = SVG_HEIGHT,
            tx = SVG_WIDTH / 2.0,
            title = config.title
        );
        match config.kind {
            ChartKind::Bar => svg.push_str(&bar_body(table)),
            ChartKind::Line => svg.push_str(&line_body(table)),
            ChartKind::Pie => svg.push_str(&pie_body(table)),
        }
        svg.push_str("</svg>\n");
        Ok(svg.into_bytes())
    }
}

fn series(table: &ChartTable) -> Vec<f64> {
    // One value per row label: the first data column
    table.rows.iter().map(|r| r.first().copied().unwrap_or(0.0)).collect()
}

fn bar_body(table: &ChartTable) -> String {
    let values = series(table);
    let max = values.iter().cloned().fold(f64::MIN, f64::max).max(1.0);
    let plot_h = SVG_HEIGHT - 80.0;
    let slot = SVG_WIDTH / values.len() as f64;
    let mut out = String::new();
    for (i, (value, label)) in values.iter().zip(&table.row_labels).enumerate() {
        let height = value / max * plot_h;
        let x = i as f64 * slot + slot * 0.15;
        let y = 40.0 + (plot_h - height);
        out.push_str(&format!(
            "<rect x=\"{:.1}\" y=\"{:.1}\" width=\"{:.1}\" height=\"{:.1}\" fill=\"{}\"/>\n",
            x,
            y,
            slot * 0.7,
            height,
            PALETTE[i % PALETTE.len()]
        ));
        out.push_str(&format!(
            "<text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"middle\" font-size=\"12\">{}</text>\n",
            x + slot * 0.35,
            SVG_HEIGHT - 16.0,
            label
        ));
    }
    out
}

fn line_body(table: &ChartTable) -> String {
    let values = series(table);
    let max = values.iter().cloned().fold(f64::MIN, f64::max).max(1.0);
    let plot_h = SVG_HEIGHT - 80.0;
    let step = SVG_WIDTH / values.len().max(2) as f64;
    let points: Vec<String> = values
        .iter()
        .enumerate()
        .map(|(i, v)| {
            format!(
                "{:.1},{:.1}",
                i as f64 * step + step / 2.0,
                40.0 + (plot_h - v / max * plot_h)
            )
        })
        .collect();
    format!(
        "<polyline points=\"{}\" fill=\"none\" stroke=\"{}\" stroke-width=\"2\"/>\n",
        points.join(" "),
        PALETTE[0]
    )
}

fn pie_body(table: &ChartTable) -> String {
    let sums = table.row_sums();
    let total: f64 = sums.iter().sum();
    if total <= 0.0 {
        return String::new();
    }
    let (cx, cy, r) = (SVG_WIDTH / 2.0, SVG_HEIGHT / 2.0 + 20.0, 140.0);
    let mut angle = -std::f64::consts::FRAC_PI_2;
    let mut out = String::new();
    for (i, sum) in sums.iter().enumerate() {
        let sweep = sum / total * std::f64::consts::TAU;
        let (x0, y0) = (cx + r * angle.cos(), cy + r * angle.sin());
        let end = angle + sweep;
        let (x1, y1) = (cx + r * end.cos(), cy + r * end.sin());
        let large = if sweep > std::f64::consts::PI { 1 } else { 0 };
        out.push_str(&format!(
            "<path d=\"M{cx:.1},{cy:.1} L{x0:.1},{y0:.1} A{r:.1},{r:.1} 0 {large} 1 {x1:.1},{y1:.1} Z\" fill=\"{}\"/>\n",
            PALETTE[i % PALETTE.len()]
        ));
        angle = end;
    }
    out
}

/// Finds chart markup in one note's content and substitutes the generated
/// image, CSV link, and data table
pub struct ChartProcessor<'a> {
    renderer: &'a dyn ChartRenderer,
    attachment_folder: &'a str,
}

impl<'a> ChartProcessor<'a> {
    pub fn new(renderer: &'a dyn ChartRenderer, attachment_folder: &'a str) -> Self {
        Self {
            renderer,
            attachment_folder,
        }
    }

    /// Replace every chart div in `html`. Returns the transformed content and
    /// the generated attachments. A malformed chart is logged and left
    /// untouched; sibling charts and notes are unaffected.
    pub fn process(&self, html: &str, note_stem: &str) -> (String, Vec<Attachment>) {
        let mut attachments = Vec::new();
        let mut index = 0usize;
        let out = CHART_DIV_REGEX.replace_all(html, |caps: &Captures| {
            index += 1;
            let attrs = caps.get(1).map_or("", |m| m.as_str());
            match self.convert_chart(attrs, note_stem, index) {
                Ok((replacement, image, csv)) => {
                    attachments.push(image);
                    attachments.push(csv);
                    replacement
                }
                Err(e) => {
                    warn!("Skipping malformed chart in '{}': {}", note_stem, e);
                    caps.get(0).map_or("", |m| m.as_str()).to_string()
                }
            }
        });
        (out.into_owned(), attachments)
    }

    fn convert_chart(
        &self,
        attrs: &str,
        note_stem: &str,
        index: usize,
    ) -> Result<(String, Attachment, Attachment), ChartError> {
        let config_text = attribute(attrs, "chart-config")
            .ok_or(ChartError::MissingAttribute("chart-config"))?;
        let data_text =
            attribute(attrs, "chart-data").ok_or(ChartError::MissingAttribute("chart-data"))?;

        let config_json: serde_json::Value =
            serde_json::from_str(&config_text).map_err(|e| ChartError::Config(e.to_string()))?;
        let data_json: serde_json::Value =
            serde_json::from_str(&data_text).map_err(|e| ChartError::Data(e.to_string()))?;

        let config = ChartConfig::from_json(&config_json)?;
        let table = ChartTable::from_json(&data_json)?;
        // Pie charts carry derived sum/percent columns through every output
        let table = match config.kind {
            ChartKind::Pie => table.with_totals(),
            _ => table,
        };

        let image_bytes = self.renderer.render(&config, &table)?;
        let image = Attachment::new(
            AttachmentKind::ChartImage,
            format!("{}-chart-{}.{}", note_stem, index, self.renderer.extension()),
            None,
            AttachmentPayload::Bytes(image_bytes),
        );
        let csv = Attachment::new(
            AttachmentKind::ChartCsv,
            format!("{}-chart-{}.csv", note_stem, index),
            None,
            AttachmentPayload::Text(table.to_csv()),
        );

        let replacement = format!(
            "<p>{}</p><p><a href=\"{}\">Chart data file</a></p>{}",
            image.html_link(self.attachment_folder),
            csv.notebook_relative_path(self.attachment_folder),
            table.to_html_table()
        );
        Ok((replacement, image, csv))
    }
}

/// Pull a named attribute value out of a tag's attribute text and unescape
/// the HTML entities the editor uses when embedding JSON
fn attribute(attrs: &str, name: &str) -> Option<String> {
    let pattern = format!("{}=\"", name);
    let start = attrs.find(&pattern)? + pattern.len();
    let end = attrs[start..].find('"')? + start;
    Some(unescape_html(&attrs[start..end]))
}

fn unescape_html(text: &str) -> String {
    text.replace("&quot;", "\"")
        .replace("&#34;", "\"")
        .replace("&#39;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chart_div(kind: &str) -> String {
        format!(
            r#"<div class="syno-ns-chart-object" chart-config="{{&quot;chartType&quot;:&quot;{}&quot;,&quot;title&quot;:&quot;Sales&quot;,&quot;legend&quot;:true}}" chart-data="[[&quot;&quot;,&quot;Q1&quot;,&quot;Q2&quot;],[&quot;North&quot;,10,20],[&quot;South&quot;,30,40]]"></div>"#,
            kind
        )
    }

    #[test]
    fn test_table_from_json() {
        let value: serde_json::Value =
            serde_json::from_str(r#"[["","Q1","Q2"],["North",10,20],["South","30",40]]"#).unwrap();
        let table = ChartTable::from_json(&value).unwrap();
        assert_eq!(table.headers, vec!["", "Q1", "Q2"]);
        assert_eq!(table.row_labels, vec!["North", "South"]);
        assert_eq!(table.rows, vec![vec![10.0, 20.0], vec![30.0, 40.0]]);
    }

    #[test]
    fn test_pie_percent_column_sums_to_100() {
        let value: serde_json::Value =
            serde_json::from_str(r#"[["","a","b"],["r1",10,20],["r2",30,40],["r3",1,2]]"#).unwrap();
        let table = ChartTable::from_json(&value).unwrap().with_totals();
        let percent_col = table.rows[0].len() - 1;
        let total: f64 = table.rows.iter().map(|r| r[percent_col]).sum();
        assert!((total - 100.0).abs() < 1e-9, "percent total was {}", total);
        assert_eq!(*table.headers.last().unwrap(), "percent");
    }

    #[test]
    fn test_html_table_rounds_percent_to_two_decimals() {
        let value: serde_json::Value =
            serde_json::from_str(r#"[["","a"],["r1",1],["r2",2]]"#).unwrap();
        let table = ChartTable::from_json(&value).unwrap().with_totals();
        let html = table.to_html_table();
        assert!(html.contains("<td>33.33</td>"), "html was {}", html);
        assert!(html.contains("<td>66.67</td>"));
        assert!(html.contains("<th><strong>percent</strong></th>"));
        assert!(html.contains("<td><strong>r1</strong></td>"));
    }

    #[test]
    fn test_csv_output() {
        let value: serde_json::Value =
            serde_json::from_str(r#"[["","Q1"],["North, East",10.5]]"#).unwrap();
        let table = ChartTable::from_json(&value).unwrap();
        let csv = table.to_csv();
        assert_eq!(csv, ",Q1\n\"North, East\",10.5\n");
    }

    #[test]
    fn test_process_replaces_chart_markup() {
        let renderer = SvgChartRenderer;
        let proc = ChartProcessor::new(&renderer, "attachments");
        let html = format!("<p>before</p>{}<p>after</p>", chart_div("bar"));
        let (out, attachments) = proc.process(&html, "my-note");

        assert!(!out.contains("syno-ns-chart-object"));
        assert!(out.contains("<img src=\"attachments/my-note-chart-1.svg\">"));
        assert!(out.contains("<a href=\"attachments/my-note-chart-1.csv\">Chart data file</a>"));
        assert!(out.contains("<table>"));
        assert_eq!(attachments.len(), 2);
        assert_eq!(attachments[0].kind, AttachmentKind::ChartImage);
        assert_eq!(attachments[1].kind, AttachmentKind::ChartCsv);
    }

    #[test]
    fn test_malformed_chart_left_in_place() {
        let renderer = SvgChartRenderer;
        let proc = ChartProcessor::new(&renderer, "attachments");
        let html = r#"<div class="syno-ns-chart-object" chart-config="{broken" chart-data="[]"></div>"#;
        let (out, attachments) = proc.process(html, "my-note");
        assert_eq!(out, html);
        assert!(attachments.is_empty());
    }

    #[test]
    fn test_pie_chart_renders_slices() {
        let renderer = SvgChartRenderer;
        let proc = ChartProcessor::new(&renderer, "attachments");
        let html = chart_div("pie");
        let (out, attachments) = proc.process(&html, "n");
        assert!(out.contains("percent"));
        let AttachmentPayload::Bytes(svg) = &attachments[0].payload else {
            panic!("expected rendered bytes");
        };
        let svg = std::str::from_utf8(svg).unwrap();
        assert!(svg.contains("<path"));
    }

    #[test]
    fn test_unknown_chart_type_is_skipped() {
        let renderer = SvgChartRenderer;
        let proc = ChartProcessor::new(&renderer, "attachments");
        let html = chart_div("scatter");
        let (out, attachments) = proc.process(&html, "n");
        assert_eq!(out, html);
        assert!(attachments.is_empty());
    }
}
