use std::collections::HashMap;
use std::fmt;

use crate::color::{generate_palette, lighten, Rgb};
use crate::data::model::{Column, Dataset, Value};
use crate::error::{InsightError, Result};

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Line,
    Bar,
    Scatter,
    Pie,
    Sunburst,
}

impl ChartKind {
    pub const ALL: [ChartKind; 5] = [
        ChartKind::Line,
        ChartKind::Bar,
        ChartKind::Sunburst,
        ChartKind::Scatter,
        ChartKind::Pie,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ChartKind::Line => "line",
            ChartKind::Bar => "bar",
            ChartKind::Scatter => "scatter",
            ChartKind::Pie => "pie",
            ChartKind::Sunburst => "sunburst",
        }
    }

    /// Download name of the exported raster, e.g. `bar_chart.png`.
    pub fn file_name(self) -> String {
        format!("{}_chart.png", self.name())
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Axis selections for line, bar and scatter charts.
#[derive(Debug, Clone, PartialEq)]
pub struct XyFields {
    pub x: String,
    pub y: String,
    /// Split rows into one series per distinct value of this column.
    pub color: Option<String>,
}

/// A chart kind together with the fields it needs.
#[derive(Debug, Clone, PartialEq)]
pub enum ChartRequest {
    Line(XyFields),
    Bar(XyFields),
    Scatter(XyFields),
    Pie { names: String, values: String },
    Sunburst { path: Vec<String>, values: String },
}

impl ChartRequest {
    pub fn kind(&self) -> ChartKind {
        match self {
            ChartRequest::Line(_) => ChartKind::Line,
            ChartRequest::Bar(_) => ChartKind::Bar,
            ChartRequest::Scatter(_) => ChartKind::Scatter,
            ChartRequest::Pie { .. } => ChartKind::Pie,
            ChartRequest::Sunburst { .. } => ChartKind::Sunburst,
        }
    }
}

// ---------------------------------------------------------------------------
// Built chart
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Chart {
    pub kind: ChartKind,
    pub title: String,
    pub body: ChartBody,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChartBody {
    Cartesian(Cartesian),
    Pie(Vec<Slice>),
    Sunburst(Vec<Sector>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Cartesian {
    pub x_label: String,
    pub y_label: String,
    /// Set when x is categorical: point x values index into this list.
    pub x_categories: Option<Vec<String>>,
    /// Same for y, e.g. the `max` of a text column.
    pub y_categories: Option<Vec<String>>,
    pub series: Vec<Series>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub name: String,
    pub color: Rgb,
    pub points: Vec<(f64, f64)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Slice {
    pub label: String,
    pub value: f64,
    pub color: Rgb,
}

/// One node of a sunburst. `start`/`end` are fractions of the full turn;
/// depth 1 is the innermost ring.
#[derive(Debug, Clone, PartialEq)]
pub struct Sector {
    pub label: String,
    pub depth: usize,
    pub value: f64,
    pub start: f64,
    pub end: f64,
    pub color: Rgb,
}

impl Chart {
    pub fn file_name(&self) -> String {
        self.kind.file_name()
    }

    /// True when there is nothing to draw.
    pub fn is_empty(&self) -> bool {
        match &self.body {
            ChartBody::Cartesian(c) => c.series.iter().all(|s| s.points.is_empty()),
            ChartBody::Pie(slices) => slices.is_empty(),
            ChartBody::Sunburst(sectors) => sectors.is_empty(),
        }
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Map a result table (aggregation or frequency table) to a chart.
///
/// A table with zero rows yields an empty chart rather than an error.
pub fn build_chart(table: &Dataset, request: &ChartRequest) -> Result<Chart> {
    let kind = request.kind();
    let (title, body) = match request {
        ChartRequest::Line(fields) | ChartRequest::Bar(fields) | ChartRequest::Scatter(fields) => (
            format!("{} by {}", fields.y, fields.x),
            ChartBody::Cartesian(cartesian(table, fields)?),
        ),
        ChartRequest::Pie { names, values } => (
            format!("{values} by {names}"),
            ChartBody::Pie(pie(table, names, values)?),
        ),
        ChartRequest::Sunburst { path, values } => (
            format!("{values} by {}", path.join(" / ")),
            ChartBody::Sunburst(sunburst(table, path, values)?),
        ),
    };
    log::debug!("built {kind} chart '{title}'");
    Ok(Chart { kind, title, body })
}

fn field<'a>(table: &'a Dataset, name: &str) -> Result<&'a Column> {
    table
        .column(name)
        .map_err(|_| InsightError::validation(format!("no column named '{name}' in the result table")))
}

fn numeric_field<'a>(table: &'a Dataset, name: &str) -> Result<&'a Column> {
    let col = field(table, name)?;
    if !col.dtype().is_numeric() {
        return Err(InsightError::Type(format!("'{name}' is not numeric")));
    }
    Ok(col)
}

/// Distinct values in first-appearance order.
fn distinct(values: &[Value]) -> Vec<Value> {
    let mut seen: Vec<Value> = Vec::new();
    for v in values {
        if !seen.contains(v) {
            seen.push(v.clone());
        }
    }
    seen
}

/// Placement of one column's values along an axis: numbers as themselves,
/// anything else at its index among the distinct values.
struct Axis {
    categories: Option<Vec<Value>>,
}

impl Axis {
    fn of(col: &Column) -> Self {
        let categories = (!col.dtype().is_numeric()).then(|| {
            let observed: Vec<Value> = col
                .values
                .iter()
                .filter(|v| !v.is_missing())
                .cloned()
                .collect();
            distinct(&observed)
        });
        Axis { categories }
    }

    fn position(&self, v: &Value) -> Option<f64> {
        match &self.categories {
            Some(cats) => cats.iter().position(|c| c == v).map(|i| i as f64),
            None => v.as_f64(),
        }
    }

    fn labels(self) -> Option<Vec<String>> {
        self.categories
            .map(|cats| cats.iter().map(Value::to_string).collect())
    }
}

/// Label for a tick on a category axis; ticks between categories stay blank.
pub fn category_label(categories: &[String], v: f64) -> String {
    let idx = v.round();
    if (v - idx).abs() > 1e-6 || idx < 0.0 {
        return String::new();
    }
    categories.get(idx as usize).cloned().unwrap_or_default()
}

fn cartesian(table: &Dataset, fields: &XyFields) -> Result<Cartesian> {
    let x = field(table, &fields.x)?;
    let y = field(table, &fields.y)?;
    let color = fields.color.as_deref().map(|c| field(table, c)).transpose()?;

    let (x_axis, y_axis) = (Axis::of(x), Axis::of(y));

    let groups: Vec<Value> = match color {
        Some(col) => distinct(&col.values),
        None => vec![Value::Missing],
    };
    let palette = generate_palette(groups.len().max(1));

    let series = groups
        .iter()
        .enumerate()
        .map(|(i, group)| {
            let points = (0..table.n_rows())
                .filter(|&row| color.map_or(true, |c| &c.values[row] == group))
                .filter_map(|row| {
                    Some((x_axis.position(&x.values[row])?, y_axis.position(&y.values[row])?))
                })
                .collect();
            let name = match color {
                Some(_) => group.to_string(),
                None => fields.y.clone(),
            };
            Series {
                name,
                color: palette[i],
                points,
            }
        })
        .collect();

    Ok(Cartesian {
        x_label: fields.x.clone(),
        y_label: fields.y.clone(),
        x_categories: x_axis.labels(),
        y_categories: y_axis.labels(),
        series,
    })
}

fn pie(table: &Dataset, names: &str, values: &str) -> Result<Vec<Slice>> {
    let labels = field(table, names)?;
    let amounts = numeric_field(table, values)?;

    let mut order: Vec<String> = Vec::new();
    let mut totals: HashMap<String, f64> = HashMap::new();
    for (label, amount) in labels.values.iter().zip(&amounts.values) {
        let Some(amount) = amount.as_f64().filter(|v| *v > 0.0) else {
            continue;
        };
        let label = label.to_string();
        if !totals.contains_key(&label) {
            order.push(label.clone());
        }
        *totals.entry(label).or_insert(0.0) += amount;
    }

    let palette = generate_palette(order.len());
    Ok(order
        .into_iter()
        .zip(palette)
        .map(|(label, color)| Slice {
            value: totals[&label],
            label,
            color,
        })
        .collect())
}

#[derive(Default)]
struct Node {
    label: String,
    value: f64,
    children: Vec<Node>,
}

impl Node {
    fn child(&mut self, label: &str) -> &mut Node {
        let idx = match self.children.iter().position(|c| c.label == label) {
            Some(idx) => idx,
            None => {
                self.children.push(Node {
                    label: label.to_string(),
                    ..Node::default()
                });
                self.children.len() - 1
            }
        };
        &mut self.children[idx]
    }
}

fn sunburst(table: &Dataset, path: &[String], values: &str) -> Result<Vec<Sector>> {
    if path.is_empty() {
        return Err(InsightError::validation("sunburst path needs at least one column"));
    }
    let levels: Vec<&Column> = path.iter().map(|p| field(table, p)).collect::<Result<_>>()?;
    let amounts = numeric_field(table, values)?;

    let mut root = Node::default();
    for row in 0..table.n_rows() {
        let Some(amount) = amounts.values[row].as_f64().filter(|v| *v > 0.0) else {
            continue;
        };
        if levels.iter().any(|l| l.values[row].is_missing()) {
            continue;
        }
        root.value += amount;
        let mut node = &mut root;
        for level in &levels {
            node = node.child(&level.values[row].to_string());
            node.value += amount;
        }
    }

    let palette = generate_palette(root.children.len());
    let mut sectors = Vec::new();
    let mut start = 0.0;
    for (node, color) in root.children.iter().zip(palette) {
        let span = node.value / root.value;
        layout(node, 1, start, span, color, &mut sectors);
        start += span;
    }
    Ok(sectors)
}

fn layout(node: &Node, depth: usize, start: f64, span: f64, color: Rgb, out: &mut Vec<Sector>) {
    out.push(Sector {
        label: node.label.clone(),
        depth,
        value: node.value,
        start,
        end: start + span,
        color,
    });
    let mut child_start = start;
    for child in &node.children {
        let child_span = span * child.value / node.value;
        layout(child, depth + 1, child_start, child_span, lighten(color, 0.25), out);
        child_start += child_span;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::aggregate::{group_by, value_counts, AggOp, GroupBySpec};
    use crate::data::loader::{load_bytes, SourceFormat};

    fn sales() -> Dataset {
        load_bytes(
            b"region,city,sales\nEast,A,10\nEast,B,30\nWest,C,60\nWest,C,\n",
            SourceFormat::Csv,
        )
        .unwrap()
    }

    fn xy(x: &str, y: &str) -> XyFields {
        XyFields {
            x: x.into(),
            y: y.into(),
            color: None,
        }
    }

    #[test]
    fn bar_chart_from_value_counts() {
        let table = value_counts(&sales(), "region", 5).unwrap().to_dataset();
        let chart = build_chart(&table, &ChartRequest::Bar(xy("region", "count"))).unwrap();
        assert_eq!(chart.file_name(), "bar_chart.png");
        let ChartBody::Cartesian(c) = &chart.body else {
            panic!("expected cartesian body");
        };
        assert_eq!(c.x_categories, Some(vec!["East".to_string(), "West".to_string()]));
        assert_eq!(c.y_categories, None);
        assert_eq!(c.series.len(), 1);
        assert_eq!(c.series[0].points, vec![(0.0, 2.0), (1.0, 2.0)]);
    }

    #[test]
    fn color_splits_series() {
        let request = ChartRequest::Scatter(XyFields {
            color: Some("region".into()),
            ..xy("city", "sales")
        });
        let chart = build_chart(&sales(), &request).unwrap();
        let ChartBody::Cartesian(c) = &chart.body else {
            panic!("expected cartesian body");
        };
        let names: Vec<&str> = c.series.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["East", "West"]);
        // the missing sales cell is skipped
        assert_eq!(c.series[1].points, vec![(2.0, 60.0)]);
    }

    #[test]
    fn pie_sums_duplicate_labels() {
        let chart = build_chart(
            &sales(),
            &ChartRequest::Pie {
                names: "region".into(),
                values: "sales".into(),
            },
        )
        .unwrap();
        let ChartBody::Pie(slices) = &chart.body else {
            panic!("expected pie body");
        };
        let pairs: Vec<(&str, f64)> = slices.iter().map(|s| (s.label.as_str(), s.value)).collect();
        assert_eq!(pairs, vec![("East", 40.0), ("West", 60.0)]);
    }

    #[test]
    fn sunburst_nests_path_levels() {
        let spec = GroupBySpec {
            keys: vec!["region".into(), "city".into()],
            target: "sales".into(),
            op: AggOp::Sum,
        };
        let table = group_by(&sales(), &spec).unwrap().to_dataset();
        let chart = build_chart(
            &table,
            &ChartRequest::Sunburst {
                path: vec!["region".into(), "city".into()],
                values: "sales_sum".into(),
            },
        )
        .unwrap();
        let ChartBody::Sunburst(sectors) = &chart.body else {
            panic!("expected sunburst body");
        };
        let inner: Vec<&Sector> = sectors.iter().filter(|s| s.depth == 1).collect();
        assert_eq!(inner.len(), 2);
        assert!((inner[0].end - 0.4).abs() < 1e-9);
        assert!((inner[1].end - 1.0).abs() < 1e-9);
        let outer = sectors.iter().filter(|s| s.depth == 2).count();
        assert_eq!(outer, 3);
    }

    #[test]
    fn empty_sunburst_path_is_rejected() {
        let err = build_chart(
            &sales(),
            &ChartRequest::Sunburst {
                path: vec![],
                values: "sales".into(),
            },
        )
        .unwrap_err();
        assert!(matches!(err, InsightError::Validation(_)));
    }

    #[test]
    fn unknown_field_is_a_validation_error() {
        let err = build_chart(&sales(), &ChartRequest::Line(xy("city", "profit"))).unwrap_err();
        assert!(matches!(err, InsightError::Validation(_)));
    }

    #[test]
    fn text_pie_values_are_a_type_error() {
        let err = build_chart(
            &sales(),
            &ChartRequest::Pie {
                names: "region".into(),
                values: "city".into(),
            },
        )
        .unwrap_err();
        assert!(matches!(err, InsightError::Type(_)));
    }

    #[test]
    fn text_y_gets_a_category_axis() {
        let spec = GroupBySpec {
            keys: vec!["region".into()],
            target: "city".into(),
            op: AggOp::Max,
        };
        let table = group_by(&sales(), &spec).unwrap().to_dataset();
        let chart = build_chart(&table, &ChartRequest::Line(xy("region", "city_max"))).unwrap();
        let ChartBody::Cartesian(c) = &chart.body else {
            panic!("expected cartesian body");
        };
        assert_eq!(c.y_categories, Some(vec!["B".to_string(), "C".to_string()]));
        assert_eq!(c.series[0].points, vec![(0.0, 0.0), (1.0, 1.0)]);
    }

    #[test]
    fn missing_y_cells_are_not_categories() {
        let table = load_bytes(b"k,label\n1,a\n2,\n3,b\n", SourceFormat::Csv).unwrap();
        let chart = build_chart(&table, &ChartRequest::Scatter(xy("k", "label"))).unwrap();
        let ChartBody::Cartesian(c) = &chart.body else {
            panic!("expected cartesian body");
        };
        assert_eq!(c.y_categories, Some(vec!["a".to_string(), "b".to_string()]));
        assert_eq!(c.series[0].points, vec![(1.0, 0.0), (3.0, 1.0)]);
    }

    #[test]
    fn empty_table_gives_empty_chart() {
        let table = load_bytes(b"city,sales_sum\n", SourceFormat::Csv).unwrap();
        for request in [
            ChartRequest::Line(xy("city", "sales_sum")),
            ChartRequest::Pie {
                names: "city".into(),
                values: "sales_sum".into(),
            },
            ChartRequest::Sunburst {
                path: vec!["city".into()],
                values: "sales_sum".into(),
            },
        ] {
            let chart = build_chart(&table, &request).unwrap();
            assert!(chart.is_empty(), "{}", chart.kind);
        }
    }
}
