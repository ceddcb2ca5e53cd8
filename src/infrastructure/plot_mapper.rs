// Mapper to convert chart artifacts into declarative plot specs
use crate::domain::chart::{AxisValue, ChartData, ChartKind, ChartPoint, MarkKind, SeriesData};
use serde_json::{Value, json};

const HIGHLIGHT_STROKE: &str = "#000000";

/// Plot spec understood by the front-end charting collaborator.
pub fn chart_to_plot(chart: &ChartData) -> Value {
    let mut marks: Vec<Value> = chart.series.iter().map(series_to_mark).collect();
    marks.extend(chart.series.iter().filter_map(highlight_mark));
    if chart.kind == ChartKind::Ranking {
        marks.extend(chart.series.iter().map(value_labels));
    }

    let (x, y) = match chart.kind {
        ChartKind::Trend => (
            json!({ "type": "utc", "label": chart.x_label }),
            json!({ "label": chart.y_label, "domain": chart.y_domain, "grid": true }),
        ),
        ChartKind::Bars => (
            json!({ "type": "band", "label": chart.x_label, "tickFormat": "%b %d %H:%M" }),
            json!({ "label": chart.y_label, "domain": chart.y_domain, "grid": true }),
        ),
        // Horizontal bars: the value runs along x
        ChartKind::Ranking => (
            json!({ "label": chart.x_label, "domain": chart.y_domain, "grid": true }),
            json!({ "type": "band", "label": chart.y_label }),
        ),
    };

    json!({
        "id": chart.id,
        "title": chart.title,
        "kind": chart.kind,
        "x": x,
        "y": y,
        "marks": marks,
    })
}

fn series_to_mark(series: &SeriesData) -> Value {
    let data: Vec<Value> = series.points.iter().map(|p| point_to_datum(series.mark, p)).collect();

    let mut mark = json!({
        "type": series.mark,
        "series": series.id,
        "name": series.name,
        "data": data,
        "tip": true,
    });
    if let Some(stroke) = series.stroke {
        mark["stroke"] = json!(stroke);
        mark["strokeOpacity"] = json!(series.opacity);
    }
    mark
}

fn point_to_datum(mark: MarkKind, point: &ChartPoint) -> Value {
    let (x, y) = match mark {
        MarkKind::BarX => (json!(point.value), axis_value(&point.x)),
        _ => (axis_value(&point.x), json!(point.value)),
    };

    let mut datum = json!({
        "x": x,
        "y": y,
        "fillOpacity": point.opacity,
    });
    if let Some(fill) = point.fill {
        datum["fill"] = json!(fill);
    }
    if !point.tooltip.is_empty() {
        datum["title"] = json!(tooltip_text(&point.tooltip));
    }
    datum
}

fn axis_value(x: &AxisValue) -> Value {
    match x {
        AxisValue::Time(ts) => json!(ts),
        AxisValue::Category(name) => json!(name),
    }
}

fn tooltip_text(rows: &[(String, String)]) -> String {
    rows.iter()
        .map(|(key, value)| format!("{}: {}", key, value))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Outline overlay for highlighted points: a ring for dots, a box for bars.
fn highlight_mark(series: &SeriesData) -> Option<Value> {
    let highlighted: Vec<Value> = series
        .points
        .iter()
        .filter(|p| p.highlight)
        .map(|p| point_to_datum(series.mark, p))
        .collect();
    if highlighted.is_empty() {
        return None;
    }

    let mut mark = json!({
        "type": series.mark,
        "series": format!("{}:highlight", series.id),
        "data": highlighted,
        "fill": "none",
        "stroke": HIGHLIGHT_STROKE,
        "strokeWidth": 2,
    });
    if series.mark == MarkKind::Dot {
        mark["r"] = json!(8);
    }
    Some(mark)
}

fn value_labels(series: &SeriesData) -> Value {
    let data: Vec<Value> = series
        .points
        .iter()
        .map(|p| {
            json!({
                "x": p.value,
                "y": axis_value(&p.x),
                "text": format!("{}", p.value.round()),
            })
        })
        .collect();

    json!({
        "type": "text",
        "series": format!("{}:labels", series.id),
        "data": data,
        "textAnchor": "start",
        "dx": 4,
    })
}
