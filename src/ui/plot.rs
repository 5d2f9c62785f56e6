use std::f64::consts::{FRAC_PI_2, TAU};
use std::ops::RangeInclusive;

use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_plot::{
    Bar, BarChart, GridMark, Legend, Line, Plot, PlotPoint, PlotPoints, PlotUi, Polygon, Text,
};

use crate::color::SeriesColors;
use crate::data::aggregate::{AggregateTable, ChartKind, Key};
use crate::data::model::YearMonth;
use crate::state::AppState;

const CHART_HEIGHT: f32 = 280.0;

// ---------------------------------------------------------------------------
// Dashboard (central panel)
// ---------------------------------------------------------------------------

/// Render every aggregate table as its chart, top to bottom.
pub fn dashboard(ui: &mut Ui, state: &AppState, colors: &SeriesColors) {
    let Some(tables) = &state.tables else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a booking file to start  (File → Open…)");
        });
        return;
    };

    // Shared x-axis for the monthly charts.
    let months: Vec<Key> = state
        .dataset
        .as_ref()
        .and_then(|ds| ds.date_bounds)
        .map(|(lo, hi)| YearMonth::span(YearMonth::of(lo), YearMonth::of(hi)))
        .unwrap_or_default()
        .into_iter()
        .map(Key::Month)
        .collect();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for table in &tables.tables {
                ui.heading(table.title);
                if table.is_empty() {
                    ui.label(RichText::new("No bookings match the current filters.").italics());
                } else {
                    chart(ui, table, colors, &months);
                }
                ui.add_space(12.0);
                ui.separator();
            }
        });
}

fn chart(ui: &mut Ui, table: &AggregateTable, colors: &SeriesColors, months: &[Key]) {
    match table.chart {
        ChartKind::Bar => bar_chart(ui, table, colors),
        ChartKind::GroupedBar => multi_bar_chart(ui, table, colors, false),
        ChartKind::StackedBar => multi_bar_chart(ui, table, colors, true),
        ChartKind::Line => line_chart(ui, table, colors, months),
        ChartKind::Pie => pie_chart(ui, table, colors),
        ChartKind::Radar => radar_chart(ui, table, colors),
    }
}

// ---------------------------------------------------------------------------
// Table → categories × series
// ---------------------------------------------------------------------------

/// One drawable series: label, colour and a value per category (None where
/// the table has no row).
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub name: String,
    pub color: Color32,
    pub values: Vec<Option<f64>>,
}

/// Lay a table out as categories along x and series across them.
///
/// Two-key tables: categories are the first key, series the second.
/// Single-key tables: categories are the key, series the metric columns.
/// A non-empty `axis` replaces the categories found in the table.
pub fn series_matrix(
    table: &AggregateTable,
    colors: &SeriesColors,
    axis: &[Key],
) -> (Vec<String>, Vec<Series>) {
    let categories: Vec<&Key> = if axis.is_empty() {
        table.primary_keys()
    } else {
        axis.iter().collect()
    };
    let labels = categories.iter().map(|k| k.to_string()).collect();

    if table.key_columns.len() >= 2 {
        let mut series_keys: Vec<&Key> = table.rows.iter().filter_map(|r| r.keys.get(1)).collect();
        series_keys.sort();
        series_keys.dedup();

        let series = series_keys
            .into_iter()
            .map(|sk| Series {
                name: sk.to_string(),
                color: colors.for_key(sk),
                values: categories
                    .iter()
                    .map(|ck| table.value(&[(*ck).clone(), sk.clone()], table.metric_columns[0]))
                    .collect(),
            })
            .collect();
        (labels, series)
    } else {
        let series = table
            .metric_columns
            .iter()
            .enumerate()
            .map(|(i, name)| Series {
                name: name.to_string(),
                color: colors.metric(i),
                values: categories
                    .iter()
                    .map(|ck| table.value(&[(*ck).clone()], name))
                    .collect(),
            })
            .collect();
        (labels, series)
    }
}

fn category_formatter(labels: Vec<String>) -> impl Fn(GridMark, &RangeInclusive<f64>) -> String {
    move |mark: GridMark, _range: &RangeInclusive<f64>| {
        let v = mark.value;
        if v < 0.0 || (v - v.round()).abs() > 1e-6 {
            return String::new();
        }
        labels.get(v.round() as usize).cloned().unwrap_or_default()
    }
}

fn x_label(table: &AggregateTable) -> &'static str {
    table.key_columns.first().copied().unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Bars
// ---------------------------------------------------------------------------

/// One bar per row, coloured by its key, showing the last metric column.
fn bar_chart(ui: &mut Ui, table: &AggregateTable, colors: &SeriesColors) {
    let metric = table.metric_columns.len().saturating_sub(1);
    let labels: Vec<String> = table.rows.iter().map(|r| r.keys[0].to_string()).collect();

    Plot::new(table.title)
        .height(CHART_HEIGHT)
        .legend(Legend::default())
        .allow_scroll(false)
        .x_axis_label(x_label(table))
        .y_axis_label(table.metric_columns[metric])
        .x_axis_formatter(category_formatter(labels))
        .show(ui, |plot_ui: &mut PlotUi| {
            for (i, row) in table.rows.iter().enumerate() {
                let value = row.metrics.get(metric).copied().unwrap_or_default();
                let name = row.keys[0].to_string();
                let chart = BarChart::new(vec![Bar::new(i as f64, value).width(0.6).name(&name)])
                    .name(&name)
                    .color(colors.for_key(&row.keys[0]));
                plot_ui.bar_chart(chart);
            }
        });
}

/// Several series per category, either side by side or stacked.
fn multi_bar_chart(ui: &mut Ui, table: &AggregateTable, colors: &SeriesColors, stacked: bool) {
    let (labels, series) = series_matrix(table, colors, &[]);
    let n = series.len().max(1) as f64;
    let width = if stacked { 0.6 } else { 0.8 / n };

    Plot::new(table.title)
        .height(CHART_HEIGHT)
        .legend(Legend::default())
        .allow_scroll(false)
        .x_axis_label(x_label(table))
        .y_axis_label(if table.key_columns.len() >= 2 {
            table.metric_columns[0]
        } else {
            "value"
        })
        .x_axis_formatter(category_formatter(labels))
        .show(ui, |plot_ui: &mut PlotUi| {
            let mut charts: Vec<BarChart> = Vec::new();
            for (s_idx, s) in series.iter().enumerate() {
                let offset = if stacked {
                    0.0
                } else {
                    (s_idx as f64 - (n - 1.0) / 2.0) * width
                };
                let bars: Vec<Bar> = s
                    .values
                    .iter()
                    .enumerate()
                    .map(|(c, v)| Bar::new(c as f64 + offset, v.unwrap_or(0.0)).width(width))
                    .collect();
                let mut chart = BarChart::new(bars).name(&s.name).color(s.color);
                if stacked {
                    let below: Vec<&BarChart> = charts.iter().collect();
                    chart = chart.stack_on(&below);
                }
                charts.push(chart);
            }
            for chart in charts {
                plot_ui.bar_chart(chart);
            }
        });
}

// ---------------------------------------------------------------------------
// Lines
// ---------------------------------------------------------------------------

/// Contiguous stretches of present values as plot points; a missing value
/// breaks the line.
fn segments(values: &[Option<f64>]) -> Vec<Vec<[f64; 2]>> {
    let mut out: Vec<Vec<[f64; 2]>> = Vec::new();
    let mut current: Vec<[f64; 2]> = Vec::new();
    for (i, v) in values.iter().enumerate() {
        match v {
            Some(y) => current.push([i as f64, *y]),
            None if !current.is_empty() => out.push(std::mem::take(&mut current)),
            None => {}
        }
    }
    if !current.is_empty() {
        out.push(current);
    }
    out
}

/// One line per series over the shared month axis; months without a row
/// leave a gap.
fn line_chart(ui: &mut Ui, table: &AggregateTable, colors: &SeriesColors, months: &[Key]) {
    let (labels, series) = series_matrix(table, colors, months);

    Plot::new(table.title)
        .height(CHART_HEIGHT)
        .legend(Legend::default())
        .allow_scroll(false)
        .x_axis_label(x_label(table))
        .y_axis_label(table.metric_columns[0])
        .x_axis_formatter(category_formatter(labels))
        .show(ui, |plot_ui: &mut PlotUi| {
            for s in &series {
                for segment in segments(&s.values) {
                    let points: PlotPoints = if segment.len() == 1 {
                        // A lone month still needs a visible mark.
                        let [x, y] = segment[0];
                        vec![[x - 0.05, y], [x + 0.05, y]].into_iter().collect()
                    } else {
                        segment.into_iter().collect()
                    };
                    plot_ui.line(Line::new(points).name(&s.name).color(s.color).width(2.0));
                }
            }
        });
}

// ---------------------------------------------------------------------------
// Pie
// ---------------------------------------------------------------------------

fn arc(start: f64, sweep: f64) -> Vec<[f64; 2]> {
    let steps = ((sweep.abs() / TAU) * 96.0).ceil().max(2.0) as usize;
    let mut pts = vec![[0.0, 0.0]];
    pts.extend((0..=steps).map(|k| {
        let a = start - sweep * k as f64 / steps as f64;
        [a.cos(), a.sin()]
    }));
    pts
}

/// Slices clockwise from twelve o'clock, one per row.
fn pie_chart(ui: &mut Ui, table: &AggregateTable, colors: &SeriesColors) {
    Plot::new(table.title)
        .height(CHART_HEIGHT)
        .legend(Legend::default())
        .data_aspect(1.0)
        .show_axes(false)
        .show_grid(false)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .show(ui, |plot_ui: &mut PlotUi| {
            let mut angle = FRAC_PI_2;
            for row in &table.rows {
                let share = row.metrics.first().copied().unwrap_or_default();
                let sweep = share * TAU;
                let color = colors.for_key(&row.keys[0]);
                plot_ui.polygon(
                    Polygon::new(arc(angle, sweep).into_iter().collect::<PlotPoints>())
                        .name(row.keys[0].to_string())
                        .fill_color(color)
                        .stroke(egui::Stroke::new(1.0, Color32::WHITE)),
                );
                let mid = angle - sweep / 2.0;
                plot_ui.text(Text::new(
                    PlotPoint::new(0.65 * mid.cos(), 0.65 * mid.sin()),
                    format!("{:.1}%", share * 100.0),
                ));
                angle -= sweep;
            }
        });
}

// ---------------------------------------------------------------------------
// Radar
// ---------------------------------------------------------------------------

fn spoke(i: usize, n: usize) -> f64 {
    FRAC_PI_2 - TAU * i as f64 / n as f64
}

/// One closed polygon per row over the metric axes (values already in 0..=1).
fn radar_chart(ui: &mut Ui, table: &AggregateTable, colors: &SeriesColors) {
    let axes = table.metric_columns;
    let n = axes.len();

    Plot::new(table.title)
        .height(CHART_HEIGHT + 60.0)
        .legend(Legend::default())
        .data_aspect(1.0)
        .show_axes(false)
        .show_grid(false)
        .allow_scroll(false)
        .show(ui, |plot_ui: &mut PlotUi| {
            for (i, axis) in axes.iter().enumerate() {
                let a = spoke(i, n);
                let tip = [a.cos(), a.sin()];
                let axis_line: PlotPoints = vec![[0.0, 0.0], tip].into_iter().collect();
                plot_ui.line(Line::new(axis_line).color(Color32::DARK_GRAY));
                plot_ui.text(Text::new(PlotPoint::new(1.15 * tip[0], 1.15 * tip[1]), *axis));
            }
            for row in &table.rows {
                let color = colors.for_key(&row.keys[0]);
                let points: PlotPoints = row
                    .metrics
                    .iter()
                    .enumerate()
                    .map(|(i, v)| {
                        let a = spoke(i, n);
                        [v * a.cos(), v * a.sin()]
                    })
                    .collect();
                plot_ui.polygon(
                    Polygon::new(points)
                        .name(row.keys[0].to_string())
                        .fill_color(color.gamma_multiply(0.25))
                        .stroke(egui::Stroke::new(2.0, color)),
                );
            }
        });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::aggregate::{AggregateRow, TableKind};
    use crate::data::model::{GroupType, Hotel};

    fn row(keys: Vec<Key>, metrics: Vec<f64>) -> AggregateRow {
        AggregateRow { keys, metrics }
    }

    #[test]
    fn two_key_table_fills_gaps_with_none() {
        let table = AggregateTable::new(
            TableKind::HotelPreference,
            vec![
                row(vec![Key::Group(GroupType::Couple), Key::Hotel(Hotel::City)], vec![3.0]),
                row(vec![Key::Group(GroupType::Couple), Key::Hotel(Hotel::Resort)], vec![1.0]),
                row(vec![Key::Group(GroupType::Single), Key::Hotel(Hotel::Resort)], vec![2.0]),
            ],
        );
        let (labels, series) = series_matrix(&table, &SeriesColors::default(), &[]);
        assert_eq!(labels, vec!["Couple", "Single"]);
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].name, "City Hotel");
        assert_eq!(series[0].values, vec![Some(3.0), None]);
        assert_eq!(series[1].values, vec![Some(1.0), Some(2.0)]);
    }

    #[test]
    fn single_key_table_uses_metric_columns() {
        let table = AggregateTable::new(
            TableKind::OperatingCosts,
            vec![row(vec![Key::Group(GroupType::Family)], vec![3.0, 1.5, 2.0])],
        );
        let (labels, series) = series_matrix(&table, &SeriesColors::default(), &[]);
        assert_eq!(labels, vec!["Family"]);
        let names: Vec<&str> = series.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["total_nights", "total_of_special_requests", "is_canceled_x10"]);
        assert_eq!(series[2].values, vec![Some(2.0)]);
    }

    #[test]
    fn monthly_table_follows_shared_axis() {
        let ym = |month| Key::Month(YearMonth { year: 2016, month });
        let table = AggregateTable::new(
            TableKind::MonthlyCancellations,
            vec![
                row(vec![ym(5), Key::Group(GroupType::Couple)], vec![2.0]),
                row(vec![ym(7), Key::Group(GroupType::Couple)], vec![1.0]),
            ],
        );
        let axis = vec![ym(4), ym(5), ym(6), ym(7)];
        let (labels, series) = series_matrix(&table, &SeriesColors::default(), &axis);
        assert_eq!(labels, vec!["2016-04", "2016-05", "2016-06", "2016-07"]);
        assert_eq!(series[0].values, vec![None, Some(2.0), None, Some(1.0)]);
    }

    #[test]
    fn missing_months_break_the_line() {
        let runs = segments(&[None, Some(2.0), Some(3.0), None, Some(1.0)]);
        assert_eq!(runs, vec![vec![[1.0, 2.0], [2.0, 3.0]], vec![[4.0, 1.0]]]);
        assert!(segments(&[None, None]).is_empty());
    }

    #[test]
    fn full_pie_arc_closes() {
        let pts = arc(FRAC_PI_2, TAU);
        let first = pts[1];
        let last = pts[pts.len() - 1];
        assert!((first[0] - last[0]).abs() < 1e-9);
        assert!((first[1] - last[1]).abs() < 1e-9);
    }
}
