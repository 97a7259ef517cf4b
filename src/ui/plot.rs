use eframe::egui::Ui;
use egui_plot::{Legend, MarkerShape, Plot, PlotPoint, PlotPoints, Points};

use crate::data::evaluate::{ScatterKind, ScatterPoint, ScatterSet};
use crate::data::model::HotelDataset;
use crate::state::AppState;

const PLOT_HEIGHT: f32 = 280.0;

// ---------------------------------------------------------------------------
// Scatter plots (central panel)
// ---------------------------------------------------------------------------

/// Render one plot per scatter set of the current evaluation.
pub fn scatter_plots(ui: &mut Ui, state: &AppState) {
    let (Some(dataset), Some(eval)) = (&state.dataset, &state.evaluation) else {
        return;
    };

    for set in &eval.scatter {
        ui.strong(set.kind.title());
        scatter_plot(ui, state, dataset, set);
        ui.add_space(8.0);
    }
}

fn scatter_plot(ui: &mut Ui, state: &AppState, dataset: &HotelDataset, set: &ScatterSet) {
    let (x_label, y_label) = set.kind.axis_labels();
    let max_z = set
        .points
        .iter()
        .filter_map(|p| p.z)
        .fold(0.0_f64, f64::max);
    // Owned copies for the hover closure.
    let points = set.points.clone();
    let names: Vec<String> = set
        .points
        .iter()
        .map(|p| {
            let record = &dataset.records[p.index];
            format!("{} ({})", record.name, record.city)
        })
        .collect();

    Plot::new(("scatter", set.kind as u8))
        .height(PLOT_HEIGHT)
        .legend(Legend::default())
        .x_axis_label(x_label)
        .y_axis_label(y_label)
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .label_formatter(move |_series, value| hover_label(&points, &names, value))
        .show(ui, |plot_ui| {
            for point in &set.points {
                let region = dataset.records[point.index].prefecture.as_deref();
                let color = state
                    .color_map
                    .as_ref()
                    .map(|cm| cm.color_for(region))
                    .unwrap_or(eframe::egui::Color32::LIGHT_BLUE);

                let radius = match point.z {
                    // Longer walk → bigger bubble.
                    Some(z) if max_z > 0.0 => 2.0 + 8.0 * (z / max_z) as f32,
                    _ => 3.0,
                };

                let marker = Points::new(PlotPoints::from(vec![[point.x, point.y]]))
                    .name(region.unwrap_or("-"))
                    .color(color)
                    .shape(MarkerShape::Circle)
                    .filled(set.kind != ScatterKind::PriceRatingWalk)
                    .radius(radius);
                plot_ui.points(marker);
            }
        });
}

/// Name and city of the point nearest the cursor, plus its coordinates.
fn hover_label(points: &[ScatterPoint], names: &[String], value: &PlotPoint) -> String {
    let Some((point, name)) = nearest(points, value.x, value.y).map(|i| (&points[i], &names[i]))
    else {
        return String::new();
    };
    let mut label = format!("{name}\n¥{:.0}, {:.1}", point.x, point.y);
    if let Some(z) = point.z {
        label.push_str(&format!(", {z:.0} min"));
    }
    label
}

/// Nearest point with each axis scaled by the set's spread.
fn nearest(points: &[ScatterPoint], x: f64, y: f64) -> Option<usize> {
    let spread = |f: fn(&ScatterPoint) -> f64| {
        let (lo, hi) = points
            .iter()
            .map(f)
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                (lo.min(v), hi.max(v))
            });
        (hi - lo).max(f64::EPSILON)
    };
    let sx = spread(|p| p.x);
    let sy = spread(|p| p.y);
    let distance = |p: &ScatterPoint| ((p.x - x) / sx).powi(2) + ((p.y - y) / sy).powi(2);

    points
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| distance(a).total_cmp(&distance(b)))
        .map(|(i, _)| i)
}
