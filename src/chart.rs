use std::{fmt::Display, path::Path};

use plotters::{
    prelude::{BitMapBackend, ChartBuilder, IntoDrawingArea, LineSeries, Rectangle},
    style::{Color, HSLColor, IntoFont, RED, WHITE},
};

use crate::{
    error::{BeamError, Result},
    pipeline::BeampatternResponse,
};

fn render_err(e: impl Display) -> BeamError {
    BeamError::Render(e.to_string())
}

// Min and max of `values`, widened by `border` of the range on each side.
fn padded_bounds(values: &[f64], border: f64) -> (f64, f64) {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let dist = (max - min).clamp(1e-6, f64::MAX);
    (min - dist * border / 2., max + dist * border / 2.)
}

// Cell edges around each sample, halfway to the neighbours. A lone sample gets a 1° wide cell.
fn cell_edges(values: &[f64]) -> Vec<f64> {
    match values {
        [] => vec![],
        [x] => vec![x - 0.5, x + 0.5],
        _ => {
            let n = values.len();
            let mut edges = Vec::with_capacity(n + 1);
            edges.push(values[0] - (values[1] - values[0]) / 2.);
            edges.extend(values.windows(2).map(|w| (w[0] + w[1]) / 2.));
            edges.push(values[n - 1] + (values[n - 1] - values[n - 2]) / 2.);
            edges
        }
    }
}

// Blue at the floor through to red at 0 dB.
fn db_color(db: f64, floor_db: f64) -> HSLColor {
    let t = if floor_db < 0. {
        ((db - floor_db) / -floor_db).clamp(0., 1.)
    } else {
        1.
    };
    HSLColor(0.66 * (1. - t), 1., 0.5)
}

/// Draws the dB field as an azimuth/elevation heatmap PNG.
pub fn render_heatmap(
    path: impl AsRef<Path>,
    response: &BeampatternResponse,
    floor_db: f64,
    size: (u32, u32),
) -> Result<()> {
    if response.az_deg.is_empty() || response.el_deg.is_empty() {
        return Err(BeamError::invalid("cannot render an empty response"));
    }
    if response.response_db.len() != response.el_deg.len()
        || response
            .response_db
            .iter()
            .any(|row| row.len() != response.az_deg.len())
    {
        return Err(BeamError::invalid("response_db does not match the grid shape"));
    }
    let az_edges = cell_edges(&response.az_deg);
    let el_edges = cell_edges(&response.el_deg);

    let root = BitMapBackend::new(path.as_ref(), size).into_drawing_area();
    root.fill(&WHITE).map_err(render_err)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("MVDR beampattern (dB)", ("sans-serif", 30).into_font())
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(
            az_edges[0]..az_edges[az_edges.len() - 1],
            el_edges[0]..el_edges[el_edges.len() - 1],
        )
        .map_err(render_err)?;

    chart
        .configure_mesh()
        .disable_mesh()
        .x_desc("Azimuth (deg)")
        .y_desc("Elevation (deg)")
        .draw()
        .map_err(render_err)?;

    let (az_edges, el_edges) = (&az_edges, &el_edges);
    let cells = response.response_db.iter().enumerate().flat_map(move |(i, row)| {
        row.iter().enumerate().map(move |(j, db)| {
            Rectangle::new(
                [(az_edges[j], el_edges[i]), (az_edges[j + 1], el_edges[i + 1])],
                db_color(*db, floor_db).filled(),
            )
        })
    });
    chart.draw_series(cells).map_err(render_err)?;

    root.present().map_err(render_err)
}

/// Draws the azimuth cut nearest `target_el_deg` as a line chart PNG.
pub fn render_azimuth_cut(
    path: impl AsRef<Path>,
    response: &BeampatternResponse,
    target_el_deg: f64,
    floor_db: f64,
    size: (u32, u32),
) -> Result<()> {
    let (el, row) = response
        .azimuth_cut(target_el_deg)
        .ok_or_else(|| BeamError::invalid("cannot render an empty response"))?;
    let (bottom_x, top_x) = padded_bounds(&response.az_deg, 0.05);
    let (bottom_y, top_y) = padded_bounds(&[floor_db, 0.], 0.1);

    let root = BitMapBackend::new(path.as_ref(), size).into_drawing_area();
    root.fill(&WHITE).map_err(render_err)?;

    let caption = format!("Azimuth cut at {:.1}° elevation", el);
    let mut chart = ChartBuilder::on(&root)
        .caption(caption, ("sans-serif", 30).into_font())
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(bottom_x..top_x, bottom_y..top_y)
        .map_err(render_err)?;

    chart
        .configure_mesh()
        .x_desc("Azimuth (deg)")
        .y_desc("Response (dB)")
        .draw()
        .map_err(render_err)?;

    chart
        .draw_series(LineSeries::new(
            response.az_deg.iter().copied().zip(row.iter().copied()),
            &RED,
        ))
        .map_err(render_err)?;

    root.present().map_err(render_err)
}
