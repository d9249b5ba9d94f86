// Computes a beampattern from a JSON request and writes a heatmap and an azimuth cut as PNGs.
//
// Usage: plot_beampattern <request.json> [output prefix] [cut elevation in degrees]
use std::{error::Error, fs};

use beam_lib::{
    chart::{render_azimuth_cut, render_heatmap},
    pipeline::{compute_beampattern, BeampatternRequest},
};
use log::info;

const SIZE: (u32, u32) = (1024, 768);

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let path = args
        .next()
        .ok_or("usage: plot_beampattern <request.json> [output prefix] [cut elevation]")?;
    let prefix = args.next().unwrap_or_else(|| "beampattern".to_owned());
    let cut_el: f64 = match args.next() {
        Some(el) => el.parse()?,
        None => 0.,
    };

    let request: BeampatternRequest = serde_json::from_str(&fs::read_to_string(&path)?)?;
    let response = compute_beampattern(&request)?;

    let heatmap = format!("{}_heatmap.png", prefix);
    render_heatmap(&heatmap, &response, request.floor_db, SIZE)?;
    info!("wrote {}", heatmap);

    let cut = format!("{}_cut.png", prefix);
    render_azimuth_cut(&cut, &response, cut_el, request.floor_db, SIZE)?;
    info!("wrote {}", cut);

    Ok(())
}
