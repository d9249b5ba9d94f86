// Reads a beampattern request as JSON from the file given as the first argument, or from stdin,
// and prints the response as JSON.
use std::{
    error::Error,
    fs,
    io::{self, Read},
};

use beam_lib::pipeline::{compute_beampattern, BeampatternRequest};
use log::info;

fn read_request() -> Result<BeampatternRequest, Box<dyn Error>> {
    let text = match std::env::args().nth(1) {
        Some(path) => {
            info!("reading request from {}", path);
            fs::read_to_string(path)?
        }
        None => {
            let mut text = String::new();
            io::stdin().read_to_string(&mut text)?;
            text
        }
    };
    Ok(serde_json::from_str(&text)?)
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let request = read_request()?;
    let response = compute_beampattern(&request)?;
    println!("{}", serde_json::to_string(&response)?);
    Ok(())
}
