extern crate skirmish;

use skirmish::game::{ascii_ranges, resolve, Map};
use std::env::args;
use std::fs::File;
use std::io::prelude::*;

fn main() {
    tracing_subscriber::fmt::init();
    let file_path = args()
        .skip(1) // executable name
        .next() // first command line argument
        .expect("First argument should be map file path");
    let mut map_json = String::new();
    File::open(&file_path)
        .expect("Error opening file")
        .read_to_string(&mut map_json)
        .expect("Error reading file");
    let (mut map, mut roster) = Map::from_json(&map_json).expect("Error loading map");

    resolve(&mut map, &mut roster).expect("Error resolving ranges");
    for unit in &roster {
        println!("{}\n", ascii_ranges(&map, unit));
    }
}
