extern crate serde;
extern crate serde_json;
#[macro_use]
extern crate serde_derive;

pub mod model;
pub mod game;
pub mod snapshot;
mod util;
