mod batcher;
mod canvas;
mod history;
mod message;
mod presence;
mod types;

pub use batcher::*;
pub use canvas::*;
pub use history::*;
pub use message::*;
pub use presence::*;
pub use types::*;

pub extern crate serde;
pub extern crate serde_json;
