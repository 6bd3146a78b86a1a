mod load;
mod model;

pub use load::load_entities;
pub use model::{Entity, UNKNOWN_SOURCE};
