mod location;
mod reading;

pub use location::{Block, Unit};
pub use reading::{NewReading, Reading};
