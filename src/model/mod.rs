pub mod patch;
pub mod spec;
pub mod tags;

pub use patch::*;
pub use spec::*;
pub use tags::*;
