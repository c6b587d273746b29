mod file_info;
mod front_matter;
mod item;
mod loader;
mod sorting;
mod source;
mod taxonomy;

pub use file_info::*;
pub use front_matter::*;
pub use item::*;
pub use loader::*;
pub use sorting::*;
pub use source::*;
pub use taxonomy::*;
