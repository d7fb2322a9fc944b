pub mod binaries;
pub mod bookmarks;
pub mod project;
pub mod util;

pub use binaries::*;
pub use bookmarks::*;
pub use project::*;
pub use util::*;
