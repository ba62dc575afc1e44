pub mod entity;
pub mod history;

pub use entity::*;
pub use history::*;
