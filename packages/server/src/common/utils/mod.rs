pub mod db;
pub mod slug;
pub mod validation;

pub use db::*;
pub use slug::*;
pub use validation::*;
