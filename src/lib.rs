pub mod account;
pub mod blame;
pub mod change;
pub mod commit;
pub mod config;
pub mod error;
pub mod file;
pub mod graph;
pub mod loader;
pub mod reader;
pub mod record;
pub mod repository;
pub mod transform;

pub mod utils;
pub use utils::*;

mod macros;

pub use config::TransformConfig;
pub use repository::Repository;
