mod exports;
pub use exports::*;

pub mod analysis;
pub mod config;
pub mod dose;
pub mod error;
pub mod io;
pub mod kernel;
pub mod library;
pub mod nuclide;
pub mod types;
pub mod utils;
