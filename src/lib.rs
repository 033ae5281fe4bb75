pub mod args;
pub mod database;
pub mod error;
pub mod model;
pub mod processor;
pub mod submissions;
pub mod utils;
