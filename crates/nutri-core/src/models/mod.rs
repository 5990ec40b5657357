//! Domain models for clinical nutrition records.

mod anthropometry;
mod history;
mod lab;
mod patient;
mod plan;
mod theme;
mod user;

pub use anthropometry::*;
pub use history::*;
pub use lab::*;
pub use patient::*;
pub use plan::*;
pub use theme::*;
pub use user::*;
