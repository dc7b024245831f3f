pub mod actions;
pub mod app;
pub mod model;
pub mod picker;
pub mod view;

pub use app::run;
