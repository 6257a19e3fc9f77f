// [libs/domain/fill-loop/src/lib.rs]
mod config;
mod controller;

pub use config::FillLoopConfig;
pub use controller::run;
