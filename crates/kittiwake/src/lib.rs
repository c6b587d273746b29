#![doc = include_str!("../README.md")]

pub mod build;
pub mod config;
pub mod content;
mod date;
pub mod error;
pub mod language;
pub mod output;
pub mod permalink;
pub mod plan;
mod site;

pub use build::{resolve_build_plan, BuildOptions};
pub use config::Config;
pub use error::*;
pub use plan::{BuildPlan, PageSubject, PlannedPage};
pub use site::*;
