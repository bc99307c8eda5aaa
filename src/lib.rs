pub mod cli;
pub mod counter;
pub mod error;
pub mod git;
pub mod history;
pub mod logging;
pub mod model;
pub mod render;
pub mod report;
