pub mod ac4;
pub mod command;
pub mod ec3;
mod report;
