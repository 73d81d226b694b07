mod command;
mod runner;

pub use command::Command;
pub use runner::{Output, OutputMode, execute, render, run, run_with_format};
