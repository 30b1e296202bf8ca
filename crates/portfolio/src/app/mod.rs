mod bootstrap;
mod grid;
mod loop_runner;
mod solar;

pub(crate) use loop_runner::run;
