pub mod common;
pub mod econ;
