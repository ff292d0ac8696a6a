pub mod data;
pub mod diagnostics;
pub mod page;
