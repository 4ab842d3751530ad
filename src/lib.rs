pub mod cli;
pub mod format;
pub mod inspect;
pub mod report;

pub use inspect::run;
