pub mod cli;
pub mod error;
pub mod fsutil;
pub mod sweep;
pub mod template;
