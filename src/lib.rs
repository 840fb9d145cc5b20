pub mod cli;
pub mod error_handling;
pub mod fsutil;
pub mod instrument;
pub mod orders;
pub mod process;
pub mod storage;
