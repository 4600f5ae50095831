pub mod config;
pub mod fallback;
pub mod network;
pub mod storage;
