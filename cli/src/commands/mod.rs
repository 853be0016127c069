pub mod baseline;
pub mod channels;
pub mod config;
pub mod run;
