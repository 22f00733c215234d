pub mod config;
pub mod track;
