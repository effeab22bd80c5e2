pub mod common;
pub mod generate;
pub mod jsonnet;
pub mod repos;
