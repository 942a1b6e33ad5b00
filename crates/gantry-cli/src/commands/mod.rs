pub mod deployment;
pub mod image;
pub mod serve;
