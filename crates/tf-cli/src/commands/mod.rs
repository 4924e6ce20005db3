pub mod minimize;
pub mod source;
