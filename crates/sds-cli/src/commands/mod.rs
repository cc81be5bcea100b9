pub mod batch;
pub mod modes;
pub mod parse;
