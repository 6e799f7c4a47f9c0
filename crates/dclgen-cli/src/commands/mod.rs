pub mod parse;
pub mod scan;
