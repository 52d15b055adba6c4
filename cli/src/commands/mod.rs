pub mod convert;
pub mod merge;
pub mod validate;
