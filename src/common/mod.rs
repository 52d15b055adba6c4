mod rows;

pub(crate) use rows::*;
