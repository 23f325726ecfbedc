pub mod args;
pub mod op;
pub mod ops;

pub use ops::{Add, Clean, Del, Get, Init, Remove, Union};
