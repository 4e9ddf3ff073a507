pub mod seed;
pub mod validate;
