pub mod kind;
pub mod model;
