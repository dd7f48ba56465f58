pub mod builder;
pub mod canvas;
pub mod drawable;
pub mod factory;
pub mod style;
