pub mod gesture;
pub mod transform;
