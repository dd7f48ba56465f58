pub mod manager;
pub mod pool;
pub mod sweep;
