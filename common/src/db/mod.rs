// Database layer: PostgreSQL pool and per-entity repositories

pub mod pool;
pub mod repositories;

pub use pool::DbPool;
