pub mod cache;
pub mod db;

pub use cache::PlaceCache;
