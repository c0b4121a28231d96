pub mod caching;
pub mod fred;
