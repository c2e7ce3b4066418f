//! Data model for quota admission: quantities, flat resource lists,
//! declared quota limits and the config file.

pub mod config;
pub mod quantity;
pub mod quota;
pub mod resource;
