pub mod location_queries;
pub mod reading_queries;
pub mod schema;
