pub mod ingest;
pub mod layout;
pub mod model;
pub mod neighbors;
