pub mod cleaner;
pub mod explain;
pub mod handlers;
pub mod pipeline;
pub mod profile;
pub mod queries;
pub mod ranker;
pub mod scorer;
pub mod tables;
