// Library for tests to access modules

pub mod cancel;
pub mod config;
pub mod disk_repo;
pub mod engine;
pub mod error;
pub mod folders;
pub mod models;
pub mod namer;
pub mod planner;
pub mod random_source;
pub mod report;
pub mod version;
pub mod writer;
