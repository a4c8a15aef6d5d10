pub mod manifest;
pub mod results_repository;
pub mod trial;
