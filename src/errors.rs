//! Error types for the datamapper crate
//!
//! This module contains the error type returned by factory and migration operations.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DataMapperError {
    #[error("Mapper error: {0}")]
    Mapper(#[from] mapper_object::MapperError),

    #[error("Cache error: {0}")]
    Cache(#[from] cache_system::CacheError),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Mapper not registered: {0}")]
    MapperNotFound(String),

    #[error("Mapper already registered: {0}")]
    MapperAlreadyRegistered(String),
}
