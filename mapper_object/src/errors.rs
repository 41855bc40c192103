use thiserror::Error;

#[derive(Error, Debug)]
pub enum MapperError {
    #[error("Invalid entity: {0}")]
    InvalidEntity(String),

    #[error("Columns not defined for {0}")]
    ColumnsNotDefined(String),

    #[error("Could not determine primary key column for {0}")]
    PrimaryKeyUndetermined(String),

    #[error("Object name '{name}' is {length} characters long (max {max_length})")]
    InvalidObjectName {
        name: String,
        length: usize,
        max_length: usize,
    },

    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(#[from] crate::validation::ValidationError),

    #[error("Codec error: {0}")]
    Codec(String),

    #[error("Driver error: {0}")]
    Driver(String),

    #[error("Cache error: {0}")]
    Cache(#[from] cache_system::CacheError),
}

impl From<serde_json::Error> for MapperError {
    fn from(err: serde_json::Error) -> Self {
        MapperError::Codec(err.to_string())
    }
}
