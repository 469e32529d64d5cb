//! Shared error types for the recipe discovery system

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SharedError {
    #[error("Invalid UUID: {input}")]
    InvalidUuid { input: String },

    #[error("Invalid recipe: {message}")]
    InvalidRecipe { message: String },
}

pub type SharedResult<T> = Result<T, SharedError>;
