/// Errors raised while building a model catalog
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("duplicate model id: {0}")]
    DuplicateModel(String),

    #[error("model '{model}' is invalid: {message}")]
    InvalidModel { model: String, message: String },

    #[error("catalog contains no models")]
    Empty,
}
