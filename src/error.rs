use crate::data::DataError;

#[derive(Debug, thiserror::Error)]
pub enum ChartError {
    #[error("start record {id} not found in the record set")]
    MissingRoot { id: String },
    #[error(transparent)]
    Data(#[from] DataError),
}

impl ChartError {
    pub(crate) fn missing_root(id: &str) -> Self {
        ChartError::MissingRoot { id: id.to_string() }
    }
}
