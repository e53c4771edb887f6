use fretcore::Fault;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SelError>;

#[derive(Debug, Error)]
pub enum SelError {
    #[error(transparent)]
    Fault(#[from] Fault),

    #[error("cannot access `{path}`: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed json in `{path}`: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

impl SelError {
    pub(crate) fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        SelError::Io { path: path.display().to_string(), source }
    }

    pub(crate) fn json(path: &std::path::Path, source: serde_json::Error) -> Self {
        SelError::Json { path: path.display().to_string(), source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fault_is_transparent() {
        let err: SelError = Fault::MissingParameter("bt").into();
        assert_eq!(err.to_string(), "missing required parameter `bt`");
    }
}
