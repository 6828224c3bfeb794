use thiserror::Error;

use crate::codec::DecodeError;
use crate::store::StoreError;

/// Errors surfaced by registry, log and tracker operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to decode stored record under '{key}': {source}")]
    Decode {
        key: String,
        #[source]
        source: DecodeError,
    },

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Fluid registry is full ({0} fluids)")]
    RegistryFull(usize),
}

impl Error {
    pub(crate) fn decode(key: impl Into<String>, source: DecodeError) -> Self {
        Error::Decode {
            key: key.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::decode(
            "20240101",
            DecodeError::MalformedLength {
                record: "daily log",
                len: 9,
            },
        );
        assert_eq!(
            err.to_string(),
            "Failed to decode stored record under '20240101': malformed daily log record: 9 word(s) is not a valid length"
        );

        let err = Error::from(StoreError::InvalidKey("a/b".to_string()));
        assert!(err.to_string().contains("Invalid store key 'a/b'"));
    }
}
