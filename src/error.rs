use serde::{Deserialize, Serialize};

pub type Error = anyhow::Error;
pub type Result<T> = std::result::Result<T, Error>;

/// The kinds of failure that are reported to the user. The type is attached to an error as
/// `anyhow` context, so callers can recover it with `err.downcast_ref::<ErrorType>()`.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorType {
    /// The home directory or `config.json` is missing or invalid.
    Config,
    /// The key/value store could not be read or written.
    Storage,
    /// A new entry was rejected because a required field is missing or malformed.
    Validation,
    /// An imported file had rows, but none of them could be used.
    Import,
    /// No spreadsheet codec is available for the requested file, or the codec failed.
    Codec,
}

serde_plain::derive_display_from_serialize!(ErrorType);
serde_plain::derive_fromstr_from_deserialize!(ErrorType);

/// Tags an error with the `ErrorType` that should be shown to the user.
pub trait IntoResult<T> {
    fn pub_result(self, error_type: ErrorType) -> Result<T>;
}

impl<T, E> IntoResult<T> for std::result::Result<T, E>
where
    E: Into<Error>,
{
    fn pub_result(self, error_type: ErrorType) -> Result<T> {
        self.map_err(|e| e.into().context(error_type))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[test]
    fn test_pub_result_can_be_downcast() {
        let result: std::result::Result<(), Error> = Err(anyhow!("no rows survived"));
        let err = result.pub_result(ErrorType::Import).unwrap_err();
        assert_eq!(err.downcast_ref::<ErrorType>(), Some(&ErrorType::Import));
        assert!(format!("{err:#}").contains("no rows survived"));
    }

    #[test]
    fn test_error_type_display() {
        assert_eq!(ErrorType::Validation.to_string(), "validation");
        assert_eq!("codec".parse::<ErrorType>().unwrap(), ErrorType::Codec);
    }
}
