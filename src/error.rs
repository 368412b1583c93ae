//! Fatal construction errors.
//!
//! Only malformed input aborts a build. Everything else the engine can repair
//! is reported through [`crate::diagnostics::Diagnostics`] instead.

use thiserror::Error;

/// A failure that aborts hierarchy construction for one family tree.
#[derive(Debug, Error)]
pub enum HierarchyError {
    /// A record lacks a required field (blank counts as missing).
    #[error("member record #{index} is missing required field `{field}`")]
    MissingField { index: usize, field: &'static str },

    /// Two records claim the same identifier.
    #[error("member record #{index} reuses identifier `{id}` already taken by record #{first}")]
    DuplicateIdentifier { index: usize, id: String, first: usize },

    /// The payload could not be decoded into member records.
    #[error("could not decode member records: {0}")]
    Decode(#[from] serde_json::Error),
}

impl HierarchyError {
    /// Whether this is a malformed-record failure (as opposed to an
    /// undecodable payload).
    pub fn is_malformed_input(&self) -> bool {
        matches!(
            self,
            Self::MissingField { .. } | Self::DuplicateIdentifier { .. }
        )
    }

    /// Input position of the offending record, if the error names one.
    pub fn record_index(&self) -> Option<usize> {
        match self {
            Self::MissingField { index, .. } | Self::DuplicateIdentifier { index, .. } => {
                Some(*index)
            }
            Self::Decode(_) => None,
        }
    }
}

pub type Result<T, E = HierarchyError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_field_message() {
        let err = HierarchyError::MissingField { index: 3, field: "fullName" };
        assert_eq!(err.to_string(), "member record #3 is missing required field `fullName`");
        assert!(err.is_malformed_input());
        assert_eq!(err.record_index(), Some(3));
    }

    #[test]
    fn test_decode_is_not_malformed_record() {
        let err: HierarchyError = serde_json::from_str::<Vec<u8>>("nope").unwrap_err().into();
        assert!(!err.is_malformed_input());
        assert_eq!(err.record_index(), None);
    }
}
