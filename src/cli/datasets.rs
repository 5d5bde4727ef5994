use std::fmt::Display;

use crate::datasets::raw_text;

/// The Dataset enum
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dataset {
    /// Raw CSV texts
    RawText,
}

impl TryFrom<&str> for Dataset {
    type Error = DatasetError;

    /// Try to convert a string to a Dataset
    fn try_from(value: &str) -> Result<Self, Self::Error> {
        if value.to_lowercase() == raw_text::DATASET {
            Ok(Dataset::RawText)
        } else {
            Err(Self::Error::Unknown(value.to_string()))
        }
    }
}

impl Display for Dataset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Dataset::RawText => raw_text::DATASET,
        };

        write!(f, "{}", name)
    }
}

/// Dataset Error
#[derive(thiserror::Error, Debug)]
pub enum DatasetError {
    /// Only the raw text source is supported
    #[error("no dataset found for {0}, this model only supports raw-text")]
    Unknown(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dataset_names() {
        assert_eq!(Dataset::try_from("raw-text").unwrap(), Dataset::RawText);
        assert_eq!(Dataset::try_from("Raw-Text").unwrap(), Dataset::RawText);
        assert!(Dataset::try_from("snips").is_err());
        assert_eq!(Dataset::RawText.to_string(), "raw-text");
    }
}
