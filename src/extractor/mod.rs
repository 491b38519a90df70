// SPDX-License-Identifier: GPL-3.0-only
pub mod depot;
pub mod traits;
pub mod veterancy;

pub use depot::DepotDataExtractor;
pub use traits::{
    DataExtractor, ExtractionRequest, ExtractionResult, Metadata, run_extraction,
};
pub use veterancy::VeterancyExtractor;

use std::fmt;
use std::str::FromStr;

/// The kinds of game data this tool can extract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    Attributes,
    Localization,
    Veterancy,
}

impl DataType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::Attributes => "attributes",
            DataType::Localization => "localization",
            DataType::Veterancy => "veterancy",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(thiserror::Error, Debug)]
#[error("unknown data type '{0}'. Valid types are 'attributes', 'localization', 'veterancy'")]
pub struct UnknownDataType(String);

impl FromStr for DataType {
    type Err = UnknownDataType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "attributes" => Ok(DataType::Attributes),
            "localization" => Ok(DataType::Localization),
            "veterancy" => Ok(DataType::Veterancy),
            other => Err(UnknownDataType(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_type_round_trip() {
        for name in ["attributes", "localization", "veterancy"] {
            let data_type: DataType = name.parse().unwrap();
            assert_eq!(data_type.as_str(), name);
        }
    }

    #[test]
    fn test_unknown_data_type() {
        let err = "textures".parse::<DataType>().unwrap_err();
        assert!(err.to_string().contains("textures"));
        assert!(err.to_string().contains("veterancy"));
    }
}
