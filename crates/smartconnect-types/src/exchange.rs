//! Exchange segments.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Exchange segment an instrument token belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Exchange {
    /// NSE stocks and indices.
    Nse,
    /// NSE futures and options.
    Nfo,
    /// BSE stocks and indices.
    Bse,
    /// BSE futures and options.
    Bfo,
    /// Currency derivatives.
    Cds,
    /// MCX commodities.
    Mcx,
}

impl Exchange {
    /// Returns the exchange as its wire identifier.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Nse => "NSE",
            Self::Nfo => "NFO",
            Self::Bse => "BSE",
            Self::Bfo => "BFO",
            Self::Cds => "CDS",
            Self::Mcx => "MCX",
        }
    }

    /// Returns true for derivative segments.
    #[must_use]
    pub const fn is_derivatives(&self) -> bool {
        matches!(self, Self::Nfo | Self::Bfo | Self::Cds | Self::Mcx)
    }
}

impl std::fmt::Display for Exchange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Exchange {
    type Err = ExchangeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "NSE" => Ok(Self::Nse),
            "NFO" => Ok(Self::Nfo),
            "BSE" => Ok(Self::Bse),
            "BFO" => Ok(Self::Bfo),
            "CDS" => Ok(Self::Cds),
            "MCX" => Ok(Self::Mcx),
            _ => Err(ExchangeParseError(s.to_string())),
        }
    }
}

/// Error returned when parsing an unknown exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExchangeParseError(String);

impl std::fmt::Display for ExchangeParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "unknown exchange '{}', expected one of: NSE, NFO, BSE, BFO, CDS, MCX",
            self.0
        )
    }
}

impl std::error::Error for ExchangeParseError {}
