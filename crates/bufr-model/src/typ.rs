use core::fmt;
use core::str::FromStr;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Node types of a subset's expanded descriptor table.
///
/// The three-letter codes are the table codes used by the low-level decoder.
/// Replication constructs appear as a marker node (`DelayedRep`, `FixedRep`,
/// `DelayedRepStacked`, `DelayedBinary`) immediately followed by the body
/// node it replicates (`Repeat`, `StackedRepeat`, or `Sequence`).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Typ {
    Subset,
    DelayedRep,
    FixedRep,
    DelayedRepStacked,
    DelayedBinary,
    Sequence,
    Repeat,
    StackedRepeat,
    Number,
    Character,
}

impl Typ {
    /// The decoder's table code for this node type.
    pub const fn as_code(self) -> &'static str {
        match self {
            Typ::Subset => "SUB",
            Typ::DelayedRep => "DRP",
            Typ::FixedRep => "REP",
            Typ::DelayedRepStacked => "DRS",
            Typ::DelayedBinary => "DRB",
            Typ::Sequence => "SEQ",
            Typ::Repeat => "RPC",
            Typ::StackedRepeat => "RPS",
            Typ::Number => "NUM",
            Typ::Character => "CHR",
        }
    }

    /// True for replication marker nodes, the nodes that bound an occurring
    /// subsequence and open a path level during collection.
    pub const fn is_replication(self) -> bool {
        matches!(
            self,
            Typ::DelayedRep | Typ::FixedRep | Typ::DelayedRepStacked | Typ::DelayedBinary
        )
    }

    /// True for replication markers that contribute an output dimension.
    ///
    /// Delayed binaries gate presence (0 or 1 occurrences) but are projected
    /// out of result shapes.
    pub const fn is_dimensioning(self) -> bool {
        matches!(self, Typ::DelayedRep | Typ::FixedRep | Typ::DelayedRepStacked)
    }

    /// True for value-carrying leaf nodes.
    pub const fn is_value(self) -> bool {
        matches!(self, Typ::Number | Typ::Character)
    }
}

impl fmt::Display for Typ {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_code())
    }
}

impl FromStr for Typ {
    type Err = ParseTypError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SUB" => Ok(Typ::Subset),
            "DRP" => Ok(Typ::DelayedRep),
            "REP" => Ok(Typ::FixedRep),
            "DRS" => Ok(Typ::DelayedRepStacked),
            "DRB" => Ok(Typ::DelayedBinary),
            "SEQ" => Ok(Typ::Sequence),
            "RPC" => Ok(Typ::Repeat),
            "RPS" => Ok(Typ::StackedRepeat),
            "NUM" => Ok(Typ::Number),
            "CHR" => Ok(Typ::Character),
            _ => Err(ParseTypError),
        }
    }
}

/// Failed to parse a [`Typ`] from a table code.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ParseTypError;

impl fmt::Display for ParseTypError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("invalid node type code")
    }
}

impl std::error::Error for ParseTypError {}

impl Serialize for Typ {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_code())
    }
}

impl<'de> Deserialize<'de> for Typ {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse::<Typ>()
            .map_err(|_| D::Error::custom(format!("unknown node type code: {s}")))
    }
}
