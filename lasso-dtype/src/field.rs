//! Semantic identifiers for the dimensions of a point record.

use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// A name for a dimension that has no well-known identifier.
pub type FieldName = Arc<str>;

/// The semantic identifier of a dimension.
///
/// The well-known variants cover the fields defined by the LAS family of formats. Sources
/// with extra per-point attributes use [`Field::Custom`].
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Field {
    /// The X coordinate
    X,
    /// The Y coordinate
    Y,
    /// The Z coordinate
    Z,
    /// Pulse return magnitude
    Intensity,
    /// Pulse return number for a given output pulse
    ReturnNumber,
    /// Total number of returns for a given pulse
    NumberOfReturns,
    /// Direction at which the scanner mirror was traveling at the time of the output pulse
    ScanDirectionFlag,
    /// Whether the point is at the end of a scan
    EdgeOfFlightLine,
    /// ASPRS classification code
    Classification,
    /// Angle at which the laser pulse was output from the scanner
    ScanAngleRank,
    /// Free-form user data
    UserData,
    /// The file or flight line the point originated from
    PointSourceId,
    /// GPS time at which the point was acquired
    Time,
    /// Red image channel
    Red,
    /// Green image channel
    Green,
    /// Blue image channel
    Blue,
    /// A source-specific dimension identified by name
    Custom(FieldName),
}

impl Field {
    /// The canonical name of the field.
    pub fn name(&self) -> &str {
        match self {
            Field::X => "X",
            Field::Y => "Y",
            Field::Z => "Z",
            Field::Intensity => "Intensity",
            Field::ReturnNumber => "ReturnNumber",
            Field::NumberOfReturns => "NumberOfReturns",
            Field::ScanDirectionFlag => "ScanDirectionFlag",
            Field::EdgeOfFlightLine => "EdgeOfFlightLine",
            Field::Classification => "Classification",
            Field::ScanAngleRank => "ScanAngleRank",
            Field::UserData => "UserData",
            Field::PointSourceId => "PointSourceId",
            Field::Time => "Time",
            Field::Red => "Red",
            Field::Green => "Green",
            Field::Blue => "Blue",
            Field::Custom(name) => name,
        }
    }
}

impl From<&str> for Field {
    /// Resolve a name to its well-known field, falling back to [`Field::Custom`].
    fn from(value: &str) -> Self {
        match value {
            "X" => Field::X,
            "Y" => Field::Y,
            "Z" => Field::Z,
            "Intensity" => Field::Intensity,
            "ReturnNumber" => Field::ReturnNumber,
            "NumberOfReturns" => Field::NumberOfReturns,
            "ScanDirectionFlag" => Field::ScanDirectionFlag,
            "EdgeOfFlightLine" => Field::EdgeOfFlightLine,
            "Classification" => Field::Classification,
            "ScanAngleRank" => Field::ScanAngleRank,
            "UserData" => Field::UserData,
            "PointSourceId" => Field::PointSourceId,
            "Time" => Field::Time,
            "Red" => Field::Red,
            "Green" => Field::Green,
            "Blue" => Field::Blue,
            name => Field::Custom(name.into()),
        }
    }
}

impl Display for Field {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(Field::X)]
    #[case(Field::ScanAngleRank)]
    #[case(Field::PointSourceId)]
    #[case(Field::Blue)]
    fn well_known_names_resolve_to_variants(#[case] field: Field) {
        assert_eq!(Field::from(field.name()), field);
    }

    #[test]
    fn unknown_names_are_custom() {
        assert_eq!(Field::from("Amplitude"), Field::Custom("Amplitude".into()));
        // names are case sensitive
        assert_eq!(Field::from("x"), Field::Custom("x".into()));
    }
}
