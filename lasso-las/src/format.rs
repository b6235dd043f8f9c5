use std::fmt::{Display, Formatter};

use num_enum::{IntoPrimitive, TryFromPrimitive};

/// The LAS point data record formats.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, IntoPrimitive, TryFromPrimitive,
)]
#[repr(u8)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PointFormat {
    Format0 = 0,
    Format1 = 1,
    Format2 = 2,
    Format3 = 3,
    Format4 = 4,
    Format5 = 5,
}

impl PointFormat {
    /// Whether records carry a GPS time.
    pub fn has_time(self) -> bool {
        matches!(
            self,
            Self::Format1 | Self::Format3 | Self::Format4 | Self::Format5
        )
    }

    /// Whether records carry red, green and blue channels.
    pub fn has_color(self) -> bool {
        matches!(self, Self::Format2 | Self::Format3 | Self::Format5)
    }

    /// Whether records carry waveform packets.
    pub fn has_wave(self) -> bool {
        matches!(self, Self::Format4 | Self::Format5)
    }

    /// The size in bytes of one record on disk.
    pub fn point_size(self) -> usize {
        match self {
            Self::Format0 => 20,
            Self::Format1 => 28,
            Self::Format2 => 26,
            Self::Format3 => 34,
            Self::Format4 => 57,
            Self::Format5 => 63,
        }
    }
}

impl Display for PointFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "point format {}", u8::from(*self))
    }
}
