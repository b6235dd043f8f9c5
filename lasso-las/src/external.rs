//! The seam to the external library that parses LAS bytes.
//!
//! Lasso does not decode LAS records itself. A [`ReaderFactory`] turns a byte stream into an
//! [`ExternalReader`], which reports the header once and then yields raw points in order.

use std::io::Read;

use lasso_error::LassoResult;
use lasso_stage::Bounds;

/// The public header block as reported by the external library.
#[derive(Debug, Clone, PartialEq)]
pub struct ExternalHeader {
    pub point_count: u64,
    pub bounds: Bounds<f64>,
    pub version_major: u8,
    pub version_minor: u8,
    /// Scale factors for X, Y and Z.
    pub scale: [f64; 3],
    /// Offsets for X, Y and Z.
    pub offset: [f64; 3],
    pub compressed: bool,
    pub data_format_id: u8,
    pub vlrs: Vec<ExternalVlr>,
}

impl Default for ExternalHeader {
    fn default() -> Self {
        Self {
            point_count: 0,
            bounds: Bounds::default(),
            version_major: 1,
            version_minor: 2,
            scale: [1.0; 3],
            offset: [0.0; 3],
            compressed: false,
            data_format_id: 0,
            vlrs: Vec::new(),
        }
    }
}

/// A variable length record as reported by the external library.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExternalVlr {
    pub reserved: u16,
    pub user_id: String,
    pub record_id: u16,
    pub record_length: u16,
    pub description: String,
    pub data: Vec<u8>,
}

/// One point record with its coordinates still in scaled integer form.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ExternalPoint {
    pub x: i32,
    pub y: i32,
    pub z: i32,
    pub intensity: u16,
    pub return_number: u8,
    pub number_of_returns: u8,
    pub scan_direction_flag: u8,
    pub edge_of_flight_line: u8,
    pub classification: u8,
    pub scan_angle_rank: i8,
    pub user_data: u8,
    pub point_source_id: u16,
    pub gps_time: Option<f64>,
    pub color: Option<[u16; 3]>,
}

/// An open LAS source in the external library.
pub trait ExternalReader {
    fn header(&self) -> &ExternalHeader;

    /// Position the reader so that the next point read is the one at `index`.
    fn seek(&mut self, index: u64) -> LassoResult<()>;

    /// Read the next point, or `None` past the last one.
    fn read_point(&mut self) -> LassoResult<Option<ExternalPoint>>;
}

/// Opens [`ExternalReader`]s over byte streams.
pub trait ReaderFactory {
    fn create_with_stream(&self, stream: Box<dyn Read>) -> LassoResult<Box<dyn ExternalReader>>;
}
