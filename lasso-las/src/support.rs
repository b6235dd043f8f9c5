//! Mapping between LAS point formats and Lasso schemas.

use lasso_buffer::PointData;
use lasso_dtype::{Dimension, Field, PType, Schema};
use lasso_error::{LassoResult, lasso_err};

use crate::{ExternalPoint, PointFormat};

/// Add the dimensions of `format` to `schema`, in LAS record order.
pub fn register_fields(schema: &mut Schema, format: PointFormat) -> LassoResult<()> {
    let base = [
        Dimension::new(Field::X, PType::I32)
            .with_description("x coordinate as a scaled integer"),
        Dimension::new(Field::Y, PType::I32)
            .with_description("y coordinate as a scaled integer"),
        Dimension::new(Field::Z, PType::I32)
            .with_description("z coordinate as a scaled integer"),
        Dimension::new(Field::Intensity, PType::U16),
        Dimension::new(Field::ReturnNumber, PType::U8),
        Dimension::new(Field::NumberOfReturns, PType::U8),
        Dimension::new(Field::ScanDirectionFlag, PType::U8),
        Dimension::new(Field::EdgeOfFlightLine, PType::U8),
        Dimension::new(Field::Classification, PType::U8),
        Dimension::new(Field::ScanAngleRank, PType::I8)
            .with_description("scan angle in degrees, rounded"),
        Dimension::new(Field::UserData, PType::U8),
        Dimension::new(Field::PointSourceId, PType::U16),
    ];
    for dimension in base {
        schema.add_dimension(dimension)?;
    }

    if format.has_time() {
        schema.add_dimension(
            Dimension::new(Field::Time, PType::F64).with_description("GPS time of the pulse"),
        )?;
    }

    if format.has_color() {
        for field in [Field::Red, Field::Green, Field::Blue] {
            schema.add_dimension(Dimension::new(field, PType::U16))?;
        }
    }

    Ok(())
}

/// Attach the header scale and offset of each axis to `X`, `Y` and `Z`.
pub fn set_scaling(schema: &mut Schema, scale: [f64; 3], offset: [f64; 3]) -> LassoResult<()> {
    for (axis, field) in [Field::X, Field::Y, Field::Z].iter().enumerate() {
        schema.set_scaling(field, scale[axis], offset[axis])?;
    }
    Ok(())
}

fn index_of(schema: &Schema, field: &Field) -> LassoResult<usize> {
    schema
        .dimension_index(field)
        .ok_or_else(|| lasso_err!("LAS schema has no {} dimension", field))
}

/// Writes [`ExternalPoint`]s into buffers laid out by a schema from [`register_fields`].
#[derive(Debug, Clone)]
pub struct PointWriter {
    x: usize,
    y: usize,
    z: usize,
    intensity: usize,
    return_number: usize,
    number_of_returns: usize,
    scan_direction_flag: usize,
    edge_of_flight_line: usize,
    classification: usize,
    scan_angle_rank: usize,
    user_data: usize,
    point_source_id: usize,
    time: Option<usize>,
    color: Option<[usize; 3]>,
}

impl PointWriter {
    pub fn try_new(schema: &Schema) -> LassoResult<Self> {
        let color = if schema.contains(&Field::Red) {
            Some([
                index_of(schema, &Field::Red)?,
                index_of(schema, &Field::Green)?,
                index_of(schema, &Field::Blue)?,
            ])
        } else {
            None
        };

        Ok(Self {
            x: index_of(schema, &Field::X)?,
            y: index_of(schema, &Field::Y)?,
            z: index_of(schema, &Field::Z)?,
            intensity: index_of(schema, &Field::Intensity)?,
            return_number: index_of(schema, &Field::ReturnNumber)?,
            number_of_returns: index_of(schema, &Field::NumberOfReturns)?,
            scan_direction_flag: index_of(schema, &Field::ScanDirectionFlag)?,
            edge_of_flight_line: index_of(schema, &Field::EdgeOfFlightLine)?,
            classification: index_of(schema, &Field::Classification)?,
            scan_angle_rank: index_of(schema, &Field::ScanAngleRank)?,
            user_data: index_of(schema, &Field::UserData)?,
            point_source_id: index_of(schema, &Field::PointSourceId)?,
            time: schema.dimension_index(&Field::Time),
            color,
        })
    }

    /// Store `point` as record `index` of `data`.
    ///
    /// Time and color are written only when both the schema and the point carry them.
    pub fn write(
        &self,
        data: &mut PointData,
        index: usize,
        point: &ExternalPoint,
    ) -> LassoResult<()> {
        data.set_field(index, self.x, point.x)?;
        data.set_field(index, self.y, point.y)?;
        data.set_field(index, self.z, point.z)?;
        data.set_field(index, self.intensity, point.intensity)?;
        data.set_field(index, self.return_number, point.return_number)?;
        data.set_field(index, self.number_of_returns, point.number_of_returns)?;
        data.set_field(index, self.scan_direction_flag, point.scan_direction_flag)?;
        data.set_field(index, self.edge_of_flight_line, point.edge_of_flight_line)?;
        data.set_field(index, self.classification, point.classification)?;
        data.set_field(index, self.scan_angle_rank, point.scan_angle_rank)?;
        data.set_field(index, self.user_data, point.user_data)?;
        data.set_field(index, self.point_source_id, point.point_source_id)?;

        if let (Some(dimension), Some(time)) = (self.time, point.gps_time) {
            data.set_field(index, dimension, time)?;
        }
        if let (Some(dimensions), Some(color)) = (self.color, point.color) {
            for (dimension, channel) in dimensions.into_iter().zip(color) {
                data.set_field(index, dimension, channel)?;
            }
        }
        Ok(())
    }
}
