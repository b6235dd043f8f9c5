use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use lasso_dtype::Schema;
use lasso_error::{LassoResult, lasso_bail, lasso_err};
use lasso_stage::{
    RandomIteratorRef, SequentialIteratorRef, Stage, StageHeader, VariableLengthRecord,
};

use crate::{
    ExternalHeader, ExternalReader, ExternalVlr, LasRandomIterator, LasSequentialIterator,
    PointFormat, ReaderFactory, support,
};

/// A [`Stage`] reading a LAS file through an external library.
///
/// The header is read once when the reader is opened. Every iterator opens its own external
/// reader on the same file, so iterators never share a position.
pub struct LasReader {
    path: PathBuf,
    factory: Arc<dyn ReaderFactory>,
    header: StageHeader,
    version_major: u8,
    version_minor: u8,
    scale: [f64; 3],
    offset: [f64; 3],
    compressed: bool,
    point_format: PointFormat,
}

impl LasReader {
    pub fn open(path: impl AsRef<Path>, factory: Arc<dyn ReaderFactory>) -> LassoResult<Self> {
        let path = path.as_ref().to_path_buf();
        let external = open_external(&path, factory.as_ref())?;
        let external_header = external.header();

        let point_format = PointFormat::try_from(external_header.data_format_id)
            .map_err(|_| lasso_err!("Unknown LAS point format {}", external_header.data_format_id))?;
        if point_format.has_wave() {
            lasso_bail!(NotImplemented: "waveform point data", point_format);
        }

        let header = build_header(external_header, point_format)?;
        log::debug!(
            "Opened {} with {} points in {} and {} metadata records",
            path.display(),
            header.num_points(),
            point_format,
            header.metadata_record_count()
        );

        Ok(Self {
            path,
            factory,
            header,
            version_major: external_header.version_major,
            version_minor: external_header.version_minor,
            scale: external_header.scale,
            offset: external_header.offset,
            compressed: external_header.compressed,
            point_format,
        })
    }

    pub fn file_name(&self) -> &Path {
        &self.path
    }

    pub fn version_major(&self) -> u8 {
        self.version_major
    }

    pub fn version_minor(&self) -> u8 {
        self.version_minor
    }

    /// Scale factors for X, Y and Z.
    pub fn scale(&self) -> [f64; 3] {
        self.scale
    }

    /// Offsets for X, Y and Z.
    pub fn offset(&self) -> [f64; 3] {
        self.offset
    }

    pub fn is_compressed(&self) -> bool {
        self.compressed
    }

    pub fn point_format(&self) -> PointFormat {
        self.point_format
    }

    /// The coordinate system of the source, as WKT.
    ///
    /// Not supported yet: this always fails.
    pub fn spatial_reference(&self) -> LassoResult<String> {
        Err(lasso_err!(NotImplemented: "spatial_reference", self.name()))
    }

    pub(crate) fn open_external(&self) -> LassoResult<Box<dyn ExternalReader>> {
        open_external(&self.path, self.factory.as_ref())
    }
}

fn open_external(path: &Path, factory: &dyn ReaderFactory) -> LassoResult<Box<dyn ExternalReader>> {
    let file = File::open(path)?;
    factory.create_with_stream(Box::new(BufReader::new(file)))
}

fn build_header(external: &ExternalHeader, point_format: PointFormat) -> LassoResult<StageHeader> {
    let mut header = StageHeader::new(Schema::new(), external.point_count, external.bounds);
    for vlr in &external.vlrs {
        header.push_metadata_record(convert_vlr(vlr));
    }

    support::register_fields(header.schema_mut(), point_format)?;
    support::set_scaling(header.schema_mut(), external.scale, external.offset)?;
    Ok(header)
}

fn convert_vlr(vlr: &ExternalVlr) -> VariableLengthRecord {
    if vlr.data.len() != usize::from(vlr.record_length) {
        log::warn!(
            "VLR {}/{} declares {} bytes but carries {}",
            vlr.user_id,
            vlr.record_id,
            vlr.record_length,
            vlr.data.len()
        );
    }
    VariableLengthRecord::new(
        vlr.reserved,
        vlr.user_id.as_bytes(),
        vlr.record_id,
        vlr.description.as_bytes(),
        vlr.data.clone(),
        vlr.record_length,
    )
}

impl Stage for LasReader {
    fn name(&self) -> &str {
        "drivers.las.reader"
    }

    fn description(&self) -> &str {
        "LAS Reader"
    }

    fn header(&self) -> &StageHeader {
        &self.header
    }

    fn create_sequential_iterator(&self) -> LassoResult<SequentialIteratorRef<'_>> {
        Ok(Box::new(LasSequentialIterator::try_new(self)?))
    }

    fn create_random_iterator(&self) -> LassoResult<RandomIteratorRef<'_>> {
        Ok(Box::new(LasRandomIterator::try_new(self)?))
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use lasso_dtype::Field;
    use lasso_error::LassoError;
    use lasso_stage::Bounds;
    use rstest::{fixture, rstest};
    use tempfile::NamedTempFile;

    use super::*;
    use crate::{ExternalPoint, LAS_SIGNATURE, MemoryReaderFactory};

    #[fixture]
    fn las_file() -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(LAS_SIGNATURE).unwrap();
        file.write_all(&[0; 223]).unwrap();
        file.flush().unwrap();
        file
    }

    fn header(data_format_id: u8) -> ExternalHeader {
        ExternalHeader {
            bounds: Bounds::from_extent(0.0, 0.0, 0.0, 10.0, 10.0, 10.0),
            version_major: 1,
            version_minor: 2,
            scale: [0.01, 0.01, 0.001],
            offset: [100.0, 200.0, 0.0],
            compressed: true,
            data_format_id,
            vlrs: vec![
                ExternalVlr {
                    reserved: 0xAABB,
                    user_id: "LASF_Projection_and_more".to_string(),
                    record_id: 34735,
                    record_length: 4,
                    description: "GeoTIFF keys".to_string(),
                    data: vec![1, 2, 3, 4],
                },
                ExternalVlr {
                    user_id: "liblas".to_string(),
                    record_id: 2112,
                    record_length: 8,
                    data: vec![7; 3],
                    ..Default::default()
                },
            ],
            ..Default::default()
        }
    }

    fn factory(data_format_id: u8) -> Arc<MemoryReaderFactory> {
        Arc::new(MemoryReaderFactory::new(
            header(data_format_id),
            vec![ExternalPoint::default(); 5],
        ))
    }

    #[rstest]
    fn normalizes_header(las_file: NamedTempFile) {
        let reader = LasReader::open(las_file.path(), factory(3)).unwrap();

        assert_eq!(reader.name(), "drivers.las.reader");
        assert_eq!(reader.description(), "LAS Reader");
        assert_eq!(reader.file_name(), las_file.path());
        assert_eq!(reader.num_points(), 5);
        assert_eq!(reader.bounds().max(), [10.0; 3]);
        assert_eq!((reader.version_major(), reader.version_minor()), (1, 2));
        assert_eq!(reader.scale(), [0.01, 0.01, 0.001]);
        assert_eq!(reader.offset(), [100.0, 200.0, 0.0]);
        assert!(reader.is_compressed());
        assert_eq!(reader.point_format(), PointFormat::Format3);
    }

    #[rstest]
    fn registers_scaled_fields(las_file: NamedTempFile) {
        let reader = LasReader::open(las_file.path(), factory(1)).unwrap();
        let schema = reader.schema();

        assert_eq!(schema.len(), 13);
        assert!(schema.contains(&Field::Time));
        assert!(!schema.contains(&Field::Red));
        let y = schema.dimension(&Field::Y).unwrap();
        assert_eq!((y.scale(), y.offset()), (0.01, 200.0));
        assert!(!schema.dimension(&Field::Intensity).unwrap().is_scaled());
    }

    #[rstest]
    fn converts_metadata_records(las_file: NamedTempFile) {
        let reader = LasReader::open(las_file.path(), factory(0)).unwrap();
        assert_eq!(reader.metadata_record_count(), 2);

        let first = reader.metadata_record(0).unwrap();
        assert_eq!(first.reserved(), 0xAABB);
        assert_eq!(first.user_id(), b"LASF_Projection_");
        assert_eq!(first.record_id(), 34735);
        assert_eq!(first.description_str(), "GeoTIFF keys");
        assert_eq!(first.data().as_ref(), &[1, 2, 3, 4]);

        // the declared length is kept even when it disagrees with the payload
        let second = reader.metadata_record(1).unwrap();
        assert_eq!(second.record_length(), 8);
        assert_eq!(second.data().len(), 3);

        assert!(matches!(
            reader.metadata_record(2).unwrap_err(),
            LassoError::OutOfBounds(..)
        ));
    }

    #[rstest]
    #[case(4)]
    #[case(5)]
    fn waveform_formats_are_not_implemented(las_file: NamedTempFile, #[case] format: u8) {
        let err = LasReader::open(las_file.path(), factory(format)).err().unwrap();
        assert!(matches!(err, LassoError::NotImplemented(..)));
    }

    #[rstest]
    fn unknown_format_is_rejected(las_file: NamedTempFile) {
        let err = LasReader::open(las_file.path(), factory(9)).err().unwrap();
        assert!(matches!(err, LassoError::InvalidArgument(..)));
    }

    #[rstest]
    fn spatial_reference_is_not_implemented(las_file: NamedTempFile) {
        let reader = LasReader::open(las_file.path(), factory(0)).unwrap();
        assert!(matches!(
            reader.spatial_reference().unwrap_err(),
            LassoError::NotImplemented(..)
        ));
    }

    #[test]
    fn missing_file_propagates_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = LasReader::open(dir.path().join("missing.las"), factory(0))
            .err()
            .unwrap();
        assert!(matches!(err, LassoError::IOError(..)));
    }
}
