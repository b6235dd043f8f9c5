//! An in-memory stand-in for the external LAS library.

use std::io::Read;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use lasso_error::{LassoResult, lasso_bail, lasso_err};

use crate::{ExternalHeader, ExternalPoint, ExternalReader, ReaderFactory};

/// The four bytes every LAS file starts with.
pub const LAS_SIGNATURE: &[u8; 4] = b"LASF";

/// A [`ReaderFactory`] serving a fixed header and point list.
///
/// The stream it is handed must start with [`LAS_SIGNATURE`]; the rest of its content is
/// ignored. Every reader created shares the same points.
#[derive(Debug)]
pub struct MemoryReaderFactory {
    header: ExternalHeader,
    points: Arc<[ExternalPoint]>,
    opened: AtomicUsize,
}

impl MemoryReaderFactory {
    /// Create a factory serving `points`. The header point count is set to match them.
    pub fn new(mut header: ExternalHeader, points: impl Into<Arc<[ExternalPoint]>>) -> Self {
        let points = points.into();
        header.point_count = points.len() as u64;
        Self {
            header,
            points,
            opened: AtomicUsize::new(0),
        }
    }

    /// The number of readers created so far.
    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::Relaxed)
    }
}

impl ReaderFactory for MemoryReaderFactory {
    fn create_with_stream(
        &self,
        mut stream: Box<dyn Read>,
    ) -> LassoResult<Box<dyn ExternalReader>> {
        let mut signature = [0u8; 4];
        stream
            .read_exact(&mut signature)
            .map_err(|e| lasso_err!(Context: "reading LAS signature", e.into()))?;
        if &signature != LAS_SIGNATURE {
            lasso_bail!(
                "stream is not a LAS source, found signature \"{}\"",
                signature.escape_ascii()
            );
        }

        self.opened.fetch_add(1, Ordering::Relaxed);
        Ok(Box::new(MemoryReader {
            header: self.header.clone(),
            points: self.points.clone(),
            position: 0,
        }))
    }
}

struct MemoryReader {
    header: ExternalHeader,
    points: Arc<[ExternalPoint]>,
    position: usize,
}

impl ExternalReader for MemoryReader {
    fn header(&self) -> &ExternalHeader {
        &self.header
    }

    fn seek(&mut self, index: u64) -> LassoResult<()> {
        let index = usize::try_from(index)
            .map_err(|_| lasso_err!(OutOfBounds: usize::MAX, 0, self.points.len()))?;
        if index > self.points.len() {
            lasso_bail!(OutOfBounds: index, 0, self.points.len());
        }
        self.position = index;
        Ok(())
    }

    fn read_point(&mut self) -> LassoResult<Option<ExternalPoint>> {
        let point = self.points.get(self.position).copied();
        if point.is_some() {
            self.position += 1;
        }
        Ok(point)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn factory() -> MemoryReaderFactory {
        let points = (0..3)
            .map(|i| ExternalPoint {
                x: i,
                ..Default::default()
            })
            .collect::<Vec<_>>();
        MemoryReaderFactory::new(ExternalHeader::default(), points)
    }

    #[test]
    fn reads_points_in_order() {
        let factory = factory();
        let mut reader = factory
            .create_with_stream(Box::new(Cursor::new(b"LASF....".to_vec())))
            .unwrap();
        assert_eq!(reader.header().point_count, 3);
        assert_eq!(factory.opened(), 1);

        reader.seek(1).unwrap();
        assert_eq!(reader.read_point().unwrap().map(|p| p.x), Some(1));
        assert_eq!(reader.read_point().unwrap().map(|p| p.x), Some(2));
        assert_eq!(reader.read_point().unwrap(), None);
        assert!(reader.seek(4).is_err());
    }

    #[test]
    fn rejects_foreign_streams() {
        let factory = factory();
        let err = factory
            .create_with_stream(Box::new(Cursor::new(b"PK\x03\x04".to_vec())))
            .err()
            .unwrap();
        assert!(err.to_string().contains(r#"found signature "PK\x03\x04""#));
        assert!(
            factory
                .create_with_stream(Box::new(Cursor::new(b"LA".to_vec())))
                .is_err()
        );
        assert_eq!(factory.opened(), 0);
    }
}
