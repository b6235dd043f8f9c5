#![allow(clippy::unwrap_used)]

use std::io::Write;
use std::sync::Arc;

use itertools::Itertools;
use lasso::buffer::PointData;
use lasso::cache::{Arena, LruCache};
use lasso::drivers::las::{
    ExternalHeader, ExternalPoint, ExternalVlr, LAS_SIGNATURE, LasReader, MemoryReaderFactory,
};
use lasso::dtype::{Dimension, Field, PType, Schema, SchemaLayout};
use lasso::error::LassoError;
use lasso::metrics::LassoMetrics;
use lasso::stage::{
    Bounds, CacheFilter, CacheFilterOptions, FauxMode, FauxReader, FauxReaderOptions, Stage,
};
use rstest::rstest;
use tempfile::NamedTempFile;

fn las_source(num_points: i32, data_format_id: u8) -> (NamedTempFile, Arc<MemoryReaderFactory>) {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(LAS_SIGNATURE).unwrap();
    file.flush().unwrap();

    let points = (0..num_points)
        .map(|i| ExternalPoint {
            x: i,
            y: 2 * i,
            z: 3 * i,
            intensity: 1,
            ..Default::default()
        })
        .collect_vec();
    let header = ExternalHeader {
        bounds: Bounds::from_extent(
            0.0,
            0.0,
            0.0,
            f64::from(num_points),
            f64::from(2 * num_points),
            f64::from(3 * num_points),
        ),
        scale: [0.5; 3],
        data_format_id,
        vlrs: vec![ExternalVlr {
            user_id: "LASF_Projection".to_string(),
            record_id: 34735,
            record_length: 2,
            data: vec![0, 1],
            ..Default::default()
        }],
        ..Default::default()
    };
    (file, Arc::new(MemoryReaderFactory::new(header, points)))
}

/// Drain a stage through a sequential iterator, collecting the X dimension as `f64`.
fn collect_x(stage: &dyn Stage, batch: usize) -> Vec<f64> {
    let x = stage.schema().dimension_index(&Field::X).unwrap();
    let mut iter = stage.create_sequential_iterator().unwrap();
    let mut data = PointData::for_schema(stage.schema(), batch);
    let mut xs = vec![];
    while !iter.at_end() {
        let n = iter.read(&mut data, batch).unwrap();
        for i in 0..n {
            xs.push(data.get_value(i, x).unwrap().as_f64().unwrap());
        }
    }
    xs
}

#[test]
fn reference_cache_trace() {
    // the cache only indexes handles; the arena owns what they point to
    let mut arena = Arena::new();
    let mut cache = LruCache::try_new(2).unwrap();
    let item0 = arena.insert("item0");
    let item00 = arena.insert("item00");
    let item1 = arena.insert("item1");
    let item2 = arena.insert("item2");
    let item22 = arena.insert("item22");

    for (key, value) in [
        (0, item0),
        (0, item0),
        (10, item1),
        (10, item1),
        (10, item0),
        (0, item0),
        (20, item2),
        (20, item2),
        (0, item0),
    ] {
        cache.insert(key, value);
    }

    assert_eq!(cache.lookup(&0), Some(item0));
    assert_eq!(cache.lookup(&10), None);
    assert_eq!(cache.lookup(&20), Some(item2));
    assert_eq!(cache.keys(), vec![0, 20]);

    assert_eq!(cache.insert(0, item00), item0);
    assert_eq!(cache.insert(20, item22), item2);
    assert_eq!(cache.keys(), vec![20, 0]);

    // the discarded candidates are still owned by the arena
    assert_eq!(arena.get(cache.lookup(&0).unwrap()), Some(&"item0"));
    assert_eq!(arena.get(item00), Some(&"item00"));
}

#[test]
fn layout_and_buffer() {
    let schema = Schema::try_from_dimensions([
        Dimension::new(Field::Intensity, PType::U32),
        Dimension::new(Field::Time, PType::F64),
        Dimension::new(Field::X, PType::I32),
    ])
    .unwrap();
    let layout = SchemaLayout::new(&schema);
    assert_eq!(layout.offsets(), &[0, 4, 12]);
    assert_eq!(layout.byte_size(), 16);

    let mut data = PointData::new(Arc::new(layout), 10);
    data.set_field(3, 1, 42.25f64).unwrap();
    assert_eq!(data.get_field::<f64>(3, 1).unwrap(), 42.25);
    assert!(matches!(
        data.set_field(10, 1, 1.0f64).unwrap_err(),
        LassoError::OutOfBounds(..)
    ));
}

#[rstest]
#[case(1)]
#[case(7)]
#[case(64)]
fn las_through_cache_filter(#[case] batch: usize) {
    let (file, factory) = las_source(50, 1);
    let reader = LasReader::open(file.path(), factory).unwrap();
    assert_eq!(reader.metadata_record_count(), 1);
    assert!(reader.metadata_record(0).unwrap().is_projection_record());

    let direct = collect_x(&reader, batch);
    assert_eq!(direct, (0..50).map(f64::from).collect_vec());

    let metrics = LassoMetrics::new();
    let filter = CacheFilter::try_new(
        Box::new(reader),
        CacheFilterOptions::default()
            .with_block_size(16)
            .with_max_cache_blocks(2),
        metrics.clone(),
    )
    .unwrap();
    assert_eq!(filter.schema().dimension(&Field::X).unwrap().scale(), 0.5);

    assert_eq!(collect_x(&filter, batch), direct);
    // four blocks, each materialized once
    assert_eq!(metrics.counter_value("lasso.cache.blocks.misses"), 4);
    assert_eq!(metrics.counter_value("lasso.cache.blocks.evictions"), 2);
    assert_eq!(filter.cache_keys(), vec![3, 2]);
}

#[test]
fn cache_hits_skip_the_source() {
    let (file, factory) = las_source(40, 0);
    let reader = LasReader::open(file.path(), factory.clone()).unwrap();
    let filter = CacheFilter::try_new(
        Box::new(reader),
        CacheFilterOptions::default().with_block_size(10),
        LassoMetrics::new(),
    )
    .unwrap();
    let opened = factory.opened();

    let mut iter = filter.create_random_iterator().unwrap();
    let mut data = PointData::for_schema(filter.schema(), 5);
    for position in [12, 15, 10, 17, 12] {
        iter.seek(position).unwrap();
        iter.read(&mut data, 3).unwrap();
        assert_eq!(data.get_field::<i32>(0, 0).unwrap(), position as i32);
    }

    // one external reader for the single block materialized
    assert_eq!(factory.opened(), opened + 1);
    assert_eq!(filter.cache_keys(), vec![1]);
}

#[test]
fn filters_stack_as_trait_objects() {
    let faux = FauxReader::try_new(
        FauxReaderOptions::new(30, Bounds::from_extent(0.0, 0.0, 0.0, 29.0, 29.0, 29.0))
            .with_mode(FauxMode::Ramp),
    )
    .unwrap();
    let metrics = LassoMetrics::new();
    let inner = CacheFilter::try_new(
        Box::new(faux),
        CacheFilterOptions::default().with_block_size(4),
        metrics.clone(),
    )
    .unwrap();
    let outer: Box<dyn Stage> = Box::new(
        CacheFilter::try_new(
            Box::new(inner),
            CacheFilterOptions::default().with_block_size(8),
            LassoMetrics::new(),
        )
        .unwrap(),
    );

    assert_eq!(collect_x(outer.as_ref(), 5), (0..30).map(f64::from).collect_vec());
    assert_eq!(metrics.counter_value("lasso.cache.blocks.misses"), 8);
}

#[test]
fn waveform_source_fails_before_schema() {
    let (file, factory) = las_source(3, 4);
    let err = LasReader::open(file.path(), factory).err().unwrap();
    assert!(matches!(err, LassoError::NotImplemented(..)));
}
