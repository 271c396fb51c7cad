use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use cgmath::Point3;
use voxel_chunker::voxels::chunk::ChunkBounds;
use voxel_chunker::{ChunkCoordinate, ChunkEngine, ChunkerConfig, VoxelChunk, VoxelId};

const GROUND: VoxelId = VoxelId::new(2);

/// Solid ground below world voxel y = 0, air above.
fn flat_ground(bounds: &ChunkBounds) -> VoxelChunk {
    bounds.fill(|position| if position.y < 0 { GROUND } else { VoxelId::AIR })
}

fn config() -> ChunkerConfig {
    ChunkerConfig::from_json_str(r#"{ "chunk_size": 8, "chunk_distance": 1, "worker_count": 2 }"#)
        .unwrap()
}

#[test]
fn missing_chunks_are_reported_generated_and_meshed() {
    let mut engine = ChunkEngine::new(&config(), Arc::new(flat_ground)).unwrap();

    let reported = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&reported);
    engine.subscribe_missing_chunks(move |coordinate| sink.borrow_mut().push(coordinate));

    let observer = Point3::new(10.0, 10.0, 10.0);
    let missing = engine.request_missing_chunks(observer);
    assert_eq!(missing.len(), 8);
    assert_eq!(*reported.borrow(), missing);

    engine.finish_tasks();

    let store = engine.store();
    {
        let store = store.get();
        assert_eq!(store.chunk_count(), 8);
        for coordinate in missing {
            let chunk = store.get_chunk(coordinate).unwrap();
            assert_eq!(chunk.position(), coordinate);

            let meshes = store.meshes(coordinate);
            if coordinate.y < 0 {
                assert!(!chunk.is_empty());
                assert_eq!(meshes.len(), 1);
                let mesh = &meshes[0];
                assert!(mesh.transparent.is_empty());
                assert_eq!(mesh.opaque.quad_count(), 6);
                for quad in 0..6 {
                    assert_eq!(mesh.opaque.quad_area(quad), 64);
                }
            } else {
                assert!(chunk.is_empty());
                assert!(meshes.is_empty());
            }
        }
    }

    assert!(engine.request_missing_chunks(observer).is_empty());
    assert_eq!(reported.borrow().len(), 8);
}

#[test]
fn voxel_edits_reach_the_generated_chunks() {
    let mut engine = ChunkEngine::new(&config(), Arc::new(flat_ground)).unwrap();
    engine.request_missing_chunks(Point3::new(0.0, 0.0, 0.0));
    engine.finish_tasks();

    let store = engine.store();
    {
        let mut store = store.get_mut();
        let (previous, chunk) = store
            .voxel_at_coordinates(-3, -1, 4, Some(VoxelId::AIR), false)
            .unwrap();
        assert_eq!(previous, GROUND);
        assert_eq!(chunk.unwrap().position(), ChunkCoordinate::new(-1, -1, 0));

        // Far outside the generated neighborhood: nothing to read, nothing created.
        let (far, chunk) = store.voxel_at_coordinates(100, 100, 100, None, true).unwrap();
        assert_eq!(far, VoxelId::AIR);
        assert!(chunk.is_none());
        assert_eq!(store.chunk_count(), 8);
    }

    assert!(engine.schedule_mesh(ChunkCoordinate::new(-1, -1, 0)));
    engine.finish_tasks();

    let store = store.get();
    let meshes = store.meshes(ChunkCoordinate::new(-1, -1, 0));
    assert_eq!(meshes.len(), 1);
    // The hole in the top face splits it and exposes its walls.
    assert!(meshes[0].opaque.quad_count() > 6);
}
