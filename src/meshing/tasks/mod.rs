//! Background tasks for the mesher.
//!
//! # Available Tasks
//! - `ChunkMeshGenerationTask`: Meshes a chunk snapshot on a worker thread

pub mod chunk_mesh_generation_task;
