//! # Voxel Task System
//!
//! Tasks related to chunk generation. They run on the engine's workers so that
//! generating a neighborhood of chunks does not block the caller.

pub mod chunk_generation_task;
