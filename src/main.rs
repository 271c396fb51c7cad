//! # Voxel Chunker Entry Point
//!
//! Calls into the library's `run()` function, which generates and meshes the
//! chunks around the origin and logs a summary.
//!
//! ## Usage
//!
//! ```bash
//! RUST_LOG=info VOXEL_CHUNKER_CONFIG=chunker.json cargo run --release
//! ```

use std::process::ExitCode;

fn main() -> ExitCode {
    match voxel_chunker::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("voxel-chunker: {err}");
            ExitCode::FAILURE
        }
    }
}
