//! # Voxel Crawler Entry Point
//!
//! Runs the library's headless demo. Set `RUST_LOG` to see generation and
//! streaming logs, and `VOXEL_CRAWLER_CONFIG` to load parameters from JSON.
//!
//! ## Usage
//!
//! ```bash
//! RUST_LOG=info cargo run --release
//! ```

fn main() {
    if let Err(err) = voxel_crawler::run() {
        log::error!("{err}");
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
