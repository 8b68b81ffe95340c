//! Read a block-layout frame and print it.
//!
//! Reads a container file through the root-attribute indirection and prints
//! the reconstructed frame to stdout. The input file is produced on first
//! run so the example is self-contained and repeatable.

use std::path::Path;

use arrow::array::Float64Array;
use framestore_core::DataFrame;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let path = Path::new("test-scratch/read_example/frame_2d.frs");

    if !path.exists() {
        let frame = DataFrame::new(
            "depth_profile",
            vec!["depth".to_string(), "porosity".to_string()],
            vec![
                Float64Array::from(vec![100.0, 150.0, 200.0, 250.0]),
                Float64Array::from(vec![0.18, 0.21, 0.16, 0.12]),
            ],
        )?;
        frame.to_block(path, "/frame")?;
    }

    let frame = DataFrame::from_block(path)?;
    println!("{frame}");

    Ok(())
}
