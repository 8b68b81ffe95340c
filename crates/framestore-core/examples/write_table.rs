//! Store a small random frame in the table layout.
//!
//! Builds a 50 x 3 frame of random values in [0, 1) with columns A, B, C
//! and puts it under the key `d1`. Produces no console output; inspect the
//! resulting file with the read-side APIs.

use arrow::array::Float64Array;
use framestore_core::{DataFrame, TableStore};
use rand::Rng;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut rng = rand::rng();

    let column_names: Vec<String> = ["A", "B", "C"].iter().map(|s| s.to_string()).collect();
    let columns: Vec<Float64Array> = (0..column_names.len())
        .map(|_| {
            let values: Vec<f64> = (0..50).map(|_| rng.random::<f64>()).collect();
            Float64Array::from(values)
        })
        .collect();

    let frame = DataFrame::new("sample", column_names, columns)?;

    let store = TableStore::new("test-scratch/write_example/frame_small.frs");
    store.put("d1", &frame)?;

    Ok(())
}
