use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Box-Muller draw from a normal distribution.
fn gauss(rng: &mut StdRng, mean: f64, std_dev: f64) -> f64 {
    let u1 = rng.gen::<f64>().max(1e-15);
    let u2: f64 = rng.gen();
    let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
    mean + std_dev * z
}

/// Shape of one synthetic feature family.
struct Family {
    prefix: &'static str,
    rows: usize,
    cols: usize,
}

const FAMILIES: [Family; 3] = [
    Family {
        prefix: "S",
        rows: 60,
        cols: 129,
    },
    Family {
        prefix: "mfcc",
        rows: 100,
        cols: 13,
    },
    Family {
        prefix: "fbank",
        rows: 100,
        cols: 26,
    },
];

/// Mean coefficient profile. Abnormal voices get a shifted, noisier profile.
fn profile(j: usize, abnormal: bool, condition_shift: f64) -> (f64, f64) {
    let base = 0.8 * (0.5 * j as f64 + condition_shift).cos();
    if abnormal {
        (base + 0.5 * (0.9 * j as f64).sin(), 0.35)
    } else {
        (base, 0.2)
    }
}

fn generate_group(rng: &mut StdRng, family: &Family, abnormal: bool, condition_shift: f64) -> Vec<Vec<f64>> {
    (0..family.rows)
        .map(|_| {
            (0..family.cols)
                .map(|j| {
                    let (mean, sd) = profile(j, abnormal, condition_shift);
                    gauss(rng, mean, sd)
                })
                .collect()
        })
        .collect()
}

/// Write rows as a wide Parquet file: one Float64 column per coefficient.
fn write_parquet(path: &Path, rows: &[Vec<f64>]) -> Result<()> {
    let cols = rows.first().map_or(0, Vec::len);
    let schema = Arc::new(Schema::new(
        (0..cols)
            .map(|j| Field::new(format!("c{j}"), DataType::Float64, false))
            .collect::<Vec<_>>(),
    ));
    let columns: Vec<ArrayRef> = (0..cols)
        .map(|j| Arc::new(Float64Array::from_iter_values(rows.iter().map(|r| r[j]))) as ArrayRef)
        .collect();

    let batch = RecordBatch::try_new(schema.clone(), columns).context("building record batch")?;
    let file = std::fs::File::create(path)
        .with_context(|| format!("creating {}", path.display()))?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();

    let out_dir = Path::new("data");
    std::fs::create_dir_all(out_dir).context("creating data directory")?;
    let mut rng = StdRng::seed_from_u64(42);

    let mut written = 0;
    for family in &FAMILIES {
        for (condition, shift) in [("a2", 0.0), ("i1", 0.7)] {
            for (class, abnormal) in [("normal", false), ("abnormal", true)] {
                let rows = generate_group(&mut rng, family, abnormal, shift);
                let path = out_dir.join(format!("{}_{class}_{condition}.parquet", family.prefix));
                write_parquet(&path, &rows)?;
                log::debug!("wrote {}", path.display());
                written += 1;
            }
        }
    }

    println!("Wrote {written} feature groups to {}", out_dir.display());
    Ok(())
}
