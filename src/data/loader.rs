use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use arrow::array::{
    Array, Float32Array, Float64Array, Int32Array, Int64Array, LargeListArray, ListArray,
};
use arrow::datatypes::DataType;
use ndarray::Array2;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{FeatureKind, FeatureMatrix, FeatureSet, GroupKey};

/// Extensions tried, in order, when locating a group file.
const EXTENSIONS: [&str; 4] = ["parquet", "pq", "json", "csv"];

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load the four STFT spectrogram groups `S_{normal,abnormal}_{a2,i1}`.
pub fn load_spectrograms(dir: &Path) -> Result<FeatureSet> {
    load_groups(dir, &GroupKey::all_for(FeatureKind::Spectrogram))
}

/// Load the eight cepstral groups: `mfcc_*` and `fbank_*` for both classes
/// and both conditions.
pub fn load_cepstral(dir: &Path) -> Result<FeatureSet> {
    let mut keys = GroupKey::all_for(FeatureKind::Mfcc);
    keys.extend(GroupKey::all_for(FeatureKind::Fbank));
    load_groups(dir, &keys)
}

fn load_groups(dir: &Path, keys: &[GroupKey]) -> Result<FeatureSet> {
    let mut set = FeatureSet::default();
    for &key in keys {
        let path = locate(dir, key)?;
        let matrix =
            load_matrix(&path).with_context(|| format!("loading group '{key}'"))?;
        log::debug!("{key}: {:?} from {}", matrix.dim(), path.display());
        set.insert(key, matrix);
    }
    log::info!("Loaded {} feature groups from {}", set.len(), dir.display());
    Ok(set)
}

/// Find `<dir>/<group>.<ext>` for the first supported extension present.
fn locate(dir: &Path, key: GroupKey) -> Result<PathBuf> {
    let stem = key.name();
    EXTENSIONS
        .iter()
        .map(|ext| dir.join(format!("{stem}.{ext}")))
        .find(|p| p.is_file())
        .with_context(|| {
            format!(
                "no feature file for '{stem}' in {} (tried .{})",
                dir.display(),
                EXTENSIONS.join(", .")
            )
        })
}

/// Load one feature matrix from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.parquet` – one numeric column per coefficient, or a single list column
///   holding one row per record
/// * `.json`    – `[[c0, c1, ...], [c0, c1, ...], ...]`
/// * `.csv`     – headerless rows of numbers
pub fn load_matrix(path: &Path) -> Result<FeatureMatrix> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let rows = match ext.as_str() {
        "parquet" | "pq" => read_parquet_rows(path)?,
        "json" => read_json_rows(path)?,
        "csv" => read_csv_rows(path)?,
        other => bail!("Unsupported file extension: .{other}"),
    };
    rows_to_matrix(rows).with_context(|| format!("in {}", path.display()))
}

/// Stack equal-length rows into a matrix.
fn rows_to_matrix(rows: Vec<Vec<f64>>) -> Result<FeatureMatrix> {
    let n_rows = rows.len();
    let Some(width) = rows.first().map(Vec::len) else {
        bail!("feature file holds no rows");
    };
    if width == 0 {
        bail!("feature rows have no columns");
    }

    let mut flat = Vec::with_capacity(n_rows * width);
    for (i, row) in rows.into_iter().enumerate() {
        if row.len() != width {
            bail!("Row {i}: has {} values but row 0 has {width}", row.len());
        }
        if let Some(j) = row.iter().position(|v| !v.is_finite()) {
            bail!("Row {i}, column {j}: non-finite value");
        }
        flat.extend(row);
    }
    Ok(Array2::from_shape_vec((n_rows, width), flat)?)
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema, the default of `json.dump(matrix.tolist())`:
///
/// ```json
/// [
///   [-412.7, 61.3, 12.9, ...],
///   [-398.1, 58.8, 14.2, ...]
/// ]
/// ```
fn read_json_rows(path: &Path) -> Result<Vec<Vec<f64>>> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let records = root.as_array().context("Expected top-level JSON array")?;

    records
        .iter()
        .enumerate()
        .map(|(i, rec)| {
            let arr = rec
                .as_array()
                .with_context(|| format!("Row {i} is not a JSON array"))?;
            arr.iter()
                .enumerate()
                .map(|(j, v)| {
                    v.as_f64()
                        .with_context(|| format!("Row {i}, column {j}: not a number"))
                })
                .collect()
        })
        .collect()
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: no header, one sample per line, comma-separated floats.
fn read_csv_rows(path: &Path) -> Result<Vec<Vec<f64>>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .context("opening CSV")?;

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        let row = record
            .iter()
            .enumerate()
            .map(|(j, tok)| {
                tok.parse::<f64>()
                    .with_context(|| format!("Row {row_no}, column {j}: '{tok}' is not a number"))
            })
            .collect::<Result<Vec<f64>>>()?;
        rows.push(row);
    }
    Ok(rows)
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Read a Parquet feature file.
///
/// Two layouts are accepted:
/// - wide: every column is numeric (Float64, Float32, Int32, Int64) and holds
///   one coefficient, as written by `pd.DataFrame(matrix).to_parquet()`
/// - list: exactly one List<Float64|Float32> or LargeList column, each row
///   holding a whole feature vector
fn read_parquet_rows(path: &Path) -> Result<Vec<Vec<f64>>> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut rows = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let n_rows = batch.num_rows();
        let columns = batch.columns();

        let is_list_layout = columns.len() == 1
            && matches!(
                columns[0].data_type(),
                DataType::List(_) | DataType::LargeList(_)
            );

        if is_list_layout {
            for row in 0..n_rows {
                let values = extract_f64_list(&columns[0], row)
                    .with_context(|| format!("Row {row}: failed to read feature list"))?;
                rows.push(values);
            }
            continue;
        }

        let numeric: Vec<Vec<f64>> = columns
            .iter()
            .enumerate()
            .map(|(j, col)| {
                numeric_column(col).with_context(|| {
                    format!("column '{}'", batch.schema().field(j).name())
                })
            })
            .collect::<Result<_>>()?;

        for row in 0..n_rows {
            rows.push(numeric.iter().map(|col| col[row]).collect());
        }
    }

    Ok(rows)
}

// -- Parquet / Arrow helpers --

/// Extract a `Vec<f64>` from a List or LargeList column at the given row.
fn extract_f64_list(col: &Arc<dyn Array>, row: usize) -> Result<Vec<f64>> {
    if col.is_null(row) {
        bail!("null value in list column");
    }

    let values_array = match col.data_type() {
        DataType::List(_) => {
            let list_arr = col
                .as_any()
                .downcast_ref::<ListArray>()
                .context("expected ListArray")?;
            list_arr.value(row)
        }
        DataType::LargeList(_) => {
            let list_arr = col
                .as_any()
                .downcast_ref::<LargeListArray>()
                .context("expected LargeListArray")?;
            list_arr.value(row)
        }
        other => bail!("Expected List or LargeList column, got {other:?}"),
    };

    numeric_column(&values_array)
}

/// Convert a flat numeric Arrow array to `f64`.  Nulls are rejected.
fn numeric_column(col: &Arc<dyn Array>) -> Result<Vec<f64>> {
    if col.null_count() > 0 {
        bail!("{} null value(s) in numeric column", col.null_count());
    }
    let any = col.as_any();
    if let Some(arr) = any.downcast_ref::<Float64Array>() {
        Ok(arr.values().to_vec())
    } else if let Some(arr) = any.downcast_ref::<Float32Array>() {
        Ok(arr.values().iter().map(|&v| f64::from(v)).collect())
    } else if let Some(arr) = any.downcast_ref::<Int64Array>() {
        Ok(arr.values().iter().map(|&v| v as f64).collect())
    } else if let Some(arr) = any.downcast_ref::<Int32Array>() {
        Ok(arr.values().iter().map(|&v| f64::from(v)).collect())
    } else {
        bail!(
            "type is {:?}, expected Float64, Float32, Int64 or Int32",
            col.data_type()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{Condition, VoiceClass};
    use arrow::array::{Float64Builder, LargeListBuilder, ListBuilder, StringArray};
    use arrow::datatypes::{Field, Schema};
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "vocal-screen-loader-{name}-{}",
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn write_wide_parquet(path: &Path, rows: &[Vec<f64>]) {
        let width = rows[0].len();
        let fields: Vec<Field> = (0..width)
            .map(|j| Field::new(format!("c{j}"), DataType::Float64, false))
            .collect();
        let schema = Arc::new(Schema::new(fields));
        let columns: Vec<Arc<dyn Array>> = (0..width)
            .map(|j| {
                Arc::new(Float64Array::from(
                    rows.iter().map(|r| r[j]).collect::<Vec<_>>(),
                )) as Arc<dyn Array>
            })
            .collect();
        let batch = RecordBatch::try_new(schema.clone(), columns).unwrap();
        let file = std::fs::File::create(path).unwrap();
        let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();
    }

    #[test]
    fn json_rows_become_matrix() {
        let dir = scratch_dir("json");
        let path = dir.join("m.json");
        std::fs::write(&path, "[[1.0, 2.0, 3.0], [4, 5, 6]]").unwrap();

        let m = load_matrix(&path).unwrap();
        assert_eq!(m.dim(), (2, 3));
        assert_eq!(m[[1, 0]], 4.0);
    }

    #[test]
    fn csv_rows_become_matrix() {
        let dir = scratch_dir("csv");
        let path = dir.join("m.csv");
        std::fs::write(&path, "0.5, 1.5\n-2.0, 3.25\n7,8\n").unwrap();

        let m = load_matrix(&path).unwrap();
        assert_eq!(m.dim(), (3, 2));
        assert_eq!(m[[1, 1]], 3.25);
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let dir = scratch_dir("ragged");
        let path = dir.join("m.csv");
        std::fs::write(&path, "1,2,3\n4,5\n").unwrap();

        let err = load_matrix(&path).unwrap_err();
        assert!(format!("{err:#}").contains("Row 1"));
    }

    #[test]
    fn non_numeric_json_is_rejected() {
        let dir = scratch_dir("nonnum");
        let path = dir.join("m.json");
        std::fs::write(&path, r#"[[1.0, "x"]]"#).unwrap();
        assert!(load_matrix(&path).is_err());
    }

    #[test]
    fn empty_and_unknown_files_are_rejected() {
        let dir = scratch_dir("empty");
        let empty = dir.join("m.json");
        std::fs::write(&empty, "[]").unwrap();
        assert!(load_matrix(&empty).is_err());

        let mat = dir.join("m.mat");
        std::fs::write(&mat, "").unwrap();
        let err = load_matrix(&mat).unwrap_err();
        assert!(err.to_string().contains(".mat"));
    }

    #[test]
    fn wide_parquet_reads_one_column_per_coefficient() {
        let dir = scratch_dir("wide");
        let path = dir.join("m.parquet");
        write_wide_parquet(&path, &[vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0]]);

        let m = load_matrix(&path).unwrap();
        assert_eq!(m.dim(), (3, 2));
        assert_eq!(m.row(2).to_vec(), vec![5.0, 6.0]);
    }

    #[test]
    fn list_parquet_reads_one_row_per_record() {
        let dir = scratch_dir("list");
        let path = dir.join("m.parquet");

        let mut builder = ListBuilder::new(Float64Builder::new());
        for row in [[0.1, 0.2, 0.3], [0.4, 0.5, 0.6]] {
            for v in row {
                builder.values().append_value(v);
            }
            builder.append(true);
        }
        let array = builder.finish();
        let schema = Arc::new(Schema::new(vec![Field::new(
            "features",
            DataType::List(Arc::new(Field::new("item", DataType::Float64, true))),
            false,
        )]));
        let batch = RecordBatch::try_new(schema.clone(), vec![Arc::new(array)]).unwrap();
        let file = std::fs::File::create(&path).unwrap();
        let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let m = load_matrix(&path).unwrap();
        assert_eq!(m.dim(), (2, 3));
        assert_eq!(m[[1, 2]], 0.6);
    }

    #[test]
    fn large_list_parquet_reads_one_row_per_record() {
        let dir = scratch_dir("largelist");
        let path = dir.join("m.parquet");

        let mut builder = LargeListBuilder::new(Float64Builder::new());
        for row in [[1.5, 2.5], [3.5, 4.5], [5.5, 6.5]] {
            for v in row {
                builder.values().append_value(v);
            }
            builder.append(true);
        }
        let array = builder.finish();
        let schema = Arc::new(Schema::new(vec![Field::new(
            "features",
            DataType::LargeList(Arc::new(Field::new("item", DataType::Float64, true))),
            false,
        )]));
        let batch = RecordBatch::try_new(schema.clone(), vec![Arc::new(array)]).unwrap();
        let file = std::fs::File::create(&path).unwrap();
        let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let m = load_matrix(&path).unwrap();
        assert_eq!(m.dim(), (3, 2));
        assert_eq!(m[[2, 0]], 5.5);
    }

    #[test]
    fn pq_extension_is_read_as_parquet() {
        let dir = scratch_dir("pq");
        let path = dir.join("m.pq");
        write_wide_parquet(&path, &[vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]);

        let m = load_matrix(&path).unwrap();
        assert_eq!(m.dim(), (2, 3));
        assert_eq!(m[[1, 2]], 6.0);
    }

    #[test]
    fn non_finite_values_are_rejected() {
        let dir = scratch_dir("nonfinite");
        let csv = dir.join("m.csv");
        std::fs::write(&csv, "1,NaN,3\n4,inf,6\n").unwrap();
        let err = load_matrix(&csv).unwrap_err();
        assert!(format!("{err:#}").contains("Row 0, column 1: non-finite"));

        let csv = dir.join("inf.csv");
        std::fs::write(&csv, "1,2,3\n4,-inf,6\n").unwrap();
        let err = load_matrix(&csv).unwrap_err();
        assert!(format!("{err:#}").contains("Row 1, column 1: non-finite"));

        let parquet = dir.join("m.parquet");
        let schema = Arc::new(Schema::new(vec![Field::new("c0", DataType::Float64, true)]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![Arc::new(Float64Array::from(vec![Some(1.0), None]))],
        )
        .unwrap();
        let file = std::fs::File::create(&parquet).unwrap();
        let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let err = load_matrix(&parquet).unwrap_err();
        let msg = format!("{err:#}");
        assert!(msg.contains("c0") && msg.contains("null"), "{msg}");
    }

    #[test]
    fn string_parquet_column_is_rejected() {
        let dir = scratch_dir("strings");
        let path = dir.join("m.parquet");
        let schema = Arc::new(Schema::new(vec![Field::new("c0", DataType::Utf8, false)]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![Arc::new(StringArray::from(vec!["a", "b"]))],
        )
        .unwrap();
        let file = std::fs::File::create(&path).unwrap();
        let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let err = load_matrix(&path).unwrap_err();
        assert!(format!("{err:#}").contains("c0"));
    }

    #[test]
    fn cepstral_loader_collects_all_eight_groups() {
        let dir = scratch_dir("cepstral");
        for kind in [FeatureKind::Mfcc, FeatureKind::Fbank] {
            for key in GroupKey::all_for(kind) {
                let path = dir.join(format!("{}.json", key.name()));
                std::fs::write(&path, "[[1, 2, 3], [4, 5, 6]]").unwrap();
            }
        }
        // Parquet wins over JSON when both exist.
        let key = GroupKey::new(FeatureKind::Mfcc, VoiceClass::Normal, Condition::A2);
        write_wide_parquet(&dir.join(format!("{}.parquet", key.name())), &[vec![9.0; 4]]);

        let set = load_cepstral(&dir).unwrap();
        assert_eq!(set.len(), 8);
        assert_eq!(set.require(key).unwrap().dim(), (1, 4));
    }

    #[test]
    fn missing_group_file_aborts_load() {
        let dir = scratch_dir("missing");
        let err = load_spectrograms(&dir).unwrap_err();
        assert!(err.to_string().contains("S_normal_a2"));
    }
}
