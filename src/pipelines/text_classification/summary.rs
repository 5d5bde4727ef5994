use std::{
    fs::{File, OpenOptions},
    io::Write,
    path::Path,
    time::{SystemTime, UNIX_EPOCH},
};

use anyhow::Context;
use serde::{Deserialize, Serialize};

/// A named scalar at a training step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scalar {
    /// The optimization step
    pub step: usize,

    /// The scalar name (e.g. "loss")
    pub tag: String,

    /// The value. NaN and infinities are stored as strings, which JSON has no numbers for.
    #[serde(with = "non_finite")]
    pub value: f64,

    /// Seconds since the Unix epoch when the value was recorded
    pub wall_time: f64,
}

mod non_finite {
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if value.is_finite() {
            serializer.serialize_f64(*value)
        } else {
            serializer.collect_str(value)
        }
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Value {
        Number(f64),
        Text(String),
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::Number(value) => Ok(value),
            Value::Text(text) => text.parse().map_err(de::Error::custom),
        }
    }
}

/// Appends scalars to `metrics.csv` and `metrics.jsonl` in a summary directory
pub struct SummaryWriter {
    json: File,
    csv: csv::Writer<File>,
}

impl SummaryWriter {
    /// Open the summary files of a directory for appending
    pub fn new(dir: &Path) -> anyhow::Result<Self> {
        let open = |name: &str| {
            let path = dir.join(name);

            OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .with_context(|| format!("Unable to open summary file {}", path.display()))
        };

        let json = open("metrics.jsonl")?;
        let csv_file = open("metrics.csv")?;

        // Only a brand new file gets a header row
        let is_new = csv_file.metadata()?.len() == 0;

        let csv = csv::WriterBuilder::new()
            .has_headers(is_new)
            .from_writer(csv_file);

        Ok(Self { json, csv })
    }

    /// Record a group of scalars for one step
    pub fn add_scalars(&mut self, step: usize, scalars: &[(&str, f64)]) -> anyhow::Result<()> {
        let wall_time = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs_f64())
            .unwrap_or_default();

        for (tag, value) in scalars {
            let scalar = Scalar {
                step,
                tag: tag.to_string(),
                value: *value,
                wall_time,
            };

            writeln!(self.json, "{}", serde_json::to_string(&scalar)?)?;
            self.csv.serialize(&scalar)?;
        }

        self.csv.flush()?;

        Ok(())
    }
}
