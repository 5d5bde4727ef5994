use std::{
    fs::File,
    io::{BufRead, BufReader, Read},
    path::Path,
};

use log::{debug, warn};

use super::{EmbeddingError, EmbeddingTable};

/// How many bytes to inspect when sniffing the format
const SNIFF_LEN: u64 = 4096;

/// The on-disk word2vec formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// `word v1 v2 ...` per line
    Text,

    /// `word ` followed by packed little-endian f32 values
    Binary,
}

impl Format {
    /// Detect the format from the extension, falling back to the file contents.
    ///
    /// Both formats start with an ASCII `<count> <dim>` header. The body of a text file is valid
    /// UTF-8, packed floats almost never are.
    pub fn detect(path: &str) -> Result<Self, EmbeddingError> {
        if Path::new(path).extension().is_some_and(|ext| ext == "bin") {
            return Ok(Format::Binary);
        }

        let mut head = Vec::new();
        File::open(path)?.take(SNIFF_LEN).read_to_end(&mut head)?;

        let body = match head.iter().position(|b| *b == b'\n') {
            Some(end) => &head[end + 1..],
            None => return Ok(Format::Text),
        };

        match std::str::from_utf8(body) {
            Ok(_) => Ok(Format::Text),
            // A multi-byte character cut off by the sniff window
            Err(e) if e.error_len().is_none() => Ok(Format::Text),
            Err(_) => Ok(Format::Binary),
        }
    }
}

/// Load a word2vec file in either format
pub fn load(path: &str) -> Result<EmbeddingTable, EmbeddingError> {
    let format = Format::detect(path)?;

    debug!("Reading {:?} word2vec embeddings from {}", format, path);

    let mut reader = BufReader::new(File::open(path)?);
    let (count, dim) = read_header(&mut reader)?;

    let entries = match format {
        Format::Text => read_text(reader, count)?,
        Format::Binary => read_binary(reader, count, dim)?,
    };

    if entries.len() < count {
        warn!(
            "Embeddings header declares {} words but only {} were read",
            count,
            entries.len()
        );
    }

    EmbeddingTable::new(dim, entries)
}

fn read_header<R: BufRead>(reader: &mut R) -> Result<(usize, usize), EmbeddingError> {
    let mut line = String::new();
    reader.read_line(&mut line)?;

    let mut parts = line.split_whitespace().map(str::parse::<usize>);

    match (parts.next(), parts.next(), parts.next()) {
        (Some(Ok(count)), Some(Ok(dim)), None) if dim > 0 => Ok((count, dim)),
        _ => Err(EmbeddingError::Header(line.trim().to_string())),
    }
}

fn read_text<R: BufRead>(
    reader: R,
    count: usize,
) -> Result<Vec<(String, Vec<f32>)>, EmbeddingError> {
    let mut entries = Vec::with_capacity(count);

    for line in reader.lines() {
        if entries.len() == count {
            break;
        }

        let line = line?;
        let mut parts = line.split_whitespace();

        let Some(word) = parts.next() else {
            continue;
        };

        let vector = parts
            .map(|value| {
                value.parse::<f32>().map_err(|_| EmbeddingError::Value {
                    word: word.to_string(),
                    value: value.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        entries.push((word.to_string(), vector));
    }

    Ok(entries)
}

fn read_binary<R: BufRead>(
    mut reader: R,
    count: usize,
    dim: usize,
) -> Result<Vec<(String, Vec<f32>)>, EmbeddingError> {
    let mut entries = Vec::with_capacity(count);
    let mut raw = vec![0u8; dim * 4];

    for _ in 0..count {
        let mut word = Vec::new();
        reader.read_until(b' ', &mut word)?;

        if word.is_empty() {
            break;
        }

        if word.last() == Some(&b' ') {
            word.pop();
        }

        // Vectors are usually followed by a newline which lands at the start of the next word
        let start = word.iter().take_while(|b| **b == b'\n').count();
        let word = String::from_utf8_lossy(&word[start..]).into_owned();

        reader.read_exact(&mut raw)?;

        let vector = raw
            .chunks_exact(4)
            .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
            .collect();

        entries.push((word, vector));
    }

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::utils::files::scratch_dir;

    fn write_binary(path: &Path, entries: &[(&str, [f32; 2])]) {
        let mut bytes = format!("{} 2\n", entries.len()).into_bytes();

        for (word, vector) in entries {
            bytes.extend_from_slice(word.as_bytes());
            bytes.push(b' ');

            for value in vector {
                bytes.extend_from_slice(&value.to_le_bytes());
            }

            bytes.push(b'\n');
        }

        fs::write(path, bytes).unwrap();
    }

    #[test]
    fn test_load_text() {
        let dir = scratch_dir("w2v-text");
        let path = dir.join("vectors.txt");
        fs::write(&path, "2 3\ngood 0.1 0.2 0.3\nbad -1 0 1\n").unwrap();

        let path = path.to_str().unwrap();
        assert_eq!(Format::detect(path).unwrap(), Format::Text);

        let table = load(path).unwrap();
        assert_eq!(table.dim(), 3);
        assert_eq!(table.len(), 2);
        assert_eq!(table.get("good"), Some(&[0.1, 0.2, 0.3][..]));
        assert_eq!(table.get("bad"), Some(&[-1.0, 0.0, 1.0][..]));
    }

    #[test]
    fn test_load_binary_without_extension() {
        let dir = scratch_dir("w2v-binary");
        let path = dir.join("vectors.w2v");
        write_binary(&path, &[("good", [0.1, 0.2]), ("bad", [-0.1, 0.3])]);

        let path = path.to_str().unwrap();
        assert_eq!(Format::detect(path).unwrap(), Format::Binary);

        let table = load(path).unwrap();
        assert_eq!(table.dim(), 2);
        assert_eq!(table.get("good"), Some(&[0.1, 0.2][..]));
        assert_eq!(table.get("bad"), Some(&[-0.1, 0.3][..]));
    }

    #[test]
    fn test_bin_extension_is_binary() {
        let dir = scratch_dir("w2v-ext");
        let path = dir.join("vectors.bin");
        write_binary(&path, &[("good", [1.0, 2.0])]);

        assert_eq!(
            Format::detect(path.to_str().unwrap()).unwrap(),
            Format::Binary
        );
    }

    #[test]
    fn test_bad_header() {
        let dir = scratch_dir("w2v-header");
        let path = dir.join("vectors.txt");
        fs::write(&path, "good 0.1 0.2\n").unwrap();

        let result = load(path.to_str().unwrap());
        assert!(matches!(result, Err(EmbeddingError::Header(_))));
    }

    #[test]
    fn test_wrong_width() {
        let dir = scratch_dir("w2v-width");
        let path = dir.join("vectors.txt");
        fs::write(&path, "1 3\ngood 0.1 0.2\n").unwrap();

        let result = load(path.to_str().unwrap());
        assert!(matches!(result, Err(EmbeddingError::Width { .. })));
    }
}
