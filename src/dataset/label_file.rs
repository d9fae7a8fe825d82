use csv::Position;
use std::fs::File;
use std::io::Read;

use crate::*;

pub const DELIMITER: u8 = b';';

/// One `filename;label` line of a label file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LabelRecord {
    pub filename: String,
    pub label: i32,
}

/// Reads every well-formed record of the label file at `path`.
///
/// A file that cannot be opened yields no records. Lines with fewer than two fields, or
/// whose label is not an integer, are logged and skipped; fields past the label are
/// ignored.
pub fn read_label_file(path: &Path) -> Vec<LabelRecord> {
    match File::open(path) {
        Ok(file) => parse_labels(file, &path.display().to_string()),
        Err(err) => {
            log::error!("could not open label file {}: {}", path.display(), err);
            Vec::new()
        }
    }
}

pub fn parse_labels<R: Read>(reader: R, source: &str) -> Vec<LabelRecord> {
    let reader = csv::ReaderBuilder::new()
        .delimiter(DELIMITER)
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);
    let mut records = Vec::new();
    for (index, result) in reader.into_records().enumerate() {
        let record = match result {
            Ok(record) => record,
            Err(err) => {
                log::error!("{source}: skipping unreadable record {}: {err}", index + 1);
                continue;
            }
        };
        let line = record.position().map_or(index as u64 + 1, Position::line);
        if record.len() < 2 {
            log::error!("{source}:{line}: invalid csv line, expected `filename;label`");
            continue;
        }
        let label = match record[1].trim().parse::<i32>() {
            Ok(label) => label,
            Err(err) => {
                log::error!("{source}:{line}: invalid label {:?}: {err}", &record[1]);
                continue;
            }
        };
        records.push(LabelRecord {
            filename: record[0].trim().to_string(),
            label,
        });
    }
    log::debug!("{source}: {} label records", records.len());
    records
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skips_lines_without_label() {
        let text = "a.png;1\nface1.png\nb.png;2;extra;fields\n";
        let records = parse_labels(text.as_bytes(), "inline");
        assert_eq!(
            records,
            vec![
                LabelRecord {
                    filename: "a.png".into(),
                    label: 1
                },
                LabelRecord {
                    filename: "b.png".into(),
                    label: 2
                },
            ]
        );
    }

    #[test]
    fn skips_non_numeric_labels() {
        let records = parse_labels("a.png;one\nb.png; 7 \r\n".as_bytes(), "inline");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].label, 7);
    }

    #[test]
    fn missing_file_yields_nothing() {
        let records = read_label_file(Path::new("src/dataset/test_data/does_not_exist.csv"));
        assert!(records.is_empty());
    }

    #[test]
    fn fixture_file() {
        let records = read_label_file(Path::new("src/dataset/test_data/classes.csv"));
        let labels = records.iter().map(|r| r.label).collect::<Vec<_>>();
        assert_eq!(labels, vec![3, 3, 1, 2]);
        assert_eq!(records[2].filename, "s2_1.pgm");
    }
}
