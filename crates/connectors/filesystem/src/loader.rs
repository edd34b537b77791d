use ferry_common::{BoxError, Context, Error, Record};
use ferry_connector::{Loader, RecordSource};
use std::fs::OpenOptions;
use tracing::debug;

/// Job key holding the path of the file to write.
pub const OUTPUT_PATH: &str = "output.path";
/// Job key; when `true`, rows are appended instead of replacing the file.
pub const OUTPUT_APPEND: &str = "output.append";
/// Job key with a CSV header row written before any data.
pub const OUTPUT_HEADER: &str = "output.header";

/// Continuous loader writing every record as one CSV row.
#[derive(Debug, Default)]
pub struct CsvLoader {
    rows_written: u64,
}

impl CsvLoader {
    pub fn rows_written(&self) -> u64 {
        self.rows_written
    }
}

impl Loader for CsvLoader {
    fn load(
        &mut self,
        _context: &Context,
        _connection: Option<&Context>,
        job: &Context,
        source: &mut dyn RecordSource,
    ) -> Result<(), BoxError> {
        let path = job
            .get(OUTPUT_PATH)
            .ok_or_else(|| Error::Config(format!("missing job setting '{OUTPUT_PATH}'")))?;
        let append = job.get_bool(OUTPUT_APPEND, false)?;
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .append(append)
            .truncate(!append)
            .open(path)?;
        let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(file);

        let header = job.get_string(OUTPUT_HEADER, "");
        if !header.is_empty() {
            write_line(&mut writer, &header)?;
        }
        while let Some(record) = source.next()? {
            write_row(&mut writer, &record)?;
            self.rows_written += 1;
        }
        writer.flush()?;
        debug!(path, rows = self.rows_written, "CSV loader flushed output");
        Ok(())
    }
}

fn write_row<W: std::io::Write>(writer: &mut csv::Writer<W>, record: &Record) -> csv::Result<()> {
    match record {
        Record::Fields(fields) => writer.write_record(fields),
        Record::Csv(line) => write_line(writer, line),
    }
}

/// Re-parses an already encoded row so quoted fields keep their commas.
fn write_line<W: std::io::Write>(writer: &mut csv::Writer<W>, line: &str) -> csv::Result<()> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(line.as_bytes());
    for row in reader.records() {
        writer.write_record(&row?)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ferry_connector::LoaderProtocolError;

    struct VecSource(std::vec::IntoIter<Record>);

    impl RecordSource for VecSource {
        fn next(&mut self) -> Result<Option<Record>, LoaderProtocolError> {
            Ok(self.0.next())
        }
    }

    fn job(path: &std::path::Path, extra: &[(&str, &str)]) -> Context {
        let mut values = vec![(OUTPUT_PATH.to_string(), path.to_str().unwrap().to_string())];
        values.extend(extra.iter().map(|(k, v)| (k.to_string(), v.to_string())));
        Context::from_iter(values)
    }

    fn run(job: &Context, records: Vec<Record>) -> Result<CsvLoader, BoxError> {
        let mut loader = CsvLoader::default();
        let mut source = VecSource(records.into_iter());
        loader.load(&Context::new(), None, job, &mut source)?;
        Ok(loader)
    }

    #[test]
    fn test_writes_both_record_shapes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let records = vec![
            Record::Csv("1,foo".to_string()),
            Record::Fields(vec!["2".to_string(), "bar, baz".to_string()]),
        ];

        let loader = run(&job(&path, &[(OUTPUT_HEADER, "id,name")]), records).unwrap();

        assert_eq!(loader.rows_written(), 2);
        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, "id,name\n1,foo\n2,\"bar, baz\"\n");
    }

    #[test]
    fn test_quoted_csv_payload_is_kept() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let records = vec![Record::Csv(r#"1,"a,b""#.to_string()), Record::Csv("2,plain".to_string())];

        run(&job(&path, &[(OUTPUT_HEADER, r#"id,"label, text""#)]), records).unwrap();

        let mut reader = csv::ReaderBuilder::new().has_headers(false).from_path(&path).unwrap();
        let rows: Vec<Vec<String>> = reader
            .records()
            .map(|row| row.unwrap().iter().map(str::to_string).collect())
            .collect();
        assert_eq!(
            rows,
            vec![
                vec!["id".to_string(), "label, text".to_string()],
                vec!["1".to_string(), "a,b".to_string()],
                vec!["2".to_string(), "plain".to_string()],
            ]
        );
    }

    #[test]
    fn test_append_keeps_existing_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        std::fs::write(&path, "0,zero\n").unwrap();

        run(&job(&path, &[(OUTPUT_APPEND, "true")]), vec![Record::Csv("1,one".into())]).unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "0,zero\n1,one\n");
    }

    #[test]
    fn test_missing_output_path() {
        let err = run(&Context::new(), vec![]).unwrap_err();
        assert!(err.to_string().contains(OUTPUT_PATH));
    }
}
