//! Change event writers for the `compare` and `diff` commands

use crate::config::OutputFormat;
use crate::diff::DiffSummary;
use crate::stream::{CsvDialect, CsvRecordSink, RecordSink};
use crate::types::{map_file_error, ChangeEvent, ChangeKind, CsvDeltaError, Header, Record};
use console::style;
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Writes change events in one of the [`OutputFormat`]s
pub struct ChangeWriter<W: Write> {
    target: Target<W>,
    primary_header: Header,
    secondary_header: Header,
}

enum Target<W: Write> {
    Text { out: W, color: bool, delimiter: char },
    Json(W),
    Csv(CsvRecordSink<W>),
}

impl ChangeWriter<Box<dyn Write>> {
    /// Writer to `path`, or to stdout when `path` is `None`
    ///
    /// Text output is colored only when it goes to a terminal.
    pub fn open(
        path: Option<&Path>,
        format: OutputFormat,
        dialect: &CsvDialect,
        primary_header: Header,
        secondary_header: Header,
    ) -> Result<Self, CsvDeltaError> {
        let (out, color): (Box<dyn Write>, bool) = match path {
            Some(path) => {
                let file = File::create(path).map_err(|e| map_file_error(path, e))?;
                (Box::new(BufWriter::new(file)), false)
            }
            None => (
                Box::new(BufWriter::new(io::stdout())),
                console::colors_enabled(),
            ),
        };
        Self::new(out, format, dialect, color, primary_header, secondary_header)
    }
}

impl<W: Write> ChangeWriter<W> {
    pub fn new(
        out: W,
        format: OutputFormat,
        dialect: &CsvDialect,
        color: bool,
        primary_header: Header,
        secondary_header: Header,
    ) -> Result<Self, CsvDeltaError> {
        let target = match format {
            OutputFormat::Text => Target::Text {
                out,
                color,
                delimiter: char::from(dialect.delimiter),
            },
            OutputFormat::Json => Target::Json(out),
            OutputFormat::Csv => {
                let mut sink = CsvRecordSink::from_writer(out, dialect);
                let mut columns = Vec::with_capacity(primary_header.len() + 1);
                columns.push("action".to_string());
                columns.extend(primary_header.columns().iter().cloned());
                sink.write_record(&Record::new(columns))?;
                Target::Csv(sink)
            }
        };

        Ok(Self {
            target,
            primary_header,
            secondary_header,
        })
    }

    /// Write one event
    pub fn write(&mut self, event: &ChangeEvent) -> Result<(), CsvDeltaError> {
        // Deletes carry a secondary row; the other kinds a primary row.
        let header = match event {
            ChangeEvent::Delete(_) => &self.secondary_header,
            _ => &self.primary_header,
        };

        match &mut self.target {
            Target::Text {
                out,
                color,
                delimiter,
            } => {
                let line = format!(
                    "{} {}",
                    sign(event.kind()),
                    join(event.record(), *delimiter)
                );
                if *color {
                    let styled = match event.kind() {
                        ChangeKind::Create => style(line).green(),
                        ChangeKind::Update => style(line).yellow(),
                        ChangeKind::Delete => style(line).red(),
                    };
                    writeln!(out, "{}", styled.force_styling(true))?;
                } else {
                    writeln!(out, "{}", line)?;
                }
            }
            Target::Json(out) => {
                let change = JsonChange {
                    action: event.kind(),
                    record: RowMap {
                        header,
                        record: event.record(),
                    },
                };
                serde_json::to_writer(&mut *out, &change)
                    .map_err(|e| CsvDeltaError::Io(io::Error::from(e)))?;
                out.write_all(b"\n")?;
            }
            Target::Csv(sink) => {
                let row = match event {
                    ChangeEvent::Delete(record) => {
                        self.primary_header.project(record, &self.secondary_header)
                    }
                    _ => event.record().clone(),
                };
                let mut fields = Vec::with_capacity(row.len() + 1);
                fields.push(event.kind().as_str().to_string());
                fields.extend(row.into_fields());
                sink.write_record(&Record::new(fields))?;
            }
        }
        Ok(())
    }

    /// Flush; text output ends with a summary line
    pub fn finish(mut self, summary: &DiffSummary) -> Result<(), CsvDeltaError> {
        match &mut self.target {
            Target::Text { out, .. } => {
                writeln!(
                    out,
                    "{} creates, {} updates, {} deletes ({} unchanged)",
                    summary.creates, summary.updates, summary.deletes, summary.unchanged
                )?;
                out.flush()?;
            }
            Target::Json(out) => out.flush()?,
            Target::Csv(sink) => sink.close()?,
        }
        Ok(())
    }
}

fn sign(kind: ChangeKind) -> char {
    match kind {
        ChangeKind::Create => '+',
        ChangeKind::Update => '~',
        ChangeKind::Delete => '-',
    }
}

fn join(record: &Record, delimiter: char) -> String {
    let mut line = String::new();
    for (i, field) in record.iter().enumerate() {
        if i > 0 {
            line.push(delimiter);
        }
        line.push_str(field);
    }
    line
}

#[derive(serde::Serialize)]
struct JsonChange<'a> {
    action: ChangeKind,
    record: RowMap<'a>,
}

/// A row serialized as a map in header order
struct RowMap<'a> {
    header: &'a Header,
    record: &'a Record,
}

impl Serialize for RowMap<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.header.is_empty() {
            return self.record.serialize(serializer);
        }
        let mut map = serializer.serialize_map(Some(self.header.len()))?;
        for (i, name) in self.header.columns().iter().enumerate() {
            map.serialize_entry(name, self.record.get(i).unwrap_or_default())?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(names: &[&str]) -> Header {
        Header::new(names.iter().map(|s| s.to_string()).collect())
    }

    fn render(format: OutputFormat, events: &[ChangeEvent]) -> String {
        let mut buf = Vec::new();
        {
            let mut writer = ChangeWriter::new(
                &mut buf,
                format,
                &CsvDialect::default(),
                false,
                header(&["id", "name"]),
                header(&["name", "id"]),
            )
            .expect("create writer");
            for event in events {
                writer.write(event).expect("write event");
            }
            writer.finish(&DiffSummary::default()).expect("finish");
        }
        String::from_utf8(buf).expect("utf8 output")
    }

    fn events() -> Vec<ChangeEvent> {
        vec![
            ChangeEvent::Create(Record::from(vec!["1", "ann"])),
            ChangeEvent::Update(Record::from(vec!["2", "bob"])),
            ChangeEvent::Delete(Record::from(vec!["cy", "3"])),
        ]
    }

    #[test]
    fn test_text_output() {
        let out = render(OutputFormat::Text, &events());
        let lines: Vec<&str> = out.lines().collect();

        assert_eq!(lines[0], "+ 1,ann");
        assert_eq!(lines[1], "~ 2,bob");
        assert_eq!(lines[2], "- cy,3");
        assert!(lines[3].starts_with("0 creates"));
    }

    #[test]
    fn test_json_lines_use_each_sides_header() {
        let out = render(OutputFormat::Json, &events());
        let lines: Vec<serde_json::Value> = out
            .lines()
            .map(|l| serde_json::from_str(l).expect("json line"))
            .collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0]["action"], "create");
        assert_eq!(lines[0]["record"]["name"], "ann");
        assert_eq!(lines[2]["action"], "delete");
        assert_eq!(lines[2]["record"]["id"], "3");
    }

    #[test]
    fn test_json_keeps_header_order() {
        let out = render(OutputFormat::Json, &events()[..1]);
        assert_eq!(
            out.trim_end(),
            r#"{"action":"create","record":{"id":"1","name":"ann"}}"#
        );
    }

    #[test]
    fn test_csv_projects_deletes() {
        let out = render(OutputFormat::Csv, &events());

        assert_eq!(
            out,
            "action,id,name\ncreate,1,ann\nupdate,2,bob\ndelete,3,cy\n"
        );
    }
}
