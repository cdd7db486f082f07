use anyhow::{Context, Result};
use rafex_trial::SessionRecord;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Writes session records as JSON lines, flushing after each one so a
/// crash mid-session keeps every finished trial.
pub struct RecordSink {
    out: Box<dyn Write>,
    written: usize,
}

impl RecordSink {
    pub fn new(out: Box<dyn Write>) -> Self {
        Self { out, written: 0 }
    }

    /// Appends to `path`, or writes to stdout when no path is given.
    pub fn open(path: Option<&Path>) -> Result<Self> {
        let out: Box<dyn Write> = match path {
            Some(path) => {
                let file = File::options()
                    .create(true)
                    .append(true)
                    .open(path)
                    .with_context(|| format!("cannot open {}", path.display()))?;
                Box::new(BufWriter::new(file))
            }
            None => Box::new(io::stdout()),
        };
        Ok(Self::new(out))
    }

    pub fn write(&mut self, record: &SessionRecord) -> Result<()> {
        serde_json::to_writer(&mut self.out, record).context("cannot encode result")?;
        self.out.write_all(b"\n")?;
        self.out.flush().context("cannot write result")?;
        self.written += 1;
        Ok(())
    }

    pub fn written(&self) -> usize {
        self.written
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rafex_core::TrialResult;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Shared(Arc<Mutex<Vec<u8>>>);

    impl Write for Shared {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn record(trial_index: usize, error: f64) -> SessionRecord {
        SessionRecord {
            trial_index,
            result: TrialResult {
                reaction_time_ms: Some(812.5),
                response_error_deg: error,
                rod_final_angle_deg: 90.0 + error,
                rod_start_angle_deg: 30.0,
                frame_angle_deg: 18.0,
                adjustment_count: 12,
                min_adjustments_to_target: 300.0,
                min_adjustments_to_participant_final: 300.0,
            },
        }
    }

    #[test]
    fn one_json_object_per_line() {
        let buf = Shared::default();
        let mut sink = RecordSink::new(Box::new(buf.clone()));
        sink.write(&record(0, 2.0)).unwrap();
        sink.write(&record(1, -1.5)).unwrap();
        assert_eq!(sink.written(), 2);

        let text = String::from_utf8(buf.0.lock().unwrap().clone()).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        let second: SessionRecord = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(second, record(1, -1.5));
    }
}
