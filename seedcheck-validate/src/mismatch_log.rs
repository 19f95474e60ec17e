use std::io;
use std::sync::Mutex;

use fxhash::FxHashSet;
use seedcheck_variants::NamingMismatchLog;

use crate::reports::ReportSink;

///
/// Naming-mismatch report, one line per feature for the whole run.
///
/// Many subsystems and rows revisit the same feature; only the first mismatch reported for a
/// feature is written.
///
pub struct FeatureMismatchLog {
    seen: Mutex<FxHashSet<String>>,
    sink: ReportSink,
}

impl FeatureMismatchLog {
    pub fn new(sink: ReportSink) -> Self {
        FeatureMismatchLog {
            seen: Mutex::new(FxHashSet::default()),
            sink,
        }
    }

    pub fn sink(&self) -> &ReportSink {
        &self.sink
    }

    /// Number of distinct features reported so far.
    pub fn len(&self) -> usize {
        self.seen.lock().map(|seen| seen.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl NamingMismatchLog for FeatureMismatchLog {
    fn record(&self, feature_id: &str, observed: &str, recorded: &str) -> io::Result<()> {
        let first = self
            .seen
            .lock()
            .map_err(|_| io::Error::other("mismatch set lock poisoned"))?
            .insert(feature_id.to_string());
        if first {
            self.sink
                .write_line(&format!("{}\t{}\t{}", feature_id, observed, recorded))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rayon::prelude::*;
    use rstest::*;
    use std::fs;

    #[rstest]
    fn test_one_line_per_feature() {
        let dir = tempfile::tempdir().unwrap();
        let log = FeatureMismatchLog::new(
            ReportSink::create(dir.path(), "mismatch.tbl", "feature_id\tactual_role\tsubsystem_role")
                .unwrap(),
        );
        log.record("fig|1.1.peg.1", "ferric uptake", "Ferric Uptake").unwrap();
        log.record("fig|1.1.peg.1", "ferric uptake", "Ferric Uptake").unwrap();
        log.record("fig|1.1.peg.2", "reductase", "Reductase").unwrap();
        log.sink().flush().unwrap();

        assert_eq!(log.len(), 2);
        assert_eq!(
            fs::read_to_string(dir.path().join("mismatch.tbl")).unwrap(),
            "feature_id\tactual_role\tsubsystem_role\n\
             fig|1.1.peg.1\tferric uptake\tFerric Uptake\n\
             fig|1.1.peg.2\treductase\tReductase\n"
        );
    }

    #[rstest]
    fn test_concurrent_records_are_deduplicated() {
        let dir = tempfile::tempdir().unwrap();
        let log = FeatureMismatchLog::new(ReportSink::create(dir.path(), "m.tbl", "h").unwrap());
        (0..400).into_par_iter().for_each(|i| {
            let fid = format!("fig|1.1.peg.{}", i % 40);
            log.record(&fid, "a", "b").unwrap();
        });
        log.sink().flush().unwrap();

        let text = fs::read_to_string(dir.path().join("m.tbl")).unwrap();
        assert_eq!(text.lines().count(), 41);
        assert_eq!(log.len(), 40);
    }
}
