use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use anyhow::{Context, Result};

use crate::consts::*;
use crate::mismatch_log::FeatureMismatchLog;

///
/// A tab-separated report file shared by all workers.
///
/// Every sink has its own lock, so writers to different reports never wait on each other.
///
pub struct ReportSink {
    writer: Mutex<BufWriter<File>>,
}

impl ReportSink {
    ///
    /// Create the report file and write its header line.
    ///
    pub fn create(out_dir: &Path, file_name: &str, header: &str) -> Result<Self> {
        let path = out_dir.join(file_name);
        let file = File::create(&path)
            .with_context(|| format!("Failed to create report file: {:?}", path))?;
        let mut writer = BufWriter::new(file);
        writeln!(writer, "{}", header)?;
        Ok(ReportSink {
            writer: Mutex::new(writer),
        })
    }

    fn lock(&self) -> io::Result<MutexGuard<'_, BufWriter<File>>> {
        self.writer
            .lock()
            .map_err(|_| io::Error::other("report writer lock poisoned"))
    }

    pub fn write_line(&self, line: &str) -> io::Result<()> {
        let mut writer = self.lock()?;
        writeln!(writer, "{}", line)
    }

    /// Write several lines under a single lock so they stay together in the file.
    pub fn write_lines<I>(&self, lines: I) -> io::Result<()>
    where
        I: IntoIterator<Item = String>,
    {
        let mut writer = self.lock()?;
        for line in lines {
            writeln!(writer, "{}", line)?;
        }
        Ok(())
    }

    pub fn flush(&self) -> io::Result<()> {
        self.lock()?.flush()
    }
}

///
/// All report files of a rule-check run.
///
pub struct ReportWriters {
    pub main: ReportSink,
    pub bad_variants: ReportSink,
    pub bv_summary: ReportSink,
    pub iv_summary: ReportSink,
    pub missing: ReportSink,
    pub errors: ReportSink,
    pub bad_ids: ReportSink,
    pub mismatch: FeatureMismatchLog,
    pub old_codes: ReportSink,
}

impl ReportWriters {
    ///
    /// Create every report in the output directory, headers included.
    ///
    pub fn open(out_dir: &Path) -> Result<Self> {
        Ok(ReportWriters {
            main: ReportSink::create(out_dir, SUB_REPORT, SUB_REPORT_HEADER)?,
            bad_variants: ReportSink::create(out_dir, BAD_VARIANTS, BAD_VARIANTS_HEADER)?,
            bv_summary: ReportSink::create(out_dir, BV_SUMMARY, BV_SUMMARY_HEADER)?,
            iv_summary: ReportSink::create(out_dir, IV_SUMMARY, IV_SUMMARY_HEADER)?,
            missing: ReportSink::create(out_dir, MISSING, MISSING_HEADER)?,
            errors: ReportSink::create(out_dir, ERRORS, ERRORS_HEADER)?,
            bad_ids: ReportSink::create(out_dir, BAD_IDS, BAD_IDS_HEADER)?,
            mismatch: FeatureMismatchLog::new(ReportSink::create(
                out_dir,
                MISMATCH,
                MISMATCH_HEADER,
            )?),
            old_codes: ReportSink::create(out_dir, OLD_CODES, OLD_CODES_HEADER)?,
        })
    }

    pub fn flush_all(&self) -> io::Result<()> {
        for sink in [
            &self.main,
            &self.bad_variants,
            &self.bv_summary,
            &self.iv_summary,
            &self.missing,
            &self.errors,
            &self.bad_ids,
            self.mismatch.sink(),
            &self.old_codes,
        ] {
            sink.flush()?;
        }
        Ok(())
    }
}
