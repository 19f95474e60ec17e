use std::collections::BTreeSet;
use std::ffi::OsStr;
use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, Read};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use flate2::read::MultiGzDecoder;
use log::info;

///
/// Get a reader for either a gzip'd or non-gzip'd file.
///
/// # Arguments
///
/// - path: path to the file to read
///
pub fn get_dynamic_reader(path: &Path) -> Result<BufReader<Box<dyn Read>>> {
    let is_gzipped = path.extension() == Some(OsStr::new("gz"));
    let file = File::open(path).with_context(|| format!("Failed to open file: {:?}", path))?;
    let file: Box<dyn Read> = match is_gzipped {
        true => Box::new(MultiGzDecoder::new(file)),
        false => Box::new(file),
    };

    Ok(BufReader::new(file))
}

/// Get a reader for a file path, or for stdin when the path is `-`.
pub fn get_dynamic_reader_w_stdin(file_path_str: &str) -> Result<BufReader<Box<dyn Read>>> {
    if file_path_str == "-" {
        Ok(BufReader::new(Box::new(std::io::stdin()) as Box<dyn Read>))
    } else {
        get_dynamic_reader(Path::new(file_path_str))
    }
}

///
/// Find the plain or gzipped version of a file, preferring the plain one.
///
pub fn find_plain_or_gz(dir: &Path, base_name: &str) -> Option<PathBuf> {
    let plain = dir.join(base_name);
    if plain.is_file() {
        return Some(plain);
    }
    let gz = dir.join(format!("{base_name}.gz"));
    gz.is_file().then_some(gz)
}

///
/// Lines of a reader with invalid UTF-8 replaced by U+FFFD instead of failing.
///
/// Line endings (`\n` or `\r\n`) are stripped, as with [`BufRead::lines`].
///
pub fn lossy_lines<R: BufRead>(mut reader: R) -> impl Iterator<Item = io::Result<String>> {
    let mut buf = Vec::new();
    std::iter::from_fn(move || {
        buf.clear();
        match reader.read_until(b'\n', &mut buf) {
            Ok(0) => None,
            Ok(_) => {
                if buf.last() == Some(&b'\n') {
                    buf.pop();
                    if buf.last() == Some(&b'\r') {
                        buf.pop();
                    }
                }
                Some(Ok(String::from_utf8_lossy(&buf).into_owned()))
            }
            Err(e) => Some(Err(e)),
        }
    })
}

/// Whole text of a file, with invalid UTF-8 replaced by U+FFFD.
pub fn read_text_lossy(path: &Path) -> io::Result<String> {
    let bytes = fs::read(path)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Trimmed first line of a small text file, or an empty string if the file is absent.
pub fn read_first_line(path: &Path) -> Result<String> {
    if !path.is_file() {
        return Ok(String::new());
    }
    let reader = get_dynamic_reader(path)?;
    match lossy_lines(reader).next() {
        Some(line) => Ok(line?.trim().to_string()),
        None => Ok(String::new()),
    }
}

///
/// Read the first column of a tab-separated file with a header line.
///
/// Used for subsystem filter files.
///
pub fn read_name_column(path: &Path) -> Result<BTreeSet<String>> {
    let reader = get_dynamic_reader(path)?;
    let mut names = BTreeSet::new();
    for line in lossy_lines(reader).skip(1) {
        let line = line?;
        if let Some(name) = line.split('\t').next() {
            let name = name.trim();
            if !name.is_empty() {
                names.insert(name.to_string());
            }
        }
    }
    Ok(names)
}

///
/// Make sure an output directory exists, optionally emptying it first.
///
pub fn prepare_output_dir(out_dir: &Path, clear: bool) -> Result<()> {
    if !out_dir.is_dir() {
        info!("Creating output directory {:?}.", out_dir);
        fs::create_dir_all(out_dir)
            .with_context(|| format!("Failed to create output directory: {:?}", out_dir))?;
    } else if clear {
        info!("Erasing output directory {:?}.", out_dir);
        for entry in fs::read_dir(out_dir)? {
            let path = entry?.path();
            if path.is_dir() {
                fs::remove_dir_all(&path)?;
            } else {
                fs::remove_file(&path)?;
            }
        }
    } else {
        info!("Output reports will be produced in {:?}.", out_dir);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use flate2::Compression;
    use flate2::write::GzEncoder;
    use pretty_assertions::assert_eq;
    use rstest::*;
    use std::io::Write;

    #[rstest]
    fn test_reads_gzipped_and_plain() {
        let dir = tempfile::tempdir().unwrap();
        let plain = dir.path().join("a.txt");
        fs::write(&plain, "hello\nworld\n").unwrap();

        let gz = dir.path().join("b.txt.gz");
        let mut encoder = GzEncoder::new(File::create(&gz).unwrap(), Compression::default());
        encoder.write_all(b"zipped\n").unwrap();
        encoder.finish().unwrap();

        assert_eq!(read_first_line(&plain).unwrap(), "hello");
        assert_eq!(read_first_line(&gz).unwrap(), "zipped");
        assert_eq!(read_first_line(&dir.path().join("nothing")).unwrap(), "");
    }

    #[rstest]
    fn test_lossy_lines_keeps_latin1() {
        let text: &[u8] = b"caf\xe9 protein\r\nplain\n\nlast";
        let lines: Vec<String> = lossy_lines(text).map(|l| l.unwrap()).collect();
        assert_eq!(
            lines,
            vec![
                "caf\u{FFFD} protein".to_string(),
                "plain".to_string(),
                "".to_string(),
                "last".to_string()
            ]
        );
    }

    #[rstest]
    fn test_find_plain_or_gz() {
        let dir = tempfile::tempdir().unwrap();
        assert!(find_plain_or_gz(dir.path(), "data").is_none());
        fs::write(dir.path().join("data.gz"), "").unwrap();
        assert_eq!(
            find_plain_or_gz(dir.path(), "data").unwrap(),
            dir.path().join("data.gz")
        );
        fs::write(dir.path().join("data"), "").unwrap();
        assert_eq!(
            find_plain_or_gz(dir.path(), "data").unwrap(),
            dir.path().join("data")
        );
    }

    #[rstest]
    fn test_read_name_column_skips_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("filter.tbl");
        fs::write(&path, "name\tother\nIron Transport\tx\n\nHeme Synthesis\n").unwrap();
        let names = read_name_column(&path).unwrap();
        assert_eq!(
            names.into_iter().collect::<Vec<_>>(),
            vec!["Heme Synthesis".to_string(), "Iron Transport".to_string()]
        );
    }

    #[rstest]
    fn test_prepare_output_dir_clear() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out");
        prepare_output_dir(&out, false).unwrap();
        assert!(out.is_dir());
        fs::write(out.join("old.tbl"), "x").unwrap();
        prepare_output_dir(&out, false).unwrap();
        assert!(out.join("old.tbl").exists());
        prepare_output_dir(&out, true).unwrap();
        assert!(!out.join("old.tbl").exists());
    }
}
