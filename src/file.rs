// Cost Basis
// Written in 2023 by
//   Andrew Poelstra <tradetracker@wpsoftware.net>
//
// To the extent possible under law, the author(s) have dedicated all
// copyright and related and neighboring rights to this software to
// the public domain worldwide. This software is distributed without
// any warranty.
//
// You should have received a copy of the CC0 Public Domain Dedication
// along with this software.
// If not, see <http://creativecommons.org/publicdomain/zero/1.0/>.
//

//! Files
//!
//! Report output, either to stdout or to a freshly created file, with
//! logging and error messages that name the destination.
//!

use anyhow::Context;
use log::info;
use std::{fmt, fs, io, path::Path};

/// A text output, which is either stdout or a file
pub struct TextFile {
    name: String,
    inner: Box<dyn io::Write>,
}

impl TextFile {
    /// An output that goes to stdout
    pub fn stdout() -> Self {
        TextFile {
            name: "stdout".into(),
            inner: Box::new(io::stdout().lock()),
        }
    }

    /// Writes some formatted data to the output
    ///
    /// This method should not be used directly. Use the write! or writeln!
    /// macros from std instead.
    pub fn write_fmt(&mut self, f: fmt::Arguments<'_>) -> anyhow::Result<()> {
        io::Write::write_fmt(&mut self.inner, f)
            .with_context(|| format!("writing {f} to {}", self.name))
    }

    /// Flushes any buffered output
    pub fn flush(&mut self) -> anyhow::Result<()> {
        io::Write::flush(&mut self.inner).with_context(|| format!("flushing {}", self.name))
    }
}

/// Helper function to create a file with logging etc
///
/// Refuses to overwrite an existing file.
pub fn create_text_file<P: AsRef<Path>>(path: P, reason: &str) -> anyhow::Result<TextFile> {
    let name = path.as_ref().to_string_lossy().into_owned();
    if fs::metadata(&path).is_ok() {
        return Err(anyhow::Error::msg(format!(
            "File {name} already exists. Refusing to overwrite."
        )));
    }
    info!("Creating file {} {}.", name, reason);
    let file = fs::File::create(&path).with_context(|| format!("Creating file {name}"))?;
    Ok(TextFile {
        name,
        inner: Box::new(io::BufWriter::new(file)),
    })
}

/// Helper function to create a directory (and its parents) if it doesn't exist
pub fn ensure_dir<P: AsRef<Path>>(path: P) -> anyhow::Result<()> {
    let name = path.as_ref().to_string_lossy();
    if !path.as_ref().is_dir() {
        fs::create_dir_all(&path).with_context(|| format!("Creating directory {name}"))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refuses_to_overwrite() {
        let mut dir = std::env::temp_dir();
        dir.push(format!("cost-basis-file-test-{}", std::process::id()));
        ensure_dir(&dir).unwrap();
        let mut path = dir.clone();
        path.push("report.csv");
        let _ = fs::remove_file(&path);

        let mut file = create_text_file(&path, "for testing").unwrap();
        writeln!(file, "a,b,{}", 3).unwrap();
        file.flush().unwrap();
        drop(file);
        assert_eq!(fs::read_to_string(&path).unwrap(), "a,b,3\n");

        assert!(create_text_file(&path, "for testing").is_err());
        fs::remove_dir_all(&dir).unwrap();
    }
}
