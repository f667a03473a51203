//! The emitted-source output buffer and file writer (spec.md §3 "Output
//! buffer", §6 "Output", §9 idempotence).
//!
//! Grounded on `XenonRecomp/recompiler.cpp`'s `out`/`SaveCurrentOutData`:
//! a single accumulating buffer, flushed to named files or to
//! `ppc_recomp.<N>.cpp` batches, with a content-hash comparison against any
//! existing file so re-running the recompiler on unchanged input does not
//! perturb downstream build timestamps. The hash here is SHA-256 via `sha2`
//! (the crate the teacher's sibling `fuel-crypto` crate already uses for
//! content hashing, see `DESIGN.md`) rather than the original's XXH3-128;
//! either is a content-addressed equality check, and SHA-256 needs no extra
//! crate beyond what the pack already reaches for.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

/// Append-only sink for generated host source, flushed in named groups.
/// Owned exclusively by the `Recompiler` for the run's lifetime (spec.md
/// §5: no process-global state, no aliasing).
#[derive(Debug, Default)]
pub struct Emitter {
    buffer: String,
    batch_index: usize,
    pub out_dir: PathBuf,
}

impl Emitter {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Emitter { buffer: String::with_capacity(1 << 20), batch_index: 0, out_dir: out_dir.into() }
    }

    pub fn print(&mut self, text: &str) {
        self.buffer.push_str(text);
    }

    pub fn println(&mut self, text: &str) {
        self.buffer.push_str(text);
        self.buffer.push('\n');
    }

    pub fn print_fmt(&mut self, args: std::fmt::Arguments<'_>) {
        use std::fmt::Write;
        let _ = self.buffer.write_fmt(args);
    }

    pub fn println_fmt(&mut self, args: std::fmt::Arguments<'_>) {
        self.print_fmt(args);
        self.buffer.push('\n');
    }

    /// Swaps out the current buffer contents and returns them, leaving the
    /// buffer empty. Used by the recompiler to set aside a function's body
    /// while it prepends local-variable declarations (spec.md §4.3.2).
    pub fn take_buffer(&mut self) -> String {
        std::mem::take(&mut self.buffer)
    }

    pub fn restore_buffer(&mut self, text: String) {
        self.buffer = text;
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Flushes the current buffer to `name`, or to the next
    /// `ppc_recomp.<N>.cpp` batch file if `name` is `None` (spec.md §6).
    /// Skips the write entirely when a same-length, same-hash file already
    /// exists at the destination (spec.md §9's idempotence guarantee).
    pub fn flush(&mut self, name: Option<&str>) -> io::Result<()> {
        if self.buffer.is_empty() {
            return Ok(());
        }
        let filename = match name {
            Some(n) => n.to_string(),
            None => {
                let n = format!("ppc_recomp.{}.cpp", self.batch_index);
                self.batch_index += 1;
                n
            }
        };
        fs::create_dir_all(&self.out_dir)?;
        let path = self.out_dir.join(filename);
        if !Self::unchanged(&path, self.buffer.as_bytes())? {
            fs::write(&path, self.buffer.as_bytes())?;
        }
        self.buffer.clear();
        Ok(())
    }

    fn unchanged(path: &Path, new_contents: &[u8]) -> io::Result<bool> {
        let existing = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
            Err(e) => return Err(e),
        };
        if existing.len() != new_contents.len() {
            return Ok(false);
        }
        Ok(Sha256::digest(&existing) == Sha256::digest(new_contents))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read as _;

    #[test]
    fn rewriting_identical_content_does_not_touch_mtime() {
        let dir = tempfile::tempdir().unwrap();
        let mut emitter = Emitter::new(dir.path());
        emitter.println("hello world");
        emitter.flush(Some("out.cpp")).unwrap();

        let path = dir.path().join("out.cpp");
        let meta_before = fs::metadata(&path).unwrap().modified().unwrap();

        std::thread::sleep(std::time::Duration::from_millis(10));

        emitter.println("hello world");
        emitter.flush(Some("out.cpp")).unwrap();
        let meta_after = fs::metadata(&path).unwrap().modified().unwrap();
        assert_eq!(meta_before, meta_after);

        let mut contents = String::new();
        fs::File::open(&path).unwrap().read_to_string(&mut contents).unwrap();
        assert_eq!(contents, "hello world\n");
    }

    #[test]
    fn differing_content_is_rewritten() {
        let dir = tempfile::tempdir().unwrap();
        let mut emitter = Emitter::new(dir.path());
        emitter.println("version one");
        emitter.flush(Some("out.cpp")).unwrap();

        emitter.println("version two, longer");
        emitter.flush(Some("out.cpp")).unwrap();

        let mut contents = String::new();
        fs::File::open(dir.path().join("out.cpp")).unwrap().read_to_string(&mut contents).unwrap();
        assert_eq!(contents, "version two, longer\n");
    }

    #[test]
    fn unnamed_flushes_batch_sequentially() {
        let dir = tempfile::tempdir().unwrap();
        let mut emitter = Emitter::new(dir.path());
        emitter.println("batch 0");
        emitter.flush(None).unwrap();
        emitter.println("batch 1");
        emitter.flush(None).unwrap();
        assert!(dir.path().join("ppc_recomp.0.cpp").exists());
        assert!(dir.path().join("ppc_recomp.1.cpp").exists());
    }
}
