//! The transcoding driver.
//!
//! Inputs are consumed one at a time, in the order given. Each input is
//! streamed chunk by chunk through the escaper straight into the definition
//! artifact, so memory use does not grow with input size. The number of
//! bytes read, not the length of the escaped text, is recorded as the
//! file's size.

use crate::artifact::{self, DefinitionWriter, FileRecord, Toc};
use crate::context::{EmbedContext, TranscoderConfig};
use crate::error::{Error, Result};
use crate::ident;
use std::fs::{self, File};
use std::io::{BufWriter, ErrorKind, Read, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, trace, warn};

/// Streams input files into a definition artifact and collects the table.
#[derive(Debug)]
pub struct Transcoder<W: Write> {
    writer: DefinitionWriter<W>,
    toc: Toc,
    output_path: PathBuf,
    read_buffer_size: usize,
}

impl<W: Write> Transcoder<W> {
    /// Starts a definition artifact on `out`.
    ///
    /// `output_path` only labels write errors.
    pub fn new(
        out: W,
        output_path: impl Into<PathBuf>,
        ctx: EmbedContext,
        config: &TranscoderConfig,
    ) -> Result<Self> {
        let output_path = output_path.into();
        let mut writer = DefinitionWriter::new(out, ctx);
        writer
            .begin()
            .map_err(|e| Error::file_write(&output_path, e))?;

        let toc = if config.reject_collisions {
            Toc::rejecting_collisions()
        } else {
            Toc::new()
        };

        Ok(Self {
            writer,
            toc,
            output_path,
            read_buffer_size: config.read_buffer_size.max(1),
        })
    }

    /// The files embedded so far
    pub fn toc(&self) -> &Toc {
        &self.toc
    }

    /// Embeds the file at `path` under its base name.
    pub fn embed_file(&mut self, path: impl AsRef<Path>) -> Result<FileRecord> {
        let path = path.as_ref();
        // The base name is kept as raw bytes so it reaches the table verbatim.
        let basename = path
            .file_name()
            .ok_or_else(|| Error::missing_file_name(path))?
            .as_encoded_bytes()
            .to_vec();

        trace!("Opening {}", path.display());
        let file = File::open(path).map_err(|e| Error::file_read(path, e))?;
        self.embed(&basename, path, file)
    }

    /// Embeds everything `reader` yields under `original_name`.
    pub fn embed_reader(&mut self, original_name: &str, reader: impl Read) -> Result<FileRecord> {
        self.embed(original_name.as_bytes(), Path::new(original_name), reader)
    }

    fn embed(&mut self, original_name: &[u8], source: &Path, mut reader: impl Read) -> Result<FileRecord> {
        let identifier = ident::data_identifier(original_name);
        self.toc.check_identifier(original_name, &identifier)?;

        self.writer
            .begin_data(&identifier)
            .map_err(|e| Error::file_write(&self.output_path, e))?;

        let mut buf = vec![0u8; self.read_buffer_size];
        let mut byte_length: u64 = 0;
        loop {
            let n = match reader.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(Error::file_read(source, e)),
            };
            self.writer
                .write_data(&buf[..n])
                .map_err(|e| Error::file_write(&self.output_path, e))?;
            byte_length += n as u64;
        }

        self.writer
            .end_data(byte_length)
            .map_err(|e| Error::file_write(&self.output_path, e))?;

        debug!(
            "Embedded {} as {} ({} bytes)",
            String::from_utf8_lossy(original_name),
            identifier,
            byte_length
        );

        let record = FileRecord::new(original_name, identifier, byte_length);
        self.toc.push(record.clone())?;
        Ok(record)
    }

    /// Writes the table and accessors, flushes, and returns the table and
    /// the underlying stream.
    pub fn finish(self) -> Result<(Toc, W)> {
        let Self {
            writer,
            toc,
            output_path,
            ..
        } = self;
        let out = writer
            .finish(&toc)
            .map_err(|e| Error::file_write(&output_path, e))?;
        Ok((toc, out))
    }
}

/// Generates both artifacts for `inputs`.
///
/// Both outputs are created (truncating existing files) before either is
/// written. If anything fails, both outputs are removed before the error is
/// returned, so a failed run never leaves an artifact behind that could be
/// mistaken for a valid one.
pub fn generate<P: AsRef<Path>>(
    ctx: &EmbedContext,
    config: &TranscoderConfig,
    decl_path: &Path,
    def_path: &Path,
    inputs: &[P],
) -> Result<Toc> {
    let result = write_artifacts(ctx, config, decl_path, def_path, inputs);
    if result.is_err() {
        for path in [decl_path, def_path] {
            match fs::remove_file(path) {
                Ok(()) => debug!("Removed incomplete output {}", path.display()),
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => warn!("Failed to remove incomplete output {}: {}", path.display(), e),
            }
        }
    }
    result
}

fn write_artifacts<P: AsRef<Path>>(
    ctx: &EmbedContext,
    config: &TranscoderConfig,
    decl_path: &Path,
    def_path: &Path,
    inputs: &[P],
) -> Result<Toc> {
    let mut decl_out = create_output(decl_path, config.write_buffer_size)?;
    let def_out = create_output(def_path, config.write_buffer_size)?;

    debug!(
        "Writing declarations for {} to {}",
        ctx.toc_ident(),
        decl_path.display()
    );
    decl_out
        .write_all(artifact::render_declaration(ctx).as_bytes())
        .and_then(|()| decl_out.flush())
        .map_err(|e| Error::file_write(decl_path, e))?;
    drop(decl_out);

    let mut transcoder = Transcoder::new(def_out, def_path, ctx.clone(), config)?;
    for input in inputs {
        transcoder.embed_file(input)?;
    }
    let (toc, def_out) = transcoder.finish()?;
    sync_output(def_out, def_path)?;

    debug!(
        "Wrote {} entries ({} bytes) to {}",
        toc.len(),
        toc.total_bytes(),
        def_path.display()
    );
    Ok(toc)
}

fn create_output(path: &Path, capacity: usize) -> Result<BufWriter<File>> {
    let file = File::create(path).map_err(|e| Error::file_write(path, e))?;
    Ok(BufWriter::with_capacity(capacity, file))
}

/// Surfaces errors that would otherwise be swallowed when the stream drops.
fn sync_output(out: BufWriter<File>, path: &Path) -> Result<()> {
    let file = out
        .into_inner()
        .map_err(|e| Error::file_write(path, e.into_error()))?;
    file.sync_all().map_err(|e| Error::file_write(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::{self, Cursor};
    use tempfile::TempDir;

    fn ctx() -> EmbedContext {
        EmbedContext::new("pkg", "files").unwrap()
    }

    /// Reader that hands out at most `step` bytes per call and fails at the end.
    struct Dribble {
        data: Vec<u8>,
        pos: usize,
        step: usize,
        fail_at_end: bool,
    }

    impl Read for Dribble {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.pos == self.data.len() {
                if self.fail_at_end {
                    return Err(io::Error::new(ErrorKind::Other, "device went away"));
                }
                return Ok(0);
            }
            let n = self.step.min(buf.len()).min(self.data.len() - self.pos);
            buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
            self.pos += n;
            Ok(n)
        }
    }

    #[test]
    fn test_lengths_count_bytes_not_escaped_chars() {
        let mut t = Transcoder::new(Vec::new(), "out.cc", ctx(), &TranscoderConfig::new()).unwrap();
        let a = t.embed_reader("a.bin", Cursor::new(vec![0u8, 1])).unwrap();
        let b = t.embed_reader("b.txt", Cursor::new(b"hello".to_vec())).unwrap();
        assert_eq!(a.byte_length, 2);
        assert_eq!(b.byte_length, 5);

        let (toc, out) = t.finish().unwrap();
        let rows: Vec<_> = toc.rows().collect();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].name(), Some(&b"a.bin"[..]));
        assert_eq!(rows[1].name(), Some(&b"b.txt"[..]));
        assert!(rows[2].is_sentinel());

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("constexpr absl::string_view ka_bin = {\"\\000\\001\", 2};"));
        assert!(text.contains("constexpr absl::string_view kb_txt = {\"hello\", 5};"));
    }

    #[test]
    fn test_short_reads_and_small_buffers() {
        let data: Vec<u8> = (0..=255u8).cycle().take(1000).collect();
        let config = TranscoderConfig::new().read_buffer_size(7);
        let mut t = Transcoder::new(Vec::new(), "out.cc", ctx(), &config).unwrap();
        let record = t
            .embed_reader(
                "all.bin",
                Dribble {
                    data,
                    pos: 0,
                    step: 3,
                    fail_at_end: false,
                },
            )
            .unwrap();
        assert_eq!(record.byte_length, 1000);
        assert_eq!(t.toc().total_bytes(), 1000);
    }

    #[test]
    fn test_read_error_is_fatal() {
        let mut t = Transcoder::new(Vec::new(), "out.cc", ctx(), &TranscoderConfig::new()).unwrap();
        let err = t
            .embed_reader(
                "bad.bin",
                Dribble {
                    data: b"abc".to_vec(),
                    pos: 0,
                    step: 2,
                    fail_at_end: true,
                },
            )
            .unwrap_err();
        assert!(matches!(err, Error::FileRead { .. }));
        assert!(t.toc().is_empty());
    }

    #[test]
    fn test_collision_fails_before_writing() {
        let mut t = Transcoder::new(Vec::new(), "out.cc", ctx(), &TranscoderConfig::new()).unwrap();
        t.embed_reader("my-file.bin", Cursor::new(b"1".to_vec())).unwrap();
        let err = t
            .embed_reader("my_file.bin", Cursor::new(b"2".to_vec()))
            .unwrap_err();
        assert!(matches!(err, Error::IdentifierCollision { .. }));
    }

    #[test]
    fn test_embed_file_uses_basename() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("assets");
        fs::create_dir(&nested).unwrap();
        let input = nested.join("my-file.bin");
        fs::write(&input, b"\x00\xff?9").unwrap();

        let mut t = Transcoder::new(Vec::new(), "out.cc", ctx(), &TranscoderConfig::new()).unwrap();
        let record = t.embed_file(&input).unwrap();
        assert_eq!(record.original_name, b"my-file.bin");
        assert_eq!(record.identifier, "kmy_file_bin");
        assert_eq!(record.byte_length, 4);

        let (_, out) = t.finish().unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("kmy_file_bin = {\"\\000\\377\\?9\", 4};"));
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_file_name_kept_verbatim() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let dir = TempDir::new().unwrap();
        let input = dir.path().join(OsStr::from_bytes(b"\xffx.bin"));
        fs::write(&input, b"z").unwrap();

        let mut t = Transcoder::new(Vec::new(), "out.cc", ctx(), &TranscoderConfig::new()).unwrap();
        let record = t.embed_file(&input).unwrap();
        assert_eq!(record.original_name, b"\xffx.bin");
        assert_eq!(record.identifier, "k_x_bin");

        let (_, out) = t.finish().unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("    {\"\\377x.bin\", k_x_bin.data(), k_x_bin.size(), {}},"));
    }

    #[test]
    fn test_embed_file_without_name() {
        let mut t = Transcoder::new(Vec::new(), "out.cc", ctx(), &TranscoderConfig::new()).unwrap();
        let err = t.embed_file("..").unwrap_err();
        assert!(matches!(err, Error::MissingFileName { .. }));
    }

    #[test]
    fn test_generate_writes_both_artifacts() {
        let dir = TempDir::new().unwrap();
        let a = dir.path().join("a.bin");
        let b = dir.path().join("b.txt");
        fs::write(&a, b"\x00\x01").unwrap();
        fs::write(&b, b"hello").unwrap();
        let decl = dir.path().join("files.h");
        let def = dir.path().join("files.cc");

        let ctx = ctx().namespace("res");
        let toc = generate(&ctx, &TranscoderConfig::new(), &decl, &def, &[&a, &b]).unwrap();
        assert_eq!(toc.len(), 2);

        let decl_text = fs::read_to_string(&decl).unwrap();
        let def_text = fs::read_to_string(&def).unwrap();
        assert_eq!(decl_text, artifact::render_declaration(&ctx));
        assert!(def_text.starts_with("// Automatically generated by filewrap\n\n#include \"pkg/files.h\""));
        assert!(def_text.contains("    {\"a.bin\", ka_bin.data(), ka_bin.size(), {}},\n    {\"b.txt\", kb_txt.data(), kb_txt.size(), {}},\n"));
        assert!(def_text.contains("size_t files_size() {"));
        assert!(def_text.trim_end().ends_with("}  // namespace res"));
    }

    #[test]
    fn test_generate_missing_input_leaves_no_outputs() {
        let dir = TempDir::new().unwrap();
        let a = dir.path().join("a.bin");
        fs::write(&a, b"data").unwrap();
        let missing = dir.path().join("missing.bin");
        let decl = dir.path().join("files.h");
        let def = dir.path().join("files.cc");
        fs::write(&def, b"stale output from an earlier run").unwrap();

        let err = generate(&ctx(), &TranscoderConfig::new(), &decl, &def, &[&a, &missing]).unwrap_err();
        assert!(matches!(err, Error::FileRead { .. }));
        assert_eq!(err.path(), Some(missing.as_path()));
        assert!(!decl.exists());
        assert!(!def.exists());
    }

    #[test]
    fn test_generate_unwritable_output() {
        let dir = TempDir::new().unwrap();
        let a = dir.path().join("a.bin");
        fs::write(&a, b"data").unwrap();
        let decl = dir.path().join("files.h");
        let def = dir.path().join("no-such-dir").join("files.cc");

        let err = generate(&ctx(), &TranscoderConfig::new(), &decl, &def, &[&a]).unwrap_err();
        assert!(matches!(err, Error::FileWrite { .. }));
        assert!(!decl.exists());
    }
}
