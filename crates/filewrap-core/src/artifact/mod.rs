//! Generation of the declaration (`.h`) and definition (`.cc`) artifacts.
//!
//! Both artifacts are derived from the same [`EmbedContext`], which is the
//! only source of the include guard, accessor names and namespace. They are
//! two views of one contract and are always generated together.
//!
//! The declaration is small and rendered through [`std::fmt::Write`]. The
//! definition holds the file contents and is streamed through
//! [`DefinitionWriter`] so no input is ever held in memory as a whole.

mod toc;

use crate::context::EmbedContext;
use crate::escape;
use crate::DIGEST_LEN;
use std::fmt::Write as FmtWrite;
use std::io::{self, Write};

pub use toc::{FileRecord, Toc, TocRow};

/// Banner at the top of both artifacts
pub const GENERATED_BANNER: &str = "// Automatically generated by filewrap";

/// Guard of the shared `FileToc` record type. Fixed so that several
/// generated headers can be included into one translation unit.
pub const FILE_TOC_GUARD: &str = "FILEWRAP_FILE_TOC_H_";

/// Name of the table constant in the definition artifact
pub const TOC_ARRAY: &str = "kToc";

/// Writes the declaration artifact.
pub fn write_declaration(ctx: &EmbedContext, w: &mut impl FmtWrite) -> std::fmt::Result {
    let guard = ctx.header_guard();

    writeln!(w, "{GENERATED_BANNER}")?;
    writeln!(w)?;
    writeln!(w, "#ifndef {FILE_TOC_GUARD}")?;
    writeln!(w, "#define {FILE_TOC_GUARD}")?;
    writeln!(w)?;
    writeln!(w, "#include <cstddef>")?;
    writeln!(w)?;
    writeln!(w, "struct FileToc {{")?;
    writeln!(w, "  const char* name;")?;
    writeln!(w, "  const char* data;")?;
    writeln!(w, "  size_t size;")?;
    writeln!(w, "  // Never computed, always zero. Kept for layout compatibility.")?;
    writeln!(w, "  unsigned char md5digest[{DIGEST_LEN}];")?;
    writeln!(w, "}};")?;
    writeln!(w)?;
    writeln!(w, "#endif  // {FILE_TOC_GUARD}")?;
    writeln!(w)?;
    writeln!(w, "#ifndef {guard}")?;
    writeln!(w, "#define {guard}")?;
    writeln!(w)?;

    if let Some(ns) = ctx.namespace_name() {
        writeln!(w, "namespace {ns} {{")?;
    }

    writeln!(w)?;
    writeln!(w, "const FileToc* {}();", ctx.create_fn())?;
    writeln!(w, "size_t {}();", ctx.size_fn())?;

    if let Some(ns) = ctx.namespace_name() {
        writeln!(w)?;
        writeln!(w, "}}  // namespace {ns}")?;
    }

    writeln!(w)?;
    writeln!(w, "#endif  // {guard}")
}

/// Renders the declaration artifact into a string.
pub fn render_declaration(ctx: &EmbedContext) -> String {
    let mut output = String::new();
    // Writing into a String cannot fail.
    let _ = write_declaration(ctx, &mut output);
    output
}

/// Streaming writer for the definition artifact.
///
/// Call order: [`begin`](Self::begin), then per file
/// [`begin_data`](Self::begin_data), any number of
/// [`write_data`](Self::write_data), [`end_data`](Self::end_data), and
/// finally [`finish`](Self::finish).
#[derive(Debug)]
pub struct DefinitionWriter<W: Write> {
    out: W,
    ctx: EmbedContext,
}

impl<W: Write> DefinitionWriter<W> {
    /// Wraps an output stream
    pub fn new(out: W, ctx: EmbedContext) -> Self {
        Self { out, ctx }
    }

    /// The context this artifact is generated for
    pub fn context(&self) -> &EmbedContext {
        &self.ctx
    }

    /// Writes the banner, includes and opening namespace.
    pub fn begin(&mut self) -> io::Result<()> {
        writeln!(self.out, "{GENERATED_BANNER}")?;
        writeln!(self.out)?;
        writeln!(self.out, "#include \"{}.h\"", self.ctx.include_path())?;
        writeln!(self.out)?;
        writeln!(self.out, "#include \"absl/base/macros.h\"")?;
        writeln!(self.out, "#include \"absl/strings/string_view.h\"")?;
        writeln!(self.out)?;
        if let Some(ns) = self.ctx.namespace_name() {
            writeln!(self.out, "namespace {ns} {{")?;
            writeln!(self.out)?;
        }
        Ok(())
    }

    /// Opens the literal of the data constant named `identifier`.
    pub fn begin_data(&mut self, identifier: &str) -> io::Result<()> {
        write!(self.out, "constexpr absl::string_view {identifier} = {{\"")
    }

    /// Appends escaped bytes to the open literal.
    pub fn write_data(&mut self, chunk: &[u8]) -> io::Result<()> {
        escape::write_escaped(&mut self.out, chunk)
    }

    /// Closes the literal. `byte_length` becomes the explicit view size, so
    /// embedded NUL bytes are part of the data.
    pub fn end_data(&mut self, byte_length: u64) -> io::Result<()> {
        writeln!(self.out, "\", {byte_length}}};")
    }

    /// Writes the table, its sentinel, both accessors and the closing
    /// namespace, then flushes and returns the stream.
    pub fn finish(mut self, toc: &Toc) -> io::Result<W> {
        writeln!(self.out)?;
        writeln!(self.out, "constexpr FileToc {TOC_ARRAY}[] = {{")?;
        for row in toc.rows() {
            match row {
                TocRow::Entry(record) => writeln!(
                    self.out,
                    "    {{\"{name}\", {id}.data(), {id}.size(), {{}}}},",
                    name = escape::escape_to_string(&record.original_name),
                    id = record.identifier,
                )?,
                TocRow::Sentinel => {
                    writeln!(self.out)?;
                    writeln!(self.out, "    // Terminate array")?;
                    writeln!(self.out, "    {{nullptr, nullptr, 0, {{}}}},")?;
                }
            }
        }
        writeln!(self.out, "}};")?;
        writeln!(self.out)?;
        writeln!(self.out, "const FileToc* {}() {{", self.ctx.create_fn())?;
        writeln!(self.out, "  return {TOC_ARRAY};")?;
        writeln!(self.out, "}}")?;
        writeln!(self.out)?;
        writeln!(self.out, "size_t {}() {{", self.ctx.size_fn())?;
        writeln!(self.out, "  return ABSL_ARRAYSIZE({TOC_ARRAY}) - 1;")?;
        writeln!(self.out, "}}")?;

        if let Some(ns) = self.ctx.namespace_name() {
            writeln!(self.out)?;
            writeln!(self.out, "}}  // namespace {ns}")?;
        }

        self.out.flush()?;
        Ok(self.out)
    }
}
