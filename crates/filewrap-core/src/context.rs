//! Per-run naming context and transcoder configuration.

use crate::error::Result;
use crate::ident;

/// Default buffer size for input and output streams
pub const DEFAULT_BUFFER_SIZE: usize = 4096;

/// Immutable naming context of one run.
///
/// Built once from the command line and only read afterwards. All
/// generated names that must agree between the two artifacts are derived
/// from here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbedContext {
    package: String,
    name: String,
    namespace: Option<String>,
    toc_ident: String,
}

impl EmbedContext {
    /// Creates a context, validating that `name` yields usable accessor names.
    pub fn new(package: impl Into<String>, name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        let toc_ident = ident::toc_identifier(&name)?;
        Ok(Self {
            package: package.into(),
            name,
            namespace: None,
            toc_ident,
        })
    }

    /// Sets the namespace both artifacts are wrapped in. Empty disables it.
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        let namespace = namespace.into();
        self.namespace = (!namespace.is_empty()).then_some(namespace);
        self
    }

    /// The package label
    pub fn package(&self) -> &str {
        &self.package
    }

    /// The logical name as given
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The namespace, if wrapping is enabled
    pub fn namespace_name(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Base identifier of the accessors
    pub fn toc_ident(&self) -> &str {
        &self.toc_ident
    }

    /// Include guard token of the declaration artifact
    pub fn header_guard(&self) -> String {
        ident::header_guard(&self.package, &self.toc_ident)
    }

    /// `package/name`, or just `name` for an empty package
    pub fn include_path(&self) -> String {
        if self.package.is_empty() {
            self.name.clone()
        } else {
            format!("{}/{}", self.package, self.name)
        }
    }

    /// Name of the accessor returning the first table entry
    pub fn create_fn(&self) -> String {
        format!("{}_create", self.toc_ident)
    }

    /// Name of the accessor returning the number of entries
    pub fn size_fn(&self) -> String {
        format!("{}_size", self.toc_ident)
    }
}

/// Configuration for the transcoding driver
#[derive(Debug, Clone)]
pub struct TranscoderConfig {
    /// Size of each chunk read from an input file
    pub read_buffer_size: usize,
    /// Buffer size of the output artifact streams
    pub write_buffer_size: usize,
    /// Fail when two inputs produce the same data identifier
    pub reject_collisions: bool,
}

impl Default for TranscoderConfig {
    fn default() -> Self {
        Self {
            read_buffer_size: DEFAULT_BUFFER_SIZE,
            write_buffer_size: DEFAULT_BUFFER_SIZE,
            reject_collisions: true,
        }
    }
}

impl TranscoderConfig {
    /// Creates a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the input chunk size
    pub fn read_buffer_size(mut self, size: usize) -> Self {
        self.read_buffer_size = size.max(1);
        self
    }

    /// Sets the output buffer size
    pub fn write_buffer_size(mut self, size: usize) -> Self {
        self.write_buffer_size = size.max(1);
        self
    }

    /// Sets whether identifier collisions abort the run
    pub fn reject_collisions(mut self, reject: bool) -> Self {
        self.reject_collisions = reject;
        self
    }
}
