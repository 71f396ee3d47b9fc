//! Buffered entry copy with read/write failure classification.
//!
//! Data flowing out of a zip entry passes through the decompressor and the
//! CRC check, so a failed read means the archive is damaged while a failed
//! write means the destination refused the data. [`copy_with_buffer`] keeps
//! the two apart.

use std::io::Read;
use std::io::Write;
use std::io::{self};
use std::path::Path;

use crate::ExtractionError;
use crate::ProgressCallback;
use crate::Result;

/// Buffer size for entry copies (64KB).
const COPY_BUFFER_SIZE: usize = 64 * 1024;

/// Reusable heap buffer for copying entry data.
///
/// One buffer is allocated per run and shared by every entry.
#[derive(Debug)]
pub struct CopyBuffer {
    buf: Box<[u8]>,
}

impl CopyBuffer {
    /// Creates a new zeroed copy buffer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            buf: vec![0u8; COPY_BUFFER_SIZE].into_boxed_slice(),
        }
    }

    /// Returns the buffer size in bytes.
    #[inline]
    #[must_use]
    pub fn size(&self) -> usize {
        self.buf.len()
    }
}

impl Default for CopyBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// Copies an entry's data from `reader` to `writer`.
///
/// Returns the number of bytes copied. `entry` is only used to label
/// errors; `progress` receives one `on_bytes_written` call per chunk.
///
/// # Errors
///
/// - [`ExtractionError::ArchiveCorrupt`] if reading fails (bad checksum,
///   truncated stream, decompression error)
/// - [`ExtractionError::EntryWriteFailed`] if writing fails
///
/// # Examples
///
/// ```
/// use fwinflate_core::NoopProgress;
/// use fwinflate_core::copy::CopyBuffer;
/// use fwinflate_core::copy::copy_with_buffer;
/// use std::io::Cursor;
/// use std::path::Path;
///
/// # fn main() -> Result<(), fwinflate_core::ExtractionError> {
/// let mut buffer = CopyBuffer::new();
/// let mut input = Cursor::new(b"hello".to_vec());
/// let mut output = Vec::new();
///
/// let copied = copy_with_buffer(
///     &mut input,
///     &mut output,
///     &mut buffer,
///     Path::new("a.txt"),
///     &mut NoopProgress,
/// )?;
/// assert_eq!(copied, 5);
/// # Ok(())
/// # }
/// ```
pub fn copy_with_buffer<R: Read + ?Sized, W: Write + ?Sized>(
    reader: &mut R,
    writer: &mut W,
    buffer: &mut CopyBuffer,
    entry: &Path,
    progress: &mut dyn ProgressCallback,
) -> Result<u64> {
    let mut total: u64 = 0;

    loop {
        let bytes_read = match reader.read(&mut buffer.buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => {
                return Err(ExtractionError::ArchiveCorrupt {
                    entry: entry.display().to_string(),
                    reason: e.to_string(),
                });
            }
        };

        writer
            .write_all(&buffer.buf[..bytes_read])
            .map_err(|source| ExtractionError::EntryWriteFailed {
                entry: entry.to_path_buf(),
                source,
            })?;

        total = total.saturating_add(bytes_read as u64);
        progress.on_bytes_written(bytes_read as u64);
    }

    Ok(total)
}
