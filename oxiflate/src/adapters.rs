//! String and file conveniences over the buffer and stream APIs.
//!
//! File operations write to a hidden temporary file next to the destination
//! and rename it into place only after the whole stream has been written, so
//! a failure never leaves a partial file under the destination name.

use crate::api::{compress, decompress};
use crate::config::{CompressOptions, StreamOptions};
use crate::stream::{StreamSummary, compress_stream_with, decompress_stream_with};
use oxiflate_core::error::{FlateError, Result};
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Compress UTF-8 text to zlib.
pub fn compress_str(text: &str, level: i32) -> Result<Vec<u8>> {
    compress(text.as_bytes(), level)
}

/// Decompress to a `String`; invalid UTF-8 is reported as corrupt data.
pub fn decompress_to_string(data: &[u8]) -> Result<String> {
    String::from_utf8(decompress(data)?).map_err(|err| {
        FlateError::corrupted(
            err.utf8_error().valid_up_to() as u64,
            "decompressed data is not valid UTF-8",
        )
    })
}

/// Compress the file at `src` into `dst`.
pub fn compress_file(
    src: impl AsRef<Path>,
    dst: impl AsRef<Path>,
    options: &CompressOptions,
    stream: &StreamOptions,
) -> Result<StreamSummary> {
    let reader = open_input(src.as_ref())?;
    write_atomically(dst.as_ref(), |writer| {
        compress_stream_with(reader, writer, options, stream)
    })
}

/// Decompress the zlib or gzip file at `src` into `dst`.
pub fn decompress_file(
    src: impl AsRef<Path>,
    dst: impl AsRef<Path>,
    stream: &StreamOptions,
) -> Result<StreamSummary> {
    let reader = open_input(src.as_ref())?;
    write_atomically(dst.as_ref(), |writer| {
        decompress_stream_with(reader, writer, stream)
    })
}

/// Open `path` for buffered reading; read errors name the file.
pub fn open_input(path: &Path) -> Result<impl Read + use<>> {
    let file = File::open(path).map_err(|e| FlateError::file_io(path, e))?;
    Ok(PathIo::new(BufReader::new(file), path))
}

/// Run `write` against a temporary sibling of `dst` and rename it into place
/// once `write` has succeeded and the data is synced.
///
/// On any failure the temporary file is removed and `dst` is untouched.
pub fn write_atomically<T, F>(dst: &Path, write: F) -> Result<T>
where
    F: FnOnce(&mut dyn Write) -> Result<T>,
{
    let tmp = temp_path(dst);
    let file = File::create(&tmp).map_err(|e| FlateError::file_io(&tmp, e))?;
    let mut writer = PathIo::new(BufWriter::new(file), dst);

    let result = write(&mut writer).map_err(with_path).and_then(|value| {
        let file = writer
            .inner
            .into_inner()
            .map_err(|e| FlateError::file_io(&tmp, e.into_error()))?;
        file.sync_all().map_err(|e| FlateError::file_io(&tmp, e))?;
        Ok(value)
    });

    match result {
        Ok(value) => {
            fs::rename(&tmp, dst).map_err(|e| FlateError::file_io(dst, e))?;
            debug!(dst = %dst.display(), "file written");
            Ok(value)
        }
        Err(err) => {
            let _ = fs::remove_file(&tmp);
            Err(err)
        }
    }
}

/// Temporary sibling of `dst`: `dir/.name.oxiflate-tmp`.
fn temp_path(dst: &Path) -> PathBuf {
    let name = dst
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    dst.with_file_name(format!(".{}.oxiflate-tmp", name))
}

/// I/O error raised by a [`PathIo`], carrying the file it came from.
#[derive(Debug, Error)]
#[error("{}: {source}", path.display())]
struct PathIoError {
    path: PathBuf,
    #[source]
    source: io::Error,
}

/// Turn an I/O error raised by a [`PathIo`] into [`FlateError::FileIo`].
fn with_path(err: FlateError) -> FlateError {
    match err {
        FlateError::Io(e) if e.get_ref().is_some_and(|inner| inner.is::<PathIoError>()) => {
            match e.into_inner().map(|inner| inner.downcast::<PathIoError>()) {
                Some(Ok(inner)) => FlateError::file_io(inner.path, inner.source),
                Some(Err(other)) => FlateError::Io(io::Error::other(other)),
                None => FlateError::Io(io::Error::other("I/O error")),
            }
        }
        other => other,
    }
}

/// Reader or writer whose I/O errors name the file they came from.
struct PathIo<T> {
    inner: T,
    path: PathBuf,
}

impl<T> PathIo<T> {
    fn new(inner: T, path: &Path) -> Self {
        Self {
            inner,
            path: path.to_path_buf(),
        }
    }

    fn annotate(&self, err: io::Error) -> io::Error {
        let kind = err.kind();
        io::Error::new(
            kind,
            PathIoError {
                path: self.path.clone(),
                source: err,
            },
        )
    }
}

impl<R: Read> Read for PathIo<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf).map_err(|e| self.annotate(e))
    }
}

impl<W: Write> Write for PathIo<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.write(buf).map_err(|e| self.annotate(e))
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush().map_err(|e| self.annotate(e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CompressionLevel;
    use crate::gzip::GzipHeader;
    use oxiflate_core::ErrorKind;

    fn temp_file_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("oxiflate_adapters_test_{}", name))
    }

    fn create_temp_file(name: &str, contents: &[u8]) -> PathBuf {
        let path = temp_file_path(name);
        let mut file = File::create(&path).expect("Failed to create temp file");
        file.write_all(contents).expect("Failed to write temp file");
        path
    }

    fn remove_temp_file(path: &Path) {
        let _ = fs::remove_file(path);
    }

    #[test]
    fn test_str_roundtrip() {
        let text = "Grüße, 世界! Grüße, 世界!";
        let compressed = compress_str(text, 6).unwrap();
        assert_eq!(decompress_to_string(&compressed).unwrap(), text);
    }

    #[test]
    fn test_invalid_utf8() {
        let compressed = compress(&[b'o', b'k', 0xFF, 0xFE], 6).unwrap();
        let err = decompress_to_string(&compressed).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CorruptData);
        assert!(matches!(err, FlateError::CorruptData { offset: 2, .. }));
    }

    #[test]
    fn test_file_roundtrip() {
        let contents: Vec<u8> = (0..200_000u32).map(|i| (i % 13) as u8).collect();
        let src = create_temp_file("roundtrip_src", &contents);
        let packed = temp_file_path("roundtrip_packed.gz");
        let unpacked = temp_file_path("roundtrip_unpacked");

        let options = CompressOptions::new(CompressionLevel::DEFAULT)
            .gzip_header(GzipHeader::new().filename("roundtrip_src"));
        let summary = compress_file(&src, &packed, &options, &StreamOptions::default()).unwrap();
        assert_eq!(summary.bytes_in, contents.len() as u64);
        assert!(!temp_path(&packed).exists());

        let summary = decompress_file(&packed, &unpacked, &StreamOptions::default()).unwrap();
        assert_eq!(summary.bytes_out, contents.len() as u64);
        assert_eq!(
            summary.gzip_header.unwrap().filename.as_deref(),
            Some("roundtrip_src")
        );
        assert_eq!(fs::read(&unpacked).unwrap(), contents);

        remove_temp_file(&src);
        remove_temp_file(&packed);
        remove_temp_file(&unpacked);
    }

    #[test]
    fn test_missing_source_names_path() {
        let src = temp_file_path("does_not_exist");
        let dst = temp_file_path("does_not_exist_out");
        let err = compress_file(
            &src,
            &dst,
            &CompressOptions::default(),
            &StreamOptions::default(),
        )
        .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Io);
        assert!(matches!(&err, FlateError::FileIo { path, .. } if *path == src));
        assert!(!dst.exists());
    }

    /// Yields `good` bytes, then fails.
    struct FailingReader {
        good: usize,
    }

    impl Read for FailingReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.good == 0 {
                return Err(io::Error::new(io::ErrorKind::PermissionDenied, "revoked"));
            }
            let n = self.good.min(buf.len());
            buf[..n].fill(b'z');
            self.good -= n;
            Ok(n)
        }
    }

    #[test]
    fn test_mid_stream_read_error_names_path() {
        let src = PathBuf::from("input.bin");
        let dst = temp_file_path("mid_stream_dst");
        remove_temp_file(&dst);

        let reader = PathIo::new(FailingReader { good: 100_000 }, &src);
        let err = write_atomically(&dst, |writer| {
            compress_stream_with(
                reader,
                writer,
                &CompressOptions::default(),
                &StreamOptions::default(),
            )
        })
        .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Io);
        match &err {
            FlateError::FileIo { path, source } => {
                assert_eq!(*path, src);
                assert_eq!(source.kind(), io::ErrorKind::PermissionDenied);
            }
            other => panic!("expected FileIo, got {:?}", other),
        }
        assert!(!dst.exists());
        assert!(!temp_path(&dst).exists());
    }

    #[test]
    fn test_failed_decode_leaves_no_output() {
        let src = create_temp_file("corrupt_src", &[0x78, 0x9C, 0xFF, 0xFF, 0xFF]);
        let dst = temp_file_path("corrupt_dst");
        remove_temp_file(&dst);

        assert!(decompress_file(&src, &dst, &StreamOptions::default()).is_err());
        assert!(!dst.exists());
        assert!(!temp_path(&dst).exists());

        remove_temp_file(&src);
    }
}
