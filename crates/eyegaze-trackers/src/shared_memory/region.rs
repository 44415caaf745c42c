//! Read-only views of named shared memory objects.

use std::io;

use eyegaze::{GazeError, GazeResult};

pub trait SharedRegion: Send + Sync {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copies the first `out.len()` bytes of the region. The writer is not
    /// synchronised with, so a copy taken mid-update may mix two states.
    fn snapshot(&self, out: &mut [u8]) -> io::Result<()>;
}

/// Opens the platform's shared memory object called `name`, which must be
/// at least `min_len` bytes long.
pub fn open_named(name: &str, min_len: usize) -> GazeResult<Box<dyn SharedRegion>> {
    #[cfg(unix)]
    {
        let region = FileRegion::open(std::path::Path::new("/dev/shm").join(name))?;
        if region.len() < min_len {
            return Err(GazeError::not_supported(format!(
                "{} is {} bytes, expected at least {}",
                name,
                region.len(),
                min_len
            )));
        }
        Ok(Box::new(region))
    }

    #[cfg(windows)]
    {
        Ok(Box::new(win::MappedRegion::open(name, min_len)?))
    }

    #[cfg(not(any(unix, windows)))]
    {
        let _ = min_len;
        Err(GazeError::not_supported(format!(
            "shared memory {} is not available on this platform",
            name
        )))
    }
}

/// A shared memory object exposed as a file, as on Linux `/dev/shm`.
#[cfg(unix)]
#[derive(Debug)]
pub struct FileRegion {
    file: std::fs::File,
    len: usize,
}

#[cfg(unix)]
impl FileRegion {
    pub fn open(path: impl AsRef<std::path::Path>) -> GazeResult<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied => {
                GazeError::not_supported(format!("{}: {}", path.display(), e))
            }
            _ => GazeError::Io(e),
        })?;
        let len = file.metadata()?.len() as usize;
        Ok(Self { file, len })
    }
}

#[cfg(unix)]
impl SharedRegion for FileRegion {
    fn len(&self) -> usize {
        self.len
    }

    fn snapshot(&self, out: &mut [u8]) -> io::Result<()> {
        use std::os::unix::fs::FileExt;
        self.file.read_exact_at(out, 0)
    }
}

#[cfg(windows)]
#[allow(unsafe_code)]
mod win {
    use std::io;

    use eyegaze::{GazeError, GazeResult};
    use tracing::warn;
    use windows::core::HSTRING;
    use windows::Win32::Foundation::{CloseHandle, HANDLE};
    use windows::Win32::System::Memory::{
        MapViewOfFile, OpenFileMappingW, UnmapViewOfFile, FILE_MAP_READ,
        MEMORY_MAPPED_VIEW_ADDRESS,
    };

    use super::SharedRegion;

    pub struct MappedRegion {
        handle: HANDLE,
        view: MEMORY_MAPPED_VIEW_ADDRESS,
        len: usize,
    }

    // SAFETY: the view is mapped read-only and only ever read through
    // `snapshot`; the handle is owned and closed once in Drop.
    unsafe impl Send for MappedRegion {}
    unsafe impl Sync for MappedRegion {}

    impl MappedRegion {
        pub fn open(name: &str, len: usize) -> GazeResult<Self> {
            let wide = HSTRING::from(name);
            // SAFETY: `wide` outlives the call.
            let handle = unsafe { OpenFileMappingW(FILE_MAP_READ.0, false.into(), &wide) }
                .map_err(|e| GazeError::not_supported(format!("{}: {}", name, e)))?;

            // SAFETY: `handle` is a valid file mapping handle.
            let view = unsafe { MapViewOfFile(handle, FILE_MAP_READ, 0, 0, len) };
            if view.Value.is_null() {
                let err = io::Error::last_os_error();
                // SAFETY: `handle` was opened above and is not used again.
                let _ = unsafe { CloseHandle(handle) };
                return Err(GazeError::not_supported(format!(
                    "cannot map {}: {}",
                    name, err
                )));
            }

            Ok(Self { handle, view, len })
        }
    }

    impl SharedRegion for MappedRegion {
        fn len(&self) -> usize {
            self.len
        }

        fn snapshot(&self, out: &mut [u8]) -> io::Result<()> {
            if out.len() > self.len {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "snapshot larger than mapped view",
                ));
            }
            // SAFETY: the view is at least `self.len` readable bytes and
            // `out` does not alias it.
            unsafe {
                std::ptr::copy_nonoverlapping(
                    self.view.Value as *const u8,
                    out.as_mut_ptr(),
                    out.len(),
                );
            }
            Ok(())
        }
    }

    impl Drop for MappedRegion {
        fn drop(&mut self) {
            // SAFETY: both were created in `open` and are released once.
            unsafe {
                if let Err(e) = UnmapViewOfFile(self.view) {
                    warn!("UnmapViewOfFile failed: {}", e);
                }
                let _ = CloseHandle(self.handle);
            }
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_object_is_not_supported() {
        let err = FileRegion::open("/dev/shm/eyegaze-test-does-not-exist").unwrap_err();
        assert!(matches!(err, GazeError::NotSupported(_)));
    }

    #[test]
    fn snapshot_reads_from_start() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&[1, 2, 3, 4, 5]).unwrap();

        let region = FileRegion::open(file.path()).unwrap();
        assert_eq!(region.len(), 5);

        let mut out = [0u8; 3];
        region.snapshot(&mut out).unwrap();
        assert_eq!(out, [1, 2, 3]);
    }

    #[test]
    fn snapshot_past_end_fails() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&[0; 4]).unwrap();

        let region = FileRegion::open(file.path()).unwrap();
        let mut out = [0u8; 8];
        assert!(region.snapshot(&mut out).is_err());
    }
}
