use std::fs::File;
use std::io::{self, Seek, SeekFrom};
use std::path::Path;

/// Anonymous temporary file holding one downloaded object.
///
/// The file is unlinked at creation, so its storage is released when the
/// handle drops, whichever way the caller exits.
#[derive(Debug)]
pub struct ScratchBuffer {
    file: File,
}

impl ScratchBuffer {
    pub fn create(dir: Option<&Path>) -> io::Result<Self> {
        let file = match dir {
            Some(dir) => tempfile::tempfile_in(dir)?,
            None => tempfile::tempfile()?,
        };
        Ok(Self { file })
    }

    pub fn writer(&mut self) -> &mut File {
        &mut self.file
    }

    /// Rewinds to the first byte and hands the file over for reading.
    pub fn into_reader(mut self) -> io::Result<File> {
        self.file.seek(SeekFrom::Start(0))?;
        Ok(self.file)
    }
}
