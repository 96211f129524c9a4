//! Getting roms from the file system or out of zip archives.
use std::{
    fs::File,
    io::{prelude::*, Cursor},
    path::Path,
};
use zip::read::ZipArchive;

use crate::{definitions::cpu, LoadError};

/// Represents an archive of roms
/// it contains all kind of information about the information of the archives
pub struct RomArchive<R> {
    archive: ZipArchive<R>,
}

impl<'a> RomArchive<Cursor<&'a [u8]>> {
    /// Will read an archive held in memory
    pub fn from_bytes(data: &'a [u8]) -> Result<Self, LoadError> {
        Self::new(Cursor::new(data))
    }
}

impl RomArchive<File> {
    /// Will open the archive at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| LoadError::Io {
            name: path.display().to_string(),
            source,
        })?;
        Self::new(file)
    }
}

impl<R> RomArchive<R>
where
    R: Read + Seek,
{
    pub fn new(reader: R) -> Result<Self, LoadError> {
        Ok(RomArchive {
            archive: ZipArchive::new(reader)?,
        })
    }

    /// Will return all the rom names available to be chosen
    pub fn file_names(&self) -> Vec<&'_ str> {
        self.archive.file_names().collect()
    }

    /// Will decompress the information from the zip archive
    pub fn get_file_data(&mut self, name: &str) -> Result<Rom, LoadError> {
        let mut file = self.archive.by_name(name)?;
        let mut data = Vec::with_capacity(file.size() as usize);
        file.read_to_end(&mut data).map_err(|source| LoadError::Io {
            name: name.to_string(),
            source,
        })?;
        Ok(Rom::new(name, data))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Represents a single rom with it's information
pub struct Rom {
    /// The rom name
    name: String,
    /// The program bytes, never larger than the program space
    data: Box<[u8]>,
}

impl Rom {
    /// Will generate a new rom based of the given data, everything past the
    /// program space is dropped.
    pub fn new<D: Into<Vec<u8>>>(name: &str, data: D) -> Self {
        let mut data = data.into();
        if data.len() > cpu::PROGRAM_SIZE {
            log::warn!(
                "Rom '{}' is {} bytes large, truncating it to {} bytes.",
                name,
                data.len(),
                cpu::PROGRAM_SIZE
            );
            data.truncate(cpu::PROGRAM_SIZE);
        }
        Rom {
            name: name.to_string(),
            data: data.into_boxed_slice(),
        }
    }

    /// Will read the rom from the file system, it is named after the file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let data = std::fs::read(path).map_err(|source| LoadError::Io {
            name: path.display().to_string(),
            source,
        })?;
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Rom::new(&name, data))
    }

    /// Will return a slice internal values of the given data
    pub fn get_data(&self) -> &[u8] {
        &self.data
    }

    /// Will return the name of the rom.
    pub fn get_name(&self) -> &str {
        &self.name
    }
}
