use std::collections::HashMap;
use std::fs;
use std::path::Path;

use flate2::Decompress;
use flate2::FlushDecompress;
use flate2::Status;

use crate::errors::{FileCompressionType, ZipError};
use crate::structs::{
    central_directory::CentralDirectory, eocd::EndOfCentralDirectory,
    local_file_header::LocalFileHeader,
};

/// Represents a parsed ZIP archive (`.jar`/`.war`/`.ear` are all ZIP-format).
pub struct ZipArchive {
    input: Vec<u8>,
    eocd: EndOfCentralDirectory,
    central_directory: CentralDirectory,
    local_headers: HashMap<String, LocalFileHeader>,
}

impl ZipArchive {
    pub fn new(input: Vec<u8>) -> Result<ZipArchive, ZipError> {
        if !input.starts_with(b"PK\x03\x04") {
            return Err(ZipError::InvalidHeader);
        }

        let eocd_offset =
            EndOfCentralDirectory::find_eocd(&input, 4096).ok_or(ZipError::NotFoundEOCD)?;

        let eocd = EndOfCentralDirectory::parse(&mut &input[eocd_offset..])
            .map_err(|_| ZipError::ParseError)?;

        let central_directory =
            CentralDirectory::parse(&input, &eocd).map_err(|_| ZipError::ParseError)?;

        let local_headers = central_directory
            .entries
            .iter()
            .filter_map(|(filename, entry)| {
                LocalFileHeader::parse(&input, entry.local_header_offset as usize)
                    .ok()
                    .map(|header| (filename.clone(), header))
            })
            .collect();

        Ok(ZipArchive {
            input,
            eocd,
            central_directory,
            local_headers,
        })
    }

    /// Get list of the filenames from the zip archive's central directory.
    pub fn namelist(&self) -> impl Iterator<Item = &String> {
        self.central_directory.entries.keys()
    }

    /// Read and decompress a single file by name.
    pub fn read(&self, filename: &str) -> Result<(Vec<u8>, FileCompressionType), ZipError> {
        let local_header = self
            .local_headers
            .get(filename)
            .ok_or(ZipError::FileNotFound)?;

        let central_directory_entry = self
            .central_directory
            .entries
            .get(filename)
            .ok_or(ZipError::FileNotFound)?;

        let (compressed_size, uncompressed_size) =
            if local_header.compressed_size == 0 || local_header.uncompressed_size == 0 {
                (
                    central_directory_entry.compressed_size as usize,
                    central_directory_entry.uncompressed_size as usize,
                )
            } else {
                (
                    local_header.compressed_size as usize,
                    local_header.uncompressed_size as usize,
                )
            };

        let offset = central_directory_entry.local_header_offset as usize + local_header.size();
        let get_slice = |start: usize, end: usize| self.input.get(start..end).ok_or(ZipError::Eof);

        match (
            local_header.compression_method,
            compressed_size == uncompressed_size,
        ) {
            (0, _) => {
                let slice = get_slice(offset, offset + uncompressed_size)?;
                Ok((slice.to_vec(), FileCompressionType::Stored))
            }
            (8, _) => {
                let compressed_data = get_slice(offset, offset + compressed_size)?;
                let mut uncompressed_data = Vec::with_capacity(uncompressed_size);

                Decompress::new(false)
                    .decompress_vec(
                        compressed_data,
                        &mut uncompressed_data,
                        FlushDecompress::Finish,
                    )
                    .map_err(|_| ZipError::DecompressionError)?;

                Ok((uncompressed_data, FileCompressionType::Deflated))
            }
            (_, true) => {
                let slice = get_slice(offset, offset + uncompressed_size)?;
                Ok((slice.to_vec(), FileCompressionType::StoredTampered))
            }
            (_, false) => {
                let compressed_data = get_slice(offset, offset + compressed_size)?;
                let mut uncompressed_data = Vec::with_capacity(uncompressed_size);
                let mut decompressor = Decompress::new(false);

                let status = decompressor.decompress_vec(
                    compressed_data,
                    &mut uncompressed_data,
                    FlushDecompress::Finish,
                );

                let is_valid = decompressor.total_in() == compressed_data.len() as u64;
                match status {
                    Ok(Status::Ok) | Ok(Status::StreamEnd) if is_valid => {
                        Ok((uncompressed_data, FileCompressionType::DeflatedTampered))
                    }
                    _ => {
                        let slice = get_slice(offset, offset + uncompressed_size)?;
                        Ok((slice.to_vec(), FileCompressionType::StoredTampered))
                    }
                }
            }
        }
    }

    /// Extracts every entry of this archive into `dest`, recreating the
    /// archive's internal directory structure. Returns the number of files
    /// written (directory entries are not counted).
    ///
    /// Entries whose name would escape `dest` (leading `..` component) are
    /// skipped with a warning, same as `classgraph-cli`'s own `extract`
    /// command handles path traversal.
    pub fn extract_all(&self, dest: &Path) -> Result<usize, ZipError> {
        let mut written = 0usize;

        for file_name in self.namelist() {
            if file_name.ends_with('/') {
                continue;
            }

            if file_name.starts_with("..") {
                log::warn!("skipping entry with suspicious path: {file_name}");
                continue;
            }

            let file_path = dest.join(file_name);
            if let Some(parent) = file_path.parent() {
                fs::create_dir_all(parent)?;
            }

            let (data, _) = self.read(file_name)?;
            fs::write(&file_path, data)?;
            written += 1;
        }

        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Builds the bytes of a minimal, uncompressed (stored) ZIP archive
    /// containing the given (name, content) entries. Used to exercise
    /// `ZipArchive` without depending on a real `.jar` fixture.
    pub(crate) fn build_stored_zip(entries: &[(&str, &[u8])]) -> Vec<u8> {
        let mut out = Vec::new();
        let mut central_directory = Vec::new();

        for (name, data) in entries {
            let local_header_offset = out.len() as u32;

            out.extend_from_slice(&0x04034b50u32.to_le_bytes());
            out.extend_from_slice(&10u16.to_le_bytes()); // version needed
            out.extend_from_slice(&0u16.to_le_bytes()); // flags
            out.extend_from_slice(&0u16.to_le_bytes()); // compression method: stored
            out.extend_from_slice(&0u16.to_le_bytes()); // mod time
            out.extend_from_slice(&0u16.to_le_bytes()); // mod date
            out.extend_from_slice(&0u32.to_le_bytes()); // crc32
            out.extend_from_slice(&(data.len() as u32).to_le_bytes());
            out.extend_from_slice(&(data.len() as u32).to_le_bytes());
            out.extend_from_slice(&(name.len() as u16).to_le_bytes());
            out.extend_from_slice(&0u16.to_le_bytes()); // extra field length
            out.extend_from_slice(name.as_bytes());
            out.extend_from_slice(data);

            central_directory.extend_from_slice(&0x02014b50u32.to_le_bytes());
            central_directory.extend_from_slice(&0u16.to_le_bytes()); // version made by
            central_directory.extend_from_slice(&10u16.to_le_bytes()); // version needed
            central_directory.extend_from_slice(&0u16.to_le_bytes()); // general purpose
            central_directory.extend_from_slice(&0u16.to_le_bytes()); // compression method
            central_directory.extend_from_slice(&0u16.to_le_bytes()); // mod time
            central_directory.extend_from_slice(&0u16.to_le_bytes()); // mod date
            central_directory.extend_from_slice(&0u32.to_le_bytes()); // crc32
            central_directory.extend_from_slice(&(data.len() as u32).to_le_bytes());
            central_directory.extend_from_slice(&(data.len() as u32).to_le_bytes());
            central_directory.extend_from_slice(&(name.len() as u16).to_le_bytes());
            central_directory.extend_from_slice(&0u16.to_le_bytes()); // extra field length
            central_directory.extend_from_slice(&0u16.to_le_bytes()); // comment length
            central_directory.extend_from_slice(&0u16.to_le_bytes()); // disk number start
            central_directory.extend_from_slice(&0u16.to_le_bytes()); // internal attrs
            central_directory.extend_from_slice(&0u32.to_le_bytes()); // external attrs
            central_directory.extend_from_slice(&local_header_offset.to_le_bytes());
            central_directory.extend_from_slice(name.as_bytes());
        }

        let central_dir_offset = out.len() as u32;
        let central_dir_size = central_directory.len() as u32;
        out.extend_from_slice(&central_directory);

        out.extend_from_slice(&0x06054b50u32.to_le_bytes());
        out.extend_from_slice(&0u16.to_le_bytes()); // disk number
        out.extend_from_slice(&0u16.to_le_bytes()); // central dir start disk
        out.extend_from_slice(&(entries.len() as u16).to_le_bytes());
        out.extend_from_slice(&(entries.len() as u16).to_le_bytes());
        out.extend_from_slice(&central_dir_size.to_le_bytes());
        out.extend_from_slice(&central_dir_offset.to_le_bytes());
        out.extend_from_slice(&0u16.to_le_bytes()); // comment length

        out
    }

    #[test]
    fn reads_back_stored_entries() {
        let bytes = build_stored_zip(&[("a.txt", b"hello"), ("dir/b.txt", b"world!")]);
        let archive = ZipArchive::new(bytes).expect("archive should parse");

        let mut names: Vec<&String> = archive.namelist().collect();
        names.sort();
        assert_eq!(names, vec!["a.txt", "dir/b.txt"]);

        let (data, kind) = archive.read("a.txt").expect("a.txt should read back");
        assert_eq!(data, b"hello");
        assert!(matches!(kind, FileCompressionType::Stored));
    }

    #[test]
    fn rejects_non_zip_input() {
        let err = ZipArchive::new(b"not a zip".to_vec()).unwrap_err();
        assert!(matches!(err, ZipError::InvalidHeader));
    }

    #[test]
    fn extract_all_writes_every_entry() {
        let bytes = build_stored_zip(&[("one.class", b"1"), ("nested/two.class", b"22")]);
        let archive = ZipArchive::new(bytes).expect("archive should parse");

        let dest = tempfile::tempdir().expect("tempdir");
        let written = archive.extract_all(dest.path()).expect("extract should succeed");

        assert_eq!(written, 2);
        assert!(dest.path().join("one.class").is_file());
        assert!(dest.path().join("nested/two.class").is_file());
    }
}
