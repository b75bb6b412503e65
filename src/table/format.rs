//! Binary serialization of [`VectorTable`].
//!
//! Layout, all fields little-endian, no padding anywhere:
//!
//! ```text
//! offset  size  field
//! 0       4     magic "IVRY"
//! 4       4     frame_count (u32)
//! 8       4     brightness (f32)
//! 12      4     speed (f32)
//! 16      ...   per frame: vector_count (u32), then vector_count pairs
//!               of (dx: i16, dy: i16)
//! ```
//!
//! Frames are written in index order in a single pass; a frame with no
//! vectors contributes only its zero count. Readers stop after the last
//! declared frame and ignore trailing bytes.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;

use super::{Frame, Vector, VectorTable};
use crate::error::FormatError;

/// Magic identifier opening every vector table file.
pub const MAGIC: [u8; 4] = *b"IVRY";

/// Size of the packed file header in bytes.
pub const HEADER_LEN: usize = 16;

impl VectorTable {
    /// Serialize the table into `writer` in file order.
    ///
    /// Streams straight from the frame slots; no intermediate buffer of the
    /// whole file is built. The table is not modified.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_all(&MAGIC)?;
        writer.write_all(&self.frame_count.to_le_bytes())?;
        writer.write_all(&self.brightness.to_le_bytes())?;
        writer.write_all(&self.speed.to_le_bytes())?;

        for frame in self.frames() {
            writer.write_all(&frame.vector_count().to_le_bytes())?;
            for vector in frame.vectors() {
                writer.write_all(&vector.dx.to_le_bytes())?;
                writer.write_all(&vector.dy.to_le_bytes())?;
            }
        }

        Ok(())
    }

    /// Write the table to a new file at `path`, truncating any existing one.
    ///
    /// The file is flushed and synced before this returns, so a clean return
    /// means the table is on disk. On error the file may be left partially
    /// written; partial files fail to load cleanly.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), FormatError> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|source| FormatError::Io {
            context: format!("creating {}", path.display()),
            source,
        })?;

        let mut writer = BufWriter::new(file);
        self.write_to(&mut writer).map_err(|source| FormatError::Io {
            context: format!("writing {}", path.display()),
            source,
        })?;

        // Hand the file back out of the writer so close-time failures are
        // surfaced instead of vanishing in a drop.
        let file = writer.into_inner().map_err(|e| FormatError::Io {
            context: format!("flushing {}", path.display()),
            source: e.into_error(),
        })?;
        file.sync_all().map_err(|source| FormatError::Io {
            context: format!("closing {}", path.display()),
            source,
        })?;

        Ok(())
    }

    /// Parse a table from `reader`.
    ///
    /// Rejects wrong magic bytes and any stream that ends before the last
    /// declared vector; the error names what was being read. Bytes after the
    /// final frame are left unread.
    pub fn read_from<R: Read>(reader: &mut R) -> Result<VectorTable, FormatError> {
        let mut magic = [0u8; 4];
        reader
            .read_exact(&mut magic)
            .map_err(|e| eof_or_io(e, "header".to_string()))?;
        if magic != MAGIC {
            return Err(FormatError::InvalidMagic { found: magic });
        }

        let frame_count = read_u32(reader).map_err(|e| eof_or_io(e, "header".to_string()))?;
        let brightness = read_f32(reader).map_err(|e| eof_or_io(e, "header".to_string()))?;
        let speed = read_f32(reader).map_err(|e| eof_or_io(e, "header".to_string()))?;

        let mut frames = Vec::new();
        frames.try_reserve_exact(frame_count as usize)?;

        for index in 0..frame_count {
            let vector_count = read_u32(reader)
                .map_err(|e| eof_or_io(e, format!("frame {index} vector count")))?;

            let mut vectors = Vec::new();
            vectors.try_reserve_exact(vector_count as usize)?;
            for _ in 0..vector_count {
                let dx = read_i16(reader)
                    .map_err(|e| eof_or_io(e, format!("frame {index} vectors")))?;
                let dy = read_i16(reader)
                    .map_err(|e| eof_or_io(e, format!("frame {index} vectors")))?;
                vectors.push(Vector { dx, dy });
            }

            frames.push(Frame { vectors });
        }

        Ok(VectorTable {
            frame_count,
            brightness,
            speed,
            frames,
        })
    }

    /// Load a table from the file at `path`.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<VectorTable, FormatError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| FormatError::Io {
            context: format!("opening {}", path.display()),
            source,
        })?;

        let mut reader = BufReader::new(file);
        Self::read_from(&mut reader)
    }
}

fn eof_or_io(source: io::Error, context: String) -> FormatError {
    if source.kind() == io::ErrorKind::UnexpectedEof {
        FormatError::UnexpectedEof { context }
    } else {
        FormatError::Io {
            context: format!("reading {context}"),
            source,
        }
    }
}

fn read_u32<R: Read>(reader: &mut R) -> io::Result<u32> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

fn read_f32<R: Read>(reader: &mut R) -> io::Result<f32> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    Ok(f32::from_le_bytes(buf))
}

fn read_i16<R: Read>(reader: &mut R) -> io::Result<i16> {
    let mut buf = [0u8; 2];
    reader.read_exact(&mut buf)?;
    Ok(i16::from_le_bytes(buf))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_to_vec(table: &VectorTable) -> Vec<u8> {
        let mut bytes = Vec::new();
        table.write_to(&mut bytes).unwrap();
        bytes
    }

    #[test]
    fn test_zero_frame_table_is_header_only() {
        let mut table = VectorTable::new(0).unwrap();
        table.brightness = 0.5;
        table.speed = 2.0;

        let bytes = write_to_vec(&table);
        let expected: Vec<u8> = vec![
            b'I', b'V', b'R', b'Y', // magic
            0x00, 0x00, 0x00, 0x00, // frame_count = 0
            0x00, 0x00, 0x00, 0x3F, // brightness = 0.5
            0x00, 0x00, 0x00, 0x40, // speed = 2.0
        ];
        assert_eq!(bytes.len(), HEADER_LEN);
        assert_eq!(bytes, expected);
    }

    #[test]
    fn test_single_frame_layout() {
        let mut table = VectorTable::new(1).unwrap();
        table.record_frame(0, &[1, 3], &[-2, 4]).unwrap();

        let expected: Vec<u8> = vec![
            b'I', b'V', b'R', b'Y', // magic
            0x01, 0x00, 0x00, 0x00, // frame_count = 1
            0x00, 0x00, 0x80, 0x3F, // brightness = 1.0
            0x00, 0x00, 0x80, 0x3F, // speed = 1.0
            0x02, 0x00, 0x00, 0x00, // vector_count = 2
            0x01, 0x00, 0xFE, 0xFF, // (1, -2)
            0x03, 0x00, 0x04, 0x00, // (3, 4)
        ];
        assert_eq!(write_to_vec(&table), expected);
    }

    #[test]
    fn test_empty_frames_contribute_count_only() {
        let table = VectorTable::new(3).unwrap();
        let bytes = write_to_vec(&table);

        assert_eq!(bytes.len(), HEADER_LEN + 3 * 4);
        assert_eq!(&bytes[HEADER_LEN..], &[0u8; 12]);
    }

    #[test]
    fn test_round_trip_preserves_everything() {
        let mut table = VectorTable::new(3).unwrap();
        table.brightness = 0.75;
        table.speed = 1.5;
        table
            .record_frame(1, &[1, -1, 32767], &[-32768, 0, 12])
            .unwrap();

        let bytes = write_to_vec(&table);
        let loaded = VectorTable::read_from(&mut bytes.as_slice()).unwrap();

        assert_eq!(loaded.frame_count(), 3);
        assert_eq!(loaded.brightness, 0.75);
        assert_eq!(loaded.speed, 1.5);
        assert!(loaded.frame(0).unwrap().is_empty());
        assert_eq!(
            loaded.frame(1).unwrap().vectors(),
            table.frame(1).unwrap().vectors()
        );
        assert!(loaded.frame(2).unwrap().is_empty());
    }

    #[test]
    fn test_save_and_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.ivry");

        let mut table = VectorTable::new(2).unwrap();
        table.record_frame(0, &[10], &[-10]).unwrap();
        table.save(&path).unwrap();

        let on_disk = std::fs::read(&path).unwrap();
        assert_eq!(on_disk.len(), HEADER_LEN + 4 + 4 + 4);

        let loaded = VectorTable::load(&path).unwrap();
        assert_eq!(loaded.frame_count(), 2);
        assert_eq!(
            loaded.frame(0).unwrap().vectors(),
            &[Vector { dx: 10, dy: -10 }]
        );
    }

    #[test]
    fn test_save_lands_complete_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.ivry");

        VectorTable::new(0).unwrap().save(&path).unwrap();

        // A clean return means the whole table was flushed and synced.
        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(bytes.len(), HEADER_LEN);
        assert_eq!(&bytes[..4], b"IVRY");
    }

    #[test]
    fn test_load_rejects_wrong_magic() {
        let mut bytes = write_to_vec(&VectorTable::new(0).unwrap());
        bytes[..4].copy_from_slice(b"JUNK");

        let err = VectorTable::read_from(&mut bytes.as_slice()).unwrap_err();
        match err {
            FormatError::InvalidMagic { found } => assert_eq!(&found, b"JUNK"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_load_rejects_truncated_header() {
        let bytes = &write_to_vec(&VectorTable::new(0).unwrap())[..7];

        let err = VectorTable::read_from(&mut &bytes[..]).unwrap_err();
        match err {
            FormatError::UnexpectedEof { context } => assert_eq!(context, "header"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_load_rejects_missing_vector_count() {
        let mut table = VectorTable::new(2).unwrap();
        table.record_frame(0, &[1], &[2]).unwrap();
        let bytes = write_to_vec(&table);
        // Drop frame 1's count (the last 4 bytes).
        let truncated = &bytes[..bytes.len() - 4];

        let err = VectorTable::read_from(&mut &truncated[..]).unwrap_err();
        match err {
            FormatError::UnexpectedEof { context } => {
                assert_eq!(context, "frame 1 vector count")
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_load_rejects_missing_vectors() {
        let mut table = VectorTable::new(1).unwrap();
        table.record_frame(0, &[1, 2, 3], &[4, 5, 6]).unwrap();
        let bytes = write_to_vec(&table);
        // Cut into the last pair.
        let truncated = &bytes[..bytes.len() - 3];

        let err = VectorTable::read_from(&mut &truncated[..]).unwrap_err();
        match err {
            FormatError::UnexpectedEof { context } => assert_eq!(context, "frame 0 vectors"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_load_ignores_trailing_bytes() {
        let mut table = VectorTable::new(1).unwrap();
        table.record_frame(0, &[7], &[-7]).unwrap();
        let mut bytes = write_to_vec(&table);
        bytes.extend_from_slice(b"leftover");

        let loaded = VectorTable::read_from(&mut bytes.as_slice()).unwrap();
        assert_eq!(loaded.frame_count(), 1);
        assert_eq!(loaded.frame(0).unwrap().vector_count(), 1);
    }

    #[test]
    fn test_load_survives_hostile_frame_count() {
        let mut bytes = write_to_vec(&VectorTable::new(0).unwrap());
        bytes[4..8].copy_from_slice(&u32::MAX.to_le_bytes());

        // Either the slot reservation is refused or the read runs out of
        // bytes; both are clean errors, never a crash.
        assert!(VectorTable::read_from(&mut bytes.as_slice()).is_err());
    }

    #[test]
    fn test_load_survives_hostile_vector_count() {
        let mut table = VectorTable::new(1).unwrap();
        table.record_frame(0, &[1], &[1]).unwrap();
        let mut bytes = write_to_vec(&table);
        bytes[HEADER_LEN..HEADER_LEN + 4].copy_from_slice(&u32::MAX.to_le_bytes());

        assert!(VectorTable::read_from(&mut bytes.as_slice()).is_err());
    }

    #[test]
    fn test_save_reports_unwritable_path() {
        let dir = tempfile::tempdir().unwrap();
        let table = VectorTable::new(0).unwrap();

        // The directory itself is not a creatable file path.
        let err = table.save(dir.path()).unwrap_err();
        match err {
            FormatError::Io { context, .. } => assert!(context.starts_with("creating")),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
