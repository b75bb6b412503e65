//! # Vector-Frame Container
//!
//! The in-memory table at the heart of the converter: a fixed number of frame
//! slots, each holding a variable-length list of 2-D beam displacements. The
//! processing loop fills slots in index order with [`VectorTable::record_frame`]
//! and the finished table is persisted with [`VectorTable::save`].
//!
//! Frame capacity is fixed at construction. Recording replaces a slot's
//! contents wholesale; there is no append.

mod format;

pub use format::{HEADER_LEN, MAGIC};

use crate::error::TableError;

/// A single beam displacement, stored as the format's signed 16-bit pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Vector {
    pub dx: i16,
    pub dy: i16,
}

/// One frame slot: the vectors traced for that frame, in beam order.
#[derive(Debug, Clone, Default)]
pub struct Frame {
    vectors: Vec<Vector>,
}

impl Frame {
    /// Number of vectors recorded for this frame.
    ///
    /// Fits in `u32` because every write path rejects longer lists.
    pub fn vector_count(&self) -> u32 {
        self.vectors.len() as u32
    }

    /// The recorded vectors, in the order the beam draws them.
    pub fn vectors(&self) -> &[Vector] {
        &self.vectors
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }
}

/// Fixed-capacity table of per-frame vector lists plus two playback scalars.
///
/// `brightness` and `speed` are carried verbatim into the file header for the
/// downstream renderer; the converter itself never interprets them. Both
/// default to `1.0` and are set by plain field assignment.
#[derive(Debug, Clone)]
pub struct VectorTable {
    frame_count: u32,
    /// Beam brightness scale for the downstream renderer.
    pub brightness: f32,
    /// Playback speed scale for the downstream renderer.
    pub speed: f32,
    frames: Vec<Frame>,
}

impl VectorTable {
    /// Create a table with `frame_count` empty frame slots.
    ///
    /// Fails only if the slot array cannot be allocated; nothing is leaked
    /// in that case.
    pub fn new(frame_count: u32) -> Result<Self, TableError> {
        let slots = frame_count as usize;
        let mut frames = Vec::new();
        frames.try_reserve_exact(slots)?;
        frames.resize_with(slots, Frame::default);

        Ok(Self {
            frame_count,
            brightness: 1.0,
            speed: 1.0,
            frames,
        })
    }

    /// Number of frame slots, fixed at construction.
    pub fn frame_count(&self) -> u32 {
        self.frame_count
    }

    /// Read access to one frame slot, or `None` past the end.
    pub fn frame(&self, frame_index: u32) -> Option<&Frame> {
        self.frames.get(frame_index as usize)
    }

    /// Iterate over all frame slots in index order.
    pub fn frames(&self) -> impl Iterator<Item = &Frame> {
        self.frames.iter()
    }

    /// Total vectors recorded across all frames.
    pub fn total_vectors(&self) -> u64 {
        self.frames.iter().map(|f| f.vectors.len() as u64).sum()
    }

    /// Replace the vector list of frame `frame_index` with the deltas given
    /// as parallel `dx`/`dy` arrays.
    ///
    /// Deltas are narrowed to 16 bits by truncation, the same wrap-around a
    /// plain integer cast gives: `32768` records as `-32768`, `-32769` as
    /// `32767`. Callers producing wider movements keep the wrapped values.
    ///
    /// Argument errors (bad index, mismatched array lengths, more vectors
    /// than the format can count) leave the table untouched. An allocation
    /// failure leaves the slot empty, never with stale contents.
    pub fn record_frame(
        &mut self,
        frame_index: u32,
        dx: &[i32],
        dy: &[i32],
    ) -> Result<(), TableError> {
        if frame_index >= self.frame_count {
            return Err(TableError::FrameIndexOutOfRange {
                index: frame_index,
                frame_count: self.frame_count,
            });
        }
        if dx.len() != dy.len() {
            return Err(TableError::MismatchedDeltas {
                dx_len: dx.len(),
                dy_len: dy.len(),
            });
        }
        if u32::try_from(dx.len()).is_err() {
            return Err(TableError::TooManyVectors { count: dx.len() });
        }

        // The previous buffer is released before the replacement is built:
        // if the allocation below fails the slot must read as empty, not
        // keep its old contents.
        let frame = &mut self.frames[frame_index as usize];
        frame.vectors = Vec::new();

        if dx.is_empty() {
            return Ok(());
        }

        let mut vectors = Vec::new();
        vectors.try_reserve_exact(dx.len())?;
        vectors.extend(dx.iter().zip(dy).map(|(&x, &y)| Vector {
            dx: x as i16,
            dy: y as i16,
        }));
        frame.vectors = vectors;

        Ok(())
    }
}
