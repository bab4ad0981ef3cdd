//! Frame splitting for delimiter-framed byte streams.
//!
//! A capture is a sequence of frames separated by [`FLAG`] (0x7E) bytes:
//!
//! ```text
//! .. junk .. 7E <frame 1> 7E <frame 2> 7E 7E <frame 3> 7E <tail>
//! ```
//!
//! Splitting rules:
//!
//! - Bytes before the first delimiter are discarded.
//! - Consecutive delimiters never produce an empty frame.
//! - A trailing run of bytes with no closing delimiter is not a frame. It is
//!   exposed through [`FrameIterator::remainder`] so callers can report a
//!   truncated capture.
//!
//! Frames are still escaped: because the delimiter never appears inside an
//! escaped payload, each frame is a contiguous slice of the raw stream and
//! [`FrameIterator`] yields borrowed slices without copying.
//!
//! # Example
//!
//! ```
//! use hdlc_speed::framing::split_frames;
//!
//! let raw = [0x7E, 0x01, 0x02, 0x7E, 0x7E, 0x03, 0x7E];
//! assert_eq!(split_frames(&raw), vec![vec![0x01, 0x02], vec![0x03]]);
//! ```

/// Frame delimiter byte.
pub const FLAG: u8 = 0x7E;

/// Iterator over the escaped frames of a raw byte stream.
///
/// Yields each non-empty run of bytes enclosed by two delimiters, in stream
/// order.
#[derive(Debug, Clone)]
pub struct FrameIterator<'a> {
    /// Unconsumed input, always starting right after a delimiter once the
    /// first delimiter has been found.
    rest: &'a [u8],
    /// Whether a delimiter has been seen yet.
    inside: bool,
}

impl<'a> FrameIterator<'a> {
    /// Creates a frame iterator over a raw byte stream.
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        FrameIterator {
            rest: data,
            inside: false,
        }
    }

    /// Returns the bytes that follow the last delimiter consumed so far.
    ///
    /// After the iterator is exhausted this is the unterminated tail of the
    /// stream, which is never yielded as a frame. It is empty when the
    /// stream ends with a delimiter, and also empty when the stream contains
    /// no delimiter at all (there is no frame in progress).
    #[must_use]
    pub fn remainder(&self) -> &'a [u8] {
        if self.inside {
            self.rest
        } else {
            &[]
        }
    }
}

impl<'a> Iterator for FrameIterator<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<Self::Item> {
        if !self.inside {
            let start = self.rest.iter().position(|&b| b == FLAG)?;
            self.rest = &self.rest[start + 1..];
            self.inside = true;
        }

        loop {
            let end = self.rest.iter().position(|&b| b == FLAG)?;
            let frame = &self.rest[..end];
            self.rest = &self.rest[end + 1..];
            if !frame.is_empty() {
                return Some(frame);
            }
        }
    }
}

/// Splits a raw byte stream into owned escaped frames.
///
/// The unterminated tail, if any, is dropped. Use
/// [`split_frames_with_tail`] to observe it.
#[must_use]
pub fn split_frames(data: &[u8]) -> Vec<Vec<u8>> {
    FrameIterator::new(data).map(<[u8]>::to_vec).collect()
}

/// Splits a raw byte stream and also returns the unterminated tail.
///
/// The tail is `None` when the stream ends on a delimiter or never enters
/// a frame.
///
/// # Example
///
/// ```
/// use hdlc_speed::framing::split_frames_with_tail;
///
/// let (frames, tail) = split_frames_with_tail(&[0x7E, 0x01, 0x7E, 0x02, 0x03]);
/// assert_eq!(frames, vec![&[0x01][..]]);
/// assert_eq!(tail, Some(&[0x02, 0x03][..]));
/// ```
#[must_use]
pub fn split_frames_with_tail(data: &[u8]) -> (Vec<&[u8]>, Option<&[u8]>) {
    let mut iter = FrameIterator::new(data);
    let frames: Vec<&[u8]> = iter.by_ref().collect();
    let tail = iter.remainder();
    (frames, (!tail.is_empty()).then_some(tail))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_doubled_delimiter() {
        let raw = [0x7E, 0x01, 0x02, 0x7E, 0x7E, 0x03, 0x7E];
        assert_eq!(split_frames(&raw), vec![vec![0x01, 0x02], vec![0x03]]);
    }

    #[test]
    fn test_split_shared_delimiter() {
        // A single delimiter both closes one frame and opens the next
        let raw = [0x7E, 0x01, 0x7E, 0x02, 0x7E];
        assert_eq!(split_frames(&raw), vec![vec![0x01], vec![0x02]]);
    }

    #[test]
    fn test_split_discards_leading_bytes() {
        let raw = [0xAA, 0xBB, 0x7E, 0x01, 0x7E];
        assert_eq!(split_frames(&raw), vec![vec![0x01]]);
    }

    #[test]
    fn test_split_drops_unterminated_tail() {
        let raw = [0x7E, 0x01, 0x7E, 0x02, 0x03];
        assert_eq!(split_frames(&raw), vec![vec![0x01]]);
    }

    #[test]
    fn test_split_only_delimiters() {
        assert!(split_frames(&[0x7E, 0x7E, 0x7E]).is_empty());
    }

    #[test]
    fn test_split_no_delimiter() {
        let (frames, tail) = split_frames_with_tail(&[0x01, 0x02]);
        assert!(frames.is_empty());
        assert_eq!(tail, None);
    }

    #[test]
    fn test_split_empty_input() {
        assert!(split_frames(&[]).is_empty());
    }

    #[test]
    fn test_split_escape_bytes_stay_in_frame() {
        let raw = [0x7E, 0x7D, 0x5E, 0x7D, 0x5D, 0x7E];
        assert_eq!(split_frames(&raw), vec![vec![0x7D, 0x5E, 0x7D, 0x5D]]);
    }

    #[test]
    fn test_frames_never_empty() {
        let raw = [
            0x00, 0x7E, 0x7E, 0x01, 0x7E, 0x7E, 0x7E, 0x02, 0x03, 0x7E, 0x7E, 0x04,
        ];
        let frames = split_frames(&raw);
        assert_eq!(frames.len(), 2);
        assert!(frames.iter().all(|f| !f.is_empty()));
    }

    #[test]
    fn test_tail_reported() {
        let (frames, tail) = split_frames_with_tail(&[0x7E, 0x01, 0x7E, 0x09]);
        assert_eq!(frames, vec![&[0x01][..]]);
        assert_eq!(tail, Some(&[0x09][..]));

        let (_, tail) = split_frames_with_tail(&[0x7E, 0x01, 0x7E]);
        assert_eq!(tail, None);
    }

    #[test]
    fn test_iterator_remainder_before_exhaustion() {
        let raw = [0x7E, 0x01, 0x7E, 0x02, 0x7E];
        let mut iter = FrameIterator::new(&raw);
        assert_eq!(iter.remainder(), &[] as &[u8]);
        assert_eq!(iter.next(), Some(&[0x01][..]));
        assert_eq!(iter.remainder(), &[0x02, 0x7E]);
        assert_eq!(iter.next(), Some(&[0x02][..]));
        assert_eq!(iter.next(), None);
        assert_eq!(iter.remainder(), &[] as &[u8]);
    }
}
