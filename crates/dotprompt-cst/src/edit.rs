//! Source edits and the map from new offsets back to old ones.

/// One replacement in the source: bytes `start_byte..old_end_byte` of the
/// previous text became `start_byte..new_end_byte` of the new text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InputEdit {
    pub start_byte: u32,
    pub old_end_byte: u32,
    pub new_end_byte: u32,
}

impl InputEdit {
    pub fn new(start_byte: u32, old_end_byte: u32, new_end_byte: u32) -> Self {
        Self {
            start_byte,
            old_end_byte: old_end_byte.max(start_byte),
            new_end_byte: new_end_byte.max(start_byte),
        }
    }

    /// The single edit that turns `old` into `new`, trimming the common
    /// prefix and suffix.
    pub fn between(old: &str, new: &str) -> Self {
        let (old, new) = (old.as_bytes(), new.as_bytes());
        let prefix = old.iter().zip(new).take_while(|(a, b)| a == b).count();
        let suffix = old[prefix..]
            .iter()
            .rev()
            .zip(new[prefix..].iter().rev())
            .take_while(|(a, b)| a == b)
            .count();
        Self::new(
            prefix as u32,
            (old.len() - suffix) as u32,
            (new.len() - suffix) as u32,
        )
    }

    /// Bytes added (positive) or removed (negative).
    pub fn delta(&self) -> i64 {
        self.new_end_byte as i64 - self.old_end_byte as i64
    }
}

/// Where a clean stretch of the new text came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CleanRun {
    /// Old offset of the queried new offset.
    pub old_start: u32,
    /// Clean bytes from the queried offset on; `None` runs to the end.
    pub len: Option<u32>,
}

impl CleanRun {
    /// Whether `bytes` bytes from the queried offset are all clean.
    pub fn covers(&self, bytes: u32) -> bool {
        self.len.is_none_or(|len| bytes <= len)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Segment {
    new_start: u32,
    /// `None` for the open-ended tail.
    new_end: Option<u32>,
    /// `None` for inserted text.
    old_start: Option<u32>,
}

impl Segment {
    fn end(&self) -> u64 {
        self.new_end.map_or(u64::MAX, u64::from)
    }
}

/// Segments of the new text, each either unchanged (with its old offset)
/// or rewritten. Built by folding edits in order, each expressed against
/// the text the previous ones produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditMap {
    segments: Vec<Segment>,
}

impl Default for EditMap {
    fn default() -> Self {
        Self {
            segments: vec![Segment {
                new_start: 0,
                new_end: None,
                old_start: Some(0),
            }],
        }
    }
}

impl EditMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_edits(edits: &[InputEdit]) -> Self {
        let mut map = Self::new();
        for edit in edits {
            map.apply(edit);
        }
        map
    }

    /// Fold one more edit into the map.
    pub fn apply(&mut self, edit: &InputEdit) {
        let start = edit.start_byte as u64;
        let old_end = edit.old_end_byte.max(edit.start_byte) as u64;
        let new_end = edit.new_end_byte.max(edit.start_byte) as u64;
        // Only applied to offsets at or past `old_end`.
        let shift = |offset: u64| (offset + new_end - old_end) as u32;

        let mut segments = Vec::with_capacity(self.segments.len() + 2);
        let mut inserted = false;
        for seg in &self.segments {
            let (s, e) = (seg.new_start as u64, seg.end());
            // Part before the edit.
            if s < start {
                segments.push(Segment {
                    new_start: seg.new_start,
                    new_end: Some(e.min(start) as u32),
                    old_start: seg.old_start,
                });
                if e <= start {
                    continue;
                }
            }
            if !inserted && e > start {
                if new_end > start {
                    segments.push(Segment {
                        new_start: start as u32,
                        new_end: Some(new_end as u32),
                        old_start: None,
                    });
                }
                inserted = true;
            }
            // Part after the edit, moved by the size change.
            if e > old_end {
                let from = s.max(old_end);
                segments.push(Segment {
                    new_start: shift(from),
                    new_end: seg.new_end.map(|end| shift(end as u64)),
                    old_start: seg.old_start.map(|old| old + (from - s) as u32),
                });
            }
        }
        if !inserted && new_end > start {
            segments.push(Segment {
                new_start: start as u32,
                new_end: Some(new_end as u32),
                old_start: None,
            });
        }
        self.segments = merge(segments);
    }

    /// The clean run containing new offset `offset`, if it is unchanged.
    pub fn map_to_old(&self, offset: u32) -> Option<CleanRun> {
        let index = self.segments.partition_point(|seg| seg.new_start <= offset).checked_sub(1)?;
        let seg = self.segments[index];
        if (offset as u64) >= seg.end() {
            return None;
        }
        let old = seg.old_start?;
        Some(CleanRun {
            old_start: old + (offset - seg.new_start),
            len: seg.new_end.map(|end| end - offset),
        })
    }

    /// Whether no edit has been folded in.
    pub fn is_identity(&self) -> bool {
        self.segments.len() == 1 && self.segments[0].old_start == Some(0)
    }
}

/// Join neighbours that continue each other and drop empty segments.
fn merge(segments: Vec<Segment>) -> Vec<Segment> {
    let mut merged: Vec<Segment> = Vec::with_capacity(segments.len());
    for seg in segments {
        if seg.new_end == Some(seg.new_start) {
            continue;
        }
        if let Some(last) = merged.last_mut() {
            let adjacent = last.new_end == Some(seg.new_start);
            let continues = match (last.old_start, seg.old_start) {
                (None, None) => true,
                (Some(a), Some(b)) => a + (seg.new_start - last.new_start) == b,
                _ => false,
            };
            if adjacent && continues {
                last.new_end = seg.new_end;
                continue;
            }
        }
        merged.push(seg);
    }
    merged
}
