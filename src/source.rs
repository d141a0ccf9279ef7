//! Source buffers and locations.
//!
//! The front-end never touches the filesystem: callers hand in
//! `(file name, text)` pairs and get back a `FileId` per buffer. Spans are
//! byte ranges into a buffer; line/column recovery is done lazily and only
//! for diagnostics.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FileId(pub(crate) u32);

impl FileId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A byte range inside one source buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub file: FileId,
    pub start: u32,
    pub end: u32,
}

impl Span {
    pub fn new(file: FileId, start: usize, end: usize) -> Self {
        Span {
            file,
            start: start as u32,
            end: end as u32,
        }
    }

    /// Span covering both `self` and `other`. Files must match.
    pub fn to(self, other: Span) -> Span {
        Span {
            file: self.file,
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    pub fn len(&self) -> usize {
        (self.end - self.start) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// One immutable UTF-8 source buffer.
pub struct SourceBuffer {
    id: FileId,
    name: String,
    text: String,
    /// Byte offset of the first character of every line.
    line_starts: Vec<u32>,
}

impl SourceBuffer {
    fn new(id: FileId, name: String, text: String) -> Self {
        let mut line_starts = vec![0u32];
        for (i, b) in text.bytes().enumerate() {
            if b == b'\n' {
                line_starts.push(i as u32 + 1);
            }
        }
        SourceBuffer {
            id,
            name,
            text,
            line_starts,
        }
    }

    pub fn id(&self) -> FileId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// (line, column) of a byte offset, both 1-based.
    pub fn line_col(&self, offset: u32) -> (u32, u32) {
        let line = match self.line_starts.binary_search(&offset) {
            Ok(i) => i,
            Err(i) => i - 1,
        };
        let col = offset - self.line_starts[line];
        (line as u32 + 1, col + 1)
    }

    /// The full text of a 1-based line, without its trailing newline.
    pub fn line_text(&self, line: u32) -> &str {
        let i = (line - 1) as usize;
        let start = self.line_starts[i] as usize;
        let end = self
            .line_starts
            .get(i + 1)
            .map(|&s| s as usize)
            .unwrap_or(self.text.len());
        self.text[start..end].trim_end_matches(['\n', '\r'])
    }
}

/// All buffers of one compilation job, keyed by `FileId`.
#[derive(Default)]
pub struct SourceMap {
    files: Vec<SourceBuffer>,
}

impl SourceMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, name: impl Into<String>, text: impl Into<String>) -> FileId {
        let id = FileId(self.files.len() as u32);
        self.files.push(SourceBuffer::new(id, name.into(), text.into()));
        id
    }

    pub fn get(&self, id: FileId) -> &SourceBuffer {
        &self.files[id.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = &SourceBuffer> {
        self.files.iter()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_col_of_first_byte() {
        let mut map = SourceMap::new();
        let id = map.add("a.vela", "int x\nint y\n");
        assert_eq!(map.get(id).line_col(0), (1, 1));
    }

    #[test]
    fn line_col_after_newline() {
        let mut map = SourceMap::new();
        let id = map.add("a.vela", "int x\nint y\n");
        assert_eq!(map.get(id).line_col(6), (2, 1));
        assert_eq!(map.get(id).line_col(10), (2, 5));
    }

    #[test]
    fn line_text_strips_newline() {
        let mut map = SourceMap::new();
        let id = map.add("a.vela", "first\nsecond\n");
        assert_eq!(map.get(id).line_text(1), "first");
        assert_eq!(map.get(id).line_text(2), "second");
    }

    #[test]
    fn line_text_of_last_line_without_newline() {
        let mut map = SourceMap::new();
        let id = map.add("a.vela", "only");
        assert_eq!(map.get(id).line_text(1), "only");
    }

    #[test]
    fn span_join() {
        let file = FileId(0);
        let a = Span::new(file, 2, 5);
        let b = Span::new(file, 8, 11);
        assert_eq!(a.to(b), Span::new(file, 2, 11));
    }

    #[test]
    fn file_ids_are_dense() {
        let mut map = SourceMap::new();
        let a = map.add("a", "");
        let b = map.add("b", "");
        assert_eq!(a.index(), 0);
        assert_eq!(b.index(), 1);
    }
}
