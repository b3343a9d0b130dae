use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;

/// Which of the three playground sources a buffer holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BufferKind {
    /// HTML markup, rendered as passive content
    Markup,
    /// CSS styling, rendered as passive content
    Style,
    /// JavaScript, the only executable content
    Script,
}

impl BufferKind {
    /// All kinds, in tab order
    pub const ALL: [BufferKind; 3] = [BufferKind::Markup, BufferKind::Style, BufferKind::Script];

    pub fn as_str(&self) -> &'static str {
        match self {
            BufferKind::Markup => "html",
            BufferKind::Style => "css",
            BufferKind::Script => "js",
        }
    }

    fn index(self) -> usize {
        match self {
            BufferKind::Markup => 0,
            BufferKind::Style => 1,
            BufferKind::Script => 2,
        }
    }
}

impl fmt::Display for BufferKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single editable source buffer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Buffer {
    kind: BufferKind,
    text: String,
}

impl Buffer {
    pub fn new(kind: BufferKind) -> Self {
        Self {
            kind,
            text: String::new(),
        }
    }

    pub fn kind(&self) -> BufferKind {
        self.kind
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Whether `position` is a valid cursor offset (in bounds and on a char boundary)
    pub fn is_valid_position(&self, position: usize) -> bool {
        self.text.is_char_boundary(position)
    }

    /// Insert text at a byte offset. Returns false (and leaves the buffer
    /// untouched) if the offset is not a valid position.
    pub fn insert(&mut self, position: usize, text: &str) -> bool {
        if !self.is_valid_position(position) {
            return false;
        }
        self.text.insert_str(position, text);
        true
    }

    /// Delete a byte range. Returns the removed text, or None if the range is invalid.
    pub fn delete(&mut self, range: Range<usize>) -> Option<String> {
        if range.start > range.end
            || !self.is_valid_position(range.start)
            || !self.is_valid_position(range.end)
        {
            return None;
        }
        Some(self.text.drain(range).collect())
    }

    /// Get the text in a byte range, if valid
    pub fn slice(&self, range: Range<usize>) -> Option<&str> {
        self.text.get(range)
    }

    /// Replace the whole contents (snippet application, project load)
    pub fn replace(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }
}

/// The three buffers of a playground, exactly one per kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BufferSet {
    buffers: [Buffer; 3],
}

impl BufferSet {
    pub fn new() -> Self {
        Self {
            buffers: BufferKind::ALL.map(Buffer::new),
        }
    }

    /// Build a buffer set from the three source texts
    pub fn from_sources(
        markup: impl Into<String>,
        style: impl Into<String>,
        script: impl Into<String>,
    ) -> Self {
        let mut set = Self::new();
        set.get_mut(BufferKind::Markup).replace(markup);
        set.get_mut(BufferKind::Style).replace(style);
        set.get_mut(BufferKind::Script).replace(script);
        set
    }

    pub fn get(&self, kind: BufferKind) -> &Buffer {
        &self.buffers[kind.index()]
    }

    pub fn get_mut(&mut self, kind: BufferKind) -> &mut Buffer {
        &mut self.buffers[kind.index()]
    }

    pub fn markup(&self) -> &str {
        self.get(BufferKind::Markup).text()
    }

    pub fn style(&self) -> &str {
        self.get(BufferKind::Style).text()
    }

    pub fn script(&self) -> &str {
        self.get(BufferKind::Script).text()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Buffer> {
        self.buffers.iter()
    }
}

impl Default for BufferSet {
    fn default() -> Self {
        Self::new()
    }
}
