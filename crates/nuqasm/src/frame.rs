//! Stack of open source files.
//!
//! `include` pushes the included file's lines; when the top frame runs out
//! the translator pops it and carries on with the frame underneath.

/// One open file: its index in the unit's file list, its lines and a cursor.
#[derive(Debug, Clone)]
pub struct SourceFrame {
    file: usize,
    lines: Vec<String>,
    cursor: usize,
}

impl SourceFrame {
    pub fn new(file: usize, lines: Vec<String>) -> Self {
        Self {
            file,
            lines,
            cursor: 0,
        }
    }

    pub fn file(&self) -> usize {
        self.file
    }

    /// Lines already handed out.
    pub fn consumed(&self) -> usize {
        self.cursor
    }

    pub fn is_exhausted(&self) -> bool {
        self.cursor >= self.lines.len()
    }
}

/// What [`FrameStack::next`] yields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameItem {
    /// A line of the active frame, `number` is 1-based.
    Line {
        file: usize,
        number: usize,
        text: String,
    },
    /// The active frame has no more lines.
    EndOfFrame { file: usize },
}

/// The stack of open frames. The active frame is the top.
#[derive(Debug, Default)]
pub struct FrameStack {
    frames: Vec<SourceFrame>,
    max_depth: usize,
}

impl FrameStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, file: usize, lines: Vec<String>) {
        self.frames.push(SourceFrame::new(file, lines));
        self.max_depth = self.max_depth.max(self.frames.len());
    }

    pub fn pop(&mut self) -> Option<SourceFrame> {
        self.frames.pop()
    }

    /// Next line of the active frame. `None` only when no frame is open.
    pub fn next(&mut self) -> Option<FrameItem> {
        let frame = self.frames.last_mut()?;
        if frame.is_exhausted() {
            return Some(FrameItem::EndOfFrame { file: frame.file });
        }
        let text = frame.lines[frame.cursor].clone();
        frame.cursor += 1;
        Some(FrameItem::Line {
            file: frame.file,
            number: frame.cursor,
            text,
        })
    }

    /// Look `n` lines ahead in the active frame without consuming.
    pub fn peek_line(&self, n: usize) -> Option<&str> {
        let frame = self.frames.last()?;
        frame.lines.get(frame.cursor + n).map(String::as_str)
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Deepest nesting seen so far.
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Whether the file is currently open on any frame.
    pub fn is_open(&self, file: usize) -> bool {
        self.frames.iter().any(|f| f.file == file)
    }

    /// The active frame.
    pub fn active(&self) -> Option<&SourceFrame> {
        self.frames.last()
    }
}
