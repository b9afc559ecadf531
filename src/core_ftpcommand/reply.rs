use std::fmt;

/// A structured FTP reply.
///
/// Single-line replies render as `<code> <text>\r\n`. A multi-line reply
/// renders as `<code>-<text>\r\n`, its continuation lines verbatim, and a
/// closing `<code> End\r\n`. An opened reply stops after the header so the
/// caller can stream the body and the final line later.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    code: u16,
    text: String,
    lines: Vec<String>,
    kind: ReplyKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReplyKind {
    Single,
    Multi,
    Open,
}

impl Reply {
    pub fn new(code: u16, text: impl Into<String>) -> Self {
        Self {
            code,
            text: text.into(),
            lines: Vec::new(),
            kind: ReplyKind::Single,
        }
    }

    pub fn multi(code: u16, header: impl Into<String>) -> Self {
        Self {
            kind: ReplyKind::Multi,
            ..Self::new(code, header)
        }
    }

    pub fn open(code: u16, header: impl Into<String>) -> Self {
        Self {
            kind: ReplyKind::Open,
            ..Self::new(code, header)
        }
    }

    /// Appends a continuation line. Callers supply the leading space.
    pub fn line(mut self, line: impl Into<String>) -> Self {
        self.lines.push(line.into());
        self
    }

    pub fn code(&self) -> u16 {
        self.code
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            ReplyKind::Single => write!(f, "{} {}\r\n", self.code, self.text),
            ReplyKind::Multi | ReplyKind::Open => {
                write!(f, "{}-{}\r\n", self.code, self.text)?;
                for line in &self.lines {
                    write!(f, "{}\r\n", line)?;
                }
                if self.kind == ReplyKind::Multi {
                    write!(f, "{} End\r\n", self.code)?;
                }
                Ok(())
            }
        }
    }
}
