//! Line-preserving PO file model
//!
//! Only the parts the translator reads or writes are interpreted: `msgctxt`, `msgid`,
//! `msgid_plural`, `msgstr` / `msgstr[N]` and the `#,` flags comment. Everything else (the
//! header entry, translator and extracted comments, references, `#|` previous strings, `#~`
//! obsolete entries, blank lines) is kept as the exact lines it was read from. Rendering a
//! document nobody edited gives back the input byte for byte; editing a message only rewrites
//! its `msgstr` lines and its flags line.

use std::ops::Range;

/// A malformed line, 1-based
#[derive(Debug, thiserror::Error)]
#[error("line {line}: {message}")]
pub struct SyntaxError {
    pub line: usize,
    pub message: String,
}

impl SyntaxError {
    fn new(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }
}

/// A live (non-header, non-obsolete) message together with its raw lines
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoMessage {
    pub msgctxt: Option<String>,
    pub msgid: String,
    pub msgid_plural: Option<String>,
    /// Singular translation; empty for plural messages
    pub msgstr: String,
    /// `msgstr[N]` values, by index
    pub msgstr_plural: Vec<String>,
    pub flags: Vec<String>,
    lines: Vec<String>,
    /// Index in `lines` of the `#,` comment
    flags_line: Option<usize>,
    /// Lines in `lines` holding the singular `msgstr` and its continuations
    msgstr_lines: Option<Range<usize>>,
}

impl PoMessage {
    pub fn is_plural(&self) -> bool {
        self.msgid_plural.is_some()
    }

    pub fn is_fuzzy(&self) -> bool {
        self.has_flag("fuzzy")
    }

    pub fn has_flag(&self, flag: &str) -> bool {
        self.flags.iter().any(|f| f == flag)
    }

    /// Every form carries a non-empty translation
    pub fn is_translated(&self) -> bool {
        if self.is_plural() {
            !self.msgstr_plural.is_empty() && self.msgstr_plural.iter().all(|s| !s.is_empty())
        } else {
            !self.msgstr.is_empty()
        }
    }

    /// Replace the singular translation
    pub fn set_msgstr(&mut self, msgstr: String) -> Result<(), String> {
        if self.is_plural() {
            return Err("plural message has no singular msgstr".to_string());
        }
        let Some(range) = self.msgstr_lines.clone() else {
            return Err("message has no msgstr".to_string());
        };

        let rendered = render_field("msgstr", &msgstr);
        let new_len = rendered.len();
        self.lines.splice(range.clone(), rendered);
        self.msgstr_lines = Some(range.start..range.start + new_len);

        if let Some(flags_line) = self.flags_line.as_mut() {
            if *flags_line >= range.end {
                *flags_line = *flags_line + new_len - range.len();
            }
        }

        self.msgstr = msgstr;
        Ok(())
    }

    /// Drop `flag`; the `#,` line disappears with its last flag
    pub fn remove_flag(&mut self, flag: &str) {
        if !self.has_flag(flag) {
            return;
        }
        self.flags.retain(|f| f != flag);

        let Some(index) = self.flags_line else {
            return;
        };
        if !self.flags.is_empty() {
            self.lines[index] = format!("#, {}", self.flags.join(", "));
            return;
        }

        self.lines.remove(index);
        self.flags_line = None;
        if let Some(range) = self.msgstr_lines.as_mut() {
            if range.start > index {
                *range = range.start - 1..range.end - 1;
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    /// Lines kept as read: blank lines, comment-only blocks, the header entry
    Verbatim(Vec<String>),
    Message(PoMessage),
}

impl Segment {
    fn lines(&self) -> &[String] {
        match self {
            Segment::Verbatim(lines) => lines,
            Segment::Message(message) => &message.lines,
        }
    }
}

/// A parsed PO file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoDocument {
    segments: Vec<Segment>,
    newline: &'static str,
    trailing_newline: bool,
}

impl PoDocument {
    pub fn parse(text: &str) -> Result<Self, SyntaxError> {
        let mut segments = Vec::new();
        let mut pending: Vec<(usize, &str)> = Vec::new();
        let mut seen_msgstr = false;

        for (index, line) in text.lines().enumerate() {
            let trimmed = line.trim();

            if trimmed.is_empty() {
                flush_entry(&mut pending, &mut segments)?;
                segments.push(Segment::Verbatim(vec![line.to_string()]));
                seen_msgstr = false;
                continue;
            }

            // A comment or a new msgctxt/msgid after a msgstr opens the next entry
            let opens_entry = trimmed.starts_with('#')
                || trimmed.starts_with("msgctxt")
                || trimmed.starts_with("msgid");
            if seen_msgstr && opens_entry {
                flush_entry(&mut pending, &mut segments)?;
                seen_msgstr = false;
            }
            if trimmed.starts_with("msgstr") {
                seen_msgstr = true;
            }

            pending.push((index + 1, line));
        }
        flush_entry(&mut pending, &mut segments)?;

        Ok(Self {
            segments,
            newline: if text.contains("\r\n") { "\r\n" } else { "\n" },
            trailing_newline: text.ends_with('\n'),
        })
    }

    /// Messages in file order, header and obsolete entries excluded
    pub fn messages(&self) -> impl Iterator<Item = &PoMessage> {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Message(message) => Some(message),
            Segment::Verbatim(_) => None,
        })
    }

    pub fn message_mut(&mut self, index: usize) -> Option<&mut PoMessage> {
        self.segments
            .iter_mut()
            .filter_map(|segment| match segment {
                Segment::Message(message) => Some(message),
                Segment::Verbatim(_) => None,
            })
            .nth(index)
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        let mut lines = self.segments.iter().flat_map(|s| s.lines().iter());

        if let Some(first) = lines.next() {
            out.push_str(first);
            for line in lines {
                out.push_str(self.newline);
                out.push_str(line);
            }
        }
        if self.trailing_newline {
            out.push_str(self.newline);
        }

        out
    }
}

fn flush_entry(
    pending: &mut Vec<(usize, &str)>,
    segments: &mut Vec<Segment>,
) -> Result<(), SyntaxError> {
    if pending.is_empty() {
        return Ok(());
    }
    let lines = std::mem::take(pending);

    let has_keyword = lines.iter().any(|(_, line)| !line.trim().starts_with('#'));
    if !has_keyword {
        segments.push(Segment::Verbatim(
            lines.into_iter().map(|(_, l)| l.to_string()).collect(),
        ));
        return Ok(());
    }

    let message = parse_message(&lines)?;
    if message.msgid.is_empty() && message.msgctxt.is_none() {
        // header entry
        segments.push(Segment::Verbatim(message.lines));
    } else {
        segments.push(Segment::Message(message));
    }

    Ok(())
}

#[derive(Clone, Copy)]
enum Field {
    Context,
    Id,
    IdPlural,
    Str,
    StrPlural(usize),
}

fn parse_message(lines: &[(usize, &str)]) -> Result<PoMessage, SyntaxError> {
    let first_line = lines.first().map(|(n, _)| *n).unwrap_or_default();

    let mut msgctxt = None;
    let mut msgid = None;
    let mut msgid_plural = None;
    let mut msgstr = None;
    let mut msgstr_plural: Vec<String> = Vec::new();
    let mut flags = Vec::new();
    let mut flags_line = None;
    let mut msgstr_lines: Option<Range<usize>> = None;
    let mut current: Option<Field> = None;

    for (pos, (line_no, raw)) in lines.iter().enumerate() {
        let line_no = *line_no;
        let trimmed = raw.trim();

        if trimmed.starts_with('#') {
            if let Some(rest) = trimmed.strip_prefix("#,") {
                flags = rest
                    .split(',')
                    .map(str::trim)
                    .filter(|f| !f.is_empty())
                    .map(str::to_string)
                    .collect();
                flags_line = Some(pos);
            }
            current = None;
            continue;
        }

        if trimmed.starts_with('"') {
            let chunk = unquote(trimmed).map_err(|e| SyntaxError::new(line_no, e))?;
            let target = match current {
                Some(Field::Context) => msgctxt.as_mut(),
                Some(Field::Id) => msgid.as_mut(),
                Some(Field::IdPlural) => msgid_plural.as_mut(),
                Some(Field::Str) => msgstr.as_mut(),
                Some(Field::StrPlural(n)) => msgstr_plural.get_mut(n),
                None => None,
            };
            let Some(target) = target else {
                return Err(SyntaxError::new(line_no, "string outside of a keyword"));
            };
            target.push_str(&chunk);
            if let (Some(Field::Str), Some(range)) = (current, msgstr_lines.as_mut()) {
                range.end = pos + 1;
            }
            continue;
        }

        let (keyword, rest) = trimmed
            .split_once(char::is_whitespace)
            .ok_or_else(|| SyntaxError::new(line_no, format!("expected a keyword and a string, got '{}'", trimmed)))?;
        let value = unquote(rest.trim()).map_err(|e| SyntaxError::new(line_no, e))?;

        current = Some(match keyword {
            "msgctxt" => {
                msgctxt = Some(value);
                Field::Context
            }
            "msgid" => {
                msgid = Some(value);
                Field::Id
            }
            "msgid_plural" => {
                msgid_plural = Some(value);
                Field::IdPlural
            }
            "msgstr" => {
                msgstr = Some(value);
                msgstr_lines = Some(pos..pos + 1);
                Field::Str
            }
            _ => {
                let index = keyword
                    .strip_prefix("msgstr[")
                    .and_then(|k| k.strip_suffix(']'))
                    .and_then(|n| n.parse::<usize>().ok())
                    .ok_or_else(|| {
                        SyntaxError::new(line_no, format!("unknown keyword '{}'", keyword))
                    })?;
                if msgstr_plural.len() <= index {
                    msgstr_plural.resize(index + 1, String::new());
                }
                msgstr_plural[index] = value;
                Field::StrPlural(index)
            }
        });
    }

    let msgid = msgid.ok_or_else(|| SyntaxError::new(first_line, "entry without msgid"))?;
    if msgstr.is_none() && msgstr_plural.is_empty() {
        return Err(SyntaxError::new(first_line, "entry without msgstr"));
    }

    Ok(PoMessage {
        msgctxt,
        msgid,
        msgid_plural,
        msgstr: msgstr.unwrap_or_default(),
        msgstr_plural,
        flags,
        lines: lines.iter().map(|(_, l)| l.to_string()).collect(),
        flags_line,
        msgstr_lines,
    })
}

fn unquote(quoted: &str) -> Result<String, String> {
    let inner = quoted
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .ok_or_else(|| format!("expected a quoted string, got '{}'", quoted))?;
    unescape(inner)
}

fn unescape(escaped: &str) -> Result<String, String> {
    let mut out = String::with_capacity(escaped.len());
    let mut chars = escaped.chars();

    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some('n') => out.push('\n'),
                Some('t') => out.push('\t'),
                Some('r') => out.push('\r'),
                Some('a') => out.push('\u{07}'),
                Some('b') => out.push('\u{08}'),
                Some('f') => out.push('\u{0C}'),
                Some('v') => out.push('\u{0B}'),
                Some('\\') => out.push('\\'),
                Some('"') => out.push('"'),
                Some(other) => return Err(format!("invalid escape sequence '\\{}'", other)),
                None => return Err("dangling backslash".to_string()),
            },
            '"' => return Err("unescaped quote inside string".to_string()),
            _ => out.push(c),
        }
    }

    Ok(out)
}

fn escape(unescaped: &str) -> String {
    let mut out = String::with_capacity(unescaped.len() + 8);
    for c in unescaped.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(c),
        }
    }
    out
}

/// `keyword "value"`, or the multi-line form split after each newline
fn render_field(keyword: &str, value: &str) -> Vec<String> {
    let pieces: Vec<&str> = value.split_inclusive('\n').collect();
    if pieces.len() <= 1 {
        return vec![format!("{} \"{}\"", keyword, escape(value))];
    }

    let mut lines = Vec::with_capacity(pieces.len() + 1);
    lines.push(format!("{} \"\"", keyword));
    lines.extend(pieces.into_iter().map(|p| format!("\"{}\"", escape(p))));
    lines
}
