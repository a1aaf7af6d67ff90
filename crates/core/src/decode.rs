// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Incremental decoding of raw job log bytes into embeddable HTML.
//!
//! Log output arrives in arbitrary byte ranges, so an ANSI escape sequence or
//! a multi-byte UTF-8 character may be split across two reads. The decoder
//! keeps the unfinished tail in `pending` and completes it on the next
//! [`LogDecoder::feed`]. Styling state (bold, colors) also carries across
//! calls.

const ESC: u8 = 0x1b;
const BEL: u8 = 0x07;

/// Unterminated escape sequences longer than this are discarded.
const MAX_ESCAPE_LEN: usize = 256;

const COLOR_NAMES: [&str; 16] = [
    "black",
    "red",
    "green",
    "yellow",
    "blue",
    "magenta",
    "cyan",
    "white",
    "bright-black",
    "bright-red",
    "bright-green",
    "bright-yellow",
    "bright-blue",
    "bright-magenta",
    "bright-cyan",
    "bright-white",
];

/// Text attributes set by SGR escape sequences.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Style {
    bold: bool,
    faint: bool,
    italic: bool,
    underline: bool,
    fg: Option<u8>,
    bg: Option<u8>,
}

impl Style {
    fn is_plain(&self) -> bool {
        *self == Style::default()
    }

    fn classes(&self) -> String {
        let mut classes = Vec::new();
        if self.bold {
            classes.push("ansi-bold".to_string());
        }
        if self.faint {
            classes.push("ansi-faint".to_string());
        }
        if self.italic {
            classes.push("ansi-italic".to_string());
        }
        if self.underline {
            classes.push("ansi-underline".to_string());
        }
        if let Some(fg) = self.fg {
            classes.push(format!("ansi-fg-{}", COLOR_NAMES[usize::from(fg)]));
        }
        if let Some(bg) = self.bg {
            classes.push(format!("ansi-bg-{}", COLOR_NAMES[usize::from(bg)]));
        }
        classes.join(" ")
    }

    /// Apply one SGR parameter list (`ESC [ ... m`).
    fn apply(&mut self, params: &[u16]) {
        if params.is_empty() {
            *self = Style::default();
            return;
        }
        let mut iter = params.iter().copied();
        while let Some(code) = iter.next() {
            match code {
                0 => *self = Style::default(),
                1 => self.bold = true,
                2 => self.faint = true,
                3 => self.italic = true,
                4 => self.underline = true,
                22 => {
                    self.bold = false;
                    self.faint = false;
                }
                23 => self.italic = false,
                24 => self.underline = false,
                30..=37 => self.fg = Some((code - 30) as u8),
                39 => self.fg = None,
                40..=47 => self.bg = Some((code - 40) as u8),
                49 => self.bg = None,
                90..=97 => self.fg = Some((code - 90 + 8) as u8),
                100..=107 => self.bg = Some((code - 100 + 8) as u8),
                38 | 48 => {
                    let color = extended_color(&mut iter);
                    if code == 38 {
                        self.fg = color.or(self.fg);
                    } else {
                        self.bg = color.or(self.bg);
                    }
                }
                _ => {}
            }
        }
    }
}

/// Consume the arguments of a `38`/`48` extended color. Only the 16 base
/// palette entries of `5;n` map to a class; other colors are dropped.
fn extended_color(iter: &mut impl Iterator<Item = u16>) -> Option<u8> {
    match iter.next()? {
        5 => iter.next().filter(|n| *n < 16).map(|n| n as u8),
        2 => {
            iter.next();
            iter.next();
            iter.next();
            None
        }
        _ => None,
    }
}

/// Outcome of scanning an escape sequence starting at `ESC`.
enum Scan {
    /// A complete sequence of `len` bytes; `sgr` holds its parameters when
    /// it sets text style.
    Sequence { len: usize, sgr: Option<Vec<u16>> },
    Incomplete,
}

fn scan_escape(data: &[u8]) -> Scan {
    match data.get(1) {
        None => Scan::Incomplete,
        Some(b'[') => scan_csi(data),
        Some(b']') => scan_osc(data),
        Some(0x20..=0x2f) => scan_designation(data),
        Some(0x30..=0x7e) => Scan::Sequence { len: 2, sgr: None },
        // Stray ESC: drop it alone so a following newline or character survives.
        Some(_) => Scan::Sequence { len: 1, sgr: None },
    }
}

/// `ESC`, intermediate bytes, then one final byte (e.g. `ESC ( B`).
fn scan_designation(data: &[u8]) -> Scan {
    match data.iter().skip(1).position(|b| !(0x20..=0x2f).contains(b)) {
        Some(p) => Scan::Sequence { len: p + 2, sgr: None },
        None => Scan::Incomplete,
    }
}

fn scan_csi(data: &[u8]) -> Scan {
    for (i, &b) in data.iter().enumerate().skip(2) {
        match b {
            0x20..=0x3f => {}
            0x40..=0x7e => {
                let sgr = (b == b'm').then(|| parse_params(&data[2..i]));
                return Scan::Sequence { len: i + 1, sgr };
            }
            // Malformed: drop what was scanned and resume at this byte.
            _ => return Scan::Sequence { len: i, sgr: None },
        }
    }
    Scan::Incomplete
}

/// Operating system commands (window titles, hyperlinks) end with BEL or `ESC \`.
fn scan_osc(data: &[u8]) -> Scan {
    let mut i = 2;
    while i < data.len() {
        match data[i] {
            BEL => return Scan::Sequence { len: i + 1, sgr: None },
            ESC => match data.get(i + 1) {
                Some(b'\\') => return Scan::Sequence { len: i + 2, sgr: None },
                Some(_) => return Scan::Sequence { len: i, sgr: None },
                None => return Scan::Incomplete,
            },
            _ => i += 1,
        }
    }
    Scan::Incomplete
}

fn parse_params(raw: &[u8]) -> Vec<u16> {
    raw.split(|b| *b == b';' || *b == b':')
        .map(|p| std::str::from_utf8(p).ok().and_then(|s| s.parse().ok()).unwrap_or(0))
        .collect()
}

/// Control bytes other than newline and tab are dropped from the output.
fn is_dropped_control(b: u8) -> bool {
    (b < 0x20 && b != b'\n' && b != b'\t') || b == 0x7f
}

fn escape_html_into(out: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
}

/// Stateful log-to-HTML decoder. One instance per log stream.
#[derive(Debug, Default)]
pub struct LogDecoder {
    /// Unfinished escape sequence or UTF-8 character from the previous feed.
    pending: Vec<u8>,
    style: Style,
    /// Style of the currently open `<span>`, if any.
    open: Option<Style>,
}

impl LogDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode the next range of log bytes.
    pub fn feed(&mut self, bytes: &[u8]) -> String {
        let mut data = std::mem::take(&mut self.pending);
        data.extend_from_slice(bytes);

        let mut out = String::with_capacity(data.len());
        let mut i = 0;
        while i < data.len() {
            let b = data[i];
            if b == ESC {
                match scan_escape(&data[i..]) {
                    Scan::Sequence { len, sgr } => {
                        if let Some(params) = sgr {
                            self.style.apply(&params);
                        }
                        i += len;
                    }
                    Scan::Incomplete if data.len() - i > MAX_ESCAPE_LEN => i += 1,
                    Scan::Incomplete => {
                        self.pending = data[i..].to_vec();
                        break;
                    }
                }
                continue;
            }
            if is_dropped_control(b) {
                i += 1;
                continue;
            }

            let run_end = data[i..]
                .iter()
                .position(|&b| b == ESC || is_dropped_control(b))
                .map_or(data.len(), |p| i + p);
            let run = &data[i..run_end];
            match std::str::from_utf8(run) {
                Ok(text) => {
                    self.push_text(&mut out, text);
                    i = run_end;
                }
                Err(e) => {
                    let valid = e.valid_up_to();
                    if let Ok(text) = std::str::from_utf8(&run[..valid]) {
                        self.push_text(&mut out, text);
                    }
                    match e.error_len() {
                        Some(bad) => {
                            self.push_text(&mut out, "\u{FFFD}");
                            i += valid + bad;
                        }
                        None if run_end == data.len() => {
                            self.pending = data[i + valid..].to_vec();
                            break;
                        }
                        None => {
                            self.push_text(&mut out, "\u{FFFD}");
                            i = run_end;
                        }
                    }
                }
            }
        }
        out
    }

    /// Flush the decoder at end of stream: a truncated character becomes
    /// U+FFFD, a truncated escape sequence is dropped, and any open span is
    /// closed. The decoder is reset for reuse.
    pub fn finish(&mut self) -> String {
        let mut out = String::new();
        let pending = std::mem::take(&mut self.pending);
        if !pending.is_empty() && pending[0] != ESC {
            self.push_text(&mut out, "\u{FFFD}");
        }
        if self.open.take().is_some() {
            out.push_str("</span>");
        }
        self.style = Style::default();
        out
    }

    fn push_text(&mut self, out: &mut String, text: &str) {
        if text.is_empty() {
            return;
        }
        if self.open != Some(self.style) && !(self.open.is_none() && self.style.is_plain()) {
            if self.open.take().is_some() {
                out.push_str("</span>");
            }
            if !self.style.is_plain() {
                out.push_str("<span class=\"");
                out.push_str(&self.style.classes());
                out.push_str("\">");
                self.open = Some(self.style);
            }
        }
        escape_html_into(out, text);
    }
}

/// Escape text for embedding in HTML element content or attribute values.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    escape_html_into(&mut out, text);
    out
}

#[cfg(test)]
#[path = "decode_tests.rs"]
mod tests;
