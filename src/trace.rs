//! Reading text branch traces.

pub mod synth;

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use crate::branch::*;
use crate::error::{ParseError, TraceError};

/// A trace read from a text file, one record per line:
///
/// ```text
/// B from 00008008 to 00008040 F * taken
/// R from 00008070               ? not taken
/// ```
///
/// Fields are located by searching for tokens, so the amount of whitespace
/// between them does not matter.
#[derive(Clone, Debug)]
pub struct TextTrace {
    records: Vec<BranchRecord>,
    name: String,
    /// Number of lines that could not be parsed
    malformed: usize,
}
impl TextTrace {
    /// Read a trace from a file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, TraceError> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|source| TraceError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let name = path.file_name()
            .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
        Self::from_reader(BufReader::new(f), &name)
    }

    /// Read a trace from any buffered reader.
    ///
    /// Blank lines are skipped. A malformed line, including one that is not
    /// valid UTF-8, is logged and replaced by the best-effort record from
    /// [`parse_line_lossy`]. Only I/O errors abort the read.
    pub fn from_reader(mut reader: impl BufRead, name: &str) -> Result<Self, TraceError> {
        let mut records = Vec::new();
        let mut malformed = 0;
        let mut buf = Vec::new();
        let mut lineno = 0;
        loop {
            buf.clear();
            let n = reader.read_until(b'\n', &mut buf).map_err(|source| TraceError::Read {
                name: name.to_string(),
                line: lineno + 1,
                source,
            })?;
            if n == 0 {
                break;
            }
            lineno += 1;

            let invalid = std::str::from_utf8(&buf).is_err();
            let line = String::from_utf8_lossy(&buf);
            if line.trim().is_empty() {
                continue;
            }
            let (record, err) = parse_line_lossy(&line);
            let err = if invalid { Some(ParseError::InvalidUtf8) } else { err };
            if let Some(err) = err {
                log::warn!("{}:{}: {} in `{}`", name, lineno, err, line.trim());
                malformed += 1;
            }
            records.push(record);
        }

        if records.is_empty() {
            log::warn!("trace `{}` contains no records", name);
        }
        Ok(Self { records, name: name.to_string(), malformed })
    }

    pub fn name(&self) -> &str { &self.name }

    /// Return the number of records
    pub fn num_entries(&self) -> usize { self.records.len() }

    /// Return the number of lines that had to be replaced with a
    /// best-effort record
    pub fn malformed(&self) -> usize { self.malformed }

    /// Return a slice of records.
    pub fn as_slice(&self) -> &[BranchRecord] { &self.records }

    pub fn into_records(self) -> Vec<BranchRecord> { self.records }
}

/// Split the first whitespace-delimited token off `s`.
fn split_token(s: &str) -> (&str, &str) {
    let s = s.trim_start();
    let end = s.find(char::is_whitespace).unwrap_or(s.len());
    s.split_at(end)
}

/// An address is one to eight hex digits with no sign or prefix.
fn parse_address(tok: &str) -> Option<u32> {
    if tok.is_empty() || tok.len() > 8 || !tok.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    u32::from_str_radix(tok, 16).ok()
}

/// Find `key` in `s` and parse the address that follows it.
/// Returns the address and the rest of the string.
fn address_after<'a>(s: &'a str, key: &str) -> Result<Option<(u32, &'a str)>, ParseError> {
    let Some(start) = s.find(key) else {
        return Ok(None);
    };
    let (tok, rest) = split_token(&s[start + key.len()..]);
    let addr = parse_address(tok)
        .ok_or_else(|| ParseError::BadAddress(tok.to_string()))?;
    Ok(Some((addr, rest)))
}

/// The target after `to `, if there is one. When the token is not an
/// address it is left in place for the direction hint.
///
/// `F` and `B` are also hex digits, so a lone `F` or `B` is only taken as
/// the target when another hint follows it.
fn target_after(s: &str) -> (u32, &str) {
    let Some(start) = s.find("to ") else {
        return (BranchRecord::NO_TARGET, s);
    };
    let after = &s[start + "to ".len()..];
    let (tok, rest) = split_token(after);
    let (next, _) = split_token(rest);
    let is_hint = |t: &str| matches!(t, "F" | "B");
    match parse_address(tok) {
        Some(tgt) if !is_hint(tok) || is_hint(next) || next == "?" => (tgt, rest),
        _ => (BranchRecord::NO_TARGET, after),
    }
}

/// The trailing `taken` or `not taken`.
fn parse_outcome(line: &str) -> Result<Outcome, ParseError> {
    let mut toks = line.split_whitespace().rev();
    match (toks.next(), toks.next()) {
        (Some("taken"), Some("not")) => Ok(Outcome::N),
        (Some("taken"), _) => Ok(Outcome::T),
        _ => Err(ParseError::MissingOutcome),
    }
}

/// Parse one line of a text trace.
///
/// A branch without a target gets [`BranchRecord::NO_TARGET`], and a missing
/// or unrecognized direction token gives [`Direction::Unknown`].
pub fn parse_line(line: &str) -> Result<BranchRecord, ParseError> {
    let line = line.trim();
    let kind = match line.chars().next() {
        None => return Err(ParseError::Empty),
        Some('B') => BranchKind::Branch,
        Some('R') => BranchKind::Return,
        Some(c) => return Err(ParseError::UnknownKind(c)),
    };
    let (pc, rest) = address_after(line, "from ")?.ok_or(ParseError::MissingSource)?;
    let outcome = parse_outcome(rest)?;

    match kind {
        BranchKind::Return => Ok(BranchRecord::ret(pc, outcome)),
        BranchKind::Branch => {
            let (tgt, rest) = target_after(rest);
            let hint = match rest.split_whitespace().next() {
                Some("F") => Direction::Forward,
                Some("B") => Direction::Backward,
                _ => Direction::Unknown,
            };
            Ok(BranchRecord::branch(pc, tgt, hint, outcome))
        },
    }
}

/// Parse one line of a text trace, never failing.
///
/// When the line is malformed the error is returned alongside a record with
/// the kind and source address (if they could be read), no target, an
/// unknown direction and a 'not-taken' outcome.
pub fn parse_line_lossy(line: &str) -> (BranchRecord, Option<ParseError>) {
    match parse_line(line) {
        Ok(record) => (record, None),
        Err(err) => {
            let line = line.trim();
            let kind = if line.starts_with('R') {
                BranchKind::Return
            } else {
                BranchKind::Branch
            };
            let pc = address_after(line, "from ")
                .ok()
                .flatten()
                .map_or(0, |(pc, _)| pc);
            let record = BranchRecord {
                kind,
                pc,
                tgt: BranchRecord::NO_TARGET,
                hint: Direction::Unknown,
                outcome: Outcome::N,
            };
            (record, Some(err))
        },
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn parses_branch() {
        let r = parse_line("B from 00008008 to 00008040 F * taken").unwrap();
        assert_eq!(r, BranchRecord::branch(0x8008, 0x8040, Direction::Forward, Outcome::T));

        let r = parse_line("B from 0000804c to 00008000 B ? not taken").unwrap();
        assert_eq!(r, BranchRecord::branch(0x804c, 0x8000, Direction::Backward, Outcome::N));
    }

    #[test]
    fn parses_return() {
        let r = parse_line("R from 00008070               ? not taken").unwrap();
        assert_eq!(r, BranchRecord::ret(0x8070, Outcome::N));
        let r = parse_line("R from 00008070 * taken").unwrap();
        assert_eq!(r, BranchRecord::ret(0x8070, Outcome::T));
    }

    #[test]
    fn tolerates_whitespace() {
        let r = parse_line("  B   from  0000ABCD   to   00001000\tB  *  not   taken \r").unwrap();
        assert_eq!(r, BranchRecord::branch(0xabcd, 0x1000, Direction::Backward, Outcome::N));
    }

    #[test]
    fn missing_target_and_direction_default() {
        let r = parse_line("B from 00001000 * taken").unwrap();
        assert_eq!(r.tgt, BranchRecord::NO_TARGET);
        assert_eq!(r.hint, Direction::Unknown);
        assert!(r.is_taken());
    }

    #[test]
    fn rejects_malformed_lines() {
        assert_eq!(parse_line(""), Err(ParseError::Empty));
        assert_eq!(parse_line("X from 00001000 taken"), Err(ParseError::UnknownKind('X')));
        assert_eq!(parse_line("B to 00001000 F * taken"), Err(ParseError::MissingSource));
        assert_eq!(
            parse_line("B from 0000zz00 to 00001000 F * taken"),
            Err(ParseError::BadAddress("0000zz00".to_string()))
        );
        assert_eq!(parse_line("B from 00001000 to 00002000 F *"), Err(ParseError::MissingOutcome));
    }

    #[test]
    fn lossy_parse_keeps_what_it_can() {
        let (r, err) = parse_line_lossy("R from 00001000 ? maybe");
        assert_eq!(err, Some(ParseError::MissingOutcome));
        assert_eq!(r, BranchRecord {
            kind: BranchKind::Return,
            pc: 0x1000,
            tgt: 0,
            hint: Direction::Unknown,
            outcome: Outcome::N,
        });

        let (r, err) = parse_line_lossy("garbage");
        assert!(err.is_some());
        assert_eq!((r.kind, r.pc, r.outcome), (BranchKind::Branch, 0, Outcome::N));
    }

    #[test]
    fn reader_skips_blank_and_counts_malformed() {
        let text = "\
B from 00008008 to 00008040 F * taken

R from 00008070               ? not taken
this is not a record
B from 00008040 to 00008008 B * taken
";
        let t = TextTrace::from_reader(Cursor::new(text), "mem").unwrap();
        assert_eq!(t.name(), "mem");
        assert_eq!(t.num_entries(), 4);
        assert_eq!(t.malformed(), 1);
        assert_eq!(t.as_slice()[2].pc, 0);
        assert_eq!(t.as_slice()[3].hint, Direction::Backward);
    }

    #[test]
    fn invalid_utf8_line_is_malformed() {
        let bytes: &[u8] = b"B from 00008008 to 00008040 F * taken\n\
B from 0000\xff000 to 00001000 F * taken\n\
B from 00008040 to 00008008 B * taken\n";
        let t = TextTrace::from_reader(Cursor::new(bytes), "bytes").unwrap();
        assert_eq!(t.num_entries(), 3);
        assert_eq!(t.malformed(), 1);
        assert_eq!(t.as_slice()[1].tgt, BranchRecord::NO_TARGET);
        assert_eq!(t.as_slice()[2].pc, 0x8040);
    }

    #[test]
    fn undecodable_but_parseable_line_still_counts() {
        let bytes: &[u8] = b"B from 00008008 to 00008040 F * taken \xfe\n";
        let t = TextTrace::from_reader(Cursor::new(bytes), "bytes").unwrap();
        assert_eq!(t.num_entries(), 1);
        assert_eq!(t.malformed(), 1);
    }

    #[test]
    fn hint_is_not_read_as_a_target() {
        let r = parse_line("B from 00001000 to B * taken").unwrap();
        assert_eq!(r, BranchRecord::branch(0x1000, 0, Direction::Backward, Outcome::T));
        let r = parse_line("B from 00001000 to F * not taken").unwrap();
        assert_eq!((r.tgt, r.hint), (0, Direction::Forward));

        // Followed by a hint, a single digit is still a target.
        let r = parse_line("B from 00001000 to B F * taken").unwrap();
        assert_eq!((r.tgt, r.hint), (0xb, Direction::Forward));
        let r = parse_line("B from 00001000 to b * taken").unwrap();
        assert_eq!((r.tgt, r.hint), (0xb, Direction::Unknown));
    }

    #[test]
    fn addresses_are_plain_hex() {
        assert_eq!(
            parse_line("B from +1000 to 00002000 F * taken"),
            Err(ParseError::BadAddress("+1000".to_string()))
        );
        assert_eq!(
            parse_line("B from 000000001 to 00002000 F * taken"),
            Err(ParseError::BadAddress("000000001".to_string()))
        );
        let r = parse_line("B from ffffffff to 1 F * taken").unwrap();
        assert_eq!((r.pc, r.tgt), (u32::MAX, 1));
    }

    #[test]
    fn missing_file_is_an_open_error() {
        let err = TextTrace::from_file("/nonexistent/trace.txt").unwrap_err();
        assert!(matches!(err, TraceError::Open { .. }));
        assert!(err.to_string().contains("/nonexistent/trace.txt"));
    }

    #[test]
    fn display_round_trips() {
        let records = [
            BranchRecord::branch(0x1, 0xffff_fff0, Direction::Forward, Outcome::N),
            BranchRecord::branch(0x8000, 0x10, Direction::Backward, Outcome::T),
            BranchRecord::ret(0x42, Outcome::T),
        ];
        for r in records {
            assert_eq!(parse_line(&r.to_string()), Ok(r));
        }
    }
}
