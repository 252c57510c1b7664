use super::types::{Loc, Located};
use std::fmt::Display;

#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Error {
    UnterminatedStringLiteral,
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::UnterminatedStringLiteral => {
                write!(f, "Encountered unterminated string literal")
            }
        }
    }
}

/// A single whitespace-delimited word of the source, with the position of its first character.
pub type Token<'a> = Located<&'a str>;

#[derive(Debug, PartialEq, Eq)]
enum RawToken<'a> {
    Value(Token<'a>),
    Nothing,
    EndOfStream,
}

enum TerminatorKind {
    Hard,
    Whitespace,
}

impl TerminatorKind {
    fn from_char(c: Option<char>) -> Option<Self> {
        match c {
            None | Some(RawToken::COMMENT_CHAR) | Some(RawToken::NEWLINE_CHAR) => {
                Some(TerminatorKind::Hard)
            }
            Some(c) => {
                if c.is_whitespace() {
                    Some(TerminatorKind::Whitespace)
                } else {
                    None
                }
            }
        }
    }
}

#[derive(Debug)]
enum SeekMode {
    Comment,
    Whitespace,
    StringLiteral { escaped: bool },
    Word,
}

impl From<char> for SeekMode {
    fn from(c: char) -> Self {
        match c {
            RawToken::COMMENT_CHAR => SeekMode::Comment,
            RawToken::STRING_LITERAL_CHAR => SeekMode::StringLiteral { escaped: false },
            c => {
                if c.is_whitespace() {
                    SeekMode::Whitespace
                } else {
                    SeekMode::Word
                }
            }
        }
    }
}

impl SeekMode {
    fn should_terminate(&mut self, cur: Option<char>) -> Result<Option<SeekEnd>, Error> {
        match (self, TerminatorKind::from_char(cur)) {
            (SeekMode::Comment, _) => Ok(Some(SeekEnd::SkipEverything)),
            (SeekMode::Whitespace, Some(TerminatorKind::Whitespace)) => Ok(None),
            (SeekMode::Whitespace, _) => Ok(Some(SeekEnd::Skip)),
            // Comment characters and whitespace are part of a string literal; only running
            // off the end of the line terminates it early.
            (SeekMode::StringLiteral { escaped }, _) => match cur {
                None | Some(RawToken::NEWLINE_CHAR) => Err(Error::UnterminatedStringLiteral),
                Some(_) if *escaped => {
                    *escaped = false;
                    Ok(None)
                }
                Some(RawToken::ESCAPE_CHAR) => {
                    *escaped = true;
                    Ok(None)
                }
                Some(RawToken::STRING_LITERAL_CHAR) => Ok(Some(SeekEnd::AdvanceOne)),
                Some(_) => Ok(None),
            },
            (SeekMode::Word, Some(_)) => Ok(Some(SeekEnd::Current)),
            (SeekMode::Word, None) => Ok(None),
        }
    }
}

enum SeekEnd {
    Current,
    AdvanceOne,
    SkipEverything,
    Skip,
}

impl SeekEnd {
    fn build_raw_token<F>(
        self,
        line_no: usize,
        line: &'_ str,
        start_idx: usize,
        cur_idx: Option<usize>,
        advance: F,
    ) -> RawToken<'_>
    where
        F: FnOnce() -> Option<usize>,
    {
        let end_idx = match self {
            SeekEnd::SkipEverything => return RawToken::EndOfStream,
            SeekEnd::Skip => return RawToken::Nothing,
            SeekEnd::Current => cur_idx,
            SeekEnd::AdvanceOne => advance(),
        }
        .unwrap_or_else(|| line.len());

        if end_idx == start_idx {
            return RawToken::Nothing;
        }

        RawToken::Value(Located::with_loc(
            Loc::new(line_no, start_idx + 1),
            &line[start_idx..end_idx],
        ))
    }
}

impl<'a> RawToken<'a> {
    const COMMENT_CHAR: char = ';';
    const NEWLINE_CHAR: char = '\n';
    const STRING_LITERAL_CHAR: char = '"';
    const ESCAPE_CHAR: char = '\\';

    fn consume_one<'b>(
        line_no: usize,
        line: &'b str,
        chars: &mut std::iter::Peekable<impl Iterator<Item = (usize, char)> + 'b>,
    ) -> Result<RawToken<'b>, Located<Error>> {
        match chars.next() {
            None => Ok(RawToken::EndOfStream),
            Some((col_start, c)) => {
                let mut sm = SeekMode::from(c);
                loop {
                    let (idx, c) = match chars.peek().copied() {
                        Some((idx, c)) => (Some(idx), Some(c)),
                        None => (None, None),
                    };

                    let seek = sm.should_terminate(c).map_err(|err| {
                        Located::with_loc(Loc::new(line_no, col_start + 1), err)
                    })?;

                    if let Some(seek) = seek {
                        return Ok(seek.build_raw_token(line_no, line, col_start, idx, || {
                            chars.next();
                            chars.peek().copied().map(|(idx, _)| idx)
                        }));
                    }

                    chars.next();
                }
            }
        }
    }

    fn line_to_iter(
        line_no: usize,
        line: &str,
    ) -> impl Iterator<Item = Result<Token<'_>, Located<Error>>> {
        let mut chars = line.char_indices().peekable();
        std::iter::from_fn(move || -> Option<Result<Located<&str>, Located<Error>>> {
            loop {
                match RawToken::consume_one(line_no, line, &mut chars) {
                    Ok(RawToken::Nothing) => (),
                    Ok(RawToken::EndOfStream) => return None,
                    Ok(RawToken::Value(slice)) => return Some(Ok(slice)),
                    Err(err) => return Some(Err(err)),
                }
            }
        })
    }

    fn source_to_iters(
        source: &str,
    ) -> impl Iterator<Item = impl Iterator<Item = Result<Token<'_>, Located<Error>>>> {
        // NOTE `lines()` also strips a trailing '\r', which is whitespace to us anyway.
        source
            .lines()
            .enumerate()
            .map(|(line_no, line)| Self::line_to_iter(line_no + 1, line))
    }
}

/// Splits `source` into words, grouped by the line they appear on. Lines with no words
/// (blank, or only a comment) are omitted.
pub fn tokenize_lines(source: &str) -> Result<Vec<Vec<Token<'_>>>, Located<Error>> {
    RawToken::source_to_iters(source)
        .map(|line| line.collect::<Result<Vec<_>, _>>())
        .filter(|line| line.as_ref().map_or(true, |words| !words.is_empty()))
        .collect()
}

/// Splits `source` into a flat stream of words.
pub fn tokenize(source: &str) -> Result<Vec<Token<'_>>, Located<Error>> {
    RawToken::source_to_iters(source).flatten().collect()
}
