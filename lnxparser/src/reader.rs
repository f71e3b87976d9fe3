use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use crate::error::ParseError;

/// Iterator over the lines of an lnx source, numbered from 1.
///
/// Lines come back exactly as written apart from the `\n` / `\r\n`
/// terminator; comments and whitespace are left for the classifier. Once a
/// read fails the error is yielded and the iterator should not be polled again.
#[derive(Debug)]
pub struct NumberedLines<R> {
    lines: io::Lines<R>,
    line_no: usize,
}

impl<R: BufRead> NumberedLines<R> {
    pub fn new(reader: R) -> Self {
        NumberedLines {
            lines: reader.lines(),
            line_no: 0,
        }
    }
}

impl<R: BufRead> Iterator for NumberedLines<R> {
    type Item = Result<(usize, String), ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        let next = self.lines.next()?;
        self.line_no += 1;
        let line = self.line_no;
        Some(match next {
            Ok(text) => Ok((line, text)),
            Err(source) => Err(ParseError::Io { line, source }),
        })
    }
}

/// Opens an lnx file for line-by-line reading.
/// Failing to open it is reported as an `Io` error on line 0.
pub fn open(path: &Path) -> Result<NumberedLines<BufReader<File>>, ParseError> {
    let file = File::open(path).map_err(|source| ParseError::Io { line: 0, source })?;
    Ok(NumberedLines::new(BufReader::new(file)))
}
