use std::{
    collections::VecDeque,
    io::{self, BufRead, BufReader, Stderr, Stdin, Write},
};

pub trait Chooser {
    /// Ask the operator to pick one of `choices`, returning its index.
    fn choose(&mut self, message: &str, choices: &[String]) -> io::Result<usize>;

    /// Ask the operator for a free-form line of text.
    fn input(&mut self, message: &str) -> io::Result<String>;
}

/// Numbered menu written to `output`, answers read line by line from `input`.
pub struct TerminalChooser<R, W> {
    input: R,
    output: W,
}

impl TerminalChooser<BufReader<Stdin>, Stderr> {
    pub fn stdio() -> Self {
        Self::new(BufReader::new(io::stdin()), io::stderr())
    }
}

impl<R: BufRead, W: Write> TerminalChooser<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    fn read_line(&mut self) -> io::Result<String> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "input closed before an answer was given",
            ));
        }
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }
}

impl<R: BufRead, W: Write> Chooser for TerminalChooser<R, W> {
    fn choose(&mut self, message: &str, choices: &[String]) -> io::Result<usize> {
        if choices.is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("nothing to choose for: {message}"),
            ));
        }
        writeln!(self.output, "? {message}")?;
        for (i, choice) in choices.iter().enumerate() {
            writeln!(self.output, "  {}) {}", i + 1, choice)?;
        }
        loop {
            write!(self.output, "> ")?;
            self.output.flush()?;
            let answer = self.read_line()?;
            let answer = answer.trim();
            if let Ok(n) = answer.parse::<usize>() {
                if (1..=choices.len()).contains(&n) {
                    return Ok(n - 1);
                }
            }
            if let Some(i) = choices.iter().position(|c| c.trim().eq_ignore_ascii_case(answer)) {
                return Ok(i);
            }
            writeln!(self.output, "  enter a number between 1 and {}", choices.len())?;
        }
    }

    fn input(&mut self, message: &str) -> io::Result<String> {
        write!(self.output, "? {message}: ")?;
        self.output.flush()?;
        self.read_line()
    }
}

/// Replays pre-recorded answers and remembers every question it was asked.
///
/// A `choose` answer selects the first choice equal to it or starting
/// with it, so `"Dev"` picks `"Dev 0x1234"`.
#[derive(Debug, Default)]
pub struct ScriptedChooser {
    answers: VecDeque<String>,
    asked: Vec<String>,
}

impl ScriptedChooser {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            asked: Vec::new(),
        }
    }

    pub fn asked(&self) -> &[String] {
        &self.asked
    }

    pub fn remaining(&self) -> usize {
        self.answers.len()
    }

    fn next_answer(&mut self, message: &str) -> io::Result<String> {
        self.asked.push(message.to_string());
        self.answers.pop_front().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("no scripted answer for: {message}"),
            )
        })
    }
}

impl Chooser for ScriptedChooser {
    fn choose(&mut self, message: &str, choices: &[String]) -> io::Result<usize> {
        let answer = self.next_answer(message)?;
        choices
            .iter()
            .position(|c| *c == answer)
            .or_else(|| choices.iter().position(|c| c.starts_with(&answer)))
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("{answer:?} is not one of {choices:?}"),
                )
            })
    }

    fn input(&mut self, message: &str) -> io::Result<String> {
        self.next_answer(message)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn choices() -> Vec<String> {
        vec!["Admin Functions".to_string(), "User Functions".to_string()]
    }

    #[test]
    fn terminal_accepts_number() {
        let mut out = Vec::new();
        let mut chooser = TerminalChooser::new(Cursor::new("2\n"), &mut out);
        assert_eq!(chooser.choose("Which?", &choices()).unwrap(), 1);

        let printed = String::from_utf8(out).unwrap();
        assert!(printed.contains("? Which?"));
        assert!(printed.contains("1) Admin Functions"));
    }

    #[test]
    fn terminal_accepts_label_and_retries() {
        let mut out = Vec::new();
        let mut chooser = TerminalChooser::new(Cursor::new("7\nuser functions\n"), &mut out);
        assert_eq!(chooser.choose("Which?", &choices()).unwrap(), 1);
        assert!(String::from_utf8(out).unwrap().contains("between 1 and 2"));
    }

    #[test]
    fn terminal_eof_is_an_error() {
        let mut chooser = TerminalChooser::new(Cursor::new(""), Vec::new());
        let err = chooser.choose("Which?", &choices()).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn terminal_input_strips_newline() {
        let mut chooser = TerminalChooser::new(Cursor::new("0xabc\r\n"), Vec::new());
        assert_eq!(chooser.input("to").unwrap(), "0xabc");
    }

    #[test]
    fn scripted_matches_prefix_and_records() {
        let mut chooser = ScriptedChooser::new(["User"]);
        assert_eq!(chooser.choose("Which?", &choices()).unwrap(), 1);
        assert_eq!(chooser.asked(), ["Which?"]);
        assert_eq!(chooser.remaining(), 0);
    }

    #[test]
    fn scripted_runs_out() {
        let mut chooser = ScriptedChooser::default();
        assert!(chooser.input("anything").is_err());
    }

    #[test]
    fn scripted_rejects_unknown_answer() {
        let mut chooser = ScriptedChooser::new(["Neither"]);
        let err = chooser.choose("Which?", &choices()).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }
}
