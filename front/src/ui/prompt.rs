//! Blocking questions on the terminal.

use std::io::{self, BufRead, IsTerminal, Write};

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    terminal,
};

/// Asks a yes/no question; anything but `y`/`yes` is a no.
pub fn confirm(question: &str, assume_yes: bool) -> io::Result<bool> {
    if assume_yes {
        return Ok(true);
    }

    let stdin = io::stdin();
    confirm_with(question, &mut stdin.lock(), &mut io::stderr())
}

pub fn confirm_with(
    question: &str,
    input: &mut impl BufRead,
    output: &mut impl Write,
) -> io::Result<bool> {
    let answer = ask_with(&format!("{} [y/N]", question), input, output)?;
    Ok(matches!(answer.to_ascii_lowercase().as_str(), "y" | "yes"))
}

pub fn ask(prompt: &str) -> io::Result<String> {
    let stdin = io::stdin();
    ask_with(prompt, &mut stdin.lock(), &mut io::stderr())
}

/// Reads one trimmed line after printing `prompt`. End of input reads as empty.
pub fn ask_with(
    prompt: &str,
    input: &mut impl BufRead,
    output: &mut impl Write,
) -> io::Result<String> {
    write!(output, "{} ", prompt)?;
    output.flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;

    Ok(line.trim().to_owned())
}

/// Like [`ask`], but typed characters are not echoed when stdin is a
/// terminal.
pub fn ask_hidden(prompt: &str) -> io::Result<String> {
    if !io::stdin().is_terminal() {
        return ask(prompt);
    }

    let mut stderr = io::stderr();
    write!(stderr, "{} ", prompt)?;
    stderr.flush()?;

    terminal::enable_raw_mode()?;
    let secret = read_hidden();
    terminal::disable_raw_mode()?;
    writeln!(stderr)?;

    secret
}

fn read_hidden() -> io::Result<String> {
    let mut secret = String::new();

    loop {
        let Event::Key(key) = event::read()? else {
            continue;
        };

        match hidden_key(&mut secret, key) {
            Entry::Typing => {}
            Entry::Done => return Ok(secret),
            Entry::Interrupted => {
                return Err(io::Error::new(io::ErrorKind::Interrupted, "input cancelled"));
            }
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Entry {
    Typing,
    Done,
    Interrupted,
}

// raw mode delivers Ctrl-C as a key press instead of a signal
fn hidden_key(secret: &mut String, key: KeyEvent) -> Entry {
    if key.kind == KeyEventKind::Release {
        return Entry::Typing;
    }

    match key.code {
        KeyCode::Enter => Entry::Done,
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Entry::Interrupted,
        KeyCode::Esc => Entry::Interrupted,
        KeyCode::Char(c) => {
            secret.push(c);
            Entry::Typing
        }
        KeyCode::Backspace => {
            secret.pop();
            Entry::Typing
        }
        _ => Entry::Typing,
    }
}
