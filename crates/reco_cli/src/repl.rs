use std::io;

use reco_core::LineSource;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

/// Terminal line editing with history.
pub struct ReadlineSource {
    editor: DefaultEditor,
}

impl ReadlineSource {
    pub fn new() -> rustyline::Result<Self> {
        Ok(Self {
            editor: DefaultEditor::new()?,
        })
    }
}

impl LineSource for ReadlineSource {
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        println!();
        loop {
            match self.editor.readline(prompt) {
                Ok(line) => {
                    if !line.trim().is_empty() {
                        self.editor.add_history_entry(line.trim()).ok();
                    }
                    return Ok(Some(line));
                }
                Err(ReadlineError::Interrupted) => continue,
                Err(ReadlineError::Eof) => return Ok(None),
                Err(ReadlineError::Io(err)) => return Err(err),
                Err(err) => return Err(io::Error::other(err.to_string())),
            }
        }
    }
}
