use std::io::{self, BufRead, Write};

use tracing::warn;

use crate::error::Result;
use crate::qa::QaService;

pub const BANNER: &str = "=== Système de Questions-Réponses sur les Recommandations des Employés ===";
pub const QUESTION_PROMPT: &str = "Votre question: ";

/// Where questions come from. `None` means the input is exhausted.
pub trait LineSource {
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>>;
}

/// Plain line reader for piped input; the prompt goes to `echo`.
pub struct BufReadSource<R, W> {
    reader: R,
    echo: W,
}

impl<R: BufRead, W: Write> BufReadSource<R, W> {
    pub fn new(reader: R, echo: W) -> Self {
        Self { reader, echo }
    }
}

impl<R: BufRead, W: Write> LineSource for BufReadSource<R, W> {
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        write!(self.echo, "\n{prompt}")?;
        self.echo.flush()?;

        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(&['\r', '\n'][..]).to_string()))
    }
}

pub trait Answerer {
    fn answer(&mut self, question: &str) -> Result<String>;
}

impl Answerer for QaService {
    fn answer(&mut self, question: &str) -> Result<String> {
        QaService::answer(self, question)
    }
}

pub fn is_exit_command(line: &str) -> bool {
    line.trim().eq_ignore_ascii_case("exit")
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SessionSummary {
    pub questions: usize,
    pub errors: usize,
}

/// Reads questions until `exit` or end of input. A failed question is
/// reported on `out` and the loop goes on.
pub fn run_session<S, A, W>(source: &mut S, answerer: &mut A, out: &mut W) -> Result<SessionSummary>
where
    S: LineSource + ?Sized,
    A: Answerer + ?Sized,
    W: Write + ?Sized,
{
    writeln!(out, "\n{BANNER}")?;
    writeln!(out, "Tapez 'exit' pour quitter.")?;

    let mut summary = SessionSummary::default();
    while let Some(line) = source.read_line(QUESTION_PROMPT)? {
        if is_exit_command(&line) {
            break;
        }
        let question = line.trim();
        if question.is_empty() {
            continue;
        }

        summary.questions += 1;
        match answerer.answer(question) {
            Ok(answer) => {
                writeln!(out, "\nRéponse:")?;
                writeln!(out, "{answer}")?;
            }
            Err(err) => {
                summary.errors += 1;
                warn!(error = %err, "question failed");
                writeln!(out, "\nErreur: {err}")?;
            }
        }
        out.flush()?;
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RecoError;
    use std::io::Cursor;

    #[derive(Default)]
    struct Scripted {
        asked: Vec<String>,
        fail_on: Option<String>,
    }

    impl Answerer for Scripted {
        fn answer(&mut self, question: &str) -> Result<String> {
            self.asked.push(question.to_string());
            if self.fail_on.as_deref() == Some(question) {
                return Err(RecoError::ExternalService("LLM unavailable".to_string()));
            }
            Ok(format!("réponse à « {question} »"))
        }
    }

    fn run(input: &str, answerer: &mut Scripted) -> (SessionSummary, String) {
        let mut prompts = Vec::new();
        let mut out = Vec::new();
        let summary = {
            let mut source = BufReadSource::new(Cursor::new(input.as_bytes()), &mut prompts);
            run_session(&mut source, answerer, &mut out).unwrap()
        };
        (summary, String::from_utf8(out).unwrap())
    }

    #[test]
    fn exit_stops_without_answering() {
        for input in ["exit\n", "EXIT\n", "  Exit  \nQuestion ignorée\n"] {
            let mut answerer = Scripted::default();
            let (summary, out) = run(input, &mut answerer);

            assert!(answerer.asked.is_empty(), "input {input:?}");
            assert_eq!(summary.questions, 0);
            assert!(out.contains(BANNER));
            assert!(!out.contains("Réponse:"));
        }
    }

    #[test]
    fn answers_each_question_until_exit() {
        let mut answerer = Scripted::default();
        let (summary, out) = run("Qui ?\n\nQuoi ?\nexit\nJamais\n", &mut answerer);

        assert_eq!(answerer.asked, vec!["Qui ?", "Quoi ?"]);
        assert_eq!(summary.questions, 2);
        assert!(out.contains("Réponse:\nréponse à « Qui ? »"));
    }

    #[test]
    fn failures_are_reported_and_loop_continues() {
        let mut answerer = Scripted {
            fail_on: Some("Panne ?".to_string()),
            ..Scripted::default()
        };
        let (summary, out) = run("Panne ?\nEnsuite ?\n", &mut answerer);

        assert_eq!(summary, SessionSummary { questions: 2, errors: 1 });
        assert!(out.contains("Erreur: External service error: LLM unavailable"));
        assert!(out.contains("réponse à « Ensuite ? »"));
    }

    #[test]
    fn end_of_input_ends_session() {
        let mut answerer = Scripted::default();
        let (summary, _) = run("Une question sans retour", &mut answerer);
        assert_eq!(answerer.asked, vec!["Une question sans retour"]);
        assert_eq!(summary.questions, 1);
    }

    #[test]
    fn exit_detection() {
        assert!(is_exit_command("exit"));
        assert!(is_exit_command("ExIt\r"));
        assert!(!is_exit_command("exit now"));
        assert!(!is_exit_command("quit"));
    }
}
