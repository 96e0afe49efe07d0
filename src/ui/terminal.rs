// src/ui/terminal.rs
use std::io::{self, Write};

use chrono::Local;
use tracing::warn;

use crate::config::QuickReply;
use crate::message::{Message, Sender};
use crate::ui::ChatView;

/// Line-oriented rendering of the widget for a terminal.
pub struct TerminalView<W: Write> {
    out: W,
    quick_replies: Vec<QuickReply>,
    suggestions_visible: bool,
    bot_name: String,
}

impl TerminalView<io::Stdout> {
    pub fn stdout(quick_replies: Vec<QuickReply>) -> Self {
        Self::new(io::stdout(), quick_replies)
    }
}

impl<W: Write> TerminalView<W> {
    pub fn new(out: W, quick_replies: Vec<QuickReply>) -> Self {
        Self {
            out,
            quick_replies,
            suggestions_visible: true,
            bot_name: "Asistente".to_string(),
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Non-message feedback, e.g. why a submission was not sent.
    pub fn notice(&mut self, text: &str) {
        self.line(&format!("  ({text})"));
    }

    pub fn print_help(&mut self) {
        self.line("Commands: /open /close /toggle /clear /suggest N /diag /quit");
        self.line("Anything else is sent as a message.");
    }

    fn line(&mut self, text: &str) {
        if let Err(e) = writeln!(self.out, "{text}").and_then(|_| self.out.flush()) {
            warn!(error = %e, "failed to write to terminal");
        }
    }
}

impl<W: Write> ChatView for TerminalView<W> {
    fn open(&mut self) {
        self.line("── Chat abierto ──");
        if self.suggestions_visible && !self.quick_replies.is_empty() {
            let lines: Vec<String> = self
                .quick_replies
                .iter()
                .enumerate()
                .map(|(i, reply)| format!("  [{}] {}", i + 1, reply.label))
                .collect();
            self.line("Sugerencias:");
            for l in lines {
                self.line(&l);
            }
        }
    }

    fn close(&mut self) {
        self.line("── Chat cerrado ──");
    }

    fn set_badge(&mut self, visible: bool) {
        if visible {
            self.line("● 1 mensaje nuevo: ¿Necesitas asesoría legal? Escribe /open");
        }
    }

    fn render_message(&mut self, message: &Message) {
        let time = message.timestamp.with_timezone(&Local).format("%H:%M");
        let who = match message.sender {
            Sender::User => "Tú",
            Sender::Bot => self.bot_name.as_str(),
        };
        let rendered = format_message(&format!("[{time}] {who}: "), &message.content);
        self.line(&rendered);
    }

    fn set_typing(&mut self, visible: bool) {
        if visible {
            let text = format!("{} está escribiendo...", self.bot_name);
            self.line(&text);
        }
    }

    fn hide_suggestions(&mut self) {
        self.suggestions_visible = false;
    }

    fn clear_messages(&mut self) {
        self.line("── Conversación borrada ──");
    }
}

// Continuation lines are indented under the first so multi-line replies stay readable.
fn format_message(prefix: &str, content: &str) -> String {
    let indent = " ".repeat(prefix.chars().count());
    let mut out = String::from(prefix);
    for (i, part) in content.lines().enumerate() {
        if i > 0 {
            out.push('\n');
            out.push_str(&indent);
        }
        out.push_str(part);
    }
    out
}

/// A line typed at the terminal prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputCommand {
    Submit(String),
    Open,
    Close,
    Toggle,
    Clear,
    /// 0-based index into the quick replies.
    Suggest(usize),
    Diagnose,
    Help,
    Quit,
    Unknown(String),
}

pub fn parse_command(line: &str) -> InputCommand {
    let trimmed = line.trim();
    let Some(rest) = trimmed.strip_prefix('/') else {
        return InputCommand::Submit(trimmed.to_string());
    };
    let mut parts = rest.split_whitespace();
    match parts.next().unwrap_or_default() {
        "open" => InputCommand::Open,
        "close" | "min" => InputCommand::Close,
        "toggle" => InputCommand::Toggle,
        "clear" => InputCommand::Clear,
        "diag" => InputCommand::Diagnose,
        "help" => InputCommand::Help,
        "quit" | "exit" => InputCommand::Quit,
        "suggest" => match parts.next().and_then(|n| n.parse::<usize>().ok()) {
            Some(n) if n >= 1 => InputCommand::Suggest(n - 1),
            _ => InputCommand::Unknown(trimmed.to_string()),
        },
        _ => InputCommand::Unknown(trimmed.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_commands() {
        assert_eq!(parse_command("  Hola  "), InputCommand::Submit("Hola".into()));
        assert_eq!(parse_command("/open"), InputCommand::Open);
        assert_eq!(parse_command("/suggest 2"), InputCommand::Suggest(1));
        assert_eq!(parse_command("/suggest 0"), InputCommand::Unknown("/suggest 0".into()));
        assert_eq!(parse_command("/quit"), InputCommand::Quit);
        assert_eq!(parse_command("/bogus"), InputCommand::Unknown("/bogus".into()));
    }

    #[test]
    fn renders_multiline_bot_message() {
        let mut view = TerminalView::new(Vec::new(), vec![]);
        view.render_message(&Message::new(Sender::Bot, "line one\nline two", "chat_1"));
        let out = String::from_utf8(view.into_inner()).unwrap();
        assert!(out.contains("Asistente: line one\n"));
        assert!(out.trim_end().ends_with("line two"));
    }

    #[test]
    fn suggestions_listed_until_hidden() {
        let replies = vec![QuickReply::new("Divorcio", "¿Qué documentos necesito?")];
        let mut view = TerminalView::new(Vec::new(), replies);
        view.open();
        view.hide_suggestions();
        view.open();
        let out = String::from_utf8(view.into_inner()).unwrap();
        assert_eq!(out.matches("[1] Divorcio").count(), 1);
    }
}
