use std::cell::{Ref, RefCell};
use std::io::Write;
use std::rc::Rc;

use colored::Colorize;
use crossbeam_channel::Receiver;
use tracing::{debug, warn};

use crate::app_state::{ConnectionEvent, ConnectionState, Identity};
use crate::colors::{colorize, DisplayColor};
use crate::connection::{ConnectionManager, Connector};

/// Rendering surface for the chat log and the two forms.
pub trait PresentationSink {
    /// Appends a line to the log and keeps it in view.
    fn render(&mut self, user: &str, text: &str, color: &DisplayColor);
    fn show_join_form(&mut self);
    fn show_message_form(&mut self);
}

/// Writes the chat log as `@user: text` lines.
pub struct TerminalSink<W: Write> {
    out: W,
    color: bool,
}

impl<W: Write> TerminalSink<W> {
    pub fn new(out: W, color: bool) -> Self {
        Self { out, color }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_line(&mut self, line: &str) {
        if let Err(e) = writeln!(self.out, "{line}").and_then(|()| self.out.flush()) {
            warn!(error = %e, "failed to write to terminal");
        }
    }
}

impl<W: Write> PresentationSink for TerminalSink<W> {
    fn render(&mut self, user: &str, text: &str, color: &DisplayColor) {
        let label = format!("@{user}:");
        let line = if self.color {
            let (r, g, b) = color.to_rgb();
            format!("{} {text}", label.truecolor(r, g, b).bold())
        } else {
            format!("{label} {text}")
        };
        self.write_line(&line);
    }

    fn show_join_form(&mut self) {
        self.write_line("-- enter your name and email to join --");
    }

    fn show_message_form(&mut self) {
        self.write_line("-- joined; type a message, /leave or /quit --");
    }
}

/// Binds a [`ConnectionManager`] to a [`PresentationSink`] and applies the
/// form rules: joins need a name and an email, blank messages are dropped.
pub struct ChatClient<C: Connector, S: PresentationSink> {
    manager: ConnectionManager<C>,
    sink: Rc<RefCell<S>>,
}

impl<C: Connector, S: PresentationSink + 'static> ChatClient<C, S> {
    pub fn new(mut manager: ConnectionManager<C>, sink: S) -> Self {
        let sink = Rc::new(RefCell::new(sink));

        let render_sink = sink.clone();
        manager.on_message(move |user, text| {
            render_sink.borrow_mut().render(user, text, &colorize(user));
        });

        // not surfaced to the user
        manager.on_error(|e| debug!(error = %e, "connection error"));

        let close_sink = sink.clone();
        manager.on_close(move || close_sink.borrow_mut().show_join_form());

        sink.borrow_mut().show_join_form();
        Self { manager, sink }
    }

    pub fn state(&self) -> ConnectionState {
        self.manager.state()
    }

    pub fn sink(&self) -> Ref<'_, S> {
        self.sink.borrow()
    }

    pub fn events(&self) -> Receiver<ConnectionEvent> {
        self.manager.events()
    }

    pub fn submit_join(&mut self, name: &str, email: &str) {
        if name.is_empty() || email.is_empty() {
            return;
        }

        let sink = self.sink.clone();
        self.manager.join(Identity::new(name, email), move || {
            sink.borrow_mut().show_message_form();
        });
    }

    /// Sends `input` if it has any non-whitespace content and clears it once
    /// the transport has taken it. The text goes out untrimmed. Input is kept
    /// when not connected or when the send fails.
    pub fn submit_message(&mut self, input: &mut String) {
        if input.trim().is_empty() {
            return;
        }
        if self.manager.state() != ConnectionState::Connected {
            debug!("message submitted before join completed");
            return;
        }

        if self.manager.send_text(input) {
            input.clear();
        }
    }

    pub fn leave(&mut self) {
        if self.manager.state() == ConnectionState::Disconnected {
            return;
        }
        self.manager.leave();
        self.sink.borrow_mut().show_join_form();
    }

    pub fn handle_event(&mut self, event: ConnectionEvent) {
        self.manager.handle_event(event);
    }
}
