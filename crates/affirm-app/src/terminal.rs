//! Line-oriented terminal presenter.

use std::io::Write;

use affirm_core::types::Variant;
use affirm_engine::presenter::{Gesture, Tone};
use affirm_engine::{DialogView, Presenter, StatusIcon};

/// Renders each `DialogView` as a short block of text.
pub struct TerminalPresenter<W: Write> {
    out: W,
    shown: bool,
}

impl<W: Write> TerminalPresenter<W> {
    pub fn new(out: W) -> Self {
        Self { out, shown: false }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_view(&mut self, view: &DialogView) -> std::io::Result<()> {
        if !view.visible {
            if self.shown {
                writeln!(self.out, "(dialog closed)")?;
                self.shown = false;
            }
            return self.out.flush();
        }
        self.shown = true;

        writeln!(self.out)?;
        writeln!(self.out, "{} {}", glyph(&view.icon), view.title)?;
        if let Some(ref body) = view.body {
            let prefix = if view.tone == Tone::Error { "error: " } else { "" };
            writeln!(self.out, "    {prefix}{body}")?;
        }

        let confirm = match view.confirm_variant {
            Variant::Destructive => format!("[{}!]", view.confirm_label),
            Variant::Default => format!("[{}]", view.confirm_label),
        };
        write!(self.out, "    {confirm} / [{}]", view.cancel_label)?;
        if view.accepts(Gesture::Confirm) || view.accepts(Gesture::Cancel) {
            write!(self.out, "  {}", prompt(view))?;
        }
        writeln!(self.out)?;
        self.out.flush()
    }
}

impl<W: Write> Presenter for TerminalPresenter<W> {
    fn render(&mut self, view: &DialogView) {
        if let Err(e) = self.write_view(view) {
            tracing::warn!(error = %e, "Failed to render dialog");
        }
    }
}

fn glyph(icon: &StatusIcon) -> String {
    match icon {
        StatusIcon::Warning => "[!]".to_string(),
        StatusIcon::Custom(icon) => format!("[{}]", icon.as_str()),
        StatusIcon::Spinner => "[...]".to_string(),
        StatusIcon::Failure => "[x]".to_string(),
        StatusIcon::Success => "[ok]".to_string(),
    }
}

fn prompt(view: &DialogView) -> &'static str {
    match (view.accepts(Gesture::Confirm), view.accepts(Gesture::Cancel)) {
        (true, true) => "(y/n)",
        (false, true) => "(n to close)",
        (true, false) => "(y)",
        (false, false) => "",
    }
}

/// Map a line of user input to a gesture.
pub fn parse_answer(line: &str) -> Option<Gesture> {
    match line.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" => Some(Gesture::Confirm),
        "n" | "no" | "q" => Some(Gesture::Cancel),
        _ => None,
    }
}
