use std::time::Duration;

/// How long the "Copied!" acknowledgement stays up.
pub const ACK_DURATION: Duration = Duration::from_secs(2);

/// The system clipboard, as provided by the host toolkit.
pub trait ClipboardHost {
    fn write(&mut self, text: String);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CopyTrigger {
    /// The copy button: always the whole response.
    Action,
    /// Ctrl+C: the selection when there is one, else the whole response.
    Shortcut { selection: Option<String> },
}

/// Picks what `trigger` should copy out of `response`. Returns `None` when
/// there is nothing to copy.
pub fn text_to_copy<'a>(trigger: &'a CopyTrigger, response: &'a str) -> Option<&'a str> {
    let text = match trigger {
        CopyTrigger::Shortcut {
            selection: Some(selection),
        } if !selection.is_empty() => selection.as_str(),
        _ => response,
    };
    (!text.is_empty()).then_some(text)
}

/// Overwrites the clipboard with the text chosen for `trigger`. Returns
/// whether anything was copied.
pub fn copy(host: &mut impl ClipboardHost, trigger: &CopyTrigger, response: &str) -> bool {
    match text_to_copy(trigger, response) {
        Some(text) => {
            host.write(text.to_string());
            true
        }
        None => false,
    }
}
