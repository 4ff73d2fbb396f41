/// Destination for non-fatal resolution warnings.
///
/// The engine never logs globally; a session owns one sink, defaulting to
/// [`DiscardWarnings`]. Closures of type `Fn(&str)` implement the trait.
pub trait WarningSink {
    fn warn(&self, message: &str);
}

/// Drops every warning.
#[derive(Debug, Default, Clone, Copy)]
pub struct DiscardWarnings;

impl WarningSink for DiscardWarnings {
    fn warn(&self, _message: &str) {}
}

impl<F: Fn(&str)> WarningSink for F {
    fn warn(&self, message: &str) {
        self(message)
    }
}
