use serde::Serialize;

/// Which labeled fields a marker-driven parse actually found.
///
/// The upstream site carries fields as literal English label strings in
/// rendered text, so a parse that "succeeds" may still have missed labels
/// that moved or disappeared. The report travels alongside the parsed record
/// and lets callers (and tests) detect upstream drift without turning every
/// missing label into a failure.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ParseReport {
    found: Vec<&'static str>,
}

impl ParseReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `label` was found in the page text.
    pub fn record(&mut self, label: &'static str) {
        if !self.found.contains(&label) {
            self.found.push(label);
        }
    }

    pub fn contains(&self, label: &str) -> bool {
        self.found.iter().any(|f| *f == label)
    }

    pub fn found(&self) -> &[&'static str] {
        &self.found
    }

    pub fn is_empty(&self) -> bool {
        self.found.is_empty()
    }
}
