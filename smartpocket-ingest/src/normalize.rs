//! Page text to line corpus.

/// Join per-page text with newlines. A page with no extractable text
/// contributes an empty string.
pub fn join_pages<I, S>(pages: I) -> String
where
    I: IntoIterator<Item = Option<S>>,
    S: AsRef<str>,
{
    pages
        .into_iter()
        .map(|p| p.as_ref().map(|s| s.as_ref().to_string()).unwrap_or_default())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Borrowed view of statement text as non-empty, trimmed lines.
///
/// `lines()` builds a fresh iterator on every call, so the corpus can be
/// walked any number of times.
#[derive(Debug, Clone, Copy)]
pub struct LineCorpus<'a> {
    text: &'a str,
}

impl<'a> LineCorpus<'a> {
    pub fn new(text: &'a str) -> Self {
        Self { text }
    }

    pub fn lines(self) -> impl Iterator<Item = &'a str> + Clone {
        self.text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
    }

    pub fn len(self) -> usize {
        self.lines().count()
    }

    pub fn is_empty(self) -> bool {
        self.lines().next().is_none()
    }

    /// Lines rejoined with `\n`, the form the extractor scans.
    pub fn to_text(self) -> String {
        self.lines().collect::<Vec<_>>().join("\n")
    }
}
