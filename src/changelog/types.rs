/// Template used when neither the command line nor the config file sets one.
pub const DEFAULT_TEMPLATE: &str = "- %title% (#%id%)";

/// A rendered changelog, ready for output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Changelog {
    /// "Found N pull requests ..." or "Could not find any pull requests ..."
    pub summary: String,
    /// One rendered line per pull request, joined by newlines
    pub body: String,
    /// Number of pull requests rendered
    pub count: usize,
}

impl Changelog {
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}
