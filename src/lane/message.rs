//! Snap message selection.

/// Message used when neither a title nor a commit message is available.
pub const FALLBACK_SNAP_MESSAGE: &str = "CI";

/// Human-authored message recorded on the snap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapMessage(String);

impl SnapMessage {
    /// Picks the pull request title, then the latest commit summary, then
    /// [`FALLBACK_SNAP_MESSAGE`]. Blank candidates are skipped.
    ///
    /// # Example
    ///
    /// ```
    /// use lanesync::lane::SnapMessage;
    /// use lanesync::local::HeadCommit;
    ///
    /// let head = HeadCommit::new("fix: widget padding\n\nbody", None);
    /// let message = SnapMessage::resolve(Some("  "), head.summary());
    /// assert_eq!(message.as_str(), "fix: widget padding");
    /// ```
    #[must_use]
    pub fn resolve(pr_title: Option<&str>, commit_summary: Option<&str>) -> Self {
        let non_blank = |text: &str| !text.is_empty();
        let title = pr_title.map(str::trim).filter(|title| non_blank(title));
        let summary = commit_summary
            .map(str::trim)
            .filter(|summary| non_blank(summary));

        Self(
            title
                .or(summary)
                .unwrap_or(FALLBACK_SNAP_MESSAGE)
                .to_owned(),
        )
    }

    /// Borrow the message text.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        self.0.as_str()
    }
}
