/// Read access to the page the tracker is embedded in.
///
/// Implementations answer with the state at call time; the tracker reads
/// all three values once per capture.
pub trait PageContext: Send + Sync {
    /// Full URL of the current location, including query and fragment.
    fn url(&self) -> String;

    /// Current document title.
    fn title(&self) -> String;

    /// The referring URL, or an empty string when there is none.
    fn referrer(&self) -> String;
}
