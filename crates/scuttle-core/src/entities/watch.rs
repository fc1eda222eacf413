//! Watch relationship - one user following another

/// Which side of the watch relationship to list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WatchDirection {
    /// Users the subject is watching
    #[default]
    Watching,
    /// Users watching the subject
    WatchedBy,
}

impl WatchDirection {
    /// Map the "watched by others" flag used by profile pages
    pub const fn from_watched_by(watched_by: bool) -> Self {
        if watched_by {
            Self::WatchedBy
        } else {
            Self::Watching
        }
    }
}
