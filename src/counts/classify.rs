/// Kind of a requested identifier, decided purely by its spelling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentifierKind {
    Hashtag,
    Topic,
}

impl IdentifierKind {
    pub fn of(id: &str) -> Self {
        if id.starts_with('#') {
            IdentifierKind::Hashtag
        } else {
            IdentifierKind::Topic
        }
    }
}

/// Split ids into `(hashtags, topics)`, keeping relative order in each group.
pub fn classify(ids: &[String]) -> (Vec<String>, Vec<String>) {
    ids.iter()
        .cloned()
        .partition(|id| IdentifierKind::of(id) == IdentifierKind::Hashtag)
}
