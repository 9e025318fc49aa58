/// The target characters of a session, in order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CharacterTape {
    target: Vec<char>,
}

impl CharacterTape {
    pub fn new(passage: &str) -> Self {
        Self {
            target: passage.chars().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.target.len()
    }

    pub fn is_empty(&self) -> bool {
        self.target.is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<char> {
        self.target.get(idx).copied()
    }

    pub fn chars(&self) -> &[char] {
        &self.target
    }

    /// Append late-arriving passage content, returning the new characters.
    pub fn extend(&mut self, more: &str) -> &[char] {
        let start = self.target.len();
        self.target.extend(more.chars());
        &self.target[start..]
    }
}

impl From<&str> for CharacterTape {
    fn from(passage: &str) -> Self {
        Self::new(passage)
    }
}

impl std::fmt::Display for CharacterTape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.target.iter().try_for_each(|c| write!(f, "{c}"))
    }
}
