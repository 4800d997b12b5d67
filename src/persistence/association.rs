use serde::{Serialize, Serializer};

// ============================================================================
// Association State
// ============================================================================
//
// Every association on an entity says whether the repository materialized
// it. Nothing downstream can fetch an `Unloaded` association on its own;
// callers that need it get a `NotLoaded` error and must pick a fetch
// strategy that loads it up front.
//
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum Assoc<T> {
    Unloaded,
    Loaded(T),
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("association `{0}` was not fetched by the chosen strategy")]
pub struct NotLoaded(pub &'static str);

impl<T> Assoc<T> {
    pub fn is_loaded(&self) -> bool {
        matches!(self, Assoc::Loaded(_))
    }

    pub fn is_unloaded(&self) -> bool {
        !self.is_loaded()
    }

    /// Borrow the loaded value, naming the association on failure.
    pub fn get(&self, name: &'static str) -> Result<&T, NotLoaded> {
        match self {
            Assoc::Loaded(value) => Ok(value),
            Assoc::Unloaded => Err(NotLoaded(name)),
        }
    }

    pub fn get_mut(&mut self, name: &'static str) -> Result<&mut T, NotLoaded> {
        match self {
            Assoc::Loaded(value) => Ok(value),
            Assoc::Unloaded => Err(NotLoaded(name)),
        }
    }
}

impl<T> Default for Assoc<T> {
    fn default() -> Self {
        Assoc::Unloaded
    }
}

impl<T> From<T> for Assoc<T> {
    fn from(value: T) -> Self {
        Assoc::Loaded(value)
    }
}

// Loaded values serialize transparently; unloaded ones as null. Entity
// fields skip unloaded associations entirely.
impl<T: Serialize> Serialize for Assoc<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Assoc::Loaded(value) => value.serialize(serializer),
            Assoc::Unloaded => serializer.serialize_none(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_on_unloaded_names_association() {
        let assoc: Assoc<i32> = Assoc::Unloaded;
        assert_eq!(assoc.get("member"), Err(NotLoaded("member")));
        assert!(assoc.is_unloaded());
    }

    #[test]
    fn test_get_on_loaded() {
        let mut assoc = Assoc::from(7);
        assert_eq!(assoc.get("count"), Ok(&7));
        *assoc.get_mut("count").unwrap() += 1;
        assert_eq!(assoc, Assoc::Loaded(8));
    }

    #[test]
    fn test_serialization() {
        assert_eq!(serde_json::to_string(&Assoc::Loaded("x")).unwrap(), "\"x\"");
        assert_eq!(serde_json::to_string(&Assoc::<i32>::Unloaded).unwrap(), "null");
    }
}
