use serde::{Deserialize, Deserializer};

/// Three-state field for partial updates.
///
/// A field absent from the payload stays untouched; an explicit `null` clears
/// the stored value; anything else overwrites it. Plain `Option` cannot tell
/// absent from null, which is exactly the distinction merge semantics need.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Patch<T> {
    #[default]
    Absent,
    Null,
    Value(T),
}

impl<T> Patch<T> {
    pub fn is_absent(&self) -> bool {
        matches!(self, Patch::Absent)
    }

    /// Merges this patch field onto the stored slot.
    pub fn apply_to(self, slot: &mut Option<T>) {
        match self {
            Patch::Absent => {}
            Patch::Null => *slot = None,
            Patch::Value(v) => *slot = Some(v),
        }
    }
}

// Declared fields must carry #[serde(default)] so a missing key becomes
// Absent instead of a deserialization error.
impl<'de, T> Deserialize<'de> for Patch<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<T>::deserialize(deserializer).map(|opt| match opt {
            Some(v) => Patch::Value(v),
            None => Patch::Null,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Payload {
        #[serde(default)]
        notes: Patch<String>,
    }

    #[test]
    fn absent_key_stays_absent() {
        let p: Payload = serde_json::from_str("{}").unwrap();
        assert_eq!(p.notes, Patch::Absent);

        let mut slot = Some("keep".to_string());
        p.notes.apply_to(&mut slot);
        assert_eq!(slot.as_deref(), Some("keep"));
    }

    #[test]
    fn explicit_null_clears() {
        let p: Payload = serde_json::from_str(r#"{"notes": null}"#).unwrap();
        assert_eq!(p.notes, Patch::Null);

        let mut slot = Some("old".to_string());
        p.notes.apply_to(&mut slot);
        assert_eq!(slot, None);
    }

    #[test]
    fn value_overwrites() {
        let p: Payload = serde_json::from_str(r#"{"notes": "new"}"#).unwrap();

        let mut slot = Some("old".to_string());
        p.notes.apply_to(&mut slot);
        assert_eq!(slot.as_deref(), Some("new"));
    }
}
