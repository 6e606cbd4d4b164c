//! Document identifiers.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Identifier of a stored document.
///
/// Displays as the canonical lowercase, hyphenated UUID, which is also the
/// document's file name inside the storage directory.
///
/// # Examples
///
/// ```
/// use geoshelf_core::DocumentId;
///
/// # fn main() -> Result<(), geoshelf_core::InvalidIdError> {
/// let id: DocumentId = "67E55044-10B1-426F-9247-BB680E5FE0C8".parse()?;
/// assert_eq!(id.to_string(), "67e55044-10b1-426f-9247-bb680e5fe0c8");
/// assert_eq!(DocumentId::from_file_name("67E55044-10B1-426F-9247-BB680E5FE0C8"), None);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(Uuid);

impl DocumentId {
    /// Generate a random (version 4) identifier.
    #[must_use]
    pub fn new_random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// The wrapped UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// Interpret a storage file name.
    ///
    /// Only the canonical form is accepted, so the returned identifier always
    /// maps back onto the same file.
    #[must_use]
    pub fn from_file_name(name: &str) -> Option<Self> {
        let id: Self = name.parse().ok()?;
        (id.to_string() == name).then_some(id)
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0.hyphenated(), f)
    }
}

/// Error returned when text does not parse as a [`DocumentId`].
#[derive(Debug, Error)]
#[error("`{input}` is not a valid document identifier: {source}")]
pub struct InvalidIdError {
    /// The rejected text.
    pub input: String,
    /// Parser failure reported by `uuid`.
    #[source]
    pub source: uuid::Error,
}

impl FromStr for DocumentId {
    type Err = InvalidIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|source| InvalidIdError {
                input: s.to_owned(),
                source,
            })
    }
}

impl From<Uuid> for DocumentId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

/// Supplies candidate identifiers for new documents.
///
/// The store checks every candidate against its index and asks again on a
/// collision, so implementations need not guarantee uniqueness themselves.
pub trait IdSource: Send + Sync {
    /// Produce the next candidate identifier.
    fn next_id(&self) -> DocumentId;
}

/// Random version 4 identifiers.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomIdSource;

impl IdSource for RandomIdSource {
    fn next_id(&self) -> DocumentId {
        DocumentId::new_random()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const CANONICAL: &str = "67e55044-10b1-426f-9247-bb680e5fe0c8";

    #[rstest]
    #[case(CANONICAL)]
    #[case("67E55044-10B1-426F-9247-BB680E5FE0C8")]
    #[case("67e5504410b1426f9247bb680e5fe0c8")]
    #[case("{67e55044-10b1-426f-9247-bb680e5fe0c8}")]
    #[case("urn:uuid:67e55044-10b1-426f-9247-bb680e5fe0c8")]
    fn parses_every_uuid_form(#[case] input: &str) {
        let id: DocumentId = input.parse().expect("valid uuid");
        assert_eq!(id.to_string(), CANONICAL);
    }

    #[rstest]
    #[case("not-a-uuid")]
    #[case("")]
    #[case("67e55044-10b1-426f-9247")]
    fn rejects_garbage(#[case] input: &str) {
        let err = input.parse::<DocumentId>().expect_err("invalid uuid");
        assert_eq!(err.input, input);
    }

    #[rstest]
    #[case(CANONICAL, true)]
    #[case("67E55044-10B1-426F-9247-BB680E5FE0C8", false)]
    #[case("67e5504410b1426f9247bb680e5fe0c8", false)]
    #[case("67e55044-10b1-426f-9247-bb680e5fe0c8.json", false)]
    #[case("not-a-uuid", false)]
    fn file_names_must_be_canonical(#[case] name: &str, #[case] accepted: bool) {
        assert_eq!(DocumentId::from_file_name(name).is_some(), accepted);
    }

    #[rstest]
    fn serializes_as_string() {
        let id: DocumentId = CANONICAL.parse().expect("valid uuid");
        let json = serde_json::to_string(&id).expect("serialize id");
        assert_eq!(json, format!("\"{CANONICAL}\""));
    }

    #[rstest]
    fn random_source_yields_distinct_ids() {
        let source = RandomIdSource;
        assert_ne!(source.next_id(), source.next_id());
    }
}
