use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Predicate of every emitted cardinality assertion
pub const CARDINALITY_MARKER: &str = "hasExactCardinality";

/// The closed set of predicates the engine recognises.
///
/// Codes follow the Wikidata property identifiers the dataset is built from.
/// Nine predicates are relational and live in the fact store; `Gender` and
/// `DateOfDeath` are auxiliary and only feed the loader's side tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Predicate {
    /// (child, father-of, father)
    #[serde(rename = "P22")]
    Father,
    /// (child, mother-of, mother)
    #[serde(rename = "P25")]
    Mother,
    /// Symmetric marriage relation
    #[serde(rename = "P26")]
    Spouse,
    /// (parent, child-of, child), the direction the raw data lists children in
    #[serde(rename = "P40")]
    Child,
    /// Symmetric sibling relation
    #[serde(rename = "P3373")]
    Sibling,
    /// (child, stepparent-of, stepparent)
    #[serde(rename = "P3448")]
    Stepparent,
    /// Place of birth
    #[serde(rename = "P19")]
    Birthplace,
    /// Place of death
    #[serde(rename = "P20")]
    Deathplace,
    /// Country of citizenship
    #[serde(rename = "P27")]
    Citizenship,
    /// Auxiliary: sex or gender code of the subject
    #[serde(rename = "P21")]
    Gender,
    /// Auxiliary: the subject has a recorded date of death
    #[serde(rename = "P570")]
    DateOfDeath,
}

impl Predicate {
    /// Every recognised predicate, relational ones first.
    pub const ALL: [Self; 11] = [
        Self::Father,
        Self::Mother,
        Self::Spouse,
        Self::Child,
        Self::Sibling,
        Self::Stepparent,
        Self::Birthplace,
        Self::Deathplace,
        Self::Citizenship,
        Self::Gender,
        Self::DateOfDeath,
    ];

    /// Predicates stored in the fact store and written to the completed output.
    pub const RELATIONAL: [Self; 9] = [
        Self::Father,
        Self::Mother,
        Self::Spouse,
        Self::Child,
        Self::Sibling,
        Self::Stepparent,
        Self::Birthplace,
        Self::Deathplace,
        Self::Citizenship,
    ];

    /// Predicates whose facts hold in both directions.
    pub const SYMMETRIC: [Self; 2] = [Self::Sibling, Self::Spouse];

    /// The short code used on the wire.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Father => "P22",
            Self::Mother => "P25",
            Self::Spouse => "P26",
            Self::Child => "P40",
            Self::Sibling => "P3373",
            Self::Stepparent => "P3448",
            Self::Birthplace => "P19",
            Self::Deathplace => "P20",
            Self::Citizenship => "P27",
            Self::Gender => "P21",
            Self::DateOfDeath => "P570",
        }
    }

    /// Human readable role name.
    #[must_use]
    pub const fn role(self) -> &'static str {
        match self {
            Self::Father => "father-of",
            Self::Mother => "mother-of",
            Self::Spouse => "spouse-of",
            Self::Child => "child-of",
            Self::Sibling => "sibling-of",
            Self::Stepparent => "stepparent-of",
            Self::Birthplace => "birthplace",
            Self::Deathplace => "deathplace",
            Self::Citizenship => "citizenship",
            Self::Gender => "gender",
            Self::DateOfDeath => "has-death-date",
        }
    }

    /// Looks a predicate up by its short code.
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.code() == code)
    }

    /// Dense index among [`Predicate::RELATIONAL`], `None` for auxiliary predicates.
    #[must_use]
    pub const fn relational_index(self) -> Option<usize> {
        match self {
            Self::Father => Some(0),
            Self::Mother => Some(1),
            Self::Spouse => Some(2),
            Self::Child => Some(3),
            Self::Sibling => Some(4),
            Self::Stepparent => Some(5),
            Self::Birthplace => Some(6),
            Self::Deathplace => Some(7),
            Self::Citizenship => Some(8),
            Self::Gender | Self::DateOfDeath => None,
        }
    }

    /// Whether facts under this predicate are kept in the fact store.
    #[must_use]
    pub const fn is_relational(self) -> bool {
        self.relational_index().is_some()
    }

    /// Whether `(s, p, o)` implies `(o, p, s)`.
    #[must_use]
    pub const fn is_symmetric(self) -> bool {
        matches!(self, Self::Sibling | Self::Spouse)
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Error returned when a code is outside the closed predicate set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsePredicateError {
    /// The rejected code
    pub code: String,
}

impl fmt::Display for ParsePredicateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unrecognised predicate code: {}", self.code)
    }
}

impl std::error::Error for ParsePredicateError {}

impl FromStr for Predicate {
    type Err = ParsePredicateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_code(s).ok_or_else(|| ParsePredicateError {
            code: s.to_string(),
        })
    }
}

/// The two gender codes that drive parent inference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    /// `Q6581097`
    Male,
    /// `Q6581072`
    Female,
}

impl Gender {
    /// Maps a raw gender object to a recognised gender; other codes yield `None`.
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "Q6581097" => Some(Self::Male),
            "Q6581072" => Some(Self::Female),
            _ => None,
        }
    }

    /// The entity code of this gender.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Male => "Q6581097",
            Self::Female => "Q6581072",
        }
    }

    /// The parent predicate a child of a person with this gender receives.
    #[must_use]
    pub const fn parent_predicate(self) -> Predicate {
        match self {
            Self::Male => Predicate::Father,
            Self::Female => Predicate::Mother,
        }
    }
}

/// A normalised `(subject, predicate, object)` line as produced by the loader.
///
/// The predicate is kept as text because the raw dump carries many predicates
/// outside the closed set; classification happens after normalisation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Triple {
    /// Subject identifier
    pub subject: String,
    /// Predicate code
    pub predicate: String,
    /// Object identifier
    pub object: String,
}

impl Triple {
    /// Builds a triple from its three fields.
    pub fn new(
        subject: impl Into<String>,
        predicate: impl Into<String>,
        object: impl Into<String>,
    ) -> Self {
        Self {
            subject: subject.into(),
            predicate: predicate.into(),
            object: object.into(),
        }
    }

    /// The predicate of this triple if it belongs to the closed set.
    #[must_use]
    pub fn recognised_predicate(&self) -> Option<Predicate> {
        Predicate::from_code(&self.predicate)
    }
}

impl fmt::Display for Triple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\t{}\t{}", self.subject, self.predicate, self.object)
    }
}

/// Derived statement that `subject` has exactly `count` objects under `predicate`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CardinalityAssertion {
    /// The subject identifier
    pub subject: String,
    /// The predicate the count applies to
    pub predicate: Predicate,
    /// Assumed-exact number of related objects
    pub count: usize,
}

impl CardinalityAssertion {
    /// Composite subject written to the cardinality output, `<subject>|<code>`.
    #[must_use]
    pub fn composite_subject(&self) -> String {
        format!("{}|{}", self.subject, self.predicate.code())
    }
}

impl fmt::Display for CardinalityAssertion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}|{}\t{}\t{}",
            self.subject,
            self.predicate.code(),
            CARDINALITY_MARKER,
            self.count
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_round_trip_through_from_code() {
        for predicate in Predicate::ALL {
            assert_eq!(Predicate::from_code(predicate.code()), Some(predicate));
        }
        assert_eq!(Predicate::from_code("P31"), None);
    }

    #[test]
    fn relational_indexes_are_dense() {
        for (i, predicate) in Predicate::RELATIONAL.into_iter().enumerate() {
            assert_eq!(predicate.relational_index(), Some(i));
        }
        assert!(!Predicate::Gender.is_relational());
        assert!(!Predicate::DateOfDeath.is_relational());
    }

    #[test]
    fn symmetric_set_matches_flag() {
        for predicate in Predicate::ALL {
            assert_eq!(
                predicate.is_symmetric(),
                Predicate::SYMMETRIC.contains(&predicate)
            );
        }
    }

    #[test]
    fn unknown_code_fails_to_parse() {
        let err = "P999".parse::<Predicate>().unwrap_err();
        assert_eq!(err.code, "P999");
        assert_eq!(err.to_string(), "unrecognised predicate code: P999");
    }

    #[test]
    fn gender_codes() {
        assert_eq!(Gender::from_code("Q6581097"), Some(Gender::Male));
        assert_eq!(Gender::from_code("Q6581072"), Some(Gender::Female));
        assert_eq!(Gender::from_code("Q1052281"), None);
        assert_eq!(Gender::Male.parent_predicate(), Predicate::Father);
        assert_eq!(Gender::Female.parent_predicate(), Predicate::Mother);
    }

    #[test]
    fn cardinality_assertion_renders_composite_subject() {
        let assertion = CardinalityAssertion {
            subject: "Q1".to_string(),
            predicate: Predicate::Spouse,
            count: 2,
        };
        assert_eq!(assertion.composite_subject(), "Q1|P26");
        assert_eq!(assertion.to_string(), "Q1|P26\thasExactCardinality\t2");
    }

    #[test]
    fn predicate_serializes_as_code() {
        assert_eq!(serde_json::to_string(&Predicate::Sibling).unwrap(), "\"P3373\"");
    }
}
