//! Assignment classes for dataset numbers.
//!
//! The assignment class records which authority handed out a dataset number. Each class owns a
//! fixed digit width for the dataset field, so the class can be recovered from the length of an
//! encoded object number alone (see [`crate::lengths`]).

use crate::base62;

/// Who assigned a dataset number, and therefore how wide its dataset field is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum AssignmentClass {
    /// Datasets registered by the numbering authority (3 digits)
    Authoritative,
    /// Registered users of a numbering authority (5 digits)
    Registered,
    /// Unregistered users of a numbering authority (7 digits)
    Unregistered,
    /// Self-assigned numbers (9 digits)
    #[default]
    SelfAssigned,
}

impl AssignmentClass {
    /// All classes, from the narrowest dataset field to the widest.
    pub const ALL: [AssignmentClass; 4] = [
        AssignmentClass::Authoritative,
        AssignmentClass::Registered,
        AssignmentClass::Unregistered,
        AssignmentClass::SelfAssigned,
    ];

    /// Number of base62 digits in the dataset field.
    pub const fn digits(self) -> usize {
        match self {
            AssignmentClass::Authoritative => 3,
            AssignmentClass::Registered => 5,
            AssignmentClass::Unregistered => 7,
            AssignmentClass::SelfAssigned => 9,
        }
    }

    /// Exclusive upper bound of dataset values for this class (`62^digits`).
    pub const fn capacity(self) -> u64 {
        base62::capacity(self.digits() as u32)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            AssignmentClass::Authoritative => "authoritative",
            AssignmentClass::Registered => "registered",
            AssignmentClass::Unregistered => "unregistered",
            AssignmentClass::SelfAssigned => "self",
        }
    }
}

impl std::fmt::Display for AssignmentClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AssignmentClass {
    type Err = AssignmentClassError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|class| class.as_str() == s)
            .ok_or_else(|| AssignmentClassError(s.to_string()))
    }
}

impl serde::Serialize for AssignmentClass {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.as_str().serialize(serializer)
    }
}

impl<'de> serde::Deserialize<'de> for AssignmentClass {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        value.parse().map_err(serde::de::Error::custom)
    }
}

/// Error type for [`AssignmentClass`] parsing failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error(
    "unknown assignment class '{0}' (expected 'authoritative', 'registered', 'unregistered' or 'self')"
)]
pub struct AssignmentClassError(pub String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_str_accepts_every_class_name() {
        for class in AssignmentClass::ALL {
            let parsed: AssignmentClass = class
                .as_str()
                .parse()
                .expect("canonical class name should parse");
            assert_eq!(parsed, class);
        }
    }

    #[test]
    fn from_str_with_unknown_name_fails() {
        let result = "authority".parse::<AssignmentClass>();
        assert_eq!(result, Err(AssignmentClassError("authority".to_string())));
    }

    #[test]
    fn self_assigned_capacity_covers_nine_digits() {
        assert_eq!(AssignmentClass::SelfAssigned.capacity(), 62u64.pow(9));
        assert_eq!(AssignmentClass::default(), AssignmentClass::SelfAssigned);
    }
}
