use std::borrow::Cow;
use std::fmt;

/// Exact-match event channel name.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Topic(Cow<'static, str>);

impl Topic {
    pub const FIRST_APPEARANCE: Topic = Topic::from_static("Character:FirstAppearance");
    pub const ACTION_START: Topic = Topic::from_static("Character:ActionStart");
    pub const DIE: Topic = Topic::from_static("Character:Die");
    pub const DETERMINING: Topic = Topic::from_static("Skill:Determining");
    pub const TARGETING: Topic = Topic::from_static("Skill:Targeting");
    pub const CAUSING_DAMAGE: Topic = Topic::from_static("Skill:CausingDamage");
    pub const IMMUTE: Topic = Topic::from_static("Skill:Immute");
    pub const CAUSING_DEFENSE: Topic = Topic::from_static("Skill:CausingDefense");
    pub const TAKE_DAMAGE: Topic = Topic::from_static("Skill:TakeDamage");
    pub const CAUSING_HEAL: Topic = Topic::from_static("Skill:CausingHeal");
    pub const GET_HEALED: Topic = Topic::from_static("Skill:GetHealed");
    pub const GET_DEFENSE: Topic = Topic::from_static("Skill:GetDefense");
    pub const REVIVED: Topic = Topic::from_static("Skill:Revived");

    pub const fn from_static(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    pub fn new(name: impl Into<String>) -> Self {
        Self(Cow::Owned(name.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&'static str> for Topic {
    fn from(name: &'static str) -> Self {
        Self::from_static(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_is_the_string() {
        assert_eq!(Topic::new("Skill:TakeDamage"), Topic::TAKE_DAMAGE);
        assert_ne!(Topic::new("Skill:TakeDamage "), Topic::TAKE_DAMAGE);
    }
}
