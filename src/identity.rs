use std::collections::HashMap;

pub const PROFILE_BASE_URL: &str = "https://www.instagram.com";

const AVATAR_BASE_URL: &str = "https://api.dicebear.com/7.x/avataaars/svg";

/// A single account handle as it appeared in an export.
///
/// Equality and hashing go through the canonical key (trimmed, lower-cased),
/// while `handle` keeps the casing that was first seen.
#[derive(Debug, Clone)]
pub struct UserIdentity {
    handle: String,
    key: String,
}

impl UserIdentity {
    /// Returns `None` when `raw` is blank after trimming.
    pub fn new(raw: &str) -> Option<Self> {
        let handle = raw.trim();
        if handle.is_empty() {
            return None;
        }

        Some(Self {
            handle: handle.to_string(),
            key: canonical_key(handle),
        })
    }

    pub fn handle(&self) -> &str {
        &self.handle
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn profile_url(&self) -> String {
        format!("{}/{}", PROFILE_BASE_URL, self.handle)
    }

    pub fn avatar_url(&self) -> String {
        format!(
            "{}?seed={}&backgroundColor=b6e3f4,c0aede,d1d4f9,ffd5dc,ffdfbf",
            AVATAR_BASE_URL, self.handle
        )
    }
}

impl PartialEq for UserIdentity {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for UserIdentity {}

impl std::hash::Hash for UserIdentity {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

pub fn canonical_key(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Canonical key -> epoch seconds. A missing key means the date is unknown.
pub type TimestampMap = HashMap<String, i64>;

/// Case-insensitive set of identities keyed by canonical key.
#[derive(Debug, Clone, Default)]
pub struct IdentitySet {
    members: HashMap<String, UserIdentity>,
}

impl IdentitySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `identity` unless its key is already present. Returns `true`
    /// when the set grew; the existing display form is kept otherwise.
    pub fn insert(&mut self, identity: UserIdentity) -> bool {
        match self.members.entry(identity.key.clone()) {
            std::collections::hash_map::Entry::Occupied(_) => false,
            std::collections::hash_map::Entry::Vacant(slot) => {
                slot.insert(identity);
                true
            }
        }
    }

    pub fn contains(&self, identity: &UserIdentity) -> bool {
        self.members.contains_key(identity.key())
    }

    pub fn contains_handle(&self, raw: &str) -> bool {
        self.members.contains_key(&canonical_key(raw))
    }

    pub fn get(&self, raw: &str) -> Option<&UserIdentity> {
        self.members.get(&canonical_key(raw))
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &UserIdentity> {
        self.members.values()
    }

    /// Members of `self` whose key is absent from `other`.
    pub fn difference(&self, other: &IdentitySet) -> IdentitySet {
        self.iter()
            .filter(|identity| !other.contains(identity))
            .cloned()
            .collect()
    }

    /// Members present in both sets, with display forms taken from `self`.
    pub fn intersection(&self, other: &IdentitySet) -> IdentitySet {
        self.iter()
            .filter(|identity| other.contains(identity))
            .cloned()
            .collect()
    }

    /// Members ordered case-insensitively by handle.
    pub fn sorted(&self) -> Vec<&UserIdentity> {
        let mut users: Vec<&UserIdentity> = self.members.values().collect();
        users.sort_by(|a, b| a.key.cmp(&b.key).then_with(|| a.handle.cmp(&b.handle)));
        users
    }
}

impl PartialEq for IdentitySet {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|identity| other.contains(identity))
    }
}

impl Eq for IdentitySet {}

impl FromIterator<UserIdentity> for IdentitySet {
    fn from_iter<I: IntoIterator<Item = UserIdentity>>(iter: I) -> Self {
        let mut set = IdentitySet::new();
        set.extend(iter);
        set
    }
}

impl Extend<UserIdentity> for IdentitySet {
    fn extend<I: IntoIterator<Item = UserIdentity>>(&mut self, iter: I) {
        for identity in iter {
            self.insert(identity);
        }
    }
}

impl<'a> FromIterator<&'a str> for IdentitySet {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        iter.into_iter().filter_map(UserIdentity::new).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;
    use std::collections::HashSet;
    use std::hash::{Hash, Hasher};

    fn hash_of(identity: &UserIdentity) -> u64 {
        let mut hasher = DefaultHasher::new();
        identity.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn equality_ignores_case_and_whitespace() {
        let a = UserIdentity::new("  User1 ").unwrap();
        let b = UserIdentity::new("user1").unwrap();
        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));
        assert_eq!(a.handle(), "User1");
    }

    #[test]
    fn different_handles_are_not_equal() {
        let a = UserIdentity::new("user1").unwrap();
        let b = UserIdentity::new("user2").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn blank_handle_is_rejected() {
        assert!(UserIdentity::new("").is_none());
        assert!(UserIdentity::new("   \t").is_none());
    }

    #[test]
    fn std_hash_set_collapses_case_variants() {
        let set: HashSet<UserIdentity> = ["USER1", "user1", " User1 "]
            .into_iter()
            .filter_map(UserIdentity::new)
            .collect();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn first_inserted_display_form_survives() {
        let mut set = IdentitySet::new();
        assert!(set.insert(UserIdentity::new("MixedCase").unwrap()));
        assert!(!set.insert(UserIdentity::new("mixedcase").unwrap()));
        assert_eq!(set.len(), 1);
        assert_eq!(set.get("MIXEDCASE").unwrap().handle(), "MixedCase");
    }

    #[test]
    fn profile_url_uses_display_handle() {
        let user = UserIdentity::new("Some.User").unwrap();
        assert_eq!(user.profile_url(), "https://www.instagram.com/Some.User");
        assert!(user.avatar_url().contains("seed=Some.User"));
    }

    #[test]
    fn sorted_is_case_insensitive() {
        let set: IdentitySet = ["bravo", "Alpha", "charlie"].into_iter().collect();
        let handles: Vec<&str> = set.sorted().into_iter().map(|u| u.handle()).collect();
        assert_eq!(handles, vec!["Alpha", "bravo", "charlie"]);
    }

    #[test]
    fn set_algebra() {
        let left: IdentitySet = ["a", "B", "c"].into_iter().collect();
        let right: IdentitySet = ["b", "d"].into_iter().collect();

        let only_left: IdentitySet = ["a", "c"].into_iter().collect();
        let both: IdentitySet = ["b"].into_iter().collect();
        assert_eq!(left.difference(&right), only_left);
        assert_eq!(left.intersection(&right), both);
        assert_eq!(left.intersection(&right).get("b").unwrap().handle(), "B");
    }
}
