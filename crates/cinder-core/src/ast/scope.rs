use super::ExprKey;
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

/// Names and cached computations owned by one function body or one `if` branch
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scope {
    /// Names directly assigned within this block
    #[serde(default)]
    pub local_identifiers: IndexSet<String>,
    /// Cached source expression -> synthesized alias, in introduction order
    #[serde(default, with = "alias_entries")]
    pub aliased_expression_map: IndexMap<ExprKey, String>,
    #[serde(default)]
    pub alias_name_set: IndexSet<String>,
}

impl Scope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an alias and declare it local to this scope
    pub fn register_alias(&mut self, key: ExprKey, alias: impl Into<String>) {
        let alias = alias.into();
        self.local_identifiers.insert(alias.clone());
        self.alias_name_set.insert(alias.clone());
        self.aliased_expression_map.entry(key).or_insert(alias);
    }

    /// Drop an alias that moved to another scope
    pub fn forget_alias(&mut self, key: &ExprKey) -> Option<String> {
        let alias = self.aliased_expression_map.shift_remove(key)?;
        self.local_identifiers.shift_remove(&alias);
        self.alias_name_set.shift_remove(&alias);
        Some(alias)
    }

    pub fn alias_for(&self, key: &ExprKey) -> Option<&str> {
        self.aliased_expression_map.get(key).map(String::as_str)
    }

    pub fn declares(&self, name: &str) -> bool {
        self.local_identifiers.contains(name)
    }
}

/// JSON object keys must be strings, so the alias map is stored as a list of pairs
mod alias_entries {
    use super::ExprKey;
    use indexmap::IndexMap;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        map: &IndexMap<ExprKey, String>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(map.iter())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<IndexMap<ExprKey, String>, D::Error> {
        let entries = Vec::<(ExprKey, String)>::deserialize(deserializer)?;
        Ok(entries.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_alias_declares_local() {
        let mut scope = Scope::new();
        scope.register_alias(ExprKey::Placeholder("foo".into()), "_rph_foo");

        assert!(scope.declares("_rph_foo"));
        assert!(scope.alias_name_set.contains("_rph_foo"));
        assert_eq!(
            scope.alias_for(&ExprKey::Placeholder("foo".into())),
            Some("_rph_foo")
        );
    }

    #[test]
    fn test_forget_alias_keeps_order_of_the_rest() {
        let mut scope = Scope::new();
        scope.register_alias(ExprKey::Placeholder("a".into()), "_rph_a");
        scope.register_alias(ExprKey::Placeholder("b".into()), "_rph_b");
        scope.register_alias(ExprKey::Placeholder("c".into()), "_rph_c");

        assert_eq!(
            scope.forget_alias(&ExprKey::Placeholder("b".into())),
            Some("_rph_b".to_string())
        );
        let remaining: Vec<_> = scope.aliased_expression_map.values().cloned().collect();
        assert_eq!(remaining, vec!["_rph_a", "_rph_c"]);
        assert!(!scope.declares("_rph_b"));
    }

    #[test]
    fn test_alias_map_serializes_as_pairs() {
        let mut scope = Scope::new();
        scope.register_alias(
            ExprKey::filtered(None, ExprKey::Identifier("_rph_foo".into())),
            "_fph00000000",
        );

        let json = serde_json::to_value(&scope).unwrap();
        assert!(json["aliased_expression_map"].is_array());

        let back: Scope = serde_json::from_value(json).unwrap();
        assert_eq!(back, scope);
    }
}
