//! Skill name normalization against the taxonomy

use crate::processing::taxonomy::{
    compact_key, fold_key, SkillCategory, SkillId, SkillIdentity, SkillTaxonomy,
    DEFAULT_DIFFICULTY,
};
use log::debug;
use strsim::jaro_winkler;

/// Shortest folded name eligible for fuzzy matching, on either side. Short
/// aliases like "scala" or "go" sit one keystroke away from unrelated words.
const MIN_FUZZY_LEN: usize = 6;

/// Largest length difference a fuzzy match may bridge. Jaro-Winkler rewards a
/// shared prefix, so "Angular Material" would otherwise land on "angular".
const MAX_FUZZY_LEN_GAP: usize = 2;

/// Aliases that are also everyday words. They still resolve skill names but
/// never count as a mention in free text ("go live", "next quarter").
const COMMON_WORD_ALIASES: &[&str] = &["go", "next", "shell", "containers", "rest"];

/// A raw skill name resolved against the taxonomy.
#[derive(Debug, Clone, PartialEq)]
pub enum NormalizedSkill<'t> {
    Known(&'t SkillIdentity),
    /// Not in the taxonomy; keyed by its folded name and kept in output.
    Unknown { id: SkillId, raw: String },
}

impl<'t> NormalizedSkill<'t> {
    pub fn id(&self) -> &SkillId {
        match self {
            NormalizedSkill::Known(identity) => &identity.id,
            NormalizedSkill::Unknown { id, .. } => id,
        }
    }

    pub fn display_name(&self) -> &str {
        match self {
            NormalizedSkill::Known(identity) => &identity.display_name,
            NormalizedSkill::Unknown { raw, .. } => raw,
        }
    }

    pub fn difficulty(&self) -> f64 {
        match self {
            NormalizedSkill::Known(identity) => identity.difficulty,
            NormalizedSkill::Unknown { .. } => DEFAULT_DIFFICULTY,
        }
    }

    pub fn category(&self) -> SkillCategory {
        match self {
            NormalizedSkill::Known(identity) => identity.category,
            NormalizedSkill::Unknown { .. } => SkillCategory::Other,
        }
    }

    pub fn identity(&self) -> Option<&'t SkillIdentity> {
        match self {
            NormalizedSkill::Known(identity) => Some(identity),
            NormalizedSkill::Unknown { .. } => None,
        }
    }

    pub fn is_known(&self) -> bool {
        matches!(self, NormalizedSkill::Known(_))
    }

    /// Names that identify this skill in free text.
    pub fn mention_keys(&self) -> Vec<String> {
        match self {
            NormalizedSkill::Known(identity) => identity
                .aliases
                .iter()
                .filter(|alias| !COMMON_WORD_ALIASES.contains(&alias.as_str()))
                .cloned()
                .collect(),
            NormalizedSkill::Unknown { id, .. } => vec![id.as_str().to_string()],
        }
    }
}

pub struct SkillNormalizer<'t> {
    taxonomy: &'t SkillTaxonomy,
    fuzzy_threshold: f64,
}

impl<'t> SkillNormalizer<'t> {
    pub fn new(taxonomy: &'t SkillTaxonomy, fuzzy_threshold: f64) -> Self {
        Self {
            taxonomy,
            fuzzy_threshold,
        }
    }

    /// Resolve one name. Blank input yields `None`.
    pub fn normalize_one(&self, raw: &str) -> Option<NormalizedSkill<'t>> {
        let folded = fold_key(raw);
        if folded.is_empty() {
            return None;
        }

        if let Some(identity) = self.taxonomy.lookup(&folded) {
            return Some(NormalizedSkill::Known(identity));
        }

        if let Some(identity) = self.fuzzy_lookup(&folded) {
            debug!("Fuzzy-matched skill '{}' to '{}'", raw.trim(), identity.id);
            return Some(NormalizedSkill::Known(identity));
        }

        // Unknown names are keyed by the compact form so spacing variants collapse.
        let id = SkillId::new(compact_key(&folded));
        Some(NormalizedSkill::Unknown {
            id,
            raw: raw.split_whitespace().collect::<Vec<_>>().join(" "),
        })
    }

    /// Resolve a list of names, dropping blanks and duplicates while keeping
    /// first-seen order.
    pub fn normalize<S: AsRef<str>>(&self, raw: &[S]) -> Vec<NormalizedSkill<'t>> {
        let mut out: Vec<NormalizedSkill<'t>> = Vec::new();
        for name in raw {
            if let Some(skill) = self.normalize_one(name.as_ref()) {
                if !out.iter().any(|s| s.id() == skill.id()) {
                    out.push(skill);
                }
            }
        }
        out
    }

    fn fuzzy_lookup(&self, folded: &str) -> Option<&'t SkillIdentity> {
        let len = folded.chars().count();
        if len < MIN_FUZZY_LEN {
            return None;
        }

        let mut best: Option<(f64, &SkillId)> = None;
        for (alias, id) in self.taxonomy.alias_keys() {
            let alias_len = alias.chars().count();
            if alias_len < MIN_FUZZY_LEN || alias_len.abs_diff(len) > MAX_FUZZY_LEN_GAP {
                continue;
            }
            let score = jaro_winkler(folded, alias);
            // Strictly greater keeps the first (lexicographically smallest) alias on ties.
            if score >= self.fuzzy_threshold && best.map_or(true, |(b, _)| score > b) {
                best = Some((score, id));
            }
        }

        best.and_then(|(_, id)| self.taxonomy.get(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalizer(taxonomy: &SkillTaxonomy) -> SkillNormalizer<'_> {
        SkillNormalizer::new(taxonomy, 0.94)
    }

    #[test]
    fn test_aliases_resolve_to_same_identity() {
        let taxonomy = SkillTaxonomy::builtin();
        let n = normalizer(&taxonomy);
        let skills = n.normalize(&["React", "reactjs", "React.js", "REACT"]);
        assert_eq!(skills.len(), 1);
        assert_eq!(skills[0].id().as_str(), "react");
        assert_eq!(skills[0].display_name(), "React");
    }

    #[test]
    fn test_unknown_skill_is_kept() {
        let taxonomy = SkillTaxonomy::builtin();
        let n = normalizer(&taxonomy);
        let skill = n.normalize_one("Quantum Basket Weaving").unwrap();
        assert!(!skill.is_known());
        assert_eq!(skill.display_name(), "Quantum Basket Weaving");
        assert_eq!(skill.difficulty(), DEFAULT_DIFFICULTY);
    }

    #[test]
    fn test_blank_names_are_dropped() {
        let taxonomy = SkillTaxonomy::builtin();
        let n = normalizer(&taxonomy);
        assert!(n.normalize_one("   ").is_none());
        assert!(n.normalize(&["", " ", "\t"]).is_empty());
    }

    #[test]
    fn test_fuzzy_match_catches_typos() {
        let taxonomy = SkillTaxonomy::builtin();
        let n = normalizer(&taxonomy);
        let skill = n.normalize_one("Kubernetess").unwrap();
        assert_eq!(skill.id().as_str(), "kubernetes");
    }

    #[test]
    fn test_short_names_are_not_fuzzy_matched() {
        let taxonomy = SkillTaxonomy::builtin();
        let n = normalizer(&taxonomy);
        assert!(!n.normalize_one("gox").unwrap().is_known());
        assert!(!n.normalize_one("Scalar").unwrap().is_known());
    }

    #[test]
    fn test_longer_names_sharing_a_prefix_stay_unknown() {
        let taxonomy = SkillTaxonomy::builtin();
        let n = normalizer(&taxonomy);
        for name in ["Angular Material", "Express Gateway", "Containerd", "Dockerfile"] {
            let skill = n.normalize_one(name).unwrap();
            assert!(!skill.is_known(), "{} resolved to {}", name, skill.id());
            assert_eq!(skill.display_name(), name);
        }
    }

    #[test]
    fn test_punctuation_led_alias_needs_its_punctuation() {
        let taxonomy = SkillTaxonomy::builtin();
        let n = normalizer(&taxonomy);
        assert_eq!(n.normalize_one(".NET").unwrap().id().as_str(), "csharp");
        assert!(!n.normalize_one("Net").unwrap().is_known());
    }

    #[test]
    fn test_common_word_aliases_are_not_mention_keys() {
        let taxonomy = SkillTaxonomy::builtin();
        let n = normalizer(&taxonomy);
        let go = n.normalize_one("go").unwrap();
        assert_eq!(go.id().as_str(), "golang");
        let keys = go.mention_keys();
        assert!(!keys.contains(&"go".to_string()));
        assert!(keys.contains(&"golang".to_string()));

        let next = n.normalize_one("Next").unwrap();
        assert_eq!(next.id().as_str(), "nextjs");
        assert!(next.mention_keys().contains(&"next.js".to_string()));
        assert!(!next.mention_keys().contains(&"next".to_string()));
    }

    #[test]
    fn test_normalization_is_idempotent() {
        let taxonomy = SkillTaxonomy::builtin();
        let n = normalizer(&taxonomy);
        let first = n.normalize(&["Node.js", "Postgres", "Elm", "k8s"]);
        let names: Vec<String> = first.iter().map(|s| s.display_name().to_string()).collect();
        let second = n.normalize(&names);
        let first_ids: Vec<_> = first.iter().map(|s| s.id().clone()).collect();
        let second_ids: Vec<_> = second.iter().map(|s| s.id().clone()).collect();
        assert_eq!(first_ids, second_ids);
    }
}
