//! Shared, read-only skill taxonomy.
//!
//! Loaded once by the host (built-in table or a TOML file) and handed to the
//! engine behind an `Arc`. Nothing mutates it after construction.

use crate::error::{MatchScorerError, Result};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

/// Learning cost assigned to skills the taxonomy does not know.
pub const DEFAULT_DIFFICULTY: f64 = 1.0;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SkillId(String);

impl SkillId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SkillId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SkillCategory {
    ProgrammingLanguage,
    Framework,
    Database,
    CloudPlatform,
    DevopsTool,
    SoftSkill,
    DomainKnowledge,
    Tool,
    Methodology,
    Certification,
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillIdentity {
    pub id: SkillId,
    pub display_name: String,
    pub category: SkillCategory,
    /// Relative learning cost; 1.0 is an average skill.
    pub difficulty: f64,
    /// Folded alias keys, display name and id included.
    pub aliases: Vec<String>,
    pub related: BTreeMap<SkillId, f64>,
    pub prerequisites: Vec<SkillId>,
    pub resources: Vec<String>,
}

/// One `[[skills]]` table in a taxonomy file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillDefinition {
    pub id: String,
    pub name: String,
    #[serde(default = "default_category")]
    pub category: SkillCategory,
    #[serde(default = "default_difficulty")]
    pub difficulty: f64,
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub related: BTreeMap<String, f64>,
    #[serde(default)]
    pub prerequisites: Vec<String>,
    #[serde(default)]
    pub resources: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaxonomyFile {
    #[serde(default)]
    pub skills: Vec<SkillDefinition>,
}

fn default_category() -> SkillCategory {
    SkillCategory::Other
}

fn default_difficulty() -> f64 {
    DEFAULT_DIFFICULTY
}

#[derive(Debug, Clone)]
pub struct SkillTaxonomy {
    skills: BTreeMap<SkillId, SkillIdentity>,
    aliases: BTreeMap<String, SkillId>,
}

/// Lowercase, trim and collapse internal whitespace.
pub fn fold_key(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Folded key with separators removed, so "Node.js", "node js" and "nodejs" agree.
pub fn compact_key(raw: &str) -> String {
    fold_key(raw)
        .chars()
        .filter(|c| !matches!(c, ' ' | '.' | '-' | '_' | '/'))
        .collect()
}

impl SkillTaxonomy {
    pub fn from_definitions(definitions: Vec<SkillDefinition>) -> Result<Self> {
        let mut skills: BTreeMap<SkillId, SkillIdentity> = BTreeMap::new();

        for def in &definitions {
            let id = SkillId::new(fold_key(&def.id));
            if id.as_str().is_empty() {
                return Err(MatchScorerError::Taxonomy(format!(
                    "skill '{}' has an empty id",
                    def.name
                )));
            }
            if skills.contains_key(&id) {
                return Err(MatchScorerError::Taxonomy(format!("duplicate skill id '{}'", id)));
            }
            if !(def.difficulty.is_finite() && def.difficulty > 0.0) {
                return Err(MatchScorerError::Taxonomy(format!(
                    "skill '{}' has a non-positive difficulty",
                    id
                )));
            }

            let mut aliases: Vec<String> = Vec::new();
            for alias in std::iter::once(&def.id)
                .chain(std::iter::once(&def.name))
                .chain(def.aliases.iter())
            {
                let key = fold_key(alias);
                if !key.is_empty() && !aliases.contains(&key) {
                    aliases.push(key);
                }
            }

            skills.insert(
                id.clone(),
                SkillIdentity {
                    id,
                    display_name: def.name.trim().to_string(),
                    category: def.category,
                    difficulty: def.difficulty,
                    aliases,
                    related: BTreeMap::new(),
                    prerequisites: Vec::new(),
                    resources: def.resources.clone(),
                },
            );
        }

        // Relations and prerequisites may reference skills defined later in the file.
        for def in &definitions {
            let id = SkillId::new(fold_key(&def.id));
            let mut related = BTreeMap::new();
            for (other, score) in &def.related {
                let other_id = SkillId::new(fold_key(other));
                if !skills.contains_key(&other_id) {
                    warn!("Skill '{}' relates to unknown skill '{}', ignoring", id, other_id);
                    continue;
                }
                if other_id == id {
                    continue;
                }
                related.insert(other_id, score.clamp(0.0, 1.0));
            }

            let mut prerequisites = Vec::new();
            for prereq in &def.prerequisites {
                let prereq_id = SkillId::new(fold_key(prereq));
                if !skills.contains_key(&prereq_id) {
                    warn!("Skill '{}' requires unknown skill '{}', ignoring", id, prereq_id);
                    continue;
                }
                if prereq_id != id && !prerequisites.contains(&prereq_id) {
                    prerequisites.push(prereq_id);
                }
            }

            if let Some(identity) = skills.get_mut(&id) {
                identity.related = related;
                identity.prerequisites = prerequisites;
            }
        }

        let mut aliases: BTreeMap<String, SkillId> = BTreeMap::new();
        for identity in skills.values() {
            for alias in &identity.aliases {
                // ".net" must not also answer to "net".
                let mut keys = vec![alias.clone()];
                if alias.chars().next().is_some_and(char::is_alphanumeric) {
                    keys.push(compact_key(alias));
                }
                for key in keys {
                    match aliases.get(&key) {
                        Some(existing) if existing != &identity.id => {
                            warn!(
                                "Alias '{}' claimed by both '{}' and '{}', keeping '{}'",
                                key, existing, identity.id, existing
                            );
                        }
                        Some(_) => {}
                        None => {
                            aliases.insert(key, identity.id.clone());
                        }
                    }
                }
            }
        }

        let taxonomy = Self { skills, aliases };
        let cycles = taxonomy.prerequisite_cycles();
        if !cycles.is_empty() {
            warn!(
                "Taxonomy contains {} prerequisite cycle(s); learning paths will break them",
                cycles.len()
            );
        }
        info!(
            "Loaded skill taxonomy: {} skills, {} alias keys",
            taxonomy.skills.len(),
            taxonomy.aliases.len()
        );
        Ok(taxonomy)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: TaxonomyFile = toml::from_str(content)?;
        Self::from_definitions(file.skills)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
            .map_err(|e| MatchScorerError::Taxonomy(format!("{}: {}", path.display(), e)))
    }

    pub fn get(&self, id: &SkillId) -> Option<&SkillIdentity> {
        self.skills.get(id)
    }

    /// Exact lookup on the folded key, then on the compact key.
    pub fn lookup(&self, raw: &str) -> Option<&SkillIdentity> {
        let folded = fold_key(raw);
        self.aliases
            .get(&folded)
            .or_else(|| self.aliases.get(&compact_key(&folded)))
            .and_then(|id| self.skills.get(id))
    }

    pub fn alias_keys(&self) -> impl Iterator<Item = (&str, &SkillId)> {
        self.aliases.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn skills(&self) -> impl Iterator<Item = &SkillIdentity> {
        self.skills.values()
    }

    pub fn len(&self) -> usize {
        self.skills.len()
    }

    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
    }

    /// Symmetric similarity in [0, 1]. Identical ids score 1; unrelated or
    /// unknown skills score 0.
    pub fn similarity(&self, a: &SkillId, b: &SkillId) -> f64 {
        if a == b {
            return 1.0;
        }
        let forward = self.skills.get(a).and_then(|s| s.related.get(b)).copied();
        let backward = self.skills.get(b).and_then(|s| s.related.get(a)).copied();
        forward
            .into_iter()
            .chain(backward)
            .fold(0.0_f64, f64::max)
            .clamp(0.0, 1.0)
    }

    pub fn prerequisites(&self, id: &SkillId) -> &[SkillId] {
        self.skills
            .get(id)
            .map(|s| s.prerequisites.as_slice())
            .unwrap_or(&[])
    }

    /// Every distinct prerequisite cycle, each listed from its smallest id.
    pub fn prerequisite_cycles(&self) -> Vec<Vec<SkillId>> {
        #[derive(Clone, Copy, PartialEq)]
        enum Mark {
            Unvisited,
            InProgress,
            Done,
        }

        fn visit<'a>(
            taxonomy: &'a SkillTaxonomy,
            id: &'a SkillId,
            marks: &mut BTreeMap<&'a SkillId, Mark>,
            stack: &mut Vec<&'a SkillId>,
            found: &mut BTreeSet<Vec<SkillId>>,
        ) {
            marks.insert(id, Mark::InProgress);
            stack.push(id);
            for prereq in taxonomy.prerequisites(id) {
                match marks.get(prereq).copied().unwrap_or(Mark::Unvisited) {
                    Mark::Unvisited => visit(taxonomy, prereq, marks, stack, found),
                    Mark::InProgress => {
                        if let Some(start) = stack.iter().position(|s| *s == prereq) {
                            let mut cycle: Vec<SkillId> =
                                stack[start..].iter().map(|s| (*s).clone()).collect();
                            if let Some(min_pos) = cycle
                                .iter()
                                .enumerate()
                                .min_by(|a, b| a.1.cmp(b.1))
                                .map(|(i, _)| i)
                            {
                                cycle.rotate_left(min_pos);
                            }
                            found.insert(cycle);
                        }
                    }
                    Mark::Done => {}
                }
            }
            stack.pop();
            marks.insert(id, Mark::Done);
        }

        let mut marks: BTreeMap<&SkillId, Mark> = BTreeMap::new();
        let mut found = BTreeSet::new();
        for id in self.skills.keys() {
            if marks.get(id).copied().unwrap_or(Mark::Unvisited) == Mark::Unvisited {
                let mut stack = Vec::new();
                visit(self, id, &mut marks, &mut stack, &mut found);
            }
        }
        found.into_iter().collect()
    }

    /// Built-in taxonomy covering common software engineering skills.
    pub fn builtin() -> Self {
        let definitions = builtin_definitions();
        match Self::from_definitions(definitions) {
            Ok(taxonomy) => taxonomy,
            Err(e) => {
                // The embedded table is static; a failure here is a build defect.
                warn!("Built-in taxonomy rejected ({}), using an empty taxonomy", e);
                Self {
                    skills: BTreeMap::new(),
                    aliases: BTreeMap::new(),
                }
            }
        }
    }
}

impl Default for SkillTaxonomy {
    fn default() -> Self {
        Self::builtin()
    }
}

fn def(
    id: &str,
    name: &str,
    category: SkillCategory,
    difficulty: f64,
    aliases: &[&str],
    related: &[(&str, f64)],
    prerequisites: &[&str],
) -> SkillDefinition {
    SkillDefinition {
        id: id.to_string(),
        name: name.to_string(),
        category,
        difficulty,
        aliases: aliases.iter().map(|s| s.to_string()).collect(),
        related: related.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
        prerequisites: prerequisites.iter().map(|s| s.to_string()).collect(),
        resources: Vec::new(),
    }
}

fn builtin_definitions() -> Vec<SkillDefinition> {
    use SkillCategory::*;

    let mut defs = vec![
        // Programming languages
        def("javascript", "JavaScript", ProgrammingLanguage, 1.0, &["js", "ecmascript", "es6"], &[("typescript", 0.8)], &[]),
        def("typescript", "TypeScript", ProgrammingLanguage, 0.8, &["ts"], &[], &["javascript"]),
        def("python", "Python", ProgrammingLanguage, 0.9, &["python3", "py"], &[("ruby", 0.6)], &[]),
        def("java", "Java", ProgrammingLanguage, 1.2, &["openjdk", "java8", "java11", "java17"], &[("csharp", 0.7), ("kotlin", 0.8), ("scala", 0.6)], &[]),
        def("csharp", "C#", ProgrammingLanguage, 1.2, &["c sharp", ".net", "dotnet"], &[], &[]),
        def("cplusplus", "C++", ProgrammingLanguage, 1.8, &["cpp", "c plus plus"], &[("rust", 0.6), ("c", 0.7)], &[]),
        def("c", "C", ProgrammingLanguage, 1.5, &["ansi c"], &[], &[]),
        def("golang", "Go", ProgrammingLanguage, 1.0, &["go", "go lang"], &[("rust", 0.4)], &[]),
        def("rust", "Rust", ProgrammingLanguage, 1.8, &["rust lang"], &[], &[]),
        def("ruby", "Ruby", ProgrammingLanguage, 0.9, &[], &[], &[]),
        def("php", "PHP", ProgrammingLanguage, 0.9, &["php7", "php8"], &[], &[]),
        def("kotlin", "Kotlin", ProgrammingLanguage, 1.0, &[], &[("swift", 0.45)], &[]),
        def("swift", "Swift", ProgrammingLanguage, 1.1, &["ios swift"], &[], &[]),
        def("scala", "Scala", ProgrammingLanguage, 1.5, &[], &[], &[]),
        def("sql", "SQL", ProgrammingLanguage, 0.6, &["structured query language"], &[], &[]),
        def("bash", "Bash", Tool, 0.6, &["shell", "shell scripting"], &[], &[]),
        // Frontend
        def("html", "HTML", Framework, 0.4, &["html5"], &[("css", 0.5)], &[]),
        def("css", "CSS", Framework, 0.5, &["css3", "sass", "scss"], &[], &["html"]),
        def("react", "React", Framework, 1.0, &["reactjs", "react.js"], &[("vue", 0.7), ("angular", 0.55), ("svelte", 0.6), ("redux", 0.5), ("nextjs", 0.7)], &["javascript"]),
        def("vue", "Vue", Framework, 0.9, &["vuejs", "vue.js"], &[("angular", 0.6), ("svelte", 0.7)], &["javascript"]),
        def("angular", "Angular", Framework, 1.3, &["angularjs", "angular.js"], &[], &["typescript"]),
        def("svelte", "Svelte", Framework, 0.8, &["sveltejs"], &[], &["javascript"]),
        def("nextjs", "Next.js", Framework, 0.8, &["next"], &[], &["react"]),
        def("redux", "Redux", Framework, 0.6, &["redux toolkit"], &[], &["react"]),
        // Backend
        def("nodejs", "Node.js", Framework, 0.9, &["node"], &[("javascript", 0.6), ("express", 0.7), ("typescript", 0.45)], &["javascript"]),
        def("express", "Express", Framework, 0.6, &["expressjs", "express.js"], &[], &["nodejs"]),
        def("django", "Django", Framework, 1.0, &["django rest framework", "drf"], &[("flask", 0.7), ("fastapi", 0.6), ("rails", 0.5)], &["python"]),
        def("flask", "Flask", Framework, 0.6, &[], &[("fastapi", 0.8)], &["python"]),
        def("fastapi", "FastAPI", Framework, 0.6, &["fast api"], &[], &["python"]),
        def("spring", "Spring", Framework, 1.4, &["spring boot", "springboot", "spring framework"], &[], &["java"]),
        def("rails", "Ruby on Rails", Framework, 1.0, &["ruby on rails", "ror"], &[("laravel", 0.5)], &["ruby"]),
        def("laravel", "Laravel", Framework, 1.0, &[], &[("django", 0.4)], &["php"]),
        def("graphql", "GraphQL", Tool, 0.7, &[], &[("rest", 0.6)], &[]),
        def("rest", "REST APIs", Methodology, 0.4, &["rest api", "restful", "rest apis"], &[], &[]),
        // Databases
        def("postgresql", "PostgreSQL", Database, 0.9, &["postgres", "psql"], &[("mysql", 0.85), ("sqlite", 0.6), ("sql", 0.6)], &["sql"]),
        def("mysql", "MySQL", Database, 0.8, &["mariadb", "my sql"], &[("sqlite", 0.6), ("sql", 0.6)], &["sql"]),
        def("sqlite", "SQLite", Database, 0.4, &["sqlite3"], &[], &[]),
        def("mongodb", "MongoDB", Database, 0.8, &["mongo"], &[("dynamodb", 0.5), ("cassandra", 0.4)], &[]),
        def("redis", "Redis", Database, 0.5, &[], &[], &[]),
        def("elasticsearch", "Elasticsearch", Database, 0.9, &["elastic search", "opensearch"], &[], &[]),
        def("cassandra", "Cassandra", Database, 1.2, &["apache cassandra"], &[("dynamodb", 0.5)], &[]),
        def("dynamodb", "DynamoDB", Database, 0.7, &["dynamo db"], &[], &[]),
        // Cloud
        def("aws", "AWS", CloudPlatform, 1.5, &["amazon web services"], &[("gcp", 0.7), ("azure", 0.7), ("dynamodb", 0.4)], &[]),
        def("gcp", "Google Cloud", CloudPlatform, 1.4, &["google cloud platform"], &[("azure", 0.7)], &[]),
        def("azure", "Azure", CloudPlatform, 1.4, &["microsoft azure"], &[], &[]),
        // DevOps and tools
        def("docker", "Docker", DevopsTool, 0.8, &["containerization"], &[("kubernetes", 0.5)], &[]),
        def("kubernetes", "Kubernetes", DevopsTool, 1.6, &["k8s"], &[("openshift", 0.8)], &["docker"]),
        def("openshift", "OpenShift", DevopsTool, 1.4, &[], &[], &["kubernetes"]),
        def("terraform", "Terraform", DevopsTool, 1.0, &["hcl"], &[("ansible", 0.5)], &[]),
        def("ansible", "Ansible", DevopsTool, 0.8, &[], &[], &[]),
        def("jenkins", "Jenkins", DevopsTool, 0.7, &[], &[("github_actions", 0.7), ("gitlab_ci", 0.7)], &[]),
        def("github_actions", "GitHub Actions", DevopsTool, 0.5, &["gh actions"], &[("gitlab_ci", 0.8)], &["git"]),
        def("gitlab_ci", "GitLab CI", DevopsTool, 0.5, &["gitlab"], &[], &["git"]),
        def("git", "Git", Tool, 0.4, &["github", "version control"], &[], &[]),
        def("kafka", "Kafka", Tool, 1.2, &["apache kafka"], &[("rabbitmq", 0.6)], &[]),
        def("rabbitmq", "RabbitMQ", Tool, 0.8, &["rabbit mq"], &[], &[]),
        def("linux", "Linux", Tool, 0.8, &["unix"], &[("bash", 0.6)], &[]),
        // Data and ML
        def("machine_learning", "Machine Learning", DomainKnowledge, 2.0, &["ml"], &[("deep_learning", 0.7)], &["python"]),
        def("deep_learning", "Deep Learning", DomainKnowledge, 2.0, &["dl", "neural networks"], &[], &["machine_learning"]),
        def("pytorch", "PyTorch", Framework, 1.2, &["torch"], &[("tensorflow", 0.8)], &["machine_learning"]),
        def("tensorflow", "TensorFlow", Framework, 1.3, &["tf", "keras"], &[], &["machine_learning"]),
        def("pandas", "pandas", Framework, 0.6, &[], &[("numpy", 0.7)], &["python"]),
        def("numpy", "NumPy", Framework, 0.5, &[], &[], &["python"]),
        def("spark", "Apache Spark", Framework, 1.4, &["pyspark", "spark"], &[("hadoop", 0.6)], &[]),
        def("hadoop", "Hadoop", Framework, 1.4, &["apache hadoop"], &[], &[]),
        // Methodologies and soft skills
        def("agile", "Agile", Methodology, 0.3, &["agile methodologies"], &[("scrum", 0.8), ("kanban", 0.6)], &[]),
        def("scrum", "Scrum", Methodology, 0.3, &[], &[], &[]),
        def("kanban", "Kanban", Methodology, 0.2, &[], &[], &[]),
        def("communication", "Communication", SoftSkill, 0.5, &["written communication", "verbal communication"], &[], &[]),
        def("leadership", "Leadership", SoftSkill, 1.0, &["team leadership", "people management"], &[("mentoring", 0.6)], &[]),
        def("mentoring", "Mentoring", SoftSkill, 0.6, &["coaching"], &[], &[]),
    ];

    let resources: &[(&str, &[&str])] = &[
        ("typescript", &["TypeScript Handbook", "Type Challenges exercises"]),
        ("rust", &["The Rust Programming Language book", "Rustlings exercises"]),
        ("react", &["react.dev official tutorial", "Build a small single-page app"]),
        ("redux", &["Redux Essentials tutorial", "Add Redux Toolkit to an existing React app"]),
        ("kubernetes", &["Kubernetes Basics interactive tutorial", "Certified Kubernetes Application Developer curriculum"]),
        ("docker", &["Docker Get Started guide", "Containerize an existing service"]),
        ("aws", &["AWS Cloud Practitioner Essentials", "AWS Well-Architected labs"]),
        ("python", &["Official Python Tutorial", "Automate a small daily task in Python"]),
        ("machine_learning", &["Andrew Ng's Machine Learning Specialization", "Kaggle Learn micro-courses"]),
        ("postgresql", &["PostgreSQL official tutorial", "Use The Index, Luke"]),
        ("golang", &["A Tour of Go", "Go by Example"]),
    ];
    for (id, items) in resources {
        if let Some(d) = defs.iter_mut().find(|d| d.id == *id) {
            d.resources = items.iter().map(|s| s.to_string()).collect();
        }
    }

    defs
}
