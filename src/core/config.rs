//! Sync configuration.
//!
//! Reads the YAML files that declare which secrets each repository,
//! repository environment and organization should carry.

use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::core::target::SyncTarget;
use crate::core::types::SecretName;
use crate::core::validation::normalize_name;
use crate::error::{ConfigError, Result};

/// Everything declared across one or more configuration files.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SyncSpec {
    /// Free-form section for YAML anchors; never interpreted.
    #[serde(default)]
    pub vars: Option<serde_yaml::Value>,
    /// Repository targets, in declaration order.
    #[serde(default)]
    pub repos: Vec<RepoSpec>,
    /// Organization targets, in declaration order.
    #[serde(default)]
    pub orgs: Vec<OrgSpec>,
}

/// Secrets declared for one repository.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct RepoSpec {
    pub owner: String,
    pub name: String,
    /// Delete remote secrets that are not declared here.
    #[serde(default)]
    pub delete_unspecified: bool,
    /// Keyed by normalized name.
    #[serde(default, deserialize_with = "secret_map")]
    pub secrets: BTreeMap<SecretName, SecretValueSpec>,
    /// Deployment environments keyed by environment name.
    #[serde(default)]
    pub environments: BTreeMap<String, EnvironmentSpec>,
}

/// Secrets declared for one deployment environment of a repository.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct EnvironmentSpec {
    #[serde(default)]
    pub delete_unspecified: bool,
    /// Keyed by normalized name.
    #[serde(default, deserialize_with = "secret_map")]
    pub secrets: BTreeMap<SecretName, SecretValueSpec>,
}

/// Secrets declared for one organization.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct OrgSpec {
    pub name: String,
    #[serde(default)]
    pub delete_unspecified: bool,
    /// Keyed by normalized name.
    #[serde(default, deserialize_with = "secret_map")]
    pub secrets: BTreeMap<SecretName, OrgSecretSpec>,
}

/// Where a secret's plaintext comes from.
///
/// Exactly one of `value` and `from_env` must be set. The parser accepts
/// either, both or neither so that a bad entry fails only its own secret
/// when it is realized; see [`SecretValueSpec::source`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "RawValue")]
pub struct SecretValueSpec {
    value: Option<String>,
    from_env: Option<String>,
}

/// A resolved value source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueSource<'a> {
    Literal(&'a str),
    Env(&'a str),
}

impl SecretValueSpec {
    /// A literal value.
    pub fn literal(value: impl Into<String>) -> Self {
        Self {
            value: Some(value.into()),
            from_env: None,
        }
    }

    /// A value read from an environment variable at run time.
    pub fn from_env(var: impl Into<String>) -> Self {
        Self {
            value: None,
            from_env: Some(var.into()),
        }
    }

    /// Build from raw optional parts, without checking them.
    pub fn from_parts(value: Option<String>, from_env: Option<String>) -> Self {
        Self { value, from_env }
    }

    /// The single value source of this declaration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::AmbiguousValue` when both sources are set and
    /// `ConfigError::MissingValue` when neither is.
    pub fn source(&self, secret: &str) -> Result<ValueSource<'_>> {
        match (&self.value, &self.from_env) {
            (Some(value), None) => Ok(ValueSource::Literal(value)),
            (None, Some(var)) => Ok(ValueSource::Env(var)),
            (Some(_), Some(_)) => Err(ConfigError::AmbiguousValue {
                secret: secret.to_string(),
            }
            .into()),
            (None, None) => Err(ConfigError::MissingValue {
                secret: secret.to_string(),
            }
            .into()),
        }
    }
}

/// Access scope of an organization secret.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    /// Every repository in the organization.
    #[serde(alias = "all")]
    Public,
    /// Private repositories only.
    #[default]
    Private,
    /// An explicit list of repositories.
    Selected,
}

impl Visibility {
    /// Wire value expected by the secrets API.
    pub fn as_api_str(self) -> &'static str {
        match self {
            Self::Public => "all",
            Self::Private => "private",
            Self::Selected => "selected",
        }
    }
}

impl std::fmt::Display for Visibility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Public => "public",
            Self::Private => "private",
            Self::Selected => "selected",
        };
        f.write_str(label)
    }
}

/// An organization secret: a value plus its visibility.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "RawOrgSecret")]
pub struct OrgSecretSpec {
    pub value: SecretValueSpec,
    pub visibility: Visibility,
    /// Repository names for `selected` visibility, in declaration order.
    /// Duplicates are kept.
    pub repositories: Vec<String>,
}

impl OrgSecretSpec {
    /// A secret with the given value and visibility and no repository list.
    pub fn new(value: SecretValueSpec, visibility: Visibility) -> Self {
        Self {
            value,
            visibility,
            repositories: Vec::new(),
        }
    }

    /// A `selected` secret scoped to the given repositories.
    pub fn selected<I, S>(value: SecretValueSpec, repositories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            value,
            visibility: Visibility::Selected,
            repositories: repositories.into_iter().map(Into::into).collect(),
        }
    }
}

/// Deserialize a secrets mapping with its names normalized.
///
/// Two entries that differ only in case name the same platform secret and
/// are rejected.
fn secret_map<'de, D, V>(
    deserializer: D,
) -> std::result::Result<BTreeMap<SecretName, V>, D::Error>
where
    D: Deserializer<'de>,
    V: Deserialize<'de>,
{
    let declared = BTreeMap::<String, V>::deserialize(deserializer)?;
    let mut secrets = BTreeMap::new();
    for (name, value) in declared {
        if secrets.insert(normalize_name(&name), value).is_some() {
            return Err(serde::de::Error::custom(format!(
                "secret '{}' is declared more than once (names are case-insensitive)",
                name
            )));
        }
    }
    Ok(secrets)
}

/// YAML scalars accepted as literal values.
#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    String(String),
    Number(serde_yaml::Number),
    Bool(bool),
}

impl From<Scalar> for String {
    fn from(scalar: Scalar) -> Self {
        match scalar {
            Scalar::String(s) => s,
            Scalar::Number(n) => n.to_string(),
            Scalar::Bool(b) => b.to_string(),
        }
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
struct DetailedValue {
    #[serde(default)]
    value: Option<Scalar>,
    #[serde(default)]
    from_env: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawValue {
    Literal(Scalar),
    Detailed(DetailedValue),
}

impl From<RawValue> for SecretValueSpec {
    fn from(raw: RawValue) -> Self {
        match raw {
            RawValue::Literal(scalar) => Self::literal(scalar),
            RawValue::Detailed(detailed) => {
                Self::from_parts(detailed.value.map(String::from), detailed.from_env)
            }
        }
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
struct DetailedOrgSecret {
    #[serde(default)]
    value: Option<Scalar>,
    #[serde(default)]
    from_env: Option<String>,
    #[serde(default)]
    visibility: Visibility,
    #[serde(default)]
    repositories: Vec<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawOrgSecret {
    Literal(Scalar),
    Detailed(DetailedOrgSecret),
}

impl From<RawOrgSecret> for OrgSecretSpec {
    fn from(raw: RawOrgSecret) -> Self {
        match raw {
            RawOrgSecret::Literal(scalar) => {
                Self::new(SecretValueSpec::literal(scalar), Visibility::default())
            }
            RawOrgSecret::Detailed(d) => Self {
                value: SecretValueSpec::from_parts(d.value.map(String::from), d.from_env),
                visibility: d.visibility,
                repositories: d.repositories,
            },
        }
    }
}

impl SyncSpec {
    /// Parse a configuration document.
    ///
    /// `path` is only used for error messages.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Parse` if the YAML is malformed or has unknown keys.
    pub fn parse(contents: &str, path: &Path) -> Result<Self> {
        // An empty document deserializes as unit, not as an empty mapping.
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(contents).map_err(|source| {
            ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            }
            .into()
        })
    }

    /// Load a single configuration file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ReadFile` if the file cannot be read,
    /// or `ConfigError::Parse` if it is malformed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "loading config");

        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
        let spec = Self::parse(&contents, path)?;

        debug!(
            repos = spec.repos.len(),
            orgs = spec.orgs.len(),
            "config loaded"
        );

        Ok(spec)
    }

    /// Load several files and concatenate their targets in order.
    ///
    /// # Errors
    ///
    /// Fails on the first file that cannot be read or parsed.
    pub fn load_all<P: AsRef<Path>>(paths: &[P]) -> Result<Self> {
        let mut merged = Self::default();
        for path in paths {
            merged.merge(Self::load(path)?);
        }
        Ok(merged)
    }

    /// Append another spec's targets after this one's.
    pub fn merge(&mut self, other: Self) {
        self.repos.extend(other.repos);
        self.orgs.extend(other.orgs);
    }

    /// Whether no target is declared.
    pub fn is_empty(&self) -> bool {
        self.repos.is_empty() && self.orgs.is_empty()
    }

    /// All targets, organizations first, then each repository followed by
    /// its environments.
    pub fn targets(&self) -> Vec<SyncTarget> {
        let mut targets: Vec<SyncTarget> = self
            .orgs
            .iter()
            .map(|org| SyncTarget::organization(&org.name))
            .collect();
        for repo in &self.repos {
            targets.push(repo.target());
            targets.extend(
                repo.environments
                    .keys()
                    .map(|env| SyncTarget::environment(&repo.owner, &repo.name, env)),
            );
        }
        targets
    }
}

impl RepoSpec {
    /// The repository target this spec describes.
    pub fn target(&self) -> SyncTarget {
        SyncTarget::repository(&self.owner, &self.name)
    }
}

impl OrgSpec {
    /// The organization target this spec describes.
    pub fn target(&self) -> SyncTarget {
        SyncTarget::organization(&self.name)
    }
}

/// Default configuration path list.
pub fn default_paths() -> Vec<PathBuf> {
    vec![PathBuf::from(crate::core::constants::DEFAULT_CONFIG_FILE)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn parse(yaml: &str) -> SyncSpec {
        SyncSpec::parse(yaml, Path::new("test.yml")).unwrap()
    }

    #[test]
    fn test_parse_repo_secrets() {
        let spec = parse(
            r#"
repos:
  - owner: acme
    name: api
    deleteUnspecified: true
    secrets:
      LITERAL: plain
      NUMBER: 8080
      FROM_ENV:
        fromEnv: DEPLOY_TOKEN
      EXPLICIT:
        value: explicit
"#,
        );

        assert_eq!(spec.repos.len(), 1);
        let repo = &spec.repos[0];
        assert!(repo.delete_unspecified);
        assert_eq!(repo.secrets["LITERAL"], SecretValueSpec::literal("plain"));
        assert_eq!(repo.secrets["NUMBER"], SecretValueSpec::literal("8080"));
        assert_eq!(
            repo.secrets["FROM_ENV"],
            SecretValueSpec::from_env("DEPLOY_TOKEN")
        );
        assert_eq!(repo.secrets["EXPLICIT"], SecretValueSpec::literal("explicit"));
    }

    #[test]
    fn test_secret_names_normalized() {
        let spec = parse(
            r#"
repos:
  - owner: acme
    name: api
    secrets:
      api_key: a
    environments:
      prod:
        secrets:
          Db_Url: b
orgs:
  - name: acme
    secrets:
      shared: c
"#,
        );

        assert_eq!(spec.repos[0].secrets["API_KEY"], SecretValueSpec::literal("a"));
        assert!(spec.repos[0].environments["prod"].secrets.contains_key("DB_URL"));
        assert!(spec.orgs[0].secrets.contains_key("SHARED"));
    }

    #[test]
    fn test_names_differing_in_case_rejected() {
        let yaml = r#"
repos:
  - owner: acme
    name: api
    secrets:
      API_KEY: a
      api_key: b
"#;
        let result = SyncSpec::parse(yaml, Path::new("dup.yml"));

        match result {
            Err(crate::error::Error::Config(ConfigError::Parse { source, .. })) => {
                assert!(source.to_string().contains("declared more than once"));
            }
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_delete_unspecified_defaults_false() {
        let spec = parse("repos:\n  - owner: acme\n    name: api\n");
        assert!(!spec.repos[0].delete_unspecified);
        assert!(spec.repos[0].secrets.is_empty());
    }

    #[test]
    fn test_both_sources_parse_but_fail_source() {
        let spec = parse(
            r#"
repos:
  - owner: acme
    name: api
    secrets:
      BOTH: { value: a, fromEnv: B }
      NEITHER: {}
"#,
        );
        let secrets = &spec.repos[0].secrets;

        assert!(matches!(
            secrets["BOTH"].source("BOTH"),
            Err(crate::error::Error::Config(ConfigError::AmbiguousValue { .. }))
        ));
        assert!(matches!(
            secrets["NEITHER"].source("NEITHER"),
            Err(crate::error::Error::Config(ConfigError::MissingValue { .. }))
        ));
    }

    #[test]
    fn test_parse_environments() {
        let spec = parse(
            r#"
repos:
  - owner: acme
    name: api
    environments:
      production:
        deleteUnspecified: true
        secrets:
          DB_URL: postgres://prod
"#,
        );
        let env = &spec.repos[0].environments["production"];
        assert!(env.delete_unspecified);
        assert_eq!(env.secrets["DB_URL"], SecretValueSpec::literal("postgres://prod"));
    }

    #[test]
    fn test_parse_org_secrets() {
        let spec = parse(
            r#"
orgs:
  - name: acme
    secrets:
      SHORT: literal
      EVERYONE:
        value: x
        visibility: public
      ALIAS:
        fromEnv: Y
        visibility: all
      SOME:
        value: z
        visibility: selected
        repositories: [web, api, web]
"#,
        );
        let secrets = &spec.orgs[0].secrets;

        assert_eq!(secrets["SHORT"].visibility, Visibility::Private);
        assert_eq!(secrets["EVERYONE"].visibility, Visibility::Public);
        assert_eq!(secrets["ALIAS"].visibility, Visibility::Public);
        assert_eq!(secrets["SOME"].visibility, Visibility::Selected);
        assert_eq!(secrets["SOME"].repositories, vec!["web", "api", "web"]);
    }

    #[test]
    fn test_unknown_keys_rejected() {
        let result = SyncSpec::parse(
            "repos:\n  - owner: acme\n    name: api\n    delete: true\n",
            Path::new("bad.yml"),
        );
        assert!(matches!(
            result,
            Err(crate::error::Error::Config(ConfigError::Parse { .. }))
        ));
    }

    #[test]
    fn test_unknown_visibility_rejected() {
        let result = SyncSpec::parse(
            "orgs:\n  - name: acme\n    secrets:\n      X: { value: a, visibility: internal }\n",
            Path::new("bad.yml"),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_vars_section_ignored() {
        let spec = parse(
            r#"
vars:
  token: &token { fromEnv: TOKEN }
repos:
  - owner: acme
    name: api
    secrets:
      TOKEN: *token
"#,
        );
        assert_eq!(spec.repos[0].secrets["TOKEN"], SecretValueSpec::from_env("TOKEN"));
    }

    #[test]
    fn test_empty_document() {
        let spec = parse("");
        assert!(spec.is_empty());
    }

    #[test]
    fn test_load_all_concatenates_in_order() {
        let tmp = TempDir::new().unwrap();
        let first = tmp.path().join("a.yml");
        let second = tmp.path().join("b.yml");
        std::fs::write(&first, "repos:\n  - owner: acme\n    name: one\n").unwrap();
        std::fs::write(
            &second,
            "repos:\n  - owner: acme\n    name: two\norgs:\n  - name: acme\n",
        )
        .unwrap();

        let spec = SyncSpec::load_all(&[first, second]).unwrap();
        let names: Vec<_> = spec.repos.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["one", "two"]);
        assert_eq!(spec.orgs.len(), 1);
    }

    #[test]
    fn test_load_missing_file() {
        let result = SyncSpec::load("/nonexistent/secrets.yml");
        assert!(matches!(
            result,
            Err(crate::error::Error::Config(ConfigError::ReadFile { .. }))
        ));
    }

    #[test]
    fn test_targets_order() {
        let spec = parse(
            r#"
repos:
  - owner: acme
    name: api
    environments:
      prod: {}
      dev: {}
orgs:
  - name: acme
"#,
        );
        let targets: Vec<String> = spec.targets().iter().map(ToString::to_string).collect();
        assert_eq!(
            targets,
            vec!["org acme", "acme/api", "acme/api (env dev)", "acme/api (env prod)"]
        );
    }

    #[test]
    fn test_visibility_api_values() {
        assert_eq!(Visibility::Public.as_api_str(), "all");
        assert_eq!(Visibility::Private.as_api_str(), "private");
        assert_eq!(Visibility::Selected.as_api_str(), "selected");
    }
}
