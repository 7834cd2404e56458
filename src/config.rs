// Account store: the list of accounts, which one is current, and the TOML
// file they live in.
//
// The file is edited with `toml_edit` so a hand-edited config keeps its
// comments and layout when the CLI writes it back. Shape:
//
//   # Paperless-ngx CLI configuration
//   # https://github.com/marcelbrueckner/paperless-ngx-cli
//
//   [accounts]
//   current = "default"
//
//   [accounts.default]
//   host = "https://paperless.example.org"
//   user = "alice"
//   token = "..."
//   alias = "default"

use std::cmp::Ordering;
use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use toml_edit::{value, Decor, DocumentMut, Item, Table, Value};
use tracing::{debug, info, warn};

use crate::account::{normalize_host, validate_alias, Account, ADHOC_ALIAS, DEFAULT_ALIAS};
use crate::api::{ApiError, CredentialVerifier, ProbeAuth};
use crate::error::{ConfigError, Result, ValidationError};

/// File name looked up in the working directory and the config directory.
pub const CONFIG_FILE_NAME: &str = "pngx.toml";

const ACCOUNTS_KEY: &str = "accounts";
const CURRENT_KEY: &str = "current";

const BANNER: &str = "# Paperless-ngx CLI configuration\n\
                      # https://github.com/marcelbrueckner/paperless-ngx-cli\n\n";

const NO_ACCOUNTS_COMMENT: &str = "# No accounts configured. Add them via `pngx auth login`.";

/// Candidate config files, in lookup order: `./pngx.toml`, then
/// `<config dir>/pngx/pngx.toml`.
pub fn default_search_paths() -> Vec<PathBuf> {
    let mut paths = vec![std::env::current_dir()
        .map(|d| d.join(CONFIG_FILE_NAME))
        .unwrap_or_else(|_| PathBuf::from(CONFIG_FILE_NAME))];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("pngx").join(CONFIG_FILE_NAME));
    }
    paths
}

/// Everything `auth login` (or an ad-hoc session) supplies for one account.
#[derive(Debug, Clone)]
pub struct LoginRequest {
    pub host: String,
    pub user: Option<String>,
    pub password: Option<String>,
    pub token: Option<String>,
    pub alias: String,
}

impl LoginRequest {
    pub fn new(host: impl Into<String>) -> Self {
        LoginRequest {
            host: host.into(),
            user: None,
            password: None,
            token: None,
            alias: DEFAULT_ALIAS.to_string(),
        }
    }

    /// Empty strings are treated as not given.
    pub fn user(mut self, user: Option<String>) -> Self {
        self.user = non_empty(user);
        self
    }

    pub fn password(mut self, password: Option<String>) -> Self {
        self.password = non_empty(password);
        self
    }

    pub fn token(mut self, token: Option<String>) -> Self {
        self.token = non_empty(token);
        self
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = alias.into();
        self
    }
}

fn non_empty(s: Option<String>) -> Option<String> {
    s.filter(|s| !s.is_empty())
}

/// Persistent set of accounts keyed by alias, in insertion order.
///
/// Mutators update memory first and then write the file, except for the
/// `__adhoc__` account which only lives for the current process.
#[derive(Debug)]
pub struct ConfigStore {
    filepath: PathBuf,
    accounts: IndexMap<String, Account>,
    current: Option<String>,
    /// Document the store was loaded from; `None` until a file was read.
    document: Option<DocumentMut>,
}

impl ConfigStore {
    /// Empty store that will be written to `filepath`.
    pub fn new(filepath: impl Into<PathBuf>) -> Self {
        ConfigStore {
            filepath: filepath.into(),
            accounts: IndexMap::new(),
            current: None,
            document: None,
        }
    }

    /// Load the store from `filepath`, or from the first existing file of
    /// [`default_search_paths`], then select `use_account` if given.
    pub fn load(filepath: Option<&Path>, use_account: Option<&str>) -> Result<Self> {
        let mut store = match filepath {
            Some(path) => Self::open(path)?,
            None => Self::search(&default_search_paths())?,
        };
        if let Some(alias) = use_account {
            store.use_account(alias)?;
        }
        Ok(store)
    }

    /// Use `path` verbatim. A missing file leaves the store empty but keeps
    /// `path` as the write target.
    pub fn open(path: &Path) -> Result<Self> {
        if path.is_file() {
            debug!(path = %path.display(), "reading configuration");
            let content = fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))?;
            Self::from_toml(path, &content)
        } else {
            debug!(path = %path.display(), "configuration file does not exist yet");
            Ok(Self::new(path))
        }
    }

    /// First existing candidate wins. If none exists the last candidate
    /// becomes the write target.
    pub fn search(candidates: &[PathBuf]) -> Result<Self> {
        if let Some(found) = candidates.iter().find(|p| p.is_file()) {
            return Self::open(found);
        }
        let target = candidates
            .last()
            .cloned()
            .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME));
        debug!(path = %target.display(), "no configuration found");
        Ok(Self::new(target))
    }

    /// Parse a configuration document.
    ///
    /// Without a non-empty `current` key the accounts are not read at all,
    /// so the store comes back empty even if account tables exist.
    pub fn from_toml(filepath: impl Into<PathBuf>, content: &str) -> Result<Self> {
        let filepath = filepath.into();
        let document = content
            .parse::<DocumentMut>()
            .map_err(|source| ConfigError::Toml {
                path: filepath.clone(),
                source,
            })?;

        let section = document
            .get(ACCOUNTS_KEY)
            .and_then(Item::as_table_like)
            .ok_or_else(|| ConfigError::invalid_file(&filepath, "missing [accounts] section"))?;

        let mut accounts = IndexMap::new();
        let current_alias = section
            .get(CURRENT_KEY)
            .and_then(Item::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        let Some(current_alias) = current_alias else {
            debug!("no current account configured");
            return Ok(ConfigStore {
                filepath,
                accounts,
                current: None,
                document: Some(document),
            });
        };

        for (key, item) in section.iter() {
            if key == CURRENT_KEY {
                continue;
            }
            let Some(table) = item.as_table_like() else {
                warn!(key, "ignoring non-table entry in [accounts]");
                continue;
            };
            let text = |name: &str| {
                table
                    .get(name)
                    .and_then(Item::as_str)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
            };
            let host = text("host").ok_or_else(|| {
                ConfigError::invalid_file(&filepath, format!("account {key} has no host"))
            })?;
            let alias = text("alias").unwrap_or_else(|| key.to_string());
            if accounts.contains_key(&alias) {
                return Err(ConfigError::invalid_file(
                    &filepath,
                    format!("duplicate account alias {alias}"),
                ));
            }
            accounts.insert(
                alias.clone(),
                Account {
                    host,
                    user: text("user"),
                    token: text("token"),
                    alias,
                },
            );
        }

        let current = accounts.contains_key(&current_alias).then_some(current_alias);
        debug!(accounts = accounts.len(), current = ?current, "configuration parsed");

        Ok(ConfigStore {
            filepath,
            accounts,
            current,
            document: Some(document),
        })
    }

    pub fn filepath(&self) -> &Path {
        &self.filepath
    }

    pub fn current(&self) -> Option<&Account> {
        self.current.as_ref().and_then(|alias| self.accounts.get(alias))
    }

    /// Accounts in stored order.
    pub fn accounts(&self) -> impl Iterator<Item = &Account> {
        self.accounts.values()
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    pub fn get_account(&self, alias: &str) -> Result<&Account> {
        self.accounts
            .get(alias)
            .ok_or_else(|| ConfigError::UnknownAlias(alias.to_string()))
    }

    /// Select the current account. Does not write the file.
    pub fn use_account(&mut self, alias: &str) -> Result<()> {
        self.get_account(alias)?;
        self.current = Some(alias.to_string());
        Ok(())
    }

    /// Verify the credentials against the server, then create or update the
    /// account, make it current and persist.
    ///
    /// Nothing changes, in memory or on disk, when validation or
    /// verification fails.
    pub fn add_account(
        &mut self,
        verifier: &dyn CredentialVerifier,
        request: LoginRequest,
    ) -> Result<&Account> {
        let host = normalize_host(&request.host)?;
        if request.alias != ADHOC_ALIAS {
            validate_alias(&request.alias)?;
        }
        if request.password.is_some() && request.user.is_none() {
            return Err(ValidationError::PasswordWithoutUser.into());
        }

        let token = verify(verifier, &host, &request)?;
        let LoginRequest { user, alias, .. } = request;

        match self.accounts.get_mut(&alias) {
            Some(account) => {
                info!(%alias, %host, "updating account");
                account.update(host, user, token);
            }
            None => {
                info!(%alias, %host, "adding account");
                let account = Account {
                    host,
                    user,
                    token,
                    alias: alias.clone(),
                };
                self.accounts.insert(alias.clone(), account);
            }
        }
        self.current = Some(alias.clone());
        self.write()?;

        self.get_account(&alias)
    }

    /// Remove an account. If it was current, the first remaining account
    /// takes over, or nothing when the store is now empty.
    pub fn remove_account(&mut self, alias: &str) -> Result<Account> {
        let removed = self
            .accounts
            .shift_remove(alias)
            .ok_or_else(|| ConfigError::UnknownAlias(alias.to_string()))?;
        info!(%alias, "removed account");

        if self.current.as_deref() == Some(alias) {
            self.current = self.accounts.keys().next().cloned();
        }
        self.write()?;
        Ok(removed)
    }

    /// Rename an account in place, keeping its position.
    ///
    /// An unknown `alias` is silently ignored (the file is still written);
    /// renaming onto another existing alias fails with `AliasTaken`.
    pub fn rename_account(&mut self, alias: &str, new_alias: &str) -> Result<()> {
        validate_alias(new_alias)?;
        if alias == new_alias {
            return Ok(());
        }

        if let Some(index) = self.accounts.get_index_of(alias) {
            if self.accounts.contains_key(new_alias) {
                return Err(ConfigError::AliasTaken(new_alias.to_string()));
            }
            if let Some((_, mut account)) = self.accounts.shift_remove_index(index) {
                account.alias = new_alias.to_string();
                self.accounts.shift_insert(index, new_alias.to_string(), account);
            }
            if self.current.as_deref() == Some(alias) {
                self.current = Some(new_alias.to_string());
            }
            info!(%alias, %new_alias, "renamed account");
        } else {
            debug!(%alias, "rename of unknown alias ignored");
        }

        self.write()
    }

    /// Write the store to its file unless the current account is ad-hoc.
    pub fn write(&self) -> Result<()> {
        if self.current.as_deref() == Some(ADHOC_ALIAS) {
            debug!("ad-hoc account in use, not writing configuration");
            return Ok(());
        }

        let path = &self.filepath;
        if !path.is_file() {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent).map_err(|e| ConfigError::io(parent, e))?;
            }
        }

        fs::write(path, self.serialize()).map_err(|e| ConfigError::io(path, e))?;
        set_permissions(path)?;
        debug!(path = %path.display(), "configuration written");
        Ok(())
    }

    /// Render the store as TOML.
    ///
    /// A loaded document is edited in place so its comments and unrelated
    /// content survive; a fresh one starts with the banner comment. The
    /// ad-hoc account is never rendered.
    pub fn serialize(&self) -> String {
        let mut doc = match &self.document {
            Some(doc) => doc.clone(),
            None => {
                let mut doc = DocumentMut::new();
                let mut accounts = Table::new();
                accounts.decor_mut().set_prefix(BANNER);
                doc.insert(ACCOUNTS_KEY, Item::Table(accounts));
                doc
            }
        };

        if !doc.get(ACCOUNTS_KEY).is_some_and(Item::is_table) {
            doc.insert(ACCOUNTS_KEY, Item::Table(Table::new()));
        }

        scrub_table(doc.as_table_mut());
        let trailing = doc.trailing().as_str().map(strip_placeholder);
        if let Some(trailing) = trailing {
            doc.set_trailing(trailing);
        }

        if let Some(section) = doc.get_mut(ACCOUNTS_KEY).and_then(Item::as_table_mut) {
            self.render_accounts(section);
        }

        doc.to_string()
    }

    fn persisted(&self) -> impl Iterator<Item = &Account> {
        self.accounts.values().filter(|a| !a.is_adhoc())
    }

    fn render_accounts(&self, section: &mut Table) {
        let aliases: Vec<&str> = self.persisted().map(|a| a.alias.as_str()).collect();

        let stale: Vec<String> = section
            .iter()
            .filter(|(key, item)| {
                *key != CURRENT_KEY && item.is_table_like() && !aliases.contains(key)
            })
            .map(|(key, _)| key.to_string())
            .collect();
        for key in stale {
            section.remove(&key);
        }

        if aliases.is_empty() {
            section.remove(CURRENT_KEY);
            let suffix = section
                .decor()
                .suffix()
                .and_then(|s| s.as_str())
                .unwrap_or_default()
                .to_string();
            section
                .decor_mut()
                .set_suffix(format!("{}\n{}", suffix, NO_ACCOUNTS_COMMENT));
            return;
        }

        match self.current.as_deref() {
            Some(alias) if alias != ADHOC_ALIAS => set_str(section, CURRENT_KEY, Some(alias)),
            Some(_) => {}
            None => {
                section.remove(CURRENT_KEY);
            }
        }

        for account in self.persisted() {
            let entry = section
                .entry(&account.alias)
                .or_insert_with(|| Item::Table(Table::new()));
            if !entry.is_table() {
                *entry = Item::Table(Table::new());
            }
            if let Some(table) = entry.as_table_mut() {
                set_str(table, "host", Some(&account.host));
                set_str(table, "user", account.user.as_deref());
                set_str(table, "token", account.token.as_deref());
                set_str(table, "alias", Some(&account.alias));
            }
        }

        // Keep the table order in step with the store so new and renamed
        // accounts print where they belong.
        let rank = |key: &str| aliases.iter().position(|a| *a == key);
        section.sort_values_by(|k1, _, k2, _| match (rank(k1.get()), rank(k2.get())) {
            (Some(a), Some(b)) => a.cmp(&b),
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        });
    }
}

/// Run the verification branch matching the supplied credentials and return
/// the token to store, if any.
fn verify(
    verifier: &dyn CredentialVerifier,
    host: &str,
    request: &LoginRequest,
) -> Result<Option<String>> {
    let user = request.user.as_deref();
    match (user, request.password.as_deref(), request.token.as_deref()) {
        (None, None, None) => {
            verifier.probe(host, ProbeAuth::None).map_err(|e| {
                rejected(e, || ConfigError::AuthenticationRequired {
                    host: host.to_string(),
                })
            })?;
            Ok(None)
        }
        (Some(user), None, None) => {
            verifier.probe(host, ProbeAuth::RemoteUser(user)).map_err(|e| {
                rejected(e, || ConfigError::RemoteUserRejected {
                    host: host.to_string(),
                    user: user.to_string(),
                })
            })?;
            Ok(None)
        }
        (Some(user), Some(password), _) => {
            let token = verifier.issue_token(host, user, password).map_err(|e| {
                rejected(e, || ConfigError::InvalidCredentials {
                    user: user.to_string(),
                    host: host.to_string(),
                })
            })?;
            Ok(Some(token))
        }
        (None, Some(_), _) => Err(ValidationError::PasswordWithoutUser.into()),
        (_, None, Some(token)) => {
            verifier.probe(host, ProbeAuth::Token(token)).map_err(|e| {
                rejected(e, || ConfigError::InvalidToken {
                    host: host.to_string(),
                })
            })?;
            Ok(Some(token.to_string()))
        }
    }
}

/// Map a server rejection to the given error; transport errors pass through.
fn rejected(err: ApiError, on_reject: impl FnOnce() -> ConfigError) -> ConfigError {
    if err.is_rejection() {
        warn!(%err, "credential verification rejected");
        on_reject()
    } else {
        ConfigError::Api(err)
    }
}

/// Set or remove a string value, keeping the decoration (comments, spacing)
/// of an existing value.
fn set_str(table: &mut Table, key: &str, new: Option<&str>) {
    let Some(new) = new else {
        table.remove(key);
        return;
    };
    match table.get_mut(key).and_then(Item::as_value_mut) {
        Some(existing) if existing.as_str() == Some(new) => {}
        Some(existing) => {
            let decor = existing.decor().clone();
            *existing = Value::from(new);
            *existing.decor_mut() = decor;
        }
        None => {
            table.insert(key, value(new));
        }
    }
}

fn strip_placeholder(raw: &str) -> String {
    raw.split_inclusive('\n')
        .filter(|line| line.trim() != NO_ACCOUNTS_COMMENT)
        .collect()
}

fn scrub_decor(decor: &mut Decor) {
    let prefix = decor.prefix().and_then(|p| p.as_str());
    if let Some(prefix) = prefix.filter(|p| p.contains(NO_ACCOUNTS_COMMENT)) {
        let cleaned = strip_placeholder(prefix);
        decor.set_prefix(cleaned);
    }
    let suffix = decor.suffix().and_then(|s| s.as_str());
    if let Some(suffix) = suffix.filter(|s| s.contains(NO_ACCOUNTS_COMMENT)) {
        let cleaned = strip_placeholder(suffix);
        decor.set_suffix(cleaned.trim_end_matches('\n').to_string());
    }
}

/// Drop the "no accounts" placeholder wherever a previous write or reparse
/// left it, so it is only ever emitted once.
fn scrub_table(table: &mut Table) {
    scrub_decor(table.decor_mut());
    for (mut key, item) in table.iter_mut() {
        scrub_decor(key.leaf_decor_mut());
        if let Some(child) = item.as_table_mut() {
            scrub_table(child);
        }
    }
}

#[cfg(unix)]
fn set_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))
        .map_err(|e| ConfigError::io(path, e))
}

#[cfg(not(unix))]
fn set_permissions(_path: &Path) -> Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_ACCOUNTS: &str = r#"# my own notes
[accounts]
current = "work"

[accounts.home]
host = "https://home.example.org"
token = "t-home"
alias = "home"

# the office server
[accounts.work]
host = "https://work.example.org" # behind VPN
user = "alice"
token = "t-work"
alias = "work"
"#;

    fn store(content: &str) -> ConfigStore {
        ConfigStore::from_toml("pngx.toml", content).unwrap()
    }

    fn aliases(store: &ConfigStore) -> Vec<&str> {
        store.accounts().map(|a| a.alias.as_str()).collect()
    }

    #[test]
    fn parses_accounts_and_current() {
        let store = store(TWO_ACCOUNTS);
        assert_eq!(aliases(&store), vec!["home", "work"]);
        let current = store.current().unwrap();
        assert_eq!(current.alias, "work");
        assert_eq!(current.user.as_deref(), Some("alice"));
        assert_eq!(current.token.as_deref(), Some("t-work"));
        assert_eq!(store.get_account("home").unwrap().user, None);
    }

    #[test]
    fn missing_accounts_section_is_invalid() {
        let err = ConfigStore::from_toml("pngx.toml", "[other]\nkey = 1\n").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidConfigFile { .. }));
        assert!(err.to_string().starts_with("Invalid configuration file"));

        let err = ConfigStore::from_toml("pngx.toml", "accounts = 3\n").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidConfigFile { .. }));
    }

    #[test]
    fn syntax_errors_are_reported() {
        let err = ConfigStore::from_toml("pngx.toml", "[accounts\n").unwrap_err();
        assert!(matches!(err, ConfigError::Toml { .. }));
    }

    #[test]
    fn accounts_without_current_load_as_empty() {
        let without = store(&TWO_ACCOUNTS.replace("current = \"work\"\n", ""));
        assert!(without.is_empty());
        assert!(without.current().is_none());

        let blank = store(&TWO_ACCOUNTS.replace("current = \"work\"", "current = \"\""));
        assert!(blank.is_empty());
    }

    #[test]
    fn current_pointing_nowhere_leaves_no_current() {
        let store = store(&TWO_ACCOUNTS.replace("current = \"work\"", "current = \"gone\""));
        assert_eq!(store.len(), 2);
        assert!(store.current().is_none());
    }

    #[test]
    fn alias_falls_back_to_table_key() {
        let store = store("[accounts]\ncurrent = \"home\"\n[accounts.home]\nhost = \"https://h\"\n");
        assert_eq!(store.current().unwrap().alias, "home");
    }

    #[test]
    fn account_without_host_is_invalid() {
        let err = ConfigStore::from_toml(
            "pngx.toml",
            "[accounts]\ncurrent = \"home\"\n[accounts.home]\nuser = \"bob\"\n",
        )
        .unwrap_err();
        assert!(err.to_string().contains("account home has no host"));
    }

    #[test]
    fn non_table_entries_are_skipped() {
        let store = store("[accounts]\ncurrent = \"a\"\nstray = 1\n[accounts.a]\nhost = \"https://a\"\n");
        assert_eq!(aliases(&store), vec!["a"]);
    }

    #[test]
    fn round_trip_keeps_accounts_and_comments() {
        let original = store(TWO_ACCOUNTS);
        let text = original.serialize();
        assert_eq!(text, TWO_ACCOUNTS);

        let reloaded = store(&text);
        assert_eq!(reloaded.accounts().collect::<Vec<_>>(), original.accounts().collect::<Vec<_>>());
        assert_eq!(reloaded.current().unwrap().alias, "work");
    }

    #[test]
    fn fresh_document_has_banner() {
        let mut store = store("[accounts]\ncurrent = \"a\"\n[accounts.a]\nhost = \"https://a\"\n");
        store.document = None;
        let text = store.serialize();
        assert!(text.starts_with(
            "# Paperless-ngx CLI configuration\n# https://github.com/marcelbrueckner/paperless-ngx-cli\n\n[accounts]\ncurrent = \"a\"\n"
        ));
        assert!(text.contains("[accounts.a]\nhost = \"https://a\"\nalias = \"a\"\n"));
        assert!(!text.contains("user ="));
        assert!(!text.contains("token ="));
    }

    #[test]
    fn empty_store_writes_placeholder_once() {
        let store = ConfigStore::new("pngx.toml");
        let text = store.serialize();
        assert!(!text.contains("current ="));
        assert!(text.contains(NO_ACCOUNTS_COMMENT));

        let reparsed = ConfigStore::from_toml("pngx.toml", &text).unwrap();
        let again = reparsed.serialize();
        assert_eq!(again.matches(NO_ACCOUNTS_COMMENT).count(), 1);
    }

    #[test]
    fn placeholder_is_dropped_once_accounts_exist() {
        let text = ConfigStore::new("pngx.toml").serialize();
        let mut store = ConfigStore::from_toml("pngx.toml", &text).unwrap();
        store.accounts.insert("a".to_string(), Account::new("https://a", "a"));
        store.current = Some("a".to_string());

        let text = store.serialize();
        assert!(!text.contains(NO_ACCOUNTS_COMMENT));
        let reloaded = ConfigStore::from_toml("pngx.toml", &text).unwrap();
        assert_eq!(reloaded.current().unwrap().host, "https://a");
    }

    #[test]
    fn changed_value_keeps_its_comment() {
        let mut store = store(TWO_ACCOUNTS);
        if let Some(work) = store.accounts.get_mut("work") {
            work.host = "https://new.example.org".to_string();
        }
        let text = store.serialize();
        assert!(text.contains("host = \"https://new.example.org\" # behind VPN"));
        assert!(text.contains("# the office server\n[accounts.work]"));
    }

    #[test]
    fn adhoc_account_is_never_serialized() {
        let mut store = store(TWO_ACCOUNTS);
        store
            .accounts
            .insert(ADHOC_ALIAS.to_string(), Account::new("https://tmp", ADHOC_ALIAS));
        store.current = Some(ADHOC_ALIAS.to_string());
        let text = store.serialize();
        assert!(!text.contains(ADHOC_ALIAS));
        assert!(text.contains("current = \"work\""));
    }

    #[test]
    fn get_account_names_missing_alias() {
        let store = ConfigStore::new("pngx.toml");
        let err = store.get_account("missing").unwrap_err();
        assert!(matches!(err, ConfigError::UnknownAlias(ref a) if a == "missing"));
        assert_eq!(
            err.to_string(),
            "Given alias (missing) does not match existing accounts."
        );
    }

    #[test]
    fn use_account_switches_without_touching_disk() {
        let mut store = store(TWO_ACCOUNTS);
        store.use_account("home").unwrap();
        assert_eq!(store.current().unwrap().alias, "home");
        assert!(store.use_account("nope").is_err());
        assert_eq!(store.current().unwrap().alias, "home");
    }

    #[test]
    fn strip_placeholder_only_removes_that_line() {
        let raw = format!("# keep\n{}\n", NO_ACCOUNTS_COMMENT);
        assert_eq!(strip_placeholder(&raw), "# keep\n");
    }

    #[test]
    fn login_request_drops_empty_strings() {
        let req = LoginRequest::new("h")
            .user(Some(String::new()))
            .token(Some("t".to_string()));
        assert_eq!(req.user, None);
        assert_eq!(req.token.as_deref(), Some("t"));
        assert_eq!(req.alias, DEFAULT_ALIAS);
    }
}
