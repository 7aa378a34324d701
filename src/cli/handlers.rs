//! The concrete options of the `bo` binary.
//!
//! Handlers read their values by parsing the full argument vector with the
//! same `clap` command the registry dispatches with, so a repeated option
//! (`--get a --get b`) or a stacked one (`-la x=1`) is handled in one
//! `execute` call.

use crate::db::EntryStore;
use crate::error::Result;
use crate::models::{Entry, EntryRecord};
use crate::options::{build_command, values_of, OptionDefinition, OptionHandler, OptionRegistry};
use anyhow::{bail, Context};
use async_trait::async_trait;
use colored::*;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use tracing::{debug, info, warn};

pub const PROGRAM: &str = "bo";
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const ABOUT: &str = "Keeps key/value entries in PostgreSQL";

/// Builds the registry with every option `bo` understands.
pub fn build_registry<D>() -> Result<OptionRegistry<D>>
where
    D: EntryStore + ?Sized,
{
    let mut registry = OptionRegistry::new(PROGRAM).about(ABOUT).version(VERSION);
    registry.register(VersionHandler::new(PROGRAM, VERSION)?)?;
    registry.register(InitDbHandler::new()?)?;
    registry.register(AddHandler::new()?)?;
    registry.register(GetHandler::new()?)?;
    registry.register(ListHandler::new()?)?;
    registry.register(DeleteHandler::new()?)?;
    registry.register(ExportHandler::new()?)?;
    registry.register(ImportHandler::new()?)?;

    let help = HelpHandler::new(PROGRAM, ABOUT, registry.definitions().cloned())?;
    registry.register(help)?;
    Ok(registry)
}

/// Definitions of every `bo` option, in the order `build_registry` registers them.
pub fn bo_definitions() -> Result<Vec<OptionDefinition>> {
    Ok(vec![
        VersionHandler::option()?,
        InitDbHandler::option()?,
        AddHandler::option()?,
        GetHandler::option()?,
        ListHandler::option()?,
        DeleteHandler::option()?,
        ExportHandler::option()?,
        ImportHandler::option()?,
        HelpHandler::option()?,
    ])
}

/// Values given to `def`, or an error naming the option if there are none.
fn required_values(def: &OptionDefinition, args: &[String]) -> anyhow::Result<Vec<String>> {
    let matches = build_command(PROGRAM, &bo_definitions()?).try_get_matches_from(args)?;
    let values = values_of(&matches, def);
    if values.is_empty() {
        bail!("{} requires a value", def);
    }
    Ok(values)
}

fn entries_table(entries: &[Entry]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Key", "Value", "Updated (UTC)"]);
    for entry in entries {
        table.add_row(vec![
            entry.key.clone(),
            entry.value.clone(),
            entry.updated_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        ]);
    }
    table
}

// --- Help / version ---

/// `-h, --help`: prints a table of all options.
pub struct HelpHandler {
    def: OptionDefinition,
    program: String,
    about: String,
    options: Vec<OptionDefinition>,
}

impl HelpHandler {
    pub fn option() -> Result<OptionDefinition> {
        OptionDefinition::new("h", "help", false, "Show this help")
    }

    /// `options` are the other registered definitions; the help option itself
    /// is listed first.
    pub fn new(
        program: impl Into<String>,
        about: impl Into<String>,
        options: impl IntoIterator<Item = OptionDefinition>,
    ) -> Result<Self> {
        let def = Self::option()?;
        let options = std::iter::once(def.clone()).chain(options).collect();
        Ok(Self {
            def,
            program: program.into(),
            about: about.into(),
            options,
        })
    }

    /// The text printed by `execute`.
    pub fn render(&self) -> String {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_header(vec!["Short", "Long", "Argument", "Description"]);
        for def in &self.options {
            let short = if def.short().is_empty() {
                String::new()
            } else {
                format!("-{}", def.short())
            };
            let long = if def.long().is_empty() {
                String::new()
            } else {
                format!("--{}", def.long())
            };
            let argument = if def.has_arg() { "yes" } else { "" };
            table.add_row(vec![
                short,
                long,
                argument.to_string(),
                def.description().to_string(),
            ]);
        }
        format!(
            "{}\n\nUsage: {} [OPTIONS]\n\n{}",
            self.about, self.program, table
        )
    }
}

#[async_trait]
impl<Db: ?Sized + Sync> OptionHandler<Db> for HelpHandler {
    fn definition(&self) -> &OptionDefinition {
        &self.def
    }

    async fn execute(&self, _args: &[String], _db: &Db) -> anyhow::Result<()> {
        println!("{}", self.render());
        Ok(())
    }
}

/// `-V, --version`
pub struct VersionHandler {
    def: OptionDefinition,
    program: String,
    version: String,
}

impl VersionHandler {
    pub fn option() -> Result<OptionDefinition> {
        OptionDefinition::new("V", "version", false, "Print version information")
    }

    pub fn new(program: impl Into<String>, version: impl Into<String>) -> Result<Self> {
        Ok(Self {
            def: Self::option()?,
            program: program.into(),
            version: version.into(),
        })
    }
}

#[async_trait]
impl<Db: ?Sized + Sync> OptionHandler<Db> for VersionHandler {
    fn definition(&self) -> &OptionDefinition {
        &self.def
    }

    async fn execute(&self, _args: &[String], _db: &Db) -> anyhow::Result<()> {
        println!("{} {}", self.program, self.version);
        Ok(())
    }
}

// --- Store options ---

/// `-i, --init-db`
pub struct InitDbHandler {
    def: OptionDefinition,
}

impl InitDbHandler {
    pub fn option() -> Result<OptionDefinition> {
        OptionDefinition::new("i", "init-db", false, "Create the database schema")
    }

    pub fn new() -> Result<Self> {
        Ok(Self {
            def: Self::option()?,
        })
    }
}

#[async_trait]
impl<D: EntryStore + ?Sized> OptionHandler<D> for InitDbHandler {
    fn definition(&self) -> &OptionDefinition {
        &self.def
    }

    async fn execute(&self, _args: &[String], db: &D) -> anyhow::Result<()> {
        db.init_schema()
            .await
            .context("Failed to initialize the schema")?;
        println!("{}", "Database schema initialized.".green());
        Ok(())
    }
}

/// `-a, --add KEY=VALUE`
pub struct AddHandler {
    def: OptionDefinition,
}

impl AddHandler {
    pub fn option() -> Result<OptionDefinition> {
        OptionDefinition::new("a", "add", true, "Add or replace an entry (KEY=VALUE)")
    }

    pub fn new() -> Result<Self> {
        Ok(Self {
            def: Self::option()?,
        })
    }
}

#[async_trait]
impl<D: EntryStore + ?Sized> OptionHandler<D> for AddHandler {
    fn definition(&self) -> &OptionDefinition {
        &self.def
    }

    async fn execute(&self, args: &[String], db: &D) -> anyhow::Result<()> {
        let values = required_values(&self.def, args)?;
        let records = values
            .iter()
            .map(|raw| {
                EntryRecord::parse_assignment(raw)
                    .with_context(|| format!("Expected KEY=VALUE, got '{}'", raw))
            })
            .collect::<anyhow::Result<Vec<_>>>()?;

        for record in records {
            let entry = db
                .put_entry(&record.key, &record.value)
                .await
                .with_context(|| format!("Failed to store '{}'", record.key))?;
            println!("{} {} = {}", "Stored".green(), entry.key.bold(), entry.value);
        }
        Ok(())
    }
}

/// `-g, --get KEY`
pub struct GetHandler {
    def: OptionDefinition,
}

impl GetHandler {
    pub fn option() -> Result<OptionDefinition> {
        OptionDefinition::new("g", "get", true, "Print the value of an entry")
    }

    pub fn new() -> Result<Self> {
        Ok(Self {
            def: Self::option()?,
        })
    }
}

#[async_trait]
impl<D: EntryStore + ?Sized> OptionHandler<D> for GetHandler {
    fn definition(&self) -> &OptionDefinition {
        &self.def
    }

    async fn execute(&self, args: &[String], db: &D) -> anyhow::Result<()> {
        for key in required_values(&self.def, args)? {
            match db.get_entry(&key).await? {
                Some(entry) => println!("{} = {}", entry.key.bold(), entry.value),
                None => {
                    debug!("No entry for '{}'", key);
                    println!("{} {}", "No entry named".yellow(), key.bold());
                },
            }
        }
        Ok(())
    }
}

/// `-l, --list`
pub struct ListHandler {
    def: OptionDefinition,
}

impl ListHandler {
    pub fn option() -> Result<OptionDefinition> {
        OptionDefinition::new("l", "list", false, "List all entries")
    }

    pub fn new() -> Result<Self> {
        Ok(Self {
            def: Self::option()?,
        })
    }
}

#[async_trait]
impl<D: EntryStore + ?Sized> OptionHandler<D> for ListHandler {
    fn definition(&self) -> &OptionDefinition {
        &self.def
    }

    async fn execute(&self, _args: &[String], db: &D) -> anyhow::Result<()> {
        let entries = db.list_entries().await.context("Failed to list entries")?;
        if entries.is_empty() {
            println!("{}", "The store is empty.".yellow());
            return Ok(());
        }
        println!("{}", entries_table(&entries));
        println!("Total entries: {}", entries.len());
        Ok(())
    }
}

/// `-d, --delete KEY`
pub struct DeleteHandler {
    def: OptionDefinition,
}

impl DeleteHandler {
    pub fn option() -> Result<OptionDefinition> {
        OptionDefinition::new("d", "delete", true, "Delete an entry")
    }

    pub fn new() -> Result<Self> {
        Ok(Self {
            def: Self::option()?,
        })
    }
}

#[async_trait]
impl<D: EntryStore + ?Sized> OptionHandler<D> for DeleteHandler {
    fn definition(&self) -> &OptionDefinition {
        &self.def
    }

    async fn execute(&self, args: &[String], db: &D) -> anyhow::Result<()> {
        for key in required_values(&self.def, args)? {
            if db.delete_entry(&key).await? {
                println!("{} {}", "Deleted".green(), key.bold());
            } else {
                println!("{} {}", "No entry named".yellow(), key.bold());
            }
        }
        Ok(())
    }
}

/// `-e, --export FILE`: writes all entries as a JSON array of `{key, value}`.
pub struct ExportHandler {
    def: OptionDefinition,
}

impl ExportHandler {
    pub fn option() -> Result<OptionDefinition> {
        OptionDefinition::new("e", "export", true, "Write all entries to a JSON file")
    }

    pub fn new() -> Result<Self> {
        Ok(Self {
            def: Self::option()?,
        })
    }
}

#[async_trait]
impl<D: EntryStore + ?Sized> OptionHandler<D> for ExportHandler {
    fn definition(&self) -> &OptionDefinition {
        &self.def
    }

    async fn execute(&self, args: &[String], db: &D) -> anyhow::Result<()> {
        let records: Vec<EntryRecord> = db
            .list_entries()
            .await?
            .into_iter()
            .map(EntryRecord::from)
            .collect();
        let json = serde_json::to_string_pretty(&records)?;

        for path in required_values(&self.def, args)? {
            tokio::fs::write(&path, &json)
                .await
                .with_context(|| format!("Failed to write {}", path))?;
            info!("Exported {} entries to {}", records.len(), path);
            println!("Exported {} entries to {}", records.len(), path.bold());
        }
        Ok(())
    }
}

/// `-m, --import FILE`: upserts every record of a file written by `--export`.
pub struct ImportHandler {
    def: OptionDefinition,
}

impl ImportHandler {
    pub fn option() -> Result<OptionDefinition> {
        OptionDefinition::new("m", "import", true, "Load entries from a JSON file")
    }

    pub fn new() -> Result<Self> {
        Ok(Self {
            def: Self::option()?,
        })
    }

    async fn import_file<D: EntryStore + ?Sized>(path: &Path, db: &D) -> anyhow::Result<usize> {
        let raw = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let records: Vec<EntryRecord> = serde_json::from_str(&raw)
            .with_context(|| format!("{} is not an entry export", path.display()))?;

        let progress = ProgressBar::new(records.len() as u64);
        progress.set_style(
            ProgressStyle::with_template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
                .progress_chars("=>-"),
        );

        let mut stored = 0;
        for record in &records {
            progress.inc(1);
            if record.key.trim().is_empty() {
                warn!("Skipping record with an empty key in {}", path.display());
                continue;
            }
            progress.set_message(record.key.clone());
            db.put_entry(&record.key, &record.value)
                .await
                .with_context(|| format!("Failed to store '{}'", record.key))?;
            stored += 1;
        }
        progress.finish_and_clear();
        Ok(stored)
    }
}

#[async_trait]
impl<D: EntryStore + ?Sized> OptionHandler<D> for ImportHandler {
    fn definition(&self) -> &OptionDefinition {
        &self.def
    }

    async fn execute(&self, args: &[String], db: &D) -> anyhow::Result<()> {
        for path in required_values(&self.def, args)? {
            let count = Self::import_file(Path::new(&path), db).await?;
            info!("Imported {} records from {}", count, path);
            println!("Imported {} records from {}", count, path.bold());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::mock::MockStore;
    use crate::error::AppError;

    fn argv(items: &[&str]) -> Vec<String> {
        std::iter::once(PROGRAM)
            .chain(items.iter().copied())
            .map(String::from)
            .collect()
    }

    #[test]
    fn test_registry_has_every_option() {
        let registry = build_registry::<MockStore>().unwrap();
        let longs: Vec<&str> = registry.definitions().map(|d| d.long()).collect();
        assert_eq!(
            longs,
            vec!["version", "init-db", "add", "get", "list", "delete", "export", "import", "help"]
        );
    }

    #[test]
    fn test_bo_definitions_match_registry() {
        let registry = build_registry::<MockStore>().unwrap();
        let registered: Vec<OptionDefinition> = registry.definitions().cloned().collect();
        assert_eq!(registered, bo_definitions().unwrap());
    }

    #[test]
    fn test_help_lists_all_options() {
        let registry = build_registry::<MockStore>().unwrap();
        let help = HelpHandler::new(PROGRAM, ABOUT, registry.definitions().cloned()).unwrap();
        let text = help.render();
        assert!(text.contains("Usage: bo [OPTIONS]"));
        for def in registry.definitions() {
            assert!(text.contains(&format!("--{}", def.long())), "missing {}", def);
        }
    }

    #[tokio::test]
    async fn test_init_db() {
        let db = MockStore::new();
        let registry = build_registry::<MockStore>().unwrap();
        registry.dispatch(&argv(&["--init-db"]), &db).await.unwrap();
        assert!(db.schema_initialized());
    }

    #[tokio::test]
    async fn test_add_get_delete() {
        let db = MockStore::new();
        let registry = build_registry::<MockStore>().unwrap();

        let ran = registry
            .dispatch(&argv(&["-a", "colour=blue", "--add=size=XL"]), &db)
            .await
            .unwrap();
        assert_eq!(ran, 1);
        assert_eq!(db.value_of("colour").as_deref(), Some("blue"));
        assert_eq!(db.value_of("size").as_deref(), Some("XL"));

        registry
            .dispatch(&argv(&["--get", "colour", "--get", "missing"]), &db)
            .await
            .unwrap();

        registry
            .dispatch(&argv(&["--delete", "colour", "-l"]), &db)
            .await
            .unwrap();
        assert_eq!(db.value_of("colour"), None);
        assert_eq!(db.len(), 1);
    }

    #[tokio::test]
    async fn test_stacked_short_flags_reach_the_store() {
        let db = MockStore::new();
        let registry = build_registry::<MockStore>().unwrap();

        let ran = registry
            .dispatch(&argv(&["-la", "x=1"]), &db)
            .await
            .unwrap();
        assert_eq!(ran, 2);
        assert_eq!(db.value_of("x").as_deref(), Some("1"));

        registry
            .dispatch(&argv(&["-lay=2"]), &db)
            .await
            .unwrap();
        assert_eq!(db.value_of("y").as_deref(), Some("2"));

        registry
            .dispatch(&argv(&["-ig", "x"]), &db)
            .await
            .unwrap();
        assert!(db.schema_initialized());
    }

    #[tokio::test]
    async fn test_add_rejects_malformed_assignment() {
        let db = MockStore::new();
        let registry = build_registry::<MockStore>().unwrap();

        let result = registry
            .dispatch(&argv(&["--add", "ok=1", "--add", "broken"]), &db)
            .await;

        match result {
            Err(AppError::Execution { option, message }) => {
                assert_eq!(option, "--add");
                assert!(message.contains("Expected KEY=VALUE"));
            },
            other => panic!("Expected Execution error, got {:?}", other),
        }
        // Nothing is written when any assignment is malformed
        assert_eq!(db.len(), 0);
    }

    #[tokio::test]
    async fn test_export_then_import() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("entries.json");
        let file = file.to_str().unwrap();
        let registry = build_registry::<MockStore>().unwrap();

        let source = MockStore::new();
        source.put_entry("a", "1").await.unwrap();
        source.put_entry("b", "two=2").await.unwrap();
        registry
            .dispatch(&argv(&["--export", file]), &source)
            .await
            .unwrap();

        let written: Vec<EntryRecord> =
            serde_json::from_str(&std::fs::read_to_string(file).unwrap()).unwrap();
        assert_eq!(
            written,
            vec![EntryRecord::new("a", "1"), EntryRecord::new("b", "two=2")]
        );

        let target = MockStore::new();
        registry
            .dispatch(&argv(&["-m", file]), &target)
            .await
            .unwrap();
        assert_eq!(target.value_of("a").as_deref(), Some("1"));
        assert_eq!(target.value_of("b").as_deref(), Some("two=2"));
    }

    #[tokio::test]
    async fn test_import_counts_only_stored_records() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("blank-key.json");
        std::fs::write(
            &file,
            r#"[{"key":" ","value":"x"},{"key":"a","value":"1"}]"#,
        )
        .unwrap();
        let db = MockStore::new();

        let count = ImportHandler::import_file(&file, &db).await.unwrap();

        assert_eq!(count, 1);
        assert_eq!(db.len(), 1);
        assert_eq!(db.value_of("a").as_deref(), Some("1"));
    }

    #[tokio::test]
    async fn test_import_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("garbage.json");
        std::fs::write(&file, "{ not json").unwrap();
        let registry = build_registry::<MockStore>().unwrap();
        let db = MockStore::new();

        let result = registry
            .dispatch(&argv(&["--import", file.to_str().unwrap()]), &db)
            .await;

        assert!(matches!(result, Err(AppError::Execution { .. })));
        assert_eq!(db.len(), 0);
    }

    #[tokio::test]
    async fn test_help_and_version_do_not_touch_the_store() {
        let db = MockStore::new();
        let registry = build_registry::<MockStore>().unwrap();
        let ran = registry
            .dispatch(&argv(&["-h", "-V"]), &db)
            .await
            .unwrap();
        assert_eq!(ran, 2);
        assert!(!db.schema_initialized());
        assert_eq!(db.len(), 0);
    }
}
