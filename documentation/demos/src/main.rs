//! Storeplan demo
//!
//! Builds a four-version schema for a small notes app, shows the steps an
//! executor would run from a given installed version, then replays them
//! against an in-memory store and scans an index with a key range.

use clap::{Parser, ValueEnum};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::error::Error;
use storeplan::catalog::{evaluate, evaluate_multi_entry, IndexDescriptor, KeyPath};
use storeplan::prelude::*;
use tracing::{info, warn};

/// Output format for the pending steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// One line per action
    Text,
    /// Action log as JSON
    Json,
}

/// Storeplan demo
#[derive(Parser, Debug)]
#[command(name = "storeplan-demo")]
#[command(version, about = "Plan and replay a versioned notes schema")]
struct Args {
    /// Version already installed by the executor
    #[arg(long)]
    installed: Option<i64>,

    /// Output format
    #[arg(long, default_value = "text", value_enum)]
    format: OutputFormat,

    /// Reject renames to the current name instead of ignoring them
    #[arg(long)]
    strict_renames: bool,

    /// Skip the in-memory replay
    #[arg(long)]
    plan_only: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("storeplan_core=info")),
        )
        .init();

    let args = Args::parse();

    if let Err(e) = run(args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), Box<dyn Error>> {
    let mut config = PlanConfig::new();
    if args.strict_renames {
        config = config.with_same_name_rename(SameNameRename::Reject);
    }

    let mut plan = notes_plan(config)?;

    // A broken version is discarded without touching the plan.
    let attempted = plan.add_version(5, |v| {
        v.delete_index("notes", "byTitle")?;
        Ok(())
    });
    if let Err(e) = attempted {
        warn!(error = %e, "Version 5 rejected");
    }

    let pending = plan.pending_steps(args.installed);
    match args.format {
        OutputFormat::Text => {
            for step in pending {
                println!("v{}", step.version);
                for action in &step.actions {
                    println!("  {}", action.description());
                }
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(pending)?),
    }

    if !args.plan_only {
        replay_notes(&plan)?;
    }
    Ok(())
}

fn notes_plan(config: PlanConfig) -> Result<MigrationPlan, MigrationError> {
    let note = Shape::object()
        .with_field("id", Shape::Number)
        .with_field("body", Shape::String);

    MigrationPlan::with_config(config)
        .version(1, |v| {
            v.create_store(StoreDef::new("notes", note).with_key_path("id").with_auto_increment())?
                .create_store(StoreDef::new("drafts", Shape::String))?;
            Ok(())
        })?
        .version(2, |v| {
            v.update_schema(
                "notes",
                Shape::object().with_optional("tags", Shape::array(Shape::String)),
            )?
            .create_index("notes", IndexDef::new("byTag", "tags").with_multi_entry())?;
            Ok(())
        })?
        .version(3, |v| {
            let counted = Shape::object()
                .with_field("id", Shape::Number)
                .with_field("body", Shape::String)
                .with_optional("tags", Shape::array(Shape::String))
                .with_field("words", Shape::Number);
            v.transform_store("notes", Transform::new(counted, count_words))?
                .create_index("notes", IndexDef::new("byWords", "words"))?;
            Ok(())
        })?
        .version(4, |v| {
            v.rename_store("drafts", "scratch")?
                .rename_index("notes", "byTag", "tag")?;
            Ok(())
        })
}

fn count_words(mut note: Value) -> Value {
    let words = note["body"]
        .as_str()
        .map(|body| body.split_whitespace().count())
        .unwrap_or(0);
    note["words"] = json!(words);
    note
}

/// One store of the in-memory executor.
struct MemoryStore {
    key_path: Option<KeyPath>,
    auto_increment: bool,
    next_key: f64,
    records: BTreeMap<Key, Value>,
    indexes: BTreeMap<String, MemoryIndex>,
}

struct MemoryIndex {
    descriptor: IndexDescriptor,
    entries: BTreeMap<Key, Vec<Key>>,
}

impl MemoryIndex {
    fn new(descriptor: IndexDescriptor) -> Self {
        Self {
            descriptor,
            entries: BTreeMap::new(),
        }
    }

    fn insert(&mut self, primary: &Key, record: &Value) -> Result<(), Box<dyn Error>> {
        let keys = match (&self.descriptor.key_path, self.descriptor.multi_entry) {
            (KeyPath::Single(path), true) => evaluate_multi_entry(record, path),
            (path, _) => evaluate(record, path).into_iter().collect(),
        };
        for key in keys {
            let entry = self.entries.entry(key).or_default();
            if self.descriptor.unique && !entry.is_empty() {
                return Err(format!("unique index violated by record {:?}", primary).into());
            }
            entry.push(primary.clone());
        }
        Ok(())
    }
}

impl MemoryStore {
    fn new(key_path: Option<KeyPath>, auto_increment: bool) -> Self {
        Self {
            key_path,
            auto_increment,
            next_key: 1.0,
            records: BTreeMap::new(),
            indexes: BTreeMap::new(),
        }
    }

    fn put(&mut self, mut record: Value) -> Result<Key, Box<dyn Error>> {
        let key = match &self.key_path {
            Some(path) => match evaluate(&record, path) {
                Some(key) => key,
                None if self.auto_increment => {
                    let key = Key::Number(self.next_key);
                    if let KeyPath::Single(field) = path {
                        record[field.as_str()] = json!(self.next_key);
                    }
                    key
                }
                None => return Err("record has no key".into()),
            },
            None if self.auto_increment => Key::Number(self.next_key),
            None => return Err("out-of-line store needs an explicit key".into()),
        };
        if let Key::Number(n) = key {
            self.next_key = self.next_key.max(n.floor() + 1.0);
        }

        for index in self.indexes.values_mut() {
            index.insert(&key, &record)?;
        }
        self.records.insert(key.clone(), record);
        Ok(key)
    }

    fn rebuild(&mut self) -> Result<(), Box<dyn Error>> {
        for index in self.indexes.values_mut() {
            index.entries.clear();
            for (key, record) in &self.records {
                index.insert(key, record)?;
            }
        }
        Ok(())
    }

    fn transform(&mut self, transform: &Transform) -> Result<(), Box<dyn Error>> {
        let records = std::mem::take(&mut self.records);
        for (key, record) in records {
            self.records.insert(key, transform.apply(record));
        }
        self.rebuild()
    }
}

/// Applies actions the way a storage engine would during an upgrade.
#[derive(Default)]
struct MemoryExecutor {
    stores: BTreeMap<String, MemoryStore>,
}

impl MemoryExecutor {
    fn store(&mut self, name: &str) -> Result<&mut MemoryStore, Box<dyn Error>> {
        self.stores
            .get_mut(name)
            .ok_or_else(|| format!("store '{}' is not installed", name).into())
    }

    fn apply(&mut self, action: &Action) -> Result<(), Box<dyn Error>> {
        match action {
            Action::CreateStore {
                store_name,
                key_path,
                auto_increment,
            } => {
                self.stores.insert(
                    store_name.clone(),
                    MemoryStore::new(key_path.clone(), *auto_increment),
                );
            }
            Action::DeleteStore { store_name } => {
                self.stores.remove(store_name);
            }
            Action::RenameStore { old_name, new_name } => {
                let store = self
                    .stores
                    .remove(old_name)
                    .ok_or_else(|| format!("store '{}' is not installed", old_name))?;
                self.stores.insert(new_name.clone(), store);
            }
            Action::CreateIndex {
                store_name,
                index_name,
                key_path,
                multi_entry,
                unique,
            } => {
                let store = self.store(store_name)?;
                let descriptor = IndexDescriptor {
                    key_path: key_path.clone(),
                    multi_entry: *multi_entry,
                    unique: *unique,
                };
                store
                    .indexes
                    .insert(index_name.clone(), MemoryIndex::new(descriptor));
                store.rebuild()?;
            }
            Action::DeleteIndex {
                store_name,
                index_name,
            } => {
                self.store(store_name)?.indexes.remove(index_name);
            }
            Action::RenameIndex {
                store_name,
                old_index_name,
                new_index_name,
            } => {
                let store = self.store(store_name)?;
                if let Some(index) = store.indexes.remove(old_index_name) {
                    store.indexes.insert(new_index_name.clone(), index);
                }
            }
            Action::TransformStore {
                store_name,
                transform,
            } => self.store(store_name)?.transform(transform)?,
        }
        Ok(())
    }
}

fn replay_notes(plan: &MigrationPlan) -> Result<(), Box<dyn Error>> {
    let mut executor = MemoryExecutor::default();

    for step in plan.pending_steps(None) {
        for action in &step.actions {
            executor.apply(action)?;
        }
        info!(version = step.version, "Step installed");

        if step.version == 1 {
            let notes = executor.store("notes")?;
            notes.put(json!({ "body": "buy milk" }))?;
            notes.put(json!({ "body": "call the plumber about the sink", "tags": ["home", "urgent"] }))?;
            notes.put(json!({ "body": "ship the release notes today", "tags": ["work", "urgent", "work"] }))?;
        }
    }

    let notes = executor.store("notes")?;
    println!("notes: {} records", notes.records.len());

    if let Some(tag) = notes.indexes.get("tag") {
        for (key, primaries) in &tag.entries {
            println!("  tag {:?} -> {:?}", key, primaries);
        }
    }

    let range = KeyRange::builder()
        .greater_or_equal(Key::from(3))
        .less_than(Key::from(6))
        .build()?;
    if let Some(words) = notes.indexes.get("byWords") {
        for (key, primaries) in words.entries.range(range) {
            println!("  words {:?} -> {:?}", key, primaries);
        }
    }

    Ok(())
}
