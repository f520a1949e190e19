//! Test helpers for seeding a database and invoking the CLI in-process.

use super::*;
use palate_core::Note;
use palate_core::test_support::dishes_for;
use serde_json::Value;
use std::fs;
use tempfile::TempDir;

pub(super) const PALATE: &str = "palate";

pub(super) struct Workspace {
    _dir: TempDir,
    root: Utf8PathBuf,
}

impl Workspace {
    pub(super) fn new() -> Self {
        let dir = TempDir::new().expect("tempdir");
        let root =
            Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 workspace");
        Self { _dir: dir, root }
    }

    pub(super) fn root(&self) -> &Utf8PathBuf {
        &self.root
    }

    pub(super) fn database(&self) -> Utf8PathBuf {
        self.root.join("data").join("palate.db")
    }

    pub(super) fn write(&self, name: &str, contents: &str) -> Utf8PathBuf {
        let path = self.root.join(name);
        fs::write(&path, contents).expect("write workspace file");
        path
    }

    pub(super) fn write_notes(&self, name: &str, notes: &[Note]) -> Utf8PathBuf {
        let encoded = serde_json::to_string_pretty(notes).expect("encode notes");
        self.write(name, &encoded)
    }

    /// Import a community where bob shares alice's palate and cara does not.
    pub(super) fn seed_community(&self) {
        let dishes = [
            ("Ramen", 9),
            ("Pho", 8),
            ("Laksa", 7),
            ("Udon", 6),
            ("Soba", 5),
            ("Tonkatsu", 4),
        ];
        let mut notes = dishes_for("alice", &dishes);
        notes.extend(dishes_for("bob", &dishes));
        notes.extend(dishes_for("cara", &[("Ramen", 1), ("Pho", 2)]));
        let path = self.write_notes("community.json", &notes);
        invoke(self, &["import", path.as_str()]).expect("import community");
    }
}

/// Run the CLI against the workspace database and return the envelope data.
pub(super) fn invoke(workspace: &Workspace, args: &[&str]) -> Result<Value, CliError> {
    invoke_with_env(workspace, args, Vec::new())
}

pub(super) fn invoke_with_env(
    workspace: &Workspace,
    args: &[&str],
    environment: Vec<(String, String)>,
) -> Result<Value, CliError> {
    let database = workspace.database();
    let argv = [PALATE, "--database", database.as_str()]
        .into_iter()
        .chain(args.iter().copied());
    let cli = Cli::try_parse_from(argv)?;
    let mut stdout = Vec::new();
    run_with(cli, environment, &mut stdout)?;
    let envelope: Value = serde_json::from_slice(&stdout).expect("stdout is JSON");
    assert_eq!(envelope["statusCode"], 200);
    Ok(envelope["data"].clone())
}
