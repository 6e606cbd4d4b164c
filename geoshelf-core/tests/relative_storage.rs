//! Storage directories given relative to the working directory.
//!
//! These tests change the process working directory, so they live in their
//! own test binary and run one at a time behind a lock.

use camino::{Utf8Path, Utf8PathBuf};
use geoshelf_core::DocumentStore;
use parking_lot::Mutex;
use rstest::{fixture, rstest};
use tempfile::TempDir;

const POINT: &str = r#"{"type": "Point", "coordinates": [-1.26, 51.75]}"#;

static CWD_LOCK: Mutex<()> = Mutex::new(());

struct Workspace {
    _tmp: TempDir,
    root: Utf8PathBuf,
}

#[fixture]
fn workspace() -> Workspace {
    let tmp = TempDir::new().expect("create temp dir");
    let root = Utf8PathBuf::from_path_buf(tmp.path().to_path_buf()).expect("utf-8 temp dir");
    std::fs::create_dir(root.join("work")).expect("create working directory");
    Workspace { _tmp: tmp, root }
}

fn in_dir<R>(dir: &Utf8Path, f: impl FnOnce() -> R) -> R {
    let _guard = CWD_LOCK.lock();
    let previous = std::env::current_dir().expect("current dir");
    std::env::set_current_dir(dir).expect("enter working directory");
    let result = f();
    std::env::set_current_dir(previous).expect("restore working directory");
    result
}

#[rstest]
fn opens_an_existing_sibling_directory(workspace: Workspace) {
    let storage = workspace.root.join("storage");
    std::fs::create_dir(&storage).expect("create storage");
    std::fs::write(storage.join("67e55044-10b1-426f-9247-bb680e5fe0c8"), POINT)
        .expect("seed document");

    let ids = in_dir(&workspace.root.join("work"), || {
        let store = DocumentStore::open("../storage").expect("open ../storage");
        store.list_identifiers()
    });
    assert_eq!(ids.len(), 1);
}

#[rstest]
fn creates_a_missing_sibling_directory(workspace: Workspace) {
    let id = in_dir(&workspace.root.join("work"), || {
        let store = DocumentStore::open("../fresh/storage").expect("create ../fresh/storage");
        store.add(POINT, None).expect("add document")
    });
    let written = workspace.root.join("fresh/storage").join(id.to_string());
    assert_eq!(std::fs::read_to_string(written).expect("stored file"), POINT);
}
