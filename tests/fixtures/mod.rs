use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::{json, Map, Value};
use tempfile::TempDir;
use utilkit::logging::{LogLevel, LogManager, MemoryAppender};

pub struct TestFixtures;

impl TestFixtures {
    /// 32-byte HS256 secret
    pub const SECRET: &'static str = "fixture-secret-0123456789abcdef!";

    pub fn sample_config_path() -> PathBuf {
        crate::get_test_data_dir().join("sample_config.yaml")
    }

    pub fn sample_user_path() -> PathBuf {
        crate::get_test_data_dir().join("sample_user.json")
    }

    pub fn claims() -> Map<String, Value> {
        let value = json!({"role": "editor", "tenant": "acme", "level": 3});
        value.as_object().cloned().unwrap_or_default()
    }

    /// A small tree:
    ///   root/a.txt, root/b.log, root/nested/c.txt, root/nested/deeper/d.bin
    pub fn create_sample_tree() -> TempDir {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(root, "a.txt", b"alpha\n");
        write(root, "b.log", b"line one\nline two\n");
        write(root, "nested/c.txt", b"charlie");
        write(root, "nested/deeper/d.bin", &[0u8, 1, 2, 3, 255]);
        dir
    }

    /// Manager with a TRACE memory appender named "memory" and an ERROR-only one named "errors".
    pub fn memory_manager(root: LogLevel) -> (Arc<LogManager>, Arc<MemoryAppender>, Arc<MemoryAppender>) {
        let manager = Arc::new(LogManager::new());
        manager.set_root_log_level(root);
        let all = Arc::new(MemoryAppender::new(LogLevel::Trace, 100));
        let errors = Arc::new(MemoryAppender::new(LogLevel::Error, 100));
        manager.register_appender("memory", all.clone());
        manager.register_appender("errors", errors.clone());
        (manager, all, errors)
    }
}

fn write(root: &Path, relative: &str, content: &[u8]) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}
