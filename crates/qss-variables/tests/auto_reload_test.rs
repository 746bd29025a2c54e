//! Integration tests for debounced auto-reload.
//!
//! The debounce itself is exercised deterministically by driving
//! `on_file_changed` and `poll_reload` with explicit instants. One test runs
//! the real `notify` backend through `run_auto_reload`.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use pretty_assertions::assert_eq;
use qss_variables::{
    FileWatcher, LoaderConfig, MemorySink, NullWatcher, PathWatcher, StylesheetLoader, WatchError,
    run_auto_reload,
};
use tempfile::TempDir;

fn themed(color: &str) -> String {
    format!("@Variables[Name=\"Dark\"] {{ @Color: {color}; }}\nQWidget {{ color: @Color; }}\n")
}

fn write_qss(dir: &TempDir, content: &str) -> PathBuf {
    let path = dir.path().join("style.qss");
    std::fs::write(&path, content).unwrap();
    path
}

fn loader() -> StylesheetLoader<MemorySink> {
    StylesheetLoader::with_config(MemorySink::new(), NullWatcher, LoaderConfig::default())
}

#[test]
fn test_enable_auto_reload_without_file_returns_false() {
    let mut loader = loader();
    assert!(!loader.enable_auto_reload(true));
    assert!(loader.is_auto_reload_enabled());

    loader
        .load_stylesheet_from_data(&themed("#000"), "Dark")
        .unwrap();
    assert!(!loader.enable_auto_reload(true));
    assert!(loader.watched_path().is_none());
}

#[test]
fn test_enable_auto_reload_with_file_returns_true() {
    let temp = TempDir::new().unwrap();
    let path = write_qss(&temp, &themed("#000"));

    let mut loader = loader();
    loader.load_stylesheet(&path, "Dark").unwrap();

    assert!(loader.enable_auto_reload(true));
    assert_eq!(loader.watched_path(), Some(path.as_path()));

    assert!(!loader.enable_auto_reload(false));
    assert!(!loader.is_auto_reload_enabled());
    assert!(loader.watched_path().is_none());
}

#[test]
fn test_watch_follows_the_loaded_source() {
    let temp = TempDir::new().unwrap();
    let path = write_qss(&temp, &themed("#000"));

    let mut loader = loader();
    assert!(!loader.enable_auto_reload(true));

    // Enabled before loading: the load arms the watch
    loader.load_stylesheet(&path, "Dark").unwrap();
    assert_eq!(loader.watched_path(), Some(path.as_path()));

    // In-memory data has no file to watch
    loader
        .load_stylesheet_from_data(&themed("#111"), "Dark")
        .unwrap();
    assert!(loader.watched_path().is_none());
}

#[test]
fn test_burst_of_writes_reloads_once_with_final_content() {
    let temp = TempDir::new().unwrap();
    let path = write_qss(&temp, &themed("#000000"));

    let mut loader = loader();
    loader.load_stylesheet(&path, "Dark").unwrap();
    assert!(loader.enable_auto_reload(true));

    let start = Instant::now();
    for (offset, color) in [(0, "#000001"), (20, "#000002"), (40, "#000003")] {
        std::fs::write(&path, themed(color)).unwrap();
        loader.on_file_changed(&path, start + Duration::from_millis(offset));
    }

    assert_eq!(
        loader.reload_deadline(),
        Some(start + Duration::from_millis(190))
    );
    assert!(loader.poll_reload(start + Duration::from_millis(150)).is_none());
    assert!(matches!(
        loader.poll_reload(start + Duration::from_millis(190)),
        Some(Ok(()))
    ));
    assert!(loader.poll_reload(start + Duration::from_secs(1)).is_none());

    let sink = loader.sink();
    assert_eq!(sink.apply_count(), 2);
    assert!(sink.last().unwrap().contains("color: #000003;"));
    assert!(!sink.history().iter().any(|s| s.contains("#000001")));
    assert!(!sink.history().iter().any(|s| s.contains("#000002")));
    assert_eq!(loader.current_theme_name(), "Dark");
}

#[test]
fn test_changes_to_other_files_are_ignored() {
    let temp = TempDir::new().unwrap();
    let path = write_qss(&temp, &themed("#000"));

    let mut loader = loader();
    loader.load_stylesheet(&path, "Dark").unwrap();
    loader.enable_auto_reload(true);

    loader.on_file_changed(&temp.path().join("other.qss"), Instant::now());
    assert!(!loader.is_reload_pending());
}

#[test]
fn test_disabled_auto_reload_ignores_changes() {
    let temp = TempDir::new().unwrap();
    let path = write_qss(&temp, &themed("#000"));

    let mut loader = loader();
    loader.load_stylesheet(&path, "Dark").unwrap();
    assert!(!loader.enable_auto_reload(false));

    std::fs::write(&path, themed("#fff")).unwrap();
    let now = Instant::now();
    loader.on_file_changed(&path, now);

    assert!(!loader.is_reload_pending());
    assert!(loader.poll_reload(now + Duration::from_secs(1)).is_none());
    assert!(loader.current_stylesheet().contains("color: #000;"));
}

#[test]
fn test_disabling_cancels_pending_reload() {
    let temp = TempDir::new().unwrap();
    let path = write_qss(&temp, &themed("#000"));

    let mut loader = loader();
    loader.load_stylesheet(&path, "Dark").unwrap();
    loader.enable_auto_reload(true);

    std::fs::write(&path, themed("#fff")).unwrap();
    let now = Instant::now();
    loader.on_file_changed(&path, now);
    assert!(loader.is_reload_pending());

    loader.enable_auto_reload(false);
    assert!(!loader.is_reload_pending());
    assert!(loader.poll_reload(now + Duration::from_secs(1)).is_none());
    assert_eq!(loader.sink().apply_count(), 1);
}

#[test]
fn test_failed_reload_keeps_applied_stylesheet() {
    let temp = TempDir::new().unwrap();
    let path = write_qss(&temp, &themed("#000"));

    let mut loader = loader();
    loader.load_stylesheet(&path, "Dark").unwrap();
    loader.enable_auto_reload(true);

    // An emptied file is rejected
    std::fs::write(&path, "").unwrap();
    let now = Instant::now();
    loader.on_file_changed(&path, now);

    assert!(matches!(
        loader.poll_reload(now + Duration::from_secs(1)),
        Some(Err(_))
    ));
    assert!(loader.current_stylesheet().contains("color: #000;"));
    assert_eq!(loader.sink().apply_count(), 1);
}

/// Watcher that records how often it is armed and cleared.
#[derive(Default, Clone)]
struct CountingWatcher {
    watches: Arc<AtomicUsize>,
    unwatches: Arc<AtomicUsize>,
}

impl PathWatcher for CountingWatcher {
    fn watch(&mut self, path: &Path) -> Result<PathBuf, WatchError> {
        self.watches.fetch_add(1, Ordering::SeqCst);
        Ok(path.to_path_buf())
    }

    fn unwatch(&mut self) {
        self.unwatches.fetch_add(1, Ordering::SeqCst);
    }
}

#[test]
fn test_reload_keeps_the_existing_watch() {
    let temp = TempDir::new().unwrap();
    let path = write_qss(&temp, &themed("#000"));

    let watcher = CountingWatcher::default();
    let counts = watcher.clone();
    let config = LoaderConfig::default().with_auto_reload(true);
    let mut loader = StylesheetLoader::with_config(MemorySink::new(), watcher, config);
    loader.load_stylesheet(&path, "Dark").unwrap();
    assert_eq!(counts.watches.load(Ordering::SeqCst), 1);

    std::fs::write(&path, themed("#fff")).unwrap();
    let now = Instant::now();
    loader.on_file_changed(&path, now);
    assert!(matches!(
        loader.poll_reload(now + Duration::from_secs(1)),
        Some(Ok(()))
    ));
    loader.set_theme("Dark").unwrap();
    loader.reload_stylesheet().unwrap();

    assert!(loader.current_stylesheet().contains("color: #fff;"));
    assert_eq!(loader.watched_path(), Some(path.as_path()));
    assert_eq!(counts.watches.load(Ordering::SeqCst), 1);
    assert_eq!(counts.unwatches.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_event_loop_reloads_after_file_change() {
    let temp = TempDir::new().unwrap();
    // Canonicalize to handle macOS /var -> /private/var symlinks
    let dir = temp.path().canonicalize().unwrap();
    let path = dir.join("style.qss");
    std::fs::write(&path, themed("#000000")).unwrap();

    tokio::time::sleep(Duration::from_millis(100)).await;

    let (watcher, mut events) = FileWatcher::new().unwrap();
    let config = LoaderConfig::default()
        .with_debounce_ms(200)
        .with_auto_reload(true);
    let mut loader = StylesheetLoader::with_config(MemorySink::new(), watcher, config);
    loader.load_stylesheet(&path, "Dark").unwrap();
    assert_eq!(loader.watched_path(), Some(path.as_path()));

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

    let writer = async {
        tokio::time::sleep(Duration::from_millis(100)).await;
        for color in ["#000001", "#000002", "#000003"] {
            std::fs::write(&path, themed(color)).unwrap();
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        tokio::time::sleep(Duration::from_millis(1500)).await;
        let _ = shutdown_tx.send(());
    };

    let run = run_auto_reload(&mut loader, &mut events, async {
        let _ = shutdown_rx.await;
    });

    tokio::time::timeout(Duration::from_secs(10), async { tokio::join!(run, writer) })
        .await
        .expect("event loop did not shut down");

    assert!(loader.current_stylesheet().contains("color: #000003;"));
    assert!(loader.sink().apply_count() >= 2);
    assert!(!loader.sink().history().iter().any(|s| s.contains("#000001")));
}
