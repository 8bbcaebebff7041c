//! Behavioral contracts of the task tree as seen by a host driver.

use chrono::{TimeZone, Utc};
use std::sync::Arc;
use taskfs::concurrency::Cancellation;
use taskfs::error::FsError;
use taskfs::service::{MemoryService, Service, Task, TaskRecord};
use taskfs::tree::{dir_entries, lookup, write_file, EntryKind, Node, Root, CTL};

fn task(key: &str) -> TaskRecord {
    let created = Utc.with_ymd_and_hms(2024, 4, 1, 9, 0, 0).unwrap();
    TaskRecord::new(key, format!("Subject of {}", key), created)
        .with_message(format!("Body of {}\nsecond line", key))
        .with_permalink(format!("https://tracker.example/issues/{}", key))
        .with_updated(created + chrono::Duration::hours(3))
}

fn sorted_names(entries: &[Arc<dyn Node>]) -> Vec<String> {
    let mut names: Vec<String> = entries.iter().map(|e| e.stat().name.clone()).collect();
    names.sort();
    names
}

fn child(entries: &[Arc<dyn Node>], name: &str) -> Arc<dyn Node> {
    entries
        .iter()
        .find(|e| e.stat().name == name)
        .cloned()
        .unwrap_or_else(|| panic!("no entry named {}", name))
}

#[tokio::test]
async fn root_lists_one_directory_per_service() {
    let mut root = Root::new();
    for name in ["github", "gitlab", "redmine"] {
        root.create_service(Arc::new(MemoryService::new(name))).unwrap();
    }

    let entries = root.read_dir(&Cancellation::new()).await.unwrap();
    let listed = dir_entries(&entries);
    assert_eq!(listed.len(), 3);
    for (entry, name) in listed.iter().zip(["github", "gitlab", "redmine"]) {
        assert_eq!(entry.name, name);
        assert_eq!(entry.kind, EntryKind::Directory);
    }
}

#[tokio::test]
async fn refresh_scenario_drops_removed_tasks() {
    let service = Arc::new(MemoryService::new("tracker1"));
    service.set_tasks(vec![task("1"), task("2")]);
    let mut root = Root::new();
    root.create_service(service.clone()).unwrap();
    let root: Arc<dyn Node> = Arc::new(root);
    let cancel = Cancellation::new();

    let dir = lookup(root.clone(), "tracker1", &cancel).await.unwrap();
    let entries = dir.read_dir(&cancel).await.unwrap();
    assert_eq!(sorted_names(&entries), vec!["1", "2", "ctl"]);

    service.set_tasks(vec![task("1")]);
    let ctl = child(&entries, CTL);
    write_file(ctl.as_ref(), b"refresh").await.unwrap();

    let entries = dir.read_dir(&cancel).await.unwrap();
    assert_eq!(sorted_names(&entries), vec!["1", "ctl"]);
    assert_eq!(service.fetch_count(), 2);

    // A directory handed out by a later root listing shares the refreshed cache.
    let again = lookup(root, "tracker1", &cancel).await.unwrap();
    assert_eq!(sorted_names(&again.read_dir(&cancel).await.unwrap()), vec!["1", "ctl"]);
    assert_eq!(service.fetch_count(), 2);
}

#[tokio::test]
async fn task_leaves_mirror_task_fields() {
    let record = task("77");
    let service = Arc::new(MemoryService::new("tracker1"));
    service.set_tasks(vec![record.clone()]);
    let mut root = Root::new();
    root.create_service(service).unwrap();
    let cancel = Cancellation::new();

    let task_dir = lookup(Arc::new(root), "tracker1/77", &cancel).await.unwrap();
    let leaves = task_dir.read_dir(&cancel).await.unwrap();
    let names: Vec<&str> = leaves.iter().map(|l| l.stat().name.as_str()).collect();
    assert_eq!(names, vec!["subject", "message", "url"]);

    for (leaf, content) in leaves
        .iter()
        .zip([record.subject(), record.message(), record.permalink()])
    {
        let data = leaf.read_file().unwrap();
        assert_eq!(data, content.as_bytes());
        assert_eq!(leaf.stat().size, data.len() as u64);
        assert_eq!(leaf.stat().creation, record.creation());
        assert_eq!(leaf.stat().last_mod, record.last_mod());
    }
}

#[tokio::test]
async fn operations_invalid_for_kind_are_protocol_violations() {
    let service = Arc::new(MemoryService::new("tracker1"));
    service.set_tasks(vec![task("1")]);
    let mut root = Root::new();
    root.create_service(service).unwrap();
    let root: Arc<dyn Node> = Arc::new(root);
    let cancel = Cancellation::new();

    for path in ["/", "tracker1", "tracker1/1"] {
        let node = lookup(root.clone(), path, &cancel).await.unwrap();
        assert!(
            matches!(node.read_file(), Err(FsError::ProtocolViolation { .. })),
            "read_file on {} should fail",
            path
        );
        assert!(
            matches!(
                write_file(node.as_ref(), b"refresh").await,
                Err(FsError::ProtocolViolation { .. })
            ),
            "write_file on {} should fail",
            path
        );
    }
    for path in ["tracker1/ctl", "tracker1/1/subject", "tracker1/1/url"] {
        let node = lookup(root.clone(), path, &cancel).await.unwrap();
        assert!(
            matches!(node.read_dir(&cancel).await, Err(FsError::ProtocolViolation { .. })),
            "read_dir on {} should fail",
            path
        );
    }
}

#[tokio::test]
async fn control_file_rejects_unknown_commands_without_side_effects() {
    let service = Arc::new(MemoryService::new("tracker1"));
    service.set_tasks(vec![task("1")]);
    let mut root = Root::new();
    root.create_service(service.clone()).unwrap();
    let root: Arc<dyn Node> = Arc::new(root);
    let cancel = Cancellation::new();

    let ctl = lookup(root.clone(), "tracker1/ctl", &cancel).await.unwrap();
    assert!(ctl.read_file().unwrap().is_empty());
    write_file(ctl.as_ref(), b"").await.unwrap();
    let err = write_file(ctl.as_ref(), b"bogus").await.unwrap_err();
    assert_eq!(err.to_string(), "unknown command: bogus");

    lookup(root, "tracker1", &cancel)
        .await
        .unwrap()
        .read_dir(&cancel)
        .await
        .unwrap();
    assert_eq!(service.fetch_count(), 1);
}

#[tokio::test]
async fn tree_stays_usable_after_upstream_failure() {
    let service = Arc::new(MemoryService::new("tracker1"));
    service.set_tasks(vec![task("1")]);
    service.fail_next("rate limited");
    let mut root = Root::new();
    root.create_service(service.clone()).unwrap();
    let root: Arc<dyn Node> = Arc::new(root);
    let cancel = Cancellation::new();

    let err = lookup(root.clone(), "tracker1/1", &cancel).await.err().unwrap();
    assert!(err.is_transient());
    assert!(err.to_string().contains("rate limited"));

    let node = lookup(root, "tracker1/1/subject", &cancel).await.unwrap();
    assert_eq!(node.read_file().unwrap(), b"Subject of 1");
    assert_eq!(service.name(), "tracker1");
}
