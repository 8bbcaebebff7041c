//! Format listings and node metadata as text or JSON.

use crate::tree::{DirEntry, FileInfo, WalkEntry};
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use serde_json::{json, Value};

fn timestamp(info: &FileInfo) -> String {
    info.last_mod.format("%Y-%m-%d %H:%M").to_string()
}

/// Listing as a table: mode, size, modification time, name.
pub fn format_listing_text(infos: &[FileInfo]) -> String {
    if infos.is_empty() {
        return "(empty)".to_string();
    }
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Mode", "Size", "Modified", "Name"]);
    for info in infos {
        table.add_row(vec![
            info.mode.to_string(),
            info.size.to_string(),
            timestamp(info),
            info.name.clone(),
        ]);
    }
    table.to_string()
}

pub fn info_json(info: &FileInfo) -> Value {
    let entry = DirEntry::from(info);
    json!({
        "name": entry.name,
        "kind": entry.kind,
        "mode": format!("{:o}", entry.mode),
        "size": info.size,
        "created": info.creation.to_rfc3339(),
        "modified": info.last_mod.to_rfc3339(),
    })
}

pub fn format_listing_json(infos: &[FileInfo]) -> String {
    let entries: Vec<Value> = infos.iter().map(info_json).collect();
    Value::Array(entries).to_string()
}

pub fn format_stat_text(info: &FileInfo) -> String {
    let kind = if info.is_dir() { "directory" } else { "file" };
    format!(
        "Name: {}\nKind: {}\nMode: {} ({:o})\nSize: {}\nCreated: {}\nModified: {}",
        if info.name.is_empty() { "/" } else { info.name.as_str() },
        kind,
        info.mode,
        info.unix_mode(),
        info.size,
        info.creation.to_rfc3339(),
        info.last_mod.to_rfc3339(),
    )
}

/// One line per node: mode, size, path.
pub fn format_walk_text(entries: &[WalkEntry]) -> String {
    entries
        .iter()
        .map(|entry| format!("{} {:>8} {}", entry.info.mode, entry.info.size, entry.path))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn infos() -> Vec<FileInfo> {
        let t = Utc.with_ymd_and_hms(2024, 5, 6, 7, 8, 0).unwrap();
        vec![
            FileInfo::dir("42", t, t),
            FileInfo::file("ctl", 0, t, t),
        ]
    }

    #[test]
    fn test_listing_text_has_names_and_modes() {
        let text = format_listing_text(&infos());
        assert!(text.contains("Name"));
        assert!(text.contains("drwxr-xr-x"));
        assert!(text.contains("-rw-r--r--"));
        assert!(text.contains("2024-05-06 07:08"));
        assert!(text.contains("ctl"));
    }

    #[test]
    fn test_listing_json_fields() {
        let parsed: Value = serde_json::from_str(&format_listing_json(&infos())).unwrap();
        let entries = parsed.as_array().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0]["name"], "42");
        assert_eq!(entries[0]["kind"], "directory");
        assert_eq!(entries[0]["mode"], "40755");
        assert_eq!(entries[1]["kind"], "file");
        assert_eq!(entries[1]["size"], 0);
    }

    #[test]
    fn test_stat_text_names_root() {
        let t = Utc::now();
        let text = format_stat_text(&FileInfo::dir("", t, t));
        assert!(text.starts_with("Name: /\nKind: directory"));
    }
}
