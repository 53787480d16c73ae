//! Folder/file materialization / 目录与文件构建
//!
//! Turns the aggregated pages of one prefix into immediate children. Names
//! are the keys with the requested prefix cut off literally; no other path
//! cleanup happens here and no order is imposed.

use crate::storage::RawEntry;

use super::{FileEntry, FolderEntry, ListingView};

/// Build the view for `prefix` from raw entries / 构建目录视图
pub fn build(entries: &[RawEntry], prefix: &str) -> ListingView {
    let mut folders = Vec::new();
    let mut files = Vec::new();

    for entry in entries {
        match entry {
            RawEntry::CommonPrefix(path) => {
                let Some(name) = path.strip_prefix(prefix) else {
                    tracing::warn!("Common prefix {:?} outside {:?}, skipped", path, prefix);
                    continue;
                };
                folders.push(FolderEntry {
                    name: name.to_string(),
                    full_path: path.clone(),
                });
            }
            RawEntry::Object(object) => {
                // 过滤掉目录本身
                if object.key == prefix {
                    continue;
                }
                let Some(name) = object.key.strip_prefix(prefix) else {
                    tracing::warn!("Object {:?} outside {:?}, skipped", object.key, prefix);
                    continue;
                };
                files.push(FileEntry {
                    name: name.to_string(),
                    full_path: object.key.clone(),
                    size: object.size,
                    last_modified: object.last_modified,
                });
            }
        }
    }

    ListingView {
        folders,
        files,
        prefix: prefix.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::ObjectEntry;
    use chrono::DateTime;

    fn object(key: &str, size: u64) -> RawEntry {
        RawEntry::Object(ObjectEntry {
            key: key.to_string(),
            size,
            last_modified: DateTime::from_timestamp(1_700_000_000, 0),
        })
    }

    fn prefix(p: &str) -> RawEntry {
        RawEntry::CommonPrefix(p.to_string())
    }

    fn sample() -> Vec<RawEntry> {
        vec![
            prefix("photos/2023/"),
            object("photos/", 0),
            object("photos/b.jpg", 20),
            prefix("photos/2022/"),
            object("photos/a.jpg", 10),
        ]
    }

    #[test]
    fn test_build_is_idempotent() {
        let entries = sample();
        assert_eq!(build(&entries, "photos/"), build(&entries, "photos/"));
    }

    #[test]
    fn test_marker_object_is_excluded() {
        let view = build(&sample(), "photos/");
        assert!(view.files.iter().all(|f| f.full_path != "photos/"));
        assert_eq!(view.files.len(), 2);
    }

    #[test]
    fn test_every_path_keeps_requested_prefix() {
        let view = build(&sample(), "photos/");
        for folder in &view.folders {
            assert!(folder.full_path.starts_with("photos/"));
        }
        for file in &view.files {
            assert!(file.full_path.starts_with("photos/"));
        }
        assert_eq!(view.prefix, "photos/");
    }

    #[test]
    fn test_provider_order_is_preserved() {
        let view = build(&sample(), "photos/");
        let folders: Vec<&str> = view.folders.iter().map(|f| f.name.as_str()).collect();
        let files: Vec<&str> = view.files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(folders, vec!["2023/", "2022/"]);
        assert_eq!(files, vec!["b.jpg", "a.jpg"]);
    }

    #[test]
    fn test_size_and_timestamp_carried_verbatim() {
        let view = build(&sample(), "photos/");
        let b = &view.files[0];
        assert_eq!(b.size, 20);
        assert_eq!(b.last_modified, DateTime::from_timestamp(1_700_000_000, 0));
    }

    #[test]
    fn test_root_prefix_keeps_full_names() {
        let entries = vec![prefix("notes/"), object("a.txt", 10)];
        let view = build(&entries, "");
        assert_eq!(view.folders[0].name, "notes/");
        assert_eq!(view.files[0].name, "a.txt");
        assert_eq!(view.files[0].full_path, "a.txt");
    }

    #[test]
    fn test_name_strips_prefix_literally() {
        // 不做额外的路径规范化
        let entries = vec![object("dir//odd.txt", 1)];
        let view = build(&entries, "dir/");
        assert_eq!(view.files[0].name, "/odd.txt");
    }

    #[test]
    fn test_foreign_entries_are_dropped() {
        let entries = vec![prefix("other/"), object("elsewhere.txt", 1), object("dir/ok.txt", 1)];
        let view = build(&entries, "dir/");
        assert!(view.folders.is_empty());
        assert_eq!(view.files.len(), 1);
        assert_eq!(view.files[0].full_path, "dir/ok.txt");
    }
}
