//! Classifies every catalog entry against the edited listing.

use crate::catalog::Catalog;
use crate::fs::FileSystem;
use crate::helpers::{resolve_listing_name, unique_path};
use crate::models::{Change, EditedLine};
use log::debug;
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

/// Compares `catalog` to the parsed `lines` and returns one change per
/// entry, in ascending counter order.
///
/// Entries without a line, or whose line is commented out, are deleted.
/// Rename targets that collide with a path that stays in place, with an
/// earlier rename target, or with an unmanaged existing path get the lowest
/// free `~`/`~N` suffix. Collisions are resolved by counter, never by line
/// order, so reordering the listing changes nothing. Swaps and cycles are
/// left as plain renames.
pub fn reconcile<F: FileSystem>(fs: &F, catalog: &Catalog, lines: &[EditedLine]) -> Vec<Change> {
    let by_counter: HashMap<usize, &EditedLine> =
        lines.iter().map(|line| (line.counter, line)).collect();

    let mut changes = Vec::with_capacity(catalog.len());
    let mut claimed = HashSet::new();
    let mut vacated = HashSet::new();

    for entry in catalog.entries() {
        let target = by_counter
            .get(&entry.counter)
            .filter(|line| !line.is_deleted)
            .map(|line| resolve_listing_name(&line.new_name));
        match target {
            None => {
                vacated.insert(entry.original_path.clone());
                changes.push(Change::Deleted {
                    counter: entry.counter,
                    path: entry.original_path.clone(),
                });
            }
            Some(to) if to == entry.original_path => {
                claimed.insert(to);
                changes.push(Change::Unchanged {
                    counter: entry.counter,
                });
            }
            Some(to) => {
                vacated.insert(entry.original_path.clone());
                changes.push(Change::Renamed {
                    counter: entry.counter,
                    from: entry.original_path.clone(),
                    to,
                });
            }
        }
    }

    for change in &mut changes {
        let Change::Renamed { counter, from, to } = change else {
            continue;
        };
        let counter = *counter;
        let resolved: PathBuf = unique_path(to, |candidate| {
            claimed.contains(candidate) || (fs.exists(candidate) && !vacated.contains(candidate))
        });
        if resolved != *to {
            debug!(
                "{} collides, renaming #{} to {} instead",
                to.display(),
                counter,
                resolved.display()
            );
        }
        claimed.insert(resolved.clone());
        if resolved == *from {
            *change = Change::Unchanged { counter };
        } else {
            *to = resolved;
        }
    }

    changes
}

/// Whether any change requires filesystem work.
pub fn has_work(changes: &[Change]) -> bool {
    changes
        .iter()
        .any(|change| !matches!(change, Change::Unchanged { .. }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{parse, serialize};
    use crate::testing::MemoryFileSystem;

    fn catalog(names: &[&str]) -> (MemoryFileSystem, Catalog) {
        let fs = MemoryFileSystem::new();
        for name in names {
            fs.add_file(name);
        }
        let catalog = Catalog::from_paths(names.iter().map(|n| (PathBuf::from(n), false)));
        (fs, catalog)
    }

    fn run(fs: &MemoryFileSystem, catalog: &Catalog, text: &str) -> Vec<Change> {
        reconcile(fs, catalog, &parse(text, catalog.len()).unwrap())
    }

    fn renamed(counter: usize, from: &str, to: &str) -> Change {
        Change::Renamed {
            counter,
            from: PathBuf::from(from),
            to: PathBuf::from(to),
        }
    }

    #[test]
    fn unedited_listing_changes_nothing() {
        let (fs, catalog) = catalog(&["a", "b"]);
        let changes = run(&fs, &catalog, &serialize(catalog.entries()));
        assert!(!has_work(&changes));
    }

    #[test]
    fn omission_blank_and_comment_all_delete() {
        let (fs, catalog) = catalog(&["a", "b", "c"]);
        let omitted = run(&fs, &catalog, "1\t./a\n3\t./c\n");
        let commented = run(&fs, &catalog, "1\t./a\n#2\t./b\n3\t./c\n");
        let expected = Change::Deleted {
            counter: 2,
            path: PathBuf::from("b"),
        };
        assert_eq!(omitted[1], expected);
        assert_eq!(commented, omitted);
    }

    #[test]
    fn trailing_separator_and_marker_are_ignored() {
        let (fs, catalog) = catalog(&["a"]);
        let changes = run(&fs, &catalog, "1\ta/\n");
        assert_eq!(changes, [Change::Unchanged { counter: 1 }]);
    }

    #[test]
    fn line_order_does_not_matter() {
        let (fs, catalog) = catalog(&["a", "b", "c"]);
        let forward = run(&fs, &catalog, "1\tz\n2\tz\n3\tc\n");
        let backward = run(&fs, &catalog, "3\tc\n2\tz\n1\tz\n");
        assert_eq!(forward, backward);
        assert_eq!(forward[0], renamed(1, "a", "z"));
        assert_eq!(forward[1], renamed(2, "b", "z~"));
    }

    #[test]
    fn three_renames_onto_existing_name_get_ordered_suffixes() {
        let (fs, catalog) = catalog(&["x", "y", "z"]);
        fs.add_file("a");
        let changes = run(&fs, &catalog, "3\ta\n1\ta\n2\ta\n");
        assert_eq!(
            changes,
            [renamed(1, "x", "a~"), renamed(2, "y", "a~1"), renamed(3, "z", "a~2")]
        );
    }

    #[test]
    fn rename_onto_unchanged_entry_is_disambiguated() {
        let (fs, catalog) = catalog(&["a", "b"]);
        let changes = run(&fs, &catalog, "1\ta\n2\ta\n");
        assert_eq!(changes[1], renamed(2, "b", "a~"));
    }

    #[test]
    fn rename_onto_vacated_path_is_kept() {
        let (fs, catalog) = catalog(&["a", "b"]);
        let changes = run(&fs, &catalog, "2\ta\n");
        assert_eq!(changes[1], renamed(2, "b", "a"));
    }

    #[test]
    fn swap_yields_two_plain_renames() {
        let (fs, catalog) = catalog(&["x", "y"]);
        let changes = run(&fs, &catalog, "1\ty\n2\tx\n");
        assert_eq!(changes, [renamed(1, "x", "y"), renamed(2, "y", "x")]);
    }

    #[test]
    fn disambiguated_name_colliding_again_searches_its_own_suffix() {
        let (fs, catalog) = catalog(&["p", "q"]);
        fs.add_file("a");
        fs.add_file("a~");
        let changes = run(&fs, &catalog, "1\ta\n2\ta~\n");
        assert_eq!(changes[0], renamed(1, "p", "a~1"));
        assert_eq!(changes[1], renamed(2, "q", "a~~"));
    }

    #[test]
    fn suffix_landing_on_own_name_is_unchanged() {
        let (fs, catalog) = catalog(&["a~"]);
        fs.add_file("a");
        let changes = run(&fs, &catalog, "1\ta\n");
        assert_eq!(changes, [Change::Unchanged { counter: 1 }]);
    }
}
