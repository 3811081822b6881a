//! Ordered sub-collections embedded in a parent document (likes, comments,
//! experience and education entries).
//!
//! Every helper here is pure: it only rearranges an already-loaded `Vec`.
//! Loading the parent and persisting the result is the caller's job. Head of
//! the vector is the most recent entry.

use uuid::Uuid;

/// An entry addressable by an id that is unique within its parent.
pub trait Keyed {
    fn key(&self) -> Uuid;
}

/// Outcome of [`toggle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggled {
    Added,
    Removed,
}

/// Inserts `item` as the new head.
pub fn prepend<T>(items: &mut Vec<T>, item: T) -> &T {
    items.insert(0, item);
    &items[0]
}

/// Removes exactly the entry whose key equals `key`, keeping the order of
/// the rest. `None` when nothing matches.
pub fn remove_by_key<T: Keyed>(items: &mut Vec<T>, key: Uuid) -> Option<T> {
    let pos = items.iter().position(|item| item.key() == key)?;
    Some(items.remove(pos))
}

/// Drops the entry keyed `key` and prepends `replacement`, so an updated
/// entry always ends up at the head. Leaves `items` untouched and returns
/// `None` when `key` is unknown.
pub fn replace_to_head<T: Keyed>(items: &mut Vec<T>, key: Uuid, replacement: T) -> Option<T> {
    let old = remove_by_key(items, key)?;
    prepend(items, replacement);
    Some(old)
}

/// Removes every element matching `is_member`, or prepends `make()` when
/// none does.
pub fn toggle<T>(
    items: &mut Vec<T>,
    is_member: impl Fn(&T) -> bool,
    make: impl FnOnce() -> T,
) -> Toggled {
    let before = items.len();
    items.retain(|item| !is_member(item));
    if items.len() != before {
        Toggled::Removed
    } else {
        items.insert(0, make());
        Toggled::Added
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Entry {
        id: Uuid,
        label: &'static str,
    }

    impl Keyed for Entry {
        fn key(&self) -> Uuid {
            self.id
        }
    }

    fn entry(label: &'static str) -> Entry {
        Entry {
            id: Uuid::new_v4(),
            label,
        }
    }

    fn labels(items: &[Entry]) -> Vec<&'static str> {
        items.iter().map(|e| e.label).collect()
    }

    #[test]
    fn prepend_puts_newest_first() {
        let mut items = vec![entry("a")];
        let head = prepend(&mut items, entry("b")).label;
        assert_eq!(head, "b");
        assert_eq!(labels(&items), vec!["b", "a"]);
    }

    #[test]
    fn remove_by_key_only_touches_the_match() {
        let (a, b, c) = (entry("a"), entry("b"), entry("c"));
        let mut items = vec![a.clone(), b.clone(), c.clone()];

        let removed = remove_by_key(&mut items, b.id).expect("b present");
        assert_eq!(removed, b);
        assert_eq!(labels(&items), vec!["a", "c"]);

        assert!(remove_by_key(&mut items, Uuid::new_v4()).is_none());
        assert_eq!(labels(&items), vec!["a", "c"]);
    }

    #[test]
    fn replace_moves_tail_entry_to_head() {
        let (a, b, c) = (entry("a"), entry("b"), entry("c"));
        let mut items = vec![a, b, c.clone()];

        let old = replace_to_head(&mut items, c.id, entry("c2")).expect("c present");
        assert_eq!(old.label, "c");
        assert_eq!(labels(&items), vec!["c2", "a", "b"]);
    }

    #[test]
    fn replace_with_unknown_key_is_a_no_op() {
        let mut items = vec![entry("a"), entry("b")];
        assert!(replace_to_head(&mut items, Uuid::new_v4(), entry("x")).is_none());
        assert_eq!(labels(&items), vec!["a", "b"]);
    }

    #[test]
    fn toggle_is_an_involution() {
        let original = vec![3u32, 1, 2];
        let mut items = original.clone();

        assert_eq!(toggle(&mut items, |x| *x == 7, || 7), Toggled::Added);
        assert_eq!(items, vec![7, 3, 1, 2]);
        assert_eq!(toggle(&mut items, |x| *x == 7, || 7), Toggled::Removed);
        assert_eq!(items, original);
    }

    #[test]
    fn toggle_removes_existing_member_in_place() {
        let mut items = vec![3u32, 1, 2];
        assert_eq!(toggle(&mut items, |x| *x == 1, || 1), Toggled::Removed);
        assert_eq!(items, vec![3, 2]);
    }
}
