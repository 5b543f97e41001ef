//! Structural editing of the workout item tree.
//!
//! Free functions work on any item list; the `WorkoutPlan` wrappers apply
//! them to the plan's top-level items and refresh `updated_at`.

use crate::{Error, Result, WorkoutItem, WorkoutPlan};

/// Direction for reordering an item among its siblings
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MoveDirection {
    Up,
    Down,
}

/// Find an item anywhere in the tree
pub fn find_item<'a>(items: &'a [WorkoutItem], id: &str) -> Option<&'a WorkoutItem> {
    for item in items {
        if item.id() == id {
            return Some(item);
        }
        if let WorkoutItem::Set(set) = item {
            if let Some(found) = find_item(&set.items, id) {
                return Some(found);
            }
        }
    }
    None
}

fn find_item_mut<'a>(items: &'a mut [WorkoutItem], id: &str) -> Option<&'a mut WorkoutItem> {
    for item in items.iter_mut() {
        if item.id() == id {
            return Some(item);
        }
        if let WorkoutItem::Set(set) = item {
            if let Some(found) = find_item_mut(&mut set.items, id) {
                return Some(found);
            }
        }
    }
    None
}

/// The sibling list holding `id` and its position in that list
fn siblings_of<'a>(
    items: &'a mut Vec<WorkoutItem>,
    id: &str,
) -> Option<(&'a mut Vec<WorkoutItem>, usize)> {
    if let Some(pos) = items.iter().position(|i| i.id() == id) {
        return Some((items, pos));
    }
    for item in items.iter_mut() {
        if let WorkoutItem::Set(set) = item {
            if let Some(found) = siblings_of(&mut set.items, id) {
                return Some(found);
            }
        }
    }
    None
}

/// Append an item to the top level, or to the end of set `parent_id`
pub fn add_item(
    items: &mut Vec<WorkoutItem>,
    parent_id: Option<&str>,
    item: WorkoutItem,
) -> Result<()> {
    let Some(parent_id) = parent_id else {
        items.push(item);
        return Ok(());
    };

    match find_item_mut(items, parent_id) {
        Some(WorkoutItem::Set(set)) => {
            set.items.push(item);
            Ok(())
        }
        Some(_) => Err(Error::Validation(format!(
            "item {} is not a set",
            parent_id
        ))),
        None => Err(Error::NotFound(format!("item {}", parent_id))),
    }
}

/// Remove an item (and, for a set, its whole subtree)
pub fn remove_item(items: &mut Vec<WorkoutItem>, id: &str) -> Option<WorkoutItem> {
    let (siblings, pos) = siblings_of(items, id)?;
    Some(siblings.remove(pos))
}

/// Swap an item with its neighbour
///
/// Returns `false` when the item is already first (up) or last (down).
pub fn move_item(items: &mut Vec<WorkoutItem>, id: &str, direction: MoveDirection) -> Result<bool> {
    let (siblings, pos) =
        siblings_of(items, id).ok_or_else(|| Error::NotFound(format!("item {}", id)))?;

    let target = match direction {
        MoveDirection::Up if pos > 0 => pos - 1,
        MoveDirection::Down if pos + 1 < siblings.len() => pos + 1,
        _ => return Ok(false),
    };
    siblings.swap(pos, target);
    Ok(true)
}

/// Move an item to the end of another set, or to the top level
pub fn relocate_item(
    items: &mut Vec<WorkoutItem>,
    id: &str,
    parent_id: Option<&str>,
) -> Result<()> {
    let moving = find_item(items, id).ok_or_else(|| Error::NotFound(format!("item {}", id)))?;

    if let Some(parent_id) = parent_id {
        if find_item(std::slice::from_ref(moving), parent_id).is_some() {
            return Err(Error::Validation(format!(
                "cannot move {} into its own subtree",
                id
            )));
        }
        match find_item(items, parent_id) {
            Some(WorkoutItem::Set(_)) => {}
            Some(_) => {
                return Err(Error::Validation(format!(
                    "item {} is not a set",
                    parent_id
                )))
            }
            None => return Err(Error::NotFound(format!("item {}", parent_id))),
        }
    }

    let item = remove_item(items, id).ok_or_else(|| Error::NotFound(format!("item {}", id)))?;
    add_item(items, parent_id, item)
}

/// Replace the item `id` with a whole new value carrying the same id
pub fn update_item(items: &mut [WorkoutItem], id: &str, replacement: WorkoutItem) -> Result<()> {
    if replacement.id() != id {
        return Err(Error::Validation(format!(
            "replacement id {} does not match {}",
            replacement.id(),
            id
        )));
    }
    let slot = find_item_mut(items, id).ok_or_else(|| Error::NotFound(format!("item {}", id)))?;
    *slot = replacement;
    Ok(())
}

impl WorkoutPlan {
    pub fn find_item(&self, id: &str) -> Option<&WorkoutItem> {
        find_item(&self.items, id)
    }

    pub fn add_item(&mut self, parent_id: Option<&str>, item: WorkoutItem) -> Result<()> {
        add_item(&mut self.items, parent_id, item)?;
        self.touch();
        Ok(())
    }

    pub fn remove_item(&mut self, id: &str) -> Option<WorkoutItem> {
        let removed = remove_item(&mut self.items, id)?;
        self.touch();
        Some(removed)
    }

    pub fn move_item(&mut self, id: &str, direction: MoveDirection) -> Result<bool> {
        let moved = move_item(&mut self.items, id, direction)?;
        if moved {
            self.touch();
        }
        Ok(moved)
    }

    pub fn relocate_item(&mut self, id: &str, parent_id: Option<&str>) -> Result<()> {
        relocate_item(&mut self.items, id, parent_id)?;
        self.touch();
        Ok(())
    }

    pub fn update_item(&mut self, id: &str, replacement: WorkoutItem) -> Result<()> {
        update_item(&mut self.items, id, replacement)?;
        self.touch();
        Ok(())
    }

    pub fn rename(&mut self, name: impl Into<String>) {
        self.name = name.into();
        self.touch();
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
        self.touch();
    }

    pub fn set_warmup_time(&mut self, seconds: u32) {
        self.warmup_time = seconds;
        self.touch();
    }

    pub fn set_cooldown_time(&mut self, seconds: u32) {
        self.cooldown_time = seconds;
        self.touch();
    }
}
