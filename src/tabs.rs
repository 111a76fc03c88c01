// src/tabs.rs

use crate::constants::TAB_NAME_PREFIX;
use crate::conversation::{Conversation, ConversationId};
use log::debug;

/// A named conversation shown as a tab.
#[derive(Debug)]
pub struct Tab {
    pub name: String,
    pub conversation: Conversation,
}

impl Tab {
    fn new(name: String) -> Self {
        Tab {
            name,
            conversation: Conversation::new(),
        }
    }
}

/// Ordered list of conversations with one active entry. Never empty.
#[derive(Debug)]
pub struct TabRegistry {
    tabs: Vec<Tab>,
    active: usize,
}

impl Default for TabRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TabRegistry {
    pub fn new() -> Self {
        TabRegistry {
            tabs: vec![Tab::new(format!("{} 1", TAB_NAME_PREFIX))],
            active: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.tabs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tabs.is_empty()
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn names(&self) -> Vec<&str> {
        self.tabs.iter().map(|t| t.name.as_str()).collect()
    }

    pub fn tabs(&self) -> &[Tab] {
        &self.tabs
    }

    pub fn active(&self) -> &Tab {
        &self.tabs[self.active]
    }

    pub fn active_mut(&mut self) -> &mut Tab {
        &mut self.tabs[self.active]
    }

    pub fn get(&self, id: ConversationId) -> Option<&Conversation> {
        self.tabs
            .iter()
            .map(|t| &t.conversation)
            .find(|c| c.id() == id)
    }

    pub fn get_mut(&mut self, id: ConversationId) -> Option<&mut Conversation> {
        self.tabs
            .iter_mut()
            .map(|t| &mut t.conversation)
            .find(|c| c.id() == id)
    }

    /// Appends a new empty conversation named `Chat N` and makes it active.
    /// Returns the new tab's index.
    pub fn add_tab(&mut self) -> usize {
        let mut n = self.tabs.len() + 1;
        let name = loop {
            let candidate = format!("{} {}", TAB_NAME_PREFIX, n);
            if !self.tabs.iter().any(|t| t.name == candidate) {
                break candidate;
            }
            n += 1;
        };
        debug!("Adding tab {}", name);
        self.tabs.push(Tab::new(name));
        self.active = self.tabs.len() - 1;
        self.active
    }

    /// Removes the tab at `index`. The last remaining tab cannot be removed.
    pub fn delete_tab(&mut self, index: usize) -> bool {
        if self.tabs.len() <= 1 || index >= self.tabs.len() {
            return false;
        }
        let removed = self.tabs.remove(index);
        if removed.conversation.is_streaming() {
            debug!(
                "Deleted tab {} while streaming; its reply will be discarded",
                removed.name
            );
        }
        if index == self.active {
            self.active = 0;
        } else if index < self.active {
            self.active -= 1;
        }
        true
    }

    pub fn select_tab(&mut self, index: usize) -> bool {
        if index >= self.tabs.len() {
            return false;
        }
        self.active = index;
        true
    }

    pub fn next_tab(&mut self) {
        self.active = (self.active + 1) % self.tabs.len();
    }

    pub fn previous_tab(&mut self) {
        self.active = (self.active + self.tabs.len() - 1) % self.tabs.len();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry_with(count: usize) -> TabRegistry {
        let mut registry = TabRegistry::new();
        for _ in 1..count {
            registry.add_tab();
        }
        registry
    }

    #[test]
    fn test_starts_with_one_tab() {
        let registry = TabRegistry::new();
        assert_eq!(registry.names(), vec!["Chat 1"]);
        assert_eq!(registry.active_index(), 0);
    }

    #[test]
    fn test_add_tab_activates_new_tab() {
        let mut registry = TabRegistry::new();
        assert_eq!(registry.add_tab(), 1);
        assert_eq!(registry.names(), vec!["Chat 1", "Chat 2"]);
        assert_eq!(registry.active_index(), 1);
        assert!(registry.active().conversation.messages().is_empty());
    }

    #[test]
    fn test_add_tab_skips_taken_names() {
        let mut registry = registry_with(3);
        registry.delete_tab(0);
        // ["Chat 2", "Chat 3"]: "Chat 3" is taken, so the next free number is used.
        registry.add_tab();
        assert_eq!(registry.names(), vec!["Chat 2", "Chat 3", "Chat 4"]);
    }

    #[test]
    fn test_delete_last_tab_rejected() {
        let mut registry = TabRegistry::new();
        assert!(!registry.delete_tab(0));
        assert_eq!(registry.names(), vec!["Chat 1"]);
    }

    #[test]
    fn test_delete_out_of_range_rejected() {
        let mut registry = registry_with(2);
        assert!(!registry.delete_tab(5));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_delete_active_selects_first() {
        let mut registry = registry_with(3);
        registry.select_tab(2);
        assert!(registry.delete_tab(2));
        assert_eq!(registry.names(), vec!["Chat 1", "Chat 2"]);
        assert_eq!(registry.active_index(), 0);
    }

    #[test]
    fn test_delete_before_active_keeps_same_conversation() {
        let mut registry = registry_with(3);
        registry.select_tab(2);
        let active_id = registry.active().conversation.id();

        assert!(registry.delete_tab(0));
        assert_eq!(registry.active_index(), 1);
        assert_eq!(registry.active().conversation.id(), active_id);
    }

    #[test]
    fn test_delete_after_active_keeps_index() {
        let mut registry = registry_with(3);
        registry.select_tab(0);
        assert!(registry.delete_tab(2));
        assert_eq!(registry.active_index(), 0);
    }

    #[test]
    fn test_select_and_cycle() {
        let mut registry = registry_with(3);
        assert!(!registry.select_tab(3));
        assert!(registry.select_tab(0));
        registry.previous_tab();
        assert_eq!(registry.active_index(), 2);
        registry.next_tab();
        assert_eq!(registry.active_index(), 0);
    }

    #[test]
    fn test_lookup_by_id() {
        let mut registry = registry_with(2);
        let id = registry.tabs()[0].conversation.id();
        assert!(registry.get(id).is_some());
        registry.delete_tab(0);
        assert!(registry.get_mut(id).is_none());
    }
}
