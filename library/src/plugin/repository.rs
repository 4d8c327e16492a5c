//! Toolbox storage.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::plugin::descriptor::CallableDescriptor;

/// One element of a toolbox listing.
#[derive(Debug, Clone)]
pub enum ToolboxEntry {
    Callable(Arc<CallableDescriptor>),
    /// Grouping separator; carries no callable.
    Divider,
}

impl ToolboxEntry {
    pub fn callable(descriptor: CallableDescriptor) -> Self {
        ToolboxEntry::Callable(Arc::new(descriptor))
    }

    pub fn descriptor(&self) -> Option<&Arc<CallableDescriptor>> {
        match self {
            ToolboxEntry::Callable(descriptor) => Some(descriptor),
            ToolboxEntry::Divider => None,
        }
    }

    pub fn is_divider(&self) -> bool {
        matches!(self, ToolboxEntry::Divider)
    }
}

/// Toolbox name to ordered entries. Names are unique.
#[derive(Debug, Default)]
pub struct ToolboxRepository {
    toolboxes: BTreeMap<String, Vec<ToolboxEntry>>,
}

impl ToolboxRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs a toolbox listing, replacing any previous one.
    pub fn insert(&mut self, name: &str, entries: Vec<ToolboxEntry>) {
        let entries = entries.into_iter().map(|e| claim(name, e)).collect();
        self.toolboxes.insert(name.to_string(), entries);
    }

    /// Appends entries; a divider separates them from existing ones.
    pub fn append(&mut self, name: &str, entries: Vec<ToolboxEntry>) {
        let list = self.toolboxes.entry(name.to_string()).or_default();
        if !list.is_empty() {
            list.push(ToolboxEntry::Divider);
        }
        list.extend(entries.into_iter().map(|e| claim(name, e)));
    }

    pub fn get(&self, name: &str) -> Option<&[ToolboxEntry]> {
        self.toolboxes.get(name).map(Vec::as_slice)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.toolboxes.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.toolboxes.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[ToolboxEntry])> {
        self.toolboxes
            .iter()
            .map(|(name, entries)| (name.as_str(), entries.as_slice()))
    }

    /// Every descriptor across all toolboxes, in toolbox order.
    pub fn descriptors(&self) -> impl Iterator<Item = &Arc<CallableDescriptor>> {
        self.toolboxes
            .values()
            .flat_map(|entries| entries.iter().filter_map(ToolboxEntry::descriptor))
    }

    pub fn len(&self) -> usize {
        self.toolboxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.toolboxes.is_empty()
    }
}

/// Stamps the owning toolbox name on a descriptor.
fn claim(name: &str, entry: ToolboxEntry) -> ToolboxEntry {
    match entry {
        ToolboxEntry::Callable(mut descriptor) => {
            if descriptor.toolbox != name {
                Arc::make_mut(&mut descriptor).toolbox = name.to_string();
            }
            ToolboxEntry::Callable(descriptor)
        }
        ToolboxEntry::Divider => ToolboxEntry::Divider,
    }
}
