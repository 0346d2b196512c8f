use std::{collections::HashSet, path::Path, sync::Arc};

use crate::{error::NavigationError, models::NavigationEntry};

/// NavigationRegistry
///
/// The dashboard's side menu: an ordered, immutable list of entries loaded once at
/// startup. Cloning shares the underlying list.
///
/// Entries carry no access metadata. Which role may open which entry is decided
/// entirely by the `AccessGuard`.
#[derive(Debug, Clone)]
pub struct NavigationRegistry {
    entries: Arc<[NavigationEntry]>,
}

impl Default for NavigationRegistry {
    /// The built-in dashboard menu.
    fn default() -> Self {
        let entries = vec![
            NavigationEntry::new("Dashboard", "/dashboard", "dashboard"),
            NavigationEntry::new("Students", "/students", "users"),
            NavigationEntry::new("Attendance", "/attendance", "calendar-check"),
            NavigationEntry::new("Admins", "/admins", "shield"),
            NavigationEntry::new("PTE", "/pte", "book-open"),
            NavigationEntry::new("IELTS", "/ielts", "book"),
            NavigationEntry::new("Duolingo", "/duolingo", "message-circle"),
            NavigationEntry::new("SAT", "/sat", "pen-tool"),
            NavigationEntry::new("Payments", "/payments", "credit-card"),
            NavigationEntry::new("Remarks", "/remarks", "message-square"),
            NavigationEntry::new("Mock Tests", "/mock-tests", "clipboard"),
            NavigationEntry::new("Email", "/email", "mail"),
        ];
        Self {
            entries: entries.into(),
        }
    }
}

impl NavigationRegistry {
    /// new
    ///
    /// Builds a registry from `entries`, keeping their order.
    ///
    /// # Errors
    /// Rejects entries with an empty title, routes that do not start with `/`, and
    /// routes registered more than once (after trailing-slash normalization).
    pub fn new(entries: Vec<NavigationEntry>) -> Result<Self, NavigationError> {
        let mut seen = HashSet::new();
        let mut normalized = Vec::with_capacity(entries.len());

        for mut entry in entries {
            if !entry.route.starts_with('/') {
                return Err(NavigationError::InvalidRoute(entry.route));
            }
            if entry.title.trim().is_empty() {
                return Err(NavigationError::EmptyTitle(entry.route));
            }
            entry.route = normalize_route(&entry.route).to_string();
            if !seen.insert(entry.route.clone()) {
                return Err(NavigationError::DuplicateRoute(entry.route));
            }
            normalized.push(entry);
        }

        Ok(Self {
            entries: normalized.into(),
        })
    }

    /// Parses a JSON array of `{title, route, icon}` objects.
    pub fn from_json(json: &str) -> Result<Self, NavigationError> {
        let entries: Vec<NavigationEntry> = serde_json::from_str(json)?;
        Self::new(entries)
    }

    /// Reads and parses a navigation file (see `from_json`).
    pub fn load(path: impl AsRef<Path>) -> Result<Self, NavigationError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    pub fn entries(&self) -> &[NavigationEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Looks up the entry for `route`. A single trailing `/` is ignored.
    pub fn find(&self, route: &str) -> Option<&NavigationEntry> {
        let route = normalize_route(route);
        self.entries.iter().find(|entry| entry.route == route)
    }

    pub fn contains(&self, route: &str) -> bool {
        self.find(route).is_some()
    }
}

/// Strips one trailing `/`, except from the root route itself.
pub(crate) fn normalize_route(route: &str) -> &str {
    match route.strip_suffix('/') {
        Some(stripped) if !stripped.is_empty() => stripped,
        _ => route,
    }
}
