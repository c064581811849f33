//! Route parsing, mount prefix handling and the history-driven router core.
//!
//! The router only decides. It validates the target against the registry,
//! records the history entry and hands back a [`Dispatch`] describing what the
//! view layer has to do. Each dispatch carries a [`NavTicket`]; a view update
//! that finishes after a newer navigation started must be dropped, which
//! [`Router::is_current`] answers.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::WORK_SEGMENT;
use crate::error::{Error, Result};
use crate::gallery::project_route;
use crate::registry::ProjectRegistry;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Route {
    Home,
    Project(String),
}

impl Route {
    /// Parse a path that already had the mount prefix removed.
    pub fn parse(path: &str) -> Option<Route> {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let trimmed = path.trim_matches('/');
        if trimmed.is_empty() || trimmed == "index.html" {
            return Some(Route::Home);
        }

        let mut segments = trimmed.split('/');
        match (segments.next(), segments.next(), segments.next(), segments.next()) {
            (Some(WORK_SEGMENT), Some(slug), None, None) if !slug.is_empty() => {
                Some(Route::Project(slug.to_string()))
            }
            (Some(WORK_SEGMENT), Some(slug), Some("index.html"), None) if !slug.is_empty() => {
                Some(Route::Project(slug.to_string()))
            }
            _ => None,
        }
    }

    /// Canonical path without mount prefix.
    pub fn path(&self) -> String {
        match self {
            Route::Home => "/".to_string(),
            Route::Project(slug) => project_route(slug),
        }
    }

    pub fn slug(&self) -> Option<&str> {
        match self {
            Route::Home => None,
            Route::Project(slug) => Some(slug),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Route::Home => f.write_str("home"),
            Route::Project(slug) => write!(f, "project:{slug}"),
        }
    }
}

/// Optional mount point the site is served under, e.g. `/portfolio`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BasePath {
    prefix: String,
}

impl BasePath {
    pub fn new(raw: &str) -> Self {
        let trimmed = raw.trim().trim_end_matches('/');
        let prefix = if trimmed.is_empty() || trimmed.starts_with('/') {
            trimmed.to_string()
        } else {
            format!("/{trimmed}")
        };
        Self { prefix }
    }

    pub fn as_str(&self) -> &str {
        &self.prefix
    }

    /// Remove the prefix from a location path. Paths outside the mount point
    /// are returned unchanged.
    pub fn strip(&self, full: &str) -> String {
        if self.prefix.is_empty() {
            return full.to_string();
        }
        match full.strip_prefix(self.prefix.as_str()) {
            Some("") => "/".to_string(),
            Some(rest) if rest.starts_with('/') => rest.to_string(),
            _ => full.to_string(),
        }
    }

    /// Prepend the prefix to a route path.
    pub fn join(&self, route_path: &str) -> String {
        if route_path.starts_with('/') {
            format!("{}{route_path}", self.prefix)
        } else {
            format!("{}/{route_path}", self.prefix)
        }
    }
}

/// State payload stored with every history entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryState {
    pub route: String,
}

pub trait History {
    fn push(&mut self, state: &HistoryState, url: &str) -> Result<()>;
}

/// History kept in memory, for hosts without a browser history.
#[derive(Clone, Debug, Default)]
pub struct MemoryHistory {
    entries: Vec<String>,
    cursor: usize,
    pushes: usize,
}

impl MemoryHistory {
    pub fn new(initial_url: &str) -> Self {
        Self {
            entries: vec![initial_url.to_string()],
            cursor: 0,
            pushes: 0,
        }
    }

    pub fn location(&self) -> &str {
        &self.entries[self.cursor]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of entries pushed since construction.
    pub fn pushes(&self) -> usize {
        self.pushes
    }

    /// Step back; returns the new location, like a `popstate`.
    pub fn back(&mut self) -> Option<String> {
        self.cursor = self.cursor.checked_sub(1)?;
        Some(self.location().to_string())
    }

    pub fn forward(&mut self) -> Option<String> {
        if self.cursor + 1 >= self.entries.len() {
            return None;
        }
        self.cursor += 1;
        Some(self.location().to_string())
    }
}

impl History for MemoryHistory {
    fn push(&mut self, _state: &HistoryState, url: &str) -> Result<()> {
        self.entries.truncate(self.cursor + 1);
        self.entries.push(url.to_string());
        self.cursor = self.entries.len() - 1;
        self.pushes += 1;
        Ok(())
    }
}

/// Sequence number of a dispatched navigation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct NavTicket(u64);

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Dispatch {
    Home {
        ticket: NavTicket,
    },
    Project {
        slug: String,
        fetch_url: String,
        ticket: NavTicket,
    },
}

impl Dispatch {
    pub fn ticket(&self) -> NavTicket {
        match self {
            Dispatch::Home { ticket } | Dispatch::Project { ticket, .. } => *ticket,
        }
    }
}

#[derive(Debug)]
pub struct Router<H> {
    base: BasePath,
    history: H,
    current: Route,
    seq: u64,
}

impl<H: History> Router<H> {
    /// `location` is the full path the page was loaded at.
    pub fn new(base: BasePath, history: H, location: &str) -> Self {
        let current = Route::parse(&base.strip(location)).unwrap_or(Route::Home);
        Self {
            base,
            history,
            current,
            seq: 0,
        }
    }

    pub fn current(&self) -> &Route {
        &self.current
    }

    pub fn base(&self) -> &BasePath {
        &self.base
    }

    pub fn history(&self) -> &H {
        &self.history
    }

    pub fn history_mut(&mut self) -> &mut H {
        &mut self.history
    }

    /// User-initiated navigation. Records a history entry.
    pub fn navigate(&mut self, path: &str, registry: &ProjectRegistry) -> Result<Dispatch> {
        self.dispatch(path, registry, true)
    }

    /// Back/forward. Never records a history entry.
    pub fn pop(&mut self, location: &str, registry: &ProjectRegistry) -> Result<Dispatch> {
        self.dispatch(location, registry, false)
    }

    pub fn is_current(&self, ticket: NavTicket) -> bool {
        ticket.0 == self.seq
    }

    /// Full URL for a route, mount prefix included.
    pub fn href(&self, route: &Route) -> String {
        self.base.join(&route.path())
    }

    fn dispatch(&mut self, path: &str, registry: &ProjectRegistry, push: bool) -> Result<Dispatch> {
        let route_path = self.base.strip(path);
        let route = Route::parse(&route_path).ok_or_else(|| Error::UnknownRoute(path.to_string()))?;

        if let Route::Project(slug) = &route {
            if !registry.contains(slug) {
                return Err(Error::ProjectNotFound(slug.clone()));
            }
        }

        if push {
            let state = HistoryState {
                route: route.path(),
            };
            self.history.push(&state, &self.href(&route))?;
        }

        self.seq += 1;
        let ticket = NavTicket(self.seq);
        self.current = route.clone();

        Ok(match route {
            Route::Home => Dispatch::Home { ticket },
            Route::Project(slug) => Dispatch::Project {
                fetch_url: self.base.join(&project_route(&slug)),
                slug,
                ticket,
            },
        })
    }
}
