//! Route table and navigator
//!
//! Two screens exist: `/login` and `/pacientes`. The root path redirects to
//! `/login`; any other path is an error.

use crate::domain::{RegistryError, Result};
use std::fmt;
use std::str::FromStr;
use tokio::sync::watch;

/// Path of the login screen
pub const LOGIN_PATH: &str = "/login";

/// Path of the patient list and form
pub const PACIENTES_PATH: &str = "/pacientes";

/// A screen reachable through the shell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Login,
    Pacientes,
}

impl Route {
    /// Canonical path
    pub fn path(&self) -> &'static str {
        match self {
            Route::Login => LOGIN_PATH,
            Route::Pacientes => PACIENTES_PATH,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

impl FromStr for Route {
    type Err = RegistryError;

    fn from_str(path: &str) -> Result<Self> {
        RouteTable::default().resolve(path)
    }
}

/// Path to route mapping with redirects
#[derive(Debug, Clone)]
pub struct RouteTable {
    routes: Vec<(&'static str, Route)>,
    redirects: Vec<(&'static str, Route)>,
}

impl Default for RouteTable {
    fn default() -> Self {
        Self {
            routes: vec![(LOGIN_PATH, Route::Login), (PACIENTES_PATH, Route::Pacientes)],
            redirects: vec![("/", Route::Login), ("", Route::Login)],
        }
    }
}

impl RouteTable {
    /// Resolves `path` to a route, following redirects
    ///
    /// Surrounding whitespace and trailing slashes are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Navigation`] for an unknown path.
    pub fn resolve(&self, path: &str) -> Result<Route> {
        let trimmed = path.trim();
        let normalized = match trimmed.trim_end_matches('/') {
            "" if trimmed.is_empty() => "",
            "" => "/",
            other => other,
        };

        if let Some((_, route)) = self.redirects.iter().find(|(from, _)| *from == normalized) {
            tracing::debug!(from = normalized, to = %route, "Redirecting");
            return Ok(*route);
        }

        self.routes
            .iter()
            .find(|(p, _)| *p == normalized)
            .map(|(_, route)| *route)
            .ok_or_else(|| RegistryError::Navigation(format!("route not found: {path}")))
    }
}

/// Navigation port used by screens
pub trait Navigator: Send + Sync {
    /// Switches the active screen
    fn navigate(&self, route: Route);
}

/// Navigator holding the active route in a `watch` channel
pub struct ShellNavigator {
    table: RouteTable,
    current: watch::Sender<Route>,
}

impl Default for ShellNavigator {
    fn default() -> Self {
        Self::new(Route::Login)
    }
}

impl ShellNavigator {
    /// Navigator starting at `initial`
    pub fn new(initial: Route) -> Self {
        let (current, _) = watch::channel(initial);
        Self {
            table: RouteTable::default(),
            current,
        }
    }

    /// Active route
    pub fn current(&self) -> Route {
        *self.current.borrow()
    }

    /// Live view of the active route
    pub fn subscribe(&self) -> watch::Receiver<Route> {
        self.current.subscribe()
    }

    /// Resolves `path` and navigates there
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Navigation`] for an unknown path; the active
    /// route is left unchanged.
    pub fn navigate_path(&self, path: &str) -> Result<Route> {
        let route = self.table.resolve(path)?;
        self.navigate(route);
        Ok(route)
    }
}

impl Navigator for ShellNavigator {
    fn navigate(&self, route: Route) {
        let previous = self.current.send_replace(route);
        if previous != route {
            tracing::info!(from = %previous, to = %route, "Navigated");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("/login", Route::Login ; "login")]
    #[test_case("/pacientes", Route::Pacientes ; "pacientes")]
    #[test_case("/pacientes/", Route::Pacientes ; "trailing slash")]
    #[test_case("/", Route::Login ; "root redirect")]
    #[test_case("", Route::Login ; "empty redirect")]
    #[test_case("  /login ", Route::Login ; "surrounding whitespace")]
    fn test_resolve(path: &str, expected: Route) {
        assert_eq!(RouteTable::default().resolve(path).unwrap(), expected);
    }

    #[test_case("/admin" ; "unknown")]
    #[test_case("login" ; "relative")]
    #[test_case("/pacientes/123" ; "nested")]
    fn test_resolve_unknown(path: &str) {
        assert!(matches!(
            RouteTable::default().resolve(path),
            Err(RegistryError::Navigation(_))
        ));
    }

    #[test]
    fn test_navigator_tracks_current_route() {
        let navigator = ShellNavigator::default();
        let mut watcher = navigator.subscribe();
        assert_eq!(navigator.current(), Route::Login);

        navigator.navigate(Route::Pacientes);
        assert!(watcher.has_changed().unwrap());
        assert_eq!(*watcher.borrow_and_update(), Route::Pacientes);

        assert!(navigator.navigate_path("/nowhere").is_err());
        assert_eq!(navigator.current(), Route::Pacientes);

        assert_eq!(navigator.navigate_path("/").unwrap(), Route::Login);
        assert_eq!("/pacientes".parse::<Route>().unwrap(), Route::Pacientes);
    }
}
