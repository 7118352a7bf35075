use serde::{Deserialize, Serialize};

use crate::session::SessionKind;

/// Screens a session hands control to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "route", rename_all = "snake_case")]
pub enum Route {
    /// The session screen itself.
    Session { kind: SessionKind },
    Home,
    /// Workout list.
    Training,
}

impl Route {
    /// Where a finished or abandoned session of `kind` returns to.
    pub fn after(kind: SessionKind) -> Self {
        match kind {
            SessionKind::Workout => Route::Training,
            SessionKind::Evaluation => Route::Home,
        }
    }
}

/// Navigation collaborator. Invoked only at session start, completion and
/// explicit exit, never mid-phase.
pub trait Navigator {
    fn navigate(&mut self, route: Route);
}

impl<N: Navigator + ?Sized> Navigator for &mut N {
    fn navigate(&mut self, route: Route) {
        (**self).navigate(route);
    }
}

/// Navigator that remembers where it was sent.
#[derive(Debug, Default, Clone)]
pub struct RouteLog {
    pub routes: Vec<Route>,
}

impl Navigator for RouteLog {
    fn navigate(&mut self, route: Route) {
        self.routes.push(route);
    }
}
