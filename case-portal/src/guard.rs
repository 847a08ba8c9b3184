use tokio::sync::watch;

use crate::config::PortalConfig;
use crate::session::SessionState;

/// Views of the office application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Login,
    Root,
    Dashboard,
    ClientDashboard { client_id: String },
    NewClient,
    Processes,
    Monitoring,
}

impl Route {
    /// Match a path (query string and trailing slash ignored).
    pub fn parse(path: &str) -> Option<Route> {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        match segments.as_slice() {
            [] => Some(Route::Root),
            ["login"] => Some(Route::Login),
            ["dashboard"] => Some(Route::Dashboard),
            ["dashboard", "client", id] => Some(Route::ClientDashboard {
                client_id: id.to_string(),
            }),
            ["clients", "new"] => Some(Route::NewClient),
            ["processes"] => Some(Route::Processes),
            ["monitoring"] => Some(Route::Monitoring),
            _ => None,
        }
    }

    pub fn is_protected(&self) -> bool {
        !matches!(self, Route::Login)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    Render(Route),
    /// Session still being established; show a loading indicator.
    Loading,
    Redirect(String),
    NotFound,
}

/// Decides what a path shows for the current session state. Makes no network
/// calls; it only reads the state published by the session manager.
pub struct RouteGuard {
    state: watch::Receiver<SessionState>,
    login_path: String,
    home_path: String,
}

impl RouteGuard {
    pub fn new(state: watch::Receiver<SessionState>, config: &PortalConfig) -> Self {
        Self {
            state,
            login_path: config.login_path.clone(),
            home_path: config.home_path.clone(),
        }
    }

    pub fn with_paths(
        state: watch::Receiver<SessionState>,
        login_path: impl Into<String>,
        home_path: impl Into<String>,
    ) -> Self {
        Self {
            state,
            login_path: login_path.into(),
            home_path: home_path.into(),
        }
    }

    /// Decision for `path` under the state as of now.
    pub fn decide(&self, path: &str) -> Navigation {
        let state = self.state.borrow();
        match Route::parse(path) {
            Some(route) => self.decide_route(&state, route),
            None => Navigation::NotFound,
        }
    }

    /// Wait until the session has settled, then decide.
    pub async fn resolve(&mut self, path: &str) -> Navigation {
        if self.state.wait_for(|s| !s.is_pending()).await.is_err() {
            tracing::debug!("Session manager dropped while resolving route");
        }
        self.decide(path)
    }

    fn decide_route(&self, state: &SessionState, route: Route) -> Navigation {
        if state.is_pending() {
            return Navigation::Loading;
        }

        let authenticated = state.is_authenticated();
        match route {
            Route::Login if authenticated => Navigation::Redirect(self.home_path.clone()),
            route if route.is_protected() && !authenticated => {
                Navigation::Redirect(self.login_path.clone())
            }
            Route::Root => Navigation::Redirect(self.home_path.clone()),
            route => Navigation::Render(route),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::UserProfile;
    use crate::session::Session;

    fn authenticated() -> SessionState {
        SessionState::Authenticated(Session {
            token: "tok".to_string(),
            user: UserProfile {
                id: "1".to_string(),
                email: "admin@lbm.com.br".to_string(),
                name: "Dr. Carlos Silva".to_string(),
                role: "ADMIN".to_string(),
                avatar_url: None,
            },
            verified: true,
        })
    }

    fn guard_for(state: SessionState) -> (watch::Sender<SessionState>, RouteGuard) {
        let (tx, rx) = watch::channel(state);
        (tx, RouteGuard::with_paths(rx, "/login", "/dashboard"))
    }

    #[test]
    fn parses_route_table() {
        assert_eq!(Route::parse("/"), Some(Route::Root));
        assert_eq!(Route::parse(""), Some(Route::Root));
        assert_eq!(Route::parse("/login"), Some(Route::Login));
        assert_eq!(Route::parse("/dashboard/"), Some(Route::Dashboard));
        assert_eq!(
            Route::parse("/dashboard/client/42?tab=processos"),
            Some(Route::ClientDashboard {
                client_id: "42".to_string()
            })
        );
        assert_eq!(Route::parse("/clients/new"), Some(Route::NewClient));
        assert_eq!(Route::parse("/processes"), Some(Route::Processes));
        assert_eq!(Route::parse("/monitoring"), Some(Route::Monitoring));
        assert_eq!(Route::parse("/dashboard/client"), None);
        assert_eq!(Route::parse("/admin"), None);
    }

    #[test]
    fn protected_views_follow_session_state() {
        let (tx, guard) = guard_for(SessionState::Uninitialized);
        assert_eq!(guard.decide("/processes"), Navigation::Loading);

        tx.send_replace(SessionState::Validating);
        assert_eq!(guard.decide("/processes"), Navigation::Loading);

        tx.send_replace(SessionState::Unauthenticated);
        assert_eq!(
            guard.decide("/processes"),
            Navigation::Redirect("/login".to_string())
        );

        tx.send_replace(authenticated());
        assert_eq!(
            guard.decide("/processes"),
            Navigation::Render(Route::Processes)
        );
    }

    #[test]
    fn root_goes_to_dashboard_once_authenticated() {
        let (_tx, guard) = guard_for(authenticated());
        assert_eq!(guard.decide("/"), Navigation::Redirect("/dashboard".to_string()));

        let (_tx, guard) = guard_for(SessionState::Unauthenticated);
        assert_eq!(guard.decide("/"), Navigation::Redirect("/login".to_string()));
    }

    #[test]
    fn login_page_depends_on_state() {
        let (tx, guard) = guard_for(SessionState::Validating);
        assert_eq!(guard.decide("/login"), Navigation::Loading);

        tx.send_replace(SessionState::Unauthenticated);
        assert_eq!(guard.decide("/login"), Navigation::Render(Route::Login));

        tx.send_replace(authenticated());
        assert_eq!(
            guard.decide("/login"),
            Navigation::Redirect("/dashboard".to_string())
        );
    }

    #[test]
    fn unknown_paths_are_not_found() {
        let (_tx, guard) = guard_for(authenticated());
        assert_eq!(guard.decide("/nowhere"), Navigation::NotFound);
    }

    #[tokio::test]
    async fn resolve_waits_for_validation_to_finish() {
        let (tx, mut guard) = guard_for(SessionState::Validating);

        let publisher = tokio::spawn(async move {
            tokio::task::yield_now().await;
            tx.send_replace(authenticated());
            tx
        });

        assert_eq!(
            guard.resolve("/dashboard").await,
            Navigation::Render(Route::Dashboard)
        );
        publisher.await.unwrap();
    }
}
