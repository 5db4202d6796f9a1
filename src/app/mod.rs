//! Top-level screen selection: a four-view router gated on session presence.

use std::sync::Arc;

use crate::session::{AuthState, SessionManager};

/// The four navigable views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewName {
    #[default]
    Main,
    Portfolio,
    Finance,
    Trading,
}

impl ViewName {
    pub fn as_str(&self) -> &'static str {
        match self {
            ViewName::Main => "main",
            ViewName::Portfolio => "portfolio",
            ViewName::Finance => "finance",
            ViewName::Trading => "trading",
        }
    }
}

impl std::str::FromStr for ViewName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "main" => Ok(ViewName::Main),
            "portfolio" => Ok(ViewName::Portfolio),
            "finance" => Ok(ViewName::Finance),
            "trading" => Ok(ViewName::Trading),
            other => Err(format!("unknown view: {}", other)),
        }
    }
}

/// Holds the active view. No history stack and no guard conditions here;
/// identity gating happens in `screen_for`, not in the router.
#[derive(Debug, Default)]
pub struct ViewRouter {
    active: ViewName,
}

impl ViewRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> ViewName {
        self.active
    }

    pub fn navigate(&mut self, view: ViewName) {
        self.active = view;
    }

    /// Unconditionally return to the main view.
    pub fn back(&mut self) {
        self.active = ViewName::Main;
    }
}

/// What is actually rendered, after gating on auth state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Loading,
    Login,
    Main,
    Portfolio,
    Finance,
    Trading,
}

/// Select the screen for the current auth state and router position.
/// With no session the answer is the login surface, whatever the router says.
pub fn screen_for(state: &AuthState, router: &ViewRouter) -> Screen {
    match state {
        AuthState::Loading => Screen::Loading,
        AuthState::Unauthenticated => Screen::Login,
        AuthState::Authenticated { .. } => match router.active() {
            ViewName::Main => Screen::Main,
            ViewName::Portfolio => Screen::Portfolio,
            ViewName::Finance => Screen::Finance,
            ViewName::Trading => Screen::Trading,
        },
    }
}

/// The running application: one session manager, one router.
pub struct App {
    pub sessions: Arc<SessionManager>,
    pub router: ViewRouter,
}

impl App {
    pub fn new(sessions: Arc<SessionManager>) -> Self {
        Self {
            sessions,
            router: ViewRouter::new(),
        }
    }

    pub fn navigate(&mut self, view: ViewName) {
        self.router.navigate(view);
    }

    pub fn back(&mut self) {
        self.router.back();
    }

    pub fn active_screen(&self) -> Screen {
        screen_for(&self.sessions.current(), &self.router)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{Role, Session};
    use uuid::Uuid;

    fn authenticated() -> AuthState {
        AuthState::Authenticated {
            session: Session {
                user_id: Uuid::nil(),
                email: "user@example.com".into(),
            },
            role: Some(Role::Ic),
        }
    }

    #[test]
    fn without_a_session_every_view_renders_login() {
        let mut router = ViewRouter::new();
        for view in [
            ViewName::Main,
            ViewName::Portfolio,
            ViewName::Finance,
            ViewName::Trading,
        ] {
            router.navigate(view);
            assert_eq!(screen_for(&AuthState::Unauthenticated, &router), Screen::Login);
        }
    }

    #[test]
    fn with_a_session_the_router_selects_the_screen() {
        let mut router = ViewRouter::new();
        let state = authenticated();

        assert_eq!(screen_for(&state, &router), Screen::Main);

        router.navigate(ViewName::Trading);
        assert_eq!(screen_for(&state, &router), Screen::Trading);

        router.navigate(ViewName::Finance);
        assert_eq!(screen_for(&state, &router), Screen::Finance);
    }

    #[test]
    fn back_always_returns_to_main() {
        let mut router = ViewRouter::new();
        router.navigate(ViewName::Portfolio);
        router.back();
        assert_eq!(router.active(), ViewName::Main);

        // back from main stays on main
        router.back();
        assert_eq!(router.active(), ViewName::Main);
    }

    #[test]
    fn loading_state_renders_the_loading_surface() {
        let router = ViewRouter::new();
        assert_eq!(screen_for(&AuthState::Loading, &router), Screen::Loading);
    }

    #[test]
    fn view_names_round_trip() {
        for view in [
            ViewName::Main,
            ViewName::Portfolio,
            ViewName::Finance,
            ViewName::Trading,
        ] {
            assert_eq!(view.as_str().parse::<ViewName>().unwrap(), view);
        }
        assert!("settings".parse::<ViewName>().is_err());
    }
}
