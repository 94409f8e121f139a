#![forbid(unsafe_code)]

//! A scripted session: the glue an application shell would provide.
//!
//! The session attaches a window on start, forwards each command to the
//! router, and treats `back` at the root screen as finishing the session.

use tracing::{debug, info};
use waypoint_core::{ArgumentRouteStorage, Router, RouterConfig, RouterState};

use crate::error::DemoError;
use crate::script::Command;
use crate::surface::{CardFactory, ConsolePatcher, Screen};

/// What the caller should do after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    /// `back` was pressed on the root screen.
    Finished,
}

pub struct Session {
    router: Router<Screen, String, CardFactory, ConsolePatcher>,
    window: String,
    output: Vec<String>,
}

impl Session {
    /// A detached session that will attach to `window` on [`Session::start`].
    pub fn new(config: RouterConfig<Screen>, window: impl Into<String>) -> Self {
        let storage = ArgumentRouteStorage::new();
        let router = Router::new(
            config,
            CardFactory::new(storage.clone()),
            ConsolePatcher::new(storage),
        );
        Self {
            router,
            window: window.into(),
            output: Vec::new(),
        }
    }

    /// Attach the default window.
    pub fn start(&mut self) -> Result<(), DemoError> {
        info!(window = %self.window, "session started");
        self.router.attach(self.window.clone())?;
        self.collect_patches();
        Ok(())
    }

    /// Run one command.
    pub fn apply(&mut self, command: &Command) -> Result<Flow, DemoError> {
        debug!(?command, "applying command");
        match command {
            Command::Push(route) => self.router.execute(|s| s.push(route.clone()))?,
            Command::Pop => self.router.execute(|s| s.pop())?,
            Command::Back => {
                if self.router.stack()?.len() <= 1 {
                    info!("back pressed on root screen");
                    self.output.push("back on root screen: finishing".to_string());
                    return Ok(Flow::Finished);
                }
                self.router.execute(|s| s.pop())?;
            }
            Command::PopUntil(route) => self.router.execute(|s| s.pop_until_route(route))?,
            Command::Replace(route) => self.router.execute(|s| s.replace_top(route.clone()))?,
            Command::Clear => self.router.execute(|s| s.clear())?,
            Command::Attach(name) => {
                let window = name.clone().unwrap_or_else(|| self.window.clone());
                self.router.attach(window)?;
            }
            Command::Detach => match self.router.detach()? {
                Some(window) => self.output.push(format!("[{window}] detached")),
                None => self.output.push("already detached".to_string()),
            },
            Command::Show => {
                let line = self.describe()?;
                self.output.push(line);
            }
        }
        self.collect_patches();
        Ok(Flow::Continue)
    }

    /// Take the lines produced since the last call.
    pub fn take_output(&mut self) -> Vec<String> {
        std::mem::take(&mut self.output)
    }

    /// Cards built over the whole session.
    pub fn cards_built(&self) -> u64 {
        self.router.factory().built()
    }

    fn describe(&self) -> Result<String, DemoError> {
        let line = match self.router.state()? {
            RouterState::Attached { stack, container } => {
                format!("attached to {container}: {}", join(stack.routes()))
            }
            RouterState::Detached {
                stack,
                pending_stack,
            } => format!(
                "detached: committed {} pending {}",
                join(stack.routes()),
                join(pending_stack.routes())
            ),
        };
        Ok(line)
    }

    fn collect_patches(&mut self) {
        let lines = self.router.patcher_mut().drain();
        self.output.extend(lines);
    }
}

fn join<'a>(routes: impl Iterator<Item = &'a Screen>) -> String {
    let parts: Vec<&str> = routes.map(String::as_str).collect();
    if parts.is_empty() {
        "-".to_string()
    } else {
        parts.join(" > ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use waypoint_core::RouterError;

    fn session(initial: &[&str]) -> Session {
        let config = RouterConfig::new().with_initial_routes(initial.iter().map(|s| s.to_string()));
        let mut session = Session::new(config, "main");
        session.start().unwrap();
        session
    }

    #[test]
    fn start_presents_initial_stack() {
        let mut s = session(&["home"]);
        let out = s.take_output();
        assert_eq!(out.len(), 1);
        assert!(out[0].contains("showing home"));
    }

    #[test]
    fn back_pops_then_finishes_at_root() {
        let mut s = session(&["home"]);
        s.apply(&Command::Push("detail".into())).unwrap();
        assert_eq!(s.apply(&Command::Back).unwrap(), Flow::Continue);
        assert_eq!(s.apply(&Command::Back).unwrap(), Flow::Finished);
        let out = s.take_output();
        assert!(out.last().unwrap().contains("finishing"));
    }

    #[test]
    fn detached_commands_are_buffered_until_attach() {
        let mut s = session(&["home"]);
        s.take_output();
        s.apply(&Command::Detach).unwrap();
        s.apply(&Command::Push("settings".into())).unwrap();
        s.apply(&Command::Show).unwrap();
        let out = s.take_output();
        assert_eq!(out[0], "[main] detached");
        assert_eq!(out[1], "detached: committed home pending home > settings");

        s.apply(&Command::Attach(Some("tablet".into()))).unwrap();
        let out = s.take_output();
        assert_eq!(out.len(), 1);
        assert!(out[0].starts_with("[tablet] forward"));
        assert_eq!(s.cards_built(), 3);
    }

    #[test]
    fn double_attach_is_an_error() {
        let mut s = session(&["home"]);
        let err = s.apply(&Command::Attach(None)).unwrap_err();
        assert!(matches!(err, DemoError::Router(RouterError::AlreadyAttached)));
    }

    #[test]
    fn detach_twice_reports_already_detached() {
        let mut s = session(&[]);
        s.apply(&Command::Detach).unwrap();
        s.apply(&Command::Detach).unwrap();
        assert_eq!(s.take_output().last().map(String::as_str), Some("already detached"));
    }
}
