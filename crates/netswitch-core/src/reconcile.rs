// ── Route reconciliation ──
//
// Compares the desired tunnel for a remote with the route the kernel has
// installed and issues the minimal `ip` commands to close the gap. Planning
// is pure; applying runs each command independently so a failed IPv4
// change still lets the IPv6 change through.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::CoreError;
use crate::model::{RouteAction, RouteEntry, RouteTarget};
use crate::selector::SelectionReason;
use crate::system::{CommandExecutor, RouteTable, SystemCommand, installed_interface};

/// The decision for one remote before anything is executed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoutePlan {
    pub target: RouteTarget,
    /// Interface currently carrying the remote's subnet.
    pub installed: Option<String>,
    pub action: RouteAction,
    pub commands: Vec<SystemCommand>,
}

impl RoutePlan {
    /// Decide add / change / nothing against a route table snapshot.
    pub fn new(target: RouteTarget, routes: &[RouteEntry]) -> Self {
        let installed = installed_interface(routes, target.remote).map(str::to_owned);
        let desired = target.interface();
        let action = match installed.as_deref() {
            None => RouteAction::Add,
            Some(current) if current == desired => RouteAction::None,
            Some(_) => RouteAction::Change,
        };
        Self {
            target,
            installed,
            action,
            commands: target.commands(action),
        }
    }
}

/// What reconciling one remote did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconcileOutcome {
    pub action: RouteAction,
    pub interface: String,
    pub previous: Option<String>,
    /// Commands that ran successfully.
    pub applied: usize,
    /// One message per failed command.
    pub errors: Vec<String>,
}

/// Applies route plans through the command executor.
pub struct Reconciler {
    routes: Arc<dyn RouteTable>,
    executor: Arc<dyn CommandExecutor>,
}

impl Reconciler {
    pub fn new(routes: Arc<dyn RouteTable>, executor: Arc<dyn CommandExecutor>) -> Self {
        Self { routes, executor }
    }

    /// Plan against a fresh route table snapshot without executing anything.
    pub async fn plan(&self, target: RouteTarget) -> Result<RoutePlan, CoreError> {
        let routes = self.routes.routes().await?;
        Ok(RoutePlan::new(target, &routes))
    }

    /// Bring the kernel's route for `target.remote` onto `target`'s tunnel.
    ///
    /// Fails only if the route table cannot be read; command failures are
    /// logged and reported in the outcome.
    pub async fn reconcile(
        &self,
        target: RouteTarget,
        reason: SelectionReason,
    ) -> Result<ReconcileOutcome, CoreError> {
        let plan = self.plan(target).await?;
        let remote = target.remote;
        let interface = target.interface();

        match plan.action {
            RouteAction::None => {
                debug!(%remote, %interface, "route already on preferred interface");
            }
            RouteAction::Add => {
                info!(%remote, %interface, %reason, "route not found in routing table, adding");
            }
            RouteAction::Change => {
                info!(
                    %remote,
                    from = plan.installed.as_deref().unwrap_or_default(),
                    to = %interface,
                    %reason,
                    "changing route"
                );
            }
        }

        let mut applied = 0;
        let mut errors = Vec::new();
        for command in &plan.commands {
            match self.executor.execute(command).await {
                Ok(()) => applied += 1,
                Err(e) => {
                    warn!(%remote, error = %e, "route command failed");
                    errors.push(e.to_string());
                }
            }
        }

        Ok(ReconcileOutcome {
            action: plan.action,
            interface,
            previous: plan.installed,
            applied,
            errors,
        })
    }
}
