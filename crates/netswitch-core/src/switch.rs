// ── Switch ──
//
// The reconciliation scheduler. Each pass re-reads the tunnel inventory,
// reapplies the asymmetric routing sysctls, then decides and reconciles
// every remote. Passes never overlap: the run loop awaits each pass before
// the next tick, and the pass lock covers direct `run_pass` callers.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::Utc;
use futures_util::{StreamExt, stream};
use netswitch_api::{MetricsClient, TransportConfig};
use serde::Serialize;
use tokio::sync::{Mutex, watch};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::SwitchConfig;
use crate::error::CoreError;
use crate::model::{AddressFamily, MetricsByFamily, NodeId, PathLabel, RouteTarget};
use crate::reconcile::{RoutePlan, Reconciler};
use crate::report::{PassReport, RemoteDecision, RemoteReport};
use crate::selector::{self, Selection, SelectionReason};
use crate::system::{
    CommandExecutor, DryRunExecutor, InterfaceInventory, ProcRouteTable, ProcessExecutor,
    RouteTable, SysfsInventory, families_by_remote, sysctl,
};
use crate::telemetry::MetricsSource;

// ── Phase ────────────────────────────────────────────────────────

/// Scheduler lifecycle. `ColdStart` lasts until the first pass begins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    ColdStart,
    Steady,
}

// ── Inspection ───────────────────────────────────────────────────

/// Read-only view of how the selector sees one remote right now.
#[derive(Debug, Clone, Serialize)]
pub struct Inspection {
    pub remote: NodeId,
    pub path: String,
    pub metrics: MetricsByFamily,
    /// `None` for an infinite (lossless) score.
    pub scores: BTreeMap<AddressFamily, Option<f64>>,
    pub selection: Selection,
    /// What a steady-state pass would do for this remote.
    pub plan: RoutePlan,
}

// ── Switch ───────────────────────────────────────────────────────

/// Cheaply cloneable handle to the scheduler.
#[derive(Clone)]
pub struct Switch {
    inner: Arc<SwitchInner>,
}

struct SwitchInner {
    config: SwitchConfig,
    metrics: Arc<dyn MetricsSource>,
    inventory: Arc<dyn InterfaceInventory>,
    executor: Arc<dyn CommandExecutor>,
    reconciler: Reconciler,
    cold_start: AtomicBool,
    pass_lock: Mutex<()>,
    reports: watch::Sender<Option<Arc<PassReport>>>,
}

impl Switch {
    /// Assemble a switch from explicit adapters. Starts in [`Phase::ColdStart`].
    pub fn new(
        config: SwitchConfig,
        metrics: Arc<dyn MetricsSource>,
        inventory: Arc<dyn InterfaceInventory>,
        routes: Arc<dyn RouteTable>,
        executor: Arc<dyn CommandExecutor>,
    ) -> Self {
        let (reports, _) = watch::channel(None);
        Self {
            inner: Arc::new(SwitchInner {
                reconciler: Reconciler::new(routes, Arc::clone(&executor)),
                config,
                metrics,
                inventory,
                executor,
                cold_start: AtomicBool::new(true),
                pass_lock: Mutex::new(()),
                reports,
            }),
        }
    }

    /// Production wiring: HTTP telemetry, sysfs inventory, `/proc/net/route`,
    /// and real processes (or a recording executor in dry-run mode).
    pub fn from_config(config: SwitchConfig) -> Result<Self, CoreError> {
        let transport = TransportConfig {
            timeout: config.request_timeout,
            bearer_token: config.telemetry_token.clone(),
        };
        let metrics = MetricsClient::new(config.telemetry_url.clone(), &transport)?;

        let executor: Arc<dyn CommandExecutor> = if config.dry_run {
            Arc::new(DryRunExecutor::new())
        } else {
            Arc::new(ProcessExecutor::new(config.command_timeout))
        };

        Ok(Self::new(
            config,
            Arc::new(metrics),
            Arc::new(SysfsInventory::new()),
            Arc::new(ProcRouteTable::new()),
            executor,
        ))
    }

    pub fn config(&self) -> &SwitchConfig {
        &self.inner.config
    }

    pub fn local_id(&self) -> NodeId {
        self.inner.config.local_id
    }

    pub fn phase(&self) -> Phase {
        if self.inner.cold_start.load(Ordering::Acquire) {
            Phase::ColdStart
        } else {
            Phase::Steady
        }
    }

    /// Go straight to steady state; the next pass consults telemetry.
    pub fn skip_cold_start(&self) {
        self.inner.cold_start.store(false, Ordering::Release);
    }

    /// Subscribe to pass reports. Holds `None` until the first pass ends.
    pub fn reports(&self) -> watch::Receiver<Option<Arc<PassReport>>> {
        self.inner.reports.subscribe()
    }

    // ── Scheduling ───────────────────────────────────────────────

    /// Run passes every `interval` until `cancel` fires.
    ///
    /// The first pass starts immediately. A pass that overruns the interval
    /// delays the next one instead of queueing extra ticks. Returns early
    /// only on a fatal error.
    pub async fn run(&self, cancel: CancellationToken) -> Result<(), CoreError> {
        let period = self.inner.config.interval;
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!(
            local = %self.local_id(),
            interval = ?period,
            dry_run = self.inner.config.dry_run,
            "switch started"
        );

        loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                _ = interval.tick() => {
                    if let Err(e) = self.run_pass().await {
                        if e.is_fatal() {
                            return Err(e);
                        }
                        warn!(error = %e, "reconciliation pass failed");
                    }
                }
            }
        }

        info!("switch stopped");
        Ok(())
    }

    /// Run one reconciliation pass over every remote and publish its report.
    ///
    /// Errors only if the tunnel inventory cannot be read.
    pub async fn run_pass(&self) -> Result<Arc<PassReport>, CoreError> {
        let inner = &self.inner;
        let _guard = inner.pass_lock.lock().await;
        let cold_start = inner.cold_start.swap(false, Ordering::AcqRel);
        let started_at = Utc::now();
        let local = inner.config.local_id;

        let all_interfaces = inner.inventory.interfaces().await?;

        // rp_filter and src_valid_mark apply to every tunnel on the host.
        let sysctl_errors = if inner.config.sysctl_enabled {
            sysctl::apply_asymmetric_routing(inner.executor.as_ref(), &all_interfaces).await
        } else {
            Vec::new()
        };

        let interfaces: Vec<_> = all_interfaces
            .into_iter()
            .filter(|record| {
                let ours = record.local == local;
                if !ours {
                    debug!(name = %record.name, "ignoring tunnel of another local id");
                }
                ours
            })
            .collect();

        let remotes = families_by_remote(&interfaces);
        let limit = inner.config.max_concurrent_remotes.max(1);
        let mut reports: Vec<RemoteReport> = stream::iter(remotes)
            .map(|(remote, families)| inner.evaluate_remote(remote, families, cold_start))
            .buffer_unordered(limit)
            .collect()
            .await;
        reports.sort_by_key(|r| r.remote);

        let report = Arc::new(PassReport {
            started_at,
            finished_at: Utc::now(),
            cold_start,
            sysctl_errors,
            remotes: reports,
        });

        let changed = report.changed().count();
        if changed > 0 || cold_start {
            info!(
                remotes = report.remotes.len(),
                changed,
                errors = report.error_count(),
                cold_start,
                "pass complete"
            );
        } else {
            debug!(
                remotes = report.remotes.len(),
                errors = report.error_count(),
                "pass complete"
            );
        }

        inner.reports.send_replace(Some(Arc::clone(&report)));
        Ok(report)
    }

    // ── Inspection ───────────────────────────────────────────────

    /// Fetch telemetry for `remote` and show the decision without acting on it.
    pub async fn inspect(&self, remote: NodeId) -> Result<Inspection, CoreError> {
        let inner = &self.inner;
        let local = inner.config.local_id;
        let metrics = inner.metrics.fetch_metrics(local, remote).await?;
        let selection = selector::choose(&metrics);

        let scores = metrics
            .iter()
            .map(|(family, m)| {
                let score = selector::score(&m);
                (family, score.is_finite().then_some(score))
            })
            .collect();

        let plan = inner
            .reconciler
            .plan(RouteTarget::new(local, remote, selection.family))
            .await?;

        Ok(Inspection {
            remote,
            path: PathLabel::new(local, remote).to_string(),
            metrics,
            scores,
            selection,
            plan,
        })
    }
}

impl SwitchInner {
    async fn select(
        &self,
        remote: NodeId,
        families: &BTreeSet<AddressFamily>,
        cold_start: bool,
    ) -> Result<Selection, CoreError> {
        let mut iter = families.iter();
        if let (Some(&only), None) = (iter.next(), iter.next()) {
            return Ok(Selection::new(only, SelectionReason::SingleFamily));
        }
        if cold_start {
            return Ok(Selection::new(
                AddressFamily::COLD_START,
                SelectionReason::ColdStart,
            ));
        }
        let metrics = self
            .metrics
            .fetch_metrics(self.config.local_id, remote)
            .await?;
        Ok(selector::choose(&metrics))
    }

    async fn evaluate_remote(
        &self,
        remote: NodeId,
        families: BTreeSet<AddressFamily>,
        cold_start: bool,
    ) -> RemoteReport {
        let decision = match self.select(remote, &families, cold_start).await {
            Err(e) => {
                warn!(%remote, error = %e, "no path preference, leaving route untouched");
                RemoteDecision::Skipped {
                    reason: format!("no preference: {e}"),
                }
            }
            Ok(selection) => {
                debug!(
                    %remote,
                    family = %selection.family,
                    reason = %selection.reason,
                    "path selected"
                );
                let target = RouteTarget::new(self.config.local_id, remote, selection.family);
                match self.reconciler.reconcile(target, selection.reason).await {
                    Ok(outcome) => RemoteDecision::Reconciled {
                        family: selection.family,
                        reason: selection.reason,
                        action: outcome.action,
                        interface: outcome.interface,
                        previous: outcome.previous,
                        errors: outcome.errors,
                    },
                    Err(e) => {
                        warn!(%remote, error = %e, "skipping remote");
                        RemoteDecision::Skipped {
                            reason: e.to_string(),
                        }
                    }
                }
            }
        };

        RemoteReport {
            remote,
            families,
            decision,
        }
    }
}
