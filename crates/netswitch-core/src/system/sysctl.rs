//! Asymmetric routing sysctls.
//!
//! Traffic for a remote may leave on one family's tunnel and come back on
//! the other, so reverse-path filtering is disabled and local-source packets
//! accepted both globally and per tunnel interface.

use std::collections::BTreeMap;

use tracing::{debug, warn};

use super::executor::{CommandExecutor, SystemCommand};
use crate::model::InterfaceRecord;

const GLOBAL_SETTINGS: [(&str, &str); 6] = [
    ("net.ipv4.conf.all.accept_local", "1"),
    ("net.ipv4.conf.all.route_localnet", "1"),
    ("net.ipv4.conf.default.accept_local", "1"),
    ("net.ipv4.conf.default.route_localnet", "1"),
    ("net.ipv4.conf.all.rp_filter", "0"),
    ("net.ipv4.conf.default.rp_filter", "0"),
];

const INTERFACE_SETTINGS: [(&str, &str); 3] = [
    ("accept_local", "1"),
    ("route_localnet", "1"),
    ("rp_filter", "0"),
];

/// Every key/value the mesh needs, sorted by key.
///
/// Interface names contain a `.`, which sysctl would read as a path
/// separator, so the first one is written as `/`.
pub fn asymmetric_route_settings(interfaces: &[InterfaceRecord]) -> BTreeMap<String, &'static str> {
    let mut settings: BTreeMap<String, &'static str> = GLOBAL_SETTINGS
        .iter()
        .map(|(k, v)| ((*k).to_owned(), *v))
        .collect();

    for iface in interfaces {
        let name = iface.name.replacen('.', "/", 1);
        for (key, value) in INTERFACE_SETTINGS {
            settings.insert(format!("net.ipv4.conf.{name}.{key}"), value);
        }
    }

    settings
}

/// Apply all settings, returning the failures.
///
/// Idempotent; a failing key does not stop the others.
pub async fn apply_asymmetric_routing(
    executor: &dyn CommandExecutor,
    interfaces: &[InterfaceRecord],
) -> Vec<String> {
    let settings = asymmetric_route_settings(interfaces);
    let mut failures = Vec::new();

    for (key, value) in &settings {
        if let Err(e) = executor.execute(&SystemCommand::sysctl(key, value)).await {
            warn!(key = %key, error = %e, "failed to set sysctl");
            failures.push(e.to_string());
        }
    }

    debug!(
        applied = settings.len() - failures.len(),
        failed = failures.len(),
        "asymmetric routing sysctls applied"
    );
    failures
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::system::executor::RecordingExecutor;

    #[test]
    fn includes_global_and_per_interface_keys() {
        let ifaces = vec![InterfaceRecord::parse("wg1.2_v4").unwrap()];
        let settings = asymmetric_route_settings(&ifaces);

        assert_eq!(settings.len(), GLOBAL_SETTINGS.len() + INTERFACE_SETTINGS.len());
        assert_eq!(settings["net.ipv4.conf.all.rp_filter"], "0");
        assert_eq!(settings["net.ipv4.conf.wg1/2_v4.accept_local"], "1");
        assert_eq!(settings["net.ipv4.conf.wg1/2_v4.route_localnet"], "1");
        assert_eq!(settings["net.ipv4.conf.wg1/2_v4.rp_filter"], "0");
    }

    #[tokio::test]
    async fn applies_each_setting_once() {
        let exec = RecordingExecutor::new();
        let ifaces = vec![
            InterfaceRecord::parse("wg1.2_v4").unwrap(),
            InterfaceRecord::parse("wg1.2_v6").unwrap(),
        ];

        let failures = apply_asymmetric_routing(&exec, &ifaces).await;
        assert!(failures.is_empty());

        let issued = exec.take().await;
        assert_eq!(issued.len(), 12);
        assert!(issued.iter().all(|c| c.program == "sysctl"));
        assert!(
            issued
                .iter()
                .any(|c| c.to_string() == "sysctl -w net.ipv4.conf.wg1/2_v6.rp_filter=0")
        );
    }
}
