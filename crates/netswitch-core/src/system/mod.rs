// ── Host-side ports ──
//
// The core never touches the kernel directly. Interface enumeration, route
// table reads, and command execution each sit behind a trait so a pass can
// run against fakes in tests or a recording executor in dry-run mode.

pub mod executor;
pub mod inventory;
pub mod route_table;
pub mod sysctl;

pub use executor::{CommandExecutor, DryRunExecutor, ProcessExecutor, SystemCommand};
pub use inventory::{InterfaceInventory, SysfsInventory, families_by_remote, infer_local_id};
pub use route_table::{ProcRouteTable, RouteTable, installed_interface, parse_route_table};
