//! Output formatting: table or JSON.
//!
//! Table uses `tabled`, structured formats use serde.

use std::io::{self, Write};

use tabled::{Table, Tabled, settings::Style};

use crate::cli::OutputFormat;
use crate::error::CliError;

// ── Render dispatchers ───────────────────────────────────────────────

/// Render a single item; tables use a pre-formatted `detail_fn`.
pub fn render_single<T>(
    format: OutputFormat,
    data: &T,
    detail_fn: impl Fn(&T) -> String,
) -> Result<String, CliError>
where
    T: serde::Serialize,
{
    match format {
        OutputFormat::Table => Ok(detail_fn(data)),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(data)?),
        OutputFormat::JsonCompact => Ok(serde_json::to_string(data)?),
    }
}

/// Print the rendered output to stdout.
pub fn print_output(output: &str) {
    if output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

pub fn render_table<R: Tabled>(rows: &[R]) -> String {
    Table::new(rows).with(Style::rounded()).to_string()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[derive(serde::Serialize)]
    struct Item {
        name: &'static str,
    }

    #[test]
    fn single_item_uses_detail_only_for_tables() {
        let item = Item { name: "wg1.2_v4" };
        let detail = |i: &Item| format!("Name: {}", i.name);

        assert_eq!(
            render_single(OutputFormat::Table, &item, detail).unwrap(),
            "Name: wg1.2_v4"
        );
        assert_eq!(
            render_single(OutputFormat::JsonCompact, &item, detail).unwrap(),
            r#"{"name":"wg1.2_v4"}"#
        );
    }
}
