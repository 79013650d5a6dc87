//! Output formatting: table, JSON, YAML, plain.
//!
//! Renders data in the format selected by `--output`. Table uses `tabled`,
//! structured formats use serde, plain emits one identifier per line.
//! Notifications raised while a command ran go to stderr.

use std::io::{self, IsTerminal, Write};

use owo_colors::OwoColorize;
use tabled::{Table, Tabled, settings::Style};

use wakelan_core::{Notification, NotificationKind};

use crate::cli::{ColorMode, OutputFormat};
use crate::error::CliError;

/// Resolved rendering settings for one invocation.
#[derive(Debug, Clone, Copy)]
pub struct Printer {
    pub format: OutputFormat,
    pub color: bool,
    pub quiet: bool,
}

impl Printer {
    pub fn new(format: OutputFormat, color: ColorMode, quiet: bool) -> Self {
        Self {
            format,
            color: should_color(color),
            quiet,
        }
    }

    /// Render and print a list.
    pub fn list<T, R>(
        &self,
        data: &[T],
        to_row: impl Fn(&T) -> R,
        id_fn: impl Fn(&T) -> String,
    ) -> Result<(), CliError>
    where
        T: serde::Serialize,
        R: Tabled,
    {
        print_output(&render_list(self.format, data, to_row, id_fn)?, self.quiet);
        Ok(())
    }

    /// Render and print a single item.
    pub fn single<T>(
        &self,
        data: &T,
        detail_fn: impl Fn(&T) -> String,
        id_fn: impl Fn(&T) -> String,
    ) -> Result<(), CliError>
    where
        T: serde::Serialize,
    {
        print_output(
            &render_single(self.format, data, detail_fn, id_fn)?,
            self.quiet,
        );
        Ok(())
    }

    /// Status line on stderr, suppressed by `--quiet`.
    pub fn note(&self, message: &str) {
        if self.quiet {
            return;
        }
        if self.color {
            eprintln!("{} {message}", "✓".green());
        } else {
            eprintln!("✓ {message}");
        }
    }

    /// Warning on stderr; shown even with `--quiet`.
    pub fn warn(&self, message: &str) {
        if self.color {
            eprintln!("{} {message}", "!".yellow().bold());
        } else {
            eprintln!("! {message}");
        }
    }

    /// Print notifications to stderr. `--quiet` keeps errors and warnings.
    pub fn notifications(&self, list: &[Notification]) {
        let mut stderr = io::stderr().lock();
        for n in list {
            if self.quiet && matches!(n.kind, NotificationKind::Success | NotificationKind::Info) {
                continue;
            }
            let _ = writeln!(stderr, "{}", format_notification(n, self.color));
        }
    }
}

// ── Color helpers ────────────────────────────────────────────────────

/// Determine whether color output should be enabled.
pub fn should_color(mode: ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stderr().is_terminal() && std::env::var_os("NO_COLOR").is_none(),
    }
}

fn format_notification(n: &Notification, color: bool) -> String {
    let (icon, tag) = match n.kind {
        NotificationKind::Success => ("✓", "success"),
        NotificationKind::Error => ("✗", "error"),
        NotificationKind::Warning => ("!", "warning"),
        NotificationKind::Info => ("i", "info"),
    };
    let head = if color {
        let styled = match n.kind {
            NotificationKind::Success => format!("{}", icon.green().bold()),
            NotificationKind::Error => format!("{}", icon.red().bold()),
            NotificationKind::Warning => format!("{}", icon.yellow().bold()),
            NotificationKind::Info => format!("{}", icon.cyan().bold()),
        };
        format!("{styled} {}", n.title.bold())
    } else {
        format!("{icon} [{tag}] {}", n.title)
    };
    match n.message.as_deref() {
        Some(message) if !message.is_empty() => format!("{head}: {message}"),
        _ => head,
    }
}

// ── Render dispatchers ───────────────────────────────────────────────

/// Render a list of serde-serializable + tabled items in the chosen format.
pub fn render_list<T, R>(
    format: OutputFormat,
    data: &[T],
    to_row: impl Fn(&T) -> R,
    id_fn: impl Fn(&T) -> String,
) -> Result<String, CliError>
where
    T: serde::Serialize,
    R: Tabled,
{
    match format {
        OutputFormat::Table => {
            let rows: Vec<R> = data.iter().map(to_row).collect();
            Ok(Table::new(rows).with(Style::rounded()).to_string())
        }
        OutputFormat::Json => render_json(data, false),
        OutputFormat::JsonCompact => render_json(data, true),
        OutputFormat::Yaml => render_yaml(data),
        OutputFormat::Plain => Ok(data.iter().map(&id_fn).collect::<Vec<_>>().join("\n")),
    }
}

/// Render a single item; `table` uses the hand-formatted `detail_fn`.
pub fn render_single<T>(
    format: OutputFormat,
    data: &T,
    detail_fn: impl Fn(&T) -> String,
    id_fn: impl Fn(&T) -> String,
) -> Result<String, CliError>
where
    T: serde::Serialize,
{
    match format {
        OutputFormat::Table => Ok(detail_fn(data)),
        OutputFormat::Json => render_json(data, false),
        OutputFormat::JsonCompact => render_json(data, true),
        OutputFormat::Yaml => render_yaml(data),
        OutputFormat::Plain => Ok(id_fn(data)),
    }
}

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

// ── Format-specific renderers ────────────────────────────────────────

fn render_json<T: serde::Serialize + ?Sized>(data: &T, compact: bool) -> Result<String, CliError> {
    let rendered = if compact {
        serde_json::to_string(data)
    } else {
        serde_json::to_string_pretty(data)
    };
    rendered.map_err(|e| CliError::Render {
        format: "json",
        message: e.to_string(),
    })
}

fn render_yaml<T: serde::Serialize + ?Sized>(data: &T) -> Result<String, CliError> {
    serde_yaml::to_string(data).map_err(|e| CliError::Render {
        format: "yaml",
        message: e.to_string(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::BTreeMap;

    use wakelan_core::NotificationBus;

    use super::*;

    #[derive(serde::Serialize, Tabled)]
    struct Row {
        id: u64,
        name: &'static str,
    }

    fn rows() -> Vec<Row> {
        vec![Row { id: 1, name: "nas" }, Row { id: 2, name: "desk" }]
    }

    #[test]
    fn plain_prints_one_id_per_line() {
        let out = render_list(OutputFormat::Plain, &rows(), |r| Row { ..*r }, |r| r.id.to_string())
            .unwrap();
        assert_eq!(out, "1\n2");
    }

    #[test]
    fn compact_json_is_single_line() {
        let out = render_list(
            OutputFormat::JsonCompact,
            &rows(),
            |r| Row { ..*r },
            |r| r.id.to_string(),
        )
        .unwrap();
        assert_eq!(out, r#"[{"id":1,"name":"nas"},{"id":2,"name":"desk"}]"#);
    }

    #[test]
    fn table_has_headers() {
        let out = render_list(OutputFormat::Table, &rows(), |r| Row { ..*r }, |r| r.id.to_string())
            .unwrap();
        assert!(out.contains("name"));
        assert!(out.contains("desk"));
    }

    #[test]
    fn unserializable_data_is_an_error() {
        // JSON object keys must be strings
        let mut data = BTreeMap::new();
        data.insert(vec![1_u8, 2], "nas");

        let err = render_single(OutputFormat::Json, &data, |_| String::new(), |_| String::new())
            .unwrap_err();
        assert!(matches!(err, CliError::Render { format: "json", .. }));

        let table = render_single(OutputFormat::Table, &data, |_| "nas".into(), |_| String::new());
        assert_eq!(table.unwrap(), "nas");
    }

    #[test]
    fn uncolored_notification_is_tagged() {
        let bus = NotificationBus::new();
        bus.error("Connection error", Some("connection error".into()));
        bus.success("Saved", None);
        let shown = bus.drain();

        assert_eq!(
            format_notification(&shown[0], false),
            "✗ [error] Connection error: connection error"
        );
        assert_eq!(format_notification(&shown[1], false), "✓ [success] Saved");
    }
}
