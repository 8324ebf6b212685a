//! Plain-text tables for the terminal.

use crate::data::{FittingData, Role};
use crate::models::FunctionRegistry;

/// Per-column statistics over the selected records.
///
/// Columns bound to a role are marked with the role name.
pub fn format_statistics(data: &FittingData) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "Records: {} selected of {} | columns: {}\n\n",
        data.number_of_selected_records(),
        data.number_of_records(),
        data.number_of_columns()
    ));

    push_line(
        &mut out,
        format!(
            "{:<16} {:<5} {:>12} {:>12} {:>12} {:>12} {:>12}",
            "column", "role", "mean", "median", "std", "min", "max"
        ),
    );
    push_line(
        &mut out,
        format!(
            "{:-<16} {:-<5} {:-<12} {:-<12} {:-<12} {:-<12} {:-<12}",
            "", "", "", "", "", "", ""
        ),
    );

    for name in data.all_columns() {
        let role = role_of(data, name).map(Role::name).unwrap_or("");
        let stats = data.statistics(name).ok().flatten();
        let row = match stats {
            Some(s) => format!(
                "{:<16} {:<5} {:>12} {:>12} {:>12} {:>12} {:>12}",
                truncate(name, 16),
                role,
                fmt_num(s.mean),
                fmt_num(s.median),
                fmt_num(s.std_dev),
                fmt_num(s.min),
                fmt_num(s.max)
            ),
            None => format!("{:<16} {:<5} {:>12}", truncate(name, 16), role, "n/a"),
        };
        push_line(&mut out, row);
    }

    out
}

/// Name, arity and formula of every registered function.
pub fn format_functions(registry: &FunctionRegistry) -> String {
    let mut out = String::new();
    push_line(&mut out, format!("{:<16} {:>3}  {}", "name", "n", "syntax"));
    push_line(&mut out, format!("{:-<16} {:->3}  {:-<6}", "", "", ""));
    for f in registry.functions() {
        push_line(
            &mut out,
            format!(
                "{:<16} {:>3}  {}",
                f.name().unwrap_or(""),
                f.number_of_parameters(),
                f.syntax().unwrap_or("-")
            ),
        );
    }
    out
}

fn role_of(data: &FittingData, column: &str) -> Option<Role> {
    Role::ALL.into_iter().find(|role| data.role_column(*role) == Some(column))
}

fn push_line(out: &mut String, line: String) {
    out.push_str(line.trim_end());
    out.push('\n');
}

fn fmt_num(v: f64) -> String {
    if v != 0.0 && (v.abs() >= 1e6 || v.abs() < 1e-3) {
        format!("{v:.4e}")
    } else {
        format!("{v:.4}")
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('.');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::RoleHints;

    fn data() -> FittingData {
        let columns = vec![
            ("t".to_string(), vec![1.0, 2.0, 3.0]),
            ("v".to_string(), vec![2.0, 4.0, 9.0]),
            ("comment_column_long".to_string(), vec![0.0, 0.0, 0.0]),
        ];
        let hints = RoleHints::none().with(Role::X, "t").with(Role::Y, "v");
        FittingData::new(columns, hints).unwrap()
    }

    #[test]
    fn statistics_table_marks_roles() {
        let mut data = data();
        data.unselect_record(3).unwrap();
        let text = format_statistics(&data);
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "Records: 2 selected of 3 | columns: 3");
        assert!(lines[2].starts_with("column"));
        assert!(lines[4].starts_with("t                x"));
        assert!(lines[4].contains("1.5000"));
        assert!(lines[5].starts_with("v                y"));
        assert!(lines[5].contains("3.0000"));
        assert!(lines[6].starts_with("comment_column_."));
    }

    #[test]
    fn empty_selection_prints_placeholders() {
        let mut data = data();
        data.unselect_all_records();
        let text = format_statistics(&data);
        assert!(text.lines().skip(4).all(|l| l.ends_with("n/a")));
    }

    #[test]
    fn function_listing() {
        let registry = FunctionRegistry::with_builtins();
        let text = format_functions(&registry);
        assert!(text.lines().any(|l| l.starts_with("linear") && l.ends_with("a[0] + a[1] * x")));
        assert_eq!(text.lines().count(), registry.len() + 2);
    }

    #[test]
    fn number_formatting() {
        assert_eq!(fmt_num(0.0), "0.0000");
        assert_eq!(fmt_num(12.5), "12.5000");
        assert_eq!(fmt_num(1.0e7), "1.0000e7");
        assert_eq!(truncate("abcdef", 4), "abc.");
    }
}
