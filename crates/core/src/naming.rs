#![forbid(unsafe_code)]

/// Commands that step backwards through the proof. They are never recorded in the tree.
pub const UNDO_FAMILY_COMMANDS: &[&str] = &["undo", "undo-undo", "undo-until"];

fn head_token(command: &str) -> String {
    command
        .trim()
        .trim_start_matches('(')
        .split(|c: char| c.is_whitespace() || c == '(' || c == ')')
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase()
}

pub fn is_undo_command(command: &str) -> bool {
    let head = head_token(command);
    UNDO_FAMILY_COMMANDS
        .iter()
        .any(|candidate| *candidate == head)
}

pub fn is_postpone_command(command: &str) -> bool {
    head_token(command) == "postpone"
}

/// Canonical display form of a proof command: parenthesized unless it is an undo-family
/// command or already wrapped.
pub fn normalize_command(command: &str) -> String {
    let command = command.trim();
    if command.is_empty() || is_undo_command(command) {
        return command.to_string();
    }
    if command.starts_with('(') && command.ends_with(')') {
        return command.to_string();
    }
    format!("({command})")
}

/// Commands compare equal when their normalized forms match, ignoring inner whitespace runs.
pub fn same_command(a: &str, b: &str) -> bool {
    let squash = |s: &str| {
        normalize_command(s)
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
    };
    squash(a) == squash(b)
}

pub fn branch_label(branch_id: &str) -> String {
    format!("({branch_id})")
}

/// Sort key of a branch address: the numeric value of its last dotted component.
pub fn branch_sort_key(branch_id: &str) -> u64 {
    branch_id
        .rsplit('.')
        .next()
        .and_then(|last| last.trim().parse::<u64>().ok())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commands_are_parenthesized_once() {
        assert_eq!(normalize_command("grind"), "(grind)");
        assert_eq!(normalize_command(" (grind) "), "(grind)");
        assert_eq!(normalize_command("case \"x!1 > 0\""), "(case \"x!1 > 0\")");
    }

    #[test]
    fn undo_family_is_left_alone() {
        assert_eq!(normalize_command("undo"), "undo");
        assert!(is_undo_command("(undo 2)"));
        assert!(is_undo_command("UNDO"));
        assert!(!is_undo_command("(undone)"));
        assert!(is_postpone_command("(postpone)"));
    }

    #[test]
    fn branch_keys_use_last_component() {
        assert_eq!(branch_sort_key("1.10"), 10);
        assert_eq!(branch_sort_key("1.2"), 2);
        assert_eq!(branch_sort_key(""), 0);
        assert_eq!(branch_sort_key("1.x"), 0);
        assert_eq!(branch_label("1.2"), "(1.2)");
    }

    #[test]
    fn same_command_ignores_spacing_and_parens() {
        assert!(same_command("(case  \"x\")", "case \"x\""));
        assert!(!same_command("(grind)", "(assert)"));
    }
}
