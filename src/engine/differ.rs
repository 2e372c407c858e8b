//! Plan display

use colored::Colorize;
use declarative::{Action, BoxedChange, DiffSummary, ResourceDiff, group_by_type};

/// Pending (non no-op) diffs of a plan
pub fn compute_diffs<S>(changes: &[BoxedChange<S>]) -> Vec<ResourceDiff> {
    changes
        .iter()
        .filter(|c| !c.action().is_noop())
        .map(|c| ResourceDiff {
            address: c.address().to_string(),
            resource_type: c.resource_type().to_string(),
            action: c.action().clone(),
        })
        .collect()
}

/// Changed attributes of an update or replacement, in parentheses
fn detail(action: &Action) -> String {
    match action {
        Action::Update { attributes } => format!("({})", attributes.join(", ")),
        Action::Replace { attributes } => {
            let verb = if attributes.len() == 1 { "forces" } else { "force" };
            format!("({} {verb} replacement)", attributes.join(", "))
        }
        _ => String::new(),
    }
}

/// Plain one-line description, e.g. `-/+ ad_type.banner (height forces replacement)`
pub fn format_diff_line(diff: &ResourceDiff) -> String {
    let detail = detail(&diff.action);
    if detail.is_empty() {
        format!("{} {}", diff.action.symbol(), diff.address)
    } else {
        format!("{} {} {detail}", diff.action.symbol(), diff.address)
    }
}

/// `Plan: 1 to add, 0 to change, 1 to replace, 0 to destroy.`
pub fn format_summary(summary: &DiffSummary) -> String {
    format!(
        "Plan: {} to add, {} to change, {} to replace, {} to destroy.",
        summary.additions, summary.updates, summary.replacements, summary.removals
    )
}

fn colored_symbol(action: &Action) -> colored::ColoredString {
    match action {
        Action::Create => action.symbol().green(),
        Action::Update { .. } => action.symbol().yellow(),
        Action::Replace { .. } => action.symbol().magenta(),
        Action::Delete => action.symbol().red(),
        Action::NoOp => action.symbol().dimmed(),
    }
}

fn type_title(resource_type: &str) -> &str {
    match resource_type {
        "ad_type" => "Ad types",
        "channel" => "Channels",
        "site" => "Sites",
        "channel_site_map" => "Channel/site mappings",
        "creative_template" => "Creative templates",
        "user" => "Users",
        other => other,
    }
}

/// Display a list of diffs grouped by type
pub fn display_diff(diffs: &[ResourceDiff]) {
    if diffs.is_empty() {
        println!();
        println!("  {} No changes. Remote objects match the configuration.", "✓".green());
        return;
    }

    println!();
    println!(
        "┌─ {} ─────────────────────────────────────────┐",
        "Execution Plan".bold()
    );
    println!("│");

    for (resource_type, type_diffs) in group_by_type(diffs) {
        println!("│ {}", type_title(resource_type).bold());
        for diff in type_diffs {
            println!(
                "│   {:<3} {:<40} {}",
                colored_symbol(&diff.action),
                diff.address,
                detail(&diff.action).dimmed()
            );
        }
        println!("│");
    }

    println!("├─────────────────────────────────────────────────────┤");
    println!("│ {}", format_summary(&DiffSummary::from_diffs(diffs)).bold());
    println!("└─────────────────────────────────────────────────────┘");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diff(address: &str, action: Action) -> ResourceDiff {
        ResourceDiff {
            address: address.into(),
            resource_type: address.split('.').next().unwrap_or_default().into(),
            action,
        }
    }

    #[test]
    fn test_format_diff_line() {
        assert_eq!(
            format_diff_line(&diff("site.blog", Action::Create)),
            "+ site.blog"
        );
        assert_eq!(
            format_diff_line(&diff(
                "channel.home",
                Action::Update {
                    attributes: vec!["title", "ad_types"]
                }
            )),
            "~ channel.home (title, ad_types)"
        );
        assert_eq!(
            format_diff_line(&diff(
                "ad_type.banner",
                Action::Replace {
                    attributes: vec!["height"]
                }
            )),
            "-/+ ad_type.banner (height forces replacement)"
        );
        assert_eq!(
            format_diff_line(&diff("user.ops", Action::Delete)),
            "- user.ops"
        );
    }

    #[test]
    fn test_format_summary() {
        let diffs = vec![
            diff("site.a", Action::Create),
            diff("site.b", Action::Create),
            diff("user.c", Action::Delete),
        ];
        assert_eq!(
            format_summary(&DiffSummary::from_diffs(&diffs)),
            "Plan: 2 to add, 0 to change, 0 to replace, 1 to destroy."
        );
    }

    #[test]
    fn test_compute_diffs_skips_noops() {
        use declarative::{ApplyContext, ApplyResult, Change};

        struct Fixed(Action);

        impl Change<()> for Fixed {
            fn address(&self) -> &str {
                "site.x"
            }
            fn resource_type(&self) -> &'static str {
                "site"
            }
            fn action(&self) -> &Action {
                &self.0
            }
            fn apply(&mut self, _: &ApplyContext, _: &mut ()) -> anyhow::Result<ApplyResult> {
                Ok(ApplyResult::NoChange)
            }
        }

        let changes: Vec<BoxedChange<()>> =
            vec![Box::new(Fixed(Action::NoOp)), Box::new(Fixed(Action::Delete))];
        let diffs = compute_diffs(&changes);
        assert_eq!(diffs.len(), 1);
        assert!(diffs[0].is_removal());
    }
}
