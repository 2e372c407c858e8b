//! `show` - print tracked state

use anyhow::{Context as _, Result, bail};
use colored::Colorize;
use serde::Serialize;
use std::collections::BTreeMap;

use super::load_state;
use crate::Context;
use crate::engine::{Target, address};
use crate::resource::EntityKind;
use crate::state::StateFile;
use crate::ui;

/// Records of one kind as JSON objects, by local name
fn records_of<M: Serialize>(
    records: &BTreeMap<String, M>,
) -> Result<Vec<(String, serde_json::Value)>> {
    records
        .iter()
        .map(|(name, record)| {
            let value = serde_json::to_value(record)
                .with_context(|| format!("Failed to render {name}"))?;
            Ok((name.clone(), value))
        })
        .collect()
}

fn records(state: &StateFile, kind: EntityKind) -> Result<Vec<(String, serde_json::Value)>> {
    match kind {
        EntityKind::AdType => records_of(&state.ad_type),
        EntityKind::Channel => records_of(&state.channel),
        EntityKind::Site => records_of(&state.site),
        EntityKind::ChannelSiteMap => records_of(&state.channel_site_map),
        EntityKind::CreativeTemplate => records_of(&state.creative_template),
        EntityKind::User => records_of(&state.user),
    }
}

const MAX_VALUE_WIDTH: usize = 72;

fn render(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Null => "null".dimmed().to_string(),
        serde_json::Value::String(s) => ui::truncate(s, MAX_VALUE_WIDTH),
        other => ui::truncate(&other.to_string(), MAX_VALUE_WIDTH),
    }
}

pub fn run(ctx: &Context, target: Option<&str>, json: bool) -> Result<()> {
    let target = target.map(Target::parse).transpose()?;
    let state = load_state(ctx)?;

    let mut shown = Vec::new();
    for kind in EntityKind::ALL {
        for (name, value) in records(&state, kind)? {
            if target.as_ref().is_none_or(|t| t.matches(kind, &name)) {
                shown.push((kind, name, value));
            }
        }
    }

    if let Some(Target {
        kind,
        name: Some(name),
    }) = &target
        && shown.is_empty()
    {
        bail!("{} is not tracked", address(*kind, name));
    }

    if json {
        let document: BTreeMap<String, &serde_json::Value> = shown
            .iter()
            .map(|(kind, name, value)| (format!("{kind}.{name}"), value))
            .collect();
        println!("{}", serde_json::to_string_pretty(&document)?);
        return Ok(());
    }

    if shown.is_empty() {
        ui::info("No objects are tracked.");
        return Ok(());
    }

    ui::header(&format!("State ({})", ctx.state.display()));
    for (kind, name, value) in &shown {
        ui::section(&format!("{kind}.{name}"));
        if let serde_json::Value::Object(attributes) = value {
            for (attribute, value) in attributes {
                ui::kv(attribute, &render(value));
            }
        }
    }
    println!();
    ui::dim(&format!(
        "{} objects, last updated {}",
        shown.len(),
        state.last_updated.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::Site;
    use declarative::Value;

    #[test]
    fn test_records_render_null_attributes() {
        let mut state = StateFile::default();
        state.site.insert(
            "blog".into(),
            Site {
                id: Value::Known(1),
                title: Value::Known("Blog".into()),
                url: Value::Null,
            },
        );

        let sites = records(&state, EntityKind::Site).unwrap();
        assert_eq!(sites.len(), 1);
        assert_eq!(sites[0].0, "blog");
        assert_eq!(sites[0].1["title"], serde_json::json!("Blog"));
        assert!(sites[0].1["url"].is_null());
        assert!(records(&state, EntityKind::User).unwrap().is_empty());
    }
}
