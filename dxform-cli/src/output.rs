//! Terminal rendering of plans, apply results and state

use std::collections::HashMap;

use colored::{ColoredString, Colorize};
use dxform_core::effect::Effect;
use dxform_core::plan::Plan;
use dxform_core::resource::Value;
use dxform_core::schema::ResourceSchema;
use dxform_state::StateFile;

const MASK: &str = "(sensitive)";

fn symbol(effect: &Effect) -> ColoredString {
    let s = effect.symbol();
    match effect {
        Effect::Read(_) => s.cyan(),
        Effect::Create(_) => s.green().bold(),
        Effect::Update { .. } => s.yellow().bold(),
        Effect::Replace { .. } => s.magenta().bold(),
        Effect::Delete(_) => s.red().bold(),
    }
}

fn is_sensitive(schemas: &HashMap<String, ResourceSchema>, resource_type: &str, attr: &str) -> bool {
    schemas
        .get(resource_type)
        .and_then(|s| s.attributes.get(attr))
        .is_some_and(|a| a.sensitive)
}

pub fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => format!("\"{}\"", s),
        Value::Int(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::List(items) => {
            let strs: Vec<_> = items.iter().map(format_value).collect();
            format!("[{}]", strs.join(", "))
        }
        Value::Map(map) => {
            let mut entries: Vec<_> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            let strs: Vec<_> = entries
                .iter()
                .map(|(k, v)| format!("{}: {}", k, format_value(v)))
                .collect();
            format!("{{{}}}", strs.join(", "))
        }
        Value::ResourceRef(binding, attr) => format!("{}.{} (known after apply)", binding, attr),
    }
}

pub fn format_effect(effect: &Effect) -> String {
    let verb = match effect {
        Effect::Read(_) => "read",
        Effect::Create(_) => "create",
        Effect::Update { .. } => "update",
        Effect::Replace { .. } => "replace",
        Effect::Delete(_) => "delete",
    };
    format!("{} {}", verb, effect.resource_id())
}

pub fn print_plan(plan: &Plan, schemas: &HashMap<String, ResourceSchema>) {
    if plan.mutation_count() == 0 {
        println!("{}", "No changes. Infrastructure is up-to-date.".green());
        return;
    }

    println!("{}", "Execution Plan:".cyan().bold());
    println!();

    for effect in plan.effects() {
        let id = effect.resource_id();
        println!("  {} {}", symbol(effect), id.to_string().bold());
        let shown = |attr: &str, value: &Value| {
            if is_sensitive(schemas, &id.resource_type, attr) {
                MASK.dimmed().to_string()
            } else {
                format_value(value)
            }
        };

        match effect {
            Effect::Create(resource) => {
                let mut attrs: Vec<_> = resource.attributes.iter().collect();
                attrs.sort_by(|a, b| a.0.cmp(b.0));
                for (key, value) in attrs {
                    println!("      {} = {}", key, shown(key, value));
                }
            }
            Effect::Update { from, to, changed, .. } | Effect::Replace { from, to, changed, .. } => {
                for key in changed {
                    let old = from
                        .attributes
                        .get(key)
                        .map(|v| shown(key, v))
                        .unwrap_or_else(|| "(none)".to_string());
                    let new = to
                        .attributes
                        .get(key)
                        .map(|v| shown(key, v))
                        .unwrap_or_else(|| "(none)".to_string());
                    let forces = matches!(effect, Effect::Replace { .. })
                        && schemas
                            .get(&id.resource_type)
                            .is_some_and(|s| s.forces_new(key));
                    if forces {
                        println!("      {} = {} → {} {}", key, old, new, "# forces replacement".red());
                    } else {
                        println!("      {} = {} → {}", key, old, new);
                    }
                }
            }
            Effect::Delete(state) => {
                if let Some(identifier) = &state.identifier {
                    println!("      {}", identifier.dimmed());
                }
            }
            Effect::Read(_) => {}
        }
    }

    println!();
    println!("{}", plan.summary().to_string().bold());
}

pub fn print_state(state: &StateFile) {
    println!(
        "{}",
        format!(
            "State serial {} (lineage {}, dxform {})",
            state.serial, state.lineage, state.dxform_version
        )
        .cyan()
        .bold()
    );
    if state.resources.is_empty() {
        println!("{}", "No resources are managed.".yellow());
        return;
    }

    let mut resources: Vec<_> = state.resources.iter().collect();
    resources.sort_by(|a, b| (&a.resource_type, &a.name).cmp(&(&b.resource_type, &b.name)));
    for resource in resources {
        println!();
        println!(
            "  {}.{} {}",
            resource.resource_type,
            resource.name,
            resource.identifier.as_deref().unwrap_or("").dimmed()
        );
        let schema = dxform_provider_aws::resources::ResourceKind::from_name(&resource.resource_type)
            .map(|k| k.schema());
        let mut attrs: Vec<_> = resource.attributes.iter().collect();
        attrs.sort_by(|a, b| a.0.cmp(b.0));
        for (key, value) in attrs {
            let sensitive = schema
                .as_ref()
                .and_then(|s| s.attributes.get(key))
                .is_some_and(|a| a.sensitive);
            if sensitive {
                println!("      {} = {}", key, MASK.dimmed());
            } else {
                println!("      {} = {}", key, value);
            }
        }
    }
}
