//! Config bridge
//!
//! Turns the merged option tree into validated providers and zones.
//! Nothing in here fails hard on bad entries: problems become
//! [`ValidationWarning`]s and the entry is either repaired with a
//! documented default or skipped.
//!
//! | Field | Missing | Uncoercible |
//! |-------|---------|-------------|
//! | `name` / `id` | entry skipped | entry skipped |
//! | `interval_minutes` | `zone_defaults` or 60 | 60 + warning |
//! | `random_offset_minutes` | `zone_defaults` or 0 | 0 + warning |
//! | `specific_times` | empty | invalid items dropped + warning |
//! | `ignore_rules` | empty | non-string items dropped + warning |
//! | `priority` | 100 | 100 + warning |
//! | `enabled` | true | true + warning |
//! | `cost_per_request` | 0.0 | 0.0 + warning |
//! | `timeout_secs` | 30 | 30 + warning |

use std::collections::HashMap;

use chrono::NaiveTime;
use tracing::warn;
use zonewatch_domain::constants::{
    DEFAULT_INTERVAL_MINUTES, DEFAULT_PROVIDER_COST, DEFAULT_PROVIDER_PRIORITY,
    DEFAULT_PROVIDER_TIMEOUT_SECS, DEFAULT_RANDOM_OFFSET_MINUTES, DEFAULT_ZONE_PURPOSE,
};
use zonewatch_domain::error::{Error, Result};
use zonewatch_domain::value_objects::{
    CredentialRef, ProviderConfig, ProviderKind, ScheduleSpec, ValidationWarning, WarningScope,
    ZoneConfig,
};

use super::tree::{ConfigNode, ScalarValue, deep_merge};

/// Immutable merged configuration snapshot.
///
/// Holds the merged tree plus the typed view derived from it. Only the
/// bridge can build one, so the typed view always matches the tree.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedConfig {
    tree: ConfigNode,
    providers: Vec<ProviderConfig>,
    zones: Vec<ZoneConfig>,
}

impl MergedConfig {
    /// Built-in defaults: no providers, no zones, default zone fields
    pub fn defaults() -> Self {
        let (config, _) = materialize(builtin_tree());
        config
    }

    /// Merged option tree
    pub fn tree(&self) -> &ConfigNode {
        &self.tree
    }

    /// Providers in declaration order, ids unique
    pub fn providers(&self) -> &[ProviderConfig] {
        &self.providers
    }

    /// Provider by id
    pub fn provider(&self, id: &str) -> Option<&ProviderConfig> {
        self.providers.iter().find(|p| p.id == id)
    }

    /// Zones in declaration order, names unique
    pub fn zones(&self) -> &[ZoneConfig] {
        &self.zones
    }

    /// Zone by name
    pub fn zone(&self, name: &str) -> Option<&ZoneConfig> {
        self.zones.iter().find(|z| z.name == name)
    }
}

fn builtin_tree() -> ConfigNode {
    ConfigNode::from(serde_json::json!({
        "providers": [],
        "zones": [],
        "zone_defaults": {
            "interval_minutes": DEFAULT_INTERVAL_MINUTES,
            "random_offset_minutes": DEFAULT_RANDOM_OFFSET_MINUTES,
            "specific_times": [],
            "ignore_rules": []
        }
    }))
}

/// Merge raw option data over `base` and validate the result.
///
/// Fails only when `raw` is not a map; everything else is a warning.
pub fn apply(
    base: &MergedConfig,
    raw: &serde_json::Value,
) -> Result<(MergedConfig, Vec<ValidationWarning>)> {
    let overlay = ConfigNode::from(raw);
    if overlay.as_map().is_none() {
        return Err(Error::config_validation(format!(
            "option data must be a map, got {}",
            overlay.kind_name()
        )));
    }
    Ok(materialize(deep_merge(&base.tree, &overlay)))
}

/// Build a snapshot from built-in defaults plus `raw`
pub fn from_raw(raw: &serde_json::Value) -> Result<(MergedConfig, Vec<ValidationWarning>)> {
    apply(&MergedConfig::defaults(), raw)
}

/// Derive the typed view of `tree`
pub fn materialize(tree: ConfigNode) -> (MergedConfig, Vec<ValidationWarning>) {
    let mut warnings = Vec::new();

    let zone_defaults = match tree.get("zone_defaults") {
        Some(node @ ConfigNode::Map(_)) => node.clone(),
        Some(other) => {
            warnings.push(ValidationWarning::options(format!(
                "zone_defaults must be a map, got {}; ignored",
                other.kind_name()
            )));
            ConfigNode::empty_map()
        }
        None => ConfigNode::empty_map(),
    };

    let zones = collect_entries(
        tree.get("zones"),
        "zones",
        WarningScope::Zone,
        &mut warnings,
        |index, entry, warnings| {
            let entry = deep_merge(&zone_defaults, entry);
            parse_zone(index, &entry, warnings)
        },
        |zone| zone.name.clone(),
    );

    let providers = collect_entries(
        tree.get("providers"),
        "providers",
        WarningScope::Provider,
        &mut warnings,
        parse_provider,
        |provider| provider.id.clone(),
    );

    for warning in &warnings {
        warn!(%warning, "Option data validation warning");
    }

    (
        MergedConfig {
            tree,
            providers,
            zones,
        },
        warnings,
    )
}

/// Walk a list section, parse each map entry, and dedup by key (last wins)
fn collect_entries<T, P, K>(
    section: Option<&ConfigNode>,
    section_name: &str,
    scope: WarningScope,
    warnings: &mut Vec<ValidationWarning>,
    mut parse: P,
    key: K,
) -> Vec<T>
where
    P: FnMut(usize, &ConfigNode, &mut Vec<ValidationWarning>) -> Option<T>,
    K: Fn(&T) -> String,
{
    let items = match section {
        None => return Vec::new(),
        Some(node) if node.is_null() => return Vec::new(),
        Some(ConfigNode::List(items)) => items,
        Some(other) => {
            warnings.push(ValidationWarning::options(format!(
                "{section_name} must be a list, got {}; ignored",
                other.kind_name()
            )));
            return Vec::new();
        }
    };

    let mut entries: Vec<T> = Vec::with_capacity(items.len());
    let mut positions: HashMap<String, usize> = HashMap::new();

    for (index, item) in items.iter().enumerate() {
        if item.as_map().is_none() {
            warnings.push(ValidationWarning::entry(
                scope,
                format!("#{index}"),
                format!("entry must be a map, got {}; skipped", item.kind_name()),
            ));
            continue;
        }
        let Some(parsed) = parse(index, item, warnings) else {
            continue;
        };
        let entry_key = key(&parsed);
        if let Some(&position) = positions.get(&entry_key) {
            warnings.push(ValidationWarning::entry(
                scope,
                entry_key,
                format!("duplicate {scope} entry #{index} replaces the earlier one"),
            ));
            entries[position] = parsed;
        } else {
            positions.insert(entry_key, entries.len());
            entries.push(parsed);
        }
    }

    entries
}

fn parse_zone(
    index: usize,
    entry: &ConfigNode,
    warnings: &mut Vec<ValidationWarning>,
) -> Option<ZoneConfig> {
    let scope = WarningScope::Zone;
    let Some(name) = string_field(entry, "name") else {
        warnings.push(ValidationWarning::entry(
            scope,
            format!("#{index}"),
            "name is missing or empty; skipped",
        ));
        return None;
    };

    let camera_entity = string_field(entry, "camera_entity").unwrap_or_else(|| {
        warnings.push(ValidationWarning::field(
            scope,
            &name,
            "camera_entity",
            "missing; analysis will fail until a camera is set",
        ));
        String::new()
    });

    let interval_minutes = coerce_field(
        entry,
        "interval_minutes",
        DEFAULT_INTERVAL_MINUTES,
        coerce_u64,
        scope,
        &name,
        warnings,
    );
    let random_offset_minutes = coerce_field(
        entry,
        "random_offset_minutes",
        DEFAULT_RANDOM_OFFSET_MINUTES,
        coerce_u64,
        scope,
        &name,
        warnings,
    );

    let specific_times = string_list(entry, "specific_times", &name, warnings)
        .into_iter()
        .filter_map(|raw| match parse_time_of_day(&raw) {
            Some(time) => Some(time),
            None => {
                warnings.push(ValidationWarning::field(
                    scope,
                    &name,
                    "specific_times",
                    format!("'{raw}' is not a time of day (HH:MM); dropped"),
                ));
                None
            }
        })
        .collect::<std::collections::BTreeSet<_>>()
        .into_iter()
        .collect();

    let ignore_rules = string_list(entry, "ignore_rules", &name, warnings);

    Some(ZoneConfig {
        camera_entity,
        todo_list_entity: string_field(entry, "todo_list_entity"),
        purpose: string_field(entry, "purpose")
            .unwrap_or_else(|| DEFAULT_ZONE_PURPOSE.to_string()),
        schedule: ScheduleSpec {
            interval_minutes,
            specific_times,
            random_offset_minutes,
        },
        ignore_rules,
        name,
    })
}

fn parse_provider(
    index: usize,
    entry: &ConfigNode,
    warnings: &mut Vec<ValidationWarning>,
) -> Option<ProviderConfig> {
    let scope = WarningScope::Provider;
    let Some(id) = string_field(entry, "id").or_else(|| string_field(entry, "name")) else {
        warnings.push(ValidationWarning::entry(
            scope,
            format!("#{index}"),
            "id is missing or empty; skipped",
        ));
        return None;
    };

    let kind = match string_field(entry, "kind") {
        None => ProviderKind::default(),
        Some(raw) => match raw.parse::<ProviderKind>() {
            Ok(kind) => kind,
            Err(e) => {
                warnings.push(ValidationWarning::field(scope, &id, "kind", format!("{e}; skipped")));
                return None;
            }
        },
    };

    let timeout_secs = coerce_field(
        entry,
        "timeout_secs",
        DEFAULT_PROVIDER_TIMEOUT_SECS as f64,
        coerce_positive_f64,
        scope,
        &id,
        warnings,
    );

    Some(ProviderConfig {
        kind,
        model: string_field(entry, "model"),
        base_url: string_field(entry, "base_url"),
        credential: string_field(entry, "credential")
            .or_else(|| string_field(entry, "api_key"))
            .map(|reference| CredentialRef::parse(&reference)),
        priority: coerce_field(
            entry,
            "priority",
            DEFAULT_PROVIDER_PRIORITY,
            coerce_i64,
            scope,
            &id,
            warnings,
        ),
        enabled: coerce_field(entry, "enabled", true, coerce_bool, scope, &id, warnings),
        cost_per_request: coerce_field(
            entry,
            "cost_per_request",
            DEFAULT_PROVIDER_COST,
            coerce_non_negative_f64,
            scope,
            &id,
            warnings,
        ),
        timeout_ms: (timeout_secs * 1000.0).round().max(1.0) as u64,
        id,
    })
}

/// Trimmed, non-empty string field
fn string_field(entry: &ConfigNode, key: &str) -> Option<String> {
    entry
        .get(key)
        .and_then(ConfigNode::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Read a numeric/bool field, falling back to `default` with a warning
fn coerce_field<T, C>(
    entry: &ConfigNode,
    key: &str,
    default: T,
    coerce: C,
    scope: WarningScope,
    name: &str,
    warnings: &mut Vec<ValidationWarning>,
) -> T
where
    T: std::fmt::Display,
    C: Fn(&ConfigNode) -> std::result::Result<T, String>,
{
    match entry.get(key) {
        None => default,
        Some(node) if node.is_null() => default,
        Some(node) => coerce(node).unwrap_or_else(|reason| {
            warnings.push(ValidationWarning::field(
                scope,
                name,
                key,
                format!("{reason}; using default {default}"),
            ));
            default
        }),
    }
}

fn coerce_f64(node: &ConfigNode) -> std::result::Result<f64, String> {
    let value = match node.as_scalar() {
        Some(ScalarValue::Integer(i)) => *i as f64,
        Some(ScalarValue::Float(x)) => *x,
        Some(ScalarValue::String(s)) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| format!("'{s}' is not a number"))?,
        Some(other) => return Err(format!("{other} is not a number")),
        None => return Err(format!("expected a number, got {}", node.kind_name())),
    };
    if value.is_finite() {
        Ok(value)
    } else {
        Err("number is not finite".to_string())
    }
}

fn coerce_i64(node: &ConfigNode) -> std::result::Result<i64, String> {
    if let Some(ScalarValue::Integer(i)) = node.as_scalar() {
        return Ok(*i);
    }
    let value = coerce_f64(node)?;
    if value.fract() != 0.0 || value.abs() > 9.0e15 {
        return Err(format!("{value} is not a whole number"));
    }
    Ok(value as i64)
}

fn coerce_u64(node: &ConfigNode) -> std::result::Result<u64, String> {
    let value = coerce_i64(node)?;
    u64::try_from(value).map_err(|_| format!("{value} must not be negative"))
}

fn coerce_non_negative_f64(node: &ConfigNode) -> std::result::Result<f64, String> {
    let value = coerce_f64(node)?;
    if value < 0.0 {
        return Err(format!("{value} must not be negative"));
    }
    Ok(value)
}

fn coerce_positive_f64(node: &ConfigNode) -> std::result::Result<f64, String> {
    let value = coerce_f64(node)?;
    if value <= 0.0 {
        return Err(format!("{value} must be positive"));
    }
    Ok(value)
}

fn coerce_bool(node: &ConfigNode) -> std::result::Result<bool, String> {
    match node.as_scalar() {
        Some(ScalarValue::Bool(b)) => Ok(*b),
        Some(ScalarValue::Integer(0)) => Ok(false),
        Some(ScalarValue::Integer(1)) => Ok(true),
        Some(ScalarValue::String(s)) => match s.trim().to_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Ok(true),
            "false" | "no" | "off" | "0" => Ok(false),
            _ => Err(format!("'{s}' is not a boolean")),
        },
        Some(other) => Err(format!("{other} is not a boolean")),
        None => Err(format!("expected a boolean, got {}", node.kind_name())),
    }
}

/// List of strings; a comma-separated string is accepted as a list
fn string_list(
    entry: &ConfigNode,
    key: &str,
    name: &str,
    warnings: &mut Vec<ValidationWarning>,
) -> Vec<String> {
    match entry.get(key) {
        None => Vec::new(),
        Some(node) if node.is_null() => Vec::new(),
        Some(ConfigNode::List(items)) => items
            .iter()
            .filter_map(|item| match item.as_scalar() {
                Some(ScalarValue::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
                Some(ScalarValue::String(_)) => None,
                _ => {
                    warnings.push(ValidationWarning::field(
                        WarningScope::Zone,
                        name,
                        key,
                        format!("non-string {} item dropped", item.kind_name()),
                    ));
                    None
                }
            })
            .collect(),
        Some(ConfigNode::Scalar(ScalarValue::String(s))) => s
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        Some(other) => {
            warnings.push(ValidationWarning::field(
                WarningScope::Zone,
                name,
                key,
                format!("must be a list, got {}; using empty list", other.kind_name()),
            ));
            Vec::new()
        }
    }
}

/// Parse `HH:MM` or `HH:MM:SS`
pub fn parse_time_of_day(raw: &str) -> Option<NaiveTime> {
    let raw = raw.trim();
    NaiveTime::parse_from_str(raw, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M"))
        .ok()
}
