use crate::error::{RecordError, SkipReason};
use crate::ir::{AREA_GROUP_TYPE, GroupRecord, LOCALE_GROUP_TYPE, Member, NodeKind};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashSet;
use std::io::{self, Read};
use std::path::Path;

static MAG_LOCALE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(~?)(CT|NS|UC|HQ)\s+MAG$").unwrap());

const AREA_NAMES: [&str; 3] = ["CENTRAL", "NORTH", "UNICHURCH"];

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawGroup {
    id: Option<i64>,
    name: Option<String>,
    parent_group_id: Option<i64>,
    group_type_id: Option<i64>,
    kind: Option<String>,
    members: Option<Vec<RawMember>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawMember {
    id: Option<i64>,
    role: Option<String>,
    person: Option<RawPerson>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawPerson {
    full_name: Option<String>,
}

/// Parses a group payload. Accepts `{"groups": [...]}` or a bare array.
///
/// Individual records that cannot be used are logged and skipped; only a
/// payload that is not JSON, or has no group list at all, is an error.
pub fn parse_groups(input: &str) -> Result<Vec<GroupRecord>, RecordError> {
    let value: Value = serde_json::from_str(input)?;
    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("groups") {
            Some(Value::Array(items)) => items,
            Some(other) => {
                return Err(RecordError::UnexpectedShape {
                    found: json_type_name(&other),
                });
            }
            None => return Err(RecordError::UnexpectedShape { found: "object" }),
        },
        other => {
            return Err(RecordError::UnexpectedShape {
                found: json_type_name(&other),
            });
        }
    };

    let mut records = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        match record_from_value(item) {
            Ok(record) => records.push(record),
            Err(reason) => tracing::warn!(index, %reason, "skipping group record"),
        }
    }
    Ok(records)
}

fn record_from_value(value: Value) -> Result<GroupRecord, SkipReason> {
    if !value.is_object() {
        return Err(SkipReason::NotAnObject);
    }
    let fallback_id = value.get("Id").and_then(Value::as_i64);
    let raw: RawGroup = serde_json::from_value(value).map_err(|err| match fallback_id {
        Some(id) => SkipReason::Malformed {
            id,
            detail: err.to_string(),
        },
        None => SkipReason::MissingId,
    })?;

    let id = raw.id.ok_or(SkipReason::MissingId)?;
    let name = raw.name.ok_or(SkipReason::MissingName { id })?;
    let kind = raw.kind.as_deref().and_then(NodeKind::from_name);
    if kind.is_none() && raw.group_type_id.is_none() {
        return Err(SkipReason::MissingKind { id });
    }

    let members = raw
        .members
        .unwrap_or_default()
        .into_iter()
        .map(|member| Member {
            id: member.id.unwrap_or_default(),
            role: member.role,
            full_name: member.person.and_then(|person| person.full_name),
        })
        .collect();

    Ok(GroupRecord {
        id,
        name,
        parent_id: raw.parent_group_id,
        group_type_id: raw.group_type_id,
        kind,
        members,
    })
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Promotes `<LOCATION> MAG` groups to locales and their named campus
/// children to areas, regardless of the group type the source reported.
pub fn normalize_group_types(records: Vec<GroupRecord>) -> Vec<GroupRecord> {
    let mag_locales: HashSet<i64> = records
        .iter()
        .filter(|record| MAG_LOCALE_RE.is_match(&record.name.to_uppercase()))
        .map(|record| record.id)
        .collect();

    records
        .into_iter()
        .map(|mut record| {
            let name = record.name.to_uppercase();
            if mag_locales.contains(&record.id) {
                record.group_type_id = Some(LOCALE_GROUP_TYPE);
                record.kind = None;
            } else if AREA_NAMES.contains(&name.as_str())
                && record
                    .parent_id
                    .map(|parent| mag_locales.contains(&parent))
                    .unwrap_or(false)
            {
                record.group_type_id = Some(AREA_GROUP_TYPE);
                record.kind = None;
            }
            record
        })
        .collect()
}

/// Area and locale boxes only list leaders; plain members are dropped.
pub fn strip_member_roles(records: Vec<GroupRecord>) -> Vec<GroupRecord> {
    records
        .into_iter()
        .map(|mut record| {
            if matches!(record.node_kind(), NodeKind::Area | NodeKind::Locale) {
                record
                    .members
                    .retain(|member| member.role.as_deref() != Some("Member"));
            }
            record
        })
        .collect()
}

/// Parses, normalizes and strips in one go.
pub fn prepare_groups(input: &str) -> Result<Vec<GroupRecord>, RecordError> {
    let records = parse_groups(input)?;
    Ok(strip_member_roles(normalize_group_types(records)))
}

/// Reads a group payload from `path`, or stdin when `path` is `None` or `-`.
pub fn load_groups(path: Option<&Path>) -> anyhow::Result<Vec<GroupRecord>> {
    let input = match path {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path)?,
        _ => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };
    Ok(prepare_groups(&input)?)
}
