use anyhow::{anyhow, bail};
use indexmap::IndexMap;
use serde_json::{json, Map, Number, Value};
use tracing::debug;

/// Fields whose values stay text even when they look numeric.
const TEXTUAL_FIELDS: [&str; 13] = [
    "estimation_system",
    "building_type",
    "building_name",
    "building_address_county",
    "building_address_town",
    "ec_heating_comm",
    "id",
    "ac_operation",
    "ac_type",
    "ec_heating",
    "nonresidential_energy_section_type",
    "type",
    "energy_rating",
];

/// Multi-select fields, submitted as one list entry per selected option.
const MULTI_SELECT_FIELDS: [&str; 2] = ["elevator_es", "escalator_es"];

const SECTION_FACILITIES: [&str; 8] = [
    "hotel",
    "hospital",
    "sportbathroom",
    "swimmingpool",
    "spa",
    "diningarea",
    "exhibitionarea",
    "performancearea",
];

/// Exclusive section fields the typed input reads; the form also submits occupancy details of
/// hotels and hospitals there, which are entered on the common sections instead.
const EXCLUSIVE_SECTION_FIELDS: [&str; 3] = ["id", "a", "coef_usage_h"];

/// Key prefix, the collection it fills and the field implied by the prefix itself.
const ENTITY_PREFIXES: [(&str, &str, Option<&str>); 9] = [
    ("es-id-", "energy_section", Some("id")),
    ("es-attr-", "energy_section", None),
    ("es-exclusive-id-", "exclusive_energy_section", Some("id")),
    ("es-exclusive-attr-", "exclusive_energy_section", None),
    ("nonresidential-es-attr-", "nonresidential_energy_section", None),
    ("elevator-attr-", "elevator", None),
    ("escalator-attr-", "escalator", None),
    ("watertower-attr-", "watertower", None),
    ("heater-attr-", "heater", None),
];

const PARKING_GARAGE_PREFIX: &str = "parkinggarage-attr-";

const CONSUMPTION_KEYS: [&str; 2] = ["ec_input_type", "ec"];

type Entities = IndexMap<u32, Map<String, Value>>;

/// Turns a flat web-form submission, where every field arrives as a list of strings, into the
/// nested shape of a building input.
pub(crate) fn unflatten_form(form: Map<String, Value>) -> anyhow::Result<Value> {
    let mut building = Map::new();
    let mut collections: IndexMap<&'static str, Entities> = IndexMap::new();
    let mut consumption: IndexMap<String, Vec<String>> = IndexMap::new();
    let mut coordinate: (Option<f64>, Option<f64>) = (None, None);

    for (key, raw) in form {
        let values = form_values(&key, raw)?;

        if key.starts_with("form-") {
            continue;
        }

        if CONSUMPTION_KEYS.contains(&key.as_str())
            || key.starts_with("ec_monthly_")
            || key.starts_with("ec_bimonthly_")
        {
            consumption.insert(key, values);
            continue;
        }

        match key.as_str() {
            "building_longitude" => {
                coordinate.0 = coordinate_value(&key, &values)?;
                continue;
            }
            "building_latitude" => {
                coordinate.1 = coordinate_value(&key, &values)?;
                continue;
            }
            _ => {}
        }

        if let Some((collection, index, path)) = entity_key(&key)? {
            if collection == "exclusive_energy_section"
                && path.len() == 1
                && !EXCLUSIVE_SECTION_FIELDS.contains(&path[0].as_str())
            {
                debug!("Skipping form field {key} of an exclusive section");
                continue;
            }

            let Some(value) = field_value(&path[path.len() - 1], values) else {
                continue;
            };
            let entity = collections
                .entry(collection)
                .or_default()
                .entry(index)
                .or_default();
            match path.as_slice() {
                [field] => {
                    entity.insert(field.clone(), value);
                }
                [facility, field] => {
                    entity
                        .entry(facility.clone())
                        .or_insert_with(|| Value::Object(Map::new()))
                        .as_object_mut()
                        .ok_or_else(|| anyhow!("Form field {key} clashes with a plain field"))?
                        .insert(field.clone(), value);
                }
                _ => unreachable!("entity keys have one or two path segments"),
            }
            continue;
        }

        if let Some(value) = field_value(&key, values) {
            building.insert(key, value);
        }
    }

    match coordinate {
        (Some(longitude), Some(latitude)) => {
            building.insert("building_coordinate".into(), json!([longitude, latitude]));
        }
        (None, None) => {}
        _ => bail!("Both building_longitude and building_latitude are needed for a coordinate"),
    }

    if let Some(ec) = consumption_value(consumption)? {
        building.insert("ec".into(), ec);
    }

    for (collection, mut entities) in collections {
        entities.sort_keys();
        building.insert(
            collection.into(),
            Value::Array(entities.into_values().map(Value::Object).collect()),
        );
    }

    Ok(Value::Object(building))
}

fn form_values(key: &str, raw: Value) -> anyhow::Result<Vec<String>> {
    let items = match raw {
        Value::Array(items) => items,
        other => vec![other],
    };

    items
        .into_iter()
        .map(|item| match item {
            Value::String(text) => Ok(text),
            Value::Number(number) => Ok(number.to_string()),
            Value::Bool(flag) => Ok(if flag { "True" } else { "False" }.to_string()),
            Value::Null => Ok(String::new()),
            _ => Err(anyhow!("Form field {key} holds a nested value")),
        })
        .collect()
}

/// Splits an entity key into its collection, numeric index and field path.
fn entity_key(key: &str) -> anyhow::Result<Option<(&'static str, u32, Vec<String>)>> {
    let (collection, rest, implied_field) = match ENTITY_PREFIXES
        .iter()
        .find_map(|(prefix, collection, implied_field)| {
            key.strip_prefix(prefix)
                .map(|rest| (*collection, rest, *implied_field))
        }) {
        Some(found) => found,
        None => match key.strip_prefix(PARKING_GARAGE_PREFIX) {
            Some(rest) => ("parkinggarage", rest, None),
            None => return Ok(None),
        },
    };

    let (index, field) = match implied_field {
        Some(field) => (rest, field),
        None => rest
            .split_once('-')
            .ok_or_else(|| anyhow!("Form field {key} names no attribute"))?,
    };
    let index: u32 = index
        .parse()
        .map_err(|_| anyhow!("Form field {key} has a non-numeric index {index:?}"))?;

    let path = match field.split_once('-') {
        Some((facility, facility_field))
            if collection == "energy_section" && SECTION_FACILITIES.contains(&facility) =>
        {
            vec![facility.to_string(), facility_field.to_string()]
        }
        Some(("datacenter", facility_field)) if collection == "exclusive_energy_section" => {
            vec!["datacenter".to_string(), facility_field.to_string()]
        }
        Some(_) => bail!("Form field {key} names an unknown facility"),
        None => vec![field.to_string()],
    };

    Ok(Some((collection, index, path)))
}

/// Typed value of one field, `None` when the form left it empty.
fn field_value(field: &str, values: Vec<String>) -> Option<Value> {
    if MULTI_SELECT_FIELDS.contains(&field) {
        return Some(Value::Array(
            values
                .into_iter()
                .filter(|value| !value.trim().is_empty())
                .map(Value::String)
                .collect(),
        ));
    }

    let value = values.into_iter().find(|value| !value.trim().is_empty())?;
    let value = value.trim();

    Some(match value {
        "True" | "true" => Value::Bool(true),
        "False" | "false" => Value::Bool(false),
        _ if TEXTUAL_FIELDS.contains(&field) => Value::String(value.to_string()),
        _ => number_value(value).unwrap_or_else(|| Value::String(value.to_string())),
    })
}

fn number_value(text: &str) -> Option<Value> {
    if let Ok(integer) = text.parse::<i64>() {
        return Some(Value::Number(integer.into()));
    }
    text.parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
}

fn coordinate_value(key: &str, values: &[String]) -> anyhow::Result<Option<f64>> {
    match values.iter().find(|value| !value.trim().is_empty()) {
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| anyhow!("Form field {key} is not a number: {value:?}")),
        None => Ok(None),
    }
}

fn reading(key: &str, value: &str) -> anyhow::Result<f64> {
    value
        .trim()
        .parse()
        .map_err(|_| anyhow!("Consumption reading {key} is not a number: {value:?}"))
}

/// Readings under `prefix`, ordered by their index.
fn readings(consumption: &IndexMap<String, Vec<String>>, prefix: &str) -> anyhow::Result<Vec<f64>> {
    let mut indexed = consumption
        .iter()
        .filter_map(|(key, values)| {
            let index = key.strip_prefix(prefix)?;
            let value = values.iter().find(|value| !value.trim().is_empty())?;
            Some((key, index, value))
        })
        .map(|(key, index, value)| {
            let index: u32 = index
                .parse()
                .map_err(|_| anyhow!("Consumption reading {key} has a non-numeric index"))?;
            Ok((index, reading(key, value)?))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;
    indexed.sort_by_key(|(index, _)| *index);

    Ok(indexed.into_iter().map(|(_, value)| value).collect())
}

fn consumption_value(consumption: IndexMap<String, Vec<String>>) -> anyhow::Result<Option<Value>> {
    let input_type = consumption
        .get("ec_input_type")
        .and_then(|values| values.iter().find(|value| !value.trim().is_empty()))
        .map(|value| value.trim().to_lowercase())
        .unwrap_or_else(|| "direct".to_string());

    Ok(match input_type.as_str() {
        "direct" => match consumption
            .get("ec")
            .and_then(|values| values.iter().find(|value| !value.trim().is_empty()))
        {
            Some(value) => Some(json!(reading("ec", value)?)),
            None => None,
        },
        "monthly" => Some(json!({"monthly": readings(&consumption, "ec_monthly_")?})),
        "bimonthly" => Some(json!({"bimonthly": readings(&consumption, "ec_bimonthly_")?})),
        other => bail!("Unknown consumption input type {other:?}"),
    })
}
