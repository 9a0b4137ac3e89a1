//! Translation between the backend's period documents and the local model.
//!
//! The backend names fields in Spanish (`inicioSemana`, `finSemana`,
//! `nombre`, `ejercicios`, `variante.porcentaje`) while requests are sent
//! with the local names. Decoding walks `serde_json::Value` by hand so that
//! missing or oddly typed fields are skipped instead of failing the whole
//! response.

use serde_json::{Value, json};

use crate::gateway::GatewayError;
use crate::model::{Exercise, ExerciseAssignment, Period, UNNAMED_PERIOD, Variant};
use crate::resolver::dedup_assignments;

fn field<'a>(v: &'a Value, names: &[&str]) -> Option<&'a Value> {
    names.iter().find_map(|n| v.get(*n)).filter(|v| !v.is_null())
}

fn as_text(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn as_week(v: &Value) -> Option<u32> {
    match v {
        Value::Number(n) => n.as_u64().and_then(|w| u32::try_from(w).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn as_number(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// A list field that the backend sends either as an array or as one string.
fn as_list(v: Option<&Value>) -> Vec<String> {
    match v {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(as_text)
            .filter(|s| !s.trim().is_empty())
            .collect(),
        Some(Value::String(s)) if !s.trim().is_empty() => vec![s.clone()],
        _ => Vec::new(),
    }
}

fn id_of(v: &Value) -> Option<String> {
    field(v, &["id", "_id"]).and_then(as_text)
}

pub fn exercise_from_value(v: &Value) -> Option<Exercise> {
    if let Value::String(id) = v {
        return (!id.is_empty()).then(|| Exercise::new(id.clone(), ""));
    }
    if !v.is_object() {
        return None;
    }
    let id = id_of(v)?;
    let text = |names: &[&str]| field(v, names).and_then(as_text).unwrap_or_default();
    Some(Exercise {
        name: text(&["nombre", "name"]),
        description: text(&["descripcion", "description"]),
        muscle_groups: as_list(field(
            v,
            &["grupoMuscular", "gruposMusculares", "muscleGroups", "muscle_groups"],
        )),
        equipment: as_list(field(v, &["equipamiento", "equipo", "equipment"])),
        id,
    })
}

/// Decode one `ejercicios` entry. Null entries and entries without a usable
/// exercise are dropped.
pub fn assignment_from_value(v: &Value) -> Option<ExerciseAssignment> {
    let exercise = exercise_from_value(field(v, &["ejercicio", "exercise"])?)?;
    let percentage = field(v, &["variante", "variant"])
        .and_then(|variant| field(variant, &["porcentaje", "percentage"]))
        .and_then(as_number)
        .filter(|p| p.is_finite())
        .unwrap_or_default();
    Some(ExerciseAssignment {
        exercise,
        variant: Variant { percentage },
    })
}

/// Decode a single period document. Returns `None` when the week range is
/// missing or inverted.
pub fn period_from_value(v: &Value) -> Option<Period> {
    let start = field(v, &["inicioSemana", "start"]).and_then(as_week)?;
    let end = field(v, &["finSemana", "end"]).and_then(as_week)?;
    if start == 0 || start > end {
        return None;
    }
    let name = field(v, &["nombre", "name"])
        .and_then(as_text)
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| UNNAMED_PERIOD.to_string());
    let exercises = match field(v, &["ejercicios", "exercises"]) {
        Some(Value::Array(items)) => {
            dedup_assignments(items.iter().filter_map(assignment_from_value).collect())
        }
        _ => Vec::new(),
    };
    Some(Period {
        id: id_of(v),
        start,
        end,
        name,
        exercises,
    })
}

/// Decode the body of `GET /plannings/{id}/periodos`.
pub fn periods_from_response(body: &Value) -> Result<Vec<Period>, GatewayError> {
    let items = match body {
        Value::Array(items) => items,
        _ => match field(body, &["periodos", "periods"]) {
            Some(Value::Array(items)) => items,
            Some(_) => return Err(GatewayError::Decode("`periodos` is not an array".into())),
            None => return Ok(Vec::new()),
        },
    };
    let mut periods = Vec::with_capacity(items.len());
    for item in items {
        match period_from_value(item) {
            Some(p) => periods.push(p),
            None => log::warn!("Skipping malformed period document: {item}"),
        }
    }
    Ok(periods)
}

/// Decode the body returned by `POST /plannings/{id}/periodos`.
///
/// Backends that only echo an id get the submitted period back with that id.
pub fn created_period_from_response(body: &Value, submitted: &Period) -> Result<Period, GatewayError> {
    let doc = field(body, &["periodo", "period"]).unwrap_or(body);
    if let Some(p) = period_from_value(doc) {
        return Ok(p);
    }
    match id_of(doc) {
        Some(id) => Ok(Period {
            id: Some(id),
            ..submitted.clone()
        }),
        None => Err(GatewayError::Decode(
            "create response carries no period or id".into(),
        )),
    }
}

/// Request body for creating a period, using local field names.
pub fn create_body(period: &Period) -> Value {
    json!({
        "start": period.start,
        "end": period.end,
        "name": period.name,
        "exercises": period.exercises,
    })
}
