use httpmock::prelude::*;
use serde_json::json;

use period_planner::{
    AuthContext, Category, CategoryFlags, Direction, Endpoint, Exercise, GatewayError, HttpGateway,
    InMemoryGateway, Period, PeriodEditor, PeriodError, PeriodStore, ScheduledExercise, Selection,
    Timeline, Variant, filter_exercises,
};

fn scheduled(week: u32, id: &str, name: &str, groups: &[&str]) -> ScheduledExercise {
    ScheduledExercise {
        week,
        exercise: Exercise::new(id, name).with_muscle_groups(groups.iter().copied()),
        variant: Variant { percentage: 70.0 },
    }
}

fn plan_schedule() -> Vec<ScheduledExercise> {
    vec![
        scheduled(1, "sq", "Sentadillas", &["pierna", "gluteo"]),
        scheduled(2, "sq", "Sentadillas", &["pierna", "gluteo"]),
        scheduled(3, "dl", "Peso muerto", &["espalda", "pierna"]),
        scheduled(4, "bp", "Press de Banca", &["pecho"]),
        scheduled(6, "run", "Rodaje", &["cardio"]),
    ]
}

#[test]
fn select_create_and_reject_overlap() {
    let store = PeriodStore::new("plan", Timeline::new(12), plan_schedule(), InMemoryGateway::new());
    let mut editor = PeriodEditor::new(store);

    editor.select(2).unwrap();
    let created = match editor.select(5).unwrap() {
        Selection::Created(p) => p,
        other => panic!("unexpected selection: {other:?}"),
    };
    assert_eq!((created.start, created.end), (2, 5));
    assert_eq!(created.name, "Periodo 1");

    editor.select(4).unwrap();
    assert!(matches!(editor.select(6).unwrap(), Selection::Discarded(_)));
    assert_eq!(editor.store().len(), 1);
}

#[test]
fn repeated_exercises_resolve_once() {
    let mut store =
        PeriodStore::new("plan", Timeline::new(12), plan_schedule(), InMemoryGateway::new());
    let p = store.create_period(1, 4).unwrap();
    let ids: Vec<_> = p.exercise_ids().collect();
    assert_eq!(ids, vec!["sq", "dl", "bp"]);
}

#[test]
fn filters_a_period_by_search_and_category() {
    let mut store =
        PeriodStore::new("plan", Timeline::new(12), plan_schedule(), InMemoryGateway::new());
    store.create_period(1, 6).unwrap();
    let exercises = &store.periods()[0].exercises;

    let found = filter_exercises(exercises, "sent", &CategoryFlags::default());
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].exercise.id, "sq");

    let mut flags = CategoryFlags::default();
    flags.set(Category::UpperBody, true);
    let upper: Vec<_> = filter_exercises(exercises, "", &flags)
        .iter()
        .map(|a| a.exercise.id.as_str())
        .collect();
    assert_eq!(upper, vec!["dl", "bp"]);

    flags.set(Category::Cardio, true);
    assert_eq!(filter_exercises(exercises, "", &flags).len(), 3);
}

#[test]
fn edit_session_over_in_memory_backend() {
    let gateway = InMemoryGateway::with_periods(
        "plan",
        vec![Period {
            id: Some("p123".into()),
            start: 1,
            end: 2,
            name: "Adaptación".into(),
            exercises: Vec::new(),
        }],
    );
    let mut store = PeriodStore::new("plan", Timeline::new(8), plan_schedule(), gateway);
    store.load_periods().unwrap();
    let mut editor = PeriodEditor::new(store);

    editor.select(3).unwrap();
    editor.select(5).unwrap();
    assert_eq!(editor.store().periods()[1].name, "Periodo 2");

    editor.nudge(1, Endpoint::End, Direction::Shrink).unwrap();
    editor.nudge(1, Endpoint::End, Direction::Shrink).unwrap();
    assert!(editor.nudge(1, Endpoint::End, Direction::Shrink).is_err());
    assert_eq!(editor.store().periods()[1].end, 3);

    editor.start_edit(1).unwrap();
    *editor.draft_mut().unwrap() = "Fuerza".into();
    editor.save().unwrap();

    editor.store().gateway().fail_next();
    let outcome = editor.delete(0).unwrap();
    assert!(!outcome.is_confirmed());

    let store = editor.into_store();
    assert_eq!(store.len(), 1);
    assert_eq!(store.periods()[0].name, "Fuerza");
    assert_eq!(store.gateway().stored("plan").len(), 2);
}

#[test]
fn http_backend_round_trip() {
    let server = MockServer::start();
    let list = server.mock(|when, then| {
        when.method(GET)
            .path("/api/plannings/plan9/periodos")
            .header("Authorization", "Bearer secret");
        then.status(200).json_body(json!({
            "periodos": [{
                "_id": "p1",
                "nombre": "",
                "inicioSemana": 1,
                "finSemana": 2,
                "ejercicios": [null, { "ejercicio": { "_id": "sq", "nombre": "Sentadillas" }, "variante": { "porcentaje": 65 } }]
            }]
        }));
    });
    let create = server.mock(|when, then| {
        when.method(POST).path("/api/plannings/plan9/periodos");
        then.status(201).json_body(json!({ "_id": "p2" }));
    });
    let delete = server.mock(|when, then| {
        when.method(DELETE).path("/api/plannings/plan9/periodos/p1");
        then.status(500).body("database down");
    });

    let gateway = HttpGateway::new(&server.url("/api/"), AuthContext::bearer("secret"));
    let mut store = PeriodStore::new("plan9", Timeline::new(10), plan_schedule(), gateway);

    let loaded = store.load_periods().unwrap().to_vec();
    assert_eq!(loaded[0].name, "Periodo sin nombre");
    assert_eq!(loaded[0].exercises.len(), 1);
    assert_eq!(loaded[0].exercises[0].variant.percentage, 65.0);
    store.load_periods().unwrap();
    list.assert_hits(1);

    let p = store.create_period(3, 4).unwrap();
    assert_eq!(p.id.as_deref(), Some("p2"));
    create.assert();

    let outcome = store.delete_period(0).unwrap();
    assert!(matches!(outcome.remote, Err(GatewayError::Status(500, _))));
    assert_eq!(store.len(), 1);
    delete.assert();
}

#[test]
fn missing_token_is_reported_before_any_request() {
    let server = MockServer::start();
    let any = server.mock(|when, then| {
        when.method(GET).path("/plannings/plan/periodos");
        then.status(200).json_body(json!({ "periodos": [] }));
    });

    let gateway = HttpGateway::new(&server.base_url(), AuthContext::new(None));
    let mut store = PeriodStore::new("plan", Timeline::new(4), Vec::new(), gateway);
    match store.load_periods() {
        Err(PeriodError::Gateway(e)) => assert!(e.is_authentication()),
        other => panic!("unexpected result: {other:?}"),
    }
    assert!(store.last_error().is_some());
    any.assert_hits(0);
}
