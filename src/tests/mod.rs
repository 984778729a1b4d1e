mod test_new_building;

use crate::errors::BersError;
use crate::output::Output;
use crate::{run_project, CoefficientTables, ProjectFlags, ScoreLevel};
use indexmap::IndexMap;
use pretty_assertions::assert_eq;
use rstest::*;
use serde_json::{json, Value};
use std::cell::RefCell;
use std::fs::File;
use std::io::Write;
use std::rc::Rc;
use walkdir::WalkDir;

/// Output keeping every written document in memory, keyed by `{location_key}.{extension}`.
#[derive(Debug, Default)]
pub(crate) struct MemoryOutput {
    files: RefCell<IndexMap<String, Rc<RefCell<Vec<u8>>>>>,
}

impl MemoryOutput {
    pub(crate) fn contents(&self, file_name: &str) -> Option<String> {
        self.files
            .borrow()
            .get(file_name)
            .map(|buffer| String::from_utf8(buffer.borrow().clone()).unwrap())
    }

    pub(crate) fn file_names(&self) -> Vec<String> {
        self.files.borrow().keys().cloned().collect()
    }
}

struct SharedBuffer(Rc<RefCell<Vec<u8>>>);

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl Output for &MemoryOutput {
    fn writer_for_location_key(
        &self,
        location_key: &str,
        extension: &str,
    ) -> anyhow::Result<impl Write> {
        let buffer = Rc::new(RefCell::new(vec![]));
        self.files
            .borrow_mut()
            .insert(format!("{location_key}.{extension}"), Rc::clone(&buffer));
        Ok(SharedBuffer(buffer))
    }
}

/// A 1000 m2 department store in Taipei with one elevator.
pub(crate) fn office_input() -> Value {
    json!({
        "estimation_system": "BERSe",
        "building_type": "B2",
        "building_name": "department store",
        "building_coordinate": [121.538, 25.028],
        "building_n_stories_above_ground": 4,
        "building_n_stories_below_ground": 2,
        "ec": 300000,
        "energy_section": [
            {"id": "B2", "a": 1000, "ac_operation": "CONTINUE"}
        ],
        "elevator": [
            {
                "elevator_bottom_floor": -2,
                "elevator_top_floor": 4,
                "elevator_es": ["B2"],
                "coef_people_per_elevator": 8,
                "coef_load_per_elevator": 600,
                "coef_speed": 105
            }
        ]
    })
}

fn run(input: &Value, output: &MemoryOutput, flags: ProjectFlags) -> anyhow::Result<crate::EstimationResult> {
    run_project(input.to_string().as_bytes(), output, None, &flags)
}

#[rstest]
fn test_run_project_writes_results_and_scoring_curve() {
    let output = MemoryOutput::default();

    let result = run(&office_input(), &output, ProjectFlags::empty()).unwrap();

    assert_eq!(
        output.file_names(),
        vec!["results.json".to_string(), "scoring_curve.csv".to_string()]
    );
    let written: crate::EstimationResult =
        serde_json::from_str(&output.contents("results.json").unwrap()).unwrap();
    assert_eq!(written, result);
    assert!(output
        .contents("scoring_curve.csv")
        .unwrap()
        .starts_with("element,label,start,end"));
}

#[rstest]
fn test_department_store_estimates_end_to_end() {
    let mut input = office_input();
    input["ec"] = json!(95169);
    input["ec_other"] = json!(0);
    let output = MemoryOutput::default();

    let result = run(&input, &output, ProjectFlags::empty()).unwrap();

    assert!(result.est_eui.is_finite());
    assert!(result.est_eui_min <= result.est_eui_g);
    assert!(result.est_eui_g <= result.est_eui_m);
    assert!(result.est_eui_m <= result.est_eui_max);
    assert!((0. ..=100.).contains(&result.est_score));
    assert!(["1+", "1", "2", "3", "4", "5", "6", "7"]
        .contains(&result.est_score_level.to_string().as_str()));

    let written: crate::EstimationResult =
        serde_json::from_str(&output.contents("results.json").unwrap()).unwrap();
    assert_eq!(written, result);
}

#[rstest]
fn test_run_project_writes_breakdown_when_asked() {
    let output = MemoryOutput::default();

    run(&office_input(), &output, ProjectFlags::BREAKDOWN).unwrap();

    let breakdown: Value =
        serde_json::from_str(&output.contents("breakdown.json").unwrap()).unwrap();
    assert_eq!(breakdown["est_a_es_comm"], json!(1000.0));
    assert_eq!(breakdown["energy_section"][0]["id"], json!("B2"));
    assert_eq!(breakdown["energy_section"][0]["SO_r"], json!(1.0));
}

#[rstest]
fn test_run_project_reads_form_submissions() {
    let form = json!({
        "estimation_system": ["BERSe"],
        "building_type": ["B2"],
        "building_longitude": ["121.538"],
        "building_latitude": ["25.028"],
        "ec_input_type": ["direct"],
        "ec": ["300000"],
        "es-id-1": ["B2"],
        "es-attr-1-a": ["1000"],
        "es-attr-1-ac_operation": ["CONTINUE"],
        "es-attr-1-ac_type": [""]
    });
    let output = MemoryOutput::default();

    let from_form = run(&form, &output, ProjectFlags::FORM_INPUT).unwrap();

    let mut nested = office_input();
    nested["elevator"] = json!([]);
    let from_nested = run(&nested, &MemoryOutput::default(), ProjectFlags::empty()).unwrap();
    assert_eq!(from_form, from_nested);
}

#[rstest]
fn test_unparsable_input_is_an_invalid_request() {
    let output = MemoryOutput::default();

    let error = run_project("{\"estimation_system\": ".as_bytes(), &output, None, &ProjectFlags::empty())
        .unwrap_err();

    assert!(matches!(
        error.downcast_ref::<BersError>(),
        Some(BersError::InvalidRequest(_))
    ));
    assert!(output.file_names().is_empty());
}

#[rstest]
fn test_engine_failures_are_classified() {
    let mut input = office_input();
    input["exclusive_energy_section"] = json!([{"id": "N11", "a": 10}]);
    let output = MemoryOutput::default();

    let error = run(&input, &output, ProjectFlags::empty()).unwrap_err();

    match error.downcast_ref::<BersError>() {
        Some(BersError::FailureInEstimation(error)) => assert!(error.is_usage()),
        other => panic!("unexpected error {other:?}"),
    }
    assert!(output.file_names().is_empty());
}

#[rstest]
fn test_results_do_not_depend_on_output() {
    let first = run(&office_input(), &MemoryOutput::default(), ProjectFlags::empty()).unwrap();
    let second = run_project(
        office_input().to_string().as_bytes(),
        crate::output::SinkOutput,
        Some(CoefficientTables::bundled()),
        &ProjectFlags::BREAKDOWN,
    )
    .unwrap();

    assert_eq!(first, second);
}

#[rstest]
fn test_level_matches_score_for_every_demo() {
    for entry in WalkDir::new("./demos/input")
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| {
            !e.file_type().is_dir() && e.file_name().to_str().unwrap().ends_with("json")
        })
    {
        let flags = if entry.path().to_str().unwrap().contains("form") {
            ProjectFlags::FORM_INPUT
        } else {
            ProjectFlags::empty()
        };
        let result = run_project(
            File::open(entry.path()).unwrap(),
            crate::output::SinkOutput,
            None,
            &flags,
        );
        assert!(
            result.is_ok(),
            "error was {:?} when estimating file {}",
            result.as_ref().err(),
            entry.file_name().to_str().unwrap()
        );
        let result = result.unwrap();
        assert!((0. ..=100.).contains(&result.est_score));
        assert_eq!(result.est_score_level, ScoreLevel::from_score(result.est_score));
    }
}
