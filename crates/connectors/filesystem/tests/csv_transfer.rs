use ferry_common::{Context, JobType};
use ferry_connector::{Extractor, LoaderRegistry};
use ferry_connector_filesystem::{loader::OUTPUT_PATH, register, CsvTable, LOADER_NAME};
use ferry_execution::{ExecutionBridge, ExecutionError, TaskContext};
use std::io::Write;

fn registry() -> LoaderRegistry {
    let mut registry = LoaderRegistry::new();
    register(&mut registry);
    registry
}

#[test]
fn test_copy_csv_through_bridge() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.csv");
    let output = dir.path().join("out.csv");
    {
        let mut file = std::fs::File::create(&input).unwrap();
        writeln!(file, "id,name").unwrap();
        for i in 0..250 {
            writeln!(file, "{i},name-{i}").unwrap();
        }
    }

    let task = TaskContext::new(JobType::Export, LOADER_NAME, registry().get(LOADER_NAME).unwrap())
        .with_connector_job(Context::from_iter([(OUTPUT_PATH, output.to_str().unwrap())]));
    let mut bridge = ExecutionBridge::new(task).unwrap();
    for record in CsvTable::new(input.to_str().unwrap()).extract().unwrap() {
        bridge.push(record.unwrap()).unwrap();
    }
    let summary = bridge.finish().unwrap();

    assert_eq!(summary.records_pushed, 250);
    assert_eq!(summary.records_loaded, 250);
    let written = std::fs::read_to_string(&output).unwrap();
    let lines: Vec<&str> = written.lines().collect();
    assert_eq!(lines.len(), 250);
    assert_eq!(lines[0], "0,name-0");
    assert_eq!(lines[249], "249,name-249");
}

#[test]
fn test_unwritable_output_fails_task() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("missing-dir").join("out.csv");

    let task = TaskContext::new(JobType::Export, LOADER_NAME, registry().get(LOADER_NAME).unwrap())
        .with_connector_job(Context::from_iter([(OUTPUT_PATH, output.to_str().unwrap())]));
    let mut bridge = ExecutionBridge::new(task).unwrap();

    let mut failure = None;
    for i in 0..10 {
        if let Err(e) = bridge.push(ferry_common::Record::Csv(format!("{i},x"))) {
            failure = Some(e);
            break;
        }
    }
    let err = match failure {
        Some(e) => e,
        None => bridge.finish().unwrap_err(),
    };
    assert!(matches!(err, ExecutionError::ConsumerFailed(_) | ExecutionError::LoaderFailure(_)));
    assert!(err.loader_error().unwrap().downcast_ref::<std::io::Error>().is_some());
}
