use std::process::ExitCode;

use anyhow::Context;
use log::error;
use machine_learning::training::{ExportJob, ExportReport};

const DATA_PATH: &str = "Clean_Dataset.csv";
const MODEL_PATH: &str = "artifacts/model.json";
const ENCODERS_PATH: &str = "artifacts/encoders.json";

fn export() -> anyhow::Result<ExportReport> {
    ExportJob::new(DATA_PATH, MODEL_PATH, ENCODERS_PATH)
        .run_with(|stage| println!("{stage}"))
        .with_context(|| format!("failed to export a model from {DATA_PATH}"))
}

/// Returns the closing lines printed after the progress stages, and whether the export succeeded.
fn summary(result: &anyhow::Result<ExportReport>) -> (Vec<String>, bool) {
    match result {
        Ok(report) => (
            vec![
                "Done! Model and encoders saved.".to_string(),
                format!("Model R2 Score: {:.4}", report.r2),
            ],
            true,
        ),
        Err(e) => (vec![format!("Error: {e:#}")], false),
    }
}

fn main() -> ExitCode {
    env_logger::init();

    let result = export();
    if let Err(e) = &result {
        error!("{e:#}");
    }

    // Progress and outcome share stdout.
    let (lines, ok) = summary(&result);
    for line in lines {
        println!("{line}");
    }

    if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
