use anyhow::Result;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tempfile::tempdir;

use invader_directory::config::Config;
use invader_directory::pipeline::{self, RunMode};
use invader_directory::report::FsReportSink;
use invader_directory::types::ReportSink;

fn write_fixture(root: &Path, roster: &str, contact_files: &[(&str, &str)]) -> Result<Config> {
    let contacts_dir = root.join("contacts");
    fs::create_dir_all(&contacts_dir)?;
    let roster_path = root.join("country_hq.txt");
    fs::write(&roster_path, roster)?;
    for (name, body) in contact_files {
        fs::write(contacts_dir.join(name), body)?;
    }

    let mut config = Config::default();
    config.inputs.roster_file = roster_path;
    config.inputs.contacts_dir = contacts_dir;
    config.outputs.output_dir = root.join("output");
    Ok(config)
}

fn sink_for(config: &Config) -> Arc<dyn ReportSink> {
    Arc::new(FsReportSink::new(
        &config.outputs.output_dir,
        &config.matrix_dir(),
    ))
}

const ROSTER: &str = "Country_Name\tCountry_Code\tAliens\tPredators\tDD_Monsters\n\
    HQ_Earth\tUS\tGroupA\tGroupB\tGroupC\n";

#[tokio::test]
async fn flat_report_row_for_bare_contact_name() -> Result<()> {
    let temp = tempdir()?;
    let config = write_fixture(
        temp.path(),
        ROSTER,
        &[("group_a.txt", "GroupA\naliens\tjohn\tjane\tsam\n")],
    )?;

    let summary = pipeline::run(&config, RunMode::Extract, sink_for(&config)).await?;
    assert_eq!(summary.assignments, 3);

    let report = fs::read_to_string(summary.flat_report.unwrap())?;
    let mut lines = report.lines();
    assert_eq!(lines.next(), Some("Country_Code,Invader_Species,Role,Email"));
    assert_eq!(lines.next(), Some("US,aliens,attack_role,john@avengers.com"));
    assert_eq!(lines.next(), Some("US,aliens,defense_role,jane@avengers.com"));
    assert_eq!(lines.next(), Some("US,aliens,healing_role,sam@avengers.com"));
    Ok(())
}

#[tokio::test]
async fn domain_suffix_is_not_doubled() -> Result<()> {
    let temp = tempdir()?;
    let config = write_fixture(
        temp.path(),
        ROSTER,
        &[("group_a.txt", "GroupA\naliens\tjohn@avengers.com\tjane\tsam\n")],
    )?;

    let summary = pipeline::run(&config, RunMode::Extract, sink_for(&config)).await?;
    let report = fs::read_to_string(summary.flat_report.unwrap())?;
    // Identical to the bare-name run: the suffix is appended at most once
    assert!(report.contains("US,aliens,attack_role,john@avengers.com"));
    assert!(!report.contains("avengers.com@avengers.com"));
    Ok(())
}

#[tokio::test]
async fn monster_outside_catalog_yields_no_assignment() -> Result<()> {
    let temp = tempdir()?;
    let config = write_fixture(
        temp.path(),
        ROSTER,
        &[("group_c.txt", "GroupC\nd&d_goblin\tbruce\tnat\twanda\n")],
    )?;

    let summary = pipeline::run(&config, RunMode::Extract, sink_for(&config)).await?;
    assert_eq!(summary.assignments, 0);
    Ok(())
}

#[tokio::test]
async fn monster_assignments_use_species_keys() -> Result<()> {
    let temp = tempdir()?;
    let config = write_fixture(
        temp.path(),
        ROSTER,
        &[(
            "group_c.txt",
            "GroupC\nd&d_vampire\tblade\t\t\nd&d_beholder\t\tstrange\t\n",
        )],
    )?;

    let summary = pipeline::run(&config, RunMode::Extract, sink_for(&config)).await?;
    let report = fs::read_to_string(summary.flat_report.unwrap())?;
    assert!(report.contains("US,d&d_vampire,attack_role,blade@avengers.com"));
    assert!(report.contains("US,d&d_beholder,defense_role,strange@avengers.com"));
    assert!(!report.contains("dd_monsters"));
    Ok(())
}

#[tokio::test]
async fn matrices_share_global_universe_and_render_empty_cells() -> Result<()> {
    let temp = tempdir()?;
    let config = write_fixture(
        temp.path(),
        ROSTER,
        &[
            ("group_a.txt", "GroupA\naliens\tjohn\tjane\tjohn\n"),
            ("group_b.txt", "GroupB\npredators\tpeter\tjane\t\n"),
        ],
    )?;

    let summary = pipeline::run(&config, RunMode::Matrices, sink_for(&config)).await?;
    assert_eq!(summary.identities, 3);
    assert_eq!(summary.matrix_files.len(), 3);
    assert!(summary.flat_report.is_none());

    let matrix_dir = config.matrix_dir();
    let john = fs::read_to_string(matrix_dir.join("john.csv"))?;
    let mut lines = john.lines();
    assert_eq!(lines.next(), Some("john,aliens,predators"));
    assert_eq!(lines.next(), Some("GroupA,AH,"));
    assert_eq!(lines.next(), Some("GroupB,,"));

    // peter has no aliens cell, but the universe is the same
    let peter = fs::read_to_string(matrix_dir.join("peter.csv"))?;
    let mut lines = peter.lines();
    assert_eq!(lines.next(), Some("peter,aliens,predators"));
    assert_eq!(lines.next(), Some("GroupA,,"));
    assert_eq!(lines.next(), Some("GroupB,,A"));
    Ok(())
}

#[tokio::test]
async fn full_run_writes_unique_email_list() -> Result<()> {
    let temp = tempdir()?;
    let config = write_fixture(
        temp.path(),
        ROSTER,
        &[
            ("group_a.txt", "GroupA\naliens\tjohn\tjane\t\n"),
            ("group_b.txt", "GroupB\npredators\tjohn\t\t\n"),
        ],
    )?;

    let summary = pipeline::run(&config, RunMode::Full, sink_for(&config)).await?;
    assert_eq!(summary.identities, 2);

    let emails = fs::read_to_string(summary.unique_emails_file.unwrap())?;
    assert_eq!(emails, "jane@avengers.com\njohn@avengers.com\n");
    Ok(())
}

#[tokio::test]
async fn typo_in_raw_field_is_repaired_everywhere() -> Result<()> {
    let temp = tempdir()?;
    let config = write_fixture(
        temp.path(),
        ROSTER,
        &[("group_a.txt", "GroupA\naliens\tcapatain_marvel\t\t\n")],
    )?;

    let summary = pipeline::run(&config, RunMode::Full, sink_for(&config)).await?;
    let report = fs::read_to_string(summary.flat_report.unwrap())?;
    assert!(report.contains("captain_marvel@avengers.com"));
    assert!(!report.contains("capatain"));

    // The matrix file carries the corrected local-part and the occupied cell
    let matrix = fs::read_to_string(config.matrix_dir().join("captain_marvel.csv"))?;
    assert!(matrix.starts_with("captain_marvel,aliens"));
    assert!(matrix.contains("GroupA,A"));
    Ok(())
}

#[tokio::test]
async fn bad_contact_file_is_skipped_without_aborting() -> Result<()> {
    let temp = tempdir()?;
    let config = write_fixture(
        temp.path(),
        ROSTER,
        &[
            ("bad.txt", "\tno_group_name\naliens\tjohn\n"),
            ("group_a.txt", "GroupA\naliens\tjohn\tjane\tsam\n"),
        ],
    )?;

    let summary = pipeline::run(&config, RunMode::Extract, sink_for(&config)).await?;
    assert_eq!(summary.contact_groups, 1);
    assert_eq!(summary.assignments, 3);
    assert_eq!(summary.errors.len(), 1);
    Ok(())
}

#[tokio::test]
async fn missing_roster_is_fatal() -> Result<()> {
    let temp = tempdir()?;
    let mut config = write_fixture(temp.path(), ROSTER, &[])?;
    config.inputs.roster_file = temp.path().join("missing.txt");

    let result = pipeline::run(&config, RunMode::Extract, sink_for(&config)).await;
    assert!(result.is_err());
    Ok(())
}

#[tokio::test]
async fn run_summary_artifact_is_written() -> Result<()> {
    let temp = tempdir()?;
    let config = write_fixture(
        temp.path(),
        ROSTER,
        &[("group_a.txt", "GroupA\naliens\tjohn\t\t\n")],
    )?;

    pipeline::run(&config, RunMode::Full, sink_for(&config)).await?;

    let summaries: Vec<_> = fs::read_dir(&config.outputs.output_dir)?
        .filter_map(|e| e.ok())
        .filter(|e| {
            let name = e.file_name().to_string_lossy().to_string();
            name.starts_with("run_") && name.ends_with(".json")
        })
        .collect();
    assert_eq!(summaries.len(), 1);

    let body = fs::read_to_string(summaries[0].path())?;
    let summary: serde_json::Value = serde_json::from_str(&body)?;
    assert_eq!(summary["assignments"], 1);
    assert_eq!(summary["identities"], 1);
    Ok(())
}
