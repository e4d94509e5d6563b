use anyhow::Result;
use mimic_parquet::{
    bulk::convert_all,
    config::BulkConfig,
    process::parquet::{read_parquet, SUCCESS_MARKER},
    session::{ConversionSession, SessionSettings},
};
use std::fs;
use tempfile::tempdir;

#[test]
fn failed_tables_do_not_stop_the_batch() -> Result<()> {
    let tmp = tempdir()?;
    let csv_dir = tmp.path().join("csv");
    let parquet_dir = tmp.path().join("parquet");
    fs::create_dir_all(&csv_dir)?;

    fs::write(
        csv_dir.join("PATIENTS.csv"),
        "row_id,subject_id,gender\n1,10,M\n,,\n2,11,F\n",
    )?;
    // ragged row
    fs::write(csv_dir.join("ADMISSIONS.csv"), "row_id,hadm_id\n1,2,3\n")?;
    // MISSING.csv is absent
    fs::write(
        csv_dir.join("ICUSTAYS.csv"),
        "row_id,intime\n1,2101-10-20 19:10:11\n",
    )?;

    let cfg = BulkConfig {
        csv_dir,
        parquet_dir: parquet_dir.clone(),
        tables: vec![
            "PATIENTS".into(),
            "ADMISSIONS".into(),
            "MISSING".into(),
            "ICUSTAYS".into(),
        ],
        rows_per_file: 1,
    };
    let session = ConversionSession::open("test", SessionSettings::default());
    let report = convert_all(&session, &cfg)?;
    session.close();

    let failed: Vec<&str> = report.failed.iter().map(|(t, _)| t.as_str()).collect();
    assert_eq!(failed, vec!["ADMISSIONS", "MISSING"]);
    assert!(!report.is_complete());

    let patients = &report.converted[0];
    assert_eq!(patients.rows, 2);
    assert_eq!(patients.dropped_rows, 1);
    assert_eq!(patients.output_dir, parquet_dir.join("patients"));
    assert!(parquet_dir.join("patients").join(SUCCESS_MARKER).exists());
    assert!(parquet_dir.join("patients").join("part-00001.parquet").exists());
    assert!(parquet_dir.join("icustays").join(SUCCESS_MARKER).exists());
    assert!(!parquet_dir.join("admissions").exists());

    let ds = read_parquet(parquet_dir.join("patients"))?;
    assert_eq!(ds.num_rows(), 2);
    assert_eq!(
        ds.schema_summary(),
        "row_id: Int64\nsubject_id: Int64\ngender: Utf8\n"
    );
    let icu = read_parquet(parquet_dir.join("icustays"))?;
    assert_eq!(
        icu.schema_summary(),
        "row_id: Int64\nintime: Timestamp(Microsecond, None)\n"
    );
    Ok(())
}

#[test]
fn rerun_overwrites_previous_output() -> Result<()> {
    let tmp = tempdir()?;
    let csv_dir = tmp.path().to_path_buf();
    let parquet_dir = tmp.path().join("parquet");
    let cfg = BulkConfig {
        csv_dir: csv_dir.clone(),
        parquet_dir: parquet_dir.clone(),
        tables: vec!["ICUSTAYS".into()],
        rows_per_file: 1,
    };
    let session = ConversionSession::open("test", SessionSettings::default());

    fs::write(csv_dir.join("ICUSTAYS.csv"), "a\n1\n2\n3\n")?;
    convert_all(&session, &cfg)?;
    fs::write(csv_dir.join("ICUSTAYS.csv"), "a\n9\n")?;
    convert_all(&session, &cfg)?;
    session.close();

    let out = parquet_dir.join("icustays");
    assert!(!out.join("part-00001.parquet").exists());
    assert_eq!(read_parquet(&out)?.num_rows(), 1);
    Ok(())
}
