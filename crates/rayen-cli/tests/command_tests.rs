//! Command runners against the portal replay fixture.

use std::collections::HashMap;
use std::path::PathBuf;

use rayen_cli::commands::{
    run_age, run_analyze, run_extract, run_fill, run_rut, ExtractOptions, FillOptions,
};
use rayen_cli::config::{Settings, ENV_OUTPUT_DIR, ENV_PASSWORD, ENV_USERNAME};
use rayen_core::classify::{AgeBucket, AttentionType, Deficit};
use rayen_core::models::DateRange;
use rayen_core::sheet::{
    load_document, save_document, SheetError, SpreadsheetDocument, WritePolicy,
};
use tempfile::TempDir;

fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../rayen-portal/tests/fixtures/portal.json")
}

fn settings() -> Settings {
    Settings::from_toml(
        r#"
        [portal]
        location = "CESFAM LOS ALERCES"
        username = "enfermera"
        password = "clave"
        "#,
    )
    .unwrap()
}

fn column(doc: &SpreadsheetDocument, header: &str) -> Vec<String> {
    let col = doc.find_column(&[header]).unwrap();
    (0..doc.row_count())
        .map(|row| doc.cell(row, col).as_text())
        .collect()
}

fn extract_into(dir: &TempDir) -> PathBuf {
    let options = ExtractOptions {
        range: DateRange::new(2025, 7, 4, 7).unwrap(),
        replay: fixture_path(),
        output_dir: Some(dir.path().to_path_buf()),
    };
    run_extract(&settings(), &options).unwrap().output
}

#[test]
fn test_extract_writes_named_workbook() {
    let dir = TempDir::new().unwrap();
    let output = extract_into(&dir);

    assert_eq!(
        output.file_name().unwrap(),
        "pacientes_citados_2025_07_04_07.xlsx"
    );
    let doc = load_document(&output).unwrap();
    assert_eq!(doc.row_count(), 3);
    assert_eq!(column(&doc, "RUN")[0], "23.456.789-K");
    assert_eq!(column(&doc, "TIPO DE ATENCIÓN"), ["ASISTE", "NSP", "ASISTE"]);
}

#[test]
fn test_extract_uses_configured_output_dir() {
    let dir = TempDir::new().unwrap();
    let nested = dir.path().join("planillas");
    let mut settings = settings();
    settings.output_dir = Some(nested.clone());

    let options = ExtractOptions {
        range: DateRange::new(2025, 7, 7, 7).unwrap(),
        replay: fixture_path(),
        output_dir: None,
    };
    let outcome = run_extract(&settings, &options).unwrap();

    assert_eq!(outcome.output.parent().unwrap(), nested);
    assert!(outcome.output.exists());
    assert_eq!(outcome.report.records.len(), 1);
}

#[test]
fn test_extract_rejects_wrong_password() {
    let dir = TempDir::new().unwrap();
    let mut settings = settings();
    settings.portal.password = "otra".into();
    let options = ExtractOptions {
        range: DateRange::new(2025, 7, 4, 4).unwrap(),
        replay: fixture_path(),
        output_dir: Some(dir.path().to_path_buf()),
    };

    assert!(run_extract(&settings, &options).is_err());
    assert!(!dir
        .path()
        .join("pacientes_citados_2025_07_04_04.xlsx")
        .exists());
}

#[test]
fn test_fill_to_separate_output() {
    let dir = TempDir::new().unwrap();
    let sheet = extract_into(&dir);
    let before = std::fs::read(&sheet).unwrap();
    let output = dir.path().join("completa.xlsx");

    let outcome = run_fill(
        &settings(),
        &FillOptions {
            sheet: sheet.clone(),
            replay: fixture_path(),
            output: Some(output.clone()),
            policy: WritePolicy::OnlyIfEmpty,
        },
    )
    .unwrap();

    assert_eq!(std::fs::read(&sheet).unwrap(), before);
    assert_eq!(outcome.output, output);
    assert_eq!(outcome.report.analyzed, 1);
    assert_eq!(outcome.stats.get("SEXO"), Some(3));
    assert_eq!(outcome.stats.get("CONSEJERIA"), Some(1));

    let doc = load_document(&output).unwrap();
    assert_eq!(column(&doc, "SEXO"), ["MASCULINO", "FEMENINO", "FEMENINO"]);
    assert_eq!(column(&doc, "DÉFICIT"), ["REZAGO", "", ""]);
}

#[test]
fn test_fill_in_place_twice_writes_nothing_new() {
    let dir = TempDir::new().unwrap();
    let sheet = extract_into(&dir);
    let options = FillOptions {
        sheet: sheet.clone(),
        replay: fixture_path(),
        output: None,
        policy: WritePolicy::OnlyIfEmpty,
    };

    let first = run_fill(&settings(), &options).unwrap();
    assert!(first.stats.total() > 0);
    let second = run_fill(&settings(), &options).unwrap();
    assert_eq!(second.stats.total(), 0);
}

#[test]
fn test_fill_keeps_existing_values_unless_overwrite() {
    let dir = TempDir::new().unwrap();
    let sheet = dir.path().join("planilla.csv");
    let mut doc = SpreadsheetDocument::new(["FECHA", "NOMBRE", "RUN", "SEXO"]);
    doc.push_row(vec![
        "04-07-2025".into(),
        "ROJAS SOTO, MATEO".into(),
        "23456789k".into(),
        "FEMENINO".into(),
    ]);
    save_document(&doc, &sheet, None).unwrap();

    let mut options = FillOptions {
        sheet: sheet.clone(),
        replay: fixture_path(),
        output: None,
        policy: WritePolicy::OnlyIfEmpty,
    };
    run_fill(&settings(), &options).unwrap();
    assert_eq!(column(&load_document(&sheet).unwrap(), "SEXO"), ["FEMENINO"]);

    options.policy = WritePolicy::Overwrite;
    run_fill(&settings(), &options).unwrap();
    assert_eq!(column(&load_document(&sheet).unwrap(), "SEXO"), ["MASCULINO"]);
}

#[test]
fn test_fill_refuses_locked_sheet_before_portal() {
    let dir = TempDir::new().unwrap();
    let sheet = extract_into(&dir);
    let owner_file = format!("~${}", sheet.file_name().unwrap().to_string_lossy());
    std::fs::write(dir.path().join(owner_file), b"owner").unwrap();

    let err = run_fill(
        &settings(),
        &FillOptions {
            sheet,
            replay: dir.path().join("missing.json"),
            output: None,
            policy: WritePolicy::OnlyIfEmpty,
        },
    )
    .unwrap_err();

    let sheet_error = err
        .chain()
        .find_map(|cause| cause.downcast_ref::<SheetError>())
        .unwrap();
    assert!(sheet_error.is_locked());
}

#[test]
fn test_text_commands() {
    let analysis = run_analyze("MOTIVO DE CONSULTA: videollamada efectiva. Se observa riesgo");
    assert_eq!(analysis.attention_type, Some(AttentionType::VideoEffective));
    assert_eq!(analysis.deficit, Some(Deficit::Riesgo));

    let age = run_age("2 meses 10 días");
    assert_eq!(age.months, 2);
    assert_eq!(age.bucket, Some(AgeBucket::Under7Months));
    assert!(age.lme);
    assert!(!run_age("1 año").lme);

    assert_eq!(run_rut("123456785"), "12.345.678-5");
}

#[test]
fn test_env_overrides_settings() {
    let env: HashMap<&str, &str> = [
        (ENV_USERNAME, "otro"),
        (ENV_PASSWORD, ""),
        (ENV_OUTPUT_DIR, "/tmp/salida"),
    ]
    .into();
    let mut settings = settings();
    settings.apply_env(|key| env.get(key).map(|value| value.to_string()));

    assert_eq!(settings.portal.username, "otro");
    // Empty variables do not clear configured values.
    assert_eq!(settings.portal.password, "clave");
    assert_eq!(settings.portal.location, "CESFAM LOS ALERCES");
    assert_eq!(settings.output_dir, Some(PathBuf::from("/tmp/salida")));
}

#[test]
fn test_explicit_config_must_exist() {
    let dir = TempDir::new().unwrap();
    assert!(Settings::load(Some(dir.path().join("rayen.toml").as_path())).is_err());

    let path = dir.path().join("custom.toml");
    std::fs::write(&path, "output_dir = \"planillas\"\n[portal]\nlocation = \"CESFAM\"\n").unwrap();
    let settings = Settings::from_file(&path).unwrap();
    assert_eq!(settings.portal.location, "CESFAM");
    assert_eq!(settings.output_dir, Some(PathBuf::from("planillas")));
}
