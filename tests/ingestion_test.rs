use empresa_radar::enrichment::text_column;
use empresa_radar::error::RadarError;
use empresa_radar::ingestion::load_directory;
use std::fs;

#[test]
fn test_merges_files_with_different_columns() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    fs::write(
        dir.path().join("sp.csv"),
        "cnae_principal;municipio-id;bairro;razao_social\n\
         4789004;3550308;Moema;Pet A\n\
         4711302;3550308;Centro;Hiper B\n\
         9609207;3550308;Lapa;Hotel C\n",
    )?;
    fs::write(
        dir.path().join("campinas.csv"),
        "municipio-id;cnae_principal;bairro;telefone\n\
         3509502;0159802;Cambui;1933330000\n\
         3509502;4691500;Centro;\n",
    )?;
    // No header at all: skipped, the others still load.
    fs::write(dir.path().join("broken.csv"), "")?;
    fs::write(dir.path().join("ignored.txt"), "a;b\n1;2\n")?;

    let df = load_directory(dir.path())?;
    assert_eq!(df.height(), 5);
    assert_eq!(df.width(), 5);

    let codes = text_column(&df, "cnae_principal")?;
    assert!(codes.contains(&Some("0159802".to_string())));

    let razao = text_column(&df, "razao_social")?;
    let telefone = text_column(&df, "telefone")?;
    let razao_nulls = razao.iter().filter(|v| v.is_none()).count();
    let telefone_nulls = telefone.iter().filter(|v| v.is_none()).count();
    assert_eq!(razao_nulls, 2);
    // Three rows from sp.csv plus one empty cell.
    assert_eq!(telefone_nulls, 4);
    Ok(())
}

#[test]
fn test_malformed_lines_are_dropped() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    fs::write(
        dir.path().join("dados.csv"),
        "cnae_principal;municipio-id;bairro\n\
         4789004;3550308;Moema\n\
         4789004;3550308;Moema;extra;fields\n\
         4789004;3550308;Pinheiros\n",
    )?;

    let df = load_directory(dir.path())?;
    assert_eq!(df.height(), 2);
    Ok(())
}

#[test]
fn test_no_parseable_files_is_an_error() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    fs::write(dir.path().join("empty.csv"), "")?;

    match load_directory(dir.path()) {
        Err(RadarError::NoInputFiles(_)) => Ok(()),
        other => panic!("expected NoInputFiles, got {:?}", other.map(|df| df.height())),
    }
}
